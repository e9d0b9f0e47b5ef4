pub mod comparison;
pub mod items;
pub mod realms;

pub use comparison::ComparisonPage;
pub use items::ItemsPage;
pub use realms::RealmsPage;
