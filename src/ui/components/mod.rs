pub mod money;
pub mod population_badge;
pub mod price_ranking_card;
pub mod realm_ranking_table;
pub mod selection_badges;
pub mod toast;

pub use money::MoneyDisplay;
pub use population_badge::PopulationBadge;
pub use price_ranking_card::PriceRankingCard;
pub use realm_ranking_table::RealmRankingTable;
pub use selection_badges::SelectionBadges;
pub use toast::{push_failure, push_toast, Toast, ToastKind, ToastMessage};
