//! Outbound adapters: the price API gateway and its HTTP client.

pub mod api;
pub mod gateway;

pub use api::{ApiClient, CacheStatus};
pub use gateway::{GatewayError, ItemQuery, MarketGateway, FALLBACK_ERROR_MESSAGE};
