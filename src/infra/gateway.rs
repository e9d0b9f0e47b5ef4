//! Request/response contract of the remote price API.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    GroupDetail, Group, ItemClass, ItemDetail, ItemId, ItemPage, ItemSubclass, PriceMetrics,
    Realm, RealmComparison, RealmId, TimeRange,
};

/// Message used when a failed response carries no usable message.
pub const FALLBACK_ERROR_MESSAGE: &str = "An error occurred while fetching data";

pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Text shown to the user: the server's message for API failures, the
    /// generic fallback for everything else.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Api { message, .. } => message.clone(),
            _ => FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

/// Filters for the paginated item catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemQuery {
    pub page: u32,
    pub page_size: u32,
    pub class_name: Option<String>,
    pub subclass_name: Option<String>,
}

impl Default for ItemQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            class_name: None,
            subclass_name: None,
        }
    }
}

impl ItemQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page: page.max(1),
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_subclass(mut self, subclass_name: impl Into<String>) -> Self {
        self.subclass_name = Some(subclass_name.into());
        self
    }
}

#[async_trait]
pub trait MarketGateway: Send + Sync + 'static {
    async fn list_realms(&self, category: Option<&str>) -> Result<Vec<Realm>, GatewayError>;
    async fn list_items(&self, query: &ItemQuery) -> Result<ItemPage, GatewayError>;
    async fn get_item(&self, item_id: ItemId) -> Result<ItemDetail, GatewayError>;
    async fn list_item_classes(&self) -> Result<Vec<ItemClass>, GatewayError>;
    async fn list_item_subclasses(&self, class_id: i64) -> Result<Vec<ItemSubclass>, GatewayError>;
    async fn list_groups(&self) -> Result<Vec<Group>, GatewayError>;
    async fn get_group(&self, group_id: i64) -> Result<GroupDetail, GatewayError>;
    async fn get_realm_prices(
        &self,
        realm_id: RealmId,
        item_ids: &[ItemId],
        time_range: TimeRange,
    ) -> Result<PriceMetrics, GatewayError>;
    async fn compare_realms(
        &self,
        realm_ids: &[RealmId],
        item_ids: &[ItemId],
    ) -> Result<Vec<RealmComparison>, GatewayError>;
}
