use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Identifier for realms returned by the price API.
pub type RealmId = i64;

/// Identifier for items returned by the price API.
pub type ItemId = i64;

/// Population classification reported for a realm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PopulationType {
    Full,
    High,
    Medium,
    Low,
    #[default]
    Unclassified,
}

impl PopulationType {
    /// Parses the API label; anything outside the known set is `Unclassified`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "full" => PopulationType::Full,
            "high" => PopulationType::High,
            "medium" => PopulationType::Medium,
            "low" => PopulationType::Low,
            _ => PopulationType::Unclassified,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PopulationType::Full => "Full",
            PopulationType::High => "High",
            PopulationType::Medium => "Medium",
            PopulationType::Low => "Low",
            PopulationType::Unclassified => "Unknown",
        }
    }
}

impl fmt::Display for PopulationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Realm {
    pub id: RealmId,
    pub name: String,
    /// Language or region category, e.g. "German".
    pub language: String,
    pub population_type: PopulationType,
    pub population: Option<u64>,
    pub item_count: u64,
    pub last_updated: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub class_name: String,
    pub subclass_name: String,
    /// Raw material cost in copper, when known.
    pub raw_craft_cost: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemDetail {
    pub item: Item,
    pub class_id: i64,
    pub subclass_id: i64,
    pub display_subclass_name: Option<String>,
    pub groups: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemPage {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub items: Vec<Item>,
}

impl ItemPage {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemClass {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemSubclass {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GroupDetail {
    pub group: Group,
    pub items: Vec<Item>,
}

/// Price statistics for one item on one realm, as returned by a comparison.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemPriceDetail {
    pub item_id: ItemId,
    pub item_name: String,
    pub lowest_price: f64,
    pub highest_price: f64,
    pub quantity: u64,
    pub average_lowest_five: f64,
    pub rating: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RealmComparison {
    pub realm_id: RealmId,
    /// Server aggregate; `None` when the payload omitted it.
    pub total_value: Option<f64>,
    pub value_per_item: Option<f64>,
    pub rating: Option<f64>,
    pub items: Vec<ItemPriceDetail>,
}

impl RealmComparison {
    pub fn item(&self, item_id: ItemId) -> Option<&ItemPriceDetail> {
        self.items.iter().find(|detail| detail.item_id == item_id)
    }
}

/// Time-windowed price metrics for a single realm.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceMetrics {
    pub average_price: f64,
    pub price_trend: f64,
    pub item_details: Vec<ItemMetric>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemMetric {
    pub item_id: ItemId,
    pub current_price: f64,
    pub historical_low: f64,
    pub historical_high: f64,
}
