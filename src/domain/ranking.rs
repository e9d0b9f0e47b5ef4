//! Derivation of ranked realm and item views from raw comparison results.
//!
//! Every sort in this module is stable and keyed on a single numeric field, so
//! ties keep the order in which the API returned them. The "highest"/"lowest"
//! markers are positional and depend on that.

use serde::{Deserialize, Serialize};

use super::entities::{ItemId, ItemPriceDetail, RealmComparison, RealmId};

/// Maximum number of realms shown per item ranking.
pub const ITEM_RANKING_LIMIT: usize = 10;

/// Which aggregate orders the realm leaderboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankingStrategy {
    #[default]
    ValuePerItem,
    Rating,
}

impl RankingStrategy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "value" | "value_per_item" => Some(RankingStrategy::ValuePerItem),
            "rating" => Some(RankingStrategy::Rating),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RankingStrategy::ValuePerItem => "Value per item",
            RankingStrategy::Rating => "Market rating",
        }
    }
}

/// Whether per-item rankings drop prices at or below the raw craft cost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CraftCostFilter {
    #[default]
    Enabled,
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aggregate {
    pub total_value: f64,
    /// `None` when there are no items to divide by.
    pub value_per_item: Option<f64>,
}

/// Sums each item's `average_lowest_five`.
pub fn aggregate(items: &[ItemPriceDetail]) -> Aggregate {
    let values = items
        .iter()
        .map(|detail| detail.average_lowest_five)
        .filter(|value| value.is_finite());

    let (total_value, count) = values.fold((0.0, 0_usize), |(sum, count), value| {
        (sum + value, count + 1)
    });

    Aggregate {
        total_value,
        value_per_item: per_item(total_value, count),
    }
}

fn per_item(total: f64, count: usize) -> Option<f64> {
    if count == 0 {
        None
    } else {
        Some(total / count as f64)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RealmSummary {
    pub realm_id: RealmId,
    pub total_value: f64,
    pub value_per_item: Option<f64>,
    pub rating: Option<f64>,
    pub item_count: usize,
}

impl RealmSummary {
    fn sort_key(&self, strategy: RankingStrategy) -> Option<f64> {
        match strategy {
            RankingStrategy::ValuePerItem => self.value_per_item,
            RankingStrategy::Rating => self.rating,
        }
        .filter(|value| value.is_finite())
    }
}

/// Builds the per-realm aggregate, preferring the server's total when present.
pub fn summarize(comparison: &RealmComparison) -> RealmSummary {
    let item_count = comparison.items.len();
    let total_value = comparison
        .total_value
        .filter(|value| value.is_finite())
        .unwrap_or_else(|| aggregate(&comparison.items).total_value);

    RealmSummary {
        realm_id: comparison.realm_id,
        total_value,
        value_per_item: per_item(total_value, item_count),
        rating: comparison.rating.filter(|value| value.is_finite()),
        item_count,
    }
}

/// Orders realms best-first. Realms lacking the chosen key are left out.
pub fn rank_realms_by_value(
    comparisons: &[RealmComparison],
    strategy: RankingStrategy,
) -> Vec<RealmSummary> {
    let mut keyed: Vec<(f64, RealmSummary)> = comparisons
        .iter()
        .map(summarize)
        .filter_map(|summary| summary.sort_key(strategy).map(|key| (key, summary)))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| b.total_cmp(a));
    keyed.into_iter().map(|(_, summary)| summary).collect()
}

/// A ranked entry with its positional markers.
#[derive(Clone, Debug, PartialEq)]
pub struct Ranked<T> {
    pub entry: T,
    pub position: usize,
    pub is_highest: bool,
    pub is_lowest: bool,
}

pub fn classify_extremes<T>(ranked: Vec<T>) -> Vec<Ranked<T>> {
    let last = ranked.len().saturating_sub(1);
    ranked
        .into_iter()
        .enumerate()
        .map(|(position, entry)| Ranked {
            entry,
            position,
            is_highest: position == 0,
            is_lowest: position == last,
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemRankingEntry {
    pub realm_id: RealmId,
    pub detail: ItemPriceDetail,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ItemRanking {
    Ranked(Vec<ItemRankingEntry>),
    /// No realm had usable price data for the item.
    NoPriceData,
}

impl ItemRanking {
    pub fn entries(&self) -> &[ItemRankingEntry] {
        match self {
            ItemRanking::Ranked(entries) => entries,
            ItemRanking::NoPriceData => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ItemRanking::NoPriceData)
    }
}

/// Ranks realms by one item's `average_lowest_five`, best-first, top ten.
pub fn rank_realms_for_item(
    comparisons: &[RealmComparison],
    item_id: ItemId,
    craft_cost: Option<f64>,
    filter: CraftCostFilter,
) -> ItemRanking {
    let floor = match filter {
        CraftCostFilter::Enabled => craft_cost.filter(|cost| cost.is_finite() && *cost > 0.0),
        CraftCostFilter::Disabled => None,
    };

    let mut entries: Vec<ItemRankingEntry> = comparisons
        .iter()
        .filter_map(|comparison| {
            comparison.item(item_id).map(|detail| ItemRankingEntry {
                realm_id: comparison.realm_id,
                detail: detail.clone(),
            })
        })
        .filter(|entry| entry.detail.average_lowest_five.is_finite())
        .filter(|entry| floor.map_or(true, |cost| entry.detail.average_lowest_five > cost))
        .collect();

    if entries.is_empty() {
        return ItemRanking::NoPriceData;
    }

    entries.sort_by(|a, b| {
        b.detail
            .average_lowest_five
            .total_cmp(&a.detail.average_lowest_five)
    });
    entries.truncate(ITEM_RANKING_LIMIT);
    ItemRanking::Ranked(entries)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceTrend {
    pub percentage: f64,
    pub direction: TrendDirection,
}

pub fn price_trend(current: f64, previous: f64) -> PriceTrend {
    let stable = PriceTrend {
        percentage: 0.0,
        direction: TrendDirection::Stable,
    };
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return stable;
    }

    let difference = current - previous;
    let percentage = (difference / previous * 100.0).abs();
    if difference > 0.0 {
        PriceTrend {
            percentage,
            direction: TrendDirection::Up,
        }
    } else if difference < 0.0 {
        PriceTrend {
            percentage,
            direction: TrendDirection::Down,
        }
    } else {
        stable
    }
}
