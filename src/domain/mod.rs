//! Domain logic for realm price comparison lives here.

pub mod app_state;
pub mod currency;
pub mod entities;
pub mod ranking;
pub mod selection;
pub mod views;

pub use app_state::{
    AppState, CacheResource, CacheTimestamps, ComparisonSnapshot, Failure, RequestKind,
};
pub use currency::{format_price, to_parts, CurrencyError, Money};
pub use entities::{
    Group, GroupDetail, Item, ItemClass, ItemDetail, ItemId, ItemMetric, ItemPage,
    ItemPriceDetail, ItemSubclass, PopulationType, PriceMetrics, Realm, RealmComparison, RealmId,
};
pub use ranking::{
    aggregate, classify_extremes, price_trend, rank_realms_by_value, rank_realms_for_item,
    summarize, Aggregate, CraftCostFilter, ItemRanking, ItemRankingEntry, PriceTrend, Ranked,
    RankingStrategy, RealmSummary, TrendDirection, ITEM_RANKING_LIMIT,
};
pub use selection::{
    realms_by_language, realms_for_languages, ComparisonRequest, PersistedSelection, Selection,
    TimeRange, DEFAULT_LANGUAGES,
};
pub use views::{item_card, language_flag, realm_leaderboard, ItemCard, ItemCardBody, ItemRealmRow, RealmRow};
