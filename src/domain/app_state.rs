use std::{
    collections::{HashMap, HashSet},
    time::{Duration, SystemTime},
};

use super::entities::{
    Group, Item, ItemClass, ItemId, ItemPage, PriceMetrics, Realm, RealmComparison, RealmId,
};
use super::ranking::{CraftCostFilter, Ranked, RankingStrategy};
use super::selection::{ComparisonRequest, Selection};
use super::views::{item_card, realm_leaderboard, ItemCard, RealmRow};

/// Comparison result together with the request that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonSnapshot {
    pub request: ComparisonRequest,
    pub realms: Vec<RealmComparison>,
}

/// The most recent failure, numbered so two identical messages in a row
/// still count as separate events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub seq: u64,
    pub message: String,
}

/// Request families that are tracked independently for loading and staleness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Realms,
    Items,
    ItemClasses,
    Groups,
    GroupItems,
    Prices,
    Comparison,
}

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub selection: Selection,
    pub realms: Vec<Realm>,
    pub item_page: ItemPage,
    /// Every item seen in any catalog page or group, so selections keep
    /// their names and craft costs after paging away.
    pub known_items: HashMap<ItemId, Item>,
    pub item_classes: Vec<ItemClass>,
    pub groups: Vec<Group>,
    pub price_metrics: HashMap<RealmId, PriceMetrics>,
    /// `None` until the first comparison completes.
    pub comparison: Option<ComparisonSnapshot>,
    pub pending: HashSet<RequestKind>,
    /// The most recent gateway failure; replaced, never accumulated.
    pub error: Option<String>,
    /// Survives the error being cleared by the next request.
    pub last_failure: Option<Failure>,
    pub ranking: RankingStrategy,
    pub craft_filter: CraftCostFilter,
    pub cache: CacheTimestamps,
}

impl AppState {
    pub fn new(ranking: RankingStrategy, craft_filter: CraftCostFilter) -> Self {
        Self {
            ranking,
            craft_filter,
            ..Self::default()
        }
    }

    pub fn is_loading(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_pending(&self, kind: RequestKind) -> bool {
        self.pending.contains(&kind)
    }

    pub fn is_stale(&self, resource: &CacheResource, ttl: Duration) -> bool {
        self.cache.is_stale(resource, ttl)
    }

    /// Replaces the current error and bumps the failure counter.
    pub fn record_failure(&mut self, message: String) {
        let seq = self.last_failure.as_ref().map_or(1, |failure| failure.seq + 1);
        self.error = Some(message.clone());
        self.last_failure = Some(Failure { seq, message });
    }

    /// Clears the error only if it still belongs to failure `seq`.
    pub fn dismiss_failure(&mut self, seq: u64) {
        if self.last_failure.as_ref().is_some_and(|failure| failure.seq == seq) {
            self.error = None;
        }
    }

    pub fn realm(&self, id: RealmId) -> Option<&Realm> {
        self.realms.iter().find(|realm| realm.id == id)
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.known_items.get(&id)
    }

    pub fn remember_items<'a>(&mut self, items: impl IntoIterator<Item = &'a Item>) {
        for item in items {
            self.known_items.insert(item.id, item.clone());
        }
    }

    /// Selected realms in catalog order.
    pub fn selected_realms(&self) -> Vec<Realm> {
        self.realms
            .iter()
            .filter(|realm| self.selection.is_realm_selected(realm.id))
            .cloned()
            .collect()
    }

    pub fn comparisons(&self) -> &[RealmComparison] {
        self.comparison
            .as_ref()
            .map(|snapshot| snapshot.realms.as_slice())
            .unwrap_or(&[])
    }

    pub fn realm_leaderboard(&self) -> Vec<Ranked<RealmRow>> {
        realm_leaderboard(self.comparisons(), &self.selected_realms(), self.ranking)
    }

    /// One card per selected item, in selection order.
    pub fn item_cards(&self) -> Vec<ItemCard> {
        let realms = self.selected_realms();
        self.selection
            .item_ids()
            .iter()
            .map(|id| {
                item_card(
                    self.comparisons(),
                    &realms,
                    *id,
                    self.item(*id),
                    self.craft_filter,
                )
            })
            .collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct CacheTimestamps {
    entries: HashMap<CacheResource, SystemTime>,
}

impl CacheTimestamps {
    pub fn record_fetch(&mut self, resource: CacheResource, fetched_at: SystemTime) {
        self.entries.insert(resource, fetched_at);
    }

    pub fn fetched_at(&self, resource: &CacheResource) -> Option<SystemTime> {
        self.entries.get(resource).copied()
    }

    pub fn is_stale(&self, resource: &CacheResource, ttl: Duration) -> bool {
        self.fetched_at(resource)
            .map(|time| time.elapsed().map(|elapsed| elapsed > ttl).unwrap_or(true))
            .unwrap_or(true)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheResource {
    Realms,
    Items,
    ItemClasses,
    Groups,
    Prices(RealmId),
    Comparison,
}
