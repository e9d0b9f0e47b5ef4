//! Fetch orchestration and persisted selection changes on top of the store.

use std::{
    future::Future,
    sync::Arc,
    time::{Duration, SystemTime},
};

use tracing::{debug, info, instrument, warn};

use crate::{
    config::AppConfig,
    domain::{
        AppState, CacheResource, ComparisonSnapshot, ItemId, Realm, RealmId, RequestKind,
        Selection, TimeRange,
    },
    infra::{GatewayError, ItemQuery, MarketGateway},
    store::MarketStore,
    util::persistence::SelectionFile,
};

pub struct MarketService<G> {
    gateway: Arc<G>,
    store: MarketStore,
    persistence: SelectionFile,
    cache_ttl: Duration,
}

impl<G> Clone for MarketService<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            store: self.store.clone(),
            persistence: self.persistence.clone(),
            cache_ttl: self.cache_ttl,
        }
    }
}

impl<G> PartialEq for MarketService<G> {
    fn eq(&self, other: &Self) -> bool {
        self.store == other.store
    }
}

impl<G: MarketGateway> MarketService<G> {
    /// Builds the service and rehydrates the selection from disk.
    pub fn new(gateway: Arc<G>, config: &AppConfig, persistence: SelectionFile) -> Self {
        let mut state = AppState::new(config.ranking, config.craft_filter);
        state.selection.apply_persisted(persistence.load());
        Self {
            gateway,
            store: MarketStore::new(state),
            persistence,
            cache_ttl: config.cache_ttl,
        }
    }

    pub fn store(&self) -> &MarketStore {
        &self.store
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Runs one tagged request. Failures replace the current error; results
    /// of superseded requests are dropped.
    async fn fetch<T>(
        &self,
        kind: RequestKind,
        request: impl Future<Output = Result<T, GatewayError>>,
        apply: impl FnOnce(&mut AppState, T),
    ) -> Result<(), GatewayError> {
        let ticket = self.store.begin(kind);
        match request.await {
            Ok(value) => {
                self.store.complete(ticket, |state| apply(state, value));
                Ok(())
            }
            Err(err) => {
                warn!(?kind, %err, "request failed");
                self.store.fail(ticket, err.user_message());
                Err(err)
            }
        }
    }

    /// Loads the realm catalog. Without a saved realm selection, every realm
    /// of the selected languages is picked.
    #[instrument(skip(self))]
    pub async fn load_realms(&self) -> Result<(), GatewayError> {
        let mut changed = false;
        self.fetch(
            RequestKind::Realms,
            self.gateway.list_realms(None),
            |state, realms: Vec<Realm>| {
                info!(count = realms.len(), "realms loaded");
                if state.selection.realm_ids().is_empty() {
                    let languages = state.selection.languages().to_vec();
                    state.selection.set_languages(languages, &realms);
                    changed = true;
                }
                state.realms = realms;
                state
                    .cache
                    .record_fetch(CacheResource::Realms, SystemTime::now());
            },
        )
        .await?;
        if changed {
            self.persist();
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn load_items(&self, query: ItemQuery) -> Result<(), GatewayError> {
        self.fetch(
            RequestKind::Items,
            self.gateway.list_items(&query),
            |state, page| {
                debug!(page = page.page, total = page.total_items, "item page loaded");
                state.remember_items(&page.items);
                state.item_page = page;
                state
                    .cache
                    .record_fetch(CacheResource::Items, SystemTime::now());
            },
        )
        .await
    }

    pub async fn load_item_classes(&self) -> Result<(), GatewayError> {
        self.fetch(
            RequestKind::ItemClasses,
            self.gateway.list_item_classes(),
            |state, classes| {
                state.item_classes = classes;
                state
                    .cache
                    .record_fetch(CacheResource::ItemClasses, SystemTime::now());
            },
        )
        .await
    }

    pub async fn load_groups(&self) -> Result<(), GatewayError> {
        self.fetch(
            RequestKind::Groups,
            self.gateway.list_groups(),
            |state, groups| {
                state.groups = groups;
                state
                    .cache
                    .record_fetch(CacheResource::Groups, SystemTime::now());
            },
        )
        .await
    }

    /// Reloads realms, item classes and groups whose last fetch is older
    /// than the cache TTL. Stops at the first failure so its error stays
    /// visible.
    pub async fn refresh_catalog_if_stale(&self) -> Result<(), GatewayError> {
        let ttl = self.cache_ttl;
        let (realms, classes, groups) = self.store.read(|state| {
            (
                state.is_stale(&CacheResource::Realms, ttl),
                state.is_stale(&CacheResource::ItemClasses, ttl),
                state.is_stale(&CacheResource::Groups, ttl),
            )
        });
        if realms {
            self.load_realms().await?;
        }
        if classes {
            self.load_item_classes().await?;
        }
        if groups {
            self.load_groups().await?;
        }
        Ok(())
    }

    /// Adds every item of a group to the selection.
    #[instrument(skip(self))]
    pub async fn select_group(&self, group_id: i64) -> Result<(), GatewayError> {
        self.fetch(
            RequestKind::GroupItems,
            self.gateway.get_group(group_id),
            |state, detail| {
                info!(group = %detail.group.name, items = detail.items.len(), "group selected");
                state.remember_items(&detail.items);
                state
                    .selection
                    .bulk_select_items(detail.items.iter().map(|item| item.id));
            },
        )
        .await?;
        self.persist();
        Ok(())
    }

    /// Loads time-windowed metrics for one realm over the selected items.
    #[instrument(skip(self))]
    pub async fn load_price_metrics(&self, realm_id: RealmId) -> Result<(), GatewayError> {
        let (item_ids, time_range) = self.store.read(|state| {
            (
                state.selection.item_ids().to_vec(),
                state.selection.time_range(),
            )
        });
        self.fetch(
            RequestKind::Prices,
            self.gateway.get_realm_prices(realm_id, &item_ids, time_range),
            |state, metrics| {
                state.price_metrics.insert(realm_id, metrics);
                state
                    .cache
                    .record_fetch(CacheResource::Prices(realm_id), SystemTime::now());
            },
        )
        .await
    }

    /// Compares the selected realms over the selected items. Without at
    /// least one realm and one item no request is sent; the previous result
    /// is discarded and any comparison still in flight goes stale.
    #[instrument(skip(self))]
    pub async fn compare_selected(&self) -> Result<(), GatewayError> {
        let Some(request) = self.store.read(|state| state.selection.comparison_request()) else {
            debug!("nothing selected; clearing comparison");
            let ticket = self.store.supersede(RequestKind::Comparison);
            self.store.complete(ticket, |state| state.comparison = None);
            return Ok(());
        };
        let call = self
            .gateway
            .compare_realms(&request.realm_ids, &request.item_ids);
        self.fetch(RequestKind::Comparison, call, |state, realms| {
            info!(realms = request.realm_ids.len(), items = request.item_ids.len(), "comparison loaded");
            state.comparison = Some(ComparisonSnapshot {
                request: request.clone(),
                realms,
            });
            state
                .cache
                .record_fetch(CacheResource::Comparison, SystemTime::now());
        })
        .await
    }

    pub fn toggle_item(&self, id: ItemId) {
        self.edit_selection(|selection, _| selection.toggle_item(id));
    }

    pub fn add_item(&self, id: ItemId) {
        self.edit_selection(|selection, _| {
            selection.add_item(id);
        });
    }

    pub fn remove_item(&self, id: ItemId) {
        self.edit_selection(|selection, _| {
            selection.remove_item(id);
        });
    }

    pub fn bulk_select_items(&self, ids: Vec<ItemId>) {
        self.edit_selection(|selection, _| selection.bulk_select_items(ids));
    }

    pub fn clear_items(&self) {
        self.edit_selection(|selection, _| selection.clear_items());
    }

    pub fn add_realm(&self, id: RealmId) {
        self.edit_selection(|selection, _| {
            selection.add_realm(id);
        });
    }

    pub fn remove_realm(&self, id: RealmId) {
        self.edit_selection(|selection, _| {
            selection.remove_realm(id);
        });
    }

    pub fn toggle_realm(&self, id: RealmId) {
        self.edit_selection(|selection, _| selection.toggle_realm(id));
    }

    pub fn set_languages(&self, languages: Vec<String>) {
        self.edit_selection(|selection, realms| selection.set_languages(languages, realms));
    }

    pub fn toggle_language(&self, language: &str) {
        self.edit_selection(|selection, realms| selection.toggle_language(language, realms));
    }

    pub fn set_time_range(&self, range: TimeRange) {
        self.edit_selection(|selection, _| selection.set_time_range(range));
    }

    fn edit_selection(&self, edit: impl FnOnce(&mut Selection, &[Realm])) {
        self.store
            .update(|state| edit(&mut state.selection, &state.realms));
        self.persist();
    }

    fn persist(&self) {
        if self.persistence.path().is_none() {
            return;
        }
        let snapshot = self.store.read(|state| state.selection.to_persisted());
        if let Err(err) = self.persistence.save(&snapshot) {
            warn!(%err, "failed to persist selection");
        }
    }
}
