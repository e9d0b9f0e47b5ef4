use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use realm_price_scanner::{
    config::AppConfig,
    domain::{
        Group, GroupDetail, Item, ItemClass, ItemCardBody, ItemDetail, ItemId, ItemPage,
        ItemPriceDetail, ItemSubclass, PersistedSelection, PopulationType, PriceMetrics, Realm,
        RealmComparison, RealmId, RequestKind, TimeRange,
    },
    infra::{GatewayError, ItemQuery, MarketGateway, FALLBACK_ERROR_MESSAGE},
    service::MarketService,
    util::persistence::SelectionFile,
};

const SLOW_REALM: RealmId = 1;

fn realm(id: RealmId, language: &str) -> Realm {
    Realm {
        id,
        name: format!("Realm {id}"),
        language: language.to_string(),
        population_type: PopulationType::High,
        population: Some(1_000),
        item_count: 10,
        last_updated: None,
    }
}

fn item(id: ItemId, craft_cost: Option<f64>) -> Item {
    Item {
        id,
        name: format!("Item {id}"),
        class_name: "Trade Goods".into(),
        subclass_name: "Metal & Stone".into(),
        raw_craft_cost: craft_cost,
    }
}

fn detail(item_id: ItemId, price: f64) -> ItemPriceDetail {
    ItemPriceDetail {
        item_id,
        item_name: format!("Item {item_id}"),
        lowest_price: price,
        highest_price: price,
        quantity: 3,
        average_lowest_five: price,
        rating: 0.0,
    }
}

fn comparison(realm_id: RealmId, total: f64, items: Vec<ItemPriceDetail>) -> RealmComparison {
    RealmComparison {
        realm_id,
        total_value: Some(total),
        value_per_item: None,
        rating: None,
        items,
    }
}

/// In-memory gateway. Comparisons involving `SLOW_REALM` are delayed when
/// `slow_comparisons` is set; failures are scripted per call.
struct FakeGateway {
    realms: Vec<Realm>,
    comparisons: Vec<RealmComparison>,
    slow_comparisons: bool,
    fail_groups: bool,
    fail_classes: bool,
    compare_calls: AtomicUsize,
}

impl FakeGateway {
    fn new(realms: Vec<Realm>, comparisons: Vec<RealmComparison>) -> Self {
        Self {
            realms,
            comparisons,
            slow_comparisons: false,
            fail_groups: false,
            fail_classes: false,
            compare_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MarketGateway for FakeGateway {
    async fn list_realms(&self, _category: Option<&str>) -> Result<Vec<Realm>, GatewayError> {
        Ok(self.realms.clone())
    }

    async fn list_items(&self, query: &ItemQuery) -> Result<ItemPage, GatewayError> {
        Ok(ItemPage {
            page: query.page,
            page_size: query.page_size,
            total_items: 2,
            total_pages: 1,
            items: vec![item(10, Some(100.0)), item(20, None)],
        })
    }

    async fn get_item(&self, item_id: ItemId) -> Result<ItemDetail, GatewayError> {
        Ok(ItemDetail {
            item: item(item_id, None),
            class_id: 7,
            subclass_id: 7,
            display_subclass_name: None,
            groups: vec![],
        })
    }

    async fn list_item_classes(&self) -> Result<Vec<ItemClass>, GatewayError> {
        if self.fail_classes {
            return Err(GatewayError::Transport("connection refused".into()));
        }
        Ok(vec![ItemClass {
            id: 7,
            name: "Trade Goods".into(),
        }])
    }

    async fn list_item_subclasses(&self, _class_id: i64) -> Result<Vec<ItemSubclass>, GatewayError> {
        Ok(vec![])
    }

    async fn list_groups(&self) -> Result<Vec<Group>, GatewayError> {
        if self.fail_groups {
            return Err(GatewayError::Api {
                status: 500,
                message: "Group index unavailable".into(),
            });
        }
        Ok(vec![Group {
            id: 1,
            name: "Ores".into(),
        }])
    }

    async fn get_group(&self, group_id: i64) -> Result<GroupDetail, GatewayError> {
        Ok(GroupDetail {
            group: Group {
                id: group_id,
                name: "Ores".into(),
            },
            items: vec![item(30, Some(5.0)), item(31, None)],
        })
    }

    async fn get_realm_prices(
        &self,
        _realm_id: RealmId,
        item_ids: &[ItemId],
        _time_range: TimeRange,
    ) -> Result<PriceMetrics, GatewayError> {
        Ok(PriceMetrics {
            average_price: 42.0,
            price_trend: 1.5,
            item_details: Vec::with_capacity(item_ids.len()),
        })
    }

    async fn compare_realms(
        &self,
        realm_ids: &[RealmId],
        _item_ids: &[ItemId],
    ) -> Result<Vec<RealmComparison>, GatewayError> {
        self.compare_calls.fetch_add(1, Ordering::SeqCst);
        if self.slow_comparisons && realm_ids.contains(&SLOW_REALM) {
            tokio::time::sleep(Duration::from_millis(80)).await;
        }
        Ok(self
            .comparisons
            .iter()
            .filter(|comparison| realm_ids.contains(&comparison.realm_id))
            .cloned()
            .collect())
    }
}

fn service(gateway: FakeGateway) -> MarketService<FakeGateway> {
    MarketService::new(
        Arc::new(gateway),
        &AppConfig::default(),
        SelectionFile::disabled(),
    )
}

#[tokio::test]
async fn ranks_realms_by_value_per_item_end_to_end() {
    let gateway = FakeGateway::new(
        vec![realm(1, "English"), realm(2, "English")],
        vec![
            comparison(1, 500.0, vec![detail(10, 300.0), detail(20, 200.0)]),
            comparison(2, 800.0, vec![detail(10, 450.0), detail(20, 350.0)]),
        ],
    );
    let service = service(gateway);

    service.load_realms().await.expect("realms");
    service.add_item(10);
    service.add_item(20);
    assert_eq!(service.store().read(|st| st.selection.realm_ids().to_vec()), vec![1, 2]);

    service.compare_selected().await.expect("comparison");

    let board = service.store().read(|st| st.realm_leaderboard());
    assert_eq!(board.len(), 2);
    assert_eq!(board[0].entry.realm.id, 2);
    assert_eq!(board[0].entry.summary.value_per_item, Some(400.0));
    assert!(board[0].is_highest);
    assert_eq!(board[1].entry.realm.id, 1);
    assert_eq!(board[1].entry.summary.value_per_item, Some(250.0));
    assert!(board[1].is_lowest);
    assert!(!service.store().read(|st| st.is_loading()));
}

#[tokio::test]
async fn item_cards_apply_craft_cost_floor() {
    let gateway = FakeGateway::new(
        vec![realm(1, "German"), realm(2, "German"), realm(3, "German")],
        vec![
            comparison(1, 90.0, vec![detail(10, 90.0)]),
            comparison(2, 150.0, vec![detail(10, 150.0)]),
            comparison(3, 200.0, vec![detail(10, 200.0)]),
        ],
    );
    let service = service(gateway);
    service.load_realms().await.expect("realms");
    service.load_items(ItemQuery::default()).await.expect("items");
    service.add_item(10);
    service.add_item(20);
    service.compare_selected().await.expect("comparison");

    let cards = service.store().read(|st| st.item_cards());
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].craft_cost, Some(100.0));
    match &cards[0].body {
        ItemCardBody::Ranked(rows) => {
            let prices: Vec<f64> = rows
                .iter()
                .map(|row| row.entry.detail.average_lowest_five)
                .collect();
            assert_eq!(prices, vec![200.0, 150.0]);
        }
        ItemCardBody::NoPriceData => panic!("expected ranked rows"),
    }
    assert_eq!(cards[1].body, ItemCardBody::NoPriceData);
}

#[tokio::test]
async fn out_of_order_comparison_is_dropped() {
    let mut gateway = FakeGateway::new(
        vec![realm(1, "English"), realm(2, "French")],
        vec![
            comparison(1, 100.0, vec![detail(10, 100.0)]),
            comparison(2, 200.0, vec![detail(10, 200.0)]),
        ],
    );
    gateway.slow_comparisons = true;
    let service = service(gateway);
    service.load_realms().await.expect("realms");
    service.set_languages(vec!["English".into()]);
    service.add_item(10);

    let slow = service.compare_selected();
    let fast = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        service.set_languages(vec!["French".into()]);
        service.compare_selected().await
    };
    let (slow_result, fast_result) = tokio::join!(slow, fast);
    assert!(slow_result.is_ok());
    assert!(fast_result.is_ok());
    assert_eq!(service.gateway().compare_calls.load(Ordering::SeqCst), 2);

    let snapshot = service
        .store()
        .read(|st| st.comparison.clone())
        .expect("comparison applied");
    assert_eq!(snapshot.request.realm_ids, vec![2]);
    assert_eq!(snapshot.realms.len(), 1);
    assert_eq!(snapshot.realms[0].realm_id, 2);
    assert!(!service.store().read(|st| st.is_loading()));
}

#[tokio::test]
async fn latest_failure_replaces_error_and_new_request_clears_it() {
    let mut gateway = FakeGateway::new(vec![realm(1, "English")], vec![]);
    gateway.fail_groups = true;
    gateway.fail_classes = true;
    let service = service(gateway);

    assert!(service.load_groups().await.is_err());
    assert_eq!(
        service.store().read(|st| st.error.clone()).as_deref(),
        Some("Group index unavailable")
    );

    assert!(service.load_item_classes().await.is_err());
    assert_eq!(
        service.store().read(|st| st.error.clone()).as_deref(),
        Some(FALLBACK_ERROR_MESSAGE)
    );

    service.load_realms().await.expect("realms");
    assert_eq!(service.store().read(|st| st.error.clone()), None);
    assert_eq!(service.store().read(|st| st.realms.len()), 1);
}

#[tokio::test]
async fn default_realm_selection_skips_unselected_languages() {
    let gateway = FakeGateway::new(
        vec![realm(1, "English"), realm(2, "Russian"), realm(3, "German")],
        vec![],
    );
    let service = service(gateway);
    service.load_realms().await.expect("realms");
    assert_eq!(service.store().read(|st| st.selection.realm_ids().to_vec()), vec![1, 3]);

    service.toggle_language("Russian");
    assert_eq!(service.store().read(|st| st.selection.realm_ids().to_vec()), vec![1, 2, 3]);
}

#[tokio::test]
async fn comparison_waits_for_realms_and_items() {
    let gateway = FakeGateway::new(vec![realm(1, "English")], vec![]);
    let service = service(gateway);
    service.add_item(10);
    service.compare_selected().await.expect("no-op");
    assert_eq!(service.gateway().compare_calls.load(Ordering::SeqCst), 0);
    assert!(service.store().read(|st| st.comparison.is_none()));
}

#[tokio::test]
async fn selecting_a_group_adds_its_items() {
    let gateway = FakeGateway::new(vec![], vec![]);
    let service = service(gateway);
    service.add_item(31);
    service.select_group(1).await.expect("group");
    service.store().read(|st| {
        assert_eq!(st.selection.item_ids(), &[31, 30]);
        assert_eq!(st.item(30).and_then(|item| item.raw_craft_cost), Some(5.0));
    });
}

#[tokio::test]
async fn price_metrics_are_stored_per_realm() {
    let gateway = FakeGateway::new(vec![realm(4, "English")], vec![]);
    let service = service(gateway);
    service.load_price_metrics(4).await.expect("prices");
    let metrics = service.store().read(|st| st.price_metrics.get(&4).cloned());
    assert_eq!(metrics.map(|m| m.average_price), Some(42.0));
}

#[tokio::test]
async fn selection_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("selection.json");
    let first = MarketService::new(
        Arc::new(FakeGateway::new(vec![], vec![])),
        &AppConfig::default(),
        SelectionFile::at(&path),
    );
    first.add_item(10);
    first.add_item(20);
    first.toggle_realm(5);
    first.set_time_range(TimeRange::ThirtyDays);

    let second = MarketService::new(
        Arc::new(FakeGateway::new(vec![], vec![])),
        &AppConfig::default(),
        SelectionFile::at(&path),
    );
    second.store().read(|st| {
        assert_eq!(st.selection.item_ids(), &[10, 20]);
        assert_eq!(st.selection.realm_ids(), &[5]);
        assert_eq!(st.selection.time_range(), TimeRange::ThirtyDays);
    });
}

#[tokio::test]
async fn restored_realm_selection_is_kept_when_realms_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("selection.json");
    let saved = PersistedSelection {
        realm_ids: Some(vec![3, 2]),
        ..PersistedSelection::default()
    };
    SelectionFile::at(&path).save(&saved).expect("seed selection");

    let service = MarketService::new(
        Arc::new(FakeGateway::new(
            vec![realm(1, "English"), realm(2, "German"), realm(3, "French")],
            vec![],
        )),
        &AppConfig::default(),
        SelectionFile::at(&path),
    );
    service.load_realms().await.expect("realms");

    assert_eq!(service.store().read(|st| st.selection.realm_ids().to_vec()), vec![3, 2]);
    assert_eq!(SelectionFile::at(&path).load().realm_ids, Some(vec![3, 2]));
}

#[tokio::test]
async fn clearing_the_selection_discards_the_comparison() {
    let mut gateway = FakeGateway::new(
        vec![realm(1, "English")],
        vec![comparison(1, 100.0, vec![detail(10, 100.0)])],
    );
    gateway.slow_comparisons = true;
    let service = service(gateway);
    service.load_realms().await.expect("realms");
    service.add_item(10);

    let slow = service.compare_selected();
    let clear = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        service.clear_items();
        service.compare_selected().await
    };
    let (slow_result, clear_result) = tokio::join!(slow, clear);
    assert!(slow_result.is_ok());
    assert!(clear_result.is_ok());
    assert_eq!(service.gateway().compare_calls.load(Ordering::SeqCst), 1);

    service.store().read(|st| {
        assert!(st.selection.item_ids().is_empty());
        assert_eq!(st.comparison, None);
        assert!(st.realm_leaderboard().is_empty());
        assert!(!st.is_pending(RequestKind::Comparison));
    });
}

#[tokio::test]
async fn clearing_after_a_finished_comparison_empties_the_leaderboard() {
    let gateway = FakeGateway::new(
        vec![realm(1, "English")],
        vec![comparison(1, 100.0, vec![detail(10, 100.0)])],
    );
    let service = service(gateway);
    service.load_realms().await.expect("realms");
    service.add_item(10);
    service.compare_selected().await.expect("comparison");
    assert_eq!(service.store().read(|st| st.realm_leaderboard().len()), 1);

    service.remove_realm(1);
    service.compare_selected().await.expect("cleared");
    assert!(service.store().read(|st| st.realm_leaderboard().is_empty()));
}

#[tokio::test]
async fn repeated_identical_failures_are_numbered() {
    let mut gateway = FakeGateway::new(vec![], vec![]);
    gateway.fail_groups = true;
    let service = service(gateway);

    assert!(service.load_groups().await.is_err());
    let first = service.store().read(|st| st.last_failure.clone()).expect("failure");
    assert!(service.load_groups().await.is_err());
    let second = service.store().read(|st| st.last_failure.clone()).expect("failure");

    assert_eq!(first.message, second.message);
    assert_eq!(second.seq, first.seq + 1);

    service.store().update(|st| st.dismiss_failure(second.seq));
    assert_eq!(service.store().read(|st| st.error.clone()), None);
}

#[tokio::test]
async fn item_card_rows_carry_highest_and_lowest_tags() {
    let gateway = FakeGateway::new(
        vec![realm(1, "English"), realm(2, "English"), realm(3, "English")],
        vec![
            comparison(1, 300.0, vec![detail(20, 300.0)]),
            comparison(2, 100.0, vec![detail(20, 100.0)]),
            comparison(3, 200.0, vec![detail(20, 200.0)]),
        ],
    );
    let service = service(gateway);
    service.load_realms().await.expect("realms");
    service.add_item(20);
    service.compare_selected().await.expect("comparison");

    let cards = service.store().read(|st| st.item_cards());
    let ItemCardBody::Ranked(rows) = &cards[0].body else {
        panic!("expected ranked rows");
    };
    let tags: Vec<(RealmId, bool, bool)> = rows
        .iter()
        .map(|row| (row.entry.realm.id, row.is_highest, row.is_lowest))
        .collect();
    assert_eq!(tags, vec![(1, true, false), (3, false, false), (2, false, true)]);
}
