use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use realm_price_scanner::{
    config::AppConfig,
    domain::TimeRange,
    infra::{ApiClient, GatewayError, MarketGateway, FALLBACK_ERROR_MESSAGE},
};

#[derive(Clone, Debug)]
struct Recorded {
    method: Method,
    /// Path and raw query string, as sent.
    target: String,
    body: String,
}

type Responder = dyn Fn(&Recorded) -> (u16, String) + Send + Sync;

#[derive(Clone)]
struct ServerState {
    delay: Duration,
    requests: Arc<Mutex<Vec<Recorded>>>,
    respond: Arc<Responder>,
}

/// Scripted API served by axum on a random local port.
struct TestServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl TestServer {
    async fn start(respond: impl Fn(&Recorded) -> (u16, String) + Send + Sync + 'static) -> Self {
        Self::start_with_delay(Duration::ZERO, respond).await
    }

    async fn start_with_delay(
        delay: Duration,
        respond: impl Fn(&Recorded) -> (u16, String) + Send + Sync + 'static,
    ) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = ServerState {
            delay,
            requests: Arc::clone(&requests),
            respond: Arc::new(respond),
        };
        let app = Router::new().fallback(scripted).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

        Self { addr, requests }
    }

    fn config(&self) -> AppConfig {
        AppConfig {
            api_url: format!("http://{}/api/v1/", self.addr),
            ..AppConfig::default()
        }
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("lock").clone()
    }
}

async fn scripted(
    State(server): State<ServerState>,
    method: Method,
    uri: Uri,
    body: String,
) -> Response {
    let recorded = Recorded {
        method,
        target: uri
            .path_and_query()
            .map(|target| target.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string()),
        body,
    };
    server.requests.lock().expect("lock").push(recorded.clone());

    if !server.delay.is_zero() {
        tokio::time::sleep(server.delay).await;
    }

    let (status, body) = (server.respond)(&recorded);
    let status = StatusCode::from_u16(status).expect("status code");
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

#[tokio::test]
async fn api_error_uses_detail_message() {
    let server = TestServer::start(|_| (404, r#"{"detail":"No valid realms found"}"#.into())).await;
    let client = ApiClient::new(&server.config()).expect("client");

    let err = client.compare_realms(&[1], &[10]).await.unwrap_err();
    match err {
        GatewayError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "No valid realms found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn api_error_without_message_falls_back() {
    let server = TestServer::start(|_| (502, "<html>bad gateway</html>".into())).await;
    let client = ApiClient::new(&server.config()).expect("client");

    let err = client.list_groups().await.unwrap_err();
    assert_eq!(err.to_string(), FALLBACK_ERROR_MESSAGE);
    assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);
}

#[tokio::test]
async fn comparison_posts_ids_and_keeps_requested_items() {
    let server = TestServer::start(|_| {
        (
            200,
            r#"[
                {"realm_id": 1, "total_value": 500, "items": [
                    {"item_id": 10, "item_name": "Ore", "average_lowest_five": 250, "quantity": 3},
                    {"item_id": 99, "item_name": "Stray", "average_lowest_five": 1}
                ]},
                {"realm_id": 2}
            ]"#
            .into(),
        )
    })
    .await;
    let client = ApiClient::new(&server.config()).expect("client");

    let comparisons = client.compare_realms(&[1, 2], &[10]).await.expect("comparison");
    assert_eq!(comparisons.len(), 2);
    assert_eq!(comparisons[0].items.len(), 1);
    assert_eq!(comparisons[0].items[0].item_id, 10);
    assert_eq!(comparisons[0].items[0].quantity, 3);
    assert!(comparisons[1].items.is_empty());

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].target, "/api/v1/comparison");
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).expect("json body");
    assert_eq!(body, serde_json::json!({"realms": [1, 2], "items": [10]}));
}

#[tokio::test]
async fn realms_are_filtered_and_cached() {
    let server = TestServer::start(|_| {
        (
            200,
            r#"[
                {"id": 1, "name": "Argent Dawn", "region": "English", "population_type": "High", "population": "12,500"},
                {"name": "no id"}
            ]"#
            .into(),
        )
    })
    .await;
    let client = ApiClient::new(&server.config()).expect("client");

    let realms = client.list_realms(Some("English")).await.expect("realms");
    assert_eq!(realms.len(), 1);
    assert_eq!(realms[0].language, "English");
    assert_eq!(realms[0].population, Some(12_500));

    let again = client.list_realms(Some("English")).await.expect("cached realms");
    assert_eq!(again, realms);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].target, "/api/v1/realms?realm_category=English");

    client.clear_cache().await;
    client.list_realms(Some("English")).await.expect("refetched");
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn realm_prices_send_items_and_time_range() {
    let server = TestServer::start(|_| {
        (
            200,
            r#"{"average_price": 1250, "price_trend": -3.5, "item_details": [
                {"item_id": 10, "current_price": 100, "historical_low": 80, "historical_high": 140}
            ]}"#
            .into(),
        )
    })
    .await;
    let client = ApiClient::new(&server.config()).expect("client");

    let metrics = client
        .get_realm_prices(7, &[10, 20], TimeRange::ThirtyDays)
        .await
        .expect("prices");
    assert_eq!(metrics.average_price, 1250.0);
    assert_eq!(metrics.item_details.len(), 1);

    let target = &server.requests()[0].target;
    assert!(target.starts_with("/api/v1/prices/7?"));
    assert!(target.contains("items=10%2C20"));
    assert!(target.contains("time_range=30d"));
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = TestServer::start_with_delay(Duration::from_secs(5), |_| (200, "[]".into())).await;
    let config = AppConfig {
        request_timeout: Duration::from_millis(200),
        ..server.config()
    };
    let client = ApiClient::new(&config).expect("client");

    let err = client.list_groups().await.unwrap_err();
    assert!(matches!(err, GatewayError::Timeout), "got {err:?}");
}

#[tokio::test]
async fn item_detail_and_subclasses_decode() {
    let server = TestServer::start(|req| {
        if req.target == "/api/v1/items/10" {
            (
                200,
                r#"{"item_id": 10, "item_name": "Thorium Ore", "raw_craft_cost": 120,
                    "item_class_id": 7, "item_class_name": "Trade Goods",
                    "item_subclass_id": 3, "item_subclass_name": "Metal & Stone",
                    "groups": ["Ores"]}"#
                    .into(),
            )
        } else {
            (
                200,
                r#"[{"item_subclass_id": 3, "item_subclass_name": "Metal & Stone"}, {"oops": true}]"#.into(),
            )
        }
    })
    .await;
    let client = ApiClient::new(&server.config()).expect("client");

    let detail = client.get_item(10).await.expect("item");
    assert_eq!(detail.item.name, "Thorium Ore");
    assert_eq!(detail.item.raw_craft_cost, Some(120.0));
    assert_eq!(detail.class_id, 7);
    assert_eq!(detail.groups, vec!["Ores".to_string()]);

    let subclasses = client.list_item_subclasses(7).await.expect("subclasses");
    assert_eq!(subclasses.len(), 1);
    assert_eq!(subclasses[0].name, "Metal & Stone");
    assert!(server
        .requests()
        .iter()
        .any(|req| req.target == "/api/v1/item-classes/7/subclasses"));
}
