//! Thin asynchronous client for the realm price API.
//!
//! - Implements [`MarketGateway`] over `reqwest` with a bounded timeout.
//! - Keeps realm lists and item classes in an in-memory TTL cache with stale
//!   fallbacks when a refresh fails.
//! - Decodes every payload leniently: unknown shapes are dropped per entry.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, SystemTime},
};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{OffsetDateTime, PrimitiveDateTime};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::domain::{
    Group, GroupDetail, Item, ItemClass, ItemDetail, ItemId, ItemMetric, ItemPage,
    ItemPriceDetail, ItemSubclass, PopulationType, PriceMetrics, Realm, RealmComparison, RealmId,
    TimeRange,
};
use crate::infra::gateway::{GatewayError, ItemQuery, MarketGateway, FALLBACK_ERROR_MESSAGE};
use crate::util::version::user_agent;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Cached,
    Stale,
}

#[derive(Default)]
struct ApiCache {
    realms: HashMap<Option<String>, Cached<Vec<Realm>>>,
    item_classes: Option<Cached<Vec<ItemClass>>>,
}

impl ApiCache {
    fn clear(&mut self) {
        self.realms.clear();
        self.item_classes = None;
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    cache: Arc<Mutex<ApiCache>>,
    ttl: Duration,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, GatewayError> {
        let base_url = Url::parse(&config.api_url)?;
        let http = Client::builder()
            .user_agent(user_agent())
            .timeout(config.request_timeout)
            .build()?;
        info!(base_url = %base_url, timeout = ?config.request_timeout, "price API client ready");
        Ok(Self {
            http,
            base_url,
            cache: Arc::new(Mutex::new(ApiCache::default())),
            ttl: config.cache_ttl,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    async fn fetch_realms(&self, category: Option<&str>) -> Result<Vec<Realm>, GatewayError> {
        let mut url = self.url("realms")?;
        if let Some(category) = category {
            url.query_pairs_mut().append_pair("realm_category", category);
        }
        let raw: Vec<serde_json::Value> = self.read_json(self.http.get(url)).await?;
        Ok(parse_entries::<RealmDto, Realm>(raw))
    }

    async fn fetch_item_classes(&self) -> Result<Vec<ItemClass>, GatewayError> {
        let url = self.url("item-classes")?;
        let raw: Vec<serde_json::Value> = self.read_json(self.http.get(url)).await?;
        Ok(parse_entries::<ItemClassDto, ItemClass>(raw))
    }

    async fn read_json<T>(&self, builder: RequestBuilder) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
    {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            warn!(status = status.as_u16(), %message, "price API returned an error");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|err| GatewayError::Decode(err.to_string()))
    }

    fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }
}

#[async_trait]
impl MarketGateway for ApiClient {
    async fn list_realms(&self, category: Option<&str>) -> Result<Vec<Realm>, GatewayError> {
        let key = category.map(str::to_string);
        {
            let cache = self.cache.lock().await;
            if let Some(entry) = cache.realms.get(&key).and_then(|e| e.if_fresh(self.ttl)) {
                debug!(category = ?key, status = ?entry.status, "serving cached realms");
                return Ok(entry.data);
            }
        }

        match self.fetch_realms(category).await {
            Ok(realms) => {
                info!(count = realms.len(), category = ?key, "fetched realms");
                let mut cache = self.cache.lock().await;
                cache
                    .realms
                    .insert(key, Cached::new(realms.clone(), SystemTime::now()));
                Ok(realms)
            }
            Err(error) => {
                let cache = self.cache.lock().await;
                if let Some(stale) = cache.realms.get(&key).map(Cached::stale) {
                    warn!(%error, "realm refresh failed; serving stale copy");
                    return Ok(stale.data);
                }
                Err(error)
            }
        }
    }

    async fn list_items(&self, query: &ItemQuery) -> Result<ItemPage, GatewayError> {
        let mut url = self.url("items")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("page", &query.page.to_string())
                .append_pair("page_size", &query.page_size.to_string());
            if let Some(class_name) = &query.class_name {
                pairs.append_pair("item_class_name", class_name);
            }
            if let Some(subclass_name) = &query.subclass_name {
                pairs.append_pair("item_subclass_name", subclass_name);
            }
        }
        let dto: ItemPageDto = self.read_json(self.http.get(url)).await?;
        Ok(dto.into())
    }

    async fn get_item(&self, item_id: ItemId) -> Result<ItemDetail, GatewayError> {
        let url = self.url(&format!("items/{item_id}"))?;
        let dto: ItemDetailDto = self.read_json(self.http.get(url)).await?;
        dto.into_detail()
            .ok_or_else(|| GatewayError::Decode(format!("item {item_id} payload missing id")))
    }

    async fn list_item_classes(&self) -> Result<Vec<ItemClass>, GatewayError> {
        {
            let cache = self.cache.lock().await;
            if let Some(entry) = cache.item_classes.as_ref().and_then(|e| e.if_fresh(self.ttl)) {
                return Ok(entry.data);
            }
        }

        match self.fetch_item_classes().await {
            Ok(classes) => {
                let mut cache = self.cache.lock().await;
                cache.item_classes = Some(Cached::new(classes.clone(), SystemTime::now()));
                Ok(classes)
            }
            Err(error) => {
                let cache = self.cache.lock().await;
                if let Some(stale) = cache.item_classes.as_ref().map(Cached::stale) {
                    warn!(%error, "item class refresh failed; serving stale copy");
                    return Ok(stale.data);
                }
                Err(error)
            }
        }
    }

    async fn list_item_subclasses(&self, class_id: i64) -> Result<Vec<ItemSubclass>, GatewayError> {
        let url = self.url(&format!("item-classes/{class_id}/subclasses"))?;
        let raw: Vec<serde_json::Value> = self.read_json(self.http.get(url)).await?;
        Ok(parse_entries::<ItemSubclassDto, ItemSubclass>(raw))
    }

    async fn list_groups(&self) -> Result<Vec<Group>, GatewayError> {
        let url = self.url("groups")?;
        let raw: Vec<serde_json::Value> = self.read_json(self.http.get(url)).await?;
        Ok(parse_entries::<GroupDto, Group>(raw))
    }

    async fn get_group(&self, group_id: i64) -> Result<GroupDetail, GatewayError> {
        let url = self.url(&format!("groups/{group_id}"))?;
        let dto: GroupDetailDto = self.read_json(self.http.get(url)).await?;
        dto.into_detail()
            .ok_or_else(|| GatewayError::Decode(format!("group {group_id} payload missing id")))
    }

    async fn get_realm_prices(
        &self,
        realm_id: RealmId,
        item_ids: &[ItemId],
        time_range: TimeRange,
    ) -> Result<PriceMetrics, GatewayError> {
        let mut url = self.url(&format!("prices/{realm_id}"))?;
        url.query_pairs_mut()
            .append_pair("items", &join_ids(item_ids))
            .append_pair("time_range", time_range.as_query());
        debug!(%url, "requesting realm prices");
        let dto: PriceMetricsDto = self.read_json(self.http.get(url)).await?;
        Ok(dto.into())
    }

    async fn compare_realms(
        &self,
        realm_ids: &[RealmId],
        item_ids: &[ItemId],
    ) -> Result<Vec<RealmComparison>, GatewayError> {
        let url = self.url("comparison")?;
        let body = ComparisonBody {
            realms: realm_ids,
            items: item_ids,
        };
        let raw: serde_json::Value = self.read_json(self.http.post(url).json(&body)).await?;
        let comparisons = parse_comparisons(raw, item_ids);
        info!(
            realms = comparisons.len(),
            items = item_ids.len(),
            "received realm comparison"
        );
        Ok(comparisons)
    }
}

struct Cached<T> {
    value: T,
    fetched_at: SystemTime,
}

struct CachedPayload<T> {
    data: T,
    status: CacheStatus,
}

impl<T: Clone> Cached<T> {
    fn new(value: T, fetched_at: SystemTime) -> Self {
        Self { value, fetched_at }
    }

    fn if_fresh(&self, ttl: Duration) -> Option<CachedPayload<T>> {
        if self
            .fetched_at
            .elapsed()
            .map(|elapsed| elapsed <= ttl)
            .unwrap_or(false)
        {
            Some(CachedPayload {
                data: self.value.clone(),
                status: CacheStatus::Cached,
            })
        } else {
            None
        }
    }

    fn stale(&self) -> CachedPayload<T> {
        CachedPayload {
            data: self.value.clone(),
            status: CacheStatus::Stale,
        }
    }
}

#[derive(Serialize)]
struct ComparisonBody<'a> {
    realms: &'a [RealmId],
    items: &'a [ItemId],
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Picks the message out of an error body, falling back to a fixed string.
pub fn error_message(body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .message
        .or_else(|| match parsed.detail {
            Some(serde_json::Value::String(detail)) => Some(detail),
            _ => None,
        })
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Decodes each array entry on its own; entries that fail are dropped.
fn parse_entries<D, T>(raw: Vec<serde_json::Value>) -> Vec<T>
where
    D: DeserializeOwned + Into<Option<T>>,
{
    let total = raw.len();
    let parsed: Vec<T> = raw
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<D>(entry).ok())
        .filter_map(|dto: D| Into::<Option<T>>::into(dto))
        .collect();
    if parsed.len() != total {
        debug!(dropped = total - parsed.len(), "dropped malformed entries");
    }
    parsed
}

/// Parses a comparison payload, keeping only details for requested items.
pub fn parse_comparisons(value: serde_json::Value, requested: &[ItemId]) -> Vec<RealmComparison> {
    let entries = match value {
        serde_json::Value::Array(entries) => entries,
        other => {
            warn!(payload = %other, "comparison payload is not an array");
            return Vec::new();
        }
    };

    parse_entries::<RealmComparisonDto, RealmComparison>(entries)
        .into_iter()
        .map(|mut comparison| {
            comparison
                .items
                .retain(|detail| requested.contains(&detail.item_id));
            comparison
        })
        .collect()
}

pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc3339).ok().or_else(|| {
        PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT)
            .ok()
            .map(PrimitiveDateTime::assume_utc)
    })
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[derive(Debug, Deserialize)]
struct RealmDto {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "region", alias = "realm_category")]
    language: Option<String>,
    #[serde(default)]
    population_type: Option<String>,
    #[serde(default)]
    population: Option<serde_json::Value>,
    #[serde(default)]
    item_count: Option<u64>,
    #[serde(default)]
    last_updated: Option<String>,
}

impl From<RealmDto> for Option<Realm> {
    fn from(dto: RealmDto) -> Self {
        let id = dto.id?;
        Some(Realm {
            id,
            name: dto.name.unwrap_or_else(|| format!("Realm {id}")),
            language: dto.language.unwrap_or_else(|| "Unknown".to_string()),
            population_type: dto
                .population_type
                .as_deref()
                .map(PopulationType::from_label)
                .unwrap_or_default(),
            population: dto.population.as_ref().and_then(population_figure),
            item_count: dto.item_count.unwrap_or(0),
            last_updated: dto.last_updated.as_deref().and_then(parse_timestamp),
        })
    }
}

fn population_figure(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(number) => number.as_u64(),
        serde_json::Value::String(text) => text.replace([',', ' '], "").parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct ItemDto {
    #[serde(default)]
    item_id: Option<i64>,
    #[serde(default)]
    item_name: Option<String>,
    #[serde(default)]
    raw_craft_cost: Option<f64>,
    #[serde(default)]
    item_class_name: Option<String>,
    #[serde(default)]
    item_subclass_name: Option<String>,
}

impl From<ItemDto> for Option<Item> {
    fn from(dto: ItemDto) -> Self {
        let id = dto.item_id?;
        Some(Item {
            id,
            name: dto.item_name.unwrap_or_else(|| format!("Item {id}")),
            class_name: dto.item_class_name.unwrap_or_default(),
            subclass_name: dto.item_subclass_name.unwrap_or_default(),
            raw_craft_cost: finite(dto.raw_craft_cost).filter(|cost| *cost >= 0.0),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ItemDetailDto {
    #[serde(flatten)]
    item: ItemDto,
    #[serde(default)]
    item_class_id: Option<i64>,
    #[serde(default)]
    item_subclass_id: Option<i64>,
    #[serde(default)]
    display_subclass_name: Option<String>,
    #[serde(default)]
    groups: Option<Vec<String>>,
}

impl ItemDetailDto {
    fn into_detail(self) -> Option<ItemDetail> {
        let item = Option::<Item>::from(self.item)?;
        Some(ItemDetail {
            item,
            class_id: self.item_class_id.unwrap_or_default(),
            subclass_id: self.item_subclass_id.unwrap_or_default(),
            display_subclass_name: self.display_subclass_name,
            groups: self.groups.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ItemPageDto {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    page_size: Option<u32>,
    #[serde(default)]
    total_items: Option<u64>,
    #[serde(default)]
    total_pages: Option<u32>,
    #[serde(default)]
    items: Option<Vec<serde_json::Value>>,
}

impl From<ItemPageDto> for ItemPage {
    fn from(dto: ItemPageDto) -> Self {
        let items = parse_entries::<ItemDto, Item>(dto.items.unwrap_or_default());
        ItemPage {
            page: dto.page.unwrap_or(1),
            page_size: dto.page_size.unwrap_or(items.len() as u32),
            total_items: dto.total_items.unwrap_or(items.len() as u64),
            total_pages: dto.total_pages.unwrap_or(1),
            items,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ItemClassDto {
    #[serde(default)]
    item_class_id: Option<i64>,
    #[serde(default)]
    item_class_name: Option<String>,
}

impl From<ItemClassDto> for Option<ItemClass> {
    fn from(dto: ItemClassDto) -> Self {
        Some(ItemClass {
            id: dto.item_class_id?,
            name: dto.item_class_name.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ItemSubclassDto {
    #[serde(default)]
    item_subclass_id: Option<i64>,
    #[serde(default)]
    item_subclass_name: Option<String>,
}

impl From<ItemSubclassDto> for Option<ItemSubclass> {
    fn from(dto: ItemSubclassDto) -> Self {
        Some(ItemSubclass {
            id: dto.item_subclass_id?,
            name: dto.item_subclass_name.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GroupDto {
    #[serde(default)]
    group_id: Option<i64>,
    #[serde(default)]
    group_name: Option<String>,
}

impl From<GroupDto> for Option<Group> {
    fn from(dto: GroupDto) -> Self {
        let id = dto.group_id?;
        Some(Group {
            id,
            name: dto.group_name.unwrap_or_else(|| format!("Group {id}")),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GroupDetailDto {
    #[serde(flatten)]
    group: GroupDto,
    #[serde(default)]
    items: Option<Vec<serde_json::Value>>,
}

impl GroupDetailDto {
    fn into_detail(self) -> Option<GroupDetail> {
        let group = Option::<Group>::from(self.group)?;
        Some(GroupDetail {
            group,
            items: parse_entries::<ItemDto, Item>(self.items.unwrap_or_default()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ItemMetricDto {
    #[serde(default)]
    item_id: Option<i64>,
    #[serde(default)]
    current_price: Option<f64>,
    #[serde(default)]
    historical_low: Option<f64>,
    #[serde(default)]
    historical_high: Option<f64>,
}

impl From<ItemMetricDto> for Option<ItemMetric> {
    fn from(dto: ItemMetricDto) -> Self {
        Some(ItemMetric {
            item_id: dto.item_id?,
            current_price: finite(dto.current_price).unwrap_or(0.0),
            historical_low: finite(dto.historical_low).unwrap_or(0.0),
            historical_high: finite(dto.historical_high).unwrap_or(0.0),
        })
    }
}

#[derive(Debug, Deserialize)]
struct PriceMetricsDto {
    #[serde(default)]
    average_price: Option<f64>,
    #[serde(default)]
    price_trend: Option<f64>,
    #[serde(default)]
    item_details: Option<Vec<serde_json::Value>>,
}

impl From<PriceMetricsDto> for PriceMetrics {
    fn from(dto: PriceMetricsDto) -> Self {
        PriceMetrics {
            average_price: finite(dto.average_price).unwrap_or(0.0),
            price_trend: finite(dto.price_trend).unwrap_or(0.0),
            item_details: parse_entries::<ItemMetricDto, ItemMetric>(
                dto.item_details.unwrap_or_default(),
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ItemPriceDetailDto {
    #[serde(default)]
    item_id: Option<i64>,
    #[serde(default)]
    item_name: Option<String>,
    #[serde(default)]
    lowest_price: Option<f64>,
    #[serde(default)]
    highest_price: Option<f64>,
    #[serde(default)]
    quantity: Option<u64>,
    #[serde(default)]
    average_lowest_five: Option<f64>,
    #[serde(default)]
    rating: Option<f64>,
}

impl From<ItemPriceDetailDto> for Option<ItemPriceDetail> {
    fn from(dto: ItemPriceDetailDto) -> Self {
        let item_id = dto.item_id?;
        let average_lowest_five = finite(dto.average_lowest_five)?;
        Some(ItemPriceDetail {
            item_id,
            item_name: dto.item_name.unwrap_or_else(|| format!("Item {item_id}")),
            lowest_price: finite(dto.lowest_price).unwrap_or(average_lowest_five),
            highest_price: finite(dto.highest_price).unwrap_or(average_lowest_five),
            quantity: dto.quantity.unwrap_or(0),
            average_lowest_five,
            rating: finite(dto.rating).unwrap_or(0.0),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RealmComparisonDto {
    #[serde(default)]
    realm_id: Option<i64>,
    #[serde(default)]
    total_value: Option<f64>,
    #[serde(default)]
    value_per_item: Option<f64>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    items: Option<Vec<serde_json::Value>>,
}

impl From<RealmComparisonDto> for Option<RealmComparison> {
    fn from(dto: RealmComparisonDto) -> Self {
        Some(RealmComparison {
            realm_id: dto.realm_id?,
            total_value: finite(dto.total_value),
            value_per_item: finite(dto.value_per_item),
            rating: finite(dto.rating),
            items: parse_entries::<ItemPriceDetailDto, ItemPriceDetail>(
                dto.items.unwrap_or_default(),
            ),
        })
    }
}
