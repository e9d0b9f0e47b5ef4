//! The user's current picks: languages, realms, items and time window.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entities::{ItemId, Realm, RealmId};

/// Every language except Russian is selected on a fresh start.
pub const DEFAULT_LANGUAGES: [&str; 6] = [
    "English",
    "French",
    "German",
    "Spanish",
    "Portuguese",
    "Italian",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
    #[serde(rename = "all")]
    AllTime,
}

impl TimeRange {
    pub const ALL: [TimeRange; 3] = [
        TimeRange::SevenDays,
        TimeRange::ThirtyDays,
        TimeRange::AllTime,
    ];

    pub fn as_query(&self) -> &'static str {
        match self {
            TimeRange::SevenDays => "7d",
            TimeRange::ThirtyDays => "30d",
            TimeRange::AllTime => "all",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::SevenDays => "7 days",
            TimeRange::ThirtyDays => "30 days",
            TimeRange::AllTime => "All time",
        }
    }
}

/// What a comparison request asks the API for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComparisonRequest {
    pub realm_ids: Vec<RealmId>,
    pub item_ids: Vec<ItemId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    languages: Vec<String>,
    realm_ids: Vec<RealmId>,
    item_ids: Vec<ItemId>,
    time_range: TimeRange,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.iter().map(|lang| lang.to_string()).collect(),
            realm_ids: Vec::new(),
            item_ids: Vec::new(),
            time_range: TimeRange::default(),
        }
    }
}

impl Selection {
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn realm_ids(&self) -> &[RealmId] {
        &self.realm_ids
    }

    /// Selected items in the order they were picked.
    pub fn item_ids(&self) -> &[ItemId] {
        &self.item_ids
    }

    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    pub fn is_item_selected(&self, id: ItemId) -> bool {
        self.item_ids.contains(&id)
    }

    pub fn is_realm_selected(&self, id: RealmId) -> bool {
        self.realm_ids.contains(&id)
    }

    pub fn is_language_selected(&self, language: &str) -> bool {
        self.languages.iter().any(|lang| lang == language)
    }

    pub fn item_count(&self) -> usize {
        self.item_ids.len()
    }

    pub fn add_item(&mut self, id: ItemId) -> bool {
        if self.is_item_selected(id) {
            return false;
        }
        self.item_ids.push(id);
        true
    }

    pub fn remove_item(&mut self, id: ItemId) -> bool {
        let before = self.item_ids.len();
        self.item_ids.retain(|item| *item != id);
        before != self.item_ids.len()
    }

    pub fn toggle_item(&mut self, id: ItemId) {
        if !self.remove_item(id) {
            self.item_ids.push(id);
        }
    }

    pub fn bulk_select_items(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        for id in ids {
            self.add_item(id);
        }
    }

    pub fn clear_items(&mut self) {
        self.item_ids.clear();
    }

    pub fn add_realm(&mut self, id: RealmId) -> bool {
        if self.is_realm_selected(id) {
            return false;
        }
        self.realm_ids.push(id);
        true
    }

    pub fn remove_realm(&mut self, id: RealmId) -> bool {
        let before = self.realm_ids.len();
        self.realm_ids.retain(|realm| *realm != id);
        before != self.realm_ids.len()
    }

    pub fn toggle_realm(&mut self, id: RealmId) {
        if !self.remove_realm(id) {
            self.realm_ids.push(id);
        }
    }

    pub fn set_realm_ids(&mut self, ids: impl IntoIterator<Item = RealmId>) {
        self.realm_ids.clear();
        for id in ids {
            self.add_realm(id);
        }
    }

    /// Replaces the language filter and, in the same step, the realm picks
    /// with every known realm of those languages.
    pub fn set_languages(&mut self, languages: Vec<String>, realms: &[Realm]) {
        let deduped = unique_languages(languages);
        self.realm_ids = realms_for_languages(realms, &deduped);
        self.languages = deduped;
    }

    pub fn toggle_language(&mut self, language: &str, realms: &[Realm]) {
        let mut languages = self.languages.clone();
        if let Some(idx) = languages.iter().position(|lang| lang == language) {
            languages.remove(idx);
        } else {
            languages.push(language.to_string());
        }
        self.set_languages(languages, realms);
    }

    pub fn set_time_range(&mut self, range: TimeRange) {
        self.time_range = range;
    }

    /// `None` until at least one realm and one item are picked.
    pub fn comparison_request(&self) -> Option<ComparisonRequest> {
        if self.realm_ids.is_empty() || self.item_ids.is_empty() {
            return None;
        }
        Some(ComparisonRequest {
            realm_ids: self.realm_ids.clone(),
            item_ids: self.item_ids.clone(),
        })
    }
}

pub fn realms_for_languages(realms: &[Realm], languages: &[String]) -> Vec<RealmId> {
    realms
        .iter()
        .filter(|realm| languages.iter().any(|lang| *lang == realm.language))
        .map(|realm| realm.id)
        .collect()
}

/// Groups realms of the selected languages by language, keeping API order
/// within each group.
pub fn realms_by_language<'a>(
    realms: &'a [Realm],
    languages: &[String],
) -> BTreeMap<String, Vec<&'a Realm>> {
    let mut grouped: BTreeMap<String, Vec<&Realm>> = BTreeMap::new();
    for realm in realms
        .iter()
        .filter(|realm| languages.iter().any(|lang| *lang == realm.language))
    {
        grouped.entry(realm.language.clone()).or_default().push(realm);
    }
    grouped
}

fn unique_languages(languages: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(languages.len());
    for language in languages {
        if !unique.contains(&language) {
            unique.push(language);
        }
    }
    unique
}

/// Snapshot written to disk. Every field is optional so a damaged key only
/// loses itself.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedSelection {
    #[serde(rename = "selectedLanguages", default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(rename = "selectedRealmIds", default, skip_serializing_if = "Option::is_none")]
    pub realm_ids: Option<Vec<RealmId>>,
    #[serde(rename = "selectedItemIds", default, skip_serializing_if = "Option::is_none")]
    pub item_ids: Option<Vec<ItemId>>,
    #[serde(rename = "timeRange", default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
}

impl Selection {
    pub fn apply_persisted(&mut self, persisted: PersistedSelection) {
        if let Some(languages) = persisted.languages {
            self.languages = unique_languages(languages);
        }
        if let Some(realm_ids) = persisted.realm_ids {
            self.set_realm_ids(realm_ids);
        }
        if let Some(item_ids) = persisted.item_ids {
            self.item_ids.clear();
            self.bulk_select_items(item_ids);
        }
        if let Some(range) = persisted.time_range {
            self.time_range = range;
        }
    }

    pub fn to_persisted(&self) -> PersistedSelection {
        PersistedSelection {
            languages: Some(self.languages.clone()),
            realm_ids: Some(self.realm_ids.clone()),
            item_ids: Some(self.item_ids.clone()),
            time_range: Some(self.time_range),
        }
    }
}
