use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde_json::{Error as SerdeError, Map, Value};
use tracing::{debug, warn};

use crate::domain::PersistedSelection;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "RealmPriceScanner";
const APP_NAME: &str = "RealmPriceScanner";
const STATE_FILE: &str = "selection.json";

const KEY_LANGUAGES: &str = "selectedLanguages";
const KEY_REALM_IDS: &str = "selectedRealmIds";
const KEY_ITEM_IDS: &str = "selectedItemIds";
const KEY_TIME_RANGE: &str = "timeRange";

/// Location of the persisted selection snapshot. `None` disables
/// persistence, e.g. when no config directory can be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionFile {
    path: Option<PathBuf>,
}

impl SelectionFile {
    pub fn default_location() -> Self {
        let path = ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
            .map(|dirs| dirs.config_dir().join(STATE_FILE));
        if path.is_none() {
            warn!("no config directory available; selections will not be saved");
        }
        Self { path }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Reads the snapshot. Never fails: a missing or unreadable file yields
    /// the empty snapshot, which leaves the default selection untouched.
    pub fn load(&self) -> PersistedSelection {
        let Some(path) = self.path.as_deref() else {
            return PersistedSelection::default();
        };
        match fs::read_to_string(path) {
            Ok(raw) => decode_snapshot(&raw),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no saved selection yet");
                PersistedSelection::default()
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to read saved selection");
                PersistedSelection::default()
            }
        }
    }

    pub fn save(&self, snapshot: &PersistedSelection) -> Result<(), PersistSaveError> {
        let path = self
            .path
            .as_deref()
            .ok_or(PersistSaveError::StorageUnavailable)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Decodes a snapshot key by key; a malformed key is dropped on its own.
pub fn decode_snapshot(raw: &str) -> PersistedSelection {
    let object: Map<String, Value> = match serde_json::from_str(raw) {
        Ok(Value::Object(object)) => object,
        Ok(_) => {
            warn!("saved selection is not a JSON object; using defaults");
            return PersistedSelection::default();
        }
        Err(err) => {
            warn!(%err, "saved selection is not valid JSON; using defaults");
            return PersistedSelection::default();
        }
    };

    PersistedSelection {
        languages: field(&object, KEY_LANGUAGES),
        realm_ids: field(&object, KEY_REALM_IDS),
        item_ids: field(&object, KEY_ITEM_IDS),
        time_range: field(&object, KEY_TIME_RANGE),
    }
}

fn field<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Option<T> {
    let value = object.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(key, %err, "ignoring malformed saved value");
            None
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistSaveError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeRange;

    #[test]
    fn malformed_key_does_not_poison_the_others() {
        let snapshot = decode_snapshot(
            r#"{
                "selectedLanguages": ["German", 3],
                "selectedRealmIds": [1, 2],
                "selectedItemIds": "oops",
                "timeRange": "30d"
            }"#,
        );
        assert_eq!(snapshot.languages, None);
        assert_eq!(snapshot.realm_ids, Some(vec![1, 2]));
        assert_eq!(snapshot.item_ids, None);
        assert_eq!(snapshot.time_range, Some(TimeRange::ThirtyDays));
    }

    #[test]
    fn unknown_time_range_is_ignored() {
        let snapshot = decode_snapshot(r#"{"timeRange": "90d"}"#);
        assert_eq!(snapshot, PersistedSelection::default());
    }

    #[test]
    fn garbage_falls_back_to_empty_snapshot() {
        assert_eq!(decode_snapshot("not json"), PersistedSelection::default());
        assert_eq!(decode_snapshot("[1,2,3]"), PersistedSelection::default());
    }

    #[test]
    fn disabled_file_loads_defaults_and_refuses_to_save() {
        let file = SelectionFile::disabled();
        assert_eq!(file.load(), PersistedSelection::default());
        assert!(matches!(
            file.save(&PersistedSelection::default()),
            Err(PersistSaveError::StorageUnavailable)
        ));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = SelectionFile::at(dir.path().join("selection.json"));
        assert_eq!(file.load(), PersistedSelection::default());
    }

    #[test]
    fn save_creates_parent_dirs_and_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = SelectionFile::at(dir.path().join("nested").join("selection.json"));
        let snapshot = PersistedSelection {
            languages: Some(vec!["German".into()]),
            realm_ids: Some(vec![3]),
            item_ids: Some(vec![10, 20]),
            time_range: Some(TimeRange::SevenDays),
        };
        file.save(&snapshot).expect("save");
        assert_eq!(file.load(), snapshot);
    }
}
