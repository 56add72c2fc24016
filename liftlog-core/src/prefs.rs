use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::config::APP_DIR_NAME;
use crate::error::{LiftLogError, Result};
use crate::service::User;
use crate::timer::RestDuration;

pub const REST_DURATION_KEY: &str = "rest_duration_seconds";
pub const SESSION_USER_KEY: &str = "session_user";

/// Device-local key/value preferences persisted as `preferences.json`.
///
/// Values are process-wide: they do not depend on which user is logged in.
/// The file is loaded once on open and rewritten atomically on every change.
pub struct PreferenceStore {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl PreferenceStore {
    /// Default location: `<data_dir>/liftlog/preferences.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join(APP_DIR_NAME).join("preferences.json"))
    }

    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable or corrupt one is logged and treated as empty.
    pub fn open(path: &Path) -> Self {
        let values = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Map<String, Value>>(&content) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Ignoring corrupt preferences at {:?}: {}", path, e);
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                warn!("Failed to read preferences at {:?}: {}", path, e);
                Map::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Values change only once they are on disk.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        info!("Setting preference: {} = {}", key, value);
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        let mut updated = values.clone();
        updated.insert(key.to_string(), value);
        self.write(&updated)?;
        *values = updated;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        if values.contains_key(key) {
            let mut updated = values.clone();
            updated.remove(key);
            self.write(&updated)?;
            *values = updated;
            info!("Removed preference: {}", key);
        }
        Ok(())
    }

    /// Temp file in the same directory, then rename over the target.
    fn write(&self, values: &Map<String, Value>) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            LiftLogError::Preference(format!("No parent directory for {:?}", self.path))
        })?;
        std::fs::create_dir_all(parent)
            .map_err(|e| LiftLogError::Preference(format!("Failed to create {:?}: {}", parent, e)))?;

        let json = serde_json::to_string_pretty(values)
            .map_err(|e| LiftLogError::Preference(format!("Failed to serialize: {}", e)))?;

        let mut temp = NamedTempFile::new_in(parent)
            .map_err(|e| LiftLogError::Preference(format!("Failed to create temp file: {}", e)))?;
        temp.write_all(json.as_bytes())
            .and_then(|_| temp.flush())
            .map_err(|e| LiftLogError::Preference(format!("Failed to write preferences: {}", e)))?;
        temp.persist(&self.path).map_err(|e| {
            LiftLogError::Preference(format!("Failed to replace {:?}: {}", self.path, e))
        })?;
        Ok(())
    }

    /// The saved rest duration, clamped; the default when unset or invalid.
    pub fn rest_duration(&self) -> RestDuration {
        match self.get(REST_DURATION_KEY) {
            Some(value) => match value.as_i64() {
                Some(seconds) => RestDuration::clamped(seconds),
                None => {
                    warn!("Invalid {} preference: {}", REST_DURATION_KEY, value);
                    RestDuration::default()
                }
            },
            None => RestDuration::default(),
        }
    }

    pub fn set_rest_duration(&self, duration: RestDuration) -> Result<()> {
        self.set(REST_DURATION_KEY, Value::from(duration.seconds()))
    }

    /// The remembered logged-in user, if any.
    pub fn session_user(&self) -> Option<User> {
        self.get(SESSION_USER_KEY)
            .and_then(|v| serde_json::from_value(v).ok())
    }

    pub fn set_session_user(&self, user: &User) -> Result<()> {
        let value = serde_json::to_value(user)
            .map_err(|e| LiftLogError::Preference(format!("Failed to serialize user: {}", e)))?;
        self.set(SESSION_USER_KEY, value)
    }

    pub fn clear_session_user(&self) -> Result<()> {
        self.remove(SESSION_USER_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (PreferenceStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = PreferenceStore::open(&dir.path().join("prefs").join("preferences.json"));
        (store, dir)
    }

    #[test]
    fn test_rest_duration_defaults_to_ninety() {
        let (store, _dir) = create_test_store();
        assert_eq!(store.rest_duration().seconds(), 90);
    }

    #[test]
    fn test_rest_duration_survives_reopen() {
        let (store, _dir) = create_test_store();
        store.set_rest_duration(RestDuration::clamped(120)).unwrap();

        let reopened = PreferenceStore::open(store.path());
        assert_eq!(reopened.rest_duration().seconds(), 120);
    }

    #[test]
    fn test_out_of_range_saved_value_is_clamped_on_load() {
        let (store, _dir) = create_test_store();
        store.set(REST_DURATION_KEY, Value::from(5000)).unwrap();
        assert_eq!(store.rest_duration().seconds(), 600);

        store.set(REST_DURATION_KEY, Value::from("ninety")).unwrap();
        assert_eq!(store.rest_duration().seconds(), 90);
    }

    #[test]
    fn test_corrupt_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = PreferenceStore::open(&path);
        assert!(store.get(REST_DURATION_KEY).is_none());

        // Writing replaces the corrupt file
        store.set_rest_duration(RestDuration::clamped(60)).unwrap();
        assert_eq!(PreferenceStore::open(&path).rest_duration().seconds(), 60);
    }

    #[test]
    fn test_session_user_round_trip_and_clear() {
        let (store, _dir) = create_test_store();
        assert!(store.session_user().is_none());

        let user = User {
            id: "u-1".to_string(),
            name: "Alex".to_string(),
        };
        store.set_session_user(&user).unwrap();
        assert_eq!(PreferenceStore::open(store.path()).session_user(), Some(user));

        store.clear_session_user().unwrap();
        assert!(PreferenceStore::open(store.path()).session_user().is_none());
    }

    #[test]
    fn test_session_user_independent_of_rest_duration() {
        let (store, _dir) = create_test_store();
        store.set_rest_duration(RestDuration::clamped(180)).unwrap();
        store
            .set_session_user(&User {
                id: "u-2".to_string(),
                name: "Sam".to_string(),
            })
            .unwrap();
        store.clear_session_user().unwrap();

        assert_eq!(store.rest_duration().seconds(), 180);
    }

    #[test]
    fn test_failed_write_keeps_previous_value() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let store = PreferenceStore::open(&blocker.join("preferences.json"));

        let err = store.set_rest_duration(RestDuration::clamped(120)).unwrap_err();
        assert!(matches!(err, LiftLogError::Preference(_)));
        assert_eq!(store.rest_duration().seconds(), 90);
    }
}
