//! Key-value record store and the capped history log.
//!
//! Collections are whole JSON blobs keyed by name. Decoding is fail-soft: a
//! missing or malformed blob reads back as the empty collection, never as an
//! error. `MemoryStore` backs tests and the demo host; real hosts supply
//! their own `RecordStore` over browser storage or disk.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::interface::{Clock, WardenError};
use crate::models::{AccessAttempt, DoorStatus, EmailSettings, Session};

/// Collection keys used by the portal.
pub mod collections {
    pub const ACCESS_HISTORY: &str = "access_history";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const SECURITY_LOG: &str = "security_log";
    pub const REGISTERED_USERS: &str = "registered_users";
    pub const USER_SESSION: &str = "user_session";
    pub const EMAIL_SETTINGS: &str = "email_settings";
    pub const DOOR_STATUS: &str = "door_status";
}

/// Maximum retained history entries; older entries are evicted on append.
pub const HISTORY_CAP: usize = 100;

/// Whole-collection key-value storage. No transactions, no partial updates.
pub trait RecordStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
}

/// In-memory store used by tests and the demo host.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.map.write().insert(key.to_string(), value);
    }
}

/// Decode a collection, falling back to empty on a missing or malformed blob.
pub fn load_collection<T: DeserializeOwned>(store: &dyn RecordStore, key: &str) -> Vec<T> {
    match store.get(key) {
        None => Vec::new(),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!(collection = key, error = %e, "malformed collection blob, treating as empty");
                Vec::new()
            }
        },
    }
}

/// Serialize and store a whole collection.
pub fn save_collection<T: Serialize>(
    store: &dyn RecordStore,
    key: &str,
    items: &[T],
) -> Result<(), WardenError> {
    let raw = serde_json::to_string(items)?;
    store.set(key, raw);
    Ok(())
}

/// Load the session blob, falling back to an empty session.
pub fn load_session(store: &dyn RecordStore) -> Session {
    match store.get(collections::USER_SESSION) {
        None => Session::default(),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "malformed session blob, treating as signed out");
                Session::default()
            }
        },
    }
}

pub fn save_session(store: &dyn RecordStore, session: &Session) -> Result<(), WardenError> {
    let raw = serde_json::to_string(session)?;
    store.set(collections::USER_SESSION, raw);
    Ok(())
}

/// Door state, defaulting to locked-as-of-now when the blob is missing or
/// malformed.
pub fn load_door_status(store: &dyn RecordStore, clock: &dyn Clock) -> DoorStatus {
    let fallback = || DoorStatus {
        locked: true,
        last_changed: clock.now(),
    };
    match store.get(collections::DOOR_STATUS) {
        None => fallback(),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "malformed door status blob, treating as locked");
                fallback()
            }
        },
    }
}

pub fn save_door_status(store: &dyn RecordStore, status: &DoorStatus) -> Result<(), WardenError> {
    let raw = serde_json::to_string(status)?;
    store.set(collections::DOOR_STATUS, raw);
    Ok(())
}

/// Set the door to a known state, stamping the change time.
pub fn set_door_locked(
    store: &dyn RecordStore,
    locked: bool,
    clock: &dyn Clock,
) -> Result<DoorStatus, WardenError> {
    let status = DoorStatus {
        locked,
        last_changed: clock.now(),
    };
    save_door_status(store, &status)?;
    debug!(locked, "door state changed");
    Ok(status)
}

/// Flip the door state, returning the new status.
pub fn toggle_door(store: &dyn RecordStore, clock: &dyn Clock) -> Result<DoorStatus, WardenError> {
    let current = load_door_status(store, clock);
    set_door_locked(store, !current.locked, clock)
}

/// Email notification preferences, defaulting to the empty opt-out settings.
pub fn load_email_settings(store: &dyn RecordStore) -> EmailSettings {
    match store.get(collections::EMAIL_SETTINGS) {
        None => EmailSettings::default(),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "malformed email settings blob, treating as unset");
                EmailSettings::default()
            }
        },
    }
}

pub fn save_email_settings(
    store: &dyn RecordStore,
    settings: &EmailSettings,
) -> Result<(), WardenError> {
    let raw = serde_json::to_string(settings)?;
    store.set(collections::EMAIL_SETTINGS, raw);
    Ok(())
}

/// Access history, most-recent-first.
pub fn load_history(store: &dyn RecordStore) -> Vec<AccessAttempt> {
    load_collection(store, collections::ACCESS_HISTORY)
}

/// Prepend an attempt to the history collection, evicting beyond the cap.
/// Returns the updated history so callers can recompute aggregates without a
/// second read.
pub fn append_attempt(
    store: &dyn RecordStore,
    attempt: AccessAttempt,
) -> Result<Vec<AccessAttempt>, WardenError> {
    let mut history = load_history(store);
    history.insert(0, attempt);
    if history.len() > HISTORY_CAP {
        debug!(evicted = history.len() - HISTORY_CAP, "history cap reached");
        history.truncate(HISTORY_CAP);
    }
    save_collection(store, collections::ACCESS_HISTORY, &history)?;
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::{AccessStatus, FixedClock};
    use crate::models::UserProfile;
    use chrono::{Duration, TimeZone, Utc};

    fn attempt_at(minute: u32) -> AccessAttempt {
        AccessAttempt {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
                + Duration::minutes(minute as i64),
            status: AccessStatus::Success,
            location: "Main Entrance".to_string(),
            confidence: 90,
            user_name: None,
            reason: None,
        }
    }

    #[test]
    fn test_missing_collection_reads_empty() {
        let store = MemoryStore::new();
        let history: Vec<AccessAttempt> = load_collection(&store, collections::ACCESS_HISTORY);
        assert!(history.is_empty());
    }

    #[test]
    fn test_malformed_blob_reads_empty() {
        let store = MemoryStore::new();
        store.set(collections::ACCESS_HISTORY, "{not json".to_string());
        assert!(load_history(&store).is_empty());
    }

    #[test]
    fn test_append_is_most_recent_first() {
        let store = MemoryStore::new();
        append_attempt(&store, attempt_at(0)).unwrap();
        let history = append_attempt(&store, attempt_at(1)).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].timestamp > history[1].timestamp);
    }

    #[test]
    fn test_history_caps_at_100_evicting_oldest() {
        let store = MemoryStore::new();
        for i in 0..101 {
            append_attempt(&store, attempt_at(i)).unwrap();
        }
        let history = load_history(&store);
        assert_eq!(history.len(), HISTORY_CAP);
        // Newest kept at the front, the very first append evicted.
        assert_eq!(history[0].timestamp, attempt_at(100).timestamp);
        assert_eq!(history[99].timestamp, attempt_at(1).timestamp);
    }

    #[test]
    fn test_session_round_trip() {
        let store = MemoryStore::new();
        assert!(load_session(&store).user.is_none());

        let session = Session {
            user: Some(UserProfile {
                id: "u-1".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Otieno".to_string(),
                ..UserProfile::default()
            }),
        };
        save_session(&store, &session).unwrap();
        let loaded = load_session(&store);
        assert_eq!(loaded.user.unwrap().full_name(), "Ada Otieno");
    }

    #[test]
    fn test_malformed_session_reads_signed_out() {
        let store = MemoryStore::new();
        store.set(collections::USER_SESSION, "[]".to_string());
        assert!(load_session(&store).user.is_none());
    }

    #[test]
    fn test_door_defaults_to_locked_as_of_now() {
        let store = MemoryStore::new();
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap());
        let status = load_door_status(&store, &clock);
        assert!(status.locked);
        assert_eq!(status.last_changed, clock.0);

        store.set(collections::DOOR_STATUS, "{broken".to_string());
        assert!(load_door_status(&store, &clock).locked);
    }

    #[test]
    fn test_lock_unlock_stamps_change_time() {
        let store = MemoryStore::new();
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap());

        let status = set_door_locked(&store, false, &clock).unwrap();
        assert!(!status.locked);
        assert_eq!(status.last_changed, clock.0);

        let later = FixedClock(clock.0 + Duration::minutes(5));
        let status = set_door_locked(&store, true, &later).unwrap();
        assert!(status.locked);
        assert_eq!(status.last_changed, later.0);
        assert_eq!(load_door_status(&store, &later), status);
    }

    #[test]
    fn test_toggle_door_flips_persisted_state() {
        let store = MemoryStore::new();
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap());

        // Defaults to locked, so the first toggle unlocks.
        let status = toggle_door(&store, &clock).unwrap();
        assert!(!status.locked);
        let status = toggle_door(&store, &clock).unwrap();
        assert!(status.locked);
    }

    #[test]
    fn test_email_settings_round_trip_and_default() {
        let store = MemoryStore::new();
        assert_eq!(load_email_settings(&store), EmailSettings::default());

        let settings = EmailSettings {
            email: "ada@example.com".to_string(),
            access_notifications: true,
            security_alerts: true,
            system_updates: false,
        };
        save_email_settings(&store, &settings).unwrap();
        assert_eq!(load_email_settings(&store), settings);

        store.set(collections::EMAIL_SETTINGS, "not json".to_string());
        assert_eq!(load_email_settings(&store), EmailSettings::default());
    }
}
