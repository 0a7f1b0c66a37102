//! Public interface types for the portal core.
//!
//! This file is the source of truth for the types shared between the core and
//! its hosting presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// ENUMS
// ─────────────────────────────────────────────────────────────────────────────

/// The collection a record was indexed from. Closed set, extensible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    AccessHistory,
    UserProfile,
    Notification,
    SecurityLog,
}

impl RecordType {
    /// Stable wire label, matching the stored collection names.
    pub fn label(&self) -> &'static str {
        match self {
            RecordType::AccessHistory => "access_history",
            RecordType::UserProfile => "user_profile",
            RecordType::Notification => "notification",
            RecordType::SecurityLog => "security_log",
        }
    }

    /// Human-readable name for result lists.
    pub fn display_name(&self) -> &'static str {
        match self {
            RecordType::AccessHistory => "Access History",
            RecordType::UserProfile => "User Profile",
            RecordType::Notification => "Notification",
            RecordType::SecurityLog => "Security Log",
        }
    }
}

/// Outcome status of a single access attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessStatus {
    Success,
    Failed,
}

impl AccessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessStatus::Success => "success",
            AccessStatus::Failed => "failed",
        }
    }
}

/// Capture lifecycle state. One in-flight capture at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Processing,
}

/// Icon category for dashboard activity entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityIcon {
    DoorOpen,
    Cross,
    UserPlus,
    Info,
}

/// Visual severity of a dashboard activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Success,
    Danger,
    Info,
}

// ─────────────────────────────────────────────────────────────────────────────
// RECORDS (Structs)
// ─────────────────────────────────────────────────────────────────────────────

/// One entry in the dashboard recent-activity feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub title: String,
    pub time: String,
    pub kind: ActivityKind,
    pub icon: ActivityIcon,
}

/// Access-attempt counts for the current calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonthlyStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// A ranked search result. Transient: rebuilt on every query.
///
/// `score` is a non-negative integer ranking, not a calibrated percentage,
/// even though the presentation layer historically labeled it one.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub record_type: RecordType,
    pub record: crate::models::Record,
    pub score: u32,
}

/// Structured filter predicates for advanced search.
///
/// Mutable configuration updated by a filter-form submission; `reset` restores
/// the match-everything defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    /// `"all"` or an exact status value.
    pub status: String,
    /// Case-insensitive substring over the record's location field.
    pub location: String,
    /// Case-insensitive substring over the record's full search text.
    pub user: String,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            date_from: None,
            date_to: None,
            status: "all".to_string(),
            location: String::new(),
            user: String::new(),
        }
    }
}

impl FilterCriteria {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Result surfaced to the user after a capture trigger.
///
/// Precondition failures (`CameraError`, `ProfileRequired`) record no attempt;
/// `Granted`/`Denied` each correspond to exactly one appended history entry.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessOutcome {
    Granted { user_name: String, confidence: u8 },
    Denied { reason: String, confidence: u8 },
    CameraError,
    ProfileRequired,
}

impl AccessOutcome {
    pub fn title(&self) -> &'static str {
        match self {
            AccessOutcome::Granted { .. } => "Access Granted",
            AccessOutcome::Denied { .. } => "Access Denied",
            AccessOutcome::CameraError => "Camera Error",
            AccessOutcome::ProfileRequired => "Profile Required",
        }
    }

    pub fn message(&self) -> String {
        match self {
            AccessOutcome::Granted { user_name, .. } => format!("Welcome, {user_name}!"),
            AccessOutcome::Denied { reason, .. } => reason.clone(),
            AccessOutcome::CameraError => {
                "Unable to access camera. Please check permissions.".to_string()
            }
            AccessOutcome::ProfileRequired => {
                "Please complete your profile first before accessing the door.".to_string()
            }
        }
    }

    /// Whether this outcome produced a history entry.
    pub fn recorded(&self) -> bool {
        matches!(
            self,
            AccessOutcome::Granted { .. } | AccessOutcome::Denied { .. }
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CLOCK
// ─────────────────────────────────────────────────────────────────────────────

/// Injected time source so aggregates and timestamps are testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a fixed instant, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ERRORS
// ─────────────────────────────────────────────────────────────────────────────

/// Error type for portal core operations.
///
/// Recognition failure is a normal `AccessOutcome`, never an error. Malformed
/// stored JSON decodes fail-soft to empty collections rather than surfacing
/// here.
#[derive(Debug, Error)]
pub enum WardenError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for WardenError {
    fn from(e: serde_json::Error) -> Self {
        WardenError::Storage(e.to_string())
    }
}
