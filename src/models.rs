//! Stored record shapes for the portal collections.
//!
//! Every record is a concrete structured type; the `Record` tagged union
//! replaces the duck-typed shapes the portal historically indexed. Serde
//! renames keep the stored JSON compatible with the original collection
//! blobs (camelCase keys).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interface::{AccessStatus, RecordType};

/// One simulated door-access event. Created per capture, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessAttempt {
    pub timestamp: DateTime<Utc>,
    pub status: AccessStatus,
    pub location: String,
    /// Recognition confidence in [0, 100].
    pub confidence: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Registered user profile, as stored in the session collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub employee_id: String,
    pub status: String,
}

impl UserProfile {
    /// First and last name joined; empty when the profile is incomplete.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Session blob stored under the `user_session` collection key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub user: Option<UserProfile>,
}

/// Category of a portal notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Access,
    Security,
    System,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub title: String,
    pub message: String,
    /// Display time text, e.g. "Just now" or "1 hour ago".
    pub time: String,
    #[serde(default)]
    pub read: bool,
    pub kind: NotificationKind,
}

/// One entry of the security log collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Email notification preferences, stored under `email_settings`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailSettings {
    pub email: String,
    pub access_notifications: bool,
    pub security_alerts: bool,
    pub system_updates: bool,
}

/// Current door state, stored under `door_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorStatus {
    pub locked: bool,
    pub last_changed: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// TAGGED UNION
// ─────────────────────────────────────────────────────────────────────────────

/// Any record the search index can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    AccessHistory(AccessAttempt),
    UserProfile(UserProfile),
    Notification(Notification),
    SecurityLog(SecurityEvent),
}

impl Record {
    pub fn record_type(&self) -> RecordType {
        match self {
            Record::AccessHistory(_) => RecordType::AccessHistory,
            Record::UserProfile(_) => RecordType::UserProfile,
            Record::Notification(_) => RecordType::Notification,
            Record::SecurityLog(_) => RecordType::SecurityLog,
        }
    }

    /// The record's own identifier, when it carries one.
    pub fn record_id(&self) -> Option<String> {
        match self {
            Record::AccessHistory(_) => None,
            Record::UserProfile(p) if !p.id.is_empty() => Some(p.id.clone()),
            Record::UserProfile(_) => None,
            Record::Notification(n) => Some(n.id.to_string()),
            Record::SecurityLog(_) => None,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Record::AccessHistory(a) => Some(a.timestamp),
            Record::SecurityLog(e) => Some(e.timestamp),
            Record::UserProfile(_) | Record::Notification(_) => None,
        }
    }

    pub fn status(&self) -> Option<&str> {
        match self {
            Record::AccessHistory(a) => Some(a.status.as_str()),
            Record::UserProfile(p) if !p.status.is_empty() => Some(&p.status),
            _ => None,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Record::AccessHistory(a) => Some(&a.location),
            _ => None,
        }
    }

    /// Concatenation of the record's scalar field values, in declaration
    /// order, separated by single spaces. Nested values and flags are not
    /// included. Casing is preserved; the indexer lowercases.
    pub fn search_text(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        match self {
            Record::AccessHistory(a) => {
                parts.push(a.timestamp.to_rfc3339());
                parts.push(a.status.as_str().to_string());
                parts.push(a.location.clone());
                parts.push(a.confidence.to_string());
                if let Some(name) = &a.user_name {
                    parts.push(name.clone());
                }
                if let Some(reason) = &a.reason {
                    parts.push(reason.clone());
                }
            }
            Record::UserProfile(p) => {
                parts.push(p.id.clone());
                parts.push(p.first_name.clone());
                parts.push(p.last_name.clone());
                parts.push(p.email.clone());
                parts.push(p.phone.clone());
                parts.push(p.department.clone());
                parts.push(p.employee_id.clone());
                parts.push(p.status.clone());
            }
            Record::Notification(n) => {
                parts.push(n.id.to_string());
                parts.push(n.title.clone());
                parts.push(n.message.clone());
                parts.push(n.time.clone());
            }
            Record::SecurityLog(e) => {
                parts.push(e.event_type.clone());
                parts.push(e.timestamp.to_rfc3339());
                if let Some(email) = &e.email {
                    parts.push(email.clone());
                }
                if let Some(ip) = &e.ip_address {
                    parts.push(ip.clone());
                }
                if let Some(severity) = &e.severity {
                    parts.push(severity.clone());
                }
                if let Some(reason) = &e.reason {
                    parts.push(reason.clone());
                }
            }
        }
        parts.retain(|p| !p.trim().is_empty());
        parts.join(" ").trim().to_string()
    }

    /// Title text for a search result row.
    pub fn result_title(&self) -> String {
        match self {
            Record::AccessHistory(a) => match a.status {
                AccessStatus::Success => "Access Granted".to_string(),
                AccessStatus::Failed => "Access Denied".to_string(),
            },
            Record::UserProfile(p) => {
                format!("User Profile: {} {}", p.first_name, p.last_name)
            }
            Record::Notification(n) if !n.title.is_empty() => n.title.clone(),
            Record::Notification(_) => "Notification".to_string(),
            Record::SecurityLog(e) => format!("Security Event: {}", e.event_type),
        }
    }
}
