//! Report envelopes for the export menu.
//!
//! The core prepares a format-independent document (title, headers, rows,
//! metadata) per dataset; hosts hand it to their own PDF/Excel/CSV writer.
//! Preparation is all-or-nothing: an unknown format name is rejected before
//! any rows are built.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::interface::{AccessStatus, Clock, WardenError};
use crate::models::{NotificationKind, SecurityEvent, UserProfile};
use crate::store::{self, collections, RecordStore};

pub const SYSTEM_NAME: &str = "IoT Door Access System";
pub const SYSTEM_VERSION: &str = "1.0.0";

/// Which collection a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportDataset {
    History,
    SecurityLog,
    Profile,
    Notifications,
}

impl ExportDataset {
    pub fn title(&self) -> &'static str {
        match self {
            ExportDataset::History => "Access History Report",
            ExportDataset::SecurityLog => "Security Log Report",
            ExportDataset::Profile => "User Profile Report",
            ExportDataset::Notifications => "Notifications Report",
        }
    }

    /// Slug used in generated filenames.
    pub fn slug(&self) -> &'static str {
        match self {
            ExportDataset::History => "history",
            ExportDataset::SecurityLog => "security",
            ExportDataset::Profile => "profile",
            ExportDataset::Notifications => "notifications",
        }
    }

    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            ExportDataset::History => &[
                "Date", "Time", "Status", "Location", "Confidence", "User", "Details",
            ],
            ExportDataset::SecurityLog => &[
                "Timestamp", "Event Type", "User", "IP Address", "Details", "Severity",
            ],
            ExportDataset::Profile => &["Field", "Value"],
            ExportDataset::Notifications => &["Date", "Title", "Message", "Status", "Type"],
        }
    }
}

/// Output formats the hosting layer knows how to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Excel,
    Csv,
}

impl ExportFormat {
    /// Parse a format name from the export menu. Unknown names are rejected
    /// up front so no partial document is ever produced.
    pub fn parse(name: &str) -> Result<Self, WardenError> {
        match name.trim().to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "excel" => Ok(ExportFormat::Excel),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(WardenError::UnsupportedOperation(format!(
                "export format {other:?}"
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Provenance block attached to every document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportMetadata {
    pub generated_by: String,
    pub generated_at: DateTime<Utc>,
    pub system: &'static str,
    pub version: &'static str,
}

/// A fully prepared, format-independent report.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub metadata: ExportMetadata,
}

/// Build the document for one dataset from the store's current contents.
pub fn prepare_export(
    dataset: ExportDataset,
    store: &dyn RecordStore,
    clock: &dyn Clock,
) -> ExportDocument {
    let rows = match dataset {
        ExportDataset::History => history_rows(&store::load_history(store)),
        ExportDataset::SecurityLog => {
            security_rows(&store::load_collection(store, collections::SECURITY_LOG))
        }
        ExportDataset::Profile => store::load_session(store)
            .user
            .map(|u| profile_rows(&u))
            .unwrap_or_default(),
        ExportDataset::Notifications => {
            notification_rows(&store::load_collection(store, collections::NOTIFICATIONS))
        }
    };
    debug!(dataset = dataset.slug(), rows = rows.len(), "export prepared");

    let generated_by = store::load_session(store)
        .user
        .map(|u| u.full_name())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Unknown User".to_string());

    ExportDocument {
        title: dataset.title().to_string(),
        headers: dataset.headers().iter().map(|h| h.to_string()).collect(),
        rows,
        metadata: ExportMetadata {
            generated_by,
            generated_at: clock.now(),
            system: SYSTEM_NAME,
            version: SYSTEM_VERSION,
        },
    }
}

/// Suggested download filename, e.g.
/// `door_access_history_2026-03-14_12-00-00.csv`.
pub fn export_filename(
    dataset: ExportDataset,
    format: ExportFormat,
    clock: &dyn Clock,
) -> String {
    format!(
        "door_access_{}_{}.{}",
        dataset.slug(),
        clock.now().format("%Y-%m-%d_%H-%M-%S"),
        format.extension()
    )
}

/// History rows keep the attempt order as stored, most-recent-first.
fn history_rows(history: &[crate::models::AccessAttempt]) -> Vec<Vec<String>> {
    history
        .iter()
        .map(|a| {
            vec![
                a.timestamp.format("%b %-d, %Y").to_string(),
                a.timestamp.format("%I:%M:%S %p").to_string(),
                match a.status {
                    AccessStatus::Success => "Success".to_string(),
                    AccessStatus::Failed => "Failed".to_string(),
                },
                non_empty_or(&a.location, "Unknown"),
                if a.confidence > 0 {
                    format!("{}%", a.confidence)
                } else {
                    "N/A".to_string()
                },
                a.user_name.clone().unwrap_or_else(|| "Unknown".to_string()),
                a.reason
                    .clone()
                    .unwrap_or_else(|| "Access attempt".to_string()),
            ]
        })
        .collect()
}

fn security_rows(log: &[SecurityEvent]) -> Vec<Vec<String>> {
    log.iter()
        .map(|e| {
            vec![
                e.timestamp.format("%b %-d, %Y, %I:%M:%S %p").to_string(),
                non_empty_or(&e.event_type, "Unknown"),
                e.email.clone().unwrap_or_else(|| "Unknown".to_string()),
                e.ip_address
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
                e.reason
                    .as_ref()
                    .map(|r| format!("Reason: {r}"))
                    .unwrap_or_else(|| "Standard security event".to_string()),
                e.severity.clone().unwrap_or_else(|| "Normal".to_string()),
            ]
        })
        .collect()
}

/// Profile reports are field/value pairs rather than a record table.
fn profile_rows(profile: &UserProfile) -> Vec<Vec<String>> {
    vec![
        vec!["Full Name".to_string(), profile.full_name()],
        vec![
            "Email".to_string(),
            non_empty_or(&profile.email, "Not provided"),
        ],
        vec![
            "Phone".to_string(),
            non_empty_or(&profile.phone, "Not provided"),
        ],
        vec![
            "Department".to_string(),
            non_empty_or(&profile.department, "Not provided"),
        ],
        vec![
            "Employee ID".to_string(),
            non_empty_or(&profile.employee_id, "Not assigned"),
        ],
        vec![
            "Status".to_string(),
            non_empty_or(&profile.status, "Active"),
        ],
    ]
}

fn notification_rows(notifications: &[crate::models::Notification]) -> Vec<Vec<String>> {
    notifications
        .iter()
        .map(|n| {
            vec![
                non_empty_or(&n.time, "Unknown"),
                non_empty_or(&n.title, "No title"),
                non_empty_or(&n.message, "No message"),
                if n.read { "Read" } else { "Unread" }.to_string(),
                kind_label(n.kind).to_string(),
            ]
        })
        .collect()
}

fn kind_label(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Access => "Access",
        NotificationKind::Security => "Security",
        NotificationKind::System => "System",
        NotificationKind::Info => "General",
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::FixedClock;
    use crate::models::{AccessAttempt, Notification, Session};
    use crate::store::{append_attempt, save_collection, save_session, MemoryStore};
    use chrono::TimeZone;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap())
    }

    fn store_with_session() -> MemoryStore {
        let store = MemoryStore::new();
        save_session(
            &store,
            &Session {
                user: Some(UserProfile {
                    id: "u-1".to_string(),
                    first_name: "Ada".to_string(),
                    last_name: "Otieno".to_string(),
                    email: "ada@example.com".to_string(),
                    ..UserProfile::default()
                }),
            },
        )
        .unwrap();
        store
    }

    #[test]
    fn test_parse_format_accepts_known_names() {
        assert_eq!(ExportFormat::parse("pdf").unwrap(), ExportFormat::Pdf);
        assert_eq!(ExportFormat::parse(" Excel ").unwrap(), ExportFormat::Excel);
        assert_eq!(ExportFormat::parse("CSV").unwrap(), ExportFormat::Csv);
    }

    #[test]
    fn test_parse_format_rejects_unknown() {
        let err = ExportFormat::parse("docx").unwrap_err();
        assert!(matches!(err, WardenError::UnsupportedOperation(_)));
    }

    #[test]
    fn test_history_document_columns() {
        let store = store_with_session();
        append_attempt(
            &store,
            AccessAttempt {
                timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
                status: AccessStatus::Success,
                location: "Main Entrance".to_string(),
                confidence: 92,
                user_name: Some("Ada Otieno".to_string()),
                reason: None,
            },
        )
        .unwrap();

        let doc = prepare_export(ExportDataset::History, &store, &clock());
        assert_eq!(doc.title, "Access History Report");
        assert_eq!(
            doc.headers,
            vec!["Date", "Time", "Status", "Location", "Confidence", "User", "Details"]
        );
        assert_eq!(doc.rows.len(), 1);
        let row = &doc.rows[0];
        assert_eq!(row[0], "Mar 14, 2026");
        assert_eq!(row[2], "Success");
        assert_eq!(row[3], "Main Entrance");
        assert_eq!(row[4], "92%");
        assert_eq!(row[5], "Ada Otieno");
        assert_eq!(row[6], "Access attempt");
    }

    #[test]
    fn test_history_row_fallbacks() {
        let store = MemoryStore::new();
        append_attempt(
            &store,
            AccessAttempt {
                timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
                status: AccessStatus::Failed,
                location: String::new(),
                confidence: 0,
                user_name: None,
                reason: Some("Face not recognized in database".to_string()),
            },
        )
        .unwrap();

        let doc = prepare_export(ExportDataset::History, &store, &clock());
        let row = &doc.rows[0];
        assert_eq!(row[2], "Failed");
        assert_eq!(row[3], "Unknown");
        assert_eq!(row[4], "N/A");
        assert_eq!(row[5], "Unknown");
        assert_eq!(row[6], "Face not recognized in database");
    }

    #[test]
    fn test_security_document_columns() {
        let store = MemoryStore::new();
        save_collection(
            &store,
            collections::SECURITY_LOG,
            &[SecurityEvent {
                event_type: "failed_login".to_string(),
                timestamp: Utc.with_ymd_and_hms(2026, 3, 13, 17, 0, 0).unwrap(),
                email: Some("ada@example.com".to_string()),
                ip_address: None,
                severity: Some("High".to_string()),
                reason: Some("Too many attempts".to_string()),
            }],
        )
        .unwrap();

        let doc = prepare_export(ExportDataset::SecurityLog, &store, &clock());
        assert_eq!(
            doc.headers,
            vec!["Timestamp", "Event Type", "User", "IP Address", "Details", "Severity"]
        );
        let row = &doc.rows[0];
        assert_eq!(row[1], "failed_login");
        assert_eq!(row[2], "ada@example.com");
        assert_eq!(row[3], "Unknown");
        assert_eq!(row[4], "Reason: Too many attempts");
        assert_eq!(row[5], "High");
    }

    #[test]
    fn test_profile_document_field_value_pairs() {
        let store = store_with_session();
        let doc = prepare_export(ExportDataset::Profile, &store, &clock());
        assert_eq!(doc.headers, vec!["Field", "Value"]);
        assert_eq!(doc.rows[0], vec!["Full Name", "Ada Otieno"]);
        assert_eq!(doc.rows[1], vec!["Email", "ada@example.com"]);
        assert_eq!(doc.rows[2], vec!["Phone", "Not provided"]);
        assert_eq!(doc.rows[4], vec!["Employee ID", "Not assigned"]);
        assert_eq!(doc.rows[5], vec!["Status", "Active"]);
    }

    #[test]
    fn test_profile_document_empty_without_session() {
        let store = MemoryStore::new();
        let doc = prepare_export(ExportDataset::Profile, &store, &clock());
        assert!(doc.rows.is_empty());
        assert_eq!(doc.metadata.generated_by, "Unknown User");
    }

    #[test]
    fn test_notifications_document() {
        let store = MemoryStore::new();
        save_collection(
            &store,
            collections::NOTIFICATIONS,
            &[Notification {
                id: 1,
                title: "Welcome".to_string(),
                message: String::new(),
                time: "Just now".to_string(),
                read: false,
                kind: NotificationKind::Info,
            }],
        )
        .unwrap();

        let doc = prepare_export(ExportDataset::Notifications, &store, &clock());
        assert_eq!(
            doc.rows[0],
            vec!["Just now", "Welcome", "No message", "Unread", "General"]
        );
    }

    #[test]
    fn test_metadata_provenance() {
        let store = store_with_session();
        let doc = prepare_export(ExportDataset::History, &store, &clock());
        assert_eq!(doc.metadata.generated_by, "Ada Otieno");
        assert_eq!(doc.metadata.generated_at, clock().0);
        assert_eq!(doc.metadata.system, SYSTEM_NAME);
        assert_eq!(doc.metadata.version, SYSTEM_VERSION);
    }

    #[test]
    fn test_export_filename() {
        let name = export_filename(ExportDataset::History, ExportFormat::Csv, &clock());
        assert_eq!(name, "door_access_history_2026-03-14_12-00-00.csv");
        let name = export_filename(ExportDataset::Profile, ExportFormat::Excel, &clock());
        assert_eq!(name, "door_access_profile_2026-03-14_12-00-00.xlsx");
    }
}
