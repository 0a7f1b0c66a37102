//! Dashboard aggregates derived from the access-history collection.
//!
//! Pure functions over the history slice plus "now"; the controller
//! recomputes a snapshot after every history append.

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::interface::{
    AccessStatus, ActivityEntry, ActivityIcon, ActivityKind, Clock, MonthlyStats,
};
use crate::models::AccessAttempt;

/// Placeholder shown before a profile name exists.
pub const COMPLETE_PROFILE_FIRST: &str = "Complete profile first";
/// Placeholder when no successful attempt has been recorded yet.
pub const NO_ACCESS_ATTEMPTS: &str = "No access attempts";

const REVIEW_INTERVAL_DAYS: i64 = 30;
const RECENT_HISTORY_ENTRIES: usize = 2;
const MAX_ACTIVITY_ENTRIES: usize = 3;

/// Everything the dashboard renders, computed in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub monthly: MonthlyStats,
    pub last_access: String,
    pub next_review: String,
    pub recent_activity: Vec<ActivityEntry>,
}

/// Compute the full snapshot for a (possibly unnamed) profile.
pub fn snapshot(
    history: &[AccessAttempt],
    profile_name: Option<&str>,
    clock: &dyn Clock,
) -> DashboardSnapshot {
    let now = clock.now();
    DashboardSnapshot {
        monthly: monthly_stats(history, now),
        last_access: last_access_description(history, profile_name, now),
        next_review: next_review_date(profile_name, now),
        recent_activity: recent_activity(history, profile_name, now),
    }
}

/// Counts for attempts falling in the current calendar month,
/// start-of-month inclusive.
pub fn monthly_stats(history: &[AccessAttempt], now: DateTime<Utc>) -> MonthlyStats {
    let month_start = now
        .date_naive()
        .with_day(1)
        .expect("day 1 is valid for every month")
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time")
        .and_utc();

    let mut stats = MonthlyStats::default();
    for attempt in history.iter().filter(|a| a.timestamp >= month_start) {
        stats.total += 1;
        match attempt.status {
            AccessStatus::Success => stats.successful += 1,
            AccessStatus::Failed => stats.failed += 1,
        }
    }
    stats
}

/// Human-relative description of the most recent successful attempt.
pub fn last_access_description(
    history: &[AccessAttempt],
    profile_name: Option<&str>,
    now: DateTime<Utc>,
) -> String {
    if profile_name.map_or(true, str::is_empty) {
        return COMPLETE_PROFILE_FIRST.to_string();
    }
    // History is most-recent-first, so the first success is the latest one.
    let last = history.iter().find(|a| a.status == AccessStatus::Success);
    match last {
        Some(attempt) => relative_time(attempt.timestamp, now),
        None => NO_ACCESS_ATTEMPTS.to_string(),
    }
}

/// Next scheduled access review: 30 days out, once a profile exists.
pub fn next_review_date(profile_name: Option<&str>, now: DateTime<Utc>) -> String {
    if profile_name.map_or(true, str::is_empty) {
        return "After profile completion".to_string();
    }
    (now + Duration::days(REVIEW_INTERVAL_DAYS))
        .format("%b %-d, %Y")
        .to_string()
}

/// The recent-activity feed: a synthetic profile-created entry followed by
/// the two most recent attempts, newest first, capped at three entries.
pub fn recent_activity(
    history: &[AccessAttempt],
    profile_name: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<ActivityEntry> {
    if profile_name.map_or(true, str::is_empty) {
        return vec![ActivityEntry {
            title: "Welcome to Door Access System".to_string(),
            time: "Complete your profile to start".to_string(),
            kind: ActivityKind::Info,
            icon: ActivityIcon::Info,
        }];
    }

    let mut activities = vec![ActivityEntry {
        title: "Profile Created".to_string(),
        time: "Profile setup completed".to_string(),
        kind: ActivityKind::Success,
        icon: ActivityIcon::UserPlus,
    }];

    for attempt in history.iter().take(RECENT_HISTORY_ENTRIES) {
        let (title, kind, icon) = match attempt.status {
            AccessStatus::Success => (
                "Door Access Granted",
                ActivityKind::Success,
                ActivityIcon::DoorOpen,
            ),
            AccessStatus::Failed => ("Access Denied", ActivityKind::Danger, ActivityIcon::Cross),
        };
        activities.push(ActivityEntry {
            title: title.to_string(),
            time: short_relative_time(attempt.timestamp, now),
            kind,
            icon,
        });
    }

    activities.truncate(MAX_ACTIVITY_ENTRIES);
    activities
}

/// "Just now" / "N minute(s) ago" / hours / days, falling back to an
/// absolute formatted date past a week.
fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let mins = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if mins < 1 {
        "Just now".to_string()
    } else if mins < 60 {
        format!("{} minute{} ago", mins, plural(mins))
    } else if hours < 24 {
        format!("{} hour{} ago", hours, plural(hours))
    } else if days < 7 {
        format!("{} day{} ago", days, plural(days))
    } else {
        format_date_time(then)
    }
}

/// Compact variant used in the activity feed.
fn short_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let mins = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if mins < 1 {
        "Just now".to_string()
    } else if mins < 60 {
        format!("{mins}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        format_date_time(then)
    }
}

/// Absolute display format, e.g. "Mar 14, 2026, 09:30 AM".
pub fn format_date_time(ts: DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y, %I:%M %p").to_string()
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    fn attempt(ts: DateTime<Utc>, status: AccessStatus) -> AccessAttempt {
        AccessAttempt {
            timestamp: ts,
            status,
            location: "Main Entrance".to_string(),
            confidence: 90,
            user_name: Some("Ada Otieno".to_string()),
            reason: None,
        }
    }

    #[test]
    fn test_monthly_stats_single_success() {
        let history = vec![attempt(
            Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap(),
            AccessStatus::Success,
        )];
        let stats = monthly_stats(&history, now());
        assert_eq!(
            stats,
            MonthlyStats { total: 1, successful: 1, failed: 0 }
        );
    }

    #[test]
    fn test_monthly_stats_excludes_previous_month() {
        let history = vec![
            attempt(
                Utc.with_ymd_and_hms(2026, 2, 28, 23, 59, 0).unwrap(),
                AccessStatus::Success,
            ),
            attempt(
                Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
                AccessStatus::Failed,
            ),
        ];
        let stats = monthly_stats(&history, now());
        assert_eq!(
            stats,
            MonthlyStats { total: 1, successful: 0, failed: 1 }
        );
    }

    #[test]
    fn test_last_access_placeholders() {
        assert_eq!(
            last_access_description(&[], None, now()),
            COMPLETE_PROFILE_FIRST
        );
        assert_eq!(
            last_access_description(&[], Some(""), now()),
            COMPLETE_PROFILE_FIRST
        );
        assert_eq!(
            last_access_description(&[], Some("Ada"), now()),
            NO_ACCESS_ATTEMPTS
        );
    }

    #[test]
    fn test_last_access_skips_failed_attempts() {
        let history = vec![
            attempt(now() - Duration::minutes(5), AccessStatus::Failed),
            attempt(now() - Duration::hours(3), AccessStatus::Success),
        ];
        assert_eq!(
            last_access_description(&history, Some("Ada"), now()),
            "3 hours ago"
        );
    }

    #[test]
    fn test_relative_time_buckets() {
        assert_eq!(relative_time(now() - Duration::seconds(30), now()), "Just now");
        assert_eq!(relative_time(now() - Duration::minutes(1), now()), "1 minute ago");
        assert_eq!(relative_time(now() - Duration::minutes(45), now()), "45 minutes ago");
        assert_eq!(relative_time(now() - Duration::hours(1), now()), "1 hour ago");
        assert_eq!(relative_time(now() - Duration::hours(23), now()), "23 hours ago");
        assert_eq!(relative_time(now() - Duration::days(6), now()), "6 days ago");
        assert_eq!(
            relative_time(now() - Duration::days(8), now()),
            "Mar 6, 2026, 12:00 PM"
        );
    }

    #[test]
    fn test_recent_activity_placeholder_without_profile() {
        let feed = recent_activity(&[], None, now());
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].kind, ActivityKind::Info);
        assert_eq!(feed[0].time, "Complete your profile to start");
    }

    #[test]
    fn test_recent_activity_caps_at_three_newest_first() {
        let history = vec![
            attempt(now() - Duration::minutes(10), AccessStatus::Failed),
            attempt(now() - Duration::hours(2), AccessStatus::Success),
            attempt(now() - Duration::days(1), AccessStatus::Success),
        ];
        let feed = recent_activity(&history, Some("Ada"), now());
        assert_eq!(feed.len(), 3);
        assert_eq!(feed[0].title, "Profile Created");
        assert_eq!(feed[1].title, "Access Denied");
        assert_eq!(feed[1].time, "10m ago");
        assert_eq!(feed[2].title, "Door Access Granted");
        assert_eq!(feed[2].time, "2h ago");
    }

    #[test]
    fn test_next_review_date() {
        assert_eq!(next_review_date(None, now()), "After profile completion");
        assert_eq!(next_review_date(Some("Ada"), now()), "Apr 13, 2026");
    }

    #[test]
    fn test_snapshot_combines_aggregates() {
        use crate::interface::FixedClock;
        let history = vec![attempt(now() - Duration::minutes(2), AccessStatus::Success)];
        let snap = snapshot(&history, Some("Ada"), &FixedClock(now()));
        assert_eq!(snap.monthly.total, 1);
        assert_eq!(snap.last_access, "2 minutes ago");
        assert_eq!(snap.recent_activity.len(), 2);
    }
}
