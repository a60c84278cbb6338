//! Small display helpers shared by the views.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// `Aug 01, 2025`, or `No date`.
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(date) => date.format("%b %d, %Y").to_string(),
        None => "No date".to_string(),
    }
}

/// Relative age for notification timestamps: "just now", "5m ago", "3h ago",
/// "2d ago", then the calendar date.
pub fn time_ago(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created_at) = created_at else {
        return String::new();
    };
    let minutes = (now - created_at).num_minutes();
    match minutes {
        m if m < 1 => "just now".to_string(),
        m if m < 60 => format!("{m}m ago"),
        m if m < 60 * 24 => format!("{}h ago", m / 60),
        m if m < 60 * 24 * 7 => format!("{}d ago", m / (60 * 24)),
        _ => created_at.format("%b %d").to_string(),
    }
}

/// Value for an `<input type="date">`.
pub fn date_input_value(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Parse an `<input type="date">` value as midnight UTC. Empty means no date.
pub fn parse_date_input(value: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}
