//! Pure formatting helpers for dashboard display.

use chrono::{DateTime, Local};

const MASK_PREFIX_CHARS: usize = 8;
const MASK_SUFFIX_CHARS: usize = 12;
const MASK_SEPARATOR: &str = "-....-";

/// Mask an anonymous tracking token for display, revealing only its first 8
/// and last 12 characters. Tokens too short to mask partially are fully
/// masked instead, one asterisk per character.
pub fn mask_identity(id: &str) -> String {
    let len = id.chars().count();
    if len <= MASK_PREFIX_CHARS + MASK_SUFFIX_CHARS {
        return "*".repeat(len);
    }

    let prefix: String = id.chars().take(MASK_PREFIX_CHARS).collect();
    let suffix: String = id.chars().skip(len - MASK_SUFFIX_CHARS).collect();
    format!("{prefix}{MASK_SEPARATOR}{suffix}")
}

/// Render the gap between `earlier` and `now` as a coarse human-relative
/// phrase ("3 minutes ago"). A timestamp in the future clamps to "just now".
pub fn time_ago(earlier: DateTime<Local>, now: DateTime<Local>) -> String {
    let seconds = (now - earlier).num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if minutes == 0 {
        "just now".to_string()
    } else if hours == 0 {
        count_ago(minutes, "minute")
    } else if days == 0 {
        count_ago(hours, "hour")
    } else if days < 30 {
        count_ago(days, "day")
    } else if days < 365 {
        count_ago(days / 30, "month")
    } else {
        count_ago(days / 365, "year")
    }
}

fn count_ago(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn masks_a_tracking_token_to_its_edges() {
        assert_eq!(
            mask_identity("550e8400-e29b-41d4-a716-446655440000"),
            "550e8400-....-446655440000"
        );
    }

    #[test]
    fn short_identities_are_fully_masked() {
        assert_eq!(mask_identity("visitor42"), "*********");
        // Exactly 20 characters still counts as too short.
        assert_eq!(mask_identity("12345678901234567890"), "*".repeat(20));
    }

    #[test]
    fn masking_counts_characters_not_bytes() {
        let id: String = "\u{3042}".repeat(25);
        let masked = mask_identity(&id);
        assert!(masked.starts_with(&"\u{3042}".repeat(8)));
        assert!(masked.ends_with(&"\u{3042}".repeat(12)));
        assert!(masked.contains(MASK_SEPARATOR));
    }

    #[test]
    fn relative_times_cover_every_tier() {
        let now = Local.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        let ago = |duration| time_ago(now - duration, now);

        assert_eq!(ago(Duration::seconds(10)), "just now");
        assert_eq!(ago(Duration::minutes(1)), "1 minute ago");
        assert_eq!(ago(Duration::minutes(3)), "3 minutes ago");
        assert_eq!(ago(Duration::hours(2)), "2 hours ago");
        assert_eq!(ago(Duration::days(5)), "5 days ago");
        assert_eq!(ago(Duration::days(65)), "2 months ago");
        assert_eq!(ago(Duration::days(400)), "1 year ago");
    }

    #[test]
    fn future_timestamps_clamp_to_just_now() {
        let now = Local.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        assert_eq!(time_ago(now + Duration::minutes(5), now), "just now");
    }

    #[test]
    fn capitalizes_only_the_first_character() {
        assert_eq!(capitalize("english"), "English");
        assert_eq!(capitalize("fr"), "Fr");
        assert_eq!(capitalize(""), "");
    }
}
