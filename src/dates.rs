//! Human-readable timestamps for the quiz UI. Every formatted value shows
//! GMT first and India Standard Time in parentheses. Unparseable or empty
//! input formats as an empty string.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// IST is UTC+05:30.
const IST_OFFSET_SECS: i32 = 330 * 60;

/// Naive layouts, read as UTC.
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

const DATE_TIME: &str = "%b %-d, %Y, %I:%M %p";
const DATE: &str = "%b %-d, %Y";
const QUIZ_DATE_TIME: &str = "%a, %b %-d, %I:%M %p";

/// Parses the timestamp shapes the backend and browsers produce.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return Some(naive.and_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    value
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
}

fn ist(utc: DateTime<Utc>) -> Option<DateTime<FixedOffset>> {
    FixedOffset::east_opt(IST_OFFSET_SECS).map(|offset| utc.with_timezone(&offset))
}

fn dual<'a>(value: impl Into<Option<&'a str>>, layout: &str) -> String {
    let Some(utc) = value.into().and_then(parse_timestamp) else {
        return String::new();
    };
    let Some(local) = ist(utc) else {
        return String::new();
    };
    format!("{} GMT ({} IST)", utc.format(layout), local.format(layout))
}

/// `"Jan 5, 2024, 09:05 AM GMT (Jan 5, 2024, 02:35 PM IST)"`
#[must_use]
pub fn format_date_time<'a>(value: impl Into<Option<&'a str>>) -> String {
    dual(value, DATE_TIME)
}

/// `"Jan 5, 2024 GMT (Jan 5, 2024 IST)"`
#[must_use]
pub fn format_date<'a>(value: impl Into<Option<&'a str>>) -> String {
    dual(value, DATE)
}

/// `"Fri, Jan 5, 09:05 AM GMT (Fri, Jan 5, 02:35 PM IST)"`
#[must_use]
pub fn format_quiz_date_time<'a>(value: impl Into<Option<&'a str>>) -> String {
    dual(value, QUIZ_DATE_TIME)
}

/// Relative time against the current clock.
#[must_use]
pub fn format_time_ago<'a>(value: impl Into<Option<&'a str>>) -> String {
    format_time_ago_at(value, Utc::now())
}

/// Relative time against `now`. Anything two days or older falls back to
/// [`format_date_time`]; timestamps in the future read as "just now".
#[must_use]
pub fn format_time_ago_at<'a>(value: impl Into<Option<&'a str>>, now: DateTime<Utc>) -> String {
    let Some(raw) = value.into() else {
        return String::new();
    };
    let Some(then) = parse_timestamp(raw) else {
        return String::new();
    };

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let minutes = ((now - then).num_seconds() as f64 / 60.0).round() as i64;

    match minutes {
        m if m < 1 => "just now".to_string(),
        m if m < 60 => format!("{m} minutes ago"),
        m if m < 120 => "1 hour ago".to_string(),
        m if m < 1440 => format!("{} hours ago", m / 60),
        m if m < 2880 => "yesterday".to_string(),
        _ => format_date_time(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn ago(minutes: i64) -> String {
        (now() - Duration::minutes(minutes)).to_rfc3339()
    }

    #[test]
    fn empty_or_invalid_input_formats_as_empty() {
        assert_eq!(format_date(""), "");
        assert_eq!(format_date_time(None::<&str>), "");
        assert_eq!(format_quiz_date_time("not a date"), "");
        assert_eq!(format_time_ago_at("   ", now()), "");
        assert_eq!(format_time_ago_at(None::<&str>, now()), "");
    }

    #[test]
    fn formats_gmt_with_ist() {
        assert_eq!(
            format_date_time("2024-01-05T09:05:00Z"),
            "Jan 5, 2024, 09:05 AM GMT (Jan 5, 2024, 02:35 PM IST)"
        );
        assert_eq!(
            format_date("2024-01-05T09:05:00Z"),
            "Jan 5, 2024 GMT (Jan 5, 2024 IST)"
        );
        assert_eq!(
            format_quiz_date_time("2024-01-05T09:05:00Z"),
            "Fri, Jan 5, 09:05 AM GMT (Fri, Jan 5, 02:35 PM IST)"
        );
    }

    #[test]
    fn ist_can_fall_on_the_next_day() {
        assert_eq!(
            format_date("2024-12-31T20:00:00Z"),
            "Dec 31, 2024 GMT (Jan 1, 2025 IST)"
        );
    }

    #[test]
    fn accepts_backend_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 5, 9, 5, 0).single();
        assert_eq!(parse_timestamp("2024-01-05T09:05:00"), expected);
        assert_eq!(
            parse_timestamp("2024-01-05T09:05:00.123456").map(|t| t.timestamp()),
            expected.map(|t| t.timestamp())
        );
        assert_eq!(parse_timestamp("2024-01-05 09:05:00"), expected);
        assert_eq!(parse_timestamp("2024-01-05T14:35:00+05:30"), expected);
        assert_eq!(parse_timestamp("Fri, 05 Jan 2024 09:05:00 GMT"), expected);
        assert_eq!(parse_timestamp("1704445500000"), expected);
        assert_eq!(
            parse_timestamp("2024-01-05"),
            Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).single()
        );
    }

    #[test]
    fn time_ago_buckets() {
        assert_eq!(format_time_ago_at(ago(0).as_str(), now()), "just now");
        assert_eq!(format_time_ago_at(ago(1).as_str(), now()), "1 minutes ago");
        assert_eq!(format_time_ago_at(ago(59).as_str(), now()), "59 minutes ago");
        assert_eq!(format_time_ago_at(ago(60).as_str(), now()), "1 hour ago");
        assert_eq!(format_time_ago_at(ago(119).as_str(), now()), "1 hour ago");
        assert_eq!(format_time_ago_at(ago(150).as_str(), now()), "2 hours ago");
        assert_eq!(format_time_ago_at(ago(1439).as_str(), now()), "23 hours ago");
        assert_eq!(format_time_ago_at(ago(1440).as_str(), now()), "yesterday");
        assert_eq!(format_time_ago_at(ago(2879).as_str(), now()), "yesterday");

        let old = ago(2880);
        assert_eq!(
            format_time_ago_at(old.as_str(), now()),
            format_date_time(old.as_str())
        );
    }

    #[test]
    fn future_timestamps_are_just_now() {
        assert_eq!(format_time_ago_at(ago(-30).as_str(), now()), "just now");
    }

    #[test]
    fn minutes_round_to_nearest() {
        let thirty_seconds = (now() - Duration::seconds(30)).to_rfc3339();
        assert_eq!(format_time_ago_at(thirty_seconds.as_str(), now()), "1 minutes ago");
        let twenty_nine = (now() - Duration::seconds(29)).to_rfc3339();
        assert_eq!(format_time_ago_at(twenty_nine.as_str(), now()), "just now");
    }
}
