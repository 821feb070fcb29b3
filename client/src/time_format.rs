use chrono::{DateTime, TimeZone};

use relay_shared::message::parse_timestamp_millis;

/// `HH:MM` in the browser's local zone for parseable timestamps; anything
/// else (including clock-only `"14:05"`) is shown verbatim.
pub fn format_clock(raw: &str) -> String {
    format_clock_in(raw, &chrono::Local)
}

pub fn format_clock_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    parse_timestamp_millis(raw)
        .and_then(DateTime::from_timestamp_millis)
        .map(|utc| utc.with_timezone(tz).format("%H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};

    use super::format_clock_in;

    #[test]
    fn rfc3339_becomes_hours_and_minutes() {
        assert_eq!(format_clock_in("2026-03-01T14:05:59Z", &Utc), "14:05");
    }

    #[test]
    fn converts_into_target_zone() {
        let cet = FixedOffset::east_opt(3600).expect("valid offset");
        assert_eq!(format_clock_in("2026-03-01T23:30:00+00:00", &cet), "00:30");
    }

    #[test]
    fn naive_sql_timestamps_are_treated_as_utc() {
        assert_eq!(format_clock_in("2026-03-01 09:07:00", &Utc), "09:07");
    }

    #[test]
    fn unparseable_values_pass_through() {
        assert_eq!(format_clock_in("14:05", &Utc), "14:05");
        assert_eq!(format_clock_in("yesterday", &Utc), "yesterday");
        assert_eq!(format_clock_in("", &Utc), "");
    }
}
