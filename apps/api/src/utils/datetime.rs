use chrono::{DateTime, SecondsFormat, Utc};

/// Parses an RFC 3339 timestamp and normalizes it to UTC.
pub fn parse_rfc3339(dt_str: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(dt_str.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Fixed-width UTC form used for stored timestamps; lexical order equals time order.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_normalizes_offset() {
        let dt = parse_rfc3339("2024-05-01T09:00:00+09:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_rfc3339("yesterday").is_none());
        assert!(parse_rfc3339("2024-05-01").is_none());
    }

    #[test]
    fn test_format_sorts_lexically() {
        let a = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let b = a + chrono::Duration::microseconds(1);
        let c = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(format_timestamp(&a), "2024-01-02T03:04:05.000000Z");
        assert!(format_timestamp(&a) < format_timestamp(&b));
        assert!(format_timestamp(&b) < format_timestamp(&c));
        assert_eq!(parse_rfc3339(&format_timestamp(&b)), Some(b));
    }
}
