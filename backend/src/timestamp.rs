use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parses the timestamp forms the calendar client sends.
///
/// Accepts RFC 3339 instants, naive date-times (read as UTC) and `YYYY-MM-DD`
/// dates at UTC midnight. A date-only day past the end of its month rolls
/// into the next month, so `2026-02-29` is `2026-03-01`.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    parse_date_only(value)
}

fn parse_date_only(value: &str) -> Option<DateTime<Utc>> {
    let mut parts = value.splitn(3, '-');
    let year_part = parts.next()?;
    let month_part = parts.next()?;
    let day_part = parts.next()?;
    if year_part.len() != 4 || month_part.len() != 2 || day_part.len() != 2 {
        return None;
    }

    let year: i32 = year_part.parse().ok()?;
    let month: u32 = month_part.parse().ok()?;
    let day: u32 = day_part.parse().ok()?;
    if !(1..=31).contains(&day) {
        return None;
    }

    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let date = first + Duration::days(i64::from(day) - 1);
    Some(date.and_time(chrono::NaiveTime::MIN).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parses_rfc3339() {
        assert_eq!(
            parse_timestamp("2026-02-10T12:00:00Z"),
            Some(Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2026-02-10T12:00:00.000Z"),
            Some(Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2026-02-10T14:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parses_naive_as_utc() {
        assert_eq!(
            parse_timestamp("2026-02-10T12:30:00"),
            Some(Utc.with_ymd_and_hms(2026, 2, 10, 12, 30, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2026-02-10T12:30"),
            Some(Utc.with_ymd_and_hms(2026, 2, 10, 12, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_parses_date_only() {
        assert_eq!(
            parse_timestamp("2026-02-01"),
            Some(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_date_only_rolls_past_month_end() {
        assert_eq!(
            parse_timestamp("2026-02-29"),
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2026-04-31"),
            Some(Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2026-02-32"), None);
        assert_eq!(parse_timestamp("2026-13-01"), None);
    }
}
