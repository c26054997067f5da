//! Reporting periods expressed in a property's local time.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::RevenueError;

/// UTC bounds `[start, end)` of calendar month `year-month` as observed
/// in `tz`.
pub fn month_bounds(
    tz: Tz,
    year: i32,
    month: u32,
) -> Result<(DateTime<Utc>, DateTime<Utc>), RevenueError> {
    let invalid = || RevenueError::InvalidMonth { year, month };

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(invalid)?;

    Ok((local_midnight(tz, first)?, local_midnight(tz, next)?))
}

/// The instant local midnight begins `date` in `tz`.
///
/// Ambiguous midnights take the earlier instant. Where a DST jump skips
/// midnight, the first local time that exists after it is used.
pub fn local_midnight(tz: Tz, date: NaiveDate) -> Result<DateTime<Utc>, RevenueError> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);

    (0..=2)
        .map(|hours| midnight + Duration::hours(hours))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| RevenueError::UnresolvableLocalTime {
            date: date.to_string(),
            timezone: tz.name().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn utc_month_is_calendar_month() {
        let (start, end) = month_bounds(Tz::UTC, 2024, 6).unwrap();
        assert_eq!(start, utc(2024, 6, 1, 0));
        assert_eq!(end, utc(2024, 7, 1, 0));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let (start, end) = month_bounds(Tz::UTC, 2023, 12).unwrap();
        assert_eq!(start, utc(2023, 12, 1, 0));
        assert_eq!(end, utc(2024, 1, 1, 0));
    }

    #[test]
    fn bounds_follow_local_offset_across_dst() {
        // March 2024 in New York starts on EST (-5) and ends on EDT (-4).
        let (start, end) = month_bounds(chrono_tz::America::New_York, 2024, 3).unwrap();
        assert_eq!(start, utc(2024, 3, 1, 5));
        assert_eq!(end, utc(2024, 4, 1, 4));
    }

    #[test]
    fn skipped_midnight_uses_first_valid_time() {
        // Sao Paulo moved clocks from 00:00 to 01:00 on 2018-11-04.
        let date = NaiveDate::from_ymd_opt(2018, 11, 4).unwrap();
        let start = local_midnight(chrono_tz::America::Sao_Paulo, date).unwrap();
        assert_eq!(start, utc(2018, 11, 4, 3));
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert!(matches!(
            month_bounds(Tz::UTC, 2024, 13),
            Err(RevenueError::InvalidMonth { .. })
        ));
        assert!(month_bounds(Tz::UTC, 2024, 0).is_err());
    }
}
