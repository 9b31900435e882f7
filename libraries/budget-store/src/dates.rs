//! Calendar-month helpers (UTC)

use chrono::{DateTime, TimeZone, Utc};

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Half-open `[start, next_start)` of a calendar month
///
/// `None` for a month outside `1..=12` or a year chrono cannot represent.
pub fn month_bounds(year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let start = Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()?;
    let (next_year, next_month) = shift_month(year, month, 1)?;
    let next_start = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()?;
    Some((start, next_start))
}

/// Move `delta` months from `(year, month)`; `month` is 1-based
///
/// `None` when `month` is outside `1..=12` or the result's year does not
/// fit in `i32`.
pub fn shift_month(year: i32, month: u32, delta: i32) -> Option<(i32, u32)> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let index = i64::from(year) * 12 + i64::from(month - 1) + i64::from(delta);
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    Some((year, month))
}

/// Short English month name ("Jan")
pub fn month_label(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|index| MONTH_LABELS.get(index as usize))
        .copied()
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn january_bounds_are_half_open() {
        let (start, next_start) = month_bounds(2024, 1).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(next_start.to_rfc3339(), "2024-02-01T00:00:00+00:00");
    }

    #[test]
    fn leap_february() {
        let (_, next_start) = month_bounds(2024, 2).unwrap();
        let last_day = next_start - Duration::days(1);
        assert_eq!(last_day.format("%Y-%m-%d").to_string(), "2024-02-29");
        let (_, next_start) = month_bounds(2023, 2).unwrap();
        let last_day = next_start - Duration::days(1);
        assert_eq!(last_day.format("%Y-%m-%d").to_string(), "2023-02-28");
    }

    #[test]
    fn december_rolls_into_next_year() {
        let (_, next_start) = month_bounds(2023, 12).unwrap();
        assert_eq!(next_start.format("%Y-%m-%d").to_string(), "2024-01-01");
    }

    #[test]
    fn unrepresentable_years() {
        assert!(month_bounds(999_999_999, 3).is_none());
        assert!(month_bounds(i32::MAX, 12).is_none());
    }

    #[test]
    fn invalid_month() {
        assert!(month_bounds(2024, 0).is_none());
        assert!(month_bounds(2024, 13).is_none());
    }

    #[test]
    fn shifting_months() {
        assert_eq!(shift_month(2024, 3, -5), Some((2023, 10)));
        assert_eq!(shift_month(2024, 12, 1), Some((2025, 1)));
        assert_eq!(shift_month(2024, 1, -12), Some((2023, 1)));
        assert_eq!(shift_month(2024, 6, 0), Some((2024, 6)));
    }

    #[test]
    fn shifting_near_the_year_limits() {
        assert_eq!(shift_month(999_999_999, 3, -5), Some((999_999_998, 10)));
        assert_eq!(shift_month(i32::MAX, 12, 0), Some((i32::MAX, 12)));
        assert!(shift_month(i32::MAX, 12, 1).is_none());
        assert!(shift_month(i32::MIN, 1, -1).is_none());
        assert!(shift_month(2024, 0, 1).is_none());
    }

    #[test]
    fn labels() {
        assert_eq!(month_label(1), "Jan");
        assert_eq!(month_label(12), "Dec");
        assert_eq!(month_label(0), "");
    }
}
