//! Numeric and date helpers shared by every analysis.
//!
//! All divisions in the analysis engine go through [`safe_ratio`], so an
//! empty bucket or a flat series yields 0 instead of NaN or infinity.

use chrono::{DateTime, Duration, FixedOffset, Months, NaiveDate, Timelike, Utc};

/// `numerator / denominator`, or 0 when the denominator is 0 or the result is not finite
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let ratio = numerator / denominator;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Arithmetic mean; 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    safe_ratio(sum(values), values.len() as f64)
}

/// Population standard deviation; 0 for an empty slice
pub fn std_dev(values: &[f64]) -> f64 {
    let avg = mean(values);
    let variance = safe_ratio(
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>(),
        values.len() as f64,
    );
    variance.sqrt()
}

/// Pearson correlation coefficient of two equally long series
///
/// Returns 0 when the series differ in length, have fewer than two points,
/// or either one has zero variance.
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return 0.0;
    }
    let mean_x = mean(xs);
    let mean_y = mean(ys);

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    safe_ratio(covariance, (var_x * var_y).sqrt())
}

pub fn subtract_days(date: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    date - Duration::days(days)
}

pub fn subtract_weeks(date: DateTime<Utc>, weeks: i64) -> DateTime<Utc> {
    date - Duration::weeks(weeks)
}

/// Calendar month subtraction; the day of month is clamped (Mar 31 - 1 month = Feb 28/29)
pub fn subtract_months(date: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Fractional days from `start` to `end` (negative if `end` is earlier)
pub fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_seconds() as f64 / 86_400.0
}

/// Calendar date of `timestamp` in the user's local offset
pub fn local_date(timestamp: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    timestamp.with_timezone(&offset).date_naive()
}

/// Hour of day (0-23) of `timestamp` in the user's local offset
pub fn local_hour(timestamp: DateTime<Utc>, offset: FixedOffset) -> u32 {
    timestamp.with_timezone(&offset).hour()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn test_safe_ratio_guards_zero() {
        assert_eq!(safe_ratio(10.0, 0.0), 0.0);
        assert_eq!(safe_ratio(10.0, 4.0), 2.5);
        assert_eq!(safe_ratio(f64::MAX, f64::MIN_POSITIVE), 0.0);
    }

    #[test]
    fn test_mean_and_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(sum(&values), 40.0);
        assert_eq!(mean(&values), 5.0);
        assert!((std_dev(&values) - 2.0).abs() < 1e-12);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
    }

    #[test]
    fn test_pearson_correlation() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let up = [2.0, 4.0, 6.0, 8.0, 10.0];
        let down = [10.0, 8.0, 6.0, 4.0, 2.0];
        assert!((pearson_correlation(&xs, &up) - 1.0).abs() < 1e-12);
        assert!((pearson_correlation(&xs, &down) + 1.0).abs() < 1e-12);
        // Zero variance
        assert_eq!(pearson_correlation(&xs, &[3.0; 5]), 0.0);
        // Mismatched lengths
        assert_eq!(pearson_correlation(&xs, &up[..3]), 0.0);
    }

    #[test]
    fn test_date_arithmetic() {
        let date = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        assert_eq!(subtract_days(date, 1), Utc.with_ymd_and_hms(2024, 3, 30, 12, 0, 0).unwrap());
        assert_eq!(subtract_weeks(date, 2), Utc.with_ymd_and_hms(2024, 3, 17, 12, 0, 0).unwrap());
        assert_eq!(subtract_months(date, 1), Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());
        assert_eq!(days_between(subtract_days(date, 3), date), 3.0);
        assert_eq!(days_between(date, subtract_days(date, 1)), -1.0);
    }

    #[test]
    fn test_local_date_and_hour() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 2, 30, 0).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let new_york = FixedOffset::west_opt(4 * 3600).unwrap();

        assert_eq!(local_hour(ts, utc), 2);
        assert_eq!(local_hour(ts, new_york), 22);
        assert_eq!(local_date(ts, utc).day(), 1);
        assert_eq!(local_date(ts, new_york).day(), 31);
    }
}
