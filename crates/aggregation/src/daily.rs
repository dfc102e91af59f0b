//! Daily rollups of hourly series.

use aq_common::station::HOURS_PER_DAY;

/// Round halves toward positive infinity, like `Math.round(x * 10^d) / 10^d`
/// on the client.
pub fn round_half_up(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor + 0.5).floor() / factor
}

fn present(series: &[Option<f64>]) -> impl Iterator<Item = f64> + '_ {
    series.iter().flatten().copied().filter(|v| !v.is_nan())
}

/// Mean of the non-null entries rounded to one decimal, `None` if there are none.
pub fn daily_average(series: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = present(series).fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        return None;
    }
    Some(round_half_up(sum / count as f64, 1))
}

/// Maximum of the non-null entries rounded to an integer, `None` if there are none.
pub fn daily_peak(series: &[Option<f64>]) -> Option<f64> {
    present(series)
        .reduce(f64::max)
        .map(|max| round_half_up(max, 0))
}

/// The series if it covers a whole day, otherwise `None`.
///
/// A station day with a truncated series is treated as entirely missing.
pub fn complete_series(series: &[Option<f64>]) -> Option<&[Option<f64>]> {
    (series.len() == HOURS_PER_DAY).then_some(series)
}
