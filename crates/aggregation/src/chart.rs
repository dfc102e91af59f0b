//! Multi-day chart series.

use std::fmt::Display;
use std::future::Future;

use aq_common::time::{chart_label, format_api_date};
use aq_common::{AqResult, ChartWindow};
use chrono::NaiveDate;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One day of a chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// `dd/mm` axis label
    pub date: String,
    pub value: Option<f64>,
}

/// Look up every day of `window` concurrently and collect the results in date order.
///
/// A failed lookup is logged and becomes a `null` point; it never affects the
/// other days. Fails before any lookup when the window does not fit the calendar.
pub async fn build_chart_series<F, Fut, E>(
    window: ChartWindow,
    lookup: F,
) -> AqResult<Vec<ChartPoint>>
where
    F: Fn(NaiveDate) -> Fut,
    Fut: Future<Output = Result<Option<f64>, E>>,
    E: Display,
{
    let dates = window.dates()?;
    let results = join_all(dates.iter().map(|&date| lookup(date))).await;

    let points: Vec<ChartPoint> = dates
        .into_iter()
        .zip(results)
        .map(|(date, result)| {
            let value = match result {
                Ok(value) => value,
                Err(e) => {
                    warn!(date = %format_api_date(date), error = %e, "Chart lookup failed");
                    None
                }
            };
            ChartPoint {
                date: chart_label(date),
                value,
            }
        })
        .collect();

    debug!(
        center = %format_api_date(window.center),
        resolved = points.iter().filter(|p| p.value.is_some()).count(),
        "Built chart series"
    );
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[tokio::test]
    async fn test_all_days_resolve_in_order() {
        let points = build_chart_series(ChartWindow::week(center()), |date| async move {
            Ok::<_, String>(Some(f64::from(chrono::Datelike::day(&date))))
        })
        .await
        .unwrap();

        let labels: Vec<&str> = points.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(
            labels,
            vec!["28/04", "29/04", "30/04", "01/05", "02/05", "03/05", "04/05"]
        );
        assert_eq!(points[3].value, Some(1.0));
        assert_eq!(points[0].value, Some(28.0));
    }

    #[tokio::test]
    async fn test_one_failure_is_isolated() {
        let failing = center() - chrono::Duration::days(1);
        let points = build_chart_series(ChartWindow::week(center()), |date| async move {
            if date == failing {
                Err("raster host unavailable")
            } else {
                Ok(Some(25.0))
            }
        })
        .await
        .unwrap();

        assert_eq!(points.len(), 7);
        assert_eq!(points.iter().filter(|p| p.value.is_none()).count(), 1);
        assert_eq!(points[2].value, None);
        assert_eq!(points[2].date, "30/04");
    }

    #[tokio::test]
    async fn test_window_past_calendar_end_skips_lookups() {
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let result = build_chart_series(ChartWindow::week(NaiveDate::MAX), |_| {
            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async { Ok::<_, String>(Some(1.0)) }
        })
        .await;

        assert!(matches!(result, Err(aq_common::AqError::InvalidDate(_))));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_chart_point_json() {
        let point = ChartPoint {
            date: "01/05".into(),
            value: None,
        };
        assert_eq!(
            serde_json::to_string(&point).unwrap(),
            r#"{"date":"01/05","value":null}"#
        );
    }
}
