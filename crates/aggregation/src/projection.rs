//! Single-hour view of a station day.

use aq_common::{time::hour_stamp, EnvironmentalData, Metric, Station};
use chrono::NaiveDate;

/// Project a station's hourly data onto one hour.
///
/// When the station has no hourly data, or its time axis does not reach
/// `hour`, every value is `None`. The hourly block is not carried over.
pub fn project_hour(station: &Station, date: NaiveDate, hour: usize) -> Station {
    let mut data = EnvironmentalData::default();

    if let Some(hourly) = station.environmental_data.hourly.as_ref() {
        if hour < hourly.hours() {
            for metric in Metric::ALL {
                let value = hourly.series(metric).get(hour).copied().flatten();
                data.set_value(metric, value);
            }
        }
    }

    Station {
        last_update: hour_stamp(date, hour),
        environmental_data: data,
        ..station.clone()
    }
}
