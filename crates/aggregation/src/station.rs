//! Station day assembly from provider hourly data.

use aq_common::{
    time::format_api_date, BaseStation, EnvironmentalData, HourlyRecord, Metric, Station,
    StationStatus,
};
use chrono::NaiveDate;

use crate::daily::{complete_series, daily_average, daily_peak};

/// `active` when the day has at least one hourly AQI value.
pub fn station_status(hourly: Option<&HourlyRecord>) -> StationStatus {
    let has_aqi = hourly
        .and_then(|h| complete_series(h.series(Metric::Aqi)))
        .map_or(false, |series| series.iter().any(Option::is_some));

    if has_aqi {
        StationStatus::Active
    } else {
        StationStatus::Maintenance
    }
}

/// Daily rollup of an hourly record: peak AQI and average pollutants.
pub fn daily_environmental_data(hourly: Option<HourlyRecord>) -> EnvironmentalData {
    let mut data = EnvironmentalData::default();
    if let Some(record) = &hourly {
        for metric in Metric::ALL {
            let value = complete_series(record.series(metric)).and_then(|series| match metric {
                Metric::Aqi => daily_peak(series),
                _ => daily_average(series),
            });
            data.set_value(metric, value);
        }
    }
    data.hourly = hourly;
    data
}

/// Combine a static station entry with its provider data for a day.
///
/// `hourly` is `None` when the provider had nothing for this station.
pub fn build_station(base: &BaseStation, date: NaiveDate, hourly: Option<HourlyRecord>) -> Station {
    let status = station_status(hourly.as_ref());
    Station {
        id: base.id.clone(),
        name: base.name.clone(),
        lat: base.lat(),
        lng: base.lng(),
        address: base.address(),
        status,
        last_update: format_api_date(date),
        environmental_data: daily_environmental_data(hourly),
    }
}
