//! Date-derived features
//!
//! Pure functions turning raw departure timestamps into the period of
//! day, the high-season flag and the scheduled-to-operated minute
//! difference.

use crate::error::PipelineError;
use crate::models::{DayPeriod, DerivedFeatures, FlightRecord};
use chrono::{Datelike, NaiveDateTime, Timelike};

/// Timestamp format used by the dataset and the API placeholder
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// High-season date ranges, inclusive, as (month, day) pairs within a
/// single calendar year
const HIGH_SEASON_RANGES: [((u32, u32), (u32, u32)); 4] = [
    ((12, 15), (12, 31)),
    ((1, 1), (3, 3)),
    ((7, 15), (7, 31)),
    ((9, 11), (9, 30)),
];

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, PipelineError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|source| {
        PipelineError::InvalidTimestamp {
            value: value.to_string(),
            source,
        }
    })
}

/// Classify a timestamp into a period of the day.
///
/// Morning covers 05:00-11:59, afternoon 12:00-18:59, night the rest
/// (19:00-04:59). Boundary minutes belong to the named range.
pub fn period_of_day(timestamp: &str) -> Result<DayPeriod, PipelineError> {
    let time = parse_timestamp(timestamp)?.time();
    let minute_of_day = time.hour() * 60 + time.minute();

    let period = if (5 * 60..12 * 60).contains(&minute_of_day) {
        DayPeriod::Morning
    } else if (12 * 60..19 * 60).contains(&minute_of_day) {
        DayPeriod::Afternoon
    } else {
        DayPeriod::Night
    };
    Ok(period)
}

/// Whether the timestamp falls in a high-travel-season window.
///
/// Windows are fixed calendar-day ranges evaluated against the
/// timestamp's own year: Dec 15-31, Jan 1-Mar 3, Jul 15-31, Sep 11-30.
pub fn is_high_season(timestamp: &str) -> Result<bool, PipelineError> {
    let date = parse_timestamp(timestamp)?.date();
    let month_day = (date.month(), date.day());

    Ok(HIGH_SEASON_RANGES
        .iter()
        .any(|&(start, end)| month_day >= start && month_day <= end))
}

/// Minute difference between the operated and scheduled departure
/// timestamps (`operated - scheduled`).
pub fn minute_diff(operated: &str, scheduled: &str) -> Result<f64, PipelineError> {
    let operated = parse_timestamp(operated)?;
    let scheduled = parse_timestamp(scheduled)?;
    Ok((operated - scheduled).num_seconds() as f64 / 60.0)
}

/// Derive all date features for one record.
pub fn derive(record: &FlightRecord) -> Result<DerivedFeatures, PipelineError> {
    Ok(DerivedFeatures {
        period_day: period_of_day(&record.scheduled_at)?,
        high_season: is_high_season(&record.scheduled_at)?,
        min_diff: minute_diff(&record.operated_at, &record.scheduled_at)?,
    })
}
