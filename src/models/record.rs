use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AnalysisError, Result};

/// One hourly observation from a monitoring station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Record {
    pub timestamp: NaiveDateTime,

    #[validate(length(min = 1))]
    pub station: String,

    #[validate(range(min = 0.0))]
    pub pm10: Option<f64>,

    pub temp: Option<f64>,
    pub dewp: Option<f64>,
    pub pres: Option<f64>,
}

impl Record {
    pub fn new(
        timestamp: NaiveDateTime,
        station: impl Into<String>,
        pm10: Option<f64>,
        temp: Option<f64>,
        dewp: Option<f64>,
        pres: Option<f64>,
    ) -> Self {
        Self {
            timestamp,
            station: station.into(),
            pm10,
            temp,
            dewp,
            pres,
        }
    }

    /// Build the timestamp from its calendar parts, rejecting impossible instants
    pub fn timestamp_from_parts(year: i32, month: u32, day: u32, hour: u32) -> Result<NaiveDateTime> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .ok_or_else(|| {
                AnalysisError::InvalidFormat(format!(
                    "invalid calendar instant {:04}-{:02}-{:02} {:02}:00",
                    year, month, day, hour
                ))
            })
    }

    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    pub fn month(&self) -> u32 {
        self.timestamp.month()
    }

    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }

    pub fn is_complete(&self) -> bool {
        self.pm10.is_some() && self.temp.is_some() && self.dewp.is_some() && self.pres.is_some()
    }
}
