use chrono::NaiveDateTime;
use std::collections::BTreeSet;

use crate::error::{AnalysisError, Result};
use crate::models::{Record, Variable};

/// Immutable, load-ordered collection of hourly records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    stations: BTreeSet<String>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        let stations = records.iter().map(|r| r.station.clone()).collect();
        Self { records, stations }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stations present in the data, sorted by name
    pub fn stations(&self) -> impl Iterator<Item = &str> {
        self.stations.iter().map(String::as_str)
    }

    pub fn station_names(&self) -> Vec<String> {
        self.stations.iter().cloned().collect()
    }

    pub fn contains_station(&self, station: &str) -> bool {
        self.stations.contains(station)
    }

    pub fn require_station(&self, station: &str) -> Result<()> {
        if self.contains_station(station) {
            Ok(())
        } else {
            Err(AnalysisError::UnknownStation {
                station: station.to_string(),
                known: self.station_names(),
            })
        }
    }

    /// Records of one station, in load order
    pub fn station_records<'a>(
        &'a self,
        station: &'a str,
    ) -> Result<impl Iterator<Item = &'a Record> + 'a> {
        self.require_station(station)?;
        Ok(self.records.iter().filter(move |r| r.station == station))
    }

    /// Owned subset holding only one station's records
    pub fn for_station(&self, station: &str) -> Result<Dataset> {
        let records = self.station_records(station)?.cloned().collect();
        Ok(Dataset::new(records))
    }

    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.records.first()?.timestamp;
        Some(self.records.iter().fold((first, first), |(lo, hi), r| {
            (lo.min(r.timestamp), hi.max(r.timestamp))
        }))
    }

    pub fn missing_count(&self, variable: Variable) -> usize {
        self.records
            .iter()
            .filter(|r| variable.value(r).is_none())
            .count()
    }

    pub fn values(&self, variable: Variable) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().filter_map(move |r| variable.value(r))
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Dataset::new(iter.into_iter().collect())
    }
}
