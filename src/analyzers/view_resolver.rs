//! Aggregations that feed every dashboard view.
//!
//! All operations are pure functions of the dataset and their arguments.
//! Groups without a single contributing value are left out of the output
//! instead of being reported as zero.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::analyzers::correlation::CorrelationMatrix;
use crate::error::{AnalysisError, Result};
use crate::models::{Dataset, OutOfRangePolicy, Record, TemperatureCategory, Variable};
use crate::utils::constants::{HOURS_PER_DAY, MONTHS_PER_YEAR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grouping {
    HourOfDay,
    Month,
}

impl Grouping {
    pub fn key_label(&self) -> &'static str {
        match self {
            Grouping::HourOfDay => "hour",
            Grouping::Month => "month",
        }
    }

    fn key(&self, record: &Record) -> u32 {
        match self {
            Grouping::HourOfDay => record.hour(),
            Grouping::Month => record.month(),
        }
    }

    fn key_range(&self) -> std::ops::RangeInclusive<u32> {
        match self {
            Grouping::HourOfDay => 0..=HOURS_PER_DAY - 1,
            Grouping::Month => 1..=MONTHS_PER_YEAR,
        }
    }
}

/// Mean PM10 of one group together with the number of values behind it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatternPoint {
    pub key: u32,
    pub mean: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternSeries {
    pub station: String,
    pub grouping: Grouping,
    pub category: Option<TemperatureCategory>,
    /// Strictly increasing by key
    pub points: Vec<PatternPoint>,
}

impl PatternSeries {
    pub fn get(&self, key: u32) -> Option<&PatternPoint> {
        self.points.iter().find(|p| p.key == key)
    }

    pub fn peak(&self) -> Option<&PatternPoint> {
        self.points.iter().max_by(|a, b| a.mean.total_cmp(&b.mean))
    }

    pub fn trough(&self) -> Option<&PatternPoint> {
        self.points.iter().min_by(|a, b| a.mean.total_cmp(&b.mean))
    }

    pub fn total_count(&self) -> usize {
        self.points.iter().map(|p| p.count).sum()
    }
}

/// A dataset with a temperature category label per record
#[derive(Debug, Clone)]
pub struct CategorizedDataset<'a> {
    dataset: &'a Dataset,
    labels: Vec<Option<TemperatureCategory>>,
}

impl<'a> CategorizedDataset<'a> {
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn labels(&self) -> &[Option<TemperatureCategory>] {
        &self.labels
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a Record, Option<TemperatureCategory>)> + '_ {
        self.dataset
            .records()
            .iter()
            .zip(self.labels.iter().copied())
    }

    pub fn count(&self, category: TemperatureCategory) -> usize {
        self.labels.iter().filter(|l| **l == Some(category)).count()
    }

    pub fn uncategorized(&self) -> usize {
        self.labels.iter().filter(|l| l.is_none()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub station: String,
    pub x: Variable,
    pub y: Variable,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub variable: Variable,
    pub station: Option<String>,
    /// `counts.len() + 1` equally spaced edges; the last bin includes its upper edge
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

pub struct ViewResolver {
    policy: OutOfRangePolicy,
}

impl ViewResolver {
    pub fn new() -> Self {
        Self {
            policy: OutOfRangePolicy::default(),
        }
    }

    pub fn with_policy(policy: OutOfRangePolicy) -> Self {
        Self { policy }
    }

    /// Mean PM10 per hour of day for one station
    pub fn hourly_mean(&self, dataset: &Dataset, station: &str) -> Result<PatternSeries> {
        let records = dataset.station_records(station)?;
        pattern(station, Grouping::HourOfDay, None, records)
    }

    /// Mean PM10 per calendar month for one station, pooled across all years
    pub fn monthly_mean(&self, dataset: &Dataset, station: &str) -> Result<PatternSeries> {
        let records = dataset.station_records(station)?;
        pattern(station, Grouping::Month, None, records)
    }

    /// Pairwise-complete Pearson correlation over the whole dataset
    pub fn correlation_matrix(&self, dataset: &Dataset, columns: &[Variable]) -> Result<CorrelationMatrix> {
        CorrelationMatrix::compute(dataset.records(), columns)
    }

    pub fn station_correlation_matrix(
        &self,
        dataset: &Dataset,
        station: &str,
        columns: &[Variable],
    ) -> Result<CorrelationMatrix> {
        CorrelationMatrix::compute(dataset.station_records(station)?, columns)
    }

    /// Label every record with its temperature category under the resolver's policy
    pub fn categorize<'a>(&self, dataset: &'a Dataset) -> CategorizedDataset<'a> {
        let labels = dataset
            .records()
            .iter()
            .map(|r| TemperatureCategory::categorize(r.temp, self.policy))
            .collect();

        CategorizedDataset { dataset, labels }
    }

    /// Hourly mean PM10 restricted to one station and one temperature category
    pub fn hourly_mean_by_category(
        &self,
        dataset: &Dataset,
        station: &str,
        category: TemperatureCategory,
    ) -> Result<PatternSeries> {
        dataset.require_station(station)?;
        let categorized = self.categorize(dataset);
        let records = categorized
            .iter()
            .filter(|(r, label)| r.station == station && *label == Some(category))
            .map(|(r, _)| r);

        pattern(station, Grouping::HourOfDay, Some(category), records)
    }

    /// Pairwise-complete (x, y) points, one series per station
    pub fn scatter(&self, dataset: &Dataset, x: Variable, y: Variable) -> Vec<ScatterSeries> {
        let mut by_station: BTreeMap<&str, Vec<(f64, f64)>> =
            dataset.stations().map(|s| (s, Vec::new())).collect();

        for record in dataset.records() {
            if let (Some(xv), Some(yv)) = (x.value(record), y.value(record)) {
                if let Some(points) = by_station.get_mut(record.station.as_str()) {
                    points.push((xv, yv));
                }
            }
        }

        by_station
            .into_iter()
            .map(|(station, points)| ScatterSeries {
                station: station.to_string(),
                x,
                y,
                points,
            })
            .collect()
    }

    /// Equal-width histogram of one variable, optionally for one station
    pub fn histogram(
        &self,
        dataset: &Dataset,
        station: Option<&str>,
        variable: Variable,
        bins: usize,
    ) -> Result<Histogram> {
        if bins == 0 {
            return Err(AnalysisError::InvalidSelection(
                "histogram needs at least one bin".to_string(),
            ));
        }

        let values: Vec<f64> = match station {
            Some(s) => dataset
                .station_records(s)?
                .filter_map(|r| variable.value(r))
                .collect(),
            None => dataset.values(variable).collect(),
        };
        if values.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "no {} values to bin",
                variable
            )));
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let width = if max > min { (max - min) / bins as f64 } else { 1.0 };

        let edges: Vec<f64> = (0..=bins).map(|i| min + width * i as f64).collect();
        let mut counts = vec![0usize; bins];
        for value in values {
            let index = (((value - min) / width) as usize).min(bins - 1);
            counts[index] += 1;
        }

        Ok(Histogram {
            variable,
            station: station.map(str::to_string),
            edges,
            counts,
        })
    }
}

impl Default for ViewResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn pattern<'a>(
    station: &str,
    grouping: Grouping,
    category: Option<TemperatureCategory>,
    records: impl Iterator<Item = &'a Record>,
) -> Result<PatternSeries> {
    let mut groups: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for record in records {
        if let Some(pm10) = record.pm10 {
            let entry = groups.entry(grouping.key(record)).or_insert((0.0, 0));
            entry.0 += pm10;
            entry.1 += 1;
        }
    }

    let range = grouping.key_range();
    let points: Vec<PatternPoint> = groups
        .into_iter()
        .filter(|(key, _)| range.contains(key))
        .map(|(key, (sum, count))| PatternPoint {
            key,
            mean: sum / count as f64,
            count,
        })
        .collect();

    if points.is_empty() {
        let scope = match category {
            Some(c) => format!("{} under {}", station, c.label()),
            None => station.to_string(),
        };
        return Err(AnalysisError::InsufficientData(format!(
            "no PM10 values for {}",
            scope
        )));
    }

    Ok(PatternSeries {
        station: station.to_string(),
        grouping,
        category,
        points,
    })
}
