use crate::error::{AnalysisError, Result};
use crate::models::{Dataset, Variable};
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DatasetOverview {
    pub total_records: usize,
    pub station_counts: Vec<(String, usize)>,
    pub time_range: (NaiveDateTime, NaiveDateTime),
    pub complete_records: usize,
    pub columns: Vec<ColumnSummary>,
}

#[derive(Debug, Serialize)]
pub struct ColumnSummary {
    pub variable: Variable,
    pub missing: usize,
    pub missing_percentage: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

pub struct DatasetAnalyzer;

impl DatasetAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, dataset: &Dataset) -> Result<DatasetOverview> {
        let time_range = dataset
            .time_range()
            .ok_or_else(|| AnalysisError::InsufficientData("dataset holds no records".to_string()))?;

        let station_counts = dataset
            .stations()
            .map(|station| {
                let count = dataset
                    .records()
                    .iter()
                    .filter(|r| r.station == station)
                    .count();
                (station.to_string(), count)
            })
            .collect();

        let columns = Variable::ALL
            .iter()
            .map(|&variable| self.summarize_column(dataset, variable))
            .collect();

        Ok(DatasetOverview {
            total_records: dataset.len(),
            station_counts,
            time_range,
            complete_records: dataset.records().iter().filter(|r| r.is_complete()).count(),
            columns,
        })
    }

    fn summarize_column(&self, dataset: &Dataset, variable: Variable) -> ColumnSummary {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut count = 0usize;

        for value in dataset.values(variable) {
            min = min.min(value);
            max = max.max(value);
            sum += value;
            count += 1;
        }

        let missing = dataset.len() - count;
        let (min, max, mean) = if count > 0 {
            (Some(min), Some(max), Some(sum / count as f64))
        } else {
            (None, None, None)
        };

        ColumnSummary {
            variable,
            missing,
            missing_percentage: 100.0 * missing as f64 / dataset.len().max(1) as f64,
            min,
            max,
            mean,
        }
    }
}

impl Default for DatasetAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetOverview {
    pub fn summary(&self) -> String {
        let stations = self
            .station_counts
            .iter()
            .map(|(name, count)| format!("{} ({})", name, count))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Parameters: PM10, TEMP, DEWP, PRES\n\
            Stations: {}\n\
            Time Range: {} to {} ({} days)\n\
            Records: {} total, {} complete ({:.1}%)",
            stations,
            self.time_range.0,
            self.time_range.1,
            self.time_range
                .1
                .signed_duration_since(self.time_range.0)
                .num_days(),
            self.total_records,
            self.complete_records,
            100.0 * self.complete_records as f64 / self.total_records.max(1) as f64
        )
    }

    pub fn detailed_summary(&self) -> String {
        let mut lines = vec![self.summary(), String::new(), "Missing Values:".to_string()];

        for column in &self.columns {
            let range = match (column.min, column.max, column.mean) {
                (Some(min), Some(max), Some(mean)) => {
                    format!("range {:.1} to {:.1}, mean {:.1} {}", min, max, mean, column.variable.units())
                }
                _ => "No valid measurements".to_string(),
            };
            lines.push(format!(
                "- {:<5} {:>7} missing ({:>5.2}%), {}",
                column.variable.column_name(),
                column.missing,
                column.missing_percentage,
                range
            ));
        }

        lines.join("\n")
    }
}
