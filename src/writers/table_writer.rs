use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::analyzers::{CorrelationMatrix, PatternPoint, PatternSeries};
use crate::dashboard::ViewOutput;
use crate::error::{AnalysisError, Result};
use crate::models::Variable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl FromStr for ExportFormat {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(AnalysisError::InvalidSelection(format!(
                "Unsupported export format: {}",
                s
            ))),
        }
    }
}

/// One row of the long-format CSV export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub section: String,
    pub station: String,
    pub key: String,
    pub value: Option<f64>,
    pub count: Option<usize>,
}

impl ExportRow {
    fn new(section: impl Into<String>, station: impl Into<String>, key: impl ToString) -> Self {
        Self {
            section: section.into(),
            station: station.into(),
            key: key.to_string(),
            value: None,
            count: None,
        }
    }

    fn value(mut self, value: Option<f64>) -> Self {
        self.value = value;
        self
    }

    fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

pub struct TableWriter {
    format: ExportFormat,
}

impl TableWriter {
    pub fn new() -> Self {
        Self {
            format: ExportFormat::default(),
        }
    }

    pub fn with_format(format: ExportFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    /// Write a resolved view to `path`, creating parent directories as needed
    pub fn write_output(&self, output: &ViewOutput, path: &Path) -> Result<usize> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = BufWriter::new(File::create(path)?);
        match self.format {
            ExportFormat::Json => {
                self.write_json(output, file)?;
                Ok(1)
            }
            ExportFormat::Csv => self.write_csv(output, file),
        }
    }

    pub fn write_json<W: Write>(&self, output: &ViewOutput, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, output)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Returns the number of data rows written
    pub fn write_csv<W: Write>(&self, output: &ViewOutput, writer: W) -> Result<usize> {
        let rows = export_rows(output);
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(rows.len())
    }
}

impl Default for TableWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten a view into tidy rows. Scatter points are left to the JSON export.
pub fn export_rows(output: &ViewOutput) -> Vec<ExportRow> {
    let mut rows = Vec::new();

    match output {
        ViewOutput::DailyPattern {
            hourly,
            monthly,
            distribution,
        } => {
            series_rows(&mut rows, "hourly", hourly);
            series_rows(&mut rows, "monthly", monthly);

            let station = distribution.station.clone().unwrap_or_else(|| "all".to_string());
            for (i, count) in distribution.counts.iter().enumerate() {
                let key = format!("{:.2}..{:.2}", distribution.edges[i], distribution.edges[i + 1]);
                rows.push(
                    ExportRow::new("distribution", station.as_str(), key)
                        .value(Some(distribution.edges[i]))
                        .count(*count),
                );
            }
        }
        ViewOutput::WeatherEffects {
            overall, by_station, ..
        } => {
            matrix_rows(&mut rows, "all", overall);
            for (station, matrix) in by_station {
                matrix_rows(&mut rows, station, matrix);
            }
        }
        ViewOutput::FurtherAnalysis { category, series } => {
            let section = format!("hourly:{}", category.slug());
            for s in series {
                series_rows(&mut rows, &section, s);
            }
        }
        ViewOutput::Conclusion { findings } => {
            for f in findings {
                let station = f.station.as_str();
                for (section, point) in [
                    ("peak_hour", &f.peak_hour),
                    ("trough_hour", &f.trough_hour),
                    ("peak_month", &f.peak_month),
                    ("trough_month", &f.trough_month),
                ] {
                    rows.push(point_row(section, station, point));
                }
                for (variable, r) in &f.correlations {
                    rows.push(
                        ExportRow::new("correlation", station, pair_key(Variable::Pm10, *variable))
                            .value(*r),
                    );
                }
                for (category, mean, count) in &f.category_means {
                    rows.push(
                        ExportRow::new("category_mean", station, category.slug())
                            .value(Some(*mean))
                            .count(*count),
                    );
                }
            }
        }
    }

    rows
}

fn point_row(section: &str, station: &str, point: &PatternPoint) -> ExportRow {
    ExportRow::new(section, station, point.key)
        .value(Some(point.mean))
        .count(point.count)
}

fn series_rows(rows: &mut Vec<ExportRow>, section: &str, series: &PatternSeries) {
    rows.extend(
        series
            .points
            .iter()
            .map(|p| point_row(section, &series.station, p)),
    );
}

/// Upper triangle only, diagonal excluded
fn matrix_rows(rows: &mut Vec<ExportRow>, station: &str, matrix: &CorrelationMatrix) {
    for (i, &a) in matrix.variables.iter().enumerate() {
        for &b in &matrix.variables[i + 1..] {
            let mut row = ExportRow::new("correlation", station, pair_key(a, b)).value(matrix.get(a, b));
            row.count = matrix.pair_count(a, b);
            rows.push(row);
        }
    }
}

fn pair_key(a: Variable, b: Variable) -> String {
    format!("{}~{}", a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::{Grouping, Histogram};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn daily_output() -> ViewOutput {
        let series = |grouping, points: Vec<(u32, f64, usize)>| PatternSeries {
            station: "Dongsi".to_string(),
            grouping,
            category: None,
            points: points
                .into_iter()
                .map(|(key, mean, count)| PatternPoint { key, mean, count })
                .collect(),
        };

        ViewOutput::DailyPattern {
            hourly: series(Grouping::HourOfDay, vec![(13, 95.3, 10), (21, 130.3, 12)]),
            monthly: series(Grouping::Month, vec![(3, 142.6, 20)]),
            distribution: Histogram {
                variable: Variable::Pm10,
                station: Some("Dongsi".to_string()),
                edges: vec![0.0, 100.0, 200.0],
                counts: vec![7, 3],
            },
        }
    }

    #[test]
    fn test_export_rows_for_daily_pattern() {
        let rows = export_rows(&daily_output());

        assert_eq!(rows.len(), 5);
        assert_eq!(
            rows[1],
            ExportRow {
                section: "hourly".to_string(),
                station: "Dongsi".to_string(),
                key: "21".to_string(),
                value: Some(130.3),
                count: Some(12),
            }
        );
        assert_eq!(rows[2].section, "monthly");
        assert_eq!(rows[4].key, "100.00..200.00");
        assert_eq!(rows[4].count, Some(3));
    }

    #[test]
    fn test_write_csv_and_json_files() {
        let dir = TempDir::new().unwrap();
        let output = daily_output();

        let csv_path = dir.path().join("nested").join("daily.csv");
        let written = TableWriter::with_format(ExportFormat::Csv)
            .write_output(&output, &csv_path)
            .unwrap();
        assert_eq!(written, 5);

        let contents = std::fs::read_to_string(&csv_path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("section,station,key,value,count"));
        assert_eq!(lines.next(), Some("hourly,Dongsi,13,95.3,10"));

        let json_path = dir.path().join("daily.json");
        TableWriter::with_format(ExportFormat::Json)
            .write_output(&output, &json_path)
            .unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(value["view"], "daily_pattern");
        assert_eq!(value["hourly"]["points"][1]["key"], 21);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!(
            ExportFormat::from_path(Path::new("out/table.csv")),
            Some(ExportFormat::Csv)
        );
        assert_eq!(ExportFormat::from_path(Path::new("out/table.parquet")), None);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }
}
