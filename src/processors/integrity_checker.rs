use crate::models::{Dataset, Record};
use crate::utils::constants::{CATEGORY_MAX_TEMP, CATEGORY_MIN_TEMP};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
    pub total_records: usize,
    pub complete_records: usize,
    pub violations: Vec<IntegrityViolation>,
    pub station_statistics: BTreeMap<String, StationStatistics>,
}

impl IntegrityReport {
    pub fn count(&self, violation_type: ViolationType) -> usize {
        self.violations
            .iter()
            .filter(|v| v.violation_type == violation_type)
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct IntegrityViolation {
    pub station: String,
    pub timestamp: NaiveDateTime,
    pub violation_type: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationType {
    TemperatureOutOfDomain,
    DuplicateTimestamp,
}

#[derive(Debug, Clone, Default)]
pub struct StationStatistics {
    pub total_records: usize,
    pub complete_records: usize,
    pub missing_pm10: usize,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
}

pub struct IntegrityChecker {
    temp_domain: (f64, f64),
}

impl IntegrityChecker {
    pub fn new() -> Self {
        Self {
            temp_domain: (CATEGORY_MIN_TEMP, CATEGORY_MAX_TEMP),
        }
    }

    /// Check a loaded dataset. Violations are reported, never fatal.
    pub fn check_integrity(&self, dataset: &Dataset) -> IntegrityReport {
        let mut report = IntegrityReport {
            total_records: dataset.len(),
            ..IntegrityReport::default()
        };
        let mut seen: HashSet<(&str, NaiveDateTime)> = HashSet::with_capacity(dataset.len());

        for record in dataset.records() {
            self.check_temperature_domain(record, &mut report);

            if !seen.insert((record.station.as_str(), record.timestamp)) {
                report.violations.push(IntegrityViolation {
                    station: record.station.clone(),
                    timestamp: record.timestamp,
                    violation_type: ViolationType::DuplicateTimestamp,
                    details: format!("duplicate observation for {}", record.timestamp),
                });
            }

            if record.is_complete() {
                report.complete_records += 1;
            }

            let stats = report
                .station_statistics
                .entry(record.station.clone())
                .or_default();

            stats.total_records += 1;
            if record.is_complete() {
                stats.complete_records += 1;
            }
            if record.pm10.is_none() {
                stats.missing_pm10 += 1;
            }
            if let Some(temp) = record.temp {
                stats.min_temp = Some(stats.min_temp.map_or(temp, |t| t.min(temp)));
                stats.max_temp = Some(stats.max_temp.map_or(temp, |t| t.max(temp)));
            }
        }

        report
    }

    fn check_temperature_domain(&self, record: &Record, report: &mut IntegrityReport) {
        let (lower, upper) = self.temp_domain;
        if let Some(temp) = record.temp {
            if !(lower..upper).contains(&temp) {
                report.violations.push(IntegrityViolation {
                    station: record.station.clone(),
                    timestamp: record.timestamp,
                    violation_type: ViolationType::TemperatureOutOfDomain,
                    details: format!(
                        "temperature {} is outside categorisation range [{}, {})",
                        temp, lower, upper
                    ),
                });
            }
        }
    }

    /// Generate a summary report
    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = String::new();

        summary.push_str("=== Integrity Check Report ===\n");
        summary.push_str(&format!("Total Records: {}\n", report.total_records));
        summary.push_str(&format!(
            "Complete Records: {} ({:.1}%)\n",
            report.complete_records,
            percentage(report.complete_records, report.total_records)
        ));
        summary.push_str(&format!(
            "Out-of-domain Temperatures: {}\n",
            report.count(ViolationType::TemperatureOutOfDomain)
        ));
        summary.push_str(&format!(
            "Duplicate Timestamps: {}\n",
            report.count(ViolationType::DuplicateTimestamp)
        ));

        for (station, stats) in &report.station_statistics {
            let temp_range = match (stats.min_temp, stats.max_temp) {
                (Some(lo), Some(hi)) => format!("{:.1}°C to {:.1}°C", lo, hi),
                _ => "no temperature readings".to_string(),
            };
            summary.push_str(&format!(
                "  {}: {} records, {} missing PM10, {}\n",
                station, stats.total_records, stats.missing_pm10, temp_range
            ));
        }

        if !report.violations.is_empty() {
            summary.push_str("\nTop 10 Violations:\n");
            for (i, violation) in report.violations.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. {} at {}: {}\n",
                    i + 1,
                    violation.station,
                    violation.timestamp,
                    violation.details
                ));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}
