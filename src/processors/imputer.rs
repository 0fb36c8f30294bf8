use crate::models::{Dataset, Record, Variable};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImputationReport {
    /// Median used per column; absent when the column had no values at all
    pub medians: BTreeMap<Variable, f64>,
    /// Number of filled cells per column
    pub filled: BTreeMap<Variable, usize>,
}

impl ImputationReport {
    pub fn total_filled(&self) -> usize {
        self.filled.values().sum()
    }
}

/// Replaces missing measurements with the column median over non-missing values.
/// Station and timestamp are never touched.
pub struct MedianImputer {
    variables: Vec<Variable>,
}

impl MedianImputer {
    pub fn new() -> Self {
        Self {
            variables: Variable::ALL.to_vec(),
        }
    }

    pub fn with_variables(variables: &[Variable]) -> Self {
        Self {
            variables: variables.to_vec(),
        }
    }

    pub fn impute(&self, dataset: &Dataset) -> (Dataset, ImputationReport) {
        let mut report = ImputationReport::default();

        for &variable in &self.variables {
            let mut values: Vec<f64> = dataset.values(variable).collect();
            if let Some(median) = median(&mut values) {
                report.medians.insert(variable, median);
            }
        }

        let records: Vec<Record> = dataset
            .records()
            .iter()
            .map(|record| {
                let mut filled = record.clone();
                for (&variable, &median) in &report.medians {
                    let slot = match variable {
                        Variable::Pm10 => &mut filled.pm10,
                        Variable::Temp => &mut filled.temp,
                        Variable::Dewp => &mut filled.dewp,
                        Variable::Pres => &mut filled.pres,
                    };
                    if slot.is_none() {
                        *slot = Some(median);
                        *report.filled.entry(variable).or_default() += 1;
                    }
                }
                filled
            })
            .collect();

        debug!("Imputed {} missing values", report.total_filled());
        (Dataset::new(records), report)
    }
}

impl Default for MedianImputer {
    fn default() -> Self {
        Self::new()
    }
}

/// Median of the slice, averaging the middle pair for even lengths
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(hour: u32, pm10: Option<f64>, temp: Option<f64>) -> Record {
        let ts = Record::timestamp_from_parts(2016, 12, 1, hour).unwrap();
        Record::new(ts, "Dongsi", pm10, temp, None, Some(1030.0))
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [3.0]), Some(3.0));
        assert_eq!(median(&mut [9.0, 1.0, 5.0]), Some(5.0));
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_impute_fills_with_column_median() {
        let dataset = Dataset::new(vec![
            record(0, Some(100.0), Some(-3.0)),
            record(1, None, Some(-1.0)),
            record(2, Some(300.0), None),
            record(3, Some(200.0), Some(1.0)),
        ]);

        let (imputed, report) = MedianImputer::new().impute(&dataset);

        assert_eq!(imputed.records()[1].pm10, Some(200.0));
        assert_eq!(imputed.records()[2].temp, Some(-1.0));
        assert_eq!(report.filled.get(&Variable::Pm10), Some(&1));
        assert_eq!(report.filled.get(&Variable::Temp), Some(&1));
        // DEWP has no values at all and stays missing
        assert_eq!(report.medians.get(&Variable::Dewp), None);
        assert_eq!(imputed.missing_count(Variable::Dewp), 4);
        assert_eq!(report.total_filled(), 2);
    }

    #[test]
    fn test_impute_preserves_station_and_timestamp() {
        let dataset = Dataset::new(vec![
            record(5, None, None),
            record(6, Some(10.0), Some(2.0)),
        ]);

        let (imputed, _) = MedianImputer::new().impute(&dataset);

        for (before, after) in dataset.records().iter().zip(imputed.records()) {
            assert_eq!(before.station, after.station);
            assert_eq!(before.timestamp, after.timestamp);
        }
        assert_eq!(imputed.station_names(), dataset.station_names());
    }

    #[test]
    fn test_impute_selected_variables_only() {
        let dataset = Dataset::new(vec![record(0, None, None), record(1, Some(10.0), Some(2.0))]);

        let (imputed, _) = MedianImputer::with_variables(&[Variable::Temp]).impute(&dataset);

        assert_eq!(imputed.records()[0].pm10, None);
        assert_eq!(imputed.records()[0].temp, Some(2.0));
    }
}
