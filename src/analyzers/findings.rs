use serde::Serialize;

use crate::analyzers::view_resolver::{PatternPoint, ViewResolver};
use crate::error::{AnalysisError, Result};
use crate::models::{Dataset, TemperatureCategory, Variable};

/// Headline numbers for one station, computed rather than transcribed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationFindings {
    pub station: String,
    pub peak_hour: PatternPoint,
    pub trough_hour: PatternPoint,
    pub peak_month: PatternPoint,
    pub trough_month: PatternPoint,
    /// Correlation of PM10 with each weather parameter
    pub correlations: Vec<(Variable, Option<f64>)>,
    /// Mean PM10 per temperature category with its record count
    pub category_means: Vec<(TemperatureCategory, f64, usize)>,
}

impl StationFindings {
    pub fn correlation(&self, variable: Variable) -> Option<f64> {
        self.correlations
            .iter()
            .find(|(v, _)| *v == variable)
            .and_then(|(_, r)| *r)
    }
}

pub fn station_findings(
    resolver: &ViewResolver,
    dataset: &Dataset,
    station: &str,
) -> Result<StationFindings> {
    let hourly = resolver.hourly_mean(dataset, station)?;
    let monthly = resolver.monthly_mean(dataset, station)?;

    let insufficient = || AnalysisError::InsufficientData(format!("no PM10 pattern for {}", station));
    let peak_hour = *hourly.peak().ok_or_else(insufficient)?;
    let trough_hour = *hourly.trough().ok_or_else(insufficient)?;
    let peak_month = *monthly.peak().ok_or_else(insufficient)?;
    let trough_month = *monthly.trough().ok_or_else(insufficient)?;

    let mut columns = vec![Variable::Pm10];
    columns.extend(Variable::WEATHER);
    let correlations = match resolver.station_correlation_matrix(dataset, station, &columns) {
        Ok(matrix) => Variable::WEATHER
            .iter()
            .map(|&v| (v, matrix.get(Variable::Pm10, v)))
            .collect(),
        Err(AnalysisError::InsufficientData(_)) => {
            Variable::WEATHER.iter().map(|&v| (v, None)).collect()
        }
        Err(e) => return Err(e),
    };

    let categorized = resolver.categorize(dataset);
    let category_means = TemperatureCategory::ALL
        .iter()
        .filter_map(|&category| {
            let (sum, count) = categorized
                .iter()
                .filter(|(r, label)| r.station == station && *label == Some(category))
                .filter_map(|(r, _)| r.pm10)
                .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
            (count > 0).then(|| (category, sum / count as f64, count))
        })
        .collect();

    Ok(StationFindings {
        station: station.to_string(),
        peak_hour,
        trough_hour,
        peak_month,
        trough_month,
        correlations,
        category_means,
    })
}
