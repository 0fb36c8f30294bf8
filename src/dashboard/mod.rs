pub mod narrative;
pub mod view_output;

pub use narrative::insight;
pub use view_output::ViewOutput;

use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::analyzers::{station_findings, PatternSeries, ViewResolver};
use crate::error::{AnalysisError, Result};
use crate::models::{Dataset, TemperatureCategory, Variable, View, ViewSelection};
use crate::processors::MedianImputer;
use crate::readers::DataSource;
use crate::settings::Settings;
use crate::utils::constants::DEFAULT_HISTOGRAM_BINS;
use crate::utils::progress::ProgressReporter;

/// One analysis session: the loaded dataset, the resolver, and the outputs
/// already computed for it. The dataset never changes for the lifetime of a
/// session, so cached outputs stay valid until the session is dropped.
pub struct Dashboard {
    dataset: Dataset,
    resolver: ViewResolver,
    histogram_bins: usize,
    cache: HashMap<ViewSelection, ViewOutput>,
}

impl Dashboard {
    pub fn new(dataset: Dataset, resolver: ViewResolver) -> Self {
        Self {
            dataset,
            resolver,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            cache: HashMap::new(),
        }
    }

    pub fn with_histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = bins;
        self
    }

    /// Load the dataset once and prepare it according to the settings
    pub fn open(
        source: &dyn DataSource,
        settings: &Settings,
        progress: &ProgressReporter,
    ) -> Result<Self> {
        progress.set_message(&format!("Loading {}...", source.name()));
        let mut dataset = source.load()?;
        info!(
            "Loaded {} records for {} stations from {}",
            dataset.len(),
            dataset.station_names().len(),
            source.name()
        );

        if dataset.is_empty() {
            return Err(AnalysisError::unavailable(source.name(), "source holds no records"));
        }

        if settings.analysis.impute_missing {
            progress.set_message("Imputing missing values...");
            let (imputed, report) = MedianImputer::new().impute(&dataset);
            info!("Median imputation filled {} values", report.total_filled());
            dataset = imputed;
        }

        progress.finish_and_clear();

        let resolver = ViewResolver::with_policy(settings.analysis.temperature_policy);
        Ok(Self::new(dataset, resolver).with_histogram_bins(settings.analysis.histogram_bins))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn cached_views(&self) -> usize {
        self.cache.len()
    }

    /// Fill in the filters a view needs but the user left open
    pub fn complete_selection(&self, selection: ViewSelection) -> Result<ViewSelection> {
        let mut selection = selection.normalized();

        if let Some(ref station) = selection.station {
            self.dataset.require_station(station)?;
        }

        if selection.view == View::DailyPattern && selection.station.is_none() {
            let first = self.dataset.stations().next().ok_or_else(|| {
                AnalysisError::InsufficientData("dataset holds no stations".to_string())
            })?;
            selection.station = Some(first.to_string());
        }

        if selection.view == View::FurtherAnalysis && selection.category.is_none() {
            selection.category = Some(TemperatureCategory::Cold);
        }

        Ok(selection)
    }

    /// Resolve a selection, reusing the cached output when the same selection was seen before
    pub fn resolve(&mut self, selection: ViewSelection) -> Result<&ViewOutput> {
        let selection = self.complete_selection(selection)?;

        if self.cache.contains_key(&selection) {
            debug!("Cache hit for {}", selection);
        } else {
            debug!("Computing {}", selection);
            let output = self.compute(&selection)?;
            self.cache.insert(selection.clone(), output);
        }

        self.cache.get(&selection).ok_or_else(|| {
            AnalysisError::InvalidSelection(format!("no output cached for {}", selection))
        })
    }

    fn compute(&self, selection: &ViewSelection) -> Result<ViewOutput> {
        let station = selection.station.as_deref();

        match selection.view {
            View::DailyPattern => {
                let station = station.ok_or_else(|| {
                    AnalysisError::InvalidSelection("daily pattern needs a station".to_string())
                })?;
                Ok(ViewOutput::DailyPattern {
                    hourly: self.resolver.hourly_mean(&self.dataset, station)?,
                    monthly: self.resolver.monthly_mean(&self.dataset, station)?,
                    distribution: self.resolver.histogram(
                        &self.dataset,
                        Some(station),
                        Variable::Pm10,
                        self.histogram_bins,
                    )?,
                })
            }
            View::WeatherEffects => {
                let subset;
                let scope = match station {
                    Some(s) => {
                        subset = self.dataset.for_station(s)?;
                        &subset
                    }
                    None => &self.dataset,
                };

                let overall = self.resolver.correlation_matrix(scope, &Variable::ALL)?;
                let mut by_station = Vec::new();
                for s in scope.stations() {
                    match self.resolver.station_correlation_matrix(scope, s, &Variable::ALL) {
                        Ok(m) => by_station.push((s.to_string(), m)),
                        Err(AnalysisError::InsufficientData(reason)) => {
                            warn!("Skipping correlations for {}: {}", s, reason)
                        }
                        Err(e) => return Err(e),
                    }
                }
                let scatter = Variable::WEATHER
                    .iter()
                    .flat_map(|&x| self.resolver.scatter(scope, x, Variable::Pm10))
                    .collect();

                Ok(ViewOutput::WeatherEffects {
                    overall,
                    by_station,
                    scatter,
                })
            }
            View::FurtherAnalysis => {
                let category = selection.category.unwrap_or(TemperatureCategory::Cold);
                let stations: Vec<&str> = match station {
                    Some(s) => vec![s],
                    None => self.dataset.stations().collect(),
                };

                let series = stations
                    .into_iter()
                    .filter_map(|s| self.category_series(s, category).transpose())
                    .collect::<Result<Vec<_>>>()?;
                if series.is_empty() {
                    return Err(AnalysisError::InsufficientData(format!(
                        "no PM10 values under {}",
                        category.label()
                    )));
                }

                Ok(ViewOutput::FurtherAnalysis { category, series })
            }
            View::Conclusion => {
                let mut findings = Vec::new();
                for s in self.dataset.stations() {
                    match station_findings(&self.resolver, &self.dataset, s) {
                        Ok(f) => findings.push(f),
                        Err(AnalysisError::InsufficientData(reason)) => {
                            warn!("Skipping findings for {}: {}", s, reason)
                        }
                        Err(e) => return Err(e),
                    }
                }
                if findings.is_empty() {
                    return Err(AnalysisError::InsufficientData(
                        "no station has PM10 values".to_string(),
                    ));
                }

                Ok(ViewOutput::Conclusion { findings })
            }
        }
    }

    /// `Ok(None)` when the station simply has no data in this category
    fn category_series(
        &self,
        station: &str,
        category: TemperatureCategory,
    ) -> Result<Option<PatternSeries>> {
        match self
            .resolver
            .hourly_mean_by_category(&self.dataset, station, category)
        {
            Ok(series) => Ok(Some(series)),
            Err(AnalysisError::InsufficientData(reason)) => {
                warn!("{}", reason);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    fn record(station: &str, month: u32, hour: u32, pm10: f64, temp: f64) -> Record {
        let ts = Record::timestamp_from_parts(2016, month, 3, hour).unwrap();
        Record::new(ts, station, Some(pm10), Some(temp), Some(temp - 10.0), Some(1030.0 - temp))
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(
            Dataset::new(vec![
                record("Dongsi", 1, 21, 200.0, -6.0),
                record("Dongsi", 1, 13, 120.0, -1.0),
                record("Dongsi", 7, 21, 90.0, 27.0),
                record("Dongsi", 7, 13, 70.0, 32.0),
                record("Wanliu", 1, 21, 160.0, -5.0),
                record("Wanliu", 7, 13, 75.0, 30.0),
                record("Wanliu", 4, 9, 95.0, 12.0),
            ]),
            ViewResolver::new(),
        )
        .with_histogram_bins(5)
    }

    #[test]
    fn test_daily_pattern_defaults_to_first_station() {
        let mut dashboard = dashboard();

        let output = dashboard.resolve(ViewSelection::new(View::DailyPattern)).unwrap();
        match output {
            ViewOutput::DailyPattern { hourly, monthly, distribution } => {
                assert_eq!(hourly.station, "Dongsi");
                assert_eq!(monthly.points.len(), 2);
                assert_eq!(distribution.counts.len(), 5);
                assert_eq!(distribution.total(), 4);
            }
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn test_outputs_are_cached_per_selection() {
        let mut dashboard = dashboard();

        dashboard.resolve(ViewSelection::new(View::DailyPattern)).unwrap();
        dashboard
            .resolve(ViewSelection::new(View::DailyPattern).with_station("Dongsi"))
            .unwrap();
        assert_eq!(dashboard.cached_views(), 1);

        dashboard
            .resolve(ViewSelection::new(View::DailyPattern).with_station("Wanliu"))
            .unwrap();
        assert_eq!(dashboard.cached_views(), 2);
    }

    #[test]
    fn test_unknown_station_is_not_cached() {
        let mut dashboard = dashboard();

        let result = dashboard.resolve(ViewSelection::new(View::DailyPattern).with_station("Beijing-Central"));
        assert!(matches!(result, Err(AnalysisError::UnknownStation { .. })));
        assert_eq!(dashboard.cached_views(), 0);
    }

    #[test]
    fn test_weather_effects_for_one_station() {
        let mut dashboard = dashboard();

        let output = dashboard
            .resolve(ViewSelection::new(View::WeatherEffects).with_station("Dongsi"))
            .unwrap()
            .clone();
        match output {
            ViewOutput::WeatherEffects { overall, by_station, scatter } => {
                assert_eq!(by_station.len(), 1);
                assert_eq!(by_station[0].0, "Dongsi");
                assert_eq!(overall, by_station[0].1);
                assert!(overall.get(Variable::Pm10, Variable::Temp).unwrap() < 0.0);
                // One series per weather parameter for the single station
                assert_eq!(scatter.len(), 3);
            }
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn test_weather_effects_skips_station_with_too_few_records() {
        let mut records = dashboard().dataset().records().to_vec();
        records.push(record("Gucheng", 1, 21, 180.0, -4.0));
        let mut dashboard = Dashboard::new(Dataset::new(records), ViewResolver::new());

        match dashboard.resolve(ViewSelection::new(View::WeatherEffects)).unwrap() {
            ViewOutput::WeatherEffects { overall, by_station, .. } => {
                let stations: Vec<&str> = by_station.iter().map(|(s, _)| s.as_str()).collect();
                assert_eq!(stations, vec!["Dongsi", "Wanliu"]);
                assert!(overall.is_symmetric());
            }
            other => panic!("unexpected output {:?}", other),
        }

        let result = dashboard.resolve(ViewSelection::new(View::WeatherEffects).with_station("Gucheng"));
        assert!(matches!(result, Err(AnalysisError::InsufficientData(_))));
    }

    #[test]
    fn test_further_analysis_skips_stations_without_data() {
        let mut dashboard = dashboard();

        let output = dashboard
            .resolve(ViewSelection::new(View::FurtherAnalysis).with_category(TemperatureCategory::Mild))
            .unwrap();
        match output {
            ViewOutput::FurtherAnalysis { category, series } => {
                assert_eq!(*category, TemperatureCategory::Mild);
                assert_eq!(series.len(), 1);
                assert_eq!(series[0].station, "Wanliu");
            }
            other => panic!("unexpected output {:?}", other),
        }

        let output = dashboard.resolve(ViewSelection::new(View::FurtherAnalysis)).unwrap();
        assert_eq!(output.series().len(), 2);
    }

    #[test]
    fn test_further_analysis_with_no_data_anywhere() {
        let mut dashboard = dashboard();
        let result = dashboard.resolve(ViewSelection::new(View::FurtherAnalysis).with_category(TemperatureCategory::Cool));
        assert!(matches!(result, Err(AnalysisError::InsufficientData(_))));
    }

    #[test]
    fn test_conclusion_findings_per_station() {
        let mut dashboard = dashboard();

        let output = dashboard.resolve(ViewSelection::new(View::Conclusion)).unwrap();
        match output {
            ViewOutput::Conclusion { findings } => {
                assert_eq!(findings.len(), 2);
                assert_eq!(findings[0].station, "Dongsi");
                assert_eq!(findings[0].peak_hour.key, 21);
                assert_eq!(findings[0].peak_month.key, 1);
            }
            other => panic!("unexpected output {:?}", other),
        }
    }
}
