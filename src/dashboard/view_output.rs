use serde::Serialize;

use crate::analyzers::{CorrelationMatrix, Histogram, PatternSeries, ScatterSeries, StationFindings};
use crate::models::{TemperatureCategory, View};

/// Everything one view needs to draw itself
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewOutput {
    DailyPattern {
        hourly: PatternSeries,
        monthly: PatternSeries,
        distribution: Histogram,
    },
    WeatherEffects {
        overall: CorrelationMatrix,
        by_station: Vec<(String, CorrelationMatrix)>,
        scatter: Vec<ScatterSeries>,
    },
    FurtherAnalysis {
        category: TemperatureCategory,
        series: Vec<PatternSeries>,
    },
    Conclusion {
        findings: Vec<StationFindings>,
    },
}

impl ViewOutput {
    pub fn view(&self) -> View {
        match self {
            ViewOutput::DailyPattern { .. } => View::DailyPattern,
            ViewOutput::WeatherEffects { .. } => View::WeatherEffects,
            ViewOutput::FurtherAnalysis { .. } => View::FurtherAnalysis,
            ViewOutput::Conclusion { .. } => View::Conclusion,
        }
    }

    /// Time-pattern series carried by the view, in display order
    pub fn series(&self) -> Vec<&PatternSeries> {
        match self {
            ViewOutput::DailyPattern { hourly, monthly, .. } => vec![hourly, monthly],
            ViewOutput::FurtherAnalysis { series, .. } => series.iter().collect(),
            ViewOutput::WeatherEffects { .. } | ViewOutput::Conclusion { .. } => Vec::new(),
        }
    }
}
