use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;
use crate::models::TemperatureCategory;

/// Analysis views offered by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    DailyPattern,
    WeatherEffects,
    FurtherAnalysis,
    Conclusion,
}

impl View {
    pub const ALL: [View; 4] = [
        View::DailyPattern,
        View::WeatherEffects,
        View::FurtherAnalysis,
        View::Conclusion,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            View::DailyPattern => "Daily PM10 Pattern",
            View::WeatherEffects => "Weather Effects on PM10",
            View::FurtherAnalysis => "Further Analysis",
            View::Conclusion => "Conclusion",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            View::DailyPattern => "daily-pattern",
            View::WeatherEffects => "weather-effects",
            View::FurtherAnalysis => "further-analysis",
            View::Conclusion => "conclusion",
        }
    }

    pub fn uses_station(&self) -> bool {
        matches!(
            self,
            View::DailyPattern | View::WeatherEffects | View::FurtherAnalysis
        )
    }

    pub fn uses_category(&self) -> bool {
        matches!(self, View::FurtherAnalysis)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

impl FromStr for View {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        let by_number = needle
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| Self::ALL.get(i).copied());

        by_number
            .or_else(|| {
                Self::ALL.into_iter().find(|v| {
                    v.slug().eq_ignore_ascii_case(needle) || v.title().eq_ignore_ascii_case(needle)
                })
            })
            .ok_or_else(|| {
                AnalysisError::InvalidSelection(format!(
                    "unknown view '{}' (expected daily-pattern, weather-effects, further-analysis or conclusion)",
                    needle
                ))
            })
    }
}

/// One user interaction: a view plus its optional filters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewSelection {
    pub view: View,
    pub station: Option<String>,
    pub category: Option<TemperatureCategory>,
}

impl ViewSelection {
    pub fn new(view: View) -> Self {
        Self {
            view,
            station: None,
            category: None,
        }
    }

    pub fn with_station(mut self, station: impl Into<String>) -> Self {
        self.station = Some(station.into());
        self
    }

    pub fn with_category(mut self, category: TemperatureCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Drop filters the view does not read, so equivalent selections compare equal
    pub fn normalized(mut self) -> Self {
        if !self.view.uses_station() {
            self.station = None;
        }
        if !self.view.uses_category() {
            self.category = None;
        }
        self
    }
}

impl fmt::Display for ViewSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.view)?;
        if let Some(ref station) = self.station {
            write!(f, " [station={}]", station)?;
        }
        if let Some(category) = self.category {
            write!(f, " [category={}]", category.slug())?;
        }
        Ok(())
    }
}
