use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AnalysisError, Result};
use crate::utils::constants::{CATEGORY_MAX_TEMP, CATEGORY_MIN_TEMP};

/// Ordered partition of the temperature domain [-20, 40) into four bins.
///
/// Each bin includes its lower bound and excludes its upper bound, so a
/// boundary value such as 10.0 belongs to the warmer bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TemperatureCategory {
    Cold,
    Cool,
    Mild,
    Warm,
}

/// What to do with a temperature outside [-20, 40)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutOfRangePolicy {
    /// Leave the record uncategorised
    #[default]
    Exclude,
    /// Assign the nearest bin
    Clamp,
}

impl TemperatureCategory {
    pub const ALL: [TemperatureCategory; 4] = [
        TemperatureCategory::Cold,
        TemperatureCategory::Cool,
        TemperatureCategory::Mild,
        TemperatureCategory::Warm,
    ];

    /// Half-open bounds `[lower, upper)` of the bin
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            TemperatureCategory::Cold => (CATEGORY_MIN_TEMP, 0.0),
            TemperatureCategory::Cool => (0.0, 10.0),
            TemperatureCategory::Mild => (10.0, 20.0),
            TemperatureCategory::Warm => (20.0, CATEGORY_MAX_TEMP),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TemperatureCategory::Cold => "Cold (<0°C)",
            TemperatureCategory::Cool => "Cool (0-10°C)",
            TemperatureCategory::Mild => "Mild (10-20°C)",
            TemperatureCategory::Warm => "Warm (>20°C)",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            TemperatureCategory::Cold => "cold",
            TemperatureCategory::Cool => "cool",
            TemperatureCategory::Mild => "mild",
            TemperatureCategory::Warm => "warm",
        }
    }

    /// Strict classification; temperatures outside the domain are an error
    pub fn classify(temp: f64) -> Result<Self> {
        if temp.is_nan() || !(CATEGORY_MIN_TEMP..CATEGORY_MAX_TEMP).contains(&temp) {
            return Err(AnalysisError::OutOfRangeTemperature { temp });
        }

        Ok(Self::ALL
            .into_iter()
            .find(|category| temp < category.bounds().1)
            .unwrap_or(TemperatureCategory::Warm))
    }

    /// Classification that maps out-of-domain values onto the outermost bins
    pub fn clamp(temp: f64) -> Self {
        if temp < CATEGORY_MIN_TEMP {
            TemperatureCategory::Cold
        } else if temp >= CATEGORY_MAX_TEMP {
            TemperatureCategory::Warm
        } else {
            Self::classify(temp).unwrap_or(TemperatureCategory::Warm)
        }
    }

    /// Classify under a policy. `None` means the record takes no category.
    pub fn categorize(temp: Option<f64>, policy: OutOfRangePolicy) -> Option<Self> {
        let temp = temp.filter(|t| !t.is_nan())?;
        match policy {
            OutOfRangePolicy::Exclude => Self::classify(temp).ok(),
            OutOfRangePolicy::Clamp => Some(Self::clamp(temp)),
        }
    }
}

impl fmt::Display for TemperatureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for TemperatureCategory {
    type Err = AnalysisError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.slug().eq_ignore_ascii_case(needle) || c.label() == needle)
            .ok_or_else(|| {
                AnalysisError::InvalidSelection(format!(
                    "unknown temperature category '{}' (expected cold, cool, mild or warm)",
                    needle
                ))
            })
    }
}

impl FromStr for OutOfRangePolicy {
    type Err = AnalysisError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclude" => Ok(OutOfRangePolicy::Exclude),
            "clamp" => Ok(OutOfRangePolicy::Clamp),
            other => Err(AnalysisError::InvalidSelection(format!(
                "unknown temperature policy '{}' (expected exclude or clamp)",
                other
            ))),
        }
    }
}
