use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;
use crate::models::Record;
use crate::utils::constants::{COL_DEWP, COL_PM10, COL_PRES, COL_TEMP};

/// Numeric measurement columns carried by every record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variable {
    Pm10,
    Temp,
    Dewp,
    Pres,
}

impl Variable {
    pub const ALL: [Variable; 4] = [Variable::Pm10, Variable::Temp, Variable::Dewp, Variable::Pres];

    /// Weather parameters compared against PM10
    pub const WEATHER: [Variable; 3] = [Variable::Temp, Variable::Dewp, Variable::Pres];

    pub fn column_name(&self) -> &'static str {
        match self {
            Variable::Pm10 => COL_PM10,
            Variable::Temp => COL_TEMP,
            Variable::Dewp => COL_DEWP,
            Variable::Pres => COL_PRES,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Variable::Pm10 => "PM10",
            Variable::Temp => "Temperature",
            Variable::Dewp => "Dew Point",
            Variable::Pres => "Air Pressure",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            Variable::Pm10 => "µg/m³",
            Variable::Temp | Variable::Dewp => "°C",
            Variable::Pres => "hPa",
        }
    }

    pub fn value(&self, record: &Record) -> Option<f64> {
        match self {
            Variable::Pm10 => record.pm10,
            Variable::Temp => record.temp,
            Variable::Dewp => record.dewp,
            Variable::Pres => record.pres,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

impl FromStr for Variable {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PM10" => Ok(Variable::Pm10),
            "TEMP" => Ok(Variable::Temp),
            "DEWP" => Ok(Variable::Dewp),
            "PRES" => Ok(Variable::Pres),
            other => Err(AnalysisError::InvalidSelection(format!(
                "unknown variable '{}' (expected PM10, TEMP, DEWP or PRES)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_from_str() {
        assert_eq!("pm10".parse::<Variable>().unwrap(), Variable::Pm10);
        assert_eq!(" TEMP ".parse::<Variable>().unwrap(), Variable::Temp);
        assert_eq!("dewp".parse::<Variable>().unwrap(), Variable::Dewp);
        assert_eq!("Pres".parse::<Variable>().unwrap(), Variable::Pres);
        assert!("RAIN".parse::<Variable>().is_err());
    }

    #[test]
    fn test_column_names_round_trip_display() {
        for variable in Variable::ALL {
            assert_eq!(
                variable.to_string().parse::<Variable>().unwrap(),
                variable
            );
        }
    }
}
