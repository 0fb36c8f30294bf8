use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Data unavailable from {source_name}: {reason}")]
    DataUnavailable { source_name: String, reason: String },

    #[error("Station '{station}' not found (known stations: {})", .known.join(", "))]
    UnknownStation { station: String, known: Vec<String> },

    #[error("Not enough data: {0}")]
    InsufficientData(String),

    #[error("Temperature {temp}°C is outside the categorisation range [-20, 40)")]
    OutOfRangeTemperature { temp: f64 },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl AnalysisError {
    pub(crate) fn unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        AnalysisError::DataUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Errors a user can recover from by changing the selection.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AnalysisError::UnknownStation { .. }
                | AnalysisError::InsufficientData(_)
                | AnalysisError::OutOfRangeTemperature { .. }
                | AnalysisError::InvalidSelection(_)
        )
    }
}
