pub mod analyzers;
pub mod cli;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod settings;
pub mod utils;
pub mod writers;

pub use dashboard::{Dashboard, ViewOutput};
pub use error::{AnalysisError, Result};
pub use settings::Settings;
