use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::Result;
use crate::models::OutOfRangePolicy;
use crate::utils::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_DATA_PATH, DEFAULT_HISTOGRAM_BINS, DEFAULT_PRECISION, ENV_PREFIX,
    KNOWN_STATIONS,
};

/// Layered configuration: defaults, then `airq.toml` (or `--config`), then
/// `AIRQ_<SECTION>__<KEY>` environment variables (lists comma separated).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub data: DataSettings,
    #[validate(nested)]
    pub analysis: AnalysisSettings,
    #[validate(nested)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DataSettings {
    pub path: PathBuf,
    pub use_mmap: bool,
    /// Stations a source may contain
    #[validate(length(min = 1))]
    pub stations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnalysisSettings {
    pub temperature_policy: OutOfRangePolicy,
    pub impute_missing: bool,
    #[validate(range(min = 1, max = 200))]
    pub histogram_bins: usize,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OutputSettings {
    #[validate(range(max = 6))]
    pub precision: usize,
}

impl Settings {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let builder = Config::builder()
            .set_default("data.path", DEFAULT_DATA_PATH)?
            .set_default("data.use_mmap", false)?
            .set_default("data.stations", KNOWN_STATIONS.to_vec())?
            .set_default("analysis.temperature_policy", "exclude")?
            .set_default("analysis.impute_missing", false)?
            .set_default("analysis.histogram_bins", DEFAULT_HISTOGRAM_BINS as u64)?
            .set_default("output.precision", DEFAULT_PRECISION as u64)?;

        let builder = match config_path {
            Some(path) => builder.add_source(File::from(path).format(FileFormat::Toml)),
            None => builder.add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false)),
        };

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("data.stations")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data: DataSettings {
                path: PathBuf::from(DEFAULT_DATA_PATH),
                use_mmap: false,
                stations: KNOWN_STATIONS.iter().map(|s| s.to_string()).collect(),
            },
            analysis: AnalysisSettings {
                temperature_policy: OutOfRangePolicy::default(),
                impute_missing: false,
                histogram_bins: DEFAULT_HISTOGRAM_BINS,
            },
            output: OutputSettings {
                precision: DEFAULT_PRECISION,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use std::io::Write;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::NamedTempFile;

    // Environment variables are process-wide; loads must not interleave with them
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn config_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_file_overrides_defaults() -> Result<()> {
        let _env = env_lock();
        let file = config_file(
            "[data]\npath = \"archive/PRSA2017.zip\"\n\n[analysis]\ntemperature_policy = \"clamp\"\nhistogram_bins = 12\n",
        );

        let settings = Settings::load(Some(file.path()))?;

        assert_eq!(settings.data.path, PathBuf::from("archive/PRSA2017.zip"));
        assert!(!settings.data.use_mmap);
        assert_eq!(settings.analysis.temperature_policy, OutOfRangePolicy::Clamp);
        assert_eq!(settings.analysis.histogram_bins, 12);
        assert!(!settings.analysis.impute_missing);
        assert_eq!(settings.output.precision, DEFAULT_PRECISION);
        Ok(())
    }

    #[test]
    fn test_out_of_range_setting_fails_validation() {
        let _env = env_lock();
        let file = config_file("[output]\nprecision = 9\n");

        assert!(matches!(
            Settings::load(Some(file.path())),
            Err(AnalysisError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_policy_fails() {
        let _env = env_lock();
        let file = config_file("[analysis]\ntemperature_policy = \"round\"\n");
        assert!(matches!(
            Settings::load(Some(file.path())),
            Err(AnalysisError::Config(_))
        ));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let _env = env_lock();
        let missing = NamedTempFile::new().unwrap().path().with_extension("absent.toml");
        assert!(Settings::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_environment_overrides_file() -> Result<()> {
        let _env = env_lock();
        let file = config_file("[analysis]\ntemperature_policy = \"exclude\"\nhistogram_bins = 12\n");

        std::env::set_var("AIRQ_ANALYSIS__TEMPERATURE_POLICY", "clamp");
        std::env::set_var("AIRQ_DATA__STATIONS", "Dongsi,Gucheng");
        let loaded = Settings::load(Some(file.path()));
        std::env::remove_var("AIRQ_ANALYSIS__TEMPERATURE_POLICY");
        std::env::remove_var("AIRQ_DATA__STATIONS");

        let settings = loaded?;
        assert_eq!(settings.analysis.temperature_policy, OutOfRangePolicy::Clamp);
        assert_eq!(settings.analysis.histogram_bins, 12);
        assert_eq!(settings.data.stations, vec!["Dongsi", "Gucheng"]);
        Ok(())
    }

    #[test]
    fn test_empty_station_list_fails_validation() {
        let _env = env_lock();
        let file = config_file("[data]\nstations = []\n");
        assert!(matches!(
            Settings::load(Some(file.path())),
            Err(AnalysisError::Validation(_))
        ));
    }

    #[test]
    fn test_default_matches_builtin_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.data.path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(settings.analysis.temperature_policy, OutOfRangePolicy::Exclude);
        assert_eq!(settings.data.stations, vec!["Dongsi", "Wanliu"]);
        assert!(settings.validate().is_ok());
    }
}
