use crate::error::{AnalysisError, Result};
use crate::models::Dataset;
use crate::readers::{CsvReader, DataSource};
use std::fs::File;
use std::path::PathBuf;
use tracing::debug;
use zip::ZipArchive;

/// A zip archive with one CSV per station, as the public PRSA
/// distribution ships (`PRSA_Data_Dongsi_20130301-20170228.csv`, ...)
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    path: PathBuf,
    stations: Vec<String>,
}

impl ArchiveSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stations: Vec::new(),
        }
    }

    /// Only read entries whose file name mentions one of these stations
    pub fn with_stations(mut self, stations: Vec<String>) -> Self {
        self.stations = stations;
        self
    }

    fn wants_entry(&self, entry_name: &str) -> bool {
        if !entry_name.to_ascii_lowercase().ends_with(".csv") {
            return false;
        }
        if self.stations.is_empty() {
            return true;
        }

        let file_name = entry_name.rsplit('/').next().unwrap_or(entry_name);
        let tokens: Vec<&str> = file_name.trim_end_matches(".csv").split(['_', '-', '.']).collect();
        self.stations
            .iter()
            .any(|station| tokens.iter().any(|t| t.eq_ignore_ascii_case(station)))
    }
}

impl DataSource for ArchiveSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Dataset> {
        let source_name = self.name();
        let file = File::open(&self.path).map_err(|e| AnalysisError::unavailable(&source_name, e))?;
        let mut archive =
            ZipArchive::new(file).map_err(|e| AnalysisError::unavailable(&source_name, e))?;

        let reader = CsvReader::new().with_stations(self.stations.clone());
        let mut records = Vec::new();
        let mut entries_read = 0;

        for index in 0..archive.len() {
            let entry = archive
                .by_index(index)
                .map_err(|e| AnalysisError::unavailable(&source_name, e))?;
            let entry_name = entry.name().to_string();

            if entry.is_dir() || !self.wants_entry(&entry_name) {
                debug!("Skipping archive entry {}", entry_name);
                continue;
            }

            let entry_source = format!("{}:{}", source_name, entry_name);
            records.extend(reader.read_from(entry, &entry_source)?);
            entries_read += 1;
        }

        if entries_read == 0 {
            return Err(AnalysisError::unavailable(
                source_name,
                "archive holds no matching CSV entries",
            ));
        }

        debug!("Read {} CSV entries from {}", entries_read, source_name);
        Ok(Dataset::new(records))
    }
}
