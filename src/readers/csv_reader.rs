use crate::error::{AnalysisError, Result};
use crate::models::{Dataset, Record};
use crate::readers::DataSource;
use crate::utils::constants::{
    DEFAULT_BUFFER_SIZE, MISSING_MARKERS, REQUIRED_COLUMNS,
};
use memmap2::Mmap;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;
use validator::Validate;

/// Raw CSV row, parsed into a [`Record`] in a second step so that every
/// failure can name its row and column.
#[derive(Debug, Deserialize)]
struct RawRow {
    year: String,
    month: String,
    day: String,
    hour: String,
    station: String,
    #[serde(rename = "PM10")]
    pm10: Option<String>,
    #[serde(rename = "TEMP")]
    temp: Option<String>,
    #[serde(rename = "DEWP")]
    dewp: Option<String>,
    #[serde(rename = "PRES")]
    pres: Option<String>,
}

pub struct CsvReader {
    use_mmap: bool,
    stations: Vec<String>,
}

impl CsvReader {
    pub fn new() -> Self {
        Self {
            use_mmap: false,
            stations: Vec::new(),
        }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self {
            use_mmap,
            stations: Vec::new(),
        }
    }

    /// Reject rows from any other station. An empty list accepts every station.
    pub fn with_stations(mut self, stations: Vec<String>) -> Self {
        self.stations = stations;
        self
    }

    /// Read every record of a CSV file
    pub fn read_path(&self, path: &Path) -> Result<Vec<Record>> {
        let source_name = path.display().to_string();
        let file = File::open(path).map_err(|e| AnalysisError::unavailable(&source_name, e))?;

        if self.use_mmap {
            let mmap = unsafe { Mmap::map(&file) }
                .map_err(|e| AnalysisError::unavailable(&source_name, e))?;
            self.read_from(&mmap[..], &source_name)
        } else {
            self.read_from(file, &source_name)
        }
    }

    /// Read records from any byte stream holding the CSV text
    pub fn read_from<R: Read>(&self, reader: R, source_name: &str) -> Result<Vec<Record>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .buffer_capacity(DEFAULT_BUFFER_SIZE)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| AnalysisError::unavailable(source_name, e))?
            .clone();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|col| !headers.iter().any(|h| h == *col))
            .collect();
        if !missing.is_empty() {
            return Err(AnalysisError::unavailable(
                source_name,
                format!("missing required columns: {}", missing.join(", ")),
            ));
        }

        let mut records = Vec::new();
        for (index, row) in csv_reader.deserialize::<RawRow>().enumerate() {
            // Header is line 1
            let line = index + 2;
            let record = row
                .map_err(AnalysisError::from)
                .and_then(|raw| self.parse_row(raw))
                .map_err(|e| AnalysisError::unavailable(source_name, format!("line {}: {}", line, e)))?;
            records.push(record);
        }

        debug!("Read {} records from {}", records.len(), source_name);
        Ok(records)
    }

    fn parse_row(&self, raw: RawRow) -> Result<Record> {
        if !self.stations.is_empty()
            && !self.stations.iter().any(|s| s.eq_ignore_ascii_case(&raw.station))
        {
            return Err(AnalysisError::InvalidFormat(format!(
                "station '{}' is not one of {}",
                raw.station,
                self.stations.join(", ")
            )));
        }

        let timestamp = Record::timestamp_from_parts(
            parse_integer(&raw.year, "year")?,
            parse_integer(&raw.month, "month")?,
            parse_integer(&raw.day, "day")?,
            parse_integer(&raw.hour, "hour")?,
        )?;

        let record = Record::new(
            timestamp,
            raw.station,
            parse_measurement(raw.pm10.as_deref(), "PM10")?,
            parse_measurement(raw.temp.as_deref(), "TEMP")?,
            parse_measurement(raw.dewp.as_deref(), "DEWP")?,
            parse_measurement(raw.pres.as_deref(), "PRES")?,
        );
        record.validate()?;

        Ok(record)
    }
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_integer<T: FromStr>(value: &str, column: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        AnalysisError::InvalidFormat(format!("invalid {}: '{}'", column, value))
    })
}

fn parse_measurement(value: Option<&str>, column: &str) -> Result<Option<f64>> {
    let value = match value.map(str::trim) {
        None => return Ok(None),
        Some(v) if MISSING_MARKERS.contains(&v) => return Ok(None),
        Some(v) => v,
    };

    let parsed = value.parse::<f64>().map_err(|_| {
        AnalysisError::InvalidFormat(format!("invalid {}: '{}'", column, value))
    })?;

    if !parsed.is_finite() {
        return Err(AnalysisError::InvalidFormat(format!(
            "non-finite {}: '{}'",
            column, value
        )));
    }

    Ok(Some(parsed))
}

/// A single CSV file on disk
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    use_mmap: bool,
    stations: Vec<String>,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            use_mmap: false,
            stations: Vec::new(),
        }
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn with_stations(mut self, stations: Vec<String>) -> Self {
        self.stations = stations;
        self
    }
}

impl DataSource for CsvSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Dataset> {
        let records = CsvReader::with_mmap(self.use_mmap)
            .with_stations(self.stations.clone())
            .read_path(&self.path)?;
        Ok(Dataset::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "No,year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,RAIN,wd,WSPM,station";

    fn write_csv(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_read_prsa_layout() -> Result<()> {
        let file = write_csv(&[
            HEADER,
            "1,2013,3,1,0,4,4,4,7,300,77,-0.7,1023,-18.8,0,NNW,4.4,Dongsi",
            "2,2013,3,1,1,8,NA,4,7,300,77,-1.1,1023.2,-18.2,0,N,4.7,Dongsi",
            "3,2013,3,1,0,3,6,13,17,300,85,NA,1025.1,-20.5,0,NW,5.6,Wanliu",
        ]);

        let reader = CsvReader::new();
        let records = reader.read_path(file.path())?;

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].station, "Dongsi");
        assert_eq!(records[0].timestamp.to_string(), "2013-03-01 00:00:00");
        assert_eq!(records[0].pm10, Some(4.0));
        assert_eq!(records[0].temp, Some(-0.7));
        assert_eq!(records[0].pres, Some(1023.0));
        assert_eq!(records[0].dewp, Some(-18.8));
        assert_eq!(records[1].pm10, None);
        assert_eq!(records[2].temp, None);
        assert_eq!(records[2].station, "Wanliu");

        Ok(())
    }

    #[test]
    fn test_mmap_matches_buffered() -> Result<()> {
        let file = write_csv(&[
            "year,month,day,hour,station,PM10,TEMP,DEWP,PRES",
            "2014,7,4,12,Wanliu,55,28.5,19.0,1001.2",
            "2014,7,4,13,Wanliu,,29.0,19.1,1000.9",
        ]);

        let buffered = CsvReader::new().read_path(file.path())?;
        let mapped = CsvReader::with_mmap(true).read_path(file.path())?;

        assert_eq!(buffered, mapped);
        assert_eq!(mapped[1].pm10, None);
        Ok(())
    }

    #[test]
    fn test_non_integer_date_part_fails_load() {
        let file = write_csv(&[
            "year,month,day,hour,station,PM10,TEMP,DEWP,PRES",
            "2014,7,4,12,Wanliu,55,28.5,19.0,1001.2",
            "2014,7,4,12.5,Wanliu,55,28.5,19.0,1001.2",
        ]);

        match CsvReader::new().read_path(file.path()) {
            Err(AnalysisError::DataUnavailable { reason, .. }) => {
                assert!(reason.contains("line 3"), "{}", reason);
                assert!(reason.contains("hour"), "{}", reason);
            }
            other => panic!("expected DataUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_impossible_date_fails_load() {
        let file = write_csv(&[
            "year,month,day,hour,station,PM10,TEMP,DEWP,PRES",
            "2015,2,29,0,Dongsi,55,1.0,-9.0,1030.0",
        ]);

        assert!(matches!(
            CsvReader::new().read_path(file.path()),
            Err(AnalysisError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn test_negative_pm10_fails_load() {
        let file = write_csv(&[
            "year,month,day,hour,station,PM10,TEMP,DEWP,PRES",
            "2015,2,28,0,Dongsi,-5,1.0,-9.0,1030.0",
        ]);

        assert!(CsvReader::new().read_path(file.path()).is_err());
    }

    #[test]
    fn test_missing_column_fails_load() {
        let file = write_csv(&[
            "year,month,day,hour,station,PM10,TEMP,PRES",
            "2015,2,28,0,Dongsi,5,1.0,1030.0",
        ]);

        match CsvReader::new().read_path(file.path()) {
            Err(AnalysisError::DataUnavailable { reason, .. }) => {
                assert_eq!(reason, "missing required columns: DEWP");
            }
            other => panic!("expected DataUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_infinite_measurement_fails_load() {
        let file = write_csv(&[
            "year,month,day,hour,station,PM10,TEMP,DEWP,PRES",
            "2015,2,28,0,Dongsi,5,inf,-9.0,1030.0",
        ]);

        match CsvReader::new().read_path(file.path()) {
            Err(AnalysisError::DataUnavailable { reason, .. }) => {
                assert!(reason.contains("line 2"), "{}", reason);
                assert!(reason.contains("TEMP"), "{}", reason);
            }
            other => panic!("expected DataUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_station_outside_set_fails_load() {
        let file = write_csv(&[
            "year,month,day,hour,station,PM10,TEMP,DEWP,PRES",
            "2015,2,28,0,Dongsi,5,1.0,-9.0,1030.0",
            "2015,2,28,0,Tiantan,7,1.2,-9.1,1030.2",
        ]);
        let stations = vec!["Dongsi".to_string(), "Wanliu".to_string()];

        match CsvSource::new(file.path()).with_stations(stations).load() {
            Err(AnalysisError::DataUnavailable { reason, .. }) => {
                assert!(reason.contains("line 3"), "{}", reason);
                assert!(reason.contains("Tiantan"), "{}", reason);
            }
            other => panic!("expected DataUnavailable, got {:?}", other),
        }

        // Without a station set every station is accepted
        assert_eq!(CsvSource::new(file.path()).load().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_file_is_data_unavailable() {
        let source = CsvSource::new("does/not/exist.csv");
        assert!(matches!(
            source.load(),
            Err(AnalysisError::DataUnavailable { .. })
        ));
    }
}
