pub mod archive_reader;
pub mod csv_reader;

pub use archive_reader::ArchiveSource;
pub use csv_reader::{CsvReader, CsvSource};

use crate::error::Result;
use crate::models::Dataset;
use std::path::Path;

/// Where the dataset comes from. Loaded once per session.
pub trait DataSource {
    fn name(&self) -> String;

    fn load(&self) -> Result<Dataset>;
}

/// Pick a source implementation from the file extension. Both sources only
/// accept rows of `stations`; an archive also skips entries of other stations.
pub fn open_source(path: &Path, use_mmap: bool, stations: &[String]) -> Box<dyn DataSource> {
    let is_zip = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"));

    if is_zip {
        Box::new(ArchiveSource::new(path).with_stations(stations.to_vec()))
    } else {
        Box::new(
            CsvSource::new(path)
                .with_mmap(use_mmap)
                .with_stations(stations.to_vec()),
        )
    }
}
