/// Station identifiers present in the 2013-2017 analysis window
pub const STATION_DONGSI: &str = "Dongsi";
pub const STATION_WANLIU: &str = "Wanliu";
pub const KNOWN_STATIONS: [&str; 2] = [STATION_DONGSI, STATION_WANLIU];

/// CSV column names consumed by the loader
pub const COL_YEAR: &str = "year";
pub const COL_MONTH: &str = "month";
pub const COL_DAY: &str = "day";
pub const COL_HOUR: &str = "hour";
pub const COL_STATION: &str = "station";
pub const COL_PM10: &str = "PM10";
pub const COL_TEMP: &str = "TEMP";
pub const COL_DEWP: &str = "DEWP";
pub const COL_PRES: &str = "PRES";

pub const REQUIRED_COLUMNS: [&str; 9] = [
    COL_YEAR,
    COL_MONTH,
    COL_DAY,
    COL_HOUR,
    COL_STATION,
    COL_PM10,
    COL_TEMP,
    COL_DEWP,
    COL_PRES,
];

/// Markers the source data uses for a missing measurement
pub const MISSING_MARKERS: [&str; 3] = ["", "NA", "NaN"];

/// Temperature categorisation domain, lower bound inclusive, upper exclusive
pub const CATEGORY_MIN_TEMP: f64 = -20.0;
pub const CATEGORY_MAX_TEMP: f64 = 40.0;

/// Group-by key ranges
pub const HOURS_PER_DAY: u32 = 24;
pub const MONTHS_PER_YEAR: u32 = 12;

/// Processing defaults
pub const DEFAULT_DATA_PATH: &str = "data/Data_Dongsi_Wanliu.csv";
pub const DEFAULT_CONFIG_FILE: &str = "airq.toml";
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;
pub const DEFAULT_PRECISION: usize = 1;

/// Environment prefix for configuration overrides
pub const ENV_PREFIX: &str = "AIRQ";
