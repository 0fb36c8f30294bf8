pub mod imputer;
pub mod integrity_checker;

pub use imputer::{median, ImputationReport, MedianImputer};
pub use integrity_checker::{
    IntegrityChecker, IntegrityReport, IntegrityViolation, StationStatistics, ViolationType,
};
