pub mod correlation;
pub mod dataset_analyzer;
pub mod findings;
pub mod view_resolver;

pub use correlation::{CorrelationMatrix, PairAccumulator};
pub use dataset_analyzer::{ColumnSummary, DatasetAnalyzer, DatasetOverview};
pub use findings::{station_findings, StationFindings};
pub use view_resolver::{
    CategorizedDataset, Grouping, Histogram, PatternPoint, PatternSeries, ScatterSeries,
    ViewResolver,
};
