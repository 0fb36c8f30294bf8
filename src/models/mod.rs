pub mod category;
pub mod dataset;
pub mod record;
pub mod selection;
pub mod variable;

pub use category::{OutOfRangePolicy, TemperatureCategory};
pub use dataset::Dataset;
pub use record::Record;
pub use selection::{View, ViewSelection};
pub use variable::Variable;
