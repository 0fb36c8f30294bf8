pub mod table_writer;

pub use table_writer::{export_rows, ExportFormat, ExportRow, TableWriter};
