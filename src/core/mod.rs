pub mod encoder;
pub mod engine;
pub mod exporter;
pub mod importer;

pub use crate::domain::model::{CellValue, CsvDownload, ExportOptions, ExportOutcome, Record};
pub use crate::domain::ports::{DownloadSink, ExportSettings, RecordSource};
pub use crate::utils::error::Result;
