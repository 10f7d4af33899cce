pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

#[cfg(feature = "lambda")]
pub use adapters::s3::S3Sink;

pub use adapters::sink::{LocalDirSink, MemorySink, StdoutSink};
pub use adapters::source::{ApiSource, JsonFileSource};
pub use crate::core::{engine::ExportEngine, exporter::CsvExporter};
pub use domain::model::{
    CellValue, CsvDownload, ExportOptions, ExportOutcome, ExportRequest, HeaderQuoting, Record,
    RecordPolicy,
};
pub use utils::error::{ExportError, Result};
