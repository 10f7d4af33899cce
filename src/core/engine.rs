use crate::core::exporter::CsvExporter;
use crate::domain::model::ExportOutcome;
use crate::domain::ports::{DownloadSink, RecordSource};
use crate::utils::error::Result;

/// Pulls records from a source and exports them under one file name.
pub struct ExportEngine<R: RecordSource, S: DownloadSink> {
    source: R,
    exporter: CsvExporter<S>,
    file_name: String,
}

impl<R: RecordSource, S: DownloadSink> ExportEngine<R, S> {
    pub fn new(source: R, exporter: CsvExporter<S>, file_name: impl Into<String>) -> Self {
        Self {
            source,
            exporter,
            file_name: file_name.into(),
        }
    }

    pub fn exporter(&self) -> &CsvExporter<S> {
        &self.exporter
    }

    pub async fn run(&self) -> Result<ExportOutcome> {
        tracing::info!("Starting export of '{}'", self.file_name);

        tracing::info!("Extracting records from {}", self.source.describe());
        let records = self.source.extract().await?;
        tracing::info!("Extracted {} records", records.len());

        let outcome = self.exporter.export(&records, &self.file_name).await?;
        if let ExportOutcome::Delivered { location, .. } = &outcome {
            tracing::info!("Output saved to: {}", location);
        }

        Ok(outcome)
    }
}
