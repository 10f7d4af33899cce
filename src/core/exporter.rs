use crate::core::encoder;
use crate::domain::model::{CsvDownload, ExportOptions, ExportOutcome, ExportRequest, Record};
use crate::domain::ports::{DownloadSink, ExportSettings};
use crate::utils::error::Result;

/// Encodes records and offers the result through a [`DownloadSink`].
pub struct CsvExporter<S: DownloadSink> {
    sink: S,
    options: ExportOptions,
}

impl<S: DownloadSink> CsvExporter<S> {
    pub fn new(sink: S) -> Self {
        Self::with_options(sink, ExportOptions::default())
    }

    pub fn with_options(sink: S, options: ExportOptions) -> Self {
        Self { sink, options }
    }

    pub fn from_settings<C: ExportSettings>(sink: S, settings: &C) -> Self {
        Self::with_options(sink, settings.options())
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Exports `records` as `<file_name>.csv`.
    ///
    /// An empty slice is not an error: it logs a warning and offers nothing.
    pub async fn export(&self, records: &[Record], file_name: &str) -> Result<ExportOutcome> {
        let Some(text) = encoder::encode_records(records, &self.options)? else {
            tracing::warn!("No data to export for '{}'", file_name);
            return Ok(ExportOutcome::Skipped);
        };

        self.deliver(CsvDownload::new(file_name, text), records.len())
            .await
    }

    pub async fn export_request(&self, request: &ExportRequest) -> Result<ExportOutcome> {
        self.export(&request.records, &request.file_name).await
    }

    /// Offers an empty import template: the header line followed by a newline.
    pub async fn export_template<H: AsRef<str>>(
        &self,
        headers: &[H],
        file_name: &str,
    ) -> Result<ExportOutcome> {
        if headers.is_empty() {
            tracing::warn!("No template headers for '{}'", file_name);
            return Ok(ExportOutcome::Skipped);
        }

        let mut text = encoder::encode_header_line(headers, self.options.header_quoting);
        text.push_str(encoder::LINE_SEPARATOR);

        self.deliver(CsvDownload::new(file_name, text), 0).await
    }

    async fn deliver(&self, download: CsvDownload, rows: usize) -> Result<ExportOutcome> {
        tracing::debug!(
            "Delivering {} ({} bytes, {})",
            download.file_name,
            download.bytes.len(),
            download.mime_type
        );
        let location = self.sink.deliver(&download).await?;
        tracing::info!("📁 {} rows exported to {}", rows, location);

        Ok(ExportOutcome::Delivered {
            file_name: download.file_name,
            location,
            rows,
        })
    }
}
