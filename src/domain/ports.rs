use crate::domain::model::{CsvDownload, ExportOptions, HeaderQuoting, Record, RecordPolicy};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where a finished CSV file is offered to the user: a directory, stdout, an object store.
pub trait DownloadSink: Send + Sync {
    /// Offers the file and returns where it ended up.
    fn deliver(
        &self,
        download: &CsvDownload,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn extract(&self) -> Result<Vec<Record>>;

    /// Human-readable origin for logs.
    fn describe(&self) -> String;
}

pub trait ExportSettings: Send + Sync {
    fn file_name(&self) -> &str;
    fn output_path(&self) -> &str;
    fn header_quoting(&self) -> HeaderQuoting;
    fn record_policy(&self) -> RecordPolicy;

    fn options(&self) -> ExportOptions {
        ExportOptions {
            header_quoting: self.header_quoting(),
            record_policy: self.record_policy(),
        }
    }
}

#[async_trait]
impl<T: RecordSource + ?Sized> RecordSource for Box<T> {
    async fn extract(&self) -> Result<Vec<Record>> {
        (**self).extract().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
