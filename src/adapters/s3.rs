use crate::domain::model::CsvDownload;
use crate::domain::ports::DownloadSink;
use crate::utils::error::{ExportError, Result};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

/// Uploads downloads as objects under `prefix/` with a `text/csv` content type.
#[derive(Debug, Clone)]
pub struct S3Sink {
    client: S3Client,
    bucket: String,
    prefix: String,
}

impl S3Sink {
    pub fn new(client: S3Client, bucket: String, prefix: String) -> Self {
        Self {
            client,
            bucket,
            prefix,
        }
    }

    pub fn object_key(&self, file_name: &str) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", prefix, file_name)
        }
    }
}

impl DownloadSink for S3Sink {
    async fn deliver(&self, download: &CsvDownload) -> Result<String> {
        let key = self.object_key(&download.file_name);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(download.mime_type)
            .content_disposition(format!("attachment; filename=\"{}\"", download.file_name))
            .body(ByteStream::from(download.bytes.clone()))
            .send()
            .await
            .map_err(|e| ExportError::SinkError {
                file_name: download.file_name.clone(),
                message: format!("Failed to write to S3: {}", e.into_service_error()),
            })?;

        Ok(format!("s3://{}/{}", self.bucket, key))
    }
}
