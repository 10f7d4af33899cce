use crate::domain::model::CsvDownload;
use crate::domain::ports::DownloadSink;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Saves downloads as files in one directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct LocalDirSink {
    base_path: PathBuf,
}

impl LocalDirSink {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl DownloadSink for LocalDirSink {
    async fn deliver(&self, download: &CsvDownload) -> Result<String> {
        tokio::fs::create_dir_all(&self.base_path).await?;

        let full_path = self.base_path.join(&download.file_name);
        tokio::fs::write(&full_path, &download.bytes).await?;

        tracing::debug!("Wrote {} bytes to {}", download.bytes.len(), full_path.display());
        Ok(full_path.display().to_string())
    }
}

/// Streams the file body to stdout, for piping.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl DownloadSink for StdoutSink {
    async fn deliver(&self, download: &CsvDownload) -> Result<String> {
        let mut stdout = tokio::io::stdout();
        write_download(&mut stdout, download).await?;
        Ok("stdout".to_string())
    }
}

/// 原樣寫出檔案內容，不補換行
async fn write_download<W: tokio::io::AsyncWrite + Unpin>(
    writer: &mut W,
    download: &CsvDownload,
) -> Result<()> {
    writer.write_all(&download.bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Keeps every delivered download in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    downloads: Arc<Mutex<Vec<CsvDownload>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn downloads(&self) -> Vec<CsvDownload> {
        self.downloads.lock().await.clone()
    }
}

impl DownloadSink for MemorySink {
    async fn deliver(&self, download: &CsvDownload) -> Result<String> {
        self.downloads.lock().await.push(download.clone());
        Ok(format!("memory://{}", download.file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_dir_sink_creates_directory_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let sink = LocalDirSink::new(temp_dir.path().join("exports/daily"));
        let download = CsvDownload::new("production_data", "line,actual\n\"L1\",480".to_string());

        let location = sink.deliver(&download).await.unwrap();

        let expected = temp_dir.path().join("exports/daily/production_data.csv");
        assert_eq!(location, expected.display().to_string());
        assert_eq!(
            std::fs::read_to_string(expected).unwrap(),
            "line,actual\n\"L1\",480"
        );
    }

    #[tokio::test]
    async fn test_local_dir_sink_overwrites_previous_export() {
        let temp_dir = TempDir::new().unwrap();
        let sink = LocalDirSink::new(temp_dir.path());

        sink.deliver(&CsvDownload::new("scrap_data", "a\n1".to_string()))
            .await
            .unwrap();
        sink.deliver(&CsvDownload::new("scrap_data", "a\n2".to_string()))
            .await
            .unwrap();

        let content = std::fs::read_to_string(temp_dir.path().join("scrap_data.csv")).unwrap();
        assert_eq!(content, "a\n2");
    }

    #[tokio::test]
    async fn test_stdout_body_is_written_unchanged() {
        let download = CsvDownload::new("production_data", "line\n\"L1\"".to_string());
        let mut out: Vec<u8> = Vec::new();

        write_download(&mut out, &download).await.unwrap();

        assert_eq!(out, b"line\n\"L1\"");
    }

    #[tokio::test]
    async fn test_memory_sink_clones_share_downloads() {
        let sink = MemorySink::new();
        let handle = sink.clone();

        sink.deliver(&CsvDownload::new("x", "a".to_string())).await.unwrap();

        assert_eq!(handle.downloads().await.len(), 1);
    }
}
