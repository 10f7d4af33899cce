use crate::domain::model::Record;
use crate::domain::ports::RecordSource;
use crate::utils::error::{ExportError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncReadExt;

pub const DEFAULT_PAGE_LIMIT: usize = 500;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Accepts a bare array of objects or the paginated `{"data": [...], "total": n}` envelope.
pub fn records_from_json(value: serde_json::Value) -> Result<Vec<Record>> {
    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut obj) => match obj.remove("data") {
            Some(serde_json::Value::Array(items)) => {
                if let Some(total) = obj.get("total").and_then(|t| t.as_u64()) {
                    tracing::debug!("Envelope reports {} records in total", total);
                }
                items
            }
            _ => {
                return Err(ExportError::InvalidSourceData {
                    message: "expected an array or an object with a 'data' array".to_string(),
                })
            }
        },
        other => {
            return Err(ExportError::InvalidSourceData {
                message: format!("expected an array of records, got {}", json_kind(&other)),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            serde_json::Value::Object(obj) => Ok(Record::from_json_object(obj)),
            other => Err(ExportError::InvalidSourceData {
                message: format!("record {} is {}, not an object", index, json_kind(&other)),
            }),
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Reads records from a JSON file; the path `-` reads stdin.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_stdin(&self) -> bool {
        self.path.as_os_str() == "-"
    }
}

#[async_trait]
impl RecordSource for JsonFileSource {
    async fn extract(&self) -> Result<Vec<Record>> {
        let content = if self.is_stdin() {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        } else {
            tokio::fs::read_to_string(&self.path).await?
        };

        let value: serde_json::Value = serde_json::from_str(&content)?;
        let records = records_from_json(value)?;
        tracing::debug!("Read {} records from {}", records.len(), self.describe());
        Ok(records)
    }

    fn describe(&self) -> String {
        if self.is_stdin() {
            "stdin".to_string()
        } else {
            self.path.display().to_string()
        }
    }
}

/// Fetches records from a dashboard route such as `/api/production`.
#[derive(Debug, Clone)]
pub struct ApiSource {
    client: Client,
    endpoint: String,
    limit: usize,
    offset: usize,
    headers: HashMap<String, String>,
}

impl ApiSource {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ExportError::ApiError)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
            headers: HashMap::new(),
        })
    }

    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }
}

#[async_trait]
impl RecordSource for ApiSource {
    async fn extract(&self) -> Result<Vec<Record>> {
        tracing::debug!("Making API request to: {}", self.endpoint);

        let mut request = self.client.get(&self.endpoint).query(&[
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ]);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(ExportError::InvalidSourceData {
                message: format!("{} responded with {}", self.endpoint, status),
            });
        }

        let json_data: serde_json::Value = response.json().await?;
        let records = records_from_json(json_data)?;
        tracing::info!("Fetched {} records from {}", records.len(), self.endpoint);
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("{} (limit {}, offset {})", self.endpoint, self.limit, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CellValue;
    use httpmock::prelude::*;

    #[test]
    fn test_records_from_bare_array() {
        let records = records_from_json(serde_json::json!([
            {"orderId": "ORD-1", "orderQty": 1200},
            {"orderId": "ORD-2", "orderQty": 800}
        ]))
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("orderQty"), Some(&CellValue::Integer(800)));
    }

    #[test]
    fn test_records_from_envelope() {
        let records = records_from_json(serde_json::json!({
            "data": [{"line": "L1"}],
            "total": 42
        }))
        .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_rejects_non_object_items() {
        let err = records_from_json(serde_json::json!([{"a": 1}, 5])).unwrap_err();
        assert!(err.to_string().contains("record 1 is a number"));
    }

    #[test]
    fn test_rejects_object_without_data() {
        let err = records_from_json(serde_json::json!({"error": "Failed"})).unwrap_err();
        assert!(matches!(err, ExportError::InvalidSourceData { .. }));
    }

    #[tokio::test]
    async fn test_api_source_sends_pagination() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/dispatch")
                .query_param("limit", "20")
                .query_param("offset", "40")
                .header("x-api-key", "secret");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "data": [{"vehicle": "MH12", "qty": 300}],
                    "total": 41
                }));
        });

        let mut headers = HashMap::new();
        headers.insert("x-api-key".to_string(), "secret".to_string());
        let source = ApiSource::new(server.url("/api/dispatch"))
            .unwrap()
            .page(20, 40)
            .headers(headers);

        let records = source.extract().await.unwrap();

        api_mock.assert();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("vehicle"), Some(&CellValue::from("MH12")));
    }

    #[tokio::test]
    async fn test_api_source_error_status() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/scrap");
            then.status(500)
                .json_body(serde_json::json!({"error": "Failed to fetch scrap records"}));
        });

        let result = ApiSource::new(server.url("/api/scrap"))
            .unwrap()
            .extract()
            .await;

        api_mock.assert();
        assert!(matches!(result, Err(ExportError::InvalidSourceData { .. })));
    }

    #[tokio::test]
    async fn test_api_source_applies_timeout() {
        let server = MockServer::start();
        let _slow = server.mock(|when, then| {
            when.method(GET).path("/api/inventory");
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(serde_json::json!([]));
        });

        let source =
            ApiSource::with_timeout(server.url("/api/inventory"), Duration::from_millis(100))
                .unwrap();
        let result = source.extract().await;

        match result {
            Err(ExportError::ApiError(e)) => assert!(e.is_timeout()),
            other => panic!("expected a timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_json_file_source_reads_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("inventory.json");
        std::fs::write(&path, r#"[{"item": "Liner", "stock": 12.5}]"#).unwrap();

        let records = JsonFileSource::new(&path).extract().await.unwrap();

        assert_eq!(records[0].get("stock"), Some(&CellValue::Float(12.5)));
    }
}
