use crate::adapters::source::{ApiSource, JsonFileSource, DEFAULT_PAGE_LIMIT, DEFAULT_TIMEOUT_SECONDS};
use crate::domain::model::{HeaderQuoting, RecordPolicy};
use crate::domain::ports::{ExportSettings, RecordSource};
use crate::utils::error::{ExportError, Result};
use crate::utils::validation::{
    validate_file_name, validate_path, validate_positive_number, validate_range,
    validate_required_field, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub export: ExportSection,
    pub source: SourceConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSection {
    pub filename: String,
    pub output_path: String,
    #[serde(default)]
    pub header_quoting: HeaderQuoting,
    #[serde(default)]
    pub record_policy: RecordPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    File,
    Api,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub r#type: SourceType,
    pub path: Option<String>,
    pub endpoint: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: Option<String>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ExportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ExportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DASHBOARD_URL})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn page_limit(&self) -> usize {
        self.source.limit.unwrap_or(DEFAULT_PAGE_LIMIT)
    }

    pub fn page_offset(&self) -> usize {
        self.source.offset.unwrap_or(0)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }

    /// Builds the configured record source.
    pub fn record_source(&self) -> Result<Box<dyn RecordSource>> {
        match self.source.r#type {
            SourceType::File => {
                let path = validate_required_field("source.path", &self.source.path)?;
                Ok(Box::new(JsonFileSource::new(path)))
            }
            SourceType::Api => {
                let endpoint = validate_required_field("source.endpoint", &self.source.endpoint)?;
                let source = ApiSource::with_timeout(endpoint.clone(), self.timeout())?
                    .page(self.page_limit(), self.page_offset())
                    .headers(self.source.headers.clone().unwrap_or_default());
                Ok(Box::new(source))
            }
        }
    }
}

impl ExportSettings for TomlConfig {
    fn file_name(&self) -> &str {
        &self.export.filename
    }

    fn output_path(&self) -> &str {
        &self.export.output_path
    }

    fn header_quoting(&self) -> HeaderQuoting {
        self.export.header_quoting
    }

    fn record_policy(&self) -> RecordPolicy {
        self.export.record_policy
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_file_name("export.filename", &self.export.filename)?;
        validate_path("export.output_path", &self.export.output_path)?;

        match self.source.r#type {
            SourceType::File => {
                let path = validate_required_field("source.path", &self.source.path)?;
                validate_path("source.path", path)?;
            }
            SourceType::Api => {
                let endpoint = validate_required_field("source.endpoint", &self.source.endpoint)?;
                validate_url("source.endpoint", endpoint)?;
                validate_range("source.limit", self.page_limit(), 1, 10_000)?;
                if let Some(timeout) = self.source.timeout_seconds {
                    validate_positive_number("source.timeout_seconds", timeout as usize, 1)?;
                }
            }
        }

        if let Some(level) = self.log_level() {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level) {
                return Err(ExportError::InvalidConfigValueError {
                    field: "monitoring.log_level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const API_CONFIG: &str = r#"
[export]
filename = "production_data"
output_path = "./exports"
record_policy = "strict"

[source]
type = "api"
endpoint = "http://localhost:3006/api/production"
limit = 100

[source.headers]
Authorization = "Bearer token"

[monitoring]
log_level = "debug"
"#;

    #[test]
    fn test_parse_api_config() {
        let config = TomlConfig::from_toml_str(API_CONFIG).unwrap();

        assert_eq!(config.file_name(), "production_data");
        assert_eq!(config.record_policy(), RecordPolicy::Strict);
        assert_eq!(config.header_quoting(), HeaderQuoting::AsNeeded);
        assert_eq!(config.page_limit(), 100);
        assert_eq!(config.page_offset(), 0);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.log_level(), Some("debug"));
        assert!(config.validate().is_ok());
        assert!(config.record_source().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("BRAKE_EXPORT_TEST_DIR", "/tmp/brake-exports");
        let config = TomlConfig::from_toml_str(
            r#"
[export]
filename = "scrap_data"
output_path = "${BRAKE_EXPORT_TEST_DIR}"

[source]
type = "file"
path = "${BRAKE_EXPORT_UNSET_VAR}/scrap.json"
"#,
        )
        .unwrap();

        assert_eq!(config.output_path(), "/tmp/brake-exports");
        assert_eq!(
            config.source.path.as_deref(),
            Some("${BRAKE_EXPORT_UNSET_VAR}/scrap.json")
        );
    }

    #[test]
    fn test_api_source_requires_endpoint() {
        let config = TomlConfig::from_toml_str(
            r#"
[export]
filename = "orders_data"
output_path = "./exports"

[source]
type = "api"
"#,
        )
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(ExportError::MissingConfigError { .. })
        ));
        assert!(config.record_source().is_err());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let config = TomlConfig::from_toml_str(
            r#"
[export]
filename = "orders_data"
output_path = "./exports"

[source]
type = "file"
path = "orders.json"

[monitoring]
log_level = "loud"
"#,
        )
        .unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[export\nfilename =").unwrap_err();
        assert!(matches!(err, ExportError::ConfigValidationError { .. }));
    }
}
