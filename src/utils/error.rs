use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Record {index} does not match the header row (missing: [{}], unexpected: [{}])", .missing.join(", "), .unexpected.join(", "))]
    NonUniformRecord {
        index: usize,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Invalid CSV format. Missing columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("Invalid source data: {message}")]
    InvalidSourceData { message: String },

    #[error("Failed to deliver '{file_name}': {message}")]
    SinkError { file_name: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ExportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExportError::ConfigValidationError { .. }
            | ExportError::InvalidConfigValueError { .. }
            | ExportError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ExportError::ApiError(_) => ErrorCategory::Network,
            ExportError::CsvError(_)
            | ExportError::SerializationError(_)
            | ExportError::NonUniformRecord { .. }
            | ExportError::MissingColumns { .. }
            | ExportError::InvalidSourceData { .. } => ErrorCategory::Data,
            ExportError::IoError(_) | ExportError::SinkError { .. } => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路問題通常重試即可
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ExportError::ApiError(_) => {
                "Check that the dashboard API is reachable and the endpoint URL is correct".to_string()
            }
            ExportError::CsvError(_) => "Make sure the file is valid comma-separated text".to_string(),
            ExportError::IoError(_) => {
                "Check that the path exists and the process has permission to write to it".to_string()
            }
            ExportError::SerializationError(_) => {
                "Input must be a JSON array of objects or a {\"data\": [...]} envelope".to_string()
            }
            ExportError::ConfigValidationError { .. }
            | ExportError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again".to_string()
            }
            ExportError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            ExportError::NonUniformRecord { .. } => {
                "Give every record the same fields, or export without --strict".to_string()
            }
            ExportError::MissingColumns { missing } => {
                format!("Add the missing columns to the file header: {}", missing.join(", "))
            }
            ExportError::InvalidSourceData { .. } => {
                "Each record must be a JSON object of scalar values".to_string()
            }
            ExportError::SinkError { .. } => {
                "Check the output destination and its credentials".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not fetch records: {}", self),
            ErrorCategory::Data => format!("Export data problem: {}", self),
            ErrorCategory::Storage => format!("Could not save the export: {}", self),
        }
    }

    /// 依嚴重程度決定的程序結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
