use std::time::Duration;
use thiserror::Error;

/// 資料來源失敗，和成功結果走同一條 completion 通道
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{source_name} is unreachable: {message}")]
    Unreachable { source_name: String, message: String },

    #[error("{source_name} timed out after {after:?}")]
    Timeout { source_name: String, after: Duration },

    #[error("{source_name} answered with HTTP status {status}")]
    Status { source_name: String, status: u16 },

    #[error("local store unavailable at {path}: {message}")]
    StoreUnavailable { path: String, message: String },

    #[error("{source_name} dropped its completion without a result")]
    Abandoned { source_name: String },
}

impl FetchError {
    pub fn timeout(source_name: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            source_name: source_name.into(),
            after,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// 將 reqwest 傳輸錯誤歸類
    pub fn from_transport(source_name: &str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                source_name: source_name.to_string(),
                after: timeout,
            }
        } else if let Some(status) = err.status() {
            Self::Status {
                source_name: source_name.to_string(),
                status: status.as_u16(),
            }
        } else {
            Self::Unreachable {
                source_name: source_name.to_string(),
                message: err.to_string(),
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("payload produced an empty display value")]
    Empty,

    #[error("payload is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },

    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("payload has no value at {0}")]
    MissingField(String),
}

/// View 的錯誤 sink 收到的內容
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScreenError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

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

    #[error(transparent)]
    Screen(#[from] ScreenError),
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Screen(_) => 2,
            _ => 1,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AppError::IoError(_) => "Check that the file exists and is readable",
            AppError::HttpClientError(_) => "Check TLS and proxy settings of the HTTP client",
            AppError::SerializationError(_) => "Check the payload format",
            AppError::ConfigError { .. }
            | AppError::ConfigValidationError { .. }
            | AppError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line flags"
            }
            AppError::MissingConfigError { .. } => "Add the missing section to the configuration",
            AppError::Screen(ScreenError::Fetch(_)) => {
                "Check that the endpoint or store path is reachable"
            }
            AppError::Screen(ScreenError::Parse(_)) => {
                "Check the parser settings against the payload"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
