use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to write '{destination}': {source}")]
    PersistenceError {
        destination: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Persistence,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FetchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FetchError::HttpClientError(_) => ErrorCategory::Network,
            FetchError::IoError(_) | FetchError::PersistenceError { .. } => {
                ErrorCategory::Persistence
            }
            FetchError::SerializationError(_) => ErrorCategory::Data,
            FetchError::ConfigError { .. }
            | FetchError::ConfigValidationError { .. }
            | FetchError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Persistence => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FetchError::HttpClientError(_) => {
                "Check TLS support and the configured user agent, then rerun"
            }
            FetchError::IoError(_) | FetchError::PersistenceError { .. } => {
                "Make sure the output directory exists, is writable and has free space"
            }
            FetchError::SerializationError(_) => "Inspect the snapshot contents for invalid values",
            FetchError::ConfigError { .. } | FetchError::ConfigValidationError { .. } => {
                "Check the TOML syntax of the configuration file"
            }
            FetchError::InvalidConfigValueError { .. } => {
                "Fix the reported value in the configuration file or command line"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FetchError::PersistenceError { destination, .. } => {
                format!("Could not save {}; no data from this run was kept", destination)
            }
            FetchError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration problem with {}: {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

/// 單一來源抓取失敗的原因；由 resolver 就地處理，不會往上傳遞
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchFailure::Timeout
        } else if err.is_connect() {
            FetchFailure::Connect(err.to_string())
        } else if let Some(status) = err.status() {
            FetchFailure::Status(status.as_u16())
        } else {
            FetchFailure::Transport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
