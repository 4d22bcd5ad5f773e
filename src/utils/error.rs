use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("{player} recorded no shots in {competition}")]
    EmptyResult { player: String, competition: String },

    #[error("Chart rendering failed: {message}")]
    RenderError { message: String },

    #[error("Unparseable classifier reply '{reply}': {reason}")]
    ClassificationParseError { reply: String, reason: String },

    #[error("Classifier request failed: {message}")]
    ClassifierError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Storage,
    Rendering,
    Classification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::EmptyResult { .. }
            | EtlError::SerializationError(_)
            | EtlError::CsvError(_) => ErrorCategory::Data,
            EtlError::IoError(_) | EtlError::ZipError(_) => ErrorCategory::Storage,
            EtlError::RenderError { .. } => ErrorCategory::Rendering,
            EtlError::ClassificationParseError { .. } | EtlError::ClassifierError { .. } => {
                ErrorCategory::Classification
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 暫時性錯誤：呼叫端可選擇重試
            EtlError::ApiError(_)
            | EtlError::ClassifierError { .. } => ErrorSeverity::Medium,
            EtlError::EmptyResult { .. }
            | EtlError::ClassificationParseError { .. }
            | EtlError::SerializationError(_)
            | EtlError::CsvError(_)
            | EtlError::RenderError { .. } => ErrorSeverity::High,
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::IoError(_)
            | EtlError::ZipError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check network connectivity and API headers, then try again later",
            ErrorCategory::Configuration => "Fix the configuration file or command-line arguments",
            ErrorCategory::Data => match self {
                EtlError::EmptyResult { .. } => {
                    "Check the player name spelling (exact match) and the competition label, e.g. 'Premier League 24/25'"
                }
                _ => "The upstream data format may have changed; inspect the raw response",
            },
            ErrorCategory::Storage => "Check that the output path exists and is writable",
            ErrorCategory::Rendering => "Report the player/competition that failed to render",
            ErrorCategory::Classification => "Inspect the classifier reply or the classifier endpoint configuration",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::EmptyResult { player, competition } => {
                format!("No shots found for {} in {}", player, competition)
            }
            EtlError::ApiError(_) => {
                format!("Could not reach the statistics API ({})", self)
            }
            EtlError::MissingConfigError { field } => {
                format!("Missing required setting '{}'", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
