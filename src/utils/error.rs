use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

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

    #[error("Language model request failed (status {status}): {message}")]
    LlmError { status: u16, message: String },

    #[error("Document index error: {message}")]
    IndexError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Storage,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AssistantError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AssistantError::HttpError(_) | AssistantError::LlmError { .. } => {
                ErrorCategory::Network
            }
            AssistantError::ConfigError { .. }
            | AssistantError::ConfigValidationError { .. }
            | AssistantError::InvalidConfigValueError { .. }
            | AssistantError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AssistantError::ZipError(_)
            | AssistantError::SerializationError(_)
            | AssistantError::IndexError { .. } => ErrorCategory::Data,
            AssistantError::CsvError(_) | AssistantError::IoError(_) => ErrorCategory::Storage,
            AssistantError::ValidationError { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AssistantError::HttpError(_) => {
                "Could not reach the language model service".to_string()
            }
            AssistantError::LlmError { status, .. } => {
                format!("The language model service rejected the request (HTTP {})", status)
            }
            AssistantError::ConfigError { message } => format!("Configuration problem: {}", message),
            AssistantError::ConfigValidationError { field, message } => {
                format!("Configuration field '{}' is invalid: {}", field, message)
            }
            AssistantError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            AssistantError::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
            AssistantError::ZipError(_) | AssistantError::IndexError { .. } => {
                "The document index could not be loaded".to_string()
            }
            AssistantError::SerializationError(_) => "Received malformed JSON data".to_string(),
            AssistantError::CsvError(_) => "Could not read or write the chat log".to_string(),
            AssistantError::IoError(e) => format!("File system error: {}", e),
            AssistantError::ValidationError { message } => message.clone(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Network => {
                "Check the [llm] endpoint, your network connection and OPENAI_API_KEY".to_string()
            }
            ErrorCategory::Configuration => {
                "Review the configuration file against assistant.toml".to_string()
            }
            ErrorCategory::Data => {
                "Rebuild the document index or point [retrieval].index_path at a valid blob"
                    .to_string()
            }
            ErrorCategory::Storage => {
                "Make sure the log directory exists and is writable".to_string()
            }
            ErrorCategory::Input => "Type a non-empty question".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AssistantError>;
