use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreshowError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Template render error: {0}")]
    TemplateError(#[from] handlebars::RenderError),

    #[error("Template registration error: {0}")]
    TemplateRegistrationError(#[from] Box<handlebars::TemplateError>),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing credentials: {message}")]
    MissingCredentials { message: String },

    #[error("Mailchimp API error ({status}): {title} - {detail}")]
    MailchimpError {
        status: u16,
        title: String,
        detail: String,
    },

    #[error("Invalid date/time '{value}'")]
    DateTimeError { value: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Template,
    Mailchimp,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PreshowError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PreshowError::ApiError(_) => ErrorCategory::Network,
            PreshowError::IoError(_) => ErrorCategory::System,
            PreshowError::SerializationError(_)
            | PreshowError::YamlError(_)
            | PreshowError::DateTimeError { .. }
            | PreshowError::ProcessingError { .. }
            | PreshowError::ValidationError { .. } => ErrorCategory::Data,
            PreshowError::TemplateError(_) | PreshowError::TemplateRegistrationError(_) => {
                ErrorCategory::Template
            }
            PreshowError::ConfigError { .. }
            | PreshowError::MissingConfigError { .. }
            | PreshowError::InvalidConfigValueError { .. }
            | PreshowError::ConfigValidationError { .. }
            | PreshowError::MissingCredentials { .. } => ErrorCategory::Configuration,
            PreshowError::MailchimpError { .. } => ErrorCategory::Mailchimp,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PreshowError::ApiError(e) if e.is_timeout() || e.is_connect() => ErrorSeverity::Medium,
            PreshowError::ApiError(_) => ErrorSeverity::High,
            PreshowError::MailchimpError { status, .. } if *status >= 500 || *status == 429 => {
                ErrorSeverity::Medium
            }
            PreshowError::MailchimpError { .. } => ErrorSeverity::High,
            PreshowError::IoError(_) => ErrorSeverity::Critical,
            PreshowError::TemplateRegistrationError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your network connection and try again",
            ErrorCategory::Configuration => match self {
                PreshowError::MissingCredentials { .. } => {
                    "Set MAILCHIMP_API_KEY, MAILCHIMP_SERVER_PREFIX and MAILCHIMP_LIST_ID in .env"
                }
                _ => "Review the theatre config, show file and settings for the reported field",
            },
            ErrorCategory::Data => "Check the show file: times must look like 2025-11-20T19:30:00",
            ErrorCategory::Template => "The email template failed to render; check branding and show fields",
            ErrorCategory::Mailchimp => "Verify the Mailchimp API key, server prefix and audience ID",
            ErrorCategory::System => "Check file permissions and that the paths exist",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PreshowError::ApiError(e) if e.is_timeout() => {
                "An external service took too long to respond".to_string()
            }
            PreshowError::ApiError(_) => "Could not reach an external service".to_string(),
            PreshowError::IoError(e) => format!("File operation failed: {}", e),
            PreshowError::MailchimpError { title, detail, .. } => {
                format!("Mailchimp rejected the request: {} ({})", title, detail)
            }
            PreshowError::MissingCredentials { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<handlebars::TemplateError> for PreshowError {
    fn from(e: handlebars::TemplateError) -> Self {
        PreshowError::TemplateRegistrationError(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, PreshowError>;
