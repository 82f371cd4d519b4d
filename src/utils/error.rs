use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Source parse error: {message}")]
    Parse { message: String },

    #[error("PDF decode error: {message}")]
    PdfDecode { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Parsing,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DirectoryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DirectoryError::Http(_) | DirectoryError::Status { .. } => ErrorCategory::Network,
            DirectoryError::Parse { .. } | DirectoryError::PdfDecode { .. } => {
                ErrorCategory::Parsing
            }
            DirectoryError::Io(_) | DirectoryError::Database(_) => ErrorCategory::Storage,
            DirectoryError::ConfigValidationError { .. }
            | DirectoryError::InvalidConfigValueError { .. }
            | DirectoryError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Parsing => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DirectoryError::Http(_) => {
                "Check the network connection and that the source URL is reachable".to_string()
            }
            DirectoryError::Status { status, .. } if *status == 429 => {
                "The source is rate limiting requests; wait a while and rerun".to_string()
            }
            DirectoryError::Status { url, .. } => {
                format!("Verify that {} still hosts the shop list", url)
            }
            DirectoryError::Io(_) => {
                "Check file permissions and available disk space".to_string()
            }
            DirectoryError::Database(_) => {
                "Make sure the database file is not locked by another process".to_string()
            }
            DirectoryError::Parse { .. } => {
                "The source layout may have changed; inspect the downloaded document".to_string()
            }
            DirectoryError::PdfDecode { .. } => {
                "Install poppler-utils so that `pdftotext` is on PATH, or delete the cached PDF"
                    .to_string()
            }
            DirectoryError::ConfigValidationError { field, .. }
            | DirectoryError::InvalidConfigValueError { field, .. }
            | DirectoryError::MissingConfigError { field } => {
                format!("Fix the '{}' entry in the configuration file", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not fetch the shop source: {}", self),
            ErrorCategory::Parsing => format!("Could not read the shop source: {}", self),
            ErrorCategory::Storage => format!("Could not save shop data: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Per-shop geocoding failure. These are logged and recorded, never fatal to a run.
#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("rate limited by geocoder (HTTP 429)")]
    RateLimited,

    #[error("HTTP error: {status}")]
    Status { status: u16 },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to parse geocoder response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no results found for address")]
    NoResults,

    #[error("failed to parse {axis} '{value}'")]
    InvalidCoordinate { axis: &'static str, value: String },
}

impl GeocodeError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GeocodeError::RateLimited)
    }
}
