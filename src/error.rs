//! Error types for the pagecraft generation pipeline.

use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Serialization failed for {target}: {message}")]
    Serialization { target: String, message: String },

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Domain errors surfaced by the pipeline and its adapters
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend returned nothing usable as a structured object.
    #[error("Backend returned no structured content: {0}")]
    BackendStructure(String),

    /// The backend returned an object that does not fit the expected shape.
    #[error("Schema validation failed for {target}: {message}")]
    SchemaValidation { target: String, message: String },

    #[error("Unknown segment kind: {0}")]
    UnknownSegmentKind(String),

    #[error("Unknown section kind: {0}")]
    UnknownSectionKind(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Brand identity not found for page: {0}")]
    IdentityNotFound(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider model not found: {0}")]
    ProviderModelNotFound(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ApiError {
    /// Shorthand for a schema validation failure against a named target.
    pub fn schema(target: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::SchemaValidation {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Whether the error means the backend output was unusable, as opposed to
    /// a transport, configuration or storage fault.
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            ApiError::BackendStructure(_) | ApiError::SchemaValidation { .. }
        )
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization {
            target: "json document".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
