/*!
 * Error types for the doctran library.
 *
 * This module contains custom error types for the different stages of the
 * translation pipeline, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// No credential was configured for the provider
    #[error("Missing credential: {0}")]
    MissingCredential(String),
}

impl ProviderError {
    /// Whether the failure is transient and worth another attempt.
    ///
    /// Connection problems, timeouts, rate limiting and server-side API errors
    /// are retryable. Malformed responses, credential problems and client-side
    /// API errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(_)
            | Self::ConnectionError(_)
            | Self::Timeout(_)
            | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => {
                *status_code >= 500 || *status_code == 429 || *status_code == 408
            }
            Self::ParseError(_) | Self::AuthenticationError(_) | Self::MissingCredential(_) => false,
        }
    }

    /// Map a reqwest transport error onto the provider taxonomy
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }

    /// Map a non-success HTTP status and body onto the provider taxonomy
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// Non-transient provider failure, surfaced without retrying
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A transient failure persisted through every attempt
    #[error("Translation failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// The cause reported by the final attempt
        last: ProviderError,
    },

    /// The provider answered with no text
    #[error("Provider returned an empty translation")]
    EmptyResponse,
}

/// Errors raised while opening a document or walking its structure
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The bytes are neither a word-processing package nor a PDF
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// The zip container could not be read
    #[error("Malformed archive: {0}")]
    Archive(String),

    /// A package part is not well-formed XML
    #[error("Malformed XML in {part}: {message}")]
    Xml {
        /// Name of the package part
        part: String,
        /// Parser message
        message: String,
    },

    /// The PDF could not be parsed
    #[error("Malformed PDF: {0}")]
    Pdf(String),

    /// A required package part is absent
    #[error("Missing document part: {0}")]
    MissingPart(String),
}

/// Errors raised while serializing or saving the translated document
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The in-memory document could not be serialized
    #[error("Failed to serialize document: {0}")]
    Serialize(String),

    /// The serialized bytes could not be written
    #[error("Failed to write {path}: {message}")]
    Write {
        /// Destination path
        path: String,
        /// I/O message
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from document extraction
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Error from saving the result
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
