use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::constants::HTTP_TOO_MANY_REQUESTS;

#[derive(Debug, Error)]
pub enum RemoveBgError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Unable to process image http_status={0}")]
    UnexpectedStatus(u16),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unable to find image {0}")]
    MissingZipEntry(String),

    #[error("Image dimensions differ: color {color:?}, alpha {alpha:?}")]
    DimensionMismatch { color: (u32, u32), alpha: (u32, u32) },

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("Invalid glob pattern {pattern}: {message}")]
    InvalidGlobPattern { pattern: String, message: String },

    #[error("Unable to parse extra api options: {0}")]
    InvalidExtraOptions(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl RemoveBgError {
    /// True when the remote service rejected the request with HTTP 429.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, RemoveBgError::Request(e) if e.rate_limit_exceeded())
    }
}

/// A 4xx rejection from the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub status: u16,
    pub message: String,
}

impl RequestError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn rate_limit_exceeded(&self) -> bool {
        self.status == HTTP_TOO_MANY_REQUESTS
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (http_status={})", self.message, self.status)
    }
}

impl std::error::Error for RequestError {}

pub type Result<T> = std::result::Result<T, RemoveBgError>;
