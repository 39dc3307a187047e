//! Error types shared by every stage of the renderer.

use thiserror::Error;

/// Errors produced while configuring, encoding, painting or writing a QR code.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration was rejected before any encoding work started.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The module-matrix encoder could not fit the content at the chosen error
    /// correction level. No image is produced in that case.
    #[error("QR encoding failed: {0}")]
    Encoding(String),

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

/// Alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
