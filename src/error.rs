//! Error types for eureka-discovery-stream.
//!
//! Registry failures are not represented here: they reach the consumer as the
//! registry client's own error type.

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required argument was absent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An instance's host and port do not form a valid URI.
    #[error("Invalid state: cannot build URI from `{uri}`")]
    InvalidState {
        /// The rejected URI text.
        uri: String,
        /// Parser error, when the text did not parse at all.
        #[source]
        source: Option<http::uri::InvalidUri>,
    },
}

impl Error {
    /// Create an invalid-argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
