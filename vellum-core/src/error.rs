use thiserror::Error;

/// Main error type for vellum operations
///
/// Every failure is reported synchronously to the immediate caller. Nothing
/// here is retried internally: a malformed input stays malformed.
#[derive(Error, Debug)]
pub enum VellumError {
    /// Malformed tag/length framing, truncated input, or a fixed schema whose
    /// elements have the wrong count or type.
    #[error("Structural error: {0}")]
    Structural(String),

    /// A composite field carried a tag the consuming schema does not know.
    #[error("Unknown tag {tag} in {context}")]
    UnknownTag { context: &'static str, tag: u32 },

    /// A CHOICE saw a tag that matches none of its alternatives.
    #[error("Invalid choice for {choice}: {tag}")]
    InvalidChoice { choice: &'static str, tag: String },

    #[error("Duplicate key")]
    DuplicateKey,

    #[error("Tree is empty")]
    EmptyTree,

    #[error("Key not found")]
    KeyNotFound,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VellumError {
    /// Shorthand for [`VellumError::Structural`]
    pub fn structural(message: impl Into<String>) -> Self {
        VellumError::Structural(message.into())
    }

    /// Shorthand for [`VellumError::InvalidArgument`]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        VellumError::InvalidArgument(message.into())
    }
}

/// Result type alias for vellum operations
pub type VellumResult<T> = Result<T, VellumError>;
