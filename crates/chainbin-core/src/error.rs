use thiserror::Error;

pub type ChainbinResult<T> = Result<T, ChainbinError>;

/// Error taxonomy for the note core.
///
/// Absent or expired entities are not an error: reads return `Ok(None)`.
/// Nothing in this crate family retries automatically; transport errors
/// carry the underlying message verbatim for user display.
#[derive(Debug, Error)]
pub enum ChainbinError {
    /// Stored metadata declares a version this build does not support.
    #[error("unsupported note version: expected {expected}, got {got}")]
    InvalidVersion { expected: String, got: String },

    /// Authentication tag did not verify: wrong password or corrupted
    /// ciphertext. The two cases are indistinguishable on purpose.
    #[error("decryption failed: wrong password or corrupted data")]
    DecryptionFailed,

    /// Decrypt was called on a note whose payload is already plaintext.
    #[error("note is not encrypted")]
    NotEncrypted,

    /// Note text was empty at creation time.
    #[error("note is empty")]
    EmptyNote,

    /// Note text exceeds the configured size limit (UTF-8 bytes,
    /// checked against the plaintext before encryption).
    #[error("note is too large: {size} bytes (maximum {max})")]
    NoteTooLarge { size: usize, max: usize },

    /// Submission was attempted from a note that has no TTL, i.e. a note
    /// reconstructed from storage rather than built locally.
    #[error("note has no TTL; only locally created notes can be submitted")]
    MissingTtl,

    /// The transaction receipt did not have the expected log/topic shape,
    /// meaning the submission did not create exactly one entity.
    #[error("malformed transaction receipt: {reason}")]
    MalformedReceipt { reason: String },

    /// Chain RPC transport failure (connection, timeout, or an error
    /// response from the node).
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
