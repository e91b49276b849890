use thiserror::Error;

/// Errors raised when a caller or a collaborator breaks a contract, e.g. malformed encodings or
/// out-of-range indices.
/// These are never used to report that a transaction is invalid against the pool;
/// see `Rejection` for that.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Invalid {what} length. Expected: {expected} bytes but got: {actual}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Input index: {index} is out of range for a transaction with {len} inputs")]
    InputIndexOutOfRange { index: usize, len: usize },

    #[error("Output index: {index} is out of range for a transaction with {len} outputs")]
    OutputIndexOutOfRange { index: usize, len: usize },

    #[error("Declared transaction id: {declared} doesn't match the computed id: {computed}")]
    TransactionIdMismatch { declared: String, computed: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
