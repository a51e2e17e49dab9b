//! Error handling for the transaction batcher.
//!
//! Failures fall into four categories with different retry semantics:
//!
//! - [`SubmitError::BlockhashExpired`] — the recent blockhash anchoring a
//!   transaction expired before confirmation. The operation did not execute;
//!   retrying with a fresh blockhash is safe, but the caller must remember
//!   that a retry under a new blockhash is a *new* submission and will
//!   execute the operations again if the original did land.
//! - [`SubmitError::Rejected`] — the network (or a pre-flight check in this
//!   crate) refused the transaction: oversized envelope, an account missing
//!   from the supplied lookup table, insufficient funds, duplicate
//!   submission. Retrying the identical request will fail again.
//! - [`SubmitError::Transport`] — RPC or connectivity failure. Transient and
//!   safe to retry at the caller's discretion.
//! - [`SubmitError::Config`] — programmer error (zero group size, empty
//!   signer set). Surfaces immediately, before any network traffic.

use thiserror::Error;

/// Error type for a single transaction submission.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// The recent blockhash expired before the transaction was confirmed.
    /// Retryable with a fresh blockhash; see the module docs for the
    /// double-execution caveat.
    #[error("recent blockhash expired before confirmation")]
    BlockhashExpired,

    /// The network rejected the transaction. Not retryable without changing
    /// the request.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// RPC or connectivity failure. Transient, safe to retry.
    #[error("transport error: {0}")]
    Transport(String),

    /// Invalid caller-supplied configuration. Never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// Local signing or message compilation failure.
    #[error("signing error: {0}")]
    Signing(String),

    /// File I/O failure, e.g. while loading a keypair.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SubmitError {
    /// Whether a retry of the same request could reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmitError::Transport(_))
    }
}

/// Result type alias for single submissions.
pub type SubmitResult<T> = Result<T, SubmitError>;

/// Error for a batched submission: the underlying failure plus where in the
/// batch it happened.
///
/// Groups before `group_index` were confirmed; groups after it were never
/// attempted. This is enough for a caller to resume from the failure point
/// with a fresh blockhash if it chooses to.
#[derive(Error, Debug)]
#[error("batch failed at group {group_index} ({confirmed} groups confirmed): {source}")]
pub struct BatchError {
    /// The underlying submission failure.
    #[source]
    pub source: SubmitError,
    /// Zero-based index of the group that failed.
    pub group_index: usize,
    /// Number of groups confirmed before the failure.
    pub confirmed: usize,
}

/// Result type alias for batched submissions.
pub type BatchResult<T> = Result<T, BatchError>;
