//! Fatal error taxonomy for an assembly run.
//!
//! Only two conditions halt a run: the input wire object failing
//! validation (before any I/O), and the output sink failing. Network
//! failures are absorbed by the fetch layer as skip-and-continue and
//! never appear here. Content Model invariant violations surface earlier,
//! at export time, as [`crate::model::ModelError`].

use thiserror::Error;

use crate::wire::ValidationError;

/// Failure that aborts an assembly run.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// The input wire object failed structural validation; nothing was
    /// fetched or written.
    #[error("invalid wire object: {0}")]
    Validation(#[from] ValidationError),

    /// The archive sink failed; the output is incomplete.
    #[error("archive sink error: {0}")]
    Sink(#[from] std::io::Error),
}
