//! Error types for session operations.
//!
//! Only the session's request/response surface returns errors. Background
//! work (the detached fetch, the remote halves of optimistic mutations)
//! reports failure through the state (`FetchFailed`) or the log instead,
//! so those paths never surface here.

use crate::gateway::GatewayError;
use crate::state::FormField;

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An error returned by a session operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required form field was empty at submission.
    ///
    /// The session rejects creation before any local or remote effect, so
    /// a validation failure leaves the state untouched.
    #[error("please enter a name and description: missing {field}")]
    Validation {
        /// The first empty required field.
        field: FormField,
    },

    /// The gateway failed while the caller was waiting on it.
    ///
    /// Only foreground gateway calls (stream acquisition at startup, an
    /// explicit awaited refresh) produce this variant.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
}
