//! The remote gateway abstraction.
//!
//! [`NoteGateway`] is the session's only window onto the shared backend:
//! four request/response operations and three push subscriptions. The
//! session controller is written entirely against this trait, so backends
//! are swappable without touching the synchronization logic. The bundled
//! [`InMemoryGateway`](memory::InMemoryGateway) backs tests and local use.
//!
//! # Contract
//!
//! - Operations may fail or never settle; the session never assumes
//!   success.
//! - `create` must deliver the note's `clientId` back verbatim on the
//!   created push stream. Echo suppression happens in the consumer, never
//!   in the gateway.
//! - Deleted and updated pushes are delivered to all subscribers,
//!   including the originator.
//! - Dropping a subscription stream releases it. Implementations must not
//!   require an explicit unsubscribe call.
//! - Wire-facing implementations must skip malformed or unrecognized push
//!   payloads rather than error the stream.

pub mod memory;

use std::fmt;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::types::note::{Note, NotePatch};

pub use memory::InMemoryGateway;

/// A stream of full note payloads (created and updated pushes).
///
/// Dropping the stream cancels the underlying subscription.
pub type NoteStream = BoxStream<'static, Note>;

/// A stream of note identifiers (deleted pushes).
pub type NoteIdStream = BoxStream<'static, String>;

/// An error from a gateway operation.
#[derive(Debug)]
pub enum GatewayError {
    /// No note with the given id exists on the backend.
    NotFound {
        /// The id that was requested.
        id: String,
    },

    /// The backend refused or could not be reached.
    Unavailable(String),

    /// A backend-specific failure.
    Backend {
        /// Human-readable description.
        message: String,
        /// Underlying error, when one exists.
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl GatewayError {
    /// Creates a backend error from a message.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a backend error wrapping an underlying error.
    pub fn backend_with(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Backend {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { id } => write!(f, "note not found: {id}"),
            Self::Unavailable(reason) => write!(f, "backend unavailable: {reason}"),
            Self::Backend { message, .. } => write!(f, "backend error: {message}"),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Backend {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Remote backend for a note session.
///
/// Implementations are shared across the session's background tasks, so
/// they must be `Send + Sync` and internally synchronized.
#[async_trait]
pub trait NoteGateway: Send + Sync {
    /// Fetches the full note collection, in backend order.
    async fn fetch_all(&self) -> Result<Vec<Note>, GatewayError>;

    /// Persists a new note.
    ///
    /// The note's id and `clientId` are assigned by the caller and must be
    /// stored and pushed verbatim.
    async fn create(&self, note: Note) -> Result<(), GatewayError>;

    /// Removes the note with the given id.
    async fn remove(&self, id: &str) -> Result<(), GatewayError>;

    /// Applies a partial update, returning the resulting note.
    async fn update(&self, patch: NotePatch) -> Result<Note, GatewayError>;

    /// Opens a push stream of notes created by any client.
    async fn subscribe_created(&self) -> Result<NoteStream, GatewayError>;

    /// Opens a push stream of ids of notes deleted by any client.
    async fn subscribe_deleted(&self) -> Result<NoteIdStream, GatewayError>;

    /// Opens a push stream of notes updated by any client.
    async fn subscribe_updated(&self) -> Result<NoteStream, GatewayError>;
}
