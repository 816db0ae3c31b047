//! Push notification type for the note subscription channels.
//!
//! The backend publishes one event per mutation over three subscription
//! channels (created / deleted / updated). Sessions merge all three into a
//! single inbound queue of [`NoteEvent`] values, preserving arrival order,
//! before translating them into reducer actions.
//!
//! # Serialization
//!
//! Events are internally tagged on `"kind"`, with the note's fields (or the
//! deleted id) flattened alongside the tag. Gateway implementations that
//! decode events off a wire must drop payload kinds they do not recognize
//! rather than fail.

use serde::{Deserialize, Serialize};

use crate::types::note::Note;

/// One push notification from the backend.
///
/// # Examples
///
/// ```
/// use notesync::NoteEvent;
///
/// let event = NoteEvent::Deleted { id: "9f2c".to_string() };
/// let json = serde_json::to_value(&event).unwrap();
/// assert_eq!(json["kind"], "deleted");
/// assert_eq!(json["id"], "9f2c");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NoteEvent {
    /// A note was created, possibly by this client (the session suppresses
    /// its own echo by `client_id`).
    Created(Note),

    /// A note was deleted.
    Deleted {
        /// Identifier of the deleted note.
        id: String,
    },

    /// A note was replaced with a new revision.
    Updated(Note),
}

impl NoteEvent {
    /// Returns the id of the note this event concerns.
    pub fn note_id(&self) -> &str {
        match self {
            Self::Created(note) | Self::Updated(note) => &note.id,
            Self::Deleted { id } => id,
        }
    }

    /// Short lowercase label for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Deleted { .. } => "deleted",
            Self::Updated(_) => "updated",
        }
    }
}
