//! Wire types shared with the remote notes service.
//!
//! These types serialize to the JSON shapes the hosted service speaks
//! (`camelCase` fields, tagged events). Client-local state (the form, the
//! flags, the reducer) lives in the [`state`](crate::state) module.

pub mod event;
pub mod note;

pub use event::NoteEvent;
pub use note::{Note, NotePatch};
