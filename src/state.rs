//! Session state and the synchronization reducer.
//!
//! [`SessionState`] is everything a client session tracks: the ordered note
//! collection, the two-field entry form, and the fetch lifecycle flags. It
//! is mutated exclusively through [`SessionState::apply`], the single
//! state-transition function mediating local optimistic edits, server
//! fetch results, and push events from other clients.
//!
//! The reducer performs no I/O, no de-duplication and no validation.
//! Policy decisions (echo suppression by client id, form validation, which
//! action a push event becomes) belong to the caller, the
//! [`Session`](crate::session::Session) controller.
//!
//! # Ordering
//!
//! - Newly created notes are prepended (most recent first).
//! - [`Action::SetNotes`] preserves the server-provided order.
//! - Updates and deletes preserve the existing order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::note::Note;

/// Selector for one of the two entry-form fields.
///
/// Mirrors the editable fields of [`Note`]; an input event can only ever
/// name one of these, so "unknown field" is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    /// The note title.
    Name,
    /// The note body.
    Description,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Description => write!(f, "description"),
        }
    }
}

/// The two text fields the user is editing.
///
/// Both fields are required non-empty before a note can be created; the
/// check itself lives in [`NoteForm::missing_field`] and is enforced by the
/// session controller, not the reducer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteForm {
    /// Title under entry.
    pub name: String,
    /// Body under entry.
    pub description: String,
}

impl NoteForm {
    /// Sets one field, leaving the other untouched.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        match field {
            FormField::Name => self.name = value.into(),
            FormField::Description => self.description = value.into(),
        }
    }

    /// Returns the current value of one field.
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Description => &self.description,
        }
    }

    /// Returns the first empty required field, checking `name` before
    /// `description`, or `None` when the form is complete.
    ///
    /// # Examples
    ///
    /// ```
    /// use notesync::{FormField, NoteForm};
    ///
    /// let mut form = NoteForm::default();
    /// assert_eq!(form.missing_field(), Some(FormField::Name));
    ///
    /// form.set(FormField::Name, "groceries");
    /// assert_eq!(form.missing_field(), Some(FormField::Description));
    ///
    /// form.set(FormField::Description, "milk, eggs");
    /// assert_eq!(form.missing_field(), None);
    /// ```
    pub fn missing_field(&self) -> Option<FormField> {
        if self.name.is_empty() {
            Some(FormField::Name)
        } else if self.description.is_empty() {
            Some(FormField::Description)
        } else {
            None
        }
    }

    /// Clears both fields.
    pub fn clear(&mut self) {
        self.name.clear();
        self.description.clear();
    }
}

/// One state transition.
///
/// Every mutation of a [`SessionState`] is one of these, whether it is an
/// optimistic local edit, a fetch outcome, or a push event from another
/// client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replace the whole collection (fetch result or manual set). Clears
    /// `loading`; leaves `error` alone.
    SetNotes(Vec<Note>),

    /// The initial fetch failed. Sets the sticky `error` flag and clears
    /// `loading`.
    FetchFailed,

    /// Prepend a note (optimistic creation or a push from another client).
    AddNote(Note),

    /// Clear both form fields after a successful submission.
    ResetForm,

    /// The user typed in a form field.
    SetInput {
        /// Which field changed.
        field: FormField,
        /// The full new value of that field.
        value: String,
    },

    /// Remove the note with this id; no-op if absent.
    DeleteNote {
        /// Identifier of the note to remove.
        id: String,
    },

    /// Replace the note with the same id in place; no-op if absent.
    UpdateNote(Note),
}

impl Action {
    /// Short lowercase label for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetNotes(_) => "set_notes",
            Self::FetchFailed => "fetch_failed",
            Self::AddNote(_) => "add_note",
            Self::ResetForm => "reset_form",
            Self::SetInput { .. } => "set_input",
            Self::DeleteNote { .. } => "delete_note",
            Self::UpdateNote(_) => "update_note",
        }
    }
}

/// Everything one client session tracks.
///
/// Created once per session with `loading = true`, an empty collection and
/// an empty form; mutated exclusively through [`apply`](Self::apply);
/// discarded with the session. There is no persistence beyond what the
/// backend holds.
///
/// # Examples
///
/// ```
/// use notesync::{Action, Note, SessionState};
///
/// let mut state = SessionState::new();
/// assert!(state.loading);
///
/// state.apply(Action::SetNotes(vec![Note::new("a", "b", "client-a")]));
/// assert!(!state.loading);
/// assert_eq!(state.notes.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// The ordered note collection, most recent first.
    pub notes: Vec<Note>,

    /// The entry form.
    pub form: NoteForm,

    /// True until the first fetch completes (successfully or not).
    pub loading: bool,

    /// True after a failed fetch. Sticky: nothing clears it.
    pub error: bool,
}

impl SessionState {
    /// The state a fresh session starts from.
    pub fn new() -> Self {
        Self {
            notes: Vec::new(),
            form: NoteForm::default(),
            loading: true,
            error: false,
        }
    }

    /// Returns the note with the given id, if present.
    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Applies one action, running to completion with no suspension.
    ///
    /// This is the only mutation path for session state. It is total:
    /// every action maps to a transition, and transitions targeting an
    /// absent id ([`Action::DeleteNote`], [`Action::UpdateNote`]) leave the
    /// state unchanged rather than failing.
    ///
    /// # Examples
    ///
    /// ```
    /// use notesync::{Action, FormField, SessionState};
    ///
    /// let mut state = SessionState::new();
    /// state.apply(Action::SetInput {
    ///     field: FormField::Name,
    ///     value: "groceries".to_string(),
    /// });
    /// assert_eq!(state.form.name, "groceries");
    /// assert_eq!(state.form.description, "");
    /// ```
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::SetNotes(notes) => {
                self.notes = notes;
                self.loading = false;
            }
            Action::FetchFailed => {
                self.error = true;
                self.loading = false;
            }
            Action::AddNote(note) => {
                self.notes.insert(0, note);
            }
            Action::ResetForm => {
                self.form.clear();
            }
            Action::SetInput { field, value } => {
                self.form.set(field, value);
            }
            Action::DeleteNote { id } => {
                self.notes.retain(|note| note.id != id);
            }
            Action::UpdateNote(note) => {
                if let Some(slot) = self.notes.iter_mut().find(|n| n.id == note.id) {
                    *slot = note;
                }
            }
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
