//! Core note wire types.
//!
//! This module defines the types that cross the gateway boundary:
//! [`Note`], the full record, and [`NotePatch`], the partial-update input.
//!
//! # Serialization
//!
//! Both types use `#[serde(rename_all = "camelCase")]` to match the hosted
//! service's JSON field naming. `client_id` serializes as `clientId` and is
//! omitted when `None` (rows seeded server-side carry no originating
//! client). `completed` defaults to `false` on deserialization so older
//! rows without the field still parse.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single note in the shared list.
///
/// The `id` is client-generated (UUID v4), assigned at creation time, and
/// immutable afterwards. `client_id` names the client instance that created
/// the note; sessions use it to suppress the echo of their own creations
/// received back over the push channel.
///
/// # Examples
///
/// ```
/// use notesync::Note;
///
/// let note = Note {
///     id: "9f2c".to_string(),
///     client_id: Some("client-a".to_string()),
///     name: "groceries".to_string(),
///     description: "milk, eggs".to_string(),
///     completed: false,
/// };
///
/// let json = serde_json::to_value(&note).unwrap();
/// assert_eq!(json["id"], "9f2c");
/// assert_eq!(json["clientId"], "client-a");
/// assert_eq!(json["completed"], false);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier, client-generated at creation.
    pub id: String,

    /// Identifier of the client instance that created the note. Omitted
    /// on the wire when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Short title. Required non-empty at creation.
    pub name: String,

    /// Free-text body. Required non-empty at creation.
    pub description: String,

    /// Completion flag. Defaults to `false`.
    #[serde(default)]
    pub completed: bool,
}

impl Note {
    /// Builds a new, not-yet-completed note with a fresh UUID v4 id.
    ///
    /// # Examples
    ///
    /// ```
    /// use notesync::Note;
    ///
    /// let note = Note::new("groceries", "milk, eggs", "client-a");
    /// assert!(!note.completed);
    /// assert_eq!(note.client_id.as_deref(), Some("client-a"));
    /// assert!(!note.id.is_empty());
    /// ```
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            client_id: Some(client_id.into()),
            name: name.into(),
            description: description.into(),
            completed: false,
        }
    }
}

/// Partial-update input for an existing note.
///
/// Carries the target `id` plus only the fields being changed; `None`
/// fields are omitted on the wire. The toggle-completion flow sends only
/// `id` and `completed`.
///
/// # Examples
///
/// ```
/// use notesync::NotePatch;
///
/// let patch = NotePatch::completed("9f2c", true);
/// let json = serde_json::to_value(&patch).unwrap();
/// assert_eq!(json["id"], "9f2c");
/// assert_eq!(json["completed"], true);
/// assert!(json.get("name").is_none());
/// assert!(json.get("description").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    /// Identifier of the note being updated.
    pub id: String,

    /// Replacement title, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Replacement body, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Replacement completion flag, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl NotePatch {
    /// Builds the patch the toggle-completion flow sends: `id` plus the new
    /// `completed` value, nothing else.
    pub fn completed(id: impl Into<String>, completed: bool) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            completed: Some(completed),
        }
    }

    /// Merges this patch into an existing note, field by field.
    ///
    /// The note's `id` and `client_id` are never touched.
    pub fn apply_to(&self, note: &mut Note) {
        if let Some(name) = &self.name {
            note.name = name.clone();
        }
        if let Some(description) = &self.description {
            note.description = description.clone();
        }
        if let Some(completed) = self.completed {
            note.completed = completed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Note {
        Note {
            id: "n-1".to_string(),
            client_id: Some("client-a".to_string()),
            name: "groceries".to_string(),
            description: "milk, eggs".to_string(),
            completed: false,
        }
    }

    #[test]
    fn note_serializes_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["id"], "n-1");
        assert_eq!(json["clientId"], "client-a");
        assert_eq!(json["name"], "groceries");
        assert_eq!(json["description"], "milk, eggs");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn note_client_id_omitted_when_none() {
        let mut note = sample();
        note.client_id = None;
        let json = serde_json::to_value(&note).unwrap();
        assert!(json.get("clientId").is_none());
    }

    #[test]
    fn note_completed_defaults_false_on_deserialize() {
        let json = r#"{"id":"n-2","name":"x","description":"y"}"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert!(!note.completed);
        assert!(note.client_id.is_none());
    }

    #[test]
    fn note_round_trip() {
        let note = sample();
        let json = serde_json::to_string(&note).unwrap();
        let back: Note = serde_json::from_str(&json).unwrap();
        assert_eq!(note, back);
    }

    #[test]
    fn new_assigns_unique_ids() {
        let a = Note::new("a", "b", "c");
        let b = Note::new("a", "b", "c");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn completed_patch_carries_only_id_and_flag() {
        let patch = NotePatch::completed("n-1", true);
        let json = serde_json::to_value(&patch).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(json["id"], "n-1");
        assert_eq!(json["completed"], true);
    }

    #[test]
    fn apply_to_merges_present_fields_only() {
        let mut note = sample();
        let patch = NotePatch {
            id: "n-1".to_string(),
            name: None,
            description: Some("bread".to_string()),
            completed: Some(true),
        };
        patch.apply_to(&mut note);
        assert_eq!(note.name, "groceries");
        assert_eq!(note.description, "bread");
        assert!(note.completed);
        assert_eq!(note.client_id.as_deref(), Some("client-a"));
    }

    #[test]
    fn apply_to_with_empty_patch_is_identity() {
        let mut note = sample();
        let patch = NotePatch {
            id: "n-1".to_string(),
            name: None,
            description: None,
            completed: None,
        };
        let before = note.clone();
        patch.apply_to(&mut note);
        assert_eq!(note, before);
    }
}
