//! In-memory gateway backend.
//!
//! [`InMemoryGateway`] keeps the note collection in process memory and
//! fans pushes out over broadcast channels, so several sessions sharing
//! one instance observe each other's edits exactly like clients of a real
//! backend. Failure injection knobs make the error paths testable.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::{future, StreamExt};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::gateway::{GatewayError, NoteGateway, NoteIdStream, NoteStream};
use crate::types::note::{Note, NotePatch};

/// Push buffer per subscription. A subscriber that falls further behind
/// than this loses the oldest pushes (they are skipped, not errored).
const PUSH_BUFFER: usize = 64;

/// A process-local [`NoteGateway`].
///
/// Notes are held most recent first, matching the order optimistic
/// clients maintain, so a refresh after local edits is stable.
///
/// # Examples
///
/// ```
/// use notesync::{InMemoryGateway, Note, NoteGateway};
///
/// tokio::runtime::Runtime::new().unwrap().block_on(async {
///     let gateway = InMemoryGateway::new();
///     gateway
///         .create(Note::new("groceries", "milk, eggs", "client-a"))
///         .await
///         .unwrap();
///     assert_eq!(gateway.fetch_all().await.unwrap().len(), 1);
/// });
/// ```
pub struct InMemoryGateway {
    notes: RwLock<Vec<Note>>,
    created_tx: broadcast::Sender<Note>,
    deleted_tx: broadcast::Sender<String>,
    updated_tx: broadcast::Sender<Note>,
    fail_fetch: AtomicBool,
    fail_mutations: AtomicBool,
}

impl InMemoryGateway {
    /// Creates an empty gateway.
    pub fn new() -> Self {
        Self::with_notes(Vec::new())
    }

    /// Creates a gateway pre-seeded with notes, most recent first.
    pub fn with_notes(notes: Vec<Note>) -> Self {
        let (created_tx, _) = broadcast::channel(PUSH_BUFFER);
        let (deleted_tx, _) = broadcast::channel(PUSH_BUFFER);
        let (updated_tx, _) = broadcast::channel(PUSH_BUFFER);
        Self {
            notes: RwLock::new(notes),
            created_tx,
            deleted_tx,
            updated_tx,
            fail_fetch: AtomicBool::new(false),
            fail_mutations: AtomicBool::new(false),
        }
    }

    /// Makes subsequent `fetch_all` calls fail.
    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `create`, `remove` and `update` calls fail.
    pub fn set_fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    /// Number of notes currently stored.
    pub fn note_count(&self) -> usize {
        self.notes.read().len()
    }

    /// Live subscriber counts as `(created, deleted, updated)`.
    ///
    /// Dropped streams disappear from these counts, which is how tests
    /// verify that closing a session released every subscription.
    pub fn subscriber_counts(&self) -> (usize, usize, usize) {
        (
            self.created_tx.receiver_count(),
            self.deleted_tx.receiver_count(),
            self.updated_tx.receiver_count(),
        )
    }

    fn check_mutations(&self) -> Result<(), GatewayError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            Err(GatewayError::Unavailable(
                "mutations disabled".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryGateway")
            .field("notes", &self.note_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NoteGateway for InMemoryGateway {
    async fn fetch_all(&self) -> Result<Vec<Note>, GatewayError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("fetch disabled".to_string()));
        }
        Ok(self.notes.read().clone())
    }

    async fn create(&self, note: Note) -> Result<(), GatewayError> {
        self.check_mutations()?;
        self.notes.write().insert(0, note.clone());
        // No live subscribers is not an error.
        let _ = self.created_tx.send(note);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), GatewayError> {
        self.check_mutations()?;
        let mut notes = self.notes.write();
        let before = notes.len();
        notes.retain(|note| note.id != id);
        if notes.len() == before {
            return Err(GatewayError::NotFound { id: id.to_string() });
        }
        drop(notes);
        let _ = self.deleted_tx.send(id.to_string());
        Ok(())
    }

    async fn update(&self, patch: NotePatch) -> Result<Note, GatewayError> {
        self.check_mutations()?;
        let mut notes = self.notes.write();
        let slot = notes
            .iter_mut()
            .find(|note| note.id == patch.id)
            .ok_or_else(|| GatewayError::NotFound {
                id: patch.id.clone(),
            })?;
        patch.apply_to(slot);
        let updated = slot.clone();
        drop(notes);
        let _ = self.updated_tx.send(updated.clone());
        Ok(updated)
    }

    async fn subscribe_created(&self) -> Result<NoteStream, GatewayError> {
        let rx = self.created_tx.subscribe();
        Ok(BroadcastStream::new(rx)
            .filter_map(|push| future::ready(push.ok()))
            .boxed())
    }

    async fn subscribe_deleted(&self) -> Result<NoteIdStream, GatewayError> {
        let rx = self.deleted_tx.subscribe();
        Ok(BroadcastStream::new(rx)
            .filter_map(|push| future::ready(push.ok()))
            .boxed())
    }

    async fn subscribe_updated(&self) -> Result<NoteStream, GatewayError> {
        let rx = self.updated_tx.subscribe();
        Ok(BroadcastStream::new(rx)
            .filter_map(|push| future::ready(push.ok()))
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn note(id: &str) -> Note {
        Note {
            id: id.to_string(),
            client_id: Some("client-a".to_string()),
            name: format!("note {id}"),
            description: "body".to_string(),
            completed: false,
        }
    }

    #[tokio::test]
    async fn create_prepends_and_broadcasts() {
        let gateway = InMemoryGateway::new();
        let mut created = gateway.subscribe_created().await.unwrap();

        gateway.create(note("1")).await.unwrap();
        gateway.create(note("2")).await.unwrap();

        let all = gateway.fetch_all().await.unwrap();
        assert_eq!(all[0].id, "2");
        assert_eq!(all[1].id, "1");

        assert_eq!(created.next().await.unwrap().id, "1");
        assert_eq!(created.next().await.unwrap().id, "2");
    }

    #[tokio::test]
    async fn created_push_carries_client_id_verbatim() {
        let gateway = InMemoryGateway::new();
        let mut created = gateway.subscribe_created().await.unwrap();

        gateway.create(note("1")).await.unwrap();
        let push = created.next().await.unwrap();
        assert_eq!(push.client_id.as_deref(), Some("client-a"));
    }

    #[tokio::test]
    async fn remove_broadcasts_id_and_errors_on_missing() {
        let gateway = InMemoryGateway::with_notes(vec![note("1")]);
        let mut deleted = gateway.subscribe_deleted().await.unwrap();

        gateway.remove("1").await.unwrap();
        assert_eq!(gateway.note_count(), 0);
        assert_eq!(deleted.next().await.unwrap(), "1");

        let err = gateway.remove("1").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
    }

    #[tokio::test]
    async fn update_applies_patch_and_broadcasts() {
        let gateway = InMemoryGateway::with_notes(vec![note("1")]);
        let mut updated = gateway.subscribe_updated().await.unwrap();

        let result = gateway.update(NotePatch::completed("1", true)).await.unwrap();
        assert!(result.completed);
        assert_eq!(result.name, "note 1", "untouched fields preserved");

        let push = updated.next().await.unwrap();
        assert_eq!(push, result);

        let err = gateway
            .update(NotePatch::completed("missing", true))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
    }

    #[tokio::test]
    async fn fetch_failure_injection() {
        let gateway = InMemoryGateway::with_notes(vec![note("1")]);
        gateway.set_fail_fetch(true);
        assert!(gateway.fetch_all().await.is_err());

        gateway.set_fail_fetch(false);
        assert_eq!(gateway.fetch_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mutation_failure_injection_leaves_store_untouched() {
        let gateway = InMemoryGateway::with_notes(vec![note("1")]);
        gateway.set_fail_mutations(true);

        assert!(gateway.create(note("2")).await.is_err());
        assert!(gateway.remove("1").await.is_err());
        assert!(gateway
            .update(NotePatch::completed("1", true))
            .await
            .is_err());

        assert_eq!(gateway.note_count(), 1);
        assert!(!gateway.fetch_all().await.unwrap()[0].completed);
    }

    #[tokio::test]
    async fn dropping_streams_releases_subscriptions() {
        let gateway = InMemoryGateway::new();
        let created = gateway.subscribe_created().await.unwrap();
        let deleted = gateway.subscribe_deleted().await.unwrap();
        let updated = gateway.subscribe_updated().await.unwrap();
        assert_eq!(gateway.subscriber_counts(), (1, 1, 1));

        drop(created);
        drop(deleted);
        drop(updated);
        assert_eq!(gateway.subscriber_counts(), (0, 0, 0));
    }

    #[tokio::test]
    async fn pushes_reach_every_subscriber() {
        let gateway = InMemoryGateway::new();
        let mut first = gateway.subscribe_created().await.unwrap();
        let mut second = gateway.subscribe_created().await.unwrap();

        gateway.create(note("1")).await.unwrap();
        assert_eq!(first.next().await.unwrap().id, "1");
        assert_eq!(second.next().await.unwrap().id, "1");
    }
}
