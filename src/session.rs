//! Session lifecycle and optimistic mutations.
//!
//! A [`Session`] is one client's live connection to the shared note
//! collection. Starting a session acquires all three push subscriptions
//! up front (failure to acquire any of them fails the start and releases
//! the ones already held), kicks off the initial fetch in the background,
//! and returns immediately with `loading` state. Closing the session
//! stops every background task before returning.
//!
//! # Mutations
//!
//! Local edits are optimistic. [`Session::create_note`],
//! [`Session::delete_note`] and [`Session::toggle_completed`] update the
//! local state first and push the change to the gateway from a background
//! task. A failed push is logged and otherwise ignored; local state is
//! not rolled back, so the collection can drift from the backend until
//! the next fetch.
//!
//! # Echo suppression
//!
//! The backend pushes creations back to every subscriber, including the
//! client that made them. Pushed creations carrying this session's own
//! client id are dropped before they reach the state, so an optimistic
//! insert is never doubled. Deleted and updated pushes are applied
//! unconditionally; replaying them over the optimistic result is
//! harmless.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use notesync::{FormField, InMemoryGateway, Session};
//!
//! tokio::runtime::Runtime::new().unwrap().block_on(async {
//!     let gateway = Arc::new(InMemoryGateway::new());
//!     let session = Session::start(gateway).await.unwrap();
//!
//!     session.set_input(FormField::Name, "groceries");
//!     session.set_input(FormField::Description, "milk, eggs");
//!     let note = session.create_note().unwrap();
//!     assert_eq!(session.state().notes[0].id, note.id);
//!
//!     session.close().await;
//! });
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::gateway::{GatewayError, NoteGateway};
use crate::state::{Action, FormField, SessionState};
use crate::subscription::SubscriptionSet;
use crate::types::event::NoteEvent;
use crate::types::note::{Note, NotePatch};

/// Configures and starts a [`Session`].
pub struct SessionBuilder {
    gateway: Arc<dyn NoteGateway>,
    client_id: Option<String>,
}

impl SessionBuilder {
    fn new(gateway: Arc<dyn NoteGateway>) -> Self {
        Self {
            gateway,
            client_id: None,
        }
    }

    /// Overrides the generated client id.
    ///
    /// Sessions sharing a client id suppress each other's creation
    /// echoes, so ids should be unique per session outside of tests.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Acquires the subscriptions, starts the background tasks and the
    /// initial fetch, and returns the running session.
    ///
    /// Subscription acquisition is all or nothing: if any of the three
    /// streams cannot be opened, the ones already opened are released and
    /// no session exists. The initial fetch runs in the background; the
    /// returned session is in `loading` state until it settles.
    pub async fn start(self) -> Result<Session> {
        let client_id = self
            .client_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let gateway = self.gateway;

        // All three or none. An early return here drops the streams
        // acquired so far, which releases them.
        let created = gateway.subscribe_created().await?;
        let deleted = gateway.subscribe_deleted().await?;
        let updated = gateway.subscribe_updated().await?;

        let state = Arc::new(watch::channel(SessionState::new()).0);

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let mut tasks = SubscriptionSet::new();
        tasks.spawn(forward(
            created,
            event_tx.clone(),
            "created",
            NoteEvent::Created,
        ));
        tasks.spawn(forward(deleted, event_tx.clone(), "deleted", |id| {
            NoteEvent::Deleted { id }
        }));
        tasks.spawn(forward(updated, event_tx, "updated", NoteEvent::Updated));
        tasks.spawn(pump(event_rx, Arc::clone(&state), client_id.clone()));

        // The fetch is detached rather than owned: a close while it is in
        // flight lets it finish against a state nobody watches.
        let fetch_gateway = Arc::clone(&gateway);
        let fetch_state = Arc::clone(&state);
        tokio::spawn(async move {
            match fetch_gateway.fetch_all().await {
                Ok(notes) => {
                    tracing::debug!(count = notes.len(), "initial fetch settled");
                    dispatch(&fetch_state, Action::SetNotes(notes));
                }
                Err(error) => {
                    tracing::warn!(error = %error, "initial fetch failed");
                    dispatch(&fetch_state, Action::FetchFailed);
                }
            }
        });

        tracing::debug!(client_id = %client_id, "session started");
        Ok(Session {
            client_id,
            gateway,
            state,
            tasks,
        })
    }
}

impl fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// A running client session.
///
/// Cheap reads ([`state`](Self::state), [`watch`](Self::watch)) and
/// synchronous optimistic mutations; all gateway traffic happens on
/// background tasks. Dropping a session aborts its tasks; calling
/// [`close`](Self::close) additionally waits for them to stop.
pub struct Session {
    client_id: String,
    gateway: Arc<dyn NoteGateway>,
    state: Arc<watch::Sender<SessionState>>,
    tasks: SubscriptionSet,
}

impl Session {
    /// Starts building a session over the given gateway.
    pub fn builder(gateway: Arc<dyn NoteGateway>) -> SessionBuilder {
        SessionBuilder::new(gateway)
    }

    /// Starts a session with a fresh client id.
    pub async fn start(gateway: Arc<dyn NoteGateway>) -> Result<Self> {
        Self::builder(gateway).start().await
    }

    /// This session's client id, stamped on every note it creates.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes.
    ///
    /// The receiver observes states in dispatch order, though a slow
    /// reader may skip intermediate ones.
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Records a keystroke in one of the form fields.
    pub fn set_input(&self, field: FormField, value: impl Into<String>) {
        dispatch(
            &self.state,
            Action::SetInput {
                field,
                value: value.into(),
            },
        );
    }

    /// Submits the form as a new note.
    ///
    /// Fails with [`Error::Validation`] if either field is empty, in
    /// which case nothing changes locally or remotely. Otherwise the note
    /// is inserted at the front of the collection, the form is cleared,
    /// and the gateway write proceeds in the background.
    pub fn create_note(&self) -> Result<Note> {
        let form = self.state.borrow().form.clone();
        if let Some(field) = form.missing_field() {
            tracing::warn!(field = %field, "creation rejected, form incomplete");
            return Err(Error::Validation { field });
        }

        let note = Note::new(form.name, form.description, self.client_id.clone());
        dispatch(&self.state, Action::AddNote(note.clone()));
        dispatch(&self.state, Action::ResetForm);

        let gateway = Arc::clone(&self.gateway);
        let remote = note.clone();
        spawn_remote("create", async move { gateway.create(remote).await });

        Ok(note)
    }

    /// Removes a note locally and requests its deletion remotely.
    ///
    /// An id absent from the local collection still results in a remote
    /// call; the local removal is simply a no-op.
    pub fn delete_note(&self, id: impl Into<String>) {
        let id = id.into();
        dispatch(&self.state, Action::DeleteNote { id: id.clone() });

        let gateway = Arc::clone(&self.gateway);
        spawn_remote("remove", async move { gateway.remove(&id).await });
    }

    /// Flips a note's completion flag.
    ///
    /// Publishes the whole collection with the one note flipped, then
    /// sends the gateway a partial update carrying just the flag. Returns
    /// `false` without side effects when the id is not in the local
    /// collection.
    pub fn toggle_completed(&self, id: &str) -> bool {
        let mut notes = {
            let current = self.state.borrow();
            if current.note(id).is_none() {
                drop(current);
                tracing::warn!(note_id = %id, "toggle requested for unknown note");
                return false;
            }
            current.notes.clone()
        };

        let mut completed = false;
        for note in &mut notes {
            if note.id == id {
                note.completed = !note.completed;
                completed = note.completed;
            }
        }
        dispatch(&self.state, Action::SetNotes(notes));

        let gateway = Arc::clone(&self.gateway);
        let patch = NotePatch::completed(id, completed);
        spawn_remote("update", async move { gateway.update(patch).await });
        true
    }

    /// Refetches the collection and waits for the result.
    ///
    /// Success replaces the collection; failure sets the sticky error
    /// flag and is also returned to the caller.
    pub async fn refresh(&self) -> Result<()> {
        match self.gateway.fetch_all().await {
            Ok(notes) => {
                tracing::debug!(count = notes.len(), "refresh settled");
                dispatch(&self.state, Action::SetNotes(notes));
                Ok(())
            }
            Err(error) => {
                tracing::warn!(error = %error, "refresh failed");
                dispatch(&self.state, Action::FetchFailed);
                Err(error.into())
            }
        }
    }

    /// Stops the session, waiting until every subscription forwarder and
    /// the event pump have fully stopped.
    ///
    /// The final state remains visible through receivers obtained from
    /// [`watch`](Self::watch).
    pub async fn close(mut self) {
        self.tasks.release().await;
        tracing::debug!(client_id = %self.client_id, "session closed");
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Applies one action to the shared state, waking watchers.
///
/// `send_modify` serializes concurrent dispatches, so watchers observe a
/// single total order of states.
fn dispatch(state: &watch::Sender<SessionState>, action: Action) {
    tracing::trace!(action = action.kind(), "dispatch");
    state.send_modify(|state| state.apply(action));
}

/// Runs one remote mutation to completion, logging a failure and
/// otherwise discarding the outcome.
fn spawn_remote<T, F>(operation: &'static str, task: F)
where
    T: Send + 'static,
    F: Future<Output = std::result::Result<T, GatewayError>> + Send + 'static,
{
    tokio::spawn(async move {
        match task.await {
            Ok(_) => tracing::debug!(operation = operation, "remote mutation acknowledged"),
            Err(error) => tracing::warn!(
                operation = operation,
                error = %error,
                "remote mutation failed, keeping local state"
            ),
        }
    });
}

/// Drains one push stream into the shared event channel.
async fn forward<T>(
    mut stream: BoxStream<'static, T>,
    events: mpsc::UnboundedSender<NoteEvent>,
    channel: &'static str,
    into_event: fn(T) -> NoteEvent,
) {
    while let Some(item) = stream.next().await {
        if events.send(into_event(item)).is_err() {
            // Pump is gone, the session is shutting down.
            break;
        }
    }
    tracing::debug!(channel = channel, "push stream closed");
}

/// Applies pushed events to the state, one at a time, in arrival order.
async fn pump(
    mut events: mpsc::UnboundedReceiver<NoteEvent>,
    state: Arc<watch::Sender<SessionState>>,
    client_id: String,
) {
    while let Some(event) = events.recv().await {
        tracing::trace!(kind = event.kind(), note_id = %event.note_id(), "push received");
        if let Some(action) = action_for(event, &client_id) {
            dispatch(&state, action);
        }
    }
}

/// Translates a push event into a state action, or drops it.
///
/// Only created pushes are filtered: one stamped with this session's own
/// client id is the echo of a local optimistic insert and applying it
/// would duplicate the note. Deletes and updates replay safely.
fn action_for(event: NoteEvent, client_id: &str) -> Option<Action> {
    match event {
        NoteEvent::Created(note) => {
            if note.client_id.as_deref() == Some(client_id) {
                tracing::debug!(note_id = %note.id, "dropping echo of local creation");
                None
            } else {
                Some(Action::AddNote(note))
            }
        }
        NoteEvent::Deleted { id } => Some(Action::DeleteNote { id }),
        NoteEvent::Updated(note) => Some(Action::UpdateNote(note)),
    }
}
