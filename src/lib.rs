//! Client-side state synchronization for a shared note collection.
//!
//! This crate keeps one client's view of a collaboratively edited to-do
//! list consistent with a remote backend. Local edits apply immediately
//! and reach the backend from background tasks; edits made by other
//! clients arrive over push subscriptions and are folded into the same
//! state.
//!
//! # Architecture
//!
//! - [`SessionState`] plus [`Action`] form a pure reducer: every state
//!   change, local or remote, is one [`SessionState::apply`] call.
//! - [`Session`] is the lifecycle controller. It owns the background
//!   tasks that drain the push streams into the reducer, performs echo
//!   suppression, and exposes the mutation API.
//! - [`NoteGateway`] abstracts the backend. [`InMemoryGateway`] is the
//!   bundled process-local implementation; real deployments implement
//!   the trait over their own transport.
//!
//! # Quick start
//!
//! ```
//! use std::sync::Arc;
//! use notesync::{FormField, InMemoryGateway, Session};
//!
//! tokio::runtime::Runtime::new().unwrap().block_on(async {
//!     let gateway = Arc::new(InMemoryGateway::new());
//!
//!     let session = Session::start(gateway).await.unwrap();
//!     session.set_input(FormField::Name, "groceries");
//!     session.set_input(FormField::Description, "milk, eggs");
//!     let note = session.create_note().unwrap();
//!
//!     let state = session.state();
//!     assert_eq!(state.notes[0].id, note.id);
//!     assert!(state.form.name.is_empty());
//!
//!     session.close().await;
//! });
//! ```
//!
//! Multiple sessions over one gateway observe each other's edits; see
//! [`Session`] for the push-handling rules.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod gateway;
pub mod session;
pub mod state;
pub mod types;

mod subscription;

pub use error::{Error, Result};
pub use gateway::{GatewayError, InMemoryGateway, NoteGateway, NoteIdStream, NoteStream};
pub use session::{Session, SessionBuilder};
pub use state::{Action, FormField, NoteForm, SessionState};
pub use types::{Note, NoteEvent, NotePatch};
