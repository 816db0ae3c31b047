//! Scripted reducer flows.
//!
//! Each test drives a fresh [`SessionState`] through a realistic action
//! sequence and checks the intermediate and final states, exercising the
//! transition rules in combination rather than one arm at a time.

use notesync::{Action, FormField, Note, SessionState};
use pretty_assertions::assert_eq;

fn note(id: &str, name: &str) -> Note {
    Note {
        id: id.to_string(),
        client_id: None,
        name: name.to_string(),
        description: "body".to_string(),
        completed: false,
    }
}

fn owned(id: &str, client: &str) -> Note {
    Note {
        client_id: Some(client.to_string()),
        ..note(id, "owned")
    }
}

fn set_input(field: FormField, value: &str) -> Action {
    Action::SetInput {
        field,
        value: value.to_string(),
    }
}

#[test]
fn full_session_script() {
    let mut state = SessionState::new();

    // Fetch settles with two existing notes.
    state.apply(Action::SetNotes(vec![note("1", "first"), note("2", "second")]));
    assert!(!state.loading);
    assert_eq!(state.notes.len(), 2);

    // The user types a new note and submits.
    state.apply(set_input(FormField::Name, "groceries"));
    state.apply(set_input(FormField::Description, "milk, eggs"));
    state.apply(Action::AddNote(owned("3", "me")));
    state.apply(Action::ResetForm);

    assert_eq!(state.notes[0].id, "3", "new note goes in front");
    assert!(state.form.name.is_empty());
    assert!(state.form.description.is_empty());

    // Another client creates a note; its push lands next.
    state.apply(Action::AddNote(owned("4", "them")));
    assert_eq!(state.notes[0].id, "4");

    // Completion toggle arrives as a whole-collection replacement.
    let mut toggled = state.notes.clone();
    toggled[2].completed = true;
    state.apply(Action::SetNotes(toggled));
    assert!(state.notes[2].completed);
    assert_eq!(state.notes.len(), 4);

    // Finally the first note is deleted.
    state.apply(Action::DeleteNote {
        id: "1".to_string(),
    });
    let ids: Vec<&str> = state.notes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["4", "3", "2"]);
    assert!(!state.error);
}

#[test]
fn pushes_interleave_with_local_edits() {
    let mut state = SessionState::new();
    state.apply(Action::SetNotes(vec![note("a", "alpha")]));

    // Local optimistic add, then a remote update to the fetched note,
    // then a remote delete, all while the user keeps typing.
    state.apply(set_input(FormField::Name, "dra"));
    state.apply(Action::AddNote(owned("b", "me")));

    let mut revised = note("a", "alpha renamed");
    revised.completed = true;
    state.apply(Action::UpdateNote(revised));
    state.apply(set_input(FormField::Name, "draft"));
    state.apply(Action::DeleteNote {
        id: "a".to_string(),
    });

    assert_eq!(state.notes.len(), 1);
    assert_eq!(state.notes[0].id, "b");
    assert_eq!(state.form.name, "draft", "typing survives remote traffic");
}

#[test]
fn failed_fetch_still_accepts_pushes() {
    let mut state = SessionState::new();
    state.apply(Action::FetchFailed);
    assert!(state.error);

    state.apply(Action::AddNote(note("1", "pushed")));
    let mut revised = note("1", "pushed, revised");
    revised.completed = true;
    state.apply(Action::UpdateNote(revised.clone()));

    assert_eq!(state.notes, vec![revised]);
    assert!(state.error, "error stays set while pushes apply");

    state.apply(Action::DeleteNote {
        id: "1".to_string(),
    });
    assert!(state.notes.is_empty());
    assert!(state.error);
}

#[test]
fn late_fetch_result_overwrites_optimistic_entries() {
    let mut state = SessionState::new();
    state.apply(Action::AddNote(owned("local", "me")));
    assert_eq!(state.notes.len(), 1);

    // The fetch settles afterwards with the backend's view; replacement
    // is total, so entries the backend has not seen disappear.
    state.apply(Action::SetNotes(vec![note("1", "remote")]));
    let ids: Vec<&str> = state.notes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["1"]);
}

#[test]
fn duplicate_delete_pushes_are_idempotent() {
    let mut state = SessionState::new();
    state.apply(Action::SetNotes(vec![note("1", "first"), note("2", "second")]));

    for _ in 0..2 {
        state.apply(Action::DeleteNote {
            id: "1".to_string(),
        });
    }
    let ids: Vec<&str> = state.notes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["2"]);
}

#[test]
fn update_after_delete_does_not_resurrect() {
    let mut state = SessionState::new();
    state.apply(Action::SetNotes(vec![note("1", "first")]));
    state.apply(Action::DeleteNote {
        id: "1".to_string(),
    });

    let mut revised = note("1", "ghost");
    revised.completed = true;
    state.apply(Action::UpdateNote(revised));
    assert!(state.notes.is_empty());
}

#[test]
fn only_fetch_actions_touch_the_lifecycle_flags() {
    let non_fetch: Vec<Action> = vec![
        Action::AddNote(note("1", "first")),
        Action::ResetForm,
        set_input(FormField::Name, "x"),
        set_input(FormField::Description, "y"),
        Action::DeleteNote {
            id: "1".to_string(),
        },
        Action::UpdateNote(note("1", "revised")),
    ];

    let mut state = SessionState::new();
    for action in non_fetch {
        state.apply(action);
        assert!(state.loading, "only a fetch outcome clears loading");
        assert!(!state.error, "only a failed fetch sets error");
    }
}
