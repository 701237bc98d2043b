//! End-to-end flows across the list, creation and edit screens.

use std::sync::Arc;
use std::time::Duration;

use carnival_core::autosave::SaveStatus;
use carnival_core::backend::{MemoryNotesBackend, NotesBackend, SharedBackend};
use carnival_core::models::{Identity, DEFAULT_TITLE, EMPTY_DOCUMENT};
use carnival_core::views::{create_note, DeleteOutcome, EditorState, ListMount, NoteList, Route};
use pretty_assertions::assert_eq;

const DELAY: Duration = Duration::from_millis(500);

fn shared(backend: &MemoryNotesBackend) -> SharedBackend {
    Arc::new(backend.clone())
}

async fn list_for(backend: &MemoryNotesBackend) -> NoteList {
    match NoteList::mount(shared(backend)).await {
        ListMount::Ready(list) => list,
        ListMount::Redirect(route) => panic!("unexpected redirect to {route}"),
    }
}

#[tokio::test(start_paused = true)]
async fn retitled_note_is_private_to_its_owner() {
    let user_a = MemoryNotesBackend::signed_in(Identity::new("user-a"));
    let user_b = user_a.session_for(Identity::new("user-b"));

    let creation = create_note(&user_a).await;
    let Route::Edit(id) = creation.route() else {
        panic!("creation failed: {creation:?}");
    };

    let mut session = EditorState::open(shared(&user_a), id, None, DELAY)
        .await
        .into_session()
        .unwrap();
    let content_before = session.content();
    session.title_changed("Groceries");
    tokio::time::sleep(DELAY + Duration::from_millis(50)).await;

    let stored = user_a.get_note(&id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Groceries");
    assert_eq!(stored.content, content_before);
    assert_eq!(session.status(), SaveStatus::Saved);

    let intruder = EditorState::open(shared(&user_b), id, None, DELAY).await;
    assert_eq!(intruder.redirect(), Some(Route::List));
}

#[tokio::test(start_paused = true)]
async fn typing_within_one_window_saves_once() {
    let backend = MemoryNotesBackend::signed_in(Identity::new("user-a"));
    let id = create_note(&backend).await.note_id().unwrap();
    let mut session = EditorState::open(shared(&backend), id, None, DELAY)
        .await
        .into_session()
        .unwrap();

    session.content_changed("<p>Hello</p>");
    tokio::time::sleep(Duration::from_millis(100)).await;
    session.content_changed("<p>Hello World</p>");
    tokio::time::sleep(Duration::from_secs(2)).await;

    let updates = backend.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].1.content, "<p>Hello World</p>");
    assert_eq!(updates[0].1.title, DEFAULT_TITLE);
}

#[tokio::test]
async fn created_note_round_trips_with_defaults() {
    let backend = MemoryNotesBackend::signed_in(Identity::new("user-a"));
    let id = create_note(&backend).await.note_id().unwrap();

    let note = backend.get_note(&id).await.unwrap().unwrap();
    assert_eq!(note.title, DEFAULT_TITLE);
    assert_eq!(note.content, "");
    assert_eq!(note.document(), EMPTY_DOCUMENT);
    assert_eq!(note.user_id, "user-a");
    assert_eq!(note.created_at, note.updated_at);
}

#[tokio::test]
async fn list_holds_only_own_notes_and_deletes_them() {
    let user_a = MemoryNotesBackend::signed_in(Identity::new("user-a"));
    let user_b = user_a.session_for(Identity::new("user-b"));

    let first = create_note(&user_a).await.note_id().unwrap();
    let second = create_note(&user_a).await.note_id().unwrap();
    create_note(&user_b).await.note_id().unwrap();

    let mut list = list_for(&user_a).await;
    let mut ids = list.notes().iter().map(|note| note.id).collect::<Vec<_>>();
    ids.sort_by_key(ToString::to_string);
    let mut expected = vec![first, second];
    expected.sort_by_key(ToString::to_string);
    assert_eq!(ids, expected);

    assert_eq!(list.delete(first, |_, _| true).await, DeleteOutcome::Deleted);
    let remaining = user_a.list_notes(&Identity::new("user-a")).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, second);
}

#[tokio::test]
async fn closing_the_editor_persists_and_reorders_the_list() {
    let backend = MemoryNotesBackend::signed_in(Identity::new("user-a"));
    let older = create_note(&backend).await.note_id().unwrap();
    let newer = create_note(&backend).await.note_id().unwrap();

    let mut session = EditorState::open(shared(&backend), older, None, DELAY)
        .await
        .into_session()
        .unwrap();
    session.content_changed("<p>bumped</p>");
    assert_eq!(session.close().await, SaveStatus::Saved);

    let list = list_for(&backend).await;
    assert_eq!(list.notes()[0].id, older);
    assert_eq!(list.notes()[1].id, newer);
    assert_eq!(list.notes()[0].content, "<p>bumped</p>");
}
