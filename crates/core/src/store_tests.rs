use super::*;
use crate::model::ProviderKind;

fn sample_terminal(id: &str, session: &str) -> Terminal {
    Terminal {
        id: id.to_string(),
        session: session.to_string(),
        window: "main".to_string(),
        provider_kind: ProviderKind::Codex,
        agent_profile: None,
        created_at: chrono::Utc::now(),
    }
}

#[test]
fn insert_then_get_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = MetadataStore::open(dir.path().join("store.jsonl")).unwrap();
    store.insert_terminal(sample_terminal("t1", "sess-a")).unwrap();
    let fetched = store.get_terminal("t1").unwrap();
    assert_eq!(fetched.session, "sess-a");
}

#[test]
fn unknown_terminal_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = MetadataStore::open(dir.path().join("store.jsonl")).unwrap();
    let err = store.get_terminal("ghost").unwrap_err();
    assert_eq!(err.code(), crate::error::ErrorCode::UnknownTerminal);
}

#[test]
fn remove_terminal_clears_it_from_listings() {
    let dir = tempfile::tempdir().unwrap();
    let store = MetadataStore::open(dir.path().join("store.jsonl")).unwrap();
    store.insert_terminal(sample_terminal("t1", "sess-a")).unwrap();
    store.remove_terminal("t1").unwrap();
    assert!(store.list_terminals().is_empty());
}

#[test]
fn reopening_the_log_replays_prior_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.jsonl");
    {
        let store = MetadataStore::open(&path).unwrap();
        store.insert_terminal(sample_terminal("t1", "sess-a")).unwrap();
        store.enqueue_message(InboxMessage::new("t2", "t1", "hello")).unwrap();
    }

    let reopened = MetadataStore::open(&path).unwrap();
    assert_eq!(reopened.get_terminal("t1").unwrap().session, "sess-a");
    assert_eq!(reopened.oldest_pending("t1").unwrap().body, "hello");
}

#[test]
fn oldest_pending_is_fifo_by_created_at() {
    let dir = tempfile::tempdir().unwrap();
    let store = MetadataStore::open(dir.path().join("store.jsonl")).unwrap();

    let mut first = InboxMessage::new("t2", "t1", "first");
    first.created_at = chrono::Utc::now() - chrono::Duration::seconds(10);
    let second = InboxMessage::new("t2", "t1", "second");

    store.enqueue_message(second).unwrap();
    store.enqueue_message(first).unwrap();

    assert_eq!(store.oldest_pending("t1").unwrap().body, "first");
}

#[test]
fn try_mark_delivered_is_one_shot() {
    let dir = tempfile::tempdir().unwrap();
    let store = MetadataStore::open(dir.path().join("store.jsonl")).unwrap();
    let message = InboxMessage::new("t2", "t1", "hi");
    let id = message.id.clone();
    store.enqueue_message(message).unwrap();

    assert!(store.try_mark_delivered(&id).unwrap());
    assert!(!store.try_mark_delivered(&id).unwrap());
    assert!(!store.try_mark_failed(&id).unwrap());
    assert_eq!(store.oldest_pending("t1"), None);
}

#[test]
fn list_messages_filters_by_status_and_limit() {
    let dir = tempfile::tempdir().unwrap();
    let store = MetadataStore::open(dir.path().join("store.jsonl")).unwrap();
    for body in ["a", "b", "c"] {
        store.enqueue_message(InboxMessage::new("t2", "t1", body)).unwrap();
    }
    let delivered_id = store.oldest_pending("t1").unwrap().id;
    store.try_mark_delivered(&delivered_id).unwrap();

    let pending = store.list_messages("t1", Some(MessageStatus::Pending), None);
    assert_eq!(pending.len(), 2);

    let limited = store.list_messages("t1", None, Some(1));
    assert_eq!(limited.len(), 1);
}

#[test]
fn list_sessions_deduplicates_across_terminals() {
    let dir = tempfile::tempdir().unwrap();
    let store = MetadataStore::open(dir.path().join("store.jsonl")).unwrap();
    store.insert_terminal(sample_terminal("t1", "sess-a")).unwrap();
    store.insert_terminal(sample_terminal("t2", "sess-a")).unwrap();
    store.insert_terminal(sample_terminal("t3", "sess-b")).unwrap();

    assert_eq!(store.list_sessions(), vec!["sess-a".to_string(), "sess-b".to_string()]);
    assert_eq!(store.list_session_terminals("sess-a").len(), 2);
}
