//! Commit protocol scenarios: conflicts, autosave debounce, failures, gating

use pagecraft_editor::{
    CommitError, CommitKind, CommitState, DocumentSession, EditorError, GateIssue, MemoryStore, Mutation,
    SessionConfig, StoreError, Template, TemplateStore,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let template = Template::from_stored(&json!({
        "id": "tpl_1",
        "revision": 5,
        "slug": "acme",
        "name": "Acme Plumbing",
        "data": { "pages": [{
            "id": "home",
            "slug": "home",
            "title": "Home",
            "blocks": [{ "id": "hero-1", "type": "hero", "content": { "headline": "Welcome" } }]
        }] }
    }))
    .unwrap();
    store.insert(template);
    store
}

async fn open(store: &Arc<MemoryStore>) -> DocumentSession {
    DocumentSession::open(store.clone(), "tpl_1", SessionConfig::default())
        .await
        .unwrap()
}

fn retitle(title: &str) -> Mutation {
    Mutation::UpdatePage {
        page_id: "home".into(),
        title: Some(title.into()),
        slug: None,
        show_header: None,
        show_footer: None,
    }
}

fn headline(text: &str) -> Mutation {
    Mutation::UpdateBlock {
        block_id: "hero-1".into(),
        content: json!({ "headline": text }),
    }
}

#[tokio::test]
async fn test_second_writer_conflicts_then_retries() {
    let store = seeded_store();
    let a = open(&store).await;
    let b = open(&store).await;

    a.apply(headline("From A")).unwrap();
    assert_eq!(a.save().await.unwrap(), 6);

    b.apply(retitle("From B")).unwrap();
    let err = b.save().await.unwrap_err();
    assert!(err.is_conflict());
    assert!(matches!(
        err,
        EditorError::Commit(CommitError::Conflict { base: 5, current: 6 })
    ));
    assert_eq!(b.commit_state(), CommitState::Conflict);
    assert!(b.is_dirty());
    assert_eq!(b.snapshot().pages[0].title, "From B");

    assert_eq!(b.reload_revision().await.unwrap(), 6);
    assert_eq!(b.commit_state(), CommitState::Dirty);
    assert_eq!(b.save().await.unwrap(), 7);
    assert!(!b.is_dirty());

    let stored = store.load("tpl_1").await.unwrap();
    assert_eq!(stored.revision, 7);
    assert_eq!(stored.pages[0].title, "From B");

    let bases: Vec<u64> = store.commits().iter().map(|c| c.base_rev).collect();
    assert_eq!(bases, vec![5, 6]);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_edits_coalesce_into_one_autosave() {
    let store = seeded_store();
    let session = open(&store).await;

    for i in 0..5 {
        session.apply(retitle(&format!("Draft {}", i))).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(store.commits().is_empty());
    assert!(session.autosave_pending());

    tokio::time::sleep(Duration::from_millis(900)).await;

    let commits = store.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].kind, CommitKind::Autosave);
    assert_eq!(store.get("tpl_1").unwrap().pages[0].title, "Draft 4");
    assert!(!session.is_dirty());
    assert_eq!(session.commit_state(), CommitState::Idle);
    assert_eq!(session.revision(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_save_cancels_pending_autosave() {
    let store = seeded_store();
    let session = open(&store).await;

    session.apply(retitle("Saved")).unwrap();
    assert!(session.autosave_pending());
    assert_eq!(session.save().await.unwrap(), 6);
    assert!(!session.autosave_pending());

    tokio::time::sleep(Duration::from_secs(2)).await;
    let commits = store.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].kind, CommitKind::Save);
}

#[tokio::test(start_paused = true)]
async fn test_save_waits_for_autosave_in_flight() {
    let store = seeded_store();
    store.set_latency(Duration::from_millis(200));
    let session = open(&store).await;

    session.apply(retitle("First")).unwrap();
    let background = tokio::spawn({
        let session = session.clone();
        async move { session.autosave_now().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    session.apply(retitle("Second")).unwrap();
    assert_eq!(session.save().await.unwrap(), 7);
    assert_eq!(background.await.unwrap().unwrap(), Some(6));

    let commits = store.commits();
    assert_eq!(commits.len(), 2);
    assert_eq!((commits[0].kind, commits[0].base_rev), (CommitKind::Autosave, 5));
    assert_eq!((commits[1].kind, commits[1].base_rev), (CommitKind::Save, 6));
    assert_eq!(store.get("tpl_1").unwrap().pages[0].title, "Second");
    assert!(!session.is_dirty());
}

#[tokio::test]
async fn test_clean_autosave_is_skipped() {
    let store = seeded_store();
    let session = open(&store).await;

    assert_eq!(session.autosave_now().await.unwrap(), None);
    session.apply(retitle("Edited")).unwrap();
    assert_eq!(session.autosave_now().await.unwrap(), Some(6));
    assert_eq!(session.autosave_now().await.unwrap(), None);
    assert_eq!(store.commits().len(), 1);
}

#[tokio::test]
async fn test_network_failure_keeps_draft_dirty() {
    let store = seeded_store();
    let session = open(&store).await;

    session.apply(headline("Offline edit")).unwrap();
    store.fail_next_commit(StoreError::Unavailable("connection reset".into()));

    let err = session.save().await.unwrap_err();
    assert!(matches!(err, EditorError::Commit(CommitError::Network(_))));
    assert_eq!(session.commit_state(), CommitState::Failed);
    assert!(session.is_dirty());
    assert_eq!(session.revision(), 5);
    assert_eq!(store.get("tpl_1").unwrap().revision, 5);

    assert_eq!(session.save().await.unwrap(), 6);
    assert!(!session.is_dirty());
    assert_eq!(session.commit_state(), CommitState::Idle);
}

#[tokio::test]
async fn test_unknown_block_blocks_save_not_autosave() {
    let store = Arc::new(MemoryStore::new());
    store.insert(
        Template::from_stored(&json!({
            "id": "tpl_1",
            "revision": 1,
            "data": { "pages": [{ "id": "home", "slug": "home", "blocks": [
                { "id": "c1", "type": "carousel", "content": { "slides": [] } }
            ] }] }
        }))
        .unwrap(),
    );
    let session = open(&store).await;
    session.apply(retitle("Home")).unwrap();

    match session.save().await {
        Err(EditorError::Blocked(issues)) => {
            assert!(issues.iter().any(|issue| matches!(
                issue,
                GateIssue::UnknownBlockType { block_id, .. } if block_id == "c1"
            )));
        }
        other => panic!("expected a blocked save, got {:?}", other),
    }
    assert!(store.commits().is_empty());

    assert_eq!(session.autosave_now().await.unwrap(), Some(2));

    let ungated = DocumentSession::open(
        store.clone(),
        "tpl_1",
        SessionConfig {
            gate_on_save: false,
            ..SessionConfig::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(ungated.save().await.unwrap(), 3);
}

#[tokio::test]
async fn test_refresh_signal_follows_commit() {
    let store = seeded_store();
    let session = open(&store).await;
    let mut refresh = session.subscribe();

    session.apply(headline("Announced")).unwrap();
    session.save().await.unwrap();

    let signal = refresh.recv().await.unwrap();
    assert_eq!(signal.template_id, "tpl_1");
    assert_eq!(signal.revision, 6);
    assert_eq!(signal.kind, CommitKind::Save);
}

#[tokio::test]
async fn test_resync_discards_local_edits() {
    let store = seeded_store();
    let session = open(&store).await;
    let other = open(&store).await;

    other.apply(retitle("Remote")).unwrap();
    other.save().await.unwrap();

    session.apply(retitle("Local")).unwrap();
    assert_eq!(session.resync().await.unwrap(), 6);
    assert!(!session.is_dirty());
    assert!(!session.can_undo());
    assert_eq!(session.snapshot().pages[0].title, "Remote");
    assert_eq!(session.commit_state(), CommitState::Idle);
}
