//! Integration tests for editor crate

use pagecraft_editor::{
    check_stored, BlockKind, ChromeSlot, DocumentSession, EditorError, GateIssue, IdentityDraft, MemoryStore,
    Mutation, SessionConfig, SlugDirectory, StoreError, Template, TemplatePatch, TemplateStore, Validator,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

fn legacy_template() -> Value {
    json!({
        "id": "tpl_1",
        "revision": 3,
        "slug": "bloom",
        "name": "Bloom",
        "status": "draft",
        "data": {
            "site": {
                "theme": "sunrise",
                "pages": [
                    { "id": "home", "slug": "home", "title": "Home", "sections": [
                        { "blockId": "hero-1", "kind": "hero", "props": { "title": "Fresh flowers" } }
                    ] },
                    { "id": "about", "slug": "about", "title": "About", "blocks": [] }
                ]
            },
            "meta": { "businessName": "Bloom", "industry": "retail", "favicon": "/f.ico" }
        }
    })
}

async fn session_with(template: Value, config: SessionConfig) -> (Arc<MemoryStore>, DocumentSession) {
    let store = Arc::new(MemoryStore::new());
    store.insert(Template::from_stored(&template).unwrap());
    let session = DocumentSession::open(store.clone(), "tpl_1", config)
        .await
        .unwrap()
        .with_directory(store.clone());
    (store, session)
}

fn stored(store: &MemoryStore) -> Value {
    store.get("tpl_1").unwrap().to_stored().unwrap()
}

#[test]
fn test_legacy_document_projects_both_mirrors() {
    let template = Template::from_stored(&legacy_template()).unwrap();
    assert_eq!(template.pages.len(), 2);
    assert_eq!(template.pages[0].blocks[0].id, "hero-1");

    let out = template.to_stored().unwrap();
    assert_eq!(out["data"]["pages"], out["data"]["site"]["pages"]);
    assert_eq!(out["data"]["site"]["theme"], "sunrise");
    assert_eq!(out["data"]["meta"]["favicon"], "/f.ico");
    assert_eq!(out["status"], "draft");
    assert!(check_stored(&out, &Validator::new()).is_clean());
}

#[test]
fn test_mismatched_mirrors_are_flagged() {
    let mut raw = legacy_template();
    raw["data"]["pages"] = json!([]);
    let report = check_stored(&raw, &Validator::new());
    assert_eq!(report.hard.first(), Some(&GateIssue::MirrorMismatch));
}

#[tokio::test]
async fn test_other_industry_reaches_every_mirror() -> anyhow::Result<()> {
    let (store, session) = session_with(legacy_template(), SessionConfig::default()).await;

    session.apply(Mutation::SetIdentity(IdentityDraft {
        industry: Some("other".into()),
        industry_other: Some("Beekeeping".into()),
        ..IdentityDraft::default()
    }))?;
    session.save().await?;

    let out = stored(&store);
    assert_eq!(out["industry"], "other");
    assert_eq!(out["industryLabel"], "Beekeeping");
    assert_eq!(out["data"]["identity"]["industry"]["label"], "Beekeeping");
    assert_eq!(out["data"]["meta"]["industry"], "other");
    assert_eq!(out["data"]["meta"]["industryOther"], "Beekeeping");
    assert_eq!(out["name"], "Bloom");

    session.apply(Mutation::SetIdentity(IdentityDraft {
        industry: Some("salon".into()),
        ..IdentityDraft::default()
    }))?;
    session.save().await?;

    let out = stored(&store);
    assert_eq!(out["industry"], "salon");
    assert_eq!(out["data"]["meta"]["industryLabel"], "Salon & Beauty");
    assert!(out["data"]["meta"].get("industryOther").is_none());
    Ok(())
}

#[tokio::test]
async fn test_identity_draft_is_idempotent() {
    let (_store, session) = session_with(legacy_template(), SessionConfig::default()).await;
    let draft = IdentityDraft {
        name: Some("  Bloom & Co  ".into()),
        email: Some("hi@bloom.test".into()),
        ..IdentityDraft::default()
    };

    session.apply(Mutation::SetIdentity(draft.clone())).unwrap();
    let once = session.snapshot();
    session.apply(Mutation::SetIdentity(draft)).unwrap();
    assert_eq!(session.snapshot(), once);
    assert_eq!(once.identity.name, "Bloom & Co");
}

#[tokio::test]
async fn test_history_is_bounded() {
    let config = SessionConfig {
        history_depth: 3,
        ..SessionConfig::default()
    };
    let (_store, session) = session_with(legacy_template(), config).await;

    for _ in 0..5 {
        session
            .apply(Mutation::InsertBlock {
                page_id: "about".into(),
                index: None,
                kind: BlockKind::Text,
            })
            .unwrap();
    }
    for _ in 0..3 {
        assert!(session.undo());
    }
    assert!(!session.undo());
    assert_eq!(session.snapshot().pages[1].blocks.len(), 2);

    assert!(session.redo());
    assert_eq!(session.snapshot().pages[1].blocks.len(), 3);
    assert!(session.is_dirty());
}

#[tokio::test]
async fn test_batch_is_one_undo_step() {
    let (_store, session) = session_with(legacy_template(), SessionConfig::default()).await;

    session
        .apply_batch(
            "add contact section",
            vec![
                Mutation::InsertBlock { page_id: "about".into(), index: None, kind: BlockKind::Text },
                Mutation::InsertBlock { page_id: "about".into(), index: None, kind: BlockKind::Button },
            ],
        )
        .unwrap();
    assert_eq!(session.snapshot().pages[1].blocks.len(), 2);

    assert!(session.undo());
    assert!(session.snapshot().pages[1].blocks.is_empty());
    assert!(!session.can_undo());
}

#[tokio::test]
async fn test_add_page_derives_free_slugs() {
    let (store, session) = session_with(legacy_template(), SessionConfig::default()).await;

    session.add_page("About", None).await.unwrap();
    session.add_page("About", None).await.unwrap();
    let slugs: Vec<String> = session.snapshot().pages.iter().map(|p| p.slug.clone()).collect();
    assert_eq!(slugs, vec!["home", "about", "about-2", "about-3"]);

    let err = session.add_page("Contact", Some("about")).await.unwrap_err();
    assert!(matches!(err, EditorError::SlugTaken(slug) if slug == "about"));

    store.publish_slug("contact");
    session.add_page("Contact", None).await.unwrap();
    assert!(session.snapshot().page_by_slug("contact-2").is_some());

    session.add_page("   ", None).await.unwrap();
    assert!(session.snapshot().page_by_slug("page").is_some());
}

/// Reports every slug taken except ones with an eight-character suffix
struct CrowdedDirectory;

#[async_trait]
impl SlugDirectory for CrowdedDirectory {
    async fn is_taken(&self, slug: &str, _except_template: Option<&str>) -> Result<bool, StoreError> {
        Ok(slug.rsplit_once('-').map_or(true, |(_, suffix)| suffix.len() != 8))
    }
}

#[tokio::test]
async fn test_add_page_gives_up_counting_on_crowded_directory() {
    let (_store, session) = session_with(legacy_template(), SessionConfig::default()).await;
    let session = session.with_directory(Arc::new(CrowdedDirectory));

    let page_id = session.add_page("Gallery", None).await.unwrap();
    let snapshot = session.snapshot();
    let slug = &snapshot.page(&page_id).unwrap().slug;
    let suffix = slug.strip_prefix("gallery-").unwrap();
    assert_eq!(suffix.len(), 8);
    assert!(suffix.parse::<u32>().map_or(true, |n| n > 1000));
}

#[tokio::test]
async fn test_site_slug_checked_against_directory() {
    let (store, session) = session_with(legacy_template(), SessionConfig::default()).await;
    let mut rival = Template::new("tpl_2");
    rival.slug = "petal".into();
    store.insert(rival);

    let err = session.set_site_slug("Petal").await.unwrap_err();
    assert!(matches!(err, EditorError::SlugTaken(slug) if slug == "petal"));

    assert_eq!(session.set_site_slug("Bloom Shop").await.unwrap(), "bloom-shop");
    session.save().await.unwrap();
    assert_eq!(store.load("tpl_1").await.unwrap().slug, "bloom-shop");
}

#[tokio::test]
async fn test_slug_edits_go_through_directory() {
    let (store, session) = session_with(legacy_template(), SessionConfig::default()).await;
    store.publish_slug("pricing");

    let rename = Mutation::UpdatePage {
        page_id: "about".into(),
        title: None,
        slug: Some("pricing".into()),
        show_header: None,
        show_footer: None,
    };
    assert!(matches!(session.apply(rename.clone()), Err(EditorError::SlugCheckRequired)));
    assert!(matches!(
        session.apply(Mutation::SetSiteSlug { slug: "pricing".into() }),
        Err(EditorError::SlugCheckRequired)
    ));
    assert!(matches!(
        session.apply_batch("rename", vec![rename]),
        Err(EditorError::SlugCheckRequired)
    ));
    assert_eq!(session.snapshot().page("about").unwrap().slug, "about");
    assert!(!session.is_dirty());

    let err = session.rename_page("about", "Pricing").await.unwrap_err();
    assert!(matches!(err, EditorError::SlugTaken(slug) if slug == "pricing"));
    let err = session.rename_page("about", "home").await.unwrap_err();
    assert!(matches!(err, EditorError::SlugTaken(slug) if slug == "home"));

    assert_eq!(session.rename_page("about", "about").await.unwrap(), "about");
    assert_eq!(session.rename_page("about", "Our Team").await.unwrap(), "our-team");
    assert_eq!(session.snapshot().page("about").unwrap().slug, "our-team");

    session
        .apply(Mutation::UpdatePage {
            page_id: "about".into(),
            title: Some("Team".into()),
            slug: None,
            show_header: None,
            show_footer: None,
        })
        .unwrap();
    assert_eq!(session.snapshot().page("about").unwrap().title, "Team");
}

#[tokio::test]
async fn test_site_chrome_and_patch_round_trip() {
    let (store, session) = session_with(legacy_template(), SessionConfig::default()).await;

    session
        .apply(Mutation::SetSiteChrome {
            slot: ChromeSlot::Header,
            block: Some(json!({ "id": "nav", "type": "header", "content": { "siteName": "Bloom" } })),
        })
        .unwrap();
    session
        .apply(Mutation::ApplyPatch(
            TemplatePatch::new().body("meta", json!({ "favicon": null })),
        ))
        .unwrap();
    session.save().await.unwrap();

    let out = stored(&store);
    assert_eq!(out["data"]["headerBlock"]["id"], "nav");
    assert!(out["data"]["meta"].get("favicon").is_none());
    assert_eq!(out["data"]["meta"]["businessName"], "Bloom");
    assert!(session.validation_report().is_clean());
}
