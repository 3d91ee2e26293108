//! Content and auth integration tests
//!
//! Blog posts with tags, notes with stored files, journals, comments and
//! the auth flows, all against the mock backend.
//!
//! Run with: cargo test -p integration-tests --test content_tests

use alpaca_cache::QueryKey;
use alpaca_core::{CommentParent, HTML_CONTENT_TYPE};
use alpaca_service::dto::{
    CreateBlogPostRequest, JournalRequest, NoteFile, UpdateBlogPostRequest, UploadMode,
    UploadNoteRequest,
};
use alpaca_service::{
    AuthService, BlogService, CommentService, JournalService, NoteService, SignUpOutcome,
};
use integration_tests::{
    connect, sign_in, sign_up_request, start_backend, unique_email, TestUser,
};

fn post(title: &str, tags: &str) -> CreateBlogPostRequest {
    CreateBlogPostRequest {
        title: title.to_string(),
        content: format!("{title} body"),
        tags: tags.to_string(),
    }
}

fn note_request(mode: UploadMode, file: Option<NoteFile>, link: Option<&str>) -> UploadNoteRequest {
    UploadNoteRequest {
        title: "Order flow".to_string(),
        author: "Jane".to_string(),
        description: "Footprint basics".to_string(),
        mode,
        file,
        external_link: link.map(str::to_string),
    }
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_sign_up_signs_in_and_creates_profile() {
    let backend = start_backend().await.unwrap();
    let ctx = connect(&backend).unwrap();
    let email = unique_email("carol");

    let outcome = AuthService::new(&ctx)
        .sign_up(sign_up_request(&email, Some("  carol ")))
        .await
        .unwrap();

    let session = match outcome {
        SignUpOutcome::SignedIn(session) => session,
        other => panic!("expected a session, got {other:?}"),
    };
    assert_eq!(ctx.current_user(), Some(session.user_id));
    let profiles = backend.rows("profiles");
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0]["username"], "carol");
}

#[tokio::test]
async fn test_sign_up_awaiting_confirmation() {
    let backend = start_backend().await.unwrap();
    backend.confirm_signups(true);
    let ctx = connect(&backend).unwrap();

    let outcome = AuthService::new(&ctx)
        .sign_up(sign_up_request(&unique_email("dave"), None))
        .await
        .unwrap();

    assert_eq!(outcome, SignUpOutcome::ConfirmationPending);
    assert!(ctx.session().is_none());
}

#[tokio::test]
async fn test_duplicate_sign_up_is_rejected() {
    let backend = start_backend().await.unwrap();
    let erin = TestUser::register(&backend, "erin");
    let ctx = connect(&backend).unwrap();

    let result = AuthService::new(&ctx)
        .sign_up(sign_up_request(&erin.email, None))
        .await;
    assert!(result.is_err());
    assert!(ctx.session().is_none());
}

#[tokio::test]
async fn test_wrong_password_keeps_signed_out() {
    let backend = start_backend().await.unwrap();
    let alice = TestUser::register(&backend, "alice");
    let ctx = connect(&backend).unwrap();

    let result = AuthService::new(&ctx)
        .sign_in(integration_tests::sign_in_request(&alice.email, "nope"))
        .await;
    assert!(result.is_err());
    assert!(ctx.current_user().is_none());
    assert_eq!(backend.request_count("POST", "token:password"), 1);
}

#[tokio::test]
async fn test_sign_out_drops_private_cache() {
    let backend = start_backend().await.unwrap();
    let alice = TestUser::register(&backend, "alice");
    let ctx = connect(&backend).unwrap();
    sign_in(&ctx, &alice.email).await.unwrap();

    let journals = JournalService::new(&ctx);
    journals
        .save(JournalRequest {
            id: None,
            title: "Monday".to_string(),
            content: "Took two trades".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(journals.list().await.unwrap().len(), 1);
    assert!(ctx.cache().contains(&QueryKey::Journals));

    AuthService::new(&ctx).sign_out().await.unwrap();
    assert!(ctx.current_user().is_none());
    assert!(!ctx.cache().contains(&QueryKey::Journals));
    assert_eq!(backend.request_count("POST", "logout"), 1);
}

// ============================================================================
// Blog
// ============================================================================

#[tokio::test]
async fn test_blog_posts_filtered_by_tag() {
    let backend = start_backend().await.unwrap();
    let alice = TestUser::register(&backend, "alice");
    let ctx = connect(&backend).unwrap();
    sign_in(&ctx, &alice.email).await.unwrap();
    let blog = BlogService::new(&ctx);

    let scalping = blog.create(post("Scalping", "futures, scalping")).await.unwrap();
    let swing = blog.create(post("Swing", "futures,swing, futures")).await.unwrap();

    assert_eq!(scalping.tag_names(), vec!["futures", "scalping"]);
    assert_eq!(swing.tag_names(), vec!["futures", "swing"]);
    // "futures" is created once and reused
    assert_eq!(backend.rows("tags").len(), 3);

    let tagged = blog.list_posts(&["scalping".to_string()]).await.unwrap();
    assert_eq!(tagged.iter().map(|p| p.id).collect::<Vec<_>>(), vec![scalping.id]);

    let futures = blog.list_posts(&["futures".to_string()]).await.unwrap();
    assert_eq!(futures.len(), 2);

    let none = blog.list_posts(&["crypto".to_string()]).await.unwrap();
    assert!(none.is_empty());

    assert_eq!(blog.list_posts(&[]).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_blog_update_replaces_tags() {
    let backend = start_backend().await.unwrap();
    let alice = TestUser::register(&backend, "alice");
    let ctx = connect(&backend).unwrap();
    sign_in(&ctx, &alice.email).await.unwrap();
    let blog = BlogService::new(&ctx);

    let created = blog.create(post("Risk", "risk, sizing")).await.unwrap();

    let retitled = blog
        .update(
            created.id,
            UpdateBlogPostRequest {
                title: Some("Risk management".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(retitled.title, "Risk management");
    assert_eq!(retitled.tag_names(), vec!["risk", "sizing"]);
    assert!(retitled.updated_at.is_some());

    let retagged = blog
        .update(
            created.id,
            UpdateBlogPostRequest {
                tags: Some("psychology".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(retagged.tag_names(), vec!["psychology"]);

    let untagged = blog
        .update(
            created.id,
            UpdateBlogPostRequest {
                tags: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(untagged.tags.is_empty());
    assert!(backend.rows("blog_post_tags").is_empty());
}

#[tokio::test]
async fn test_blog_post_requires_sign_in() {
    let backend = start_backend().await.unwrap();
    let ctx = connect(&backend).unwrap();

    let err = BlogService::new(&ctx)
        .create(post("Anonymous", ""))
        .await
        .unwrap_err();
    assert!(err.is_authorization());
    assert!(backend.rows("blog_posts").is_empty());
}

// ============================================================================
// Notes
// ============================================================================

#[tokio::test]
async fn test_html_note_is_stored_with_public_link() {
    let backend = start_backend().await.unwrap();
    let ctx = connect(&backend).unwrap();
    let notes = NoteService::new(&ctx);

    let page = "<h1>Footprint</h1>";
    let note = notes
        .upload(note_request(
            UploadMode::File,
            Some(NoteFile {
                name: "footprint.html".to_string(),
                content_type: None,
                bytes: page.as_bytes().to_vec(),
            }),
            None,
        ))
        .await
        .unwrap();

    let path = note.file_path.clone().unwrap();
    assert!(path.ends_with("-footprint.html"));
    assert_eq!(note.file_name.as_deref(), Some("footprint.html"));

    let stored = backend.object(&format!("notes/{path}")).unwrap();
    assert_eq!(stored.content_type, HTML_CONTENT_TYPE);
    assert_eq!(stored.bytes, page.as_bytes());

    let link = note.external_link.clone().unwrap();
    assert!(link.starts_with(&backend.url()));
    assert!(link.contains("/object/public/notes/"));

    assert_eq!(notes.view_html(&note).await.unwrap(), page);
}

#[tokio::test]
async fn test_pdf_note_keeps_content_type_without_link() {
    let backend = start_backend().await.unwrap();
    let ctx = connect(&backend).unwrap();

    let note = NoteService::new(&ctx)
        .upload(note_request(
            UploadMode::File,
            Some(NoteFile {
                name: "levels.pdf".to_string(),
                content_type: Some("application/pdf".to_string()),
                bytes: vec![0x25, 0x50, 0x44, 0x46],
            }),
            None,
        ))
        .await
        .unwrap();

    assert!(note.external_link.is_none());
    let stored = backend
        .object(&format!("notes/{}", note.file_path.unwrap()))
        .unwrap();
    assert_eq!(stored.content_type, "application/pdf");
}

#[tokio::test]
async fn test_link_note_and_search() {
    let backend = start_backend().await.unwrap();
    let ctx = connect(&backend).unwrap();
    let notes = NoteService::new(&ctx);

    let note = notes
        .upload(note_request(
            UploadMode::Link,
            None,
            Some("  https://example.com/vwap.html "),
        ))
        .await
        .unwrap();
    assert_eq!(note.external_link.as_deref(), Some("https://example.com/vwap.html"));
    assert!(note.file_path.is_none());
    assert_eq!(backend.request_count("POST", "notes"), 1);

    assert_eq!(notes.search("footprint").await.unwrap().len(), 1);
    assert!(notes.search("options").await.unwrap().is_empty());

    let err = notes.download(&note).await.unwrap_err();
    assert_eq!(err.to_string(), "This note has no stored file");
}

#[tokio::test]
async fn test_link_mode_without_link_is_rejected() {
    let backend = start_backend().await.unwrap();
    let ctx = connect(&backend).unwrap();

    let err = NoteService::new(&ctx)
        .upload(note_request(UploadMode::Link, None, Some("   ")))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Please provide a link to your HTML page");
    assert!(backend.rows("notes").is_empty());
}

// ============================================================================
// Journals + Comments
// ============================================================================

#[tokio::test]
async fn test_journal_save_creates_then_edits() {
    let backend = start_backend().await.unwrap();
    let alice = TestUser::register(&backend, "alice");
    let ctx = connect(&backend).unwrap();
    sign_in(&ctx, &alice.email).await.unwrap();
    let journals = JournalService::new(&ctx);

    let created = journals
        .save(JournalRequest {
            id: None,
            title: " Monday ".to_string(),
            content: "Took two trades".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(created.user_id, alice.id);
    assert_eq!(created.author_label(), "alice");

    let edited = journals
        .save(JournalRequest {
            id: Some(created.id),
            title: "Monday".to_string(),
            content: "Took two trades, both stopped out".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(edited.id, created.id);
    assert_eq!(edited.body(), "Took two trades, both stopped out");

    assert_eq!(journals.get(created.id).await.unwrap(), edited);
    assert_eq!(backend.rows("journals").len(), 1);

    journals.delete(created.id).await.unwrap();
    assert!(journals.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_journal_of_other_user_cannot_be_edited() {
    let backend = start_backend().await.unwrap();
    let alice = TestUser::register(&backend, "alice");
    let bob = TestUser::register(&backend, "bob");

    let alice_ctx = connect(&backend).unwrap();
    sign_in(&alice_ctx, &alice.email).await.unwrap();
    let entry = JournalService::new(&alice_ctx)
        .save(JournalRequest {
            id: None,
            title: "Private".to_string(),
            content: "Plan".to_string(),
        })
        .await
        .unwrap();

    let bob_ctx = connect(&backend).unwrap();
    sign_in(&bob_ctx, &bob.email).await.unwrap();
    let result = JournalService::new(&bob_ctx)
        .save(JournalRequest {
            id: Some(entry.id),
            title: "Mine now".to_string(),
            content: "Plan".to_string(),
        })
        .await;

    assert!(result.is_err());
    assert_eq!(backend.rows("journals")[0]["title"], "Private");
}

#[tokio::test]
async fn test_comments_on_blog_post() {
    let backend = start_backend().await.unwrap();
    let alice = TestUser::register(&backend, "alice");
    let bob = TestUser::register(&backend, "bob");

    let alice_ctx = connect(&backend).unwrap();
    sign_in(&alice_ctx, &alice.email).await.unwrap();
    let created = BlogService::new(&alice_ctx)
        .create(post("Breakouts", "futures"))
        .await
        .unwrap();
    let parent = CommentParent::BlogPost(created.id);

    let bob_ctx = connect(&backend).unwrap();
    sign_in(&bob_ctx, &bob.email).await.unwrap();
    let comments = CommentService::new(&bob_ctx);

    let err = comments.post(parent, "   ").await.unwrap_err();
    assert_eq!(err.to_string(), "Please write something before posting.");

    let comment = comments.post(parent, " Nice read ").await.unwrap();
    assert_eq!(comment.content, "Nice read");
    assert_eq!(comment.author_label(), "bob");
    assert_eq!(comment.parent(), Some(parent));

    let listed = CommentService::new(&alice_ctx).list(parent).await.unwrap();
    assert_eq!(listed, vec![comment]);
    assert!(CommentService::new(&alice_ctx)
        .list(CommentParent::Journal(created.id))
        .await
        .unwrap()
        .is_empty());
}
