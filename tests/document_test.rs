//! Integration tests for the document lifecycle.

mod helpers;

use bytes::Bytes;

use dochub_core::ErrorKind;
use dochub_core::traits::StorageProvider;
use dochub_core::types::DocumentId;
use dochub_entity::activity::ActivityKind;
use dochub_entity::permission::GrantLevel;
use dochub_service::{CreateLabelRequest, IngestRequest, UpdateDocumentRequest};

#[tokio::test]
async fn test_ingest_stores_bytes_and_records_create() {
    let app = helpers::TestApp::new().await;
    let alice = app.user();

    let doc = app.upload(&alice, "notes.txt", Some("hello"), None).await.document;
    let path = doc.file_path.clone().unwrap();
    assert!(app.storage.exists(&path).await.unwrap());
    assert_eq!(doc.size_bytes, "contents of notes.txt".len() as i64);
    assert_eq!(doc.content.as_deref(), Some("hello"));

    let (_, bytes) = app.services.documents.download(&alice, doc.id).await.unwrap();
    assert_eq!(bytes, Bytes::from("contents of notes.txt"));

    let activity = app
        .services
        .documents
        .recent_activity(&alice, doc.id, 10)
        .await
        .unwrap();
    let kinds: Vec<ActivityKind> = activity.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![ActivityKind::Download, ActivityKind::Create]);
}

#[tokio::test]
async fn test_ingest_rejects_bad_title_and_unwritable_folder() {
    let app = helpers::TestApp::new().await;
    let alice = app.user();
    let bob = app.user();
    let reports = app.folder(&alice, "Reports", None).await;

    let blank = app
        .services
        .documents
        .ingest(
            &alice,
            IngestRequest {
                title: "  ".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(blank.kind, ErrorKind::Validation);

    app.services
        .sharing
        .share_folder(&alice, reports.id, bob.user_id, GrantLevel::Viewer)
        .await
        .unwrap();
    let viewer = app
        .services
        .documents
        .ingest(
            &bob,
            IngestRequest {
                title: "b.pdf".into(),
                requested_folder: Some(reports.id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(viewer.kind, ErrorKind::ForbiddenRole);
}

#[tokio::test]
async fn test_hidden_document_is_not_found_or_denied() {
    let app = helpers::TestApp::new().await;
    let alice = app.user();
    let bob = app.user();
    let doc = app.upload(&alice, "secret.pdf", None, None).await.document;

    let hidden = app.services.documents.get_document(&bob, doc.id).await.unwrap_err();
    let missing = app
        .services
        .documents
        .get_document(&bob, DocumentId::new())
        .await
        .unwrap_err();
    assert_eq!(hidden.kind, ErrorKind::NotFoundOrDenied);
    assert_eq!(missing.kind, ErrorKind::NotFoundOrDenied);
}

#[tokio::test]
async fn test_edit_requires_owner_or_folder_editor() {
    let app = helpers::TestApp::new().await;
    let alice = app.user();
    let bob = app.user();
    let reports = app.folder(&alice, "Reports", None).await;
    let doc = app
        .upload(&alice, "draft.pdf", None, Some(reports.id))
        .await
        .document;

    app.services
        .sharing
        .share_folder(&alice, reports.id, bob.user_id, GrantLevel::Viewer)
        .await
        .unwrap();
    let retitle = || UpdateDocumentRequest {
        title: Some("final.pdf".into()),
        content: None,
    };
    let err = app
        .services
        .documents
        .update_document(&bob, doc.id, retitle())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ForbiddenRole);

    app.services
        .sharing
        .update_level(&alice, reports.id, bob.user_id, GrantLevel::Editor)
        .await
        .unwrap();
    let updated = app
        .services
        .documents
        .update_document(&bob, doc.id, retitle())
        .await
        .unwrap();
    assert_eq!(updated.title, "final.pdf");
    assert!(updated.updated_at > doc.updated_at);

    // Deleting stays owner only.
    let err = app
        .services
        .documents
        .delete_document(&bob, doc.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ForbiddenRole);
}

#[tokio::test]
async fn test_move_between_folders() {
    let app = helpers::TestApp::new().await;
    let alice = app.user();
    let bob = app.user();
    let inbox = app.folder(&alice, "Inbox", None).await;
    let archive = app.folder(&alice, "Archive", None).await;
    let doc = app.upload(&alice, "a.pdf", None, Some(inbox.id)).await.document;

    let moved = app
        .services
        .documents
        .move_document(&alice, doc.id, Some(archive.id))
        .await
        .unwrap();
    assert_eq!(moved.folder_id, Some(archive.id));

    app.services
        .sharing
        .share_folder(&alice, archive.id, bob.user_id, GrantLevel::Editor)
        .await
        .unwrap();
    // Bob can edit the document but cannot write in the inbox.
    let err = app
        .services
        .documents
        .move_document(&bob, doc.id, Some(inbox.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFoundOrDenied);
    let err = app
        .services
        .documents
        .move_document(&bob, doc.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ForbiddenRole);

    let unfiled = app
        .services
        .documents
        .move_document(&alice, doc.id, None)
        .await
        .unwrap();
    assert!(unfiled.is_unfiled());
    assert!(app.visible(&bob).await.is_empty());
}

#[tokio::test]
async fn test_delete_removes_row_links_and_file() {
    let app = helpers::TestApp::new().await;
    let alice = app.user();
    let doc = app.upload(&alice, "a.pdf", None, None).await.document;
    let label = app
        .services
        .labels
        .create_label(
            &alice,
            CreateLabelRequest {
                name: "tax".into(),
                color: Some("#FF0000".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(label.color.as_deref(), Some("#ff0000"));
    assert!(app.services.labels.attach(&alice, doc.id, label.id).await.unwrap());
    assert!(!app.services.labels.attach(&alice, doc.id, label.id).await.unwrap());

    app.services.documents.delete_document(&alice, doc.id).await.unwrap();

    let path = doc.file_path.unwrap();
    assert!(!app.storage.exists(&path).await.unwrap());
    let err = app.services.documents.get_document(&alice, doc.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFoundOrDenied);
    assert!(app.visible(&alice).await.is_empty());
    // The label itself survives, only the link is gone.
    assert_eq!(app.services.labels.list_labels(&alice).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_labels_follow_document_access() {
    let app = helpers::TestApp::new().await;
    let alice = app.user();
    let bob = app.user();
    let reports = app.folder(&alice, "Reports", None).await;
    let doc = app.upload(&alice, "a.pdf", None, Some(reports.id)).await.document;
    app.services
        .sharing
        .share_folder(&alice, reports.id, bob.user_id, GrantLevel::Viewer)
        .await
        .unwrap();

    let bobs_label = app
        .services
        .labels
        .create_label(
            &bob,
            CreateLabelRequest {
                name: "todo".into(),
                color: None,
            },
        )
        .await
        .unwrap();
    let err = app
        .services
        .labels
        .attach(&bob, doc.id, bobs_label.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ForbiddenRole);

    let alices_label = app
        .services
        .labels
        .create_label(
            &alice,
            CreateLabelRequest {
                name: "todo".into(),
                color: None,
            },
        )
        .await
        .unwrap();
    app.services.labels.attach(&alice, doc.id, alices_label.id).await.unwrap();
    let seen = app.services.labels.labels_for_document(&bob, doc.id).await.unwrap();
    assert_eq!(seen.len(), 1);

    let err = app
        .services
        .labels
        .delete_label(&bob, alices_label.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let dup = app
        .services
        .labels
        .create_label(
            &alice,
            CreateLabelRequest {
                name: "todo".into(),
                color: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(dup.kind, ErrorKind::Conflict);
}
