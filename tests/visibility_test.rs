//! Integration tests for the visible document listings.

mod helpers;

use std::collections::HashSet;

use dochub_core::types::PageRequest;
use dochub_entity::document::DocumentFilter;
use dochub_entity::permission::GrantLevel;

#[tokio::test]
async fn test_visible_is_owned_plus_granted_without_duplicates() {
    let app = helpers::TestApp::new().await;
    let alice = app.user();
    let bob = app.user();
    let carol = app.user();

    let shared = app.folder(&alice, "Shared", None).await;
    let private = app.folder(&alice, "Private", None).await;
    let bobs_folder = app.folder(&bob, "Bob", None).await;
    app.services
        .sharing
        .share_folder(&alice, shared.id, bob.user_id, GrantLevel::Viewer)
        .await
        .unwrap();
    app.services
        .sharing
        .share_folder(&bob, bobs_folder.id, alice.user_id, GrantLevel::Editor)
        .await
        .unwrap();

    let a1 = app.upload(&alice, "a1", None, Some(shared.id)).await.document;
    let a2 = app.upload(&alice, "a2", None, Some(private.id)).await.document;
    let a3 = app.upload(&alice, "a3", None, None).await.document;
    let b1 = app.upload(&bob, "b1", None, Some(bobs_folder.id)).await.document;
    // Alice's document in bob's folder: owned by alice and granted to her.
    let a4 = app.upload(&alice, "a4", None, Some(bobs_folder.id)).await.document;
    let c1 = app.upload(&carol, "c1", None, None).await.document;

    let ids = |docs: Vec<dochub_entity::document::Document>| {
        let list: Vec<_> = docs.iter().map(|d| d.id).collect();
        let set: HashSet<_> = list.iter().copied().collect();
        assert_eq!(list.len(), set.len(), "duplicate in listing");
        set
    };

    let alice_sees = ids(app.visible(&alice).await);
    assert_eq!(
        alice_sees,
        HashSet::from([a1.id, a2.id, a3.id, a4.id, b1.id])
    );

    let bob_sees = ids(app.visible(&bob).await);
    assert_eq!(bob_sees, HashSet::from([a1.id, b1.id]));
    // Owning the folder alone does not expose alice's document to bob.
    assert!(!bob_sees.contains(&a4.id));

    let carol_sees = ids(app.visible(&carol).await);
    assert_eq!(carol_sees, HashSet::from([c1.id]));
}

#[tokio::test]
async fn test_mine_and_shared_views_partition_the_visible_set() {
    let app = helpers::TestApp::new().await;
    let alice = app.user();
    let bob = app.user();
    let reports = app.folder(&alice, "Reports", None).await;
    app.services
        .sharing
        .share_folder(&alice, reports.id, bob.user_id, GrantLevel::Editor)
        .await
        .unwrap();

    let shared_doc = app.upload(&alice, "shared", None, Some(reports.id)).await.document;
    let bobs_in_shared = app.upload(&bob, "bob-in-shared", None, Some(reports.id)).await.document;
    let bobs_loose = app.upload(&bob, "loose", None, None).await.document;

    let page = PageRequest::new(0, 50);
    let filter = DocumentFilter::default();
    let mine = app
        .services
        .visibility
        .my_documents(&bob, &filter, &page)
        .await
        .unwrap();
    let shared = app
        .services
        .visibility
        .shared_documents(&bob, &filter, &page)
        .await
        .unwrap();

    let mine_ids: HashSet<_> = mine.items.iter().map(|d| d.id).collect();
    let shared_ids: HashSet<_> = shared.items.iter().map(|d| d.id).collect();
    assert_eq!(mine_ids, HashSet::from([bobs_in_shared.id, bobs_loose.id]));
    assert_eq!(shared_ids, HashSet::from([shared_doc.id]));
    assert_eq!(mine.total + shared.total, 3);
}

#[tokio::test]
async fn test_paging_ordering_and_search() {
    let app = helpers::TestApp::new().await;
    let alice = app.user();
    let folder = app.folder(&alice, "Inbox", None).await;

    let mut uploaded = Vec::new();
    for i in 0..5 {
        let text = if i % 2 == 0 { "quarterly report" } else { "misc" };
        uploaded.push(
            app.upload(&alice, &format!("doc-{i}"), Some(text), Some(folder.id))
                .await
                .document,
        );
    }
    app.upload(&alice, "elsewhere", Some("quarterly"), None).await;

    let first = app
        .services
        .visibility
        .visible_documents(&alice, &DocumentFilter::default(), &PageRequest::new(0, 2))
        .await
        .unwrap();
    assert_eq!(first.total, 6);
    assert_eq!(first.items.len(), 2);
    assert!(first.has_more());
    assert_eq!(first.items[0].title, "elsewhere");
    assert_eq!(first.items[1].id, uploaded[4].id);

    let last = app
        .services
        .visibility
        .visible_documents(&alice, &DocumentFilter::default(), &PageRequest::new(4, 2))
        .await
        .unwrap();
    assert_eq!(last.items.len(), 2);
    assert!(!last.has_more());

    let in_folder = DocumentFilter {
        folder_id: Some(folder.id),
        query: Some("  QUARTERLY ".into()),
        ..Default::default()
    };
    let found = app
        .services
        .visibility
        .visible_documents(&alice, &in_folder, &PageRequest::new(0, 50))
        .await
        .unwrap();
    assert_eq!(found.total, 3);
    assert!(found.items.iter().all(|d| d.folder_id == Some(folder.id)));
}
