use sitios_auth::{Principal, Role};
use sitios_database::test_utils::TestDatabase;
use sitios_entities::types::{
    ContactInfo, ContentBlockType, MicrositeStatus, OwnerType, SeoMetadata,
};
use sitios_entities::{microsites, pages};
use sitios_tenancy::TenancyConfig;

use crate::services::{
    BlockService, CreateBlockRequest, CreateMicrositeRequest, CreatePageRequest, MicrositeError,
    MicrositeService, PageService, ReorderEntry, ReorderRequest, UpdateMicrositeRequest,
    UpdatePageRequest,
};

fn member() -> Principal {
    Principal {
        user_id: 1,
        role: Role::Member,
    }
}

fn other_member() -> Principal {
    Principal {
        user_id: 2,
        role: Role::Member,
    }
}

fn admin() -> Principal {
    Principal {
        user_id: 99,
        role: Role::Admin,
    }
}

fn services(db: &TestDatabase) -> (MicrositeService, PageService, BlockService) {
    let config = TenancyConfig::new("fed.mx");
    (
        MicrositeService::new(db.db.clone(), config),
        PageService::new(db.db.clone()),
        BlockService::new(db.db.clone()),
    )
}

async fn create_site(
    service: &MicrositeService,
    principal: &Principal,
    subdomain: &str,
) -> microsites::Model {
    service
        .create(
            principal,
            CreateMicrositeRequest {
                name: format!("Club {subdomain}"),
                slug: subdomain.to_string(),
                subdomain: subdomain.to_string(),
                description: None,
                owner_type: OwnerType::Club,
            },
        )
        .await
        .expect("create microsite")
}

/// Fill in everything the publish gate wants except page state.
async fn make_publishable(service: &MicrositeService, principal: &Principal, id: i32) {
    service
        .update(
            principal,
            id,
            UpdateMicrositeRequest {
                seo: Some(SeoMetadata {
                    title: "Club".to_string(),
                    description: "Tenis".to_string(),
                    ..SeoMetadata::default()
                }),
                contact_info: Some(ContactInfo {
                    email: Some("club@fed.mx".to_string()),
                    ..ContactInfo::default()
                }),
                ..UpdateMicrositeRequest::default()
            },
        )
        .await
        .expect("update microsite");
}

async fn home_page(pages: &PageService, principal: &Principal, microsite_id: i32) -> pages::Model {
    pages
        .list(principal, microsite_id)
        .await
        .expect("list pages")
        .into_iter()
        .find(|p| p.is_home_page)
        .expect("home page")
}

async fn publish_home(pages: &PageService, principal: &Principal, microsite_id: i32) {
    let home = home_page(pages, principal, microsite_id).await;
    pages
        .update(
            principal,
            microsite_id,
            home.id,
            UpdatePageRequest {
                is_published: Some(true),
                ..UpdatePageRequest::default()
            },
        )
        .await
        .expect("publish home page");
}

fn simple_page(title: &str) -> CreatePageRequest {
    CreatePageRequest {
        title: title.to_string(),
        slug: None,
        meta_title: None,
        meta_description: None,
        is_home_page: false,
        is_published: false,
        sort_order: None,
    }
}

#[tokio::test]
async fn create_seeds_draft_with_home_page() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, pages, _) = services(&db);

    let site = create_site(&sites, &member(), "jalisco").await;
    assert_eq!(site.status, MicrositeStatus::Draft);
    assert!(!site.is_public);
    assert!(site.published_at.is_none());

    let site_pages = pages.list(&member(), site.id).await.unwrap();
    assert_eq!(site_pages.len(), 1);
    let home = &site_pages[0];
    assert!(home.is_home_page);
    assert!(!home.is_published);
    assert_eq!(home.slug, "");
    assert_eq!(home.title, "Inicio");
}

#[tokio::test]
async fn duplicate_subdomain_conflicts() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, _, _) = services(&db);

    create_site(&sites, &member(), "jalisco").await;

    let err = sites
        .create(
            &member(),
            CreateMicrositeRequest {
                name: "Otro Club".to_string(),
                slug: "otro-club".to_string(),
                subdomain: "jalisco".to_string(),
                description: None,
                owner_type: OwnerType::Club,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MicrositeError::Conflict(_)), "{err:?}");
}

#[tokio::test]
async fn reserved_subdomain_rejected() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, _, _) = services(&db);

    for subdomain in ["www", "api", "fed", "club jalisco"] {
        let err = sites
            .create(
                &member(),
                CreateMicrositeRequest {
                    name: "Club".to_string(),
                    slug: "club".to_string(),
                    subdomain: subdomain.to_string(),
                    description: None,
                    owner_type: OwnerType::Club,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MicrositeError::Validation(_)), "{subdomain}");
    }
}

#[tokio::test]
async fn page_slugs_scoped_to_microsite() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, pages, _) = services(&db);

    let site_a = create_site(&sites, &member(), "jalisco").await;
    let site_b = create_site(&sites, &member(), "sonora").await;

    pages
        .create(&member(), site_a.id, simple_page("About"))
        .await
        .unwrap();
    // The same slug under a different microsite is fine.
    pages
        .create(&member(), site_b.id, simple_page("About"))
        .await
        .unwrap();

    // A second "about" under the same microsite is not.
    let err = pages
        .create(&member(), site_a.id, simple_page("About"))
        .await
        .unwrap_err();
    assert!(matches!(err, MicrositeError::Conflict(_)), "{err:?}");
}

#[tokio::test]
async fn promoting_a_page_demotes_the_old_home() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, pages, _) = services(&db);

    let site = create_site(&sites, &member(), "jalisco").await;
    let torneos = pages
        .create(&member(), site.id, simple_page("Torneos"))
        .await
        .unwrap();

    pages
        .update(
            &member(),
            site.id,
            torneos.id,
            UpdatePageRequest {
                is_home_page: Some(true),
                ..UpdatePageRequest::default()
            },
        )
        .await
        .unwrap();

    let all = pages.list(&member(), site.id).await.unwrap();
    let homes: Vec<_> = all.iter().filter(|p| p.is_home_page).collect();
    assert_eq!(homes.len(), 1);
    assert_eq!(homes[0].id, torneos.id);
    assert_eq!(homes[0].slug, "");

    let demoted = all.iter().find(|p| p.title == "Inicio").unwrap();
    assert!(!demoted.is_home_page);
    assert_eq!(demoted.slug, "inicio");
}

#[tokio::test]
async fn home_page_cannot_be_demoted_directly() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, pages, _) = services(&db);

    let site = create_site(&sites, &member(), "jalisco").await;
    let home = home_page(&pages, &member(), site.id).await;

    let err = pages
        .update(
            &member(),
            site.id,
            home.id,
            UpdatePageRequest {
                is_home_page: Some(false),
                ..UpdatePageRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MicrositeError::Validation(_)));
}

#[tokio::test]
async fn publish_gate_accumulates_all_violations() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, pages, _) = services(&db);

    let site = create_site(&sites, &member(), "jalisco").await;
    publish_home(&pages, &member(), site.id).await;

    // SEO title present, description missing; no contact info at all.
    sites
        .update(
            &member(),
            site.id,
            UpdateMicrositeRequest {
                seo: Some(SeoMetadata {
                    title: "Club Jalisco".to_string(),
                    ..SeoMetadata::default()
                }),
                ..UpdateMicrositeRequest::default()
            },
        )
        .await
        .unwrap();

    let err = sites.publish(&member(), site.id).await.unwrap_err();
    match err {
        MicrositeError::PublishGate(errors) => {
            assert_eq!(
                errors,
                vec![
                    "contact email or phone is required",
                    "SEO description is required",
                ]
            );
        }
        other => panic!("expected publish gate error, got {other:?}"),
    }
}

#[tokio::test]
async fn publish_lifecycle() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, pages, _) = services(&db);

    let site = create_site(&sites, &member(), "jalisco").await;
    make_publishable(&sites, &member(), site.id).await;

    // The default home page starts unpublished, so the gate rejects.
    let err = sites.publish(&member(), site.id).await.unwrap_err();
    match err {
        MicrositeError::PublishGate(errors) => {
            assert!(errors.contains(&"home page must be published".to_string()));
        }
        other => panic!("expected publish gate error, got {other:?}"),
    }

    publish_home(&pages, &member(), site.id).await;

    let published = sites.publish(&member(), site.id).await.unwrap();
    assert_eq!(published.status, MicrositeStatus::Published);
    assert!(published.is_public);
    let first_published_at = published.published_at.expect("published_at set");

    // Unpublish clears visibility but keeps the first publish date.
    let offline = sites.unpublish(&member(), site.id).await.unwrap();
    assert_eq!(offline.status, MicrositeStatus::Draft);
    assert!(!offline.is_public);
    assert_eq!(offline.published_at, Some(first_published_at));

    let republished = sites.publish(&member(), site.id).await.unwrap();
    assert_eq!(republished.published_at, Some(first_published_at));
}

#[tokio::test]
async fn last_page_cannot_be_deleted() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, pages, _) = services(&db);

    let site = create_site(&sites, &member(), "jalisco").await;
    let home = home_page(&pages, &member(), site.id).await;

    let err = pages.delete(&member(), site.id, home.id).await.unwrap_err();
    assert!(matches!(err, MicrositeError::LastResource(_)));

    // With a second page around, deleting one is fine.
    let about = pages
        .create(&member(), site.id, simple_page("About"))
        .await
        .unwrap();
    pages.delete(&member(), site.id, about.id).await.unwrap();
    assert_eq!(pages.list(&member(), site.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn sole_published_home_of_live_site_stays_published() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, pages, _) = services(&db);

    let site = create_site(&sites, &member(), "jalisco").await;
    make_publishable(&sites, &member(), site.id).await;
    publish_home(&pages, &member(), site.id).await;
    sites.publish(&member(), site.id).await.unwrap();

    let home = home_page(&pages, &member(), site.id).await;
    let err = pages
        .update(
            &member(),
            site.id,
            home.id,
            UpdatePageRequest {
                is_published: Some(false),
                ..UpdatePageRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MicrositeError::LastResource(_)));
}

#[tokio::test]
async fn live_site_never_swaps_in_an_unpublished_home() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, pages, _) = services(&db);

    let site = create_site(&sites, &member(), "jalisco").await;
    make_publishable(&sites, &member(), site.id).await;
    publish_home(&pages, &member(), site.id).await;
    sites.publish(&member(), site.id).await.unwrap();

    let err = pages
        .create(
            &member(),
            site.id,
            CreatePageRequest {
                is_home_page: true,
                ..simple_page("Portada")
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MicrositeError::Validation(_)));

    let draft = pages
        .create(&member(), site.id, simple_page("Torneos"))
        .await
        .unwrap();
    let err = pages
        .update(
            &member(),
            site.id,
            draft.id,
            UpdatePageRequest {
                is_home_page: Some(true),
                ..UpdatePageRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MicrositeError::Validation(_)));

    // Promoting and publishing in the same update keeps the root reachable.
    let promoted = pages
        .update(
            &member(),
            site.id,
            draft.id,
            UpdatePageRequest {
                is_home_page: Some(true),
                is_published: Some(true),
                ..UpdatePageRequest::default()
            },
        )
        .await
        .unwrap();
    assert!(promoted.is_home_page);
    assert!(promoted.is_published);
    let home = home_page(&pages, &member(), site.id).await;
    assert_eq!(home.id, promoted.id);
}

#[tokio::test]
async fn duplicate_page_copies_blocks_and_starts_unpublished() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, pages, blocks) = services(&db);

    let site = create_site(&sites, &member(), "jalisco").await;
    let about = pages
        .create(&member(), site.id, simple_page("About"))
        .await
        .unwrap();
    blocks
        .create(
            &member(),
            site.id,
            about.id,
            CreateBlockRequest {
                block_type: ContentBlockType::Text,
                content: serde_json::json!({"heading": "Hola", "body": "Bienvenidos"}),
                sort_order: None,
                is_visible: true,
            },
        )
        .await
        .unwrap();

    let copy = pages.duplicate(&member(), site.id, about.id).await.unwrap();
    assert_eq!(copy.slug, "about-copy");
    assert!(!copy.is_published);
    assert!(!copy.is_home_page);

    let copy_blocks = blocks.list(&member(), site.id, copy.id).await.unwrap();
    assert_eq!(copy_blocks.len(), 1);
    assert_eq!(copy_blocks[0].block_type, ContentBlockType::Text);

    // A second duplicate of the same source gets the next free suffix.
    let copy2 = pages.duplicate(&member(), site.id, about.id).await.unwrap();
    assert_eq!(copy2.slug, "about-copy-2");
}

#[tokio::test]
async fn block_payload_validated_against_type() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, pages, blocks) = services(&db);

    let site = create_site(&sites, &member(), "jalisco").await;
    let home = home_page(&pages, &member(), site.id).await;

    // An image block without a url does not parse.
    let err = blocks
        .create(
            &member(),
            site.id,
            home.id,
            CreateBlockRequest {
                block_type: ContentBlockType::Image,
                content: serde_json::json!({"caption": "no url"}),
                sort_order: None,
                is_visible: true,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MicrositeError::Validation(_)));
}

#[tokio::test]
async fn block_reorder_is_all_or_nothing() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, pages, blocks) = services(&db);

    let site = create_site(&sites, &member(), "jalisco").await;
    let home = home_page(&pages, &member(), site.id).await;
    let other = pages
        .create(&member(), site.id, simple_page("Other"))
        .await
        .unwrap();

    let text = |body: &str| CreateBlockRequest {
        block_type: ContentBlockType::Text,
        content: serde_json::json!({"body": body}),
        sort_order: None,
        is_visible: true,
    };
    let a = blocks
        .create(&member(), site.id, home.id, text("a"))
        .await
        .unwrap();
    let b = blocks
        .create(&member(), site.id, home.id, text("b"))
        .await
        .unwrap();
    let foreign = blocks
        .create(&member(), site.id, other.id, text("foreign"))
        .await
        .unwrap();

    let err = blocks
        .reorder(
            &member(),
            site.id,
            home.id,
            ReorderRequest {
                orderings: vec![
                    ReorderEntry {
                        id: a.id,
                        sort_order: 5,
                    },
                    ReorderEntry {
                        id: foreign.id,
                        sort_order: 6,
                    },
                ],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MicrositeError::Validation(_)));

    // The failed batch left nothing behind.
    let after = blocks.list(&member(), site.id, home.id).await.unwrap();
    assert_eq!(after[0].sort_order, a.sort_order);
    assert_eq!(after[1].sort_order, b.sort_order);
}

#[tokio::test]
async fn toggle_visibility_flips() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, pages, blocks) = services(&db);

    let site = create_site(&sites, &member(), "jalisco").await;
    let home = home_page(&pages, &member(), site.id).await;
    let block = blocks
        .create(
            &member(),
            site.id,
            home.id,
            CreateBlockRequest {
                block_type: ContentBlockType::Text,
                content: serde_json::json!({"body": "hola"}),
                sort_order: None,
                is_visible: true,
            },
        )
        .await
        .unwrap();

    let hidden = blocks
        .toggle_visibility(&member(), site.id, home.id, block.id)
        .await
        .unwrap();
    assert!(!hidden.is_visible);

    let shown = blocks
        .toggle_visibility(&member(), site.id, home.id, block.id)
        .await
        .unwrap();
    assert!(shown.is_visible);
}

#[tokio::test]
async fn ownership_is_opaque_to_other_members() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, pages, _) = services(&db);

    let site = create_site(&sites, &member(), "jalisco").await;

    let err = sites.get(&other_member(), site.id).await.unwrap_err();
    assert!(matches!(err, MicrositeError::NotFound));
    let err = pages.list(&other_member(), site.id).await.unwrap_err();
    assert!(matches!(err, MicrositeError::NotFound));

    // Admins bypass the owner filter.
    assert!(sites.get(&admin(), site.id).await.is_ok());
}

#[tokio::test]
async fn public_lookup_only_serves_live_sites() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, pages, _) = services(&db);

    let site = create_site(&sites, &member(), "jalisco").await;
    let err = sites.get_public("jalisco").await.unwrap_err();
    assert!(matches!(err, MicrositeError::NotFound));

    make_publishable(&sites, &member(), site.id).await;
    publish_home(&pages, &member(), site.id).await;
    sites.publish(&member(), site.id).await.unwrap();

    let (found, public_pages) = sites.get_public("JALISCO").await.unwrap();
    assert_eq!(found.id, site.id);
    assert_eq!(public_pages.len(), 1);
    assert!(public_pages[0].is_published);
}

#[tokio::test]
async fn availability_reflects_taken_and_invalid_values() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, _, _) = services(&db);

    create_site(&sites, &member(), "jalisco").await;

    let result = sites
        .check_availability(Some("jalisco"), Some("libre"))
        .await
        .unwrap();
    assert_eq!(result.subdomain_available, Some(false));
    assert_eq!(result.slug_available, Some(true));

    // Reserved labels read as unavailable rather than erroring.
    let result = sites.check_availability(Some("www"), None).await.unwrap();
    assert_eq!(result.subdomain_available, Some(false));
    assert_eq!(result.slug_available, None);
}

#[tokio::test]
async fn list_paginates_and_filters_by_owner() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, _, _) = services(&db);

    create_site(&sites, &member(), "jalisco").await;
    create_site(&sites, &member(), "sonora").await;
    create_site(&sites, &other_member(), "colima").await;

    let page = sites
        .list(
            &member(),
            &Default::default(),
            &sitios_core::PageQuery {
                page: Some(1),
                limit: Some(10),
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total_items, 2);
    assert_eq!(page.current_page, 1);

    let all = sites
        .list(
            &admin(),
            &Default::default(),
            &sitios_core::PageQuery {
                page: None,
                limit: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(all.total_items, 3);
}

#[tokio::test]
async fn delete_cascades_through_the_tree() {
    let db = TestDatabase::new().await.unwrap();
    let (sites, pages, blocks) = services(&db);

    let site = create_site(&sites, &member(), "jalisco").await;
    let home = home_page(&pages, &member(), site.id).await;
    blocks
        .create(
            &member(),
            site.id,
            home.id,
            CreateBlockRequest {
                block_type: ContentBlockType::Text,
                content: serde_json::json!({"body": "hola"}),
                sort_order: None,
                is_visible: true,
            },
        )
        .await
        .unwrap();

    sites.delete(&member(), site.id).await.unwrap();

    use sea_orm::{EntityTrait, PaginatorTrait};
    let remaining_pages = sitios_entities::pages::Entity::find()
        .count(db.db.as_ref())
        .await
        .unwrap();
    let remaining_blocks = sitios_entities::content_blocks::Entity::find()
        .count(db.db.as_ref())
        .await
        .unwrap();
    assert_eq!(remaining_pages, 0);
    assert_eq!(remaining_blocks, 0);
}
