use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Extension;
use sea_orm::{ActiveModelTrait, Set};
use tower::ServiceExt;

use sitios_database::test_utils::TestDatabase;
use sitios_entities::types::{
    ContentBlockType, FeatureToggles, MicrositeStatus, OwnerType,
};
use sitios_entities::{content_blocks, microsites, pages};
use sitios_tenancy::ResolvedTenant;

use crate::routes::site_router;
use crate::services::RendererService;

async fn seed_site(db: &TestDatabase, live: bool) -> microsites::Model {
    microsites::ActiveModel {
        name: Set("Club Jalisco".to_string()),
        slug: Set("jalisco".to_string()),
        subdomain: Set("jalisco".to_string()),
        custom_domain: Set(None),
        description: Set(None),
        owner_id: Set(1),
        owner_type: Set(OwnerType::Club),
        status: Set(if live {
            MicrositeStatus::Published
        } else {
            MicrositeStatus::Draft
        }),
        is_public: Set(live),
        published_at: Set(None),
        color_scheme: Set(None),
        seo: Set(None),
        contact_info: Set(None),
        features: Set(None),
        ..Default::default()
    }
    .insert(db.db.as_ref())
    .await
    .expect("seed microsite")
}

async fn seed_page(
    db: &TestDatabase,
    microsite_id: i32,
    slug: &str,
    title: &str,
    is_home: bool,
    is_published: bool,
    sort_order: i32,
) -> pages::Model {
    pages::ActiveModel {
        microsite_id: Set(microsite_id),
        slug: Set(slug.to_string()),
        title: Set(title.to_string()),
        is_home_page: Set(is_home),
        is_published: Set(is_published),
        sort_order: Set(sort_order),
        ..Default::default()
    }
    .insert(db.db.as_ref())
    .await
    .expect("seed page")
}

async fn seed_text_block(
    db: &TestDatabase,
    page_id: i32,
    body: &str,
    sort_order: i32,
    is_visible: bool,
) -> content_blocks::Model {
    content_blocks::ActiveModel {
        page_id: Set(page_id),
        block_type: Set(ContentBlockType::Text),
        content: Set(serde_json::json!({"body": body})),
        sort_order: Set(sort_order),
        is_visible: Set(is_visible),
        ..Default::default()
    }
    .insert(db.db.as_ref())
    .await
    .expect("seed block")
}

#[tokio::test]
async fn render_order_is_sort_order_then_id() {
    let db = TestDatabase::new().await.unwrap();
    let site = seed_site(&db, true).await;
    let home = seed_page(&db, site.id, "", "Inicio", true, true, 0).await;

    // Two ties at order 2 inserted before the order-1 block.
    let first_tie = seed_text_block(&db, home.id, "tie-low-id", 2, true).await;
    let second_tie = seed_text_block(&db, home.id, "tie-high-id", 2, true).await;
    let leader = seed_text_block(&db, home.id, "order-one", 1, true).await;

    let service = RendererService::new(db.db.clone());
    let document = service.render_page(&site, "").await.unwrap();

    let ids: Vec<i32> = document.page.blocks.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![leader.id, first_tie.id, second_tie.id]);
}

#[tokio::test]
async fn hidden_and_unpublished_content_is_unreachable() {
    let db = TestDatabase::new().await.unwrap();
    let site = seed_site(&db, true).await;
    let home = seed_page(&db, site.id, "", "Inicio", true, true, 0).await;
    seed_page(&db, site.id, "borrador", "Borrador", false, false, 1).await;

    seed_text_block(&db, home.id, "visible", 0, true).await;
    seed_text_block(&db, home.id, "hidden", 1, false).await;

    let service = RendererService::new(db.db.clone());

    let document = service.render_page(&site, "").await.unwrap();
    assert_eq!(document.page.blocks.len(), 1);

    // Unpublished pages 404 on the public path.
    assert!(service.render_page(&site, "borrador").await.is_err());
}

#[tokio::test]
async fn disabled_features_drop_their_blocks() {
    let db = TestDatabase::new().await.unwrap();
    let mut site = seed_site(&db, true).await;
    site.features = Some(FeatureToggles {
        gallery: false,
        ..FeatureToggles::default()
    });
    let home = seed_page(&db, site.id, "", "Inicio", true, true, 0).await;

    seed_text_block(&db, home.id, "texto", 0, true).await;
    content_blocks::ActiveModel {
        page_id: Set(home.id),
        block_type: Set(ContentBlockType::Gallery),
        content: Set(serde_json::json!({"images": [{"url": "https://img.example/1.jpg"}]})),
        sort_order: Set(1),
        is_visible: Set(true),
        ..Default::default()
    }
    .insert(db.db.as_ref())
    .await
    .unwrap();

    let service = RendererService::new(db.db.clone());
    let document = service.render_page(&site, "").await.unwrap();

    assert_eq!(document.page.blocks.len(), 1);
    assert_eq!(document.page.blocks[0].block_type, ContentBlockType::Text);
}

#[tokio::test]
async fn navigation_puts_home_first() {
    let db = TestDatabase::new().await.unwrap();
    let site = seed_site(&db, true).await;
    seed_page(&db, site.id, "torneos", "Torneos", false, true, 0).await;
    seed_page(&db, site.id, "", "Inicio", true, true, 5).await;
    seed_page(&db, site.id, "contacto", "Contacto", false, true, 1).await;
    seed_page(&db, site.id, "oculta", "Oculta", false, false, 2).await;

    let service = RendererService::new(db.db.clone());
    let navigation = service.navigation(&site).await.unwrap();

    let paths: Vec<&str> = navigation.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths, vec!["/", "/torneos", "/contacto"]);
}

fn app_with_tenant(db: &TestDatabase, site: Option<microsites::Model>) -> axum::Router {
    let service = Arc::new(RendererService::new(db.db.clone()));
    let router = site_router(service);
    match site {
        Some(site) => router.layer(Extension(ResolvedTenant(Arc::new(site)))),
        None => router,
    }
}

#[tokio::test]
async fn routes_404_without_a_live_tenant() {
    let db = TestDatabase::new().await.unwrap();
    let draft = seed_site(&db, false).await;

    for app in [
        app_with_tenant(&db, None),
        app_with_tenant(&db, Some(draft)),
    ] {
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn content_negotiation_picks_json_or_html() {
    let db = TestDatabase::new().await.unwrap();
    let site = seed_site(&db, true).await;
    let home = seed_page(&db, site.id, "", "Inicio", true, true, 0).await;
    seed_text_block(&db, home.id, "Bienvenidos", 0, true).await;

    let response = app_with_tenant(&db, Some(site.clone()))
        .oneshot(
            Request::builder()
                .uri("/")
                .header("accept", "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let document: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(document.get("themeCSS").is_some());
    assert_eq!(document["page"]["slug"], "");

    let response = app_with_tenant(&db, Some(site))
        .oneshot(
            Request::builder()
                .uri("/")
                .header("accept", "text/html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Bienvenidos"));
}

#[tokio::test]
async fn theme_css_route_serves_stylesheet() {
    let db = TestDatabase::new().await.unwrap();
    let site = seed_site(&db, true).await;
    seed_page(&db, site.id, "", "Inicio", true, true, 0).await;

    let response = app_with_tenant(&db, Some(site))
        .oneshot(
            Request::builder()
                .uri("/theme.css")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/css; charset=utf-8"
    );
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    assert!(body.starts_with(b":root {"));
}
