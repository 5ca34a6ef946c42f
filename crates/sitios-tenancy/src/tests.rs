use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Extension, Router};
use sea_orm::{ActiveModelTrait, Set};
use tower::ServiceExt;

use sitios_database::test_utils::TestDatabase;
use sitios_entities::microsites;
use sitios_entities::types::{MicrositeStatus, OwnerType};

use crate::directory::TenantDirectory;
use crate::resolver::{tenant_resolver_middleware, ResolvedTenant};
use crate::subdomain::TenancyConfig;

async fn seed_microsite(db: &TestDatabase, subdomain: &str) -> microsites::Model {
    microsites::ActiveModel {
        name: Set(format!("Club {subdomain}")),
        slug: Set(subdomain.to_string()),
        subdomain: Set(subdomain.to_string()),
        custom_domain: Set(None),
        description: Set(None),
        owner_id: Set(1),
        owner_type: Set(OwnerType::Club),
        status: Set(MicrositeStatus::Draft),
        is_public: Set(false),
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

#[tokio::test]
async fn directory_resolves_case_normalized() {
    let test_db = TestDatabase::new().await.unwrap();
    let seeded = seed_microsite(&test_db, "jalisco").await;

    let directory = TenantDirectory::new(test_db.db.clone());
    let found = directory.resolve("JALISCO").await.unwrap().unwrap();
    assert_eq!(found.id, seeded.id);

    assert!(directory.resolve("sonora").await.unwrap().is_none());
}

#[tokio::test]
async fn directory_resolves_custom_domain() {
    let test_db = TestDatabase::new().await.unwrap();
    microsites::ActiveModel {
        name: Set("Club Jalisco".to_string()),
        slug: Set("jalisco".to_string()),
        subdomain: Set("jalisco".to_string()),
        custom_domain: Set(Some("clubjalisco.mx".to_string())),
        description: Set(None),
        owner_id: Set(1),
        owner_type: Set(OwnerType::Club),
        status: Set(MicrositeStatus::Published),
        is_public: Set(true),
        published_at: Set(None),
        color_scheme: Set(None),
        seo: Set(None),
        contact_info: Set(None),
        features: Set(None),
        ..Default::default()
    }
    .insert(test_db.db.as_ref())
    .await
    .unwrap();

    let directory = TenantDirectory::new(test_db.db.clone());
    let found = directory
        .resolve_custom_domain("ClubJalisco.MX")
        .await
        .unwrap();
    assert!(found.is_some());
}

fn tenant_echo_app(test_db: &TestDatabase) -> Router {
    let directory = Arc::new(TenantDirectory::new(test_db.db.clone()));
    let config = Arc::new(TenancyConfig::new("fed.mx"));

    async fn echo(tenant: Option<Extension<ResolvedTenant>>) -> String {
        match tenant {
            Some(Extension(tenant)) => format!("tenant:{}", tenant.microsite().subdomain),
            None => "no-tenant".to_string(),
        }
    }

    Router::new()
        .route("/", get(echo))
        .layer(axum::middleware::from_fn(move |req, next| {
            let directory = directory.clone();
            let config = config.clone();
            async move { tenant_resolver_middleware(directory, config, req, next).await }
        }))
}

async fn request_with_host(app: Router, host: &str) -> String {
    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header("host", host)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn middleware_attaches_tenant_for_known_subdomain() {
    let test_db = TestDatabase::new().await.unwrap();
    seed_microsite(&test_db, "club1").await;

    let app = tenant_echo_app(&test_db);
    assert_eq!(
        request_with_host(app, "club1.fed.mx").await,
        "tenant:club1"
    );
}

#[tokio::test]
async fn middleware_passes_through_reserved_and_apex_hosts() {
    let test_db = TestDatabase::new().await.unwrap();
    seed_microsite(&test_db, "club1").await;

    for host in ["fed.mx", "www.fed.mx", "api.fed.mx", "unknown.fed.mx"] {
        let app = tenant_echo_app(&test_db);
        assert_eq!(request_with_host(app, host).await, "no-tenant", "{host}");
    }
}

#[tokio::test]
async fn middleware_prefers_forwarded_host() {
    let test_db = TestDatabase::new().await.unwrap();
    seed_microsite(&test_db, "club1").await;

    let app = tenant_echo_app(&test_db);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header("host", "edge-proxy.internal")
                .header("x-forwarded-host", "club1.fed.mx")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"tenant:club1");
}
