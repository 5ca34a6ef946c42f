use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use sitios_entities::microsites;

use crate::directory::TenantDirectory;
use crate::subdomain::{candidate_label, TenancyConfig};

/// The microsite a request's Host header resolved to. Attached as a request
/// extension by `tenant_resolver_middleware`; downstream handlers that
/// require a tenant 404 when it is absent.
#[derive(Clone)]
pub struct ResolvedTenant(pub Arc<microsites::Model>);

impl ResolvedTenant {
    pub fn microsite(&self) -> &microsites::Model {
        &self.0
    }
}

/// Request-pipeline stage executed before route dispatch, once per request.
///
/// Reads only the Host (or X-Forwarded-Host) header; no body access. A host
/// that yields no tenant passes through untouched so the request proceeds as
/// a main-domain/API request. Lookup failures are logged and treated as "no
/// tenant" rather than failing the request.
pub async fn tenant_resolver_middleware(
    directory: Arc<TenantDirectory>,
    config: Arc<TenancyConfig>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(host) = request_host(&req) {
        if let Some(microsite) = resolve_host(&directory, &config, &host).await {
            debug!(
                subdomain = %microsite.subdomain,
                microsite_id = microsite.id,
                "resolved tenant from host"
            );
            req.extensions_mut()
                .insert(ResolvedTenant(Arc::new(microsite)));
        }
    }

    next.run(req).await
}

fn request_host(req: &Request) -> Option<String> {
    let headers = req.headers();
    headers
        .get("x-forwarded-host")
        .or_else(|| headers.get("host"))
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

async fn resolve_host(
    directory: &TenantDirectory,
    config: &TenancyConfig,
    host: &str,
) -> Option<microsites::Model> {
    let bare_host = host.rsplit_once(':').map_or(host, |(h, _)| h);
    let normalized = bare_host.to_ascii_lowercase();

    // Hosts outside the platform's root domain can only be custom domains.
    if normalized != config.root_domain && !normalized.ends_with(&format!(".{}", config.root_domain))
    {
        return match directory.resolve_custom_domain(&normalized).await {
            Ok(microsite) => microsite,
            Err(e) => {
                warn!("custom domain lookup failed for {normalized}: {e}");
                None
            }
        };
    }

    let candidate = candidate_label(&normalized, config)?;
    match directory.resolve(&candidate).await {
        Ok(microsite) => microsite,
        Err(e) => {
            warn!("tenant lookup failed for subdomain {candidate}: {e}");
            None
        }
    }
}
