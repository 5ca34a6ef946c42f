use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa_swagger_ui::SwaggerUi;

use sitios_auth::{AuthPlugin, AuthProvider, Principal, Role, StaticTokenProvider};
use sitios_core::plugin::PluginManager;
use sitios_database::establish_connection;
use sitios_microsites::MicrositesPlugin;
use sitios_renderer::{site_router, RendererPlugin, RendererService};
use sitios_tenancy::{TenancyConfig, TenancyPlugin};

#[derive(Args)]
pub struct ServeCommand {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1:3000", env = "SITIOS_ADDRESS")]
    pub address: String,

    /// Database connection URL
    #[arg(long, env = "SITIOS_DATABASE_URL")]
    pub database_url: String,

    /// Root domain tenants are served under (e.g. fed.mx)
    #[arg(long, env = "SITIOS_ROOT_DOMAIN")]
    pub root_domain: String,

    /// Static API token as token:user_id:role (role: admin or member).
    /// Repeatable. Without any token the builder API rejects every request.
    #[arg(long = "auth-token", env = "SITIOS_AUTH_TOKENS", value_delimiter = ',')]
    pub auth_tokens: Vec<String>,
}

impl ServeCommand {
    pub async fn execute(self) -> anyhow::Result<()> {
        let db = establish_connection(&self.database_url)
            .await
            .context("failed to connect to the database")?;

        let provider = build_token_provider(&self.auth_tokens)?;
        if self.auth_tokens.is_empty() {
            warn!("no auth tokens configured; all builder API requests will be rejected");
        }

        let mut plugin_manager = PluginManager::new();
        {
            let context = plugin_manager.service_context();
            context.register_service(db.clone());
            context.register_service(Arc::new(TenancyConfig::new(&self.root_domain)));
            context.register_service::<dyn AuthProvider>(provider);
        }

        // Order matters: tenancy resolves the host before auth and routes run.
        plugin_manager.register_plugin(Box::new(TenancyPlugin::new()));
        plugin_manager.register_plugin(Box::new(AuthPlugin::new()));
        plugin_manager.register_plugin(Box::new(MicrositesPlugin::new()));
        plugin_manager.register_plugin(Box::new(RendererPlugin::new()));

        plugin_manager
            .initialize_plugins()
            .await
            .context("plugin initialization failed")?;

        let renderer = plugin_manager
            .service_context()
            .create_plugin_context()
            .require_service::<RendererService>();

        // Anything the API does not claim is tenant territory; the site
        // router itself 404s when the host resolved no live tenant.
        let app = plugin_manager
            .build_application_with_fallback(site_router(renderer))
            .map_err(|e| anyhow::anyhow!("failed to build application: {e}"))?;

        let openapi = plugin_manager
            .get_unified_openapi()
            .map_err(|e| anyhow::anyhow!("failed to build OpenAPI document: {e}"))?;

        let app = app
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http());

        let listener = tokio::net::TcpListener::bind(&self.address)
            .await
            .with_context(|| format!("failed to bind {}", self.address))?;
        info!(
            "Sitios server listening on {} (root domain: {})",
            self.address, self.root_domain
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")?;

        info!("Server stopped");
        Ok(())
    }
}

/// Parse `token:user_id:role` entries into a static provider.
fn build_token_provider(entries: &[String]) -> anyhow::Result<Arc<StaticTokenProvider>> {
    let mut provider = StaticTokenProvider::new();

    for entry in entries {
        let mut parts = entry.splitn(3, ':');
        let (Some(token), Some(user_id), Some(role)) =
            (parts.next(), parts.next(), parts.next())
        else {
            anyhow::bail!("invalid auth token '{entry}', expected token:user_id:role");
        };

        let user_id: i32 = user_id
            .parse()
            .with_context(|| format!("invalid user id in auth token '{entry}'"))?;
        let role = match role {
            "admin" => Role::Admin,
            "member" => Role::Member,
            other => anyhow::bail!("invalid role '{other}', expected admin or member"),
        };

        provider = provider.with_token(token, Principal { user_id, role });
    }

    Ok(Arc::new(provider))
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parses_token_entries() {
        let provider = build_token_provider(&[
            "tk_admin:1:admin".to_string(),
            "tk_club:7:member".to_string(),
        ])
        .unwrap();

        let admin = provider.validate_token("tk_admin").await.unwrap();
        assert_eq!(admin.role, Role::Admin);
        let member = provider.validate_token("tk_club").await.unwrap();
        assert_eq!(member.user_id, 7);
    }

    #[test]
    fn rejects_malformed_entries() {
        assert!(build_token_provider(&["tk_only".to_string()]).is_err());
        assert!(build_token_provider(&["tk:abc:member".to_string()]).is_err());
        assert!(build_token_provider(&["tk:1:root".to_string()]).is_err());
    }
}
