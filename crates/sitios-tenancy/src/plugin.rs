use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sitios_core::plugin::{
    MiddlewarePriority, PluginContext, PluginError, PluginMiddleware, ServiceRegistrationContext,
    SitiosPlugin,
};

use crate::directory::TenantDirectory;
use crate::resolver::tenant_resolver_middleware;
use crate::subdomain::TenancyConfig;

/// Tenancy plugin: registers the tenant directory and the host-resolution
/// middleware. The middleware runs at `Routing` priority so tenant identity
/// is available to everything else, including CORS decisions.
pub struct TenancyPlugin;

impl TenancyPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TenancyPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl SitiosPlugin for TenancyPlugin {
    fn name(&self) -> &'static str {
        "tenancy"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(async move {
            let db = context.require_service::<DatabaseConnection>();
            context.register_service(Arc::new(TenantDirectory::new(db)));
            Ok(())
        })
    }

    fn configure_middleware(&self, context: &PluginContext) -> Vec<PluginMiddleware> {
        let directory = context.require_service::<TenantDirectory>();
        let config = context.require_service::<TenancyConfig>();

        vec![PluginMiddleware::new(
            "tenant-resolver",
            self.name(),
            MiddlewarePriority::Routing,
            move |req, next| {
                let directory = directory.clone();
                let config = config.clone();
                async move { tenant_resolver_middleware(directory, config, req, next).await }
            },
        )]
    }
}

#[cfg(test)]
mod plugin_tests {
    use super::*;

    #[test]
    fn plugin_name() {
        assert_eq!(TenancyPlugin::new().name(), "tenancy");
    }
}
