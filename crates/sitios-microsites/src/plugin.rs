use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sitios_core::plugin::{
    PluginContext, PluginError, PluginRoutes, ServiceRegistrationContext, SitiosPlugin,
};
use sitios_tenancy::TenancyConfig;
use utoipa::openapi::OpenApi;
use utoipa::OpenApi as OpenApiTrait;

use crate::handlers::{create_router, MicrositesApiDoc, MicrositesAppState};
use crate::services::{BlockService, MicrositeService, PageService};

/// Microsites plugin: content tree services plus the builder API routes.
pub struct MicrositesPlugin;

impl MicrositesPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MicrositesPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl SitiosPlugin for MicrositesPlugin {
    fn name(&self) -> &'static str {
        "microsites"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(async move {
            let db = context.require_service::<DatabaseConnection>();
            let tenancy = context.require_service::<TenancyConfig>();

            context.register_service(Arc::new(MicrositeService::new(
                db.clone(),
                tenancy.as_ref().clone(),
            )));
            context.register_service(Arc::new(PageService::new(db.clone())));
            context.register_service(Arc::new(BlockService::new(db)));

            tracing::debug!("Microsites plugin services registered");
            Ok(())
        })
    }

    fn configure_routes(&self, context: &PluginContext) -> Option<PluginRoutes> {
        struct AppState {
            microsite_service: Arc<MicrositeService>,
            page_service: Arc<PageService>,
            block_service: Arc<BlockService>,
        }

        impl MicrositesAppState for AppState {
            fn microsite_service(&self) -> &MicrositeService {
                &self.microsite_service
            }

            fn page_service(&self) -> &PageService {
                &self.page_service
            }

            fn block_service(&self) -> &BlockService {
                &self.block_service
            }
        }

        let app_state = Arc::new(AppState {
            microsite_service: context.require_service::<MicrositeService>(),
            page_service: context.require_service::<PageService>(),
            block_service: context.require_service::<BlockService>(),
        });

        Some(PluginRoutes::new(create_router().with_state(app_state)))
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        Some(MicrositesApiDoc::openapi())
    }
}

#[cfg(test)]
mod plugin_tests {
    use super::*;

    #[test]
    fn plugin_name() {
        assert_eq!(MicrositesPlugin::new().name(), "microsites");
    }
}
