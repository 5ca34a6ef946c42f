use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sitios_core::plugin::{PluginError, ServiceRegistrationContext, SitiosPlugin};

use crate::services::RendererService;

/// Renderer plugin. Registers the renderer service only; the tenant-facing
/// routes are not part of the API surface and are mounted by the server on
/// the host-steered side instead.
pub struct RendererPlugin;

impl RendererPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RendererPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl SitiosPlugin for RendererPlugin {
    fn name(&self) -> &'static str {
        "renderer"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(async move {
            let db = context.require_service::<DatabaseConnection>();
            context.register_service(Arc::new(RendererService::new(db)));
            Ok(())
        })
    }
}

#[cfg(test)]
mod plugin_tests {
    use super::*;

    #[test]
    fn plugin_name() {
        assert_eq!(RendererPlugin::new().name(), "renderer");
    }
}
