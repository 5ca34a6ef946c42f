use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use sitios_core::plugin::{
    MiddlewarePriority, PluginContext, PluginError, PluginMiddleware, ServiceRegistrationContext,
    SitiosPlugin,
};

use crate::middleware::{auth_middleware, AuthState};
use crate::provider::AuthProvider;

/// Auth plugin: registers the identity-provider seam and the bearer-token
/// middleware. The provider itself is registered by the server binary before
/// plugin initialization.
pub struct AuthPlugin;

impl AuthPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AuthPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl SitiosPlugin for AuthPlugin {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(async move {
            let provider = context.require_service::<dyn AuthProvider>();
            context.register_service(Arc::new(AuthState { provider }));
            Ok(())
        })
    }

    fn configure_middleware(&self, context: &PluginContext) -> Vec<PluginMiddleware> {
        let state = context.require_service::<AuthState>();
        vec![PluginMiddleware::new(
            "bearer-auth",
            self.name(),
            MiddlewarePriority::Security,
            move |req, next| {
                let state = state.clone();
                async move { auth_middleware(state, req, next).await }
            },
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticTokenProvider;
    use sitios_core::plugin::ServiceRegistrationContext;

    #[test]
    fn plugin_name() {
        assert_eq!(AuthPlugin::new().name(), "auth");
    }

    #[tokio::test]
    async fn contributes_the_bearer_middleware() {
        let registration = ServiceRegistrationContext::new();
        registration.register_service::<dyn AuthProvider>(Arc::new(StaticTokenProvider::new()));

        let plugin = AuthPlugin::new();
        plugin.register_services(&registration).await.unwrap();

        // PluginMiddleware::new requires a Send future; the token lookup must
        // not borrow the request across the provider await.
        let middleware = plugin.configure_middleware(&registration.create_plugin_context());
        assert_eq!(middleware.len(), 1);
        assert_eq!(middleware[0].name, "bearer-auth");
        assert_eq!(middleware[0].priority, MiddlewarePriority::Security);
    }
}
