//! Publish-readiness validation
//!
//! Evaluated synchronously before any draft → published transition. All
//! violations are accumulated so the owner can fix everything in one pass;
//! the transition either commits entirely or is rejected with the full list.

use serde::Serialize;
use sitios_entities::{microsites, pages};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishCheck {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Check a microsite and its page set against the publish rules.
pub fn evaluate_publish_readiness(
    microsite: &microsites::Model,
    pages: &[pages::Model],
) -> PublishCheck {
    let mut errors = Vec::new();

    if !pages.iter().any(|p| p.is_published) {
        errors.push("at least one page must be published".to_string());
    }

    match pages.iter().find(|p| p.is_home_page) {
        None => errors.push("home page does not exist".to_string()),
        Some(home) if !home.is_published => {
            errors.push("home page must be published".to_string());
        }
        Some(_) => {}
    }

    let reachable = microsite
        .contact_info
        .as_ref()
        .map(|c| c.is_reachable())
        .unwrap_or(false);
    if !reachable {
        errors.push("contact email or phone is required".to_string());
    }

    let seo = microsite.seo.as_ref();
    if seo.map(|s| s.title.trim().is_empty()).unwrap_or(true) {
        errors.push("SEO title is required".to_string());
    }
    if seo.map(|s| s.description.trim().is_empty()).unwrap_or(true) {
        errors.push("SEO description is required".to_string());
    }

    PublishCheck {
        valid: errors.is_empty(),
        errors,
    }
}
