//! Subdomain charset rules and host-header label extraction

use thiserror::Error;

/// Labels that can never be claimed as a tenant subdomain.
pub const RESERVED_LABELS: &[&str] = &["www", "api"];

/// DNS label length limit.
const MAX_LABEL_LEN: usize = 63;

/// Root domain the platform is served under (e.g. `fed.mx`). Tenants live at
/// `<subdomain>.<root_domain>`.
#[derive(Debug, Clone)]
pub struct TenancyConfig {
    pub root_domain: String,
}

impl TenancyConfig {
    pub fn new(root_domain: impl Into<String>) -> Self {
        Self {
            root_domain: root_domain.into().to_ascii_lowercase(),
        }
    }

    /// First label of the root domain; a microsite cannot claim the apex.
    pub fn root_label(&self) -> &str {
        self.root_domain.split('.').next().unwrap_or("")
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SubdomainError {
    #[error("subdomain must not be empty")]
    Empty,
    #[error("subdomain must be at most {MAX_LABEL_LEN} characters")]
    TooLong,
    #[error("subdomain may only contain lowercase letters, digits and hyphens")]
    InvalidCharset,
    #[error("subdomain '{0}' is reserved")]
    Reserved(String),
}

/// Validate a requested subdomain against the DNS-label charset and the
/// reserved tokens (`www`, `api`, and the root domain's own label). Returns
/// the normalized (lowercased) value.
pub fn validate_subdomain(raw: &str, config: &TenancyConfig) -> Result<String, SubdomainError> {
    let normalized = raw.trim().to_ascii_lowercase();

    if normalized.is_empty() {
        return Err(SubdomainError::Empty);
    }
    if normalized.len() > MAX_LABEL_LEN {
        return Err(SubdomainError::TooLong);
    }
    if !normalized
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(SubdomainError::InvalidCharset);
    }
    if RESERVED_LABELS.contains(&normalized.as_str()) || normalized == config.root_label() {
        return Err(SubdomainError::Reserved(normalized));
    }

    Ok(normalized)
}

/// Extract the candidate tenant label from a request host.
///
/// Returns `None` when the host carries no tenant label: the apex domain,
/// `www`/`api`, or a missing host header. The port, if any, is ignored.
pub fn candidate_label(host: &str, config: &TenancyConfig) -> Option<String> {
    let host = host.rsplit_once(':').map_or(host, |(h, _)| h);
    let host = host.trim().to_ascii_lowercase();

    let candidate = host.split('.').next()?.to_string();
    if candidate.is_empty()
        || RESERVED_LABELS.contains(&candidate.as_str())
        || candidate == config.root_label()
    {
        return None;
    }

    Some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TenancyConfig {
        TenancyConfig::new("fed.mx")
    }

    #[test]
    fn extracts_tenant_label() {
        assert_eq!(
            candidate_label("club1.fed.mx", &config()),
            Some("club1".to_string())
        );
        assert_eq!(
            candidate_label("Club1.Fed.MX:8080", &config()),
            Some("club1".to_string())
        );
    }

    #[test]
    fn apex_and_reserved_hosts_have_no_tenant() {
        assert_eq!(candidate_label("fed.mx", &config()), None);
        assert_eq!(candidate_label("www.fed.mx", &config()), None);
        assert_eq!(candidate_label("api.fed.mx", &config()), None);
    }

    #[test]
    fn validates_charset() {
        assert_eq!(
            validate_subdomain("Jalisco", &config()),
            Ok("jalisco".to_string())
        );
        assert_eq!(
            validate_subdomain("club-1", &config()),
            Ok("club-1".to_string())
        );
        assert_eq!(
            validate_subdomain("club.1", &config()),
            Err(SubdomainError::InvalidCharset)
        );
        assert_eq!(validate_subdomain("", &config()), Err(SubdomainError::Empty));
        assert_eq!(
            validate_subdomain(&"a".repeat(64), &config()),
            Err(SubdomainError::TooLong)
        );
    }

    #[test]
    fn rejects_reserved_labels() {
        for label in ["www", "api", "fed"] {
            assert_eq!(
                validate_subdomain(label, &config()),
                Err(SubdomainError::Reserved(label.to_string()))
            );
        }
    }
}
