//! Per-service defaulting against cluster-wide parameters.
//!
//! `resolve` is pure: the same spec and globals always give the same record,
//! which is what makes regeneration byte-for-byte reproducible.

use super::error::{Error, Result};
use super::types::{GlobalParameters, ResolvedService, ServiceSpec};

/// Treat empty or whitespace-only ids as unset.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// CloudFormation logical IDs are ASCII alphanumeric; the service name is
/// their prefix.
pub fn is_valid_service_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Certificate an HTTPS listener would use: per-service first, then default.
pub fn certificate_for<'a>(spec: &'a ServiceSpec, globals: &'a GlobalParameters) -> Option<&'a str> {
    non_empty(spec.ssl_cert_id.as_deref()).or(non_empty(globals.default_ssl_cert_id.as_deref()))
}

/// Fill every optional field of `spec` from `globals`.
pub fn resolve(spec: &ServiceSpec, globals: &GlobalParameters) -> Result<ResolvedService> {
    if !is_valid_service_name(&spec.name) {
        return Err(Error::InvalidService {
            service: spec.name.clone(),
            message: "name must be non-empty ASCII alphanumeric".to_string(),
        });
    }
    if spec.service_port == 0 {
        return Err(Error::InvalidService {
            service: spec.name.clone(),
            message: "service_port must be between 1 and 65535".to_string(),
        });
    }

    let https_certificate = if spec.https_enabled {
        let cert = certificate_for(spec, globals).ok_or_else(|| Error::MissingCertificate {
            service: spec.name.clone(),
        })?;
        Some(cert.to_string())
    } else {
        None
    };

    let subdomain_prefix = spec
        .subdomain_prefix
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or(&spec.name)
        .to_string();

    tracing::debug!(
        service = %spec.name,
        port = spec.service_port,
        https = https_certificate.is_some(),
        subdomain = %subdomain_prefix,
        "resolved service"
    );

    Ok(ResolvedService {
        name: spec.name.clone(),
        service_port: spec.service_port,
        https_certificate,
        subdomain_prefix,
    })
}

/// Resolve every service, stopping at the first failure.
pub fn resolve_all(specs: &[ServiceSpec], globals: &GlobalParameters) -> Result<Vec<ResolvedService>> {
    specs.iter().map(|s| resolve(s, globals)).collect()
}
