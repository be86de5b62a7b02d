//! services.yaml parsing and validation.
//!
//! Parses the config and validates structural constraints:
//! - `dns_domain`, `source_bucket` and `ciinabox_version` must be set
//! - no top-level keys outside the schema
//! - service names must be unique ASCII-alphanumeric logical-ID prefixes
//! - ports must be non-zero
//! - HTTPS services need a certificate, local or default

use super::defaults;
use super::error::{Error, Result};
use super::types::*;
use std::collections::HashSet;
use std::path::Path;

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Service the problem belongs to, if any
    pub service: Option<String>,
    pub message: String,
}

impl ValidationError {
    fn global(message: impl Into<String>) -> Self {
        Self {
            service: None,
            message: message.into(),
        }
    }

    fn service(name: &str, message: impl Into<String>) -> Self {
        Self {
            service: Some(name.to_string()),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.service {
            Some(ref name) => write!(f, "service '{}': {}", name, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Parse a services.yaml file from disk.
pub fn parse_config_file(path: &Path) -> Result<ServicesConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse a services.yaml from a string.
pub fn parse_config(yaml: &str) -> Result<ServicesConfig> {
    serde_yaml_ng::from_str(yaml).map_err(|e| Error::Parse {
        message: e.to_string(),
    })
}

/// Check the cluster-wide part of a config: required globals, the domain
/// form and unknown top-level keys.
pub fn check_globals(config: &ServicesConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let globals = &config.globals;

    for (field, value) in [
        ("dns_domain", &globals.dns_domain),
        ("source_bucket", &globals.source_bucket),
        ("ciinabox_version", &globals.ciinabox_version),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::global(format!("{} must not be empty", field)));
        }
    }
    if globals.dns_domain.ends_with('.') {
        errors.push(ValidationError::global(
            "dns_domain must not end with '.'",
        ));
    }
    for key in config.unknown.keys() {
        errors.push(ValidationError::global(format!(
            "unknown top-level key '{}'",
            key
        )));
    }

    errors
}

/// Validate a parsed config. Returns a list of errors (empty = valid).
pub fn validate_config(config: &ServicesConfig) -> Vec<ValidationError> {
    let mut errors = check_globals(config);
    let globals = &config.globals;

    let mut seen = HashSet::new();
    for spec in &config.services {
        if !seen.insert(spec.name.as_str()) {
            errors.push(ValidationError::service(&spec.name, "duplicate service name"));
            continue;
        }
        if !defaults::is_valid_service_name(&spec.name) {
            errors.push(ValidationError::service(
                &spec.name,
                "name must be non-empty ASCII alphanumeric",
            ));
        }
        if spec.service_port == 0 {
            errors.push(ValidationError::service(
                &spec.name,
                "service_port must be between 1 and 65535",
            ));
        }
        if spec.https_enabled && defaults::certificate_for(spec, globals).is_none() {
            errors.push(ValidationError::service(
                &spec.name,
                "https_enabled requires ssl_cert_id or default_ssl_cert_id",
            ));
        }
        if let Some(ref prefix) = spec.subdomain_prefix {
            if prefix.is_empty() || prefix.starts_with('.') || prefix.ends_with('.') {
                errors.push(ValidationError::service(
                    &spec.name,
                    format!("invalid subdomain_prefix '{}'", prefix),
                ));
            }
        }
    }

    errors
}
