//! Error types for config loading, service resolution and document assembly.

use std::path::PathBuf;

use thiserror::Error;

/// Every failure the generator can report.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTPS requested with neither a per-service nor a default certificate.
    #[error("service '{service}' enables HTTPS but no ssl_cert_id or default_ssl_cert_id is set")]
    MissingCertificate {
        /// Offending service name.
        service: String,
    },

    /// A service definition can't be turned into resources.
    #[error("service '{service}': {message}")]
    InvalidService {
        /// Offending service name.
        service: String,
        /// Violated rule.
        message: String,
    },

    /// A cluster-wide setting is missing or malformed.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Violated rule.
        message: String,
    },

    /// The config file is not valid YAML for the schema.
    #[error("YAML parse error: {message}")]
    Parse {
        /// Parser diagnostic.
        message: String,
    },

    /// Reading or writing a file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the error occurred.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Rendering the document failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying error.
        #[from]
        source: serde_json::Error,
    },

    /// Two services share a name, so their logical IDs would collide.
    #[error("service '{service}' is declared more than once")]
    DuplicateService {
        /// Repeated service name.
        service: String,
    },

    /// Two declarations share a logical ID.
    #[error("duplicate logical name '{name}' in assembled template")]
    DuplicateLogicalName {
        /// Colliding logical ID.
        name: String,
    },

    /// A declaration references a logical ID that is not declared.
    #[error("'{from}' references undeclared '{target}'")]
    DanglingReference {
        /// Declaration holding the reference.
        from: String,
        /// Missing target.
        target: String,
    },
}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; the caller can fix the config and retry.
    Configuration,
    /// A consistency check failed inside the generator itself.
    Invariant,
    /// Filesystem or serialization failure.
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCertificate { .. }
            | Self::InvalidService { .. }
            | Self::InvalidConfig { .. }
            | Self::Parse { .. } => ErrorKind::Configuration,
            Self::DuplicateService { .. }
            | Self::DuplicateLogicalName { .. }
            | Self::DanglingReference { .. } => ErrorKind::Invariant,
            Self::Io { .. } | Self::Serialization { .. } => ErrorKind::Io,
        }
    }

    /// Service name the error is about, if any.
    pub fn service(&self) -> Option<&str> {
        match self {
            Self::MissingCertificate { service }
            | Self::InvalidService { service, .. }
            | Self::DuplicateService { service } => Some(service),
            _ => None,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
