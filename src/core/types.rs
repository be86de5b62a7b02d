//! Config schema types for services.yaml and the resolved per-service record.
//!
//! The YAML shape follows the ciinabox convention: cluster-wide keys at the
//! top level and `services` as an ordered list of single-key maps.

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Top-level services.yaml
// ============================================================================

/// Root configuration: cluster parameters plus the ordered service list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Cluster-wide parameters
    #[serde(flatten)]
    pub globals: GlobalParameters,

    /// Service definitions (order-preserving)
    #[serde(
        default,
        deserialize_with = "deserialize_services",
        serialize_with = "serialize_services"
    )]
    pub services: Vec<ServiceSpec>,

    /// Top-level keys outside the schema; rejected by validation
    #[serde(flatten)]
    pub unknown: IndexMap<String, serde_yaml_ng::Value>,
}

impl ServicesConfig {
    pub fn new(globals: GlobalParameters, services: Vec<ServiceSpec>) -> Self {
        Self {
            globals,
            services,
            unknown: IndexMap::new(),
        }
    }
}

/// Cluster-wide context shared by every service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalParameters {
    /// Base DNS zone, without trailing dot (e.g. `example.com`)
    pub dns_domain: String,

    /// Certificate used by HTTPS listeners that don't name their own
    #[serde(default)]
    pub default_ssl_cert_id: Option<String>,

    /// Bucket holding the published nested service templates
    pub source_bucket: String,

    /// ciinabox release; selects the artifact path and labels the template
    #[serde(deserialize_with = "deserialize_version")]
    pub ciinabox_version: String,
}

/// Accept `ciinabox_version: 2` as well as `ciinabox_version: "2"`.
fn deserialize_version<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_yaml_ng::Value::deserialize(deserializer)? {
        serde_yaml_ng::Value::String(s) => Ok(s),
        serde_yaml_ng::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "ciinabox_version must be a string or number, found {:?}",
            other
        ))),
    }
}

// ============================================================================
// Services
// ============================================================================

/// One entry of the `services` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSpec {
    /// Service name (the map key in YAML); basis of every derived logical ID
    #[serde(skip)]
    pub name: String,

    /// Container port the load balancer forwards to
    pub service_port: u16,

    /// Add a 443/HTTPS listener
    #[serde(default)]
    pub https_enabled: bool,

    /// Per-service certificate, overrides `default_ssl_cert_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_cert_id: Option<String>,

    /// DNS label in front of `dns_domain` (defaults to the service name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain_prefix: Option<String>,
}

impl ServiceSpec {
    /// Plain HTTP service on `port`.
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            service_port: port,
            ..Self::default()
        }
    }

    /// Enable the HTTPS listener.
    pub fn with_https(mut self) -> Self {
        self.https_enabled = true;
        self
    }

    /// Set a per-service certificate.
    pub fn with_cert(mut self, cert: impl Into<String>) -> Self {
        self.ssl_cert_id = Some(cert.into());
        self
    }

    /// Set the DNS label.
    pub fn with_subdomain(mut self, prefix: impl Into<String>) -> Self {
        self.subdomain_prefix = Some(prefix.into());
        self
    }
}

fn deserialize_services<'de, D>(deserializer: D) -> Result<Vec<ServiceSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Vec<IndexMap<String, ServiceSpec>> = Vec::deserialize(deserializer)?;
    entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| {
            if entry.len() != 1 {
                return Err(D::Error::custom(format!(
                    "services[{}] must contain exactly one service, found {}",
                    idx,
                    entry.len()
                )));
            }
            let mut iter = entry.into_iter();
            match iter.next() {
                Some((name, mut spec)) => {
                    spec.name = name;
                    Ok(spec)
                }
                None => Err(D::Error::custom(format!("services[{}] is empty", idx))),
            }
        })
        .collect()
}

fn serialize_services<S>(services: &[ServiceSpec], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut seq = serializer.serialize_seq(Some(services.len()))?;
    for spec in services {
        let entry = IndexMap::from([(spec.name.as_str(), spec)]);
        seq.serialize_element(&entry)?;
    }
    seq.end()
}

// ============================================================================
// Resolved service
// ============================================================================

/// A service with every optional field filled from cluster defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedService {
    pub name: String,
    pub service_port: u16,

    /// Certificate for the HTTPS listener; `Some` iff HTTPS is enabled
    pub https_certificate: Option<String>,

    pub subdomain_prefix: String,
}

impl ResolvedService {
    pub fn https_enabled(&self) -> bool {
        self.https_certificate.is_some()
    }

    /// Logical ID of the service's load balancer.
    pub fn load_balancer_id(&self) -> String {
        format!("{}LB", self.name)
    }

    /// Logical ID of the service's DNS alias record.
    pub fn dns_record_id(&self) -> String {
        format!("{}DNS", self.name)
    }

    /// Logical ID of the service's nested stack.
    pub fn stack_id(&self) -> String {
        format!("{}Stack", self.name)
    }
}

// ============================================================================
// Fixed logical names
// ============================================================================

pub const ECS_CLUSTER: &str = "ECSCluster";
pub const SUBNET_PUBLIC_A: &str = "SubnetPublicA";
pub const SUBNET_PUBLIC_B: &str = "SubnetPublicB";
pub const ECS_SUBNET_PRIVATE_A: &str = "ECSSubnetPrivateA";
pub const ECS_SUBNET_PRIVATE_B: &str = "ECSSubnetPrivateB";
pub const SECURITY_GROUP_BACKPLANE: &str = "SecurityGroupBackplane";
pub const SECURITY_GROUP_OPS: &str = "SecurityGroupOps";
pub const SECURITY_GROUP_DEV: &str = "SecurityGroupDev";

/// Input parameters every document declares, in emission order.
pub const INFRA_PARAMETERS: [&str; 8] = [
    ECS_CLUSTER,
    SUBNET_PUBLIC_A,
    SUBNET_PUBLIC_B,
    ECS_SUBNET_PRIVATE_A,
    ECS_SUBNET_PRIVATE_B,
    SECURITY_GROUP_BACKPLANE,
    SECURITY_GROUP_OPS,
    SECURITY_GROUP_DEV,
];

/// Logical ID of the shared execution role.
pub const ECS_ROLE: &str = "ECSRole";

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parse() {
        let yaml = r#"
dns_domain: example.com
default_ssl_cert_id: cert-1
source_bucket: artifacts
ciinabox_version: 0.2.1
services:
  - jenkins:
      service_port: 8080
      https_enabled: true
  - nexus:
      service_port: 8081
      subdomain_prefix: repo
"#;
        let config: ServicesConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.globals.dns_domain, "example.com");
        assert_eq!(config.globals.default_ssl_cert_id.as_deref(), Some("cert-1"));
        assert_eq!(config.services.len(), 2);
        assert_eq!(config.services[0].name, "jenkins");
        assert!(config.services[0].https_enabled);
        assert_eq!(config.services[1].name, "nexus");
        assert_eq!(config.services[1].subdomain_prefix.as_deref(), Some("repo"));
    }

    #[test]
    fn test_service_defaults() {
        let yaml = "service_port: 9000\n";
        let spec: ServiceSpec = serde_yaml_ng::from_str(yaml).unwrap();
        assert!(!spec.https_enabled);
        assert!(spec.ssl_cert_id.is_none());
        assert!(spec.subdomain_prefix.is_none());
    }

    #[test]
    fn test_services_default_empty() {
        let yaml = r#"
dns_domain: example.com
source_bucket: b
ciinabox_version: "1"
"#;
        let config: ServicesConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert!(config.services.is_empty());
        assert!(config.globals.default_ssl_cert_id.is_none());
    }

    #[test]
    fn test_service_entry_with_two_keys_rejected() {
        let yaml = r#"
dns_domain: example.com
source_bucket: b
ciinabox_version: "1"
services:
  - a:
      service_port: 80
    b:
      service_port: 81
"#;
        let err = serde_yaml_ng::from_str::<ServicesConfig>(yaml).unwrap_err();
        assert!(err.to_string().contains("exactly one service"));
    }

    #[test]
    fn test_service_unknown_field_rejected() {
        let yaml = "service_port: 80\nhttps: true\n";
        assert!(serde_yaml_ng::from_str::<ServiceSpec>(yaml).is_err());
    }

    #[test]
    fn test_port_out_of_range_rejected() {
        let yaml = "service_port: 70000\n";
        assert!(serde_yaml_ng::from_str::<ServiceSpec>(yaml).is_err());
    }

    #[test]
    fn test_config_roundtrip_keeps_names_and_order() {
        let config = ServicesConfig::new(
            GlobalParameters {
                dns_domain: "example.com".to_string(),
                default_ssl_cert_id: None,
                source_bucket: "b".to_string(),
                ciinabox_version: "1".to_string(),
            },
            vec![ServiceSpec::new("zeta", 80), ServiceSpec::new("alpha", 81)],
        );
        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        let config2: ServicesConfig = serde_yaml_ng::from_str(&yaml).unwrap();
        let names: Vec<_> = config2.services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(config2.globals, config.globals);
        assert!(config2.unknown.is_empty());
    }

    #[test]
    fn test_numeric_version_accepted() {
        let yaml = "dns_domain: example.com\nsource_bucket: b\nciinabox_version: 2\n";
        let config: ServicesConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.globals.ciinabox_version, "2");

        let yaml = "dns_domain: example.com\nsource_bucket: b\nciinabox_version: 1.5\n";
        let config: ServicesConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.globals.ciinabox_version, "1.5");
    }

    #[test]
    fn test_version_must_be_scalar() {
        let yaml = "dns_domain: example.com\nsource_bucket: b\nciinabox_version: [1]\n";
        let err = serde_yaml_ng::from_str::<ServicesConfig>(yaml).unwrap_err();
        assert!(err.to_string().contains("ciinabox_version"));
    }

    #[test]
    fn test_unknown_top_level_keys_collected() {
        let yaml = r#"
dns_domain: example.com
source_bucket: b
ciinabox_version: "1"
servicez:
  - api:
      service_port: 80
"#;
        let config: ServicesConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert!(config.services.is_empty());
        let keys: Vec<_> = config.unknown.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["servicez"]);
    }

    #[test]
    fn test_resolved_logical_ids() {
        let r = ResolvedService {
            name: "api".to_string(),
            service_port: 8080,
            https_certificate: None,
            subdomain_prefix: "api".to_string(),
        };
        assert_eq!(r.load_balancer_id(), "apiLB");
        assert_eq!(r.dns_record_id(), "apiDNS");
        assert_eq!(r.stack_id(), "apiStack");
        assert!(!r.https_enabled());
    }

    #[test]
    fn test_infra_parameters_unique() {
        let mut names = INFRA_PARAMETERS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), INFRA_PARAMETERS.len());
        assert!(!INFRA_PARAMETERS.contains(&ECS_ROLE));
    }
}
