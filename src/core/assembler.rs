//! Document assembly and consistency checks.
//!
//! Builds the template as an explicit accumulator: fixed parameters, the
//! shared role, then each service family in input order. Before the template
//! is returned every logical ID is checked for uniqueness and every `Ref` /
//! `Fn::GetAtt` for a declared target.

use super::composer;
use super::defaults;
use super::parser;
use super::error::{Error, Result};
use super::template::{Parameter, Reference, Resource, ResourceFamily, Template, PSEUDO_PARAMETERS};
use super::types::{GlobalParameters, ResolvedService, ServicesConfig, INFRA_PARAMETERS};
use crate::resources::role;
use std::collections::HashSet;

/// Template description, versioned like the published artifacts.
pub fn description(globals: &GlobalParameters) -> String {
    format!("ciinabox - ECS Service ELBs v{}", globals.ciinabox_version)
}

/// Add a declaration, refusing duplicate logical IDs.
fn declare(template: &mut Template, resource: Resource) -> Result<()> {
    if template.declares(&resource.logical_id) {
        return Err(Error::DuplicateLogicalName {
            name: resource.logical_id,
        });
    }
    template
        .resources
        .insert(resource.logical_id.clone(), resource);
    Ok(())
}

/// Assemble from already-composed families.
pub fn assemble_families(
    families: Vec<ResourceFamily>,
    globals: &GlobalParameters,
) -> Result<Template> {
    let mut template = Template::new(description(globals));

    for name in INFRA_PARAMETERS {
        template
            .parameters
            .insert(name.to_string(), Parameter::string());
    }

    declare(&mut template, role::declare())?;

    let service_count = families.len();
    for family in families {
        for resource in family.into_resources() {
            declare(&mut template, resource)?;
        }
    }

    verify_references(&template)?;

    tracing::info!(
        services = service_count,
        parameters = template.parameters.len(),
        resources = template.resources.len(),
        "assembled template"
    );
    Ok(template)
}

/// Service names seed every logical ID, so a repeat is reported by name
/// before anything is composed.
fn check_unique_names(services: &[ResolvedService]) -> Result<()> {
    let mut seen = HashSet::new();
    for service in services {
        if !seen.insert(service.name.as_str()) {
            return Err(Error::DuplicateService {
                service: service.name.clone(),
            });
        }
    }
    Ok(())
}

/// Assemble the template for resolved services.
pub fn assemble(services: &[ResolvedService], globals: &GlobalParameters) -> Result<Template> {
    check_unique_names(services)?;
    assemble_families(composer::compose_all(services, globals), globals)
}

/// Resolve, compose and assemble a whole config. The cluster-wide settings
/// are checked first, and nothing is produced unless every service resolves.
pub fn generate(config: &ServicesConfig) -> Result<Template> {
    if let Some(problem) = parser::check_globals(config).into_iter().next() {
        return Err(Error::InvalidConfig {
            message: problem.to_string(),
        });
    }
    let resolved = defaults::resolve_all(&config.services, &config.globals)?;
    assemble(&resolved, &config.globals)
}

/// Check every reference in `template` against its declarations.
///
/// `Ref` may target a parameter, a resource or a pseudo parameter;
/// `Fn::GetAtt` must target a resource.
pub fn verify_references(template: &Template) -> Result<()> {
    for (id, resource) in &template.resources {
        for reference in resource.references() {
            let resolves = match reference {
                Reference::Ref(target) => {
                    template.declares(target) || PSEUDO_PARAMETERS.iter().any(|p| *p == target)
                }
                Reference::Attribute { target, .. } => template.resources.contains_key(target),
            };
            if !resolves {
                return Err(Error::DanglingReference {
                    from: id.clone(),
                    target: reference.target().to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::core::template::{ResourceType, Value};
    use crate::core::types::ServiceSpec;
    use proptest::prelude::*;

    fn globals(default_cert: Option<&str>) -> GlobalParameters {
        GlobalParameters {
            dns_domain: "example.com".to_string(),
            default_ssl_cert_id: default_cert.map(str::to_string),
            source_bucket: "artifacts".to_string(),
            ciinabox_version: "0.2.1".to_string(),
        }
    }

    fn config(services: Vec<ServiceSpec>, default_cert: Option<&str>) -> ServicesConfig {
        ServicesConfig::new(globals(default_cert), services)
    }

    #[test]
    fn test_zero_services() {
        let t = generate(&config(vec![], None)).unwrap();
        let params: Vec<_> = t.parameters.keys().map(String::as_str).collect();
        assert_eq!(params, INFRA_PARAMETERS.to_vec());
        let ids: Vec<_> = t.resources.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["ECSRole"]);
        assert_eq!(t.description, "ciinabox - ECS Service ELBs v0.2.1");
    }

    #[test]
    fn test_families_follow_input_order() {
        let t = generate(&config(
            vec![ServiceSpec::new("a", 80), ServiceSpec::new("b", 81)],
            None,
        ))
        .unwrap();
        let ids: Vec<_> = t.resources.keys().map(String::as_str).collect();
        assert_eq!(
            ids,
            vec!["ECSRole", "aLB", "aDNS", "aStack", "bLB", "bDNS", "bStack"]
        );
    }

    #[test]
    fn test_https_default_cert_in_listener() {
        let t = generate(&config(
            vec![ServiceSpec::new("api", 8080).with_https()],
            Some("cert-1"),
        ))
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&t.to_json(false).unwrap()).unwrap();
        let listeners = &json["Resources"]["apiLB"]["Properties"]["Listeners"];
        assert_eq!(listeners[1]["Protocol"], "HTTPS");
        assert_eq!(listeners[1]["SSLCertificateId"], "cert-1");
    }

    #[test]
    fn test_missing_cert_produces_no_document() {
        let err = generate(&config(
            vec![
                ServiceSpec::new("web", 80),
                ServiceSpec::new("api", 8080).with_https(),
            ],
            None,
        ))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.service(), Some("api"));
    }

    #[test]
    fn test_http_only_single_listener() {
        let t = generate(&config(vec![ServiceSpec::new("api", 8080)], None)).unwrap();
        let json = serde_json::to_value(&t).unwrap();
        let listeners = json["Resources"]["apiLB"]["Properties"]["Listeners"]
            .as_array()
            .unwrap();
        assert_eq!(listeners.len(), 1);
        assert_eq!(listeners[0]["LoadBalancerPort"], "80");
        assert_eq!(listeners[0]["InstancePort"], 8080);
        assert_eq!(listeners[0]["Protocol"], "HTTP");
    }

    #[test]
    fn test_subdomain_default_record_name() {
        let t = generate(&config(vec![ServiceSpec::new("api", 80)], None)).unwrap();
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(
            json["Resources"]["apiDNS"]["Properties"]["Name"],
            serde_json::json!({"Fn::Join": ["", ["api", ".", "example.com", "."]]})
        );
    }

    #[test]
    fn test_duplicate_service_names_rejected() {
        let err = generate(&config(
            vec![ServiceSpec::new("api", 80), ServiceSpec::new("api", 81)],
            None,
        ))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invariant);
        assert_eq!(err.service(), Some("api"));
        assert!(matches!(err, Error::DuplicateService { ref service } if service == "api"));
    }

    #[test]
    fn test_duplicate_logical_id_from_families() {
        let g = globals(None);
        let resolved = defaults::resolve(&ServiceSpec::new("api", 80), &g).unwrap();
        let families = vec![
            composer::compose(&resolved, &g),
            composer::compose(&resolved, &g),
        ];
        let err = assemble_families(families, &g).unwrap_err();
        assert!(matches!(err, Error::DuplicateLogicalName { ref name } if name == "apiLB"));
    }

    #[test]
    fn test_empty_dns_domain_rejected() {
        let mut cfg = config(vec![ServiceSpec::new("api", 80)], None);
        cfg.globals.dns_domain = String::new();
        let err = generate(&cfg).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("dns_domain must not be empty"));
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        let mut cfg = config(vec![], None);
        cfg.unknown
            .insert("servicez".to_string(), serde_yaml_ng::Value::Null);
        let err = generate(&cfg).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { ref message } if message.contains("servicez")));
    }

    #[test]
    fn test_dangling_ref_detected() {
        let mut t = generate(&config(vec![], None)).unwrap();
        t.resources.insert(
            "ghostDNS".to_string(),
            Resource::new("ghostDNS", ResourceType::RecordSet)
                .property("AliasTarget", Value::get_att("ghostLB", "DNSName")),
        );
        let err = verify_references(&t).unwrap_err();
        assert!(matches!(
            err,
            Error::DanglingReference { ref from, ref target } if from == "ghostDNS" && target == "ghostLB"
        ));
    }

    #[test]
    fn test_get_att_on_parameter_is_dangling() {
        let mut t = generate(&config(vec![], None)).unwrap();
        t.resources.insert(
            "x".to_string(),
            Resource::new("x", ResourceType::RecordSet)
                .property("A", Value::get_att("ECSCluster", "Arn")),
        );
        assert!(verify_references(&t).is_err());
    }

    #[test]
    fn test_pseudo_parameter_ref_resolves() {
        let t = generate(&config(vec![ServiceSpec::new("api", 80)], None)).unwrap();
        assert!(verify_references(&t).is_ok());
    }

    fn service_list() -> impl Strategy<Value = Vec<ServiceSpec>> {
        prop::collection::btree_map("[a-z][a-z0-9]{0,7}", (1u16..=65535, any::<bool>()), 0..12)
            .prop_map(|m| {
                m.into_iter()
                    .map(|(name, (port, https))| {
                        let spec = ServiceSpec::new(name, port);
                        if https {
                            spec.with_https()
                        } else {
                            spec
                        }
                    })
                    .collect()
            })
            .prop_shuffle()
    }

    proptest! {
        #[test]
        fn prop_generation_is_deterministic(services in service_list()) {
            let cfg = config(services, Some("cert-1"));
            let a = generate(&cfg).unwrap().to_json(true).unwrap();
            let b = generate(&cfg).unwrap().to_json(true).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_names_unique_and_references_closed(services in service_list()) {
            let t = generate(&config(services.clone(), Some("cert-1"))).unwrap();
            let mut seen = HashSet::new();
            for name in t.parameters.keys().chain(t.resources.keys()) {
                prop_assert!(seen.insert(name.clone()), "duplicate {}", name);
            }
            prop_assert_eq!(t.resources.len(), 1 + 3 * services.len());
            prop_assert!(verify_references(&t).is_ok());
        }

        #[test]
        fn prop_families_in_input_order(services in service_list()) {
            let t = generate(&config(services.clone(), Some("cert-1"))).unwrap();
            let stacks: Vec<String> = t
                .resources
                .keys()
                .filter_map(|k| k.strip_suffix("Stack").map(str::to_string))
                .collect();
            let names: Vec<String> = services.into_iter().map(|s| s.name).collect();
            prop_assert_eq!(stacks, names);
        }
    }
}
