//! Route53 alias record pointing a subdomain at the service ELB.

use crate::core::template::{Resource, ResourceType, Value};
use crate::core::types::ResolvedService;

/// Fully qualified record name, e.g. `api.example.com.`.
pub fn record_name(prefix: &str, dns_domain: &str) -> String {
    format!("{}.{}.", prefix, dns_domain)
}

/// Build the `<name>DNS` declaration. The alias target is read from the
/// load balancer's outputs at deploy time.
pub fn declare(service: &ResolvedService, dns_domain: &str) -> Resource {
    let lb = service.load_balancer_id();
    Resource::new(service.dns_record_id(), ResourceType::RecordSet)
        .property(
            "HostedZoneName",
            Value::concat(vec![dns_domain.into(), ".".into()]),
        )
        .property(
            "Name",
            Value::concat(vec![
                service.subdomain_prefix.as_str().into(),
                ".".into(),
                dns_domain.into(),
                ".".into(),
            ]),
        )
        .property("Type", "A")
        .property(
            "AliasTarget",
            Value::map([
                ("DNSName", Value::get_att(lb.as_str(), "DNSName")),
                (
                    "HostedZoneId",
                    Value::get_att(lb.as_str(), "CanonicalHostedZoneNameID"),
                ),
            ]),
        )
}
