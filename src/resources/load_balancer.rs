//! Classic ELB in front of one ECS service.

use crate::core::template::{Resource, ResourceType, Value};
use crate::core::types::{
    ResolvedService, SECURITY_GROUP_BACKPLANE, SECURITY_GROUP_DEV, SECURITY_GROUP_OPS,
    SUBNET_PUBLIC_A, SUBNET_PUBLIC_B,
};

pub const HTTP_PORT: &str = "80";
pub const HTTPS_PORT: &str = "443";

pub const HEALTHY_THRESHOLD: u32 = 3;
pub const UNHEALTHY_THRESHOLD: u32 = 2;
pub const HEALTH_CHECK_INTERVAL_SECS: u32 = 15;
pub const HEALTH_CHECK_TIMEOUT_SECS: u32 = 5;

// ELB rejects a health check whose timeout is not below its interval.
const _: () = assert!(HEALTH_CHECK_TIMEOUT_SECS < HEALTH_CHECK_INTERVAL_SECS);

const SECURITY_GROUPS: [&str; 3] = [
    SECURITY_GROUP_BACKPLANE,
    SECURITY_GROUP_OPS,
    SECURITY_GROUP_DEV,
];

const PUBLIC_SUBNETS: [&str; 2] = [SUBNET_PUBLIC_A, SUBNET_PUBLIC_B];

/// HTTP listener always; HTTPS listener iff the service resolved a certificate.
pub fn listeners(service: &ResolvedService) -> Vec<Value> {
    let mut out = vec![Value::map([
        ("LoadBalancerPort", Value::from(HTTP_PORT)),
        ("InstancePort", service.service_port.into()),
        ("Protocol", "HTTP".into()),
    ])];
    if let Some(ref cert) = service.https_certificate {
        out.push(Value::map([
            ("LoadBalancerPort", Value::from(HTTPS_PORT)),
            ("InstancePort", service.service_port.into()),
            ("Protocol", "HTTPS".into()),
            ("SSLCertificateId", cert.as_str().into()),
        ]));
    }
    out
}

/// TCP health check against the service port.
pub fn health_check(port: u16) -> Value {
    Value::map([
        ("Target", Value::from(format!("TCP:{}", port))),
        ("HealthyThreshold", HEALTHY_THRESHOLD.to_string().into()),
        ("UnhealthyThreshold", UNHEALTHY_THRESHOLD.to_string().into()),
        ("Interval", HEALTH_CHECK_INTERVAL_SECS.to_string().into()),
        ("Timeout", HEALTH_CHECK_TIMEOUT_SECS.to_string().into()),
    ])
}

fn refs(names: &[&str]) -> Value {
    Value::list(names.iter().map(|n| Value::reference(*n)))
}

/// Build the `<name>LB` declaration.
pub fn declare(service: &ResolvedService) -> Resource {
    Resource::new(service.load_balancer_id(), ResourceType::LoadBalancer)
        .property("Listeners", Value::List(listeners(service)))
        .property("HealthCheck", health_check(service.service_port))
        .property("CrossZone", true)
        .property("SecurityGroups", refs(&SECURITY_GROUPS))
        .property("Subnets", refs(&PUBLIC_SUBNETS))
}
