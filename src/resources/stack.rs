//! Nested stack holding the service's ECS task definition and service.

use crate::core::template::{Resource, ResourceType, Value};
use crate::core::types::{GlobalParameters, ResolvedService, ECS_CLUSTER, ECS_ROLE};

pub const TIMEOUT_IN_MINUTES: i64 = 5;

/// Object key of the published service template inside `source_bucket`.
pub fn artifact_key(ciinabox_version: &str, service_name: &str) -> String {
    format!("ciinabox/{}/services/{}.json", ciinabox_version, service_name)
}

/// Regional S3 URL of the nested template.
pub fn template_url(globals: &GlobalParameters, service_name: &str) -> Value {
    Value::concat(vec![
        "https://s3-".into(),
        Value::reference("AWS::Region"),
        format!(
            ".amazonaws.com/{}/{}",
            globals.source_bucket,
            artifact_key(&globals.ciinabox_version, service_name)
        )
        .into(),
    ])
}

/// Build the `<name>Stack` declaration.
pub fn declare(service: &ResolvedService, globals: &GlobalParameters) -> Resource {
    Resource::new(service.stack_id(), ResourceType::Stack)
        .property("TemplateURL", template_url(globals, &service.name))
        .property("TimeoutInMinutes", TIMEOUT_IN_MINUTES)
        .property(
            "Parameters",
            Value::map([
                ("ECSCluster", Value::reference(ECS_CLUSTER)),
                ("ECSRole", Value::reference(ECS_ROLE)),
                ("ServiceELB", Value::reference(service.load_balancer_id())),
            ]),
        )
}
