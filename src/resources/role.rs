//! Shared ECS execution role.
//!
//! One role per document, independent of the service list. Every nested
//! service stack receives it as its `ECSRole` parameter.

use crate::core::template::{Resource, ResourceType, Value};
use crate::core::types::ECS_ROLE;

const READ_ONLY_ACTIONS: &[&str] = &["ec2:Describe*", "s3:Get*", "s3:List*"];

const S3_WRITE_ACTIONS: &[&str] = &["s3:PutObject", "s3:PutObject*"];

const ECS_SERVICE_ACTIONS: &[&str] = &[
    "ecs:CreateCluster",
    "ecs:DeregisterContainerInstance",
    "ecs:DiscoverPollEndpoint",
    "ecs:Poll",
    "ecs:RegisterContainerInstance",
    "ecs:StartTelemetrySession",
    "ecs:Submit*",
    "ec2:AuthorizeSecurityGroupIngress",
    "ec2:Describe*",
    "elasticloadbalancing:DeregisterInstancesFromLoadBalancer",
    "elasticloadbalancing:Describe*",
    "elasticloadbalancing:RegisterInstancesWithLoadBalancer",
];

const PACKER_ACTIONS: &[&str] = &[
    "ec2:AttachVolume",
    "ec2:CreateVolume",
    "ec2:DeleteVolume",
    "ec2:CreateKeypair",
    "ec2:DeleteKeypair",
    "ec2:CreateSecurityGroup",
    "ec2:DeleteSecurityGroup",
    "ec2:AuthorizeSecurityGroupIngress",
    "ec2:CreateImage",
    "ec2:RunInstances",
    "ec2:TerminateInstances",
    "ec2:StopInstances",
    "ec2:DescribeVolumes",
    "ec2:DetachVolume",
    "ec2:DescribeInstances",
    "ec2:CreateSnapshot",
    "ec2:DeleteSnapshot",
    "ec2:DescribeSnapshots",
    "ec2:DescribeImages",
    "ec2:RegisterImage",
    "ec2:CreateTags",
    "ec2:ModifyImageAttribute",
];

/// Inline policies attached to the role, in emission order.
pub const POLICIES: [(&str, &[&str]); 4] = [
    ("read-only", READ_ONLY_ACTIONS),
    ("s3-write", S3_WRITE_ACTIONS),
    ("ecsServiceRole", ECS_SERVICE_ACTIONS),
    ("packer", PACKER_ACTIONS),
];

fn actions(list: &[&str]) -> Value {
    Value::list(list.iter().map(|a| Value::from(*a)))
}

fn allow_all(list: &[&str]) -> Value {
    Value::map([
        ("Effect", Value::from("Allow")),
        ("Action", actions(list)),
        ("Resource", "*".into()),
    ])
}

fn policy(name: &str, list: &[&str]) -> Value {
    Value::map([
        ("PolicyName", Value::from(name)),
        (
            "PolicyDocument",
            Value::map([("Statement", Value::list([allow_all(list)]))]),
        ),
    ])
}

fn assume_role_policy() -> Value {
    let statement = Value::map([
        ("Effect", Value::from("Allow")),
        (
            "Principal",
            Value::map([("Service", Value::list([Value::from("ecs.amazonaws.com")]))]),
        ),
        ("Action", Value::list([Value::from("sts:AssumeRole")])),
    ]);
    Value::map([("Statement", Value::list([statement]))])
}

/// Build the shared `ECSRole` declaration.
pub fn declare() -> Resource {
    Resource::new(ECS_ROLE, ResourceType::IamRole)
        .property("AssumeRolePolicyDocument", assume_role_policy())
        .property("Path", "/")
        .property(
            "Policies",
            Value::list(POLICIES.iter().map(|(name, list)| policy(name, list))),
        )
}
