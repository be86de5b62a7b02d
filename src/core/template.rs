//! CloudFormation document model.
//!
//! Declarations are plain immutable values. Cross-resource wiring is kept as
//! tagged [`Value`] variants (`Ref`, `GetAtt`, `Join`) rather than strings, so
//! the assembler can walk them and prove every target is declared. All maps
//! are `IndexMap`; JSON key order is insertion order.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

pub const FORMAT_VERSION: &str = "2010-09-09";

/// Pseudo parameters the deployment engine always provides.
pub const PSEUDO_PARAMETERS: [&str; 8] = [
    "AWS::AccountId",
    "AWS::NotificationARNs",
    "AWS::NoValue",
    "AWS::Partition",
    "AWS::Region",
    "AWS::StackId",
    "AWS::StackName",
    "AWS::URLSuffix",
];

// ============================================================================
// Values
// ============================================================================

/// A property value, literal or deferred to deploy time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Integer(i64),
    Bool(bool),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    /// `{"Ref": target}`
    Ref(String),
    /// `{"Fn::GetAtt": [target, attribute]}`
    GetAtt { target: String, attribute: String },
    /// `{"Fn::Join": [delimiter, parts]}`
    Join { delimiter: String, parts: Vec<Value> },
}

impl Value {
    pub fn reference(target: impl Into<String>) -> Self {
        Self::Ref(target.into())
    }

    pub fn get_att(target: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::GetAtt {
            target: target.into(),
            attribute: attribute.into(),
        }
    }

    /// `Fn::Join` with an empty delimiter, the only form the templates use.
    pub fn concat(parts: Vec<Value>) -> Self {
        Self::Join {
            delimiter: String::new(),
            parts,
        }
    }

    /// Build a map from `(key, value)` pairs, preserving order.
    pub fn map<'a>(entries: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Every deferred reference inside this value, depth first.
    pub fn references(&self) -> Vec<Reference<'_>> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<Reference<'a>>) {
        match self {
            Self::Ref(target) => out.push(Reference::Ref(target)),
            Self::GetAtt { target, attribute } => out.push(Reference::Attribute {
                target,
                attribute,
            }),
            Self::Join { parts, .. } | Self::List(parts) => {
                for p in parts {
                    p.collect_references(out);
                }
            }
            Self::Map(m) => {
                for v in m.values() {
                    v.collect_references(out);
                }
            }
            Self::String(_) | Self::Integer(_) | Self::Bool(_) => {}
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<u16> for Value {
    fn from(n: u16) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String(s) => serializer.serialize_str(s),
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(m) => m.serialize(serializer),
            Self::Ref(target) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", target)?;
                map.end()
            }
            Self::GetAtt { target, attribute } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &[target, attribute])?;
                map.end()
            }
            Self::Join { delimiter, parts } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Join", &(delimiter, parts))?;
                map.end()
            }
        }
    }
}

/// A deferred pointer found inside a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference<'a> {
    /// `Ref` to a parameter, resource or pseudo parameter.
    Ref(&'a str),
    /// `Fn::GetAtt` of a resource output.
    Attribute { target: &'a str, attribute: &'a str },
}

impl<'a> Reference<'a> {
    pub fn target(&self) -> &'a str {
        match *self {
            Self::Ref(t) => t,
            Self::Attribute { target, .. } => target,
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// CloudFormation resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    IamRole,
    LoadBalancer,
    RecordSet,
    Stack,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IamRole => "AWS::IAM::Role",
            Self::LoadBalancer => "AWS::ElasticLoadBalancing::LoadBalancer",
            Self::RecordSet => "AWS::Route53::RecordSet",
            Self::Stack => "AWS::CloudFormation::Stack",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ResourceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A top-level input parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    #[serde(rename = "Type")]
    pub param_type: String,
}

impl Parameter {
    pub fn string() -> Self {
        Self {
            param_type: "String".to_string(),
        }
    }
}

/// One typed resource declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    #[serde(skip)]
    pub logical_id: String,

    #[serde(rename = "Type")]
    pub resource_type: ResourceType,

    #[serde(rename = "Properties")]
    pub properties: IndexMap<String, Value>,
}

impl Resource {
    pub fn new(logical_id: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            logical_id: logical_id.into(),
            resource_type,
            properties: IndexMap::new(),
        }
    }

    /// Add a property, builder style.
    pub fn property(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }

    /// Every reference held by this declaration's properties.
    pub fn references(&self) -> Vec<Reference<'_>> {
        self.properties
            .values()
            .flat_map(Value::references)
            .collect()
    }
}

/// The per-service declarations, linked by logical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFamily {
    pub service: String,
    pub load_balancer: Resource,
    pub dns_record: Resource,
    pub stack: Resource,
}

impl ResourceFamily {
    /// Declarations in emission order.
    pub fn resources(&self) -> [&Resource; 3] {
        [&self.load_balancer, &self.dns_record, &self.stack]
    }

    pub fn into_resources(self) -> [Resource; 3] {
        [self.load_balancer, self.dns_record, self.stack]
    }
}

// ============================================================================
// Document
// ============================================================================

/// The assembled output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,

    #[serde(rename = "Description")]
    pub description: String,

    #[serde(rename = "Parameters")]
    pub parameters: IndexMap<String, Parameter>,

    #[serde(rename = "Resources")]
    pub resources: IndexMap<String, Resource>,
}

impl Template {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            description: description.into(),
            parameters: IndexMap::new(),
            resources: IndexMap::new(),
        }
    }

    /// Whether `name` is declared as a parameter or a resource.
    pub fn declares(&self, name: &str) -> bool {
        self.parameters.contains_key(name) || self.resources.contains_key(name)
    }

    /// Render as JSON.
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}
