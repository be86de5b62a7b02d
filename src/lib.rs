//! ciinabox-services: compile service definitions into a CloudFormation
//! template.
//!
//! Each service gets a classic ELB, a Route53 alias and a nested ECS stack;
//! one shared IAM role serves them all. Generation is pure and deterministic.

pub mod cli;
pub mod core;
pub mod resources;

pub use crate::core::assembler::generate;
pub use crate::core::error::{Error, ErrorKind, Result};
