//! Resource builders: one module per CloudFormation resource kind.

pub mod dns;
pub mod load_balancer;
pub mod role;
pub mod stack;
