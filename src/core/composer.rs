//! Per-service resource composition: dispatch to resource builders.
//!
//! Each resolved service produces three declarations:
//! - `<name>LB`: load balancer with the service's listeners
//! - `<name>DNS`: alias record reading the LB's DNS outputs
//! - `<name>Stack`: nested ECS stack wired to the cluster, role and LB
//!
//! Logical IDs derive from the service name only, so services with distinct
//! names never collide. Cross-service checks belong to the assembler.

use super::template::ResourceFamily;
use super::types::{GlobalParameters, ResolvedService};
use crate::resources::{dns, load_balancer, stack};

/// Build the resource family for one service.
pub fn compose(service: &ResolvedService, globals: &GlobalParameters) -> ResourceFamily {
    let load_balancer = load_balancer::declare(service);
    let dns_record = dns::declare(service, &globals.dns_domain);
    let stack = stack::declare(service, globals);

    tracing::debug!(
        service = %service.name,
        load_balancer = %load_balancer.logical_id,
        dns = %dns_record.logical_id,
        stack = %stack.logical_id,
        "composed resource family"
    );

    ResourceFamily {
        service: service.name.clone(),
        load_balancer,
        dns_record,
        stack,
    }
}

/// Compose every service, preserving input order.
pub fn compose_all(services: &[ResolvedService], globals: &GlobalParameters) -> Vec<ResourceFamily> {
    services.iter().map(|s| compose(s, globals)).collect()
}

/// Compose on scoped worker threads, `chunk` services per thread.
///
/// Results are merged back in input order, so the output is identical to
/// [`compose_all`].
pub fn compose_parallel(
    services: &[ResolvedService],
    globals: &GlobalParameters,
    chunk: usize,
) -> Vec<ResourceFamily> {
    let chunk = chunk.max(1);
    if services.len() <= chunk {
        return compose_all(services, globals);
    }
    std::thread::scope(|scope| {
        let handles: Vec<_> = services
            .chunks(chunk)
            .map(|part| scope.spawn(move || compose_all(part, globals)))
            .collect();
        handles
            .into_iter()
            .flat_map(|h| match h.join() {
                Ok(families) => families,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}
