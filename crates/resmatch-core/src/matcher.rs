//! Exact-tier matching of consumer requests against a region's providers.
//!
//! Matching runs in two steps so a failed request never mutates anything:
//!
//! ```text
//! plan_match(&registry, request, now)  -> MatchPlan   (read-only)
//! commit_match(&mut registry, plan, ..) -> MatchOutcome
//! ```
//!
//! ## Selection
//!
//! The region list is walked in ascending price. The first node with
//! `price == request.price` whose window can hold the job is selected: the
//! job, accepted at `now`, must finish by both `availability_end` and the
//! request's deadline. Walking stops as soon as prices exceed the requested
//! tier.
//!
//! ## Lazy eviction
//!
//! Expired nodes passed on the way to the selected provider are staged in
//! the plan and unlinked on commit. If no provider is found the plan is
//! never built, so they stay put until the next sweep.

use resmatch_types::{
    ConsumerRequest, MatchRecord, NodeHandle, PrincipalId, ProviderNode, RegionKey, ResmatchError,
    Result, Timestamp,
};

use crate::registry::ProviderRegistry;

/// Everything `commit_match` needs, computed without mutating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPlan {
    pub region: RegionKey,
    /// The provider that will serve the request.
    pub selected: NodeHandle,
    /// Last surviving node before `selected`, or the sentinel.
    pub selected_prev: NodeHandle,
    /// `(surviving predecessor, expired node)` pairs passed during the walk.
    pub evictions: Vec<(NodeHandle, NodeHandle)>,
}

/// Result of a committed match.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub record: MatchRecord,
    /// The provider's window was used up and it left the list.
    pub retired: bool,
    /// Expired providers unlinked on the way.
    pub evicted: Vec<ProviderNode>,
}

/// Validate `request` and find the provider that would serve it.
pub fn plan_match(
    registry: &ProviderRegistry,
    request: &ConsumerRequest,
    now: Timestamp,
) -> Result<MatchPlan> {
    request.validate(now)?;

    let mut survivor = NodeHandle::SENTINEL;
    let mut evictions = Vec::new();
    for node in registry.iter(&request.region) {
        if node.price > request.price {
            break;
        }
        if node.is_expired(now) {
            evictions.push((survivor, node.handle));
            continue;
        }
        if node.price == request.price && node.can_serve(now, request.duration, request.deadline)
        {
            return Ok(MatchPlan {
                region: request.region.clone(),
                selected: node.handle,
                selected_prev: survivor,
                evictions,
            });
        }
        survivor = node.handle;
    }

    Err(ResmatchError::NoEligibleProvider {
        region: request.region.clone(),
        price: request.price,
    })
}

/// Apply a plan built against the registry's current state.
///
/// Evicts staged expired nodes, records the match at the provider's current
/// `availability_start`, then advances that start by the job's duration plus
/// `match_buffer`. A provider with no window left is retired.
pub fn commit_match(
    registry: &mut ProviderRegistry,
    plan: MatchPlan,
    consumer: PrincipalId,
    request: &ConsumerRequest,
    now: Timestamp,
    match_buffer: u64,
) -> Result<MatchOutcome> {
    let MatchPlan {
        region,
        selected,
        selected_prev,
        evictions,
    } = plan;

    let mut evicted = Vec::with_capacity(evictions.len());
    for (prev, handle) in evictions {
        evicted.push(registry.unlink(&region, prev, handle)?);
    }

    let node = registry.get_mut(selected)?;
    let record = MatchRecord {
        provider_name: node.name.clone(),
        provider_handle: selected,
        provider_owner: node.owner,
        consumer_name: request.name.clone(),
        consumer,
        region: region.clone(),
        price: node.price,
        start: node.availability_start,
        duration: request.duration,
        matched_at: now,
    };
    node.availability_start = node
        .availability_start
        .saturating_add(request.duration)
        .saturating_add(match_buffer);
    let next_start = node.availability_start;
    let retired = next_start >= node.availability_end;

    if retired {
        registry.unlink(&region, selected_prev, selected)?;
    }

    tracing::debug!(
        region = %region,
        provider = %selected,
        consumer = %consumer,
        price = record.price,
        start = record.start,
        duration = record.duration,
        next_start,
        retired,
        evicted = evicted.len(),
        "Consumer matched"
    );

    Ok(MatchOutcome {
        record,
        retired,
        evicted,
    })
}
