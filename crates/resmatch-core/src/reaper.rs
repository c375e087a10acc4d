//! Expiry reaper: single-pass removal of providers whose window has closed.
//!
//! A node is expired when `availability_end <= now`. Survivors keep their
//! relative order, and a second sweep at the same `now` removes nothing.

use resmatch_types::{NodeHandle, ProviderNode, RegionKey, Result, Timestamp};

use crate::registry::ProviderRegistry;

/// Unlink and release every expired node in `region`. Returns the removed
/// nodes in traversal order.
pub fn sweep_expired(
    registry: &mut ProviderRegistry,
    region: &RegionKey,
    now: Timestamp,
) -> Result<Vec<ProviderNode>> {
    let expired = expired_links(registry, region, now);
    let mut removed = Vec::with_capacity(expired.len());
    for (prev, handle) in expired {
        let node = registry.unlink(region, prev, handle)?;
        tracing::debug!(
            region = %region,
            handle = %handle,
            name = %node.name,
            end = node.availability_end,
            now,
            "Expired provider reaped"
        );
        removed.push(node);
    }

    if !removed.is_empty() {
        tracing::info!(
            region = %region,
            removed = removed.len(),
            remaining = registry.region_len(region),
            now,
            "Expiry sweep complete"
        );
    }
    Ok(removed)
}

/// `(surviving predecessor, expired node)` pairs for every expired node in
/// `region`, in traversal order.
///
/// The predecessor is the last *non-expired* node before each expired one,
/// so unlinking the pairs front to back is always valid: by the time a pair
/// is processed, its predecessor links directly to it.
#[must_use]
pub fn expired_links(
    registry: &ProviderRegistry,
    region: &RegionKey,
    now: Timestamp,
) -> Vec<(NodeHandle, NodeHandle)> {
    let mut survivor = NodeHandle::SENTINEL;
    let mut links = Vec::new();
    for node in registry.iter(region) {
        if node.is_expired(now) {
            links.push((survivor, node.handle));
        } else {
            survivor = node.handle;
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use resmatch_types::{PrincipalId, ProviderOffer};

    use super::*;

    fn sf() -> RegionKey {
        RegionKey::new("SF")
    }

    fn add(reg: &mut ProviderRegistry, name: &str, price: u64, end: Timestamp) -> NodeHandle {
        reg.insert(PrincipalId::new(), ProviderOffer::new(name, "SF", price, 0, end))
            .unwrap()
    }

    fn names(reg: &ProviderRegistry) -> Vec<String> {
        reg.iter(&sf()).map(|n| n.name.clone()).collect()
    }

    #[test]
    fn sweep_removes_expired_anywhere_in_list() {
        let mut reg = ProviderRegistry::new();
        add(&mut reg, "gone-head", 1, 10);
        add(&mut reg, "keep-1", 2, 100);
        add(&mut reg, "gone-mid-1", 3, 50);
        add(&mut reg, "gone-mid-2", 4, 50);
        add(&mut reg, "keep-2", 5, 100);
        add(&mut reg, "gone-tail", 6, 50);

        let removed = sweep_expired(&mut reg, &sf(), 50).unwrap();
        let removed: Vec<&str> = removed.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(removed, vec!["gone-head", "gone-mid-1", "gone-mid-2", "gone-tail"]);
        assert_eq!(names(&reg), vec!["keep-1", "keep-2"]);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn sweep_is_idempotent() {
        let mut reg = ProviderRegistry::new();
        add(&mut reg, "a", 1, 10);
        add(&mut reg, "b", 2, 100);

        assert_eq!(sweep_expired(&mut reg, &sf(), 10).unwrap().len(), 1);
        assert!(sweep_expired(&mut reg, &sf(), 10).unwrap().is_empty());
        assert_eq!(names(&reg), vec!["b"]);
    }

    #[test]
    fn end_equal_to_now_is_expired() {
        let mut reg = ProviderRegistry::new();
        add(&mut reg, "a", 1, 10);
        assert!(sweep_expired(&mut reg, &sf(), 9).unwrap().is_empty());
        assert_eq!(sweep_expired(&mut reg, &sf(), 10).unwrap().len(), 1);
        assert!(reg.head(&sf()).is_sentinel());
    }

    #[test]
    fn sweep_does_not_touch_other_regions() {
        let mut reg = ProviderRegistry::new();
        add(&mut reg, "a", 1, 10);
        reg.insert(PrincipalId::new(), ProviderOffer::new("n", "NYC", 1, 0, 10))
            .unwrap();
        sweep_expired(&mut reg, &sf(), 20).unwrap();
        assert_eq!(reg.region_len(&RegionKey::new("NYC")), 1);
    }

    #[test]
    fn expired_links_track_surviving_predecessor() {
        let mut reg = ProviderRegistry::new();
        let keep = add(&mut reg, "keep", 1, 100);
        let g1 = add(&mut reg, "g1", 2, 5);
        let g2 = add(&mut reg, "g2", 3, 5);
        let links = expired_links(&reg, &sf(), 5);
        assert_eq!(links, vec![(keep, g1), (keep, g2)]);
    }
}
