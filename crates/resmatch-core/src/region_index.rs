//! Region key -> head handle of that region's provider list.
//!
//! An absent entry and an entry pointing at the sentinel mean the same
//! thing; the index never stores sentinel heads.

use std::collections::BTreeMap;

use resmatch_types::{NodeHandle, RegionKey};

#[derive(Debug, Clone, Default)]
pub struct RegionIndex {
    heads: BTreeMap<RegionKey, NodeHandle>,
}

impl RegionIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Head of `region`'s list, or the sentinel if the region is empty.
    #[must_use]
    pub fn head(&self, region: &RegionKey) -> NodeHandle {
        self.heads.get(region).copied().unwrap_or(NodeHandle::SENTINEL)
    }

    /// Point `region` at a new head. A sentinel head drops the entry.
    pub fn set_head(&mut self, region: &RegionKey, head: NodeHandle) {
        if head.is_sentinel() {
            self.heads.remove(region);
        } else {
            self.heads.insert(region.clone(), head);
        }
    }

    /// Regions with at least one provider, in key order.
    pub fn regions(&self) -> impl Iterator<Item = &RegionKey> {
        self.heads.keys()
    }
}
