//! The provider registry: one price-sorted singly-linked list per region.
//!
//! Nodes live in a [`NodeStore`]; each region's head lives in a
//! [`RegionIndex`]. Traversing a region from its head visits providers in
//! non-decreasing price order, equal prices in insertion order, and ends at
//! [`NodeHandle::SENTINEL`].
//!
//! ```text
//! head(SF) -> [p=1] -> [p=2] -> [p=2] -> [p=4] -> SENTINEL
//! ```

use resmatch_types::{
    NodeHandle, PrincipalId, ProviderNode, ProviderOffer, RegionKey, ResmatchError, Result,
};

use crate::node_store::NodeStore;
use crate::region_index::RegionIndex;

/// Region-partitioned sorted provider lists.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    store: NodeStore,
    index: RegionIndex,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =================================================================
    // Insertion
    // =================================================================

    /// Validate `offer` and link a new node into its region after every
    /// node whose price is `<=` the offer's price.
    pub fn insert(&mut self, owner: PrincipalId, offer: ProviderOffer) -> Result<NodeHandle> {
        offer.validate()?;

        let region = offer.region.clone();
        let price = offer.price;
        let (prev, next) = self.insertion_point(&region, price);

        let handle = self.store.insert(|handle| {
            let mut node = ProviderNode::from_offer(handle, owner, offer);
            node.next = next;
            node
        });
        self.set_next(&region, prev, handle)?;

        tracing::debug!(
            region = %region,
            handle = %handle,
            price,
            after = %prev,
            "Provider linked"
        );
        Ok(handle)
    }

    /// `(prev, next)` such that a node of `price` belongs between them.
    /// `prev` is the sentinel when the node becomes the new head.
    fn insertion_point(&self, region: &RegionKey, price: u64) -> (NodeHandle, NodeHandle) {
        let mut prev = NodeHandle::SENTINEL;
        let mut cursor = self.index.head(region);
        while let Some(node) = self.store.get(cursor) {
            if node.price > price {
                break;
            }
            prev = cursor;
            cursor = node.next;
        }
        (prev, cursor)
    }

    // =================================================================
    // Removal
    // =================================================================

    /// Unlink `handle` from `region` and release it. `prev` is the node
    /// currently linking to `handle`, or the sentinel if `handle` is the head.
    pub fn unlink(
        &mut self,
        region: &RegionKey,
        prev: NodeHandle,
        handle: NodeHandle,
    ) -> Result<ProviderNode> {
        let node = self.get(handle)?;
        if node.region != *region {
            return Err(ResmatchError::CorruptList {
                reason: format!("{handle} belongs to region {}, not {region}", node.region),
            });
        }
        let next = node.next;

        let linked_from = match prev.live() {
            None => self.index.head(region),
            Some(prev) => self.get(prev)?.next,
        };
        if linked_from != handle {
            return Err(ResmatchError::CorruptList {
                reason: format!("{prev} does not link to {handle} in region {region}"),
            });
        }

        self.set_next(region, prev, next)?;
        self.store.release(handle).ok_or(ResmatchError::NotFound(handle))
    }

    /// Discard every node in `region`. Returns how many were released.
    pub fn reset(&mut self, region: &RegionKey) -> usize {
        let handles: Vec<NodeHandle> = self.iter(region).map(|n| n.handle).collect();
        for handle in &handles {
            self.store.release(*handle);
        }
        self.index.set_head(region, NodeHandle::SENTINEL);
        handles.len()
    }

    /// Point `prev` (or the region head, if `prev` is the sentinel) at `next`.
    fn set_next(&mut self, region: &RegionKey, prev: NodeHandle, next: NodeHandle) -> Result<()> {
        match prev.live() {
            None => self.index.set_head(region, next),
            Some(prev) => {
                self.store
                    .get_mut(prev)
                    .ok_or(ResmatchError::NotFound(prev))?
                    .next = next;
            }
        }
        Ok(())
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Head of `region`'s list, or the sentinel.
    #[must_use]
    pub fn head(&self, region: &RegionKey) -> NodeHandle {
        self.index.head(region)
    }

    /// The live node behind `handle`.
    pub fn get(&self, handle: NodeHandle) -> Result<&ProviderNode> {
        self.store.get(handle).ok_or(ResmatchError::NotFound(handle))
    }

    /// Mutable access to a live node. Callers must not touch `next`,
    /// `price` or `region`: those fields carry the list invariant.
    pub(crate) fn get_mut(&mut self, handle: NodeHandle) -> Result<&mut ProviderNode> {
        self.store
            .get_mut(handle)
            .ok_or(ResmatchError::NotFound(handle))
    }

    /// Walk `region` from head to tail.
    #[must_use]
    pub fn iter(&self, region: &RegionKey) -> RegionIter<'_> {
        RegionIter {
            store: &self.store,
            cursor: self.index.head(region),
        }
    }

    /// Owned copy of `region`'s list in traversal order.
    #[must_use]
    pub fn snapshot(&self, region: &RegionKey) -> Vec<ProviderNode> {
        self.iter(region).cloned().collect()
    }

    #[must_use]
    pub fn region_len(&self, region: &RegionKey) -> usize {
        self.iter(region).count()
    }

    /// Regions with at least one provider, in key order.
    pub fn regions(&self) -> impl Iterator<Item = &RegionKey> {
        self.index.regions()
    }

    /// Total live providers across all regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

/// Iterator over one region's list, head first.
#[derive(Debug, Clone)]
pub struct RegionIter<'a> {
    store: &'a NodeStore,
    cursor: NodeHandle,
}

impl<'a> Iterator for RegionIter<'a> {
    type Item = &'a ProviderNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.store.get(self.cursor)?;
        self.cursor = node.next;
        Some(node)
    }
}
