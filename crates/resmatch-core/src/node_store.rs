//! Arena storage for provider nodes.
//!
//! Slots are addressed by [`NodeHandle`]s. Releasing a slot bumps its
//! generation, so every handle issued for the previous occupant stops
//! resolving. Freed slots are reused LIFO.

use resmatch_types::{NodeHandle, ProviderNode};

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    node: Option<ProviderNode>,
}

/// Owns every live provider node. No ordering or linkage policy.
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl NodeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle the next [`Self::insert`] will return.
    #[must_use]
    pub fn next_handle(&self) -> NodeHandle {
        match self.free.last() {
            Some(&index) => NodeHandle::new(index, self.slots[index as usize].generation),
            None => NodeHandle::new(self.slot_count(), 0),
        }
    }

    /// Store a node built for its own handle. `build` receives the handle
    /// the node will live under.
    pub fn insert(&mut self, build: impl FnOnce(NodeHandle) -> ProviderNode) -> NodeHandle {
        let handle = self.next_handle();
        let node = build(handle);
        match self.free.pop() {
            Some(index) => self.slots[index as usize].node = Some(node),
            None => self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            }),
        }
        self.live += 1;
        handle
    }

    #[must_use]
    pub fn get(&self, handle: NodeHandle) -> Option<&ProviderNode> {
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut ProviderNode> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.node.as_mut()
    }

    /// Remove a node and invalidate its handle. Returns the node, or `None`
    /// if the handle was already stale.
    pub fn release(&mut self, handle: NodeHandle) -> Option<ProviderNode> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        let node = slot.node.take()?;
        // A slot whose generation would reach the sentinel's is retired
        // rather than recycled.
        slot.generation = slot.generation.wrapping_add(1);
        if slot.generation != NodeHandle::SENTINEL.generation() {
            self.free.push(handle.index());
        }
        self.live -= 1;
        Some(node)
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    #[allow(clippy::cast_possible_truncation)]
    fn slot_count(&self) -> u32 {
        self.slots.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use resmatch_types::{PrincipalId, ProviderOffer};

    use super::*;

    fn put(store: &mut NodeStore, price: u64) -> NodeHandle {
        store.insert(|h| {
            ProviderNode::from_offer(h, PrincipalId::new(), ProviderOffer::dummy(price, 1, 2))
        })
    }

    #[test]
    fn insert_and_get() {
        let mut store = NodeStore::new();
        let h = put(&mut store, 7);
        let node = store.get(h).unwrap();
        assert_eq!(node.price, 7);
        assert_eq!(node.handle, h, "node must carry its own handle");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn release_invalidates_handle() {
        let mut store = NodeStore::new();
        let h = put(&mut store, 1);
        assert!(store.release(h).is_some());
        assert!(store.get(h).is_none());
        assert!(store.release(h).is_none(), "double release is a no-op");
        assert!(store.is_empty());
    }

    #[test]
    fn reused_slot_gets_new_generation() {
        let mut store = NodeStore::new();
        let old = put(&mut store, 1);
        store.release(old);
        let new = put(&mut store, 2);
        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert!(store.get(old).is_none(), "stale handle must not alias");
        assert_eq!(store.get(new).unwrap().price, 2);
    }

    #[test]
    fn next_handle_predicts_insert() {
        let mut store = NodeStore::new();
        let predicted = store.next_handle();
        assert_eq!(put(&mut store, 1), predicted);
        let a = put(&mut store, 2);
        store.release(a);
        let predicted = store.next_handle();
        assert_eq!(put(&mut store, 3), predicted);
    }

    #[test]
    fn sentinel_never_resolves() {
        let mut store = NodeStore::new();
        put(&mut store, 1);
        assert!(store.get(NodeHandle::SENTINEL).is_none());
        assert!(store.get_mut(NodeHandle::SENTINEL).is_none());
    }
}
