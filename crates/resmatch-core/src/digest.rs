//! Deterministic state fingerprints.
//!
//! Two marketplaces holding the same provider lists and ledgers produce the
//! same digest. Used to check that a failed operation left state untouched
//! and to compare replicas fed the same operation log.

use resmatch_types::{MatchRecord, NodeHandle, ProviderNode};
use sha2::{Digest, Sha256};

use crate::ledger::MatchLedger;
use crate::registry::ProviderRegistry;

/// Hash of every region list (in region key order, head to tail) followed
/// by every ledger (in principal order, oldest record first).
#[must_use]
pub fn compute_state_digest(registry: &ProviderRegistry, ledgers: &[&MatchLedger]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"resmatch:state:v1:");

    for region in registry.regions() {
        hasher.update(b"region:");
        hash_str(&mut hasher, region.as_str());
        for node in registry.iter(region) {
            hash_node(&mut hasher, node);
        }
    }

    for ledger in ledgers {
        hasher.update(b"ledger:");
        for (principal, records) in ledger.iter() {
            hasher.update(principal.0.as_bytes());
            hasher.update((records.len() as u64).to_le_bytes());
            for record in records {
                hash_record(&mut hasher, record);
            }
        }
    }

    finish(hasher)
}

/// Hash of one principal's ledger sequence.
#[must_use]
pub fn compute_ledger_root(records: &[MatchRecord]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"resmatch:ledger:v1:");
    hasher.update((records.len() as u64).to_le_bytes());
    for record in records {
        hash_record(&mut hasher, record);
    }
    finish(hasher)
}

fn finish(hasher: Sha256) -> [u8; 32] {
    let result = hasher.finalize();
    let mut root = [0u8; 32];
    root.copy_from_slice(&result);
    root
}

fn hash_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn hash_handle(hasher: &mut Sha256, handle: NodeHandle) {
    hasher.update(handle.index().to_le_bytes());
    hasher.update(handle.generation().to_le_bytes());
}

fn hash_node(hasher: &mut Sha256, node: &ProviderNode) {
    hash_handle(hasher, node.handle);
    hash_handle(hasher, node.next);
    hash_str(hasher, &node.name);
    hasher.update(node.owner.0.as_bytes());
    hasher.update(node.price.to_le_bytes());
    hasher.update(node.availability_start.to_le_bytes());
    hasher.update(node.availability_end.to_le_bytes());
}

fn hash_record(hasher: &mut Sha256, record: &MatchRecord) {
    hash_str(hasher, &record.provider_name);
    hash_handle(hasher, record.provider_handle);
    hasher.update(record.provider_owner.0.as_bytes());
    hash_str(hasher, &record.consumer_name);
    hasher.update(record.consumer.0.as_bytes());
    hash_str(hasher, record.region.as_str());
    hasher.update(record.price.to_le_bytes());
    hasher.update(record.start.to_le_bytes());
    hasher.update(record.duration.to_le_bytes());
    hasher.update(record.matched_at.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use resmatch_types::{PrincipalId, ProviderOffer, RegionKey};

    use super::*;

    fn record(consumer: PrincipalId, start: u64) -> MatchRecord {
        MatchRecord {
            provider_name: "p".to_string(),
            provider_handle: NodeHandle::new(0, 0),
            provider_owner: PrincipalId::from_bytes([1; 16]),
            consumer_name: "c".to_string(),
            consumer,
            region: RegionKey::new("SF"),
            price: 1,
            start,
            duration: 10,
            matched_at: 0,
        }
    }

    #[test]
    fn empty_state_is_stable() {
        let reg = ProviderRegistry::new();
        let ledger = MatchLedger::new();
        assert_eq!(
            compute_state_digest(&reg, &[&ledger]),
            compute_state_digest(&reg, &[&ledger])
        );
    }

    #[test]
    fn same_inserts_same_digest() {
        let owner = PrincipalId::from_bytes([7; 16]);
        let build = || {
            let mut reg = ProviderRegistry::new();
            reg.insert(owner, ProviderOffer::dummy(2, 0, 10)).unwrap();
            reg.insert(owner, ProviderOffer::dummy(1, 0, 10)).unwrap();
            reg
        };
        let ledger = MatchLedger::new();
        assert_eq!(
            compute_state_digest(&build(), &[&ledger]),
            compute_state_digest(&build(), &[&ledger])
        );
    }

    #[test]
    fn window_change_changes_digest() {
        let owner = PrincipalId::from_bytes([7; 16]);
        let mut reg = ProviderRegistry::new();
        let h = reg.insert(owner, ProviderOffer::dummy(1, 0, 10)).unwrap();
        let ledger = MatchLedger::new();
        let before = compute_state_digest(&reg, &[&ledger]);
        reg.get_mut(h).unwrap().availability_start = 5;
        assert_ne!(before, compute_state_digest(&reg, &[&ledger]));
    }

    #[test]
    fn ledger_root_depends_on_order() {
        let c = PrincipalId::from_bytes([2; 16]);
        let a = record(c, 1);
        let b = record(c, 2);
        assert_ne!(
            compute_ledger_root(&[a.clone(), b.clone()]),
            compute_ledger_root(&[b, a])
        );
    }

    #[test]
    fn ledger_append_changes_state_digest() {
        let reg = ProviderRegistry::new();
        let mut ledger = MatchLedger::new();
        let before = compute_state_digest(&reg, &[&ledger]);
        let c = PrincipalId::from_bytes([2; 16]);
        ledger.append(c, record(c, 1));
        assert_ne!(before, compute_state_digest(&reg, &[&ledger]));
    }
}
