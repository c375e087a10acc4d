//! Append-only match ledger, one sequence per principal.
//!
//! Records are never overwritten or removed. Reading index `i` returns the
//! same record for as long as the ledger lives; reading past the end fails
//! with [`ResmatchError::IndexOutOfRange`].

use std::collections::BTreeMap;

use resmatch_types::{MatchRecord, PrincipalId, ResmatchError, Result};

#[derive(Debug, Clone, Default)]
pub struct MatchLedger {
    records: BTreeMap<PrincipalId, Vec<MatchRecord>>,
}

impl MatchLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record` under `principal`. Returns its index.
    pub fn append(&mut self, principal: PrincipalId, record: MatchRecord) -> usize {
        let entries = self.records.entry(principal).or_default();
        entries.push(record);
        entries.len() - 1
    }

    /// The record at `index` in `principal`'s sequence.
    pub fn get(&self, principal: &PrincipalId, index: usize) -> Result<&MatchRecord> {
        let entries = self.records.get(principal).map_or(&[][..], Vec::as_slice);
        entries.get(index).ok_or(ResmatchError::IndexOutOfRange {
            index,
            count: entries.len(),
        })
    }

    /// Number of records for `principal`.
    #[must_use]
    pub fn count(&self, principal: &PrincipalId) -> usize {
        self.records.get(principal).map_or(0, Vec::len)
    }

    /// All records for `principal`, oldest first.
    #[must_use]
    pub fn records(&self, principal: &PrincipalId) -> &[MatchRecord] {
        self.records.get(principal).map_or(&[][..], Vec::as_slice)
    }

    /// Every `(principal, records)` pair, in principal order.
    pub fn iter(&self) -> impl Iterator<Item = (&PrincipalId, &[MatchRecord])> {
        self.records.iter().map(|(p, r)| (p, r.as_slice()))
    }

    /// Total records across all principals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
