//! The marketplace facade.
//!
//! [`Marketplace`] owns the provider registry, both match ledgers, the
//! configuration and a clock, and exposes the full operation surface.
//!
//! # Atomicity Contract
//!
//! Every mutating operation reads "now" exactly once (or takes it via the
//! `*_at` variant), validates and stages everything it needs, and only then
//! mutates. An operation that returns `Err` leaves the marketplace exactly
//! as it found it; [`Marketplace::state_digest`] is unchanged.

use resmatch_types::{
    Clock, ConsumerRequest, MarketConfig, MatchRecord, NodeHandle, PrincipalId, ProviderNode,
    ProviderOffer, RegionKey, Result, SystemClock, Timestamp,
};
use serde::{Deserialize, Serialize};

use crate::digest::compute_state_digest;
use crate::ledger::MatchLedger;
use crate::matcher::{commit_match, plan_match};
use crate::reaper::sweep_expired;
use crate::registry::ProviderRegistry;

/// One region's provider list, head first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSnapshot {
    pub region: RegionKey,
    pub providers: Vec<ProviderNode>,
}

/// Region-partitioned resource marketplace.
#[derive(Debug, Clone)]
pub struct Marketplace<C = SystemClock> {
    config: MarketConfig,
    default_region: RegionKey,
    registry: ProviderRegistry,
    /// Matches keyed by the consumer that requested them.
    consumer_ledger: MatchLedger,
    /// The same matches keyed by the owner of the provider that served them.
    provider_ledger: MatchLedger,
    clock: C,
}

impl Marketplace<SystemClock> {
    /// A marketplace on wall-clock time.
    pub fn new(config: MarketConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Marketplace<C> {
    /// A marketplace reading time from `clock`.
    pub fn with_clock(config: MarketConfig, clock: C) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            match_buffer_secs = config.match_buffer_secs,
            default_region = %config.default_region,
            sweep_on_insert = config.sweep_on_insert,
            "Marketplace created"
        );
        Ok(Self {
            default_region: config.default_region_key(),
            config,
            registry: ProviderRegistry::new(),
            consumer_ledger: MatchLedger::new(),
            provider_ledger: MatchLedger::new(),
            clock,
        })
    }

    #[must_use]
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    // =================================================================
    // Providers
    // =================================================================

    /// Register a provider offer owned by `owner`. Returns its handle.
    pub fn add_provider(&mut self, owner: PrincipalId, offer: ProviderOffer) -> Result<NodeHandle> {
        let now = self.clock.now();
        self.add_provider_at(owner, offer, now)
    }

    pub fn add_provider_at(
        &mut self,
        owner: PrincipalId,
        offer: ProviderOffer,
        now: Timestamp,
    ) -> Result<NodeHandle> {
        offer.validate()?;
        if self.config.sweep_on_insert {
            sweep_expired(&mut self.registry, &offer.region, now)?;
        }
        self.registry.insert(owner, offer)
    }

    /// Remove every expired provider from `region`. Returns how many left.
    pub fn remove_expired_providers(&mut self, region: &RegionKey) -> Result<usize> {
        let now = self.clock.now();
        self.remove_expired_providers_at(region, now)
    }

    pub fn remove_expired_providers_at(
        &mut self,
        region: &RegionKey,
        now: Timestamp,
    ) -> Result<usize> {
        Ok(sweep_expired(&mut self.registry, region, now)?.len())
    }

    /// Drop `region`'s whole list. Returns how many providers were discarded.
    pub fn reset(&mut self, region: &RegionKey) -> usize {
        let discarded = self.registry.reset(region);
        tracing::info!(region = %region, discarded, "Region reset");
        discarded
    }

    // =================================================================
    // Consumers
    // =================================================================

    /// Match `request` against its region. Returns the index of the new
    /// record in `consumer`'s ledger.
    pub fn add_consumer(
        &mut self,
        consumer: PrincipalId,
        request: ConsumerRequest,
    ) -> Result<usize> {
        let now = self.clock.now();
        self.add_consumer_at(consumer, request, now)
    }

    pub fn add_consumer_at(
        &mut self,
        consumer: PrincipalId,
        request: ConsumerRequest,
        now: Timestamp,
    ) -> Result<usize> {
        let plan = match plan_match(&self.registry, &request, now) {
            Ok(plan) => plan,
            Err(err) => {
                tracing::warn!(
                    region = %request.region,
                    consumer = %consumer,
                    price = request.price,
                    duration = request.duration,
                    deadline = request.deadline,
                    now,
                    error = %err,
                    "Consumer request rejected"
                );
                return Err(err);
            }
        };

        let outcome = commit_match(
            &mut self.registry,
            plan,
            consumer,
            &request,
            now,
            self.config.match_buffer_secs,
        )?;

        self.provider_ledger
            .append(outcome.record.provider_owner, outcome.record.clone());
        Ok(self.consumer_ledger.append(consumer, outcome.record))
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Snapshot of the live provider behind `handle`.
    pub fn provider_list(&self, handle: NodeHandle) -> Result<ProviderNode> {
        self.registry.get(handle).cloned()
    }

    /// Head of `region`'s list, or the sentinel.
    #[must_use]
    pub fn head_list(&self, region: &RegionKey) -> NodeHandle {
        self.registry.head(region)
    }

    /// Head of the default region's list, or the sentinel.
    #[must_use]
    pub fn head(&self) -> NodeHandle {
        self.registry.head(&self.default_region)
    }

    /// `consumer`'s `index`-th match.
    pub fn matchings(&self, consumer: &PrincipalId, index: usize) -> Result<&MatchRecord> {
        self.consumer_ledger.get(consumer, index)
    }

    /// The `index`-th match served by a provider `owner` registered.
    pub fn provider_matchings(&self, owner: &PrincipalId, index: usize) -> Result<&MatchRecord> {
        self.provider_ledger.get(owner, index)
    }

    /// Number of matches recorded for `consumer`.
    #[must_use]
    pub fn match_count(&self, consumer: &PrincipalId) -> usize {
        self.consumer_ledger.count(consumer)
    }

    /// `region`'s providers, head first.
    #[must_use]
    pub fn providers(&self, region: &RegionKey) -> Vec<ProviderNode> {
        self.registry.snapshot(region)
    }

    #[must_use]
    pub fn region_len(&self, region: &RegionKey) -> usize {
        self.registry.region_len(region)
    }

    /// Regions with at least one provider, in key order.
    #[must_use]
    pub fn regions(&self) -> Vec<RegionKey> {
        self.registry.regions().cloned().collect()
    }

    /// Every non-empty region's list.
    #[must_use]
    pub fn snapshot(&self) -> Vec<RegionSnapshot> {
        self.registry
            .regions()
            .map(|region| RegionSnapshot {
                region: region.clone(),
                providers: self.registry.snapshot(region),
            })
            .collect()
    }

    /// SHA-256 over all provider lists and both ledgers.
    #[must_use]
    pub fn state_digest(&self) -> [u8; 32] {
        let digest =
            compute_state_digest(&self.registry, &[&self.consumer_ledger, &self.provider_ledger]);
        tracing::trace!(digest = hex::encode(digest), "State digest computed");
        digest
    }
}

#[cfg(test)]
mod tests {
    use resmatch_types::{ManualClock, ResmatchError};

    use super::*;

    const START: u64 = 7_999_999_999;
    const END: u64 = 9_999_999_999;
    const NOW: u64 = 1_700_000_000;

    fn market() -> Marketplace<ManualClock> {
        Marketplace::with_clock(MarketConfig::default(), ManualClock::new(NOW)).unwrap()
    }

    fn sf() -> RegionKey {
        RegionKey::new("SF")
    }

    #[test]
    fn rejects_invalid_config() {
        let mut cfg = MarketConfig::default();
        cfg.default_region = String::new();
        let err = Marketplace::with_clock(cfg, ManualClock::new(0)).unwrap_err();
        assert!(matches!(err, ResmatchError::Configuration(_)));
    }

    #[test]
    fn head_uses_default_region() {
        let mut m = market();
        assert!(m.head().is_sentinel());
        let h = m
            .add_provider(PrincipalId::new(), ProviderOffer::new("p", "default", 1, START, END))
            .unwrap();
        assert_eq!(m.head(), h);
        assert!(m.head_list(&sf()).is_sentinel());
    }

    #[test]
    fn add_provider_sweeps_region_first() {
        let mut m = market();
        let owner = PrincipalId::new();
        let stale = m
            .add_provider(owner, ProviderOffer::new("remove1", "SF", 1, NOW, NOW + 1))
            .unwrap();
        m.clock().advance(2);
        m.add_provider(owner, ProviderOffer::new("test", "SF", 1, START, END))
            .unwrap();
        assert!(matches!(m.provider_list(stale), Err(ResmatchError::NotFound(_))));
        assert_eq!(m.region_len(&sf()), 1);
    }

    #[test]
    fn sweep_on_insert_can_be_disabled() {
        let cfg = MarketConfig::default().with_sweep_on_insert(false);
        let mut m = Marketplace::with_clock(cfg, ManualClock::new(NOW)).unwrap();
        let owner = PrincipalId::new();
        m.add_provider(owner, ProviderOffer::new("old", "SF", 1, NOW, NOW + 1))
            .unwrap();
        m.clock().advance(2);
        m.add_provider(owner, ProviderOffer::new("new", "SF", 1, START, END))
            .unwrap();
        assert_eq!(m.region_len(&sf()), 2);
        assert_eq!(m.remove_expired_providers(&sf()).unwrap(), 1);
        assert_eq!(m.region_len(&sf()), 1);
    }

    #[test]
    fn invalid_window_changes_nothing() {
        let mut m = market();
        let owner = PrincipalId::new();
        m.add_provider(owner, ProviderOffer::new("dying", "SF", 1, NOW, NOW + 1))
            .unwrap();
        m.clock().advance(5);
        let before = m.state_digest();
        let err = m
            .add_provider(owner, ProviderOffer::new("bad", "SF", 1, END, START))
            .unwrap_err();
        assert!(matches!(err, ResmatchError::InvalidWindow { .. }));
        assert_eq!(m.state_digest(), before, "validation precedes the sweep");
    }

    #[test]
    fn match_is_recorded_in_both_ledgers() {
        let mut m = market();
        let provider = PrincipalId::new();
        let consumer = PrincipalId::new();
        m.add_provider(provider, ProviderOffer::new("world", "SF", 2, START, END))
            .unwrap();
        let idx = m
            .add_consumer(consumer, ConsumerRequest::new("consumer1", "SF", 2, 100, END))
            .unwrap();
        assert_eq!(idx, 0);
        assert_eq!(m.match_count(&consumer), 1);

        let rec = m.matchings(&consumer, 0).unwrap().clone();
        assert_eq!(rec.provider_owner, provider);
        assert_eq!(rec.matched_at, NOW);
        assert_eq!(m.provider_matchings(&provider, 0).unwrap(), &rec);
        assert!(m.matchings(&provider, 0).is_err());
    }

    #[test]
    fn failed_match_changes_nothing() {
        let mut m = market();
        let owner = PrincipalId::new();
        m.add_provider(owner, ProviderOffer::new("dead", "SF", 1, NOW, NOW + 10))
            .unwrap();
        m.add_provider(owner, ProviderOffer::new("other", "SF", 3, START, END))
            .unwrap();
        m.clock().advance(20);
        let before = m.state_digest();

        let err = m
            .add_consumer(PrincipalId::new(), ConsumerRequest::new("c", "SF", 1, 100, END))
            .unwrap_err();
        assert!(matches!(err, ResmatchError::NoEligibleProvider { .. }));
        assert_eq!(m.state_digest(), before);
        assert_eq!(m.region_len(&sf()), 2, "expired node stays until committed or swept");
    }

    #[test]
    fn snapshot_lists_regions_in_order() {
        let mut m = market();
        let owner = PrincipalId::new();
        m.add_provider(owner, ProviderOffer::new("s", "SF", 1, START, END))
            .unwrap();
        m.add_provider(owner, ProviderOffer::new("n", "NYC", 1, START, END))
            .unwrap();
        let snap = m.snapshot();
        let regions: Vec<&str> = snap.iter().map(|s| s.region.as_str()).collect();
        assert_eq!(regions, vec!["NYC", "SF"]);
        assert_eq!(m.regions().len(), 2);

        let json = serde_json::to_string(&snap).unwrap();
        let back: Vec<RegionSnapshot> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn reset_clears_region() {
        let mut m = market();
        let owner = PrincipalId::new();
        m.add_provider(owner, ProviderOffer::new("a", "SF", 1, START, END))
            .unwrap();
        m.add_provider(owner, ProviderOffer::new("b", "SF", 2, START, END))
            .unwrap();
        assert_eq!(m.reset(&sf()), 2);
        assert!(m.head_list(&sf()).is_sentinel());
        assert!(m.providers(&sf()).is_empty());
    }
}
