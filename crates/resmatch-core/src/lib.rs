//! # resmatch-core
//!
//! **Region-partitioned resource marketplace engine.**
//!
//! Providers offer a resource at a fixed price for a time window; consumers
//! ask for an exact price tier, a duration and a deadline. The engine keeps
//! one price-sorted list of providers per region and serves each request
//! from the cheapest-first walk of that list.
//!
//! - **Node store + region index**: arena-backed nodes, region -> head map
//! - **Provider registry**: sorted insert, unlink, reset
//! - **Expiry reaper**: single-pass removal of closed windows
//! - **Matcher**: read-only planning, then commit
//! - **Match ledger**: append-only per-principal records
//! - **Marketplace**: the facade; one `now` per operation, all-or-nothing

pub mod digest;
pub mod engine;
pub mod ledger;
pub mod matcher;
pub mod node_store;
pub mod reaper;
pub mod region_index;
pub mod registry;

pub use digest::{compute_ledger_root, compute_state_digest};
pub use engine::{Marketplace, RegionSnapshot};
pub use ledger::MatchLedger;
pub use matcher::{MatchOutcome, MatchPlan, commit_match, plan_match};
pub use node_store::NodeStore;
pub use reaper::{expired_links, sweep_expired};
pub use region_index::RegionIndex;
pub use registry::{ProviderRegistry, RegionIter};
