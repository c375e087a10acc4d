//! # resmatch-types
//!
//! Shared types, errors, and configuration for the **ResourceMatch**
//! marketplace engine.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`NodeHandle`], [`PrincipalId`], [`RegionKey`], [`Timestamp`]
//! - **Provider model**: [`ProviderOffer`], [`ProviderNode`]
//! - **Matching model**: [`ConsumerRequest`], [`MatchRecord`]
//! - **Time**: [`Clock`], [`SystemClock`], [`ManualClock`]
//! - **Configuration**: [`MarketConfig`]
//! - **Errors**: [`ResmatchError`] with `RM_ERR_` prefix codes
//! - **Constants**: system-wide defaults

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod matching;
pub mod provider;

// Re-export all primary types at crate root for ergonomic imports:
//   use resmatch_types::{ProviderNode, MatchRecord, NodeHandle, ...};

pub use clock::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use matching::*;
pub use provider::*;

// Constants are accessed via `resmatch_types::constants::FOO`
// (not re-exported to avoid name collisions).
