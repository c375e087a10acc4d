//! Consumer requests and the match records produced for them.
//!
//! A [`MatchRecord`] is the immutable record of one consumer request being
//! served by one provider window.

use serde::{Deserialize, Serialize};

use crate::{NodeHandle, PrincipalId, RegionKey, ResmatchError, Result, Timestamp};

/// A consumer's request for `duration` seconds at exactly `price`,
/// finishing no later than `deadline`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerRequest {
    pub name: String,
    pub region: RegionKey,
    pub price: u64,
    pub duration: u64,
    pub deadline: Timestamp,
}

impl ConsumerRequest {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        region: impl Into<RegionKey>,
        price: u64,
        duration: u64,
        deadline: Timestamp,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            price,
            duration,
            deadline,
        }
    }

    /// Reject requests whose deadline cannot fit `duration` starting `now`.
    pub fn validate(&self, now: Timestamp) -> Result<()> {
        if self.duration == 0 {
            return Err(ResmatchError::InvalidRequest {
                reason: "duration must be positive".to_string(),
            });
        }
        let finish = now
            .checked_add(self.duration)
            .ok_or_else(|| ResmatchError::InvalidRequest {
                reason: format!("duration {} overflows from now {now}", self.duration),
            })?;
        if self.deadline <= finish {
            return Err(ResmatchError::InvalidRequest {
                reason: format!(
                    "deadline {} cannot fit duration {} from now {now}",
                    self.deadline, self.duration,
                ),
            });
        }
        Ok(())
    }
}

/// A completed match between a consumer request and a provider window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub provider_name: String,
    /// The provider node as it was addressed at match time. May be stale
    /// later if the provider was retired.
    pub provider_handle: NodeHandle,
    pub provider_owner: PrincipalId,
    pub consumer_name: String,
    pub consumer: PrincipalId,
    pub region: RegionKey,
    pub price: u64,
    /// The provider's `availability_start` when the match was made.
    pub start: Timestamp,
    pub duration: u64,
    /// The `now` of the operation that produced this record.
    pub matched_at: Timestamp,
}

impl MatchRecord {
    /// End of the consumed window (exclusive of any match buffer).
    #[must_use]
    pub fn end(&self) -> Timestamp {
        self.start.saturating_add(self.duration)
    }
}

impl std::fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Match[{}] {} <- {} @ {} for {}s from {}",
            self.region,
            self.consumer_name,
            self.provider_name,
            self.price,
            self.duration,
            self.start,
        )
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl ConsumerRequest {
    /// Request in region "SF".
    pub fn dummy(price: u64, duration: u64, deadline: Timestamp) -> Self {
        Self::new(format!("consumer@{price}"), "SF", price, duration, deadline)
    }
}
