//! Provider types: the offer a caller submits and the node the registry
//! stores for it.

use serde::{Deserialize, Serialize};

use crate::{NodeHandle, PrincipalId, RegionKey, ResmatchError, Result, Timestamp};

/// A provider's offer: a resource at a fixed price for `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderOffer {
    pub name: String,
    pub region: RegionKey,
    pub price: u64,
    pub start: Timestamp,
    pub end: Timestamp,
}

impl ProviderOffer {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        region: impl Into<RegionKey>,
        price: u64,
        start: Timestamp,
        end: Timestamp,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            price,
            start,
            end,
        }
    }

    /// The window must be non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.start >= self.end {
            return Err(ResmatchError::InvalidWindow {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// A provider as stored in its region's sorted list.
///
/// `next` links to the following node of the same region, or is
/// [`NodeHandle::SENTINEL`] at the tail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderNode {
    pub handle: NodeHandle,
    pub next: NodeHandle,
    pub name: String,
    pub region: RegionKey,
    pub owner: PrincipalId,
    pub price: u64,
    pub availability_start: Timestamp,
    pub availability_end: Timestamp,
}

impl ProviderNode {
    /// Build an unlinked node from a validated offer.
    #[must_use]
    pub fn from_offer(handle: NodeHandle, owner: PrincipalId, offer: ProviderOffer) -> Self {
        Self {
            handle,
            next: NodeHandle::SENTINEL,
            name: offer.name,
            region: offer.region,
            owner,
            price: offer.price,
            availability_start: offer.start,
            availability_end: offer.end,
        }
    }

    /// The window has closed: nothing more can be matched against it.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.availability_end <= now
    }

    /// Whether a job of `duration` accepted at `now` finishes inside both
    /// the provider's window and the consumer's `deadline`.
    #[must_use]
    pub fn can_serve(&self, now: Timestamp, duration: u64, deadline: Timestamp) -> bool {
        let Some(finish) = now.checked_add(duration) else {
            return false;
        };
        finish <= self.availability_end.min(deadline)
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl ProviderOffer {
    /// Offer in region "SF" with the given price and window.
    pub fn dummy(price: u64, start: Timestamp, end: Timestamp) -> Self {
        Self::new(format!("provider@{price}"), "SF", price, start, end)
    }
}
