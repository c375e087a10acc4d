//! Identifiers used throughout ResourceMatch.
//!
//! Principals use UUIDv7 for time-ordered lexicographic sorting. Provider
//! nodes are addressed by arena handles carrying a generation counter, so a
//! handle to a released slot never aliases the slot's next occupant.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Absolute time in whole seconds since the UNIX epoch.
pub type Timestamp = u64;

// ---------------------------------------------------------------------------
// NodeHandle
// ---------------------------------------------------------------------------

/// Opaque handle to a provider node in the node store.
///
/// [`NodeHandle::SENTINEL`] is reserved and means "no node": it terminates
/// every region list and is the head of an empty region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NodeHandle {
    index: u32,
    generation: u32,
}

impl NodeHandle {
    /// The reserved "none" handle.
    pub const SENTINEL: Self = Self {
        index: u32::MAX,
        generation: u32::MAX,
    };

    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the node store.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot at the time this handle was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    #[must_use]
    pub fn is_sentinel(self) -> bool {
        self == Self::SENTINEL
    }

    /// `None` for the sentinel, `Some(self)` otherwise.
    #[must_use]
    pub fn live(self) -> Option<Self> {
        if self.is_sentinel() { None } else { Some(self) }
    }
}

impl Default for NodeHandle {
    fn default() -> Self {
        Self::SENTINEL
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            write!(f, "node:none")
        } else {
            write!(f, "node:{}v{}", self.index, self.generation)
        }
    }
}

// ---------------------------------------------------------------------------
// PrincipalId
// ---------------------------------------------------------------------------

/// Opaque caller identity: the owner of a provider or the issuer of a
/// consumer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PrincipalId(pub Uuid);

impl PrincipalId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RegionKey
// ---------------------------------------------------------------------------

/// Partition key for provider lists (e.g., "SF"). Opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionKey(String);

impl RegionKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RegionKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for RegionKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
