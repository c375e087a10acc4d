//! System-wide constants for the ResourceMatch marketplace engine.

/// Default delay (seconds) added after a consumed window before the same
/// provider can be matched again.
pub const DEFAULT_MATCH_BUFFER_SECS: u64 = 100 * 1000;

/// Region used by `head()` and other calls that omit a region.
pub const DEFAULT_REGION: &str = "default";

/// Whether `add_provider` sweeps expired nodes from the target region first.
pub const DEFAULT_SWEEP_ON_INSERT: bool = true;
