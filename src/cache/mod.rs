//! Cache Module
//!
//! In-memory key/value store with per-category TTL, manual invalidation,
//! periodic cleanup and get-or-fetch.

mod clock;
mod entry;
mod policy;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use policy::{category_of, TtlPolicy};
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::{validate_key, CacheStore, EntryInfo};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
