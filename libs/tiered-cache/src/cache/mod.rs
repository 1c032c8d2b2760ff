pub mod entry;
pub mod error;
pub mod stats;
pub mod ttl;

pub use entry::CacheEntry;
pub use error::{BoxError, CacheError, CacheResult};
pub use stats::CacheStats;
pub use ttl::{Fetched, TtlCache};
