pub mod cache;
pub mod config;
pub mod key;
pub mod macros;

pub use cache::{
    BoxError, CacheEntry, CacheError, CacheResult, CacheStats, Fetched,
    TtlCache,
};
pub use config::{CacheConfig, ConfigError, TierConfig};
pub use key::{KEY_DELIMITER, ScopeKey, is_valid_segment};
