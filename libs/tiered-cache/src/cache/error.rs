use std::{error::Error, sync::Arc};

pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

pub type CacheResult<T> = Result<T, CacheError>;

/// Errors surfaced by [`TtlCache::get_or_set`](super::TtlCache::get_or_set).
///
/// Cloneable so one failed computation can be handed to every caller that
/// was waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    #[error("computing `{key}` failed: {source}")]
    Compute {
        key: String,
        #[source]
        source: Arc<dyn Error + Send + Sync + 'static>,
    },
}

impl CacheError {
    pub fn compute(key: impl Into<String>, err: impl Into<BoxError>) -> Self {
        Self::Compute {
            key: key.into(),
            source: Arc::from(err.into()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Compute { key, .. } => key,
        }
    }
}
