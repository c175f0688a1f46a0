use crate::record::CheeseId;
use crate::store::StoreError;

/// Error type for record cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// No cached record has this id.
    #[error("cheese not found: {id}")]
    NotFound { id: CheeseId },

    /// A cached record already has this id.
    #[error("duplicate cheese id: {id}")]
    DuplicateKey { id: CheeseId },

    /// No id above the highest cached one is representable.
    #[error("no cheese id left after {max}")]
    IdsExhausted { max: CheeseId },

    /// The cache lock was poisoned during the named operation.
    #[error("record cache lock poisoned during {0}")]
    LockPoisoned(&'static str),

    /// The backing store refused or failed the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CacheError {
    /// Whether this error means the id was absent, in the cache or the store.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CacheError::NotFound { .. } | CacheError::Store(StoreError::NotFound { .. })
        )
    }

    /// Whether the store does not offer the requested operation.
    pub fn is_not_supported(&self) -> bool {
        matches!(self, CacheError::Store(StoreError::NotSupported(_)))
    }
}
