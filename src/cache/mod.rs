//! Record cache - The authoritative in-memory cheese directory.
//!
//! A [`RecordCache`] loads its store exactly once, at construction, and from
//! then on answers every query from memory. Mutations change the in-memory
//! sequence; they reach storage through [`RecordCache::save_all`], or
//! immediately when [`CacheOptions::write_through`](crate::CacheOptions) is
//! set.
//!
//! ## Example
//!
//! ```
//! use cheese_directory::{CheeseRecord, InMemoryStore, RecordCache};
//!
//! let store = InMemoryStore::with_records([CheeseRecord::new(1), CheeseRecord::new(2)])?;
//! let cache = RecordCache::new(store);
//!
//! let mut first = cache.get_by_id(1)?.expect("loaded");
//! first.cheese_name_en = "Oka".into();
//! cache.update(first)?;
//! cache.delete_by_id(2)?;
//!
//! assert_eq!(cache.len()?, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod record_cache;

pub use error::CacheError;
pub use record_cache::RecordCache;
