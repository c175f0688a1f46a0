//! Record cache and delimited-file store for the Canadian Cheese Directory.
//!
//! - [`FileStore`] is the only component that knows the on-disk format: a
//!   header-mapped delimited file, optionally prefixed with a UTF-8
//!   byte-order marker.
//! - [`RecordCache`] loads a [`RecordStore`] once and serves identity-keyed
//!   lookups and mutations from memory.
//! - Clients (console menus, services, GUIs) talk to the cache only.

mod cache;
mod config;
mod record;
mod store;

pub use cache::{CacheError, RecordCache};
pub use config::{CacheOptions, StoreConfig, DEFAULT_FILE_NAME};
pub use record::{CheeseId, CheeseRecord, Column, SortOrder, UnknownColumn};
pub use store::{FileStore, InMemoryStore, RecordStore, StoreError};
