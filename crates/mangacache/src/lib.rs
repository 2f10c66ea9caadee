//! # mangacache
//!
//! In-memory lookup cache and concurrent enrichment for the MangaDex client.
//!
//! ## Architecture
//! - **Cache**: `RwLock<HashMap>` keyed by opaque strings, AHash hashing
//! - **CachedSource**: wraps any `MangaSource`, caching manga and chapter lists
//! - **enrich**: fan out one lookup per list item, join, write back by index
//!
//! Entries live for the life of the process; there is no eviction.

#![warn(missing_docs)]

mod cache;
mod cached;
mod enrich;
mod stats;

pub use cache::Cache;
pub use cached::{chapter_key, CachedSource};
pub use enrich::{enrich, enrich_covers, EnrichReport};
pub use stats::CacheStats;
