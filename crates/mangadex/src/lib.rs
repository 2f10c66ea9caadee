//! # mangadex
//!
//! Typed async client for the MangaDex REST API.
//!
//! ## Layout
//! - **models**: serde records for manga, chapters, covers and the `{result, data, total}` envelope
//! - **client**: reqwest-backed [`MangaDexClient`]
//! - **source**: the [`MangaSource`] trait that caching layers and handlers program against
//! - **paging**: page/limit/offset arithmetic for list views

mod client;
mod error;
pub mod models;
mod paging;
mod source;

pub use client::{
    ClientConfig, MangaDexClient, DEFAULT_API_BASE, DEFAULT_COVER_BASE, DEFAULT_TIMEOUT,
};
pub use error::{Error, Result};
pub use models::{Chapter, ChapterData, ChapterList, Manga};
pub use paging::Paging;
pub use source::MangaSource;
