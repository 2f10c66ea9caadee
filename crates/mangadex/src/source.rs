//! The lookup seam between handlers and the upstream API

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Chapter, ChapterList, Manga};

/// Everything the frontend asks of the manga API.
///
/// [`crate::MangaDexClient`] is the production implementation; caching
/// layers wrap any implementor.
#[async_trait]
pub trait MangaSource: Send + Sync {
    /// Fetch a single manga by id
    async fn manga(&self, id: &str) -> Result<Manga>;

    /// Fetch one window of a manga's chapter feed
    async fn chapters(&self, manga_id: &str, limit: u32, offset: u32) -> Result<ChapterList>;

    /// Full-text title search
    async fn search(&self, title: &str) -> Result<Vec<Manga>>;

    /// Most followed first
    async fn popular(&self, limit: u32, offset: u32) -> Result<Vec<Manga>>;

    /// Most recently updated first
    async fn recently_updated(&self, limit: u32, offset: u32) -> Result<Vec<Manga>>;

    /// `count` random manga
    async fn random_mangas(&self, count: u32) -> Result<Vec<Manga>>;

    /// Cover image URL, `None` when the manga has no cover
    async fn cover_url(&self, manga_id: &str) -> Result<Option<String>>;

    /// Chapter detail record
    async fn chapter(&self, chapter_id: &str) -> Result<Chapter>;

    /// Page image URLs for a chapter
    async fn chapter_pages(&self, chapter_id: &str) -> Result<Vec<String>>;
}
