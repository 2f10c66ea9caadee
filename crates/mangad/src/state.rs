//! Shared application state

use mangacache::CachedSource;
use mangadex::MangaDexClient;
use tracing::info;

/// State handed to every handler.
///
/// Built once at startup; the caches inside live until shutdown.
pub struct AppState {
    /// Upstream client behind the manga and chapter-list caches
    pub source: CachedSource<MangaDexClient>,
}

impl AppState {
    pub fn new(client: MangaDexClient) -> Self {
        Self {
            source: CachedSource::new(client),
        }
    }

    /// Outbound HTTP client, reused by the image proxy
    pub fn http(&self) -> &reqwest::Client {
        self.source.inner().http()
    }

    /// Log cache sizes and hit ratios
    pub fn log_cache_stats(&self) {
        let manga = self.source.manga_stats();
        let chapters = self.source.chapter_stats();
        info!(
            "Manga cache: {} entries, {} hits, {} misses, hit ratio {:.2}",
            self.source.manga_len(),
            manga.hits(),
            manga.misses(),
            manga.hit_ratio()
        );
        info!(
            "Chapter cache: {} entries, {} hits, {} misses, hit ratio {:.2}",
            self.source.chapter_len(),
            chapters.hits(),
            chapters.misses(),
            chapters.hit_ratio()
        );
    }
}
