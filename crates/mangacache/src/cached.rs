//! MangaSource wrapper that caches manga and chapter-list lookups

use std::sync::Arc;

use async_trait::async_trait;
use mangadex::{Chapter, ChapterList, Manga, MangaSource, Result};
use tracing::debug;

use crate::cache::Cache;
use crate::stats::CacheStats;

/// Cache key for one window of a manga's chapter feed.
///
/// Every parameter that changes the upstream result is part of the key.
pub fn chapter_key(manga_id: &str, limit: u32, offset: u32) -> String {
    format!("{}-{}-{}", manga_id, limit, offset)
}

/// Caching layer in front of a [`MangaSource`].
///
/// Manga records and chapter lists are served from memory after the
/// first successful fetch. Failed fetches are not stored. All other
/// lookups pass straight through.
pub struct CachedSource<S> {
    /// Upstream source
    inner: S,

    /// Manga by id
    mangas: Cache<Manga>,

    /// Chapter lists by [`chapter_key`]
    chapters: Cache<Arc<ChapterList>>,
}

impl<S: MangaSource> CachedSource<S> {
    /// Wrap `inner` with empty caches
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            mangas: Cache::new(),
            chapters: Cache::new(),
        }
    }

    /// The wrapped source
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Fetch a manga, from memory when possible
    pub async fn manga(&self, id: &str) -> Result<Manga> {
        if let Some(manga) = self.mangas.get(id) {
            debug!("Manga cache hit: {}", id);
            return Ok(manga);
        }

        debug!("Manga cache miss: {}", id);
        let manga = self.inner.manga(id).await?;
        self.mangas.set(id, manga.clone());
        Ok(manga)
    }

    /// Fetch a chapter list window, from memory when possible
    pub async fn chapters(
        &self,
        manga_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Arc<ChapterList>> {
        let key = chapter_key(manga_id, limit, offset);
        if let Some(list) = self.chapters.get(&key) {
            debug!("Chapter cache hit: {}", key);
            return Ok(list);
        }

        debug!("Chapter cache miss: {}", key);
        let list = Arc::new(self.inner.chapters(manga_id, limit, offset).await?);
        self.chapters.set(key, Arc::clone(&list));
        Ok(list)
    }

    /// Counters of the manga cache
    pub fn manga_stats(&self) -> &CacheStats {
        self.mangas.stats()
    }

    /// Counters of the chapter-list cache
    pub fn chapter_stats(&self) -> &CacheStats {
        self.chapters.stats()
    }

    /// Number of cached manga records
    pub fn manga_len(&self) -> usize {
        self.mangas.len()
    }

    /// Number of cached chapter lists
    pub fn chapter_len(&self) -> usize {
        self.chapters.len()
    }
}

#[async_trait]
impl<S: MangaSource> MangaSource for CachedSource<S> {
    async fn manga(&self, id: &str) -> Result<Manga> {
        CachedSource::manga(self, id).await
    }

    async fn chapters(&self, manga_id: &str, limit: u32, offset: u32) -> Result<ChapterList> {
        let list = CachedSource::chapters(self, manga_id, limit, offset).await?;
        Ok(ChapterList::clone(&list))
    }

    async fn search(&self, title: &str) -> Result<Vec<Manga>> {
        self.inner.search(title).await
    }

    async fn popular(&self, limit: u32, offset: u32) -> Result<Vec<Manga>> {
        self.inner.popular(limit, offset).await
    }

    async fn recently_updated(&self, limit: u32, offset: u32) -> Result<Vec<Manga>> {
        self.inner.recently_updated(limit, offset).await
    }

    async fn random_mangas(&self, count: u32) -> Result<Vec<Manga>> {
        self.inner.random_mangas(count).await
    }

    async fn cover_url(&self, manga_id: &str) -> Result<Option<String>> {
        self.inner.cover_url(manga_id).await
    }

    async fn chapter(&self, chapter_id: &str) -> Result<Chapter> {
        self.inner.chapter(chapter_id).await
    }

    async fn chapter_pages(&self, chapter_id: &str) -> Result<Vec<String>> {
        self.inner.chapter_pages(chapter_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::enrich_covers;
    use mangadex::{ChapterData, Error, Paging};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// In-memory source that counts upstream calls
    #[derive(Default)]
    struct FakeSource {
        manga_calls: AtomicUsize,
        chapter_calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl FakeSource {
        fn failure() -> Error {
            Error::Status {
                url: "http://fake/".to_string(),
                status: 503,
            }
        }
    }

    #[async_trait]
    impl MangaSource for FakeSource {
        async fn manga(&self, id: &str) -> Result<Manga> {
            self.manga_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(Self::failure());
            }
            Ok(Manga {
                id: id.to_string(),
                ..Default::default()
            })
        }

        async fn chapters(&self, manga_id: &str, limit: u32, offset: u32) -> Result<ChapterList> {
            self.chapter_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(Self::failure());
            }
            Ok(ChapterList {
                result: "ok".to_string(),
                data: (offset..offset + limit)
                    .map(|n| ChapterData {
                        id: format!("{}-c{}", manga_id, n),
                        ..Default::default()
                    })
                    .collect(),
                total: 100,
            })
        }

        async fn search(&self, _title: &str) -> Result<Vec<Manga>> {
            Ok(Vec::new())
        }

        async fn popular(&self, _limit: u32, _offset: u32) -> Result<Vec<Manga>> {
            Ok(Vec::new())
        }

        async fn recently_updated(&self, _limit: u32, _offset: u32) -> Result<Vec<Manga>> {
            Ok(Vec::new())
        }

        async fn random_mangas(&self, _count: u32) -> Result<Vec<Manga>> {
            Ok(Vec::new())
        }

        async fn cover_url(&self, manga_id: &str) -> Result<Option<String>> {
            if manga_id == "broken" {
                return Err(Self::failure());
            }
            Ok(Some(format!("https://covers/{}.jpg", manga_id)))
        }

        async fn chapter(&self, chapter_id: &str) -> Result<Chapter> {
            Ok(Chapter {
                id: chapter_id.to_string(),
                ..Default::default()
            })
        }

        async fn chapter_pages(&self, _chapter_id: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_chapter_key_is_deterministic() {
        assert_eq!(chapter_key("X", 10, 0), chapter_key("X", 10, 0));
        assert_eq!(chapter_key("X", 10, 0), "X-10-0");
    }

    #[test]
    fn test_chapter_key_distinguishes_parameters() {
        let base = chapter_key("X", 10, 0);
        assert_ne!(base, chapter_key("Y", 10, 0));
        assert_ne!(base, chapter_key("X", 20, 0));
        assert_ne!(base, chapter_key("X", 10, 10));
    }

    #[tokio::test]
    async fn test_manga_second_call_is_cached() {
        let source = CachedSource::new(FakeSource::default());

        let first = source.manga("abc").await.unwrap();
        let second = source.manga("abc").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.inner().manga_calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.manga_stats().hits(), 1);
        assert_eq!(source.manga_stats().misses(), 1);
        assert_eq!(source.manga_len(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let source = CachedSource::new(FakeSource::default());
        source.inner().fail.store(true, Ordering::SeqCst);

        assert!(source.manga("abc").await.is_err());
        assert!(source.chapters("abc", 10, 0).await.is_err());
        assert_eq!(source.manga_len(), 0);
        assert_eq!(source.chapter_len(), 0);

        // a later retry reaches upstream again and succeeds
        source.inner().fail.store(false, Ordering::SeqCst);
        assert_eq!(source.manga("abc").await.unwrap().id, "abc");
        assert_eq!(source.inner().manga_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_different_offsets_do_not_share_entries() {
        let source = CachedSource::new(FakeSource::default());

        let first = source.chapters("abc", 10, 0).await.unwrap();
        let second = source.chapters("abc", 10, 10).await.unwrap();

        assert_eq!(first.data[0].id, "abc-c0");
        assert_eq!(second.data[0].id, "abc-c10");
        assert_eq!(source.inner().chapter_calls.load(Ordering::SeqCst), 2);
        assert_eq!(source.chapter_len(), 2);
    }

    #[tokio::test]
    async fn test_paged_request_round_trip() {
        let source = CachedSource::new(FakeSource::default());
        let paging = Paging::from_query(Some(2), 10);

        assert_eq!(paging.offset(), 10);
        assert_eq!(chapter_key("abc", paging.limit(), paging.offset()), "abc-10-10");

        let first = source.chapters("abc", paging.limit(), paging.offset()).await.unwrap();
        assert_eq!(source.chapter_stats().misses(), 1);
        assert_eq!(source.chapter_len(), 1);

        let second = source.chapters("abc", paging.limit(), paging.offset()).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.inner().chapter_calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.chapter_stats().hits(), 1);
    }

    #[tokio::test]
    async fn test_enrich_covers_through_cached_source() {
        let source = CachedSource::new(FakeSource::default());
        let mut mangas: Vec<Manga> = ["a", "broken", "c"]
            .iter()
            .map(|id| Manga {
                id: id.to_string(),
                ..Default::default()
            })
            .collect();

        let report = enrich_covers(&source, &mut mangas).await;

        assert_eq!(report.failed, 1);
        assert_eq!(mangas[0].attributes.cover_url.as_deref(), Some("https://covers/a.jpg"));
        assert_eq!(mangas[1].attributes.cover_url, None);
        assert_eq!(mangas[2].attributes.cover_url.as_deref(), Some("https://covers/c.jpg"));
    }
}
