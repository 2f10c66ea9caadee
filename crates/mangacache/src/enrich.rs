//! Concurrent per-item enrichment
//!
//! Fire one lookup per item, wait for all of them, then write each result
//! back by index. A failed lookup is logged and leaves its item untouched.

use std::fmt::Display;
use std::future::Future;

use futures::future::join_all;
use mangadex::{Manga, MangaSource};
use tracing::warn;

/// Outcome counts of one [`enrich`] call
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnrichReport {
    /// Lookups issued
    pub attempted: usize,
    /// Items that received a supplement
    pub enriched: usize,
    /// Lookups that returned an error
    pub failed: usize,
}

/// Run `lookup` for every item concurrently and apply the successes.
///
/// * `id_of` - derives the lookup key from an item
/// * `lookup` - fetches the supplement; `Ok(None)` means there is none
/// * `apply` - writes a supplement into its item
///
/// Returns once every lookup has finished. Item order is never changed
/// and no item is removed.
pub async fn enrich<T, S, E, I, L, Fut, A>(
    items: &mut [T],
    id_of: I,
    lookup: L,
    mut apply: A,
) -> EnrichReport
where
    I: Fn(&T) -> String,
    L: Fn(String) -> Fut,
    Fut: Future<Output = Result<Option<S>, E>>,
    E: Display,
    A: FnMut(&mut T, S),
{
    if items.is_empty() {
        return EnrichReport::default();
    }

    let ids: Vec<String> = items.iter().map(id_of).collect();
    let results = join_all(ids.iter().cloned().map(lookup)).await;

    let mut report = EnrichReport {
        attempted: ids.len(),
        ..Default::default()
    };

    for ((item, id), result) in items.iter_mut().zip(&ids).zip(results) {
        match result {
            Ok(Some(supplement)) => {
                apply(item, supplement);
                report.enriched += 1;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Enrichment lookup failed for {}: {}", id, e);
                report.failed += 1;
            }
        }
    }

    report
}

/// Fill `cover_url` on every manga in `mangas` that has a cover
pub async fn enrich_covers<S>(source: &S, mangas: &mut [Manga]) -> EnrichReport
where
    S: MangaSource + ?Sized,
{
    enrich(
        mangas,
        |manga| manga.id.clone(),
        move |id| async move { source.cover_url(&id).await },
        |manga, url| manga.attributes.cover_url = Some(url),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Barrier;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Item {
        id: String,
        cover: String,
    }

    fn items(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| Item {
                id: format!("m{}", i),
                cover: String::new(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_order_and_length() {
        let mut list = items(5);

        let report = enrich(
            &mut list,
            |item| item.id.clone(),
            |id| async move {
                // later items finish first
                let n: u64 = id[1..].parse().unwrap();
                tokio::time::sleep(Duration::from_millis(50 - n * 10)).await;
                if id == "m2" {
                    Err("upstream 500")
                } else {
                    Ok(Some(format!("cover-{}", id)))
                }
            },
            |item, cover| item.cover = cover,
        )
        .await;

        assert_eq!(list.len(), 5);
        let ids: Vec<_> = list.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["m0", "m1", "m2", "m3", "m4"]);
        assert_eq!(list[2].cover, "");
        for i in [0, 1, 3, 4] {
            assert_eq!(list[i].cover, format!("cover-m{}", i));
        }
        assert_eq!(
            report,
            EnrichReport {
                attempted: 5,
                enriched: 4,
                failed: 1
            }
        );
    }

    #[tokio::test]
    async fn test_empty_input_issues_no_lookups() {
        let calls = AtomicUsize::new(0);
        let mut list: Vec<Item> = Vec::new();

        let report = enrich(
            &mut list,
            |item| item.id.clone(),
            |_id| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, String>(Some(String::new())) }
            },
            |item, cover| item.cover = cover,
        )
        .await;

        assert!(list.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(report, EnrichReport::default());
    }

    #[tokio::test]
    async fn test_lookups_run_concurrently() {
        // every lookup waits for all the others; a sequential run would hang
        let barrier = Arc::new(Barrier::new(4));
        let mut list = items(4);

        let run = enrich(
            &mut list,
            |item| item.id.clone(),
            |id| {
                let barrier = Arc::clone(&barrier);
                async move {
                    barrier.wait().await;
                    Ok::<_, String>(Some(id))
                }
            },
            |item, cover| item.cover = cover,
        );

        let report = tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .expect("lookups did not overlap");
        assert_eq!(report.enriched, 4);
        assert_eq!(list[3].cover, "m3");
    }

    #[tokio::test]
    async fn test_missing_supplement_is_not_a_failure() {
        let mut list = items(2);

        let report = enrich(
            &mut list,
            |item| item.id.clone(),
            |id| async move {
                if id == "m0" {
                    Ok::<_, String>(None)
                } else {
                    Ok(Some("x".to_string()))
                }
            },
            |item, cover| item.cover = cover,
        )
        .await;

        assert_eq!(list[0].cover, "");
        assert_eq!(list[1].cover, "x");
        assert_eq!(report.failed, 0);
        assert_eq!(report.enriched, 1);
    }
}
