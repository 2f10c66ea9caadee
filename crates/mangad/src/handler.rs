//! HTTP routes and request handlers

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use mangacache::enrich_covers;
use mangadex::{ChapterList, MangaSource, Paging};
use serde::Deserialize;
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};
use url::Url;

use crate::error::AppError;
use crate::state::AppState;
use crate::templates::{self, HomePage, ListPage, MangaPage, ReaderPage};

/// Entries per home page section
const HOME_SECTION_LIMIT: u32 = 10;

/// Random picks on the home page
const HOME_RANDOM_COUNT: u32 = 5;

/// Chapters per page on the manga detail view
const MANGA_CHAPTER_LIMIT: u32 = 10;

/// Chapter window used for reader prev/next navigation
const READER_CHAPTER_LIMIT: u32 = 100;

/// Entries per page on /popular and /recent
const LIST_LIMIT: u32 = 20;

/// Upper bound for /random-manga-json?limit=
const MAX_RANDOM_COUNT: u32 = 100;

type SharedState = Arc<AppState>;

/// Build the application router
pub fn router(state: SharedState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/image-proxy", get(image_proxy))
        .route("/manga/:manga_id", get(manga_detail))
        .route("/manga/:manga_id/read/:chapter_id", get(read_chapter))
        .route("/popular", get(popular))
        .route("/recent", get(recent))
        .route("/random-manga-json", get(random_json))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct HomeQuery {
    search: Option<String>,
}

/// Query values are parsed leniently: garbage means "use the default"
#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    fn paging(&self, limit: u32) -> Paging {
        Paging::from_query(self.page.as_deref().and_then(|p| p.parse().ok()), limit)
    }
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProxyQuery {
    url: Option<String>,
}

/// Search results, or the popular/recent/random sections
async fn home(
    State(state): State<SharedState>,
    Query(query): Query<HomeQuery>,
) -> Result<Html<String>, AppError> {
    let source = &state.source;
    let search = query.search.unwrap_or_default();

    if !search.is_empty() {
        let mut results = source
            .search(&search)
            .await
            .map_err(|e| AppError::upstream("Error searching manga", e))?;
        enrich_covers(source, &mut results).await;

        return Ok(Html(templates::home(&HomePage {
            search: &search,
            results: &results,
            popular: &[],
            recent: &[],
            random: &[],
        })));
    }

    let (popular, recent, random) = tokio::join!(
        source.popular(HOME_SECTION_LIMIT, 0),
        source.recently_updated(HOME_SECTION_LIMIT, 0),
        source.random_mangas(HOME_RANDOM_COUNT),
    );
    let mut popular = popular.unwrap_or_else(|e| {
        warn!("Error fetching popular mangas: {}", e);
        Vec::new()
    });
    let mut recent = recent.unwrap_or_else(|e| {
        warn!("Error fetching recently updated mangas: {}", e);
        Vec::new()
    });
    let mut random = random.unwrap_or_else(|e| {
        warn!("Error fetching random mangas: {}", e);
        Vec::new()
    });

    tokio::join!(
        enrich_covers(source, &mut popular),
        enrich_covers(source, &mut recent),
        enrich_covers(source, &mut random),
    );

    Ok(Html(templates::home(&HomePage {
        search: "",
        results: &[],
        popular: &popular,
        recent: &recent,
        random: &random,
    })))
}

/// Manga details with one page of chapters
async fn manga_detail(
    State(state): State<SharedState>,
    UrlPath(manga_id): UrlPath<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let source = &state.source;
    let paging = query.paging(MANGA_CHAPTER_LIMIT);

    let mut manga = source
        .manga(&manga_id)
        .await
        .map_err(|e| AppError::lookup("Error fetching manga", "Manga not found", e))?;

    if !manga.id.is_empty() {
        match source.cover_url(&manga.id).await {
            Ok(cover) => manga.attributes.cover_url = cover,
            Err(e) => warn!("Error fetching cover for manga {}: {}", manga.id, e),
        }
    }

    let chapters = match source.chapters(&manga_id, paging.limit(), paging.offset()).await {
        Ok(list) => list,
        Err(e) => {
            warn!("Error fetching chapters for manga {}: {}", manga_id, e);
            Arc::new(ChapterList::default())
        }
    };

    Ok(Html(templates::manga(&MangaPage {
        manga: &manga,
        chapters: &chapters.data,
        total: chapters.total,
        page: paging.page(),
        total_pages: paging.total_pages(chapters.total),
    })))
}

/// Chapter reader
async fn read_chapter(
    State(state): State<SharedState>,
    UrlPath((manga_id, chapter_id)): UrlPath<(String, String)>,
) -> Result<Html<String>, AppError> {
    let source = &state.source;

    let (chapter, pages, chapters) = tokio::join!(
        source.chapter(&chapter_id),
        source.chapter_pages(&chapter_id),
        source.chapters(&manga_id, READER_CHAPTER_LIMIT, 0),
    );
    let chapter = chapter
        .map_err(|e| AppError::lookup("Failed to get chapter details", "Chapter not found", e))?;
    let pages = pages.map_err(|e| AppError::upstream("Failed to get chapter pages", e))?;
    let chapters = chapters.unwrap_or_else(|e| {
        warn!("Error fetching chapters for manga {}: {}", manga_id, e);
        Arc::new(ChapterList::default())
    });
    let (prev_chapter, next_chapter) = chapters.neighbours(&chapter_id);

    Ok(Html(templates::reader(&ReaderPage {
        chapter: &chapter,
        pages: &pages,
        manga_id: &manga_id,
        prev_chapter,
        next_chapter,
    })))
}

async fn popular(
    State(state): State<SharedState>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let paging = query.paging(LIST_LIMIT);
    let mut mangas = state
        .source
        .popular(paging.limit(), paging.offset())
        .await
        .map_err(|e| AppError::upstream("Error fetching popular mangas", e))?;
    enrich_covers(&state.source, &mut mangas).await;

    Ok(Html(templates::manga_list(&ListPage {
        title: "Popular Mangas",
        base_url: "/popular",
        mangas: &mangas,
        prev_page: paging.prev(),
        next_page: paging.next(),
    })))
}

async fn recent(
    State(state): State<SharedState>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let paging = query.paging(LIST_LIMIT);
    let mut mangas = state
        .source
        .recently_updated(paging.limit(), paging.offset())
        .await
        .map_err(|e| AppError::upstream("Error fetching recently updated mangas", e))?;
    enrich_covers(&state.source, &mut mangas).await;

    Ok(Html(templates::manga_list(&ListPage {
        title: "Recently Updated Mangas",
        base_url: "/recent",
        mangas: &mangas,
        prev_page: paging.prev(),
        next_page: paging.next(),
    })))
}

/// JSON array of random manga, `limit` defaults to 1
async fn random_json(
    State(state): State<SharedState>,
    Query(query): Query<LimitQuery>,
) -> Response {
    let count = query
        .limit
        .as_deref()
        .and_then(|l| l.parse::<u32>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(1)
        .min(MAX_RANDOM_COUNT);

    match state.source.random_mangas(count).await {
        Ok(mangas) => Json(mangas).into_response(),
        Err(e) => {
            error!("Error fetching random mangas: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to fetch random mangas"})),
            )
                .into_response()
        }
    }
}

/// Fetch `url` and stream its body back with the upstream status and
/// content type. Headers go out as soon as the upstream sends its own.
async fn image_proxy(
    State(state): State<SharedState>,
    Query(query): Query<ProxyQuery>,
) -> Result<Response, AppError> {
    let target = query
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::BadRequest("missing url parameter".to_string()))?;
    let target =
        Url::parse(&target).map_err(|e| AppError::BadRequest(format!("invalid url: {}", e)))?;
    if !matches!(target.scheme(), "http" | "https") {
        return Err(AppError::BadRequest(
            "only http and https urls can be proxied".to_string(),
        ));
    }

    let resp = state.http().get(target).send().await.map_err(|e| {
        warn!("Image proxy fetch failed: {}", e);
        AppError::BadGateway(e.to_string())
    })?;

    let status = StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| HeaderValue::from_bytes(v.as_bytes()).ok());

    let mut response = Response::builder().status(status);
    if let Some(content_type) = content_type {
        response = response.header(header::CONTENT_TYPE, content_type);
    }
    response
        .body(Body::from_stream(resp.bytes_stream()))
        .map_err(|e| AppError::Internal(e.to_string()))
}
