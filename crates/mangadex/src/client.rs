//! reqwest-backed MangaDex client
//!
//! All calls are plain GETs against one base URL. Responses are read in
//! full and decoded with serde_json so that transport failures, bad
//! statuses and malformed bodies surface as distinct [`Error`] variants.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::models::{AtHomeServer, Chapter, ChapterList, CoverData, Envelope, Manga};
use crate::source::MangaSource;

/// Default API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.mangadex.org";

/// Default cover image host
pub const DEFAULT_COVER_BASE: &str = "https://uploads.mangadex.org/covers";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`MangaDexClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    pub cover_base: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            cover_base: DEFAULT_COVER_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Client for the MangaDex REST API
#[derive(Debug, Clone)]
pub struct MangaDexClient {
    http: Client,
    api_base: Url,
    cover_base: String,
}

impl MangaDexClient {
    /// Create a client from the given settings
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("mangad/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_base: Url::parse(&config.api_base)?,
            cover_base: config.cover_base.trim_end_matches('/').to_string(),
        })
    }

    /// The underlying HTTP client, shared with other outbound fetches
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Build `{api_base}/{segments...}` with each segment escaped
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("Requesting URL: {}", url);
        let resp = self.http.get(url.clone()).send().await?;

        let status = resp.status();
        debug!("Response status {} for {}", status, url);
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// `GET /manga` with arbitrary query parameters
    pub async fn manga_list(&self, params: &[(&str, String)]) -> Result<Vec<Manga>> {
        let mut url = self.endpoint(&["manga"])?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));

        let env: Envelope<Vec<Manga>> = self.get_json(url).await?;
        Ok(env.data)
    }

    /// `GET /manga/random`
    pub async fn random_manga(&self) -> Result<Manga> {
        let env: Envelope<Manga> = self.get_json(self.endpoint(&["manga", "random"])?).await?;
        Ok(env.data)
    }
}

#[async_trait]
impl MangaSource for MangaDexClient {
    async fn manga(&self, id: &str) -> Result<Manga> {
        let env: Envelope<Manga> = self.get_json(self.endpoint(&["manga", id])?).await?;
        Ok(env.data)
    }

    async fn chapters(&self, manga_id: &str, limit: u32, offset: u32) -> Result<ChapterList> {
        let mut url = self.endpoint(&["manga", manga_id, "feed"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string())
            .append_pair("translatedLanguage[]", "en")
            .append_pair("order[chapter]", "asc");

        self.get_json(url).await
    }

    async fn search(&self, title: &str) -> Result<Vec<Manga>> {
        self.manga_list(&[("title", title.to_string())]).await
    }

    async fn popular(&self, limit: u32, offset: u32) -> Result<Vec<Manga>> {
        self.manga_list(&[
            ("order[followedCount]", "desc".to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ])
        .await
    }

    async fn recently_updated(&self, limit: u32, offset: u32) -> Result<Vec<Manga>> {
        self.manga_list(&[
            ("order[updatedAt]", "desc".to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ])
        .await
    }

    async fn random_mangas(&self, count: u32) -> Result<Vec<Manga>> {
        let calls = (0..count).map(|_| self.random_manga());
        futures::future::try_join_all(calls).await
    }

    async fn cover_url(&self, manga_id: &str) -> Result<Option<String>> {
        let mut url = self.endpoint(&["cover"])?;
        url.query_pairs_mut().append_pair("manga[]", manga_id);

        let env: Envelope<Vec<CoverData>> = self.get_json(url).await?;
        Ok(env.data.first().map(|cover| {
            format!("{}/{}/{}", self.cover_base, manga_id, cover.attributes.file_name)
        }))
    }

    async fn chapter(&self, chapter_id: &str) -> Result<Chapter> {
        let env: Envelope<Chapter> = self.get_json(self.endpoint(&["chapter", chapter_id])?).await?;
        Ok(env.data)
    }

    async fn chapter_pages(&self, chapter_id: &str) -> Result<Vec<String>> {
        let server: AtHomeServer = self
            .get_json(self.endpoint(&["at-home", "server", chapter_id])?)
            .await?;
        Ok(server.page_urls())
    }
}
