//! Typed records decoded from MangaDex responses
//!
//! Every record tolerates missing or null fields: upstream payloads are
//! sparse and we only read what the pages render.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Standard response envelope: `{ "result": "ok", "data": ..., "total": n }`
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Upstream status word ("ok" / "error")
    #[serde(default)]
    pub result: String,

    /// Payload
    pub data: T,

    /// Total matches for list endpoints
    #[serde(default)]
    pub total: Option<u32>,
}

/// Language code to text, e.g. `{"en": "Berserk"}`
pub type LocalizedString = HashMap<String, String>;

/// A manga entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manga {
    /// Upstream UUID
    pub id: String,

    /// Title, description and the looked-up cover
    #[serde(default)]
    pub attributes: MangaAttributes,
}

/// Attributes of a [`Manga`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MangaAttributes {
    #[serde(default, deserialize_with = "localized")]
    pub title: LocalizedString,

    #[serde(default, deserialize_with = "localized")]
    pub description: LocalizedString,

    /// Not part of the upstream record; filled by a cover lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

impl Manga {
    /// Title in English when available, otherwise any language, otherwise the id
    pub fn display_title(&self) -> &str {
        pick_language(&self.attributes.title).unwrap_or(&self.id)
    }

    /// Description in English when available, otherwise any language
    pub fn display_description(&self) -> &str {
        pick_language(&self.attributes.description).unwrap_or("")
    }
}

fn pick_language(text: &LocalizedString) -> Option<&str> {
    text.get("en")
        .or_else(|| {
            // deterministic fallback across HashMap iteration orders
            text.keys().min().and_then(|k| text.get(k))
        })
        .map(String::as_str)
}

/// Upstream encodes an empty localized map as `[]`
fn localized<'de, D>(deserializer: D) -> std::result::Result<LocalizedString, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MapOrList {
        Map(LocalizedString),
        List(Vec<serde_json::Value>),
        Null(()),
    }

    Ok(match MapOrList::deserialize(deserializer)? {
        MapOrList::Map(map) => map,
        MapOrList::List(_) | MapOrList::Null(()) => LocalizedString::new(),
    })
}

/// One page of a manga's chapter feed
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChapterList {
    #[serde(default)]
    pub result: String,

    #[serde(default)]
    pub data: Vec<ChapterData>,

    #[serde(default)]
    pub total: u32,
}

impl ChapterList {
    /// Ids of the chapters before and after `chapter_id` in this list
    pub fn neighbours(&self, chapter_id: &str) -> (Option<&str>, Option<&str>) {
        match self.data.iter().position(|c| c.id == chapter_id) {
            Some(i) => (
                i.checked_sub(1).map(|p| self.data[p].id.as_str()),
                self.data.get(i + 1).map(|c| c.id.as_str()),
            ),
            None => (None, None),
        }
    }
}

/// A chapter entry from the feed endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChapterData {
    pub id: String,

    #[serde(default)]
    pub attributes: ChapterAttributes,
}

/// Attributes of a [`ChapterData`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChapterAttributes {
    /// Chapter number as text, may be absent for oneshots
    #[serde(default)]
    pub chapter: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub volume: Option<String>,
}

/// A chapter's detail record
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Chapter {
    pub id: String,

    #[serde(default)]
    pub attributes: ChapterDetail,
}

/// Attributes of a [`Chapter`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChapterDetail {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub chapter: Option<String>,
}

/// One cover art entry
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CoverData {
    pub id: String,

    #[serde(default)]
    pub attributes: CoverAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CoverAttributes {
    #[serde(rename = "fileName", default)]
    pub file_name: String,
}

/// Response of `/at-home/server/{chapter_id}`
#[derive(Debug, Clone, Deserialize)]
pub struct AtHomeServer {
    #[serde(rename = "baseUrl")]
    pub base_url: String,

    pub chapter: AtHomeChapter,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AtHomeChapter {
    pub hash: String,

    #[serde(default)]
    pub data: Vec<String>,
}

impl AtHomeServer {
    /// Full-quality page image URLs in reading order
    pub fn page_urls(&self) -> Vec<String> {
        self.chapter
            .data
            .iter()
            .map(|file| format!("{}/data/{}/{}", self.base_url, self.chapter.hash, file))
            .collect()
    }
}
