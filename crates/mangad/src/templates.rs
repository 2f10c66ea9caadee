//! HTML templates for the manga frontend
//!
//! Each page function takes a borrowed view struct and returns the full
//! document. Everything that comes from upstream is escaped here;
//! `encode_minimal` also covers `"` and `'` so it is safe inside attributes.

use htmlescape::encode_minimal;
use mangadex::models::{Chapter, ChapterData};
use mangadex::Manga;
use url::form_urlencoded::byte_serialize;

/// Data for the home page
pub struct HomePage<'a> {
    pub search: &'a str,
    pub results: &'a [Manga],
    pub popular: &'a [Manga],
    pub recent: &'a [Manga],
    pub random: &'a [Manga],
}

/// Data for a manga's detail page
pub struct MangaPage<'a> {
    pub manga: &'a Manga,
    pub chapters: &'a [ChapterData],
    pub total: u32,
    pub page: u32,
    pub total_pages: u32,
}

/// Data for the chapter reader
pub struct ReaderPage<'a> {
    pub chapter: &'a Chapter,
    pub pages: &'a [String],
    pub manga_id: &'a str,
    pub prev_chapter: Option<&'a str>,
    pub next_chapter: Option<&'a str>,
}

/// Data for the paginated popular/recent lists
pub struct ListPage<'a> {
    pub title: &'a str,
    pub base_url: &'a str,
    pub mangas: &'a [Manga],
    pub prev_page: u32,
    pub next_page: u32,
}

/// Base HTML layout with header, search box and content slot
pub fn base_template(title: &str, back_link: Option<&str>, content: &str) -> String {
    let back = back_link
        .map(|href| format!(r#"<a class="back" href="{}">&larr; Back</a>"#, encode_minimal(href)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Manga</title>
    <link rel="stylesheet" href="/static/style.css">
</head>
<body>
    <header class="header">
        <a class="brand" href="/">Manga</a>
        <nav>
            <a href="/popular">Popular</a>
            <a href="/recent">Recent</a>
        </nav>
        <form action="/" method="get">
            <input type="search" name="search" placeholder="Search manga...">
        </form>
    </header>
    <main class="content">
        {back}
        {content}
    </main>
</body>
</html>"#,
        title = encode_minimal(title),
        back = back,
        content = content,
    )
}

/// Route an upstream image through `/image-proxy`
fn proxied(url: &str) -> String {
    format!("/image-proxy?url={}", byte_serialize(url.as_bytes()).collect::<String>())
}

/// Percent-encode an id for use as one URL path segment
fn path_segment(id: &str) -> String {
    // form encoding turns spaces into '+', which a path would keep literally
    byte_serialize(id.as_bytes()).collect::<String>().replace('+', "%20")
}

fn manga_card(manga: &Manga) -> String {
    let cover = match &manga.attributes.cover_url {
        Some(url) => format!(
            r#"<img src="{}" alt="{}" loading="lazy">"#,
            encode_minimal(&proxied(url)),
            encode_minimal(manga.display_title())
        ),
        None => r#"<div class="no-cover">No cover</div>"#.to_string(),
    };

    format!(
        r#"<a class="card" href="/manga/{id}">{cover}<span class="card-title">{title}</span></a>"#,
        id = path_segment(&manga.id),
        cover = cover,
        title = encode_minimal(manga.display_title()),
    )
}

fn manga_grid(mangas: &[Manga]) -> String {
    if mangas.is_empty() {
        return r#"<p class="empty">Nothing to show.</p>"#.to_string();
    }
    let cards: Vec<String> = mangas.iter().map(manga_card).collect();
    format!(r#"<div class="grid">{}</div>"#, cards.join("\n"))
}

fn section(heading: &str, more_link: Option<&str>, mangas: &[Manga]) -> String {
    let more = more_link
        .map(|href| format!(r#" <a class="more" href="{}">See all</a>"#, href))
        .unwrap_or_default();
    format!(
        "<section><h2>{}{}</h2>{}</section>",
        encode_minimal(heading),
        more,
        manga_grid(mangas)
    )
}

/// Home page: search results, or the popular/recent/random sections
pub fn home(data: &HomePage<'_>) -> String {
    let content = if data.search.is_empty() {
        [
            section("Popular", Some("/popular"), data.popular),
            section("Recently Updated", Some("/recent"), data.recent),
            section("Random Picks", None, data.random),
        ]
        .join("\n")
    } else {
        section(&format!("Results for \"{}\"", data.search), None, data.results)
    };

    base_template("Home", None, &content)
}

fn chapter_label(chapter: &ChapterData) -> String {
    let attrs = &chapter.attributes;
    let mut label = String::new();
    if let Some(volume) = attrs.volume.as_deref().filter(|v| !v.is_empty()) {
        label.push_str(&format!("Vol. {} ", volume));
    }
    match attrs.chapter.as_deref().filter(|c| !c.is_empty()) {
        Some(number) => label.push_str(&format!("Ch. {}", number)),
        None => label.push_str("Oneshot"),
    }
    if let Some(title) = attrs.title.as_deref().filter(|t| !t.is_empty()) {
        label.push_str(&format!(" - {}", title));
    }
    label
}

fn pager(base_url: &str, prev: u32, next: Option<u32>) -> String {
    let mut links = Vec::new();
    if prev > 0 {
        links.push(format!(r#"<a href="{}?page={}">&larr; Previous</a>"#, base_url, prev));
    }
    if let Some(next) = next {
        links.push(format!(r#"<a href="{}?page={}">Next &rarr;</a>"#, base_url, next));
    }
    format!(r#"<nav class="pager">{}</nav>"#, links.join(" "))
}

/// Manga detail page with one page of its chapter feed
pub fn manga(data: &MangaPage<'_>) -> String {
    let manga = data.manga;
    let cover = manga
        .attributes
        .cover_url
        .as_deref()
        .map(|url| format!(r#"<img class="cover" src="{}" alt="">"#, encode_minimal(&proxied(url))))
        .unwrap_or_default();

    let chapters: Vec<String> = data
        .chapters
        .iter()
        .map(|chapter| {
            format!(
                r#"<li><a href="/manga/{}/read/{}">{}</a></li>"#,
                path_segment(&manga.id),
                path_segment(&chapter.id),
                encode_minimal(&chapter_label(chapter))
            )
        })
        .collect();

    let base_url = format!("/manga/{}", path_segment(&manga.id));
    let next = (data.page < data.total_pages).then_some(data.page + 1);

    let content = format!(
        r#"<article class="manga">
    {cover}
    <h1>{title}</h1>
    <p class="description">{description}</p>
    <h2>Chapters ({total})</h2>
    <ul class="chapters">{chapters}</ul>
    <p class="page-info">Page {page} of {total_pages}</p>
    {pager}
</article>"#,
        cover = cover,
        title = encode_minimal(manga.display_title()),
        description = encode_minimal(manga.display_description()),
        total = data.total,
        chapters = chapters.join("\n"),
        page = data.page,
        total_pages = data.total_pages.max(1),
        pager = pager(&base_url, data.page - 1, next),
    );

    base_template(manga.display_title(), Some("/"), &content)
}

/// Chapter reader: every page image in order plus prev/next links
pub fn reader(data: &ReaderPage<'_>) -> String {
    let manga_id = path_segment(data.manga_id);
    let title = data
        .chapter
        .attributes
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .or(data.chapter.attributes.chapter.as_deref())
        .unwrap_or("Chapter");

    let pages: Vec<String> = data
        .pages
        .iter()
        .enumerate()
        .map(|(i, url)| {
            format!(
                r#"<img class="page" src="{}" alt="Page {}" loading="lazy">"#,
                encode_minimal(&proxied(url)),
                i + 1
            )
        })
        .collect();

    let link = |label: &str, chapter: Option<&str>| {
        chapter
            .map(|id| {
                format!(
                    r#"<a href="/manga/{}/read/{}">{}</a>"#,
                    manga_id,
                    path_segment(id),
                    label
                )
            })
            .unwrap_or_default()
    };
    let nav = format!(
        r#"<nav class="pager">{} {}</nav>"#,
        link("&larr; Previous chapter", data.prev_chapter),
        link("Next chapter &rarr;", data.next_chapter)
    );

    let content = format!(
        r#"<h1>{title}</h1>
{nav}
<div class="reader">{pages}</div>
{nav}"#,
        title = encode_minimal(title),
        nav = nav,
        pages = pages.join("\n"),
    );

    let back = format!("/manga/{}", manga_id);
    base_template(title, Some(back.as_str()), &content)
}

/// Paginated popular/recent list
pub fn manga_list(data: &ListPage<'_>) -> String {
    let next = (!data.mangas.is_empty()).then_some(data.next_page);
    let content = format!(
        "<h1>{}</h1>{}{}",
        encode_minimal(data.title),
        manga_grid(data.mangas),
        pager(data.base_url, data.prev_page, next)
    );
    base_template(data.title, Some("/"), &content)
}
