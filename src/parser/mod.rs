//! Multi-format feed parsing.
//!
//! Normalizes RSS 1.0 (RDF), RSS 2.0, and Atom documents into [`Article`]
//! records. The three dialects each offer several optional sub-schemas for
//! the same semantic field (link, date, thumbnail), so extraction runs a
//! fixed priority cascade per field instead of trusting any one shape.

pub mod xml;

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use html_escape::decode_html_entities;
use regex::Regex;

use crate::app::{Result, WeirError};
use crate::domain::Article;
use xml::{parse_document, XmlElement};

/// Hard cap on articles ingested from a single document.
pub const MAX_ARTICLES_PER_FEED: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedFormat {
    Rss10,
    Rss20,
    Atom,
}

/// Parse a feed document into normalized articles, in document order.
///
/// Items without a resolvable link are skipped; no individual item can fail
/// the document. The only error path is a root that matches none of the
/// supported schemas (or XML that cannot be read at all).
pub fn parse_feed(
    feed_id: i64,
    feed_name: &str,
    xml_text: &str,
    fallback_thumbnail: Option<&str>,
) -> Result<Vec<Article>> {
    let root = parse_document(xml_text)?;
    let format = detect_format(&root)?;

    let entries: Vec<&XmlElement> = match format {
        FeedFormat::Rss10 => {
            // RSS 1.0 items are siblings of the channel; tolerate feeds that
            // nest them inside it anyway.
            let mut items: Vec<_> = root.children_named("item").collect();
            if items.is_empty() {
                if let Some(channel) = root.child("channel") {
                    items = channel.children_named("item").collect();
                }
            }
            items
        }
        FeedFormat::Rss20 => match root.child("channel") {
            Some(channel) => channel.children_named("item").collect(),
            None => Vec::new(),
        },
        FeedFormat::Atom => root.children_named("entry").collect(),
    };

    let articles = entries
        .into_iter()
        .filter_map(|entry| extract_article(entry, format, feed_id, feed_name, fallback_thumbnail))
        .take(MAX_ARTICLES_PER_FEED)
        .collect();

    Ok(articles)
}

/// Title of the feed document itself, for naming a new subscription.
pub fn parse_channel_title(xml_text: &str) -> Result<Option<String>> {
    let root = parse_document(xml_text)?;
    let format = detect_format(&root)?;

    let title = match format {
        FeedFormat::Rss10 | FeedFormat::Rss20 => {
            root.child("channel").and_then(|c| c.child_text("title"))
        }
        FeedFormat::Atom => root.child_text("title"),
    };

    Ok(title
        .map(|t| decode_html_entities(&t).trim().to_string())
        .filter(|t| !t.is_empty()))
}

/// First match wins: RDF root with a channel, `rss` root with a channel,
/// then an Atom `feed` root.
fn detect_format(root: &XmlElement) -> Result<FeedFormat> {
    if root.local_name() == "RDF" && root.child("channel").is_some() {
        return Ok(FeedFormat::Rss10);
    }
    if root.local_name() == "rss" && root.child("channel").is_some() {
        return Ok(FeedFormat::Rss20);
    }
    if root.local_name() == "feed" {
        return Ok(FeedFormat::Atom);
    }
    Err(WeirError::FeedFormat(format!(
        "root element <{}> is not RSS 1.0, RSS 2.0, or Atom",
        root.name
    )))
}

fn extract_article(
    entry: &XmlElement,
    format: FeedFormat,
    feed_id: i64,
    feed_name: &str,
    fallback_thumbnail: Option<&str>,
) -> Option<Article> {
    let link = extract_link(entry, format)?;

    let title = entry
        .child_text("title")
        .map(|t| decode_html_entities(&t).trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| link.clone());

    let summary = extract_summary(entry, format)
        .map(|s| decode_html_entities(&s).trim().to_string())
        .filter(|s| !s.is_empty());

    let mut article = Article::new(feed_id, feed_name, title, link);
    article.published_at = extract_published(entry, format).unwrap_or_else(Utc::now);
    article.thumbnail_url =
        extract_thumbnail(entry, summary.as_deref()).or_else(|| fallback_thumbnail.map(String::from));
    article.summary = summary;

    Some(article)
}

/// RSS links are plain text; Atom links are nodes needing rel/href
/// disambiguation.
fn extract_link(entry: &XmlElement, format: FeedFormat) -> Option<String> {
    let link = match format {
        FeedFormat::Rss10 | FeedFormat::Rss20 => entry.child_text("link"),
        FeedFormat::Atom => resolve_atom_link(entry),
    };
    link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty())
}

/// Prefer a bare href (no rel), then rel="alternate", then the first link
/// carrying an href at all.
fn resolve_atom_link(entry: &XmlElement) -> Option<String> {
    let links: Vec<&XmlElement> = entry.children_named("link").collect();

    links
        .iter()
        .find(|l| l.attr("rel").is_none() && l.attr("href").is_some())
        .or_else(|| {
            links
                .iter()
                .find(|l| l.attr("rel") == Some("alternate") && l.attr("href").is_some())
        })
        .or_else(|| links.iter().find(|l| l.attr("href").is_some()))
        .and_then(|l| l.attr("href"))
        .map(String::from)
}

fn extract_summary(entry: &XmlElement, format: FeedFormat) -> Option<String> {
    match format {
        FeedFormat::Rss10 | FeedFormat::Rss20 => entry.child_text("description"),
        // Unprefixed <content> only: media:content is a thumbnail, not a body.
        FeedFormat::Atom => entry.child_text("summary").or_else(|| {
            entry
                .children
                .iter()
                .find(|c| c.name == "content")
                .and_then(XmlElement::text)
        }),
    }
}

/// RSS 2.0 dates are RFC 2822 `pubDate`; RSS 1.0 uses `dc:date` and Atom
/// `published`/`updated`, both RFC 3339. Each site tolerates the other
/// format since feeds mix them up in the wild.
fn extract_published(entry: &XmlElement, format: FeedFormat) -> Option<DateTime<Utc>> {
    let raw = match format {
        FeedFormat::Rss20 => entry.child_text("pubDate"),
        FeedFormat::Rss10 => entry.child_text("date"),
        FeedFormat::Atom => entry
            .child_text("published")
            .or_else(|| entry.child_text("updated")),
    }?;
    parse_date(&raw)
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Thumbnail cascade, first hit wins: media:thumbnail / media:content node,
/// image-typed enclosure, first `<img src>` in the summary HTML, then the
/// caller-supplied feed icon (handled by the caller).
fn extract_thumbnail(entry: &XmlElement, summary: Option<&str>) -> Option<String> {
    if let Some(url) = media_thumbnail(entry) {
        return Some(url);
    }

    if let Some(url) = entry
        .children_named("enclosure")
        .find(|e| e.attr("type").is_some_and(|t| t.starts_with("image/")))
        .and_then(|e| e.attr("url"))
    {
        return Some(url.to_string());
    }

    summary.and_then(first_img_src)
}

fn media_thumbnail(entry: &XmlElement) -> Option<String> {
    // Qualified names here: a bare <content> in an Atom entry is the body,
    // not Media RSS.
    let media: Vec<&XmlElement> = entry
        .children
        .iter()
        .filter(|c| c.prefix() == Some("media"))
        .collect();

    if let Some(url) = media
        .iter()
        .find(|m| m.local_name() == "thumbnail")
        .and_then(|m| m.attr("url"))
    {
        return Some(url.to_string());
    }

    media
        .iter()
        .find(|m| {
            m.local_name() == "content"
                && m.attr("url").is_some()
                && (m.attr("medium") == Some("image")
                    || m.attr("type").is_none_or(|t| t.starts_with("image/")))
        })
        .and_then(|m| m.attr("url"))
        .map(String::from)
}

fn first_img_src(html: &str) -> Option<String> {
    static IMG_SRC: OnceLock<Regex> = OnceLock::new();
    let re = IMG_SRC.get_or_init(|| {
        Regex::new(r#"<img[^>]+src\s*=\s*["']([^"']+)["']"#).expect("valid img regex")
    });
    re.captures(html).map(|c| c[1].to_string())
}
