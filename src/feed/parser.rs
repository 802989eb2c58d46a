//! RSS feed parsing with the fallback rules podcast feeds need in practice.
//!
//! Channel-level validation is strict and fail-fast: well-formed XML, a
//! channel element, a non-blank channel title, in that order. Everything
//! at the episode level is forgiving: missing titles default, missing
//! guids fall back through the identity chain, unparseable dates pass
//! through as raw text. No item element is ever silently dropped.

use chrono::{DateTime, Utc};

use super::xml::{self, Element};
use super::FeedError;
use crate::util::{identity_key, TIMESTAMP_FORMAT};

/// Title substituted when an item has no usable title element.
pub const UNTITLED_EPISODE: &str = "Untitled Episode";

/// Channel metadata plus episodes, in document order. Transient: lives for
/// one subscribe-or-refresh operation, then the merged result is persisted
/// and this is discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFeed {
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub episodes: Vec<ParsedEpisode>,
}

/// One episode as extracted from an `<item>` element.
///
/// `guid` is always non-empty: items without a declared guid fall back to
/// audio_url, then link, then title, and title itself always resolves via
/// [`UNTITLED_EPISODE`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEpisode {
    pub guid: String,
    pub title: String,
    pub description: Option<String>,
    pub audio_url: Option<String>,
    pub link: Option<String>,
    pub published_at: Option<String>,
    pub duration: Option<String>,
}

/// Parses raw feed XML into a [`ParsedFeed`].
///
/// Either the whole parse succeeds or it fails; no partial feed is ever
/// returned.
pub fn parse_feed(raw_xml: &str) -> Result<ParsedFeed, FeedError> {
    let root = xml::parse(raw_xml).map_err(|e| {
        tracing::debug!(error = %e, "Feed XML rejected");
        FeedError::NotWellFormed
    })?;

    let channel = if root.local_name() == "channel" {
        &root
    } else {
        root.descendant("channel").ok_or(FeedError::MissingChannel)?
    };

    let title = channel
        .child("title")
        .and_then(Element::text)
        .ok_or(FeedError::MissingChannelTitle)?
        .to_string();

    let description = channel
        .child("description")
        .and_then(Element::text)
        .or_else(|| channel.child_any("subtitle").and_then(Element::text))
        .map(str::to_string);
    let link = channel
        .child("link")
        .and_then(Element::text)
        .map(str::to_string);
    let image_url = extract_image_url(channel);

    let episodes = channel
        .descendants("item")
        .into_iter()
        .map(parse_episode)
        .collect();

    Ok(ParsedFeed {
        title,
        description,
        link,
        image_url,
        episodes,
    })
}

/// Channel image, first match wins: `<image><url>` text, then a prefixed
/// (itunes-style) image element's `href`/`url` attribute, then a thumbnail
/// element's `url`/`href` attribute.
fn extract_image_url(channel: &Element) -> Option<String> {
    if let Some(url) = channel
        .child("image")
        .and_then(|image| image.child("url"))
        .and_then(Element::text)
    {
        return Some(url.to_string());
    }

    if let Some(href) = channel
        .child_prefixed("image")
        .and_then(|image| image.attr("href").or_else(|| image.attr("url")))
    {
        return Some(href.to_string());
    }

    channel
        .child_any("thumbnail")
        .and_then(|thumb| thumb.attr("url").or_else(|| thumb.attr("href")))
        .map(str::to_string)
}

fn parse_episode(item: &Element) -> ParsedEpisode {
    let declared_guid = item
        .child("guid")
        .and_then(Element::text)
        .or_else(|| item.child("id").and_then(Element::text));

    let title = item
        .child("title")
        .and_then(Element::text)
        .unwrap_or(UNTITLED_EPISODE)
        .to_string();

    let description = item
        .child("description")
        .and_then(Element::text)
        .or_else(|| item.child_ns("content", "encoded").and_then(Element::text))
        .or_else(|| item.child_any("summary").and_then(Element::text))
        .map(str::to_string);

    let link = item
        .child("link")
        .and_then(Element::text)
        .map(str::to_string);

    let audio_url = item
        .child("enclosure")
        .and_then(|enclosure| enclosure.attr("url"))
        .or_else(|| {
            item.child_prefixed("content")
                .and_then(|media| media.attr("url").or_else(|| media.text()))
        })
        .map(str::to_string);

    let published_at = item
        .child("pubDate")
        .and_then(Element::text)
        .or_else(|| item.child_any("published").and_then(Element::text))
        .map(normalize_pub_date);

    let duration = item
        .child_ns("itunes", "duration")
        .and_then(Element::text)
        .or_else(|| item.child_any("duration").and_then(Element::text))
        .map(str::to_string);

    // The guid fallback chain mirrors the reconciler's identity key, so
    // fallback-keyed episodes still dedupe across re-fetches.
    let guid = identity_key(
        declared_guid,
        audio_url.as_deref(),
        link.as_deref(),
        Some(&title),
    )
    .unwrap_or(UNTITLED_EPISODE)
    .to_string();

    ParsedEpisode {
        guid,
        title,
        description,
        audio_url,
        link,
        published_at,
        duration,
    }
}

/// Normalizes a pubDate string to `YYYY-MM-DD HH:MM:SS` UTC.
///
/// RSS uses RFC 2822 dates; some feeds emit RFC 3339. Anything else passes
/// through unchanged rather than failing the parse.
fn normalize_pub_date(raw: &str) -> String {
    let parsed = DateTime::parse_from_rfc2822(raw).or_else(|_| DateTime::parse_from_rfc3339(raw));
    match parsed {
        Ok(date) => date.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string(),
        Err(_) => {
            tracing::debug!(raw = %raw, "Could not parse pubDate, keeping raw text");
            raw.to_string()
        }
    }
}
