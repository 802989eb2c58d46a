//! The subscribe-or-refresh workflow tying fetcher, parser and storage
//! together.

use anyhow::{bail, Result};

use crate::feed::{fetch_feed, parse_feed, ParsedEpisode};
use crate::storage::{Database, Episode, NewPodcast, Podcast};
use crate::util::now_stamp;

/// Subscribe to a feed URL, or refresh an existing subscription.
///
/// Fetches and parses the feed, replaces the podcast's metadata wholesale
/// (keeping its stable id when the feed_url is already known), and merges
/// the parsed episodes into the stored collection. Nothing is persisted
/// unless the whole fetch-and-parse succeeds.
///
/// # Errors
///
/// A [`crate::feed::FeedError`] from the fetch or parse stage propagates
/// in the error chain; storage failures surface as generic errors. No
/// retry is attempted at any layer.
pub async fn subscribe_to_feed(
    db: &Database,
    client: &reqwest::Client,
    feed_url: &str,
) -> Result<Podcast> {
    let feed_url = feed_url.trim();
    if feed_url.is_empty() {
        bail!("feed URL cannot be empty");
    }

    let raw = fetch_feed(client, feed_url).await?;
    let parsed = parse_feed(&raw)?;

    let now = now_stamp();
    let podcast = db
        .upsert_podcast(&NewPodcast {
            title: &parsed.title,
            description: parsed.description.as_deref(),
            link: parsed.link.as_deref(),
            feed_url,
            image_url: parsed.image_url.as_deref(),
            updated_at: &now,
        })
        .await?;

    let episode_count = parsed.episodes.len();
    let incoming: Vec<Episode> = parsed.episodes.into_iter().map(into_episode).collect();
    db.merge_episodes(podcast.id, incoming).await?;

    tracing::info!(
        podcast_id = podcast.id,
        title = %podcast.title,
        episodes = episode_count,
        "Subscribed to feed"
    );
    Ok(podcast)
}

fn into_episode(parsed: ParsedEpisode) -> Episode {
    Episode {
        guid: parsed.guid,
        title: parsed.title,
        description: parsed.description,
        audio_url: parsed.audio_url,
        link: parsed.link,
        published_at: parsed.published_at,
        duration: parsed.duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_url_rejected_before_any_io() {
        let db = Database::open(":memory:").await.unwrap();
        let client = reqwest::Client::new();
        let err = subscribe_to_feed(&db, &client, "   ").await.unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }
}
