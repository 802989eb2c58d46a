//! Episode reconciliation: merging a freshly parsed episode list into a
//! podcast's stored collection.
//!
//! Identity is the shared fallback chain from [`crate::util::identity_key`];
//! the merge is last-write-wins with no field-level blending. Episodes that
//! disappear from the feed are retained until the podcast is deleted.

use std::collections::HashMap;

use anyhow::Result;

use super::db::Database;
use super::types::Episode;
use crate::util::identity_key;

fn episode_key(episode: &Episode) -> Option<&str> {
    identity_key(
        Some(&episode.guid),
        episode.audio_url.as_deref(),
        episode.link.as_deref(),
        Some(&episode.title),
    )
}

/// Merges `incoming` episodes over `existing` ones.
///
/// Builds an insertion-ordered mapping seeded with the existing collection,
/// then overlays each incoming episode under its identity key: an incoming
/// episode with a known key replaces the stored entry unconditionally, even
/// when the incoming data is less complete. Result order is existing keys
/// first (replacements in place), then new keys in incoming order — callers
/// re-sort for presentation and must not rely on it.
///
/// Records with no identity key at all (blank guid, audio_url, link and
/// title) cannot be reconciled and are dropped; parser output always has a
/// key.
pub fn merge(existing: Vec<Episode>, incoming: Vec<Episode>) -> Vec<Episode> {
    let mut order: Vec<String> = Vec::new();
    let mut by_key: HashMap<String, Episode> = HashMap::new();

    for episode in existing.into_iter().chain(incoming) {
        let Some(key) = episode_key(&episode).map(str::to_string) else {
            tracing::debug!(title = %episode.title, "Dropping episode with no identity key");
            continue;
        };
        if by_key.insert(key.clone(), episode).is_none() {
            order.push(key);
        }
    }

    order.into_iter().filter_map(|k| by_key.remove(&k)).collect()
}

impl Database {
    // ========================================================================
    // Episode Operations
    // ========================================================================

    /// Merge incoming episodes into a podcast's stored collection.
    ///
    /// Reads the authoritative existing set, merges in memory, and rewrites
    /// the whole collection in a single transaction, so a merge is never
    /// observed half-applied. Returns the size of the merged collection.
    pub async fn merge_episodes(&self, podcast_id: i64, incoming: Vec<Episode>) -> Result<usize> {
        let existing = self.stored_episodes(podcast_id).await?;
        let merged = merge(existing, incoming);

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM episodes WHERE podcast_id = ?")
            .bind(podcast_id)
            .execute(&mut *tx)
            .await?;
        for episode in &merged {
            sqlx::query(
                r#"
                INSERT INTO episodes (
                    podcast_id, guid, title, description, audio_url, link, published_at, duration
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            )
            .bind(podcast_id)
            .bind(&episode.guid)
            .bind(&episode.title)
            .bind(&episode.description)
            .bind(&episode.audio_url)
            .bind(&episode.link)
            .bind(&episode.published_at)
            .bind(&episode.duration)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(merged.len())
    }

    /// Episodes for display, newest published first. Episodes without a
    /// publish date sort last.
    pub async fn episodes_for_podcast(&self, podcast_id: i64) -> Result<Vec<Episode>> {
        let episodes = sqlx::query_as::<_, Episode>(
            r#"
            SELECT guid, title, description, audio_url, link, published_at, duration
            FROM episodes
            WHERE podcast_id = ?
            ORDER BY COALESCE(published_at, '') DESC, id DESC
        "#,
        )
        .bind(podcast_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(episodes)
    }

    /// The stored collection in insertion order, as the merge expects it.
    pub(crate) async fn stored_episodes(&self, podcast_id: i64) -> Result<Vec<Episode>> {
        let episodes = sqlx::query_as::<_, Episode>(
            r#"
            SELECT guid, title, description, audio_url, link, published_at, duration
            FROM episodes
            WHERE podcast_id = ?
            ORDER BY id
        "#,
        )
        .bind(podcast_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(episodes)
    }
}
