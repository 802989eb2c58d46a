use anyhow::Result;

use super::db::Database;
use super::types::{NewPodcast, Podcast};

impl Database {
    // ========================================================================
    // Podcast Operations
    // ========================================================================

    /// Insert or update a podcast by its feed URL.
    ///
    /// For a given `feed_url` at most one podcast ever exists: re-subscribing
    /// finds the existing row, replaces its metadata wholesale, and keeps the
    /// original id. The id itself is allocated by SQLite on first insert.
    pub async fn upsert_podcast(&self, podcast: &NewPodcast<'_>) -> Result<Podcast> {
        let stored = sqlx::query_as::<_, Podcast>(
            r#"
            INSERT INTO podcasts (title, description, link, feed_url, image_url, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(feed_url) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                link = excluded.link,
                image_url = excluded.image_url,
                updated_at = excluded.updated_at
            RETURNING id, title, description, link, feed_url, image_url, updated_at
        "#,
        )
        .bind(podcast.title)
        .bind(podcast.description)
        .bind(podcast.link)
        .bind(podcast.feed_url)
        .bind(podcast.image_url)
        .bind(podcast.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    /// Get a single podcast by id.
    pub async fn get_podcast(&self, podcast_id: i64) -> Result<Option<Podcast>> {
        let podcast = sqlx::query_as::<_, Podcast>(
            r#"
            SELECT id, title, description, link, feed_url, image_url, updated_at
            FROM podcasts
            WHERE id = ?
        "#,
        )
        .bind(podcast_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(podcast)
    }

    /// All podcasts, most recently updated first.
    pub async fn list_podcasts(&self) -> Result<Vec<Podcast>> {
        let podcasts = sqlx::query_as::<_, Podcast>(
            r#"
            SELECT id, title, description, link, feed_url, image_url, updated_at
            FROM podcasts
            ORDER BY updated_at DESC, id DESC
        "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(podcasts)
    }

    /// Delete a podcast and its whole episode collection as a unit.
    ///
    /// Idempotent; returns the number of episodes removed. The cascade is
    /// enforced by the foreign key, so no orphaned episodes can remain.
    pub async fn delete_podcast(&self, podcast_id: i64) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let (episode_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM episodes WHERE podcast_id = ?")
                .bind(podcast_id)
                .fetch_one(&mut *tx)
                .await?;

        let deleted = sqlx::query("DELETE FROM podcasts WHERE id = ?")
            .bind(podcast_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        if deleted.rows_affected() == 0 {
            return Ok(0);
        }
        Ok(episode_count as u64)
    }
}
