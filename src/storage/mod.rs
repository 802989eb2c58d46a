//! SQLite-backed persistence for podcasts and their episode collections.
//!
//! The layout is a keyed record store, nothing more: a `podcasts` table
//! keyed by `feed_url` (stable numeric id allocated by SQLite on first
//! subscription) and an `episodes` table keyed by `(podcast_id, guid)`.
//! Episode reconciliation lives in [`episodes`]: the merge itself is a
//! pure function, and [`db::Database::merge_episodes`] applies it with
//! read-then-write-whole-collection semantics inside one transaction.

mod db;
mod episodes;
mod podcasts;
mod types;

pub use db::Database;
pub use episodes::merge;
pub use types::{Episode, NewPodcast, Podcast};
