use sqlx::FromRow;

// ============================================================================
// Data Structures
// ============================================================================

/// A stored podcast subscription.
///
/// `id` is assigned once at first subscription and never changes on
/// re-fetch; `feed_url` is the natural external key (unique). All other
/// metadata is replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Podcast {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub feed_url: String,
    pub image_url: Option<String>,
    pub updated_at: String,
}

/// Podcast fields as produced by one subscribe-or-refresh operation,
/// before storage has resolved the stable id.
#[derive(Debug, Clone)]
pub struct NewPodcast<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub link: Option<&'a str>,
    pub feed_url: &'a str,
    pub image_url: Option<&'a str>,
    pub updated_at: &'a str,
}

/// A stored episode. Identity is scoped to the owning podcast; within one
/// podcast's collection no two episodes share an identity key.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Episode {
    pub guid: String,
    pub title: String,
    pub description: Option<String>,
    pub audio_url: Option<String>,
    pub link: Option<String>,
    pub published_at: Option<String>,
    pub duration: Option<String>,
}
