//! Feed ingestion: fetching RSS documents over HTTP and parsing them into
//! normalized podcast/episode data.
//!
//! The module is organized into three submodules:
//!
//! - [`fetcher`] - Single-attempt HTTP retrieval of the raw feed text
//! - [`xml`] - Minimal element tree over `quick-xml` used by the parser
//! - [`parser`] - RSS XML to [`parser::ParsedFeed`] with fallback rules
//!
//! All failures surface as one error kind, [`FeedError`]; callers branch on
//! "did this fail" plus the message text. Episode-level oddities (missing
//! fields, unparseable dates) never fail the operation; they degrade to
//! defaults or absent values. Only channel-level validation is fatal.

mod fetcher;
mod parser;
mod xml;

use thiserror::Error;

pub use fetcher::{feed_client, fetch_feed, USER_AGENT};
pub use parser::{parse_feed, ParsedEpisode, ParsedFeed};

/// The single error kind for a subscribe-or-refresh attempt.
///
/// Variants exist only to carry the distinct message shapes; no caller
/// dispatches on them structurally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedError {
    /// The server answered with a non-success status code.
    #[error("feed retrieval failed ({0})")]
    Status(u16),

    /// Transport-level failure: DNS, timeout, connection reset, TLS.
    #[error("feed retrieval failed: {0}")]
    Transport(String),

    /// The response body could not be parsed as XML.
    #[error("feed XML is not well-formed")]
    NotWellFormed,

    /// The XML parsed but contains no channel element.
    #[error("feed is missing channel information")]
    MissingChannel,

    /// The channel has no title, the only mandatory channel field.
    #[error("feed channel is missing a title")]
    MissingChannelTitle,
}
