//! podcatch — a podcast subscription manager.
//!
//! The library is the whole application minus the CLI shell: feed
//! ingestion ([`feed`]), persistence ([`storage`]), and the subscribe
//! workflow that ties them together ([`subscription`]).

pub mod config;
pub mod feed;
pub mod storage;
pub mod subscription;
pub mod util;
