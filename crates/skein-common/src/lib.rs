//! Compose and publish Bluesky posts.
//!
//! [`PostBuilder`] turns text plus anchored facets and an optional embed into
//! an `app.bsky.feed.post` record. [`Agent`] logs in to a PDS, uploads images
//! and submits the record.

pub mod agent;
pub mod builder;
pub mod config;
pub mod embed;
pub mod error;
pub mod richtext;
pub mod telemetry;

pub use crate::agent::{Agent, AtpClient, PostExt, Session};
pub use crate::builder::PostBuilder;
pub use crate::embed::{ExternalLink, ImageAttachment};
pub use crate::error::{BuildError, SkeinError};
pub use crate::richtext::{FacetKind, FacetRequest};

// Re-export the lexicon types for convenience
pub use skein_api;

use skein_api::com_atproto::repo::CreateRecordOutput;

pub const DEFAULT_PDS: &str = "https://bsky.social";

/// Where a created record ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    /// `at://` URI of the record
    pub uri: String,
    pub cid: String,
}

impl From<CreateRecordOutput> for PublishResult {
    fn from(out: CreateRecordOutput) -> Self {
        Self {
            uri: out.uri,
            cid: out.cid,
        }
    }
}
