//! `app.bsky.feed.post`

use super::embed::{ExternalEmbed, ImagesEmbed};
use super::richtext::Facet;
use crate::Datetime;
use serde::{Deserialize, Serialize};

pub const POST_NSID: &str = "app.bsky.feed.post";

/// Record containing a Bluesky post.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "$type", rename = "app.bsky.feed.post", rename_all = "camelCase")]
pub struct Post {
    pub text: String,
    pub created_at: Datetime,
    #[serde(default)]
    pub facets: Vec<Facet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<PostEmbed>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub langs: Vec<String>,
}

/// The single embed slot of a post.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "$type")]
pub enum PostEmbed {
    #[serde(rename = "app.bsky.embed.external")]
    External(ExternalEmbed),
    #[serde(rename = "app.bsky.embed.images")]
    Images(ImagesEmbed),
}
