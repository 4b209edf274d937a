use serde::{Deserialize, Serialize};

/// CID link in its JSON form, `{"$link": "bafk..."}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CidLink {
    #[serde(rename = "$link")]
    pub link: String,
}

impl CidLink {
    pub fn new(link: impl Into<String>) -> Self {
        Self { link: link.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.link
    }
}

/// Reference to an uploaded blob, as returned by `com.atproto.repo.uploadBlob`
/// and embedded verbatim in records.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "$type", rename = "blob", rename_all = "camelCase")]
pub struct Blob {
    pub r#ref: CidLink,
    pub mime_type: String,
    pub size: u64,
}
