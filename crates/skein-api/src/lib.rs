//! Lexicon types for the small slice of AT Protocol that skein touches.
//!
//! Records and XRPC bodies are plain serde structs. Open unions are modelled as
//! enums internally tagged on `$type`, so the wire identifiers live next to the
//! variants they name.

pub mod app_bsky;
pub mod blob;
pub mod com_atproto;
pub mod datetime;

pub use blob::{Blob, CidLink};
pub use datetime::Datetime;

/// Body returned by a PDS for any failed XRPC call.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct XrpcErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
