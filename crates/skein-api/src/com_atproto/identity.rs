//! `com.atproto.identity.*`

use serde::{Deserialize, Serialize};

pub const RESOLVE_HANDLE_NSID: &str = "com.atproto.identity.resolveHandle";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResolveHandleOutput {
    pub did: String,
}
