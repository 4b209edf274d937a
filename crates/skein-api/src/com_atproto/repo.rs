//! `com.atproto.repo.*`

use crate::Blob;
use serde::{Deserialize, Serialize};

pub const UPLOAD_BLOB_NSID: &str = "com.atproto.repo.uploadBlob";
pub const CREATE_RECORD_NSID: &str = "com.atproto.repo.createRecord";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadBlobOutput {
    pub blob: Blob,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateRecordInput<R> {
    /// Handle or DID of the repo (aka, current account).
    pub repo: String,
    /// NSID of the record collection.
    pub collection: String,
    pub record: R,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateRecordOutput {
    pub uri: String,
    pub cid: String,
}
