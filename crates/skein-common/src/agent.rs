//! XRPC client for the handful of PDS calls a poster needs, plus the
//! multi-step publish workflow layered on top of it.

use std::future::Future;

use bytes::Bytes;
use futures_util::future::try_join_all;
use mime_sniffer::MimeTypeSniffer;
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use skein_api::app_bsky::feed::{POST_NSID, Post};
use skein_api::com_atproto::identity::{RESOLVE_HANDLE_NSID, ResolveHandleOutput};
use skein_api::com_atproto::repo::{
    CREATE_RECORD_NSID, CreateRecordInput, CreateRecordOutput, UPLOAD_BLOB_NSID, UploadBlobOutput,
};
use skein_api::com_atproto::server::{
    CREATE_SESSION_NSID, CreateSessionInput, CreateSessionOutput,
};
use skein_api::{Blob, XrpcErrorBody};
use url::Url;

use crate::builder::PostBuilder;
use crate::embed::ImageAttachment;
use crate::error::SkeinError;
use crate::PublishResult;

/// An authenticated session on a PDS.
///
/// Tokens are not refreshed; a session lives as long as its access token.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub did: String,
    pub handle: String,
    access_jwt: String,
}

impl Session {
    pub fn access_jwt(&self) -> &str {
        &self.access_jwt
    }
}

impl From<CreateSessionOutput> for Session {
    fn from(out: CreateSessionOutput) -> Self {
        Self {
            did: out.did,
            handle: out.handle,
            access_jwt: out.access_jwt,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("did", &self.did)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// The single-step operations a post needs from the outside world.
///
/// [`Agent`] implements these over XRPC. The workflows in [`PostExt`] only go
/// through this trait.
pub trait AtpClient {
    /// DID of the logged-in account, the repo new records go to
    fn did(&self) -> Option<&str>;

    /// Download raw bytes of an image
    fn fetch_image<'a>(
        &'a self,
        uri: &'a Url,
    ) -> impl Future<Output = Result<Bytes, SkeinError>> + 'a;

    /// Upload bytes to the PDS, getting back a blob ref to embed
    fn upload_blob(&self, data: Bytes) -> impl Future<Output = Result<Blob, SkeinError>> + '_;

    /// Store a finished post in `repo`'s `app.bsky.feed.post` collection
    fn create_post<'a>(
        &'a self,
        repo: &'a str,
        post: &'a Post,
    ) -> impl Future<Output = Result<PublishResult, SkeinError>> + 'a;
}

/// Multi-step posting workflows on top of [`AtpClient`].
pub trait PostExt: AtpClient {
    /// Fetch and upload every attachment.
    ///
    /// Transfers run concurrently, but the returned blobs are in the same
    /// order as `images`, which is what [`PostBuilder::with_images`] pairs on.
    fn upload_images<'a>(
        &'a self,
        images: &'a [ImageAttachment],
    ) -> impl Future<Output = Result<Vec<Blob>, SkeinError>> + 'a {
        async move {
            let uploads = images.iter().map(|image| async move {
                let data = self.fetch_image(&image.source).await?;
                tracing::debug!(uri = %image.source, bytes = data.len(), "fetched image");
                self.upload_blob(data).await
            });
            try_join_all(uploads).await
        }
    }

    /// Build the post and submit it to the logged-in account's repo.
    fn publish(
        &self,
        builder: PostBuilder,
    ) -> impl Future<Output = Result<PublishResult, SkeinError>> + '_ {
        async move {
            let repo = self.did().ok_or(SkeinError::NotAuthenticated)?.to_owned();
            let post = builder.build()?;
            let published = self.create_post(&repo, &post).await?;
            tracing::info!(uri = %published.uri, cid = %published.cid, "published post");
            Ok(published)
        }
    }
}

impl<T: AtpClient> PostExt for T {}

/// XRPC agent bound to one PDS.
#[derive(Debug, Clone)]
pub struct Agent {
    http: reqwest::Client,
    pds: Url,
    session: Option<Session>,
}

impl Agent {
    pub fn new(pds: Url) -> Self {
        Self::with_client(reqwest::Client::default(), pds)
    }

    /// `pds` may carry a base path; XRPC calls go below it.
    pub fn with_client(http: reqwest::Client, mut pds: Url) -> Self {
        if !pds.path().ends_with('/') {
            let path = format!("{}/", pds.path());
            pds.set_path(&path);
        }
        Self {
            http,
            pds,
            session: None,
        }
    }

    pub fn pds(&self) -> &Url {
        &self.pds
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Log in with a handle (or DID / email) and an app password.
    pub async fn login(&mut self, identifier: &str, password: &str) -> Result<&Session, SkeinError> {
        let input = CreateSessionInput {
            identifier: identifier.to_owned(),
            password: password.to_owned(),
        };
        let request = self
            .http
            .post(self.xrpc_url(CREATE_SESSION_NSID)?)
            .json(&input);
        let output: CreateSessionOutput = self.send(CREATE_SESSION_NSID, request).await?;
        tracing::info!(did = %output.did, handle = %output.handle, "logged in");

        Ok(&*self.session.insert(output.into()))
    }

    /// Resolve a handle to its DID through the PDS.
    pub async fn resolve_handle(&self, handle: &str) -> Result<String, SkeinError> {
        let handle = handle.trim_start_matches('@');
        let request = self
            .http
            .get(self.xrpc_url(RESOLVE_HANDLE_NSID)?)
            .query(&[("handle", handle)]);
        let output: ResolveHandleOutput = self.send(RESOLVE_HANDLE_NSID, request).await?;
        Ok(output.did)
    }

    fn xrpc_url(&self, nsid: &str) -> Result<Url, SkeinError> {
        let path = format!("xrpc/{nsid}");
        self.pds
            .join(&path)
            .map_err(|e| SkeinError::invalid_url(path, e))
    }

    fn authed(&self, request: RequestBuilder) -> Result<RequestBuilder, SkeinError> {
        let session = self.session.as_ref().ok_or(SkeinError::NotAuthenticated)?;
        Ok(request.bearer_auth(session.access_jwt()))
    }

    async fn procedure<I, O>(&self, nsid: &'static str, input: &I) -> Result<O, SkeinError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let request = self.authed(self.http.post(self.xrpc_url(nsid)?))?.json(input);
        self.send(nsid, request).await
    }

    async fn send<O: DeserializeOwned>(
        &self,
        nsid: &'static str,
        request: RequestBuilder,
    ) -> Result<O, SkeinError> {
        tracing::debug!(nsid, "xrpc request");
        let response = request.send().await?;
        parse_response(nsid, response).await
    }
}

async fn parse_response<O: DeserializeOwned>(
    nsid: &'static str,
    response: Response,
) -> Result<O, SkeinError> {
    let status = response.status();
    let body = response.bytes().await?;
    if status.is_success() {
        return Ok(serde_json::from_slice(&body)?);
    }

    let XrpcErrorBody { error, message } =
        serde_json::from_slice(&body).unwrap_or_else(|_| XrpcErrorBody {
            error: status
                .canonical_reason()
                .unwrap_or("UnknownError")
                .to_owned(),
            message: None,
        });
    tracing::debug!(nsid, status = status.as_u16(), %error, "xrpc error");
    Err(SkeinError::Xrpc {
        nsid,
        status: status.as_u16(),
        error,
        message,
    })
}

impl AtpClient for Agent {
    fn did(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.did.as_str())
    }

    async fn fetch_image<'a>(&'a self, uri: &'a Url) -> Result<Bytes, SkeinError> {
        let response = self.http.get(uri.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SkeinError::Fetch {
                uri: uri.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?)
    }

    async fn upload_blob(&self, data: Bytes) -> Result<Blob, SkeinError> {
        let mime_type = data
            .sniff_mime_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        tracing::debug!(%mime_type, bytes = data.len(), "uploading blob");

        let request = self
            .authed(self.http.post(self.xrpc_url(UPLOAD_BLOB_NSID)?))?
            .header(CONTENT_TYPE, mime_type)
            .body(data);
        let output: UploadBlobOutput = self.send(UPLOAD_BLOB_NSID, request).await?;
        Ok(output.blob)
    }

    async fn create_post<'a>(
        &'a self,
        repo: &'a str,
        post: &'a Post,
    ) -> Result<PublishResult, SkeinError> {
        let input = CreateRecordInput {
            repo: repo.to_owned(),
            collection: POST_NSID.to_owned(),
            record: post,
        };
        let output: CreateRecordOutput = self.procedure(CREATE_RECORD_NSID, &input).await?;
        Ok(output.into())
    }
}
