//! Error types for skein - build failures from the core, everything else from
//! the collaborators around it

use miette::Diagnostic;

/// Reasons a [`PostBuilder`](crate::builder::PostBuilder) refuses to produce a
/// record.
#[derive(thiserror::Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A facet's anchor text does not occur in the final post text
    #[error("facet anchor {anchor:?} not found in post text")]
    #[diagnostic(
        code(skein::build::anchor_not_found),
        help("anchor text must appear verbatim in the post text")
    )]
    AnchorNotFound { anchor: String },

    /// Attachments and uploaded blobs are correlated by position, so their
    /// counts have to agree
    #[error("{images} image attachment(s) but {blobs} uploaded blob(s)")]
    #[diagnostic(
        code(skein::build::image_count_mismatch),
        help("upload every attachment before building, in the same order")
    )]
    ImageCountMismatch { images: usize, blobs: usize },
}

/// Main error type for skein operations
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum SkeinError {
    /// Post record could not be assembled
    #[error(transparent)]
    #[diagnostic(transparent)]
    Build(#[from] BuildError),

    /// Fetching an image source returned a non-success status
    #[error("failed to fetch {uri}: HTTP {status}")]
    #[diagnostic(code(skein::fetch))]
    Fetch { uri: String, status: u16 },

    /// The PDS answered an XRPC call with an error body
    #[error("{nsid} failed with HTTP {status}: {error}{}", detail(.message))]
    #[diagnostic(code(skein::xrpc))]
    Xrpc {
        nsid: &'static str,
        status: u16,
        error: String,
        message: Option<String>,
    },

    /// Operation needs a session but the agent never logged in
    #[error("not authenticated")]
    #[diagnostic(
        code(skein::not_authenticated),
        help("log in with an identifier and app password first")
    )]
    NotAuthenticated,

    /// HTTP transport error
    #[error(transparent)]
    #[diagnostic(code(skein::http))]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error(transparent)]
    #[diagnostic(code(skein::serde))]
    Serde(#[from] serde_json::Error),

    /// URL could not be parsed
    #[error("invalid url {input:?}: {source}")]
    #[diagnostic(code(skein::url))]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    /// Configuration file was unreadable or incomplete
    #[error("config error: {0}")]
    #[diagnostic(code(skein::config))]
    Config(String),

    /// Configuration file is not valid KDL
    #[error(transparent)]
    #[diagnostic(code(skein::config::kdl))]
    Kdl(#[from] kdl::KdlError),

    /// IO error
    #[error(transparent)]
    #[diagnostic(code(skein::io))]
    Io(#[from] std::io::Error),
}

impl SkeinError {
    pub fn invalid_url(input: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidUrl {
            input: input.into(),
            source,
        }
    }
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(" ({m})"))
        .unwrap_or_default()
}
