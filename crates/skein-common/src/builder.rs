//! Builder for `app.bsky.feed.post` records.
//!
//! ```
//! use skein_common::builder::PostBuilder;
//! use skein_common::richtext::FacetKind;
//!
//! let post = PostBuilder::new("Hello to Bluesky, the coolest open social network")
//!     .with_facet(FacetKind::Link, "https://docs.bsky.app/", "Bluesky")
//!     .with_facet(FacetKind::Tag, "bsky", "open social")
//!     .build()
//!     .unwrap();
//! assert_eq!(post.facets.len(), 2);
//! assert!(post.embed.is_none());
//! ```

use skein_api::app_bsky::feed::Post;
use skein_api::{Blob, Datetime};
use url::Url;

use crate::embed::{ExternalLink, ImageAttachment, assemble_embed};
use crate::error::BuildError;
use crate::richtext::{FacetKind, FacetRequest, assemble_facets};

/// Accumulates text, facets and embed requests for one post.
///
/// Every `with_*` call folds into the existing state. [`build`](Self::build)
/// consumes the builder, so a finished builder cannot be built twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use = "a PostBuilder does nothing until built"]
pub struct PostBuilder {
    text: String,
    facets: Vec<FacetRequest>,
    link: Option<ExternalLink>,
    images: Vec<ImageAttachment>,
    blobs: Vec<Blob>,
    // first `with_images` call whose slices disagreed, as (images, blobs)
    image_mismatch: Option<(usize, usize)>,
    langs: Vec<String>,
}

impl PostBuilder {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn facets(&self) -> &[FacetRequest] {
        &self.facets
    }

    pub fn images(&self) -> &[ImageAttachment] {
        &self.images
    }

    /// Annotate `anchor` (which must appear in the post text) with a link,
    /// mention or tag.
    pub fn with_facet(
        mut self,
        kind: FacetKind,
        value: impl Into<String>,
        anchor: impl Into<String>,
    ) -> Self {
        self.facets.push(FacetRequest::new(kind, value, anchor));
        self
    }

    pub fn with_link(self, uri: &Url, anchor: impl Into<String>) -> Self {
        self.with_facet(FacetKind::Link, uri.as_str(), anchor)
    }

    pub fn with_mention(self, did: impl Into<String>, anchor: impl Into<String>) -> Self {
        self.with_facet(FacetKind::Mention, did, anchor)
    }

    pub fn with_tag(self, tag: impl Into<String>, anchor: impl Into<String>) -> Self {
        self.with_facet(FacetKind::Tag, tag, anchor)
    }

    /// Attach a link card. Replaces an earlier link, and takes precedence over
    /// any images.
    pub fn with_external_link(
        mut self,
        title: impl Into<String>,
        uri: Url,
        description: impl Into<String>,
    ) -> Self {
        self.link = Some(ExternalLink::new(title, uri, description));
        self
    }

    /// Attach uploaded images. `blobs[i]` must be the upload of `images[i]`.
    ///
    /// Repeated calls append. Each call is checked on its own, so a short
    /// upload in one call cannot be made up by extra blobs in another.
    pub fn with_images(
        mut self,
        images: impl IntoIterator<Item = ImageAttachment>,
        blobs: impl IntoIterator<Item = Blob>,
    ) -> Self {
        let images: Vec<_> = images.into_iter().collect();
        let blobs: Vec<_> = blobs.into_iter().collect();
        if images.len() != blobs.len() && self.image_mismatch.is_none() {
            self.image_mismatch = Some((images.len(), blobs.len()));
        }
        self.images.extend(images);
        self.blobs.extend(blobs);
        self
    }

    pub fn with_langs<I, S>(mut self, langs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.langs.extend(langs.into_iter().map(Into::into));
        self
    }

    /// Finish the record, stamped with the current time.
    pub fn build(self) -> Result<Post, BuildError> {
        self.build_at(Datetime::now())
    }

    pub fn build_at(self, created_at: impl Into<Datetime>) -> Result<Post, BuildError> {
        let facets = assemble_facets(&self.text, &self.facets)?;
        // a link card replaces the images, so their pairing does not matter then
        if let (None, Some((images, blobs))) = (&self.link, self.image_mismatch) {
            return Err(BuildError::ImageCountMismatch { images, blobs });
        }
        let embed = assemble_embed(self.link.as_ref(), &self.images, &self.blobs)?;
        tracing::debug!(
            facets = facets.len(),
            embed = embed.is_some(),
            bytes = self.text.len(),
            "built post record"
        );

        Ok(Post {
            text: self.text,
            created_at: created_at.into(),
            facets,
            embed,
            langs: self.langs,
        })
    }
}
