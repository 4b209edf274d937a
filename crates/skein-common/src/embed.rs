//! Assembly of the single embed slot of a post.

use skein_api::Blob;
use skein_api::app_bsky::embed::{External, ExternalEmbed, Image, ImagesEmbed};
use skein_api::app_bsky::feed::PostEmbed;
use url::Url;

use crate::error::BuildError;

/// Link card shown under the post text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLink {
    pub title: String,
    pub uri: Url,
    pub description: String,
}

impl ExternalLink {
    pub fn new(title: impl Into<String>, uri: Url, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri,
            description: description.into(),
        }
    }
}

/// An image to fetch, upload and attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    /// Used as the image's alt text
    pub title: String,
    pub source: Url,
}

impl ImageAttachment {
    pub fn new(title: impl Into<String>, source: Url) -> Self {
        Self {
            title: title.into(),
            source,
        }
    }
}

/// Pick and build the embed for a post.
///
/// A link always wins over images. Images are paired with blobs by position,
/// so the two slices must be the same length.
pub fn assemble_embed(
    link: Option<&ExternalLink>,
    images: &[ImageAttachment],
    blobs: &[Blob],
) -> Result<Option<PostEmbed>, BuildError> {
    if let Some(link) = link {
        if !images.is_empty() {
            tracing::warn!(
                images = images.len(),
                uri = %link.uri,
                "post has an external link, image set will not be attached"
            );
        }
        return Ok(Some(PostEmbed::External(ExternalEmbed {
            external: External {
                uri: link.uri.to_string(),
                title: link.title.clone(),
                description: link.description.clone(),
                thumb: None,
            },
        })));
    }

    if images.len() != blobs.len() {
        return Err(BuildError::ImageCountMismatch {
            images: images.len(),
            blobs: blobs.len(),
        });
    }
    if images.is_empty() {
        return Ok(None);
    }

    let images = images
        .iter()
        .zip(blobs)
        .map(|(attachment, blob)| Image {
            alt: attachment.title.clone(),
            image: blob.clone(),
            aspect_ratio: None,
        })
        .collect();
    Ok(Some(PostEmbed::Images(ImagesEmbed { images })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use skein_api::CidLink;

    fn blob(cid: &str) -> Blob {
        Blob {
            r#ref: CidLink::new(cid),
            mime_type: "image/jpeg".into(),
            size: 2048,
        }
    }

    fn attachment(alt: &str) -> ImageAttachment {
        ImageAttachment::new(alt, Url::parse("https://example.com/cat.jpg").unwrap())
    }

    fn link() -> ExternalLink {
        ExternalLink::new(
            "Bluesky docs",
            Url::parse("https://docs.bsky.app").unwrap(),
            "Developer documentation",
        )
    }

    #[test]
    fn nothing_to_embed() {
        assert_eq!(assemble_embed(None, &[], &[]).unwrap(), None);
    }

    #[test]
    fn external_link_embed() {
        let embed = assemble_embed(Some(&link()), &[], &[]).unwrap();
        let Some(PostEmbed::External(ExternalEmbed { external })) = embed else {
            panic!("expected external embed, got {embed:?}");
        };
        assert_eq!(external.uri, "https://docs.bsky.app/");
        assert_eq!(external.title, "Bluesky docs");
        assert_eq!(external.description, "Developer documentation");
    }

    #[test]
    fn images_pair_with_blobs_by_position() {
        let images = [attachment("first"), attachment("second")];
        let blobs = [blob("bafyfirst"), blob("bafysecond")];
        let embed = assemble_embed(None, &images, &blobs).unwrap();
        let Some(PostEmbed::Images(ImagesEmbed { images })) = embed else {
            panic!("expected images embed, got {embed:?}");
        };
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].alt, "first");
        assert_eq!(images[0].image.r#ref.as_str(), "bafyfirst");
        assert_eq!(images[1].alt, "second");
        assert_eq!(images[1].image.r#ref.as_str(), "bafysecond");
    }

    #[test]
    fn link_takes_precedence_over_images() {
        let images = [attachment("ignored")];
        let blobs = [blob("bafyignored")];
        let embed = assemble_embed(Some(&link()), &images, &blobs).unwrap();
        assert!(matches!(embed, Some(PostEmbed::External(_))));
    }

    #[test]
    fn link_still_wins_when_image_counts_disagree() {
        let images = [attachment("one"), attachment("two")];
        let blobs = [blob("bafyone")];
        let embed = assemble_embed(Some(&link()), &images, &blobs);
        assert!(matches!(embed, Ok(Some(PostEmbed::External(_)))));
    }

    #[test]
    fn mismatched_counts_fail() {
        let images = [attachment("one"), attachment("two")];
        let blobs = [blob("bafyone")];
        assert_eq!(
            assemble_embed(None, &images, &blobs).unwrap_err(),
            BuildError::ImageCountMismatch {
                images: 2,
                blobs: 1
            }
        );
    }
}
