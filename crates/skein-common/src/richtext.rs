//! Rich-text facets anchored by substring.
//!
//! Callers name the text a facet covers rather than its offsets. Offsets are
//! resolved against the final post text at build time, in UTF-8 bytes, which is
//! what `app.bsky.richtext.facet#byteSlice` counts.

use skein_api::app_bsky::richtext::{ByteSlice, Facet, FacetFeature};
use url::Url;

use crate::error::BuildError;

/// Byte range of the first occurrence of `needle` in `haystack`.
///
/// Repeated anchors always resolve to the same first match; consumed ranges
/// are not tracked. An empty needle matches at offset 0.
pub fn locate(haystack: &str, needle: &str) -> Result<ByteSlice, BuildError> {
    haystack
        .find(needle)
        .map(|start| ByteSlice::new(start, start + needle.len()))
        .ok_or_else(|| BuildError::AnchorNotFound {
            anchor: needle.to_owned(),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetKind {
    Link,
    Mention,
    Tag,
}

impl FacetKind {
    /// Lexicon `$type` of the feature this kind produces.
    pub fn nsid(self) -> &'static str {
        match self {
            FacetKind::Link => "app.bsky.richtext.facet#link",
            FacetKind::Mention => "app.bsky.richtext.facet#mention",
            FacetKind::Tag => "app.bsky.richtext.facet#tag",
        }
    }
}

/// A facet that has not been anchored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetRequest {
    pub kind: FacetKind,
    /// URI, DID or tag depending on `kind`
    pub value: String,
    /// Text the facet covers; must occur verbatim in the post
    pub anchor: String,
}

impl FacetRequest {
    pub fn new(kind: FacetKind, value: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            anchor: anchor.into(),
        }
    }

    fn feature(&self) -> FacetFeature {
        match self.kind {
            FacetKind::Link => FacetFeature::Link {
                uri: normalize_uri(&self.value),
            },
            FacetKind::Mention => FacetFeature::Mention {
                did: self.value.trim().to_owned(),
            },
            FacetKind::Tag => FacetFeature::Tag {
                tag: normalize_tag(&self.value),
            },
        }
    }
}

/// Anchor every request against `text`, keeping request order.
///
/// The first anchor that cannot be found aborts the whole assembly.
pub fn assemble_facets(text: &str, requests: &[FacetRequest]) -> Result<Vec<Facet>, BuildError> {
    requests
        .iter()
        .map(|request| {
            let index = locate(text, &request.anchor)?;
            Ok(Facet {
                index,
                features: vec![request.feature()],
            })
        })
        .collect()
}

// Absolute URLs go through the parser so the facet carries the canonical form.
// Anything else is passed through for the PDS to judge.
fn normalize_uri(value: &str) -> String {
    let value = value.trim();
    match Url::parse(value) {
        Ok(url) => url.into(),
        Err(_) => value.to_owned(),
    }
}

fn normalize_tag(value: &str) -> String {
    let value = value.trim();
    value.strip_prefix('#').unwrap_or(value).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn locate_first_occurrence() {
        let text = "Hello to Bluesky, the coolest open social network";
        assert_eq!(locate(text, "Bluesky").unwrap(), ByteSlice::new(9, 16));
        assert_eq!(locate(text, "open social").unwrap(), ByteSlice::new(30, 41));
        assert_eq!(locate("abcabc", "bc").unwrap(), ByteSlice::new(1, 3));
    }

    #[test]
    fn locate_counts_bytes_not_chars() {
        let text = "Grüße an #rust und @alice.bsky.social 🦀 #rust";
        assert_eq!(locate(text, "#rust").unwrap(), ByteSlice::new(11, 16));
        assert_eq!(
            locate(text, "@alice.bsky.social").unwrap(),
            ByteSlice::new(21, 39)
        );
        assert_eq!(locate(text, "🦀").unwrap(), ByteSlice::new(40, 44));
    }

    #[test]
    fn locate_missing() {
        let err = locate("nothing to see", "here").unwrap_err();
        assert_eq!(
            err,
            BuildError::AnchorNotFound {
                anchor: "here".into()
            }
        );
        assert!(err.to_string().contains("\"here\""));
    }

    #[test]
    fn empty_anchor_sits_at_start() {
        assert_eq!(locate("text", "").unwrap(), ByteSlice::new(0, 0));
    }

    #[test]
    fn facets_keep_request_order_and_kinds() {
        let text = "ping @bob.test about #rustlang at https://example.com";
        let facets = assemble_facets(
            text,
            &[
                FacetRequest::new(FacetKind::Tag, "#rustlang", "#rustlang"),
                FacetRequest::new(FacetKind::Mention, "did:plc:bob", "@bob.test"),
                FacetRequest::new(
                    FacetKind::Link,
                    "https://Example.com",
                    "https://example.com",
                ),
            ],
        )
        .unwrap();

        assert_eq!(facets.len(), 3);
        assert_eq!(facets[0].index, ByteSlice::new(21, 30));
        assert_eq!(
            facets[0].features,
            vec![FacetFeature::Tag {
                tag: "rustlang".into()
            }]
        );
        assert_eq!(facets[1].index, ByteSlice::new(5, 14));
        assert_eq!(
            facets[1].features,
            vec![FacetFeature::Mention {
                did: "did:plc:bob".into()
            }]
        );
        assert_eq!(
            facets[2].features,
            vec![FacetFeature::Link {
                uri: "https://example.com/".into()
            }]
        );
    }

    #[test]
    fn kind_nsid_matches_serialized_feature() {
        for kind in [FacetKind::Link, FacetKind::Mention, FacetKind::Tag] {
            let feature = FacetRequest::new(kind, "value", "anchor").feature();
            let json = serde_json::to_value(&feature).unwrap();
            assert_eq!(json["$type"], kind.nsid());
        }
    }

    #[test]
    fn duplicate_anchor_resolves_to_same_range() {
        let text = "rust and more rust";
        let facets = assemble_facets(
            text,
            &[
                FacetRequest::new(FacetKind::Tag, "rust", "rust"),
                FacetRequest::new(FacetKind::Link, "https://rust-lang.org", "rust"),
            ],
        )
        .unwrap();
        assert_eq!(facets[0].index, facets[1].index);
        assert_eq!(facets[0].index, ByteSlice::new(0, 4));
    }

    #[test]
    fn missing_anchor_aborts_everything() {
        let err = assemble_facets(
            "short text",
            &[
                FacetRequest::new(FacetKind::Tag, "short", "short"),
                FacetRequest::new(FacetKind::Tag, "long", "long"),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            BuildError::AnchorNotFound {
                anchor: "long".into()
            }
        );
    }

    #[test]
    fn relative_link_value_passes_through() {
        let facets = assemble_facets(
            "see docs",
            &[FacetRequest::new(FacetKind::Link, "docs/intro", "docs")],
        )
        .unwrap();
        assert_eq!(
            facets[0].features,
            vec![FacetFeature::Link {
                uri: "docs/intro".into()
            }]
        );
    }

    proptest! {
        #[test]
        fn located_range_is_the_smallest_match(
            prefix in "\\PC{0,20}",
            anchor in "\\PC{1,8}",
            suffix in "\\PC{0,20}",
        ) {
            let text = format!("{prefix}{anchor}{suffix}");
            let slice = locate(&text, &anchor).unwrap();

            prop_assert_eq!(&text[slice.to_range()], anchor.as_str());
            prop_assert!(slice.byte_start <= prefix.len());
            let earlier = text
                .char_indices()
                .take_while(|(i, _)| *i < slice.byte_start)
                .any(|(i, _)| text[i..].starts_with(anchor.as_str()));
            prop_assert!(!earlier);
        }

        #[test]
        fn absent_anchor_is_an_error(text in "[a-m ]{0,40}", anchor in "[n-z]{1,6}") {
            let is_missing = matches!(
                locate(&text, &anchor),
                Err(BuildError::AnchorNotFound { .. })
            );
            prop_assert!(is_missing);
        }
    }
}
