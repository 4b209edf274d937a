//! `app.bsky.richtext.facet`

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Sub-string range a facet applies to. Start is inclusive, end exclusive,
/// both counted in bytes of the UTF-8 encoded text.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ByteSlice {
    pub byte_start: usize,
    pub byte_end: usize,
}

impl ByteSlice {
    pub fn new(byte_start: usize, byte_end: usize) -> Self {
        Self {
            byte_start,
            byte_end,
        }
    }

    pub fn to_range(self) -> Range<usize> {
        self.byte_start..self.byte_end
    }

    pub fn len(&self) -> usize {
        self.byte_end.saturating_sub(self.byte_start)
    }

    pub fn is_empty(&self) -> bool {
        self.byte_start >= self.byte_end
    }
}

impl From<Range<usize>> for ByteSlice {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "$type")]
pub enum FacetFeature {
    /// The text may be shortened for display, the uri is always the full URL.
    #[serde(rename = "app.bsky.richtext.facet#link")]
    Link { uri: String },
    /// The text is usually a handle with its `@`, the reference is a DID.
    #[serde(rename = "app.bsky.richtext.facet#mention")]
    Mention { did: String },
    /// The tag is stored without its leading `#`.
    #[serde(rename = "app.bsky.richtext.facet#tag")]
    Tag { tag: String },
}

/// Annotation of a sub-string within rich text.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    pub index: ByteSlice,
    pub features: Vec<FacetFeature>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn features_carry_lexicon_type() {
        let facet = Facet {
            index: ByteSlice::new(6, 11),
            features: vec![FacetFeature::Mention {
                did: "did:plc:ewvi7nxzyoun6zhxrhs64oiz".into(),
            }],
        };
        assert_eq!(
            serde_json::to_value(&facet).unwrap(),
            serde_json::json!({
                "index": { "byteStart": 6, "byteEnd": 11 },
                "features": [{
                    "$type": "app.bsky.richtext.facet#mention",
                    "did": "did:plc:ewvi7nxzyoun6zhxrhs64oiz"
                }]
            })
        );
    }

    #[test]
    fn byte_slice_range_conversion() {
        let slice = ByteSlice::from(3..8);
        assert_eq!(slice.len(), 5);
        assert!(!slice.is_empty());
        assert_eq!(slice.to_range(), 3..8);
        assert!(ByteSlice::new(4, 4).is_empty());
    }
}
