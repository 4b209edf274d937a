//! On-disk settings, stored as KDL:
//!
//! ```kdl
//! pds "https://bsky.social"
//! identifier "alice.bsky.social"
//! ```
//!
//! App passwords are never read from this file.

use std::path::{Path, PathBuf};

use kdl::KdlDocument;
use url::Url;

use crate::DEFAULT_PDS;
use crate::error::SkeinError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// PDS to authenticate against and submit to
    pub pds: Url,
    /// Handle, DID or email used to log in
    pub identifier: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pds: Url::parse(DEFAULT_PDS).expect("default PDS url is valid"),
            identifier: None,
        }
    }
}

impl Config {
    /// `<config dir>/skein/config.kdl`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skein").join("config.kdl"))
    }

    /// Load from `path`, falling back to defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, SkeinError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let src = std::fs::read_to_string(path)?;
        Self::from_kdl(&src)
    }

    pub fn from_kdl(src: &str) -> Result<Self, SkeinError> {
        let doc: KdlDocument = src.parse()?;
        let mut config = Self::default();

        if let Some(pds) = string_arg(&doc, "pds") {
            config.pds = Url::parse(pds).map_err(|e| SkeinError::invalid_url(pds, e))?;
        } else if doc.get("pds").is_some() {
            return Err(SkeinError::Config("`pds` needs a string argument".into()));
        }
        config.identifier = string_arg(&doc, "identifier").map(str::to_owned);

        Ok(config)
    }

    /// Command-line and environment values take precedence over the file.
    pub fn with_overrides(mut self, pds: Option<Url>, identifier: Option<String>) -> Self {
        if let Some(pds) = pds {
            self.pds = pds;
        }
        if identifier.is_some() {
            self.identifier = identifier;
        }
        self
    }
}

fn string_arg<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a str> {
    doc.get(name)?.entries().first()?.value().as_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_nodes() {
        let config =
            Config::from_kdl("pds \"https://pds.example.com\"\nidentifier \"alice.test\"\n")
                .unwrap();
        assert_eq!(config.pds.as_str(), "https://pds.example.com/");
        assert_eq!(config.identifier.as_deref(), Some("alice.test"));
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Config::from_kdl("").unwrap(), Config::default());
        assert_eq!(Config::default().pds.as_str(), "https://bsky.social/");
    }

    #[test]
    fn bad_pds_url() {
        let err = Config::from_kdl("pds \"not a url\"").unwrap_err();
        assert!(matches!(err, SkeinError::InvalidUrl { .. }));
    }

    #[test]
    fn pds_without_string() {
        let err = Config::from_kdl("pds 42").unwrap_err();
        assert!(matches!(err, SkeinError::Config(_)));
    }

    #[test]
    fn invalid_kdl() {
        assert!(matches!(
            Config::from_kdl("pds \"unterminated").unwrap_err(),
            SkeinError::Kdl(_)
        ));
    }

    #[test]
    fn overrides_win() {
        let config = Config::from_kdl("identifier \"file.test\"")
            .unwrap()
            .with_overrides(
                Some(Url::parse("https://other.example").unwrap()),
                Some("cli.test".into()),
            );
        assert_eq!(config.pds.as_str(), "https://other.example/");
        assert_eq!(config.identifier.as_deref(), Some("cli.test"));

        let kept = Config::from_kdl("identifier \"file.test\"")
            .unwrap()
            .with_overrides(None, None);
        assert_eq!(kept.identifier.as_deref(), Some("file.test"));
    }

    #[test]
    fn missing_file_is_default() {
        let path = std::env::temp_dir().join("skein-config-that-does-not-exist.kdl");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }
}
