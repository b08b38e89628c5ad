//! Model asset sources, byte fetching with progress, and background loads.

mod fetch;
mod progress;
mod task;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

pub use fetch::{fetch, read_chunks, Progress};
pub use progress::ProgressBar;
pub use task::{LoadEvent, LoadSender, LoadTask};

use crate::error::VitrineError;
use crate::model::ModelData;

/// Where a model's bytes come from.
#[derive(Clone, PartialEq, Eq)]
pub enum AssetSource {
    /// A file on the local filesystem.
    Path(PathBuf),
    /// An `http://` or `https://` URL.
    Url(String),
    /// Bytes already in memory (a picked file, an object URL's blob).
    Bytes {
        /// Display name for logs.
        name: String,
        /// The document bytes.
        data: Arc<[u8]>,
    },
}

impl AssetSource {
    /// Interpret a user-supplied location. URLs with an http(s) scheme
    /// become [`AssetSource::Url`]; anything else is treated as a path.
    ///
    /// # Errors
    ///
    /// [`VitrineError::MissingUrl`] if `location` is empty or whitespace;
    /// `region` names the viewer the location was meant for.
    pub fn parse(location: &str, region: &str) -> Result<Self, VitrineError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(VitrineError::MissingUrl(region.to_owned()));
        }
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(Self::Url(location.to_owned()))
        } else {
            Ok(Self::Path(PathBuf::from(location)))
        }
    }

    /// Wrap in-memory bytes.
    #[must_use]
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Short human-readable name (file name, URL, or the given name).
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Url(url) => url.clone(),
            Self::Bytes { name, .. } => name.clone(),
        }
    }
}

/// Fetch and parse `source` on the calling thread.
///
/// # Errors
///
/// Any fetch or parse error.
pub fn load(source: &AssetSource) -> Result<ModelData, VitrineError> {
    let (_task, sender) = LoadTask::channel();
    task::load_blocking(source, &sender)
}

impl fmt::Debug for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Self::Bytes { name, data } => f
                .debug_struct("Bytes")
                .field("name", name)
                .field("len", &data.len())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_location_is_missing_url() {
        let err = AssetSource::parse("   ", "viewer-1").unwrap_err();
        assert!(matches!(err, VitrineError::MissingUrl(ref r) if r == "viewer-1"));
    }

    #[test]
    fn scheme_selects_url() {
        assert_eq!(
            AssetSource::parse("HTTPS://example.org/a.glb", "v").unwrap(),
            AssetSource::Url("HTTPS://example.org/a.glb".into())
        );
        assert_eq!(
            AssetSource::parse("models/a.glb", "v").unwrap(),
            AssetSource::Path(PathBuf::from("models/a.glb"))
        );
    }

    #[test]
    fn bytes_debug_hides_payload() {
        let src = AssetSource::from_bytes("pick.glb", vec![1u8, 2, 3]);
        assert_eq!(format!("{src:?}"), r#"Bytes { name: "pick.glb", len: 3 }"#);
        assert_eq!(src.display_name(), "pick.glb");
    }
}
