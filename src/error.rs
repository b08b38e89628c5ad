//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the vitrine crate.
#[derive(Debug)]
pub enum VitrineError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// The host region the viewer should mount into does not exist.
    MissingRegion(String),
    /// The asset URL/path was missing or empty.
    MissingUrl(String),
    /// Fetching the asset bytes failed.
    Fetch(String),
    /// The asset bytes are not a valid glTF/GLB document.
    ModelParse(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// PNG encoding failure.
    Encode(String),
    /// Reading rendered pixels back from the GPU failed.
    Readback(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for VitrineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::MissingRegion(id) => {
                write!(f, "viewer region not found: {id}")
            }
            Self::MissingUrl(id) => {
                write!(f, "model URL is empty for region: {id}")
            }
            Self::Fetch(msg) => write!(f, "asset fetch error: {msg}"),
            Self::ModelParse(msg) => write!(f, "model parse error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Encode(msg) => write!(f, "image encode error: {msg}"),
            Self::Readback(msg) => write!(f, "pixel readback error: {msg}"),
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for VitrineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for VitrineError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for VitrineError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<gltf::Error> for VitrineError {
    fn from(e: gltf::Error) -> Self {
        Self::ModelParse(e.to_string())
    }
}

/// Log `result`'s error under `context` at error level. Returns whether the
/// operation succeeded.
///
/// For fire-and-forget callbacks (DOM updates, event handlers) that have no
/// caller to propagate to.
#[must_use]
pub fn log_failure<E: fmt::Debug>(context: &str, result: Result<(), E>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            log::error!("{context}: {e:?}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_exposes_source() {
        let err = VitrineError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "I/O error: gone");
    }

    #[test]
    fn missing_url_names_the_region() {
        let err = VitrineError::MissingUrl("viewer-3".into());
        assert!(err.to_string().contains("viewer-3"));
    }

    #[test]
    fn failures_are_reported_not_dropped() {
        assert!(log_failure::<VitrineError>("form", Ok(())));
        assert!(!log_failure(
            "form",
            Err(VitrineError::Viewer("preview element detached".into()))
        ));
    }
}
