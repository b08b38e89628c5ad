//! What a viewer's host region (page element or window) displays.
//!
//! Hosts render this state: the web host mirrors it into DOM nodes, the
//! native window into its title and clear color. Keeping it as data makes
//! the mount / load / fail transitions testable without a GPU.

use std::time::Duration;

use web_time::Instant;

use crate::asset::{Progress, ProgressBar};

/// Marker shown when a region was given no model URL.
pub const NO_URL_MARKER: &str = "\u{274c} No URL";
/// Title of the loading overlay.
pub const LOADING_TITLE: &str = "Loading...";
/// Headline shown when a load fails.
pub const LOAD_ERROR_TITLE: &str = "\u{274c} Load error";
/// Hint under [`LOAD_ERROR_TITLE`].
pub const LOAD_ERROR_HINT: &str = "Check the file and path";

/// The loading overlay drawn over the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadingOverlay {
    bar: ProgressBar,
    done_at: Option<Instant>,
}

impl LoadingOverlay {
    fn new() -> Self {
        Self {
            bar: ProgressBar::new(),
            done_at: None,
        }
    }

    /// Fill percentage of the progress bar.
    #[must_use]
    pub fn percent(&self) -> f32 {
        self.bar.percent()
    }

    /// `true` once the load finished and the overlay is fading out.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done_at.is_some()
    }
}

/// Contents of the host region.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionContent {
    /// Nothing mounted (before mount or after dispose).
    Empty,
    /// The render canvas, optionally under the loading overlay.
    Canvas {
        /// Present until the fade after a successful load completes.
        overlay: Option<LoadingOverlay>,
    },
    /// Only an error message; no canvas.
    Error {
        /// First line.
        title: String,
        /// Second, smaller line, if any.
        detail: Option<String>,
    },
}

/// State machine for a viewer region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionView {
    id: String,
    content: RegionContent,
    overlay_fade: Duration,
}

impl RegionView {
    /// An empty region.
    #[must_use]
    pub fn new(id: impl Into<String>, overlay_fade: Duration) -> Self {
        Self {
            id: id.into(),
            content: RegionContent::Empty,
            overlay_fade,
        }
    }

    /// Region identifier (element id or window title).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current contents.
    #[must_use]
    pub fn content(&self) -> &RegionContent {
        &self.content
    }

    /// Whether a canvas is currently shown.
    #[must_use]
    pub fn shows_canvas(&self) -> bool {
        matches!(self.content, RegionContent::Canvas { .. })
    }

    /// The overlay, if one is showing.
    #[must_use]
    pub fn overlay(&self) -> Option<&LoadingOverlay> {
        match &self.content {
            RegionContent::Canvas { overlay } => overlay.as_ref(),
            _ => None,
        }
    }

    /// Replace the contents with a fresh canvas under a 0% overlay.
    pub fn start_loading(&mut self) {
        self.content = RegionContent::Canvas {
            overlay: Some(LoadingOverlay::new()),
        };
    }

    /// Show the missing-URL marker.
    pub fn show_missing_url(&mut self) {
        self.content = RegionContent::Error {
            title: NO_URL_MARKER.to_owned(),
            detail: None,
        };
    }

    /// Fold in a progress event. Returns the new percentage when an overlay
    /// is showing.
    pub fn progress(&mut self, progress: Progress) -> Option<f32> {
        match &mut self.content {
            RegionContent::Canvas {
                overlay: Some(overlay),
            } if !overlay.is_done() => Some(overlay.bar.update(progress)),
            _ => None,
        }
    }

    /// The model loaded: fill the bar and start the fade.
    pub fn loaded(&mut self, now: Instant) {
        if let RegionContent::Canvas {
            overlay: Some(overlay),
        } = &mut self.content
        {
            overlay.bar.finish();
            overlay.done_at = Some(now);
        }
    }

    /// The load failed: drop the canvas and show only the error.
    pub fn failed(&mut self) {
        self.content = RegionContent::Error {
            title: LOAD_ERROR_TITLE.to_owned(),
            detail: Some(LOAD_ERROR_HINT.to_owned()),
        };
    }

    /// Remove a finished overlay once its fade has elapsed. Returns `true`
    /// if the overlay was removed by this call.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let RegionContent::Canvas { overlay } = &mut self.content {
            let expired = overlay
                .as_ref()
                .and_then(|o| o.done_at)
                .is_some_and(|t| now.duration_since(t) >= self.overlay_fade);
            if expired {
                *overlay = None;
                return true;
            }
        }
        false
    }

    /// Clear everything.
    pub fn clear(&mut self) {
        self.content = RegionContent::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> RegionView {
        RegionView::new("viewer-1", Duration::from_millis(250))
    }

    #[test]
    fn failure_leaves_only_the_error() {
        let mut r = region();
        r.start_loading();
        let _ = r.progress(Progress {
            loaded: 10,
            total: Some(100),
        });
        r.failed();
        assert!(!r.shows_canvas());
        assert!(r.overlay().is_none());
        assert_eq!(
            r.content(),
            &RegionContent::Error {
                title: LOAD_ERROR_TITLE.into(),
                detail: Some(LOAD_ERROR_HINT.into()),
            }
        );
    }

    #[test]
    fn failure_after_a_previous_success_removes_the_canvas() {
        let mut r = region();
        r.start_loading();
        r.loaded(Instant::now());
        r.start_loading();
        r.failed();
        assert!(!r.shows_canvas());
    }

    #[test]
    fn overlay_fades_after_load() {
        let mut r = region();
        r.start_loading();
        let t0 = Instant::now();
        r.loaded(t0);
        let overlay = r.overlay().unwrap();
        assert!(overlay.is_done());
        assert_eq!(overlay.percent(), 100.0);

        assert!(!r.tick(t0 + Duration::from_millis(100)));
        assert!(r.overlay().is_some());
        assert!(r.tick(t0 + Duration::from_millis(250)));
        assert!(r.overlay().is_none());
        assert!(r.shows_canvas());
    }

    #[test]
    fn progress_is_ignored_without_overlay() {
        let mut r = region();
        assert_eq!(
            r.progress(Progress {
                loaded: 1,
                total: None
            }),
            None
        );
        r.start_loading();
        assert!(r
            .progress(Progress {
                loaded: 1,
                total: None
            })
            .is_some());
    }

    #[test]
    fn missing_url_marker() {
        let mut r = region();
        r.show_missing_url();
        assert!(matches!(
            r.content(),
            RegionContent::Error { title, detail: None } if title == NO_URL_MARKER
        ));
    }
}
