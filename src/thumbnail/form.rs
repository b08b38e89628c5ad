//! State of the upload form that carries a generated thumbnail.
//!
//! The form has a hidden field receiving the data URL, a submit control and
//! a preview region. Choosing a file starts a request; the request's
//! temporary asset handle (an object URL in the browser) is handed back for
//! release when the request completes either way.

/// Label of the submit control before any file is chosen.
pub const LABEL_SELECT_FILE: &str = "Select a file first";
/// Label while a preview renders.
pub const LABEL_GENERATING: &str = "Generating preview...";
/// Label once the thumbnail is ready.
pub const LABEL_UPLOAD: &str = "Upload";
/// Label after a failed render.
pub const LABEL_FAILED: &str = "Preview failed";
/// Text shown in the preview region after a failed render.
pub const PREVIEW_FAILED_TEXT: &str = "Preview generation failed";

/// The form's submit control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    /// Whether the form may be submitted.
    pub enabled: bool,
    /// Button text.
    pub label: &'static str,
}

impl SubmitControl {
    const fn disabled(label: &'static str) -> Self {
        Self {
            enabled: false,
            label,
        }
    }
}

/// What the preview region shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Preview {
    /// Nothing.
    #[default]
    Empty,
    /// The rendered thumbnail, as a data URL.
    Image(String),
    /// A message in place of the image.
    Message(&'static str),
}

/// Identifies one preview request so stale completions can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

#[derive(Debug)]
struct Pending {
    id: RequestId,
    handle: String,
}

/// Thumbnail form state machine.
#[derive(Debug)]
pub struct ThumbnailForm {
    field: String,
    submit: SubmitControl,
    preview: Preview,
    pending: Option<Pending>,
    next_id: u64,
}

impl Default for ThumbnailForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ThumbnailForm {
    /// Initial state: empty field, submit disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            field: String::new(),
            submit: SubmitControl::disabled(LABEL_SELECT_FILE),
            preview: Preview::Empty,
            pending: None,
            next_id: 0,
        }
    }

    /// Hidden field value (the data URL, or empty).
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Submit control state.
    #[must_use]
    pub fn submit(&self) -> &SubmitControl {
        &self.submit
    }

    /// Preview region contents.
    #[must_use]
    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    /// Whether a preview is being generated.
    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.pending.is_some()
    }

    /// A file was chosen and `handle` refers to its temporary asset.
    ///
    /// Returns the new request's id and the handle of a request this one
    /// supersedes, which the caller must release.
    pub fn file_selected(&mut self, handle: impl Into<String>) -> (RequestId, Option<String>) {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        let superseded = self.pending.replace(Pending {
            id,
            handle: handle.into(),
        });
        self.field.clear();
        self.preview = Preview::Empty;
        self.submit = SubmitControl::disabled(LABEL_GENERATING);
        (id, superseded.map(|p| p.handle))
    }

    /// The file chooser was cleared. Returns a pending handle to release.
    pub fn file_cleared(&mut self) -> Option<String> {
        let released = self.pending.take().map(|p| p.handle);
        self.field.clear();
        self.preview = Preview::Empty;
        self.submit = SubmitControl::disabled(LABEL_SELECT_FILE);
        released
    }

    /// Request `id` produced `data_url`. Returns the handle to release, or
    /// `None` (and changes nothing) if `id` is not the current request.
    pub fn succeeded(&mut self, id: RequestId, data_url: String) -> Option<String> {
        let handle = self.finish(id)?;
        self.preview = Preview::Image(data_url.clone());
        self.field = data_url;
        self.submit = SubmitControl {
            enabled: true,
            label: LABEL_UPLOAD,
        };
        Some(handle)
    }

    /// Request `id` failed. Returns the handle to release, or `None` if
    /// `id` is not the current request.
    pub fn failed(&mut self, id: RequestId) -> Option<String> {
        let handle = self.finish(id)?;
        self.field.clear();
        self.preview = Preview::Message(PREVIEW_FAILED_TEXT);
        self.submit = SubmitControl::disabled(LABEL_FAILED);
        Some(handle)
    }

    fn finish(&mut self, id: RequestId) -> Option<String> {
        if self.pending.as_ref().is_some_and(|p| p.id == id) {
            self.pending.take().map(|p| p.handle)
        } else {
            log::debug!("ignoring stale thumbnail result {id:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_disabled() {
        let form = ThumbnailForm::new();
        assert_eq!(form.field(), "");
        assert_eq!(form.submit(), &SubmitControl::disabled(LABEL_SELECT_FILE));
        assert_eq!(form.preview(), &Preview::Empty);
    }

    #[test]
    fn success_fills_field_and_enables_upload() {
        let mut form = ThumbnailForm::new();
        let (id, superseded) = form.file_selected("blob:1");
        assert!(superseded.is_none());
        assert_eq!(form.submit().label, LABEL_GENERATING);
        assert!(!form.submit().enabled);

        let released = form.succeeded(id, "data:image/png;base64,AAAA".into());
        assert_eq!(released.as_deref(), Some("blob:1"));
        assert_eq!(form.field(), "data:image/png;base64,AAAA");
        assert_eq!(
            form.submit(),
            &SubmitControl {
                enabled: true,
                label: LABEL_UPLOAD
            }
        );
        assert!(!form.is_generating());
    }

    #[test]
    fn failure_empties_field_and_reports() {
        let mut form = ThumbnailForm::new();
        let (first, _) = form.file_selected("blob:1");
        let _ = form.succeeded(first, "data:image/png;base64,AAAA".into());

        let (second, _) = form.file_selected("blob:2");
        assert_eq!(form.field(), "");
        let released = form.failed(second);
        assert_eq!(released.as_deref(), Some("blob:2"));
        assert_eq!(form.field(), "");
        assert_eq!(form.submit(), &SubmitControl::disabled(LABEL_FAILED));
        assert_eq!(form.preview(), &Preview::Message(PREVIEW_FAILED_TEXT));
    }

    #[test]
    fn stale_results_are_ignored() {
        let mut form = ThumbnailForm::new();
        let (old, _) = form.file_selected("blob:old");
        let (new, superseded) = form.file_selected("blob:new");
        assert_eq!(superseded.as_deref(), Some("blob:old"));

        assert!(form.succeeded(old, "data:image/png;base64,OLD".into()).is_none());
        assert_eq!(form.field(), "");
        assert!(form.is_generating());

        assert_eq!(form.failed(new).as_deref(), Some("blob:new"));
    }

    #[test]
    fn clearing_releases_pending_handle() {
        let mut form = ThumbnailForm::new();
        let _ = form.file_selected("blob:1");
        assert_eq!(form.file_cleared().as_deref(), Some("blob:1"));
        assert_eq!(form.submit().label, LABEL_SELECT_FILE);
    }
}
