//! Background model loads.
//!
//! A load runs off the render thread and reports back through a channel
//! that the owning viewer drains once per frame. Dropping or cancelling the
//! [`LoadTask`] makes the producer's later sends no-ops, so a disposed
//! viewer never sees a late result.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use super::{AssetSource, Progress};
use crate::error::VitrineError;
use crate::model::ModelData;

/// An outcome delivered to the viewer.
#[derive(Debug)]
pub enum LoadEvent {
    /// More bytes arrived.
    Progress(Progress),
    /// The model parsed successfully.
    Loaded(Box<ModelData>),
    /// Fetching or parsing failed.
    Failed(VitrineError),
}

/// Producer half of a load: used by the loader thread (or a browser
/// future) to report events.
#[derive(Debug, Clone)]
pub struct LoadSender {
    tx: mpsc::Sender<LoadEvent>,
    cancelled: Arc<AtomicBool>,
}

impl LoadSender {
    /// `true` once the consumer cancelled or went away.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Report progress. Dropped silently after cancellation.
    pub fn progress(&self, progress: Progress) {
        if !self.is_cancelled() {
            let _ = self.tx.send(LoadEvent::Progress(progress));
        }
    }

    /// Report the terminal outcome. Returns `false` if nobody was listening.
    pub fn finish(&self, result: Result<ModelData, VitrineError>) -> bool {
        if self.is_cancelled() {
            return false;
        }
        let event = match result {
            Ok(model) => LoadEvent::Loaded(Box::new(model)),
            Err(e) => LoadEvent::Failed(e),
        };
        self.tx.send(event).is_ok()
    }
}

/// Consumer half of a load, owned by the viewer.
#[derive(Debug)]
pub struct LoadTask {
    rx: mpsc::Receiver<LoadEvent>,
    cancelled: Arc<AtomicBool>,
    finished: bool,
}

impl LoadTask {
    /// A connected producer/consumer pair with no work attached.
    #[must_use]
    pub fn channel() -> (Self, LoadSender) {
        let (tx, rx) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        (
            Self {
                rx,
                cancelled: Arc::clone(&cancelled),
                finished: false,
            },
            LoadSender { tx, cancelled },
        )
    }

    /// Fetch and parse `source` on a background thread.
    ///
    /// # Errors
    ///
    /// [`VitrineError::Io`] if the thread cannot be spawned.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn spawn(source: AssetSource) -> Result<Self, VitrineError> {
        let (task, sender) = Self::channel();
        let _handle = std::thread::Builder::new()
            .name("model-loader".into())
            .spawn(move || {
                let result = load_blocking(&source, &sender);
                if let Err(e) = &result {
                    log::debug!("load of {} failed: {e}", source.display_name());
                }
                if !sender.finish(result) {
                    log::debug!(
                        "discarding load of {}: viewer went away",
                        source.display_name()
                    );
                }
            })?;
        Ok(task)
    }

    /// Drain every event that has arrived since the last call. After the
    /// terminal event nothing more is returned.
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        if self.finished || self.is_cancelled() {
            return events;
        }
        while let Ok(event) = self.rx.try_recv() {
            let terminal =
                matches!(event, LoadEvent::Loaded(_) | LoadEvent::Failed(_));
            events.push(event);
            if terminal {
                self.finished = true;
                break;
            }
        }
        events
    }

    /// Whether a terminal event has been delivered.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether [`cancel`](Self::cancel) was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Stop accepting events; the producer's later sends are discarded.
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        while self.rx.try_recv().is_ok() {}
    }
}

impl Drop for LoadTask {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

/// Fetch and parse on the calling thread, forwarding progress.
///
/// # Errors
///
/// Any fetch or parse error.
pub fn load_blocking(
    source: &AssetSource,
    sender: &LoadSender,
) -> Result<ModelData, VitrineError> {
    if let AssetSource::Path(path) = source {
        // External buffers and images resolve relative to the file.
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        if extension.as_deref() == Some("gltf") {
            let len = std::fs::metadata(path)?.len();
            let model = crate::model::import_path(path)?;
            sender.progress(Progress {
                loaded: len,
                total: Some(len),
            });
            return Ok(model);
        }
    }
    let bytes = super::fetch(source, |p| sender.progress(p))?;
    let mut model = crate::model::import_bytes(&bytes)?;
    if model.name.is_none() {
        model.name = Some(source.display_name());
    }
    Ok(model)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::model::gltf_import::tests::triangle_gltf;

    fn wait_for_terminal(task: &mut LoadTask) -> Vec<LoadEvent> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut all = Vec::new();
        while !task.is_finished() && Instant::now() < deadline {
            all.extend(task.poll());
            std::thread::sleep(Duration::from_millis(5));
        }
        all
    }

    #[test]
    fn spawned_load_delivers_exactly_one_terminal_event() {
        let source = AssetSource::from_bytes("tri.gltf", triangle_gltf(1.0, [0.0; 3]));
        let mut task = LoadTask::spawn(source).unwrap();
        let events = wait_for_terminal(&mut task);

        let terminals = events
            .iter()
            .filter(|e| matches!(e, LoadEvent::Loaded(_) | LoadEvent::Failed(_)))
            .count();
        assert_eq!(terminals, 1);
        assert!(matches!(events.last(), Some(LoadEvent::Loaded(m)) if m.triangle_count() == 1));
        assert!(task.poll().is_empty());
    }

    #[test]
    fn parse_failure_is_delivered_as_failed() {
        let source = AssetSource::from_bytes("junk.glb", b"nope".to_vec());
        let mut task = LoadTask::spawn(source).unwrap();
        let events = wait_for_terminal(&mut task);
        assert!(matches!(
            events.last(),
            Some(LoadEvent::Failed(VitrineError::ModelParse(_)))
        ));
    }

    #[test]
    fn cancelled_task_discards_results() {
        let (mut task, sender) = LoadTask::channel();
        task.cancel();
        assert!(sender.is_cancelled());
        assert!(!sender.finish(Ok(ModelData::default())));
        assert!(task.poll().is_empty());
    }

    #[test]
    fn dropping_task_cancels_producer() {
        let (task, sender) = LoadTask::channel();
        drop(task);
        assert!(sender.is_cancelled());
        assert!(!sender.finish(Err(VitrineError::Fetch("late".into()))));
    }
}
