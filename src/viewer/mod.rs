//! Interactive model viewer.
//!
//! [`ModelViewer`] is host-agnostic: it owns a [`RenderContext`] bound to
//! some surface, the renderer, camera, orbit controls and the in-flight
//! load, and exposes per-frame, resize, input and teardown entry points.
//! The native window ([`window`]) and the browser host (`web`) drive it.

pub mod frame_loop;
pub mod region;
#[cfg(all(feature = "viewer", not(target_arch = "wasm32")))]
pub mod window;

use std::time::Duration;

pub use frame_loop::FrameLoop;
pub use region::{RegionContent, RegionView};
use web_time::Instant;

use crate::asset::{AssetSource, LoadEvent, LoadTask};
use crate::camera::controls::OrbitControls;
use crate::camera::core::Camera;
use crate::camera::framing::{frame_bounds, Framing};
use crate::error::VitrineError;
use crate::gpu::lighting::LightRigUniform;
use crate::gpu::render_context::RenderContext;
use crate::input::{ControlCommand, InputEvent, InputProcessor, KeyAction};
use crate::model::ModelData;
use crate::options::Options;
use crate::renderer::ModelRenderer;

/// Decide what mounting `location` into a region should do.
///
/// # Errors
///
/// [`VitrineError::MissingRegion`] when the region does not exist (the host
/// should log and do nothing), [`VitrineError::MissingUrl`] when the
/// location is empty (the host should show
/// [`region::NO_URL_MARKER`]).
pub fn plan_mount(
    region_id: &str,
    region_exists: bool,
    location: &str,
) -> Result<AssetSource, VitrineError> {
    if !region_exists {
        return Err(VitrineError::MissingRegion(region_id.to_owned()));
    }
    AssetSource::parse(location, region_id)
}

/// GPU work left over after a load event was folded into the region state.
enum LoadStep {
    Idle,
    Show(Box<ModelData>),
    ClearModel,
}

/// Apply `event` to the viewer's GPU-free state.
///
/// A failure forgets the framing and model name and leaves only the error
/// message in the region; the caller must drop the uploaded model.
fn fold_load_event(
    region: &mut RegionView,
    framing: &mut Option<Framing>,
    model_name: &mut Option<String>,
    event: LoadEvent,
) -> LoadStep {
    match event {
        LoadEvent::Progress(progress) => {
            if let Some(percent) = region.progress(progress) {
                log::trace!("load progress {percent:.1}%");
            }
            LoadStep::Idle
        }
        LoadEvent::Loaded(model) => LoadStep::Show(model),
        LoadEvent::Failed(e) => {
            log::error!("load failed for {}: {e}", region.id());
            *framing = None;
            *model_name = None;
            region.failed();
            LoadStep::ClearModel
        }
    }
}

/// What a frame did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The frame was skipped: the loop is stopped or a frame was open.
    Skipped,
    /// A frame was presented.
    Rendered,
    /// The surface was lost or outdated and has been reconfigured.
    Reconfigured,
}

/// An interactive viewer bound to one host region.
pub struct ModelViewer {
    context: RenderContext,
    renderer: ModelRenderer,
    camera: Camera,
    controls: OrbitControls,
    input: InputProcessor,
    load: Option<LoadTask>,
    region: RegionView,
    framing: Option<Framing>,
    frame_loop: FrameLoop,
    options: Options,
    model_name: Option<String>,
    disposed: bool,
}

impl ModelViewer {
    /// Create a viewer drawing to `context`'s surface. The region starts
    /// empty; call [`start_load`](Self::start_load) to show the canvas and
    /// loading overlay.
    #[must_use]
    pub fn new(context: RenderContext, region_id: &str, options: Options) -> Self {
        let (width, height) = context.size();
        let lighting =
            LightRigUniform::new(&options.lighting, &options.render, context.format());
        let renderer = ModelRenderer::new(
            &context.device,
            &context.queue,
            context.format(),
            (width, height),
            lighting,
        );
        let camera = Camera::new(
            options.camera.fovy,
            width as f32 / height.max(1) as f32,
            options.camera.znear,
            options.camera.zfar,
        );
        let mut controls = OrbitControls::new(&options.controls);
        controls.set_viewport(width, height);

        Self {
            context,
            renderer,
            camera,
            controls,
            input: InputProcessor::new(),
            load: None,
            region: RegionView::new(
                region_id,
                Duration::from_millis(options.render.overlay_fade_ms),
            ),
            framing: None,
            frame_loop: FrameLoop::new(),
            options,
            model_name: None,
            disposed: false,
        }
    }

    /// Begin displaying `task`'s result. Any load already in flight is
    /// cancelled and the region shows a fresh canvas at 0%.
    pub fn start_load(&mut self, task: LoadTask) {
        if self.disposed {
            return;
        }
        if let Some(mut previous) = self.load.replace(task) {
            previous.cancel();
        }
        self.region.start_loading();
    }

    /// Spawn a background load of `source` and display it.
    ///
    /// # Errors
    ///
    /// [`VitrineError::Io`] if the loader thread cannot be started.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(&mut self, source: AssetSource) -> Result<(), VitrineError> {
        log::info!("loading {}", source.display_name());
        let task = LoadTask::spawn(source)?;
        self.start_load(task);
        Ok(())
    }

    /// The host region's state.
    #[must_use]
    pub fn region(&self) -> &RegionView {
        &self.region
    }

    /// The camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The current framing, once a model has loaded.
    #[must_use]
    pub fn framing(&self) -> Option<&Framing> {
        self.framing.as_ref()
    }

    /// Name of the loaded model.
    #[must_use]
    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    /// Whether a load is still running.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.load.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Frame-loop state (FPS, stopped).
    #[must_use]
    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Options in use.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Surface size in physical pixels for a region of `logical` size on a
    /// display with `device_ratio`, with the ratio capped by the render
    /// options.
    #[must_use]
    pub fn surface_size(&self, logical: (f64, f64), device_ratio: f64) -> (u32, u32) {
        let ratio = self.options.render.pixel_ratio(device_ratio);
        (
            (logical.0 * ratio).round().max(0.0) as u32,
            (logical.1 * ratio).round().max(0.0) as u32,
        )
    }

    /// One frame: drain load events, advance the overlay fade, apply orbit
    /// motion, and render.
    ///
    /// # Errors
    ///
    /// [`VitrineError::Viewer`] if the surface is out of memory or
    /// otherwise unusable.
    pub fn frame(&mut self) -> Result<FrameOutcome, VitrineError> {
        if !self.frame_loop.begin() {
            return Ok(FrameOutcome::Skipped);
        }
        self.poll_load();
        let _ = self.region.tick(Instant::now());
        let _ = self.controls.update(&mut self.camera);
        let outcome = self.render();
        self.frame_loop.end();
        outcome
    }

    fn poll_load(&mut self) {
        let Some(task) = self.load.as_mut() else {
            return;
        };
        for event in task.poll() {
            let step = fold_load_event(
                &mut self.region,
                &mut self.framing,
                &mut self.model_name,
                event,
            );
            match step {
                LoadStep::Idle => {}
                LoadStep::Show(model) => self.show_model(*model),
                LoadStep::ClearModel => self.renderer.clear_model(),
            }
        }
    }

    /// Normalize, upload and frame a loaded model.
    pub fn show_model(&mut self, mut model: ModelData) {
        if self.disposed {
            return;
        }
        model.normalize_materials(&self.options.material);
        let framing = frame_bounds(&model.bounds(), &self.options.camera.framing_params());
        log::info!(
            "showing {} ({} triangles, max dimension {:.3})",
            model.name.as_deref().unwrap_or("model"),
            model.triangle_count(),
            framing.max_dim
        );
        self.renderer.set_model(
            &self.context.device,
            &self.context.queue,
            &model,
            framing.translation,
        );
        self.camera.fovy = self.options.camera.fovy;
        framing.apply(&mut self.camera, Some(&mut self.controls));
        self.framing = Some(framing);
        self.model_name = model.name;
        self.region.loaded(Instant::now());
    }

    fn render(&mut self) -> Result<FrameOutcome, VitrineError> {
        let frame = match self.context.get_next_frame() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                self.context.reconfigure();
                return Ok(FrameOutcome::Reconfigured);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::debug!("surface timeout, skipping frame");
                return Ok(FrameOutcome::Skipped);
            }
            Err(e) => return Err(VitrineError::Viewer(e.to_string())),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.update_camera(&self.context.queue, &self.camera);
        let mut encoder = self.context.create_encoder();
        self.renderer.encode(&mut encoder, &view);
        let _ = self.context.submit(encoder);
        frame.present();
        Ok(FrameOutcome::Rendered)
    }

    /// Resize to `width` x `height` physical pixels. Zero sizes and calls
    /// after disposal are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.disposed || !self.context.resize(width, height) {
            return;
        }
        self.camera.set_viewport(width, height);
        self.controls.set_viewport(width, height);
        self.renderer.resize(&self.context.device, width, height);
    }

    /// Feed a pointer/wheel/modifier event to the orbit controls.
    pub fn handle_input(&mut self, event: InputEvent) {
        if self.disposed {
            return;
        }
        match self.input.handle_event(event) {
            Some(ControlCommand::Rotate { delta }) => self.controls.rotate(delta),
            Some(ControlCommand::Pan { delta }) => self.controls.pan(delta),
            Some(ControlCommand::Zoom { delta }) => self.controls.zoom(delta),
            None => {}
        }
    }

    /// Handle a key by its code name (e.g. `"KeyR"`). Returns the bound
    /// action, after applying it where the viewer can.
    pub fn handle_key(&mut self, code: &str) -> Option<KeyAction> {
        let action = self.options.keybindings.lookup(code)?;
        if action == KeyAction::ResetView {
            self.reset_view();
        }
        Some(action)
    }

    /// Return the camera to the framed view of the current model.
    pub fn reset_view(&mut self) {
        if let Some(framing) = self.framing {
            self.controls.stop();
            framing.apply(&mut self.camera, Some(&mut self.controls));
        }
    }

    /// Tear down: stop the frame loop, disable controls, cancel any load,
    /// and free every GPU resource. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.frame_loop.stop();
        self.controls.dispose();
        if let Some(mut task) = self.load.take() {
            task.cancel();
        }
        self.renderer.dispose();
        self.framing = None;
        self.region.clear();
        log::debug!("viewer {} disposed", self.region.id());
    }
}

impl Drop for ModelViewer {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::asset::Progress;
    use crate::camera::framing::FramingParams;
    use crate::model::bounds::Aabb;

    #[test]
    fn mount_without_region_is_an_error() {
        let err = plan_mount("viewer-9", false, "a.glb").unwrap_err();
        assert!(matches!(err, VitrineError::MissingRegion(ref id) if id == "viewer-9"));
    }

    #[test]
    fn mount_with_empty_url_is_missing_url() {
        let err = plan_mount("viewer-9", true, "").unwrap_err();
        assert!(matches!(err, VitrineError::MissingUrl(_)));
    }

    fn shown_model_state() -> (RegionView, Option<Framing>, Option<String>) {
        let mut region = RegionView::new("viewer-1", Duration::from_millis(300));
        region.start_loading();
        let bounds = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let framing = frame_bounds(&bounds, &FramingParams::default());
        (region, Some(framing), Some("chair".to_owned()))
    }

    #[test]
    fn failed_load_clears_model_and_canvas() {
        let (mut region, mut framing, mut name) = shown_model_state();
        let step = fold_load_event(
            &mut region,
            &mut framing,
            &mut name,
            LoadEvent::Failed(VitrineError::Fetch("404".into())),
        );
        assert!(matches!(step, LoadStep::ClearModel));
        assert!(framing.is_none());
        assert!(name.is_none());
        assert!(!region.shows_canvas());
        assert_eq!(
            region.content(),
            &RegionContent::Error {
                title: region::LOAD_ERROR_TITLE.to_owned(),
                detail: Some(region::LOAD_ERROR_HINT.to_owned()),
            }
        );
    }

    #[test]
    fn progress_and_success_keep_the_canvas() {
        let (mut region, mut framing, mut name) = shown_model_state();
        let step = fold_load_event(
            &mut region,
            &mut framing,
            &mut name,
            LoadEvent::Progress(Progress {
                loaded: 50,
                total: Some(100),
            }),
        );
        assert!(matches!(step, LoadStep::Idle));
        assert!(region.overlay().is_some_and(|o| o.percent() > 0.0));

        let step = fold_load_event(
            &mut region,
            &mut framing,
            &mut name,
            LoadEvent::Loaded(Box::new(ModelData::default())),
        );
        assert!(matches!(step, LoadStep::Show(_)));
        assert!(region.shows_canvas());
        assert!(framing.is_some());
    }

    #[test]
    fn mount_with_url_yields_source() {
        let source = plan_mount("v", true, "https://host/m.glb").unwrap();
        assert_eq!(source, AssetSource::Url("https://host/m.glb".into()));
    }
}
