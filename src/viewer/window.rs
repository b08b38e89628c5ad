//! Standalone viewer window backed by winit.
//!
//! ```no_run
//! # use vitrine::viewer::window::ViewerWindow;
//! ViewerWindow::builder()
//!     .with_location("path/to/model.glb")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use super::region::RegionContent;
use super::{plan_mount, FrameOutcome, ModelViewer};
use crate::error::VitrineError;
use crate::gpu::render_context::RenderContext;
use crate::input::{InputEvent, KeyAction, MouseButton};
use crate::options::Options;

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`ViewerWindow`].
pub struct ViewerWindowBuilder {
    location: String,
    options: Option<Options>,
    title: String,
}

impl ViewerWindowBuilder {
    fn new() -> Self {
        Self {
            location: String::new(),
            options: None,
            title: "Vitrine".into(),
        }
    }

    /// Model path or http(s) URL.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`ViewerWindow`].
    #[must_use]
    pub fn build(self) -> ViewerWindow {
        ViewerWindow {
            location: self.location,
            options: self.options.unwrap_or_default(),
            title: self.title,
        }
    }
}

// ── Window ───────────────────────────────────────────────────────────────

/// A desktop window that displays one model.
///
/// Construct via [`ViewerWindow::builder`], then call [`run`](Self::run)
/// to enter the event loop.
pub struct ViewerWindow {
    location: String,
    options: Options,
    title: String,
}

impl ViewerWindow {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerWindowBuilder {
        ViewerWindowBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// [`VitrineError::MissingUrl`] for an empty location (the window is
    /// never opened), [`VitrineError::Viewer`] if the event loop fails.
    pub fn run(self) -> Result<(), VitrineError> {
        let source = match plan_mount(&self.title, true, &self.location) {
            Ok(source) => source,
            Err(e) => {
                log::error!("{e}");
                return Err(e);
            }
        };

        let event_loop =
            EventLoop::new().map_err(|e| VitrineError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = WindowApp {
            window: None,
            viewer: None,
            source: Some(source),
            options: Some(self.options),
            title: self.title,
            shown_title: String::new(),
            fatal: None,
        };
        event_loop
            .run_app(&mut app)
            .map_err(|e| VitrineError::Viewer(e.to_string()))?;
        app.fatal.map_or(Ok(()), Err)
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

struct WindowApp {
    window: Option<Arc<Window>>,
    viewer: Option<ModelViewer>,
    source: Option<crate::asset::AssetSource>,
    options: Option<Options>,
    title: String,
    shown_title: String,
    fatal: Option<VitrineError>,
}

impl WindowApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: VitrineError) {
        log::error!("{error}");
        self.fatal = Some(error);
        event_loop.exit();
    }

    fn surface_size(&self, window: &Window) -> (u32, u32) {
        let inner = window.inner_size();
        let scale = window.scale_factor();
        let logical = (f64::from(inner.width) / scale, f64::from(inner.height) / scale);
        self.viewer.as_ref().map_or((inner.width, inner.height), |v| {
            v.surface_size(logical, scale)
        })
    }

    /// Mirror the region state into the window title.
    fn sync_title(&mut self) {
        let (Some(window), Some(viewer)) = (&self.window, &self.viewer) else {
            return;
        };
        let name = viewer.model_name().unwrap_or(&self.title);
        let title = match viewer.region().content() {
            RegionContent::Canvas {
                overlay: Some(overlay),
            } if !overlay.is_done() => {
                format!("{} - {:.0}%", self.title, overlay.percent())
            }
            RegionContent::Error { title, detail } => match detail {
                Some(detail) => format!("{} - {title}: {detail}", self.title),
                None => format!("{} - {title}", self.title),
            },
            _ => format!("{} - {name}", self.title),
        };
        if title != self.shown_title {
            window.set_title(&title);
            self.shown_title = title;
        }
    }
}

impl ApplicationHandler for WindowApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(&self.title)
            .with_transparent(true)
            .with_inner_size(winit::dpi::LogicalSize::new(960.0, 720.0));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, VitrineError::Viewer(e.to_string()));
                return;
            }
        };

        let options = self.options.take().unwrap_or_default();
        let inner = window.inner_size();
        let context = match pollster::block_on(RenderContext::new(
            Arc::clone(&window),
            (inner.width, inner.height),
            options.render.power_preference,
        )) {
            Ok(context) => context,
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        };

        let mut viewer = ModelViewer::new(context, &self.title, options);
        if let Some(source) = self.source.take() {
            if let Err(e) = viewer.load(source) {
                self.fail(event_loop, e);
                return;
            }
        }
        self.viewer = Some(viewer);
        let (w, h) = self.surface_size(&window);
        if let Some(viewer) = &mut self.viewer {
            viewer.resize(w, h);
        }

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            if let Some(viewer) = &mut self.viewer {
                viewer.dispose();
            }
            event_loop.exit();
            return;
        }

        let Some(window) = self.window.clone() else {
            return;
        };
        if self.viewer.is_none() {
            return;
        }

        match event {
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                let (w, h) = self.surface_size(&window);
                if let Some(viewer) = &mut self.viewer {
                    viewer.resize(w, h);
                }
            }

            WindowEvent::RedrawRequested => {
                let result = self.viewer.as_mut().map(ModelViewer::frame);
                match result {
                    Some(Ok(FrameOutcome::Reconfigured)) => {
                        log::debug!("surface reconfigured");
                    }
                    Some(Err(e)) => {
                        self.fail(event_loop, e);
                        return;
                    }
                    _ => {}
                }
                self.sync_title();
                window.request_redraw();
            }

            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(viewer) = &mut self.viewer {
                    viewer.handle_input(InputEvent::MouseButton {
                        button: MouseButton::from(button),
                        pressed: state == ElementState::Pressed,
                    });
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if let Some(viewer) = &mut self.viewer {
                    #[allow(clippy::cast_possible_truncation)]
                    viewer.handle_input(InputEvent::CursorMoved {
                        x: position.x as f32,
                        y: position.y as f32,
                    });
                }
            }

            WindowEvent::CursorLeft { .. } => {
                if let Some(viewer) = &mut self.viewer {
                    viewer.handle_input(InputEvent::CursorLeft);
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                #[allow(clippy::cast_possible_truncation)]
                let scroll_delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                };
                if let Some(viewer) = &mut self.viewer {
                    viewer.handle_input(InputEvent::Scroll {
                        delta: scroll_delta,
                    });
                }
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                if let Some(viewer) = &mut self.viewer {
                    viewer.handle_input(InputEvent::ModifiersChanged {
                        shift: modifiers.state().shift_key(),
                    });
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let key_str = format!("{code:?}");
                let action = self
                    .viewer
                    .as_mut()
                    .and_then(|viewer| viewer.handle_key(&key_str));
                if action == Some(KeyAction::Close) {
                    if let Some(viewer) = &mut self.viewer {
                        viewer.dispose();
                    }
                    event_loop.exit();
                }
            }

            _ => (),
        }
    }
}
