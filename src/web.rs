//! Browser host.
//!
//! [`load_model`] mounts a viewer into a page element: a canvas, a loading
//! overlay with a progress bar, pointer/wheel/key handling, a window resize
//! listener and a `requestAnimationFrame` loop. Each element owns at most
//! one viewer; mounting again disposes the previous one.
//!
//! [`generate_thumbnail`] wires an upload form (file input, hidden data
//! field, submit button, preview element) to the offscreen thumbnail
//! renderer.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    Document, Element, Event, EventTarget, HtmlButtonElement,
    HtmlCanvasElement, HtmlInputElement, ReadableStreamDefaultReader,
    Response,
};

use crate::asset::{LoadTask, Progress};
use crate::error::{log_failure, VitrineError};
use crate::gpu::render_context::RenderContext;
use crate::input::{InputEvent, MouseButton};
use crate::model::import_bytes;
use crate::options::Options;
use crate::thumbnail::form::{Preview, ThumbnailForm};
use crate::thumbnail::ThumbnailRenderer;
use crate::viewer::region::{
    RegionContent, LOADING_TITLE, LOAD_ERROR_HINT, LOAD_ERROR_TITLE,
    NO_URL_MARKER,
};
use crate::viewer::{plan_mount, ModelViewer};

thread_local! {
    static MOUNTS: RefCell<HashMap<String, Rc<RefCell<Mount>>>> =
        RefCell::new(HashMap::new());
}

impl From<VitrineError> for JsValue {
    fn from(e: VitrineError) -> Self {
        Self::from_str(&e.to_string())
    }
}

/// Install the panic hook and route `log` to the browser console.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

// ── DOM helpers ──────────────────────────────────────────────────────────

fn js_error(e: &JsValue) -> VitrineError {
    VitrineError::Fetch(format!("{e:?}"))
}

fn document() -> Result<Document, VitrineError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| VitrineError::Viewer("no document".into()))
}

fn element<T: JsCast>(document: &Document, id: &str) -> Result<T, VitrineError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| VitrineError::MissingRegion(id.to_owned()))?
        .dyn_into::<T>()
        .map_err(|_| VitrineError::MissingRegion(format!("{id} has the wrong element type")))
}

fn create(document: &Document, tag: &str, style: &str) -> Result<Element, JsValue> {
    let el = document.create_element(tag)?;
    el.set_attribute("style", style)?;
    Ok(el)
}

/// Replace `region`'s contents with an error message.
fn show_error(region: &Element, title: &str, detail: Option<&str>) -> Result<(), JsValue> {
    let document = document()?;
    region.set_inner_html("");
    let message = create(
        &document,
        "div",
        "padding:1em;text-align:center;color:#c0392b;font-family:sans-serif",
    )?;
    message.set_text_content(Some(title));
    if let Some(detail) = detail {
        let small = create(&document, "small", "display:block;color:#888;margin-top:.3em")?;
        small.set_text_content(Some(detail));
        let _ = message.append_child(&small)?;
    }
    let _ = region.append_child(&message)?;
    Ok(())
}

/// The loading overlay's DOM nodes.
struct Overlay {
    root: Element,
    bar: Element,
    text: Element,
}

impl Overlay {
    fn new(document: &Document) -> Result<Self, JsValue> {
        let root = create(
            document,
            "div",
            "position:absolute;inset:0;display:flex;flex-direction:column;\
             align-items:center;justify-content:center;gap:.5em;\
             font-family:sans-serif;transition:opacity .25s",
        )?;
        let title = create(document, "div", "")?;
        title.set_text_content(Some(LOADING_TITLE));
        let track = create(
            document,
            "div",
            "width:60%;height:6px;background:rgba(0,0,0,.15);border-radius:3px",
        )?;
        let bar = create(
            document,
            "div",
            "width:0%;height:100%;background:#3498db;border-radius:3px",
        )?;
        let text = create(document, "div", "font-size:.8em")?;
        text.set_text_content(Some("0%"));
        let _ = track.append_child(&bar)?;
        let _ = root.append_child(&title)?;
        let _ = root.append_child(&track)?;
        let _ = root.append_child(&text)?;
        Ok(Self { root, bar, text })
    }

    fn set(&self, percent: f32, done: bool) -> Result<(), JsValue> {
        self.bar.set_attribute(
            "style",
            &format!(
                "width:{percent:.1}%;height:100%;background:#3498db;border-radius:3px"
            ),
        )?;
        self.text.set_text_content(Some(&format!("{percent:.0}%")));
        if done {
            let style = self.root.get_attribute("style").unwrap_or_default();
            if !style.ends_with("opacity:0") {
                self.root.set_attribute("style", &format!("{style};opacity:0"))?;
            }
        }
        Ok(())
    }
}

// ── Mount ────────────────────────────────────────────────────────────────

struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// A viewer mounted into one page element.
struct Mount {
    region_id: String,
    region: Element,
    canvas: HtmlCanvasElement,
    overlay: Option<Overlay>,
    options: Options,
    viewer: Option<ModelViewer>,
    pending: Option<LoadTask>,
    shown: Option<RegionContent>,
    pixel_ratio: f64,
    frame: Option<FrameCallback>,
    frame_id: Option<i32>,
    listeners: Vec<Listener>,
    disposed: bool,
}

impl Mount {
    /// One animation frame. Returns `false` once the loop should stop.
    fn tick(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        let Some(viewer) = self.viewer.as_mut() else {
            return true;
        };
        if let Err(e) = viewer.frame() {
            log::error!("{}: {e}", self.region_id);
        }
        let running = !viewer.frame_loop().is_stopped();
        if let Err(e) = self.sync_dom() {
            log::error!("{}: {e:?}", self.region_id);
        }
        running
    }

    /// Size the canvas to the region at the capped device pixel ratio.
    fn fit_canvas(&mut self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        self.pixel_ratio = self.options.render.pixel_ratio(window.device_pixel_ratio());
        let logical = (
            f64::from(self.region.client_width()),
            f64::from(self.region.client_height()),
        );
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        let (width, height) = viewer.surface_size(logical, self.pixel_ratio);
        if width == 0 || height == 0 {
            return;
        }
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        viewer.resize(width, height);
    }

    /// Mirror the viewer's region state into the DOM.
    fn sync_dom(&mut self) -> Result<(), JsValue> {
        let Some(viewer) = &self.viewer else {
            return Ok(());
        };
        let content = viewer.region().content();
        if self.shown.as_ref() == Some(content) {
            return Ok(());
        }
        match content {
            RegionContent::Empty => self.region.set_inner_html(""),
            RegionContent::Canvas { overlay } => {
                if self.canvas.parent_node().is_none() {
                    self.region.set_inner_html("");
                    let _ = self.region.append_child(&self.canvas)?;
                }
                match (overlay, &self.overlay) {
                    (Some(state), Some(dom)) => dom.set(state.percent(), state.is_done())?,
                    (Some(state), None) => {
                        let dom = Overlay::new(&document()?)?;
                        dom.set(state.percent(), state.is_done())?;
                        let _ = self.region.append_child(&dom.root)?;
                        self.overlay = Some(dom);
                    }
                    (None, _) => {
                        if let Some(dom) = self.overlay.take() {
                            dom.root.remove();
                        }
                    }
                }
            }
            RegionContent::Error { title, detail } => {
                self.overlay = None;
                show_error(&self.region, title, detail.as_deref())?;
            }
        }
        self.shown = Some(content.clone());
        Ok(())
    }

    fn listen(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        closure: Closure<dyn FnMut(Event)>,
    ) -> Result<(), JsValue> {
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        self.listeners.push(Listener {
            target: target.clone(),
            kind,
            closure,
        });
        Ok(())
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let (Some(id), Some(window)) = (self.frame_id.take(), web_sys::window()) {
            if let Err(e) = window.cancel_animation_frame(id) {
                log::warn!("{}: cancelAnimationFrame failed: {e:?}", self.region_id);
            }
        }
        if let Some(frame) = self.frame.take() {
            drop(frame.borrow_mut().take());
        }
        for listener in self.listeners.drain(..) {
            if let Err(e) = listener.target.remove_event_listener_with_callback(
                listener.kind,
                listener.closure.as_ref().unchecked_ref(),
            ) {
                log::warn!("{}: removing {} listener failed: {e:?}", self.region_id, listener.kind);
            }
        }
        if let Some(mut task) = self.pending.take() {
            task.cancel();
        }
        if let Some(mut viewer) = self.viewer.take() {
            viewer.dispose();
        }
        self.overlay = None;
        self.region.set_inner_html("");
        log::debug!("unmounted viewer from {}", self.region_id);
    }
}

fn with_viewer(mount: &Weak<RefCell<Mount>>, f: impl FnOnce(&mut ModelViewer, f64)) {
    let Some(mount) = mount.upgrade() else {
        return;
    };
    let Ok(mut mount) = mount.try_borrow_mut() else {
        return;
    };
    let ratio = mount.pixel_ratio;
    if let Some(viewer) = mount.viewer.as_mut() {
        f(viewer, ratio);
    }
}

/// Translate a DOM pointer/wheel event into viewer input.
fn dom_input(event: &Event, ratio: f64) -> Vec<InputEvent> {
    let kind = event.type_();
    if let Some(wheel) = event.dyn_ref::<web_sys::WheelEvent>() {
        event.prevent_default();
        let lines = match wheel.delta_mode() {
            web_sys::WheelEvent::DOM_DELTA_PIXEL => wheel.delta_y() / 100.0,
            _ => wheel.delta_y(),
        };
        return vec![InputEvent::Scroll {
            delta: -lines as f32,
        }];
    }
    let Some(mouse) = event.dyn_ref::<web_sys::MouseEvent>() else {
        return Vec::new();
    };
    let modifiers = InputEvent::ModifiersChanged {
        shift: mouse.shift_key(),
    };
    match kind.as_str() {
        "mousedown" | "mouseup" => vec![
            modifiers,
            InputEvent::MouseButton {
                button: MouseButton::from_dom_button(mouse.button()),
                pressed: kind == "mousedown",
            },
        ],
        "mousemove" => vec![
            modifiers,
            InputEvent::CursorMoved {
                x: (f64::from(mouse.offset_x()) * ratio) as f32,
                y: (f64::from(mouse.offset_y()) * ratio) as f32,
            },
        ],
        "mouseleave" => vec![InputEvent::CursorLeft],
        "contextmenu" => {
            event.prevent_default();
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn install_listeners(mount: &Rc<RefCell<Mount>>) -> Result<(), JsValue> {
    let weak = Rc::downgrade(mount);
    let mut m = mount.borrow_mut();
    let canvas: EventTarget = m.canvas.clone().into();

    for kind in [
        "mousedown",
        "mouseup",
        "mousemove",
        "mouseleave",
        "wheel",
        "contextmenu",
    ] {
        let weak = weak.clone();
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            with_viewer(&weak, |viewer, ratio| {
                for input in dom_input(&event, ratio) {
                    viewer.handle_input(input);
                }
            });
        });
        m.listen(&canvas, kind, closure)?;
    }

    let keys = weak.clone();
    let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Some(key) = event.dyn_ref::<web_sys::KeyboardEvent>() {
            with_viewer(&keys, |viewer, _| {
                let _ = viewer.handle_key(&key.code());
            });
        }
    });
    m.listen(&canvas, "keydown", closure)?;

    let window: EventTarget = web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .into();
    let resize = weak;
    let closure = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        if let Some(mount) = resize.upgrade() {
            if let Ok(mut mount) = mount.try_borrow_mut() {
                mount.fit_canvas();
            }
        }
    });
    m.listen(&window, "resize", closure)
}

fn start_frames(mount: &Rc<RefCell<Mount>>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let next = Rc::clone(&callback);
    let weak = Rc::downgrade(mount);
    *callback.borrow_mut() = Some(Closure::new(move || {
        let Some(mount) = weak.upgrade() else {
            return;
        };
        let Ok(mut m) = mount.try_borrow_mut() else {
            return;
        };
        if !m.tick() {
            return;
        }
        let id = web_sys::window().and_then(|w| {
            next.borrow()
                .as_ref()
                .and_then(|cb| w.request_animation_frame(cb.as_ref().unchecked_ref()).ok())
        });
        m.frame_id = id;
    }));

    let id = callback
        .borrow()
        .as_ref()
        .map(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()))
        .transpose()?;
    let mut m = mount.borrow_mut();
    m.frame_id = id;
    m.frame = Some(callback);
    Ok(())
}

// ── Fetch ────────────────────────────────────────────────────────────────

/// Fetch `url`, reporting progress per received chunk.
async fn fetch_bytes(
    url: &str,
    mut on_progress: impl FnMut(Progress),
) -> Result<Vec<u8>, VitrineError> {
    let window = web_sys::window().ok_or_else(|| VitrineError::Fetch("no window".into()))?;
    let response: Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| js_error(&e))?
        .dyn_into()
        .map_err(|e| js_error(&e))?;
    if !response.ok() {
        return Err(VitrineError::Fetch(format!(
            "HTTP {} for {url}",
            response.status()
        )));
    }
    let total = response
        .headers()
        .get("content-length")
        .ok()
        .flatten()
        .and_then(|v| v.parse::<u64>().ok());

    let Some(body) = response.body() else {
        let buffer = JsFuture::from(response.array_buffer().map_err(|e| js_error(&e))?)
            .await
            .map_err(|e| js_error(&e))?;
        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
        on_progress(Progress {
            loaded: bytes.len() as u64,
            total,
        });
        return Ok(bytes);
    };

    let reader: ReadableStreamDefaultReader =
        body.get_reader().dyn_into().map_err(|e| js_error(&e))?;
    let mut bytes = Vec::new();
    loop {
        let chunk = JsFuture::from(reader.read())
            .await
            .map_err(|e| js_error(&e))?;
        let done = js_sys::Reflect::get(&chunk, &JsValue::from_str("done"))
            .map_err(|e| js_error(&e))?
            .as_bool()
            .unwrap_or(true);
        if done {
            break;
        }
        let value: js_sys::Uint8Array = js_sys::Reflect::get(&chunk, &JsValue::from_str("value"))
            .map_err(|e| js_error(&e))?
            .dyn_into()
            .map_err(|e| js_error(&e))?;
        let start = bytes.len();
        bytes.resize(start + value.length() as usize, 0);
        value.copy_to(&mut bytes[start..]);
        on_progress(Progress {
            loaded: bytes.len() as u64,
            total,
        });
    }
    Ok(bytes)
}

// ── Viewer entry points ──────────────────────────────────────────────────

/// Handle to a mounted viewer.
#[wasm_bindgen]
pub struct ViewerHandle {
    region_id: String,
    mount: Weak<RefCell<Mount>>,
}

#[wasm_bindgen]
impl ViewerHandle {
    /// Stop rendering, detach listeners, free GPU resources and clear the
    /// element. Safe to call more than once.
    pub fn dispose(&self) {
        let Some(mount) = self.mount.upgrade() else {
            return;
        };
        MOUNTS.with(|mounts| {
            let mut mounts = mounts.borrow_mut();
            if mounts
                .get(&self.region_id)
                .is_some_and(|current| Rc::ptr_eq(current, &mount))
            {
                let _ = mounts.remove(&self.region_id);
            }
        });
        if let Ok(mut mount) = mount.try_borrow_mut() {
            mount.dispose();
        }
    }

    /// Whether the viewer has been disposed (directly or by a remount).
    #[wasm_bindgen(getter)]
    pub fn disposed(&self) -> bool {
        self.mount
            .upgrade()
            .is_none_or(|m| m.try_borrow().is_ok_and(|m| m.disposed))
    }
}

/// Mount a viewer for `model_url` into the element `container_id`.
///
/// Returns `None` when the element does not exist (an error is logged) or
/// the URL is empty (the element shows a "No URL" marker).
///
/// # Errors
///
/// A DOM operation failed.
#[wasm_bindgen]
pub fn load_model(container_id: &str, model_url: &str) -> Result<Option<ViewerHandle>, JsValue> {
    let document = document()?;
    let region = document.get_element_by_id(container_id);

    if let Some(previous) = MOUNTS.with(|m| m.borrow_mut().remove(container_id)) {
        if let Ok(mut previous) = previous.try_borrow_mut() {
            previous.dispose();
        }
    }

    if let Err(e) = plan_mount(container_id, region.is_some(), model_url) {
        log::error!("{e}");
        if let (VitrineError::MissingUrl(_), Some(region)) = (&e, &region) {
            show_error(region, NO_URL_MARKER, None)?;
        }
        return Ok(None);
    }
    let Some(region) = region else {
        return Ok(None);
    };
    let url = model_url.trim().to_owned();

    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.set_attribute("style", "width:100%;height:100%;display:block;outline:none")?;
    canvas.set_attribute("tabindex", "0")?;
    let overlay = Overlay::new(&document)?;
    region.set_inner_html("");
    let style = region.get_attribute("style").unwrap_or_default();
    region.set_attribute("style", &format!("{style};position:relative"))?;
    let _ = region.append_child(&canvas)?;
    let _ = region.append_child(&overlay.root)?;

    let (task, sender) = LoadTask::channel();
    let mount = Rc::new(RefCell::new(Mount {
        region_id: container_id.to_owned(),
        region,
        canvas: canvas.clone(),
        overlay: Some(overlay),
        options: Options::default(),
        viewer: None,
        pending: Some(task),
        shown: None,
        pixel_ratio: 1.0,
        frame: None,
        frame_id: None,
        listeners: Vec::new(),
        disposed: false,
    }));
    let _ = MOUNTS.with(|m| {
        m.borrow_mut()
            .insert(container_id.to_owned(), Rc::clone(&mount))
    });
    install_listeners(&mount)?;
    start_frames(&mount)?;

    spawn_local(async move {
        let bytes = fetch_bytes(&url, |p| sender.progress(p)).await;
        if sender.is_cancelled() {
            return;
        }
        let result = bytes.and_then(|bytes| {
            let mut model = import_bytes(&bytes)?;
            let _ = model.name.get_or_insert(url);
            Ok(model)
        });
        let _ = sender.finish(result);
    });

    let weak = Rc::downgrade(&mount);
    let region_id = container_id.to_owned();
    spawn_local(async move {
        let (options, size) = {
            let Some(mount) = weak.upgrade() else {
                return;
            };
            let m = mount.borrow();
            let size = (m.region.client_width().max(1) as u32, m.region.client_height().max(1) as u32);
            (m.options.clone(), size)
        };
        let context = RenderContext::new(
            wgpu::SurfaceTarget::Canvas(canvas),
            size,
            options.render.power_preference,
        )
        .await;

        let Some(mount) = weak.upgrade() else {
            return;
        };
        let Ok(mut m) = mount.try_borrow_mut() else {
            log::error!("{region_id}: viewer busy during GPU setup");
            return;
        };
        if m.disposed {
            return;
        }
        match context {
            Ok(context) => {
                let mut viewer = ModelViewer::new(context, &region_id, options);
                if let Some(task) = m.pending.take() {
                    viewer.start_load(task);
                }
                m.viewer = Some(viewer);
                m.fit_canvas();
            }
            Err(e) => {
                log::error!("{region_id}: {e}");
                m.overlay = None;
                if let Err(e) = show_error(&m.region, LOAD_ERROR_TITLE, Some(LOAD_ERROR_HINT)) {
                    log::error!("{region_id}: {e:?}");
                }
            }
        }
    });

    Ok(Some(ViewerHandle {
        region_id: container_id.to_owned(),
        mount: Rc::downgrade(&mount),
    }))
}

// ── Thumbnail form ───────────────────────────────────────────────────────

struct FormElements {
    field: HtmlInputElement,
    button: HtmlButtonElement,
    preview: Element,
}

impl FormElements {
    /// Push the form state into the DOM, logging any failure.
    fn refresh(&self, form: &ThumbnailForm) {
        let _ = log_failure("thumbnail form", self.apply(form));
    }

    fn apply(&self, form: &ThumbnailForm) -> Result<(), JsValue> {
        self.field.set_value(form.field());
        self.button.set_disabled(!form.submit().enabled);
        self.button.set_text_content(Some(form.submit().label));
        match form.preview() {
            Preview::Empty => self.preview.set_inner_html(""),
            Preview::Image(url) => {
                let (width, height) = Options::default().thumbnail.pixel_size();
                let img = document()?.create_element("img")?;
                img.set_attribute("src", url)?;
                img.set_attribute("width", &width.to_string())?;
                img.set_attribute("height", &height.to_string())?;
                self.preview.set_inner_html("");
                let _ = self.preview.append_child(&img)?;
            }
            Preview::Message(text) => self.preview.set_text_content(Some(text)),
        }
        Ok(())
    }
}

fn revoke(handle: Option<String>) {
    if let Some(url) = handle {
        if let Err(e) = web_sys::Url::revoke_object_url(&url) {
            log::warn!("cannot release {url}: {e:?}");
        }
    }
}

async fn render_thumbnail(object_url: &str) -> Result<String, VitrineError> {
    let bytes = fetch_bytes(object_url, |_| {}).await?;
    let model = import_bytes(&bytes)?;
    let options = Options::default();
    let (width, height) = options.thumbnail.pixel_size();
    let canvas: HtmlCanvasElement = document()?
        .create_element("canvas")
        .map_err(|e| js_error(&e))?
        .dyn_into()
        .map_err(|e| js_error(&e))?;
    canvas.set_width(width);
    canvas.set_height(height);
    let context = RenderContext::new(
        wgpu::SurfaceTarget::Canvas(canvas),
        (width, height),
        options.render.power_preference,
    )
    .await?;
    let mut renderer = ThumbnailRenderer::with_context(context, &options);
    Ok(renderer.render(&model).await?.data_url)
}

/// Generate a thumbnail whenever a file is chosen in `file_input_id`,
/// writing the data URL into the hidden field `field_id`, toggling
/// `button_id`, and showing the image in `preview_id`.
///
/// # Errors
///
/// Any of the elements is missing.
#[wasm_bindgen]
pub fn generate_thumbnail(
    file_input_id: &str,
    field_id: &str,
    button_id: &str,
    preview_id: &str,
) -> Result<(), JsValue> {
    let document = document()?;
    let input: HtmlInputElement = element(&document, file_input_id)?;
    let elements = Rc::new(FormElements {
        field: element(&document, field_id)?,
        button: element(&document, button_id)?,
        preview: element(&document, preview_id)?,
    });
    let form = Rc::new(RefCell::new(ThumbnailForm::new()));
    elements.apply(&form.borrow())?;

    let source = input.clone();
    let on_change = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        let file = source.files().and_then(|files| files.get(0));
        let Some(file) = file else {
            revoke(form.borrow_mut().file_cleared());
            elements.refresh(&form.borrow());
            return;
        };
        let url = match web_sys::Url::create_object_url_with_blob(&file) {
            Ok(url) => url,
            Err(e) => {
                log::error!("cannot read the chosen file: {e:?}");
                return;
            }
        };
        let (id, superseded) = form.borrow_mut().file_selected(url.clone());
        revoke(superseded);
        elements.refresh(&form.borrow());

        let form = Rc::clone(&form);
        let elements = Rc::clone(&elements);
        spawn_local(async move {
            let result = render_thumbnail(&url).await;
            let released = match result {
                Ok(data_url) => form.borrow_mut().succeeded(id, data_url),
                Err(e) => {
                    log::error!("thumbnail generation failed: {e}");
                    form.borrow_mut().failed(id)
                }
            };
            revoke(released);
            elements.refresh(&form.borrow());
        });
    });
    input.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
    on_change.forget();
    Ok(())
}
