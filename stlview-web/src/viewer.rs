/// Per-attachment viewer state, its event wiring, and its render task
use std::cell::RefCell;
use std::rc::Rc;

use stlview_core::{
    load_models, Camera, ConnectionFlag, FrameDecision, LoadedScene, Lighting, ModelDescriptor,
    OrbitControls, RenderLoop, ViewerError, ViewerVariant,
};
use tracing::{error, info, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Event, HtmlCanvasElement, HtmlElement, PointerEvent, ShadowRoot, ShadowRootInit,
    ShadowRootMode, WheelEvent, Window,
};

use crate::fetch::{js_reason, FetchSource};
use crate::gl::GlRenderer;
use crate::listener::ScopedListener;

const HOST_STYLE: &str = ":host { display: block; width: 100%; height: 100%; }";

/// What a pointer drag does to the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Rotate,
    Pan,
}

impl DragMode {
    /// Primary button rotates, secondary button or shift-drag pans
    pub fn from_pointer(button: i16, shift: bool) -> Option<Self> {
        match (button, shift) {
            (0, false) => Some(Self::Rotate),
            (0, true) | (2, _) => Some(Self::Pan),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    mode: DragMode,
    x: f32,
    y: f32,
}

/// Camera and controls, present once the scene is framed
struct View {
    camera: Camera,
    controls: OrbitControls,
}

/// Everything one attachment owns
pub struct ViewerState {
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    renderer: GlRenderer,
    view: Option<View>,
    drag: Option<Drag>,
}

impl ViewerState {
    fn container_size(&self) -> (u32, u32) {
        (
            self.container.client_width().max(0) as u32,
            self.container.client_height().max(0) as u32,
        )
    }

    /// Upload a loaded scene and frame the camera on it
    fn install(&mut self, scene: &LoadedScene, variant: &ViewerVariant) -> Result<(), ViewerError> {
        self.renderer.upload(scene)?;
        let (width, height) = self.container_size();
        self.renderer.resize(&self.canvas, width, height);
        let (camera, controls) = variant.frame(&scene.bounds, width, height);
        self.view = Some(View { camera, controls });
        Ok(())
    }

    fn draw_frame(&mut self) {
        if let Some(view) = &mut self.view {
            view.controls.update(&mut view.camera);
            self.renderer.render(&view.camera);
        }
    }

    fn resize(&mut self) {
        let (width, height) = self.container_size();
        self.renderer.resize(&self.canvas, width, height);
        if let Some(view) = &mut self.view {
            view.camera.resize(width, height);
        }
    }

    fn pointer_down(&mut self, event: &PointerEvent) {
        self.drag = DragMode::from_pointer(event.button(), event.shift_key()).map(|mode| Drag {
            mode,
            x: event.client_x() as f32,
            y: event.client_y() as f32,
        });
    }

    fn pointer_move(&mut self, event: &PointerEvent) {
        let Some(drag) = &mut self.drag else {
            return;
        };
        let (x, y) = (event.client_x() as f32, event.client_y() as f32);
        let (dx, dy) = (x - drag.x, y - drag.y);
        drag.x = x;
        drag.y = y;
        let mode = drag.mode;

        let (width, height) = self.container_size();
        if let Some(view) = &mut self.view {
            match mode {
                DragMode::Rotate => view.controls.rotate_by_pixels(dx, dy, height),
                DragMode::Pan => view.controls.pan_by_pixels(&view.camera, dx, dy, width, height),
            }
        }
    }

    fn wheel(&mut self, event: &WheelEvent) {
        if let Some(view) = &mut self.view {
            view.controls.zoom_by_wheel(event.delta_y() as f32);
        }
    }

    fn dispose(&mut self) {
        self.view = None;
        self.renderer.dispose();
    }
}

/// One connected lifetime of the element. Dropping it unregisters every
/// listener; the render task notices the cleared flag on its next frame.
pub struct Attachment {
    flag: ConnectionFlag,
    _listeners: Vec<ScopedListener>,
}

impl Attachment {
    /// Build the shadow DOM under `host`, wire input and resize handling,
    /// and start loading `models`.
    pub fn start(
        host: &HtmlElement,
        models: Vec<ModelDescriptor>,
        variant: ViewerVariant,
    ) -> Result<Self, ViewerError> {
        let window = web_sys::window().ok_or_else(|| ViewerError::Surface("no window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| ViewerError::Surface("no document".to_string()))?;

        let (container, canvas) = build_dom(host, &document).map_err(dom_error)?;
        let renderer = GlRenderer::new(&canvas, Lighting::default())?;
        let state = Rc::new(RefCell::new(ViewerState {
            container,
            canvas: canvas.clone(),
            renderer,
            view: None,
            drag: None,
        }));
        state.borrow_mut().resize();

        let listeners = wire_listeners(&window, &canvas, &state)?;
        let flag = ConnectionFlag::new();

        let task_flag = flag.clone();
        wasm_bindgen_futures::spawn_local(async move {
            run(state, models, variant, task_flag).await;
        });

        Ok(Self {
            flag,
            _listeners: listeners,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.flag.is_connected()
    }
}

impl Drop for Attachment {
    fn drop(&mut self) {
        self.flag.disconnect();
    }
}

fn dom_error(err: JsValue) -> ViewerError {
    ViewerError::Surface(js_reason(&err))
}

/// Open (or reuse and empty) the host's shadow root and fill it with a
/// full-size container holding the canvas
fn build_dom(host: &HtmlElement, document: &Document) -> Result<(HtmlElement, HtmlCanvasElement), JsValue> {
    let root: ShadowRoot = match host.shadow_root() {
        Some(root) => root,
        None => host.attach_shadow(&ShadowRootInit::new(ShadowRootMode::Open))?,
    };
    while let Some(child) = root.first_child() {
        root.remove_child(&child)?;
    }

    let style = document.create_element("style")?;
    style.set_text_content(Some(HOST_STYLE));
    root.append_child(&style)?;

    let container: HtmlElement = document.create_element("div")?.dyn_into()?;
    container.style().set_property("width", "100%")?;
    container.style().set_property("height", "100%")?;
    root.append_child(&container)?;

    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.style().set_property("display", "block")?;
    canvas.style().set_property("touch-action", "none")?;
    container.append_child(&canvas)?;

    Ok((container, canvas))
}

fn wire_listeners(
    window: &Window,
    canvas: &HtmlCanvasElement,
    state: &Rc<RefCell<ViewerState>>,
) -> Result<Vec<ScopedListener>, ViewerError> {
    let mut listeners = Vec::new();

    let s = state.clone();
    listeners.push(ScopedListener::new(window, "resize", move |_| {
        s.borrow_mut().resize();
    })?);

    let s = state.clone();
    listeners.push(ScopedListener::new(canvas, "pointerdown", move |event: Event| {
        if let Some(event) = event.dyn_ref::<PointerEvent>() {
            s.borrow_mut().pointer_down(event);
        }
    })?);

    let s = state.clone();
    listeners.push(ScopedListener::new(canvas, "pointermove", move |event: Event| {
        if let Some(event) = event.dyn_ref::<PointerEvent>() {
            s.borrow_mut().pointer_move(event);
        }
    })?);

    for name in ["pointerup", "pointerleave", "pointercancel"] {
        let s = state.clone();
        listeners.push(ScopedListener::new(canvas, name, move |_| {
            s.borrow_mut().drag = None;
        })?);
    }

    let s = state.clone();
    listeners.push(ScopedListener::new(canvas, "wheel", move |event: Event| {
        event.prevent_default();
        if let Some(event) = event.dyn_ref::<WheelEvent>() {
            s.borrow_mut().wheel(event);
        }
    })?);

    listeners.push(ScopedListener::new(canvas, "contextmenu", |event: Event| {
        event.prevent_default();
    })?);

    Ok(listeners)
}

/// Resolve on the browser's next animation frame
async fn next_animation_frame(window: &Window) -> Result<(), JsValue> {
    let mut scheduled = Ok(0);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        scheduled = window.request_animation_frame(&resolve);
    });
    scheduled?;
    JsFuture::from(promise).await?;
    Ok(())
}

/// Load the scene, then draw one frame per animation frame until the
/// attachment ends. GPU resources are released on every exit path.
async fn run(
    state: Rc<RefCell<ViewerState>>,
    models: Vec<ModelDescriptor>,
    variant: ViewerVariant,
    flag: ConnectionFlag,
) {
    let scene = match load_models(&FetchSource, &models, &variant).await {
        Ok(scene) => scene,
        Err(err) => {
            error!(error = %err, "Failed to load models");
            state.borrow_mut().dispose();
            return;
        }
    };

    let installed = state.borrow_mut().install(&scene, &variant);
    if let Err(err) = installed {
        error!(error = %err, "Failed to prepare scene");
        state.borrow_mut().dispose();
        return;
    }
    drop(scene);

    if !flag.is_connected() {
        info!("Viewer detached while loading");
        state.borrow_mut().dispose();
        return;
    }

    let Some(window) = web_sys::window() else {
        state.borrow_mut().dispose();
        return;
    };

    let mut render_loop = RenderLoop::new(flag);
    loop {
        state.borrow_mut().draw_frame();
        if render_loop.end_frame() == FrameDecision::Stop {
            break;
        }
        if let Err(err) = next_animation_frame(&window).await {
            warn!(error = %js_reason(&err), "Animation frame unavailable");
            break;
        }
    }

    info!(frames = render_loop.frames(), "Render loop stopped");
    state.borrow_mut().dispose();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_mode_from_pointer() {
        assert_eq!(DragMode::from_pointer(0, false), Some(DragMode::Rotate));
        assert_eq!(DragMode::from_pointer(0, true), Some(DragMode::Pan));
        assert_eq!(DragMode::from_pointer(2, false), Some(DragMode::Pan));
        assert_eq!(DragMode::from_pointer(1, false), None);
    }
}
