//! Browser binding
//!
//! Mounts a [`Backdrop`] onto a `<canvas>`, wiring the resize listener, the
//! pointer listener and the animation-frame loop. [`BackdropHandle`] owns all
//! three and releases them exactly once, on `teardown` or drop.

use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, MouseEvent, WebGl2RenderingContext,
    WebGlRenderingContext, Window,
};

use crate::error::BackdropError;
use crate::renderer::{Color, Paint, Surface};
use crate::scheduler::{Backdrop, Viewport};
use crate::settings::Settings;
use crate::tier::{GraphicsProbe, classify};

/// `UNMASKED_RENDERER_WEBGL` from WEBGL_debug_renderer_info
const UNMASKED_RENDERER_WEBGL: u32 = 0x9246;

// === Capability probing ===

/// Query the WebGL renderer string; any exception degrades to `Failed`
pub fn probe_graphics(document: &Document) -> GraphicsProbe {
    match try_probe_graphics(document) {
        Ok(probe) => probe,
        Err(e) => {
            log::warn!("Graphics probe failed: {:?}", e);
            GraphicsProbe::Failed
        }
    }
}

fn try_probe_graphics(document: &Document) -> Result<GraphicsProbe, JsValue> {
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")?
        .dyn_into()
        .map_err(JsValue::from)?;

    if let Some(ctx) = canvas.get_context("webgl2")? {
        let gl: WebGl2RenderingContext = ctx.dyn_into().map_err(JsValue::from)?;
        let renderer = match gl.get_extension("WEBGL_debug_renderer_info")? {
            Some(_) => gl.get_parameter(UNMASKED_RENDERER_WEBGL)?.as_string(),
            None => None,
        };
        return Ok(GraphicsProbe::Context { renderer });
    }

    if let Some(ctx) = canvas.get_context("webgl")? {
        let gl: WebGlRenderingContext = ctx.dyn_into().map_err(JsValue::from)?;
        let renderer = match gl.get_extension("WEBGL_debug_renderer_info")? {
            Some(_) => gl.get_parameter(UNMASKED_RENDERER_WEBGL)?.as_string(),
            None => None,
        };
        return Ok(GraphicsProbe::Context { renderer });
    }

    Ok(GraphicsProbe::NoContext)
}

/// Logical cores reported by the navigator, if any
pub fn hardware_concurrency(window: &Window) -> Option<u32> {
    let cores = window.navigator().hardware_concurrency();
    (cores.is_finite() && cores >= 1.0).then_some(cores as u32)
}

/// `prefers-reduced-motion: reduce`
pub fn prefers_reduced_motion(window: &Window) -> bool {
    window
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .map(|query| query.matches())
        .unwrap_or(false)
}

// === Drawing surface ===

/// [`Surface`] over a `CanvasRenderingContext2d`
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    size: Vec2,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d, size: Vec2) -> Self {
        Self { ctx, size }
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha as f64);
    }

    fn reset_composite(&mut self) {
        let _ = self.ctx.set_global_composite_operation("source-over");
    }

    fn set_fill(&mut self, paint: &Paint) {
        match paint {
            Paint::Solid(color) => self.ctx.set_fill_style_str(&color.to_css()),
            Paint::Radial(gradient) => {
                let c = gradient.center;
                let r = gradient.radius.max(0.0) as f64;
                match self
                    .ctx
                    .create_radial_gradient(c.x as f64, c.y as f64, 0.0, c.x as f64, c.y as f64, r)
                {
                    Ok(g) => {
                        for (offset, color) in &gradient.stops {
                            let _ = g.add_color_stop(*offset, &color.to_css());
                        }
                        self.ctx.set_fill_style_canvas_gradient(&g);
                    }
                    Err(e) => log::debug!("Skipping gradient: {:?}", e),
                }
            }
        }
    }

    fn set_stroke(&mut self, color: Color, width: f32) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width as f64);
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2) {
        self.ctx
            .fill_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32) {
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU);
        self.ctx.fill();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2) {
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }

    fn fill_polygon(&mut self, points: &[Vec2]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
        self.ctx.close_path();
        self.ctx.fill();
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, BackdropError> {
    let options = js_sys::Object::new();
    js_sys::Reflect::set(&options, &"alpha".into(), &JsValue::FALSE)?;
    js_sys::Reflect::set(&options, &"desynchronized".into(), &JsValue::TRUE)?;

    canvas
        .get_context_with_context_options("2d", &options)?
        .ok_or(BackdropError::ContextUnavailable)?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| BackdropError::ContextUnavailable)
}

fn canvas_css_size(canvas: &HtmlCanvasElement) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    Vec2::new(rect.width() as f32, rect.height() as f32)
}

/// Size the backing store and set an absolute scale transform
fn apply_viewport(canvas: &HtmlCanvasElement, ctx: &CanvasRenderingContext2d, viewport: Viewport) {
    let (width, height) = viewport.backing_size();
    if canvas.width() != width || canvas.height() != height {
        canvas.set_width(width);
        canvas.set_height(height);
    }
    let s = viewport.scale_factor();
    let _ = ctx.set_transform(s, 0.0, 0.0, s, 0.0, 0.0);
}

// === Lifetime ===

struct Listeners {
    resize: Closure<dyn FnMut(web_sys::Event)>,
    pointer: Closure<dyn FnMut(MouseEvent)>,
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// A mounted backdrop. Dropping it stops the frame loop and removes every
/// listener it registered.
pub struct BackdropHandle {
    window: Window,
    document: Document,
    backdrop: Rc<RefCell<Backdrop>>,
    frame_request: Rc<Cell<Option<i32>>>,
    frame_callback: FrameCallback,
    listeners: Option<Listeners>,
}

impl BackdropHandle {
    /// Stop the loop and deregister listeners. Idempotent.
    pub fn teardown(&mut self) {
        let Some(listeners) = self.listeners.take() else {
            return;
        };

        if let Some(id) = self.frame_request.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        let _ = self.window.remove_event_listener_with_callback(
            "resize",
            listeners.resize.as_ref().unchecked_ref(),
        );
        let _ = self.document.remove_event_listener_with_callback(
            "mousemove",
            listeners.pointer.as_ref().unchecked_ref(),
        );

        self.backdrop.borrow_mut().stop();
        // The frame closure holds an Rc to its own slot; dropping it breaks the cycle
        self.frame_callback.borrow_mut().take();
        log::info!("Backdrop unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.listeners.is_some()
    }

    /// Frames counted in the last one-second window
    pub fn fps(&self) -> u32 {
        self.backdrop.borrow().fps()
    }
}

impl Drop for BackdropHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Mount onto the canvas with id `canvas_id`.
///
/// Fails without side effects if the canvas or its 2D context is missing.
pub fn start(canvas_id: &str, settings: &Settings) -> Result<BackdropHandle, BackdropError> {
    let window = web_sys::window().ok_or(BackdropError::NoWindow)?;
    let document = window.document().ok_or(BackdropError::NoDocument)?;
    let canvas: HtmlCanvasElement = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| BackdropError::CanvasNotFound(canvas_id.to_string()))?
        .dyn_into()
        .map_err(|_| BackdropError::NotACanvas)?;
    let ctx = context_2d(&canvas)?;

    let mut settings = settings.clone();
    if prefers_reduced_motion(&window) {
        log::info!("Host prefers reduced motion");
        settings.reduced_motion = true;
    }

    let probe = probe_graphics(&document);
    let cores = hardware_concurrency(&window);
    let tier = classify(&probe, cores);
    log::info!("Capability probe: {:?}, cores={:?} -> {}", probe, cores, tier.as_str());

    let viewport = Viewport::new(canvas_css_size(&canvas), window.device_pixel_ratio());
    apply_viewport(&canvas, &ctx, viewport);

    let seed = js_sys::Date::now() as u64;
    let backdrop = Rc::new(RefCell::new(Backdrop::new(&settings, tier, seed, viewport)));

    // Resize
    let resize = {
        let backdrop = backdrop.clone();
        let canvas = canvas.clone();
        let ctx = ctx.clone();
        let window = window.clone();
        Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let css = canvas_css_size(&canvas);
            let applied = backdrop.borrow_mut().resize(css, window.device_pixel_ratio());
            if let Some(viewport) = applied {
                apply_viewport(&canvas, &ctx, viewport);
            }
        })
    };
    window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;

    // Pointer
    let pointer = {
        let backdrop = backdrop.clone();
        let canvas = canvas.clone();
        Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let rect = canvas.get_bounding_client_rect();
            let pos = Vec2::new(
                (event.client_x() as f64 - rect.left()) as f32,
                (event.client_y() as f64 - rect.top()) as f32,
            );
            backdrop.borrow_mut().pointer_moved(pos, event.time_stamp());
        })
    };
    if let Err(e) =
        document.add_event_listener_with_callback("mousemove", pointer.as_ref().unchecked_ref())
    {
        let _ = window.remove_event_listener_with_callback("resize", resize.as_ref().unchecked_ref());
        return Err(e.into());
    }

    let mut handle = BackdropHandle {
        window: window.clone(),
        document,
        backdrop: backdrop.clone(),
        frame_request: Rc::new(Cell::new(None)),
        frame_callback: Rc::new(RefCell::new(None)),
        listeners: Some(Listeners { resize, pointer }),
    };

    // Frame loop
    {
        let slot = handle.frame_callback.clone();
        let request = handle.frame_request.clone();
        let window = window.clone();
        let mut surface = CanvasSurface::new(ctx, viewport.css_size);
        let callback = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
            request.set(None);
            {
                let mut b = backdrop.borrow_mut();
                surface.set_size(b.viewport().css_size);
                if !b.frame(&mut surface, time) {
                    return;
                }
            }
            if let Some(cb) = slot.borrow().as_ref() {
                match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    Ok(id) => request.set(Some(id)),
                    Err(e) => log::warn!("Frame loop ended: {:?}", e),
                }
            }
        });
        *handle.frame_callback.borrow_mut() = Some(callback);
    }

    let first = handle
        .frame_callback
        .borrow()
        .as_ref()
        .map(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()));
    match first {
        Some(Ok(id)) => handle.frame_request.set(Some(id)),
        Some(Err(e)) => {
            handle.teardown();
            return Err(e.into());
        }
        None => {}
    }

    log::info!("Backdrop mounted on #{}", canvas_id);
    Ok(handle)
}

/// JS-owned mount point. `unmount()` (or `free()`) tears the backdrop down.
#[wasm_bindgen]
pub struct NeuralBackdrop {
    handle: Option<BackdropHandle>,
}

#[wasm_bindgen]
impl NeuralBackdrop {
    /// Mount onto `canvas_id`. A missing canvas or context leaves an inert
    /// instance that renders nothing.
    #[wasm_bindgen(constructor)]
    pub fn mount(canvas_id: &str) -> NeuralBackdrop {
        let settings = Settings::load();
        let handle = match start(canvas_id, &settings) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Backdrop disabled: {}", e);
                None
            }
        };
        NeuralBackdrop { handle }
    }

    /// Stop rendering and release listeners. Safe to call repeatedly.
    pub fn unmount(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.teardown();
        }
    }

    /// Persist a tier override ("auto", "high" or "low") and the reduced
    /// motion flag for the next mount. Returns false for an unknown tier.
    pub fn configure(tier: &str, reduced_motion: bool) -> bool {
        match Settings::load().with_overrides(tier, reduced_motion) {
            Some(settings) => {
                settings.save();
                true
            }
            None => {
                log::warn!("Unknown tier '{}'", tier);
                false
            }
        }
    }

    #[wasm_bindgen(getter)]
    pub fn mounted(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| h.is_mounted())
    }

    #[wasm_bindgen(getter)]
    pub fn fps(&self) -> u32 {
        self.handle.as_ref().map(|h| h.fps()).unwrap_or(0)
    }
}
