use flamegrid_core::{GridLayout, Rgb, Viewport};
use flamegrid_engine::FireEngine;
use flamegrid_render::{PixelRect, Surface};
use flamegrid_runtime::{
    DeterministicClock, FrameScheduler, MonotonicClock, SchedulerConfig, TickOutcome,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::{TEXT_BASELINE, font_spec, glyph_text};

/// [`Surface`] over a canvas 2D context.
///
/// Resizing the canvas resets all context state, so font and baseline are
/// re-applied after every resize.
pub struct Canvas2dSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    font_px: u32,
}

impl Canvas2dSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let surface = Self {
            canvas,
            ctx,
            font_px: 14,
        };
        surface.apply_text_state();
        Ok(surface)
    }

    fn apply_text_state(&self) {
        self.ctx.set_font(&font_spec(self.font_px));
        self.ctx.set_text_baseline(TEXT_BASELINE);
    }
}

impl Surface for Canvas2dSurface {
    fn size_px(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn resize_px(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.apply_text_state();
    }

    fn set_fill(&mut self, color: Rgb) {
        self.ctx.set_fill_style_str(&color.to_css_hex());
    }

    fn fill_rect(&mut self, rect: PixelRect) {
        self.ctx.fill_rect(
            f64::from(rect.x),
            f64::from(rect.y),
            f64::from(rect.w),
            f64::from(rect.h),
        );
    }

    fn fill_glyph(&mut self, codepoint: u32, x: u32, y: u32) {
        let mut buf = [0; 4];
        if let Some(text) = glyph_text(codepoint, &mut buf) {
            // fillText only throws for non-finite coordinates.
            let _ = self.ctx.fill_text(text, f64::from(x), f64::from(y));
        }
    }

    fn apply_layout(&mut self, layout: &GridLayout) {
        self.font_px = layout.font_px;
        let (width, height) = layout.surface_size_px();
        self.resize_px(width, height);
    }
}

/// JS-facing fire canvas.
#[wasm_bindgen]
pub struct FlamegridWeb {
    scheduler: Option<FrameScheduler<FireEngine, Canvas2dSurface>>,
    clock: DeterministicClock,
}

#[wasm_bindgen]
impl FlamegridWeb {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> Result<FlamegridWeb, JsValue> {
        let surface = Canvas2dSurface::new(canvas)?;
        Ok(Self {
            scheduler: Some(FrameScheduler::new(
                FireEngine::new(),
                surface,
                SchedulerConfig::default(),
            )),
            clock: DeterministicClock::new(),
        })
    }

    /// Size the grid for the viewport and start the engine.
    pub fn start(&mut self, css_width: f64, css_height: f64, dpr: f64) {
        if let Some(s) = self.scheduler.as_mut() {
            let layout = s.start(Viewport::new(css_width, css_height, dpr));
            tracing::info!(cols = layout.cols, rows = layout.rows, "flamegrid started");
        }
    }

    /// Run one frame at host time `now_ms` (`requestAnimationFrame`'s
    /// timestamp). Returns `true` if a frame was drawn.
    pub fn tick(&mut self, now_ms: f64) -> Result<bool, JsValue> {
        self.clock.set_millis(now_ms);
        let Some(s) = self.scheduler.as_mut() else {
            return Ok(false);
        };
        match s.tick(self.clock.now_mono()) {
            Ok(TickOutcome::Rendered(_)) => Ok(true),
            Ok(TickOutcome::Idle) => Ok(false),
            Err(e) => Err(JsValue::from_str(&e.to_string())),
        }
    }

    /// Forward a window resize. Applied once resizes stop for 150 ms.
    pub fn resize(&mut self, css_width: f64, css_height: f64, dpr: f64, now_ms: f64) {
        self.clock.set_millis(now_ms);
        if let Some(s) = self.scheduler.as_mut() {
            s.request_resize(
                Viewport::new(css_width, css_height, dpr),
                self.clock.now_mono(),
            );
        }
    }

    /// Flip pause; returns the new state.
    #[wasm_bindgen(js_name = togglePause)]
    pub fn toggle_pause(&mut self) -> bool {
        self.scheduler.as_mut().is_some_and(|s| s.toggle_pause())
    }

    #[wasm_bindgen(js_name = isPaused)]
    pub fn is_paused(&self) -> bool {
        self.scheduler.as_ref().is_some_and(|s| s.is_paused())
    }

    pub fn cols(&self) -> u16 {
        self.layout().map_or(0, |l| l.cols)
    }

    pub fn rows(&self) -> u16 {
        self.layout().map_or(0, |l| l.rows)
    }

    /// Explicit teardown for JS callers. Drops the engine and releases the
    /// canvas.
    pub fn destroy(&mut self) {
        self.scheduler = None;
    }
}

impl FlamegridWeb {
    fn layout(&self) -> Option<GridLayout> {
        self.scheduler.as_ref().and_then(|s| s.layout())
    }
}
