//! Label renderer
//!
//! A small retained-mode engine for the telemetry screen. The display
//! adapter configures it through [`GraphicsEngine`]; [`LabelEngine::refresh`]
//! then draws every dirty label into the adapter's draw buffer in bands
//! of at most the configured buffer size and pushes each band out
//! through a [`FlushTarget`].

use core::convert::Infallible;

use defmt::*;
use embedded_graphics::mono_font::iso_8859_1::{FONT_10X20, FONT_9X15};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::{IntoStorage, Rgb565};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{ContainsPoint, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use heapless::Vec;

use packview_core::telemetry::{LabelSize, TelemetryBoard, TelemetryField, Tone};
use packview_display::{
    AdapterId, Controller, DisplayId, DisplayRef, FlushNotifier, FlushTarget, GraphicsEngine,
    RenderMode, Rotation,
};

use crate::mipi::{self, cmd};

/// Minimum time between two refresh passes
pub const REFRESH_INTERVAL_MS: u32 = 30;

const BACKGROUND: Rgb565 = Rgb565::BLACK;

fn tone_color(tone: Tone) -> Rgb565 {
    match tone {
        Tone::Plain => Rgb565::WHITE,
        Tone::Idle => Rgb565::GREEN,
        Tone::Active => Rgb565::BLUE,
    }
}

fn font(size: LabelSize) -> &'static MonoFont<'static> {
    match size {
        LabelSize::Large => &FONT_10X20,
        LabelSize::Mid => &FONT_9X15,
    }
}

/// Per-display state
#[derive(Clone, Copy)]
struct Panel {
    id: DisplayId,
    controller: Controller,
    invert: bool,
    rotation: Rotation,
    buffer_len: usize,
    user_data: Option<AdapterId>,
    awake: bool,
}

impl Panel {
    fn size(&self) -> (u16, u16) {
        let (hor, ver) = self.controller.resolution();
        match self.rotation {
            Rotation::Deg0 | Rotation::Deg180 => (hor, ver),
            Rotation::Deg90 | Rotation::Deg270 => (ver, hor),
        }
    }

    fn handle(&self) -> DisplayRef {
        DisplayRef {
            id: self.id,
            context: self.user_data,
        }
    }
}

/// Records the completion signal for one color transfer
#[derive(Default)]
struct FlushDone(bool);

impl FlushNotifier for FlushDone {
    fn flush_ready(&mut self, _display: DisplayId) {
        self.0 = true;
    }
}

/// Draw target over a horizontal band of the screen
struct Band<'a> {
    pixels: &'a mut [u8],
    area: Rectangle,
}

impl Dimensions for Band<'_> {
    fn bounding_box(&self) -> Rectangle {
        self.area
    }
}

impl DrawTarget for Band<'_> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let width = self.area.size.width as usize;
        for Pixel(point, color) in pixels {
            if !self.area.contains(point) {
                continue;
            }
            let row = (point.y - self.area.top_left.y) as usize;
            let index = (row * width + point.x as usize) * 2;
            if let Some(px) = self.pixels.get_mut(index..index + 2) {
                // Panel expects RGB565 high byte first
                px.copy_from_slice(&color.into_storage().to_be_bytes());
            }
        }
        Ok(())
    }
}

/// Single-display label engine
pub struct LabelEngine {
    delay: Option<fn(u32)>,
    tick: Option<fn() -> u32>,
    ticks: u32,
    initialized: bool,
    panel: Option<Panel>,
    last_refresh: Option<u32>,
}

impl Default for LabelEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelEngine {
    pub const fn new() -> Self {
        Self {
            delay: None,
            tick: None,
            ticks: 0,
            initialized: false,
            panel: None,
            last_refresh: None,
        }
    }

    fn now(&self) -> u32 {
        match self.tick {
            Some(tick) => tick(),
            None => self.ticks,
        }
    }

    fn sleep(&self, ms: u32) {
        if let Some(delay) = self.delay {
            delay(ms);
        }
    }

    /// Draw dirty labels; returns how many were flushed
    pub fn refresh<T: FlushTarget>(&mut self, board: &mut TelemetryBoard, target: &mut T) -> usize {
        let now = self.now();
        if let Some(last) = self.last_refresh {
            if now.wrapping_sub(last) < REFRESH_INTERVAL_MS {
                return 0;
            }
        }
        self.last_refresh = Some(now);

        let Some(panel) = self.panel else {
            return 0;
        };

        if !panel.awake {
            self.wake(&panel, target);
            let (width, height) = panel.size();
            self.draw_band(&panel, target, 0, height, |band| {
                let _ = band.clear(BACKGROUND);
            });
            debug!("engine: {}x{} panel awake", width, height);
            if let Some(p) = self.panel.as_mut() {
                p.awake = true;
            }
        }

        let dirty: Vec<TelemetryField, 9> = board.dirty_fields().collect();
        for &field in &dirty {
            let label = board.label(field);
            let style = MonoTextStyle::new(font(field.size()), tone_color(label.tone));
            let text_height = style.font.character_size.height as u16;

            let (width, height) = panel.size();
            let center = (i32::from(height) / 2 + i32::from(field.y_offset()))
                .clamp(0, i32::from(height)) as u16;
            let top = center
                .saturating_sub(text_height / 2)
                .min(height.saturating_sub(text_height));
            let anchor = Point::new(i32::from(width) / 2, i32::from(center));
            let text_style = TextStyleBuilder::new()
                .alignment(Alignment::Center)
                .baseline(Baseline::Middle)
                .build();

            self.draw_band(&panel, target, top, text_height, |band| {
                let _ = band.clear(BACKGROUND);
                let _ = Text::with_text_style(label.text.as_str(), anchor, style, text_style).draw(band);
            });
        }

        for &field in &dirty {
            board.mark_drawn(field);
        }
        dirty.len()
    }

    fn wake<T: FlushTarget>(&self, panel: &Panel, target: &mut T) {
        let display = panel.handle();
        for step in &mipi::WAKE_SEQUENCE {
            target.send_command(display, &[step.cmd], step.params);
            self.sleep(step.hold_ms);
        }
        let madctl = mipi::madctl(panel.controller, panel.rotation);
        target.send_command(display, &[cmd::MADCTL], &[madctl]);
        let invert = if panel.invert { cmd::INVON } else { cmd::INVOFF };
        target.send_command(display, &[invert], &[]);
        target.send_command(display, &[cmd::NORON], &[]);
        self.sleep(10);
        target.send_command(display, &[cmd::DISPON], &[]);
        self.sleep(120);
    }

    /// Render rows `top..top + rows` through the draw buffer in chunks
    fn draw_band<T, F>(&self, panel: &Panel, target: &mut T, top: u16, rows: u16, paint: F)
    where
        T: FlushTarget,
        F: Fn(&mut Band<'_>),
    {
        let (width, height) = panel.size();
        let row_bytes = usize::from(width) * 2;
        let rows_per_chunk = (panel.buffer_len / row_bytes).min(usize::from(u16::MAX)) as u16;
        if rows_per_chunk == 0 {
            warn!("engine: draw buffer smaller than one row");
            return;
        }

        let display = panel.handle();
        let end = top.saturating_add(rows).min(height);
        let mut y = top;
        while y < end {
            let chunk = rows_per_chunk.min(end - y);
            let len = row_bytes * usize::from(chunk);

            {
                let Some(buffer) = target.frame_buffer(display) else {
                    warn!("engine: no draw buffer for display {}", display.id.0);
                    return;
                };
                let Some(pixels) = buffer.get_mut(..len) else {
                    warn!("engine: draw buffer shorter than configured");
                    return;
                };
                let mut band = Band {
                    pixels,
                    area: Rectangle::new(
                        Point::new(0, i32::from(y)),
                        Size::new(u32::from(width), u32::from(chunk)),
                    ),
                };
                paint(&mut band);
            }

            target.send_command(display, &[cmd::CASET], &mipi::window(0, width - 1));
            target.send_command(display, &[cmd::RASET], &mipi::window(y, y + chunk - 1));
            let mut done = FlushDone::default();
            target.send_color(display, &[cmd::RAMWR], 0..len, &mut done);
            if !done.0 {
                warn!("engine: flush not acknowledged");
            }

            y += chunk;
        }
    }
}

impl GraphicsEngine for LabelEngine {
    fn init(&mut self) {
        self.initialized = true;
        self.ticks = 0;
        self.panel = None;
        self.last_refresh = None;
    }

    fn set_delay_callback(&mut self, delay: fn(u32)) {
        self.delay = Some(delay);
    }

    fn set_tick_callback(&mut self, tick: fn() -> u32) {
        self.tick = Some(tick);
    }

    fn tick_inc(&mut self, ms: u32) {
        self.ticks = self.ticks.wrapping_add(ms);
    }

    fn create_display(&mut self, controller: Controller) -> Option<DisplayId> {
        if !self.initialized || self.panel.is_some() {
            return None;
        }
        let id = DisplayId(0);
        self.panel = Some(Panel {
            id,
            controller,
            invert: false,
            rotation: Rotation::Deg0,
            buffer_len: 0,
            user_data: None,
            awake: false,
        });
        Some(id)
    }

    fn set_invert(&mut self, display: DisplayId, invert: bool) {
        if let Some(panel) = self.panel.as_mut().filter(|p| p.id == display) {
            panel.invert = invert;
        }
    }

    fn set_rotation(&mut self, display: DisplayId, rotation: Rotation) {
        if let Some(panel) = self.panel.as_mut().filter(|p| p.id == display) {
            panel.rotation = rotation;
        }
    }

    fn set_buffers(&mut self, display: DisplayId, len: usize, mode: RenderMode) {
        if let Some(panel) = self.panel.as_mut().filter(|p| p.id == display) {
            if mode != RenderMode::Partial {
                // Labels are always drawn band by band
                debug!("engine: render mode {} treated as partial", mode);
            }
            panel.buffer_len = len;
        }
    }

    fn set_user_data(&mut self, display: DisplayId, adapter: AdapterId) {
        if let Some(panel) = self.panel.as_mut().filter(|p| p.id == display) {
            panel.user_data = Some(adapter);
        }
    }

    fn user_data(&self, display: DisplayId) -> Option<AdapterId> {
        self.panel
            .as_ref()
            .filter(|p| p.id == display)
            .and_then(|p| p.user_data)
    }
}
