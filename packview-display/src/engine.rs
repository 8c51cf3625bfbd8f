//! Graphics engine boundary
//!
//! The adapter does not render. It configures a retained-mode engine
//! (timing hooks, display creation, buffer policy, per-display context)
//! and later services the engine's flush requests through
//! [`FlushTarget`](crate::dispatch::FlushTarget).

use crate::controller::Controller;
use crate::dispatch::AdapterId;

/// Engine-side display handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayId(pub u8);

/// A display handle as seen by a flush callback
///
/// `context` is whatever the adapter bound into the display's user-data
/// slot. Engine paths that do not carry per-display context pass `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayRef {
    pub id: DisplayId,
    pub context: Option<AdapterId>,
}

/// Display rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

/// How the engine uses the draw buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderMode {
    /// Buffer smaller than the screen; dirty areas are rendered in bands
    Partial,
    /// Screen-sized buffer, only dirty areas are redrawn
    Direct,
    /// Screen-sized buffer, whole screen redrawn every frame
    Full,
}

/// Completion channel back into the engine
pub trait FlushNotifier {
    /// The last pixel payload for `display` has left the buffer
    fn flush_ready(&mut self, display: DisplayId);
}

/// Retained-mode graphics engine as configured by the adapter
pub trait GraphicsEngine {
    /// Initialize engine state
    fn init(&mut self);

    /// Register a blocking millisecond sleep
    fn set_delay_callback(&mut self, delay: fn(u32));

    /// Register a monotonic millisecond clock
    fn set_tick_callback(&mut self, tick: fn() -> u32);

    /// Advance the engine clock by `ms`
    fn tick_inc(&mut self, ms: u32);

    /// Create a display driven by `controller`
    fn create_display(&mut self, controller: Controller) -> Option<DisplayId>;

    /// Enable or disable color inversion
    fn set_invert(&mut self, display: DisplayId, invert: bool);

    /// Set display rotation
    fn set_rotation(&mut self, display: DisplayId, rotation: Rotation);

    /// Tell the engine how many draw buffer bytes it may use
    fn set_buffers(&mut self, display: DisplayId, len: usize, mode: RenderMode);

    /// Bind an adapter into the display's user-data slot
    fn set_user_data(&mut self, display: DisplayId, adapter: AdapterId);

    /// Read back the display's user-data slot
    fn user_data(&self, display: DisplayId) -> Option<AdapterId>;

    /// Resolve a display into the handle passed to flush callbacks
    fn display_ref(&self, display: DisplayId) -> DisplayRef {
        DisplayRef {
            id: display,
            context: self.user_data(display),
        }
    }
}
