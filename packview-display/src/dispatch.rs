//! Command/color dispatch
//!
//! The engine flushes through [`FlushTarget`]. Each call names the
//! originating display; the router resolves it to an adapter in two steps:
//!
//! 1. the adapter bound into the display's user-data slot, if any
//! 2. otherwise the registered active adapter
//!
//! The fallback slot holds one id and is written only when an adapter is
//! constructed, so it routes correctly only while a single display is
//! live. Supporting several displays means dropping the fallback rather
//! than extending it.

use core::num::NonZeroU32;
use core::ops::Range;

use portable_atomic::{AtomicU32, Ordering};

use crate::engine::{DisplayId, DisplayRef, FlushNotifier};

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

/// Process-unique adapter identity
///
/// Stored in the engine's per-display context instead of a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdapterId(NonZeroU32);

impl AdapterId {
    pub(crate) fn next() -> Self {
        let raw = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self(NonZeroU32::MIN.saturating_add(raw))
    }

    /// Rebuild an id from its raw value
    pub fn from_raw(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// Raw value, never zero
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Fallback route for callbacks without display context
pub struct ActiveAdapter {
    slot: AtomicU32,
}

impl ActiveAdapter {
    /// Create an empty slot
    pub const fn new() -> Self {
        Self {
            slot: AtomicU32::new(0),
        }
    }

    /// Record the most recently constructed adapter
    pub(crate) fn register(&self, id: AdapterId) {
        self.slot.store(id.get(), Ordering::Release);
    }

    /// Currently registered adapter
    pub fn get(&self) -> Option<AdapterId> {
        AdapterId::from_raw(self.slot.load(Ordering::Acquire))
    }
}

impl Default for ActiveAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide fallback slot used by the firmware
pub static ACTIVE_ADAPTER: ActiveAdapter = ActiveAdapter::new();

/// What an adapter can do for the engine
pub trait LcdTransport {
    /// Identity bound into the engine's display context
    fn id(&self) -> AdapterId;

    /// Draw buffer the engine renders into
    fn frame_buffer(&mut self) -> &mut [u8];

    /// Send a controller command with optional parameters
    fn send_command(&mut self, cmd: &[u8], param: &[u8]);

    /// Send a command followed by `pixels` of the draw buffer
    ///
    /// `done.flush_ready` is called exactly once, after the transfer,
    /// whether or not the transfer succeeded.
    fn send_color(
        &mut self,
        display: DisplayId,
        cmd: &[u8],
        pixels: Range<usize>,
        done: &mut dyn FlushNotifier,
    );
}

/// Engine-facing flush callbacks
pub trait FlushTarget {
    /// Draw buffer for `display`, if it resolves to an adapter
    fn frame_buffer(&mut self, display: DisplayRef) -> Option<&mut [u8]>;

    /// Command callback
    fn send_command(&mut self, display: DisplayRef, cmd: &[u8], param: &[u8]);

    /// Color callback; always signals completion exactly once
    fn send_color(
        &mut self,
        display: DisplayRef,
        cmd: &[u8],
        pixels: Range<usize>,
        done: &mut dyn FlushNotifier,
    );
}

/// Routes engine callbacks to the adapter that owns a display
pub struct Router<'a, T> {
    adapters: &'a mut [T],
    active: &'a ActiveAdapter,
}

impl<'a, T: LcdTransport> Router<'a, T> {
    pub fn new(adapters: &'a mut [T], active: &'a ActiveAdapter) -> Self {
        Self { adapters, active }
    }

    /// Context first, active adapter second
    pub fn resolve(&mut self, display: DisplayRef) -> Option<&mut T> {
        let id = match display.context {
            Some(id) => id,
            None => self.active.get()?,
        };
        self.adapters.iter_mut().find(|adapter| adapter.id() == id)
    }
}

impl<T: LcdTransport> FlushTarget for Router<'_, T> {
    fn frame_buffer(&mut self, display: DisplayRef) -> Option<&mut [u8]> {
        self.resolve(display).map(|adapter| adapter.frame_buffer())
    }

    fn send_command(&mut self, display: DisplayRef, cmd: &[u8], param: &[u8]) {
        match self.resolve(display) {
            Some(adapter) => adapter.send_command(cmd, param),
            None => warn!("dispatch: no adapter for display {}, command dropped", display.id.0),
        }
    }

    fn send_color(
        &mut self,
        display: DisplayRef,
        cmd: &[u8],
        pixels: Range<usize>,
        done: &mut dyn FlushNotifier,
    ) {
        match self.resolve(display) {
            Some(adapter) => adapter.send_color(display.id, cmd, pixels, done),
            None => {
                warn!("dispatch: no adapter for display {}, pixels dropped", display.id.0);
                done.flush_ready(display.id);
            }
        }
    }
}
