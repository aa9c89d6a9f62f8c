// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the animation tick.
//!
//! [`TraceSink`] is a trait with per-event methods that the tick pass calls
//! at each stage. All method bodies default to no-ops, so implementing only
//! the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing. When
//! **on**, each method performs a single `Option` branch before dispatching.

use crate::time::HostTime;

/// Why a layer's subtree was skipped for a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The layer's surface reported it cannot accept another frame.
    SurfaceBackPressure,
}

/// Emitted when a scheduler tick begins.
#[derive(Clone, Copy, Debug)]
pub struct TickBeginEvent {
    /// Host time the tick was driven with.
    pub now: HostTime,
}

/// Emitted when a presentable layer's subtree is skipped for a tick.
#[derive(Clone, Copy, Debug)]
pub struct FrameSkipEvent {
    /// Raw slot index of the skipped layer.
    pub layer_index: u32,
    /// Why the subtree was skipped.
    pub reason: SkipReason,
}

/// Emitted after a layer presents a frame.
#[derive(Clone, Copy, Debug)]
pub struct PresentEvent {
    /// Raw slot index of the presenting layer.
    pub layer_index: u32,
    /// Host time the tick was driven with.
    pub now: HostTime,
}

/// Emitted when a layer's animation completes.
#[derive(Clone, Copy, Debug)]
pub struct AnimationFinishedEvent {
    /// Raw slot index of the animated layer.
    pub layer_index: u32,
    /// Host time the tick was driven with.
    pub now: HostTime,
}

/// Receives trace events from the animation tick.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// Called when a scheduler tick begins.
    fn on_tick_begin(&mut self, e: &TickBeginEvent) {
        _ = e;
    }

    /// Called when a layer subtree is skipped.
    fn on_frame_skip(&mut self, e: &FrameSkipEvent) {
        _ = e;
    }

    /// Called after a layer presents.
    fn on_present(&mut self, e: &PresentEvent) {
        _ = e;
    }

    /// Called when a layer's animation completes.
    fn on_animation_finished(&mut self, e: &AnimationFinishedEvent) {
        _ = e;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`TickBeginEvent`].
    #[inline]
    pub fn tick_begin(&mut self, e: &TickBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_tick_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSkipEvent`].
    #[inline]
    pub fn frame_skip(&mut self, e: &FrameSkipEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_skip(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PresentEvent`].
    #[inline]
    pub fn present(&mut self, e: &PresentEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_present(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`AnimationFinishedEvent`].
    #[inline]
    pub fn animation_finished(&mut self, e: &AnimationFinishedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_animation_finished(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}
