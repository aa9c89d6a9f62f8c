// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation surfaces and the device seams behind them.
//!
//! The core never talks to a device directly. Three traits mark the seam:
//!
//! - [`Canvas`] — the minimal drawing surface handed to layer content.
//! - [`SwapSurface`] — a double-buffered surface with a frame-latency
//!   waitable: non-blocking readiness polls, do-not-wait presents, and
//!   in-place buffer resizes.
//! - [`SurfaceProvider`] — the device factory that allocates swap surfaces.
//!
//! All three are infallible by contract. A device that can no longer
//! allocate, resize, or present has nothing useful to report to the layer
//! tree; implementations must treat such failures as fatal (panic/abort).
//! Transient back-pressure is not a failure: it is the `false` return of
//! [`SwapSurface::poll_ready`].
//!
//! [`PresentationSurface`] wraps one boxed [`SwapSurface`] and caches its
//! readiness so that a frame pump can ask "may I draw?" many times per frame
//! without re-polling a waitable that already signaled.

use alloc::boxed::Box;

use kurbo::{Point, Rect};
use peniko::Color;

use crate::geometry::PhysicalSize;

/// A drawing surface for layer content.
///
/// The coordinate space is the layer's local content space; implementations
/// decide how commands reach pixels.
pub trait Canvas {
    /// Fills the whole surface with a solid color.
    fn clear(&mut self, color: Color);

    /// Fills a rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Strokes a line segment with the given width.
    fn draw_line(&mut self, from: Point, to: Point, color: Color, width: f64);
}

/// A device swap surface with waitable-based readiness.
///
/// One instance corresponds to one device swap chain created with a
/// frame-latency waitable. Calls arrive in a strict pattern per frame:
/// `poll_ready` (any number of times), then `begin_draw` .. `end_draw`,
/// then `present`.
pub trait SwapSurface {
    /// Resizes the buffers in place. The surface identity is preserved;
    /// this is never allowed to reallocate the swap chain itself.
    fn resize(&mut self, size: PhysicalSize);

    /// Polls the frame-latency waitable with a zero timeout.
    ///
    /// Returns `true` when the device can accept another frame. Must never
    /// block.
    fn poll_ready(&mut self) -> bool;

    /// Begins recording a frame and returns the drawing surface for it.
    fn begin_draw(&mut self) -> &mut dyn Canvas;

    /// Finishes recording the frame started by
    /// [`begin_draw`](Self::begin_draw).
    fn end_draw(&mut self);

    /// Submits the recorded frame without waiting for vertical blank.
    fn present(&mut self);
}

/// Allocates [`SwapSurface`]s for presentable layers.
///
/// Construction acquires the frame-latency waitable, so a freshly created
/// surface can be polled immediately.
pub trait SurfaceProvider {
    /// Creates a swap surface with buffers of the given pixel size.
    fn create_surface(&mut self, size: PhysicalSize) -> Box<dyn SwapSurface>;
}

/// Cached readiness of a [`PresentationSurface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Readiness {
    /// No poll has happened since the last present.
    #[default]
    Unpolled,
    /// The waitable signaled; sticky until the next present consumes it.
    Ready,
    /// The last poll came back negative. Re-polled on the next query.
    NotReady,
}

/// One presentable layer's surface plus its readiness cache.
///
/// The cache is asymmetric on purpose: a `Ready` outcome answers every
/// readiness query until a present consumes the frame slot, while a
/// `NotReady` outcome is only valid for the instant it was observed and is
/// re-polled on the next query.
#[derive(Debug)]
pub struct PresentationSurface {
    inner: Box<dyn SwapSurface>,
    readiness: Readiness,
    size: PhysicalSize,
}

impl core::fmt::Debug for dyn SwapSurface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SwapSurface").finish_non_exhaustive()
    }
}

impl PresentationSurface {
    /// Wraps a freshly created swap surface of the given size.
    #[must_use]
    pub fn new(inner: Box<dyn SwapSurface>, size: PhysicalSize) -> Self {
        Self {
            inner,
            readiness: Readiness::Unpolled,
            size,
        }
    }

    /// Returns whether the device can accept a frame right now.
    ///
    /// Never blocks. A cached `Ready` short-circuits; otherwise this polls
    /// the waitable once and caches the outcome.
    pub fn is_ready(&mut self) -> bool {
        if self.readiness == Readiness::Ready {
            return true;
        }
        self.readiness = if self.inner.poll_ready() {
            Readiness::Ready
        } else {
            Readiness::NotReady
        };
        self.readiness == Readiness::Ready
    }

    /// Submits the current frame and invalidates the readiness cache.
    pub fn present(&mut self) {
        self.inner.present();
        self.readiness = Readiness::Unpolled;
    }

    /// Resizes the surface buffers in place for a new pixel size.
    ///
    /// A call with the current size is a no-op and performs no device call.
    pub fn did_change_bounds(&mut self, size: PhysicalSize) {
        if size == self.size {
            return;
        }
        self.inner.resize(size);
        self.size = size;
    }

    /// Begins recording a frame on the inner surface.
    pub fn begin_draw(&mut self) -> &mut dyn Canvas {
        self.inner.begin_draw()
    }

    /// Finishes recording the current frame.
    pub fn end_draw(&mut self) {
        self.inner.end_draw();
    }

    /// Returns the current buffer size.
    #[must_use]
    pub fn size(&self) -> PhysicalSize {
        self.size
    }

    /// Returns the current readiness cache state.
    #[must_use]
    pub fn readiness(&self) -> Readiness {
        self.readiness
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    /// Test surface with a queue of scripted poll outcomes.
    struct FakeSurface {
        polls: Vec<bool>,
        poll_count: u32,
        present_count: u32,
        resize_sizes: Vec<PhysicalSize>,
        canvas: NullCanvas,
    }

    struct NullCanvas;

    impl Canvas for NullCanvas {
        fn clear(&mut self, _color: Color) {}
        fn fill_rect(&mut self, _rect: Rect, _color: Color) {}
        fn draw_line(&mut self, _from: Point, _to: Point, _color: Color, _width: f64) {}
    }

    impl FakeSurface {
        fn with_polls(polls: &[bool]) -> Self {
            let mut reversed: Vec<bool> = polls.to_vec();
            reversed.reverse();
            Self {
                polls: reversed,
                poll_count: 0,
                present_count: 0,
                resize_sizes: Vec::new(),
                canvas: NullCanvas,
            }
        }
    }

    impl SwapSurface for FakeSurface {
        fn resize(&mut self, size: PhysicalSize) {
            self.resize_sizes.push(size);
        }

        fn poll_ready(&mut self) -> bool {
            self.poll_count += 1;
            self.polls.pop().unwrap_or(true)
        }

        fn begin_draw(&mut self) -> &mut dyn Canvas {
            &mut self.canvas
        }

        fn end_draw(&mut self) {}

        fn present(&mut self) {
            self.present_count += 1;
        }
    }

    fn surface_with_polls(polls: &[bool]) -> PresentationSurface {
        PresentationSurface::new(
            Box::new(FakeSurface::with_polls(polls)),
            PhysicalSize::new(10, 10),
        )
    }

    #[test]
    fn ready_is_sticky_until_present() {
        let mut surface = surface_with_polls(&[true, false, false]);

        assert!(surface.is_ready());
        // Cached: these must not consume the scripted `false` outcomes.
        assert!(surface.is_ready());
        assert!(surface.is_ready());
        assert_eq!(surface.readiness(), Readiness::Ready);

        surface.present();
        assert_eq!(surface.readiness(), Readiness::Unpolled);
        assert!(!surface.is_ready(), "present must force a fresh poll");
    }

    #[test]
    fn not_ready_repolls_every_query() {
        let mut surface = surface_with_polls(&[false, false, true]);

        assert!(!surface.is_ready());
        assert_eq!(surface.readiness(), Readiness::NotReady);
        assert!(!surface.is_ready());
        assert!(surface.is_ready(), "third poll was scripted ready");
    }

    #[test]
    fn same_size_resize_is_a_no_op() {
        let inner = Box::new(FakeSurface::with_polls(&[]));
        let mut surface = PresentationSurface::new(inner, PhysicalSize::new(10, 10));

        surface.did_change_bounds(PhysicalSize::new(10, 10));
        assert_eq!(surface.size(), PhysicalSize::new(10, 10));

        surface.did_change_bounds(PhysicalSize::new(20, 15));
        assert_eq!(surface.size(), PhysicalSize::new(20, 15));
    }
}
