// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared test doubles for the layer module.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use kurbo::{Point, Rect};
use peniko::Color;

use crate::geometry::PhysicalSize;
use crate::surface::{Canvas, SurfaceProvider, SwapSurface};

use super::content::LayerContent;

pub(crate) struct NullCanvas;

impl Canvas for NullCanvas {
    fn clear(&mut self, _color: Color) {}
    fn fill_rect(&mut self, _rect: Rect, _color: Color) {}
    fn draw_line(&mut self, _from: Point, _to: Point, _color: Color, _width: f64) {}
}

#[derive(Debug, Default)]
struct HookCounters {
    draws: Cell<u32>,
    bounds_changes: Cell<u32>,
    activations: Cell<u32>,
    deactivations: Cell<u32>,
}

/// Shared counter handle observed from outside the tree while a
/// [`LoggingContent`] lives inside it.
#[derive(Clone, Debug, Default)]
pub(crate) struct HookLog(Rc<HookCounters>);

impl HookLog {
    pub(crate) fn draws(&self) -> u32 {
        self.0.draws.get()
    }

    pub(crate) fn bounds_changes(&self) -> u32 {
        self.0.bounds_changes.get()
    }

    pub(crate) fn activations(&self) -> u32 {
        self.0.activations.get()
    }

    pub(crate) fn deactivations(&self) -> u32 {
        self.0.deactivations.get()
    }
}

/// Content that counts every hook invocation.
pub(crate) struct LoggingContent {
    log: HookLog,
}

impl LoggingContent {
    pub(crate) fn new(log: &HookLog) -> Self {
        Self { log: log.clone() }
    }
}

impl LayerContent for LoggingContent {
    fn draw(&mut self, _canvas: &mut dyn Canvas, _bounds: Rect) {
        self.log.0.draws.set(self.log.0.draws.get() + 1);
    }

    fn did_change_bounds(&mut self, _bounds: Rect) {
        self.log
            .0
            .bounds_changes
            .set(self.log.0.bounds_changes.get() + 1);
    }

    fn did_activate(&mut self) {
        self.log.0.activations.set(self.log.0.activations.get() + 1);
    }

    fn did_deactivate(&mut self) {
        self.log
            .0
            .deactivations
            .set(self.log.0.deactivations.get() + 1);
    }
}

/// Provider double that counts device calls across every surface it
/// created.
///
/// Readiness polls pop from a shared script (front first); an exhausted
/// script answers ready.
#[derive(Default)]
pub(crate) struct CountingProvider {
    pub(crate) created: Vec<PhysicalSize>,
    polls: Rc<RefCell<Vec<bool>>>,
    resizes: Rc<Cell<u32>>,
    presents: Rc<Cell<u32>>,
}

impl CountingProvider {
    pub(crate) fn script_polls(&mut self, polls: &[bool]) {
        self.polls.borrow_mut().extend_from_slice(polls);
    }

    pub(crate) fn resizes(&self) -> u32 {
        self.resizes.get()
    }

    pub(crate) fn presents(&self) -> u32 {
        self.presents.get()
    }
}

impl SurfaceProvider for CountingProvider {
    fn create_surface(&mut self, size: PhysicalSize) -> Box<dyn SwapSurface> {
        self.created.push(size);
        Box::new(CountingSurface {
            polls: self.polls.clone(),
            resizes: self.resizes.clone(),
            presents: self.presents.clone(),
            canvas: NullCanvas,
        })
    }
}

struct CountingSurface {
    polls: Rc<RefCell<Vec<bool>>>,
    resizes: Rc<Cell<u32>>,
    presents: Rc<Cell<u32>>,
    canvas: NullCanvas,
}

impl SwapSurface for CountingSurface {
    fn resize(&mut self, _size: PhysicalSize) {
        self.resizes.set(self.resizes.get() + 1);
    }

    fn poll_ready(&mut self) -> bool {
        let mut polls = self.polls.borrow_mut();
        if polls.is_empty() {
            true
        } else {
            polls.remove(0)
        }
    }

    fn begin_draw(&mut self) -> &mut dyn Canvas {
        &mut self.canvas
    }

    fn end_draw(&mut self) {}

    fn present(&mut self) {
        self.presents.set(self.presents.get() + 1);
    }
}
