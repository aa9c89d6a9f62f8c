// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded numeric history with running extrema and graph painting.
//!
//! [`SampleBuffer`] keeps the most recent N scalar samples in insertion
//! order. Minimum and maximum are maintained incrementally; only when an
//! eviction removes a value equal to the current extremum does the buffer
//! rescan the window. Typical use is per-frame metrics (frame deltas,
//! animation values) displayed by [`SampleBuffer::paint`] as a polyline with
//! a thicker mean line.

use alloc::vec::Vec;

use kurbo::{Point, Rect};
use peniko::Color;

use crate::surface::Canvas;

/// Ring buffer over `f64` samples with O(1) extrema and mean queries.
#[derive(Clone, Debug)]
pub struct SampleBuffer {
    data: Vec<f64>,
    capacity: usize,
    /// Slot the next sample is written to once the buffer is full.
    cursor: usize,
    min: f64,
    max: f64,
    sum: f64,
}

impl SampleBuffer {
    /// Default window size.
    pub const DEFAULT_CAPACITY: usize = 100;

    /// Creates an empty buffer with [`DEFAULT_CAPACITY`](Self::DEFAULT_CAPACITY).
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates an empty buffer holding at most `capacity` samples.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "sample buffer capacity must not be zero");
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
            cursor: 0,
            min: 0.0,
            max: 0.0,
            sum: 0.0,
        }
    }

    /// Appends a sample, evicting the oldest once the window is full.
    pub fn add(&mut self, value: f64) {
        if self.data.is_empty() {
            self.data.push(value);
            self.min = value;
            self.max = value;
            self.sum = value;
            return;
        }

        if self.data.len() < self.capacity {
            self.data.push(value);
            self.sum += value;
            self.min = self.min.min(value);
            self.max = self.max.max(value);
            return;
        }

        let evicted = self.data[self.cursor];
        self.data[self.cursor] = value;
        self.cursor = (self.cursor + 1) % self.capacity;
        self.sum += value - evicted;

        // An evicted extremum invalidates the running value; rescan once.
        if evicted == self.min || evicted == self.max {
            self.rescan();
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
    }

    /// Returns the number of retained samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns whether no samples have been added yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the most recent sample, or `None` when empty.
    #[must_use]
    pub fn last(&self) -> Option<f64> {
        if self.data.is_empty() {
            return None;
        }
        let idx = if self.data.len() < self.capacity {
            self.data.len() - 1
        } else {
            (self.cursor + self.capacity - 1) % self.capacity
        };
        Some(self.data[idx])
    }

    /// Returns the smallest retained sample (0.0 when empty).
    #[must_use]
    pub fn minimum(&self) -> f64 {
        self.min
    }

    /// Returns the largest retained sample (0.0 when empty).
    #[must_use]
    pub fn maximum(&self) -> f64 {
        self.max
    }

    /// Returns the arithmetic mean of the retained samples (0.0 when empty).
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            0.0
        } else {
            self.sum / self.data.len() as f64
        }
    }

    /// Returns retained samples oldest→newest.
    #[must_use]
    pub fn window(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.data.len());
        if self.data.len() < self.capacity {
            out.extend_from_slice(&self.data);
        } else {
            for i in 0..self.capacity {
                out.push(self.data[(self.cursor + i) % self.capacity]);
            }
        }
        out
    }

    /// Paints the sample window into `bounds` on the given canvas.
    ///
    /// Samples map left-to-right onto the padded vertical span
    /// `[minimum * 0.9, maximum * 1.1]` as a connected polyline; a thicker
    /// horizontal line marks the mean. A collapsed span substitutes a unit
    /// span so a flat window still paints a midline instead of dividing by
    /// zero.
    pub fn paint(&self, canvas: &mut dyn Canvas, color: Color, bounds: Rect) {
        let window = self.window();
        if window.len() < 2 {
            return;
        }

        let lo = self.min * 0.9;
        let hi = self.max * 1.1;
        let span = if hi - lo == 0.0 { 1.0 } else { hi - lo };

        let step = bounds.width() / (window.len() - 1) as f64;
        let y_of = |v: f64| bounds.y1 - (v - lo) / span * bounds.height();

        let mut prev = Point::new(bounds.x0, y_of(window[0]));
        for (i, &v) in window.iter().enumerate().skip(1) {
            let next = Point::new(bounds.x0 + step * i as f64, y_of(v));
            canvas.draw_line(prev, next, color, 1.0);
            prev = next;
        }

        let mean_y = y_of(self.mean());
        canvas.draw_line(
            Point::new(bounds.x0, mean_y),
            Point::new(bounds.x1, mean_y),
            color,
            3.0,
        );
    }

    /// Recomputes extrema from the full window.
    fn rescan(&mut self) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in &self.data {
            min = min.min(v);
            max = max.max(v);
        }
        self.min = min;
        self.max = max;
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}
