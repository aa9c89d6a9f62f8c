// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel sizing on top of kurbo's float geometry.
//!
//! Layer bounds are [`kurbo::Rect`] values: float coordinates, half-open
//! `contains`, and zero or negative extents are legal (an empty layer is not
//! an error). Device surfaces, on the other hand, are allocated at integer
//! pixel sizes. [`PhysicalSize`] is that integer size, and its equality is
//! what gates swap-surface resize calls: a bounds change that rounds to the
//! same pixel size must not touch the device.

use core::fmt;

use kurbo::Size;

/// An integer pixel size for device surface allocation.
///
/// Conversion from float geometry rounds up and clamps to at least 1×1,
/// since device buffers cannot be empty even when the layer rectangle is.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhysicalSize {
    /// Width in pixels. Always at least 1.
    pub width: u32,
    /// Height in pixels. Always at least 1.
    pub height: u32,
}

impl PhysicalSize {
    /// Creates a physical size, clamping each dimension to at least 1.
    #[inline]
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width: if width == 0 { 1 } else { width },
            height: if height == 0 { 1 } else { height },
        }
    }

    /// Rounds a float size up to the covering pixel size.
    #[must_use]
    pub fn from_size(size: Size) -> Self {
        Self {
            width: ceil_px(size.width),
            height: ceil_px(size.height),
        }
    }
}

impl fmt::Debug for PhysicalSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalSize({}x{})", self.width, self.height)
    }
}

/// Rounds one dimension up to a whole pixel count, clamped to `1..=u32::MAX`.
#[expect(
    clippy::cast_possible_truncation,
    reason = "value is clamped to the u32 range before the final cast"
)]
fn ceil_px(v: f64) -> u32 {
    if !(v > 1.0) {
        // Catches NaN, zero, and negative extents as well.
        return 1;
    }
    let truncated = v as u64;
    let whole = if (truncated as f64) < v {
        truncated + 1
    } else {
        truncated
    };
    whole.min(u64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_sizes_do_not_round() {
        assert_eq!(
            PhysicalSize::from_size(Size::new(640.0, 480.0)),
            PhysicalSize::new(640, 480)
        );
    }

    #[test]
    fn fractional_sizes_round_up() {
        assert_eq!(
            PhysicalSize::from_size(Size::new(100.25, 9.999)),
            PhysicalSize::new(101, 10)
        );
    }

    #[test]
    fn degenerate_sizes_clamp_to_one_pixel() {
        assert_eq!(
            PhysicalSize::from_size(Size::new(0.0, -40.0)),
            PhysicalSize::new(1, 1)
        );
        assert_eq!(PhysicalSize::new(0, 0), PhysicalSize::new(1, 1));
    }

    #[test]
    fn equality_gates_on_pixels_not_floats() {
        // Two different float sizes that cover the same pixel grid.
        let a = PhysicalSize::from_size(Size::new(100.1, 50.2));
        let b = PhysicalSize::from_size(Size::new(100.9, 50.8));
        assert_eq!(a, b, "same covering pixel size");
    }
}
