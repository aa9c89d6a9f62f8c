// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The content capability seam and deferred tick changes.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::animation::Animation;
use crate::surface::Canvas;

use super::id::LayerId;

/// Behavior attached to a presentable layer.
///
/// A layer with content draws into its surface every presented tick and can
/// react to animation and lifecycle events. Only [`draw`](Self::draw) is
/// required; every hook defaults to doing nothing.
///
/// The animation hooks may not mutate the tree directly (the tick pass holds
/// it). Instead they return an optional rectangle: a deferred bounds request
/// that the frame loop collects into [`TickChanges`] and applies through the
/// regular bounds-change path once the tick is over.
pub trait LayerContent {
    /// Draws one frame into `canvas`.
    ///
    /// `bounds` is the layer's content rectangle in local coordinates
    /// (layer size shrunk by the content inset).
    fn draw(&mut self, canvas: &mut dyn Canvas, bounds: Rect);

    /// Called on every played animation tick inside the active phase.
    ///
    /// `animation` is still running, so variables are resolvable here.
    fn on_animation_fired(&mut self, animation: &Animation, bounds: Rect) -> Option<Rect> {
        _ = (animation, bounds);
        None
    }

    /// Called once when the layer's animation completes.
    fn on_animation_finished(&mut self, bounds: Rect) -> Option<Rect> {
        _ = bounds;
        None
    }

    /// Called after the layer's bounds changed in any way.
    fn did_change_bounds(&mut self, bounds: Rect) {
        _ = bounds;
    }

    /// Called when the layer transitions from inactive to active.
    fn did_activate(&mut self) {}

    /// Called when the layer transitions from active to inactive.
    fn did_deactivate(&mut self) {}
}

impl core::fmt::Debug for dyn LayerContent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayerContent").finish_non_exhaustive()
    }
}

/// Deferred mutations collected by one
/// [`animate_into`](super::LayerTree::animate_into) pass.
///
/// Applied after the pass by
/// [`apply_tick_changes`](super::LayerTree::apply_tick_changes), which
/// re-enters the bounds-change path for each request.
#[derive(Debug, Default)]
pub struct TickChanges {
    /// Bounds requested by content hooks during the tick.
    pub bounds_requests: Vec<(LayerId, Rect)>,
}

impl TickChanges {
    /// Clears all pending requests.
    pub fn clear(&mut self) {
        self.bounds_requests.clear();
    }

    /// Returns whether the tick produced no deferred work.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bounds_requests.is_empty()
    }
}
