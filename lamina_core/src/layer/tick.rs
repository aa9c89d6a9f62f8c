// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame animation tick.
//!
//! [`LayerTree::animate_into`] walks every root subtree once for a given
//! host time. Per layer, in order:
//!
//! 1. Readiness gate: a layer with a surface that cannot accept a frame
//!    skips its whole subtree, animation included. The dropped tick is
//!    harmless because animation progress depends only on the pushed time.
//! 2. Animation advance: the layer's animation (if any) plays to `now`,
//!    dispatching content hooks whose bounds requests land in
//!    [`TickChanges`].
//! 3. Children, bottom-most first.
//! 4. Draw and present, when the layer has both content and a surface.
//!
//! Content hooks never mutate the tree mid-walk. Deferred requests are
//! applied afterwards by [`LayerTree::apply_tick_changes`].

use kurbo::Rect;

use crate::animation::{Animation, AnimationClient};
use crate::surface::SurfaceProvider;
use crate::time::HostTime;
use crate::trace::{AnimationFinishedEvent, FrameSkipEvent, PresentEvent, SkipReason, Tracer};

use super::content::{LayerContent, TickChanges};
use super::id::{INVALID, LayerId};
use super::tree::LayerTree;

/// Adapts one layer's content to the animation callback interface for the
/// duration of a single `play` call.
struct ContentClient<'a, 'b> {
    content: Option<&'a mut (dyn LayerContent + 'static)>,
    bounds: Rect,
    layer: LayerId,
    now: HostTime,
    changes: &'a mut TickChanges,
    tracer: &'a mut Tracer<'b>,
}

impl AnimationClient for ContentClient<'_, '_> {
    fn did_fire(&mut self, animation: &Animation) {
        if let Some(content) = self.content.as_deref_mut() {
            if let Some(rect) = content.on_animation_fired(animation, self.bounds) {
                self.changes.bounds_requests.push((self.layer, rect));
            }
        }
    }

    fn did_finish(&mut self, _animation: &Animation) {
        self.tracer.animation_finished(&AnimationFinishedEvent {
            layer_index: self.layer.idx,
            now: self.now,
        });
        if let Some(content) = self.content.as_deref_mut() {
            if let Some(rect) = content.on_animation_finished(self.bounds) {
                self.changes.bounds_requests.push((self.layer, rect));
            }
        }
    }
}

impl LayerTree {
    /// Runs one animation tick over every root subtree.
    ///
    /// Returns `true` when at least one layer presented a frame. Deferred
    /// bounds requests accumulate in `changes`; pass them to
    /// [`apply_tick_changes`](Self::apply_tick_changes) after the tick.
    pub fn animate_into(&mut self, now: HostTime, changes: &mut TickChanges) -> bool {
        self.animate_traced(now, changes, &mut Tracer::none())
    }

    /// [`animate_into`](Self::animate_into) with trace event dispatch.
    pub fn animate_traced(
        &mut self,
        now: HostTime,
        changes: &mut TickChanges,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        let mut any = false;
        for root in self.roots() {
            any |= self.animate_layer(root.idx, now, changes, tracer);
        }
        any
    }

    fn animate_layer(
        &mut self,
        idx: u32,
        now: HostTime,
        changes: &mut TickChanges,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        let i = idx as usize;

        if let Some(surface) = self.surface[i].as_mut() {
            if !surface.is_ready() {
                tracer.frame_skip(&FrameSkipEvent {
                    layer_index: idx,
                    reason: SkipReason::SurfaceBackPressure,
                });
                return false;
            }
        }

        if let Some(animation) = self.animation[i].as_mut() {
            let mut client = ContentClient {
                content: self.content[i].as_deref_mut(),
                bounds: self.content_bounds[i],
                layer: LayerId {
                    idx,
                    generation: self.generation[i],
                },
                now,
                changes,
                tracer,
            };
            animation.play(now, &mut client);
        }

        let mut any_child = false;
        let mut child = self.first_child[i];
        while child != INVALID {
            let next = self.next_sibling[child as usize];
            any_child |= self.animate_layer(child, now, changes, tracer);
            child = next;
        }

        if let (Some(content), Some(surface)) =
            (self.content[i].as_deref_mut(), self.surface[i].as_mut())
        {
            let bounds = self.content_bounds[i];
            let canvas = surface.begin_draw();
            content.draw(canvas, bounds);
            surface.end_draw();
            surface.present();
            tracer.present(&PresentEvent {
                layer_index: idx,
                now,
            });
            return true;
        }
        any_child
    }

    /// Applies the bounds requests deferred by an animation tick.
    ///
    /// Each request goes through the regular
    /// [`set_bounds`](Self::set_bounds) path, so surface resizes and dirty
    /// marks behave exactly as for a direct call.
    ///
    /// # Panics
    ///
    /// Panics if a requesting layer was destroyed between the tick and this
    /// call.
    pub fn apply_tick_changes(
        &mut self,
        provider: &mut dyn SurfaceProvider,
        changes: &mut TickChanges,
    ) {
        for (layer, rect) in changes.bounds_requests.drain(..) {
            self.set_bounds(provider, layer, rect);
        }
    }
}
