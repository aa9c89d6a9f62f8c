// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays layer storage with allocation, topology, and property
//! management.

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::{Insets, Point, Rect};
use understory_dirty::DirtyTracker;

use crate::animation::Animation;
use crate::dirty;
use crate::geometry::PhysicalSize;
use crate::surface::{PresentationSurface, SurfaceProvider};

use super::content::LayerContent;
use super::id::{INVALID, LayerId};
use super::traverse::Children;

/// Struct-of-arrays storage for all layers.
///
/// Layers are addressed by [`LayerId`] handles. Internally, each layer
/// occupies a slot in parallel arrays. Destroyed layers are recycled via a
/// free list, and generation counters prevent stale handle access.
///
/// Bounds are parent-relative: moving a layer moves its subtree on the
/// compositor side without any recomputation here, which is why every dirty
/// channel is local-only.
#[derive(Debug)]
pub struct LayerTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Properties --
    pub(crate) bounds: Vec<Rect>,
    pub(crate) content_inset: Vec<Insets>,
    /// Local content rectangle, recomputed once per size or inset change.
    pub(crate) content_bounds: Vec<Rect>,
    pub(crate) active: Vec<bool>,

    // -- Per-layer collaborators --
    pub(crate) surface: Vec<Option<PresentationSurface>>,
    pub(crate) animation: Vec<Option<Animation>>,
    pub(crate) content: Vec<Option<Box<dyn LayerContent>>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for LayerTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerTree {
    /// Creates an empty layer tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            bounds: Vec::new(),
            content_inset: Vec::new(),
            content_bounds: Vec::new(),
            active: Vec::new(),
            surface: Vec::new(),
            animation: Vec::new(),
            content: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::new(),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a new layer and returns its handle.
    ///
    /// The layer starts with zero bounds, no inset, no content, no
    /// animation, no surface, inactive, and no parent.
    pub fn create_layer(&mut self) -> LayerId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            self.generation[idx as usize] += 1;
            self.parent[idx as usize] = INVALID;
            self.first_child[idx as usize] = INVALID;
            self.next_sibling[idx as usize] = INVALID;
            self.prev_sibling[idx as usize] = INVALID;
            self.bounds[idx as usize] = Rect::ZERO;
            self.content_inset[idx as usize] = Insets::ZERO;
            self.content_bounds[idx as usize] = Rect::ZERO;
            self.active[idx as usize] = false;
            self.surface[idx as usize] = None;
            self.animation[idx as usize] = None;
            self.content[idx as usize] = None;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.bounds.push(Rect::ZERO);
            self.content_inset.push(Insets::ZERO);
            self.content_bounds.push(Rect::ZERO);
            self.active.push(false);
            self.surface.push(None);
            self.animation.push(None);
            self.content.push(None);
            self.generation.push(0);
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);

        LayerId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a layer, freeing its slot for reuse.
    ///
    /// The layer's surface, content, and animation are dropped before the
    /// slot is recycled, so the compositor side sees the detach in the next
    /// flush.
    ///
    /// # Panics
    ///
    /// Panics if the layer has children (remove or destroy them first) or if
    /// the handle is stale.
    pub fn destroy_layer(&mut self, id: LayerId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy layer with children"
        );

        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }

        self.surface[idx as usize] = None;
        self.content[idx as usize] = None;
        self.animation[idx as usize] = None;

        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    /// Destroys a layer and all of its descendants, leaf-first.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_subtree(&mut self, id: LayerId) {
        self.validate(id);

        let mut post_order = Vec::new();
        self.collect_post_order(id.idx, &mut post_order);
        for idx in post_order {
            let handle = LayerId {
                idx,
                generation: self.generation[idx as usize],
            };
            self.destroy_layer(handle);
        }
    }

    /// Returns whether the given handle refers to a live layer.
    #[must_use]
    pub fn is_alive(&self, id: LayerId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology API --

    /// Adds `child` as the last (topmost) child of `parent`.
    ///
    /// Later siblings stack above earlier ones on the compositor side.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: LayerId, child: LayerId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );

        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `child` from its current parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the layer has no parent.
    pub fn remove_from_parent(&mut self, child: LayerId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "layer has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);

        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Returns the parent of a layer, if any.
    #[must_use]
    pub fn parent(&self, id: LayerId) -> Option<LayerId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(LayerId {
                idx: p,
                generation: self.generation[p as usize],
            })
        }
    }

    /// Returns an iterator over the direct children of a layer.
    #[must_use]
    pub fn children(&self, id: LayerId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the handles of root layers (those with no parent).
    #[must_use]
    pub fn roots(&self) -> Vec<LayerId> {
        let mut roots = Vec::new();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                roots.push(LayerId {
                    idx,
                    generation: self.generation[idx as usize],
                });
            }
        }
        roots
    }

    // -- Property getters --

    /// Returns the parent-relative bounds of a layer.
    #[must_use]
    pub fn bounds(&self, id: LayerId) -> Rect {
        self.validate(id);
        self.bounds[id.idx as usize]
    }

    /// Returns the content inset of a layer.
    #[must_use]
    pub fn content_inset(&self, id: LayerId) -> Insets {
        self.validate(id);
        self.content_inset[id.idx as usize]
    }

    /// Returns the cached content rectangle in local coordinates.
    #[must_use]
    pub fn content_bounds(&self, id: LayerId) -> Rect {
        self.validate(id);
        self.content_bounds[id.idx as usize]
    }

    /// Returns whether the layer is active.
    #[must_use]
    pub fn is_active(&self, id: LayerId) -> bool {
        self.validate(id);
        self.active[id.idx as usize]
    }

    /// Returns whether the layer has content (is presentable).
    #[must_use]
    pub fn has_content(&self, id: LayerId) -> bool {
        self.validate(id);
        self.content[id.idx as usize].is_some()
    }

    /// Returns the layer's animation, if one is attached.
    #[must_use]
    pub fn animation(&self, id: LayerId) -> Option<&Animation> {
        self.validate(id);
        self.animation[id.idx as usize].as_ref()
    }

    /// Returns the current pixel size of the layer's surface, if one has
    /// been created.
    #[must_use]
    pub fn surface_size(&self, id: LayerId) -> Option<PhysicalSize> {
        self.validate(id);
        self.surface[id.idx as usize]
            .as_ref()
            .map(PresentationSurface::size)
    }

    // -- Mutation API --

    /// Attaches drawing behavior, making the layer presentable.
    ///
    /// The layer acquires its device surface lazily on the next
    /// size-changing [`set_bounds`](Self::set_bounds) call.
    pub fn set_content(&mut self, id: LayerId, content: Box<dyn LayerContent>) {
        self.validate(id);
        self.content[id.idx as usize] = Some(content);
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Removes the layer's content and detaches its surface.
    pub fn clear_content(&mut self, id: LayerId) {
        self.validate(id);
        self.content[id.idx as usize] = None;
        self.surface[id.idx as usize] = None;
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Attaches an animation, replacing any existing one.
    pub fn set_animation(&mut self, id: LayerId, animation: Animation) {
        self.validate(id);
        self.animation[id.idx as usize] = Some(animation);
    }

    /// Sets the content inset and recomputes the cached content rectangle.
    pub fn set_content_inset(&mut self, id: LayerId, inset: Insets) {
        self.validate(id);
        let i = id.idx as usize;
        self.content_inset[i] = inset;
        self.content_bounds[i] = content_rect(self.bounds[i], inset);
    }

    /// Sets the parent-relative bounds of a layer.
    ///
    /// Origin and size are compared independently so the compositor update
    /// is minimal:
    ///
    /// - Origin change only: marks the offset channel; no surface call.
    /// - Size change: recomputes the content rectangle, lazily creates the
    ///   layer's surface on the first call (when the layer has content) or
    ///   resizes it in place on later calls, and marks the bounds channel.
    /// - Identical rectangle: no surface call, no dirty mark, no hook.
    ///
    /// The content's `did_change_bounds` hook runs once per call when
    /// anything changed.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_bounds(&mut self, provider: &mut dyn SurfaceProvider, id: LayerId, bounds: Rect) {
        self.validate(id);
        let i = id.idx as usize;
        let old = self.bounds[i];
        let origin_changed = old.origin() != bounds.origin();
        let size_changed = old.size() != bounds.size();
        if !origin_changed && !size_changed {
            return;
        }

        self.bounds[i] = bounds;

        if origin_changed {
            self.dirty.mark(id.idx, dirty::OFFSET);
        }

        if size_changed {
            self.content_bounds[i] = content_rect(bounds, self.content_inset[i]);
            if self.content[i].is_some() {
                let pixel_size = PhysicalSize::from_size(bounds.size());
                match self.surface[i].as_mut() {
                    Some(surface) => surface.did_change_bounds(pixel_size),
                    None => {
                        let created = provider.create_surface(pixel_size);
                        self.surface[i] = Some(PresentationSurface::new(created, pixel_size));
                    }
                }
            }
            self.dirty.mark(id.idx, dirty::BOUNDS);
        }

        let content_bounds = self.content_bounds[i];
        if let Some(content) = self.content[i].as_deref_mut() {
            content.did_change_bounds(content_bounds);
        }
    }

    /// Sets the active flag on a layer and every descendant.
    ///
    /// Propagation is unconditional depth-first pre-order, but the per-layer
    /// activation hooks run only on an actual transition, so repeated calls
    /// are idempotent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_active(&mut self, id: LayerId, active: bool) {
        self.validate(id);
        self.set_active_rec(id.idx, active);
    }

    fn set_active_rec(&mut self, idx: u32, active: bool) {
        let i = idx as usize;
        let was_active = self.active[i];
        self.active[i] = active;
        if was_active != active {
            if let Some(content) = self.content[i].as_deref_mut() {
                if active {
                    content.did_activate();
                } else {
                    content.did_deactivate();
                }
            }
        }

        let mut child = self.first_child[i];
        while child != INVALID {
            let next = self.next_sibling[child as usize];
            self.set_active_rec(child, active);
            child = next;
        }
    }

    // -- Raw-index accessors for attachments --
    //
    // These accept raw slot indices (as found in `FrameChanges`) rather than
    // `LayerId` handles, skipping generation validation. Only use with
    // indices that came from `FrameChanges` or `traversal_order()`.

    /// Returns the parent-relative bounds at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn bounds_at(&self, idx: u32) -> Rect {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.bounds[idx as usize]
    }

    /// Returns whether the layer at raw slot `idx` has content.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn has_content_at(&self, idx: u32) -> bool {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.content[idx as usize].is_some()
    }

    /// Returns whether the layer at raw slot `idx` has a device surface.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn has_surface_at(&self, idx: u32) -> bool {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.surface[idx as usize].is_some()
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: LayerId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale LayerId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Removes `idx` from its parent's child list without touching dirty
    /// state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Collects the subtree rooted at `idx` in post-order (leaf-first).
    fn collect_post_order(&self, idx: u32, out: &mut Vec<u32>) {
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.collect_post_order(child, out);
            child = self.next_sibling[child as usize];
        }
        out.push(idx);
    }
}

/// Computes the local content rectangle for the given bounds and inset.
fn content_rect(bounds: Rect, inset: Insets) -> Rect {
    Rect::from_origin_size(Point::ZERO, bounds.size()) - inset
}
