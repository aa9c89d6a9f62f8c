// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draining accumulated changes to a compositor attachment.
//!
//! Mutations on [`LayerTree`] only mark dirty channels and lifecycle lists.
//! [`LayerTree::flush_into`] drains everything accumulated since the last
//! flush into a [`FrameChanges`] batch and hands it to an [`Attachment`],
//! which mirrors the batch to whatever sits on the other side (a compositor,
//! a test recorder) and commits it atomically.

use alloc::vec::Vec;

use crate::dirty;

use super::id::INVALID;
use super::tree::LayerTree;

/// One flush worth of accumulated changes, as raw slot indices.
///
/// Indices in `removed` refer to slots whose layer is already gone; they
/// identify which mirrored object to drop, nothing more. All other indices
/// are live and may be passed to the tree's `*_at` accessors.
#[derive(Debug, Default)]
pub struct FrameChanges {
    /// Layers whose bounds origin changed.
    pub offsets: Vec<u32>,
    /// Layers whose bounds size changed.
    pub bounds: Vec<u32>,
    /// Layers whose content was set or cleared.
    pub content: Vec<u32>,
    /// Layers created since the last flush.
    pub added: Vec<u32>,
    /// Layers destroyed since the last flush.
    pub removed: Vec<u32>,
    /// Whether parent/child relationships changed since the last flush.
    pub topology_changed: bool,
}

impl FrameChanges {
    /// Resets the batch for reuse.
    pub fn clear(&mut self) {
        self.offsets.clear();
        self.bounds.clear();
        self.content.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns whether the flush found nothing to report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
            && self.bounds.is_empty()
            && self.content.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

/// The compositor side of a flush.
///
/// Both methods are infallible by contract: an attachment whose device is
/// gone has nothing useful to report back, and must treat the failure as
/// fatal.
pub trait Attachment {
    /// Mirrors one batch of changes. The tree is in its post-mutation state;
    /// use [`FrameChanges`] indices with the tree's `*_at` accessors.
    fn apply(&mut self, tree: &LayerTree, changes: &FrameChanges);

    /// Makes every mirrored change since the last commit visible at once.
    fn commit(&mut self);
}

impl LayerTree {
    /// Drains all accumulated changes into `changes` and applies them to
    /// `attachment`, ending with a commit.
    ///
    /// A flush with nothing accumulated still commits, which is harmless;
    /// call sites that care can check [`FrameChanges::is_empty`] first via
    /// a prior flush's output.
    pub fn flush_into(&mut self, attachment: &mut dyn Attachment, changes: &mut FrameChanges) {
        changes.clear();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
        }

        changes.offsets = self.dirty.drain(dirty::OFFSET).deterministic().run().collect();
        changes.bounds = self.dirty.drain(dirty::BOUNDS).deterministic().run().collect();
        changes.content = self.dirty.drain(dirty::CONTENT).deterministic().run().collect();
        // Topology marks carry no per-layer payload beyond the flag set
        // above; drain them so they do not linger.
        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut changes.added, &mut self.pending_added);
        core::mem::swap(&mut changes.removed, &mut self.pending_removed);

        attachment.apply(self, changes);
        attachment.commit();
    }

    /// Returns the cached depth-first traversal order as raw slot indices.
    ///
    /// Valid as of the last flush; earlier sibling indices are stacked
    /// below later ones.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    fn rebuild_traversal_order(&mut self) {
        let mut order = core::mem::take(&mut self.traversal_order);
        order.clear();
        for root in self.roots() {
            self.dfs_collect(root.index(), &mut order);
        }
        self.traversal_order = order;
        self.traversal_dirty = false;
    }

    fn dfs_collect(&self, idx: u32, out: &mut Vec<u32>) {
        out.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.dfs_collect(child, out);
            child = self.next_sibling[child as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec;
    use alloc::vec::Vec;

    use kurbo::Rect;

    use super::super::support::{CountingProvider, HookLog, LoggingContent};
    use super::*;

    /// Attachment recording each applied batch as copied index lists.
    #[derive(Default)]
    struct RecordingAttachment {
        applied: Vec<AppliedBatch>,
        commits: u32,
    }

    #[derive(Debug, PartialEq, Eq)]
    struct AppliedBatch {
        offsets: Vec<u32>,
        bounds: Vec<u32>,
        content: Vec<u32>,
        added: Vec<u32>,
        removed: Vec<u32>,
        topology_changed: bool,
    }

    impl Attachment for RecordingAttachment {
        fn apply(&mut self, _tree: &LayerTree, changes: &FrameChanges) {
            self.applied.push(AppliedBatch {
                offsets: changes.offsets.clone(),
                bounds: changes.bounds.clone(),
                content: changes.content.clone(),
                added: changes.added.clone(),
                removed: changes.removed.clone(),
                topology_changed: changes.topology_changed,
            });
        }

        fn commit(&mut self) {
            self.commits += 1;
        }
    }

    #[test]
    fn second_flush_with_no_mutation_is_empty() {
        let mut tree = LayerTree::new();
        let mut attachment = RecordingAttachment::default();
        let mut changes = FrameChanges::default();

        let id = tree.create_layer();
        tree.flush_into(&mut attachment, &mut changes);
        assert_eq!(changes.added, &[id.index()]);
        assert!(changes.topology_changed);

        tree.flush_into(&mut attachment, &mut changes);
        assert!(changes.is_empty(), "all state drained by the first flush");
        assert_eq!(attachment.commits, 2, "every flush commits");
    }

    #[test]
    fn origin_and_size_drain_to_separate_channels() {
        let mut tree = LayerTree::new();
        let mut provider = CountingProvider::default();
        let mut attachment = RecordingAttachment::default();
        let mut changes = FrameChanges::default();

        let id = tree.create_layer();
        tree.flush_into(&mut attachment, &mut changes);

        // Origin only.
        tree.set_bounds(&mut provider, id, Rect::new(5.0, 5.0, 5.0, 5.0));
        tree.flush_into(&mut attachment, &mut changes);
        assert_eq!(changes.offsets, &[id.index()]);
        assert!(changes.bounds.is_empty());

        // Size only.
        tree.set_bounds(&mut provider, id, Rect::new(5.0, 5.0, 105.0, 55.0));
        tree.flush_into(&mut attachment, &mut changes);
        assert!(changes.offsets.is_empty());
        assert_eq!(changes.bounds, &[id.index()]);
    }

    #[test]
    fn content_changes_drain_to_the_content_channel() {
        let mut tree = LayerTree::new();
        let mut attachment = RecordingAttachment::default();
        let mut changes = FrameChanges::default();

        let id = tree.create_layer();
        tree.flush_into(&mut attachment, &mut changes);

        tree.set_content(id, Box::new(LoggingContent::new(&HookLog::default())));
        tree.flush_into(&mut attachment, &mut changes);
        assert_eq!(changes.content, &[id.index()]);
        assert!(tree.has_content_at(id.index()));
    }

    #[test]
    fn destroy_reports_removed_and_drops_stale_marks() {
        let mut tree = LayerTree::new();
        let mut provider = CountingProvider::default();
        let mut attachment = RecordingAttachment::default();
        let mut changes = FrameChanges::default();

        let id = tree.create_layer();
        tree.flush_into(&mut attachment, &mut changes);

        // Mutate, then destroy without flushing in between. The property
        // marks must not surface for a slot whose layer is gone.
        tree.set_bounds(&mut provider, id, Rect::new(1.0, 2.0, 3.0, 4.0));
        tree.destroy_layer(id);
        tree.flush_into(&mut attachment, &mut changes);

        assert_eq!(changes.removed, &[id.index()]);
        assert!(changes.offsets.is_empty(), "marks died with the layer");
        assert!(changes.bounds.is_empty(), "marks died with the layer");
    }

    #[test]
    fn create_and_destroy_between_flushes_reports_both() {
        let mut tree = LayerTree::new();
        let mut attachment = RecordingAttachment::default();
        let mut changes = FrameChanges::default();

        let id = tree.create_layer();
        tree.destroy_layer(id);
        tree.flush_into(&mut attachment, &mut changes);

        // The attachment sees both sides and nets them out itself.
        assert_eq!(changes.added, &[id.index()]);
        assert_eq!(changes.removed, &[id.index()]);
    }

    #[test]
    fn traversal_order_is_depth_first_with_siblings_in_stack_order() {
        let mut tree = LayerTree::new();
        let mut attachment = RecordingAttachment::default();
        let mut changes = FrameChanges::default();

        let root = tree.create_layer();
        let child_a = tree.create_layer();
        let child_b = tree.create_layer();
        let grandchild = tree.create_layer();
        tree.add_child(root, child_a);
        tree.add_child(root, child_b);
        tree.add_child(child_a, grandchild);

        tree.flush_into(&mut attachment, &mut changes);
        assert!(changes.topology_changed);
        assert_eq!(
            tree.traversal_order(),
            &[
                root.index(),
                child_a.index(),
                grandchild.index(),
                child_b.index()
            ]
        );

        // Reparenting invalidates the cache; a flush rebuilds it.
        tree.remove_from_parent(grandchild);
        tree.add_child(child_b, grandchild);
        tree.flush_into(&mut attachment, &mut changes);
        assert!(changes.topology_changed);
        assert_eq!(
            tree.traversal_order(),
            &[
                root.index(),
                child_a.index(),
                child_b.index(),
                grandchild.index()
            ]
        );
    }

    #[test]
    fn property_drains_are_deterministic() {
        let mut tree = LayerTree::new();
        let mut provider = CountingProvider::default();
        let mut attachment = RecordingAttachment::default();
        let mut changes = FrameChanges::default();

        let ids: Vec<_> = (0..4).map(|_| tree.create_layer()).collect();
        tree.flush_into(&mut attachment, &mut changes);

        // Mark in scrambled order; the drain comes out sorted.
        for &i in &[2_usize, 0, 3, 1] {
            tree.set_bounds(&mut provider, ids[i], Rect::new(1.0, 1.0, 2.0, 2.0));
        }
        tree.flush_into(&mut attachment, &mut changes);
        assert_eq!(changes.offsets, vec![0, 1, 2, 3]);
        assert_eq!(changes.bounds, vec![0, 1, 2, 3]);
    }
}
