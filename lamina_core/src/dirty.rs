// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Lamina uses multi-channel dirty tracking (via [`understory_dirty`]) to
//! carry per-layer invalidation from property mutations to the compositor
//! attachment flush. Every channel is local-only: layer bounds are
//! parent-relative, so no property here is inherited and nothing propagates
//! to descendants.
//!
//! - [`OFFSET`] — the bounds origin moved; the attachment repositions the
//!   native visual, no surface work needed.
//! - [`BOUNDS`] — the bounds size changed; the surface was resized (or
//!   created) and the attachment updates visual extent.
//! - [`CONTENT`] — content was set or cleared; the attachment attaches or
//!   detaches the layer's surface from its visual.
//! - [`TOPOLOGY`] — structural change (create/destroy, add/remove child);
//!   triggers a traversal-order rebuild during the flush.
//!
//! Callers never query dirty state directly. Each
//! [`LayerTree::flush_into`](crate::layer::LayerTree::flush_into) call
//! drains all channels into [`FrameChanges`](crate::layer::FrameChanges)
//! and hands them to the [`Attachment`](crate::layer::Attachment).

use understory_dirty::Channel;

/// Bounds origin changed. No surface work; reposition only.
pub const OFFSET: Channel = Channel::new(0);

/// Bounds size changed. Surface resized; visual extent update.
pub const BOUNDS: Channel = Channel::new(1);

/// Content set or cleared. Surface attach/detach.
pub const CONTENT: Channel = Channel::new(2);

/// Tree topology changed. Traversal order rebuild.
pub const TOPOLOGY: Channel = Channel::new(3);
