// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The retained layer tree.
//!
//! A [`LayerTree`] stores layers in struct-of-arrays form, addressed by
//! generational [`LayerId`] handles. Layers have parent-relative bounds, an
//! optional content inset, optional [`LayerContent`] behavior, an optional
//! [`Animation`](crate::animation::Animation), and (for presentable layers)
//! a lazily created presentation surface.
//!
//! The per-frame flow is split in three:
//!
//! - [`LayerTree::animate_into`] runs one readiness-gated animation tick,
//!   collecting deferred bounds requests into [`TickChanges`].
//! - [`LayerTree::apply_tick_changes`] feeds those requests back through the
//!   regular bounds path.
//! - [`LayerTree::flush_into`] drains all accumulated dirty state into a
//!   [`FrameChanges`] batch for an [`Attachment`] to mirror and commit.
//!
//! Mutations mark one of four local dirty channels (offset, bounds, content,
//! topology); because bounds are parent-relative, no mark ever propagates to
//! another layer.

mod content;
mod flush;
mod id;
mod tick;
mod traverse;
mod tree;

#[cfg(test)]
pub(crate) mod support;

pub use content::{LayerContent, TickChanges};
pub use flush::{Attachment, FrameChanges};
pub use id::{INVALID, LayerId};
pub use traverse::Children;
pub use tree::LayerTree;
