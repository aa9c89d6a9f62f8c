// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer tree, presentation surfaces, and animation timing for
//! readiness-gated compositing.
//!
//! `lamina_core` provides the data structures for a retained tree of
//! compositing layers whose frame production is paced by per-surface
//! readiness rather than a global vsync wait. It is `no_std` compatible
//! (with `alloc`) and uses struct-of-arrays storage with generational index
//! handles.
//!
//! # Architecture
//!
//! One frame turn flows through three passes over the layer tree, driven by
//! a scheduler sitting on the host message pump:
//!
//! ```text
//!   MessagePump / Clock ──► Scheduler::run_tick(now)
//!                                │
//!                                ▼
//!   LayerTree::animate_into ──► TickChanges ──► apply_tick_changes
//!       │ (readiness gate,                          │
//!       │  animation, draw,                         ▼
//!       │  present)                     LayerTree::flush_into
//!       │                                           │
//!       ▼                                           ▼
//!   SwapSurface::present              FrameChanges ──► Attachment::commit
//! ```
//!
//! **[`layer`]** — Struct-of-arrays layer tree with generational handles,
//! parent-relative bounds, deferred animation-driven mutation, and a
//! change-batching flush to a compositor [`Attachment`](layer::Attachment).
//!
//! **[`animation`]** — Explicitly clocked timing engine: delays, fill
//! modes, iterations, and playback direction over interpolated variables.
//!
//! **[`surface`]** — The device seam ([`Canvas`](surface::Canvas),
//! [`SwapSurface`](surface::SwapSurface),
//! [`SurfaceProvider`](surface::SurfaceProvider)) and the readiness-caching
//! [`PresentationSurface`](surface::PresentationSurface).
//!
//! **[`scheduler`]** — Frame loop over a host message pump with no-wait,
//! timer, and waitable pacing strategies.
//!
//! **[`sampling`]** — Bounded statistics ring with sparkline painting, for
//! on-surface frame-rate readouts.
//!
//! **[`dirty`]** — The four local dirty channels drained by a flush.
//!
//! **[`time`]**, **[`geometry`]** — Host tick timestamps with an explicit
//! timebase, and pixel sizing for surfaces.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) events for tick
//! instrumentation, with the zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod animation;
pub mod dirty;
pub mod geometry;
pub mod layer;
pub mod sampling;
pub mod scheduler;
pub mod surface;
pub mod time;
pub mod trace;
