// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic host doubles for exercising the Lamina frame loop.
//!
//! Everything a real host would provide has a scripted stand-in here:
//!
//! - [`ScriptedProvider`] — surface factory whose readiness polls follow a
//!   script and whose device calls (creates, resizes, presents, draw
//!   commands) are observable from the outside through clones.
//! - [`RecordingAttachment`] — compositor attachment that copies every
//!   applied [`FrameChanges`] batch.
//! - [`ManualClock`] — host time that advances only when told to.
//! - [`ScriptedPump`] — message pump dispatching a fixed status sequence
//!   and recording every wait.
//! - [`FrameHost`] — one layer tree plus its provider and attachment,
//!   driving the full animate / apply / flush sequence per tick so it can
//!   register directly with a
//!   [`Scheduler`](lamina_core::scheduler::Scheduler).

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use kurbo::{Point, Rect};
use peniko::Color;

use lamina_core::geometry::PhysicalSize;
use lamina_core::layer::{Attachment, FrameChanges, LayerTree, TickChanges};
use lamina_core::scheduler::{Clock, MessagePump, PumpStatus, Schedulable};
use lamina_core::surface::{Canvas, SurfaceProvider, SwapSurface};
use lamina_core::time::{Duration, HostTime};

/// One recorded [`Canvas`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    /// A whole-surface clear.
    Clear(Color),
    /// A filled rectangle.
    FillRect(Rect, Color),
    /// A stroked line segment.
    Line {
        /// Segment start.
        from: Point,
        /// Segment end.
        to: Point,
        /// Stroke color.
        color: Color,
        /// Stroke width.
        width: f64,
    },
}

#[derive(Debug, Default)]
struct ProviderState {
    polls: RefCell<VecDeque<bool>>,
    created: RefCell<Vec<PhysicalSize>>,
    resizes: Cell<u32>,
    presents: Cell<u32>,
    begins: Cell<u32>,
    ends: Cell<u32>,
    commands: RefCell<Vec<DrawCommand>>,
}

/// Surface factory with scripted readiness and observable device calls.
///
/// Clones share state, so a clone kept outside a [`FrameHost`] observes
/// everything the host's surfaces do. Readiness polls pop from one shared
/// script, front first; an exhausted script answers ready.
#[derive(Clone, Debug, Default)]
pub struct ScriptedProvider {
    state: Rc<ProviderState>,
}

impl ScriptedProvider {
    /// Appends poll outcomes to the shared readiness script.
    pub fn script_polls(&self, polls: &[bool]) {
        self.state.polls.borrow_mut().extend(polls.iter().copied());
    }

    /// Returns the sizes passed to every surface creation so far.
    #[must_use]
    pub fn created(&self) -> Vec<PhysicalSize> {
        self.state.created.borrow().clone()
    }

    /// Returns the total resize count across all surfaces.
    #[must_use]
    pub fn resizes(&self) -> u32 {
        self.state.resizes.get()
    }

    /// Returns the total present count across all surfaces.
    #[must_use]
    pub fn presents(&self) -> u32 {
        self.state.presents.get()
    }

    /// Returns whether every `begin_draw` was paired with an `end_draw`.
    #[must_use]
    pub fn draws_balanced(&self) -> bool {
        self.state.begins.get() == self.state.ends.get()
    }

    /// Returns all draw commands recorded so far, oldest first.
    #[must_use]
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.state.commands.borrow().clone()
    }

    /// Clears the recorded draw command log.
    pub fn clear_commands(&self) {
        self.state.commands.borrow_mut().clear();
    }
}

impl SurfaceProvider for ScriptedProvider {
    fn create_surface(&mut self, size: PhysicalSize) -> Box<dyn SwapSurface> {
        self.state.created.borrow_mut().push(size);
        Box::new(ScriptedSurface {
            state: self.state.clone(),
            canvas: RecordingCanvas {
                state: self.state.clone(),
            },
        })
    }
}

#[derive(Debug)]
struct RecordingCanvas {
    state: Rc<ProviderState>,
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self, color: Color) {
        self.state.commands.borrow_mut().push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.state
            .commands
            .borrow_mut()
            .push(DrawCommand::FillRect(rect, color));
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color, width: f64) {
        self.state.commands.borrow_mut().push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }
}

#[derive(Debug)]
struct ScriptedSurface {
    state: Rc<ProviderState>,
    canvas: RecordingCanvas,
}

impl SwapSurface for ScriptedSurface {
    fn resize(&mut self, _size: PhysicalSize) {
        self.state.resizes.set(self.state.resizes.get() + 1);
    }

    fn poll_ready(&mut self) -> bool {
        self.state.polls.borrow_mut().pop_front().unwrap_or(true)
    }

    fn begin_draw(&mut self) -> &mut dyn Canvas {
        self.state.begins.set(self.state.begins.get() + 1);
        &mut self.canvas
    }

    fn end_draw(&mut self) {
        self.state.ends.set(self.state.ends.get() + 1);
    }

    fn present(&mut self) {
        self.state.presents.set(self.state.presents.get() + 1);
    }
}

/// A copied [`FrameChanges`] batch, captured at apply time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppliedBatch {
    /// Layers whose bounds origin changed.
    pub offsets: Vec<u32>,
    /// Layers whose bounds size changed.
    pub bounds: Vec<u32>,
    /// Layers whose content was set or cleared.
    pub content: Vec<u32>,
    /// Layers created since the previous flush.
    pub added: Vec<u32>,
    /// Layers destroyed since the previous flush.
    pub removed: Vec<u32>,
    /// Whether parent/child relationships changed.
    pub topology_changed: bool,
}

impl AppliedBatch {
    /// Returns whether the batch carried no changes at all.
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

#[derive(Debug, Default)]
struct AttachmentState {
    batches: RefCell<Vec<AppliedBatch>>,
    commits: Cell<u32>,
}

/// Attachment double that copies every applied batch.
///
/// Clones share state, mirroring [`ScriptedProvider`].
#[derive(Clone, Debug, Default)]
pub struct RecordingAttachment {
    state: Rc<AttachmentState>,
}

impl RecordingAttachment {
    /// Returns every batch applied so far, oldest first.
    #[must_use]
    pub fn batches(&self) -> Vec<AppliedBatch> {
        self.state.batches.borrow().clone()
    }

    /// Returns the most recently applied batch, if any.
    #[must_use]
    pub fn last_batch(&self) -> Option<AppliedBatch> {
        self.state.batches.borrow().last().cloned()
    }

    /// Returns the commit count.
    #[must_use]
    pub fn commits(&self) -> u32 {
        self.state.commits.get()
    }
}

impl Attachment for RecordingAttachment {
    fn apply(&mut self, _tree: &LayerTree, changes: &FrameChanges) {
        self.state.batches.borrow_mut().push(AppliedBatch {
            offsets: changes.offsets.clone(),
            bounds: changes.bounds.clone(),
            content: changes.content.clone(),
            added: changes.added.clone(),
            removed: changes.removed.clone(),
            topology_changed: changes.topology_changed,
        });
    }

    fn commit(&mut self) {
        self.state.commits.set(self.state.commits.get() + 1);
    }
}

/// Host time under direct test control.
///
/// Optionally advances a fixed step per query, which is enough to drive
/// loop strategies that read the clock themselves.
#[derive(Clone, Copy, Debug)]
pub struct ManualClock {
    now: HostTime,
    step: Duration,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    #[must_use]
    pub fn new(start: HostTime) -> Self {
        Self {
            now: start,
            step: Duration::ZERO,
        }
    }

    /// Creates a clock that advances `step` ticks per query.
    #[must_use]
    pub fn stepping(start: HostTime, step: Duration) -> Self {
        Self { now: start, step }
    }

    /// Moves the clock forward.
    pub fn advance(&mut self, span: Duration) {
        self.now = self.now + span;
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> HostTime {
        let now = self.now;
        self.now = self.now + self.step;
        now
    }
}

/// Pump dispatching a scripted status sequence and recording waits.
///
/// An exhausted script reports quit, so a forgotten terminator cannot hang
/// a test.
#[derive(Debug, Default)]
pub struct ScriptedPump {
    script: VecDeque<PumpStatus>,
    waits: Vec<Duration>,
}

impl ScriptedPump {
    /// Creates a pump that dispatches `script` front to back.
    #[must_use]
    pub fn new(script: &[PumpStatus]) -> Self {
        Self {
            script: script.iter().copied().collect(),
            waits: Vec::new(),
        }
    }

    /// Returns every recorded wait timeout, oldest first.
    #[must_use]
    pub fn waits(&self) -> &[Duration] {
        &self.waits
    }
}

impl MessagePump for ScriptedPump {
    fn pump_one(&mut self) -> PumpStatus {
        self.script.pop_front().unwrap_or(PumpStatus::Quit)
    }

    fn wait_for_work(&mut self, timeout: Duration) {
        self.waits.push(timeout);
    }
}

/// One layer tree plus its host doubles, driven as a unit.
///
/// Each tick runs the full sequence: animate, apply deferred bounds, flush
/// to the attachment. Keep clones of the provider and attachment to observe
/// from outside while the host is owned by a scheduler.
#[derive(Debug, Default)]
pub struct FrameHost {
    /// The tree under test.
    pub tree: LayerTree,
    /// The surface factory; clone it before constructing to observe.
    pub provider: ScriptedProvider,
    /// The flush target; clone it before constructing to observe.
    pub attachment: RecordingAttachment,
    changes: TickChanges,
    frame: FrameChanges,
}

impl FrameHost {
    /// Creates a host around shared handles to the given doubles.
    #[must_use]
    pub fn new(provider: ScriptedProvider, attachment: RecordingAttachment) -> Self {
        Self {
            tree: LayerTree::new(),
            provider,
            attachment,
            changes: TickChanges::default(),
            frame: FrameChanges::default(),
        }
    }

    /// Runs one full frame turn. Returns whether anything presented.
    pub fn tick(&mut self, now: HostTime) -> bool {
        let presented = self.tree.animate_into(now, &mut self.changes);
        self.tree
            .apply_tick_changes(&mut self.provider, &mut self.changes);
        self.tree.flush_into(&mut self.attachment, &mut self.frame);
        presented
    }
}

impl Schedulable for FrameHost {
    fn do_animate(&mut self, now: HostTime) -> bool {
        self.tick(now)
    }
}
