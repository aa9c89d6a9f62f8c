// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timing-driven interpolation with explicit clocking.
//!
//! An [`Animation`] is a single-shot state machine
//! (`NotStarted → Running → Finished`) that owns a set of scalar
//! [variables](Animation::create_variable) and resolves each to an
//! interpolated value for the current time. Nothing here reads a clock: the
//! caller pushes time in through [`Animation::play`], which makes the engine
//! deterministic under test and tolerant of skipped frames (a dropped tick
//! simply means the next `play` lands further along the timeline).
//!
//! Callbacks go through [`AnimationClient`]: `did_fire` on every played tick
//! inside the active phase and `did_finish` exactly once on completion.

use alloc::vec::Vec;
use core::fmt;

use crate::time::{Duration, HostTime};

/// How a variable resolves during the pre-delay phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillMode {
    /// Platform default; treated like [`FillMode::None`].
    #[default]
    Auto,
    /// No fill; pre-delay progress is 0.
    None,
    /// Hold the final progress after the active phase.
    Forward,
    /// Pin the pre-delay phase to the first iteration's starting progress.
    Backward,
    /// Both [`FillMode::Forward`] and [`FillMode::Backward`].
    Both,
}

/// Direction each iteration runs in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlaybackDirection {
    /// Every iteration runs 0 → 1.
    #[default]
    Normal,
    /// Every iteration runs 1 → 0.
    Reverse,
    /// Even iterations run forward, odd iterations reversed.
    Alternate,
    /// Odd iterations run forward, even iterations reversed.
    AlternateReverse,
}

/// Immutable timing description for one animation.
///
/// All spans are in host ticks. `duration` is the total span from fire to
/// finish; the interpolated *active* span excludes `delay` at the front and
/// `end_delay` at the back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationTiming {
    /// Span between start and the first fired callback.
    pub delay: Duration,
    /// Total span from fire to finish.
    pub duration: Duration,
    /// Span at the end of `duration` during which progress holds at its
    /// final value.
    pub end_delay: Duration,
    /// Pre-delay fill behavior.
    pub fill: FillMode,
    /// Offset into the active span at which iteration progress begins.
    pub iteration_start: Duration,
    /// Number of iterations the active span is divided into. May be
    /// fractional; values below zero are treated as zero.
    pub iterations: f64,
    /// Per-iteration playback direction.
    pub direction: PlaybackDirection,
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            duration: Duration::ZERO,
            end_delay: Duration::ZERO,
            fill: FillMode::Auto,
            iteration_start: Duration::ZERO,
            iterations: 1.0,
            direction: PlaybackDirection::Normal,
        }
    }
}

impl AnimationTiming {
    /// Convenience constructor for the common case: a single linear pass of
    /// the given duration with no delays.
    #[must_use]
    pub fn linear(duration: Duration) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }
}

/// Lifecycle of an [`Animation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum AnimationState {
    /// Created but never started.
    #[default]
    NotStarted,
    /// Started; variables are resolvable.
    Running,
    /// Completed; terminal.
    Finished,
}

/// Handle to one interpolated variable of an [`Animation`].
///
/// Valid only for the animation that created it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableId(u32);

impl fmt::Debug for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VariableId({})", self.0)
    }
}

/// Receives animation lifecycle callbacks during [`Animation::play`].
pub trait AnimationClient {
    /// Called on every played tick at or past the fire point while the
    /// animation is still running. Variables are resolvable here.
    fn did_fire(&mut self, animation: &Animation);

    /// Called exactly once when the animation completes.
    fn did_finish(&mut self, animation: &Animation);
}

/// A single-shot timed interpolation over a set of scalar variables.
#[derive(Clone, Debug)]
pub struct Animation {
    timing: AnimationTiming,
    state: AnimationState,
    start_time: HostTime,
    current_time: HostTime,
    variables: Vec<(f64, f64)>,
}

impl Animation {
    /// Creates an animation in the `NotStarted` state.
    #[must_use]
    pub fn new(timing: AnimationTiming) -> Self {
        Self {
            timing,
            state: AnimationState::NotStarted,
            start_time: HostTime(0),
            current_time: HostTime(0),
            variables: Vec::new(),
        }
    }

    /// Returns the timing this animation was created with.
    #[must_use]
    pub fn timing(&self) -> &AnimationTiming {
        &self.timing
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Registers a variable interpolating from `start_value` to `end_value`.
    ///
    /// Variables live as long as the animation; the endpoint pair is
    /// immutable once created.
    pub fn create_variable(&mut self, start_value: f64, end_value: f64) -> VariableId {
        let id = VariableId(u32::try_from(self.variables.len()).expect("variable count fits u32"));
        self.variables.push((start_value, end_value));
        id
    }

    /// Anchors the timeline at `now` and transitions to `Running`.
    ///
    /// # Panics
    ///
    /// Panics unless the animation is `NotStarted`. Starting twice is a
    /// caller bug, not a recoverable condition.
    pub fn start(&mut self, now: HostTime) {
        assert!(
            self.state == AnimationState::NotStarted,
            "animation started twice (state: {:?})",
            self.state
        );
        self.start_time = now;
        self.current_time = now;
        self.state = AnimationState::Running;
    }

    /// Advances the timeline to `now` and dispatches callbacks.
    ///
    /// Starts implicitly from `NotStarted`; does nothing once `Finished`.
    /// Before the fire point (`start + delay`) the clock advances but no
    /// callback runs. At or past it, `client.did_fire` runs with the
    /// animation still `Running`; once `now` reaches
    /// `start + delay + duration` the state flips to `Finished` and
    /// `client.did_finish` runs, never to run again.
    pub fn play(&mut self, now: HostTime, client: &mut dyn AnimationClient) {
        if self.state == AnimationState::NotStarted {
            self.start(now);
        }
        if self.state != AnimationState::Running {
            return;
        }

        self.current_time = now;

        let fire_at = self.start_time + self.timing.delay;
        if self.current_time < fire_at {
            return;
        }
        client.did_fire(self);

        if self.current_time >= fire_at + self.timing.duration {
            self.state = AnimationState::Finished;
            client.did_finish(self);
        }
    }

    /// Fast-forwards to completion.
    ///
    /// Equivalent to playing the exact finish time, so `did_fire` and
    /// `did_finish` run once even when the natural clock never got there.
    /// Does nothing unless `Running`.
    pub fn stop(&mut self, client: &mut dyn AnimationClient) {
        if self.state != AnimationState::Running {
            return;
        }
        let finish_at = self.start_time + self.timing.delay + self.timing.duration;
        self.play(finish_at, client);
    }

    /// Resolves a variable at the current time.
    ///
    /// # Panics
    ///
    /// Panics unless the animation is `Running`, or if `id` did not come
    /// from this animation.
    #[must_use]
    pub fn value(&self, id: VariableId) -> f64 {
        assert!(
            self.state == AnimationState::Running,
            "animation variable resolved outside Running (state: {:?})",
            self.state
        );
        let (start_value, end_value) = self.variables[id.0 as usize];
        start_value + self.progress() * (end_value - start_value)
    }

    /// Resolves overall progress in `[0, 1]` at the current time.
    ///
    /// The active span is `duration - delay - end_delay`; a zero active span
    /// resolves to 1.0 (the animation is already at its end). Elapsed active
    /// time, offset by `iteration_start`, is divided into `iterations` and
    /// each iteration's fraction is mapped through `direction`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        let active = self
            .timing
            .duration
            .saturating_sub(self.timing.delay)
            .saturating_sub(self.timing.end_delay);
        if active == Duration::ZERO {
            return 1.0;
        }
        let active_f = active.ticks() as f64;

        let fire_at = self.start_time + self.timing.delay;
        if self.current_time < fire_at {
            return match self.timing.fill {
                FillMode::Backward | FillMode::Both => self.progress_at(0.0, active_f),
                FillMode::Auto | FillMode::None | FillMode::Forward => 0.0,
            };
        }

        let elapsed = self
            .current_time
            .saturating_duration_since(fire_at)
            .min(active);
        self.progress_at(elapsed.ticks() as f64, active_f)
    }

    /// Maps elapsed active ticks through iterations, direction, and
    /// iteration start.
    fn progress_at(&self, elapsed: f64, active: f64) -> f64 {
        // The active span is divided evenly into `iterations`, so overall
        // progress in iteration units is (elapsed / active) * iterations.
        let cap = self.timing.iterations.max(0.0);
        let offset = self.timing.iteration_start.ticks() as f64;
        let overall = ((elapsed + offset) / active * cap).min(cap);

        // Split into iteration index and in-iteration fraction without
        // `floor` (not available under no_std). An exact iteration boundary
        // past zero belongs to the iteration it ends.
        #[expect(
            clippy::cast_possible_truncation,
            reason = "overall is capped by the finite iteration count"
        )]
        let mut index = overall as u64;
        let mut fraction = overall - index as f64;
        if fraction == 0.0 && overall > 0.0 {
            index -= 1;
            fraction = 1.0;
        }

        let forward = match self.timing.direction {
            PlaybackDirection::Normal => true,
            PlaybackDirection::Reverse => false,
            PlaybackDirection::Alternate => index % 2 == 0,
            PlaybackDirection::AlternateReverse => index % 2 == 1,
        };
        let progress = if forward { fraction } else { 1.0 - fraction };
        progress.clamp(0.0, 1.0)
    }
}
