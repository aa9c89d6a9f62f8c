// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame scheduling over a host message pump.
//!
//! A [`Scheduler`] owns a set of [`Schedulable`] registrants and drives
//! them with ticks. How ticks interleave with host messages is chosen by
//! [`PumpStrategy`]:
//!
//! - [`NoWait`](PumpStrategy::NoWait) ticks whenever the pump goes idle,
//!   relying on per-surface back pressure to pace the loop.
//! - [`Timer`](PumpStrategy::Timer) ticks on a fixed interval and sleeps
//!   the pump for the remainder between deadlines.
//! - [`Waitable`](PumpStrategy::Waitable) blocks the pump on its own
//!   waitable source with a timeout, then ticks.
//!
//! The scheduler never reads a clock itself; a [`Clock`] implementation
//! pushes host time in, which keeps every strategy deterministic under
//! test.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::time::{Duration, HostTime};
use crate::trace::{TickBeginEvent, Tracer};

/// Something the scheduler drives once per tick.
pub trait Schedulable {
    /// Advances to `now`. Returns `true` when any frame was presented.
    fn do_animate(&mut self, now: HostTime) -> bool;
}

/// Source of host time for tick stamping.
pub trait Clock {
    /// Returns the current host time. Must be monotonic.
    fn now(&mut self) -> HostTime;
}

/// Outcome of dispatching one host message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PumpStatus {
    /// A message was dispatched; poll again before ticking.
    Dispatched,
    /// The queue is empty.
    Idle,
    /// The host asked the loop to exit.
    Quit,
}

/// The host message queue and its waiting primitive.
pub trait MessagePump {
    /// Dispatches at most one pending message without blocking.
    fn pump_one(&mut self) -> PumpStatus;

    /// Blocks until a message arrives or `timeout` elapses.
    fn wait_for_work(&mut self, timeout: Duration);
}

/// How [`Scheduler::run`] interleaves ticks with host messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PumpStrategy {
    /// Tick every time the pump reports an empty queue.
    NoWait,
    /// Tick on a fixed interval, waiting out the remainder in between.
    Timer {
        /// Span between consecutive tick deadlines.
        interval: Duration,
    },
    /// Wait on the pump with a timeout, then tick.
    Waitable {
        /// Upper bound on one wait.
        timeout: Duration,
    },
}

impl PumpStrategy {
    /// Default timer interval and waitable timeout: 1ms at 1ns tick
    /// resolution.
    pub const DEFAULT_SPAN: Duration = Duration(1_000_000);

    /// Timer strategy with the default interval.
    #[must_use]
    pub const fn timer() -> Self {
        Self::Timer {
            interval: Self::DEFAULT_SPAN,
        }
    }

    /// Waitable strategy with the default timeout.
    #[must_use]
    pub const fn waitable() -> Self {
        Self::Waitable {
            timeout: Self::DEFAULT_SPAN,
        }
    }
}

/// A handle to a registrant in a [`Scheduler`].
///
/// Generational, like layer handles: removing a registrant invalidates its
/// id even when the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchedulableId {
    idx: u32,
    generation: u32,
}

impl fmt::Debug for SchedulableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchedulableId({}@gen{})", self.idx, self.generation)
    }
}

/// Owns registrants and drives them with ticks.
#[derive(Default)]
pub struct Scheduler {
    entries: Vec<Option<Box<dyn Schedulable>>>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("entries", &self.entries.len())
            .field("free", &self.free_list.len())
            .finish()
    }
}

impl Scheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schedulable, transferring ownership to the scheduler.
    pub fn add(&mut self, schedulable: Box<dyn Schedulable>) -> SchedulableId {
        if let Some(idx) = self.free_list.pop() {
            self.generation[idx as usize] += 1;
            self.entries[idx as usize] = Some(schedulable);
            SchedulableId {
                idx,
                generation: self.generation[idx as usize],
            }
        } else {
            let idx = u32::try_from(self.entries.len()).expect("registrant count fits u32");
            self.entries.push(Some(schedulable));
            self.generation.push(0);
            SchedulableId { idx, generation: 0 }
        }
    }

    /// Removes a registrant, returning ownership to the caller.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn remove(&mut self, id: SchedulableId) -> Box<dyn Schedulable> {
        let alive = (id.idx as usize) < self.entries.len()
            && self.generation[id.idx as usize] == id.generation
            && self.entries[id.idx as usize].is_some();
        assert!(alive, "stale SchedulableId: {id:?}");

        let schedulable = self.entries[id.idx as usize].take();
        self.generation[id.idx as usize] += 1;
        self.free_list.push(id.idx);
        schedulable.expect("checked above")
    }

    /// Returns the number of live registrants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len() - self.free_list.len()
    }

    /// Returns whether no registrants are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drives every registrant once with the given time.
    ///
    /// Returns `true` when any registrant presented a frame.
    pub fn run_tick(&mut self, now: HostTime) -> bool {
        self.run_tick_traced(now, &mut Tracer::none())
    }

    /// [`run_tick`](Self::run_tick) with trace event dispatch.
    pub fn run_tick_traced(&mut self, now: HostTime, tracer: &mut Tracer<'_>) -> bool {
        tracer.tick_begin(&TickBeginEvent { now });
        let mut any = false;
        for entry in self.entries.iter_mut().flatten() {
            any |= entry.do_animate(now);
        }
        any
    }

    /// Runs the frame loop until the pump reports quit.
    pub fn run(&mut self, pump: &mut dyn MessagePump, clock: &mut dyn Clock, strategy: PumpStrategy) {
        match strategy {
            PumpStrategy::NoWait => loop {
                match pump.pump_one() {
                    PumpStatus::Quit => return,
                    PumpStatus::Dispatched => {}
                    PumpStatus::Idle => {
                        let now = clock.now();
                        self.run_tick(now);
                    }
                }
            },
            PumpStrategy::Timer { interval } => {
                let mut deadline = clock.now() + interval;
                loop {
                    match pump.pump_one() {
                        PumpStatus::Quit => return,
                        PumpStatus::Dispatched => {}
                        PumpStatus::Idle => {
                            let now = clock.now();
                            if now >= deadline {
                                self.run_tick(now);
                                deadline = now + interval;
                            } else {
                                pump.wait_for_work(deadline.saturating_duration_since(now));
                            }
                        }
                    }
                }
            }
            PumpStrategy::Waitable { timeout } => loop {
                match pump.pump_one() {
                    PumpStatus::Quit => return,
                    PumpStatus::Dispatched => {}
                    PumpStatus::Idle => {
                        pump.wait_for_work(timeout);
                        let now = clock.now();
                        self.run_tick(now);
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::VecDeque;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use super::*;

    /// Pump dispatching a scripted status sequence, recording waits.
    struct ScriptedPump {
        script: VecDeque<PumpStatus>,
        waits: Vec<Duration>,
    }

    impl ScriptedPump {
        fn new(script: &[PumpStatus]) -> Self {
            Self {
                script: script.iter().copied().collect(),
                waits: Vec::new(),
            }
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

    /// Clock advancing a fixed step per query.
    struct SteppingClock {
        now: HostTime,
        step: Duration,
    }

    impl Clock for SteppingClock {
        fn now(&mut self) -> HostTime {
            let now = self.now;
            self.now = self.now + self.step;
            now
        }
    }

    /// Registrant recording the times it was driven with.
    struct Recorder {
        ticks: Rc<RefCell<Vec<HostTime>>>,
        present: bool,
    }

    impl Schedulable for Recorder {
        fn do_animate(&mut self, now: HostTime) -> bool {
            self.ticks.borrow_mut().push(now);
            self.present
        }
    }

    fn recorder(present: bool) -> (Box<Recorder>, Rc<RefCell<Vec<HostTime>>>) {
        let ticks = Rc::new(RefCell::new(Vec::new()));
        (
            Box::new(Recorder {
                ticks: ticks.clone(),
                present,
            }),
            ticks,
        )
    }

    #[test]
    fn run_tick_drives_every_registrant() {
        let mut scheduler = Scheduler::new();
        let (a, a_ticks) = recorder(false);
        let (b, b_ticks) = recorder(true);
        scheduler.add(a);
        scheduler.add(b);

        assert!(scheduler.run_tick(HostTime(7)), "one registrant presented");
        assert_eq!(*a_ticks.borrow(), &[HostTime(7)]);
        assert_eq!(*b_ticks.borrow(), &[HostTime(7)]);
    }

    #[test]
    fn removed_registrant_is_returned_and_no_longer_driven() {
        let mut scheduler = Scheduler::new();
        let (a, a_ticks) = recorder(true);
        let id = scheduler.add(a);
        scheduler.run_tick(HostTime(1));

        let _owned = scheduler.remove(id);
        assert!(scheduler.is_empty());
        assert!(!scheduler.run_tick(HostTime(2)));
        assert_eq!(a_ticks.borrow().len(), 1);
    }

    #[test]
    #[should_panic(expected = "stale SchedulableId")]
    fn double_remove_panics() {
        let mut scheduler = Scheduler::new();
        let (a, _ticks) = recorder(false);
        let id = scheduler.add(a);
        let _owned = scheduler.remove(id);
        let _ = scheduler.remove(id);
    }

    #[test]
    fn slot_reuse_bumps_the_generation() {
        let mut scheduler = Scheduler::new();
        let (a, _a_ticks) = recorder(false);
        let id1 = scheduler.add(a);
        let _owned = scheduler.remove(id1);

        let (b, _b_ticks) = recorder(false);
        let id2 = scheduler.add(b);
        assert_ne!(id1, id2, "reused slot must not alias the old handle");
    }

    #[test]
    fn no_wait_ticks_on_every_idle() {
        let mut scheduler = Scheduler::new();
        let (a, ticks) = recorder(true);
        scheduler.add(a);

        let mut pump = ScriptedPump::new(&[
            PumpStatus::Dispatched,
            PumpStatus::Idle,
            PumpStatus::Idle,
            PumpStatus::Dispatched,
            PumpStatus::Idle,
            PumpStatus::Quit,
        ]);
        let mut clock = SteppingClock {
            now: HostTime(0),
            step: Duration(10),
        };
        scheduler.run(&mut pump, &mut clock, PumpStrategy::NoWait);

        assert_eq!(
            *ticks.borrow(),
            &[HostTime(0), HostTime(10), HostTime(20)],
            "one tick per idle, none for dispatched messages"
        );
        assert!(pump.waits.is_empty(), "no-wait never sleeps");
    }

    #[test]
    fn timer_waits_out_the_remainder_between_deadlines() {
        let mut scheduler = Scheduler::new();
        let (a, ticks) = recorder(true);
        scheduler.add(a);

        // run() reads 0 for the first deadline (100), then 10 (early,
        // waits 90), then 20 (early, waits 80), then the clock jumps past
        // the deadline and a tick lands.
        let mut pump = ScriptedPump::new(&[
            PumpStatus::Idle,
            PumpStatus::Idle,
            PumpStatus::Idle,
            PumpStatus::Quit,
        ]);
        struct JumpClock {
            reads: u32,
        }
        impl Clock for JumpClock {
            fn now(&mut self) -> HostTime {
                self.reads += 1;
                match self.reads {
                    1 => HostTime(0),
                    2 => HostTime(10),
                    3 => HostTime(20),
                    _ => HostTime(110),
                }
            }
        }
        let mut clock = JumpClock { reads: 0 };

        scheduler.run(
            &mut pump,
            &mut clock,
            PumpStrategy::Timer {
                interval: Duration(100),
            },
        );

        assert_eq!(pump.waits, &[Duration(90), Duration(80)]);
        assert_eq!(*ticks.borrow(), &[HostTime(110)]);
    }

    #[test]
    fn waitable_waits_then_ticks() {
        let mut scheduler = Scheduler::new();
        let (a, ticks) = recorder(true);
        scheduler.add(a);

        let mut pump = ScriptedPump::new(&[PumpStatus::Idle, PumpStatus::Idle, PumpStatus::Quit]);
        let mut clock = SteppingClock {
            now: HostTime(0),
            step: Duration(5),
        };
        scheduler.run(&mut pump, &mut clock, PumpStrategy::waitable());

        assert_eq!(
            pump.waits,
            &[PumpStrategy::DEFAULT_SPAN, PumpStrategy::DEFAULT_SPAN]
        );
        assert_eq!(*ticks.borrow(), &[HostTime(0), HostTime(5)]);
    }

    #[test]
    fn quit_exits_immediately_without_ticking() {
        let mut scheduler = Scheduler::new();
        let (a, ticks) = recorder(true);
        scheduler.add(a);

        let mut pump = ScriptedPump::new(&[PumpStatus::Quit]);
        let mut clock = SteppingClock {
            now: HostTime(0),
            step: Duration(1),
        };
        scheduler.run(&mut pump, &mut clock, PumpStrategy::NoWait);
        assert!(ticks.borrow().is_empty());
    }
}
