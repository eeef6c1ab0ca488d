//! # PausableTimer: interval timer with exact pause/resume accounting.
//!
//! A [`PausableTimer`] wraps the [`Scheduler`] primitive and adds pausing with
//! remaining-time preservation, idempotent guards, and an optional repeat policy.
//!
//! ## State machine
//! ```text
//!            start / instantly_start
//!   Idle ─────────────────────────────► Scheduled ◄──────┐
//!    │                                   │    │  ▲       │ resume
//!    │                         pause     │    │  │ fire  │ (remaining)
//!    │                    ┌──────────────┘    │  │ (repeats)
//!    │                    ▼                   │  │       │
//!    │                 Paused ────────────────┼──┼───────┘
//!    │                    │                   │  │
//!    │ invalidate         │ invalidate        ▼  │
//!    └────────────────────┴──────────────► Retired ◄── fire (once)
//! ```
//!
//! ## Rules
//! - Every operation called from a state not listed for it is a silent no-op.
//! - `remaining` exists only while `Paused` (carried by the state itself).
//! - At most one registration is live per timer.
//! - A fire clears the registration **before** the handler runs:
//!   - non-repeating timers are already `Retired` inside their handler;
//!   - repeating timers have no registration while the handler runs and re-arm with
//!     the full interval once it returns (so slow handlers drift the schedule).
//! - `invalidate` cancels the registration synchronously; a fire that was already due
//!   but not yet run is suppressed.
//!
//! ## Example
//! ```
//! use std::time::Duration;
//! use pausable_timer::{PausableTimer, Scheduler, TimerState};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let scheduler = Scheduler::new();
//! let timer = PausableTimer::new(&scheduler, Duration::from_millis(30), false, |_| {
//!     println!("fired");
//! });
//!
//! timer.start();
//! timer.pause();
//! assert_eq!(timer.state(), TimerState::Paused);
//!
//! timer.resume();
//! scheduler.run_until(tokio::time::sleep(Duration::from_millis(60))).await;
//! assert_eq!(timer.state(), TimerState::Retired);
//! # }
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{Scheduler, TimerHandle, TimerId, WeakScheduler};
use crate::events::{Event, EventKind};

/// Callback invoked on every fire; receives the timer that fired.
pub type Handler = Box<dyn FnMut(&PausableTimer)>;

/// Observable state of a [`PausableTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Created, not started yet.
    Idle,
    /// Counting toward the next fire.
    Scheduled,
    /// Stopped with the remaining time recorded.
    Paused,
    /// Terminal: no registration, no handler.
    Retired,
}

/// Internal phase; `Firing` is reported as [`TimerState::Scheduled`].
enum Phase {
    Idle,
    Scheduled(TimerHandle),
    /// Handler of a repeating fire (or `instantly_start`) is running; nothing is registered.
    Firing,
    Paused { remaining: Duration },
    Retired,
}

struct TimerCore {
    id: TimerId,
    label: Option<Arc<str>>,
    interval: Duration,
    repeats: bool,
    scheduler: WeakScheduler,
    phase: RefCell<Phase>,
    handler: RefCell<Option<Handler>>,
    fires: Cell<u64>,
}

impl Drop for TimerCore {
    fn drop(&mut self) {
        if let Phase::Scheduled(handle) = self.phase.get_mut() {
            handle.cancel();
        }
    }
}

/// Pausable, optionally repeating timer bound to one [`Scheduler`].
///
/// Cheap to clone: clones are handles to the same timer. When the last handle
/// is dropped the timer is torn down and its pending registration cancelled.
#[derive(Clone)]
pub struct PausableTimer {
    core: Rc<TimerCore>,
}

impl PausableTimer {
    /// Creates an idle timer. Nothing is scheduled until [`start`](Self::start).
    pub fn new<F>(scheduler: &Scheduler, interval: Duration, repeats: bool, handler: F) -> Self
    where
        F: FnMut(&PausableTimer) + 'static,
    {
        Self::build(scheduler, None, interval, repeats, Box::new(handler))
    }

    /// Like [`new`](Self::new), with a label carried on every event the timer publishes.
    pub fn labeled<F>(
        scheduler: &Scheduler,
        label: impl Into<Arc<str>>,
        interval: Duration,
        repeats: bool,
        handler: F,
    ) -> Self
    where
        F: FnMut(&PausableTimer) + 'static,
    {
        Self::build(scheduler, Some(label.into()), interval, repeats, Box::new(handler))
    }

    /// Creates a timer and starts it right away.
    pub fn scheduled<F>(scheduler: &Scheduler, interval: Duration, repeats: bool, handler: F) -> Self
    where
        F: FnMut(&PausableTimer) + 'static,
    {
        let timer = Self::new(scheduler, interval, repeats, handler);
        timer.start();
        timer
    }

    fn build(
        scheduler: &Scheduler,
        label: Option<Arc<str>>,
        interval: Duration,
        repeats: bool,
        handler: Handler,
    ) -> Self {
        Self {
            core: Rc::new(TimerCore {
                id: scheduler.next_timer_id(),
                label,
                interval,
                repeats,
                scheduler: scheduler.downgrade(),
                phase: RefCell::new(Phase::Idle),
                handler: RefCell::new(Some(handler)),
                fires: Cell::new(0),
            }),
        }
    }

    /// Arms the timer with the full interval. No-op unless `Idle`.
    pub fn start(&self) {
        if !matches!(*self.core.phase.borrow(), Phase::Idle) {
            return;
        }
        if self.arm(self.core.interval) {
            self.emit(EventKind::TimerStarted, |ev| ev.with_delay(self.core.interval));
        }
    }

    /// Runs the handler once right now, then arms with the full interval. No-op unless `Idle`.
    ///
    /// The handler may pause or invalidate the timer; it then stays paused
    /// (with the full interval remaining) or retired.
    pub fn instantly_start(&self) {
        {
            let mut phase = self.core.phase.borrow_mut();
            if !matches!(*phase, Phase::Idle) {
                return;
            }
            *phase = Phase::Firing;
        }
        self.emit(EventKind::TimerStarted, |ev| {
            ev.with_delay(self.core.interval).with_reason("instant")
        });

        let fires = self.bump_fires();
        self.emit(EventKind::TimerFired, |ev| ev.with_fires(fires).with_reason("instant"));
        self.run_handler();
        self.rearm_after_handler();
    }

    /// Stops counting and records the time left. No-op unless `Scheduled`.
    ///
    /// A timer whose deadline already passed (but whose fire has not run yet)
    /// records zero and fires right after [`resume`](Self::resume).
    pub fn pause(&self) {
        self.pause_with(None);
    }

    /// Re-arms with the recorded remaining time. No-op unless `Paused`.
    pub fn resume(&self) {
        self.resume_with(None);
    }

    /// Cancels any registration and drops the handler; the timer is `Retired` afterwards.
    ///
    /// Safe to call from any state, any number of times, including from the handler.
    pub fn invalidate(&self) {
        self.invalidate_with(None);
    }

    /// True while the timer can still fire (`Scheduled` or `Paused`).
    pub fn is_valid(&self) -> bool {
        matches!(
            *self.core.phase.borrow(),
            Phase::Scheduled(_) | Phase::Firing | Phase::Paused { .. }
        )
    }

    /// True while `Paused`.
    pub fn is_paused(&self) -> bool {
        matches!(*self.core.phase.borrow(), Phase::Paused { .. })
    }

    /// Current state.
    pub fn state(&self) -> TimerState {
        match *self.core.phase.borrow() {
            Phase::Idle => TimerState::Idle,
            Phase::Scheduled(_) | Phase::Firing => TimerState::Scheduled,
            Phase::Paused { .. } => TimerState::Paused,
            Phase::Retired => TimerState::Retired,
        }
    }

    /// Time left before the next fire, recorded at the last pause; `Some` only while `Paused`.
    pub fn remaining(&self) -> Option<Duration> {
        match *self.core.phase.borrow() {
            Phase::Paused { remaining } => Some(remaining),
            _ => None,
        }
    }

    /// Configured interval.
    pub fn interval(&self) -> Duration {
        self.core.interval
    }

    /// Whether the timer re-arms after each fire.
    pub fn repeats(&self) -> bool {
        self.core.repeats
    }

    /// Identifier carried on events.
    pub fn id(&self) -> TimerId {
        self.core.id
    }

    /// Optional label carried on events.
    pub fn label(&self) -> Option<&str> {
        self.core.label.as_deref()
    }

    /// Number of handler invocations so far.
    pub fn fire_count(&self) -> u64 {
        self.core.fires.get()
    }

    pub(crate) fn pause_with(&self, reason: Option<&'static str>) {
        let remaining = {
            let mut phase = self.core.phase.borrow_mut();
            let remaining = match &*phase {
                Phase::Scheduled(handle) => {
                    handle.cancel();
                    handle.remaining()
                }
                Phase::Firing => self.core.interval,
                _ => return,
            };
            *phase = Phase::Paused { remaining };
            remaining
        };
        self.emit(EventKind::TimerPaused, |ev| {
            let ev = ev.with_delay(remaining);
            match reason {
                Some(reason) => ev.with_reason(reason),
                None => ev,
            }
        });
    }

    pub(crate) fn resume_with(&self, reason: Option<&'static str>) {
        let remaining = match *self.core.phase.borrow() {
            Phase::Paused { remaining } => remaining,
            _ => return,
        };
        if self.arm(remaining) {
            self.emit(EventKind::TimerResumed, |ev| {
                let ev = ev.with_delay(remaining);
                match reason {
                    Some(reason) => ev.with_reason(reason),
                    None => ev,
                }
            });
        }
    }

    pub(crate) fn invalidate_with(&self, reason: Option<&'static str>) {
        let prev = std::mem::replace(&mut *self.core.phase.borrow_mut(), Phase::Retired);
        match prev {
            Phase::Retired => return,
            Phase::Scheduled(handle) => handle.cancel(),
            _ => {}
        }
        // Dropped outside the borrow: the handler's captures may touch this timer.
        let handler = self.core.handler.borrow_mut().take();
        drop(handler);

        self.emit(EventKind::TimerInvalidated, |ev| match reason {
            Some(reason) => ev.with_reason(reason),
            None => ev,
        });
    }

    /// Registers the next fire; retires the timer if its scheduler is gone.
    fn arm(&self, after: Duration) -> bool {
        let Some(scheduler) = self.core.scheduler.upgrade() else {
            self.invalidate_with(Some("scheduler_gone"));
            return false;
        };
        let weak = Rc::downgrade(&self.core);
        let handle = scheduler.schedule(after, move || {
            if let Some(core) = weak.upgrade() {
                PausableTimer { core }.fire();
            }
        });
        *self.core.phase.borrow_mut() = Phase::Scheduled(handle);
        true
    }

    /// Scheduler callback: the registration owned by this timer came due.
    fn fire(&self) {
        {
            let mut phase = self.core.phase.borrow_mut();
            match &*phase {
                Phase::Scheduled(handle) if !handle.is_cancelled() => {}
                _ => return,
            }
            *phase = if self.core.repeats {
                Phase::Firing
            } else {
                Phase::Retired
            };
        }

        let fires = self.bump_fires();
        self.emit(EventKind::TimerFired, |ev| ev.with_fires(fires));

        if self.core.repeats {
            self.run_handler();
            self.rearm_after_handler();
        } else {
            let handler = self.core.handler.borrow_mut().take();
            self.emit(EventKind::TimerRetired, |ev| ev.with_fires(fires));
            if let Some(mut handler) = handler {
                handler(self);
            }
        }
    }

    /// Runs the handler with no borrow held, then puts it back unless the timer retired.
    fn run_handler(&self) {
        let Some(mut handler) = self.core.handler.borrow_mut().take() else {
            return;
        };
        handler(self);

        if matches!(*self.core.phase.borrow(), Phase::Retired) {
            return;
        }
        let mut slot = self.core.handler.borrow_mut();
        if slot.is_none() {
            *slot = Some(handler);
        }
    }

    fn rearm_after_handler(&self) {
        let firing = matches!(*self.core.phase.borrow(), Phase::Firing);
        if firing {
            self.arm(self.core.interval);
        }
    }

    fn bump_fires(&self) -> u64 {
        let fires = self.core.fires.get() + 1;
        self.core.fires.set(fires);
        fires
    }

    fn emit(&self, kind: EventKind, decorate: impl FnOnce(Event) -> Event) {
        if let Some(scheduler) = self.core.scheduler.upgrade() {
            scheduler.publish_with(|| {
                let ev = Event::new(kind).with_timer(self.core.id);
                let ev = match &self.core.label {
                    Some(label) => ev.with_label(Arc::clone(label)),
                    None => ev,
                };
                decorate(ev)
            });
        }
    }
}

impl fmt::Debug for PausableTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PausableTimer")
            .field("id", &self.core.id)
            .field("label", &self.core.label)
            .field("interval", &self.core.interval)
            .field("repeats", &self.core.repeats)
            .field("state", &self.state())
            .field("fires", &self.core.fires.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_at, assert_near, settle};
    use tokio::time::{self, Instant};

    const SEC: Duration = Duration::from_secs(1);

    type Log = Rc<RefCell<Vec<Instant>>>;

    fn recording(
        scheduler: &Scheduler,
        interval: Duration,
        repeats: bool,
    ) -> (PausableTimer, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let timer = PausableTimer::new(scheduler, interval, repeats, move |_| {
            sink.borrow_mut().push(Instant::now());
        });
        (timer, log)
    }

    #[tokio::test(start_paused = true)]
    async fn one_shot_fires_once_and_retires() {
        let scheduler = Scheduler::new();
        let (timer, log) = recording(&scheduler, 5 * SEC, false);
        let start = Instant::now();

        assert_eq!(timer.state(), TimerState::Idle);
        assert!(!timer.is_valid());
        timer.start();
        assert!(timer.is_valid());

        scheduler.run_until(time::sleep(20 * SEC)).await;

        assert_eq!(log.borrow().len(), 1);
        assert_at(log.borrow()[0], start, 5 * SEC);
        assert_eq!(timer.state(), TimerState::Retired);
        assert_eq!(timer.fire_count(), 1);
        assert!(!timer.is_valid());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_and_resume_preserve_remaining_time() {
        // interval 10s, pause at 3s, resume at 10s: fires at 17s.
        let scheduler = Scheduler::new();
        let (timer, log) = recording(&scheduler, 10 * SEC, false);
        let start = Instant::now();

        scheduler
            .run_until(async {
                timer.start();
                time::sleep(3 * SEC).await;
                timer.pause();
                assert!(timer.is_paused());
                assert!(timer.is_valid());
                assert_near(timer.remaining().expect("paused"), 7 * SEC);

                time::sleep(7 * SEC).await;
                assert!(log.borrow().is_empty());
                timer.resume();
                assert_eq!(timer.remaining(), None);
                assert_eq!(timer.state(), TimerState::Scheduled);

                time::sleep(20 * SEC).await;
            })
            .await;

        assert_eq!(log.borrow().len(), 1);
        assert_at(log.borrow()[0], start, 17 * SEC);
    }

    #[tokio::test(start_paused = true)]
    async fn pausing_twice_does_not_double_count() {
        let scheduler = Scheduler::new();
        let (timer, _log) = recording(&scheduler, 10 * SEC, false);

        scheduler
            .run_until(async {
                timer.start();
                time::sleep(3 * SEC).await;
                timer.pause();
                time::sleep(2 * SEC).await;
                timer.pause();
                assert_near(timer.remaining().expect("paused"), 7 * SEC);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn misuse_is_a_silent_noop() {
        let scheduler = Scheduler::new();
        let (timer, log) = recording(&scheduler, 2 * SEC, false);

        timer.pause();
        timer.resume();
        assert_eq!(timer.state(), TimerState::Idle);

        timer.start();
        timer.resume();
        timer.start();
        timer.instantly_start();
        assert_eq!(timer.state(), TimerState::Scheduled);
        assert_eq!(timer.remaining(), None);

        scheduler.run_until(time::sleep(5 * SEC)).await;
        assert_eq!(log.borrow().len(), 1);

        timer.start();
        timer.pause();
        timer.resume();
        timer.invalidate();
        assert_eq!(timer.state(), TimerState::Retired);
        scheduler.run_until(time::sleep(5 * SEC)).await;
        assert_eq!(log.borrow().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn repeating_timer_fires_every_interval() {
        let scheduler = Scheduler::new();
        let (timer, log) = recording(&scheduler, 2 * SEC, true);
        let start = Instant::now();

        scheduler
            .run_until(async {
                timer.start();
                time::sleep(Duration::from_millis(10_500)).await;
            })
            .await;

        let fires = log.borrow();
        assert_eq!(fires.len(), 5);
        for (i, at) in fires.iter().enumerate() {
            assert_at(*at, start, 2 * SEC * (i as u32 + 1));
        }
        assert_eq!(timer.state(), TimerState::Scheduled);
        assert_eq!(timer.fire_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn repeating_fire_count_is_floor_of_observed_over_interval() {
        let scheduler = Scheduler::new();
        let (timer, log) = recording(&scheduler, 2 * SEC, true);

        timer.start();
        scheduler.run_until(time::sleep(7 * SEC)).await;
        assert_eq!(log.borrow().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_prevents_fire() {
        let scheduler = Scheduler::new();
        let (timer, log) = recording(&scheduler, 10 * SEC, false);

        scheduler
            .run_until(async {
                timer.start();
                time::sleep(2 * SEC).await;
                timer.invalidate();
                assert!(!timer.is_valid());
                timer.invalidate();
                time::sleep(30 * SEC).await;
            })
            .await;

        assert!(log.borrow().is_empty());
        assert!(!timer.is_valid());
        assert_eq!(timer.state(), TimerState::Retired);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_suppresses_a_fire_already_due() {
        let scheduler = Scheduler::new();
        let (timer, log) = recording(&scheduler, SEC, false);

        timer.start();
        time::advance(3 * SEC).await;
        timer.invalidate();
        scheduler.run_until(settle()).await;

        assert!(log.borrow().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_while_paused_retires() {
        let scheduler = Scheduler::new();
        let (timer, log) = recording(&scheduler, SEC, true);

        timer.start();
        timer.pause();
        timer.invalidate();
        timer.resume();
        scheduler.run_until(time::sleep(5 * SEC)).await;

        assert!(log.borrow().is_empty());
        assert_eq!(timer.remaining(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn pausing_past_deadline_records_zero_and_fires_after_resume() {
        let scheduler = Scheduler::new();
        let (timer, log) = recording(&scheduler, SEC, false);

        timer.start();
        time::advance(3 * SEC).await;
        timer.pause();
        assert_eq!(timer.remaining(), Some(Duration::ZERO));
        assert!(log.borrow().is_empty());

        timer.resume();
        // Nothing runs synchronously; the fire happens once the context is driven.
        assert!(log.borrow().is_empty());
        scheduler.run_until(time::sleep(Duration::from_millis(5))).await;
        assert_eq!(log.borrow().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn instantly_start_runs_handler_now_then_on_schedule() {
        let scheduler = Scheduler::new();
        let (timer, log) = recording(&scheduler, 4 * SEC, false);
        let start = Instant::now();

        timer.instantly_start();
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(timer.state(), TimerState::Scheduled);

        scheduler.run_until(time::sleep(10 * SEC)).await;

        let fires = log.borrow();
        assert_eq!(fires.len(), 2);
        assert_at(fires[0], start, Duration::ZERO);
        assert_at(fires[1], start, 4 * SEC);
        assert_eq!(timer.state(), TimerState::Retired);
    }

    #[tokio::test(start_paused = true)]
    async fn one_shot_handler_observes_retired_timer() {
        let scheduler = Scheduler::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let timer = PausableTimer::scheduled(&scheduler, SEC, false, move |t| {
            t.pause();
            t.resume();
            sink.borrow_mut().push((t.state(), t.is_valid()));
        });

        scheduler.run_until(time::sleep(3 * SEC)).await;

        assert_eq!(*seen.borrow(), vec![(TimerState::Retired, false)]);
        assert_eq!(timer.state(), TimerState::Retired);
    }

    #[tokio::test(start_paused = true)]
    async fn repeating_handler_can_pause_its_own_timer() {
        let scheduler = Scheduler::new();
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let start = Instant::now();
        let timer = PausableTimer::scheduled(&scheduler, 2 * SEC, true, move |t| {
            sink.borrow_mut().push(Instant::now());
            if t.fire_count() == 2 {
                t.pause();
            }
        });

        scheduler
            .run_until(async {
                time::sleep(5 * SEC).await;
                assert!(timer.is_paused());
                assert_eq!(timer.remaining(), Some(2 * SEC));
                time::sleep(5 * SEC).await;
                assert_eq!(log.borrow().len(), 2);
                timer.resume();
                time::sleep(Duration::from_millis(2_500)).await;
            })
            .await;

        let fires = log.borrow();
        assert_eq!(fires.len(), 3);
        assert_at(fires[2], start, 12 * SEC);
    }

    #[tokio::test(start_paused = true)]
    async fn repeating_handler_can_invalidate_its_own_timer() {
        let scheduler = Scheduler::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let timer = PausableTimer::scheduled(&scheduler, SEC, true, move |t| {
            counter.set(counter.get() + 1);
            t.invalidate();
        });

        scheduler.run_until(time::sleep(5 * SEC)).await;

        assert_eq!(hits.get(), 1);
        assert_eq!(timer.state(), TimerState::Retired);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_last_handle_cancels_the_timer() {
        let scheduler = Scheduler::new();
        let (timer, log) = recording(&scheduler, SEC, true);
        let clone = timer.clone();

        timer.start();
        drop(timer);
        scheduler.run_until(time::sleep(Duration::from_millis(1_500))).await;
        assert_eq!(log.borrow().len(), 1);

        drop(clone);
        scheduler.run_until(time::sleep(5 * SEC)).await;
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn starting_without_a_scheduler_retires() {
        let scheduler = Scheduler::new();
        let timer = PausableTimer::new(&scheduler, SEC, false, |_| {});
        drop(scheduler);

        timer.start();
        assert_eq!(timer.state(), TimerState::Retired);
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_lifecycle_events() {
        let scheduler = Scheduler::new();
        let mut rx = scheduler.subscribe_events();
        let timer = PausableTimer::labeled(&scheduler, "poll", 2 * SEC, false, |_| {});

        scheduler
            .run_until(async {
                timer.start();
                time::sleep(SEC).await;
                timer.pause();
                timer.resume();
                time::sleep(2 * SEC).await;
            })
            .await;

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            assert_eq!(ev.timer, Some(timer.id()));
            assert_eq!(ev.label.as_deref(), Some("poll"));
            kinds.push(ev.kind);
        }
        assert_eq!(
            kinds,
            vec![
                EventKind::TimerStarted,
                EventKind::TimerPaused,
                EventKind::TimerResumed,
                EventKind::TimerFired,
                EventKind::TimerRetired,
            ]
        );
    }
}
