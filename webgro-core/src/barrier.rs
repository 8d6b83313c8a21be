//! Asynchronous readiness barrier.
//!
//! Every asynchronous load (image, audio) registers a [`LoadHandle`] in the
//! shared [`PendingLoads`] list. A [`ReadinessBarrier`] then polls that list
//! on a fixed delay, reports progress, and runs its continuation once every
//! handle is ready. A load that never completes stalls the barrier forever;
//! there is no timeout.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::schedule::{Scheduler, TaskId};

/// Delay between two readiness polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub type ProgressFn = Box<dyn FnMut(f64)>;
pub type CompleteFn = Box<dyn FnOnce()>;

#[derive(Debug)]
struct LoadSlot {
    label: String,
    ready: Cell<bool>,
}

/// One pending asynchronous load. Clones share the same ready flag.
#[derive(Debug, Clone)]
pub struct LoadHandle {
    slot: Rc<LoadSlot>,
}

impl LoadHandle {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            slot: Rc::new(LoadSlot {
                label: label.into(),
                ready: Cell::new(false),
            }),
        }
    }

    pub fn label(&self) -> &str {
        &self.slot.label
    }

    pub fn is_ready(&self) -> bool {
        self.slot.ready.get()
    }

    /// Called from the load's own completion notification. Ready never
    /// goes back to false.
    pub fn mark_ready(&self) {
        self.slot.ready.set(true);
    }
}

/// Snapshot of how many registered loads have finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub ready: usize,
    pub total: usize,
}

impl Progress {
    /// Fraction in 0.0..=1.0. Nothing registered counts as fully loaded.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.ready as f64 / self.total as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.ready >= self.total
    }
}

/// Ordered, live-extendable list of pending loads. Clones share the list.
#[derive(Debug, Clone, Default)]
pub struct PendingLoads {
    handles: Rc<RefCell<Vec<LoadHandle>>>,
}

impl PendingLoads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handle. Loads registered while a barrier is already polling
    /// are picked up by its next poll.
    pub fn register(&self, handle: LoadHandle) {
        log::debug!("Registered pending load {}", handle.label());
        self.handles.borrow_mut().push(handle);
    }

    /// Create and register a handle in one go.
    pub fn track(&self, label: impl Into<String>) -> LoadHandle {
        let handle = LoadHandle::new(label);
        self.register(handle.clone());
        handle
    }

    pub fn total(&self) -> usize {
        self.handles.borrow().len()
    }

    pub fn ready_count(&self) -> usize {
        self.handles.borrow().iter().filter(|h| h.is_ready()).count()
    }

    pub fn progress(&self) -> Progress {
        let handles = self.handles.borrow();
        Progress {
            ready: handles.iter().filter(|h| h.is_ready()).count(),
            total: handles.len(),
        }
    }

    /// Drop finished loads from the list. Outstanding ones stay, so a later
    /// barrier only waits on what is still loading.
    pub fn prune_ready(&self) {
        self.handles.borrow_mut().retain(|h| !h.is_ready());
    }

    /// Labels of loads that have not finished yet.
    pub fn outstanding(&self) -> Vec<String> {
        self.handles
            .borrow()
            .iter()
            .filter(|h| !h.is_ready())
            .map(|h| h.label().to_string())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Waiting,
    Complete,
    Stopped,
}

/// Result of one poll tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome {
    /// Some loads are still outstanding; poll again later.
    Pending(Progress),
    /// Everything is loaded and the continuation has run.
    Complete(Progress),
    /// The barrier already completed or was stopped; nothing happened.
    Inert,
}

/// Waits for every registered load, then runs `on_complete` exactly once.
///
/// State lives in cells so callbacks may call back into the barrier (for
/// example [`ReadinessBarrier::stop`]) while a poll is in progress.
pub struct ReadinessBarrier {
    loads: PendingLoads,
    started_at: Duration,
    phase: Cell<Phase>,
    on_progress: Cell<Option<ProgressFn>>,
    on_complete: Cell<Option<CompleteFn>>,
    scheduler: Option<Weak<dyn Scheduler>>,
    next_poll: Cell<Option<TaskId>>,
    polls: Cell<u32>,
}

impl ReadinessBarrier {
    /// Barrier driven by explicit [`ReadinessBarrier::poll`] calls.
    pub fn new(
        loads: PendingLoads,
        started_at: Duration,
        on_complete: CompleteFn,
        on_progress: Option<ProgressFn>,
    ) -> Self {
        Self {
            loads,
            started_at,
            phase: Cell::new(Phase::Waiting),
            on_progress: Cell::new(on_progress),
            on_complete: Cell::new(Some(on_complete)),
            scheduler: None,
            next_poll: Cell::new(None),
            polls: Cell::new(0),
        }
    }

    /// Record the start time, store the callbacks and schedule the first
    /// poll one [`POLL_INTERVAL`] from now. Each pending poll reschedules
    /// the next one until completion or [`ReadinessBarrier::stop`].
    pub fn start(
        scheduler: &Rc<dyn Scheduler>,
        loads: PendingLoads,
        on_complete: CompleteFn,
        on_progress: Option<ProgressFn>,
    ) -> Rc<Self> {
        let mut barrier = Self::new(loads, scheduler.now(), on_complete, on_progress);
        barrier.scheduler = Some(Rc::downgrade(scheduler));
        let barrier = Rc::new(barrier);
        log::info!("Loader initialised, {} pending loads", barrier.loads.total());
        barrier.schedule_next(scheduler);
        barrier
    }

    fn schedule_next(self: &Rc<Self>, scheduler: &Rc<dyn Scheduler>) {
        let barrier = Rc::clone(self);
        let weak_scheduler = Rc::downgrade(scheduler);
        let id = scheduler.schedule_once(
            POLL_INTERVAL,
            Box::new(move || {
                barrier.next_poll.set(None);
                if let PollOutcome::Pending(_) = barrier.poll() {
                    if let Some(scheduler) = weak_scheduler.upgrade() {
                        barrier.schedule_next(&scheduler);
                    }
                }
            }),
        );
        self.next_poll.set(Some(id));
    }

    /// One poll tick: report progress, then complete if everything is ready.
    pub fn poll(&self) -> PollOutcome {
        if self.phase.get() != Phase::Waiting {
            return PollOutcome::Inert;
        }
        self.polls.set(self.polls.get() + 1);

        let progress = self.loads.progress();
        log::debug!("Loading {}/{}", progress.ready, progress.total);

        if let Some(mut report) = self.on_progress.take() {
            report(progress.fraction());
            // The progress callback may have stopped us.
            if self.phase.get() != Phase::Waiting {
                return PollOutcome::Inert;
            }
            self.on_progress.set(Some(report));
        }
        if !progress.is_complete() {
            return PollOutcome::Pending(progress);
        }

        self.phase.set(Phase::Complete);
        if let Some(scheduler) = self.scheduler.as_ref().and_then(Weak::upgrade) {
            let took = scheduler.now().saturating_sub(self.started_at);
            log::info!("Loading complete! Took {:.1} seconds", took.as_secs_f64());
        } else {
            log::info!("Loading complete!");
        }
        self.on_progress.set(None);
        self.loads.prune_ready();
        if let Some(done) = self.on_complete.take() {
            done();
        }
        PollOutcome::Complete(progress)
    }

    /// Cancel the outstanding poll. The continuation will never run.
    pub fn stop(&self) {
        if self.phase.get() == Phase::Waiting {
            self.phase.set(Phase::Stopped);
            log::info!("Loader stopped");
        }
        if let Some(id) = self.next_poll.take() {
            if let Some(scheduler) = self.scheduler.as_ref().and_then(Weak::upgrade) {
                scheduler.cancel(id);
            }
        }
        self.on_progress.set(None);
        drop(self.on_complete.take());
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub fn is_complete(&self) -> bool {
        self.phase.get() == Phase::Complete
    }

    pub fn started_at(&self) -> Duration {
        self.started_at
    }

    pub fn polls(&self) -> u32 {
        self.polls.get()
    }

    pub fn loads(&self) -> &PendingLoads {
        &self.loads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ManualScheduler;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    struct Probe {
        progress: Rc<RefCell<Vec<f64>>>,
        completions: Rc<Cell<u32>>,
    }

    impl Probe {
        fn new() -> Self {
            Self {
                progress: Rc::new(RefCell::new(Vec::new())),
                completions: Rc::new(Cell::new(0)),
            }
        }

        fn callbacks(&self) -> (CompleteFn, Option<ProgressFn>) {
            let done = self.completions.clone();
            let seen = self.progress.clone();
            (
                Box::new(move || done.set(done.get() + 1)),
                Some(Box::new(move |f: f64| seen.borrow_mut().push(f))),
            )
        }
    }

    #[test]
    fn test_three_loads_scenario() {
        let loads = PendingLoads::new();
        let handles: Vec<_> = (0..3).map(|i| loads.track(format!("asset{i}"))).collect();
        let probe = Probe::new();
        let (done, report) = probe.callbacks();
        let barrier = ReadinessBarrier::new(loads.clone(), Duration::ZERO, done, report);

        handles[0].mark_ready();
        handles[1].mark_ready();
        let outcome = barrier.poll();
        assert_eq!(outcome, PollOutcome::Pending(Progress { ready: 2, total: 3 }));
        assert!(approx_eq(probe.progress.borrow()[0], 2.0 / 3.0));
        assert_eq!(probe.completions.get(), 0);

        handles[2].mark_ready();
        let outcome = barrier.poll();
        assert_eq!(outcome, PollOutcome::Complete(Progress { ready: 3, total: 3 }));
        assert!(approx_eq(probe.progress.borrow()[1], 1.0));
        assert_eq!(probe.completions.get(), 1);

        assert_eq!(barrier.poll(), PollOutcome::Inert);
        assert_eq!(probe.completions.get(), 1);
        assert_eq!(probe.progress.borrow().len(), 2);
    }

    #[test]
    fn test_completion_prunes_finished_loads() {
        let loads = PendingLoads::new();
        let first = loads.track("first");
        first.mark_ready();
        let probe = Probe::new();
        let (done, report) = probe.callbacks();
        let barrier = ReadinessBarrier::new(loads.clone(), Duration::ZERO, done, report);
        assert!(matches!(barrier.poll(), PollOutcome::Complete(_)));
        assert_eq!(loads.total(), 0);
        assert!(first.is_ready());

        let second = loads.track("second");
        let probe = Probe::new();
        let (done, report) = probe.callbacks();
        let next = ReadinessBarrier::new(loads.clone(), Duration::ZERO, done, report);
        assert_eq!(next.poll(), PollOutcome::Pending(Progress { ready: 0, total: 1 }));
        second.mark_ready();
        assert_eq!(next.poll(), PollOutcome::Complete(Progress { ready: 1, total: 1 }));
    }

    #[test]
    fn test_zero_pending_completes_on_first_poll() {
        let probe = Probe::new();
        let (done, report) = probe.callbacks();
        let barrier = ReadinessBarrier::new(PendingLoads::new(), Duration::ZERO, done, report);
        assert_eq!(
            barrier.poll(),
            PollOutcome::Complete(Progress { ready: 0, total: 0 })
        );
        assert_eq!(*probe.progress.borrow(), vec![1.0]);
        assert_eq!(probe.completions.get(), 1);
    }

    #[test]
    fn test_progress_is_monotonic() {
        let loads = PendingLoads::new();
        let handles: Vec<_> = (0..4).map(|i| loads.track(format!("a{i}"))).collect();
        let probe = Probe::new();
        let (done, report) = probe.callbacks();
        let barrier = ReadinessBarrier::new(loads, Duration::ZERO, done, report);

        for h in &handles {
            barrier.poll();
            h.mark_ready();
            h.mark_ready();
        }
        barrier.poll();

        let seen = probe.progress.borrow();
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(probe.completions.get(), 1);
    }

    #[test]
    fn test_scheduled_polling() {
        let manual = Rc::new(ManualScheduler::new());
        let scheduler: Rc<dyn Scheduler> = manual.clone();
        let loads = PendingLoads::new();
        let img = loads.track("img.png");
        let probe = Probe::new();
        let (done, report) = probe.callbacks();

        let barrier = ReadinessBarrier::start(&scheduler, loads.clone(), done, report);
        manual.advance(Duration::from_millis(99));
        assert_eq!(barrier.polls(), 0);
        manual.advance(Duration::from_millis(1));
        assert_eq!(barrier.polls(), 1);
        assert_eq!(*probe.progress.borrow(), vec![0.0]);

        manual.advance(Duration::from_millis(300));
        assert_eq!(barrier.polls(), 4);
        assert_eq!(probe.completions.get(), 0);

        img.mark_ready();
        manual.advance(Duration::from_millis(100));
        assert!(barrier.is_complete());
        assert_eq!(probe.completions.get(), 1);
        assert_eq!(manual.pending(), 0);

        manual.advance(Duration::from_secs(1));
        assert_eq!(barrier.polls(), 5);
    }

    #[test]
    fn test_late_registration_is_honoured() {
        let manual = Rc::new(ManualScheduler::new());
        let scheduler: Rc<dyn Scheduler> = manual.clone();
        let loads = PendingLoads::new();
        let first = loads.track("first");
        let probe = Probe::new();
        let (done, report) = probe.callbacks();
        let barrier = ReadinessBarrier::start(&scheduler, loads.clone(), done, report);

        manual.advance(POLL_INTERVAL);
        let late = loads.track("late");
        first.mark_ready();
        manual.advance(POLL_INTERVAL);
        assert!(!barrier.is_complete());
        assert_eq!(loads.outstanding(), vec!["late".to_string()]);

        late.mark_ready();
        manual.advance(POLL_INTERVAL);
        assert!(barrier.is_complete());
    }

    #[test]
    fn test_stop_cancels_outstanding_poll() {
        let manual = Rc::new(ManualScheduler::new());
        let scheduler: Rc<dyn Scheduler> = manual.clone();
        let loads = PendingLoads::new();
        let handle = loads.track("never");
        let probe = Probe::new();
        let (done, report) = probe.callbacks();
        let barrier = ReadinessBarrier::start(&scheduler, loads, done, report);

        manual.advance(POLL_INTERVAL);
        barrier.stop();
        assert_eq!(barrier.phase(), Phase::Stopped);
        assert_eq!(manual.pending(), 0);

        handle.mark_ready();
        manual.advance(Duration::from_secs(1));
        assert_eq!(barrier.poll(), PollOutcome::Inert);
        assert_eq!(probe.completions.get(), 0);
    }

    #[test]
    fn test_stop_from_progress_callback() {
        let loads = PendingLoads::new();
        loads.track("pending");
        let barrier: Rc<RefCell<Option<Rc<ReadinessBarrier>>>> = Rc::new(RefCell::new(None));
        let hook = barrier.clone();
        let b = Rc::new(ReadinessBarrier::new(
            loads,
            Duration::ZERO,
            Box::new(|| {
                panic!("must not complete");
            }),
            Some(Box::new(move |_: f64| {
                if let Some(b) = hook.borrow().as_ref() {
                    b.stop();
                }
            })),
        ));
        *barrier.borrow_mut() = Some(b.clone());
        assert_eq!(b.poll(), PollOutcome::Inert);
        assert_eq!(b.phase(), Phase::Stopped);
    }
}
