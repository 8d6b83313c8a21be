//! Single-threaded task scheduling.
//!
//! Everything in webgro runs on one cooperative event loop. The frame loop,
//! the readiness poll and user interrupts are all tasks on a [`Scheduler`];
//! the browser runtime backs it with `setTimeout`/`setInterval`, tests and
//! headless hosts use [`ManualScheduler`] and step a virtual clock.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::Duration;

/// Shortest period a repeating task may have.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Opaque handle of a scheduled task, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Fixed-delay and fixed-interval scheduling primitive provided by the host.
///
/// Implementations must not hold internal borrows while a task runs: tasks
/// routinely schedule follow-ups or cancel themselves.
pub trait Scheduler {
    /// Monotonic time since an arbitrary origin.
    fn now(&self) -> Duration;

    /// Run `task` once after `delay`.
    fn schedule_once(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskId;

    /// Run `task` every `period` until cancelled.
    fn schedule_repeating(&self, period: Duration, task: Box<dyn FnMut()>) -> TaskId;

    /// Cancel a task. Unknown or finished tasks are ignored.
    fn cancel(&self, id: TaskId);
}

enum Job {
    Once(Box<dyn FnOnce()>),
    Repeating {
        period: Duration,
        task: Box<dyn FnMut()>,
    },
}

struct Entry {
    due: Duration,
    job: Job,
}

#[derive(Default)]
struct Queue {
    now: Duration,
    next_id: u64,
    entries: BTreeMap<u64, Entry>,
    running: Option<u64>,
    running_cancelled: bool,
}

impl Queue {
    fn push(&mut self, due: Duration, job: Job) -> TaskId {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.insert(id, Entry { due, job });
        TaskId(id)
    }

    /// Earliest task due at or before `limit`; ties go to the older task.
    fn pop_due(&mut self, limit: Duration) -> Option<(u64, Entry)> {
        let id = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.due <= limit)
            .min_by_key(|(id, entry)| (entry.due, **id))
            .map(|(id, _)| *id)?;
        let entry = self.entries.remove(&id)?;
        self.now = self.now.max(entry.due);
        self.running = Some(id);
        self.running_cancelled = false;
        Some((id, entry))
    }
}

/// Virtual-clock scheduler. Nothing runs until [`ManualScheduler::advance`].
#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<Queue>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `by`, running every task that falls due on
    /// the way in due-time order. Returns the number of task invocations.
    pub fn advance(&self, by: Duration) -> usize {
        let limit = self.queue.borrow().now.saturating_add(by);
        let mut ran = 0;

        loop {
            let next = self.queue.borrow_mut().pop_due(limit);
            let Some((id, Entry { due, job })) = next else {
                break;
            };
            ran += 1;

            match job {
                Job::Once(task) => task(),
                Job::Repeating { period, mut task } => {
                    task();
                    let next_due = due.saturating_add(period);
                    let mut queue = self.queue.borrow_mut();
                    // A task pinned at the end of the clock has run its last.
                    if !queue.running_cancelled && next_due > due {
                        queue.entries.insert(
                            id,
                            Entry {
                                due: next_due,
                                job: Job::Repeating { period, task },
                            },
                        );
                    }
                }
            }
            self.queue.borrow_mut().running = None;
        }

        let mut queue = self.queue.borrow_mut();
        queue.now = queue.now.max(limit);
        ran
    }

    /// Number of tasks still waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.borrow().entries.len()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.queue.borrow().now
    }

    fn schedule_once(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskId {
        let mut queue = self.queue.borrow_mut();
        let due = queue.now.saturating_add(delay);
        queue.push(due, Job::Once(task))
    }

    fn schedule_repeating(&self, period: Duration, task: Box<dyn FnMut()>) -> TaskId {
        let period = period.max(MIN_PERIOD);
        let mut queue = self.queue.borrow_mut();
        let due = queue.now.saturating_add(period);
        queue.push(due, Job::Repeating { period, task })
    }

    fn cancel(&self, id: TaskId) {
        // Dropped outside the borrow: a task's captures may call back in.
        let removed = {
            let mut queue = self.queue.borrow_mut();
            if queue.running == Some(id.0) {
                queue.running_cancelled = true;
            }
            queue.entries.remove(&id.0)
        };
        drop(removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_once_runs_when_due() {
        let sched = ManualScheduler::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        sched.schedule_once(ms(100), Box::new(move || h.set(h.get() + 1)));

        assert_eq!(sched.advance(ms(99)), 0);
        assert_eq!(hits.get(), 0);
        assert_eq!(sched.advance(ms(1)), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(sched.pending(), 0);
        assert_eq!(sched.now(), ms(100));
    }

    #[test]
    fn test_repeating_runs_every_period() {
        let sched = ManualScheduler::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        sched.schedule_repeating(ms(10), Box::new(move || h.set(h.get() + 1)));

        sched.advance(ms(35));
        assert_eq!(hits.get(), 3);
        sched.advance(ms(5));
        assert_eq!(hits.get(), 4);
    }

    #[test]
    fn test_cancel_stops_task() {
        let sched = ManualScheduler::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let id = sched.schedule_repeating(ms(10), Box::new(move || h.set(h.get() + 1)));
        sched.advance(ms(10));
        sched.cancel(id);
        sched.cancel(id);
        sched.advance(ms(100));
        assert_eq!(hits.get(), 1);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn test_task_can_cancel_itself() {
        let sched = Rc::new(ManualScheduler::new());
        let hits = Rc::new(Cell::new(0));
        let own_id: Rc<Cell<Option<TaskId>>> = Rc::new(Cell::new(None));

        let (s, h, own) = (sched.clone(), hits.clone(), own_id.clone());
        let id = sched.schedule_repeating(
            ms(10),
            Box::new(move || {
                h.set(h.get() + 1);
                if h.get() == 2 {
                    if let Some(id) = own.get() {
                        s.cancel(id);
                    }
                }
            }),
        );
        own_id.set(Some(id));

        sched.advance(ms(100));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_task_can_schedule_followup() {
        let sched = Rc::new(ManualScheduler::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let (s, l) = (sched.clone(), log.clone());
        sched.schedule_once(
            ms(10),
            Box::new(move || {
                l.borrow_mut().push(s.now());
                let l2 = l.clone();
                let s2 = s.clone();
                s.schedule_once(ms(10), Box::new(move || l2.borrow_mut().push(s2.now())));
            }),
        );

        sched.advance(ms(25));
        assert_eq!(*log.borrow(), vec![ms(10), ms(20)]);
    }

    #[test]
    fn test_due_order_then_schedule_order() {
        let sched = ManualScheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for (delay, tag) in [(20, 'c'), (10, 'a'), (10, 'b')] {
            let o = order.clone();
            sched.schedule_once(ms(delay), Box::new(move || o.borrow_mut().push(tag)));
        }
        sched.advance(ms(20));
        assert_eq!(*order.borrow(), vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_zero_period_is_raised() {
        let sched = ManualScheduler::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        sched.schedule_repeating(Duration::ZERO, Box::new(move || h.set(h.get() + 1)));
        sched.advance(ms(5));
        assert_eq!(hits.get(), 5);
    }

    #[test]
    fn test_huge_delays_saturate() {
        let sched = ManualScheduler::new();
        let hits = Rc::new(Cell::new(0));
        sched.advance(ms(1));
        let h = hits.clone();
        sched.schedule_once(Duration::MAX, Box::new(move || h.set(h.get() + 1)));
        let h = hits.clone();
        sched.schedule_repeating(Duration::MAX, Box::new(move || h.set(h.get() + 1)));

        sched.advance(Duration::MAX);
        assert_eq!(sched.now(), Duration::MAX);
        assert_eq!(hits.get(), 2);
        assert_eq!(sched.pending(), 0);
    }
}
