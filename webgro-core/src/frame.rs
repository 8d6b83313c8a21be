use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::input::InputTracker;
use crate::schedule::{Scheduler, TaskId};

/// The game loop: a repeating task that hands the application one frame's
/// worth of input, then clears the edge state for the next frame.
pub struct FrameDriver {
    scheduler: Weak<dyn Scheduler>,
    task: Cell<Option<TaskId>>,
    frames: Rc<Cell<u64>>,
    period: Duration,
}

impl FrameDriver {
    /// Start ticking every `period`. Per tick the order is fixed: `update`
    /// reads the input, then the edges are reset.
    ///
    /// `update` sees a snapshot taken before it runs. Events ingested while
    /// it runs (a synchronous `dispatchEvent`, say) update the live tracker,
    /// so their level state survives, but their edges are wiped by the reset
    /// that follows and no frame ever observes them.
    pub fn start(
        scheduler: &Rc<dyn Scheduler>,
        input: Rc<RefCell<InputTracker>>,
        period: Duration,
        mut update: impl FnMut(&InputTracker) + 'static,
    ) -> Self {
        let frames = Rc::new(Cell::new(0u64));
        let counter = Rc::clone(&frames);
        let id = scheduler.schedule_repeating(
            period,
            Box::new(move || {
                // Snapshot, so `update` may feed or clear the tracker itself.
                let frame = input.borrow().clone();
                update(&frame);
                input.borrow_mut().reset_frame_edges();
                counter.set(counter.get() + 1);
            }),
        );
        log::info!("Game loop initialised at {} ms", period.as_millis());

        Self {
            scheduler: Rc::downgrade(scheduler),
            task: Cell::new(Some(id)),
            frames,
            period,
        }
    }

    /// Cancel the loop. Safe to call more than once, or from inside `update`.
    pub fn stop(&self) {
        let Some(id) = self.task.take() else {
            return;
        };
        if let Some(scheduler) = self.scheduler.upgrade() {
            scheduler.cancel(id);
        }
        log::info!("Game loop stopped after {} frames", self.frames.get());
    }

    pub fn is_running(&self) -> bool {
        self.task.get().is_some()
    }

    /// Completed frames.
    pub fn frames(&self) -> u64 {
        self.frames.get()
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KEY_A;
    use crate::schedule::ManualScheduler;

    fn setup() -> (Rc<ManualScheduler>, Rc<dyn Scheduler>, Rc<RefCell<InputTracker>>) {
        let manual = Rc::new(ManualScheduler::new());
        let scheduler: Rc<dyn Scheduler> = manual.clone();
        (manual, scheduler, Rc::new(RefCell::new(InputTracker::new())))
    }

    #[test]
    fn test_update_sees_edges_then_reset() {
        let (manual, scheduler, input) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let driver = FrameDriver::start(&scheduler, input.clone(), Duration::from_millis(16), move |i| {
            s.borrow_mut().push((i.key(KEY_A), i.key_pressed(KEY_A)));
        });

        input.borrow_mut().on_key_down(KEY_A);
        manual.advance(Duration::from_millis(16));
        manual.advance(Duration::from_millis(16));

        assert_eq!(*seen.borrow(), vec![(true, true), (true, false)]);
        assert_eq!(driver.frames(), 2);
        assert!(!input.borrow().key_pressed(KEY_A));
    }

    #[test]
    fn test_event_between_ticks_lands_in_next_frame() {
        let (manual, scheduler, input) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let _driver = FrameDriver::start(&scheduler, input.clone(), Duration::from_millis(10), move |i| {
            s.borrow_mut().push(i.key_released(KEY_A));
        });

        manual.advance(Duration::from_millis(10));
        input.borrow_mut().on_key_down(KEY_A);
        input.borrow_mut().on_key_up(KEY_A);
        manual.advance(Duration::from_millis(10));
        manual.advance(Duration::from_millis(10));
        assert_eq!(*seen.borrow(), vec![false, true, false]);
    }

    #[test]
    fn test_edge_ingested_during_update_is_lost() {
        let (manual, scheduler, input) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (s, live) = (seen.clone(), input.clone());
        let _driver = FrameDriver::start(&scheduler, input.clone(), Duration::from_millis(10), move |i| {
            s.borrow_mut().push((i.key(KEY_A), i.key_pressed(KEY_A)));
            if !i.key(KEY_A) {
                live.borrow_mut().on_key_down(KEY_A);
            }
        });

        manual.advance(Duration::from_millis(20));
        assert_eq!(*seen.borrow(), vec![(false, false), (true, false)]);
        assert!(input.borrow().key(KEY_A));
    }

    #[test]
    fn test_stop_cancels_loop() {
        let (manual, scheduler, input) = setup();
        let driver = FrameDriver::start(&scheduler, input, Duration::from_millis(10), |_| {});
        manual.advance(Duration::from_millis(30));
        assert_eq!(driver.frames(), 3);
        driver.stop();
        driver.stop();
        assert!(!driver.is_running());
        manual.advance(Duration::from_millis(100));
        assert_eq!(driver.frames(), 3);
        assert_eq!(manual.pending(), 0);
    }
}
