//! Timer unit conversions and user interrupts.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::handle::HandleStore;
use crate::schedule::{Scheduler, TaskId, MIN_PERIOD};

/// Longest interval a host timer accepts (2^31 - 1 ms).
pub const MAX_PERIOD: Duration = Duration::from_millis(i32::MAX as u64);

fn millis(ms: f64) -> Duration {
    if ms.is_nan() || ms < 1.0 {
        return MIN_PERIOD;
    }
    Duration::try_from_secs_f64(ms / 1000.0)
        .unwrap_or(MAX_PERIOD)
        .min(MAX_PERIOD)
}

/// Bring a caller-built speed into the range host timers accept.
pub fn clamp_speed(speed: Duration) -> Duration {
    speed.clamp(MIN_PERIOD, MAX_PERIOD)
}

pub fn secs_to_timer(secs: f64) -> Duration {
    millis(secs * 1000.0)
}

pub fn msec_to_timer(msec: f64) -> Duration {
    millis(msec)
}

/// Beats per second.
pub fn bps_to_timer(bps: f64) -> Duration {
    millis(1000.0 / bps)
}

/// Beats per minute.
pub fn bpm_to_timer(bpm: f64) -> Duration {
    millis(60.0 * 1000.0 / bpm)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterruptId(u64);

impl InterruptId {
    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

type Procedure = Rc<RefCell<Box<dyn FnMut()>>>;

struct Installed {
    task: TaskId,
    speed: Duration,
    procedure: Procedure,
}

fn arm(scheduler: &dyn Scheduler, procedure: &Procedure, speed: Duration) -> TaskId {
    let procedure = Rc::clone(procedure);
    scheduler.schedule_repeating(
        speed,
        Box::new(move || {
            // Skip a tick that would re-enter a still-running procedure.
            if let Ok(mut run) = procedure.try_borrow_mut() {
                run();
            }
        }),
    )
}

/// Installed user interrupts. Unlike the frame loop these can be removed
/// one by one, and they never touch input edge state.
pub struct Interrupts {
    scheduler: Rc<dyn Scheduler>,
    installed: HandleStore<Installed>,
}

impl Interrupts {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            installed: HandleStore::new(),
        }
    }

    /// Install `procedure` to run every `msec` milliseconds.
    pub fn install_int(&mut self, procedure: impl FnMut() + 'static, msec: f64) -> InterruptId {
        self.install_int_ex(procedure, msec_to_timer(msec))
    }

    /// Install `procedure` at a speed built with the `*_to_timer` helpers.
    pub fn install_int_ex(
        &mut self,
        procedure: impl FnMut() + 'static,
        speed: Duration,
    ) -> InterruptId {
        let speed = clamp_speed(speed);
        let procedure: Procedure = Rc::new(RefCell::new(Box::new(procedure)));
        let task = arm(self.scheduler.as_ref(), &procedure, speed);
        let id = self.installed.insert(Installed {
            task,
            speed,
            procedure,
        });
        log::info!("Added interrupt #{id} at {} msec intervals", speed.as_millis());
        InterruptId(id)
    }

    /// Re-arm an installed interrupt at a new speed. Returns false if the
    /// interrupt is not installed.
    pub fn adjust_int(&mut self, id: InterruptId, speed: Duration) -> bool {
        let Some(entry) = self.installed.get_mut(id.0) else {
            return false;
        };
        let speed = clamp_speed(speed);
        self.scheduler.cancel(entry.task);
        entry.task = arm(self.scheduler.as_ref(), &entry.procedure, speed);
        entry.speed = speed;
        log::debug!("Interrupt #{} now at {} msec intervals", id.0, speed.as_millis());
        true
    }

    pub fn remove_int(&mut self, id: InterruptId) -> bool {
        match self.installed.remove(id.0) {
            Some(entry) => {
                self.scheduler.cancel(entry.task);
                log::info!("Removing interrupt #{}", id.0);
                true
            }
            None => false,
        }
    }

    pub fn remove_all_ints(&mut self) {
        for entry in self.installed.drain() {
            self.scheduler.cancel(entry.task);
        }
    }

    pub fn speed(&self, id: InterruptId) -> Option<Duration> {
        self.installed.get(id.0).map(|entry| entry.speed)
    }

    pub fn len(&self) -> usize {
        self.installed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ManualScheduler;
    use std::cell::Cell;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_unit_conversions() {
        assert_eq!(secs_to_timer(2.0), ms(2000));
        assert_eq!(msec_to_timer(17.0), ms(17));
        assert_eq!(bps_to_timer(50.0), ms(20));
        assert_eq!(bpm_to_timer(120.0), ms(500));
    }

    #[test]
    fn test_conversions_clamp() {
        assert_eq!(msec_to_timer(0.0), MIN_PERIOD);
        assert_eq!(msec_to_timer(-5.0), MIN_PERIOD);
        assert_eq!(msec_to_timer(f64::NAN), MIN_PERIOD);
        assert_eq!(bps_to_timer(0.0), MAX_PERIOD);
        assert_eq!(secs_to_timer(1e12), MAX_PERIOD);
    }

    fn counting(hits: &Rc<Cell<u32>>) -> impl FnMut() + 'static {
        let hits = hits.clone();
        move || hits.set(hits.get() + 1)
    }

    #[test]
    fn test_install_and_remove() {
        let manual = Rc::new(ManualScheduler::new());
        let mut ints = Interrupts::new(manual.clone());
        let hits = Rc::new(Cell::new(0));
        let id = ints.install_int(counting(&hits), 10.0);

        manual.advance(ms(50));
        assert_eq!(hits.get(), 5);
        assert!(ints.remove_int(id));
        assert!(!ints.remove_int(id));
        manual.advance(ms(50));
        assert_eq!(hits.get(), 5);
        assert!(ints.is_empty());
    }

    #[test]
    fn test_adjust_speed_keeps_procedure() {
        let manual = Rc::new(ManualScheduler::new());
        let mut ints = Interrupts::new(manual.clone());
        let hits = Rc::new(Cell::new(0));
        let id = ints.install_int_ex(counting(&hits), bps_to_timer(100.0));

        manual.advance(ms(100));
        assert_eq!(hits.get(), 10);
        assert!(ints.adjust_int(id, ms(50)));
        assert_eq!(ints.speed(id), Some(ms(50)));
        manual.advance(ms(100));
        assert_eq!(hits.get(), 12);
        assert_eq!(manual.pending(), 1);
    }

    #[test]
    fn test_remove_all() {
        let manual = Rc::new(ManualScheduler::new());
        let mut ints = Interrupts::new(manual.clone());
        let hits = Rc::new(Cell::new(0));
        ints.install_int(counting(&hits), 10.0);
        ints.install_int(counting(&hits), 20.0);
        assert_eq!(ints.len(), 2);
        ints.remove_all_ints();
        manual.advance(ms(100));
        assert_eq!(hits.get(), 0);
        assert_eq!(manual.pending(), 0);
        assert!(!ints.adjust_int(InterruptId::from_raw(1), ms(5)));
    }

    #[test]
    fn test_raw_speeds_are_clamped() {
        let manual = Rc::new(ManualScheduler::new());
        let mut ints = Interrupts::new(manual.clone());
        let hits = Rc::new(Cell::new(0));
        manual.advance(ms(1));
        let id = ints.install_int_ex(counting(&hits), Duration::MAX);
        assert_eq!(ints.speed(id), Some(MAX_PERIOD));

        assert!(ints.adjust_int(id, Duration::ZERO));
        assert_eq!(ints.speed(id), Some(MIN_PERIOD));
        manual.advance(ms(3));
        assert_eq!(hits.get(), 3);
    }
}
