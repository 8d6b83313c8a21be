//! [`Scheduler`] on top of `setTimeout` / `setInterval`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Performance, Window};

use webgro_core::schedule::MIN_PERIOD;
use webgro_core::{Result, Scheduler, TaskId};

use crate::host;

struct Pending {
    handle: i32,
    callback: Closure<dyn FnMut()>,
}

/// Callbacks of fired or cancelled tasks wait in `retired` until the next
/// timer callback starts, since a closure can't be freed while it runs.
struct Timers {
    window: Window,
    performance: Option<Performance>,
    origin: f64,
    next_id: Cell<u64>,
    pending: RefCell<HashMap<u64, Pending>>,
    retired: RefCell<Vec<Closure<dyn FnMut()>>>,
}

impl Timers {
    fn now_ms(&self) -> f64 {
        self.performance.as_ref().map_or_else(js_sys::Date::now, Performance::now)
    }

    fn sweep(&self) {
        let retired = std::mem::take(&mut *self.retired.borrow_mut());
        drop(retired);
    }

    fn retire(&self, id: u64) -> Option<i32> {
        let pending = self.pending.borrow_mut().remove(&id)?;
        self.retired.borrow_mut().push(pending.callback);
        Some(pending.handle)
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }
}

fn millis(d: Duration) -> i32 {
    i32::try_from(d.as_millis()).unwrap_or(i32::MAX)
}

pub struct WebScheduler {
    timers: Rc<Timers>,
}

impl WebScheduler {
    pub fn new() -> Result<Self> {
        let window = host::window()?;
        let performance = window.performance();
        let origin = performance
            .as_ref()
            .map_or_else(js_sys::Date::now, Performance::now);
        Ok(Self {
            timers: Rc::new(Timers {
                window,
                performance,
                origin,
                next_id: Cell::new(0),
                pending: RefCell::new(HashMap::new()),
                retired: RefCell::new(Vec::new()),
            }),
        })
    }

    /// Tasks scheduled and not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.timers.pending.borrow().len()
    }
}

impl Scheduler for WebScheduler {
    fn now(&self) -> Duration {
        let ms = (self.timers.now_ms() - self.timers.origin).max(0.0);
        Duration::from_secs_f64(ms / 1000.0)
    }

    fn schedule_once(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskId {
        let id = self.timers.next_id();
        let timers: Weak<Timers> = Rc::downgrade(&self.timers);
        let mut task = Some(task);
        let callback = Closure::<dyn FnMut()>::new(move || {
            let Some(timers) = timers.upgrade() else {
                return;
            };
            timers.sweep();
            timers.retire(id);
            if let Some(task) = task.take() {
                task();
            }
        });

        match self
            .timers
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                millis(delay),
            ) {
            Ok(handle) => {
                self.timers
                    .pending
                    .borrow_mut()
                    .insert(id, Pending { handle, callback });
            }
            Err(e) => log::warn!("setTimeout failed: {}", host::host_error(e)),
        }
        TaskId::new(id)
    }

    fn schedule_repeating(&self, period: Duration, mut task: Box<dyn FnMut()>) -> TaskId {
        let id = self.timers.next_id();
        let timers: Weak<Timers> = Rc::downgrade(&self.timers);
        let callback = Closure::<dyn FnMut()>::new(move || {
            let Some(timers) = timers.upgrade() else {
                return;
            };
            timers.sweep();
            drop(timers);
            task();
        });

        match self
            .timers
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                millis(period.max(MIN_PERIOD)),
            ) {
            Ok(handle) => {
                self.timers
                    .pending
                    .borrow_mut()
                    .insert(id, Pending { handle, callback });
            }
            Err(e) => log::warn!("setInterval failed: {}", host::host_error(e)),
        }
        TaskId::new(id)
    }

    fn cancel(&self, id: TaskId) {
        // clearTimeout and clearInterval share one handle namespace.
        if let Some(handle) = self.timers.retire(id.raw()) {
            self.timers.window.clear_interval_with_handle(handle);
        }
    }
}

impl Drop for WebScheduler {
    fn drop(&mut self) {
        let pending = std::mem::take(&mut *self.timers.pending.borrow_mut());
        for task in pending.values() {
            self.timers.window.clear_interval_with_handle(task.handle);
        }
    }
}
