//! The runtime context.
//!
//! One [`Context`] owns everything a legacy program treats as global: the
//! input tracker, the pending-load list, the frame loop, interrupts and the
//! set of installed subsystems. Hosts feed events in through it and tear it
//! down explicitly.

use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use crate::barrier::{LoadHandle, PendingLoads, ProgressFn, ReadinessBarrier};
use crate::config::Config;
use crate::error::{Error, Result, Subsystem};
use crate::frame::FrameDriver;
use crate::input::{Disposition, InputTracker};
use crate::keys::KeyCode;
use crate::schedule::Scheduler;
use crate::timer::{InterruptId, Interrupts};

pub struct Context {
    config: Config,
    scheduler: Rc<dyn Scheduler>,
    input: Rc<RefCell<InputTracker>>,
    loads: PendingLoads,
    interrupts: Interrupts,
    frame: Option<FrameDriver>,
    barrier: Option<Rc<ReadinessBarrier>>,
    installed: HashSet<Subsystem>,
}

impl Context {
    pub fn new(config: Config, scheduler: Rc<dyn Scheduler>) -> Self {
        let input = InputTracker::new()
            .with_refresh_key(config.refresh_key)
            .with_motion_mode(config.motion_mode());
        Self {
            interrupts: Interrupts::new(Rc::clone(&scheduler)),
            config,
            scheduler,
            input: Rc::new(RefCell::new(input)),
            loads: PendingLoads::new(),
            frame: None,
            barrier: None,
            installed: HashSet::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scheduler(&self) -> &Rc<dyn Scheduler> {
        &self.scheduler
    }

    pub fn is_installed(&self, subsystem: Subsystem) -> bool {
        self.installed.contains(&subsystem)
    }

    fn mark_installed(&mut self, subsystem: Subsystem) -> Result<()> {
        if !self.installed.insert(subsystem) {
            let err = Error::AlreadyInstalled(subsystem);
            log::warn!("{err}");
            return Err(err);
        }
        log::info!("{} installed!", subsystem.label());
        Ok(())
    }

    fn mark_removed(&mut self, subsystem: Subsystem) -> Result<()> {
        if !self.installed.remove(&subsystem) {
            let err = Error::NotInstalled(subsystem);
            log::warn!("{err}");
            return Err(err);
        }
        log::info!("{} removed!", subsystem.label());
        Ok(())
    }

    // ── Subsystem lifecycle ──

    /// Record whether the host has a drawing surface. Mouse input depends on it.
    pub fn set_graphics_installed(&mut self, installed: bool) {
        if installed {
            if self.installed.insert(Subsystem::Graphics) {
                log::info!("Graphics mode set to {}x{}", self.config.width, self.config.height);
            }
        } else {
            self.installed.remove(&Subsystem::Graphics);
        }
    }

    pub fn install_keyboard(&mut self) -> Result<()> {
        self.mark_installed(Subsystem::Keyboard)?;
        self.input.borrow_mut().clear_keyboard();
        Ok(())
    }

    pub fn remove_keyboard(&mut self) -> Result<()> {
        self.mark_removed(Subsystem::Keyboard)
    }

    /// Fails with [`Error::GraphicsRequired`] until the drawing surface exists.
    pub fn install_mouse(&mut self) -> Result<()> {
        if !self.is_installed(Subsystem::Graphics) {
            let err = Error::GraphicsRequired(Subsystem::Mouse);
            log::warn!("{err}");
            return Err(err);
        }
        self.mark_installed(Subsystem::Mouse)?;
        self.input.borrow_mut().clear_mouse();
        Ok(())
    }

    pub fn remove_mouse(&mut self) -> Result<()> {
        self.mark_removed(Subsystem::Mouse)
    }

    pub fn install_timer(&mut self) -> Result<()> {
        self.mark_installed(Subsystem::Timer)
    }

    /// Also stops the frame loop and every interrupt.
    pub fn remove_timer(&mut self) -> Result<()> {
        self.mark_removed(Subsystem::Timer)?;
        self.stop_loop();
        self.interrupts.remove_all_ints();
        Ok(())
    }

    pub fn install_sound(&mut self) -> Result<()> {
        self.mark_installed(Subsystem::Sound)
    }

    pub fn remove_sound(&mut self) -> Result<()> {
        self.mark_removed(Subsystem::Sound)
    }

    // ── Event ingestion ──

    /// Keyboard events are ignored, and left to the host, while the
    /// keyboard is not installed.
    pub fn key_down(&self, code: KeyCode) -> Disposition {
        if !self.is_installed(Subsystem::Keyboard) {
            return Disposition::PassThrough;
        }
        log::trace!("key down {code:#04x}");
        self.input.borrow_mut().on_key_down(code)
    }

    pub fn key_up(&self, code: KeyCode) -> Disposition {
        if !self.is_installed(Subsystem::Keyboard) {
            return Disposition::PassThrough;
        }
        log::trace!("key up {code:#04x}");
        self.input.borrow_mut().on_key_up(code)
    }

    pub fn mouse_down(&self, button: u32) {
        if self.is_installed(Subsystem::Mouse) {
            self.input.borrow_mut().on_mouse_down(button);
        }
    }

    pub fn mouse_up(&self, button: u32) {
        if self.is_installed(Subsystem::Mouse) {
            self.input.borrow_mut().on_mouse_up(button);
        }
    }

    pub fn mouse_move(&self, x: f64, y: f64, dx: f64, dy: f64) {
        if self.is_installed(Subsystem::Mouse) {
            self.input.borrow_mut().on_mouse_move(x, y, dx, dy);
        }
    }

    pub fn wheel(&self, delta_y: f64) {
        if self.is_installed(Subsystem::Mouse) {
            self.input.borrow_mut().on_wheel(delta_y);
        }
    }

    pub fn input(&self) -> Ref<'_, InputTracker> {
        self.input.borrow()
    }

    pub fn input_handle(&self) -> Rc<RefCell<InputTracker>> {
        Rc::clone(&self.input)
    }

    // ── Loading ──

    pub fn loads(&self) -> &PendingLoads {
        &self.loads
    }

    /// Register a new asynchronous load; the host marks it ready.
    pub fn track_load(&self, label: impl Into<String>) -> LoadHandle {
        self.loads.track(label)
    }

    /// Wait until every registered load is ready, then run `on_complete`.
    /// A barrier still waiting from an earlier call is stopped first.
    pub fn ready(
        &mut self,
        on_complete: impl FnOnce() + 'static,
        on_progress: Option<ProgressFn>,
    ) -> Rc<ReadinessBarrier> {
        if let Some(previous) = self.barrier.take() {
            previous.stop();
        }
        let barrier = ReadinessBarrier::start(
            &self.scheduler,
            self.loads.clone(),
            Box::new(on_complete),
            on_progress,
        );
        self.barrier = Some(Rc::clone(&barrier));
        barrier
    }

    pub fn barrier(&self) -> Option<&Rc<ReadinessBarrier>> {
        self.barrier.as_ref()
    }

    // ── Frame loop and interrupts ──

    /// Start the frame loop. Only one may run at a time.
    pub fn run_loop(
        &mut self,
        period: Duration,
        update: impl FnMut(&InputTracker) + 'static,
    ) -> Result<()> {
        if self.frame.as_ref().is_some_and(FrameDriver::is_running) {
            let err = Error::AlreadyInstalled(Subsystem::Timer);
            log::warn!("Game loop already running");
            return Err(err);
        }
        self.frame = Some(FrameDriver::start(
            &self.scheduler,
            Rc::clone(&self.input),
            period,
            update,
        ));
        Ok(())
    }

    /// [`Context::run_loop`] at the configured frame interval.
    pub fn run_default_loop(&mut self, update: impl FnMut(&InputTracker) + 'static) -> Result<()> {
        let period = self.config.frame_interval();
        self.run_loop(period, update)
    }

    pub fn stop_loop(&mut self) {
        if let Some(frame) = self.frame.take() {
            frame.stop();
        }
    }

    pub fn frame_driver(&self) -> Option<&FrameDriver> {
        self.frame.as_ref()
    }

    pub fn install_int(&mut self, procedure: impl FnMut() + 'static, msec: f64) -> InterruptId {
        self.interrupts.install_int(procedure, msec)
    }

    pub fn install_int_ex(
        &mut self,
        procedure: impl FnMut() + 'static,
        speed: Duration,
    ) -> InterruptId {
        self.interrupts.install_int_ex(procedure, speed)
    }

    pub fn adjust_int(&mut self, id: InterruptId, speed: Duration) -> bool {
        self.interrupts.adjust_int(id, speed)
    }

    pub fn remove_int(&mut self, id: InterruptId) -> bool {
        self.interrupts.remove_int(id)
    }

    pub fn remove_all_ints(&mut self) {
        self.interrupts.remove_all_ints();
    }

    pub fn interrupts(&self) -> &Interrupts {
        &self.interrupts
    }

    /// Stop the frame loop, the readiness poll and every interrupt, and
    /// uninstall every subsystem. Calling it again does nothing.
    pub fn teardown(&mut self) {
        self.stop_loop();
        if let Some(barrier) = self.barrier.take() {
            barrier.stop();
        }
        self.interrupts.remove_all_ints();
        if !self.installed.is_empty() {
            self.installed.clear();
            let mut input = self.input.borrow_mut();
            input.clear_keyboard();
            input.clear_mouse();
            log::info!("Context torn down");
        }
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.teardown();
    }
}
