//! webgro core
//!
//! Host-agnostic half of the webgro runtime: Allegro-style keyboard and
//! mouse tracking with per-frame edges, the asset readiness barrier, the
//! frame loop and user interrupts on top of a pluggable [`Scheduler`], and
//! the [`Context`] that ties them together. The browser bindings live in
//! `webgro-web`.

pub mod barrier;
pub mod color;
pub mod config;
pub mod context;
pub mod error;
pub mod frame;
pub mod handle;
pub mod input;
pub mod keys;
pub mod math;
pub mod schedule;
pub mod timer;

pub use barrier::{LoadHandle, PendingLoads, Progress, ReadinessBarrier, POLL_INTERVAL};
pub use color::Color;
pub use config::Config;
pub use context::Context;
pub use error::{Error, Result, Subsystem};
pub use frame::FrameDriver;
pub use handle::HandleStore;
pub use input::{Disposition, InputTracker, MotionMode};
pub use keys::KeyCode;
pub use schedule::{ManualScheduler, Scheduler, TaskId};
pub use timer::{InterruptId, Interrupts};
