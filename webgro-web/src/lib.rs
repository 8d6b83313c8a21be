//! webgro WASM Web Runtime
//!
//! Runs Allegro-style programs on an HTML canvas. Binds the host-agnostic
//! `webgro-core` to the browser: DOM input listeners, a timer-backed
//! scheduler, the 2D canvas, fonts, image and audio loading, a page debug
//! console, and the `Runtime` facade that JavaScript drives.

pub mod debug;
pub mod gfx;
pub mod input;
pub mod sound;

#[cfg(target_arch = "wasm32")]
mod host;
#[cfg(target_arch = "wasm32")]
mod runtime;
#[cfg(target_arch = "wasm32")]
mod scheduler;

#[cfg(target_arch = "wasm32")]
pub use runtime::Runtime;
#[cfg(target_arch = "wasm32")]
pub use scheduler::WebScheduler;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Entry point, called when the WASM module loads. `Runtime::new` raises
/// the log level later if the page's configuration asks for it.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = debug::init(log::Level::Info);
    log::info!("webgro Web Runtime initialized");
}
