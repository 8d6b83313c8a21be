use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::prelude::*;

use webgro_core::barrier::ProgressFn;
use webgro_core::timer::msec_to_timer;
use webgro_core::{color, Config, Context, Error, InterruptId, Scheduler};

use crate::gfx::{self, Bitmap, Font};
use crate::host::js_error;
use crate::input::{attach_keyboard, attach_mouse, Listener};
use crate::scheduler::WebScheduler;
use crate::sound::{Mixer, Sample};

type JsResult<T> = Result<T, JsValue>;

fn call0(f: &Function, what: &str) {
    if let Err(e) = f.call0(&JsValue::NULL) {
        log::warn!("{what} callback threw: {e:?}");
    }
}

/// The Allegro-style API as seen from JavaScript.
#[wasm_bindgen]
pub struct Runtime {
    ctx: Rc<RefCell<Context>>,
    screen: Option<Bitmap>,
    font: Option<Font>,
    fonts_loaded: u32,
    keyboard: Vec<Listener>,
    mouse: Vec<Listener>,
    mixer: Rc<Mixer>,
}

#[wasm_bindgen]
impl Runtime {
    /// Create a runtime from an optional TOML configuration string.
    #[wasm_bindgen(constructor)]
    pub fn new(config_toml: Option<String>) -> JsResult<Runtime> {
        let config = match config_toml {
            Some(source) => Config::from_toml_str(&source).map_err(js_error)?,
            None => Config::default(),
        };
        Self::from_config(config).map_err(js_error)
    }

    /// Runtime on the canvas `canvas_id` with default settings otherwise.
    pub fn with_canvas(canvas_id: String, width: u32, height: u32) -> JsResult<Runtime> {
        let config = Config {
            canvas_id,
            width,
            height,
            ..Config::default()
        };
        Self::from_config(config).map_err(js_error)
    }

    /// Set up graphics on the configured canvas, then install mouse,
    /// keyboard, timer and sound.
    pub fn init_all(&mut self) -> JsResult<()> {
        self.set_gfx_mode()?;
        self.install_mouse()?;
        self.install_keyboard()?;
        self.install_timer()?;
        self.install_sound()
    }

    /// Attach the screen canvas and register the default font.
    pub fn set_gfx_mode(&mut self) -> JsResult<()> {
        let (id, w, h, font_url) = {
            let ctx = self.ctx.borrow();
            let config = ctx.config();
            (config.canvas_id.clone(), config.width, config.height, config.font_url.clone())
        };
        let screen = Bitmap::attach(&id, w, h).map_err(|e| {
            log::warn!("{e}");
            js_error(e)
        })?;
        self.screen = Some(screen);
        if self.font.is_none() {
            let loaded = match font_url.as_str() {
                "" => None,
                url => self
                    .load_font(url)
                    .map_err(|e| log::warn!("Default font {url} not registered: {e:?}"))
                    .ok(),
            };
            self.font = Some(loaded.unwrap_or_else(|| Font::from_family("monospace".to_string())));
        }
        self.ctx.borrow_mut().set_graphics_installed(true);
        Ok(())
    }

    /// The screen bitmap, once graphics are set up.
    pub fn screen(&self) -> Option<Bitmap> {
        self.screen.clone()
    }

    /// The default font, once graphics are set up.
    pub fn font(&self) -> Option<Font> {
        self.font.clone()
    }

    pub fn install_keyboard(&mut self) -> JsResult<()> {
        self.ctx.borrow_mut().install_keyboard().map_err(js_error)?;
        match attach_keyboard(&self.ctx) {
            Ok(listeners) => {
                self.keyboard = listeners;
                Ok(())
            }
            Err(e) => {
                let _ = self.ctx.borrow_mut().remove_keyboard();
                Err(js_error(e))
            }
        }
    }

    pub fn remove_keyboard(&mut self) -> JsResult<()> {
        self.ctx.borrow_mut().remove_keyboard().map_err(js_error)?;
        self.keyboard.clear();
        Ok(())
    }

    /// Requires [`Runtime::set_gfx_mode`] first.
    pub fn install_mouse(&mut self) -> JsResult<()> {
        self.ctx.borrow_mut().install_mouse().map_err(js_error)?;
        let attached = match &self.screen {
            Some(screen) => attach_mouse(screen.element(), &self.ctx),
            None => Err(Error::GraphicsRequired(webgro_core::Subsystem::Mouse)),
        };
        match attached {
            Ok(listeners) => {
                self.mouse = listeners;
                Ok(())
            }
            Err(e) => {
                let _ = self.ctx.borrow_mut().remove_mouse();
                Err(js_error(e))
            }
        }
    }

    pub fn remove_mouse(&mut self) -> JsResult<()> {
        self.ctx.borrow_mut().remove_mouse().map_err(js_error)?;
        self.mouse.clear();
        Ok(())
    }

    pub fn install_timer(&mut self) -> JsResult<()> {
        self.ctx.borrow_mut().install_timer().map_err(js_error)
    }

    pub fn remove_timer(&mut self) -> JsResult<()> {
        self.ctx.borrow_mut().remove_timer().map_err(js_error)
    }

    pub fn install_sound(&mut self) -> JsResult<()> {
        self.ctx.borrow_mut().install_sound().map_err(js_error)
    }

    pub fn remove_sound(&mut self) -> JsResult<()> {
        self.ctx.borrow_mut().remove_sound().map_err(js_error)
    }

    // ── Assets ──

    pub fn create_bitmap(&self, width: u32, height: u32) -> JsResult<Bitmap> {
        Bitmap::create(width, height).map_err(js_error)
    }

    /// Start loading an image. Wait for it with [`Runtime::ready`].
    pub fn load_bitmap(&self, url: &str) -> JsResult<Bitmap> {
        gfx::load_bitmap(url, self.ctx.borrow().loads()).map_err(js_error)
    }

    /// Start loading an audio file. Wait for it with [`Runtime::ready`].
    pub fn load_sample(&self, url: &str) -> JsResult<Sample> {
        self.mixer
            .load_sample(url, self.ctx.borrow().loads())
            .map_err(js_error)
    }

    /// Register a font file with the page under a fresh family name.
    pub fn load_font(&mut self, url: &str) -> JsResult<Font> {
        let font = gfx::load_font(url, self.fonts_loaded).map_err(js_error)?;
        self.fonts_loaded += 1;
        Ok(font)
    }

    pub fn destroy_sample(&self, sample: &Sample) {
        sample.destroy();
    }

    pub fn set_volume(&self, volume: f64) {
        self.mixer.set_volume(volume);
    }

    pub fn get_volume(&self) -> f64 {
        self.mixer.get_volume()
    }

    /// Call `on_complete` once every pending load has finished. Progress
    /// goes to `on_progress(fraction)`, or to the default loading bar on
    /// the screen when omitted.
    pub fn ready(&mut self, on_complete: Function, on_progress: Option<Function>) {
        let progress: Option<ProgressFn> = match (on_progress, self.screen.clone()) {
            (Some(f), _) => Some(Box::new(move |fraction: f64| {
                if let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_f64(fraction)) {
                    log::warn!("progress callback threw: {e:?}");
                }
            })),
            (None, Some(screen)) => Some(Box::new(move |fraction: f64| {
                screen.draw_loading_bar(fraction);
            })),
            (None, None) => None,
        };
        self.ctx
            .borrow_mut()
            .ready(move || call0(&on_complete, "ready"), progress);
    }

    // ── Loop and interrupts ──

    /// Call `update` every `interval_ms`, or at the configured frame rate.
    /// Edge state (`key_pressed`, `mouse_pressed`, ...) is valid inside it.
    pub fn run_loop(&mut self, update: Function, interval_ms: Option<f64>) -> JsResult<()> {
        let mut ctx = self.ctx.borrow_mut();
        let period = interval_ms
            .map(msec_to_timer)
            .unwrap_or_else(|| ctx.config().frame_interval());
        ctx.run_loop(period, move |_| call0(&update, "loop"))
            .map_err(js_error)
    }

    pub fn stop_loop(&mut self) {
        self.ctx.borrow_mut().stop_loop();
    }

    /// Returns the interrupt id for [`Runtime::remove_int`].
    pub fn install_int(&mut self, procedure: Function, msec: f64) -> f64 {
        let id = self
            .ctx
            .borrow_mut()
            .install_int(move || call0(&procedure, "interrupt"), msec);
        id.raw() as f64
    }

    pub fn adjust_int(&mut self, id: f64, msec: f64) -> bool {
        self.ctx
            .borrow_mut()
            .adjust_int(InterruptId::from_raw(id as u64), msec_to_timer(msec))
    }

    pub fn remove_int(&mut self, id: f64) -> bool {
        self.ctx
            .borrow_mut()
            .remove_int(InterruptId::from_raw(id as u64))
    }

    pub fn remove_all_ints(&mut self) {
        self.ctx.borrow_mut().remove_all_ints();
    }

    /// Stop every timer and detach every listener. Safe to call twice.
    pub fn teardown(&mut self) {
        self.ctx.borrow_mut().teardown();
        self.keyboard.clear();
        self.mouse.clear();
        self.screen = None;
        if let Some(mut font) = self.font.take() {
            font.unload();
        }
    }

    /// Milliseconds since the runtime started.
    pub fn time(&self) -> f64 {
        self.ctx.borrow().scheduler().now().as_secs_f64() * 1000.0
    }

    // ── Input queries ──

    pub fn key(&self, code: u32) -> bool {
        self.ctx.borrow().input().key(code)
    }

    pub fn key_pressed(&self, code: u32) -> bool {
        self.ctx.borrow().input().key_pressed(code)
    }

    pub fn key_released(&self, code: u32) -> bool {
        self.ctx.borrow().input().key_released(code)
    }

    /// Any key went down this frame.
    pub fn keypressed(&self) -> bool {
        self.ctx.borrow().input().keypressed()
    }

    pub fn mouse_x(&self) -> f64 {
        self.ctx.borrow().input().mouse_position().x
    }

    pub fn mouse_y(&self) -> f64 {
        self.ctx.borrow().input().mouse_position().y
    }

    pub fn mouse_z(&self) -> f64 {
        self.ctx.borrow().input().wheel()
    }

    pub fn mouse_dx(&self) -> f64 {
        self.ctx.borrow().input().mouse_delta().x
    }

    pub fn mouse_dy(&self) -> f64 {
        self.ctx.borrow().input().mouse_delta().y
    }

    pub fn mouse_dz(&self) -> f64 {
        self.ctx.borrow().input().wheel_delta()
    }

    pub fn mouse_b(&self) -> u32 {
        self.ctx.borrow().input().mouse_b()
    }

    pub fn mouse_pressed(&self) -> u32 {
        self.ctx.borrow().input().mouse_pressed()
    }

    pub fn mouse_released(&self) -> u32 {
        self.ctx.borrow().input().mouse_released()
    }

    /// Random integer in 0..65536.
    pub fn rand() -> u32 {
        (js_sys::Math::random() * 65536.0) as u32
    }

    /// Random float in 0.0..1.0.
    pub fn frand() -> f64 {
        js_sys::Math::random()
    }
}

impl Runtime {
    fn from_config(config: Config) -> webgro_core::Result<Self> {
        match config.log_level() {
            Ok(level) => log::set_max_level(level.to_level_filter()),
            Err(e) => log::warn!("{e}"),
        }
        let scheduler: Rc<dyn Scheduler> = Rc::new(WebScheduler::new()?);
        log::info!("Runtime created for canvas #{}", config.canvas_id);
        Ok(Self {
            ctx: Rc::new(RefCell::new(Context::new(config, scheduler))),
            screen: None,
            font: None,
            fonts_loaded: 0,
            keyboard: Vec::new(),
            mouse: Vec::new(),
            mixer: Mixer::new(),
        })
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Opaque `0xAARRGGBB` from 0-255 channels; alpha defaults to 255.
#[wasm_bindgen]
pub fn makecol(r: i32, g: i32, b: i32, a: Option<i32>) -> u32 {
    color::makecol_a(r, g, b, a.unwrap_or(255)).0
}

/// `0xAARRGGBB` from 0.0-1.0 channels; alpha defaults to 1.0.
#[wasm_bindgen]
pub fn makecolf(r: f64, g: f64, b: f64, a: Option<f64>) -> u32 {
    color::makecolf(r, g, b, a.unwrap_or(1.0)).0
}
