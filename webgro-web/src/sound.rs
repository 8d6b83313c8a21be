//! Samples on `<audio>` elements, scaled by one global volume.

use std::rc::{Rc, Weak};

/// Playback parameters of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayParams {
    pub volume: f64,
    /// Playback rate; 1.0 is normal speed.
    pub frequency: f64,
    pub looped: bool,
}

impl Default for PlayParams {
    fn default() -> Self {
        Self {
            volume: 1.0,
            frequency: 1.0,
            looped: false,
        }
    }
}

impl PlayParams {
    /// Fill unset arguments from the defaults.
    pub fn from_args(volume: Option<f64>, frequency: Option<f64>, looped: Option<bool>) -> Self {
        let defaults = Self::default();
        Self {
            volume: volume.unwrap_or(defaults.volume),
            frequency: frequency.unwrap_or(defaults.frequency),
            looped: looped.unwrap_or(defaults.looped),
        }
    }
}

/// Volume handed to the audio element: sample volume times the global
/// volume, clamped to the 0.0..=1.0 range the element accepts.
pub fn element_volume(sample: f64, master: f64) -> f64 {
    let v = sample * master;
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Weak registry of live samples. Entries whose sample was dropped are
/// pruned on every insert and removal.
#[derive(Debug)]
pub struct Registry<T> {
    entries: Vec<Weak<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Registry<T> {
    pub fn insert(&mut self, item: &Rc<T>) {
        self.entries.retain(|e| e.strong_count() > 0);
        self.entries.push(Rc::downgrade(item));
    }

    pub fn remove(&mut self, item: &Rc<T>) {
        self.entries
            .retain(|e| e.upgrade().is_some_and(|live| !Rc::ptr_eq(&live, item)));
    }

    /// Every sample still alive.
    pub fn live(&self) -> Vec<Rc<T>> {
        self.entries.iter().filter_map(Weak::upgrade).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(target_arch = "wasm32")]
pub use media::{Mixer, Sample};

#[cfg(target_arch = "wasm32")]
mod media {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::HtmlAudioElement;

    use webgro_core::{LoadHandle, PendingLoads, Result};

    use super::{element_volume, PlayParams, Registry};
    use crate::host;

    struct SampleState {
        element: HtmlAudioElement,
        file: String,
        volume: Cell<f64>,
        load: LoadHandle,
        destroyed: Cell<bool>,
    }

    /// Every loaded sample, so the global volume can rescale them.
    pub struct Mixer {
        master: Cell<f64>,
        samples: RefCell<Registry<SampleState>>,
    }

    impl Mixer {
        pub fn new() -> Rc<Self> {
            Rc::new(Self {
                master: Cell::new(1.0),
                samples: RefCell::new(Registry::default()),
            })
        }

        pub fn get_volume(&self) -> f64 {
            self.master.get()
        }

        pub fn set_volume(&self, volume: f64) {
            self.master.set(volume);
            let samples = self.samples.borrow().live();
            for sample in samples {
                sample
                    .element
                    .set_volume(element_volume(sample.volume.get(), volume));
            }
        }

        /// Start loading `url`. Registered in `loads`, ready once the first
        /// frame of audio data is available.
        pub fn load_sample(self: &Rc<Self>, url: &str, loads: &PendingLoads) -> Result<Sample> {
            log::info!("Loading sample {url}...");
            let element = HtmlAudioElement::new().map_err(host::host_error)?;
            let load = loads.track(url);

            let (handle, name) = (load.clone(), url.to_string());
            let on_loaded = Closure::once_into_js(move || {
                handle.mark_ready();
                log::info!("Sample {name} loaded!");
            });
            element.set_onloadeddata(Some(on_loaded.unchecked_ref()));
            element.set_src(url);

            let state = Rc::new(SampleState {
                element,
                file: url.to_string(),
                volume: Cell::new(1.0),
                load,
                destroyed: Cell::new(false),
            });
            self.samples.borrow_mut().insert(&state);
            Ok(Sample {
                state,
                mixer: Rc::clone(self),
            })
        }
    }

    #[wasm_bindgen]
    #[derive(Clone)]
    pub struct Sample {
        state: Rc<SampleState>,
        mixer: Rc<Mixer>,
    }

    impl Sample {
        fn apply(&self, params: PlayParams) {
            let element = &self.state.element;
            self.state.volume.set(params.volume);
            element.set_volume(element_volume(params.volume, self.mixer.get_volume()));
            element.set_loop(params.looped);
            element.set_playback_rate(params.frequency);
        }
    }

    #[wasm_bindgen]
    impl Sample {
        pub fn file(&self) -> String {
            self.state.file.clone()
        }

        pub fn ready(&self) -> bool {
            self.state.load.is_ready()
        }

        /// Play with the given volume, speed and looping; unset values
        /// default to full volume, normal speed, no loop.
        pub fn play(&self, volume: Option<f64>, frequency: Option<f64>, looped: Option<bool>) {
            if self.state.destroyed.get() {
                log::warn!("Can't play destroyed sample {}", self.state.file);
                return;
            }
            self.apply(PlayParams::from_args(volume, frequency, looped));
            if let Err(e) = self.state.element.play() {
                log::warn!("Can't play {}: {}", self.state.file, host::host_error(e));
            }
        }

        /// Change parameters of a playing sample.
        pub fn adjust(&self, volume: Option<f64>, frequency: Option<f64>, looped: Option<bool>) {
            self.apply(PlayParams::from_args(volume, frequency, looped));
        }

        /// Pause and rewind.
        pub fn stop(&self) {
            let _ = self.state.element.pause();
            self.state.element.set_current_time(0.0);
        }

        /// Stop, release the audio data and leave the global volume's reach.
        /// A load still in flight counts as finished so `ready` won't wait on it.
        pub fn destroy(&self) {
            if self.state.destroyed.replace(true) {
                return;
            }
            self.stop();
            self.state.element.set_onloadeddata(None);
            let _ = self.state.element.remove_attribute("src");
            self.state.element.load();
            self.state.load.mark_ready();
            self.mixer.samples.borrow_mut().remove(&self.state);
            log::info!("Sample {} destroyed", self.state.file);
        }
    }
}
