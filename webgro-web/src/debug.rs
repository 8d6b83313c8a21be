//! Debug console.
//!
//! The runtime's logger forwards every record to the browser console. Once
//! [`enable_debug`] names a page element, records are mirrored there too,
//! one line each.

use log::Level;

/// Log target of lines written by the page through `log()`.
pub const PAGE_TARGET: &str = "webgro::page";

/// Text of one console line. Page lines are shown verbatim, runtime records
/// carry their level.
pub fn console_line(level: Level, target: &str, message: &str) -> String {
    if target == PAGE_TARGET {
        message.to_string()
    } else {
        format!("[{level}] {message}")
    }
}

#[cfg(target_arch = "wasm32")]
pub use dom::{enable_debug, init, log_line, wipe_log};

#[cfg(target_arch = "wasm32")]
mod dom {
    use std::cell::RefCell;

    use log::{Log, Metadata, Record};
    use wasm_bindgen::prelude::*;
    use web_sys::Element;

    use webgro_core::Error;

    use super::{console_line, PAGE_TARGET};
    use crate::host::{self, js_error};

    thread_local! {
        static CONSOLE: RefCell<Option<Element>> = const { RefCell::new(None) };
    }

    struct PageLogger;

    static LOGGER: PageLogger = PageLogger;

    impl Log for PageLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &Record) {
            if !self.enabled(record.metadata()) {
                return;
            }
            console_log::log(record);
            let line = console_line(record.level(), record.target(), &record.args().to_string());
            CONSOLE.with(|console| {
                if let Ok(console) = console.try_borrow() {
                    if let Some(element) = console.as_ref() {
                        append_line(element, &line);
                    }
                }
            });
        }

        fn flush(&self) {}
    }

    fn append_line(element: &Element, line: &str) {
        let Some(document) = element.owner_document() else {
            return;
        };
        let text = document.create_text_node(line);
        let _ = element.append_child(&text);
        if let Ok(br) = document.create_element("br") {
            let _ = element.append_child(&br);
        }
    }

    /// Install the logger at `level`.
    pub fn init(level: log::Level) -> Result<(), log::SetLoggerError> {
        log::set_logger(&LOGGER)?;
        log::set_max_level(level.to_level_filter());
        Ok(())
    }

    /// Mirror log lines into the element `id`.
    #[wasm_bindgen]
    pub fn enable_debug(id: &str) -> Result<(), JsValue> {
        let element = host::document()
            .map_err(js_error)?
            .get_element_by_id(id)
            .ok_or_else(|| js_error(Error::ElementNotFound(id.to_string())))?;
        CONSOLE.with(|console| *console.borrow_mut() = Some(element));
        Ok(())
    }

    /// Write one line to the debug console.
    #[wasm_bindgen(js_name = log)]
    pub fn log_line(text: &str) {
        log::info!(target: PAGE_TARGET, "{text}");
    }

    /// Empty the debug console.
    #[wasm_bindgen]
    pub fn wipe_log() {
        CONSOLE.with(|console| {
            if let Some(element) = console.borrow().as_ref() {
                element.set_inner_html("");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_lines_carry_level() {
        assert_eq!(
            console_line(Level::Warn, "webgro_core::context", "Keyboard already installed"),
            "[WARN] Keyboard already installed"
        );
    }

    #[test]
    fn test_page_lines_verbatim() {
        assert_eq!(console_line(Level::Info, PAGE_TARGET, "score: 10"), "score: 10");
    }
}
