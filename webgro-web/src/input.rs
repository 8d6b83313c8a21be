//! Browser input wiring.
//!
//! Keyboard listeners go on `window`, mouse listeners on the screen canvas.
//! Every listener forwards into the shared [`webgro_core::Context`], which
//! ignores events for subsystems that are not installed.

use webgro_core::input::MOUSE_FORWARD;

/// Highest `MouseEvent.button` index that maps to a button bit.
pub const MAX_DOM_BUTTON: u32 = MOUSE_FORWARD.trailing_zeros();

/// `MouseEvent.button` (0 left, 1 middle, 2 right, 3 back, 4 forward) to
/// the button index the tracker takes. Anything else is dropped.
pub fn dom_button(button: i16) -> Option<u32> {
    u32::try_from(button).ok().filter(|b| *b <= MAX_DOM_BUTTON)
}

#[cfg(target_arch = "wasm32")]
pub use dom::{attach_keyboard, attach_mouse, Listener};

#[cfg(target_arch = "wasm32")]
mod dom {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::{Event, EventTarget, KeyboardEvent, MouseEvent, WheelEvent};

    use webgro_core::{Context, Disposition, Result};

    use super::dom_button;
    use crate::host;

    /// A DOM event listener, detached when dropped.
    pub struct Listener {
        target: EventTarget,
        kind: &'static str,
        callback: Closure<dyn FnMut(Event)>,
    }

    impl Listener {
        pub fn attach<E: JsCast + 'static>(
            target: &EventTarget,
            kind: &'static str,
            mut handler: impl FnMut(E) + 'static,
        ) -> Result<Self> {
            let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                if let Ok(event) = event.dyn_into::<E>() {
                    handler(event);
                }
            });
            target
                .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
                .map_err(host::host_error)?;
            Ok(Self {
                target: target.clone(),
                kind,
                callback,
            })
        }
    }

    impl Drop for Listener {
        fn drop(&mut self) {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
        }
    }

    fn key_listener(
        target: &EventTarget,
        kind: &'static str,
        ctx: Weak<RefCell<Context>>,
        ingest: fn(&Context, u32) -> Disposition,
    ) -> Result<Listener> {
        Listener::attach(target, kind, move |event: KeyboardEvent| {
            let Some(ctx) = ctx.upgrade() else {
                return;
            };
            let Ok(ctx) = ctx.try_borrow() else {
                return;
            };
            if ingest(&ctx, event.key_code()) == Disposition::Consume {
                event.prevent_default();
            }
        })
    }

    /// `keydown`/`keyup` on `window`.
    pub fn attach_keyboard(ctx: &Rc<RefCell<Context>>) -> Result<Vec<Listener>> {
        let window: EventTarget = host::window()?.into();
        Ok(vec![
            key_listener(&window, "keydown", Rc::downgrade(ctx), Context::key_down)?,
            key_listener(&window, "keyup", Rc::downgrade(ctx), Context::key_up)?,
        ])
    }

    fn with_context(ctx: &Weak<RefCell<Context>>, f: impl FnOnce(&Context)) {
        if let Some(ctx) = ctx.upgrade() {
            if let Ok(ctx) = ctx.try_borrow() {
                f(&ctx);
            }
        }
    }

    /// `mousedown`/`mouseup`/`mousemove`/`wheel` on the screen canvas.
    pub fn attach_mouse(canvas: &EventTarget, ctx: &Rc<RefCell<Context>>) -> Result<Vec<Listener>> {
        let down = Rc::downgrade(ctx);
        let up = Rc::downgrade(ctx);
        let motion = Rc::downgrade(ctx);
        let wheel = Rc::downgrade(ctx);
        Ok(vec![
            Listener::attach(canvas, "mousedown", move |event: MouseEvent| {
                if let Some(button) = dom_button(event.button()) {
                    with_context(&down, |ctx| ctx.mouse_down(button));
                }
            })?,
            Listener::attach(canvas, "mouseup", move |event: MouseEvent| {
                if let Some(button) = dom_button(event.button()) {
                    with_context(&up, |ctx| ctx.mouse_up(button));
                }
            })?,
            Listener::attach(canvas, "mousemove", move |event: MouseEvent| {
                with_context(&motion, |ctx| {
                    ctx.mouse_move(
                        f64::from(event.offset_x()),
                        f64::from(event.offset_y()),
                        f64::from(event.movement_x()),
                        f64::from(event.movement_y()),
                    )
                });
            })?,
            Listener::attach(canvas, "wheel", move |event: WheelEvent| {
                with_context(&wheel, |ctx| ctx.wheel(event.delta_y()));
            })?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webgro_core::input::{MOUSE_LEFT, MOUSE_MIDDLE, MOUSE_RIGHT};

    #[test]
    fn test_dom_buttons_map_to_bits() {
        assert_eq!(dom_button(0).map(|b| 1 << b), Some(MOUSE_LEFT));
        assert_eq!(dom_button(1).map(|b| 1 << b), Some(MOUSE_MIDDLE));
        assert_eq!(dom_button(2).map(|b| 1 << b), Some(MOUSE_RIGHT));
        assert_eq!(dom_button(4).map(|b| 1 << b), Some(MOUSE_FORWARD));
    }

    #[test]
    fn test_unknown_buttons_dropped() {
        assert_eq!(dom_button(-1), None);
        assert_eq!(dom_button(5), None);
    }
}
