use std::collections::HashSet;

use glam::DVec2;

use crate::keys::{KeyCode, KEY_SLOTS, REFRESH_KEY};

/// Mouse button bits in [`InputTracker::mouse_b`], indexed the way the host
/// reports `MouseEvent.button`.
pub const MOUSE_LEFT: u32 = 1 << 0;
pub const MOUSE_MIDDLE: u32 = 1 << 1;
pub const MOUSE_RIGHT: u32 = 1 << 2;
pub const MOUSE_BACK: u32 = 1 << 3;
pub const MOUSE_FORWARD: u32 = 1 << 4;

/// Whether the host should still run its default handling for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The event was taken; the host default must be suppressed.
    Consume,
    /// Let the host handle the event as usual.
    PassThrough,
}

/// How motion deltas combine when several move events land in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionMode {
    /// Sum every delta seen since the last frame reset.
    Accumulate,
    /// Keep only the delta of the latest event.
    Overwrite,
}

/// Per-key flags: a dense table for codes below [`KEY_SLOTS`], a set for
/// anything the host reports beyond it.
#[derive(Debug, Clone)]
struct KeyTable {
    dense: [bool; KEY_SLOTS],
    sparse: HashSet<KeyCode>,
}

impl KeyTable {
    fn new() -> Self {
        Self {
            dense: [false; KEY_SLOTS],
            sparse: HashSet::new(),
        }
    }

    fn get(&self, code: KeyCode) -> bool {
        match self.dense.get(code as usize) {
            Some(&flag) => flag,
            None => self.sparse.contains(&code),
        }
    }

    fn set(&mut self, code: KeyCode, on: bool) {
        match self.dense.get_mut(code as usize) {
            Some(flag) => *flag = on,
            None if on => {
                self.sparse.insert(code);
            }
            None => {
                self.sparse.remove(&code);
            }
        }
    }

    fn any(&self) -> bool {
        self.dense.iter().any(|&k| k) || !self.sparse.is_empty()
    }

    fn clear(&mut self) {
        self.dense = [false; KEY_SLOTS];
        self.sparse.clear();
    }
}

/// Keyboard and mouse state fed by host events.
///
/// Level state follows the physical device. Edge state (`pressed` /
/// `released`) is set by event ingestion and cleared only by
/// [`InputTracker::reset_frame_edges`], so it stays valid for exactly one
/// logical frame.
#[derive(Debug, Clone)]
pub struct InputTracker {
    key_level: KeyTable,
    key_pressed: KeyTable,
    key_released: KeyTable,
    mouse_buttons: u32,
    mouse_pressed: u32,
    mouse_released: u32,
    mouse_pos: DVec2,
    mouse_delta: DVec2,
    wheel: f64,
    wheel_delta: f64,
    refresh_key: KeyCode,
    motion: MotionMode,
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl InputTracker {
    pub fn new() -> Self {
        Self {
            key_level: KeyTable::new(),
            key_pressed: KeyTable::new(),
            key_released: KeyTable::new(),
            mouse_buttons: 0,
            mouse_pressed: 0,
            mouse_released: 0,
            mouse_pos: DVec2::splat(-1.0),
            mouse_delta: DVec2::ZERO,
            wheel: -1.0,
            wheel_delta: 0.0,
            refresh_key: REFRESH_KEY,
            motion: MotionMode::Accumulate,
        }
    }

    pub fn with_refresh_key(mut self, key: KeyCode) -> Self {
        self.refresh_key = key;
        self
    }

    pub fn with_motion_mode(mut self, motion: MotionMode) -> Self {
        self.motion = motion;
        self
    }

    /// Forget all keyboard state, level and edge.
    pub fn clear_keyboard(&mut self) {
        self.key_level.clear();
        self.key_pressed.clear();
        self.key_released.clear();
    }

    /// Forget all mouse state and return position/wheel to their unset values.
    pub fn clear_mouse(&mut self) {
        self.mouse_buttons = 0;
        self.mouse_pressed = 0;
        self.mouse_released = 0;
        self.mouse_pos = DVec2::splat(-1.0);
        self.mouse_delta = DVec2::ZERO;
        self.wheel = -1.0;
        self.wheel_delta = 0.0;
    }

    // ── Event ingestion ──

    /// Key went down. Host auto-repeat re-delivers this while held, which is
    /// harmless: level and pressed edge simply stay set.
    pub fn on_key_down(&mut self, code: KeyCode) -> Disposition {
        self.key_level.set(code, true);
        self.key_pressed.set(code, true);
        self.disposition(code)
    }

    pub fn on_key_up(&mut self, code: KeyCode) -> Disposition {
        self.key_level.set(code, false);
        self.key_released.set(code, true);
        self.disposition(code)
    }

    /// A button can't be "just released" and down at once, so the released
    /// edge is dropped. Buttons past bit 31 are ignored.
    pub fn on_mouse_down(&mut self, button: u32) {
        let bit = button_bit(button);
        self.mouse_buttons |= bit;
        self.mouse_pressed |= bit;
        self.mouse_released &= !bit;
    }

    pub fn on_mouse_up(&mut self, button: u32) {
        let bit = button_bit(button);
        self.mouse_buttons &= !bit;
        self.mouse_released |= bit;
        self.mouse_pressed &= !bit;
    }

    /// Position is absolute and always overwritten; the delta follows the
    /// tracker's [`MotionMode`].
    pub fn on_mouse_move(&mut self, x: f64, y: f64, dx: f64, dy: f64) {
        self.mouse_pos = DVec2::new(x, y);
        let delta = DVec2::new(dx, dy);
        self.mouse_delta = match self.motion {
            MotionMode::Accumulate => self.mouse_delta + delta,
            MotionMode::Overwrite => delta,
        };
    }

    pub fn on_wheel(&mut self, delta_y: f64) {
        self.wheel += delta_y;
        self.wheel_delta = delta_y;
    }

    /// End-of-frame reset, driven by the frame loop after the application
    /// has read this frame's edges.
    pub fn reset_frame_edges(&mut self) {
        self.key_pressed.clear();
        self.key_released.clear();
        self.mouse_pressed = 0;
        self.mouse_released = 0;
        self.mouse_delta = DVec2::ZERO;
        self.wheel_delta = 0.0;
    }

    fn disposition(&self, code: KeyCode) -> Disposition {
        if code == self.refresh_key {
            Disposition::PassThrough
        } else {
            Disposition::Consume
        }
    }

    // ── Queries ──

    /// True while the key is held.
    pub fn key(&self, code: KeyCode) -> bool {
        self.key_level.get(code)
    }

    /// True if the key went down during the current frame.
    pub fn key_pressed(&self, code: KeyCode) -> bool {
        self.key_pressed.get(code)
    }

    /// True if the key went up during the current frame.
    pub fn key_released(&self, code: KeyCode) -> bool {
        self.key_released.get(code)
    }

    /// True if any key went down during the current frame.
    pub fn keypressed(&self) -> bool {
        self.key_pressed.any()
    }

    pub fn mouse_b(&self) -> u32 {
        self.mouse_buttons
    }

    pub fn mouse_pressed(&self) -> u32 {
        self.mouse_pressed
    }

    pub fn mouse_released(&self) -> u32 {
        self.mouse_released
    }

    pub fn mouse_button(&self, button: u32) -> bool {
        self.mouse_buttons & button_bit(button) != 0
    }

    pub fn mouse_position(&self) -> DVec2 {
        self.mouse_pos
    }

    pub fn mouse_delta(&self) -> DVec2 {
        self.mouse_delta
    }

    pub fn wheel(&self) -> f64 {
        self.wheel
    }

    pub fn wheel_delta(&self) -> f64 {
        self.wheel_delta
    }
}

fn button_bit(button: u32) -> u32 {
    1u32.checked_shl(button).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{KEY_A, KEY_F5, KEY_SPACE};

    #[test]
    fn test_key_down_sets_level_and_edge() {
        let mut input = InputTracker::new();
        input.on_key_down(KEY_A);
        assert!(input.key(KEY_A));
        assert!(input.key_pressed(KEY_A));
        assert!(!input.key_released(KEY_A));
    }

    #[test]
    fn test_edge_decays_after_reset_level_stays() {
        let mut input = InputTracker::new();
        input.on_key_down(KEY_A);
        input.reset_frame_edges();
        assert!(!input.key_pressed(KEY_A));
        assert!(input.key(KEY_A));

        input.on_key_up(KEY_A);
        assert!(!input.key(KEY_A));
        assert!(input.key_released(KEY_A));
        assert!(!input.key_pressed(KEY_A));
    }

    #[test]
    fn test_tap_within_one_frame_fires_both_edges() {
        let mut input = InputTracker::new();
        input.on_key_down(KEY_SPACE);
        input.on_key_up(KEY_SPACE);
        assert!(input.key_pressed(KEY_SPACE));
        assert!(input.key_released(KEY_SPACE));
        assert!(!input.key(KEY_SPACE));

        input.reset_frame_edges();
        assert!(!input.key_pressed(KEY_SPACE));
        assert!(!input.key_released(KEY_SPACE));
    }

    #[test]
    fn test_auto_repeat_is_idempotent() {
        let mut input = InputTracker::new();
        for _ in 0..5 {
            input.on_key_down(KEY_A);
        }
        assert!(input.key(KEY_A));
        assert!(input.key_pressed(KEY_A));
        input.reset_frame_edges();
        input.on_key_down(KEY_A);
        assert!(input.key_pressed(KEY_A));
    }

    #[test]
    fn test_refresh_key_passes_through() {
        let mut input = InputTracker::new();
        assert_eq!(input.on_key_down(KEY_F5), Disposition::PassThrough);
        assert_eq!(input.on_key_up(KEY_F5), Disposition::PassThrough);
        assert_eq!(input.on_key_down(KEY_A), Disposition::Consume);
        // The refresh key is still tracked.
        assert!(input.key_released(KEY_F5));
    }

    #[test]
    fn test_custom_refresh_key() {
        let mut input = InputTracker::new().with_refresh_key(KEY_A);
        assert_eq!(input.on_key_down(KEY_A), Disposition::PassThrough);
        assert_eq!(input.on_key_down(KEY_F5), Disposition::Consume);
    }

    #[test]
    fn test_out_of_range_key_tracked() {
        let mut input = InputTracker::new();
        for code in [0x1_0000, u32::MAX] {
            assert!(!input.key(code));
            assert_eq!(input.on_key_down(code), Disposition::Consume);
            assert!(input.key(code));
            assert!(input.key_pressed(code));
            assert!(input.keypressed());
            input.reset_frame_edges();
            assert!(!input.keypressed());
            assert!(input.key(code));

            input.on_key_up(code);
            assert!(!input.key(code));
            assert!(input.key_released(code));
            input.reset_frame_edges();
            assert!(!input.key_released(code));
        }
        assert!(!input.key(KEY_A));
    }

    #[test]
    fn test_out_of_range_key_cleared_with_keyboard() {
        let mut input = InputTracker::new();
        input.on_key_down(u32::MAX);
        let snapshot = input.clone();
        input.clear_keyboard();
        assert!(!input.key(u32::MAX));
        assert!(snapshot.key(u32::MAX));
    }

    #[test]
    fn test_mouse_mask_consistency() {
        let mut input = InputTracker::new();
        input.on_mouse_up(2);
        assert_eq!(input.mouse_released() & MOUSE_RIGHT, MOUSE_RIGHT);

        input.on_mouse_down(2);
        assert_eq!(input.mouse_b() & MOUSE_RIGHT, MOUSE_RIGHT);
        assert_eq!(input.mouse_released() & MOUSE_RIGHT, 0);
        assert_eq!(input.mouse_pressed() & MOUSE_RIGHT, MOUSE_RIGHT);
        assert!(input.mouse_button(2));

        input.on_mouse_up(2);
        assert_eq!(input.mouse_b() & MOUSE_RIGHT, 0);
        assert_eq!(input.mouse_pressed() & MOUSE_RIGHT, 0);
    }

    #[test]
    fn test_mouse_edges_cleared_by_reset() {
        let mut input = InputTracker::new();
        input.on_mouse_down(0);
        input.reset_frame_edges();
        assert_eq!(input.mouse_pressed(), 0);
        assert_eq!(input.mouse_b(), MOUSE_LEFT);
    }

    #[test]
    fn test_mouse_button_out_of_range_ignored() {
        let mut input = InputTracker::new();
        input.on_mouse_down(40);
        assert_eq!(input.mouse_b(), 0);
        assert!(!input.mouse_button(40));
    }

    #[test]
    fn test_motion_accumulates_within_frame() {
        let mut input = InputTracker::new();
        input.on_mouse_move(10.0, 10.0, 2.0, 1.0);
        input.on_mouse_move(13.0, 9.0, 3.0, -2.0);
        assert_eq!(input.mouse_position(), DVec2::new(13.0, 9.0));
        assert_eq!(input.mouse_delta(), DVec2::new(5.0, -1.0));

        input.reset_frame_edges();
        assert_eq!(input.mouse_delta(), DVec2::ZERO);
        assert_eq!(input.mouse_position(), DVec2::new(13.0, 9.0));
    }

    #[test]
    fn test_motion_overwrite_mode() {
        let mut input = InputTracker::new().with_motion_mode(MotionMode::Overwrite);
        input.on_mouse_move(10.0, 10.0, 2.0, 1.0);
        input.on_mouse_move(13.0, 9.0, 3.0, -2.0);
        assert_eq!(input.mouse_delta(), DVec2::new(3.0, -2.0));
    }

    #[test]
    fn test_wheel_position_accumulates_delta_overwrites() {
        let mut input = InputTracker::new();
        input.on_wheel(3.0);
        input.on_wheel(-1.0);
        assert_eq!(input.wheel(), 1.0);
        assert_eq!(input.wheel_delta(), -1.0);
        input.reset_frame_edges();
        assert_eq!(input.wheel_delta(), 0.0);
        assert_eq!(input.wheel(), 1.0);
    }

    #[test]
    fn test_clear_restores_unset_state() {
        let mut input = InputTracker::new();
        input.on_key_down(KEY_A);
        input.on_mouse_down(0);
        input.on_mouse_move(5.0, 5.0, 1.0, 1.0);
        input.clear_keyboard();
        input.clear_mouse();
        assert!(!input.key(KEY_A));
        assert_eq!(input.mouse_b(), 0);
        assert_eq!(input.mouse_position(), DVec2::splat(-1.0));
    }
}
