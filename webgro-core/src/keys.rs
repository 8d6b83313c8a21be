//! Allegro-named key constants carrying browser `keyCode` values.
//!
//! Left/right modifier variants share one code because the host reports a
//! single `keyCode` for both sides.

/// Platform key code as delivered by the host's key events.
pub type KeyCode = u32;

pub const KEY_A: KeyCode = 0x41;
pub const KEY_B: KeyCode = 0x42;
pub const KEY_C: KeyCode = 0x43;
pub const KEY_D: KeyCode = 0x44;
pub const KEY_E: KeyCode = 0x45;
pub const KEY_F: KeyCode = 0x46;
pub const KEY_G: KeyCode = 0x47;
pub const KEY_H: KeyCode = 0x48;
pub const KEY_I: KeyCode = 0x49;
pub const KEY_J: KeyCode = 0x4a;
pub const KEY_K: KeyCode = 0x4b;
pub const KEY_L: KeyCode = 0x4c;
pub const KEY_M: KeyCode = 0x4d;
pub const KEY_N: KeyCode = 0x4e;
pub const KEY_O: KeyCode = 0x4f;
pub const KEY_P: KeyCode = 0x50;
pub const KEY_Q: KeyCode = 0x51;
pub const KEY_R: KeyCode = 0x52;
pub const KEY_S: KeyCode = 0x53;
pub const KEY_T: KeyCode = 0x54;
pub const KEY_U: KeyCode = 0x55;
pub const KEY_V: KeyCode = 0x56;
pub const KEY_W: KeyCode = 0x57;
pub const KEY_X: KeyCode = 0x58;
pub const KEY_Y: KeyCode = 0x59;
pub const KEY_Z: KeyCode = 0x5a;

pub const KEY_0: KeyCode = 0x30;
pub const KEY_1: KeyCode = 0x31;
pub const KEY_2: KeyCode = 0x32;
pub const KEY_3: KeyCode = 0x33;
pub const KEY_4: KeyCode = 0x34;
pub const KEY_5: KeyCode = 0x35;
pub const KEY_6: KeyCode = 0x36;
pub const KEY_7: KeyCode = 0x37;
pub const KEY_8: KeyCode = 0x38;
pub const KEY_9: KeyCode = 0x39;

pub const KEY_0_PAD: KeyCode = 0x60;
pub const KEY_1_PAD: KeyCode = 0x61;
pub const KEY_2_PAD: KeyCode = 0x62;
pub const KEY_3_PAD: KeyCode = 0x63;
pub const KEY_4_PAD: KeyCode = 0x64;
pub const KEY_5_PAD: KeyCode = 0x65;
pub const KEY_6_PAD: KeyCode = 0x66;
pub const KEY_7_PAD: KeyCode = 0x67;
pub const KEY_8_PAD: KeyCode = 0x68;
pub const KEY_9_PAD: KeyCode = 0x69;

pub const KEY_F1: KeyCode = 0x70;
pub const KEY_F2: KeyCode = 0x71;
pub const KEY_F3: KeyCode = 0x72;
pub const KEY_F4: KeyCode = 0x73;
pub const KEY_F5: KeyCode = 0x74;
pub const KEY_F6: KeyCode = 0x75;
pub const KEY_F7: KeyCode = 0x76;
pub const KEY_F8: KeyCode = 0x77;
pub const KEY_F9: KeyCode = 0x78;
pub const KEY_F10: KeyCode = 0x79;
pub const KEY_F11: KeyCode = 0x7a;
pub const KEY_F12: KeyCode = 0x7b;

pub const KEY_ESC: KeyCode = 0x1b;
pub const KEY_TILDE: KeyCode = 0xc0;
pub const KEY_MINUS: KeyCode = 0xbd;
pub const KEY_EQUALS: KeyCode = 0xbb;
pub const KEY_BACKSPACE: KeyCode = 0x08;
pub const KEY_TAB: KeyCode = 0x09;
pub const KEY_OPENBRACE: KeyCode = 0xdb;
pub const KEY_CLOSEBRACE: KeyCode = 0xdd;
pub const KEY_ENTER: KeyCode = 0x0d;
pub const KEY_COLON: KeyCode = 0xba;
pub const KEY_QUOTE: KeyCode = 0xde;
pub const KEY_BACKSLASH: KeyCode = 0xdc;
pub const KEY_COMMA: KeyCode = 0xbc;
pub const KEY_STOP: KeyCode = 0xbe;
pub const KEY_SLASH: KeyCode = 0xbf;
pub const KEY_SPACE: KeyCode = 0x20;

pub const KEY_INSERT: KeyCode = 0x2d;
pub const KEY_DEL: KeyCode = 0x2e;
pub const KEY_HOME: KeyCode = 0x24;
pub const KEY_END: KeyCode = 0x23;
pub const KEY_PGUP: KeyCode = 0x21;
pub const KEY_PGDN: KeyCode = 0x22;
pub const KEY_LEFT: KeyCode = 0x25;
pub const KEY_UP: KeyCode = 0x26;
pub const KEY_RIGHT: KeyCode = 0x27;
pub const KEY_DOWN: KeyCode = 0x28;

pub const KEY_SLASH_PAD: KeyCode = 0x6f;
pub const KEY_ASTERISK: KeyCode = 0x6a;
pub const KEY_MINUS_PAD: KeyCode = 0x6d;
pub const KEY_PLUS_PAD: KeyCode = 0x6b;
pub const KEY_DEL_PAD: KeyCode = 0x6e;
pub const KEY_ENTER_PAD: KeyCode = 0x0d;
pub const KEY_EQUALS_PAD: KeyCode = 0x0c;

pub const KEY_PRTSCR: KeyCode = 0x2c;
pub const KEY_PAUSE: KeyCode = 0x13;

pub const KEY_LSHIFT: KeyCode = 0x10;
pub const KEY_RSHIFT: KeyCode = 0x10;
pub const KEY_LCONTROL: KeyCode = 0x11;
pub const KEY_RCONTROL: KeyCode = 0x11;
pub const KEY_ALT: KeyCode = 0x12;
pub const KEY_ALTGR: KeyCode = 0x12;
pub const KEY_LWIN: KeyCode = 0x5b;
pub const KEY_RWIN: KeyCode = 0x5c;
pub const KEY_MENU: KeyCode = 0x5d;
pub const KEY_SCRLOCK: KeyCode = 0x91;
pub const KEY_NUMLOCK: KeyCode = 0x90;
pub const KEY_CAPSLOCK: KeyCode = 0x14;

/// Key whose host default action (page reload) is never suppressed.
pub const REFRESH_KEY: KeyCode = KEY_F5;

/// Number of key slots allocated up front; higher codes grow the tables lazily.
pub const KEY_SLOTS: usize = 0x100;
