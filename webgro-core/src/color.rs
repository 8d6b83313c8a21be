use std::fmt;

/// Packed `0xAARRGGBB` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const TRANSPARENT: Color = Color(0);

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// Build from an `ImageData` pixel, which is stored RGBA.
    pub fn from_rgba_bytes(px: [u8; 4]) -> Self {
        Self::from_argb(px[3], px[0], px[1], px[2])
    }

    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn b(self) -> u8 {
        self.0 as u8
    }

    pub fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// CSS `rgba()` string for canvas fill and stroke styles.
    pub fn to_css(self) -> String {
        format!("rgba({},{},{},{})", self.r(), self.g(), self.b(), getaf(self))
    }
}

impl From<u32> for Color {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<Color> for u32 {
    fn from(c: Color) -> Self {
        c.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

fn unit_to_byte(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Opaque color from 0-255 channels. Channels outside that range keep
/// their low 8 bits.
pub fn makecol(r: i32, g: i32, b: i32) -> Color {
    makecol_a(r, g, b, 255)
}

pub fn makecol_a(r: i32, g: i32, b: i32, a: i32) -> Color {
    Color::from_argb(a as u8, r as u8, g as u8, b as u8)
}

/// Color from 0.0-1.0 channels, clamped.
pub fn makecolf(r: f64, g: f64, b: f64, a: f64) -> Color {
    Color::from_argb(
        unit_to_byte(a),
        unit_to_byte(r),
        unit_to_byte(g),
        unit_to_byte(b),
    )
}

pub fn getr(c: Color) -> u8 {
    c.r()
}

pub fn getg(c: Color) -> u8 {
    c.g()
}

pub fn getb(c: Color) -> u8 {
    c.b()
}

pub fn geta(c: Color) -> u8 {
    c.a()
}

pub fn getrf(c: Color) -> f64 {
    f64::from(c.r()) / 255.0
}

pub fn getgf(c: Color) -> f64 {
    f64::from(c.g()) / 255.0
}

pub fn getbf(c: Color) -> f64 {
    f64::from(c.b()) / 255.0
}

pub fn getaf(c: Color) -> f64 {
    f64::from(c.a()) / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_makecol_packs_argb() {
        assert_eq!(makecol(255, 0, 0), Color(0xFFFF_0000));
        assert_eq!(makecol_a(1, 2, 3, 4), Color(0x0401_0203));
        assert_eq!(makecol(0x1FF, 0, 0).r(), 0xFF);
    }

    #[test]
    fn test_accessors() {
        let c = Color(0x80C0_4020);
        assert_eq!((getr(c), getg(c), getb(c), geta(c)), (0xC0, 0x40, 0x20, 0x80));
        assert!((getaf(c) - 128.0 / 255.0).abs() < 1e-12);
        assert_eq!(getrf(Color::WHITE), 1.0);
        assert_eq!(getgf(Color::BLACK), 0.0);
        assert_eq!(getbf(Color::BLACK), 0.0);
    }

    #[test]
    fn test_makecolf_clamps() {
        assert_eq!(makecolf(1.0, 0.0, 0.5, 1.0), Color(0xFFFF_0080));
        assert_eq!(makecolf(2.0, -1.0, f64::NAN, 0.0), Color(0x00FF_0000));
    }

    #[test]
    fn test_css_and_pixels() {
        assert_eq!(makecol(10, 20, 30).to_css(), "rgba(10,20,30,1)");
        assert_eq!(Color::TRANSPARENT.to_css(), "rgba(0,0,0,0)");
        assert_eq!(
            Color::from_rgba_bytes([1, 2, 3, 4]),
            makecol_a(1, 2, 3, 4)
        );
        assert_eq!(Color(0xFF00_00FF).to_string(), "#FF0000FF");
    }
}
