//! Common types used throughout Scrim

use serde::{Deserialize, Serialize};

/// Packed 32-bit color in `0xAARRGGBB` order.
///
/// This is the wire format draw commands carry; conversion to float
/// components happens only at rasterization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Self = Self(0x0000_0000);
    pub const BLACK: Self = Self(0xFF00_0000);
    pub const WHITE: Self = Self(0xFFFF_FFFF);
    pub const RED: Self = Self(0xFFFF_0000);
    pub const GREEN: Self = Self(0xFF00_FF00);
    pub const BLUE: Self = Self(0xFF00_00FF);

    /// Create a color from individual channel values
    pub fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(u32::from(a) << 24 | u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b))
    }

    /// Alpha channel
    pub fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Red channel
    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Green channel
    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue channel
    pub fn b(self) -> u8 {
        self.0 as u8
    }

    /// Convert to `[r, g, b, a]` floats in `0.0..=1.0` for GPU usage
    pub fn to_f32_array(self) -> [f32; 4] {
        [
            f32::from(self.r()) / 255.0,
            f32::from(self.g()) / 255.0,
            f32::from(self.b()) / 255.0,
            f32::from(self.a()) / 255.0,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

impl From<u32> for Color {
    fn from(packed: u32) -> Self {
        Self(packed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_unpacking() {
        let color = Color(0x80FF7F01);
        assert_eq!(color.a(), 0x80);
        assert_eq!(color.r(), 0xFF);
        assert_eq!(color.g(), 0x7F);
        assert_eq!(color.b(), 0x01);
    }

    #[test]
    fn test_argb_round_trip() {
        assert_eq!(Color::argb(0xFF, 0x12, 0x34, 0x56), Color(0xFF12_3456));
    }

    #[test]
    fn test_float_conversion() {
        let [r, g, b, a] = Color::WHITE.to_f32_array();
        assert_eq!([r, g, b, a], [1.0, 1.0, 1.0, 1.0]);

        let [r, _, _, a] = Color::TRANSPARENT.to_f32_array();
        assert_eq!(r, 0.0);
        assert_eq!(a, 0.0);
    }
}
