// SPDX-License-Identifier: GPL-3.0-or-later

//! Fixed-point RGB and YUV conversion.
//!
//! Forward conversion uses coefficients scaled by 10^5 and selected per
//! device (BT.601 full range, or ITU-R BT.656 video levels). Reverse
//! conversion uses a single independent constant set scaled by 10^6. Both
//! directions truncate toward zero and saturate to 0..=255, so a round trip
//! is not lossless.
//!

use crate::format::PixelFormat;

const YUV_NORM: i64 = 100_000;
const UV_BIAS: i64 = 12_800_000;

const RGB_NORM: i64 = 1_000_000;
const R_U: i64 = 1_402_524;
const R_BIAS: i64 = 179_000_000;
const G_U: i64 = 714_403;
const G_V: i64 = 344_340;
const G_BIAS: i64 = 135_000_000;
const B_V: i64 = 1_773_049;
const B_BIAS: i64 = 226_000_000;

/// RGB to YUV coefficients, scaled by 10^5
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CoefficientProfile {
    pub cy: i32,
    pub cyr: i32,
    pub cyg: i32,
    pub cyb: i32,
    pub cur: i32,
    pub cug: i32,
    pub cub: i32,
    pub cvr: i32,
    pub cvg: i32,
    pub cvb: i32,
}

impl CoefficientProfile {

    pub const BT601: Self = Self {
        cy: 0,
        cyr: 29_900,
        cyg: 58_700,
        cyb: 11_400,
        cur: 16_868,
        cug: 33_107,
        cub: 49_970,
        cvr: 49_980,
        cvg: 41_850,
        cvb: 8_128,
    };

    pub const ITU656: Self = Self {
        cy: 1_600_000,
        cyr: 29_900,
        cyg: 58_700,
        cyb: 11_400,
        cur: 17_258,
        cug: 33_881,
        cub: 51_140,
        cvr: 51_138,
        cvg: 42_820,
        cvb: 8_316,
    };

    /// Profile for the display interface the core drives
    pub const fn for_interface(itu656: bool) -> Self {
        if itu656 {
            Self::ITU656
        } else {
            Self::BT601
        }
    }

}

impl Default for CoefficientProfile {
    fn default() -> Self {
        Self::BT601
    }
}

#[inline(always)]
fn saturate(value: i64) -> u8 {
    value.clamp(0, 255) as u8
}

pub fn rgb_to_yuv(r: u8, g: u8, b: u8, profile: &CoefficientProfile) -> (u8, u8, u8) {
    let (r, g, b) = (r as i64, g as i64, b as i64);
    let p = profile;

    let y = (p.cyr as i64 * r + p.cyg as i64 * g + p.cyb as i64 * b + p.cy as i64) / YUV_NORM;
    let u = (-(p.cur as i64) * r - p.cug as i64 * g + p.cub as i64 * b + UV_BIAS) / YUV_NORM;
    let v = (p.cvr as i64 * r - p.cvg as i64 * g - p.cvb as i64 * b + UV_BIAS) / YUV_NORM;

    (saturate(y), saturate(u), saturate(v))
}

pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as i64 * RGB_NORM;
    let (u, v) = (u as i64, v as i64);

    let r = (y + R_U * u - R_BIAS) / RGB_NORM;
    let g = (y - G_U * u - G_V * v + G_BIAS) / RGB_NORM;
    let b = (y - B_V * v - B_BIAS) / RGB_NORM;

    (saturate(r), saturate(g), saturate(b))
}

/// Pack a YUV sample into a register or CLUT word of `format`.
///
/// Formats with 10-bit components keep two bits of alpha at the top.
///
pub fn pack_yuv(format: &PixelFormat, a: u32, y: u32, u: u32, v: u32) -> u32 {
    if format.is_deep_color() {
        (a & 0b11) << 30 | (y & 0x3FF) << 20 | (u & 0x3FF) << 10 | (v & 0x3FF)
    } else {
        (a & 0xFF) << 24 | (y & 0xFF) << 16 | (u & 0xFF) << 8 | (v & 0xFF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{resolve_format, LayerType, Transparency};

    #[test]
    fn bt601_red() {
        assert_eq!(rgb_to_yuv(255, 0, 0, &CoefficientProfile::BT601), (76, 84, 255));
    }

    #[test]
    fn bt601_black_and_white() {
        let p = CoefficientProfile::BT601;
        assert_eq!(rgb_to_yuv(0, 0, 0, &p), (0, 128, 128));
        assert_eq!(rgb_to_yuv(255, 255, 255, &p), (255, 127, 128));
    }

    #[test]
    fn itu656_saturates_luma() {
        let p = CoefficientProfile::ITU656;
        assert_eq!(rgb_to_yuv(0, 0, 0, &p).0, 16);
        assert_eq!(rgb_to_yuv(255, 255, 255, &p).0, 255);
    }

    #[test]
    fn itu656_primaries() {
        let p = CoefficientProfile::ITU656;
        assert_eq!(rgb_to_yuv(0, 255, 0, &p), (165, 41, 18));
        assert_eq!(rgb_to_yuv(255, 0, 0, &p), (92, 83, 255));
        assert_eq!(rgb_to_yuv(0, 0, 255, &p), (45, 255, 106));
    }

    #[test]
    fn reverse_conversion_truncates_and_saturates() {
        assert_eq!(yuv_to_rgb(128, 128, 128), (128, 127, 0));
        assert_eq!(yuv_to_rgb(0, 0, 0), (0, 135, 0));
        assert_eq!(yuv_to_rgb(255, 255, 255), (255, 120, 0));
    }

    #[test]
    fn profile_selection() {
        assert_eq!(CoefficientProfile::for_interface(true), CoefficientProfile::ITU656);
        assert_eq!(CoefficientProfile::for_interface(false), CoefficientProfile::default());
    }

    #[test]
    fn packs_by_component_width() {
        let ayuv = resolve_format(LayerType::Yuv, 32, Some(Transparency::Pixel), false).unwrap();
        assert_eq!(pack_yuv(&ayuv, 0xFF, 1, 2, 3), 0xFF01_0203);

        let deep = resolve_format(LayerType::Yuv, 30, Some(Transparency::Layer), false).unwrap();
        assert_eq!(pack_yuv(&deep, 0xFF, 1, 2, 3), 3 << 30 | 1 << 20 | 2 << 10 | 3);
    }

}

// eof
