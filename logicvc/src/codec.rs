// SPDX-License-Identifier: GPL-3.0-or-later

//! Packing of color components into pixel words, CLUT entries and the
//! transparent/background color registers

use crate::color::{pack_yuv, rgb_to_yuv, yuv_to_rgb, CoefficientProfile};
use crate::dev::cvc::CLUT_SIZE;
use crate::error::{CvcError, Result};
use crate::format::{Channel, ClutFormat, ColorFormat, PixelFormat};

/// Logical color components. YUV formats carry Y, U and V in `r`, `g`
/// and `b`; on 4:2:2 formats `a` is the second luma sample.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Channels {
    pub a: u32,
    pub r: u32,
    pub g: u32,
    pub b: u32,
}

#[inline(always)]
fn put(channel: Channel, value: u32) -> u32 {
    if channel.is_present() {
        (value & channel.mask()) << channel.offset
    } else {
        0
    }
}

#[inline(always)]
fn get(channel: Channel, raw: u32) -> u32 {
    if channel.is_present() {
        (raw >> channel.offset) & channel.mask()
    } else {
        0
    }
}

/// Pack components into a word of `format`, truncating each to its field
pub fn encode(format: &PixelFormat, channels: &Channels) -> u32 {
    let layout = &format.layout;
    put(layout.transparency, channels.a)
        | put(layout.red, channels.r)
        | put(layout.green, channels.g)
        | put(layout.blue, channels.b)
}

/// Extract components from a word of `format`; absent components read 0
pub fn decode(format: &PixelFormat, raw: u32) -> Channels {
    let layout = &format.layout;
    Channels {
        a: get(layout.transparency, raw),
        r: get(layout.red, raw),
        g: get(layout.green, raw),
        b: get(layout.blue, raw),
    }
}

/// 8-bit ARGB color of one CLUT slot
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ClutEntry {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ClutEntry {

    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

}

/// Pack `count` CLUT entries destined for slots `start..start + count`
pub fn encode_clut_range(
    format: &PixelFormat,
    entries: &[ClutEntry],
    start: usize,
    count: usize,
    profile: &CoefficientProfile,
) -> Result<Vec<u32>> {
    let clut = format.clut.ok_or_else(|| CvcError::unsupported(format))?;

    if start.checked_add(count).map_or(true, |end| end > CLUT_SIZE) {
        return Err(CvcError::IndexOutOfRange {
            start,
            count,
            size: CLUT_SIZE,
        });
    }
    if count > entries.len() {
        return Err(CvcError::IndexOutOfRange {
            start: 0,
            count,
            size: entries.len(),
        });
    }

    let words = entries[..count]
        .iter()
        .map(|entry| {
            let (a, r, g, b) = (entry.a as u32, entry.r as u32, entry.g as u32, entry.b as u32);
            let channels = match clut {
                ClutFormat::Argb6565 => Channels {
                    a: a >> 2,
                    r: r >> 3,
                    g: g >> 2,
                    b: b >> 3,
                },
                ClutFormat::Argb8888 => Channels { a, r, g, b },
                ClutFormat::Ayuv8888 => {
                    let (y, u, v) = rgb_to_yuv(entry.r, entry.g, entry.b, profile);
                    Channels {
                        a,
                        r: y as u32,
                        g: u as u32,
                        b: v as u32,
                    }
                }
            };
            encode(format, &channels)
        })
        .collect();

    Ok(words)
}

/// Application view of a transparent or background color register.
///
/// Components are 8 bits wide except on formats with 10-bit components.
/// With `use_raw` set, `raw` is written verbatim.
///
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct LayerColor {
    pub raw: u32,
    pub use_raw: bool,
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

impl LayerColor {

    pub const fn rgb(r: u16, g: u16, b: u16) -> Self {
        Self {
            raw: 0,
            use_raw: false,
            r,
            g,
            b,
        }
    }

    pub const fn raw(raw: u32) -> Self {
        Self {
            raw,
            use_raw: true,
            r: 0,
            g: 0,
            b: 0,
        }
    }

}

/// Component packing family of a color register
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Family {
    Rgb332,
    Rgb565,
    Lanes8,
    Lanes10,
    Unsupported,
}

fn family(format: &PixelFormat) -> Family {
    use ColorFormat::*;
    match format.register_format() {
        Rgb332 | Bgr233 | Argb3332 | Abgr3233 => Family::Rgb332,
        Rgb565 | Bgr565 | Argb565 | Abgr565 => Family::Rgb565,
        Xrgb8888 | Xbgr8888 | Argb8888 | Abgr8888 | Yuyv | Uyvy | Xyuv | Xvuy | Ayuv
        | Avuy => Family::Lanes8,
        Xrgb2101010 | Xbgr2101010 | Yuyv121010 | Uyvy121010 | Xyuv2101010
        | Xvuy2101010 => Family::Lanes10,
        A8 | C8 => Family::Unsupported,
    }
}

/// Replicate a `bits` wide value into a full 8-bit component
fn expand(value: u32, bits: u32) -> u16 {
    let mut out = 0;
    let mut shift = 8 - bits as i32;
    while shift > -(bits as i32) {
        out |= if shift >= 0 {
            value << shift
        } else {
            value >> -shift
        };
        shift -= bits as i32;
    }
    (out & 0xFF) as u16
}

/// Register word for a color of `format`.
///
/// `yuv` is set when the device mixes layers in YUV; colors are then
/// converted with `profile` before packing.
pub fn encode_color(
    format: &PixelFormat,
    color: &LayerColor,
    yuv: bool,
    profile: &CoefficientProfile,
) -> u32 {
    if color.use_raw {
        return color.raw;
    }

    let (r, g, b) = (color.r as u32, color.g as u32, color.b as u32);
    if yuv {
        let (y, u, v) = rgb_to_yuv(r as u8, g as u8, b as u8, profile);
        return pack_yuv(format, 0xFF, y as u32, u as u32, v as u32);
    }

    match family(format) {
        Family::Rgb332 => (r & 0xE0) | ((g & 0xE0) >> 3) | ((b & 0xC0) >> 6),
        Family::Rgb565 => ((r & 0xF8) << 8) | ((g & 0xFC) << 3) | ((b & 0xF8) >> 3),
        Family::Lanes8 => ((r & 0xFF) << 16) | ((g & 0xFF) << 8) | (b & 0xFF),
        Family::Lanes10 => ((r & 0x3FF) << 20) | ((g & 0x3FF) << 10) | (b & 0x3FF),
        Family::Unsupported => 0,
    }
}

/// Color held by a register word of `format`
pub fn decode_color(format: &PixelFormat, raw: u32, yuv: bool) -> LayerColor {
    let (r, g, b) = if yuv {
        let (r, g, b) = yuv_to_rgb((raw >> 16) as u8, (raw >> 8) as u8, raw as u8);
        (r as u16, g as u16, b as u16)
    } else {
        match family(format) {
            Family::Rgb332 => (
                expand((raw >> 5) & 0x7, 3),
                expand((raw >> 2) & 0x7, 3),
                expand(raw & 0x3, 2),
            ),
            Family::Rgb565 => (
                expand((raw >> 11) & 0x1F, 5),
                expand((raw >> 5) & 0x3F, 6),
                expand(raw & 0x1F, 5),
            ),
            Family::Lanes8 => (
                ((raw >> 16) & 0xFF) as u16,
                ((raw >> 8) & 0xFF) as u16,
                (raw & 0xFF) as u16,
            ),
            Family::Lanes10 => (
                ((raw >> 20) & 0x3FF) as u16,
                ((raw >> 10) & 0x3FF) as u16,
                (raw & 0x3FF) as u16,
            ),
            Family::Unsupported => (0, 0, 0),
        }
    };

    LayerColor {
        raw,
        use_raw: false,
        r,
        g,
        b,
    }
}


// eof
