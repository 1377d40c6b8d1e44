// SPDX-License-Identifier: GPL-3.0-or-later

//! Pixel format catalog. A logiCVC layer is synthesized with a fixed type,
//! depth and transparency mode; this module maps that description onto the
//! bit layout of a pixel in memory (or of a CLUT entry for indexed layers).
//!
//! Layouts are resolved in two steps: the per-pixel alpha channel first,
//! then the color channels shared by every format of the same base.
//!

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use crate::error::{CvcError, Result};

/// Declared layer depths an IP core can be built with
pub const LEGAL_BITS_PER_PIXEL: [u32; 6] = [8, 16, 20, 24, 30, 32];

/// Layer color space as configured in hardware
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Rgb,
    Yuv,
    Alpha,
}

/// Where a layer's transparency comes from
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transparency {

    /// One alpha value for the whole layer
    Layer,

    /// Alpha stored with every pixel
    Pixel,

    /// Indexed, 16-bit ARGB6565 CLUT entries
    Clut16,

    /// Indexed, 32-bit CLUT entries
    Clut32,

}

/// Resolved memory format of a layer
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ColorFormat {
    A8,
    C8,
    Rgb332,
    Bgr233,
    Argb3332,
    Abgr3233,
    Rgb565,
    Bgr565,
    Argb565,
    Abgr565,
    Xrgb8888,
    Xbgr8888,
    Argb8888,
    Abgr8888,
    Xrgb2101010,
    Xbgr2101010,
    Yuyv,
    Uyvy,
    Yuyv121010,
    Uyvy121010,
    Ayuv,
    Avuy,
    Xyuv,
    Xvuy,
    Xyuv2101010,
    Xvuy2101010,
}

/// CLUT entry format of an indexed (C8) layer
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ClutFormat {
    Argb6565,
    Argb8888,
    Ayuv8888,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Classification {
    Rgb,
    Yuv,
    Alpha,
    Clut,
}

/// Bit field of one component; a zero length marks an absent component
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct Channel {
    pub offset: u8,
    pub length: u8,
}

impl Channel {

    pub const NONE: Self = Self::new(0, 0);

    #[inline(always)]
    pub const fn new(offset: u8, length: u8) -> Self {
        Self { offset, length }
    }

    #[inline(always)]
    pub const fn is_present(&self) -> bool {
        self.length != 0
    }

    /// Right-aligned mask covering `length` bits
    #[inline(always)]
    pub const fn mask(&self) -> u32 {
        if self.length >= 32 {
            u32::MAX
        } else {
            (1 << self.length) - 1
        }
    }

}

/// Component positions of a pixel word.
///
/// For YUV layers `red`, `green` and `blue` carry Y, U and V. On the 4:2:2
/// formats the `transparency` slot holds the second luma sample.
///
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct ChannelLayout {
    pub transparency: Channel,
    pub red: Channel,
    pub green: Channel,
    pub blue: Channel,
}

/// A fully resolved layer pixel format
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct PixelFormat {
    pub id: ColorFormat,
    pub layer_type: LayerType,
    pub classification: Classification,

    /// Storage depth of one pixel: 8, 16 or 32
    pub bits_per_pixel: u32,

    /// Depth the layer was declared with
    pub declared_bits_per_pixel: u32,

    pub layout: ChannelLayout,
    pub clut: Option<ClutFormat>,
    pub component_swap: bool,

    /// `None` on alpha layers
    pub transparency: Option<Transparency>,
}

/// One resolution rule: a layer description and the format pair it yields
/// without and with component swap.
struct Rule {
    layer_type: LayerType,
    bits_per_pixel: &'static [u32],
    transparency: Option<Transparency>,
    formats: [ColorFormat; 2],
    clut: Option<ClutFormat>,
}

const fn rule(
    layer_type: LayerType,
    bits_per_pixel: &'static [u32],
    transparency: Transparency,
    formats: [ColorFormat; 2],
) -> Rule {
    Rule {
        layer_type,
        bits_per_pixel,
        transparency: Some(transparency),
        formats,
        clut: None,
    }
}

const fn indexed(
    layer_type: LayerType,
    transparency: Transparency,
    clut: ClutFormat,
) -> Rule {
    Rule {
        layer_type,
        bits_per_pixel: &[8],
        transparency: Some(transparency),
        formats: [ColorFormat::C8, ColorFormat::C8],
        clut: Some(clut),
    }
}

const TRUE_COLOR: &[u32] = &[24, 32];

const RULES: &[Rule] = {
    use ColorFormat::*;
    use LayerType::{Rgb, Yuv};
    use Transparency::*;
    &[
        Rule {
            layer_type: LayerType::Alpha,
            bits_per_pixel: &LEGAL_BITS_PER_PIXEL,
            transparency: None,
            formats: [A8, A8],
            clut: None,
        },
        indexed(Rgb, Clut16, ClutFormat::Argb6565),
        indexed(Rgb, Clut32, ClutFormat::Argb8888),
        rule(Rgb, &[8], Layer, [Rgb332, Bgr233]),
        rule(Rgb, &[8], Pixel, [Argb3332, Abgr3233]),
        rule(Rgb, &[16], Layer, [Rgb565, Bgr565]),
        rule(Rgb, &[16], Pixel, [Argb565, Abgr565]),
        rule(Rgb, &[30], Layer, [Xrgb2101010, Xbgr2101010]),
        rule(Rgb, TRUE_COLOR, Layer, [Xrgb8888, Xbgr8888]),
        rule(Rgb, TRUE_COLOR, Pixel, [Argb8888, Abgr8888]),
        indexed(Yuv, Clut32, ClutFormat::Ayuv8888),
        rule(Yuv, &[16], Layer, [Yuyv, Uyvy]),
        rule(Yuv, &[20], Layer, [Yuyv121010, Uyvy121010]),
        rule(Yuv, &[30], Layer, [Xyuv2101010, Xvuy2101010]),
        rule(Yuv, TRUE_COLOR, Layer, [Xyuv, Xvuy]),
        rule(Yuv, TRUE_COLOR, Pixel, [Ayuv, Avuy]),
    ]
};

impl Rule {

    fn matches(
        &self,
        layer_type: LayerType,
        bits_per_pixel: u32,
        transparency: Option<Transparency>,
    ) -> bool {
        self.layer_type == layer_type
            && self.bits_per_pixel.contains(&bits_per_pixel)
            && (self.transparency.is_none() || self.transparency == transparency)
    }

}

/// Resolve the pixel format of a layer.
///
/// Alpha layers ignore `transparency` and `component_swap` and always
/// resolve to A8. Indexed layers ignore `component_swap`.
///
pub fn resolve_format(
    layer_type: LayerType,
    bits_per_pixel: u32,
    transparency: Option<Transparency>,
    component_swap: bool,
) -> Result<PixelFormat> {
    if !LEGAL_BITS_PER_PIXEL.contains(&bits_per_pixel) {
        return Err(CvcError::InvalidBitsPerPixel(bits_per_pixel));
    }

    let rule = RULES
        .iter()
        .find(|rule| rule.matches(layer_type, bits_per_pixel, transparency))
        .ok_or(CvcError::UnsupportedFormat {
            layer_type,
            bits_per_pixel,
            transparency,
            component_swap,
        })?;

    let id = rule.formats[component_swap as usize];
    Ok(PixelFormat {
        id,
        layer_type,
        classification: classify(id),
        bits_per_pixel: storage_bits(id),
        declared_bits_per_pixel: bits_per_pixel,
        layout: layout(id, rule.clut),
        clut: rule.clut,
        component_swap,
        transparency: match layer_type {
            LayerType::Alpha => None,
            _ => transparency,
        },
    })
}

const fn classify(id: ColorFormat) -> Classification {
    use ColorFormat::*;
    match id {
        A8 => Classification::Alpha,
        C8 => Classification::Clut,
        Yuyv | Uyvy | Yuyv121010 | Uyvy121010 | Ayuv | Avuy | Xyuv | Xvuy
        | Xyuv2101010 | Xvuy2101010 => Classification::Yuv,
        _ => Classification::Rgb,
    }
}

const fn storage_bits(id: ColorFormat) -> u32 {
    use ColorFormat::*;
    match id {
        A8 | C8 | Rgb332 | Bgr233 => 8,
        Argb3332 | Abgr3233 | Rgb565 | Bgr565 | Yuyv | Uyvy => 16,
        _ => 32,
    }
}

/// Step one: the per-pixel (or per-entry) alpha channel
const fn alpha_channel(id: ColorFormat, clut: Option<ClutFormat>) -> Channel {
    use ColorFormat::*;
    match (id, clut) {
        (A8, _) => Channel::new(0, 8),
        (C8, Some(ClutFormat::Argb6565)) => Channel::new(24, 6),
        (C8, Some(_)) => Channel::new(24, 8),
        (Argb3332 | Abgr3233, _) => Channel::new(8, 3),
        (Argb565 | Abgr565, _) => Channel::new(24, 6),
        (Argb8888 | Abgr8888 | Ayuv | Avuy, _) => Channel::new(24, 8),
        _ => Channel::NONE,
    }
}

/// Step two: the color channels of the format's base layout
const fn base_layout(id: ColorFormat, clut: Option<ClutFormat>) -> ChannelLayout {
    use ColorFormat::*;
    let (transparency, red, green, blue) = match (id, clut) {
        (A8, _) | (C8, None) => ((0, 0), (0, 0), (0, 0), (0, 0)),
        (C8, Some(ClutFormat::Argb6565)) => ((0, 0), (19, 5), (10, 6), (3, 5)),
        (C8, Some(_)) => ((0, 0), (16, 8), (8, 8), (0, 8)),
        (Rgb332 | Argb3332, _) => ((0, 0), (5, 3), (2, 3), (0, 2)),
        (Bgr233 | Abgr3233, _) => ((0, 0), (0, 3), (3, 3), (6, 2)),
        (Rgb565 | Argb565, _) => ((0, 0), (11, 5), (5, 6), (0, 5)),
        (Bgr565 | Abgr565, _) => ((0, 0), (0, 5), (5, 6), (11, 5)),
        (Xrgb8888 | Argb8888 | Xyuv | Ayuv, _) => ((0, 0), (16, 8), (8, 8), (0, 8)),
        (Xbgr8888 | Abgr8888 | Xvuy | Avuy, _) => ((0, 0), (0, 8), (8, 8), (16, 8)),
        (Xrgb2101010 | Xyuv2101010, _) => ((0, 0), (20, 10), (10, 10), (0, 10)),
        (Xbgr2101010 | Xvuy2101010, _) => ((0, 0), (0, 10), (10, 10), (20, 10)),
        (Yuyv, _) => ((16, 8), (0, 8), (8, 8), (24, 8)),
        (Uyvy, _) => ((24, 8), (8, 8), (0, 8), (16, 8)),
        (Yuyv121010, _) => ((0, 10), (0, 10), (10, 10), (10, 10)),
        (Uyvy121010, _) => ((10, 10), (10, 10), (0, 10), (0, 10)),
    };
    ChannelLayout {
        transparency: Channel::new(transparency.0, transparency.1),
        red: Channel::new(red.0, red.1),
        green: Channel::new(green.0, green.1),
        blue: Channel::new(blue.0, blue.1),
    }
}

const fn layout(id: ColorFormat, clut: Option<ClutFormat>) -> ChannelLayout {
    let alpha = alpha_channel(id, clut);
    let base = base_layout(id, clut);
    ChannelLayout {
        transparency: if alpha.is_present() { alpha } else { base.transparency },
        ..base
    }
}

impl PixelFormat {

    /// Every format but indexed color can back a text console
    #[inline(always)]
    pub fn allows_console(&self) -> bool {
        self.id != ColorFormat::C8
    }

    #[inline(always)]
    pub fn is_yuv422(&self) -> bool {
        matches!(
            self.id,
            ColorFormat::Yuyv
                | ColorFormat::Uyvy
                | ColorFormat::Yuyv121010
                | ColorFormat::Uyvy121010
        )
    }

    #[inline(always)]
    pub fn is_yuv(&self) -> bool {
        self.classification == Classification::Yuv
            || self.clut == Some(ClutFormat::Ayuv8888)
    }

    #[inline(always)]
    pub fn bytes_per_pixel(&self) -> u32 {
        self.bits_per_pixel / 8
    }

    /// Width of the layer alpha register, for layer-uniform transparency
    pub fn alpha_bits(&self) -> Option<u8> {
        use ColorFormat::*;
        if self.transparency != Some(Transparency::Layer) {
            return None;
        }
        match self.id {
            Rgb332 | Bgr233 => Some(3),
            Rgb565 | Bgr565 => Some(6),
            Xrgb8888 | Xbgr8888 | Yuyv | Uyvy | Xyuv | Xvuy => Some(8),
            Xrgb2101010 | Xbgr2101010 | Yuyv121010 | Uyvy121010
            | Xyuv2101010 | Xvuy2101010 => Some(10),
            _ => None,
        }
    }

    /// Whether color components are ten bits wide
    #[inline(always)]
    pub fn is_deep_color(&self) -> bool {
        self.layout.red.length == 10
    }

    /// Truecolor format matching the color registers of this layer.
    ///
    /// Indexed layers program transparent colors in the format of their
    /// CLUT entries.
    pub fn register_format(&self) -> ColorFormat {
        match self.clut {
            Some(ClutFormat::Argb6565) => ColorFormat::Argb565,
            Some(ClutFormat::Argb8888) => ColorFormat::Abgr8888,
            Some(ClutFormat::Ayuv8888) => ColorFormat::Ayuv,
            None => self.id,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TRANSPARENCY: [Option<Transparency>; 5] = [
        None,
        Some(Transparency::Layer),
        Some(Transparency::Pixel),
        Some(Transparency::Clut16),
        Some(Transparency::Clut32),
    ];

    fn resolve(
        layer_type: LayerType,
        bpp: u32,
        transparency: Transparency,
        swap: bool,
    ) -> PixelFormat {
        resolve_format(layer_type, bpp, Some(transparency), swap).unwrap()
    }

    #[test]
    fn resolution_table() {
        use ColorFormat::*;
        use LayerType::*;
        use Transparency::*;
        let cases = [
            (Rgb, 8, Layer, false, Rgb332),
            (Rgb, 8, Layer, true, Bgr233),
            (Rgb, 8, Pixel, false, Argb3332),
            (Rgb, 8, Pixel, true, Abgr3233),
            (Rgb, 16, Layer, false, Rgb565),
            (Rgb, 16, Layer, true, Bgr565),
            (Rgb, 16, Pixel, false, Argb565),
            (Rgb, 16, Pixel, true, Abgr565),
            (Rgb, 30, Layer, false, Xrgb2101010),
            (Rgb, 30, Layer, true, Xbgr2101010),
            (Rgb, 24, Layer, false, Xrgb8888),
            (Rgb, 32, Layer, true, Xbgr8888),
            (Rgb, 32, Pixel, false, Argb8888),
            (Rgb, 24, Pixel, true, Abgr8888),
            (Yuv, 16, Layer, false, Yuyv),
            (Yuv, 16, Layer, true, Uyvy),
            (Yuv, 20, Layer, false, Yuyv121010),
            (Yuv, 20, Layer, true, Uyvy121010),
            (Yuv, 30, Layer, false, Xyuv2101010),
            (Yuv, 30, Layer, true, Xvuy2101010),
            (Yuv, 32, Layer, false, Xyuv),
            (Yuv, 24, Layer, true, Xvuy),
            (Yuv, 32, Pixel, false, Ayuv),
            (Yuv, 32, Pixel, true, Avuy),
        ];
        for (layer_type, bpp, transparency, swap, id) in cases {
            assert_eq!(resolve(layer_type, bpp, transparency, swap).id, id);
        }
    }

    #[test]
    fn indexed_layers_carry_clut_format() {
        let format = resolve(LayerType::Rgb, 8, Transparency::Clut16, true);
        assert_eq!(format.id, ColorFormat::C8);
        assert_eq!(format.clut, Some(ClutFormat::Argb6565));
        assert_eq!(format.classification, Classification::Clut);
        assert!(!format.allows_console());

        let format = resolve(LayerType::Yuv, 8, Transparency::Clut32, false);
        assert_eq!(format.clut, Some(ClutFormat::Ayuv8888));
        assert!(format.is_yuv());
        assert_eq!(format.register_format(), ColorFormat::Ayuv);
    }

    #[test]
    fn alpha_layers_accept_any_legal_depth() {
        for bpp in LEGAL_BITS_PER_PIXEL {
            for transparency in ALL_TRANSPARENCY {
                let format = resolve_format(LayerType::Alpha, bpp, transparency, true).unwrap();
                assert_eq!(format.id, ColorFormat::A8);
                assert_eq!(format.transparency, None);
                assert_eq!(format.layout.transparency, Channel::new(0, 8));
            }
        }
    }

    #[test]
    fn rejects_unknown_combinations() {
        assert_eq!(
            resolve_format(LayerType::Rgb, 12, Some(Transparency::Layer), false),
            Err(CvcError::InvalidBitsPerPixel(12)),
        );
        assert!(matches!(
            resolve_format(LayerType::Yuv, 16, Some(Transparency::Pixel), false),
            Err(CvcError::UnsupportedFormat { .. }),
        ));
        assert!(matches!(
            resolve_format(LayerType::Yuv, 8, Some(Transparency::Clut16), false),
            Err(CvcError::UnsupportedFormat { .. }),
        ));
        assert!(matches!(
            resolve_format(LayerType::Rgb, 16, None, false),
            Err(CvcError::UnsupportedFormat { .. }),
        ));
    }

    #[test]
    fn layouts_combine_alpha_and_base() {
        let argb565 = resolve(LayerType::Rgb, 16, Transparency::Pixel, false);
        assert_eq!(argb565.layout.transparency, Channel::new(24, 6));
        assert_eq!(argb565.layout.red, Channel::new(11, 5));
        assert_eq!(argb565.bits_per_pixel, 32);

        let rgb565 = resolve(LayerType::Rgb, 16, Transparency::Layer, false);
        assert!(!rgb565.layout.transparency.is_present());
        assert_eq!(rgb565.bits_per_pixel, 16);

        let abgr3233 = resolve(LayerType::Rgb, 8, Transparency::Pixel, true);
        assert_eq!(abgr3233.layout.transparency, Channel::new(8, 3));
        assert_eq!(abgr3233.layout.blue, Channel::new(6, 2));
        assert_eq!(abgr3233.bits_per_pixel, 16);

        let yuyv = resolve(LayerType::Yuv, 16, Transparency::Layer, false);
        assert_eq!(yuyv.layout.transparency, Channel::new(16, 8));
        assert_eq!(yuyv.layout.blue, Channel::new(24, 8));
        assert!(yuyv.is_yuv422());

        let clut = resolve(LayerType::Rgb, 8, Transparency::Clut16, false);
        assert_eq!(clut.layout.transparency, Channel::new(24, 6));
        assert_eq!(clut.layout.red, Channel::new(19, 5));
        assert_eq!(clut.layout.green, Channel::new(10, 6));
        assert_eq!(clut.layout.blue, Channel::new(3, 5));
        assert_eq!(clut.bits_per_pixel, 8);
    }

    #[test]
    fn alpha_bit_widths() {
        use LayerType::*;
        use Transparency::*;
        assert_eq!(resolve(Rgb, 8, Layer, false).alpha_bits(), Some(3));
        assert_eq!(resolve(Rgb, 16, Layer, true).alpha_bits(), Some(6));
        assert_eq!(resolve(Yuv, 16, Layer, true).alpha_bits(), Some(8));
        assert_eq!(resolve(Yuv, 20, Layer, false).alpha_bits(), Some(10));
        assert_eq!(resolve(Rgb, 32, Pixel, false).alpha_bits(), None);
        assert_eq!(resolve(Rgb, 8, Clut32, false).alpha_bits(), None);
    }

    #[test]
    fn format_tags_are_numeric() {
        let raw: u8 = ColorFormat::Uyvy.into();
        assert_eq!(ColorFormat::try_from(raw).ok(), Some(ColorFormat::Uyvy));
        assert!(ColorFormat::try_from(200u8).is_err());
    }

}

// eof
