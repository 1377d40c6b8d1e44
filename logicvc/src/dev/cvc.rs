// SPDX-License-Identifier: GPL-3.0-or-later

//! The logiCVC compact video controller register map. Global registers sit
//! at the bottom of the window, followed by up to five layer register
//! blocks and the color look-up tables.
//!
//! Documentation:
//!     - https://www.logicbricks.com/Products/logiCVC-ML.aspx
//!     - logiCVC-ML Compact Multilayer Video Controller, hardware user's manual
//!

use proc_bitfield::bitfield;

/// Distance between two consecutive 32-bit registers
pub const REG_STRIDE: u32 = 8;

/// Size of the complete register window in bytes
pub const REGISTERS_RANGE: usize = 0x6000;

pub const CTRL: u32 = 8 * REG_STRIDE;
pub const DTYPE: u32 = 9 * REG_STRIDE;
pub const BACKGROUND_COLOR: u32 = 10 * REG_STRIDE;
pub const VBUFF_SELECT: u32 = 11 * REG_STRIDE;
pub const CLUT_SELECT: u32 = 12 * REG_STRIDE;
pub const INT_STAT: u32 = 13 * REG_STRIDE;
pub const INT_MASK: u32 = 14 * REG_STRIDE;
pub const POWER_CTRL: u32 = 15 * REG_STRIDE;
pub const IP_VERSION: u32 = 31 * REG_STRIDE;

pub const LAYER_BASE: u32 = 0x100;
pub const LAYER_BASE_END: u32 = 0x338;

/// Byte span of one layer register block
pub const LAYER_REGISTERS_RANGE: u32 = 0x80;

/// Horizontal offset (logiCVC 3.x)
pub const LAYER_HOFF: u32 = 0;

/// Frame buffer start address (logiCVC 4.x and later); aliases `LAYER_HOFF`
pub const LAYER_ADDR: u32 = 0;

pub const LAYER_VOFF: u32 = REG_STRIDE;
pub const LAYER_HPOS: u32 = 2 * REG_STRIDE;
pub const LAYER_VPOS: u32 = 3 * REG_STRIDE;
pub const LAYER_HSIZE: u32 = 4 * REG_STRIDE;
pub const LAYER_VSIZE: u32 = 5 * REG_STRIDE;
pub const LAYER_ALPHA: u32 = 6 * REG_STRIDE;
pub const LAYER_CTRL: u32 = 7 * REG_STRIDE;
pub const LAYER_TRANSP_COLOR: u32 = 8 * REG_STRIDE;

/// Layer registers restored from the shadow copy after a hardware reset
pub const LAYER_SHADOWED: [u32; 8] = [
    LAYER_ADDR,
    LAYER_HPOS,
    LAYER_VPOS,
    LAYER_HSIZE,
    LAYER_VSIZE,
    LAYER_ALPHA,
    LAYER_CTRL,
    LAYER_TRANSP_COLOR,
];

pub const CLUT_BASE: u32 = 0x1000;
pub const CLUT_REGISTERS_RANGE: u32 = 0x800;
pub const CLUT_SIZE: usize = 256;

pub const MAX_LAYERS: usize = 5;
pub const MAX_LAYER_BUFFERS: u8 = 3;
pub const MIN_XRES: u32 = 64;
pub const MIN_VRES: u32 = 1;

/// Background color of a YUV core after reset
pub const YUV_BLACK: u32 = 0x8080;
pub const RGB_BLACK: u32 = 0;

/// Base offset of a layer register block
#[inline(always)]
pub const fn layer_base(layer: usize) -> u32 {
    LAYER_BASE + layer as u32 * LAYER_REGISTERS_RANGE
}

/// Base offset of the first color look-up table of a layer
#[inline(always)]
pub const fn clut_base(layer: usize) -> u32 {
    CLUT_BASE + 2 * layer as u32 * CLUT_REGISTERS_RANGE
}

bitfield! {

    /// Display control: sync signal generation and polarity
    ///
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct DisplayCtrl(pub u32): FromRaw, IntoRaw {

        pub hsync_enable: bool @ 0,

        pub hsync_invert: bool @ 1,

        pub vsync_enable: bool @ 2,

        pub vsync_invert: bool @ 3,

        pub data_enable: bool @ 4,

        pub data_enable_invert: bool @ 5,

        /// Invert pixel data lines
        pub pixel_data_invert: bool @ 7,

        /// Output pixel data on the rising clock edge
        pub pixel_data_trigger_invert: bool @ 8,

        /// Hold all layer register updates until cleared
        pub disable_layer_update: bool @ 9,

    }

}

bitfield! {

    /// Per-layer control
    ///
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct LayerCtrl(pub u32): FromRaw, IntoRaw {

        pub enable: bool @ 0,

        /// Ignore the transparent color register
        pub color_transparency_disable: bool @ 1,

        /// Let an external input switch between layer buffers
        pub external_buffer_switch: bool @ 2,

        pub interlace: bool @ 3,

        /// Memory component order is ABGR rather than ARGB
        pub pixel_format_abgr: bool @ 4,

    }

}

bitfield! {

    /// Interrupt status and mask layout; status bits clear on write of 1
    ///
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct InterruptBits(pub u32): FromRaw, IntoRaw {

        /// One bit per layer, set when the layer registers were latched
        pub layer_updated: u8 @ 0..=4,

        pub v_sync: bool @ 5,

        pub e_video_valid: bool @ 6,

        pub fifo_underrun: bool @ 7,

        /// One bit per layer, set when a CLUT switch took effect
        pub clut_switch: u8 @ 8..=12,

    }

}

bitfield! {

    /// IP core version
    ///
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct IpVersionReg(pub u32): FromRaw, IntoRaw {
        pub major: u8 @ 11..=16,
        pub minor: u8 @ 5..=10,
        pub patch: u8 @ 0..=4,
    }

}

/// Video buffer select register (logiCVC 3.x).
///
/// Each layer owns a two-bit buffer index at `layer * 2` and a write enable
/// at `10 + layer`; only fields whose enable bit is set are latched.
///
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct BufferSelect(pub u32);

impl BufferSelect {

    #[inline(always)]
    pub fn buffer(&self, layer: usize) -> u8 {
        ((self.0 >> (layer << 1)) & 0b11) as u8
    }

    /// Select `buffer` for `layer` and set its write enable
    pub fn with_buffer(self, layer: usize, buffer: u8) -> Self {
        let shift = layer << 1;
        let mut raw = self.0 | 1 << (10 + layer);
        raw &= !(0b11 << shift);
        raw |= (buffer as u32 & 0b11) << shift;
        Self(raw)
    }

}

impl From<u32> for BufferSelect {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<BufferSelect> for u32 {
    fn from(value: BufferSelect) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_blocks_are_contiguous() {
        assert_eq!(layer_base(0), 0x100);
        assert_eq!(layer_base(4), 0x300);
        assert!(layer_base(4) + LAYER_TRANSP_COLOR <= LAYER_BASE_END);
        assert_eq!(clut_base(1), 0x2000);
    }

    #[test]
    fn version_fields() {
        let version = IpVersionReg((4 << 11) | (2 << 5) | 7);
        assert_eq!(version.major(), 4);
        assert_eq!(version.minor(), 2);
        assert_eq!(version.patch(), 7);
    }

    #[test]
    fn buffer_select_latches_single_layer() {
        let select = BufferSelect(0).with_buffer(2, 3);
        assert_eq!(select.0, (1 << 12) | (3 << 4));
        assert_eq!(select.buffer(2), 3);
        assert_eq!(select.with_buffer(2, 1).buffer(2), 1);
    }

    #[test]
    fn layer_ctrl_bits() {
        let ctrl = LayerCtrl(0).with_enable(true).with_pixel_format_abgr(true);
        assert_eq!(u32::from(ctrl), 0b1_0001);
    }

}

// eof
