// SPDX-License-Identifier: GPL-3.0-or-later

//! Layer alpha scaling between the 10-bit application range and the native
//! width of a layer's alpha register

use crate::error::{CvcError, Result};
use crate::format::PixelFormat;

/// Largest application alpha value (opaque)
pub const MAX_ALPHA: u32 = 1023;

/// Widths an alpha register is synthesized with
pub const ALPHA_WIDTHS: [u8; 4] = [3, 6, 8, 10];

/// Native alpha register width of a layer with layer-uniform transparency
pub fn alpha_bits(format: &PixelFormat) -> Result<u8> {
    format.alpha_bits().ok_or(CvcError::AlphaNotSupported(format.id))
}

/// Scale a 10-bit alpha value to a `bits` wide register value.
///
/// Values above `MAX_ALPHA` are treated as opaque. `bits` must be one of
/// `ALPHA_WIDTHS`, as returned by `alpha_bits`.
///
pub fn to_hardware(alpha: u32, bits: u8) -> u32 {
    debug_assert!(ALPHA_WIDTHS.contains(&bits), "alpha width {bits}");
    let alpha = alpha.min(MAX_ALPHA) as u64;
    let scale = (((1u64 << bits) - 1) << 16) / MAX_ALPHA as u64;
    ((scale * alpha) >> 16) as u32
}

/// Scale a `bits` wide alpha register value back to 10 bits.
///
/// Truncation loses up to a few steps against `to_hardware`. The 6-bit
/// scale carries a bias of one, so a full 6-bit register reads back as 1023.
/// `bits` must be one of `ALPHA_WIDTHS`.
///
pub fn from_hardware(raw: u32, bits: u8) -> u32 {
    debug_assert!(ALPHA_WIDTHS.contains(&bits), "alpha width {bits}");
    let raw = (raw & (MAX_ALPHA >> (10 - bits))) as u64;
    let bias = (bits == 6) as u64;
    let scale = ((MAX_ALPHA as u64) << 16) / ((1u64 << bits) - 1) + bias;
    ((scale * raw) >> 16) as u32
}


// eof
