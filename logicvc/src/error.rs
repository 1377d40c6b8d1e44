// SPDX-License-Identifier: GPL-3.0-or-later

//! Error types for layer configuration and control operations

use thiserror::Error;

use crate::format::{ColorFormat, LayerType, PixelFormat, Transparency};

/// Result type alias for logiCVC operations
pub type Result<T> = core::result::Result<T, CvcError>;

/// Errors surfaced by the format, color, and geometry engine
///
/// Every failure is a plain value; nothing here is retried internally.
///
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CvcError {

    /// No catalog entry for the requested layer description
    #[error(
        "unsupported format: {layer_type:?} layer at {bits_per_pixel} bpp \
         with {transparency:?} transparency (swap: {component_swap})"
    )]
    UnsupportedFormat {
        layer_type: LayerType,
        bits_per_pixel: u32,
        transparency: Option<Transparency>,
        component_swap: bool,
    },

    /// Declared bits-per-pixel is not one the IP core can be built with
    #[error("invalid bits-per-pixel value {0}")]
    InvalidBitsPerPixel(u32),

    /// Layer alpha is only available with layer-uniform transparency
    #[error("layer alpha not supported by {0:?} layer")]
    AlphaNotSupported(ColorFormat),

    /// Requested position lies outside the visible area
    #[error("position ({x}, {y}) outside {xres}x{yres}")]
    InvalidPosition {
        x: u32,
        y: u32,
        xres: u32,
        yres: u32,
    },

    /// Requested size is empty or exceeds the layer buffer
    #[error("invalid size {width}x{height}")]
    InvalidSize {
        width: u32,
        height: u32,
    },

    /// First visible pixel lies beyond the 32-bit layer address space
    #[error("buffer offset ({x_offset}, {y_offset}) beyond the addressable layer buffer")]
    OffsetOutOfRange {
        x_offset: u32,
        y_offset: u32,
    },

    /// CLUT batch overruns the hardware table
    #[error("CLUT range {start}+{count} exceeds {size} entries")]
    IndexOutOfRange {
        start: usize,
        count: usize,
        size: usize,
    },

    /// Raw register access outside the permitted window
    #[error("register access at offset 0x{0:X} not permitted")]
    RegisterPermissionDenied(u32),

    /// The IP core was built without size-position support
    #[error("layer size and position control not available")]
    GeometryUnsupported,

    /// The IP core was built without a background layer
    #[error("no background layer")]
    NoBackgroundLayer,

    /// Buffer selection register only exists on logiCVC 3.x
    #[error("layer buffer selection not available on logiCVC {major}.x")]
    BufferSelectUnsupported {
        major: u8,
    },

    /// Layer buffer index out of range
    #[error("invalid layer buffer {0}")]
    InvalidBufferId(u8),

    /// Layer index names no configured layer
    #[error("no layer {0}")]
    NoSuchLayer(usize),

    /// Configuration names no layers, or too many
    #[error("invalid layer count {0}")]
    InvalidLayerCount(usize),

    /// Configuration could not be parsed or is inconsistent
    #[error("configuration: {0}")]
    Config(String),

}

impl CvcError {

    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// The layer behind `format` cannot serve the requested operation
    pub fn unsupported(format: &PixelFormat) -> Self {
        Self::UnsupportedFormat {
            layer_type: format.layer_type,
            bits_per_pixel: format.declared_bits_per_pixel,
            transparency: format.transparency,
            component_swap: format.component_swap,
        }
    }

}

impl From<toml::de::Error> for CvcError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

// eof
