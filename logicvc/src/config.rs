// SPDX-License-Identifier: GPL-3.0-or-later

//! Synthesis parameters of a logiCVC instance and its layers, as found in
//! the device tree node of the IP core. Property names are kept so a node
//! can be transcribed into TOML one to one.
//!

use serde::{Deserialize, Serialize};

use crate::dev::cvc::MAX_LAYERS;
use crate::error::{CvcError, Result};
use crate::format::{
    resolve_format, LayerType, PixelFormat, Transparency, LEGAL_BITS_PER_PIXEL,
};

/// Row length in pixels used when the node does not give one
pub const DEFAULT_PIXEL_STRIDE: u32 = 2048;

fn default_pixel_stride() -> u32 {
    DEFAULT_PIXEL_STRIDE
}

/// Background layer of the IP core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BackgroundConfig {
    pub bits_per_pixel: u32,
    #[serde(rename = "type")]
    pub layer_type: LayerType,
}

impl BackgroundConfig {

    /// Format of the background color register
    pub fn resolve(&self) -> Result<PixelFormat> {
        resolve_format(self.layer_type, self.bits_per_pixel, Some(Transparency::Layer), false)
    }

}

/// One layer of the IP core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LayerConfig {

    /// Physical address of the layer buffer
    pub address: u64,

    /// Bytes reserved for the layer buffer; zero when not fixed
    #[serde(default)]
    pub address_range: u64,

    /// Lines between multiple buffers of the layer; zero when single-buffered
    #[serde(default)]
    pub buffer_offset: u32,

    pub bits_per_pixel: u32,

    #[serde(rename = "type")]
    pub layer_type: LayerType,

    /// Absent on alpha layers
    #[serde(default)]
    pub transparency: Option<Transparency>,

    /// Components stored in ABGR order
    #[serde(default)]
    pub component_swap: bool,

}

impl LayerConfig {

    pub fn resolve(&self) -> Result<PixelFormat> {
        resolve_format(self.layer_type, self.bits_per_pixel, self.transparency, self.component_swap)
    }

}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DeviceConfig {

    pub background_layer: Option<BackgroundConfig>,

    /// Drive an ITU-R BT.656 interface; selects the YUV coefficient set
    pub display_interface_itu656: bool,

    /// Registers can be read back; otherwise a shadow copy serves reads
    pub readable_regs: bool,

    /// Layer size and position registers are present
    pub size_position: bool,

    /// Unmask the vertical sync interrupt at start
    pub vsync_irq: bool,

    /// Row length of every layer buffer in pixels
    #[serde(default = "default_pixel_stride")]
    pub pixel_stride: u32,

    /// Layer hosting the text console
    pub console_layer: usize,

    pub hsync_active_low: bool,
    pub vsync_active_low: bool,
    pub data_enable_active_low: bool,
    pub pixel_data_invert: bool,
    pub pixel_data_output_trigger_high: bool,

    pub layers: Vec<LayerConfig>,

}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            background_layer: None,
            display_interface_itu656: false,
            readable_regs: false,
            size_position: false,
            vsync_irq: false,
            pixel_stride: DEFAULT_PIXEL_STRIDE,
            console_layer: 0,
            hsync_active_low: false,
            vsync_active_low: false,
            data_enable_active_low: false,
            pixel_data_invert: false,
            pixel_data_output_trigger_high: false,
            layers: Vec::new(),
        }
    }
}

impl DeviceConfig {

    /// Parse and validate a TOML description
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() || self.layers.len() > MAX_LAYERS {
            return Err(CvcError::InvalidLayerCount(self.layers.len()));
        }
        if self.pixel_stride == 0 {
            return Err(CvcError::config("pixel-stride must not be zero"));
        }

        let depths = self
            .layers
            .iter()
            .map(|layer| layer.bits_per_pixel)
            .chain(self.background_layer.map(|bg| bg.bits_per_pixel));
        for bits_per_pixel in depths {
            if !LEGAL_BITS_PER_PIXEL.contains(&bits_per_pixel) {
                return Err(CvcError::InvalidBitsPerPixel(bits_per_pixel));
            }
        }

        Ok(())
    }

}


// eof
