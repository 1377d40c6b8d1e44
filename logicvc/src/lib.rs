// SPDX-License-Identifier: GPL-3.0-or-later

//! Hardware abstraction for the Xylon logiCVC display controller.
//!
//! A logiCVC mixes up to five layers (plus an optional background color)
//! from frame buffers in memory onto one video output. This crate resolves
//! layer pixel formats, converts colors between the layer format and the
//! packed register values, places layers on screen and executes the layer
//! control commands of the driver interface against a register window.
//!
//! Documentation:
//!     - logiCVC-ML Compact Multilayer Video Controller, Xylon d.o.o.
//!

pub mod alpha;
pub mod codec;
pub mod color;
pub mod config;
pub mod control;
pub mod dev;
pub mod device;
pub mod error;
pub mod format;
pub mod geometry;

pub use config::DeviceConfig;
pub use control::{Access, Command, HwAccess, Reply};
pub use device::{Device, IpVersion, Layer};
pub use error::{CvcError, Result};
pub use format::{resolve_format, ColorFormat, LayerType, PixelFormat, Transparency};

// eof
