// SPDX-License-Identifier: GPL-3.0-or-later

//! Control commands accepted by a layer, one per frame buffer ioctl of the
//! logiCVC driver interface. Each command carries its own typed payload;
//! `CommandCode` gives the ioctl number it corresponds to.
//!

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::codec::LayerColor;
use crate::geometry::LayerGeometry;

/// ioctl numbers of the driver interface (type `'x'`)
#[derive(Clone, Copy, PartialEq, Eq, Debug, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum CommandCode {
    VsyncCtrl = 30,
    LayerIdx = 31,
    LayerAlpha = 32,
    LayerColorTranspCtrl = 33,
    LayerColorTransp = 34,
    LayerGeometry = 35,
    LayerBuffer = 36,
    LayerBufferOffset = 37,
    BackgroundColor = 38,
    LayerExtBuffSwitch = 39,
    HwAccess = 40,
    IpCoreVersion = 41,
    ReloadRegisters = 44,
    HwAccessCtrlReg = 45,
    HwAccessIntStatReg = 46,
}

/// Read or write of a value
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Access<T> {
    Get,
    Set(T),
}

/// Raw register access by byte offset from the register window base
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct HwAccess {
    pub offset: u32,
    pub value: Access<u32>,
}

impl HwAccess {

    pub const fn read(offset: u32) -> Self {
        Self {
            offset,
            value: Access::Get,
        }
    }

    pub const fn write(offset: u32, value: u32) -> Self {
        Self {
            offset,
            value: Access::Set(value),
        }
    }

}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {

    /// Unmask (true) or mask the vertical sync interrupt
    VsyncInterrupt(bool),

    /// Index of the addressed layer
    LayerIndex,

    /// Layer alpha in the 0..=1023 range
    LayerAlpha(Access<u32>),

    /// Compare pixels against the transparent color (true) or not
    ColorTransparency(bool),

    TransparentColor(Access<LayerColor>),

    Geometry(Access<LayerGeometry>),

    /// Active buffer of a multi-buffered layer (logiCVC 3.x only)
    LayerBuffer(Access<u8>),

    /// Line offset of the active layer buffer
    BufferOffset,

    BackgroundColor(Access<LayerColor>),

    /// Let an external signal switch layer buffers
    ExternalBufferSwitch(bool),

    /// Access to a register of the addressed layer
    LayerRegister(HwAccess),

    /// Access to the display control register
    ControlRegister(HwAccess),

    /// Access to the interrupt status register
    InterruptStatus(HwAccess),

    IpVersion,

    /// Restore all layer registers and the interrupt mask from the shadow copy
    ReloadRegisters,

}

impl Command {

    pub fn code(&self) -> CommandCode {
        match self {
            Self::VsyncInterrupt(_) => CommandCode::VsyncCtrl,
            Self::LayerIndex => CommandCode::LayerIdx,
            Self::LayerAlpha(_) => CommandCode::LayerAlpha,
            Self::ColorTransparency(_) => CommandCode::LayerColorTranspCtrl,
            Self::TransparentColor(_) => CommandCode::LayerColorTransp,
            Self::Geometry(_) => CommandCode::LayerGeometry,
            Self::LayerBuffer(_) => CommandCode::LayerBuffer,
            Self::BufferOffset => CommandCode::LayerBufferOffset,
            Self::BackgroundColor(_) => CommandCode::BackgroundColor,
            Self::ExternalBufferSwitch(_) => CommandCode::LayerExtBuffSwitch,
            Self::LayerRegister(_) => CommandCode::HwAccess,
            Self::ControlRegister(_) => CommandCode::HwAccessCtrlReg,
            Self::InterruptStatus(_) => CommandCode::HwAccessIntStatReg,
            Self::IpVersion => CommandCode::IpCoreVersion,
            Self::ReloadRegisters => CommandCode::ReloadRegisters,
        }
    }

}

/// Result of a successfully executed command
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Reply {

    /// Write accepted; nothing to report
    Done,

    LayerIndex(usize),

    Alpha(u32),

    Color(LayerColor),

    Geometry(LayerGeometry),

    Buffer(u8),

    /// Line offset of the active buffer
    BufferOffset(u32),

    Register(u32),

    /// `major << 16 | minor << 8 | patch`
    Version(u32),

}


// eof
