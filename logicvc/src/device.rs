// SPDX-License-Identifier: GPL-3.0-or-later

//! A logiCVC instance: the register window, what the IP core was built
//! with, and the state of each of its layers. All control goes through
//! `Device::execute`; mutation needs `&mut Device`, which serializes every
//! read-modify-write of a layer.
//!

use core::fmt;

use tracing::{debug, info, warn};

use crate::alpha::{alpha_bits, from_hardware, to_hardware};
use crate::codec::{decode_color, encode_clut_range, encode_color, ClutEntry, LayerColor};
use crate::color::CoefficientProfile;
use crate::config::DeviceConfig;
use crate::control::{Access, Command, HwAccess, Reply};
use crate::dev::cvc::{
    clut_base, layer_base, BufferSelect, DisplayCtrl, InterruptBits, IpVersionReg, LayerCtrl,
    BACKGROUND_COLOR, CTRL, DTYPE, INT_MASK, INT_STAT, IP_VERSION, LAYER_ADDR, LAYER_ALPHA,
    LAYER_CTRL, LAYER_REGISTERS_RANGE, LAYER_SHADOWED, LAYER_TRANSP_COLOR, LAYER_VOFF,
    MAX_LAYER_BUFFERS, REG_STRIDE, RGB_BLACK, VBUFF_SELECT, YUV_BLACK,
};
use crate::dev::reg::{RegisterAccess, Shadowed};
use crate::error::{CvcError, Result};
use crate::format::PixelFormat;
use crate::geometry::{
    self, byte_offset, check_var, get_geometry, set_geometry, virtual_height, AddressingMode,
    Bounds, BufferPlacement, LayerGeometry, ScreenLimits, ScreenVar,
};

/// Video mode a layer starts in before one is set
const DEFAULT_XRES: u32 = 1024;
const DEFAULT_YRES: u32 = 768;

/// Version of the IP core as read from the version register
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct IpVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl IpVersion {

    /// `major << 16 | minor << 8 | patch`
    pub fn packed(&self) -> u32 {
        (self.major as u32) << 16 | (self.minor as u32) << 8 | self.patch as u32
    }

    /// Layer buffers are addressed through ADDR instead of HOFF/VOFF
    pub fn has_dynamic_address(&self) -> bool {
        self.major >= 4
    }

    /// Largest horizontal and vertical resolution
    pub fn max_resolution(&self) -> u32 {
        if self.major >= 5 {
            8192
        } else {
            2048
        }
    }

}

impl From<IpVersionReg> for IpVersion {
    fn from(reg: IpVersionReg) -> Self {
        Self {
            major: reg.major(),
            minor: reg.minor(),
            patch: reg.patch(),
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}.{}", self.major, self.minor, (b'a' + self.patch) as char)
    }
}

/// Optional parts of the IP core
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Features {
    pub readable_regs: bool,
    pub size_position: bool,
    pub vsync_irq: bool,
    pub dynamic_address: bool,

    /// Layers are mixed in YUV; color registers hold YUV values
    pub yuv_background: bool,
}

/// Fixed description and current video mode of one layer
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Layer {
    pub id: usize,
    pub format: PixelFormat,
    pub placement: BufferPlacement,

    /// Buffer height in lines
    pub virtual_height: u32,

    /// Offset of the layer register block
    pub base: u32,

    pub mode: AddressingMode,
    pub var: ScreenVar,
    pub enabled: bool,
}

impl Layer {

    fn bounds(&self) -> Bounds {
        Bounds {
            visible_width: self.var.xres,
            visible_height: self.var.yres,
            virtual_width: self.placement.stride,
        }
    }

    /// Whether `offset` falls inside this layer's register block
    pub fn owns_register(&self, offset: u32) -> bool {
        offset >= self.base && offset < self.base + LAYER_REGISTERS_RANGE && offset % 4 == 0
    }

}

pub struct Device<R> {
    regs: R,
    version: IpVersion,
    features: Features,
    profile: CoefficientProfile,
    background: Option<PixelFormat>,
    display_ctrl: DisplayCtrl,
    console_layer: usize,
    layers: Vec<Layer>,
}

impl<R> Device<Shadowed<R>>
    where
        R: RegisterAccess,
{

    /// Build a device over a shadow copy of `regs`, reading back from the
    /// hardware only if the core was built with readable registers
    pub fn shadowed(regs: R, config: &DeviceConfig) -> Result<Self> {
        Device::new(Shadowed::new(regs, config.readable_regs), config)
    }

}

impl<R> Device<R>
    where
        R: RegisterAccess,
{

    /// Describe the IP core behind `regs`; no register is written
    pub fn new(mut regs: R, config: &DeviceConfig) -> Result<Self> {
        config.validate()?;

        let version = IpVersion::from(IpVersionReg(regs.read_direct(IP_VERSION)));
        let max_res = version.max_resolution();
        info!(%version, layers = config.layers.len(), "logiCVC IP core");

        let formats = config
            .layers
            .iter()
            .map(|layer| layer.resolve())
            .collect::<Result<Vec<_>>>()?;

        let placements = config
            .layers
            .iter()
            .zip(&formats)
            .map(|(layer, format)| BufferPlacement {
                address: layer.address,
                address_range: layer.address_range,
                buffer_offset: layer.buffer_offset,
                stride: config.pixel_stride,
                bytes_per_pixel: format.bytes_per_pixel(),
            })
            .collect::<Vec<_>>();

        let mut layers = Vec::with_capacity(formats.len());
        for (id, (format, placement)) in formats.iter().zip(&placements).enumerate() {
            let buffer_base = u32::try_from(placement.address).map_err(|_| {
                CvcError::config(format!("layer {id} address 0x{:X} beyond 32 bits", placement.address))
            })?;
            let height = virtual_height(&placements, id, max_res);
            let layer = Layer {
                id,
                format: *format,
                placement: *placement,
                virtual_height: height,
                base: layer_base(id),
                mode: AddressingMode::for_version(version.major, buffer_base),
                var: ScreenVar {
                    xres: DEFAULT_XRES.min(placement.stride),
                    yres: DEFAULT_YRES.min(height),
                    xres_virtual: placement.stride,
                    yres_virtual: height,
                    x_offset: 0,
                    y_offset: 0,
                    bits_per_pixel: format.bits_per_pixel,
                },
                enabled: false,
            };
            debug!(
                id,
                format = ?format.id,
                base = layer.base,
                address = placement.address,
                width = placement.stride,
                height,
                "layer"
            );
            layers.push(layer);
        }

        let mut console_layer = config.console_layer;
        if console_layer >= layers.len() {
            warn!(console_layer, "invalid console layer, using layer 0");
            console_layer = 0;
        }
        if !layers[console_layer].format.allows_console() {
            warn!(console_layer, "console layer format cannot host a console");
        }

        let background = config
            .background_layer
            .as_ref()
            .map(|bg| bg.resolve())
            .transpose()?;

        let features = Features {
            readable_regs: config.readable_regs,
            size_position: config.size_position,
            vsync_irq: config.vsync_irq,
            dynamic_address: version.has_dynamic_address(),
            yuv_background: background.map_or(false, |bg| bg.is_yuv()),
        };

        let display_ctrl = DisplayCtrl::default()
            .with_hsync_enable(true)
            .with_vsync_enable(true)
            .with_data_enable(true)
            .with_hsync_invert(config.hsync_active_low)
            .with_vsync_invert(config.vsync_active_low)
            .with_data_enable_invert(config.data_enable_active_low)
            .with_pixel_data_invert(config.pixel_data_invert)
            .with_pixel_data_trigger_invert(config.pixel_data_output_trigger_high);

        Ok(Self {
            regs,
            version,
            features,
            profile: CoefficientProfile::for_interface(config.display_interface_itu656),
            background,
            display_ctrl,
            console_layer,
            layers,
        })
    }

    /// Program the reset state: layer control, display control, background
    /// color and interrupt mask
    pub fn initialize(&mut self) {
        for layer in &self.layers {
            let ctrl = self
                .regs
                .read_as::<LayerCtrl>(layer.base + LAYER_CTRL)
                .with_color_transparency_disable(true)
                .with_pixel_format_abgr(layer.format.component_swap);
            self.regs.write_as(layer.base + LAYER_CTRL, ctrl);

            if let AddressingMode::DynamicAddress { buffer_base } = layer.mode {
                self.regs.write(layer.base + LAYER_ADDR, buffer_base);
            }
        }

        self.regs.write_as(CTRL, self.display_ctrl);
        if self.background.is_some() {
            let black = match self.features.yuv_background {
                true => YUV_BLACK,
                false => RGB_BLACK,
            };
            self.regs.write(BACKGROUND_COLOR, black);
        }
        self.regs.write(DTYPE, 0);

        if self.features.vsync_irq {
            let v_sync = InterruptBits::default().with_v_sync(true);
            self.regs.write_direct(INT_STAT, v_sync.into());
            self.regs.write(INT_MASK, !u32::from(v_sync));
        }

        info!(ctrl = u32::from(self.display_ctrl), "logiCVC initialized");
    }

    pub fn version(&self) -> IpVersion {
        self.version
    }

    pub fn features(&self) -> Features {
        self.features
    }

    pub fn profile(&self) -> &CoefficientProfile {
        &self.profile
    }

    pub fn console_layer(&self) -> usize {
        self.console_layer
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: usize) -> Result<&Layer> {
        self.layers.get(id).ok_or(CvcError::NoSuchLayer(id))
    }

    pub fn regs(&self) -> &R {
        &self.regs
    }

    pub fn regs_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    pub fn into_inner(self) -> R {
        self.regs
    }

    fn layer_mut(&mut self, id: usize) -> Result<&mut Layer> {
        self.layers.get_mut(id).ok_or(CvcError::NoSuchLayer(id))
    }

    /// Turn scanout of a layer on or off
    pub fn enable_layer(&mut self, id: usize, enable: bool) -> Result<()> {
        let base = self.layer(id)?.base;
        let ctrl = self.regs.read_as::<LayerCtrl>(base + LAYER_CTRL).with_enable(enable);
        self.regs.write_as(base + LAYER_CTRL, ctrl);
        self.layer_mut(id)?.enabled = enable;
        debug!(id, enable, "layer enable");
        Ok(())
    }

    /// Set the video mode of a layer, adjusted to what it can display
    pub fn set_var(&mut self, id: usize, requested: &ScreenVar) -> Result<ScreenVar> {
        let layer = *self.layer(id)?;
        let max_res = self.version.max_resolution();
        let limits = ScreenLimits {
            max_h_res: max_res,
            max_v_res: max_res,
            buffer_offset: layer.placement.buffer_offset,
            buffer_width: layer.placement.stride,
            buffer_height: layer.virtual_height,
        };
        let var = check_var(requested, &layer.var, &limits, &layer.format)?;
        self.layer_mut(id)?.var = var;
        debug!(id, xres = var.xres, yres = var.yres, "layer video mode");
        Ok(var)
    }

    /// Move the visible window of a layer within its buffer
    pub fn pan(&mut self, id: usize, x_offset: u32, y_offset: u32) -> Result<()> {
        let layer = *self.layer(id)?;
        let target = geometry::pan(
            &layer.var,
            x_offset,
            y_offset,
            &layer.format,
            self.features.size_position,
        )?;
        let Some((x_offset, y_offset)) = target else {
            return Ok(());
        };

        let offset = byte_offset(x_offset, y_offset, layer.placement.stride, &layer.format)?;
        layer.mode.write_offsets(&mut self.regs, layer.base, x_offset, y_offset, offset);

        let var = &mut self.layer_mut(id)?.var;
        var.x_offset = x_offset;
        var.y_offset = y_offset;
        Ok(())
    }

    /// Load CLUT entries of an indexed layer starting at slot `start`
    pub fn set_clut(&mut self, id: usize, entries: &[ClutEntry], start: usize) -> Result<()> {
        let layer = *self.layer(id)?;
        let words = encode_clut_range(&layer.format, entries, start, entries.len(), &self.profile)?;
        let base = clut_base(id);
        for (index, word) in (start..).zip(words) {
            self.regs.write(base + index as u32 * REG_STRIDE, word);
        }
        debug!(id, start, count = entries.len(), "CLUT loaded");
        Ok(())
    }

    /// Rewrite layer registers and the interrupt mask from their last values
    pub fn reload(&mut self) {
        for layer in &self.layers {
            let voff = match layer.mode {
                AddressingMode::OffsetRegisters => Some(LAYER_VOFF),
                AddressingMode::DynamicAddress { .. } => None,
            };
            for offset in LAYER_SHADOWED.into_iter().chain(voff) {
                let value = self.regs.read(layer.base + offset);
                self.regs.write(layer.base + offset, value);
            }
        }

        let v_sync = InterruptBits::default().with_v_sync(true);
        self.regs.write_direct(INT_STAT, v_sync.into());
        let mask = self.regs.read(INT_MASK);
        self.regs.write(INT_MASK, mask);
        debug!("registers reloaded");
    }

    /// Run a control command against layer `id`
    pub fn execute(&mut self, id: usize, command: Command) -> Result<Reply> {
        let layer = *self.layer(id)?;
        debug!(id, code = u8::from(command.code()), "command");

        match command {
            Command::VsyncInterrupt(enable) => {
                self.vsync_interrupt(enable);
                Ok(Reply::Done)
            }
            Command::LayerIndex => Ok(Reply::LayerIndex(id)),
            Command::LayerAlpha(access) => self.layer_alpha(&layer, access),
            Command::ColorTransparency(enabled) => {
                let ctrl = self
                    .regs
                    .read_as::<LayerCtrl>(layer.base + LAYER_CTRL)
                    .with_color_transparency_disable(!enabled);
                self.regs.write_as(layer.base + LAYER_CTRL, ctrl);
                Ok(Reply::Done)
            }
            Command::TransparentColor(access) => {
                Ok(self.color(&layer.format, layer.base + LAYER_TRANSP_COLOR, access))
            }
            Command::Geometry(access) => self.geometry(&layer, access),
            Command::LayerBuffer(access) => self.layer_buffer(id, access),
            Command::BufferOffset => {
                let lines = match self.features.dynamic_address {
                    true => layer.placement.buffer_offset,
                    false => {
                        let select = BufferSelect(self.regs.read_direct(VBUFF_SELECT));
                        layer.placement.buffer_offset * select.buffer(id) as u32
                    }
                };
                Ok(Reply::BufferOffset(lines))
            }
            Command::BackgroundColor(access) => {
                let format = self.background.ok_or(CvcError::NoBackgroundLayer)?;
                Ok(self.color(&format, BACKGROUND_COLOR, access))
            }
            Command::ExternalBufferSwitch(enable) => {
                let ctrl = self
                    .regs
                    .read_as::<LayerCtrl>(layer.base + LAYER_CTRL)
                    .with_external_buffer_switch(enable);
                self.regs.write_as(layer.base + LAYER_CTRL, ctrl);
                Ok(Reply::Done)
            }
            Command::LayerRegister(hw) => {
                if !layer.owns_register(hw.offset) {
                    warn!(id, offset = hw.offset, "layer register access denied");
                    return Err(CvcError::RegisterPermissionDenied(hw.offset));
                }
                Ok(self.passthrough(hw, false))
            }
            Command::ControlRegister(hw) => {
                if hw.offset != CTRL {
                    warn!(offset = hw.offset, "control register access denied");
                    return Err(CvcError::RegisterPermissionDenied(hw.offset));
                }
                Ok(self.passthrough(hw, false))
            }
            Command::InterruptStatus(hw) => {
                if hw.offset != INT_STAT {
                    warn!(offset = hw.offset, "interrupt status access denied");
                    return Err(CvcError::RegisterPermissionDenied(hw.offset));
                }
                Ok(self.passthrough(hw, true))
            }
            Command::IpVersion => Ok(Reply::Version(self.version.packed())),
            Command::ReloadRegisters => {
                self.reload();
                Ok(Reply::Done)
            }
        }
    }

    fn vsync_interrupt(&mut self, enable: bool) {
        let mut mask = self.regs.read_as::<InterruptBits>(INT_MASK);
        if enable {
            let v_sync = InterruptBits::default().with_v_sync(true);
            self.regs.write_direct(INT_STAT, v_sync.into());
        }
        mask.set_v_sync(!enable);
        self.regs.write_as(INT_MASK, mask);
    }

    fn layer_alpha(&mut self, layer: &Layer, access: Access<u32>) -> Result<Reply> {
        let bits = alpha_bits(&layer.format)?;
        let offset = layer.base + LAYER_ALPHA;
        match access {
            Access::Get => Ok(Reply::Alpha(from_hardware(self.regs.read(offset), bits))),
            Access::Set(alpha) => {
                self.regs.write(offset, to_hardware(alpha, bits));
                Ok(Reply::Done)
            }
        }
    }

    fn color(&mut self, format: &PixelFormat, offset: u32, access: Access<LayerColor>) -> Reply {
        let yuv = self.features.yuv_background;
        match access {
            Access::Get => Reply::Color(decode_color(format, self.regs.read(offset), yuv)),
            Access::Set(color) => {
                self.regs.write(offset, encode_color(format, &color, yuv, &self.profile));
                Reply::Done
            }
        }
    }

    fn geometry(&mut self, layer: &Layer, access: Access<LayerGeometry>) -> Result<Reply> {
        if !self.features.size_position {
            return Err(CvcError::GeometryUnsupported);
        }

        let bounds = layer.bounds();
        match access {
            Access::Get => {
                let mut geometry = get_geometry(&mut self.regs, layer.base, &bounds);
                geometry.x_offset = layer.var.x_offset;
                geometry.y_offset = layer.var.y_offset;
                Ok(Reply::Geometry(geometry))
            }
            Access::Set(request) => {
                let (geometry, offset) = set_geometry(&request, &bounds, &layer.format)?;
                layer.mode.write_geometry(&mut self.regs, layer.base, &geometry, offset, &bounds);

                let var = &mut self.layer_mut(layer.id)?.var;
                var.x_offset = geometry.x_offset;
                var.y_offset = geometry.y_offset;
                Ok(Reply::Geometry(geometry))
            }
        }
    }

    fn layer_buffer(&mut self, id: usize, access: Access<u8>) -> Result<Reply> {
        if self.features.dynamic_address {
            return Err(CvcError::BufferSelectUnsupported {
                major: self.version.major,
            });
        }

        let select = BufferSelect(self.regs.read_direct(VBUFF_SELECT));
        match access {
            Access::Get => Ok(Reply::Buffer(select.buffer(id))),
            Access::Set(buffer) => {
                if buffer >= MAX_LAYER_BUFFERS {
                    return Err(CvcError::InvalidBufferId(buffer));
                }
                self.regs.write_direct(VBUFF_SELECT, select.with_buffer(id, buffer).into());
                Ok(Reply::Done)
            }
        }
    }

    fn passthrough(&mut self, hw: HwAccess, direct: bool) -> Reply {
        match (hw.value, direct) {
            (Access::Get, false) => Reply::Register(self.regs.read(hw.offset)),
            (Access::Get, true) => Reply::Register(self.regs.read_direct(hw.offset)),
            (Access::Set(value), false) => {
                debug!(offset = hw.offset, value, "register write");
                self.regs.write(hw.offset, value);
                Reply::Done
            }
            (Access::Set(value), true) => {
                debug!(offset = hw.offset, value, "register write");
                self.regs.write_direct(hw.offset, value);
                Reply::Done
            }
        }
    }

}


// eof
