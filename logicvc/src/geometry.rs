// SPDX-License-Identifier: GPL-3.0-or-later

//! Layer position, size and panning.
//!
//! The hardware counts positions from the bottom right corner of the
//! screen and stores sizes minus one. How the visible part of a layer
//! buffer is selected depends on the IP generation: logiCVC 3.x has
//! horizontal and vertical offset registers, 4.x and later take the start
//! address of the first visible pixel.
//!

use crate::dev::cvc::{
    LAYER_ADDR, LAYER_HOFF, LAYER_HPOS, LAYER_HSIZE, LAYER_VOFF, LAYER_VPOS, LAYER_VSIZE,
    MAX_LAYER_BUFFERS, MIN_VRES, MIN_XRES,
};
use crate::dev::reg::RegisterAccess;
use crate::error::{CvcError, Result};
use crate::format::PixelFormat;

/// Vertical resolution assumed when nothing bounds a layer buffer
pub const DEFAULT_VRES: u32 = 1080;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct LayerGeometry {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub x_offset: u32,
    pub y_offset: u32,
}

/// Extent a layer is placed in
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Bounds {

    /// Resolution of the current video mode
    pub visible_width: u32,
    pub visible_height: u32,

    /// Row length of the layer buffer in pixels
    pub virtual_width: u32,

}

/// Validate and clamp a geometry request.
///
/// Returns the geometry to program and the byte offset of its first
/// visible pixel within the layer buffer.
///
pub fn set_geometry(
    request: &LayerGeometry,
    bounds: &Bounds,
    format: &PixelFormat,
) -> Result<(LayerGeometry, u32)> {
    let (xres, yres) = (bounds.visible_width, bounds.visible_height);
    let mut geometry = *request;

    if geometry.x > xres || geometry.y > yres {
        return Err(CvcError::InvalidPosition {
            x: geometry.x,
            y: geometry.y,
            xres,
            yres,
        });
    }
    if geometry.width == 0 || geometry.height == 0 {
        return Err(CvcError::InvalidSize {
            width: geometry.width,
            height: geometry.height,
        });
    }

    // x <= xres and y <= yres hold from here on
    if geometry.width > xres - geometry.x {
        geometry.width = xres - geometry.x;
    }
    if geometry.height > yres - geometry.y {
        geometry.height = yres - geometry.y;
    }

    // a layer placed on the right or bottom edge has nothing left to show
    if geometry.width == 0 || geometry.height == 0 {
        return Err(CvcError::InvalidPosition {
            x: geometry.x,
            y: geometry.y,
            xres,
            yres,
        });
    }

    if format.is_yuv422() && geometry.width > 2 {
        geometry.width &= !1;
    }

    let byte_offset = byte_offset(geometry.x_offset, geometry.y_offset, bounds.virtual_width, format)?;
    Ok((geometry, byte_offset))
}

/// Byte distance from the buffer start to pixel `(x_offset, y_offset)`.
///
/// Fails when the distance does not fit the 32-bit address register.
///
pub fn byte_offset(
    x_offset: u32,
    y_offset: u32,
    virtual_width: u32,
    format: &PixelFormat,
) -> Result<u32> {
    let bpp = format.bytes_per_pixel() as u64;
    (y_offset as u64)
        .checked_mul(virtual_width as u64)
        .and_then(|pixels| pixels.checked_add(x_offset as u64))
        .and_then(|pixels| pixels.checked_mul(bpp))
        .and_then(|bytes| u32::try_from(bytes).ok())
        .ok_or(CvcError::OffsetOutOfRange { x_offset, y_offset })
}

/// How the visible window of a layer buffer is selected
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AddressingMode {

    /// logiCVC 3.x: pixel offsets in HOFF/VOFF, buffer base fixed in hardware
    OffsetRegisters,

    /// logiCVC 4.x and later: start address of the visible window in ADDR
    DynamicAddress {
        buffer_base: u32,
    },

}

impl AddressingMode {

    pub fn for_version(major: u8, buffer_base: u32) -> Self {
        if major >= 4 {
            Self::DynamicAddress { buffer_base }
        } else {
            Self::OffsetRegisters
        }
    }

    /// Program size and position; the final write latches the update.
    ///
    /// 3.x: HOFF, VOFF, HSIZE, VSIZE, HPOS, VPOS.
    /// 4.x: HSIZE, VSIZE, HPOS, VPOS, ADDR.
    ///
    pub fn write_geometry<R>(
        &self,
        regs: &mut R,
        layer_base: u32,
        geometry: &LayerGeometry,
        byte_offset: u32,
        bounds: &Bounds,
    )
        where
            R: RegisterAccess,
    {
        if let Self::OffsetRegisters = self {
            regs.write(layer_base + LAYER_HOFF, geometry.x_offset);
            regs.write(layer_base + LAYER_VOFF, geometry.y_offset);
        }
        regs.write(layer_base + LAYER_HSIZE, geometry.width - 1);
        regs.write(layer_base + LAYER_VSIZE, geometry.height - 1);
        regs.write(layer_base + LAYER_HPOS, bounds.visible_width - (geometry.x + 1));
        regs.write(layer_base + LAYER_VPOS, bounds.visible_height - (geometry.y + 1));
        if let Self::DynamicAddress { buffer_base } = self {
            regs.write(layer_base + LAYER_ADDR, buffer_base.wrapping_add(byte_offset));
        }
    }

    /// Program the visible window origin only
    pub fn write_offsets<R>(
        &self,
        regs: &mut R,
        layer_base: u32,
        x_offset: u32,
        y_offset: u32,
        byte_offset: u32,
    )
        where
            R: RegisterAccess,
    {
        match self {
            Self::OffsetRegisters => {
                regs.write(layer_base + LAYER_HOFF, x_offset);
                regs.write(layer_base + LAYER_VOFF, y_offset);
            }
            Self::DynamicAddress { buffer_base } => {
                regs.write(layer_base + LAYER_ADDR, buffer_base.wrapping_add(byte_offset));
            }
        }
    }

}

/// Read back position and size.
///
/// Offsets are not part of the readback and are left at zero.
///
pub fn get_geometry<R>(regs: &mut R, layer_base: u32, bounds: &Bounds) -> LayerGeometry
    where
        R: RegisterAccess,
{
    let hpos = regs.read(layer_base + LAYER_HPOS);
    let vpos = regs.read(layer_base + LAYER_VPOS);
    let hsize = regs.read(layer_base + LAYER_HSIZE);
    let vsize = regs.read(layer_base + LAYER_VSIZE);

    LayerGeometry {
        x: bounds.visible_width.saturating_sub(hpos.saturating_add(1)),
        y: bounds.visible_height.saturating_sub(vpos.saturating_add(1)),
        width: hsize.wrapping_add(1),
        height: vsize.wrapping_add(1),
        x_offset: 0,
        y_offset: 0,
    }
}

/// Video mode variables of a layer
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ScreenVar {
    pub xres: u32,
    pub yres: u32,
    pub xres_virtual: u32,
    pub yres_virtual: u32,
    pub x_offset: u32,
    pub y_offset: u32,
    pub bits_per_pixel: u32,
}

/// Hardware limits a video mode is checked against
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScreenLimits {
    pub max_h_res: u32,
    pub max_v_res: u32,

    /// Distance in lines between layer buffers; zero when unbuffered
    pub buffer_offset: u32,

    /// Layer buffer dimensions in pixels
    pub buffer_width: u32,
    pub buffer_height: u32,
}

/// Adjust requested video mode variables to what the layer can display.
///
/// Only a visible height beyond the buffer spacing is an error; every
/// other out-of-range value is pulled back into range.
///
pub fn check_var(
    requested: &ScreenVar,
    current: &ScreenVar,
    limits: &ScreenLimits,
    format: &PixelFormat,
) -> Result<ScreenVar> {
    let mut var = *requested;

    var.xres = var.xres.clamp(MIN_XRES, limits.max_h_res.max(MIN_XRES));
    var.yres = var.yres.clamp(MIN_VRES, limits.max_v_res.max(MIN_VRES));
    if limits.buffer_offset != 0 && var.yres > limits.buffer_offset {
        return Err(CvcError::InvalidSize {
            width: var.xres,
            height: var.yres,
        });
    }

    var.xres_virtual = var.xres_virtual.max(var.xres).min(limits.buffer_width);
    var.yres_virtual = var.yres_virtual.max(var.yres).min(limits.buffer_height);

    if format.is_yuv422() {
        var.x_offset &= !1;
    }

    if var.x_offset.saturating_add(var.xres) >= var.xres_virtual {
        var.x_offset = var.xres_virtual.saturating_sub(var.xres.saturating_add(1));
    }
    if var.y_offset.saturating_add(var.yres) >= var.yres_virtual {
        var.y_offset = var.yres_virtual.saturating_sub(var.yres.saturating_add(1));
    }

    if var.bits_per_pixel != current.bits_per_pixel {
        var.bits_per_pixel = match var.bits_per_pixel {
            24 => 32,
            _ => current.bits_per_pixel,
        };
    }

    Ok(var)
}

/// Validate a pan request against the current video mode.
///
/// Returns the offsets to program, or `None` when nothing changes.
///
pub fn pan(
    current: &ScreenVar,
    x_offset: u32,
    y_offset: u32,
    format: &PixelFormat,
    size_position: bool,
) -> Result<Option<(u32, u32)>> {
    if !size_position {
        return Err(CvcError::GeometryUnsupported);
    }
    if current.x_offset == x_offset && current.y_offset == y_offset {
        return Ok(None);
    }
    if x_offset.saturating_add(current.xres) > current.xres_virtual
        || y_offset.saturating_add(current.yres) > current.yres_virtual
    {
        return Err(CvcError::InvalidPosition {
            x: x_offset,
            y: y_offset,
            xres: current.xres_virtual,
            yres: current.yres_virtual,
        });
    }

    let x_offset = match format.is_yuv422() {
        true => x_offset & !1,
        false => x_offset,
    };
    Ok(Some((x_offset, y_offset)))
}

/// Memory placement of one layer buffer
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct BufferPlacement {
    pub address: u64,
    pub address_range: u64,

    /// Lines between double/triple buffers
    pub buffer_offset: u32,

    /// Row length in pixels
    pub stride: u32,
    pub bytes_per_pixel: u32,
}

/// Height in lines of the buffer of layer `index`.
///
/// A layer's own address range wins unless it is the last layer, in which
/// case the next layer up in memory bounds it. Without either, the buffer
/// spacing or `DEFAULT_VRES` decides. The result never exceeds
/// `max_v_res` lines per hardware buffer.
///
pub fn virtual_height(layers: &[BufferPlacement], index: usize, max_v_res: u32) -> u32 {
    let Some(layer) = layers.get(index) else {
        return 0;
    };
    let cap = max_v_res as u64 * MAX_LAYER_BUFFERS as u64;
    let line = layer.stride as u64 * layer.bytes_per_pixel as u64;
    let lines = |bytes: u64| if line == 0 { 0 } else { bytes / line };

    let next = layers
        .iter()
        .map(|other| other.address)
        .filter(|&address| address > layer.address)
        .min();

    let height = if layer.address_range != 0 && index + 1 < layers.len() {
        lines(layer.address_range)
    } else {
        match next {
            Some(end) => lines(end - layer.address),
            None if layer.address_range != 0 => lines(layer.address_range),
            None if layer.buffer_offset != 0 => {
                layer.buffer_offset as u64 * MAX_LAYER_BUFFERS as u64
            }
            None => DEFAULT_VRES as u64,
        }
    };

    u32::try_from(height.min(cap)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dev::reg::RegisterFile;
    use crate::format::{resolve_format, LayerType, Transparency};

    const FULL_HD: Bounds = Bounds {
        visible_width: 1920,
        visible_height: 1080,
        virtual_width: 2048,
    };

    fn xrgb() -> PixelFormat {
        resolve_format(LayerType::Rgb, 32, Some(Transparency::Layer), false).unwrap()
    }

    fn yuyv() -> PixelFormat {
        resolve_format(LayerType::Yuv, 16, Some(Transparency::Layer), false).unwrap()
    }

    fn request(x: u32, y: u32, width: u32, height: u32) -> LayerGeometry {
        LayerGeometry {
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }

    #[test]
    fn clamps_to_visible_area() {
        let (geometry, _) = set_geometry(&request(10, 10, 2000, 2000), &FULL_HD, &xrgb()).unwrap();
        assert_eq!((geometry.width, geometry.height), (1910, 1070));
    }

    #[test]
    fn clamps_unbounded_size() {
        let (geometry, _) =
            set_geometry(&request(10, 10, u32::MAX, u32::MAX), &FULL_HD, &xrgb()).unwrap();
        assert_eq!((geometry.width, geometry.height), (1910, 1070));
    }

    #[test]
    fn yuv422_width_is_even() {
        let (geometry, _) = set_geometry(&request(0, 0, 101, 10), &FULL_HD, &yuyv()).unwrap();
        assert_eq!(geometry.width, 100);
        let (geometry, _) = set_geometry(&request(0, 0, 1, 10), &FULL_HD, &yuyv()).unwrap();
        assert_eq!(geometry.width, 1);
    }

    #[test]
    fn rejects_bad_requests() {
        assert!(matches!(
            set_geometry(&request(1921, 0, 10, 10), &FULL_HD, &xrgb()),
            Err(CvcError::InvalidPosition { .. }),
        ));
        assert!(matches!(
            set_geometry(&request(0, 0, 0, 10), &FULL_HD, &xrgb()),
            Err(CvcError::InvalidSize { .. }),
        ));
        assert!(matches!(
            set_geometry(&request(1920, 0, 10, 10), &FULL_HD, &xrgb()),
            Err(CvcError::InvalidPosition { .. }),
        ));
    }

    #[test]
    fn byte_offset_uses_buffer_stride() {
        let mut req = request(0, 0, 10, 10);
        req.x_offset = 3;
        req.y_offset = 2;
        let (_, offset) = set_geometry(&req, &FULL_HD, &xrgb()).unwrap();
        assert_eq!(offset, 3 * 4 + 2 * 2048 * 4);
    }

    #[test]
    fn byte_offset_beyond_address_space() {
        let mut req = request(0, 0, 10, 10);
        req.y_offset = 1 << 20;
        assert_eq!(
            set_geometry(&req, &FULL_HD, &xrgb()),
            Err(CvcError::OffsetOutOfRange {
                x_offset: 0,
                y_offset: 1 << 20,
            }),
        );
        assert!(byte_offset(u32::MAX, u32::MAX, u32::MAX, &xrgb()).is_err());
        assert_eq!(byte_offset(3, (1 << 19) - 1, 2048, &xrgb()), Ok(((1 << 19) - 1) * 2048 * 4 + 12));
    }

    #[test]
    fn readback_inverts_encoding() {
        let mut regs = RegisterFile::new(0x400);
        let format = xrgb();
        for (x, y) in [(0, 0), (5, 7), (1919, 1079)] {
            let (geometry, offset) = set_geometry(&request(x, y, 1, 1), &FULL_HD, &format).unwrap();
            AddressingMode::OffsetRegisters.write_geometry(&mut regs, 0x100, &geometry, offset, &FULL_HD);
            let back = get_geometry(&mut regs, 0x100, &FULL_HD);
            assert_eq!((back.x, back.y, back.width, back.height), (x, y, 1, 1));
        }
    }

    #[test]
    fn offset_register_write_order() {
        let mut regs = RegisterFile::new(0x400);
        let mut geometry = request(5, 6, 100, 50);
        geometry.x_offset = 1;
        geometry.y_offset = 2;
        AddressingMode::OffsetRegisters.write_geometry(&mut regs, 0x100, &geometry, 0, &FULL_HD);
        assert_eq!(regs.journal(), &[
            (0x100 + LAYER_HOFF, 1),
            (0x100 + LAYER_VOFF, 2),
            (0x100 + LAYER_HSIZE, 99),
            (0x100 + LAYER_VSIZE, 49),
            (0x100 + LAYER_HPOS, 1920 - 6),
            (0x100 + LAYER_VPOS, 1080 - 7),
        ]);
    }

    #[test]
    fn dynamic_address_write_order() {
        let mut regs = RegisterFile::new(0x400);
        let mode = AddressingMode::for_version(4, 0x1000_0000);
        mode.write_geometry(&mut regs, 0x180, &request(0, 0, 64, 32), 0x40, &FULL_HD);
        assert_eq!(regs.journal(), &[
            (0x180 + LAYER_HSIZE, 63),
            (0x180 + LAYER_VSIZE, 31),
            (0x180 + LAYER_HPOS, 1919),
            (0x180 + LAYER_VPOS, 1079),
            (0x180 + LAYER_ADDR, 0x1000_0040),
        ]);
    }

    fn screen() -> ScreenVar {
        ScreenVar {
            xres: 1920,
            yres: 1080,
            xres_virtual: 2048,
            yres_virtual: 3240,
            x_offset: 0,
            y_offset: 0,
            bits_per_pixel: 32,
        }
    }

    const LIMITS: ScreenLimits = ScreenLimits {
        max_h_res: 2048,
        max_v_res: 2048,
        buffer_offset: 1080,
        buffer_width: 2048,
        buffer_height: 3240,
    };

    #[test]
    fn check_var_clamps_mode() {
        let requested = ScreenVar {
            xres: 16,
            yres: 0,
            xres_virtual: 4096,
            yres_virtual: 0,
            x_offset: 5000,
            y_offset: 0,
            bits_per_pixel: 24,
        };
        let var = check_var(&requested, &screen(), &LIMITS, &yuyv()).unwrap();
        assert_eq!((var.xres, var.yres), (64, 1));
        assert_eq!((var.xres_virtual, var.yres_virtual), (2048, 1));
        assert_eq!(var.x_offset, 2048 - 64 - 1);
        assert_eq!(var.y_offset, 0);
        assert_eq!(var.bits_per_pixel, 32);

        let mut requested = screen();
        requested.bits_per_pixel = 16;
        assert_eq!(check_var(&requested, &screen(), &LIMITS, &xrgb()).unwrap().bits_per_pixel, 32);
    }

    #[test]
    fn check_var_pulls_back_huge_offsets() {
        let mut requested = screen();
        requested.x_offset = u32::MAX;
        requested.y_offset = u32::MAX;
        let var = check_var(&requested, &screen(), &LIMITS, &xrgb()).unwrap();
        assert_eq!(var.x_offset, 2048 - 1921);
        assert_eq!(var.y_offset, 3240 - 1081);
    }

    #[test]
    fn check_var_rejects_height_beyond_buffer_spacing() {
        let mut requested = screen();
        requested.yres = 1200;
        assert!(matches!(
            check_var(&requested, &screen(), &LIMITS, &xrgb()),
            Err(CvcError::InvalidSize { .. }),
        ));
    }

    #[test]
    fn pan_validates_offsets() {
        let current = screen();
        assert_eq!(pan(&current, 0, 0, &xrgb(), true), Ok(None));
        assert_eq!(pan(&current, 0, 1080, &xrgb(), true), Ok(Some((0, 1080))));
        assert_eq!(pan(&current, 5, 0, &yuyv(), true), Ok(Some((4, 0))));
        assert!(matches!(
            pan(&current, 0, 2161, &xrgb(), true),
            Err(CvcError::InvalidPosition { .. }),
        ));
        assert_eq!(pan(&current, 0, 1080, &xrgb(), false), Err(CvcError::GeometryUnsupported));
    }

    #[test]
    fn pan_rejects_huge_offsets() {
        let current = screen();
        assert!(matches!(
            pan(&current, u32::MAX, 0, &xrgb(), true),
            Err(CvcError::InvalidPosition { .. }),
        ));
        assert!(matches!(
            pan(&current, 0, u32::MAX, &xrgb(), true),
            Err(CvcError::InvalidPosition { .. }),
        ));
    }

    #[test]
    fn buffer_height_sources() {
        let layer = |address, address_range, buffer_offset| BufferPlacement {
            address,
            address_range,
            buffer_offset,
            stride: 1024,
            bytes_per_pixel: 4,
        };
        let line = 4096;

        let layers = [layer(0, 600 * line, 0), layer(1000 * line, 0, 0)];
        assert_eq!(virtual_height(&layers, 0, 2048), 600);

        let layers = [layer(0, 0, 0), layer(700 * line, 0, 0)];
        assert_eq!(virtual_height(&layers, 0, 2048), 700);
        assert_eq!(virtual_height(&layers, 1, 2048), DEFAULT_VRES);

        let layers = [layer(0, 0, 0), layer(700 * line, 0, 768)];
        assert_eq!(virtual_height(&layers, 1, 2048), 768 * 3);
        assert_eq!(virtual_height(&layers, 1, 512), 512 * 3);

        let layers = [layer(0, 0, 0), layer(700 * line, 100 * line, 768)];
        assert_eq!(virtual_height(&layers, 1, 2048), 100);
    }

    #[test]
    fn buffer_height_caps_huge_ranges() {
        let placement = BufferPlacement {
            address: 0,
            address_range: ((1 << 32) + 5) * 4096,
            buffer_offset: 0,
            stride: 1024,
            bytes_per_pixel: 4,
        };
        assert_eq!(virtual_height(&[placement], 0, 2048), 2048 * 3);
    }

}

// eof
