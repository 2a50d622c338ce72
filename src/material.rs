use bytemuck::{Pod, Zeroable};

/// Pixel packing descriptor for the 16-bit RGB(A) texture modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Zeroable, Pod)]
#[repr(C)]
pub struct ColorFormat {
    pub color_mode: u32, // RGB = 1, RGBA = 2
    pub bpp: u32,
    pub red_bpp: u32,
    pub green_bpp: u32,
    pub blue_bpp: u32,
    pub red_shl: u32,
    pub green_shl: u32,
    pub blue_shl: u32,
    pub red_shr: u32,
    pub green_shr: u32,
    pub blue_shr: u32,
    pub alpha_bpp: u32,
    pub alpha_shl: u32,
    pub alpha_shr: u32,
}

static_assertions::const_assert_eq!(std::mem::size_of::<ColorFormat>(), 56);

pub const RGB_565: ColorFormat = ColorFormat {
    color_mode: 1,
    bpp: 16,
    red_bpp: 5,
    green_bpp: 6,
    blue_bpp: 5,
    red_shl: 11,
    green_shl: 5,
    blue_shl: 0,
    red_shr: 3,
    green_shr: 2,
    blue_shr: 3,
    alpha_bpp: 0,
    alpha_shl: 0,
    alpha_shr: 0,
};

pub const RGBA_4444: ColorFormat = ColorFormat {
    color_mode: 2,
    bpp: 16,
    red_bpp: 4,
    green_bpp: 4,
    blue_bpp: 4,
    red_shl: 12,
    green_shl: 8,
    blue_shl: 4,
    red_shr: 4,
    green_shr: 4,
    blue_shr: 4,
    alpha_bpp: 4,
    alpha_shl: 0,
    alpha_shr: 4,
};

pub const ARGB_5551: ColorFormat = ColorFormat {
    color_mode: 2,
    bpp: 16,
    red_bpp: 5,
    green_bpp: 5,
    blue_bpp: 5,
    red_shl: 10,
    green_shl: 5,
    blue_shl: 0,
    red_shr: 3,
    green_shr: 3,
    blue_shr: 3,
    alpha_bpp: 1,
    alpha_shl: 16,
    alpha_shr: 7,
};

/// Byte size of one bitmap plane. Negative dimensions flip the image and
/// contribute their magnitude.
pub const fn bitmap_size(width: i32, height: i32, bpp: u32) -> usize {
    (width.unsigned_abs() as usize) * (height.unsigned_abs() as usize) * (bpp as usize / 8)
}

/// Byte size of a full mipmap chain starting at `width` x `height`.
pub fn mipmap_size(levels: u32, width: i32, height: i32, bpp: u32) -> usize {
    (0..levels)
        .map(|level| bitmap_size(width >> level, height >> level, bpp))
        .sum()
}

/// A single cell (animation frame) of a material: raw pixel data per mipmap level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Texture {
    pub mip_levels: Vec<Vec<u8>>,
}

impl Texture {
    pub fn pixel_data_size(&self) -> usize {
        self.mip_levels.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub format: ColorFormat,
    pub cells: Vec<Texture>,
}

impl Material {
    pub fn mip_levels(&self) -> u32 {
        self.cells
            .first()
            .map(|cell| cell.mip_levels.len() as u32)
            .unwrap_or(0)
    }

    pub fn pixel_data_size(&self) -> usize {
        self.cells.iter().map(Texture::pixel_data_size).sum()
    }

    /// Expands one mip level to RGBA8 using the packing descriptor.
    pub fn decode_rgba(&self, cell: usize, level: usize) -> Option<Vec<u8>> {
        let data = self.cells.get(cell)?.mip_levels.get(level)?;
        let format = &self.format;
        if format.bpp != 16 {
            return None;
        }
        let mut rgba = Vec::with_capacity(data.len() * 2);
        for pixel in data.chunks_exact(2) {
            let value = u16::from_le_bytes([pixel[0], pixel[1]]) as u32;
            let expand = |bpp: u32, shl: u32, shr: u32| -> u8 {
                if bpp == 0 {
                    return 0xff;
                }
                let channel = (value >> shl) & ((1 << bpp) - 1);
                // Replicate the high bits into the low end to cover the full 0-255 range.
                let wide = channel << shr;
                (wide | wide.checked_shr(bpp).unwrap_or(0)) as u8
            };
            rgba.push(expand(format.red_bpp, format.red_shl, format.red_shr));
            rgba.push(expand(format.green_bpp, format.green_shl, format.green_shr));
            rgba.push(expand(format.blue_bpp, format.blue_shl, format.blue_shr));
            rgba.push(expand(format.alpha_bpp, format.alpha_shl, format.alpha_shr));
        }
        Some(rgba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_size_handles_negative_dims() {
        assert_eq!(bitmap_size(64, 64, 16), 8192);
        assert_eq!(bitmap_size(-64, 64, 16), 8192);
        assert_eq!(bitmap_size(64, -64, 32), 16384);
    }

    #[test]
    fn mipmap_chain_sums_shifted_levels() {
        // 16x16 + 8x8 + 4x4 at 16 bpp
        assert_eq!(mipmap_size(3, 16, 16, 16), 512 + 128 + 32);
    }

    #[test]
    fn material_pixel_data_size_sums_cells() {
        let cell = Texture {
            mip_levels: vec![vec![0; 512], vec![0; 128]],
        };
        let mat = Material {
            name: "test.mat".into(),
            width: 16,
            height: 16,
            format: RGB_565,
            cells: vec![cell.clone(), cell],
        };
        assert_eq!(mat.pixel_data_size(), 2 * (512 + 128));
        assert_eq!(mat.mip_levels(), 2);
    }

    #[test]
    fn decode_rgb565_white_pixel() {
        let mat = Material {
            name: "white.mat".into(),
            width: 1,
            height: 1,
            format: RGB_565,
            cells: vec![Texture {
                mip_levels: vec![vec![0xff, 0xff]],
            }],
        };
        assert_eq!(mat.decode_rgba(0, 0).unwrap(), vec![0xff, 0xff, 0xff, 0xff]);
    }
}
