//! Materials section: `u32 pixelDataSize`, one 136 byte header per material,
//! then the concatenated pixel data of every cell and mipmap level.

use super::offsets;
use super::raw::{CndHeader, MatHeader};
use crate::material::{bitmap_size, Material, Texture};
use crate::shared::{decode_name, encode_name};
use crate::stream::Stream;
use crate::{CndError, Result};
use std::io::{Read, Seek, Write};
use tracing::debug;

pub fn parse<S: Read + Seek>(stream: &mut Stream<S>, header: &CndHeader) -> Result<Vec<Material>> {
    let inner = |stream: &mut Stream<S>| -> Result<Vec<Material>> {
        let pixel_data_size = stream.read_u32()? as usize;

        if header.num_materials == 0 {
            debug!("material section is empty");
            stream.advance(pixel_data_size as u64)?;
            return Ok(Vec::new());
        }
        if pixel_data_size == 0 {
            return Err(CndError::format(
                "parse_materials",
                "pixel data buffer size is zero",
            ));
        }

        let mat_headers: Vec<MatHeader> = stream.read_pod_vec(header.num_materials as usize)?;
        let pixel_data = stream.read_bytes(pixel_data_size)?;

        let mut materials = Vec::with_capacity(mat_headers.len());
        let mut cursor = 0usize;
        for mat_header in mat_headers {
            let name = decode_name(&mat_header.name)?;
            if mat_header.cel_count < 1 || mat_header.mip_levels < 1 {
                debug!("material '{name}' has no pixel data");
                continue;
            }
            if mat_header.color_info.bpp % 8 != 0 {
                return Err(CndError::format(
                    "parse_materials",
                    format!(
                        "material '{name}' has invalid color depth {}",
                        mat_header.color_info.bpp
                    ),
                ));
            }

            let mut cells = Vec::with_capacity(mat_header.cel_count as usize);
            for _ in 0..mat_header.cel_count {
                let mut mip_levels = Vec::with_capacity(mat_header.mip_levels as usize);
                for level in 0..mat_header.mip_levels as u32 {
                    let size = bitmap_size(
                        mat_header.width >> level,
                        mat_header.height >> level,
                        mat_header.color_info.bpp,
                    );
                    let end = cursor + size;
                    if end > pixel_data.len() {
                        return Err(CndError::Range {
                            function: "parse_materials",
                            offset: cursor,
                            len: size,
                            size: pixel_data.len(),
                        });
                    }
                    mip_levels.push(pixel_data[cursor..end].to_vec());
                    cursor = end;
                }
                cells.push(Texture { mip_levels });
            }

            materials.push(Material {
                name,
                width: mat_header.width,
                height: mat_header.height,
                format: mat_header.color_info,
                cells,
            });
        }

        if cursor != pixel_data.len() {
            return Err(CndError::format(
                "parse_materials",
                "not all pixel data was consumed from the buffer",
            ));
        }

        Ok(materials)
    };
    inner(stream).map_err(|e| e.in_section("parse_materials", "Materials"))
}

/// Reads just the materials out of a container.
pub fn read<S: Read + Seek>(stream: &mut Stream<S>) -> Result<Vec<Material>> {
    let header = super::read_header(stream)?;
    let offset = offsets::materials(stream)?;
    stream.seek(offset)?;
    parse(stream, &header)
}

pub fn write<S: Write + Seek>(stream: &mut Stream<S>, materials: &[Material]) -> Result<()> {
    let inner = |stream: &mut Stream<S>| -> Result<()> {
        let mut mat_headers = Vec::with_capacity(materials.len());
        let mut pixel_data_size = 0usize;
        for mat in materials {
            mat_headers.push(MatHeader {
                name: encode_name("write_materials", &mat.name)?,
                width: mat.width,
                height: mat.height,
                cel_count: mat.cells.len() as i32,
                mip_levels: mat.mip_levels() as i32,
                color_info: mat.format,
            });
            pixel_data_size += mat.pixel_data_size();
        }

        stream.write_u32(pixel_data_size as u32)?;
        stream.write_pod_slice(&mat_headers)?;
        for mat in materials {
            for cell in &mat.cells {
                for level in &cell.mip_levels {
                    stream.write_all(level)?;
                }
            }
        }
        Ok(())
    };
    inner(stream).map_err(|e| e.in_section("write_materials", "Materials"))
}
