//! Sectors section: 244 byte sector headers followed by one shared pool of
//! vertex indices, sliced up by each sector's stored count.

use super::offsets;
use super::raw::{CndHeader, SectorHeader};
use crate::shared::{decode_name, encode_name, idx_from_raw, idx_to_raw};
use crate::stream::Stream;
use crate::world::{AmbientSound, Sector, SectorFlags};
use crate::{CndError, Result};
use std::io::{Read, Seek, Write};

pub fn parse<S: Read + Seek>(stream: &mut Stream<S>, header: &CndHeader) -> Result<Vec<Sector>> {
    let inner = |stream: &mut Stream<S>| -> Result<Vec<Sector>> {
        let headers: Vec<SectorHeader> = stream.read_pod_vec(header.num_sectors as usize)?;
        let num_vertex_indices = stream.read_u32()? as usize;
        let vertex_indices: Vec<u32> = stream.read_pod_vec(num_vertex_indices)?;

        let mut remaining = &vertex_indices[..];
        let mut sectors = Vec::with_capacity(headers.len());
        for sector in &headers {
            let count = sector.vertex_count as usize;
            if count > remaining.len() {
                return Err(CndError::format(
                    "parse_sectors",
                    "sector consumed more vertex indices than stored",
                ));
            }
            let (indices, rest) = remaining.split_at(count);
            remaining = rest;

            let ambient_sound = if sector.ambient_sound[0] != 0 {
                Some(AmbientSound {
                    sound: decode_name(&sector.ambient_sound)?,
                    volume: sector.ambient_sound_volume,
                })
            } else {
                None
            };

            sectors.push(Sector {
                flags: SectorFlags::from_bits_retain(sector.flags),
                ambient_light: sector.ambient_light,
                extra_light: sector.extra_light,
                tint: sector.tint,
                avg_light_pos: sector.avg_light_pos,
                avg_light_int: sector.avg_light_int,
                avg_light_falloff: sector.avg_light_falloff,
                collide_box: sector.collide_box,
                bound_box: sector.bound_box,
                ambient_sound,
                center: sector.center,
                radius: sector.radius,
                first_surface: sector.first_surface as u32,
                surface_count: sector.surface_count as u32,
                vertex_indices: indices.to_vec(),
                pvs_idx: idx_from_raw(sector.pvs_idx),
                thrust: sector.thrust,
            });
        }

        if !remaining.is_empty() {
            return Err(CndError::format(
                "parse_sectors",
                "not all vertex indices were consumed from the buffer",
            ));
        }

        Ok(sectors)
    };
    inner(stream).map_err(|e| e.in_section("parse_sectors", "Sectors"))
}

/// Reads just the sectors out of a container.
pub fn read<S: Read + Seek>(stream: &mut Stream<S>) -> Result<Vec<Sector>> {
    let header = super::read_header(stream)?;
    let offset = offsets::sectors(stream, &header)?;
    stream.seek(offset)?;
    parse(stream, &header)
}

pub fn write<S: Write + Seek>(stream: &mut Stream<S>, sectors: &[Sector]) -> Result<()> {
    let inner = |stream: &mut Stream<S>| -> Result<()> {
        let mut headers = Vec::with_capacity(sectors.len());
        let mut vertex_indices = Vec::new();
        for sector in sectors {
            let (ambient_sound, ambient_sound_volume) = match &sector.ambient_sound {
                Some(ambient) => (
                    encode_name("write_sectors", &ambient.sound)?,
                    ambient.volume,
                ),
                None => ([0u8; 64], 0.0),
            };

            headers.push(SectorHeader {
                flags: sector.flags.bits(),
                ambient_light: sector.ambient_light,
                extra_light: sector.extra_light,
                tint: sector.tint,
                avg_light_pos: sector.avg_light_pos,
                avg_light_int: sector.avg_light_int,
                avg_light_falloff: sector.avg_light_falloff,
                collide_box: sector.collide_box,
                bound_box: sector.bound_box,
                ambient_sound,
                ambient_sound_volume,
                center: sector.center,
                radius: sector.radius,
                first_surface: sector.first_surface as i32,
                surface_count: sector.surface_count as i32,
                vertex_count: sector.vertex_indices.len() as i32,
                pvs_idx: idx_to_raw(sector.pvs_idx),
                thrust: sector.thrust,
            });
            vertex_indices.extend_from_slice(&sector.vertex_indices);
        }

        stream.write_pod_slice(&headers)?;
        stream.write_u32(vertex_indices.len() as u32)?;
        stream.write_pod_slice(&vertex_indices)
    };
    inner(stream).map_err(|e| e.in_section("write_sectors", "Sectors"))
}
