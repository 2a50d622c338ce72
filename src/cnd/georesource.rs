//! Georesource section: vertex pools, adjoins and surfaces. Surfaces pull
//! their corner records sequentially out of one shared side array that must
//! be consumed exactly.

use super::offsets;
use super::raw::{CndHeader, RawSurfaceAdjoin, SurfaceHeader, SurfaceVert};
use crate::shared::{idx_from_raw, idx_to_raw, Vector2, Vector3};
use crate::stream::Stream;
use crate::world::{
    AdjoinFlags, FaceFlags, Georesource, Surface, SurfaceAdjoin, SurfaceFlags, SurfaceVertex,
};
use crate::{CndError, Result};
use std::io::{Read, Seek, Write};

pub fn parse<S: Read + Seek>(stream: &mut Stream<S>, header: &CndHeader) -> Result<Georesource> {
    let inner = |stream: &mut Stream<S>| -> Result<Georesource> {
        let vertices: Vec<Vector3> = stream.read_pod_vec(header.num_vertices as usize)?;
        let tex_vertices: Vec<Vector2> = stream.read_pod_vec(header.num_tex_vertices as usize)?;

        let raw_adjoins: Vec<RawSurfaceAdjoin> = stream.read_pod_vec(header.num_adjoins as usize)?;
        let adjoins = raw_adjoins
            .iter()
            .map(|adjoin| SurfaceAdjoin {
                flags: AdjoinFlags::from_bits_retain(adjoin.flags),
                mirror: idx_from_raw(adjoin.mirror),
                distance: adjoin.distance,
            })
            .collect();

        let surf_headers: Vec<SurfaceHeader> = stream.read_pod_vec(header.num_surfaces as usize)?;
        let num_surface_verts = stream.read_u32()? as usize;
        let surface_verts: Vec<SurfaceVert> = stream.read_pod_vec(num_surface_verts)?;

        let mut verts = surface_verts.iter();
        let mut surfaces = Vec::with_capacity(surf_headers.len());
        for surf in &surf_headers {
            let vertices = (0..surf.num_verts)
                .map(|_| {
                    let vert = verts.next().ok_or_else(|| {
                        CndError::format(
                            "parse_georesource",
                            "surface consumed more corner records than stored",
                        )
                    })?;
                    Ok(SurfaceVertex {
                        vertex: vert.vert as usize,
                        uv: idx_from_raw(vert.uv),
                        color: vert.color,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            surfaces.push(Surface {
                material: idx_from_raw(surf.material),
                surf_flags: SurfaceFlags::from_bits_retain(surf.surf_flags),
                face_flags: FaceFlags::from_bits_retain(surf.face_flags),
                geo_mode: surf.geo_mode.try_into().map_err(|_| {
                    CndError::format(
                        "parse_georesource",
                        format!("unknown geometry mode {}", surf.geo_mode),
                    )
                })?,
                light_mode: surf.light_mode.try_into().map_err(|_| {
                    CndError::format(
                        "parse_georesource",
                        format!("unknown light mode {}", surf.light_mode),
                    )
                })?,
                adjoin: idx_from_raw(surf.adjoin),
                extra_light: surf.extra_light,
                normal: surf.normal,
                vertices,
            });
        }

        if verts.next().is_some() {
            return Err(CndError::format(
                "parse_georesource",
                "not all surface corner records were consumed",
            ));
        }

        Ok(Georesource {
            vertices,
            tex_vertices,
            adjoins,
            surfaces,
        })
    };
    inner(stream).map_err(|e| e.in_section("parse_georesource", "Georesource"))
}

/// Reads just the geometry out of a container.
pub fn read<S: Read + Seek>(stream: &mut Stream<S>) -> Result<Georesource> {
    let header = super::read_header(stream)?;
    let offset = offsets::georesource(stream, &header)?;
    stream.seek(offset)?;
    parse(stream, &header)
}

pub fn write<S: Write + Seek>(stream: &mut Stream<S>, geores: &Georesource) -> Result<()> {
    let inner = |stream: &mut Stream<S>| -> Result<()> {
        stream.write_pod_slice(&geores.vertices)?;
        stream.write_pod_slice(&geores.tex_vertices)?;

        let adjoins: Vec<RawSurfaceAdjoin> = geores
            .adjoins
            .iter()
            .map(|adjoin| RawSurfaceAdjoin {
                flags: adjoin.flags.bits(),
                mirror: idx_to_raw(adjoin.mirror),
                distance: adjoin.distance,
            })
            .collect();
        stream.write_pod_slice(&adjoins)?;

        let mut surf_headers = Vec::with_capacity(geores.surfaces.len());
        let mut surface_verts = Vec::new();
        for surf in &geores.surfaces {
            surf_headers.push(SurfaceHeader {
                material: idx_to_raw(surf.material),
                surf_flags: surf.surf_flags.bits(),
                face_flags: surf.face_flags.bits(),
                geo_mode: surf.geo_mode.into(),
                light_mode: surf.light_mode.into(),
                adjoin: idx_to_raw(surf.adjoin),
                extra_light: surf.extra_light,
                normal: surf.normal,
                num_verts: surf.vertices.len() as u32,
            });
            surface_verts.extend(surf.vertices.iter().map(|vert| SurfaceVert {
                vert: vert.vertex as u32,
                uv: idx_to_raw(vert.uv),
                color: vert.color,
            }));
        }

        stream.write_pod_slice(&surf_headers)?;
        stream.write_u32(surface_verts.len() as u32)?;
        stream.write_pod_slice(&surface_verts)
    };
    inner(stream).map_err(|e| e.in_section("write_georesource", "Georesource"))
}
