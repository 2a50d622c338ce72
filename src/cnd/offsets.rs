//! Offset oracle for the container sections.
//!
//! The header stores no section offsets, only element counts. Each function
//! here computes the absolute start of a section by replaying the size rules
//! of everything before it, reading the inline count prefixes of the
//! variable-size sections along the way. The caller's cursor is saved and
//! restored around every computation.

use super::raw::{
    CndHeader, KeyHeader, KeyNode, MatHeader, RawAiControlInfo, RawActorInfo, RawExplosionInfo,
    RawItemInfo, RawKeyMarker, RawParticleInfo, RawPhysicsInfo, RawSurfaceAdjoin, RawWeaponInfo,
    SectorHeader, SoundHeader, SurfaceHeader, SurfaceVert, ThingHeader, ThingListSizes,
};
use crate::animation::KeyNodeEntry;
use crate::shared::{Vector2, Vector3};
use crate::stream::{preserving, Stream};
use crate::thing::PathFrame;
use crate::Result;
use std::io::{Read, Seek};
use std::mem::size_of;

const RESOURCE_NAME_SIZE: u64 = 64;

/// The sounds section always starts right after the fixed header.
pub fn sounds() -> u64 {
    size_of::<CndHeader>() as u64
}

pub fn materials<S: Read + Seek>(stream: &mut Stream<S>) -> Result<u64> {
    preserving(stream, |stream| {
        stream.seek(sounds())?;
        let num_sounds = stream.read_u32()? as u64;
        let data_size = stream.read_u32()? as u64;
        // Sound headers, arena bytes and the trailing handle nonce.
        Ok(stream.tell()?
            + num_sounds * size_of::<SoundHeader>() as u64
            + data_size
            + size_of::<u32>() as u64)
    })
}

pub fn georesource<S: Read + Seek>(stream: &mut Stream<S>, header: &CndHeader) -> Result<u64> {
    preserving(stream, |stream| {
        let offset = materials(stream)?;
        stream.seek(offset)?;
        let pixel_data_size = stream.read_u32()? as u64;
        Ok(stream.tell()?
            + pixel_data_size
            + header.num_materials as u64 * size_of::<MatHeader>() as u64)
    })
}

pub fn sectors<S: Read + Seek>(stream: &mut Stream<S>, header: &CndHeader) -> Result<u64> {
    preserving(stream, |stream| {
        let offset = georesource(stream, header)?
            + header.num_vertices as u64 * size_of::<Vector3>() as u64
            + header.num_tex_vertices as u64 * size_of::<Vector2>() as u64
            + header.num_adjoins as u64 * size_of::<RawSurfaceAdjoin>() as u64
            + header.num_surfaces as u64 * size_of::<SurfaceHeader>() as u64;
        stream.seek(offset)?;
        let num_surface_verts = stream.read_u32()? as u64;
        Ok(stream.tell()? + num_surface_verts * size_of::<SurfaceVert>() as u64)
    })
}

pub fn ai_classes<S: Read + Seek>(stream: &mut Stream<S>, header: &CndHeader) -> Result<u64> {
    preserving(stream, |stream| {
        let offset = sectors(stream, header)?
            + header.num_sectors as u64 * size_of::<SectorHeader>() as u64;
        stream.seek(offset)?;
        let num_vertex_indices = stream.read_u32()? as u64;
        Ok(stream.tell()? + num_vertex_indices * size_of::<u32>() as u64)
    })
}

pub fn models<S: Read + Seek>(stream: &mut Stream<S>, header: &CndHeader) -> Result<u64> {
    Ok(ai_classes(stream, header)? + header.num_ai_classes as u64 * RESOURCE_NAME_SIZE)
}

pub fn sprites<S: Read + Seek>(stream: &mut Stream<S>, header: &CndHeader) -> Result<u64> {
    Ok(models(stream, header)? + header.num_models as u64 * RESOURCE_NAME_SIZE)
}

pub fn keyframes<S: Read + Seek>(stream: &mut Stream<S>, header: &CndHeader) -> Result<u64> {
    Ok(sprites(stream, header)? + header.num_sprites as u64 * RESOURCE_NAME_SIZE)
}

pub fn anim_classes<S: Read + Seek>(stream: &mut Stream<S>, header: &CndHeader) -> Result<u64> {
    preserving(stream, |stream| {
        let offset = keyframes(stream, header)?;
        stream.seek(offset)?;
        let num_markers = stream.read_u32()? as u64;
        let num_nodes = stream.read_u32()? as u64;
        let num_entries = stream.read_u32()? as u64;
        Ok(stream.tell()?
            + header.num_keyframes as u64 * size_of::<KeyHeader>() as u64
            + num_markers * size_of::<RawKeyMarker>() as u64
            + num_nodes * size_of::<KeyNode>() as u64
            + num_entries * size_of::<KeyNodeEntry>() as u64)
    })
}

pub fn sound_classes<S: Read + Seek>(stream: &mut Stream<S>, header: &CndHeader) -> Result<u64> {
    Ok(anim_classes(stream, header)? + header.num_puppets as u64 * RESOURCE_NAME_SIZE)
}

pub fn cog_scripts<S: Read + Seek>(stream: &mut Stream<S>, header: &CndHeader) -> Result<u64> {
    Ok(sound_classes(stream, header)? + header.num_sound_classes as u64 * RESOURCE_NAME_SIZE)
}

pub fn cogs<S: Read + Seek>(stream: &mut Stream<S>, header: &CndHeader) -> Result<u64> {
    Ok(cog_scripts(stream, header)? + header.num_cog_scripts as u64 * RESOURCE_NAME_SIZE)
}

pub fn templates<S: Read + Seek>(stream: &mut Stream<S>, header: &CndHeader) -> Result<u64> {
    preserving(stream, |stream| {
        let offset = cogs(stream, header)?;
        stream.seek(offset)?;
        let num_cogs = stream.read_u32()? as u64;
        let num_values = stream.read_u32()? as u64;
        Ok(stream.tell()? + (num_cogs + num_values) * RESOURCE_NAME_SIZE)
    })
}

/// Byte length of the eleven side arrays a sizes record describes.
pub(crate) fn side_array_bytes(sizes: &ThingListSizes) -> u64 {
    sizes.physics_infos as u64 * size_of::<RawPhysicsInfo>() as u64
        + sizes.num_path_frames as u64 * size_of::<u32>() as u64
        + sizes.path_frames as u64 * size_of::<PathFrame>() as u64
        + sizes.actor_infos as u64 * size_of::<RawActorInfo>() as u64
        + sizes.weapon_infos as u64 * size_of::<RawWeaponInfo>() as u64
        + sizes.explosion_infos as u64 * size_of::<RawExplosionInfo>() as u64
        + sizes.item_infos as u64 * size_of::<RawItemInfo>() as u64
        + sizes.hint_user_vals as u64 * size_of::<f32>() as u64
        + sizes.particle_infos as u64 * size_of::<RawParticleInfo>() as u64
        + sizes.ai_control_infos as u64 * size_of::<RawAiControlInfo>() as u64
        + sizes.ai_path_frames as u64 * size_of::<Vector3>() as u64
}

pub fn things<S: Read + Seek>(stream: &mut Stream<S>, header: &CndHeader) -> Result<u64> {
    preserving(stream, |stream| {
        let offset = templates(stream, header)?;
        stream.seek(offset)?;
        stream.advance(header.num_thing_templates as u64 * size_of::<ThingHeader>() as u64)?;
        let sizes: ThingListSizes = stream.read_pod()?;
        stream.advance(side_array_bytes(&sizes))?;
        stream.tell()
    })
}

pub fn pvs<S: Read + Seek>(stream: &mut Stream<S>, header: &CndHeader) -> Result<u64> {
    preserving(stream, |stream| {
        let offset = things(stream, header)?;
        stream.seek(offset)?;
        stream.advance(header.num_things as u64 * size_of::<ThingHeader>() as u64)?;
        let sizes: ThingListSizes = stream.read_pod()?;
        stream.advance(side_array_bytes(&sizes))?;
        stream.tell()
    })
}
