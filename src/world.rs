use crate::{Box3, ColorRgb, LinearColor, Vector2, Vector3};
use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct SurfaceFlags: u32 {
        const FLOOR             = 0x1;
        const COG_LINKED        = 0x2;
        const IMPASSABLE        = 0x4;
        const AI_CANNOT_WALK    = 0x8;
        const DOUBLE_TEXTURE    = 0x10;
        const HALF_TEXTURE      = 0x20;
        const EIGHTH_TEXTURE    = 0x40;
        const NO_FALLING_DAMAGE = 0x80;
        const HORIZON_SKY       = 0x200;
        const CEILING_SKY       = 0x400;
        const SCROLLING         = 0x800;
        const ICY               = 0x1000;
        const VERY_ICY          = 0x2000;
        const MAGSEALED         = 0x4000;
        const METAL             = 0x10000;
        const DEEP_WATER        = 0x20000;
        const SHALLOW_WATER     = 0x40000;
        const DIRT              = 0x80000;
        const VERY_DEEP_WATER   = 0x100000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct FaceFlags: u32 {
        const DOUBLE_SIDED = 0x1;
        const TRANSLUCENT  = 0x2;
        const TEX_CLAMP_X  = 0x4;
        const TEX_CLAMP_Y  = 0x8;
        const TEX_FILTER   = 0x10;
        const WHIP_AIM     = 0x20;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct AdjoinFlags: u32 {
        const VISIBLE            = 0x1;
        const ALLOW_MOVEMENT     = 0x2;
        const ALLOW_SOUND        = 0x4;
        const ALLOW_PLAYER_ONLY  = 0x8;
        const ALLOW_AI_ONLY      = 0x10;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct SectorFlags: u32 {
        const NO_GRAVITY       = 0x1;
        const UNDERWATER       = 0x2;
        const COG_LINKED       = 0x4;
        const HAS_THRUST       = 0x8;
        const HIDE_ON_AUTOMAP  = 0x10;
        const NO_ACTOR_ENTER   = 0x20;
        const PIT              = 0x40;
        const HAS_COLLIDE_BOX  = 0x1000;
        const UNDERWATER_COLD  = 0x20000;
        const UNDERWATER_SLUSH = 0x40000;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum GeoMode {
    NotDrawn = 0,
    Points = 1,
    Wireframe = 2,
    Solid = 3,
    #[default]
    Textured = 4,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum LightMode {
    FullyLit = 0,
    NotLit = 1,
    Diffuse = 2,
    #[default]
    Gouraud = 3,
}

/// Portal between two sectors. `mirror` indexes the owning adjoin list;
/// the paired adjoin points back, forming a two-cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceAdjoin {
    pub flags: AdjoinFlags,
    pub mirror: Option<usize>,
    pub distance: f32,
}

/// One corner of a surface polygon: vertex index, optional UV index and
/// a per-vertex intensity color.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceVertex {
    pub vertex: usize,
    pub uv: Option<usize>,
    pub color: LinearColor,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Surface {
    pub material: Option<usize>,
    pub surf_flags: SurfaceFlags,
    pub face_flags: FaceFlags,
    pub geo_mode: GeoMode,
    pub light_mode: LightMode,
    pub adjoin: Option<usize>,
    pub extra_light: LinearColor,
    pub normal: Vector3,
    pub vertices: Vec<SurfaceVertex>,
}

/// World geometry: shared vertex pools plus the surfaces and portals built on them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Georesource {
    pub vertices: Vec<Vector3>,
    pub tex_vertices: Vec<Vector2>,
    pub adjoins: Vec<SurfaceAdjoin>,
    pub surfaces: Vec<Surface>,
}

impl Georesource {
    /// Resolves the mirror of an adjoin, if it has one and the index is in range.
    pub fn mirror_of(&self, adjoin: usize) -> Option<&SurfaceAdjoin> {
        self.adjoins
            .get(adjoin)
            .and_then(|a| a.mirror)
            .and_then(|mirror| self.adjoins.get(mirror))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmbientSound {
    pub sound: String,
    pub volume: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sector {
    pub flags: SectorFlags,
    pub ambient_light: LinearColor,
    pub extra_light: LinearColor,
    pub tint: ColorRgb,
    pub avg_light_pos: Vector3,
    pub avg_light_int: LinearColor,
    pub avg_light_falloff: Vector2,
    pub collide_box: Box3,
    pub bound_box: Box3,
    pub ambient_sound: Option<AmbientSound>,
    pub center: Vector3,
    pub radius: f32,
    pub first_surface: u32,
    pub surface_count: u32,
    pub vertex_indices: Vec<u32>,
    pub pvs_idx: Option<usize>,
    pub thrust: Vector3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_resolution() {
        let geores = Georesource {
            adjoins: vec![
                SurfaceAdjoin {
                    flags: AdjoinFlags::VISIBLE,
                    mirror: Some(1),
                    distance: 1.0,
                },
                SurfaceAdjoin {
                    flags: AdjoinFlags::VISIBLE,
                    mirror: Some(0),
                    distance: 1.0,
                },
                SurfaceAdjoin {
                    flags: AdjoinFlags::empty(),
                    mirror: None,
                    distance: 0.5,
                },
            ],
            ..Default::default()
        };
        assert_eq!(geores.mirror_of(0).unwrap().mirror, Some(0));
        assert!(geores.mirror_of(2).is_none());
        assert!(geores.mirror_of(9).is_none());
    }
}
