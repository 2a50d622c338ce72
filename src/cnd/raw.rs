//! On-disk records of the binary container. Every struct maps a packed
//! little-endian record byte for byte and is transferred in bulk.

use crate::shared::{Box3, ColorRgb, GradientColor, LinearColor, Rotator, Vector2, Vector3};
use crate::thing::{PathFrame, ThingLight};
use bytemuck::{Pod, Zeroable};
use std::mem::size_of;

pub const FILE_VERSION: u32 = 3;

/// The 1,216 byte copyright watermark every container carries.
pub const COPYRIGHT: [u8; 1216] = build_copyright();

const COPYRIGHT_TEXT: [&str; 38] = [
    "................................",
    "................@...@...@...@...",
    ".............@...@..@..@...@....",
    "................@.@.@.@.@.@.....",
    "@@@@@@@@......@...........@.....",
    "@@@@@@@@....@@......@@@....@....",
    "@@.....@.....@......@@@.....@@..",
    "@@.@@@@@......@.....@@@......@@.",
    "@@@@@@@@.......@....@@.....@@...",
    "@@@@@@@@.........@@@@@@@@@@.....",
    "@@@@@@@@..........@@@@@@........",
    "@@.....@..........@@@@@.........",
    "@@.@@@@@.........@@@@@@.........",
    "@@.....@.........@@@@@@.........",
    "@@@@@@@@.........@@@@@@.........",
    "@@@@@@@@.........@@@@@@@........",
    "@@@...@@.........@@@@@@@........",
    "@@.@@@.@.........@.....@........",
    "@@..@..@........@.......@.......",
    "@@@@@@@@........@.......@.......",
    "@@@@@@@@.......@........@.......",
    "@@..@@@@.......@........@.......",
    "@@@@..@@......@.........@.......",
    "@@@@.@.@......@.........@.......",
    "@@....@@........................",
    "@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@",
    "@@@@@@@@@@@@@.@@@@@@@@@@@@@@@@@@",
    "@@.@@..@@@@@..@@@@@@@@@@.@@@@@@@",
    "@@.@.@.@@@@.@.@@@.@..@@...@@@..@",
    "@@..@@@@@@....@@@..@@@@@.@@@@.@@",
    "@@@@@@@@...@@.@@@.@@@@@..@@...@@",
    "@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@",
    "@.(c).lucasarts.entertainment..@",
    "@.........company.llc..........@",
    "@....(c).lucasfilm.ltd.&.tm....@",
    "@.....all.rights.reserved......@",
    "@...used.under.authorization...@",
    "@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@",
];

const fn build_copyright() -> [u8; 1216] {
    // Assembled at compile time from the 38 rows of 32 characters above.
    let mut buf = [0u8; 1216];
    let mut row = 0;
    while row < 38 {
        let line = COPYRIGHT_TEXT[row].as_bytes();
        let mut col = 0;
        while col < 32 {
            buf[row * 32 + col] = line[col];
            col += 1;
        }
        row += 1;
    }
    buf
}

/// Fixed 1,568 byte container header. The `a_*` words are engine pointers
/// with no meaning on disk and are always written as zero.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct CndHeader {
    pub file_size: u32,
    pub copyright: [u8; 1216],
    pub file_path: [u8; 64],
    pub state: u32,
    pub version: u32,
    pub world_gravity: f32,
    pub ceiling_sky_z: f32,
    pub horizon_distance: f32,
    pub horizon_sky_offset: Vector2,
    pub ceiling_sky_offset: Vector2,
    pub lod_distances: [f32; 4],
    pub fog_enabled: i32,
    pub fog_color: LinearColor,
    pub fog_start_depth: f32,
    pub fog_end_depth: f32,

    pub num_sounds: u32,

    pub num_materials: u32,
    pub size_materials: u32,
    pub a_materials: u32,
    pub ap_mat_array: u32,

    pub num_vertices: u32,
    pub a_vertices: u32,

    pub unknown28: u32,
    pub unknown29: u32,

    pub num_tex_vertices: u32,
    pub a_tex_vertices: u32,

    pub unknown32: u32,
    pub unknown33: u32,

    pub num_adjoins: u32,
    pub a_adjoins: u32,

    pub num_surfaces: u32,
    pub a_surfaces: u32,

    pub num_sectors: u32,
    pub a_sectors: u32,

    pub num_ai_classes: u32,
    pub size_ai_classes: u32,
    pub a_ai_classes: u32,

    pub num_models: u32,
    pub size_models: u32,
    pub a_models: u32,

    pub num_sprites: u32,
    pub size_sprites: u32,
    pub a_sprites: u32,

    pub num_keyframes: u32,
    pub size_keyframes: u32,
    pub a_keyframes: u32,

    pub num_puppets: u32,
    pub size_puppets: u32,
    pub a_puppets: u32,

    pub num_sound_classes: u32,
    pub size_sound_classes: u32,
    pub a_sound_classes: u32,

    pub num_cog_scripts: u32,
    pub size_cog_scripts: u32,
    pub a_cog_scripts: u32,

    pub num_cogs: u32,
    pub size_cogs: u32,
    pub a_cogs: u32,

    pub num_thing_templates: u32,
    pub size_thing_templates: u32,
    pub a_thing_templates: u32,

    pub num_things: u32,
    pub last_thing_idx: u32,
    pub a_things: u32,

    pub size_pvs: u32,
    pub a_pvs: u32,
}

static_assertions::const_assert_eq!(size_of::<CndHeader>(), 1568);

#[derive(Debug, Clone, Copy, Default, Zeroable, Pod)]
#[repr(C)]
pub struct SoundHeader {
    pub handle: u32,
    pub bank_idx: u32,
    pub path_offset: u32,
    pub name_offset: u32,
    pub data_offset: u32,
    pub lip_sync_data: u32, // unused in serialization
    pub sample_rate: u32,
    pub sample_bit_size: u32,
    pub num_channels: u32,
    pub data_size: u32,
    pub compressed: u32,
    pub idx: u32,
}

static_assertions::const_assert_eq!(size_of::<SoundHeader>(), 48);

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct MatHeader {
    pub name: [u8; 64],
    pub width: i32,
    pub height: i32,
    pub cel_count: i32,
    pub mip_levels: i32,
    pub color_info: crate::material::ColorFormat,
}

static_assertions::const_assert_eq!(size_of::<MatHeader>(), 136);

#[derive(Debug, Clone, Copy, Default, Zeroable, Pod)]
#[repr(C)]
pub struct RawSurfaceAdjoin {
    pub flags: u32,
    pub mirror: i32, // -1 = no mirror
    pub distance: f32,
}

static_assertions::const_assert_eq!(size_of::<RawSurfaceAdjoin>(), 12);

#[derive(Debug, Clone, Copy, Default, Zeroable, Pod)]
#[repr(C)]
pub struct SurfaceHeader {
    pub material: i32, // -1 = no material
    pub surf_flags: u32,
    pub face_flags: u32,
    pub geo_mode: u32,
    pub light_mode: u32,
    pub adjoin: i32, // -1 = no adjoin
    pub extra_light: LinearColor,
    pub normal: Vector3,
    pub num_verts: u32,
}

static_assertions::const_assert_eq!(size_of::<SurfaceHeader>(), 56);

#[derive(Debug, Clone, Copy, Default, Zeroable, Pod)]
#[repr(C)]
pub struct SurfaceVert {
    pub vert: u32,
    pub uv: i32, // -1 = no texture vertex
    pub color: LinearColor,
}

static_assertions::const_assert_eq!(size_of::<SurfaceVert>(), 24);

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct SectorHeader {
    pub flags: u32,
    pub ambient_light: LinearColor,
    pub extra_light: LinearColor,
    pub tint: ColorRgb,
    pub avg_light_pos: Vector3,
    pub avg_light_int: LinearColor,
    pub avg_light_falloff: Vector2,
    pub collide_box: Box3,
    pub bound_box: Box3,
    pub ambient_sound: [u8; 64],
    pub ambient_sound_volume: f32,
    pub center: Vector3,
    pub radius: f32,
    pub first_surface: i32,
    pub surface_count: i32,
    pub vertex_count: i32,
    pub pvs_idx: i32,
    pub thrust: Vector3,
}

static_assertions::const_assert_eq!(size_of::<SectorHeader>(), 244);

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct KeyHeader {
    pub name: [u8; 64],
    pub flags: u32,
    pub kind: u32,
    pub frames: u32,
    pub fps: f32,
    pub num_markers: u32,
    pub num_joints: u32,
    pub num_nodes: u32,
}

static_assertions::const_assert_eq!(size_of::<KeyHeader>(), 92);

#[derive(Debug, Clone, Copy, Default, Zeroable, Pod)]
#[repr(C)]
pub struct RawKeyMarker {
    pub frame: f32,
    pub kind: u32,
}

static_assertions::const_assert_eq!(size_of::<RawKeyMarker>(), 8);

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct KeyNode {
    pub mesh_name: [u8; 64],
    pub node: u32,
    pub num_entries: u32,
}

static_assertions::const_assert_eq!(size_of::<KeyNode>(), 72);

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct RawCollide {
    pub kind: u32,
    pub move_size: f32,
    pub size: f32,
    pub width: f32,
    pub height: f32,
    pub center_x: f32,
    pub center_y: f32,
}

static_assertions::const_assert_eq!(size_of::<RawCollide>(), 28);

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct ThingHeader {
    pub base_name: [u8; 64],
    pub name: [u8; 64],
    pub pos: Vector3,
    pub pyr_orient: Rotator,
    pub unknown: i32,
    pub sector: i32,
    pub kind: u32,
    pub flags: u32,
    pub move_type: u32,
    pub control_type: u32,
    pub light: ThingLight,
    pub ms_life_left: i32,
    pub rd_thing_type: u32,
    pub rd_thing_file: [u8; 64],
    pub pup_file: [u8; 64],
    pub snd_file: [u8; 64],
    pub create_thing: [u8; 64],
    pub cog_script_file: [u8; 64],
    pub collide: RawCollide,
    pub perf_level: i32,
}

static_assertions::const_assert_eq!(size_of::<ThingHeader>(), 568);

/// Element counts of the eleven side arrays trailing the thing headers,
/// in on-disk order.
#[derive(Debug, Clone, Copy, Default, Zeroable, Pod)]
#[repr(C)]
pub struct ThingListSizes {
    pub physics_infos: u32,
    pub num_path_frames: u32,
    pub path_frames: u32,
    pub actor_infos: u32,
    pub weapon_infos: u32,
    pub explosion_infos: u32,
    pub item_infos: u32,
    pub hint_user_vals: u32,
    pub particle_infos: u32,
    pub ai_control_infos: u32,
    pub ai_path_frames: u32,
}

static_assertions::const_assert_eq!(size_of::<ThingListSizes>(), 44);

#[derive(Debug, Clone, Copy, Default, Zeroable, Pod)]
#[repr(C)]
pub struct RawPhysicsInfo {
    pub flags: u32,
    pub mass: f32,
    pub height: f32,
    pub air_drag: f32,
    pub surface_drag: f32,
    pub static_drag: f32,
    pub angular_velocity: Vector3,
    pub velocity: Vector3,
    pub max_rotation_velocity: f32,
    pub max_velocity: f32,
    pub orient_speed: f32,
    pub buoyancy: f32,
}

static_assertions::const_assert_eq!(size_of::<RawPhysicsInfo>(), 64);

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct RawActorInfo {
    pub flags: u32,
    pub weapon_template: [u8; 64],
    pub health: f32,
    pub max_health: f32,
    pub max_thrust: f32,
    pub max_rot_thrust: f32,
    pub max_head_velocity: f32,
    pub max_head_yaw: f32,
    pub jump_speed: f32,
    pub eye_offset: Vector3,
    pub min_head_pitch: f32,
    pub max_head_pitch: f32,
    pub fire_offset: Vector3,
    pub light_offset: Vector3,
    pub light_intensity: LinearColor,
    pub voice_color: GradientColor,
    pub explode_template: [u8; 64],
}

static_assertions::const_assert_eq!(size_of::<RawActorInfo>(), 284);

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct RawWeaponInfo {
    pub flags: u32,
    pub explosion_template: [u8; 64],
    pub damage: f32,
    pub min_damage: f32,
    pub rate: f32,
    pub damage_type: u32,
    pub range: f32,
    pub force: f32,
}

static_assertions::const_assert_eq!(size_of::<RawWeaponInfo>(), 92);

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct RawExplosionInfo {
    pub flags: u32,
    pub damage: f32,
    pub damage_type: u32,
    pub range: f32,
    pub force: f32,
    pub ms_blast_time: i32,
    pub ms_baby_time: i32,
    pub ms_expand_time: i32,
    pub ms_fade_time: i32,
    pub max_light: f32,
    pub debris_templates: [[u8; 64]; 16],
    pub sprite_start: Vector3,
    pub sprite_end: Vector3,
    pub sprite_template: [u8; 64],
}

static_assertions::const_assert_eq!(size_of::<RawExplosionInfo>(), 1152);

#[derive(Debug, Clone, Copy, Default, Zeroable, Pod)]
#[repr(C)]
pub struct RawItemInfo {
    pub flags: u32,
    pub sec_respawn_interval: f32,
}

static_assertions::const_assert_eq!(size_of::<RawItemInfo>(), 8);

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct RawParticleInfo {
    pub flags: u32,
    pub growth_speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub size: f32,
    pub timeout_rate: f32,
    pub count: i32,
    pub pitch_range: f32,
    pub yaw_range: f32,
    pub material: [u8; 64],
}

static_assertions::const_assert_eq!(size_of::<RawParticleInfo>(), 100);

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct RawAiControlInfo {
    pub ai_file: [u8; 64],
    pub num_path_frames: i32,
}

static_assertions::const_assert_eq!(size_of::<RawAiControlInfo>(), 68);

static_assertions::const_assert_eq!(size_of::<PathFrame>(), 24);
static_assertions::const_assert_eq!(size_of::<Vector3>(), 12);
