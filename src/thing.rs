use crate::{GradientColor, LinearColor, Rotator, Vector3};
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use num_enum::{FromPrimitive, IntoPrimitive, TryFromPrimitive};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum ThingType {
    #[default]
    Free = 0,
    Camera = 1,
    Actor = 2,
    Weapon = 3,
    Debris = 4,
    Item = 5,
    Explosion = 6,
    Cog = 7,
    Ghost = 8,
    Corpse = 9,
    Player = 10,
    Particle = 11,
    Hint = 12,
    Sprite = 13,
    Polyline = 14,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum MoveType {
    #[default]
    None = 0,
    Physics = 1,
    Path = 2,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum ControlType {
    #[default]
    Plot = 0,
    Player = 1,
    Ai = 2,
    Explosion = 6,
    Particle = 7,
}

/// How the engine renders the thing. Many templates carry no render
/// resource at all, so unknown tags are preserved verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum RenderType {
    Model = 1,    // 3do
    Sprite = 4,   // spr
    Particle = 5, // par
    Polyline = 6,
    #[num_enum(catch_all)]
    Unknown(u32),
}

impl Default for RenderType {
    fn default() -> Self {
        RenderType::Unknown(0)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ThingFlags: u32 {
        const EMITS_LIGHT    = 0x1;
        const DEAD           = 0x2;
        const MAGSEALED      = 0x4;
        const PARTIALLY_LIT  = 0x8;
        const INVISIBLE      = 0x10;
        const CAN_STAND_ON   = 0x40;
        const COG_LINKED     = 0x400;
        const NO_CRUSH       = 0x800;
        const NOT_IN_PVS     = 0x1000;
        const MOVABLE        = 0x8000;
        const NO_SOUND       = 0x80000;
        const UNDERWATER     = 0x200000;
        const DESTROYED      = 0x800000;
        const SEEN           = 0x40000000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct PhysicsFlags: u32 {
        const HAS_GRAVITY          = 0x1;
        const USES_THRUST          = 0x2;
        const ALIGN_TO_SURFACE     = 0x10;
        const BOUNCES              = 0x20;
        const STICKS_TO_FLOOR      = 0x40;
        const STICKS_TO_WALL       = 0x80;
        const USES_ROTATION_VEL    = 0x200;
        const BANKS_WHEN_TURNING   = 0x400;
        const USES_ANGULAR_THRUST  = 0x1000;
        const FLYING               = 0x2000;
        const FEELS_BLAST_FORCE    = 0x4000;
        const IS_CROUCHING         = 0x10000;
        const DO_NOT_ROTATE_VEL    = 0x20000;
        const PARTIAL_GRAVITY      = 0x40000;
        const TREADING_WATER       = 0x100000;
        const NOT_AFFECTED_BY_THRUST = 0x400000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ActorFlags: u32 {
        const CAN_ROTATE_HEAD  = 0x1;
        const HAS_HEAD_LIGHT   = 0x4;
        const INVULNERABLE     = 0x8;
        const HEAD_IS_CENTERED = 0x10;
        const EXPLODES_WHEN_KILLED = 0x20;
        const BREATHES_UNDERWATER  = 0x40;
        const INVISIBLE_TO_AI  = 0x100;
        const DROPS_WEAPON     = 0x200;
        const CAN_DROWN        = 0x400;
        const IMMOBILE         = 0x8000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct WeaponFlags: u32 {
        const NO_DAMAGE_TO_SHOOTER = 0x1;
        const EXPLODES_ON_SURFACE  = 0x4;
        const EXPLODES_ON_THING    = 0x8;
        const ATTACHES_TO_WALL     = 0x80;
        const EXPLODES_AT_TIMEOUT  = 0x100;
        const EXPLODES_ON_WORLD_FLOOR = 0x400;
        const ATTACHES_TO_THING    = 0x800;
        const RICOCHETS_OFF_SURFACE = 0x1000;
        const TRIGGER_AI_AWARENESS = 0x8000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ExplosionFlags: u32 {
        const ANIMATED_SPRITE     = 0x1;
        const HAS_BLAST_PHASE     = 0x2;
        const DAMAGE_IN_BLAST     = 0x4;
        const HAS_CHILD_EXPLOSION = 0x8;
        const VARIABLE_LIGHT      = 0x10;
        const NO_DAMAGE_TO_SHOOTER = 0x40;
        const RANDOM_DEBRIS       = 0x80;
        const FLASH_BLINDS_THINGS = 0x100;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ItemFlags: u32 {
        const RESPAWN_SINGLEPLAYER = 0x1;
        const RESPAWN_MULTIPLAYER  = 0x2;
        const BACKPACK_ITEM        = 0x4;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ParticleFlags: u32 {
        const OUTWARD_EXPANDING = 0x1;
        const ANIMATE_CEL       = 0x2;
        const RANDOM_START_CEL  = 0x4;
        const FADES_OUT         = 0x8;
        const EMIT_LIGHT        = 0x10;
        const FLIPPED_U         = 0x20;
        const FLIPPED_V         = 0x40;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct DamageType: u32 {
        const IMPACT        = 0x1;
        const ENERGY        = 0x2;
        const FIRE          = 0x4;
        const FISTS         = 0x8;
        const WHIP          = 0x10;
        const CRUNCH        = 0x20;
        const DROWN         = 0x40;
        const CRUSH         = 0x80;
        const POISON        = 0x100;
        const LAVA          = 0x200;
        const ELECTRIC_WHIP = 0x800;
        const IMP1          = 0x1000;
        const IMP4          = 0x4000;
        const LIGHTNING     = 0x100000;
        const SPIKE         = 0x400000;
        const QUETZ         = 0x1000000;
        const VEHICLE       = 0x2000000;
        const BONK          = 0x4000000;
        const DEBRIS        = 0x8000000;
        const ICE_MONSTER   = 0x20000000;
        const COLD_WATER    = 0x40000000;
        const CHICKEN       = 0x80000000;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum CollideType {
    #[default]
    None = 0,
    Sphere = 1,
    SphereUnknown = 2,
    Face = 3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Collide {
    pub kind: CollideType,
    pub move_size: f32,
    pub size: f32,
    pub width: f32,
    pub height: f32,
    pub center_x: f32,
    pub center_y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct ThingLight {
    pub color: LinearColor,
    pub emit_color: LinearColor,
}

/// One waypoint of a scripted movement path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct PathFrame {
    pub pos: Vector3,
    pub rot: Rotator,
}

static_assertions::const_assert_eq!(std::mem::size_of::<PathFrame>(), 24);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathInfo {
    pub path_frames: Vec<PathFrame>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhysicsInfo {
    pub flags: PhysicsFlags,
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

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorInfo {
    pub flags: ActorFlags,
    pub weapon_template: String,
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
    pub explode_template: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeaponInfo {
    pub flags: WeaponFlags,
    pub explosion_template: String,
    pub damage: f32,
    pub min_damage: f32,
    pub rate: f32,
    pub damage_type: DamageType,
    pub range: f32,
    pub force: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplosionInfo {
    pub flags: ExplosionFlags,
    pub damage: f32,
    pub damage_type: DamageType,
    pub range: f32,
    pub force: f32,
    pub ms_blast_time: i32,
    pub ms_baby_time: i32,
    pub ms_expand_time: i32,
    pub ms_fade_time: i32,
    pub max_light: f32,
    pub debris_templates: Vec<String>,
    pub sprite_start: Vector3,
    pub sprite_end: Vector3,
    pub sprite_template: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ItemInfo {
    pub flags: ItemFlags,
    pub sec_respawn_interval: f32,
}

/// Raw bits of a hint's progress value. Bit 0x40000 of the float's
/// representation marks the hint as solved.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HintUserVal(pub f32);

impl HintUserVal {
    pub fn solved(&self) -> bool {
        self.0.to_bits() & 0x40000 != 0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleInfo {
    pub flags: ParticleFlags,
    pub growth_speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub size: f32,
    pub timeout_rate: f32,
    pub count: i32,
    pub pitch_range: f32,
    pub yaw_range: f32,
    pub material: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiControlInfo {
    pub ai_file: String,
    pub path_frames: Vec<Vector3>,
}

/// Movement payload selected by the header's move type tag. A `Path` thing
/// with zero recorded frames carries `None` here while keeping its tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MoveInfo {
    #[default]
    None,
    Physics(PhysicsInfo),
    Path(PathInfo),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ControlInfo {
    #[default]
    None,
    Ai(AiControlInfo),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ThingInfo {
    #[default]
    None,
    Actor(Box<ActorInfo>),
    Weapon(WeaponInfo),
    Explosion(Box<ExplosionInfo>),
    Item(ItemInfo),
    Hint(HintUserVal),
    Particle(ParticleInfo),
}

/// A world instance or a template blueprint. Templates are referenced by
/// `base_name` and may themselves inherit from an earlier template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Thing {
    pub base_name: String,
    pub name: String,
    pub pos: Vector3,
    pub pyr_orient: Rotator,
    pub unknown: i32,
    pub sector: i32,
    pub kind: ThingType,
    pub flags: ThingFlags,
    pub move_type: MoveType,
    pub control_type: ControlType,
    pub light: ThingLight,
    pub ms_life_left: i32,
    pub render_type: RenderType,
    pub render_file: String,
    pub puppet_file: String,
    pub sound_class_file: String,
    pub create_thing_template: String,
    pub cog_script_file: String,
    pub collide: Collide,
    pub perf_level: i32,
    pub move_info: MoveInfo,
    pub thing_info: ThingInfo,
    pub control_info: ControlInfo,
}

/// Insertion-ordered template table. Template files reference earlier
/// templates by name, so order is load-bearing.
#[derive(Debug, Clone, Default)]
pub struct ThingTable {
    things: Vec<Thing>,
    by_name: std::collections::HashMap<String, usize>,
}

impl ThingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a named thing; returns `false` without inserting when the
    /// name is already taken.
    pub fn insert(&mut self, thing: Thing) -> bool {
        if self.by_name.contains_key(&thing.name) {
            return false;
        }
        self.by_name.insert(thing.name.clone(), self.things.len());
        self.things.push(thing);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Thing> {
        self.by_name.get(name).map(|&idx| &self.things[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Thing> {
        self.things.iter()
    }

    pub fn len(&self) -> usize {
        self.things.len()
    }

    pub fn is_empty(&self) -> bool {
        self.things.is_empty()
    }
}

impl PartialEq for ThingTable {
    fn eq(&self, other: &Self) -> bool {
        self.things == other.things
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_names_are_unique() {
        let mut table = ThingTable::new();
        let mut template = Thing::default();
        template.name = "walk_player".to_owned();
        assert!(table.insert(template.clone()));
        assert!(!table.insert(template));
        assert_eq!(table.len(), 1);
        assert!(table.get("walk_player").is_some());
    }

    #[test]
    fn hint_solved_bit() {
        let solved = HintUserVal(f32::from_bits(5.0f32.to_bits() | 0x40000));
        assert!(solved.solved());
        assert!(!HintUserVal(5.0).solved());
    }

    #[test]
    fn render_type_preserves_unknown_tags() {
        assert_eq!(RenderType::from(0u32), RenderType::Unknown(0));
        assert_eq!(u32::from(RenderType::Unknown(9)), 9);
        assert_eq!(u32::from(RenderType::Model), 1);
    }
}
