//! Binary level container: section codecs, offset computation and in-place
//! patching.
//!
//! The on-disk layout is a fixed header followed by the sections in a fixed
//! order: Sounds, Materials, Georesource, Sectors, AIClasses, Models,
//! Sprites, Keyframes, AnimClasses, SoundClasses, CogScripts, Cogs,
//! Templates, Things, PVS. Section offsets are not stored anywhere; they are
//! recomputed by replaying the size rules of every earlier section.

pub mod cogs;
pub mod georesource;
pub mod keyframes;
pub mod materials;
pub mod offsets;
pub mod patch;
pub mod pvs;
pub mod raw;
pub mod resources;
pub mod sectors;
pub mod sounds;
pub mod things;

use crate::animation::Animation;
use crate::audio::SoundBank;
use crate::cog::{Cog, CogScriptTable};
use crate::material::Material;
use crate::shared::{decode_name, encode_name, LinearColor, Vector2};
use crate::stream::Stream;
use crate::thing::{Thing, ThingTable};
use crate::world::{Georesource, Sector};
use crate::{CndError, Result};
use bitflags::bitflags;
pub use raw::{CndHeader, FILE_VERSION};
use std::io::{Read, Seek, Write};

bitflags! {
    /// World state persisted in the header. Plain level containers carry
    /// 0x0C; the static resource container also sets [`WorldState::STATIC`].
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct WorldState: u32 {
        const STATIC      = 0x1;
        const INITIALIZED = 0x2;
        const UPDATE_FOG  = 0x4;
        const INIT_HUD    = 0x8;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Fog {
    pub enabled: bool,
    pub color: LinearColor,
    pub start_depth: f32,
    pub end_depth: f32,
}

/// Reserved capacities from the header's `size*` fields. The game may
/// reserve more slots than a file actually uses, so these round-trip
/// independently of the element counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capacities {
    pub materials: u32,
    pub ai_classes: u32,
    pub models: u32,
    pub sprites: u32,
    pub keyframes: u32,
    pub puppets: u32,
    pub sound_classes: u32,
    pub cog_scripts: u32,
    pub cogs: u32,
    pub templates: u32,
}

/// Header words with no known meaning, preserved verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderUnknowns {
    pub unknown28: u32,
    pub unknown29: u32,
    pub unknown32: u32,
    pub unknown33: u32,
}

/// Fully parsed level container.
#[derive(Debug)]
pub struct World {
    pub file_path: String,
    pub state: WorldState,
    pub gravity: f32,
    pub ceiling_sky_z: f32,
    pub horizon_distance: f32,
    pub horizon_sky_offset: Vector2,
    pub ceiling_sky_offset: Vector2,
    pub lod_distances: [f32; 4],
    pub fog: Fog,
    pub last_thing_idx: u32,
    pub capacities: Capacities,
    pub unknowns: HeaderUnknowns,

    pub sound_bank: SoundBank,
    pub materials: Vec<Material>,
    pub georesource: Georesource,
    pub sectors: Vec<Sector>,
    pub ai_classes: Vec<String>,
    pub models: Vec<String>,
    pub sprites: Vec<String>,
    pub keyframes: Vec<Animation>,
    pub anim_classes: Vec<String>,
    pub sound_classes: Vec<String>,
    pub cog_script_names: Vec<String>,
    pub cogs: Vec<Cog>,
    pub templates: ThingTable,
    pub things: Vec<Thing>,
    pub pvs: Vec<u8>,
}

impl Default for World {
    fn default() -> Self {
        World {
            file_path: String::new(),
            state: WorldState::INITIALIZED | WorldState::UPDATE_FOG | WorldState::INIT_HUD,
            gravity: 4.0,
            ceiling_sky_z: 20.0,
            horizon_distance: 200.0,
            horizon_sky_offset: Vector2::default(),
            ceiling_sky_offset: Vector2::default(),
            lod_distances: [0.3, 0.6, 0.9, 1.2],
            fog: Fog::default(),
            last_thing_idx: 0,
            capacities: Capacities::default(),
            unknowns: HeaderUnknowns::default(),
            sound_bank: SoundBank::new(1),
            materials: Vec::new(),
            georesource: Georesource::default(),
            sectors: Vec::new(),
            ai_classes: Vec::new(),
            models: Vec::new(),
            sprites: Vec::new(),
            keyframes: Vec::new(),
            anim_classes: Vec::new(),
            sound_classes: Vec::new(),
            cog_script_names: Vec::new(),
            cogs: Vec::new(),
            templates: ThingTable::default(),
            things: Vec::new(),
            pvs: Vec::new(),
        }
    }
}

/// Reads and verifies the fixed container header, leaving the cursor just
/// past it.
pub fn read_header<S: Read + Seek>(stream: &mut Stream<S>) -> Result<CndHeader> {
    stream.seek(0)?;
    let header: CndHeader = stream.read_pod()?;

    if header.copyright != raw::COPYRIGHT {
        return Err(CndError::format("read_header", "bad container copyright"));
    }
    if header.version != FILE_VERSION {
        return Err(CndError::format(
            "read_header",
            format!("wrong container file version: {}", header.version),
        ));
    }

    // Element counts can never exceed the reserved capacities.
    let count_pairs = [
        (header.num_materials, header.size_materials, "materials"),
        (header.num_ai_classes, header.size_ai_classes, "ai classes"),
        (header.num_models, header.size_models, "models"),
        (header.num_sprites, header.size_sprites, "sprites"),
        (header.num_keyframes, header.size_keyframes, "keyframes"),
        (header.num_puppets, header.size_puppets, "puppets"),
        (
            header.num_sound_classes,
            header.size_sound_classes,
            "sound classes",
        ),
        (
            header.num_cog_scripts,
            header.size_cog_scripts,
            "cog scripts",
        ),
        (header.num_cogs, header.size_cogs, "cogs"),
        (
            header.num_thing_templates,
            header.size_thing_templates,
            "templates",
        ),
    ];
    for (num, size, what) in count_pairs {
        if num > size {
            return Err(CndError::format(
                "read_header",
                format!("impossible {what} count: {num} exceeds capacity {size}"),
            ));
        }
    }

    Ok(header)
}

impl World {
    /// Parses a whole container. The script table supplies the symbol lists
    /// the Cogs section binds its values against; scripts themselves live
    /// outside the container.
    pub fn read<S: Read + Seek>(stream: &mut Stream<S>, scripts: &CogScriptTable) -> Result<World> {
        let header = read_header(stream)?;

        let mut world = World {
            file_path: decode_name(&header.file_path)?,
            state: WorldState::from_bits_retain(header.state),
            gravity: header.world_gravity,
            ceiling_sky_z: header.ceiling_sky_z,
            horizon_distance: header.horizon_distance,
            horizon_sky_offset: header.horizon_sky_offset,
            ceiling_sky_offset: header.ceiling_sky_offset,
            lod_distances: header.lod_distances,
            fog: Fog {
                enabled: header.fog_enabled != 0,
                color: header.fog_color,
                start_depth: header.fog_start_depth,
                end_depth: header.fog_end_depth,
            },
            last_thing_idx: header.last_thing_idx,
            capacities: Capacities {
                materials: header.size_materials,
                ai_classes: header.size_ai_classes,
                models: header.size_models,
                sprites: header.size_sprites,
                keyframes: header.size_keyframes,
                puppets: header.size_puppets,
                sound_classes: header.size_sound_classes,
                cog_scripts: header.size_cog_scripts,
                cogs: header.size_cogs,
                templates: header.size_thing_templates,
            },
            unknowns: HeaderUnknowns {
                unknown28: header.unknown28,
                unknown29: header.unknown29,
                unknown32: header.unknown32,
                unknown33: header.unknown33,
            },
            ..World::default()
        };

        // Sections are contiguous, so a full read just walks them in order.
        let seed = sounds::parse(stream, &mut world.sound_bank, 0)?;
        world.sound_bank.set_handle_seed(seed);
        if world.state.contains(WorldState::STATIC) {
            world.sound_bank.set_static_track(0, true)?;
        }
        world.materials = materials::parse(stream, &header)?;
        world.georesource = georesource::parse(stream, &header)?;
        world.sectors = sectors::parse(stream, &header)?;
        world.ai_classes = resources::parse(stream, header.num_ai_classes, "AIClasses")?;
        world.models = resources::parse(stream, header.num_models, "Models")?;
        world.sprites = resources::parse(stream, header.num_sprites, "Sprites")?;
        world.keyframes = keyframes::parse(stream, &header)?;
        world.anim_classes = resources::parse(stream, header.num_puppets, "AnimClasses")?;
        world.sound_classes = resources::parse(stream, header.num_sound_classes, "SoundClasses")?;
        world.cog_script_names = resources::parse(stream, header.num_cog_scripts, "CogScripts")?;
        world.cogs = cogs::parse(stream, scripts)?;
        world.templates = things::parse_templates(stream, &header)?;
        world.things = things::parse_things(stream, &header)?;
        // The PVS section is optional; a container may simply end after the
        // things section, leaving every sector with a -1 visibility index.
        world.pvs = if stream.tell()? < stream.size()? {
            pvs::parse(stream)?
        } else {
            Vec::new()
        };

        Ok(world)
    }

    /// Serializes the whole container, fixing up the leading file-size word
    /// once the final size is known.
    pub fn write<S: Write + Seek>(&self, stream: &mut Stream<S>) -> Result<()> {
        let header = self.to_header()?;
        stream.write_pod(&header)?;

        sounds::write(stream, &self.sound_bank, 0)?;
        materials::write(stream, &self.materials)?;
        georesource::write(stream, &self.georesource)?;
        sectors::write(stream, &self.sectors)?;
        resources::write(stream, &self.ai_classes, "AIClasses")?;
        resources::write(stream, &self.models, "Models")?;
        resources::write(stream, &self.sprites, "Sprites")?;
        keyframes::write(stream, &self.keyframes)?;
        resources::write(stream, &self.anim_classes, "AnimClasses")?;
        resources::write(stream, &self.sound_classes, "SoundClasses")?;
        resources::write(stream, &self.cog_script_names, "CogScripts")?;
        cogs::write(stream, &self.cogs)?;
        things::write_templates(stream, &self.templates)?;
        things::write_things(stream, &self.things)?;
        pvs::write(stream, &self.pvs)?;

        let size = stream.size()?;
        stream.seek(0)?;
        stream.write_u32(size as u32)?;
        stream.seek(size)
    }

    /// Builds the on-disk header from the model. Counts come from the
    /// content; reserved capacities never shrink below them.
    pub fn to_header(&self) -> Result<CndHeader> {
        let cap = |capacity: u32, count: usize| capacity.max(count as u32);
        let track = self.sound_bank.track(0)?;

        let mut header = CndHeader::new();
        header.file_path = encode_name("World::to_header", &self.file_path)?;
        header.state = self.state.bits();
        header.world_gravity = self.gravity;
        header.ceiling_sky_z = self.ceiling_sky_z;
        header.horizon_distance = self.horizon_distance;
        header.horizon_sky_offset = self.horizon_sky_offset;
        header.ceiling_sky_offset = self.ceiling_sky_offset;
        header.lod_distances = self.lod_distances;
        header.fog_enabled = self.fog.enabled as i32;
        header.fog_color = self.fog.color;
        header.fog_start_depth = self.fog.start_depth;
        header.fog_end_depth = self.fog.end_depth;

        header.unknown28 = self.unknowns.unknown28;
        header.unknown29 = self.unknowns.unknown29;
        header.unknown32 = self.unknowns.unknown32;
        header.unknown33 = self.unknowns.unknown33;

        header.num_sounds = track.len() as u32;
        header.num_materials = self.materials.len() as u32;
        header.size_materials = cap(self.capacities.materials, self.materials.len());
        header.num_vertices = self.georesource.vertices.len() as u32;
        header.num_tex_vertices = self.georesource.tex_vertices.len() as u32;
        header.num_adjoins = self.georesource.adjoins.len() as u32;
        header.num_surfaces = self.georesource.surfaces.len() as u32;
        header.num_sectors = self.sectors.len() as u32;
        header.num_ai_classes = self.ai_classes.len() as u32;
        header.size_ai_classes = cap(self.capacities.ai_classes, self.ai_classes.len());
        header.num_models = self.models.len() as u32;
        header.size_models = cap(self.capacities.models, self.models.len());
        header.num_sprites = self.sprites.len() as u32;
        header.size_sprites = cap(self.capacities.sprites, self.sprites.len());
        header.num_keyframes = self.keyframes.len() as u32;
        header.size_keyframes = cap(self.capacities.keyframes, self.keyframes.len());
        header.num_puppets = self.anim_classes.len() as u32;
        header.size_puppets = cap(self.capacities.puppets, self.anim_classes.len());
        header.num_sound_classes = self.sound_classes.len() as u32;
        header.size_sound_classes = cap(self.capacities.sound_classes, self.sound_classes.len());
        header.num_cog_scripts = self.cog_script_names.len() as u32;
        header.size_cog_scripts = cap(self.capacities.cog_scripts, self.cog_script_names.len());
        header.num_cogs = self.cogs.len() as u32;
        header.size_cogs = cap(self.capacities.cogs, self.cogs.len());
        header.num_thing_templates = self.templates.len() as u32;
        header.size_thing_templates = cap(self.capacities.templates, self.templates.len());
        header.num_things = self.things.len() as u32;
        header.last_thing_idx = self.last_thing_idx;
        header.size_pvs = self.pvs.len() as u32;

        Ok(header)
    }
}

impl CndHeader {
    /// A fresh header with the watermark and version set and every pointer
    /// word zeroed.
    pub fn new() -> Self {
        let mut header: CndHeader = bytemuck::Zeroable::zeroed();
        header.copyright = raw::COPYRIGHT;
        header.version = FILE_VERSION;
        header
    }
}

impl Default for CndHeader {
    fn default() -> Self {
        CndHeader::new()
    }
}
