//! Textual NDY level format.
//!
//! NDY carries the same world as the binary container in human-editable
//! key/value sections. Asset-backed sections (sounds, materials, keyframes
//! and the class lists) hold file names only; the payloads live in loose
//! files or GOB archives. Geometry, sectors, cogs, templates, things and
//! the PVS blob are stored in full.

pub mod reader;
pub mod text;
pub mod writer;

use crate::thing::{Thing, ThingTable};
use crate::world::{Georesource, Sector};
use crate::Result;
use std::io::{BufRead, Write};
use text::{TextReader, TextWriter};

pub const SECTION_COPYRIGHT: &str = "COPYRIGHT";
pub const SECTION_HEADER: &str = "HEADER";
pub const SECTION_SOUNDS: &str = "SOUNDS";
pub const SECTION_MATERIALS: &str = "MATERIALS";
pub const SECTION_GEORESOURCE: &str = "GEORESOURCE";
pub const SECTION_SECTORS: &str = "SECTORS";
pub const SECTION_AICLASS: &str = "AICLASS";
pub const SECTION_MODELS: &str = "MODELS";
pub const SECTION_SPRITES: &str = "SPRITES";
pub const SECTION_KEYFRAMES: &str = "KEYFRAMES";
pub const SECTION_ANIMCLASS: &str = "ANIMCLASS";
pub const SECTION_SOUNDCLASS: &str = "SOUNDCLASS";
pub const SECTION_COGSCRIPTS: &str = "COGSCRIPTS";
pub const SECTION_COGS: &str = "COGS";
pub const SECTION_TEMPLATES: &str = "TEMPLATES";
pub const SECTION_THINGS: &str = "THINGS";
pub const SECTION_PVS: &str = "PVS";

/// A cog instance in name/value form; binding against script symbols
/// happens outside the text codec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NdyCog {
    pub script: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NdyFog {
    pub enabled: bool,
    pub color: crate::LinearColor,
    pub start_depth: f32,
    pub end_depth: f32,
}

/// A level in its textual form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NdyWorld {
    pub gravity: f32,
    pub ceiling_sky_z: f32,
    pub horizon_distance: f32,
    pub horizon_sky_offset: crate::Vector2,
    pub ceiling_sky_offset: crate::Vector2,
    pub lod_distances: [f32; 4],
    pub fog: NdyFog,

    pub sounds: Vec<String>,
    pub materials: Vec<String>,
    pub georesource: Georesource,
    pub sectors: Vec<Sector>,
    pub ai_classes: Vec<String>,
    pub models: Vec<String>,
    pub sprites: Vec<String>,
    pub keyframes: Vec<String>,
    pub anim_classes: Vec<String>,
    pub sound_classes: Vec<String>,
    pub cog_scripts: Vec<String>,
    pub cogs: Vec<NdyCog>,
    pub templates: ThingTable,
    pub things: Vec<Thing>,
    pub pvs: Vec<u8>,
}

impl NdyWorld {
    pub fn write<W: Write>(&self, out: W) -> Result<W> {
        let mut writer = TextWriter::new(out);
        writer::write_world(&mut writer, self)?;
        Ok(writer.into_inner())
    }

    pub fn read<R: BufRead>(input: R) -> Result<NdyWorld> {
        let mut reader = TextReader::new(input);
        reader::read_world(&mut reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{LinearColor, Vector3};
    use crate::thing::{
        ActorFlags, ActorInfo, AiControlInfo, ControlInfo, ControlType, MoveInfo, MoveType,
        ParticleFlags, ParticleInfo, PhysicsFlags, PhysicsInfo, RenderType, Thing, ThingInfo,
        ThingType,
    };
    use crate::world::{AdjoinFlags, Surface, SurfaceAdjoin, SurfaceVertex};

    fn sample_world() -> NdyWorld {
        let mut templates = ThingTable::new();
        templates.insert(Thing {
            name: "walkplayer".to_owned(),
            kind: ThingType::Player,
            control_type: ControlType::Player,
            move_type: MoveType::Physics,
            move_info: MoveInfo::Physics(PhysicsInfo {
                flags: PhysicsFlags::HAS_GRAVITY,
                mass: 150.0,
                static_drag: 0.5,
                ..Default::default()
            }),
            render_type: RenderType::Model,
            render_file: "ky.3do".to_owned(),
            create_thing_template: "+ghostsplash".to_owned(),
            perf_level: 2,
            thing_info: ThingInfo::Actor(Box::new(ActorInfo {
                flags: ActorFlags::CAN_ROTATE_HEAD,
                health: 100.0,
                max_health: 100.0,
                ..Default::default()
            })),
            ..Default::default()
        });
        templates.insert(Thing {
            name: "smokecloud".to_owned(),
            kind: ThingType::Particle,
            control_type: ControlType::Particle,
            render_type: RenderType::Particle,
            render_file: "smoke.par".to_owned(),
            thing_info: ThingInfo::Particle(ParticleInfo {
                flags: ParticleFlags::FADES_OUT,
                growth_speed: 2.0,
                min_radius: 0.125,
                max_radius: 0.5,
                size: 0.25,
                timeout_rate: 1.5,
                count: 16,
                material: "smoke.mat".to_owned(),
                ..Default::default()
            }),
            ..Default::default()
        });

        NdyWorld {
            gravity: 4.0,
            ceiling_sky_z: 20.0,
            horizon_distance: 200.0,
            lod_distances: [0.3, 0.6, 0.9, 1.2],
            sounds: vec!["bells.wav".to_owned()],
            materials: vec!["gen_vines.mat".to_owned(), "gen_rock.mat".to_owned()],
            georesource: Georesource {
                vertices: vec![Vector3 {
                    x: 1.0,
                    y: 2.0,
                    z: -0.5,
                }],
                tex_vertices: vec![],
                adjoins: vec![SurfaceAdjoin {
                    flags: AdjoinFlags::VISIBLE,
                    mirror: None,
                    distance: 0.125,
                }],
                surfaces: vec![Surface {
                    material: Some(0),
                    extra_light: LinearColor::default(),
                    vertices: vec![SurfaceVertex {
                        vertex: 0,
                        uv: None,
                        color: LinearColor::default(),
                    }],
                    ..Default::default()
                }],
            },
            cogs: vec![NdyCog {
                script: "door.cog".to_owned(),
                values: vec!["12".to_owned(), "0.5".to_owned()],
            }],
            templates,
            things: vec![Thing {
                base_name: "walkplayer".to_owned(),
                name: "player".to_owned(),
                kind: ThingType::Player,
                control_type: ControlType::Ai,
                control_info: ControlInfo::Ai(AiControlInfo {
                    ai_file: "guard.ai".to_owned(),
                    path_frames: vec![Vector3 {
                        x: 0.0,
                        y: 1.0,
                        z: 2.0,
                    }],
                }),
                move_type: MoveType::Physics,
                move_info: MoveInfo::Physics(PhysicsInfo::default()),
                thing_info: ThingInfo::Actor(Default::default()),
                ..Default::default()
            }],
            pvs: vec![0xde, 0xad, 0xbe, 0xef],
            ..Default::default()
        }
    }

    #[test]
    fn world_text_round_trip() {
        let world = sample_world();
        let bytes = world.write(Vec::new()).unwrap();
        let parsed = NdyWorld::read(bytes.as_slice()).unwrap();
        assert_eq!(parsed, world);
    }

    /// The thing parameter vocabulary is fixed by the game's own level
    /// files: render files go under model3d/sprite/particle, every info
    /// variant shares typeflags, and several particle fields persist under
    /// names that differ from the field.
    #[test]
    fn thing_lines_use_the_stock_parameter_vocabulary() {
        let world = sample_world();
        let text = String::from_utf8(world.write(Vec::new()).unwrap()).unwrap();

        assert!(text.contains("model3d=ky.3do"));
        assert!(text.contains("particle=smoke.par"));
        assert!(text.contains("typeflags=0x1")); // actor flags
        assert!(text.contains("typeflags=0x8")); // particle flags
        assert!(text.contains("staticdrag=0.500000"));
        assert!(text.contains("creatething=+ghostsplash"));
        assert!(text.contains("perflevel=2"));

        // ParticleInfo field names diverge from their keys.
        assert!(text.contains("range=0.500000"));
        assert!(text.contains("minsize=0.125000"));
        assert!(text.contains("rate=1.500000"));
        assert!(text.contains("maxthrust=2.000000"));
        assert!(text.contains("elementsize=0.250000"));

        assert!(!text.contains("rdtype="));
        assert!(!text.contains("rdfile="));
    }
}
