use cnd::animation::{Animation, AnimationFlags, KeyMarker, KeyMarkerKind, KeyNode, KeyNodeEntry};
use cnd::audio::wav;
use cnd::cnd::{offsets, read_header, World};
use cnd::cog::{Cog, CogScript, CogScriptTable, CogSymbol, CogSymbolType};
use cnd::material::{Material, Texture, RGB_565};
use cnd::stream::{MemoryStream, Stream};
use cnd::thing::{
    AiControlInfo, Collide, CollideType, ControlInfo, ControlType, MoveInfo, MoveType, PathFrame,
    PathInfo, PhysicsFlags, PhysicsInfo, Thing, ThingFlags, ThingType,
};
use cnd::world::{
    AdjoinFlags, AmbientSound, Georesource, Sector, SectorFlags, Surface, SurfaceAdjoin,
    SurfaceVertex,
};
use cnd::{CndError, LinearColor, Rotator, Vector2, Vector3};

fn sample_material(name: &str, seed: u8) -> Material {
    // 4x4 base level plus one 2x2 mip at 16 bpp
    let base: Vec<u8> = (0..32).map(|i| i as u8 ^ seed).collect();
    let mip: Vec<u8> = (0..8).map(|i| i as u8 ^ seed).collect();
    Material {
        name: name.to_owned(),
        width: 4,
        height: 4,
        format: RGB_565,
        cells: vec![Texture {
            mip_levels: vec![base, mip],
        }],
    }
}

fn sample_animation() -> Animation {
    Animation {
        name: "walk.key".to_owned(),
        flags: AnimationFlags::DOES_NOT_LOOP,
        kind: 0xffff,
        frames: 3,
        fps: 30.0,
        joints: 2,
        markers: vec![KeyMarker {
            frame: 1.0,
            kind: KeyMarkerKind::LeftFootstep,
        }],
        nodes: vec![
            KeyNode {
                mesh_name: "torso".to_owned(),
                node: 0,
                entries: vec![KeyNodeEntry {
                    frame: 0,
                    flags: 0x3,
                    pos: Vector3 {
                        x: 0.5,
                        y: 1.0,
                        z: -0.25,
                    },
                    ..Default::default()
                }],
            },
            // A node with zero entries is legal and must round trip.
            KeyNode {
                mesh_name: "head".to_owned(),
                node: 1,
                entries: Vec::new(),
            },
        ],
    }
}

fn ai_actor_template() -> Thing {
    Thing {
        name: "guard".to_owned(),
        kind: ThingType::Actor,
        flags: ThingFlags::EMITS_LIGHT,
        move_type: MoveType::Physics,
        move_info: MoveInfo::Physics(PhysicsInfo {
            flags: PhysicsFlags::HAS_GRAVITY,
            mass: 150.0,
            height: 0.18,
            ..Default::default()
        }),
        control_type: ControlType::Ai,
        control_info: ControlInfo::Ai(AiControlInfo {
            ai_file: "guard.ai".to_owned(),
            path_frames: vec![
                Vector3 {
                    x: 1.0,
                    y: 0.0,
                    z: 0.0,
                },
                Vector3 {
                    x: 1.0,
                    y: 2.0,
                    z: 0.0,
                },
                Vector3 {
                    x: 0.0,
                    y: 2.0,
                    z: 0.5,
                },
            ],
        }),
        thing_info: cnd::thing::ThingInfo::Actor(Default::default()),
        collide: Collide {
            kind: CollideType::Sphere,
            size: 0.065,
            move_size: 0.065,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn sample_world() -> (World, CogScriptTable) {
    let mut scripts = CogScriptTable::new();
    let mut door = CogScript::new("door.cog");
    door.symbols.push(CogSymbol::new("door", CogSymbolType::Thing));
    door.symbols
        .push(CogSymbol::new("startup", CogSymbolType::Message));
    door.symbols.push(CogSymbol::new("speed", CogSymbolType::Flex));
    let door = scripts.insert(door);

    let mut world = World {
        file_path: "ndy\\test.ndy".to_owned(),
        gravity: 4.0,
        ..Default::default()
    };

    // One uncompressed sound loaded from an in-memory WAV file.
    let mut wav_stream = Stream::memory("bells.wav");
    wav::write_wav(&mut wav_stream, 1, 22050, 16, &[1, 2, 3, 4]).unwrap();
    wav_stream.seek(0).unwrap();
    world
        .sound_bank
        .load_sound(&mut wav_stream, "bells.wav", 0)
        .unwrap();

    world.materials = vec![
        sample_material("aaa.mat", 0x00),
        sample_material("bbb.mat", 0x5a),
        sample_material("ccc.mat", 0xa5),
    ];

    world.georesource = Georesource {
        vertices: vec![
            Vector3 {
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
            Vector3 {
                x: 1.0,
                y: 0.0,
                z: 0.0,
            },
            Vector3 {
                x: 1.0,
                y: 1.0,
                z: 0.0,
            },
        ],
        tex_vertices: vec![Vector2 { x: 0.5, y: 0.5 }],
        adjoins: vec![
            SurfaceAdjoin {
                flags: AdjoinFlags::VISIBLE,
                mirror: Some(1),
                distance: 0.25,
            },
            SurfaceAdjoin {
                flags: AdjoinFlags::VISIBLE | AdjoinFlags::ALLOW_MOVEMENT,
                mirror: Some(0),
                distance: 0.25,
            },
            SurfaceAdjoin {
                flags: AdjoinFlags::empty(),
                mirror: None, // stored as the -1 sentinel
                distance: 1.5,
            },
        ],
        surfaces: vec![Surface {
            material: Some(1),
            adjoin: Some(2),
            normal: Vector3 {
                x: 0.0,
                y: 0.0,
                z: 1.0,
            },
            vertices: vec![
                SurfaceVertex {
                    vertex: 0,
                    uv: Some(0),
                    color: LinearColor {
                        r: 1.0,
                        g: 1.0,
                        b: 1.0,
                        a: 1.0,
                    },
                },
                SurfaceVertex {
                    vertex: 1,
                    uv: None,
                    color: LinearColor::default(),
                },
                SurfaceVertex {
                    vertex: 2,
                    uv: None,
                    color: LinearColor::default(),
                },
            ],
            ..Default::default()
        }],
    };

    world.sectors = vec![Sector {
        flags: SectorFlags::COG_LINKED,
        ambient_sound: Some(AmbientSound {
            sound: "wind.wav".to_owned(),
            volume: 0.6,
        }),
        radius: 10.0,
        surface_count: 1,
        vertex_indices: vec![0, 1, 2],
        pvs_idx: Some(0),
        thrust: Vector3::default(),
        ..Default::default()
    }];

    world.ai_classes = vec!["guard.ai".to_owned()];
    world.models = vec!["gen_indy.3do".to_owned(), "gen_door.3do".to_owned()];
    world.sprites = Vec::new();
    world.keyframes = vec![sample_animation()];
    world.anim_classes = vec!["indy.pup".to_owned()];
    world.sound_classes = vec!["indy.snd".to_owned()];
    world.cog_script_names = vec!["door.cog".to_owned()];

    let vtid = door.borrow_mut().next_vtable_id();
    for symbol in door.borrow_mut().symbols.iter_mut() {
        if symbol.takes_value() {
            symbol.vtable.insert(vtid, "42".to_owned());
        }
    }
    world.cogs = vec![Cog {
        id: 0,
        script: door.clone(),
        flags: Default::default(),
        vtid,
    }];

    world.templates.insert(ai_actor_template());

    let mut instance = ai_actor_template();
    instance.base_name = "guard".to_owned();
    instance.name = "guard_1".to_owned();
    instance.pos = Vector3 {
        x: 0.5,
        y: 0.5,
        z: 0.0,
    };
    instance.pyr_orient = Rotator {
        pitch: 0.0,
        yaw: 90.0,
        roll: 0.0,
    };
    world.things = vec![instance];

    // A path mover with its tag set but no recorded frames.
    let mut mover = Thing {
        name: "lift".to_owned(),
        kind: ThingType::Cog,
        move_type: MoveType::Path,
        move_info: MoveInfo::None,
        ..Default::default()
    };
    world.templates.insert(mover.clone());
    mover.base_name = "lift".to_owned();
    mover.name = "lift_1".to_owned();
    mover.move_info = MoveInfo::Path(PathInfo {
        path_frames: vec![PathFrame {
            pos: Vector3 {
                x: 0.0,
                y: 0.0,
                z: 2.0,
            },
            rot: Rotator::default(),
        }],
    });
    world.things.push(mover);

    world.pvs = vec![0x12, 0x34, 0x56];
    world.last_thing_idx = world.things.len() as u32;

    (world, scripts)
}

fn serialize(world: &World) -> Vec<u8> {
    let mut stream = Stream::memory("container");
    world.write(&mut stream).unwrap();
    stream.into_bytes()
}

#[test]
fn empty_container_round_trips_bit_exactly() {
    let world = World::default();
    let bytes = serialize(&world);

    let scripts = CogScriptTable::new();
    let mut stream = Stream::from_bytes("container", bytes.clone());
    let parsed = World::read(&mut stream, &scripts).unwrap();

    assert!(parsed.materials.is_empty());
    assert!(parsed.sectors.is_empty());
    assert!(parsed.things.is_empty());
    assert!(parsed.templates.is_empty());
    assert!(parsed.pvs.is_empty());
    assert_eq!(parsed.sound_bank.track(0).unwrap().len(), 0);

    assert_eq!(serialize(&parsed), bytes);
}

#[test]
fn full_container_round_trips_bit_exactly() {
    let (world, scripts) = sample_world();
    let bytes = serialize(&world);

    let mut stream = Stream::from_bytes("container", bytes.clone());
    let parsed = World::read(&mut stream, &scripts).unwrap();

    assert_eq!(parsed.materials, world.materials);
    assert_eq!(parsed.keyframes, world.keyframes);
    assert_eq!(parsed.georesource, world.georesource);
    assert_eq!(parsed.sectors, world.sectors);
    assert_eq!(parsed.templates, world.templates);
    assert_eq!(parsed.things, world.things);
    assert_eq!(parsed.pvs, world.pvs);
    assert_eq!(parsed.state, world.state);

    assert_eq!(serialize(&parsed), bytes);
}

#[test]
fn ai_path_frames_survive_the_side_arrays() {
    let (world, scripts) = sample_world();
    let bytes = serialize(&world);

    let mut stream = Stream::from_bytes("container", bytes);
    let parsed = World::read(&mut stream, &scripts).unwrap();

    let guard = parsed.templates.get("guard").unwrap();
    let ControlInfo::Ai(ai) = &guard.control_info else {
        panic!("guard template lost its ai control info");
    };
    assert_eq!(ai.ai_file, "guard.ai");
    assert_eq!(ai.path_frames.len(), 3);
    assert_eq!(ai.path_frames[2].z, 0.5);

    // The path mover kept its tag even though it has no physics payload.
    assert_eq!(parsed.templates.get("lift").unwrap().move_type, MoveType::Path);
    assert_eq!(parsed.templates.get("lift").unwrap().move_info, MoveInfo::None);
}

#[test]
fn wrong_version_is_a_format_error_from_read_header() {
    let world = World::default();
    let mut bytes = serialize(&world);
    // Version word sits right after the file size, watermark and path fields.
    let version_offset = 4 + 1216 + 64 + 4;
    bytes[version_offset..version_offset + 4].copy_from_slice(&2u32.to_le_bytes());

    let mut stream = Stream::from_bytes("container", bytes);
    let err = read_header(&mut stream).unwrap_err();
    assert_eq!(err.function(), Some("read_header"));
    assert!(matches!(err, CndError::Format { .. }));
}

#[test]
fn corrupt_copyright_is_rejected() {
    let world = World::default();
    let mut bytes = serialize(&world);
    bytes[100] ^= 0xff;

    let mut stream = Stream::from_bytes("container", bytes);
    assert!(read_header(&mut stream).is_err());
}

#[test]
fn offset_oracle_preserves_the_cursor() {
    let (world, _) = sample_world();
    let bytes = serialize(&world);
    let size = bytes.len() as u64;
    let mut stream: MemoryStream = Stream::from_bytes("container", bytes);
    let header = read_header(&mut stream).unwrap();

    let header_size = std::mem::size_of::<cnd::cnd::CndHeader>() as u64;
    for position in [0u64, 17, header_size, size / 2] {
        stream.seek(position).unwrap();

        let mut offsets_in_order = vec![offsets::sounds()];
        offsets_in_order.push(offsets::materials(&mut stream).unwrap());
        offsets_in_order.push(offsets::georesource(&mut stream, &header).unwrap());
        offsets_in_order.push(offsets::sectors(&mut stream, &header).unwrap());
        offsets_in_order.push(offsets::ai_classes(&mut stream, &header).unwrap());
        offsets_in_order.push(offsets::models(&mut stream, &header).unwrap());
        offsets_in_order.push(offsets::sprites(&mut stream, &header).unwrap());
        offsets_in_order.push(offsets::keyframes(&mut stream, &header).unwrap());
        offsets_in_order.push(offsets::anim_classes(&mut stream, &header).unwrap());
        offsets_in_order.push(offsets::sound_classes(&mut stream, &header).unwrap());
        offsets_in_order.push(offsets::cog_scripts(&mut stream, &header).unwrap());
        offsets_in_order.push(offsets::cogs(&mut stream, &header).unwrap());
        offsets_in_order.push(offsets::templates(&mut stream, &header).unwrap());
        offsets_in_order.push(offsets::things(&mut stream, &header).unwrap());
        offsets_in_order.push(offsets::pvs(&mut stream, &header).unwrap());

        assert_eq!(stream.tell().unwrap(), position);
        assert!(offsets_in_order.windows(2).all(|w| w[0] <= w[1]));
        assert!(offsets_in_order.iter().all(|&o| o >= header_size && o <= size));
    }
}

#[test]
fn duplicate_template_names_are_rejected() {
    let (mut world, scripts) = sample_world();
    // Force two identical headers through the codec by writing the same
    // template list twice into the things section instead.
    let mut dupe = ai_actor_template();
    dupe.base_name = "guard".to_owned();
    world.things.push(dupe.clone());
    world.things.push(dupe);
    let bytes = serialize(&world);

    // Things may repeat; only template names must be unique.
    let mut stream = Stream::from_bytes("container", bytes);
    assert!(World::read(&mut stream, &scripts).is_ok());

    let mut table = cnd::thing::ThingTable::new();
    assert!(table.insert(ai_actor_template()));
    assert!(!table.insert(ai_actor_template()));
}

#[test]
fn max_length_names_round_trip() {
    let (mut world, scripts) = sample_world();
    let longest = "m".repeat(59) + ".mat"; // 63 visible bytes
    world.materials[0].name = longest.clone();
    let bytes = serialize(&world);

    let mut stream = Stream::from_bytes("container", bytes);
    let parsed = World::read(&mut stream, &scripts).unwrap();
    assert_eq!(parsed.materials[0].name, longest);

    world.materials[0].name = "m".repeat(64);
    let mut stream = Stream::memory("container");
    assert!(world.write(&mut stream).is_err());
}
