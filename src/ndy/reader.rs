//! NDY parsing. Produces the same logical model the binary codec does,
//! with asset-backed sections as file name lists.

use super::text::TextReader;
use super::{NdyCog, NdyFog, NdyWorld};
use crate::cnd::raw::COPYRIGHT;
use crate::shared::{idx_from_raw, Box3, ColorRgb, GradientColor, Vector2, Vector3};
use crate::thing::{
    ActorInfo, AiControlInfo, ControlInfo, ControlType, ExplosionInfo, HintUserVal, ItemInfo,
    MoveInfo, MoveType, ParticleInfo, PathFrame, PathInfo, PhysicsFlags, PhysicsInfo, RenderType,
    Thing, ThingFlags, ThingInfo, ThingTable, ThingType, WeaponInfo,
};
use crate::world::{
    AdjoinFlags, AmbientSound, FaceFlags, Georesource, Sector, SectorFlags, Surface,
    SurfaceAdjoin, SurfaceFlags, SurfaceVertex,
};
use crate::{CndError, Result};
use std::io::BufRead;

fn error(message: impl Into<String>) -> CndError {
    CndError::Format {
        function: "ndy::read_world",
        message: message.into(),
    }
}

pub fn read_world<R: BufRead>(reader: &mut TextReader<R>) -> Result<NdyWorld> {
    read_copyright(reader)?;

    let mut world = NdyWorld::default();
    read_header(reader, &mut world)?;
    world.sounds = read_resource_section(reader, super::SECTION_SOUNDS, "World sounds")?;
    world.materials = read_resource_section(reader, super::SECTION_MATERIALS, "World materials")?;
    world.georesource = read_georesource(reader)?;
    world.sectors = read_sectors(reader)?;
    world.ai_classes = read_resource_section(reader, super::SECTION_AICLASS, "World AIClasses")?;
    world.models = read_resource_section(reader, super::SECTION_MODELS, "World models")?;
    world.sprites = read_resource_section(reader, super::SECTION_SPRITES, "World sprites")?;
    world.keyframes = read_resource_section(reader, super::SECTION_KEYFRAMES, "World keyframes")?;
    world.anim_classes = read_resource_section(reader, super::SECTION_ANIMCLASS, "World puppets")?;
    world.sound_classes =
        read_resource_section(reader, super::SECTION_SOUNDCLASS, "World soundclasses")?;
    world.cog_scripts = read_resource_section(reader, super::SECTION_COGSCRIPTS, "World scripts")?;
    world.cogs = read_cogs(reader)?;
    world.templates = read_templates(reader)?;
    world.things = read_things(reader)?;
    world.pvs = read_pvs(reader)?;

    Ok(world)
}

fn read_copyright<R: BufRead>(reader: &mut TextReader<R>) -> Result<()> {
    reader.expect_section(super::SECTION_COPYRIGHT)?;
    let mut copyright = Vec::with_capacity(COPYRIGHT.len());
    while copyright.len() < COPYRIGHT.len() {
        let line = reader.raw_line()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        copyright.extend_from_slice(line.as_bytes());
    }
    if copyright != COPYRIGHT {
        return Err(error("bad copyright block"));
    }
    Ok(())
}

fn read_header<R: BufRead>(reader: &mut TextReader<R>, world: &mut NdyWorld) -> Result<()> {
    reader.expect_section(super::SECTION_HEADER)?;
    let version: u32 = reader.key_value("Version")?;
    if version != crate::cnd::FILE_VERSION {
        return Err(error(format!("wrong file version: {version}")));
    }
    world.gravity = reader.key_value("World Gravity")?;
    world.ceiling_sky_z = reader.key_value("Ceiling Sky Z")?;
    world.horizon_distance = reader.key_value("Horizon Distance")?;
    let _: f32 = reader.key_value("Horizon Pixels per Rev")?;
    reader.expect_key("Horizon Sky Offset")?;
    world.horizon_sky_offset = reader.vec2()?;
    reader.expect_key("Ceiling Sky Offset")?;
    world.ceiling_sky_offset = reader.vec2()?;
    reader.expect_key("LOD Distances")?;
    for distance in world.lod_distances.iter_mut() {
        *distance = reader.value()?;
    }
    reader.expect_key("Fog")?;
    world.fog = NdyFog {
        enabled: reader.value::<i32>()? != 0,
        color: reader.color()?,
        start_depth: reader.value()?,
        end_depth: reader.value()?,
    };
    Ok(())
}

fn read_resource_section<R: BufRead>(
    reader: &mut TextReader<R>,
    section: &str,
    label: &str,
) -> Result<Vec<String>> {
    reader.expect_section(section)?;
    let count: usize = reader.key_value(label)?;
    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        let _index = reader.next_token()?;
        names.push(reader.next_token()?);
    }
    Ok(names)
}

fn read_georesource<R: BufRead>(reader: &mut TextReader<R>) -> Result<Georesource> {
    reader.expect_section(super::SECTION_GEORESOURCE)?;
    let mut geores = Georesource::default();

    let count: usize = reader.key_value("World vertices")?;
    for _ in 0..count {
        let _index = reader.next_token()?;
        geores.vertices.push(Vector3 {
            x: reader.value()?,
            y: reader.value()?,
            z: reader.value()?,
        });
    }

    let count: usize = reader.key_value("World texture vertices")?;
    for _ in 0..count {
        let _index = reader.next_token()?;
        geores.tex_vertices.push(Vector2 {
            x: reader.value()?,
            y: reader.value()?,
        });
    }

    let count: usize = reader.key_value("World adjoins")?;
    for _ in 0..count {
        let _index = reader.next_token()?;
        geores.adjoins.push(SurfaceAdjoin {
            flags: AdjoinFlags::from_bits_retain(reader.flags()?),
            mirror: idx_from_raw(reader.value()?),
            distance: reader.value()?,
        });
    }

    let count: usize = reader.key_value("World surfaces")?;
    for _ in 0..count {
        let _index = reader.next_token()?;
        let material = idx_from_raw(reader.value()?);
        let surf_flags = SurfaceFlags::from_bits_retain(reader.flags()?);
        let face_flags = FaceFlags::from_bits_retain(reader.flags()?);
        let geo_mode = reader
            .value::<u32>()?
            .try_into()
            .map_err(|_| error("unknown geometry mode"))?;
        let light_mode = reader
            .value::<u32>()?
            .try_into()
            .map_err(|_| error("unknown light mode"))?;
        let adjoin = idx_from_raw(reader.value()?);
        let extra_light = reader.color()?;
        let num_verts: usize = reader.value()?;

        let mut vertices = vec![SurfaceVertex::default(); num_verts];
        for vert in vertices.iter_mut() {
            let pair = reader.next_token()?;
            let (vertex, uv) = pair
                .split_once(',')
                .ok_or_else(|| error(format!("bad surface vertex '{pair}'")))?;
            vert.vertex = vertex
                .parse()
                .map_err(|_| error(format!("bad vertex index '{vertex}'")))?;
            vert.uv = idx_from_raw(
                uv.parse()
                    .map_err(|_| error(format!("bad uv index '{uv}'")))?,
            );
        }
        for vert in vertices.iter_mut() {
            vert.color = reader.color()?;
        }

        geores.surfaces.push(Surface {
            material,
            surf_flags,
            face_flags,
            geo_mode,
            light_mode,
            adjoin,
            extra_light,
            normal: reader.vec3()?,
            vertices,
        });
    }

    Ok(geores)
}

fn read_sectors<R: BufRead>(reader: &mut TextReader<R>) -> Result<Vec<Sector>> {
    reader.expect_section(super::SECTION_SECTORS)?;
    let count: usize = reader.key_value("World sectors")?;
    let mut sectors = Vec::with_capacity(count);
    for _ in 0..count {
        reader.expect_key("SECTOR")?;
        let _index: usize = reader.value()?;

        reader.expect_key("FLAGS")?;
        let flags = SectorFlags::from_bits_retain(reader.flags()?);
        reader.expect_key("AMBIENT LIGHT")?;
        let ambient_light = reader.color()?;
        reader.expect_key("EXTRA LIGHT")?;
        let extra_light = reader.color()?;
        reader.expect_key("TINT")?;
        let tint = reader.vec3().map(|v| ColorRgb {
            r: v.x,
            g: v.y,
            b: v.z,
        })?;
        reader.expect_key("AVERAGE LIGHT POS")?;
        let avg_light_pos = reader.vec3()?;
        reader.expect_key("AVERAGE LIGHT INT")?;
        let avg_light_int = reader.color()?;
        reader.expect_key("AVERAGE LIGHT FALLOFF")?;
        let avg_light_falloff = reader.vec2()?;
        reader.expect_key("BOUNDBOX")?;
        let bound_box = Box3 {
            min: reader.vec3()?,
            max: reader.vec3()?,
        };
        reader.expect_key("COLLIDEBOX")?;
        let collide_box = Box3 {
            min: reader.vec3()?,
            max: reader.vec3()?,
        };

        let ambient_sound = if reader.peek_token()? == Some("SOUND") {
            reader.expect("SOUND")?;
            Some(AmbientSound {
                sound: reader.next_token()?,
                volume: reader.value()?,
            })
        } else {
            None
        };

        reader.expect_key("CENTER")?;
        let center = reader.vec3()?;
        reader.expect_key("RADIUS")?;
        let radius = reader.value()?;
        reader.expect_key("VERTICES")?;
        let num_vertices: usize = reader.value()?;
        let mut vertex_indices = Vec::with_capacity(num_vertices);
        for _ in 0..num_vertices {
            let _index = reader.next_token()?;
            vertex_indices.push(reader.value()?);
        }
        reader.expect_key("SURFACES")?;
        let first_surface = reader.value()?;
        let surface_count = reader.value()?;
        reader.expect_key("PVS")?;
        let pvs_idx = idx_from_raw(reader.value()?);
        reader.expect_key("THRUST")?;
        let thrust = reader.vec3()?;

        sectors.push(Sector {
            flags,
            ambient_light,
            extra_light,
            tint,
            avg_light_pos,
            avg_light_int,
            avg_light_falloff,
            collide_box,
            bound_box,
            ambient_sound,
            center,
            radius,
            first_surface,
            surface_count,
            vertex_indices,
            pvs_idx,
            thrust,
        });
    }
    Ok(sectors)
}

fn read_cogs<R: BufRead>(reader: &mut TextReader<R>) -> Result<Vec<NdyCog>> {
    reader.expect_section(super::SECTION_COGS)?;
    let count: usize = reader.key_value("World cogs")?;
    let mut cogs = Vec::with_capacity(count);
    for _ in 0..count {
        let _index = reader.next_token()?;
        let script = reader.next_token()?;
        let num_values: usize = reader.value()?;
        let values = (0..num_values)
            .map(|_| reader.next_token())
            .collect::<Result<Vec<_>>>()?;
        cogs.push(NdyCog { script, values });
    }
    Ok(cogs)
}

fn read_templates<R: BufRead>(reader: &mut TextReader<R>) -> Result<ThingTable> {
    reader.expect_section(super::SECTION_TEMPLATES)?;
    let count: usize = reader.key_value("World templates")?;
    let mut templates = ThingTable::new();
    for _ in 0..count {
        let thing = parse_thing_line(reader.line_tokens()?)?;
        let name = thing.name.clone();
        if !templates.insert(thing) {
            return Err(CndError::logic(
                "ndy::read_templates",
                format!("found duplicated template '{name}'"),
            ));
        }
    }
    Ok(templates)
}

fn read_things<R: BufRead>(reader: &mut TextReader<R>) -> Result<Vec<Thing>> {
    reader.expect_section(super::SECTION_THINGS)?;
    let count: usize = reader.key_value("World things")?;
    (0..count)
        .map(|_| parse_thing_line(reader.line_tokens()?))
        .collect()
}

fn read_pvs<R: BufRead>(reader: &mut TextReader<R>) -> Result<Vec<u8>> {
    reader.expect_section(super::SECTION_PVS)?;
    reader.expect_key("PVS size:")?;
    let size: usize = reader.value()?;
    let mut pvs = Vec::with_capacity(size);
    while pvs.len() < size {
        let run = reader.next_token()?;
        if run.len() % 2 != 0 {
            return Err(error("odd length hex run in PVS block"));
        }
        for pair in run.as_bytes().chunks(2) {
            let pair = std::str::from_utf8(pair).expect("hex run is ascii");
            pvs.push(
                u8::from_str_radix(pair, 16).map_err(|_| error("bad hex byte in PVS block"))?,
            );
        }
    }
    if pvs.len() != size {
        return Err(error("PVS block does not match its size"));
    }
    Ok(pvs)
}

fn parse_f32(value: &str) -> Result<f32> {
    value
        .parse()
        .map_err(|_| error(format!("can't parse number '{value}'")))
}

fn parse_i32(value: &str) -> Result<i32> {
    value
        .parse()
        .map_err(|_| error(format!("can't parse number '{value}'")))
}

fn parse_hex(value: &str) -> Result<u32> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| error(format!("expected hex value, found '{value}'")))?;
    u32::from_str_radix(digits, 16).map_err(|_| error(format!("can't parse hex '{value}'")))
}

fn parse_tuple<const N: usize>(value: &str) -> Result<[f32; N]> {
    let inner = value
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .ok_or_else(|| error(format!("expected tuple, found '{value}'")))?;
    let mut out = [0f32; N];
    let mut parts = inner.split('/');
    for slot in out.iter_mut() {
        *slot = parse_f32(
            parts
                .next()
                .ok_or_else(|| error(format!("tuple '{value}' is too short")))?,
        )?;
    }
    Ok(out)
}

fn parse_vec3(value: &str) -> Result<Vector3> {
    let [x, y, z] = parse_tuple::<3>(value)?;
    Ok(Vector3 { x, y, z })
}

fn parse_color(value: &str) -> Result<crate::LinearColor> {
    let [r, g, b, a] = parse_tuple::<4>(value)?;
    Ok(crate::LinearColor { r, g, b, a })
}

fn thing_type_from_name(name: &str) -> Result<ThingType> {
    Ok(match name {
        "free" => ThingType::Free,
        "camera" => ThingType::Camera,
        "actor" => ThingType::Actor,
        "weapon" => ThingType::Weapon,
        "debris" => ThingType::Debris,
        "item" => ThingType::Item,
        "explosion" => ThingType::Explosion,
        "cog" => ThingType::Cog,
        "ghost" => ThingType::Ghost,
        "corpse" => ThingType::Corpse,
        "player" => ThingType::Player,
        "particle" => ThingType::Particle,
        "hint" => ThingType::Hint,
        "sprite" => ThingType::Sprite,
        "polyline" => ThingType::Polyline,
        _ => return Err(error(format!("unknown thing type '{name}'"))),
    })
}

/// Applies one `key=value` record to a default [`Thing`]. Info payloads are
/// materialized as soon as the selecting tag is seen, so later parameters
/// always have an arm to land in.
fn parse_thing_line(tokens: Vec<String>) -> Result<Thing> {
    let mut thing = Thing::default();

    for token in &tokens {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| error(format!("expected key=value parameter, found '{token}'")))?;

        match key {
            "name" => thing.name = value.to_owned(),
            "base" => thing.base_name = value.to_owned(),
            "type" => {
                thing.kind = thing_type_from_name(value)?;
                thing.thing_info = default_info_for(thing.kind);
            }
            "thingflags" => thing.flags = ThingFlags::from_bits_retain(parse_hex(value)?),
            "pos" => thing.pos = parse_vec3(value)?,
            "orient" => {
                let [pitch, yaw, roll] = parse_tuple::<3>(value)?;
                thing.pyr_orient = crate::Rotator { pitch, yaw, roll };
            }
            "unknown" => thing.unknown = parse_i32(value)?,
            "sector" => thing.sector = parse_i32(value)?,
            "light" => thing.light.color = parse_color(value)?,
            "emitlight" => thing.light.emit_color = parse_color(value)?,
            "msecs" => thing.ms_life_left = parse_i32(value)?,
            "model3d" => {
                thing.render_type = RenderType::Model;
                thing.render_file = value.to_owned();
            }
            "sprite" => {
                thing.render_type = RenderType::Sprite;
                thing.render_file = value.to_owned();
            }
            "particle" => {
                thing.render_type = RenderType::Particle;
                thing.render_file = value.to_owned();
            }
            "puppet" => thing.puppet_file = value.to_owned(),
            "soundclass" => thing.sound_class_file = value.to_owned(),
            "creatething" => thing.create_thing_template = value.to_owned(),
            "cog" => thing.cog_script_file = value.to_owned(),
            "collide" => {
                thing.collide.kind = (parse_i32(value)? as u32)
                    .try_into()
                    .map_err(|_| error("unknown collide type"))?;
            }
            "movesize" => thing.collide.move_size = parse_f32(value)?,
            "size" => thing.collide.size = parse_f32(value)?,
            "width" => thing.collide.width = parse_f32(value)?,
            "height" => thing.collide.height = parse_f32(value)?,
            "centerx" => thing.collide.center_x = parse_f32(value)?,
            "centery" => thing.collide.center_y = parse_f32(value)?,
            "perflevel" => thing.perf_level = parse_i32(value)?,

            "move" => match value {
                "physics" => {
                    thing.move_type = MoveType::Physics;
                    thing.move_info = MoveInfo::Physics(PhysicsInfo::default());
                }
                "path" => {
                    thing.move_type = MoveType::Path;
                }
                _ => return Err(error(format!("unknown move type '{value}'"))),
            },
            "numframes" => {
                if parse_i32(value)? > 0 {
                    thing.move_info = MoveInfo::Path(PathInfo::default());
                }
            }
            "frame" => {
                let (pos, rot) = value
                    .split_once(")(")
                    .ok_or_else(|| error(format!("bad path frame '{value}'")))?;
                let frame = PathFrame {
                    pos: parse_vec3(&format!("{pos})"))?,
                    rot: parse_tuple::<3>(&format!("({rot}")).map(|[pitch, yaw, roll]| {
                        crate::Rotator { pitch, yaw, roll }
                    })?,
                };
                match &mut thing.move_info {
                    MoveInfo::Path(info) => info.path_frames.push(frame),
                    _ => return Err(error("path frame outside a path record")),
                }
            }

            "control" => match value {
                "player" => thing.control_type = ControlType::Player,
                "ai" => {
                    thing.control_type = ControlType::Ai;
                    thing.control_info = ControlInfo::Ai(AiControlInfo::default());
                }
                "explosion" => thing.control_type = ControlType::Explosion,
                "particle" => thing.control_type = ControlType::Particle,
                _ => return Err(error(format!("unknown control type '{value}'"))),
            },
            "aiclass" => match &mut thing.control_info {
                ControlInfo::Ai(info) => info.ai_file = value.to_owned(),
                _ => return Err(error("aiclass outside an ai record")),
            },
            "aiframe" => match &mut thing.control_info {
                ControlInfo::Ai(info) => info.path_frames.push(parse_vec3(value)?),
                _ => return Err(error("aiframe outside an ai record")),
            },

            _ => apply_info_param(&mut thing, key, value)?,
        }
    }

    Ok(thing)
}

fn default_info_for(kind: ThingType) -> ThingInfo {
    match kind {
        ThingType::Actor | ThingType::Player => ThingInfo::Actor(Box::default()),
        ThingType::Weapon => ThingInfo::Weapon(WeaponInfo::default()),
        ThingType::Explosion => ThingInfo::Explosion(Box::default()),
        ThingType::Item => ThingInfo::Item(ItemInfo::default()),
        ThingType::Hint => ThingInfo::Hint(HintUserVal::default()),
        ThingType::Particle => ThingInfo::Particle(ParticleInfo::default()),
        _ => ThingInfo::None,
    }
}

fn apply_info_param(thing: &mut Thing, key: &str, value: &str) -> Result<()> {
    match &mut thing.thing_info {
        ThingInfo::Actor(info) => apply_actor_param(info, &mut thing.move_info, key, value),
        ThingInfo::Weapon(info) => apply_weapon_param(info, &mut thing.move_info, key, value),
        ThingInfo::Explosion(info) => apply_explosion_param(info, &mut thing.move_info, key, value),
        ThingInfo::Item(info) => match key {
            "typeflags" => {
                info.flags = crate::thing::ItemFlags::from_bits_retain(parse_hex(value)?);
                Ok(())
            }
            "respawn" => {
                info.sec_respawn_interval = parse_f32(value)?;
                Ok(())
            }
            _ => apply_physics_param(&mut thing.move_info, key, value),
        },
        ThingInfo::Hint(user_val) => match key {
            "userval" => {
                user_val.0 = f32::from_bits(parse_hex(value)?);
                Ok(())
            }
            _ => apply_physics_param(&mut thing.move_info, key, value),
        },
        ThingInfo::Particle(info) => apply_particle_param(info, &mut thing.move_info, key, value),
        ThingInfo::None => apply_physics_param(&mut thing.move_info, key, value),
    }
}

fn apply_physics_param(move_info: &mut MoveInfo, key: &str, value: &str) -> Result<()> {
    let MoveInfo::Physics(info) = move_info else {
        return Err(error(format!("unknown thing parameter '{key}'")));
    };
    match key {
        "physflags" => info.flags = PhysicsFlags::from_bits_retain(parse_hex(value)?),
        "mass" => info.mass = parse_f32(value)?,
        "physheight" => info.height = parse_f32(value)?,
        "airdrag" => info.air_drag = parse_f32(value)?,
        "surfdrag" => info.surface_drag = parse_f32(value)?,
        "staticdrag" => info.static_drag = parse_f32(value)?,
        "angvel" => info.angular_velocity = parse_vec3(value)?,
        "vel" => info.velocity = parse_vec3(value)?,
        "maxrotvel" => info.max_rotation_velocity = parse_f32(value)?,
        "maxvel" => info.max_velocity = parse_f32(value)?,
        "orientspeed" => info.orient_speed = parse_f32(value)?,
        "buoyancy" => info.buoyancy = parse_f32(value)?,
        _ => return Err(error(format!("unknown thing parameter '{key}'"))),
    }
    Ok(())
}

fn apply_actor_param(
    info: &mut ActorInfo,
    move_info: &mut MoveInfo,
    key: &str,
    value: &str,
) -> Result<()> {
    match key {
        "typeflags" => {
            info.flags = crate::thing::ActorFlags::from_bits_retain(parse_hex(value)?)
        }
        "weapon" => info.weapon_template = value.to_owned(),
        "health" => info.health = parse_f32(value)?,
        "maxhealth" => info.max_health = parse_f32(value)?,
        "maxthrust" => info.max_thrust = parse_f32(value)?,
        "maxrotthrust" => info.max_rot_thrust = parse_f32(value)?,
        "maxheadvel" => info.max_head_velocity = parse_f32(value)?,
        "maxheadyaw" => info.max_head_yaw = parse_f32(value)?,
        "jumpspeed" => info.jump_speed = parse_f32(value)?,
        "eyeoffset" => info.eye_offset = parse_vec3(value)?,
        "minheadpitch" => info.min_head_pitch = parse_f32(value)?,
        "maxheadpitch" => info.max_head_pitch = parse_f32(value)?,
        "fireoffset" => info.fire_offset = parse_vec3(value)?,
        "lightoffset" => info.light_offset = parse_vec3(value)?,
        "lightintensity" => info.light_intensity = parse_color(value)?,
        "voicecolor" => {
            let stop = parse_color(value)?;
            push_gradient_stop(&mut info.voice_color, stop)?;
        }
        "explode" => info.explode_template = value.to_owned(),
        _ => return apply_physics_param(move_info, key, value),
    }
    Ok(())
}

/// Gradient stops arrive as repeated `voicecolor` parameters; slot them into
/// the first still-default position.
fn push_gradient_stop(gradient: &mut GradientColor, stop: crate::LinearColor) -> Result<()> {
    for slot in gradient.stops.iter_mut() {
        if *slot == crate::LinearColor::default() {
            *slot = stop;
            return Ok(());
        }
    }
    Err(error("more than four voicecolor stops"))
}

fn apply_weapon_param(
    info: &mut WeaponInfo,
    move_info: &mut MoveInfo,
    key: &str,
    value: &str,
) -> Result<()> {
    match key {
        "typeflags" => {
            info.flags = crate::thing::WeaponFlags::from_bits_retain(parse_hex(value)?)
        }
        "explosion" => info.explosion_template = value.to_owned(),
        "damage" => info.damage = parse_f32(value)?,
        "mindamage" => info.min_damage = parse_f32(value)?,
        "rate" => info.rate = parse_f32(value)?,
        "damageclass" => {
            info.damage_type = crate::thing::DamageType::from_bits_retain(parse_hex(value)?)
        }
        "range" => info.range = parse_f32(value)?,
        "force" => info.force = parse_f32(value)?,
        _ => return apply_physics_param(move_info, key, value),
    }
    Ok(())
}

fn apply_explosion_param(
    info: &mut ExplosionInfo,
    move_info: &mut MoveInfo,
    key: &str,
    value: &str,
) -> Result<()> {
    match key {
        "typeflags" => {
            info.flags = crate::thing::ExplosionFlags::from_bits_retain(parse_hex(value)?)
        }
        "damage" => info.damage = parse_f32(value)?,
        "damageclass" => {
            info.damage_type = crate::thing::DamageType::from_bits_retain(parse_hex(value)?)
        }
        "range" => info.range = parse_f32(value)?,
        "force" => info.force = parse_f32(value)?,
        "blasttime" => info.ms_blast_time = parse_i32(value)?,
        "babytime" => info.ms_baby_time = parse_i32(value)?,
        "expandtime" => info.ms_expand_time = parse_i32(value)?,
        "fadetime" => info.ms_fade_time = parse_i32(value)?,
        "maxlight" => info.max_light = parse_f32(value)?,
        "debris" => info.debris_templates.push(value.to_owned()),
        "spritestart" => info.sprite_start = parse_vec3(value)?,
        "spriteend" => info.sprite_end = parse_vec3(value)?,
        "spritething" => info.sprite_template = value.to_owned(),
        _ => return apply_physics_param(move_info, key, value),
    }
    Ok(())
}

fn apply_particle_param(
    info: &mut ParticleInfo,
    move_info: &mut MoveInfo,
    key: &str,
    value: &str,
) -> Result<()> {
    match key {
        "typeflags" => {
            info.flags = crate::thing::ParticleFlags::from_bits_retain(parse_hex(value)?)
        }
        "material" => info.material = value.to_owned(),
        "range" => info.max_radius = parse_f32(value)?,
        "minsize" => info.min_radius = parse_f32(value)?,
        "rate" => info.timeout_rate = parse_f32(value)?,
        "maxthrust" => info.growth_speed = parse_f32(value)?,
        "pitchrange" => info.pitch_range = parse_f32(value)?,
        "yawrange" => info.yaw_range = parse_f32(value)?,
        "elementsize" => info.size = parse_f32(value)?,
        "count" => info.count = parse_i32(value)?,
        _ => return apply_physics_param(move_info, key, value),
    }
    Ok(())
}
