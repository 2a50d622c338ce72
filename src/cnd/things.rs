//! Templates and Things sections.
//!
//! Each section is a run of 568 byte thing headers, a record of eleven list
//! sizes and then eleven side arrays. While parsing, one cursor per side
//! array advances according to each header's move, type and control tags;
//! every cursor must land exactly on the end of its array.

use super::offsets;
use super::raw::{
    CndHeader, RawActorInfo, RawAiControlInfo, RawCollide, RawExplosionInfo, RawItemInfo,
    RawParticleInfo, RawPhysicsInfo, RawWeaponInfo, ThingHeader, ThingListSizes,
};
use crate::shared::{decode_name, encode_name, Vector3};
use crate::stream::Stream;
use crate::thing::{
    ActorFlags, ActorInfo, AiControlInfo, Collide, ControlInfo, ControlType, DamageType,
    ExplosionFlags, ExplosionInfo, HintUserVal, ItemFlags, ItemInfo, MoveInfo, MoveType,
    ParticleFlags, ParticleInfo, PathFrame, PathInfo, PhysicsFlags, PhysicsInfo, Thing,
    ThingFlags, ThingInfo, ThingTable, ThingType, WeaponFlags, WeaponInfo,
};
use crate::{CndError, Result};
use std::io::{Read, Seek, Write};

struct SideArrays {
    physics_infos: Vec<RawPhysicsInfo>,
    num_path_frames: Vec<u32>,
    path_frames: Vec<PathFrame>,
    actor_infos: Vec<RawActorInfo>,
    weapon_infos: Vec<RawWeaponInfo>,
    explosion_infos: Vec<RawExplosionInfo>,
    item_infos: Vec<RawItemInfo>,
    hint_user_vals: Vec<f32>,
    particle_infos: Vec<RawParticleInfo>,
    ai_control_infos: Vec<RawAiControlInfo>,
    ai_path_frames: Vec<Vector3>,
}

/// Cursor positions into the side arrays during a parse.
#[derive(Default)]
struct Cursors {
    physics: usize,
    num_path_frames: usize,
    path_frames: usize,
    actor: usize,
    weapon: usize,
    explosion: usize,
    item: usize,
    hint: usize,
    particle: usize,
    ai_control: usize,
    ai_path_frames: usize,
}

fn exhausted(list: &'static str) -> CndError {
    CndError::format(
        "parse_thing_list",
        format!("side array '{list}' exhausted before all headers were processed"),
    )
}

fn take<'a, T>(items: &'a [T], cursor: &mut usize, list: &'static str) -> Result<&'a T> {
    let item = items.get(*cursor).ok_or_else(|| exhausted(list))?;
    *cursor += 1;
    Ok(item)
}

fn parse_thing_list<S: Read + Seek>(
    stream: &mut Stream<S>,
    count: u32,
    mut insert: impl FnMut(Thing) -> Result<()>,
) -> Result<()> {
    let headers: Vec<ThingHeader> = stream.read_pod_vec(count as usize)?;
    let sizes: ThingListSizes = stream.read_pod()?;

    let arrays = SideArrays {
        physics_infos: stream.read_pod_vec(sizes.physics_infos as usize)?,
        num_path_frames: stream.read_pod_vec(sizes.num_path_frames as usize)?,
        path_frames: stream.read_pod_vec(sizes.path_frames as usize)?,
        actor_infos: stream.read_pod_vec(sizes.actor_infos as usize)?,
        weapon_infos: stream.read_pod_vec(sizes.weapon_infos as usize)?,
        explosion_infos: stream.read_pod_vec(sizes.explosion_infos as usize)?,
        item_infos: stream.read_pod_vec(sizes.item_infos as usize)?,
        hint_user_vals: stream.read_pod_vec(sizes.hint_user_vals as usize)?,
        particle_infos: stream.read_pod_vec(sizes.particle_infos as usize)?,
        ai_control_infos: stream.read_pod_vec(sizes.ai_control_infos as usize)?,
        ai_path_frames: stream.read_pod_vec(sizes.ai_path_frames as usize)?,
    };

    let mut cursors = Cursors::default();
    for header in &headers {
        let mut thing = thing_from_header(header)?;

        thing.move_info = match thing.move_type {
            MoveType::Physics => {
                let info = take(&arrays.physics_infos, &mut cursors.physics, "PhysicsInfo")?;
                MoveInfo::Physics(physics_from_raw(info))
            }
            MoveType::Path => {
                let frames = *take(
                    &arrays.num_path_frames,
                    &mut cursors.num_path_frames,
                    "NumPathFrames",
                )? as usize;
                if frames > 0 {
                    let mut path_frames = Vec::with_capacity(frames);
                    for _ in 0..frames {
                        path_frames.push(*take(
                            &arrays.path_frames,
                            &mut cursors.path_frames,
                            "PathFrame",
                        )?);
                    }
                    MoveInfo::Path(PathInfo { path_frames })
                } else {
                    MoveInfo::None
                }
            }
            MoveType::None => MoveInfo::None,
        };

        thing.thing_info = match thing.kind {
            ThingType::Actor | ThingType::Player => {
                let info = take(&arrays.actor_infos, &mut cursors.actor, "ActorInfo")?;
                ThingInfo::Actor(Box::new(actor_from_raw(info)?))
            }
            ThingType::Weapon => {
                let info = take(&arrays.weapon_infos, &mut cursors.weapon, "WeaponInfo")?;
                ThingInfo::Weapon(weapon_from_raw(info)?)
            }
            ThingType::Explosion => {
                let info = take(
                    &arrays.explosion_infos,
                    &mut cursors.explosion,
                    "ExplosionInfo",
                )?;
                ThingInfo::Explosion(Box::new(explosion_from_raw(info)?))
            }
            ThingType::Item => {
                let info = take(&arrays.item_infos, &mut cursors.item, "ItemInfo")?;
                ThingInfo::Item(ItemInfo {
                    flags: ItemFlags::from_bits_retain(info.flags),
                    sec_respawn_interval: info.sec_respawn_interval,
                })
            }
            ThingType::Hint => {
                let value = take(&arrays.hint_user_vals, &mut cursors.hint, "HintUserVal")?;
                ThingInfo::Hint(HintUserVal(*value))
            }
            ThingType::Particle => {
                let info = take(
                    &arrays.particle_infos,
                    &mut cursors.particle,
                    "ParticleInfo",
                )?;
                ThingInfo::Particle(particle_from_raw(info)?)
            }
            _ => ThingInfo::None,
        };

        if thing.control_type == ControlType::Ai {
            let info = take(
                &arrays.ai_control_infos,
                &mut cursors.ai_control,
                "AIControlInfo",
            )?;
            let mut path_frames = Vec::new();
            if info.num_path_frames > 0 {
                path_frames.reserve(info.num_path_frames as usize);
                for _ in 0..info.num_path_frames {
                    path_frames.push(*take(
                        &arrays.ai_path_frames,
                        &mut cursors.ai_path_frames,
                        "AIPathFrame",
                    )?);
                }
            }
            thing.control_info = ControlInfo::Ai(AiControlInfo {
                ai_file: decode_name(&info.ai_file)?,
                path_frames,
            });
        }

        insert(thing)?;
    }

    let consumed = [
        (cursors.physics, arrays.physics_infos.len(), "PhysicsInfo"),
        (
            cursors.num_path_frames,
            arrays.num_path_frames.len(),
            "NumPathFrames",
        ),
        (cursors.path_frames, arrays.path_frames.len(), "PathFrame"),
        (cursors.actor, arrays.actor_infos.len(), "ActorInfo"),
        (cursors.weapon, arrays.weapon_infos.len(), "WeaponInfo"),
        (
            cursors.explosion,
            arrays.explosion_infos.len(),
            "ExplosionInfo",
        ),
        (cursors.item, arrays.item_infos.len(), "ItemInfo"),
        (cursors.hint, arrays.hint_user_vals.len(), "HintUserVal"),
        (
            cursors.particle,
            arrays.particle_infos.len(),
            "ParticleInfo",
        ),
        (
            cursors.ai_control,
            arrays.ai_control_infos.len(),
            "AIControlInfo",
        ),
        (
            cursors.ai_path_frames,
            arrays.ai_path_frames.len(),
            "AIPathFrame",
        ),
    ];
    for (cursor, len, list) in consumed {
        if cursor != len {
            return Err(CndError::format(
                "parse_thing_list",
                format!("not all records of side array '{list}' were consumed"),
            ));
        }
    }

    Ok(())
}

fn thing_from_header(header: &ThingHeader) -> Result<Thing> {
    let tag_error = |tag: &'static str, value: u32| {
        CndError::format(
            "parse_thing_list",
            format!("unknown {tag} tag {value} in thing header"),
        )
    };

    Ok(Thing {
        base_name: decode_name(&header.base_name)?,
        name: decode_name(&header.name)?,
        pos: header.pos,
        pyr_orient: header.pyr_orient,
        unknown: header.unknown,
        sector: header.sector,
        kind: ThingType::try_from(header.kind).map_err(|_| tag_error("type", header.kind))?,
        flags: ThingFlags::from_bits_retain(header.flags),
        move_type: MoveType::try_from(header.move_type)
            .map_err(|_| tag_error("move type", header.move_type))?,
        control_type: ControlType::try_from(header.control_type)
            .map_err(|_| tag_error("control type", header.control_type))?,
        light: header.light,
        ms_life_left: header.ms_life_left,
        render_type: header.rd_thing_type.into(),
        render_file: decode_name(&header.rd_thing_file)?,
        puppet_file: decode_name(&header.pup_file)?,
        sound_class_file: decode_name(&header.snd_file)?,
        create_thing_template: decode_name(&header.create_thing)?,
        cog_script_file: decode_name(&header.cog_script_file)?,
        collide: Collide {
            kind: header
                .collide
                .kind
                .try_into()
                .map_err(|_| tag_error("collide", header.collide.kind))?,
            move_size: header.collide.move_size,
            size: header.collide.size,
            width: header.collide.width,
            height: header.collide.height,
            center_x: header.collide.center_x,
            center_y: header.collide.center_y,
        },
        perf_level: header.perf_level,
        move_info: MoveInfo::None,
        thing_info: ThingInfo::None,
        control_info: ControlInfo::None,
    })
}

fn thing_to_header(thing: &Thing) -> Result<ThingHeader> {
    const FN: &str = "write_thing_list";
    Ok(ThingHeader {
        base_name: encode_name(FN, &thing.base_name)?,
        name: encode_name(FN, &thing.name)?,
        pos: thing.pos,
        pyr_orient: thing.pyr_orient,
        unknown: thing.unknown,
        sector: thing.sector,
        kind: thing.kind.into(),
        flags: thing.flags.bits(),
        move_type: thing.move_type.into(),
        control_type: thing.control_type.into(),
        light: thing.light,
        ms_life_left: thing.ms_life_left,
        rd_thing_type: thing.render_type.into(),
        rd_thing_file: encode_name(FN, &thing.render_file)?,
        pup_file: encode_name(FN, &thing.puppet_file)?,
        snd_file: encode_name(FN, &thing.sound_class_file)?,
        create_thing: encode_name(FN, &thing.create_thing_template)?,
        cog_script_file: encode_name(FN, &thing.cog_script_file)?,
        collide: RawCollide {
            kind: thing.collide.kind.into(),
            move_size: thing.collide.move_size,
            size: thing.collide.size,
            width: thing.collide.width,
            height: thing.collide.height,
            center_x: thing.collide.center_x,
            center_y: thing.collide.center_y,
        },
        perf_level: thing.perf_level,
    })
}

fn physics_from_raw(info: &RawPhysicsInfo) -> PhysicsInfo {
    PhysicsInfo {
        flags: PhysicsFlags::from_bits_retain(info.flags),
        mass: info.mass,
        height: info.height,
        air_drag: info.air_drag,
        surface_drag: info.surface_drag,
        static_drag: info.static_drag,
        angular_velocity: info.angular_velocity,
        velocity: info.velocity,
        max_rotation_velocity: info.max_rotation_velocity,
        max_velocity: info.max_velocity,
        orient_speed: info.orient_speed,
        buoyancy: info.buoyancy,
    }
}

fn physics_to_raw(info: &PhysicsInfo) -> RawPhysicsInfo {
    RawPhysicsInfo {
        flags: info.flags.bits(),
        mass: info.mass,
        height: info.height,
        air_drag: info.air_drag,
        surface_drag: info.surface_drag,
        static_drag: info.static_drag,
        angular_velocity: info.angular_velocity,
        velocity: info.velocity,
        max_rotation_velocity: info.max_rotation_velocity,
        max_velocity: info.max_velocity,
        orient_speed: info.orient_speed,
        buoyancy: info.buoyancy,
    }
}

fn actor_from_raw(info: &RawActorInfo) -> Result<ActorInfo> {
    Ok(ActorInfo {
        flags: ActorFlags::from_bits_retain(info.flags),
        weapon_template: decode_name(&info.weapon_template)?,
        health: info.health,
        max_health: info.max_health,
        max_thrust: info.max_thrust,
        max_rot_thrust: info.max_rot_thrust,
        max_head_velocity: info.max_head_velocity,
        max_head_yaw: info.max_head_yaw,
        jump_speed: info.jump_speed,
        eye_offset: info.eye_offset,
        min_head_pitch: info.min_head_pitch,
        max_head_pitch: info.max_head_pitch,
        fire_offset: info.fire_offset,
        light_offset: info.light_offset,
        light_intensity: info.light_intensity,
        voice_color: info.voice_color,
        explode_template: decode_name(&info.explode_template)?,
    })
}

fn actor_to_raw(info: &ActorInfo) -> Result<RawActorInfo> {
    const FN: &str = "write_thing_list";
    Ok(RawActorInfo {
        flags: info.flags.bits(),
        weapon_template: encode_name(FN, &info.weapon_template)?,
        health: info.health,
        max_health: info.max_health,
        max_thrust: info.max_thrust,
        max_rot_thrust: info.max_rot_thrust,
        max_head_velocity: info.max_head_velocity,
        max_head_yaw: info.max_head_yaw,
        jump_speed: info.jump_speed,
        eye_offset: info.eye_offset,
        min_head_pitch: info.min_head_pitch,
        max_head_pitch: info.max_head_pitch,
        fire_offset: info.fire_offset,
        light_offset: info.light_offset,
        light_intensity: info.light_intensity,
        voice_color: info.voice_color,
        explode_template: encode_name(FN, &info.explode_template)?,
    })
}

fn weapon_from_raw(info: &RawWeaponInfo) -> Result<WeaponInfo> {
    Ok(WeaponInfo {
        flags: WeaponFlags::from_bits_retain(info.flags),
        explosion_template: decode_name(&info.explosion_template)?,
        damage: info.damage,
        min_damage: info.min_damage,
        rate: info.rate,
        damage_type: DamageType::from_bits_retain(info.damage_type),
        range: info.range,
        force: info.force,
    })
}

fn weapon_to_raw(info: &WeaponInfo) -> Result<RawWeaponInfo> {
    Ok(RawWeaponInfo {
        flags: info.flags.bits(),
        explosion_template: encode_name("write_thing_list", &info.explosion_template)?,
        damage: info.damage,
        min_damage: info.min_damage,
        rate: info.rate,
        damage_type: info.damage_type.bits(),
        range: info.range,
        force: info.force,
    })
}

fn explosion_from_raw(info: &RawExplosionInfo) -> Result<ExplosionInfo> {
    let debris_templates = info
        .debris_templates
        .iter()
        .map(decode_name)
        .collect::<Result<Vec<_>>>()?;
    Ok(ExplosionInfo {
        flags: ExplosionFlags::from_bits_retain(info.flags),
        damage: info.damage,
        damage_type: DamageType::from_bits_retain(info.damage_type),
        range: info.range,
        force: info.force,
        ms_blast_time: info.ms_blast_time,
        ms_baby_time: info.ms_baby_time,
        ms_expand_time: info.ms_expand_time,
        ms_fade_time: info.ms_fade_time,
        max_light: info.max_light,
        debris_templates,
        sprite_start: info.sprite_start,
        sprite_end: info.sprite_end,
        sprite_template: decode_name(&info.sprite_template)?,
    })
}

fn explosion_to_raw(info: &ExplosionInfo) -> Result<RawExplosionInfo> {
    const FN: &str = "write_thing_list";
    if info.debris_templates.len() > 16 {
        return Err(CndError::format(
            FN,
            format!(
                "explosion carries {} debris templates, limit is 16",
                info.debris_templates.len()
            ),
        ));
    }
    let mut debris_templates = [[0u8; 64]; 16];
    for (slot, name) in debris_templates.iter_mut().zip(&info.debris_templates) {
        *slot = encode_name(FN, name)?;
    }
    Ok(RawExplosionInfo {
        flags: info.flags.bits(),
        damage: info.damage,
        damage_type: info.damage_type.bits(),
        range: info.range,
        force: info.force,
        ms_blast_time: info.ms_blast_time,
        ms_baby_time: info.ms_baby_time,
        ms_expand_time: info.ms_expand_time,
        ms_fade_time: info.ms_fade_time,
        max_light: info.max_light,
        debris_templates,
        sprite_start: info.sprite_start,
        sprite_end: info.sprite_end,
        sprite_template: encode_name(FN, &info.sprite_template)?,
    })
}

fn particle_from_raw(info: &RawParticleInfo) -> Result<ParticleInfo> {
    Ok(ParticleInfo {
        flags: ParticleFlags::from_bits_retain(info.flags),
        growth_speed: info.growth_speed,
        min_radius: info.min_radius,
        max_radius: info.max_radius,
        size: info.size,
        timeout_rate: info.timeout_rate,
        count: info.count,
        pitch_range: info.pitch_range,
        yaw_range: info.yaw_range,
        material: decode_name(&info.material)?,
    })
}

fn particle_to_raw(info: &ParticleInfo) -> Result<RawParticleInfo> {
    Ok(RawParticleInfo {
        flags: info.flags.bits(),
        growth_speed: info.growth_speed,
        min_radius: info.min_radius,
        max_radius: info.max_radius,
        size: info.size,
        timeout_rate: info.timeout_rate,
        count: info.count,
        pitch_range: info.pitch_range,
        yaw_range: info.yaw_range,
        material: encode_name("write_thing_list", &info.material)?,
    })
}

fn variant_error(thing: &Thing, expected: &str) -> CndError {
    CndError::logic(
        "write_thing_list",
        format!(
            "thing '{}' is tagged for {expected} but carries no such payload",
            thing.name
        ),
    )
}

fn write_thing_list<'a, S: Write + Seek>(
    stream: &mut Stream<S>,
    things: impl Iterator<Item = &'a Thing>,
) -> Result<()> {
    let mut headers = Vec::new();
    let mut arrays = SideArrays {
        physics_infos: Vec::new(),
        num_path_frames: Vec::new(),
        path_frames: Vec::new(),
        actor_infos: Vec::new(),
        weapon_infos: Vec::new(),
        explosion_infos: Vec::new(),
        item_infos: Vec::new(),
        hint_user_vals: Vec::new(),
        particle_infos: Vec::new(),
        ai_control_infos: Vec::new(),
        ai_path_frames: Vec::new(),
    };

    for thing in things {
        headers.push(thing_to_header(thing)?);

        match thing.move_type {
            MoveType::Physics => match &thing.move_info {
                MoveInfo::Physics(info) => arrays.physics_infos.push(physics_to_raw(info)),
                _ => return Err(variant_error(thing, "physics movement")),
            },
            MoveType::Path => {
                let frames = match &thing.move_info {
                    MoveInfo::Path(info) => info.path_frames.as_slice(),
                    _ => &[],
                };
                arrays.num_path_frames.push(frames.len() as u32);
                arrays.path_frames.extend_from_slice(frames);
            }
            MoveType::None => {}
        }

        match (thing.kind, &thing.thing_info) {
            (ThingType::Actor | ThingType::Player, ThingInfo::Actor(info)) => {
                arrays.actor_infos.push(actor_to_raw(info)?);
            }
            (ThingType::Actor | ThingType::Player, _) => {
                return Err(variant_error(thing, "actor info"))
            }
            (ThingType::Weapon, ThingInfo::Weapon(info)) => {
                arrays.weapon_infos.push(weapon_to_raw(info)?);
            }
            (ThingType::Weapon, _) => return Err(variant_error(thing, "weapon info")),
            (ThingType::Explosion, ThingInfo::Explosion(info)) => {
                arrays.explosion_infos.push(explosion_to_raw(info)?);
            }
            (ThingType::Explosion, _) => return Err(variant_error(thing, "explosion info")),
            (ThingType::Item, ThingInfo::Item(info)) => {
                arrays.item_infos.push(RawItemInfo {
                    flags: info.flags.bits(),
                    sec_respawn_interval: info.sec_respawn_interval,
                });
            }
            (ThingType::Item, _) => return Err(variant_error(thing, "item info")),
            (ThingType::Hint, ThingInfo::Hint(value)) => {
                arrays.hint_user_vals.push(value.0);
            }
            (ThingType::Hint, _) => return Err(variant_error(thing, "hint user value")),
            (ThingType::Particle, ThingInfo::Particle(info)) => {
                arrays.particle_infos.push(particle_to_raw(info)?);
            }
            (ThingType::Particle, _) => return Err(variant_error(thing, "particle info")),
            _ => {}
        }

        if thing.control_type == ControlType::Ai {
            let info = match &thing.control_info {
                ControlInfo::Ai(info) => info,
                _ => return Err(variant_error(thing, "ai control info")),
            };
            arrays.ai_control_infos.push(RawAiControlInfo {
                ai_file: encode_name("write_thing_list", &info.ai_file)?,
                num_path_frames: info.path_frames.len() as i32,
            });
            arrays.ai_path_frames.extend_from_slice(&info.path_frames);
        }
    }

    let sizes = ThingListSizes {
        physics_infos: arrays.physics_infos.len() as u32,
        num_path_frames: arrays.num_path_frames.len() as u32,
        path_frames: arrays.path_frames.len() as u32,
        actor_infos: arrays.actor_infos.len() as u32,
        weapon_infos: arrays.weapon_infos.len() as u32,
        explosion_infos: arrays.explosion_infos.len() as u32,
        item_infos: arrays.item_infos.len() as u32,
        hint_user_vals: arrays.hint_user_vals.len() as u32,
        particle_infos: arrays.particle_infos.len() as u32,
        ai_control_infos: arrays.ai_control_infos.len() as u32,
        ai_path_frames: arrays.ai_path_frames.len() as u32,
    };

    stream.write_pod_slice(&headers)?;
    stream.write_pod(&sizes)?;
    stream.write_pod_slice(&arrays.physics_infos)?;
    stream.write_pod_slice(&arrays.num_path_frames)?;
    stream.write_pod_slice(&arrays.path_frames)?;
    stream.write_pod_slice(&arrays.actor_infos)?;
    stream.write_pod_slice(&arrays.weapon_infos)?;
    stream.write_pod_slice(&arrays.explosion_infos)?;
    stream.write_pod_slice(&arrays.item_infos)?;
    stream.write_pod_slice(&arrays.hint_user_vals)?;
    stream.write_pod_slice(&arrays.particle_infos)?;
    stream.write_pod_slice(&arrays.ai_control_infos)?;
    stream.write_pod_slice(&arrays.ai_path_frames)?;
    Ok(())
}

pub fn parse_templates<S: Read + Seek>(
    stream: &mut Stream<S>,
    header: &CndHeader,
) -> Result<ThingTable> {
    let inner = |stream: &mut Stream<S>| -> Result<ThingTable> {
        let mut templates = ThingTable::new();
        parse_thing_list(stream, header.num_thing_templates, |thing| {
            let name = thing.name.clone();
            if !templates.insert(thing) {
                return Err(CndError::logic(
                    "parse_templates",
                    format!("found duplicated template '{name}'"),
                ));
            }
            Ok(())
        })?;
        Ok(templates)
    };
    inner(stream).map_err(|e| e.in_section("parse_templates", "Templates"))
}

/// Reads just the templates out of a container.
pub fn read_templates<S: Read + Seek>(stream: &mut Stream<S>) -> Result<ThingTable> {
    let header = super::read_header(stream)?;
    let offset = offsets::templates(stream, &header)?;
    stream.seek(offset)?;
    parse_templates(stream, &header)
}

pub fn write_templates<S: Write + Seek>(
    stream: &mut Stream<S>,
    templates: &ThingTable,
) -> Result<()> {
    write_thing_list(stream, templates.iter())
        .map_err(|e| e.in_section("write_templates", "Templates"))
}

pub fn parse_things<S: Read + Seek>(
    stream: &mut Stream<S>,
    header: &CndHeader,
) -> Result<Vec<Thing>> {
    let inner = |stream: &mut Stream<S>| -> Result<Vec<Thing>> {
        let mut things = Vec::with_capacity(header.num_things as usize);
        parse_thing_list(stream, header.num_things, |thing| {
            things.push(thing);
            Ok(())
        })?;
        Ok(things)
    };
    inner(stream).map_err(|e| e.in_section("parse_things", "Things"))
}

/// Reads just the things out of a container.
pub fn read_things<S: Read + Seek>(stream: &mut Stream<S>) -> Result<Vec<Thing>> {
    let header = super::read_header(stream)?;
    let offset = offsets::things(stream, &header)?;
    stream.seek(offset)?;
    parse_things(stream, &header)
}

pub fn write_things<S: Write + Seek>(stream: &mut Stream<S>, things: &[Thing]) -> Result<()> {
    write_thing_list(stream, things.iter()).map_err(|e| e.in_section("write_things", "Things"))
}
