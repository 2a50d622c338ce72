//! Textual KEY animation files, the standalone form of a keyframes-section
//! entry. Used by the CLI to move animations in and out of containers.

use crate::animation::{Animation, AnimationFlags, KeyMarker, KeyNode, KeyNodeEntry};
use crate::ndy::text::{flex, rot, vec3, TextReader, TextWriter};
use crate::{CndError, Result};
use std::io::{BufRead, Write};

fn error(message: impl Into<String>) -> CndError {
    CndError::Format {
        function: "key",
        message: message.into(),
    }
}

/// Parses a KEY file. The animation takes its name from the file name, which
/// the caller knows and the file itself does not.
pub fn read_key<R: BufRead>(input: R, name: &str) -> Result<Animation> {
    let mut reader = TextReader::new(input);
    let mut anim = Animation {
        name: name.to_owned(),
        ..Default::default()
    };

    reader.expect_section("HEADER")?;
    reader.expect_key("FLAGS")?;
    anim.flags = AnimationFlags::from_bits_retain(reader.flags()?);
    reader.expect_key("TYPE")?;
    anim.kind = reader.flags()?;
    anim.frames = reader.key_value("FRAMES")?;
    anim.fps = reader.key_value("FPS")?;
    anim.joints = reader.key_value("JOINTS")?;

    reader.expect("SECTION:")?;
    let section = reader.next_token()?;
    if section.eq_ignore_ascii_case("MARKERS") {
        let count: usize = reader.key_value("MARKERS")?;
        for _ in 0..count {
            anim.markers.push(KeyMarker {
                frame: reader.value()?,
                kind: reader.value::<u32>()?.into(),
            });
        }
        reader.expect_section("KEYFRAME NODES")?;
    } else if section.eq_ignore_ascii_case("KEYFRAME") {
        reader.expect("NODES")?;
    } else {
        return Err(error(format!("unexpected section '{section}'")));
    }

    let count: usize = reader.key_value("NODES")?;
    for _ in 0..count {
        let mut node = KeyNode {
            node: reader.key_value("NODE")?,
            ..Default::default()
        };
        reader.expect_key("MESH NAME")?;
        node.mesh_name = reader.next_token()?;

        let entries: usize = reader.key_value("ENTRIES")?;
        for _ in 0..entries {
            let _index = reader.next_token()?;
            node.entries.push(KeyNodeEntry {
                frame: reader.value()?,
                flags: reader.flags()?,
                pos: reader.vec3()?,
                rot: reader.rot()?,
                dpos: reader.vec3()?,
                drot: reader.rot()?,
            });
        }
        anim.nodes.push(node);
    }

    Ok(anim)
}

pub fn write_key<W: Write>(out: W, anim: &Animation) -> Result<W> {
    let mut writer = TextWriter::new(out);

    writer.write_section("HEADER")?;
    writer.write_key_value("FLAGS", format_args!("0x{:x}", anim.flags.bits()))?;
    writer.write_key_value("TYPE", format_args!("0x{:x}", anim.kind))?;
    writer.write_key_value("FRAMES", anim.frames)?;
    writer.write_key_value("FPS", flex(anim.fps))?;
    writer.write_key_value("JOINTS", anim.joints)?;
    writer.write_eol()?;

    if !anim.markers.is_empty() {
        writer.write_section("MARKERS")?;
        writer.write_key_value("MARKERS", anim.markers.len())?;
        for marker in &anim.markers {
            writer.write_line(format_args!(
                "{} {}",
                flex(marker.frame),
                u32::from(marker.kind)
            ))?;
        }
        writer.write_eol()?;
    }

    writer.write_section("KEYFRAME NODES")?;
    writer.write_key_value("NODES", anim.nodes.len())?;
    for node in &anim.nodes {
        writer.write_eol()?;
        writer.write_key_value("NODE", node.node)?;
        writer.write_key_value("MESH NAME", &node.mesh_name)?;
        writer.write_key_value("ENTRIES", node.entries.len())?;
        for (idx, entry) in node.entries.iter().enumerate() {
            writer.write_line(format_args!(
                "{idx}: {} 0x{:x} {} {} {} {}",
                entry.frame,
                entry.flags,
                vec3(&entry.pos),
                rot(&entry.rot),
                vec3(&entry.dpos),
                rot(&entry.drot)
            ))?;
        }
    }

    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::KeyMarkerKind;
    use crate::Vector3;

    fn sample_animation() -> Animation {
        Animation {
            name: "walk.key".to_owned(),
            flags: AnimationFlags::DOES_NOT_LOOP,
            kind: 0xffff,
            frames: 2,
            fps: 30.0,
            joints: 1,
            markers: vec![KeyMarker {
                frame: 1.5,
                kind: KeyMarkerKind::LeftFootstep,
            }],
            nodes: vec![KeyNode {
                mesh_name: "body".to_owned(),
                node: 0,
                entries: vec![KeyNodeEntry {
                    frame: 0,
                    flags: 0x3,
                    pos: Vector3 {
                        x: 0.5,
                        y: 0.0,
                        z: -1.0,
                    },
                    ..Default::default()
                }],
            }],
        }
    }

    #[test]
    fn key_text_round_trip() {
        let anim = sample_animation();
        let text = write_key(Vec::new(), &anim).unwrap();
        let parsed = read_key(text.as_slice(), "walk.key").unwrap();
        assert_eq!(parsed, anim);
    }

    #[test]
    fn markers_section_is_optional() {
        let mut anim = sample_animation();
        anim.markers.clear();
        let text = write_key(Vec::new(), &anim).unwrap();
        let parsed = read_key(text.as_slice(), "walk.key").unwrap();
        assert_eq!(parsed, anim);
    }
}
