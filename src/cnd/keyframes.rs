//! Keyframes section: animation headers grouped with three side arrays
//! (markers, nodes, node entries), each consumed by per-header counts.

use super::offsets;
use super::raw::{CndHeader, KeyHeader, KeyNode as RawKeyNode, RawKeyMarker};
use crate::animation::{
    Animation, AnimationFlags, KeyMarker, KeyNode, KeyNodeEntry, MAX_KEY_MARKERS,
};
use crate::shared::{decode_name, encode_name};
use crate::stream::Stream;
use crate::{CndError, Result};
use std::io::{Read, Seek, Write};

pub fn parse<S: Read + Seek>(stream: &mut Stream<S>, header: &CndHeader) -> Result<Vec<Animation>> {
    let inner = |stream: &mut Stream<S>| -> Result<Vec<Animation>> {
        let num_markers = stream.read_u32()? as usize;
        let num_nodes = stream.read_u32()? as usize;
        let num_entries = stream.read_u32()? as usize;

        let key_headers: Vec<KeyHeader> = stream.read_pod_vec(header.num_keyframes as usize)?;
        let markers: Vec<RawKeyMarker> = stream.read_pod_vec(num_markers)?;
        let nodes: Vec<RawKeyNode> = stream.read_pod_vec(num_nodes)?;
        let entries: Vec<KeyNodeEntry> = stream.read_pod_vec(num_entries)?;

        let mut markers = markers.iter();
        let mut nodes = nodes.iter();
        let mut entries = &entries[..];

        let mut animations = Vec::with_capacity(key_headers.len());
        for key in &key_headers {
            if key.num_markers as usize > MAX_KEY_MARKERS {
                return Err(CndError::format(
                    "parse_keyframes",
                    format!("animation carries {} markers, limit is 16", key.num_markers),
                ));
            }

            let anim_markers = (0..key.num_markers)
                .map(|_| {
                    markers
                        .next()
                        .map(|marker| KeyMarker {
                            frame: marker.frame,
                            kind: marker.kind.into(),
                        })
                        .ok_or_else(|| {
                            CndError::format("parse_keyframes", "marker list exhausted")
                        })
                })
                .collect::<Result<Vec<_>>>()?;

            let anim_nodes = (0..key.num_nodes)
                .map(|_| {
                    let node = nodes.next().ok_or_else(|| {
                        CndError::format("parse_keyframes", "node list exhausted")
                    })?;
                    let count = node.num_entries as usize;
                    if count > entries.len() {
                        return Err(CndError::format(
                            "parse_keyframes",
                            "node entry list exhausted",
                        ));
                    }
                    let (node_entries, rest) = entries.split_at(count);
                    entries = rest;
                    Ok(KeyNode {
                        mesh_name: decode_name(&node.mesh_name)?,
                        node: node.node,
                        entries: node_entries.to_vec(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            animations.push(Animation {
                name: decode_name(&key.name)?,
                flags: AnimationFlags::from_bits_retain(key.flags),
                kind: key.kind,
                frames: key.frames,
                fps: key.fps,
                joints: key.num_joints,
                markers: anim_markers,
                nodes: anim_nodes,
            });
        }

        if markers.next().is_some() || nodes.next().is_some() || !entries.is_empty() {
            return Err(CndError::format(
                "parse_keyframes",
                "not all parsed key entries were consumed",
            ));
        }

        Ok(animations)
    };
    inner(stream).map_err(|e| e.in_section("parse_keyframes", "Keyframes"))
}

/// Reads just the animations out of a container.
pub fn read<S: Read + Seek>(stream: &mut Stream<S>) -> Result<Vec<Animation>> {
    let header = super::read_header(stream)?;
    let offset = offsets::keyframes(stream, &header)?;
    stream.seek(offset)?;
    parse(stream, &header)
}

pub fn write<S: Write + Seek>(stream: &mut Stream<S>, animations: &[Animation]) -> Result<()> {
    let inner = |stream: &mut Stream<S>| -> Result<()> {
        let mut key_headers = Vec::with_capacity(animations.len());
        let mut markers = Vec::new();
        let mut nodes = Vec::new();
        let mut entries = Vec::new();

        for anim in animations {
            if anim.markers.len() > MAX_KEY_MARKERS {
                return Err(CndError::format(
                    "write_keyframes",
                    format!(
                        "animation '{}' carries {} markers, limit is 16",
                        anim.name,
                        anim.markers.len()
                    ),
                ));
            }

            key_headers.push(KeyHeader {
                name: encode_name("write_keyframes", &anim.name)?,
                flags: anim.flags.bits(),
                kind: anim.kind,
                frames: anim.frames,
                fps: anim.fps,
                num_markers: anim.markers.len() as u32,
                num_joints: anim.joints,
                num_nodes: anim.nodes.len() as u32,
            });

            markers.extend(anim.markers.iter().map(|marker| RawKeyMarker {
                frame: marker.frame,
                kind: marker.kind.into(),
            }));

            for node in &anim.nodes {
                nodes.push(RawKeyNode {
                    mesh_name: encode_name("write_keyframes", &node.mesh_name)?,
                    node: node.node,
                    num_entries: node.entries.len() as u32,
                });
                entries.extend_from_slice(&node.entries);
            }
        }

        stream.write_u32(markers.len() as u32)?;
        stream.write_u32(nodes.len() as u32)?;
        stream.write_u32(entries.len() as u32)?;
        stream.write_pod_slice(&key_headers)?;
        stream.write_pod_slice(&markers)?;
        stream.write_pod_slice(&nodes)?;
        stream.write_pod_slice(&entries)
    };
    inner(stream).map_err(|e| e.in_section("write_keyframes", "Keyframes"))
}
