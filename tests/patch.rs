use cnd::animation::{Animation, KeyNode, KeyNodeEntry};
use cnd::cnd::raw::CndHeader;
use cnd::cnd::{keyframes, materials, offsets, patch, World};
use cnd::material::{Material, Texture, RGB_565};
use cnd::stream::Stream;
use std::fs;
use std::mem::size_of;
use std::path::Path;
use tempfile::tempdir;

fn sample_material(name: &str, seed: u8) -> Material {
    let pixels: Vec<u8> = (0..32).map(|i| i as u8 ^ seed).collect();
    Material {
        name: name.to_owned(),
        width: 4,
        height: 4,
        format: RGB_565,
        cells: vec![Texture {
            mip_levels: vec![pixels],
        }],
    }
}

fn sample_animation(name: &str) -> Animation {
    Animation {
        name: name.to_owned(),
        frames: 2,
        fps: 15.0,
        joints: 1,
        nodes: vec![KeyNode {
            mesh_name: "body".to_owned(),
            node: 0,
            entries: vec![KeyNodeEntry {
                frame: 1,
                flags: 0x1,
                ..Default::default()
            }],
        }],
        ..Default::default()
    }
}

/// A container with three materials and no animations on disk.
fn write_container(path: &Path) -> World {
    let world = World {
        materials: vec![
            sample_material("aaa.mat", 0x00),
            sample_material("bbb.mat", 0x5a),
            sample_material("ccc.mat", 0xa5),
        ],
        pvs: vec![1, 2, 3, 4],
        ..Default::default()
    };
    let mut stream = Stream::create(path).unwrap();
    world.write(&mut stream).unwrap();
    stream.flush().unwrap();
    world
}

#[test]
fn material_patch_replaces_only_the_materials_window() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("level.cnd");
    write_container(&path);
    let original = fs::read(&path).unwrap();

    let replacement = vec![sample_material("aaa.mat", 0x00), sample_material("bbb.mat", 0x77)];
    patch::patch_materials(&path, &replacement).unwrap();
    let patched = fs::read(&path).unwrap();

    // The new material set reads back as written.
    let mut stream = Stream::open(&path).unwrap();
    let materials = materials::read(&mut stream).unwrap();
    assert_eq!(materials, replacement);

    let header = cnd::cnd::read_header(&mut stream).unwrap();
    assert_eq!(header.num_materials, 2);
    assert_eq!(header.size_materials, 3); // reserved capacity never shrinks
    assert_eq!(header.file_size as usize, patched.len());

    // Bytes outside the materials window and the touched header fields are
    // identical to the original.
    let window = offsets::materials(&mut stream).unwrap() as usize;
    let header_size = size_of::<CndHeader>();
    assert_eq!(original[header_size..window], patched[header_size..window]);

    let old_section_len = section_len(&original, window);
    let new_section_len = section_len(&patched, window);
    assert_eq!(
        original[window + old_section_len..],
        patched[window + new_section_len..]
    );
}

fn section_len(bytes: &[u8], window: usize) -> usize {
    let pixel_data = u32::from_le_bytes(bytes[window..window + 4].try_into().unwrap()) as usize;
    let count = {
        let mut stream = Stream::from_bytes("header", bytes.to_vec());
        cnd::cnd::read_header(&mut stream).unwrap().num_materials as usize
    };
    4 + count * 136 + pixel_data
}

#[test]
fn patching_twice_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("level.cnd");
    write_container(&path);

    let replacement = vec![sample_material("bbb.mat", 0x77)];
    patch::patch_materials(&path, &replacement).unwrap();
    let once = fs::read(&path).unwrap();
    patch::patch_materials(&path, &replacement).unwrap();
    let twice = fs::read(&path).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn animation_add_round_trips_through_the_patcher() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("level.cnd");
    write_container(&path);

    let walk = sample_animation("walk.key");
    patch::patch_keyframes(&path, std::slice::from_ref(&walk)).unwrap();

    let mut stream = Stream::open(&path).unwrap();
    let animations = keyframes::read(&mut stream).unwrap();
    assert_eq!(animations, vec![walk]);

    let header = cnd::cnd::read_header(&mut stream).unwrap();
    assert_eq!(header.num_keyframes, 1);

    // Everything else survived, materials included.
    let materials = materials::read(&mut stream).unwrap();
    assert_eq!(materials.len(), 3);
    let mut bank = cnd::audio::SoundBank::new(1);
    cnd::cnd::sounds::read(&mut stream, &mut bank, 0).unwrap();
    assert_eq!(bank.track(0).unwrap().len(), 0);
}

#[test]
fn failed_patch_leaves_the_container_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("level.cnd");
    write_container(&path);
    let original = fs::read(&path).unwrap();

    let bad = vec![Material {
        name: "x".repeat(80),
        ..sample_material("ignored", 0)
    }];
    assert!(patch::patch_materials(&path, &bad).is_err());

    assert_eq!(fs::read(&path).unwrap(), original);
    assert!(!dir.path().join("level.cnd.patched").exists());
}
