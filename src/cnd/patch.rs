//! In-place patching: splices a freshly serialized section into an existing
//! container while copying every other byte verbatim, then fixes the file
//! size word and the section's count fields in the header.
//!
//! The new content is staged in a `.patched` sibling which replaces the
//! original only after everything succeeded; on any failure the sibling is
//! deleted and the input is left untouched.

use super::raw::{KeyHeader, KeyNode, MatHeader, RawKeyMarker};
use super::{materials, keyframes, offsets, read_header};
use crate::animation::{Animation, KeyNodeEntry};
use crate::material::Material;
use crate::stream::{copy_range, InputFileStream, OutputFileStream, Stream};
use crate::{CndError, Result};
use std::ffi::OsString;
use std::mem::size_of;
use std::path::{Path, PathBuf};

fn patched_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".patched");
    PathBuf::from(name)
}

fn rename_error(from: &Path, source: std::io::Error) -> CndError {
    CndError::Io {
        stream: from.display().to_string(),
        source,
    }
}

/// Stages the patch body into a `.patched` sibling and atomically renames it
/// over the original on success. Any error removes the sibling.
fn run_patch(
    path: &Path,
    body: impl FnOnce(&mut InputFileStream, &mut OutputFileStream) -> Result<()>,
) -> Result<()> {
    let mut input = Stream::open(path)?;
    let staged = patched_path(path);
    let mut output = Stream::create(&staged)?;

    let result = body(&mut input, &mut output).and_then(|_| output.flush());
    drop(output);
    drop(input);

    match result {
        Ok(()) => std::fs::rename(&staged, path).map_err(|e| rename_error(&staged, e)),
        Err(e) => {
            let _ = std::fs::remove_file(&staged);
            Err(e)
        }
    }
}

/// Replaces the materials section of the container at `path`.
pub fn patch_materials(path: &Path, new_materials: &[Material]) -> Result<()> {
    run_patch(path, |input, output| {
        let header = read_header(input)?;

        let section_start = offsets::materials(input)?;
        copy_range(input, output, 0, section_start)?;

        // Original section length from its own prefix, payload undecoded.
        input.seek(section_start)?;
        let old_pixel_data_size = input.read_u32()? as u64;
        let section_end = input.tell()?
            + header.num_materials as u64 * size_of::<MatHeader>() as u64
            + old_pixel_data_size;

        materials::write(output, new_materials)?;

        let input_size = input.size()?;
        copy_range(input, output, section_end, input_size)?;

        let mut patched = header;
        patched.file_size = output.tell()? as u32;
        patched.num_materials = new_materials.len() as u32;
        if patched.size_materials < patched.num_materials {
            patched.size_materials = patched.num_materials;
        }
        output.seek(0)?;
        output.write_pod(&patched)
    })
}

/// Replaces the keyframes section of the container at `path`.
pub fn patch_keyframes(path: &Path, new_animations: &[Animation]) -> Result<()> {
    run_patch(path, |input, output| {
        let header = read_header(input)?;

        let section_start = offsets::keyframes(input, &header)?;
        copy_range(input, output, 0, section_start)?;

        input.seek(section_start)?;
        let num_markers = input.read_u32()? as u64;
        let num_nodes = input.read_u32()? as u64;
        let num_entries = input.read_u32()? as u64;
        let section_end = input.tell()?
            + header.num_keyframes as u64 * size_of::<KeyHeader>() as u64
            + num_markers * size_of::<RawKeyMarker>() as u64
            + num_nodes * size_of::<KeyNode>() as u64
            + num_entries * size_of::<KeyNodeEntry>() as u64;

        keyframes::write(output, new_animations)?;

        let input_size = input.size()?;
        copy_range(input, output, section_end, input_size)?;

        let mut patched = header;
        patched.file_size = output.tell()? as u32;
        patched.num_keyframes = new_animations.len() as u32;
        if patched.size_keyframes < patched.num_keyframes {
            patched.size_keyframes = patched.num_keyframes;
        }
        output.seek(0)?;
        output.write_pod(&patched)
    })
}
