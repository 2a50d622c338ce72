//! GOB archive: the game's virtual filesystem container. A 12 byte header
//! points at a directory of `{offset, size, name[128]}` entries; entry names
//! are matched case-insensitively, the way the engine resolves them.

use crate::stream::Stream;
use crate::{CndError, Result};
use bytemuck::{Pod, Zeroable};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

pub const GOB_SIGNATURE: [u8; 4] = *b"GOB ";
pub const GOB_VERSION: u32 = 0x14;

const ENTRY_NAME_SIZE: usize = 128;

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
struct RawEntry {
    offset: u32,
    size: u32,
    name: [u8; ENTRY_NAME_SIZE],
}

static_assertions::const_assert_eq!(std::mem::size_of::<RawEntry>(), 136);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GobEntry {
    pub name: String,
    pub offset: u32,
    pub size: u32,
}

/// An opened archive: the parsed directory plus the stream the entry bytes
/// are read from on demand.
#[derive(Debug)]
pub struct Gob<S> {
    stream: Stream<S>,
    entries: Vec<GobEntry>,
    by_name: HashMap<String, usize>,
}

impl Gob<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Gob::read(Stream::open(path)?)
    }
}

impl<S: Read + Seek> Gob<S> {
    pub fn read(mut stream: Stream<S>) -> Result<Self> {
        if stream.read_array::<4>()? != GOB_SIGNATURE {
            return Err(CndError::format("Gob::read", "unknown GOB file signature"));
        }
        let version = stream.read_u32()?;
        if version != GOB_VERSION {
            return Err(CndError::format(
                "Gob::read",
                format!("wrong GOB file version: {version}"),
            ));
        }

        let directory_offset = stream.read_u32()?;
        stream.seek(directory_offset as u64)?;
        let num_entries = stream.read_u32()? as usize;
        let raw_entries: Vec<RawEntry> = stream.read_pod_vec(num_entries)?;

        let mut entries = Vec::with_capacity(num_entries);
        let mut by_name = HashMap::with_capacity(num_entries);
        for raw in &raw_entries {
            let len = raw
                .name
                .iter()
                .position(|&c| c == 0)
                .unwrap_or(ENTRY_NAME_SIZE);
            let name = std::str::from_utf8(&raw.name[..len])
                .map_err(crate::StringError::NonUtf8)?
                .to_owned();
            by_name.insert(name.to_ascii_lowercase(), entries.len());
            entries.push(GobEntry {
                name,
                offset: raw.offset,
                size: raw.size,
            });
        }

        Ok(Gob {
            stream,
            entries,
            by_name,
        })
    }

    pub fn entries(&self) -> &[GobEntry] {
        &self.entries
    }

    pub fn find(&self, name: &str) -> Option<&GobEntry> {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .map(|&idx| &self.entries[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Reads one entry's bytes out of the archive.
    pub fn extract(&mut self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .find(name)
            .cloned()
            .ok_or_else(|| CndError::logic("Gob::extract", format!("no entry '{name}'")))?;
        self.stream.seek(entry.offset as u64)?;
        self.stream.read_bytes(entry.size as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_gob() -> Vec<u8> {
        let mut stream = Stream::memory("sample.gob");
        stream.write_all(&GOB_SIGNATURE).unwrap();
        stream.write_u32(GOB_VERSION).unwrap();
        stream.write_u32(12 + 8).unwrap(); // directory past header and payload
        stream.write_all(b"datadata").unwrap();
        stream.write_u32(1).unwrap();
        let mut name = [0u8; ENTRY_NAME_SIZE];
        let raw_name = b"cd1\\ndy\\00_cyn.cnd";
        name[..raw_name.len()].copy_from_slice(raw_name);
        stream
            .write_pod(&RawEntry {
                offset: 12,
                size: 8,
                name,
            })
            .unwrap();
        stream.into_bytes()
    }

    #[test]
    fn reads_directory_and_extracts() {
        let mut gob = Gob::read(Stream::from_bytes("sample.gob", sample_gob())).unwrap();
        assert_eq!(gob.entries().len(), 1);
        assert!(gob.contains("CD1\\NDY\\00_CYN.CND"));
        assert_eq!(gob.extract("cd1\\ndy\\00_cyn.cnd").unwrap(), b"datadata");
    }

    #[test]
    fn rejects_wrong_version() {
        let mut bytes = sample_gob();
        bytes[4] = 0x13;
        assert!(matches!(
            Gob::read(Stream::from_bytes("bad.gob", bytes)),
            Err(CndError::Format { .. })
        ));
    }
}
