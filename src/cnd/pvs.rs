//! PVS section: an opaque visibility blob behind an `i32` size prefix.
//! Sectors reference into it by `pvs_idx`, or carry `-1` when the section
//! is absent.

use crate::stream::Stream;
use crate::{CndError, Result};
use std::io::{Read, Seek, Write};

pub fn parse<S: Read + Seek>(stream: &mut Stream<S>) -> Result<Vec<u8>> {
    let inner = |stream: &mut Stream<S>| -> Result<Vec<u8>> {
        let size = stream.read_i32()?;
        if size < 0 {
            return Err(CndError::format(
                "parse_pvs",
                format!("negative section size {size}"),
            ));
        }
        stream.read_bytes(size as usize)
    };
    inner(stream).map_err(|e| e.in_section("parse_pvs", "PVS"))
}

pub fn write<S: Write + Seek>(stream: &mut Stream<S>, pvs: &[u8]) -> Result<()> {
    let inner = |stream: &mut Stream<S>| -> Result<()> {
        stream.write_i32(pvs.len() as i32)?;
        stream.write_all(pvs)
    };
    inner(stream).map_err(|e| e.in_section("write_pvs", "PVS"))
}
