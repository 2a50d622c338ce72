//! Resource name list sections: AIClasses, Models, Sprites, AnimClasses,
//! SoundClasses and CogScripts are each a plain run of 64 byte names.

use crate::shared::{decode_name, encode_name};
use crate::stream::Stream;
use crate::Result;
use std::io::{Read, Seek, Write};

pub fn parse<S: Read + Seek>(
    stream: &mut Stream<S>,
    count: u32,
    section: &'static str,
) -> Result<Vec<String>> {
    let inner = |stream: &mut Stream<S>| -> Result<Vec<String>> {
        let names: Vec<[u8; 64]> = stream.read_pod_vec(count as usize)?;
        names.iter().map(decode_name).collect()
    };
    inner(stream).map_err(|e| e.in_section("parse_resource_list", section))
}

pub fn write<S: Write + Seek>(
    stream: &mut Stream<S>,
    names: &[String],
    section: &'static str,
) -> Result<()> {
    let inner = |stream: &mut Stream<S>| -> Result<()> {
        for name in names {
            stream.write_pod(&encode_name("write_resource_list", name)?)?;
        }
        Ok(())
    };
    inner(stream).map_err(|e| e.in_section("write_resource_list", section))
}
