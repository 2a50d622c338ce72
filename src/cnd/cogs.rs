//! Cogs section: script instance bindings. The section stores the script
//! name of every instance plus one flat run of value strings; each instance
//! claims exactly as many values as its script has non-local, non-message
//! symbols.

use super::offsets;
use super::raw::CndHeader;
use crate::cog::{Cog, CogScriptTable};
use crate::shared::{decode_name, encode_name};
use crate::stream::Stream;
use crate::{CndError, Result};
use std::io::{Read, Seek, Write};

pub fn parse<S: Read + Seek>(
    stream: &mut Stream<S>,
    scripts: &CogScriptTable,
) -> Result<Vec<Cog>> {
    let inner = |stream: &mut Stream<S>| -> Result<Vec<Cog>> {
        let num_cogs = stream.read_u32()? as usize;
        let num_values = stream.read_u32()? as usize;

        let script_names: Vec<[u8; 64]> = stream.read_pod_vec(num_cogs)?;
        let value_fields: Vec<[u8; 64]> = stream.read_pod_vec(num_values)?;

        let mut values = value_fields.iter();
        let mut cogs = Vec::with_capacity(num_cogs);
        for name_field in &script_names {
            let script_name = decode_name(name_field)?;
            let script = scripts.get(&script_name).ok_or_else(|| {
                CndError::logic(
                    "parse_cogs",
                    format!("can't find cog script '{script_name}'"),
                )
            })?;

            let (flags, vtid) = {
                let mut script = script.borrow_mut();
                let vtid = script.next_vtable_id();
                (script.flags, vtid)
            };

            {
                let mut script = script.borrow_mut();
                for symbol in script.symbols.iter_mut().filter(|s| s.takes_value()) {
                    let value = values.next().ok_or_else(|| {
                        CndError::logic(
                            "parse_cogs",
                            format!("value list exhausted while binding '{script_name}'"),
                        )
                    })?;
                    symbol.vtable.insert(vtid, decode_name(value)?);
                }
            }

            cogs.push(Cog {
                id: cogs.len(),
                script: script.clone(),
                flags,
                vtid,
            });
        }

        if values.next().is_some() {
            return Err(CndError::logic(
                "parse_cogs",
                "incomplete initialization of cogs: unused values remain",
            ));
        }

        Ok(cogs)
    };
    inner(stream).map_err(|e| e.in_section("parse_cogs", "Cogs"))
}

/// Reads just the cogs out of a container.
pub fn read<S: Read + Seek>(
    stream: &mut Stream<S>,
    scripts: &CogScriptTable,
) -> Result<Vec<Cog>> {
    let header: CndHeader = super::read_header(stream)?;
    let offset = offsets::cogs(stream, &header)?;
    stream.seek(offset)?;
    parse(stream, scripts)
}

pub fn write<S: Write + Seek>(stream: &mut Stream<S>, cogs: &[Cog]) -> Result<()> {
    let inner = |stream: &mut Stream<S>| -> Result<()> {
        let mut values = Vec::new();
        for cog in cogs {
            values.extend(cog.values());
        }

        stream.write_u32(cogs.len() as u32)?;
        stream.write_u32(values.len() as u32)?;
        for cog in cogs {
            stream.write_pod(&encode_name("write_cogs", &cog.name())?)?;
        }
        for value in &values {
            stream.write_pod(&encode_name("write_cogs", value)?)?;
        }
        Ok(())
    };
    inner(stream).map_err(|e| e.in_section("write_cogs", "Cogs"))
}
