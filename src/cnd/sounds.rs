//! Sounds section: a serialized sound bank track.
//!
//! Layout: `u32 numSounds`, `u32 dataSize`, `numSounds` 48 byte sound
//! headers, `dataSize` bytes of cache arena, trailing `u32` handle nonce.

use super::offsets;
use super::raw::SoundHeader;
use crate::audio::{Sound, SoundBank, SoundCache};
use crate::stream::Stream;
use crate::Result;
use std::io::{Read, Seek, Write};

/// Engine marker for sounds owned by the static resource container.
const STATIC_RESOURCE_BIT: u32 = 0x8000;

/// Parses the section into a bank track and returns the handle nonce.
pub fn parse<S: Read + Seek>(
    stream: &mut Stream<S>,
    bank: &mut SoundBank,
    track_idx: usize,
) -> Result<u32> {
    let mut inner = |stream: &mut Stream<S>| -> Result<u32> {
        if stream.tell()? != offsets::sounds() {
            stream.seek(offsets::sounds())?;
        }

        let num_sounds = stream.read_u32()? as usize;
        let data_size = stream.read_u32()? as usize;

        let headers: Vec<SoundHeader> = stream.read_pod_vec(num_sounds)?;
        let arena = stream.read_bytes(data_size)?;

        let track = bank.track_mut(track_idx)?;
        track.reset_cache(SoundCache::from_bytes(arena));
        let cache = track.cache_handle();

        for header in headers {
            track.add_sound(Sound {
                handle: header.handle,
                idx: header.idx,
                sample_rate: header.sample_rate,
                sample_bit_size: header.sample_bit_size,
                num_channels: header.num_channels,
                compressed: header.compressed != 0,
                path_offset: header.path_offset as usize,
                name_offset: header.name_offset as usize,
                data_offset: header.data_offset as usize,
                data_size: header.data_size as usize,
                cache: cache.clone(),
            })?;
        }

        stream.read_u32()
    };
    inner(stream).map_err(|e| e.in_section("parse_sounds", "Sounds"))
}

/// Seeks to the section and parses it, restoring nothing; convenience for
/// reading just the sounds out of a container.
pub fn read<S: Read + Seek>(
    stream: &mut Stream<S>,
    bank: &mut SoundBank,
    track_idx: usize,
) -> Result<u32> {
    super::read_header(stream)?;
    stream.seek(offsets::sounds())?;
    parse(stream, bank, track_idx)
}

pub fn write<S: Write + Seek>(
    stream: &mut Stream<S>,
    bank: &SoundBank,
    track_idx: usize,
) -> Result<()> {
    let inner = |stream: &mut Stream<S>| -> Result<()> {
        let track = bank.track(track_idx)?;

        let headers: Vec<SoundHeader> = track
            .sounds()
            .iter()
            .map(|sound| {
                let mut idx = sound.idx();
                if track.is_static {
                    idx |= STATIC_RESOURCE_BIT;
                }
                SoundHeader {
                    handle: sound.handle(),
                    bank_idx: track_idx as u32,
                    path_offset: sound.path_offset as u32,
                    name_offset: sound.name_offset as u32,
                    data_offset: sound.data_offset as u32,
                    lip_sync_data: 0,
                    sample_rate: sound.sample_rate(),
                    sample_bit_size: sound.sample_bit_size(),
                    num_channels: sound.num_channels(),
                    data_size: sound.data_size() as u32,
                    compressed: sound.is_compressed() as u32,
                    idx,
                }
            })
            .collect();

        let cache = track.cache.borrow();
        stream.write_u32(headers.len() as u32)?;
        stream.write_u32(cache.size() as u32)?;
        stream.write_pod_slice(&headers)?;
        stream.write_all(cache.bytes(0, cache.size())?)?;
        stream.write_u32(bank.handle_seed())
    };
    inner(stream).map_err(|e| e.in_section("write_sounds", "Sounds"))
}
