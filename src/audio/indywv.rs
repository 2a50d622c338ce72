use crate::stream::Stream;
use crate::{CndError, Result};
use std::io::{Read, Seek, Write};

pub const INDYWV_TAG: [u8; 6] = *b"INDYWV";
pub const WVSM_TAG: [u8; 4] = *b"WVSM";

/// Size of the file header preceding the compressed stream: tag, four
/// parameter words and a reserved word, packed to 26 bytes.
pub const HEADER_SIZE: u64 = 26;

const FRAME_SIZE: usize = 4096;

/// Parameters carried by the 26 byte IndyWV file header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WvHeader {
    pub sample_rate: i32,
    pub sample_bit_size: i32,
    pub num_channels: i32,
    pub data_size: i32,
}

pub fn read_header<S: Read + Seek>(stream: &mut Stream<S>) -> Result<WvHeader> {
    let tag = stream.read_array::<6>()?;
    if tag != INDYWV_TAG {
        return Err(CndError::codec(
            "indywv::read_header",
            format!("bad tag {:?}, expected \"INDYWV\"", tag),
        ));
    }
    let header = WvHeader {
        sample_rate: stream.read_i32()?,
        sample_bit_size: stream.read_i32()?,
        num_channels: stream.read_i32()?,
        data_size: stream.read_i32()?,
    };
    stream.read_i32()?; // reserved
    Ok(header)
}

pub fn write_header<S: Write>(stream: &mut Stream<S>, header: &WvHeader) -> Result<()> {
    stream.write_all(&INDYWV_TAG)?;
    stream.write_i32(header.sample_rate)?;
    stream.write_i32(header.sample_bit_size)?;
    stream.write_i32(header.num_channels)?;
    stream.write_i32(header.data_size)?;
    stream.write_i32(0)
}

fn swap16(value: i16) -> i16 {
    value.swap_bytes()
}

/// Decodes a compressed IndyWV stream positioned just past the file header
/// into little-endian 16-bit PCM.
///
/// Only the mode-2 "WVSM" 16-bit sample stream is understood; any other
/// parameter combination is a decode error.
pub fn inflate<S: Read + Seek>(stream: &mut Stream<S>) -> Result<Vec<u8>> {
    let inflated_size = stream.read_u32()? as usize;
    let u1 = stream.read_i8()?;
    let u2 = swap16(stream.read_i16()?);

    let mode2 = u1 < 0;

    let (u3, u4) = if mode2 {
        (stream.read_u8()?, swap16(stream.read_i16()?))
    } else {
        (0, 0)
    };

    if !(mode2 && u2 == 0x1111 && u3 == 0x64 && u4 == 0x2222) {
        return Err(CndError::codec(
            "indywv::inflate",
            "unknown compression mode",
        ));
    }
    let tag = stream.read_array::<4>()?;
    if tag != WVSM_TAG {
        return Err(CndError::codec(
            "indywv::inflate",
            "unknown compression mode",
        ));
    }

    let mut data = Vec::with_capacity(inflated_size);
    for _ in 0..inflated_size / FRAME_SIZE {
        inflate_frame16(stream, FRAME_SIZE, &mut data)?;
    }
    // Remaining samples, shorter than one frame.
    inflate_frame16(stream, inflated_size % FRAME_SIZE, &mut data)?;

    Ok(data)
}

fn inflate_frame16<S: Read + Seek>(
    stream: &mut Stream<S>,
    frame_size: usize,
    dest: &mut Vec<u8>,
) -> Result<()> {
    let samples = frame_size / 2;
    if samples == 0 {
        return Ok(());
    }

    let _ = stream.read_u16()?;
    let expander = stream.read_u8()?;
    let expander_lo = (expander & 0xf) as u32;
    let expander_hi = (expander >> 4) as u32;

    let mut next_sample = |expander: u32| -> Result<i16> {
        let value = stream.read_u8()?;
        if value == 0x80 {
            Ok(swap16(stream.read_i16()?))
        } else {
            Ok(((value as i8) as i16) << expander)
        }
    };

    let mut index = 0;
    while index < samples {
        dest.extend_from_slice(&next_sample(expander_hi)?.to_le_bytes());
        if index + 1 >= samples {
            break;
        }
        dest.extend_from_slice(&next_sample(expander_lo)?.to_le_bytes());
        index += 2;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::Stream;

    fn mode2_payload(inflated_size: u32, frames: &[u8]) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(&inflated_size.to_le_bytes());
        payload.push(0x80); // negative marker selects mode 2
        payload.extend_from_slice(&0x1111u16.to_be_bytes());
        payload.push(0x64);
        payload.extend_from_slice(&0x2222u16.to_be_bytes());
        payload.extend_from_slice(b"WVSM");
        payload.extend_from_slice(frames);
        payload
    }

    #[test]
    fn decodes_expanded_and_escaped_samples() {
        // One short frame of four samples: expander byte 0x31 gives shifts
        // of 3 (high) and 1 (low) in alternation.
        let frame = [
            0x00, 0x00, // ignored frame word
            0x31, // sample expander
            0x02, // 2 << 3 = 16
            0x03, // 3 << 1 = 6
            0x80, 0x12, 0x34, // escape: big-endian 0x1234
            0xff, // -1 << 1 = -2
        ];
        let payload = mode2_payload(8, &frame);
        let mut stream = Stream::from_bytes("wv", payload);
        let pcm = inflate(&mut stream).unwrap();

        let samples: Vec<i16> = pcm
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(samples, vec![16, 6, 0x1234, -2]);
    }

    #[test]
    fn rejects_unknown_mode() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&8u32.to_le_bytes());
        payload.push(0x01); // positive marker: mode 1
        payload.extend_from_slice(&0x1111u16.to_be_bytes());
        let mut stream = Stream::from_bytes("wv", payload);
        match inflate(&mut stream) {
            Err(CndError::Codec { function, .. }) => assert_eq!(function, "indywv::inflate"),
            other => panic!("expected codec error, got {other:?}"),
        }
    }

    #[test]
    fn header_round_trip() {
        let header = WvHeader {
            sample_rate: 22050,
            sample_bit_size: 16,
            num_channels: 1,
            data_size: 1024,
        };
        let mut stream = Stream::memory("wv");
        write_header(&mut stream, &header).unwrap();
        assert_eq!(stream.tell().unwrap(), HEADER_SIZE);
        stream.seek(0).unwrap();
        assert_eq!(read_header(&mut stream).unwrap(), header);
    }
}
