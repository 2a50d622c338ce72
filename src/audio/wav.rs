use crate::audio::indywv;
use crate::stream::Stream;
use crate::Result;
use std::io::{Read, Seek, Write};

const RIFF_TAG: [u8; 4] = *b"RIFF";
const WAVE_TAG: [u8; 4] = *b"WAVE";
const FMT_TAG: [u8; 4] = *b"fmt ";
const DATA_TAG: [u8; 4] = *b"data";

const LPCM: u16 = 1;
const FMT_SIZE: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundFormat {
    Wav,
    IndyWv,
}

/// Parameters sniffed from a sound file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundInfo {
    pub format: SoundFormat,
    pub num_channels: u32,
    pub sample_rate: u32,
    pub sample_bit_size: u32,
    pub data_size: u32,
}

/// Sniffs a RIFF/LPCM or IndyWV header, leaving the cursor at the start of
/// the payload data. Returns `None` for unrecognized formats.
pub fn parse_header<S: Read + Seek>(stream: &mut Stream<S>) -> Result<Option<SoundInfo>> {
    let tag = stream.peek_array::<4>()?;
    if tag == RIFF_TAG {
        stream.advance(4)?;
        let _riff_size = stream.read_u32()?;
        if stream.read_array::<4>()? != WAVE_TAG || stream.read_array::<4>()? != FMT_TAG {
            return Ok(None);
        }
        let fmt_size = stream.read_u32()?;
        let audio_format = stream.read_u16()?;
        if fmt_size != FMT_SIZE || audio_format != LPCM {
            return Ok(None);
        }
        let num_channels = stream.read_u16()? as u32;
        let sample_rate = stream.read_u32()?;
        let _byte_rate = stream.read_u32()?;
        let _block_align = stream.read_u16()?;
        let sample_bit_size = stream.read_u16()? as u32;
        if stream.read_array::<4>()? != DATA_TAG {
            return Ok(None);
        }
        let data_size = stream.read_u32()?;
        return Ok(Some(SoundInfo {
            format: SoundFormat::Wav,
            num_channels,
            sample_rate,
            sample_bit_size,
            data_size,
        }));
    }

    if stream.peek_array::<6>()? == indywv::INDYWV_TAG {
        let header = indywv::read_header(stream)?;
        return Ok(Some(SoundInfo {
            format: SoundFormat::IndyWv,
            num_channels: header.num_channels as u32,
            sample_rate: header.sample_rate as u32,
            sample_bit_size: header.sample_bit_size as u32,
            data_size: header.data_size as u32,
        }));
    }

    Ok(None)
}

/// Writes a canonical RIFF/WAVE/fmt+data file around raw LPCM samples.
pub fn write_wav<S: Write>(
    stream: &mut Stream<S>,
    num_channels: u32,
    sample_rate: u32,
    sample_bit_size: u32,
    data: &[u8],
) -> Result<()> {
    let block_align = (num_channels * sample_bit_size / 8) as u16;
    stream.write_all(&RIFF_TAG)?;
    stream.write_u32(36 + data.len() as u32)?;
    stream.write_all(&WAVE_TAG)?;
    stream.write_all(&FMT_TAG)?;
    stream.write_u32(FMT_SIZE)?;
    stream.write_u16(LPCM)?;
    stream.write_u16(num_channels as u16)?;
    stream.write_u32(sample_rate)?;
    stream.write_u32(sample_rate * block_align as u32)?;
    stream.write_u16(block_align)?;
    stream.write_u16(sample_bit_size as u16)?;
    stream.write_all(&DATA_TAG)?;
    stream.write_u32(data.len() as u32)?;
    stream.write_all(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_write_then_sniff() {
        let pcm = [0u8, 1, 2, 3];
        let mut stream = Stream::memory("test.wav");
        write_wav(&mut stream, 1, 22050, 16, &pcm).unwrap();
        stream.seek(0).unwrap();
        let info = parse_header(&mut stream).unwrap().unwrap();
        assert_eq!(
            info,
            SoundInfo {
                format: SoundFormat::Wav,
                num_channels: 1,
                sample_rate: 22050,
                sample_bit_size: 16,
                data_size: 4,
            }
        );
        assert_eq!(stream.read_bytes(4).unwrap(), pcm);
    }

    #[test]
    fn unknown_format_is_none() {
        let mut stream = Stream::from_bytes("bogus", b"OggS\0\0\0\0\0\0\0\0".to_vec());
        assert_eq!(parse_header(&mut stream).unwrap(), None);
    }
}
