pub mod cache;
pub mod indywv;
pub mod wav;

use crate::stream::Stream;
use crate::{CndError, Result};
pub use cache::SoundCache;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Read, Seek, Write};
use std::rc::{Rc, Weak};
use tracing::{debug, warn};
pub use wav::{SoundFormat, SoundInfo};

/// Sound descriptor. The actual bytes live in the owning track's cache; the
/// descriptor holds a weak handle plus offsets into the arena.
#[derive(Debug, Clone)]
pub struct Sound {
    pub(crate) handle: u32,
    pub(crate) idx: u32,
    pub(crate) sample_rate: u32,
    pub(crate) sample_bit_size: u32,
    pub(crate) num_channels: u32,
    pub(crate) compressed: bool,
    pub(crate) path_offset: usize,
    pub(crate) name_offset: usize,
    pub(crate) data_offset: usize,
    pub(crate) data_size: usize,
    pub(crate) cache: Weak<RefCell<SoundCache>>,
}

impl Sound {
    pub fn handle(&self) -> u32 {
        self.handle
    }

    pub fn idx(&self) -> u32 {
        self.idx
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn sample_bit_size(&self) -> u32 {
        self.sample_bit_size
    }

    pub fn num_channels(&self) -> u32 {
        self.num_channels
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn data_size(&self) -> usize {
        self.data_size
    }

    fn cache(&self) -> Result<Rc<RefCell<SoundCache>>> {
        self.cache
            .upgrade()
            .ok_or_else(|| CndError::logic("Sound::cache", "sound data cache has been released"))
    }

    /// File name of the sound, read from the cache arena.
    pub fn name(&self) -> Result<String> {
        let cache = self.cache()?;
        let cache = cache.borrow();
        Ok(cache.cstring(self.name_offset)?.to_owned())
    }

    /// Stored file path of the sound, e.g. `sound\bells.wav`.
    pub fn path(&self) -> Result<String> {
        let cache = self.cache()?;
        let cache = cache.borrow();
        Ok(cache.cstring(self.path_offset)?.to_owned())
    }

    pub fn is_valid(&self) -> bool {
        let Some(cache) = self.cache.upgrade() else {
            return false;
        };
        let size = cache.borrow().size();
        self.data_offset + self.data_size <= size
            && self.path_offset <= self.name_offset
            && self.name_offset < size
            && self.sample_rate > 0
            && self.sample_bit_size > 0
            && self.num_channels > 0
    }

    /// The uncompressed PCM payload; IndyWV data is decoded on the fly.
    pub fn data(&self) -> Result<Vec<u8>> {
        let cache = self.cache()?;
        let cache = cache.borrow();
        let raw = cache.bytes(self.data_offset, self.data_size)?;
        if self.compressed {
            let mut stream = Stream::from_bytes("indywv payload", raw.to_vec());
            indywv::inflate(&mut stream)
        } else {
            Ok(raw.to_vec())
        }
    }

    /// The stored payload bytes as-is, compressed or not.
    pub fn raw_data(&self) -> Result<Vec<u8>> {
        let cache = self.cache()?;
        let cache = cache.borrow();
        Ok(cache.bytes(self.data_offset, self.data_size)?.to_vec())
    }

    /// Writes the sound as a canonical WAV file, decoding as needed.
    pub fn write_wav<S: Write>(&self, stream: &mut Stream<S>) -> Result<()> {
        let data = self.data()?;
        wav::write_wav(
            stream,
            self.num_channels,
            self.sample_rate,
            self.sample_bit_size,
            &data,
        )
    }

    /// Writes the sound as an IndyWV file. The stored compressed bytes are
    /// passed through under a fresh header; no compressor exists, so an
    /// uncompressed sound cannot be written this way.
    pub fn write_wv<S: Write>(&self, stream: &mut Stream<S>) -> Result<()> {
        if !self.compressed {
            return Err(CndError::codec(
                "Sound::write_wv",
                "cannot write uncompressed sound as IndyWV",
            ));
        }
        let data = self.raw_data()?;
        indywv::write_header(
            stream,
            &indywv::WvHeader {
                sample_rate: self.sample_rate as i32,
                sample_bit_size: self.sample_bit_size as i32,
                num_channels: self.num_channels as i32,
                data_size: data.len() as i32,
            },
        )?;
        stream.write_all(&data)
    }
}

/// One track of a sound bank: an insertion-ordered sound table plus the
/// byte arena all of its sounds point into.
#[derive(Debug, Default)]
pub struct SoundBankTrack {
    sounds: Vec<Sound>,
    by_name: HashMap<String, usize>,
    pub(crate) cache: Rc<RefCell<SoundCache>>,
    /// Static resource tracks mark sound indices with the static bit on write.
    pub is_static: bool,
}

impl SoundBankTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sounds(&self) -> &[Sound] {
        &self.sounds
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Sound> {
        self.by_name.get(name).map(|&idx| &self.sounds[idx])
    }

    pub(crate) fn cache_handle(&self) -> Weak<RefCell<SoundCache>> {
        Rc::downgrade(&self.cache)
    }

    /// Replaces the backing arena, dropping all current sounds.
    pub(crate) fn reset_cache(&mut self, cache: SoundCache) {
        self.sounds.clear();
        self.by_name.clear();
        self.cache = Rc::new(RefCell::new(cache));
    }

    /// Registers a sound whose bytes are already in the cache. Validates the
    /// descriptor offsets against the arena watermark.
    pub(crate) fn add_sound(&mut self, sound: Sound) -> Result<&Sound> {
        let size = self.cache.borrow().size();
        if sound.path_offset > sound.name_offset || sound.name_offset >= size {
            return Err(CndError::Range {
                function: "SoundBankTrack::add_sound",
                offset: sound.name_offset,
                len: 1,
                size,
            });
        }
        if sound.data_offset + sound.data_size > size {
            return Err(CndError::Range {
                function: "SoundBankTrack::add_sound",
                offset: sound.data_offset,
                len: sound.data_size,
                size,
            });
        }

        let name = sound.name()?;
        if self.by_name.contains_key(&name) {
            warn!("sound bank track already contains sound '{name}', skipping");
            return Ok(&self.sounds[self.by_name[&name]]);
        }
        self.by_name.insert(name, self.sounds.len());
        self.sounds.push(sound);
        Ok(self.sounds.last().expect("just pushed"))
    }

    /// Ingests a standalone WAV or IndyWV file into the track. `file_name` is
    /// the bare file name; the stored path is prefixed with `sound\`.
    pub fn load_sound<S: Read + Seek>(
        &mut self,
        stream: &mut Stream<S>,
        file_name: &str,
    ) -> Result<&Sound> {
        let path = format!("sound\\{file_name}");
        let name_in_path = path
            .rfind(['\\', '/'])
            .map(|pos| pos + 1)
            .unwrap_or_default();

        if self.by_name.contains_key(&path[name_in_path..]) {
            let idx = self.by_name[&path[name_in_path..]];
            return Ok(&self.sounds[idx]);
        }

        let info = wav::parse_header(stream)?.ok_or_else(|| {
            CndError::format(
                "SoundBankTrack::load_sound",
                format!("'{file_name}' is not a WAV or IndyWV sound"),
            )
        })?;

        let payload = stream.read_bytes(info.data_size as usize)?;
        let (path_offset, data_offset) = {
            let mut cache = self.cache.borrow_mut();
            let path_offset = cache.append_string(&path);
            let data_offset = cache.append_bytes(&payload);
            (path_offset, data_offset)
        };

        let sound = Sound {
            handle: 0,
            idx: self.sounds.len() as u32,
            sample_rate: info.sample_rate,
            sample_bit_size: info.sample_bit_size,
            num_channels: info.num_channels,
            compressed: info.format == SoundFormat::IndyWv,
            path_offset,
            name_offset: path_offset + name_in_path,
            data_offset,
            data_size: payload.len(),
            cache: self.cache_handle(),
        };
        self.add_sound(sound)
    }
}

/// All sound tracks of a world plus the handle allocator shared between them.
#[derive(Debug)]
pub struct SoundBank {
    tracks: Vec<SoundBankTrack>,
    next_handle: u32,
}

impl SoundBank {
    pub fn new(num_tracks: usize) -> Self {
        SoundBank {
            tracks: (0..num_tracks).map(|_| SoundBankTrack::new()).collect(),
            next_handle: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.tracks.len()
    }

    pub fn track(&self, track: usize) -> Result<&SoundBankTrack> {
        self.tracks
            .get(track)
            .ok_or_else(|| CndError::logic("SoundBank::track", "track index out of range"))
    }

    pub fn track_mut(&mut self, track: usize) -> Result<&mut SoundBankTrack> {
        self.tracks
            .get_mut(track)
            .ok_or_else(|| CndError::logic("SoundBank::track_mut", "track index out of range"))
    }

    pub fn set_static_track(&mut self, track: usize, is_static: bool) -> Result<()> {
        self.track_mut(track)?.is_static = is_static;
        Ok(())
    }

    /// The persisted handle seed; serialized as the nonce word at the end of
    /// a sounds section.
    pub fn handle_seed(&self) -> u32 {
        self.next_handle
    }

    pub fn set_handle_seed(&mut self, seed: u32) {
        self.next_handle = seed;
    }

    fn alloc_handle(&mut self) -> u32 {
        let mut seed = self.next_handle;
        if seed & 1 != 0 {
            seed = (seed + 1) % 1_111_111;
        }
        self.next_handle = (seed + 1) % 1_111_111;
        seed + 1234
    }

    /// Loads a standalone sound file into a track and assigns it a handle.
    pub fn load_sound<S: Read + Seek>(
        &mut self,
        stream: &mut Stream<S>,
        file_name: &str,
        track: usize,
    ) -> Result<&Sound> {
        let handle = self.alloc_handle();
        let track = self.track_mut(track)?;
        let name = track.load_sound(stream, file_name)?.name()?;
        debug!("loaded sound '{name}' with handle {handle}");
        let idx = track.by_name[&name];
        track.sounds[idx].handle = handle;
        Ok(&track.sounds[idx])
    }
}

impl Default for SoundBank {
    fn default() -> Self {
        SoundBank::new(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_stream(pcm: &[u8]) -> Stream<std::io::Cursor<Vec<u8>>> {
        let mut stream = Stream::memory("bells.wav");
        wav::write_wav(&mut stream, 1, 22050, 16, pcm).unwrap();
        stream.seek(0).unwrap();
        stream
    }

    #[test]
    fn load_sound_stores_path_name_and_data() {
        let mut bank = SoundBank::new(1);
        let mut stream = wav_stream(&[1, 2, 3, 4]);
        bank.load_sound(&mut stream, "bells.wav", 0).unwrap();

        let sound = bank.track(0).unwrap().get("bells.wav").unwrap();
        assert_eq!(sound.path().unwrap(), "sound\\bells.wav");
        assert_eq!(sound.name().unwrap(), "bells.wav");
        assert_eq!(sound.data().unwrap(), vec![1, 2, 3, 4]);
        assert!(!sound.is_compressed());
        assert!(sound.is_valid());
    }

    #[test]
    fn handles_follow_the_seed_sequence() {
        let mut bank = SoundBank::new(1);
        assert_eq!(bank.alloc_handle(), 1234);
        assert_eq!(bank.alloc_handle(), 1236);
        assert_eq!(bank.handle_seed(), 3);
        bank.set_handle_seed(7);
        assert_eq!(bank.alloc_handle(), 1242); // odd seed rounds up to 8
    }

    #[test]
    fn dead_cache_reference_fails_cleanly() {
        let sound = {
            let mut track = SoundBankTrack::new();
            let mut stream = wav_stream(&[0, 0]);
            track.load_sound(&mut stream, "gone.wav").unwrap().clone()
        };
        assert!(!sound.is_valid());
        assert!(matches!(sound.data(), Err(CndError::Logic { .. })));
    }

    #[test]
    fn uncompressed_sound_cannot_be_written_as_wv() {
        let mut track = SoundBankTrack::new();
        let mut stream = wav_stream(&[0, 0]);
        let sound = track.load_sound(&mut stream, "flat.wav").unwrap().clone();
        let mut out = Stream::memory("flat.wv");
        assert!(matches!(
            sound.write_wv(&mut out),
            Err(CndError::Codec { .. })
        ));
    }
}
