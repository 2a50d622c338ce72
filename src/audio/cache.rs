use crate::{CndError, Result};
use tracing::warn;

/// Longest string the cache will store, terminator included.
pub const MAX_STRING_LEN: usize = 128;

const BLOCK_SIZE: usize = 0x40_0000; // 4 MiB

/// Byte arena backing the path, name and payload data of every sound in a
/// track. Offsets handed out by `append` stay valid for the life of the cache.
#[derive(Debug, Clone, Default)]
pub struct SoundCache {
    data: Vec<u8>,
    used: usize,
}

impl SoundCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an arena read from a container; the whole buffer counts as used.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let used = data.len();
        SoundCache { data, used }
    }

    /// The used-size watermark.
    pub fn size(&self) -> usize {
        self.used
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn bytes(&self, offset: usize, len: usize) -> Result<&[u8]> {
        if offset + len > self.used {
            return Err(CndError::Range {
                function: "SoundCache::bytes",
                offset,
                len,
                size: self.used,
            });
        }
        Ok(&self.data[offset..offset + len])
    }

    /// Null-terminated string at `offset`, capped at [`MAX_STRING_LEN`] bytes.
    pub fn cstring(&self, offset: usize) -> Result<&str> {
        if offset >= self.used {
            return Err(CndError::Range {
                function: "SoundCache::cstring",
                offset,
                len: 1,
                size: self.used,
            });
        }
        let end = (offset + MAX_STRING_LEN).min(self.used);
        let span = &self.data[offset..end];
        let len = span.iter().position(|&c| c == 0).unwrap_or(span.len());
        std::str::from_utf8(&span[..len])
            .map_err(|e| crate::StringError::NonUtf8(e).into())
    }

    /// Appends `len` bytes at the next 4-byte aligned offset, growing the
    /// buffer in 4 MiB blocks. `write` fills the pre-sized span and returns
    /// how many bytes it used, at most `len`. Returns the span's offset.
    pub fn append(&mut self, len: usize, write: impl FnOnce(&mut [u8]) -> usize) -> usize {
        self.align_used();
        let offset = self.used;
        if offset + len > self.data.len() {
            self.grow(offset + len - self.data.len());
        }
        let used = write(&mut self.data[offset..offset + len]);
        self.used += used.min(len);
        offset
    }

    pub fn append_bytes(&mut self, bytes: &[u8]) -> usize {
        self.append(bytes.len(), |out| {
            out.copy_from_slice(bytes);
            bytes.len()
        })
    }

    /// Appends a string, guaranteeing the stored bytes end with a terminator.
    /// Strings longer than the cap are truncated with a warning.
    pub fn append_string(&mut self, string: &str) -> usize {
        let mut len = string.len();
        if len > MAX_STRING_LEN {
            warn!(
                "sound cache: string of {len} bytes truncated to {} bytes",
                MAX_STRING_LEN
            );
            len = MAX_STRING_LEN;
        }
        let stored = if len < MAX_STRING_LEN { len + 1 } else { len };
        self.append(stored, |out| {
            out[..len].copy_from_slice(&string.as_bytes()[..len]);
            out[stored - 1] = 0;
            stored
        })
    }

    /// Releases capacity beyond the watermark.
    pub fn shrink(&mut self) {
        self.data.truncate(self.used);
        self.data.shrink_to_fit();
    }

    pub fn reset(&mut self) {
        self.used = 0;
    }

    fn align_used(&mut self) {
        while self.used & 3 != 0 {
            self.used += 1;
        }
    }

    fn grow(&mut self, needed: usize) {
        let mut new_size = self.data.len();
        while new_size < self.data.len() + needed {
            new_size += BLOCK_SIZE;
        }
        self.data.resize(new_size, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_are_aligned() {
        let mut cache = SoundCache::new();
        let first = cache.append_bytes(b"abc");
        let second = cache.append_bytes(b"defg");
        assert_eq!(first, 0);
        assert_eq!(second, 4);
        assert_eq!(cache.size(), 8);
        assert_eq!(cache.bytes(4, 4).unwrap(), b"defg");
    }

    #[test]
    fn grows_in_blocks() {
        let mut cache = SoundCache::new();
        cache.append_bytes(&[1u8; 16]);
        assert_eq!(cache.capacity(), BLOCK_SIZE);
        cache.append_bytes(&vec![2u8; BLOCK_SIZE]);
        assert_eq!(cache.capacity(), 2 * BLOCK_SIZE);
        cache.shrink();
        assert_eq!(cache.capacity(), cache.size());
    }

    #[test]
    fn strings_are_terminated_and_capped() {
        let mut cache = SoundCache::new();
        let offset = cache.append_string("sound\\ambient.wav");
        assert_eq!(cache.cstring(offset).unwrap(), "sound\\ambient.wav");

        let long = "x".repeat(200);
        let offset = cache.append_string(&long);
        let stored = cache.cstring(offset).unwrap();
        assert_eq!(stored.len(), MAX_STRING_LEN - 1);
    }

    #[test]
    fn out_of_range_access_fails() {
        let cache = SoundCache::from_bytes(vec![0; 8]);
        assert!(cache.bytes(4, 8).is_err());
        assert!(cache.cstring(8).is_err());
    }

    #[test]
    fn writer_can_use_fewer_bytes() {
        let mut cache = SoundCache::new();
        cache.append(16, |out| {
            out[..4].copy_from_slice(b"riff");
            4
        });
        assert_eq!(cache.size(), 4);
    }
}
