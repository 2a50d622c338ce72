use crate::{CndError, Result};
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use bytemuck::{Pod, Zeroable};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Random access byte stream with a name for error reporting.
///
/// All multi-byte values are little-endian, matching the on-disk formats.
#[derive(Debug)]
pub struct Stream<S> {
    name: String,
    inner: S,
}

pub type InputFileStream = Stream<BufReader<File>>;
pub type OutputFileStream = Stream<BufWriter<File>>;
pub type MemoryStream = Stream<Cursor<Vec<u8>>>;

impl Stream<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path).map_err(|source| CndError::Io {
            stream: name.clone(),
            source,
        })?;
        Ok(Stream {
            name,
            inner: BufReader::new(file),
        })
    }
}

impl Stream<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::create(path).map_err(|source| CndError::Io {
            stream: name.clone(),
            source,
        })?;
        Ok(Stream {
            name,
            inner: BufWriter::new(file),
        })
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(|source| self.io(source))
    }
}

impl Stream<Cursor<Vec<u8>>> {
    pub fn memory(name: impl Into<String>) -> Self {
        Stream::new(name, Cursor::new(Vec::new()))
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Stream::new(name, Cursor::new(bytes))
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.inner.into_inner()
    }

    pub fn bytes(&self) -> &[u8] {
        self.inner.get_ref()
    }
}

impl<S> Stream<S> {
    pub fn new(name: impl Into<String>, inner: S) -> Self {
        Stream {
            name: name.into(),
            inner,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn io(&self, source: io::Error) -> CndError {
        CndError::Io {
            stream: self.name.clone(),
            source,
        }
    }
}

impl<S: Seek> Stream<S> {
    pub fn tell(&mut self) -> Result<u64> {
        self.inner.stream_position().map_err(|e| self.io(e))
    }

    /// Absolute seek from the start of the stream.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        self.inner
            .seek(SeekFrom::Start(offset))
            .map(drop)
            .map_err(|e| self.io(e))
    }

    pub fn advance(&mut self, count: u64) -> Result<()> {
        self.inner
            .seek(SeekFrom::Current(count as i64))
            .map(drop)
            .map_err(|e| self.io(e))
    }

    pub fn size(&mut self) -> Result<u64> {
        let current = self.tell()?;
        let end = self.inner.seek(SeekFrom::End(0)).map_err(|e| self.io(e))?;
        self.seek(current)?;
        Ok(end)
    }
}

impl<S: Read> Stream<S> {
    /// Fills the whole buffer, reporting how far it got on a truncated stream.
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut done = 0;
        while done < buf.len() {
            match self.inner.read(&mut buf[done..]) {
                Ok(0) => {
                    return Err(CndError::ShortRead {
                        stream: self.name.clone(),
                        expected: buf.len() as u64,
                        actual: done as u64,
                    })
                }
                Ok(n) => done += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.io(e)),
            }
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.inner.read_u8().map_err(|e| self.io(e))
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.inner.read_i8().map_err(|e| self.io(e))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.inner.read_u16::<LE>().map_err(|e| self.io(e))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.inner.read_i16::<LE>().map_err(|e| self.io(e))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.inner.read_u32::<LE>().map_err(|e| self.io(e))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.inner.read_i32::<LE>().map_err(|e| self.io(e))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.inner.read_f32::<LE>().map_err(|e| self.io(e))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// Reads one trivially copyable record as a single bulk transfer.
    pub fn read_pod<T: Pod>(&mut self) -> Result<T> {
        let mut value = T::zeroed();
        self.fill(bytemuck::bytes_of_mut(&mut value))?;
        Ok(value)
    }

    /// Reads `count` trivially copyable records as a single bulk transfer.
    pub fn read_pod_vec<T: Pod>(&mut self, count: usize) -> Result<Vec<T>> {
        let mut items = vec![T::zeroed(); count];
        self.fill(bytemuck::cast_slice_mut(&mut items))?;
        Ok(items)
    }
}

impl<S: Read + Seek> Stream<S> {
    /// Reads without advancing by snapshotting and restoring the cursor.
    pub fn peek_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let position = self.tell()?;
        let result = self.read_array::<N>();
        self.seek(position)?;
        result
    }
}

impl<S: Write> Stream<S> {
    pub fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let mut done = 0;
        while done < buf.len() {
            match self.inner.write(&buf[done..]) {
                Ok(0) => {
                    return Err(CndError::ShortWrite {
                        stream: self.name.clone(),
                        expected: buf.len() as u64,
                        actual: done as u64,
                    })
                }
                Ok(n) => done += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.io(e)),
            }
        }
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.inner.write_u8(value).map_err(|e| self.io(e))
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.inner.write_u16::<LE>(value).map_err(|e| self.io(e))
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.inner.write_i16::<LE>(value).map_err(|e| self.io(e))
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.inner.write_u32::<LE>(value).map_err(|e| self.io(e))
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.inner.write_i32::<LE>(value).map_err(|e| self.io(e))
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.inner.write_f32::<LE>(value).map_err(|e| self.io(e))
    }

    pub fn write_pod<T: Pod>(&mut self, value: &T) -> Result<()> {
        self.write_all(bytemuck::bytes_of(value))
    }

    pub fn write_pod_slice<T: Pod>(&mut self, items: &[T]) -> Result<()> {
        self.write_all(bytemuck::cast_slice(items))
    }
}

/// Copies bytes `[from, to)` of `src` into `dst` at its current position.
pub fn copy_range<R: Read + Seek, W: Write>(
    src: &mut Stream<R>,
    dst: &mut Stream<W>,
    from: u64,
    to: u64,
) -> Result<()> {
    src.seek(from)?;
    let mut buf = vec![0u8; 64 * 1024];
    let mut remaining = to.saturating_sub(from);
    while remaining > 0 {
        let chunk = remaining.min(buf.len() as u64) as usize;
        src.fill(&mut buf[..chunk])?;
        dst.write_all(&buf[..chunk])?;
        remaining -= chunk as u64;
    }
    Ok(())
}

/// Runs `body` and restores the stream cursor afterwards, pass or fail.
pub(crate) fn preserving<S: Seek, T>(
    stream: &mut Stream<S>,
    body: impl FnOnce(&mut Stream<S>) -> Result<T>,
) -> Result<T> {
    let saved = stream.tell()?;
    let result = body(stream);
    stream.seek(saved)?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_round_trip() {
        let mut stream = Stream::memory("test");
        stream.write_u32(0xdead_beef).unwrap();
        stream.write_i32(-7).unwrap();
        stream.write_f32(0.25).unwrap();
        stream.seek(0).unwrap();
        assert_eq!(stream.read_u32().unwrap(), 0xdead_beef);
        assert_eq!(stream.read_i32().unwrap(), -7);
        assert_eq!(stream.read_f32().unwrap(), 0.25);
    }

    #[test]
    fn short_read_reports_counts() {
        let mut stream = Stream::from_bytes("short", vec![1, 2, 3]);
        match stream.read_bytes(8) {
            Err(CndError::ShortRead {
                stream,
                expected,
                actual,
            }) => {
                assert_eq!(stream, "short");
                assert_eq!(expected, 8);
                assert_eq!(actual, 3);
            }
            other => panic!("expected short read, got {other:?}"),
        }
    }

    #[test]
    fn peek_restores_cursor() {
        let mut stream = Stream::from_bytes("peek", b"GOB \x14\x00\x00\x00".to_vec());
        assert_eq!(&stream.peek_array::<4>().unwrap(), b"GOB ");
        assert_eq!(stream.tell().unwrap(), 0);
        assert_eq!(&stream.read_array::<4>().unwrap(), b"GOB ");
    }

    #[test]
    fn copy_range_copies_exact_window() {
        let mut src = Stream::from_bytes("src", (0u8..64).collect());
        let mut dst = Stream::memory("dst");
        copy_range(&mut src, &mut dst, 8, 24).unwrap();
        assert_eq!(dst.bytes(), &(8u8..24).collect::<Vec<_>>()[..]);
    }
}
