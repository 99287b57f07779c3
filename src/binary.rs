use std::io::{self, BufReader, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};
use serde::Serialize;

use crate::error::{FcvError, Result};

/// Byte order of every multi-byte field in one file.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Endian {
    Little,
    Big,
}

/// Slice decoding for fields already pulled out of a buffer.
impl Endian {
    pub fn read_u16(self, buf: &[u8]) -> u16 {
        match self {
            Endian::Little => LittleEndian::read_u16(buf),
            Endian::Big => BigEndian::read_u16(buf),
        }
    }

    pub fn read_i16(self, buf: &[u8]) -> i16 {
        match self {
            Endian::Little => LittleEndian::read_i16(buf),
            Endian::Big => BigEndian::read_i16(buf),
        }
    }

    pub fn read_f32(self, buf: &[u8]) -> f32 {
        match self {
            Endian::Little => LittleEndian::read_f32(buf),
            Endian::Big => BigEndian::read_f32(buf),
        }
    }
}

pub struct BinaryReader<R: Read + Seek> {
    inner: BufReader<R>,
    endian: Endian,
}

impl<R: Read + Seek> BinaryReader<R> {
    pub fn new(reader: R, endian: Endian) -> Self {
        Self {
            inner: BufReader::new(reader),
            endian,
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Runs a fixed-size read, turning end-of-stream into `TruncatedInput` at the starting offset.
    fn fixed<T>(
        &mut self,
        needed: usize,
        context: &'static str,
        read: impl FnOnce(&mut BufReader<R>) -> io::Result<T>,
    ) -> Result<T> {
        let offset = self.inner.stream_position()?;
        read(&mut self.inner).map_err(|err| match err.kind() {
            io::ErrorKind::UnexpectedEof => FcvError::TruncatedInput {
                offset,
                needed,
                context,
            },
            _ => FcvError::Io(err),
        })
    }

    pub fn read_exact<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N]> {
        self.fixed(N, context, |r| {
            let mut buf = [0u8; N];
            r.read_exact(&mut buf)?;
            Ok(buf)
        })
    }

    pub fn read_u8(&mut self, context: &'static str) -> Result<u8> {
        self.fixed(1, context, |r| r.read_u8())
    }

    pub fn read_u16(&mut self, context: &'static str) -> Result<u16> {
        self.read_u16_with(self.endian, context)
    }

    pub fn read_u16_with(&mut self, endian: Endian, context: &'static str) -> Result<u16> {
        self.fixed(2, context, |r| match endian {
            Endian::Little => r.read_u16::<LittleEndian>(),
            Endian::Big => r.read_u16::<BigEndian>(),
        })
    }

    pub fn read_u32(&mut self, context: &'static str) -> Result<u32> {
        self.read_u32_with(self.endian, context)
    }

    pub fn read_u32_with(&mut self, endian: Endian, context: &'static str) -> Result<u32> {
        self.fixed(4, context, |r| match endian {
            Endian::Little => r.read_u32::<LittleEndian>(),
            Endian::Big => r.read_u32::<BigEndian>(),
        })
    }

    pub fn read_vec(&mut self, len: usize, context: &'static str) -> Result<Vec<u8>> {
        self.fixed(len, context, |r| {
            let mut buf = vec![0u8; len];
            r.read_exact(&mut buf)?;
            Ok(buf)
        })
    }

    /// Reads at most `len` bytes; a short stream yields a short buffer instead of an error.
    pub fn read_up_to(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(len);
        (&mut self.inner).take(len as u64).read_to_end(&mut buf)?;
        Ok(buf)
    }

    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        Ok(self.inner.seek(pos)?)
    }

    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Total length of the underlying stream; the cursor is left where it was.
    pub fn stream_len(&mut self) -> Result<u64> {
        let current = self.inner.stream_position()?;
        let len = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(current))?;
        Ok(len)
    }
}

/// Builds FCV byte streams for tests.
#[cfg(test)]
pub(crate) struct BinaryWriter {
    inner: Vec<u8>,
    endian: Endian,
}

#[cfg(test)]
impl BinaryWriter {
    pub fn new(endian: Endian) -> Self {
        Self {
            inner: Vec::new(),
            endian,
        }
    }

    pub fn position(&self) -> usize {
        self.inner.len()
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.inner.push(value);
        self
    }

    pub fn write_u16(&mut self, value: u16) -> &mut Self {
        let bytes = match self.endian {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => value.to_be_bytes(),
        };
        self.write_vec(&bytes)
    }

    pub fn write_i16(&mut self, value: i16) -> &mut Self {
        self.write_u16(value as u16)
    }

    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        let bytes = match self.endian {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => value.to_be_bytes(),
        };
        self.write_vec(&bytes)
    }

    pub fn write_f32(&mut self, value: f32) -> &mut Self {
        self.write_u32(value.to_bits())
    }

    pub fn write_vec(&mut self, data: &[u8]) -> &mut Self {
        self.inner.extend_from_slice(data);
        self
    }

    /// Overwrites a u32 already written at `at`.
    pub fn patch_u32(&mut self, at: usize, value: u32) -> &mut Self {
        let bytes = match self.endian {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => value.to_be_bytes(),
        };
        self.inner[at..at + 4].copy_from_slice(&bytes);
        self
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_reads_follow_endian() {
        let bytes = vec![0x01, 0x02, 0x03, 0x04, 0x01, 0x02];
        let mut br = BinaryReader::new(Cursor::new(bytes), Endian::Big);
        assert_eq!(br.read_u32("test").unwrap(), 0x0102_0304);
        assert_eq!(br.read_u16_with(Endian::Little, "test").unwrap(), 0x0201);
    }

    #[test]
    fn test_truncated_fixed_read_reports_offset() {
        let mut br = BinaryReader::new(Cursor::new(vec![0u8; 3]), Endian::Little);
        br.read_u16("first").unwrap();
        match br.read_u32("second") {
            Err(FcvError::TruncatedInput {
                offset,
                needed,
                context,
            }) => {
                assert_eq!(offset, 2);
                assert_eq!(needed, 4);
                assert_eq!(context, "second");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_read_up_to_tolerates_short_stream() {
        let mut br = BinaryReader::new(Cursor::new(vec![9u8; 5]), Endian::Little);
        assert_eq!(br.read_up_to(8).unwrap().len(), 5);
        assert!(br.read_up_to(8).unwrap().is_empty());
    }

    #[test]
    fn test_stream_len_keeps_position() {
        let mut br = BinaryReader::new(Cursor::new(vec![0u8; 10]), Endian::Little);
        br.read_u8("test").unwrap();
        assert_eq!(br.stream_len().unwrap(), 10);
        assert_eq!(br.position().unwrap(), 1);
    }
}
