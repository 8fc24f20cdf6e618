//! Bounds-checked big-endian cursor over an untrusted byte buffer

use byteorder::{BigEndian, ByteOrder};

use crate::error::{ClassFormatError, Result};

/// Forward-only reader. Every read checks the remaining length before
/// touching the buffer and reports the failing offset otherwise.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Start reading at `offset`. Positions past the end are allowed; the
    /// first read from them fails.
    pub fn at(data: &'a [u8], offset: usize) -> Self {
        Self { data, pos: offset }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(ClassFormatError::UnexpectedEof {
                offset: self.pos,
                needed: len,
                len: self.data.len(),
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.bytes(len).map(|_| ())
    }

    pub fn u1(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    pub fn u2(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.bytes(2)?))
    }

    pub fn u4(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.bytes(4)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_big_endian() {
        let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x34, 0x01];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.u4().unwrap(), 0xCAFE_BABE);
        assert_eq!(reader.u2().unwrap(), 52);
        assert_eq!(reader.u1().unwrap(), 1);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_short_read_does_not_advance() {
        let data = [0x00, 0x01, 0x02];
        let mut reader = ByteReader::new(&data);
        reader.skip(2).unwrap();

        let err = reader.u2().unwrap_err();
        assert_eq!(
            err,
            ClassFormatError::UnexpectedEof {
                offset: 2,
                needed: 2,
                len: 3
            }
        );
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_huge_length_does_not_overflow() {
        let data = [0u8; 4];
        let mut reader = ByteReader::at(&data, 3);
        assert!(reader.bytes(usize::MAX).is_err());
    }

    #[test]
    fn test_start_past_end() {
        let data = [0u8; 4];
        let mut reader = ByteReader::at(&data, 10);
        assert_eq!(reader.remaining(), 0);
        assert!(reader.u1().is_err());
    }
}
