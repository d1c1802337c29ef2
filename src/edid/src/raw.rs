//! Owned raw EDID bytes: one base block plus extension blocks.

use crate::{EdidError, Result};

pub const BLOCK_SIZE: usize = 128;
pub const MAX_SIZE: usize = 32 * 1024;
pub const MAX_BLOCKS: usize = MAX_SIZE / BLOCK_SIZE;

/// Established timing bitmap, 3 bytes.
pub const ETB_OFFSET: usize = 35;
/// Standard timing identifiers, 8 slots of 2 bytes.
pub const STI_OFFSET: usize = 38;
/// Detailed timing / display descriptors, 4 slots of 18 bytes.
pub const DTD_OFFSET: usize = 54;
pub const DTD_SIZE: usize = 18;
/// Number of extension blocks following the base block.
pub const EXTENSION_FLAG_OFFSET: usize = 126;
pub const CHECKSUM_OFFSET: usize = 127;

pub const HEADER_MAGIC: [u8; 8] = [0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00];

/// An owned EDID image. The length is always a non-zero multiple of
/// [`BLOCK_SIZE`] and never exceeds [`MAX_SIZE`].
#[derive(Clone)]
pub struct RawEdid {
    buf: Vec<u8>,
}

impl RawEdid {
    /// A single zeroed base block.
    pub fn new() -> RawEdid {
        RawEdid {
            buf: vec![0; BLOCK_SIZE],
        }
    }

    /// Wraps a captured image. The slice must hold whole blocks.
    pub fn from_bytes(bytes: &[u8]) -> Result<RawEdid> {
        if bytes.is_empty() || bytes.len() % BLOCK_SIZE != 0 {
            return Err(EdidError::InvalidLength(bytes.len()));
        }
        if bytes.len() > MAX_SIZE {
            return Err(EdidError::BufferTooLarge(bytes.len()));
        }
        Ok(RawEdid {
            buf: bytes.to_vec(),
        })
    }

    pub fn push_block(&mut self, block: &[u8]) -> Result<()> {
        if block.len() != BLOCK_SIZE {
            return Err(EdidError::InvalidLength(block.len()));
        }
        if self.buf.len() + BLOCK_SIZE > MAX_SIZE {
            return Err(EdidError::BufferTooLarge(self.buf.len() + BLOCK_SIZE));
        }
        self.buf.extend_from_slice(block);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn block_count(&self) -> usize {
        self.buf.len() / BLOCK_SIZE
    }

    pub fn base(&self) -> &[u8] {
        &self.buf[..BLOCK_SIZE]
    }

    pub fn block(&self, idx: usize) -> Option<&[u8]> {
        let start = idx.checked_mul(BLOCK_SIZE)?;
        self.buf.get(start..start + BLOCK_SIZE)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl Default for RawEdid {
    fn default() -> RawEdid {
        RawEdid::new()
    }
}

/// Mod-256 sum of a whole block; a valid block sums to zero.
pub fn block_checksum(block: &[u8]) -> u8 {
    block.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_rejects_partial_blocks() {
        assert!(RawEdid::from_bytes(&[0; 127]).is_err());
        assert!(RawEdid::from_bytes(&[]).is_err());
        assert!(RawEdid::from_bytes(&[0; 256]).is_ok());
    }

    #[test]
    fn from_bytes_rejects_oversized_images() {
        assert!(RawEdid::from_bytes(&vec![0; MAX_SIZE]).is_ok());
        assert!(RawEdid::from_bytes(&vec![0; MAX_SIZE + BLOCK_SIZE]).is_err());
    }

    #[test]
    fn push_block_grows_by_whole_blocks() {
        let mut raw = RawEdid::new();
        raw.push_block(&[0xaa; BLOCK_SIZE]).unwrap();
        assert_eq!(raw.block_count(), 2);
        assert_eq!(raw.block(1).unwrap()[0], 0xaa);
        assert!(raw.push_block(&[0; 64]).is_err());
    }

    #[test]
    fn checksum_wraps() {
        let mut block = [0u8; BLOCK_SIZE];
        block[0] = 0xff;
        block[1] = 0x01;
        assert_eq!(block_checksum(&block), 0);
    }
}
