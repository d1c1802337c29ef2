//! Transport abstraction for reading EDID blocks from a display.

use std::io;

use crate::raw::BLOCK_SIZE;

/// Base DDC address of the display's EDID ROM.
pub const DDC_ADDR: u16 = 0x50;
/// E-DDC segment pointer address, used for blocks beyond the first two.
pub const SEGMENT_ADDR: u16 = 0x30;

/// One EDID block read over an I2C-like bus.
///
/// Implementations address the display at [`DDC_ADDR`] with a one-byte
/// offset of `(block % 2) * 128`. For `block > 1` they must first write the
/// segment number `block / 2` to [`SEGMENT_ADDR`] in the same transaction.
/// Failures surface immediately; no retries are attempted here.
pub trait EdidBus {
    fn read_block(&mut self, block: usize, buf: &mut [u8; BLOCK_SIZE]) -> io::Result<()>;
}

impl<B: EdidBus + ?Sized> EdidBus for &mut B {
    fn read_block(&mut self, block: usize, buf: &mut [u8; BLOCK_SIZE]) -> io::Result<()> {
        (**self).read_block(block, buf)
    }
}
