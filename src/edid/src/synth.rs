//! Builds a synthetic EDID base block for bring-up, testing and for feeding
//! the mode-database editor when no real monitor is attached.
//!
//! Only what the rest of the stack consumes is populated: header and
//! identity, screen size, one detailed timing descriptor for the given mode,
//! a product name descriptor and the checksum. The standard timing table is
//! pre-filled with the free-slot sentinel so the editor can claim slots.

use crate::modes::{ModeFlags, VideoMode};
use crate::raw::{self, RawEdid, BLOCK_SIZE, DTD_OFFSET, DTD_SIZE, STI_OFFSET};

const DEFAULT_NAME: &str = "SYNTHETIC";
const MANUFACTURER: &[u8; 3] = b"CPL";
const MANUFACTURE_YEAR: u32 = 2011;
const MANUFACTURE_WEEK: u8 = 30;

pub struct SynthEdid {
    mode: VideoMode,
    width_mm: u16,
    height_mm: u16,
    name: String,
}

impl SynthEdid {
    pub fn new(mode: VideoMode, width_mm: u16, height_mm: u16) -> SynthEdid {
        SynthEdid {
            mode,
            width_mm,
            height_mm,
            name: DEFAULT_NAME.to_string(),
        }
    }

    /// Monitor name for the product name descriptor; truncated to the
    /// 13 bytes the descriptor holds.
    pub fn monitor_name(mut self, name: &str) -> SynthEdid {
        self.name = name.to_string();
        self
    }

    pub fn build(&self) -> RawEdid {
        let mut block = [0u8; BLOCK_SIZE];

        self.populate_header(&mut block);
        // EDID version 1.3.
        block[18] = 1;
        block[19] = 3;
        block[21] = (self.width_mm / 10) as u8;
        block[22] = (self.height_mm / 10) as u8;

        // Every standard timing slot starts out free.
        for b in &mut block[STI_OFFSET..STI_OFFSET + 16] {
            *b = 1;
        }

        let dtd = Self::encode_detailed_timing(&self.mode);
        block[DTD_OFFSET..DTD_OFFSET + DTD_SIZE].copy_from_slice(&dtd);
        self.populate_name_descriptor(&mut block[72..90]);

        let sum = raw::block_checksum(&block[..BLOCK_SIZE - 1]);
        block[BLOCK_SIZE - 1] = sum.wrapping_neg();

        RawEdid::from_bytes(&block).expect("one block always fits")
    }

    fn populate_header(&self, block: &mut [u8]) {
        block[..8].copy_from_slice(&raw::HEADER_MAGIC);

        // 00001 -> A, 00010 -> B, etc., three letters in 15 bits.
        let manufacturer_id: u16 = MANUFACTURER
            .iter()
            .map(|c| (c - b'A' + 1) & 0x1f)
            .fold(0u16, |packed, five| (packed << 5) | u16::from(five));
        block[8..10].copy_from_slice(&manufacturer_id.to_be_bytes());

        block[10..12].copy_from_slice(&1u16.to_le_bytes()); // product code
        block[12..16].copy_from_slice(&1u32.to_le_bytes()); // serial
        block[16] = MANUFACTURE_WEEK;
        block[17] = (MANUFACTURE_YEAR - 1990) as u8;
    }

    fn populate_name_descriptor(&self, desc: &mut [u8]) {
        desc[..5].copy_from_slice(&[0x00, 0x00, 0x00, 0xfc, 0x00]);
        let name = self.name.as_bytes();
        let len = name.len().min(13);
        desc[5..5 + len].copy_from_slice(&name[..len]);
        // Terminate and pad, per the descriptor format.
        for (i, b) in desc[5 + len..18].iter_mut().enumerate() {
            *b = if i == 0 { 0x0a } else { 0x20 };
        }
    }

    /// Encodes one 18-byte detailed timing descriptor.
    pub fn encode_detailed_timing(mode: &VideoMode) -> [u8; DTD_SIZE] {
        let mut dtd = [0u8; DTD_SIZE];

        let hblank = mode.right_margin + mode.hsync_len + mode.left_margin;
        let vblank = mode.lower_margin + mode.vsync_len + mode.upper_margin;

        // Pixel clock in 10 kHz steps.
        let clock = (mode.pixclock_khz / 10) as u16;
        dtd[0..2].copy_from_slice(&clock.to_le_bytes());

        dtd[2] = (mode.xres & 0xff) as u8;
        dtd[3] = (hblank & 0xff) as u8;
        dtd[4] = (((mode.xres >> 8) & 0x0f) << 4) as u8 | ((hblank >> 8) & 0x0f) as u8;

        dtd[5] = (mode.yres & 0xff) as u8;
        dtd[6] = (vblank & 0xff) as u8;
        dtd[7] = (((mode.yres >> 8) & 0x0f) << 4) as u8 | ((vblank >> 8) & 0x0f) as u8;

        dtd[8] = (mode.right_margin & 0xff) as u8;
        dtd[9] = (mode.hsync_len & 0xff) as u8;
        dtd[10] = (((mode.lower_margin & 0x0f) << 4) | (mode.vsync_len & 0x0f)) as u8;
        dtd[11] = (((mode.right_margin >> 8) & 0x3) << 6) as u8
            | (((mode.hsync_len >> 8) & 0x3) << 4) as u8
            | (((mode.lower_margin >> 4) & 0x3) << 2) as u8
            | ((mode.vsync_len >> 4) & 0x3) as u8;

        // Screen size bytes 12..15 stay zero: the base block carries the
        // size, and the parser does not read the per-mode copy.

        // Digital separate sync plus polarity and interlace bits.
        dtd[17] = 0x18;
        if mode.flags.contains(ModeFlags::HSYNC_HIGH) {
            dtd[17] |= 0x02;
        }
        if mode.flags.contains(ModeFlags::VSYNC_HIGH) {
            dtd[17] |= 0x04;
        }
        if mode.flags.contains(ModeFlags::INTERLACED) {
            dtd[17] |= 0x80;
        }

        dtd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn mode_1080p60() -> VideoMode {
        let mut mode = VideoMode {
            xres: 1920,
            yres: 1080,
            pixclock_khz: 148500,
            hsync_len: 44,
            vsync_len: 5,
            left_margin: 148,
            right_margin: 88,
            upper_margin: 36,
            lower_margin: 4,
            refresh: 0,
            flags: ModeFlags::SYNC_HIGH,
        };
        mode.update_refresh();
        mode
    }

    #[test]
    fn built_block_validates() {
        let raw = SynthEdid::new(mode_1080p60(), 510, 287).build();
        let block = raw.base();
        assert_eq!(block[..8], raw::HEADER_MAGIC);
        assert_eq!(raw::block_checksum(block), 0);
        assert_eq!(block[raw::EXTENSION_FLAG_OFFSET], 0);
    }

    #[test]
    fn built_block_parses_back() {
        let mode = mode_1080p60();
        let raw = SynthEdid::new(mode, 510, 287)
            .monitor_name("BIGPANEL")
            .build();
        let specs = parse::parse_base_block(raw.base()).unwrap();
        assert_eq!(specs.monitor, "BIGPANEL");
        assert_eq!(specs.max_x, 51);
        assert_eq!(specs.max_y, 28);
        assert_eq!(specs.modedb.len(), 1);
        assert_eq!(specs.modedb[0], mode);
        assert_eq!(specs.modedb[0].refresh, 60);
    }

    #[test]
    fn long_names_are_truncated() {
        let raw = SynthEdid::new(mode_1080p60(), 510, 287)
            .monitor_name("A VERY LONG MONITOR NAME")
            .build();
        let specs = parse::parse_base_block(raw.base()).unwrap();
        assert_eq!(specs.monitor.len(), 13);
    }
}
