//! Patches mode advertisements in and out of a raw EDID base block.
//!
//! Edits happen on a caller-owned buffer before it is installed as the
//! current snapshot, never on an installed one.

use crate::modes::VideoMode;
use crate::raw::{RawEdid, DTD_OFFSET, ETB_OFFSET, EXTENSION_FLAG_OFFSET, STI_OFFSET};
use crate::{EdidError, Result};

pub(crate) struct EstablishedTiming {
    pub xres: u32,
    pub yres: u32,
    pub refresh: u32,
    pub byte: usize,
    pub bit: u8,
}

macro_rules! etb {
    ($xres:expr, $yres:expr, $refresh:expr, $byte:expr, $bit:expr) => {
        EstablishedTiming {
            xres: $xres,
            yres: $yres,
            refresh: $refresh,
            byte: $byte,
            bit: $bit,
        }
    };
}

/// The 16 well-known modes of the established timing bitmap and the
/// byte/bit each one occupies in the base block.
pub(crate) const ESTABLISHED_TIMINGS: [EstablishedTiming; 16] = [
    etb!(720, 400, 70, 35, 7),
    etb!(720, 400, 88, 35, 6),
    etb!(640, 480, 60, 35, 5),
    etb!(640, 480, 67, 35, 4),
    etb!(640, 480, 72, 35, 3),
    etb!(640, 480, 75, 35, 2),
    etb!(800, 600, 56, 35, 1),
    etb!(800, 600, 60, 35, 0),
    etb!(800, 600, 72, 36, 7),
    etb!(800, 600, 75, 36, 6),
    etb!(832, 624, 75, 36, 5),
    etb!(1024, 768, 87, 36, 4),
    etb!(1024, 768, 60, 36, 3),
    etb!(1024, 768, 72, 36, 2),
    etb!(1024, 768, 75, 36, 1),
    etb!(1280, 1024, 75, 36, 0),
];

const STI_SLOTS: usize = 8;
/// A free standard timing slot.
const STI_FREE: [u8; 2] = [1, 1];

/// Gates for [`reset`]. Defaults mirror the shipped boot parameters: wipe
/// the standard timing table, wipe every detailed timing descriptor but the
/// first, leave the extension count alone.
#[derive(Clone, Debug)]
pub struct CleanupOptions {
    pub clear_standard_timings: bool,
    pub clear_detailed_timings: bool,
    /// How many descriptor-area bytes to keep, 0..=72. 18 preserves exactly
    /// the first (preferred) descriptor.
    pub detailed_timing_preserve_offset: usize,
    pub clear_extension_flag: bool,
}

impl Default for CleanupOptions {
    fn default() -> CleanupOptions {
        CleanupOptions {
            clear_standard_timings: true,
            clear_detailed_timings: true,
            detailed_timing_preserve_offset: 18,
            clear_extension_flag: false,
        }
    }
}

/// Advertises `mode` in the base block: sets its established timing bit, or
/// claims a free standard timing slot. Adding a mode that is already
/// present is a no-op. On failure the buffer is left untouched.
pub fn mode_add(raw: &mut RawEdid, mode: &VideoMode) -> Result<()> {
    let buf = raw.as_mut_bytes();

    if let Some(etb) = established_find(mode) {
        buf[etb.byte] |= 1 << etb.bit;
        return Ok(());
    }

    let sti = mode_to_sti(mode).ok_or(EdidError::UnencodableMode {
        xres: mode.xres,
        yres: mode.yres,
    })?;

    if sti_find(buf, sti).is_some() {
        return Ok(());
    }

    match sti_find(buf, STI_FREE) {
        Some(slot) => {
            buf[STI_OFFSET + slot * 2] = sti[0];
            buf[STI_OFFSET + slot * 2 + 1] = sti[1];
            Ok(())
        }
        None => Err(EdidError::TimingTableFull),
    }
}

/// Retracts `mode` from the base block: clears its established timing bit,
/// or restores the free sentinel over its standard timing slot. Unknown and
/// unencodable modes are a no-op.
pub fn mode_remove(raw: &mut RawEdid, mode: &VideoMode) {
    let buf = raw.as_mut_bytes();

    if let Some(etb) = established_find(mode) {
        buf[etb.byte] &= !(1 << etb.bit);
        return;
    }

    let sti = match mode_to_sti(mode) {
        Some(sti) => sti,
        None => return,
    };

    if let Some(slot) = sti_find(buf, sti) {
        buf[STI_OFFSET + slot * 2] = STI_FREE[0];
        buf[STI_OFFSET + slot * 2 + 1] = STI_FREE[1];
    }
}

/// Wipes the base block's mode advertisements so a known-good set can be
/// added back one mode at a time. The established timing bitmap always goes;
/// the rest is gated by `opts`.
pub fn reset(raw: &mut RawEdid, opts: &CleanupOptions) {
    let buf = raw.as_mut_bytes();

    for b in &mut buf[ETB_OFFSET..ETB_OFFSET + 3] {
        *b = 0;
    }

    if opts.clear_standard_timings {
        for b in &mut buf[STI_OFFSET..STI_OFFSET + STI_SLOTS * 2] {
            *b = 1;
        }
    }

    if opts.clear_detailed_timings {
        let keep = opts.detailed_timing_preserve_offset.min(72);
        for b in &mut buf[DTD_OFFSET + keep..EXTENSION_FLAG_OFFSET] {
            *b = 0;
        }
    }

    if opts.clear_extension_flag {
        buf[EXTENSION_FLAG_OFFSET] = 0;
    }
}

fn established_find(mode: &VideoMode) -> Option<&'static EstablishedTiming> {
    ESTABLISHED_TIMINGS
        .iter()
        .find(|etb| etb.xres == mode.xres && etb.yres == mode.yres && etb.refresh == mode.refresh)
}

/// Encodes a mode as a 2-byte standard timing identifier. Only the four
/// encodable aspect ratios and the encodable resolution range qualify.
fn mode_to_sti(mode: &VideoMode) -> Option<[u8; 2]> {
    // X:Y pixel ratio: 00=16:10; 01=4:3; 10=5:4; 11=16:9
    const RATIOS: [(u32, u32, u8); 4] = [(16, 10, 0x00), (4, 3, 0x40), (5, 4, 0x80), (16, 9, 0xc0)];

    if mode.xres < 256 || mode.xres > 2288 {
        return None;
    }

    for &(x, y, mask) in RATIOS.iter() {
        if mode.xres / x == mode.yres / y {
            let byte0 = ((mode.xres >> 3) - 31) as u8;
            let refresh = if mode.refresh > 60 {
                (mode.refresh - 60) as u8 & 0x3f
            } else {
                0
            };
            return Some([byte0, refresh | mask]);
        }
    }
    None
}

fn sti_find(buf: &[u8], sti: [u8; 2]) -> Option<usize> {
    (0..STI_SLOTS).find(|slot| buf[STI_OFFSET + slot * 2..][..2] == sti)
}
