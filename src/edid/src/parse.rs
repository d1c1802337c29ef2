//! EDID block decoding: base block into [`MonitorSpecs`], CEA-861
//! extension blocks into extra modes plus [`Eld`] audio capability.

use crate::editor::ESTABLISHED_TIMINGS;
use crate::eld::{Eld, ELD_MAX_SAD};
use crate::modes::{ModeFlags, VideoMode};
use crate::raw::{self, BLOCK_SIZE, DTD_OFFSET, DTD_SIZE, STI_OFFSET};
use crate::specs::MonitorSpecs;
use crate::{EdidError, Result};

/// Extension block tag for CEA-861 blocks.
pub const CEA_EXTENSION_TAG: u8 = 0x02;

const HDMI_IEEE_OUI: [u8; 3] = [0x03, 0x0c, 0x00];

const DESCRIPTOR_MONITOR_NAME: u8 = 0xfc;
const DESCRIPTOR_RANGE_LIMITS: u8 = 0xfd;

/// Capability bits a single CEA-861 extension block advertised.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtensionCaps {
    pub stereo: bool,
    pub underscan: bool,
}

/// Decodes the base block. Fails with [`EdidError::InvalidBaseBlock`] when
/// the header magic or the checksum is wrong; no partial data comes back in
/// that case.
pub fn parse_base_block(block: &[u8]) -> Result<MonitorSpecs> {
    if block.len() < BLOCK_SIZE || block[..8] != raw::HEADER_MAGIC {
        return Err(EdidError::InvalidBaseBlock);
    }
    if raw::block_checksum(&block[..BLOCK_SIZE]) != 0 {
        return Err(EdidError::InvalidBaseBlock);
    }

    let mut specs = MonitorSpecs {
        manufacturer: decode_pnp_id(block[8], block[9]),
        max_x: u32::from(block[21]),
        max_y: u32::from(block[22]),
        ..Default::default()
    };

    for etb in ESTABLISHED_TIMINGS.iter() {
        if block[etb.byte] & (1 << etb.bit) != 0 {
            specs.modedb.push(VideoMode {
                xres: etb.xres,
                yres: etb.yres,
                refresh: etb.refresh,
                ..Default::default()
            });
        }
    }

    for slot in 0..8 {
        let sti = &block[STI_OFFSET + slot * 2..][..2];
        if let Some(mode) = decode_standard_timing(sti[0], sti[1]) {
            specs.modedb.push(mode);
        }
    }

    for desc in 0..4 {
        parse_descriptor(&block[DTD_OFFSET + desc * DTD_SIZE..][..DTD_SIZE], &mut specs);
    }

    Ok(specs)
}

/// Decodes a CEA-861 extension block: appends its detailed timing
/// descriptors to the mode database, then walks the data-block collection
/// into `eld`. Non-CEA blocks are ignored. Declared data-block lengths are
/// clamped to the collection end rather than trusted.
pub fn parse_extension_block(block: &[u8], specs: &mut MonitorSpecs, eld: &mut Eld) -> ExtensionCaps {
    let mut caps = ExtensionCaps::default();
    if block.len() < BLOCK_SIZE || block[0] != CEA_EXTENSION_TAG {
        return caps;
    }

    eld.eld_ver = 0x02;
    eld.cea_edid_ver = block[1];

    // Offset of the first detailed timing descriptor; data blocks occupy
    // bytes 4 up to it.
    let dtd_start = block[2] as usize;

    let basic_audio = block[3] & (1 << 6) != 0;
    caps.underscan = block[3] & (1 << 7) != 0;

    if dtd_start >= 4 {
        let mut off = dtd_start;
        while off + DTD_SIZE <= BLOCK_SIZE - 1 {
            let desc = &block[off..off + DTD_SIZE];
            if desc[0] == 0 && desc[1] == 0 {
                break;
            }
            if let Some(mode) = parse_detailed_timing(desc) {
                specs.modedb.push(mode);
            }
            off += DTD_SIZE;
        }
    }

    let collection_end = dtd_start.min(BLOCK_SIZE - 1);
    let mut ptr = 4usize;
    while ptr < collection_end {
        let header = block[ptr];
        let declared = (header & 0x1f) as usize;
        let avail = declared.min(collection_end - ptr - 1);
        let body = &block[ptr + 1..ptr + 1 + avail];

        match (header >> 5) & 0x7 {
            // Audio data block: raw short audio descriptor bytes.
            1 => {
                let count = avail.min(ELD_MAX_SAD);
                eld.sad[..count].copy_from_slice(&body[..count]);
                eld.sad_count = count;
                eld.conn_type = 0;
                eld.support_hdcp = false;
                // Audio block present plus the basic-audio bit: default the
                // speaker map to front left/right. A speaker allocation
                // block later in the collection overrides this.
                if basic_audio {
                    eld.spk_alloc = 1;
                }
            }
            // Vendor specific data block; only the HDMI VSDB matters here.
            3 => {
                if body.len() >= 5 && body[..3] == HDMI_IEEE_OUI {
                    eld.port_id = [body[3], body[4]];
                }
                if body.len() >= 6 && body[..3] == HDMI_IEEE_OUI {
                    eld.support_ai = body[5] & 0x80 != 0;
                }
                if body.len() >= 8 && body[..3] == HDMI_IEEE_OUI {
                    let mut j = 7;
                    let flags = body[j];
                    j += 1;
                    // HDMI_Video_present?
                    if flags & 0x20 != 0 {
                        // Latency_Fields_present?
                        if flags & 0x80 != 0 {
                            j += 2;
                        }
                        // I_Latency_Fields_present?
                        if flags & 0x40 != 0 {
                            j += 2;
                        }
                        // 3D_present?
                        if let Some(&vic) = body.get(j) {
                            if vic & 0x80 != 0 {
                                caps.stereo = true;
                            }
                        }
                    }
                }
                if body.len() >= 10 && body[..3] == HDMI_IEEE_OUI {
                    eld.aud_synch_delay = body[9];
                }
            }
            // Speaker allocation data block: one bitmap byte, verbatim.
            4 => {
                if !body.is_empty() {
                    eld.spk_alloc = body[0];
                }
            }
            _ => {}
        }

        ptr += declared + 1;
    }

    caps
}

/// Decodes one 18-byte detailed timing descriptor. Returns `None` for
/// descriptors that do not describe a usable mode.
pub fn parse_detailed_timing(desc: &[u8]) -> Option<VideoMode> {
    if desc.len() < DTD_SIZE {
        return None;
    }

    let pixclock_khz = u32::from(u16::from_le_bytes([desc[0], desc[1]])) * 10;
    if pixclock_khz == 0 {
        return None;
    }

    let xres = u32::from(desc[2]) | (u32::from(desc[4] >> 4) << 8);
    let hblank = u32::from(desc[3]) | (u32::from(desc[4] & 0x0f) << 8);
    let yres = u32::from(desc[5]) | (u32::from(desc[7] >> 4) << 8);
    let vblank = u32::from(desc[6]) | (u32::from(desc[7] & 0x0f) << 8);

    let hfront = u32::from(desc[8]) | (u32::from(desc[11] >> 6) << 8);
    let hsync = u32::from(desc[9]) | (u32::from((desc[11] >> 4) & 0x3) << 8);
    let vfront = u32::from(desc[10] >> 4) | (u32::from((desc[11] >> 2) & 0x3) << 4);
    let vsync = u32::from(desc[10] & 0x0f) | (u32::from(desc[11] & 0x3) << 4);

    if xres == 0 || yres == 0 {
        return None;
    }

    let mut flags = ModeFlags::empty();
    if desc[17] & 0x80 != 0 {
        flags |= ModeFlags::INTERLACED;
    }
    // Sync polarity bits only apply to digital separate sync.
    if (desc[17] >> 3) & 0x3 == 0x3 {
        if desc[17] & 0x2 != 0 {
            flags |= ModeFlags::HSYNC_HIGH;
        }
        if desc[17] & 0x4 != 0 {
            flags |= ModeFlags::VSYNC_HIGH;
        }
    }

    let mut mode = VideoMode {
        xres,
        yres,
        pixclock_khz,
        hsync_len: hsync,
        vsync_len: vsync,
        left_margin: hblank.saturating_sub(hfront + hsync),
        right_margin: hfront,
        upper_margin: vblank.saturating_sub(vfront + vsync),
        lower_margin: vfront,
        refresh: 0,
        flags,
    };
    mode.update_refresh();
    Some(mode)
}

fn parse_descriptor(desc: &[u8], specs: &mut MonitorSpecs) {
    if u16::from_le_bytes([desc[0], desc[1]]) != 0 {
        if let Some(mode) = parse_detailed_timing(desc) {
            specs.modedb.push(mode);
        }
        return;
    }

    match desc[3] {
        DESCRIPTOR_MONITOR_NAME => {
            specs.monitor = descriptor_text(&desc[5..DTD_SIZE]);
        }
        DESCRIPTOR_RANGE_LIMITS => {
            specs.vfmin = u32::from(desc[5]);
            specs.vfmax = u32::from(desc[6]);
            specs.hfmin = u32::from(desc[7]) * 1000;
            specs.hfmax = u32::from(desc[8]) * 1000;
            specs.dclkmax = u32::from(desc[9]) * 10_000_000;
        }
        _ => {}
    }
}

fn decode_standard_timing(byte0: u8, byte1: u8) -> Option<VideoMode> {
    // 01 01 marks a free slot, 00 00 an unused one.
    if byte0 == 0 || (byte0 == 1 && byte1 == 1) {
        return None;
    }
    let xres = (u32::from(byte0) + 31) * 8;
    let yres = match byte1 >> 6 {
        0 => xres * 10 / 16,
        1 => xres * 3 / 4,
        2 => xres * 4 / 5,
        _ => xres * 9 / 16,
    };
    Some(VideoMode {
        xres,
        yres,
        refresh: u32::from(byte1 & 0x3f) + 60,
        ..Default::default()
    })
}

fn decode_pnp_id(hi: u8, lo: u8) -> String {
    let packed = u16::from_be_bytes([hi, lo]);
    [packed >> 10, packed >> 5, packed]
        .iter()
        .map(|&five| {
            let letter = (five & 0x1f) as u8;
            if (1..=26).contains(&letter) {
                char::from(b'A' + letter - 1)
            } else {
                '?'
            }
        })
        .collect()
}

fn descriptor_text(bytes: &[u8]) -> String {
    let end = bytes
        .iter()
        .position(|&b| b == 0x0a)
        .unwrap_or(bytes.len());
    let text: String = bytes[..end]
        .iter()
        .map(|&b| {
            if (0x20..0x7f).contains(&b) {
                char::from(b)
            } else {
                ' '
            }
        })
        .collect();
    text.trim().to_string()
}
