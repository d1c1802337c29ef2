//! Built-in DVI mode tables used when EDID is ignored or unreadable.

use edid::{ModeFlags, MonitorSpecs, VideoMode};

/// Which built-in mode set replaces the monitor's EDID, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefaultMode {
    Disabled,
    /// Single synthetic 800x600@72 mode used for DVI testing rigs.
    Test,
    P720,
    P1080,
}

macro_rules! mode {
    ($xres:expr, $yres:expr, $pixclock_khz:expr, $refresh:expr,
     hsync $hsync:expr, vsync $vsync:expr,
     hback $hback:expr, hfront $hfront:expr,
     vback $vback:expr, vfront $vfront:expr,
     $flags:expr) => {
        VideoMode {
            xres: $xres,
            yres: $yres,
            pixclock_khz: $pixclock_khz,
            hsync_len: $hsync,
            vsync_len: $vsync,
            left_margin: $hback,
            right_margin: $hfront,
            upper_margin: $vback,
            lower_margin: $vfront,
            refresh: $refresh,
            flags: $flags,
        }
    };
}

/// Synthetic mode for DVI test fixtures.
const MODE_800X600_72: VideoMode = mode!(800, 600, 50000, 72,
    hsync 120, vsync 6, hback 64, hfront 56, vback 23, vfront 37,
    ModeFlags::SYNC_HIGH);

/// 1280x720p 60 Hz, EIA/CEA-861-B format 4.
const MODE_1280X720_60: VideoMode = mode!(1280, 720, 74250, 60,
    hsync 40, vsync 5, hback 220, hfront 110, vback 20, vfront 5,
    ModeFlags::SYNC_HIGH);

/// 720x480p 59.94 Hz, EIA/CEA-861-B formats 2 and 3.
const MODE_720X480_60: VideoMode = mode!(720, 480, 27000, 60,
    hsync 62, vsync 6, hback 60, hfront 16, vback 30, vfront 9,
    ModeFlags::empty());

/// 640x480p 60 Hz, EIA/CEA-861-B format 1.
const MODE_640X480_60: VideoMode = mode!(640, 480, 25200, 60,
    hsync 96, vsync 2, hback 48, hfront 16, vback 33, vfront 10,
    ModeFlags::empty());

/// 720x576p 50 Hz, EIA/CEA-861-B formats 17 and 18.
const MODE_720X576_50: VideoMode = mode!(720, 576, 27000, 50,
    hsync 64, vsync 5, hback 68, hfront 12, vback 39, vfront 5,
    ModeFlags::empty());

/// 1920x1080p 59.94/60 Hz, EIA/CEA-861-B format 16.
const MODE_1920X1080_60: VideoMode = mode!(1920, 1080, 148500, 60,
    hsync 44, vsync 5, hback 148, hfront 88, vback 36, vfront 4,
    ModeFlags::SYNC_HIGH);

const TEST_MODES: [VideoMode; 1] = [MODE_800X600_72];

const P720_MODES: [VideoMode; 4] = [
    MODE_1280X720_60,
    MODE_720X480_60,
    MODE_640X480_60,
    MODE_720X576_50,
];

const P1080_MODES: [VideoMode; 5] = [
    MODE_1920X1080_60,
    MODE_1280X720_60,
    MODE_720X480_60,
    MODE_640X480_60,
    MODE_720X576_50,
];

/// Monitor specs substituted for real EDID data when a default mode set is
/// configured.
pub fn default_monspecs(default_mode: DefaultMode) -> MonitorSpecs {
    let modedb: Vec<VideoMode> = match default_mode {
        DefaultMode::Disabled => Vec::new(),
        DefaultMode::Test => TEST_MODES.to_vec(),
        DefaultMode::P720 => P720_MODES.to_vec(),
        DefaultMode::P1080 => P1080_MODES.to_vec(),
    };
    MonitorSpecs {
        manufacturer: "CL".to_string(),
        monitor: "DEFAULT".to_string(),
        max_x: 48,
        max_y: 27,
        hfmin: 30_000,
        hfmax: 83_000,
        vfmin: 56,
        vfmax: 75,
        dclkmax: 150_000_000,
        modedb,
    }
}
