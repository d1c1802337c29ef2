//! RGB/DVI display output: drives EDID refresh on detect and filters the
//! mode database against the output's hardware limits.

use edid::bus::EdidBus;
use edid::{Edid, MonitorSpecs, VideoMode};
use log::{error, info};

use super::default_modes::{self, DefaultMode};

/// Hardware limits of the output path.
#[derive(Clone, Copy, Debug)]
pub struct OutputCaps {
    pub max_xres: u32,
    pub max_yres: u32,
    /// Maximum pixel clock in Hz.
    pub max_pixclock: u32,
}

impl Default for OutputCaps {
    fn default() -> OutputCaps {
        OutputCaps {
            max_xres: 1680,
            max_yres: 1050,
            max_pixclock: 150_000_000,
        }
    }
}

pub struct RgbOutput<B> {
    edid: Edid<B>,
    caps: OutputCaps,
    default_mode: DefaultMode,
    connected: bool,
    h_size_mm: u32,
    v_size_mm: u32,
}

impl<B: EdidBus> RgbOutput<B> {
    pub fn new(bus: B, caps: OutputCaps, default_mode: DefaultMode) -> RgbOutput<B> {
        RgbOutput {
            edid: Edid::new(bus),
            caps,
            default_mode,
            connected: false,
            h_size_mm: 0,
            v_size_mm: 0,
        }
    }

    pub fn edid(&self) -> &Edid<B> {
        &self.edid
    }

    pub fn connected(&self) -> bool {
        self.connected
    }

    /// Detected screen size in mm.
    pub fn size_mm(&self) -> (u32, u32) {
        (self.h_size_mm, self.v_size_mm)
    }

    /// Hotplug/detect entry point: refreshes the EDID snapshot and returns
    /// the filtered monitor specs. With a default mode set, the EDID data is
    /// ignored and the built-in mode table is advertised instead.
    pub fn detect(&mut self) -> Option<MonitorSpecs> {
        let refreshed = self.edid.refresh();

        let mut specs = if self.default_mode != DefaultMode::Disabled {
            info!("ignoring EDID data, using the default DVI resolutions");
            default_modes::default_monspecs(self.default_mode)
        } else {
            match refreshed {
                Ok(specs) => specs,
                Err(e) => {
                    error!("error reading edid: {}", e);
                    self.connected = false;
                    return None;
                }
            }
        };

        // Monitors like to lie about these but they are still useful for
        // detecting aspect ratios.
        self.h_size_mm = specs.max_x * 10;
        self.v_size_mm = specs.max_y * 10;

        if self.edid.filter() != 0 {
            let caps = self.caps;
            specs.modedb.retain_mut(|mode| mode_filter(&caps, mode));
        }

        self.connected = true;
        info!("display detected");
        Some(specs)
    }
}

/// Accepts a candidate mode, fixing up its refresh rate on the way. Modes
/// without a usable pixel clock and modes beyond the output's limits are
/// rejected.
fn mode_filter(caps: &OutputCaps, mode: &mut VideoMode) -> bool {
    // Sanity check for EDID modes.
    let refresh = match mode.refresh_rate() {
        Some(refresh) => refresh,
        None => return false,
    };
    mode.refresh = refresh;

    let pclk = u64::from(mode.pixclock_khz) * 1000;
    let mut supported = pclk <= u64::from(caps.max_pixclock);

    if mode.xres > caps.max_xres || mode.yres > caps.max_yres {
        supported = false;
    }

    info!(
        "\t{}x{}-{} (pclk={}) -> {}",
        mode.xres,
        mode.yres,
        mode.refresh,
        pclk,
        if supported { "supported" } else { "rejected" }
    );

    supported
}

#[cfg(test)]
mod tests {
    use std::io;

    use edid::raw::{BLOCK_SIZE, STI_OFFSET};
    use edid::synth::SynthEdid;
    use edid::ModeFlags;

    use super::*;

    struct FakeBus {
        image: Vec<u8>,
        fail: bool,
    }

    impl EdidBus for FakeBus {
        fn read_block(&mut self, block: usize, buf: &mut [u8; BLOCK_SIZE]) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "no ack"));
            }
            let start = block * BLOCK_SIZE;
            match self.image.get(start..start + BLOCK_SIZE) {
                Some(data) => {
                    buf.copy_from_slice(data);
                    Ok(())
                }
                None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no such block")),
            }
        }
    }

    fn mode_720p60() -> VideoMode {
        let mut mode = VideoMode {
            xres: 1280,
            yres: 720,
            pixclock_khz: 74250,
            hsync_len: 40,
            vsync_len: 5,
            left_margin: 220,
            right_margin: 110,
            upper_margin: 20,
            lower_margin: 5,
            refresh: 0,
            flags: ModeFlags::SYNC_HIGH,
        };
        mode.update_refresh();
        mode
    }

    fn bus_with(mode: VideoMode) -> FakeBus {
        FakeBus {
            image: SynthEdid::new(mode, 480, 270)
                .monitor_name("PANEL")
                .build()
                .as_bytes()
                .to_vec(),
            fail: false,
        }
    }

    #[test]
    fn detect_filters_and_connects() {
        let mut out = RgbOutput::new(
            bus_with(mode_720p60()),
            OutputCaps::default(),
            DefaultMode::Disabled,
        );
        assert!(!out.connected());

        let specs = out.detect().unwrap();
        assert!(out.connected());
        assert_eq!(out.size_mm(), (480, 270));
        assert_eq!(specs.modedb.len(), 1);
        assert_eq!(specs.modedb[0].refresh, 60);
    }

    #[test]
    fn detect_drops_modes_without_pixel_clock() {
        // Advertise an extra standard timing: it decodes with a zero pixel
        // clock and must not survive the filter.
        let mut bus = bus_with(mode_720p60());
        bus.image[STI_OFFSET] = 209;
        bus.image[STI_OFFSET + 1] = 0xc0;
        let sum: u8 = bus.image[..BLOCK_SIZE - 1]
            .iter()
            .fold(0u8, |s, b| s.wrapping_add(*b));
        bus.image[BLOCK_SIZE - 1] = sum.wrapping_neg();

        let mut out = RgbOutput::new(bus, OutputCaps::default(), DefaultMode::Disabled);
        let specs = out.detect().unwrap();
        assert_eq!(specs.modedb.len(), 1);
        assert_eq!(specs.modedb[0].xres, 1280);
    }

    #[test]
    fn detect_rejects_oversized_modes() {
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

        let mut out = RgbOutput::new(bus_with(mode), OutputCaps::default(), DefaultMode::Disabled);
        let specs = out.detect().unwrap();
        // 1920x1080 exceeds the 1680x1050 panel cap.
        assert!(specs.modedb.is_empty());
        assert!(out.connected());
    }

    #[test]
    fn detect_respects_pixclock_cap() {
        let caps = OutputCaps {
            max_xres: 1920,
            max_yres: 1200,
            max_pixclock: 74_000_000,
        };
        let mut out = RgbOutput::new(bus_with(mode_720p60()), caps, DefaultMode::Disabled);
        let specs = out.detect().unwrap();
        // 74.25 MHz is just over the cap.
        assert!(specs.modedb.is_empty());
    }

    #[test]
    fn detect_fails_without_edid_or_default() {
        let bus = FakeBus {
            image: Vec::new(),
            fail: true,
        };
        let mut out = RgbOutput::new(bus, OutputCaps::default(), DefaultMode::Disabled);
        assert!(out.detect().is_none());
        assert!(!out.connected());
    }

    #[test]
    fn default_mode_overrides_broken_edid() {
        let bus = FakeBus {
            image: Vec::new(),
            fail: true,
        };
        let mut out = RgbOutput::new(bus, OutputCaps::default(), DefaultMode::P720);
        let specs = out.detect().unwrap();
        assert!(out.connected());
        assert_eq!(specs.monitor, "DEFAULT");
        assert_eq!(specs.modedb.len(), 4);
        assert_eq!(out.size_mm(), (480, 270));
    }

    #[test]
    fn default_mode_overrides_good_edid() {
        let mut out = RgbOutput::new(
            bus_with(mode_720p60()),
            OutputCaps::default(),
            DefaultMode::Test,
        );
        let specs = out.detect().unwrap();
        assert_eq!(specs.modedb.len(), 1);
        assert_eq!(specs.modedb[0].xres, 800);
        // The EDID snapshot was still refreshed for introspection.
        assert!(out.edid().snapshot().is_some());
    }

    #[test]
    fn filter_tunable_disables_filtering() {
        let mut bus = bus_with(mode_720p60());
        bus.image[STI_OFFSET] = 209;
        bus.image[STI_OFFSET + 1] = 0xc0;
        let sum: u8 = bus.image[..BLOCK_SIZE - 1]
            .iter()
            .fold(0u8, |s, b| s.wrapping_add(*b));
        bus.image[BLOCK_SIZE - 1] = sum.wrapping_neg();

        let mut out = RgbOutput::new(bus, OutputCaps::default(), DefaultMode::Disabled);
        out.edid().set_filter(0);
        let specs = out.detect().unwrap();
        // Both the DTD mode and the coarse standard timing survive.
        assert_eq!(specs.modedb.len(), 2);
    }
}
