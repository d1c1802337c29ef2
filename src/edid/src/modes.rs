//! Video mode timings and per-mode capability flags.

use bitflags::bitflags;

bitflags! {
    #[derive(Default)]
    pub struct ModeFlags: u32 {
        const INTERLACED = 1 << 0;
        const DOUBLE_SCAN = 1 << 1;
        const HSYNC_HIGH = 1 << 2;
        const VSYNC_HIGH = 1 << 3;
        const STEREO_FRAME_PACK = 1 << 4;
        const STEREO_LEFT_RIGHT = 1 << 5;
        const SYNC_HIGH = Self::HSYNC_HIGH.bits | Self::VSYNC_HIGH.bits;
    }
}

/// One video mode, margins named after the blanking interval they occupy:
/// `left`/`upper` are back porches, `right`/`lower` are front porches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VideoMode {
    pub xres: u32,
    pub yres: u32,
    pub pixclock_khz: u32,
    pub hsync_len: u32,
    pub vsync_len: u32,
    pub left_margin: u32,
    pub right_margin: u32,
    pub upper_margin: u32,
    pub lower_margin: u32,
    pub refresh: u32,
    pub flags: ModeFlags,
}

impl VideoMode {
    pub fn htotal(&self) -> u32 {
        self.xres + self.right_margin + self.hsync_len + self.left_margin
    }

    pub fn vtotal(&self) -> u32 {
        self.yres + self.lower_margin + self.vsync_len + self.upper_margin
    }

    /// Refresh rate in Hz, rounded to the nearest integer. `None` when the
    /// pixel clock or the totals are zero; such a mode is not usable and
    /// callers reject it instead of dividing by zero.
    pub fn refresh_rate(&self) -> Option<u32> {
        if self.pixclock_khz == 0 {
            return None;
        }
        let clocks = u64::from(self.htotal()) * u64::from(self.vtotal());
        if clocks == 0 {
            return None;
        }
        let hz = u64::from(self.pixclock_khz) * 1000;
        Some(((hz + clocks / 2) / clocks) as u32)
    }

    /// Recomputes `refresh` from the timing fields. Returns false and leaves
    /// the field alone when the mode has no valid rate.
    pub fn update_refresh(&mut self) -> bool {
        match self.refresh_rate() {
            Some(rate) => {
                self.refresh = rate;
                true
            }
            None => false,
        }
    }

    /// Whether frame-packed stereo may be advertised for this mode.
    ///
    /// Only 720p at 50 or 60 Hz qualifies. 1080p24 would qualify per the
    /// HDMI spec but is kept disabled: it does not scan out correctly on
    /// this hardware. Flip it back to true once the defect is fixed.
    pub fn supports_stereo(&self) -> bool {
        if self.xres == 1280 && self.yres == 720 && (self.refresh == 60 || self.refresh == 50) {
            return true;
        }

        if self.xres == 1920 && self.yres == 1080 && self.refresh == 24 {
            return false;
        }

        false
    }

    /// The stereo packing advertised when an extension block signals 3D
    /// support. Boards that cannot drive the doubled pixel clock select
    /// side-by-side packing at build time.
    pub fn stereo_flag() -> ModeFlags {
        if cfg!(feature = "pclk-74mhz-limit") {
            ModeFlags::STEREO_LEFT_RIGHT
        } else {
            ModeFlags::STEREO_FRAME_PACK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode_720p60() -> VideoMode {
        VideoMode {
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
        }
    }

    #[test]
    fn refresh_rate_720p60() {
        // htotal 1650 * vtotal 750 at 74.25 MHz is exactly 60 Hz.
        let mode = mode_720p60();
        assert_eq!(mode.htotal(), 1650);
        assert_eq!(mode.vtotal(), 750);
        assert_eq!(mode.refresh_rate(), Some(60));
    }

    #[test]
    fn refresh_rate_rounds_to_nearest() {
        // 720x480 at 27 MHz: 27e6 / (858 * 525) = 59.94 Hz.
        let mode = VideoMode {
            xres: 720,
            yres: 480,
            pixclock_khz: 27000,
            hsync_len: 62,
            vsync_len: 6,
            left_margin: 60,
            right_margin: 16,
            upper_margin: 30,
            lower_margin: 9,
            ..Default::default()
        };
        assert_eq!(mode.refresh_rate(), Some(60));
    }

    #[test]
    fn zero_pixclock_is_invalid() {
        let mut mode = mode_720p60();
        mode.pixclock_khz = 0;
        assert_eq!(mode.refresh_rate(), None);
        assert!(!mode.update_refresh());
    }

    #[test]
    fn stereo_eligibility() {
        let mut mode = mode_720p60();
        mode.refresh = 60;
        assert!(mode.supports_stereo());
        mode.refresh = 50;
        assert!(mode.supports_stereo());
        mode.refresh = 59;
        assert!(!mode.supports_stereo());

        let mode_1080p24 = VideoMode {
            xres: 1920,
            yres: 1080,
            refresh: 24,
            ..Default::default()
        };
        assert!(!mode_1080p24.supports_stereo());
    }

    #[test]
    fn update_refresh_stores_rate() {
        let mut mode = mode_720p60();
        assert!(mode.update_refresh());
        assert_eq!(mode.refresh, 60);
    }
}
