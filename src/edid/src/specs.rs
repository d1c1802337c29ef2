//! Parsed monitor identity, operating limits and mode database.

use crate::modes::VideoMode;

/// Everything the display output needs to know about a monitor. The mode
/// database keeps block scan order and is not deduplicated; downstream
/// consumers filter it.
#[derive(Clone, Debug, Default)]
pub struct MonitorSpecs {
    /// Three-letter PNP manufacturer id.
    pub manufacturer: String,
    /// Monitor name from the display product name descriptor.
    pub monitor: String,
    /// Horizontal screen size in cm.
    pub max_x: u32,
    /// Vertical screen size in cm.
    pub max_y: u32,
    /// Horizontal frequency range in Hz.
    pub hfmin: u32,
    pub hfmax: u32,
    /// Vertical frequency range in Hz.
    pub vfmin: u32,
    pub vfmax: u32,
    /// Maximum pixel clock in Hz.
    pub dclkmax: u32,
    pub modedb: Vec<VideoMode>,
}
