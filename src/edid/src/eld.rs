//! ELD: the audio-capability summary handed to the HDMI audio driver,
//! extracted from the CEA-861 extension blocks.

pub const ELD_MAX_SAD: usize = 16;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Eld {
    pub eld_ver: u8,
    pub cea_edid_ver: u8,
    pub monitor_name: String,
    /// Base block bytes 0x8..0xB in ELD field order.
    pub product_id: [u8; 2],
    pub manufacture_id: [u8; 2],
    /// Speaker allocation bitmap; 1 (front left/right) when only basic
    /// audio was advertised.
    pub spk_alloc: u8,
    pub sad_count: usize,
    /// Raw short audio descriptor bytes, capped at [`ELD_MAX_SAD`].
    pub sad: [u8; ELD_MAX_SAD],
    pub conn_type: u8,
    pub aud_synch_delay: u8,
    pub support_ai: bool,
    pub support_hdcp: bool,
    /// HDMI source physical address bytes from the vendor block.
    pub port_id: [u8; 2],
}
