//! EDID acquisition and mode-database maintenance for a display output.
//!
//! The display controller learns what an attached monitor can do from its
//! EDID: a base block of 128 bytes plus optional 128-byte extension blocks
//! read over the DDC bus. This crate reads those blocks through the
//! [`bus::EdidBus`] trait, parses them into a [`MonitorSpecs`] mode database
//! and an [`Eld`] audio-capability record, and keeps the raw bytes available
//! as an immutable, reference-counted snapshot that readers can hold across
//! refreshes. The [`editor`] module patches mode advertisements in and out
//! of a raw buffer before it is installed.

pub mod bus;
pub mod editor;
pub mod eld;
pub mod modes;
pub mod parse;
pub mod raw;
pub mod specs;
pub mod store;
pub mod synth;

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EdidError {
    /// Transport failure reading one EDID block. Not retried.
    #[error("transfer failed reading EDID block {block}: {source}")]
    Bus {
        block: usize,
        #[source]
        source: io::Error,
    },
    /// The base block failed header-magic or checksum validation.
    #[error("EDID base block failed validation")]
    InvalidBaseBlock,
    /// A captured buffer is not a non-zero multiple of the block size.
    #[error("EDID buffer length {0} is not a multiple of 128")]
    InvalidLength(usize),
    /// A buffer would exceed the 32 KiB snapshot capacity.
    #[error("EDID buffer of {0} bytes exceeds the 32 KiB cap")]
    BufferTooLarge(usize),
    /// All eight standard timing slots are occupied.
    #[error("no free standard timing slot left")]
    TimingTableFull,
    /// The mode has no established timing bit and no standard timing
    /// encoding (unsupported aspect ratio or out-of-range resolution).
    #[error("{xres}x{yres} has no standard timing encoding")]
    UnencodableMode { xres: u32, yres: u32 },
    /// No snapshot has been installed yet.
    #[error("no EDID snapshot installed")]
    NoData,
}

pub type Result<T> = std::result::Result<T, EdidError>;

pub use crate::editor::CleanupOptions;
pub use crate::eld::{Eld, ELD_MAX_SAD};
pub use crate::modes::{ModeFlags, VideoMode};
pub use crate::raw::RawEdid;
pub use crate::specs::MonitorSpecs;
pub use crate::store::{Edid, EdidData};
