//! Display-output devices built on the `edid` crate.

pub mod display;
