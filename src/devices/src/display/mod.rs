mod debug;
mod default_modes;
mod rgb;

pub use self::debug::{dump_ascii, dump_binary, write_raw};
pub use self::default_modes::{default_monspecs, DefaultMode};
pub use self::rgb::{OutputCaps, RgbOutput};
