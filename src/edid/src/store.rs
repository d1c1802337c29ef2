//! Reads, parses and publishes EDID snapshots for one display output.
//!
//! The current snapshot lives behind a reference count: readers clone the
//! `Arc` under a short lock and keep using the data lock-free while a
//! refresh installs a replacement. An installed snapshot is never mutated;
//! every edit goes through a copy that is installed as a new snapshot.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, warn};

use crate::bus::EdidBus;
use crate::eld::Eld;
use crate::modes::VideoMode;
use crate::parse;
use crate::raw::{RawEdid, BLOCK_SIZE, EXTENSION_FLAG_OFFSET};
use crate::specs::MonitorSpecs;
use crate::{EdidError, Result};

/// One immutable snapshot: the raw bytes plus everything extracted from the
/// extension blocks that outlives the parse.
pub struct EdidData {
    pub raw: RawEdid,
    pub eld: Eld,
    pub support_stereo: bool,
    pub support_underscan: bool,
}

/// EDID state for one display output.
///
/// The bus mutex serializes refreshes and is held across I/O and parsing;
/// the data mutex is held only for the snapshot pointer swap, so readers
/// never wait on the bus.
pub struct Edid<B> {
    bus: Mutex<B>,
    data: Mutex<Option<Arc<EdidData>>>,
    filter: AtomicI32,
    status: AtomicI32,
}

impl<B> Edid<B> {
    pub fn new(bus: B) -> Edid<B> {
        Edid {
            bus: Mutex::new(bus),
            data: Mutex::new(None),
            filter: AtomicI32::new(1),
            status: AtomicI32::new(0),
        }
    }

    /// Borrows the current snapshot. The handle stays valid across later
    /// refreshes; dropping it releases the snapshot.
    pub fn snapshot(&self) -> Option<Arc<EdidData>> {
        self.data.lock().unwrap().clone()
    }

    pub fn eld(&self) -> Option<Eld> {
        self.snapshot().map(|data| data.eld.clone())
    }

    pub fn supports_underscan(&self) -> bool {
        self.snapshot().map_or(false, |data| data.support_underscan)
    }

    /// Copy-on-write edit of the raw buffer: the write lands in a clone
    /// that replaces the current snapshot, clamped to the buffer length.
    /// Returns how many bytes were written. Readers holding the old
    /// snapshot keep seeing the old bytes.
    pub fn patch(&self, offset: usize, bytes: &[u8]) -> Result<usize> {
        let current = self.snapshot().ok_or(EdidError::NoData)?;

        let mut raw = current.raw.clone();
        let buf = raw.as_mut_bytes();
        if offset >= buf.len() {
            return Ok(0);
        }
        let len = bytes.len().min(buf.len() - offset);
        buf[offset..offset + len].copy_from_slice(&bytes[..len]);

        let data = Arc::new(EdidData {
            raw,
            eld: current.eld.clone(),
            support_stereo: current.support_stereo,
            support_underscan: current.support_underscan,
        });
        *self.data.lock().unwrap() = Some(data);
        Ok(len)
    }

    pub fn filter(&self) -> i32 {
        self.filter.load(Ordering::Relaxed)
    }

    pub fn set_filter(&self, value: i32) {
        self.filter.store(value, Ordering::Relaxed);
    }

    pub fn status(&self) -> i32 {
        self.status.load(Ordering::Relaxed)
    }

    pub fn set_status(&self, value: i32) {
        self.status.store(value, Ordering::Relaxed);
    }

    /// Parses extension blocks, finalizes the ELD and installs the new
    /// snapshot. The previous snapshot drops once its last reader is done.
    fn install(&self, raw: RawEdid, mut specs: MonitorSpecs) -> Result<MonitorSpecs> {
        let mut eld = Eld::default();
        let mut stereo = false;
        let mut underscan = false;

        for i in 1..raw.block_count() {
            let block = raw.block(i).expect("block index is in range");
            if block[0] != parse::CEA_EXTENSION_TAG {
                continue;
            }
            let caps = parse::parse_extension_block(block, &mut specs, &mut eld);
            stereo |= caps.stereo;
            underscan = caps.underscan;
        }

        eld.monitor_name = specs.monitor.clone();
        let base = raw.base();
        eld.product_id = [base[0x08], base[0x09]];
        eld.manufacture_id = [base[0x0a], base[0x0b]];

        if stereo {
            let flag = VideoMode::stereo_flag();
            for mode in &mut specs.modedb {
                if mode.supports_stereo() {
                    mode.flags |= flag;
                }
            }
        }

        debug!(
            "edid: installing snapshot, {} blocks, {} modes",
            raw.block_count(),
            specs.modedb.len()
        );

        let data = Arc::new(EdidData {
            raw,
            eld,
            support_stereo: stereo,
            support_underscan: underscan,
        });
        *self.data.lock().unwrap() = Some(data);
        Ok(specs)
    }

    /// Parses a captured or synthetic EDID image and installs it as the
    /// current snapshot, bypassing the bus. The base block's declared
    /// extension count is honored up to what the buffer actually holds.
    pub fn refresh_from_buffer(&self, bytes: &[u8]) -> Result<MonitorSpecs> {
        let _bus = self.bus.lock().unwrap(); // one refresh at a time

        if bytes.len() < BLOCK_SIZE {
            return Err(EdidError::InvalidLength(bytes.len()));
        }
        let base = &bytes[..BLOCK_SIZE];
        let specs = parse::parse_base_block(base)?;
        let mut raw = RawEdid::from_bytes(base)?;

        let declared = base[EXTENSION_FLAG_OFFSET] as usize;
        let available = bytes.len() / BLOCK_SIZE - 1;
        if declared > available {
            warn!(
                "edid: buffer declares {} extension blocks but holds {}",
                declared, available
            );
        }
        for i in 1..=declared.min(available) {
            raw.push_block(&bytes[i * BLOCK_SIZE..(i + 1) * BLOCK_SIZE])?;
        }

        self.install(raw, specs)
    }
}

impl<B: EdidBus> Edid<B> {
    /// Full read-and-parse cycle: reads the base block and every declared
    /// extension block, then installs the result as the current snapshot.
    ///
    /// A bus failure on the base block fails the whole refresh and leaves
    /// the previous snapshot current. A failure on an extension block only
    /// stops further reads: everything parsed so far still becomes the new
    /// snapshot, and the refresh counts as a success. Readers that acquired
    /// the previous snapshot keep it until they drop their handle.
    pub fn refresh(&self) -> Result<MonitorSpecs> {
        let mut bus = self.bus.lock().unwrap();

        let mut block = [0u8; BLOCK_SIZE];
        bus.read_block(0, &mut block).map_err(|e| EdidError::Bus {
            block: 0,
            source: e,
        })?;

        let specs = parse::parse_base_block(&block)?;
        let mut raw = RawEdid::from_bytes(&block)?;

        let extensions = block[EXTENSION_FLAG_OFFSET] as usize;
        for i in 1..=extensions {
            let mut ext = [0u8; BLOCK_SIZE];
            if let Err(e) = bus.read_block(i, &mut ext) {
                warn!(
                    "edid: extension block {} unreadable, keeping partial data: {}",
                    i, e
                );
                break;
            }
            raw.push_block(&ext)?;
        }
        drop(bus);

        self.install(raw, specs)
    }
}
