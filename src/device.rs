use alloc::string::String;

use log::{info, warn};
use spin::Mutex;

use crate::dispatch::make_request;
use crate::error::ErrorKind;
use crate::geometry::{get_geometry, Geometry};
use crate::request::{Completion, Request, Segment, Status};
use crate::storage::Storage;
use crate::store::Store;
use crate::util::{SECTOR_SHIFT, SECTOR_SIZE};

const DEFAULT_NAME: &str = "memd0";

const DEFAULT_SECTORS: u64 = 16 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Disk name used in log messages.
    pub name: String,
    /// Size of the device in bytes.
    pub capacity: u64,
    /// Block size advertised to users of the device. Requests are still
    /// addressed in 512 byte sectors.
    pub logical_block_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            name: String::from(DEFAULT_NAME),
            capacity: DEFAULT_SECTORS * SECTOR_SIZE,
            logical_block_size: SECTOR_SIZE as u32,
        }
    }
}

impl Config {
    pub fn with_sectors(sectors: u64) -> Self {
        Config {
            capacity: sectors.saturating_mul(SECTOR_SIZE),
            ..Config::default()
        }
    }

    /// Check the configuration and return the store length in bytes.
    fn store_len(&self) -> Result<usize, ErrorKind> {
        let block_size = self.logical_block_size;
        if !block_size.is_power_of_two() || (block_size as u64) < SECTOR_SIZE {
            warn!("{}: invalid logical block size {}", self.name, block_size);
            return Err(ErrorKind::InvalidConfig);
        }
        usize::try_from(self.capacity).map_err(|_| {
            warn!("{}: capacity {} not addressable", self.name, self.capacity);
            ErrorKind::AllocationFailure
        })
    }
}

/// A memory backed block device.
///
/// All requests are serialised by a single device wide lock held for the
/// whole transfer.
#[derive(Debug)]
pub struct MemDisk {
    config: Config,
    store: Mutex<Store>,
}

impl MemDisk {
    pub fn new(config: Config) -> Result<Self, ErrorKind> {
        let capacity = config.store_len()?;
        let store = Store::new(capacity)?;
        info!(
            "{}: {} sectors, block size {}",
            config.name,
            config.capacity >> SECTOR_SHIFT,
            config.logical_block_size
        );
        Ok(MemDisk {
            config,
            store: Mutex::new(store),
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn capacity(&self) -> u64 {
        self.config.capacity
    }

    /// Capacity in 512 byte sectors.
    pub fn sectors(&self) -> u64 {
        self.config.capacity >> SECTOR_SHIFT
    }

    pub fn logical_block_size(&self) -> u32 {
        self.config.logical_block_size
    }

    pub fn getgeo(&self) -> Geometry {
        get_geometry(self.config.capacity)
    }

    pub fn checksum(&self) -> u32 {
        self.store.lock().checksum()
    }

    /// Execute `request` and report its completion, through the request's
    /// callback if it has one and through the return value.
    pub fn submit(&self, mut request: Request<'_>) -> Completion {
        let result = {
            let mut store = self.store.lock();
            make_request(&mut *store, &self.config.name, &mut request)
        };
        request.complete(Status::from(result))
    }

    pub fn read_sectors(&self, sector: u64, data: &mut [u8]) -> Status {
        let request = Request::read(sector).segment(Segment::from(data));
        self.submit(request).status
    }

    pub fn write_sectors(&self, sector: u64, data: &[u8]) -> Status {
        let request = Request::write(sector).segment(Segment::from(data));
        self.submit(request).status
    }
}
