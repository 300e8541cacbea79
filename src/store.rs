use alloc::vec::Vec;

use log::{debug, error};

use crate::error::ErrorKind;
use crate::storage::Storage;
use crate::util::{checked_range, CRC};

/// Flat, zero filled, in memory backing buffer.
pub struct Store {
    data: Vec<u8>,
}

impl core::fmt::Debug for Store {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Store")
            .field("capacity", &self.data.len())
            .finish()
    }
}

impl Store {
    pub fn new(capacity: usize) -> Result<Self, ErrorKind> {
        let mut data = Vec::new();
        if data.try_reserve_exact(capacity).is_err() {
            error!("Unable to allocate {} bytes of backing store.", capacity);
            return Err(ErrorKind::AllocationFailure);
        }
        // The whole device is zeroed, not just the first sector, so reads of
        // never written regions are deterministic.
        data.resize(capacity, 0u8);
        debug!("Allocated {} byte store.", capacity);
        Ok(Store { data })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Storage for Store {
    fn capacity(&self) -> u64 {
        self.data.len() as u64
    }

    fn read(&self, offset: u64, data: &mut [u8]) -> Result<(), ErrorKind> {
        let range = checked_range(offset, data.len(), self.capacity())?;
        data.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> Result<(), ErrorKind> {
        let range = checked_range(offset, data.len(), self.capacity())?;
        self.data[range].copy_from_slice(data);
        Ok(())
    }

    fn checksum(&self) -> u32 {
        CRC.checksum(&self.data)
    }
}
