//! Synthetic disk geometry for partitioning tools.

use log::error;
use zerocopy::{AsBytes, FromBytes};

use crate::error::ErrorKind;
use crate::util::SECTOR_SHIFT;

pub const HEADS: u32 = 4;

pub const SECTORS_PER_TRACK: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub cylinders: u64,
    pub heads: u32,
    pub sectors_per_track: u32,
}

/// Derive the geometry reported for a device of `capacity` bytes.
///
/// Devices smaller than one full cylinder report zero cylinders.
pub fn get_geometry(capacity: u64) -> Geometry {
    let sectors = capacity >> SECTOR_SHIFT;
    Geometry {
        cylinders: sectors / HEADS as u64 / SECTORS_PER_TRACK as u64,
        heads: HEADS,
        sectors_per_track: SECTORS_PER_TRACK,
    }
}

impl Geometry {
    /// Encode as the record returned by a "get geometry" query.
    pub fn to_hd_geometry(&self, start: u64) -> HdGeometry {
        HdGeometry {
            heads: self.heads as u8,
            sectors: self.sectors_per_track as u8,
            cylinders: core::cmp::min(self.cylinders, u16::MAX as u64) as u16,
            reserved: 0,
            start,
        }
    }
}

/// Fixed layout geometry record as exchanged with disk tooling.
#[derive(Debug, AsBytes, FromBytes, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct HdGeometry {
    pub heads: u8,
    pub sectors: u8,
    /// Saturates at `u16::MAX` for large devices.
    pub cylinders: u16,
    pub reserved: u32,
    /// First sector of the described area.
    pub start: u64,
}

impl TryFrom<&[u8]> for HdGeometry {
    type Error = ErrorKind;

    /// Decode a record from the front of `bytes`, which need not be aligned.
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let mut record = HdGeometry {
            heads: 0,
            sectors: 0,
            cylinders: 0,
            reserved: 0,
            start: 0,
        };
        let size = core::mem::size_of::<HdGeometry>();
        if bytes.len() < size {
            error!("Failure to create geometry record from {} bytes.", bytes.len());
            return Err(ErrorKind::OutOfRange);
        }
        record.as_bytes_mut().copy_from_slice(&bytes[..size]);
        Ok(record)
    }
}
