use crate::error::ErrorKind;

/// Requests are always addressed in 512 byte sectors, whatever the logical
/// block size of the device.
pub const SECTOR_SIZE: u64 = 512;

pub(crate) const SECTOR_SHIFT: u32 = 9;

pub(crate) const CRC: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_CKSUM);

/// Byte offset of `sector`, or `OutOfRange` if it does not fit in a u64.
pub(crate) fn sector_to_offset(sector: u64) -> Result<u64, ErrorKind> {
    sector
        .checked_mul(SECTOR_SIZE)
        .ok_or(ErrorKind::OutOfRange)
}

/// Check that `[offset, offset + len)` lies within `capacity`, returning the
/// end offset.
pub(crate) fn check_bounds(offset: u64, len: u64, capacity: u64) -> Result<u64, ErrorKind> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(end),
        _ => Err(ErrorKind::OutOfRange),
    }
}

/// Same as `check_bounds` but yields the range as buffer indices.
pub(crate) fn checked_range(
    offset: u64,
    len: usize,
    capacity: u64,
) -> Result<core::ops::Range<usize>, ErrorKind> {
    let end = check_bounds(offset, len as u64, capacity)?;
    Ok(offset as usize..end as usize)
}
