use crate::error::ErrorKind;

/// Byte addressed backing store of a block device.
///
/// Implementations must reject any access with `offset + data.len()` past
/// `capacity()` with `ErrorKind::OutOfRange` and leave their contents
/// untouched when they do.
pub trait Storage {
    fn capacity(&self) -> u64;
    fn read(&self, offset: u64, data: &mut [u8]) -> Result<(), ErrorKind>;
    fn write(&mut self, offset: u64, data: &[u8]) -> Result<(), ErrorKind>;
    /// CRC-32 of the full contents.
    fn checksum(&self) -> u32;
}
