#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An offset/length pair falls outside the device.
    OutOfRange,
    /// Request direction is neither a read nor a write.
    UnsupportedDirection,
    /// A segment points outside its own buffer.
    InvalidSegment,
    /// The backing buffer could not be allocated.
    AllocationFailure,
    /// Device configuration rejected at activation.
    InvalidConfig,
}
