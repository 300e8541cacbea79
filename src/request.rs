//! I/O request descriptors and their completion.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::error::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    /// Advisory read, carried out exactly like `Read`.
    ReadAhead,
    Write,
    /// Any other opcode, kept for diagnostics.
    Unsupported(u32),
}

impl Direction {
    pub fn is_read(&self) -> bool {
        matches!(self, Direction::Read | Direction::ReadAhead)
    }
}

#[derive(Debug)]
enum Buffer<'a> {
    /// Caller memory that is only ever read from.
    Source(&'a [u8]),
    Dest(&'a mut [u8]),
}

/// One contiguous region of caller memory taking part in a transfer.
#[derive(Debug)]
pub struct Segment<'a> {
    buf: Buffer<'a>,
    offset: usize,
    len: usize,
}

impl<'a> Segment<'a> {
    pub fn new(buf: &'a mut [u8], offset: usize, len: usize) -> Self {
        Segment {
            buf: Buffer::Dest(buf),
            offset,
            len,
        }
    }

    /// A segment that can only be written to the device.
    pub fn source(buf: &'a [u8], offset: usize, len: usize) -> Self {
        Segment {
            buf: Buffer::Source(buf),
            offset,
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether a read may fill this segment.
    pub fn is_writable(&self) -> bool {
        matches!(self.buf, Buffer::Dest(_))
    }

    /// The addressed bytes, or `InvalidSegment` if they run past the buffer.
    pub(crate) fn bytes(&self) -> Result<&[u8], ErrorKind> {
        let range = self.range()?;
        match &self.buf {
            Buffer::Source(buf) => Ok(&buf[range]),
            Buffer::Dest(buf) => Ok(&buf[range]),
        }
    }

    pub(crate) fn bytes_mut(&mut self) -> Result<&mut [u8], ErrorKind> {
        let range = self.range()?;
        match &mut self.buf {
            Buffer::Source(_) => Err(ErrorKind::InvalidSegment),
            Buffer::Dest(buf) => Ok(&mut buf[range]),
        }
    }

    pub(crate) fn range(&self) -> Result<core::ops::Range<usize>, ErrorKind> {
        let buf_len = match &self.buf {
            Buffer::Source(buf) => buf.len(),
            Buffer::Dest(buf) => buf.len(),
        };
        match self.offset.checked_add(self.len) {
            Some(end) if end <= buf_len => Ok(self.offset..end),
            _ => Err(ErrorKind::InvalidSegment),
        }
    }
}

impl<'a> From<&'a mut [u8]> for Segment<'a> {
    fn from(buf: &'a mut [u8]) -> Self {
        let len = buf.len();
        Segment::new(buf, 0, len)
    }
}

impl<'a> From<&'a [u8]> for Segment<'a> {
    fn from(buf: &'a [u8]) -> Self {
        Segment::source(buf, 0, buf.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    IoError,
}

impl Status {
    /// Errno style result, `0` or `-EIO`.
    pub fn errno(&self) -> i32 {
        match self {
            Status::Success => 0,
            Status::IoError => -EIO,
        }
    }
}

const EIO: i32 = 5;

impl From<Result<(), ErrorKind>> for Status {
    fn from(result: Result<(), ErrorKind>) -> Self {
        match result {
            Ok(()) => Status::Success,
            Err(_) => Status::IoError,
        }
    }
}

/// Outcome of a request; success and failure differ only in `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub status: Status,
    pub sector: u64,
    pub size: u64,
}

pub type EndIo<'a> = Box<dyn FnOnce(&Completion) + 'a>;

/// A single I/O request: a direction, a starting sector and an ordered list
/// of segments transferred back to back.
pub struct Request<'a> {
    direction: Direction,
    sector: u64,
    segments: Vec<Segment<'a>>,
    size: u64,
    end_io: Option<EndIo<'a>>,
}

impl<'a> Request<'a> {
    pub fn new(direction: Direction, sector: u64) -> Self {
        Request {
            direction,
            sector,
            segments: Vec::new(),
            size: 0,
            end_io: None,
        }
    }

    pub fn read(sector: u64) -> Self {
        Self::new(Direction::Read, sector)
    }

    pub fn write(sector: u64) -> Self {
        Self::new(Direction::Write, sector)
    }

    /// Append a segment; the request size grows by its length, saturating so
    /// an oversized request fails its range check instead of wrapping.
    pub fn segment(mut self, segment: Segment<'a>) -> Self {
        self.push(segment);
        self
    }

    pub fn push(&mut self, segment: Segment<'a>) {
        self.size = self.size.saturating_add(segment.len() as u64);
        self.segments.push(segment);
    }

    /// Register the callback run once the request completes.
    pub fn on_complete<F>(mut self, end_io: F) -> Self
    where
        F: FnOnce(&Completion) + 'a,
    {
        self.end_io = Some(Box::new(end_io));
        self
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn sector(&self) -> u64 {
        self.sector
    }

    /// Total bytes covered by all segments.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    pub(crate) fn segments_mut(&mut self) -> &mut [Segment<'a>] {
        &mut self.segments
    }

    /// Report the outcome to the submitter. Runs `end_io` at most once.
    pub(crate) fn complete(&mut self, status: Status) -> Completion {
        let completion = Completion {
            status,
            sector: self.sector,
            size: self.size,
        };
        if let Some(end_io) = self.end_io.take() {
            end_io(&completion);
        }
        completion
    }
}

impl core::fmt::Debug for Request<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Request")
            .field("direction", &self.direction)
            .field("sector", &self.sector)
            .field("size", &self.size)
            .field("segments", &self.segments.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_is_sum_of_segments() {
        let mut a = [0u8; 512];
        let mut b = [0u8; 1024];
        let req = Request::write(0)
            .segment(Segment::from(&mut a[..]))
            .segment(Segment::new(&mut b[..], 256, 512));
        assert_eq!(req.size(), 1024);
        assert_eq!(req.segments().len(), 2);
    }

    #[test]
    fn test_segment_range() {
        let mut buf = [0u8; 64];
        assert_eq!(Segment::new(&mut buf[..], 60, 4).range(), Ok(60..64));
        assert_eq!(
            Segment::new(&mut buf[..], 60, 5).range(),
            Err(ErrorKind::InvalidSegment)
        );
        assert_eq!(
            Segment::new(&mut buf[..], usize::MAX, 2).range(),
            Err(ErrorKind::InvalidSegment)
        );
    }

    #[test]
    fn test_oversized_segments_saturate_size() {
        let mut a = [0u8; 4];
        let mut b = [0u8; 4];
        let req = Request::write(0)
            .segment(Segment::new(&mut a[..], 0, usize::MAX))
            .segment(Segment::new(&mut b[..], 0, usize::MAX));
        assert_eq!(req.size(), u64::MAX);
    }

    #[test]
    fn test_source_segment_is_read_only() {
        let data = [7u8; 16];
        let mut seg = Segment::source(&data[..], 4, 8);
        assert!(!seg.is_writable());
        assert_eq!(seg.bytes(), Ok(&[7u8; 8][..]));
        assert_eq!(seg.bytes_mut(), Err(ErrorKind::InvalidSegment));

        let mut buf = [0u8; 16];
        assert!(Segment::from(&mut buf[..]).is_writable());
    }

    #[test]
    fn test_read_ahead_is_read() {
        assert!(Direction::Read.is_read());
        assert!(Direction::ReadAhead.is_read());
        assert!(!Direction::Write.is_read());
        assert!(!Direction::Unsupported(7).is_read());
    }

    #[test]
    fn test_status_errno() {
        assert_eq!(Status::Success.errno(), 0);
        assert_eq!(Status::IoError.errno(), -5);
        assert_eq!(Status::from(Err(ErrorKind::OutOfRange)), Status::IoError);
    }

    #[test]
    fn test_complete_runs_end_io_once() {
        let mut calls = 0;
        {
            let mut req = Request::read(3).on_complete(|c| {
                assert_eq!(c.sector, 3);
                calls += 1;
            });
            assert_eq!(req.complete(Status::Success).status, Status::Success);
            req.complete(Status::IoError);
        }
        assert_eq!(calls, 1);
    }
}
