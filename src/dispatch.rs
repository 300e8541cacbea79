//! Translation of a request into copies against a `Storage`.

use log::{debug, error, trace};

use crate::error::ErrorKind;
use crate::request::{Direction, Request};
use crate::storage::Storage;
use crate::util::{check_bounds, sector_to_offset};

/// Carry out `request` against `storage`.
///
/// Nothing is copied unless the direction is supported, the whole request
/// fits on the device and every segment fits in its buffer. Once copying
/// starts, segments are transferred in order at increasing device offsets.
pub fn make_request<T: Storage>(
    storage: &mut T,
    name: &str,
    request: &mut Request<'_>,
) -> Result<(), ErrorKind> {
    let direction = request.direction();
    if let Direction::Unsupported(op) = direction {
        error!("{}: unknown request direction: {}", name, op);
        return Err(ErrorKind::UnsupportedDirection);
    }

    let start = match start_offset(request, storage.capacity()) {
        Ok(start) => start,
        Err(e) => {
            error!(
                "{}: bad request: sector={}, count={}",
                name,
                request.sector(),
                request.size()
            );
            return Err(e);
        }
    };

    for (idx, segment) in request.segments().iter().enumerate() {
        if let Err(e) = segment.range() {
            error!("{}: segment {} runs past its buffer", name, idx);
            return Err(e);
        }
        if direction.is_read() && !segment.is_writable() {
            error!("{}: segment {} is read only", name, idx);
            return Err(ErrorKind::InvalidSegment);
        }
    }

    let mut cursor = start;
    for segment in request.segments_mut() {
        let len = segment.len();
        if direction.is_read() {
            debug!("{}: read {}", name, len);
            storage.read(cursor, segment.bytes_mut()?)?;
        } else {
            debug!("{}: write {}", name, len);
            storage.write(cursor, segment.bytes()?)?;
        }
        cursor += len as u64;
        trace!("{}: cursor at {}", name, cursor);
    }

    Ok(())
}

/// Device offset of the first byte of `request`, once the whole request is
/// known to fit in `capacity` bytes.
fn start_offset(request: &Request<'_>, capacity: u64) -> Result<u64, ErrorKind> {
    let start = sector_to_offset(request.sector())?;
    check_bounds(start, request.size(), capacity)?;
    Ok(start)
}
