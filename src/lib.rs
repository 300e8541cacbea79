//! A fixed size block device kept entirely in memory.
//!
//! [`MemDisk`] owns a zero filled [`Store`] and executes [`Request`]s against
//! it: each request names a direction, a starting 512 byte sector and an
//! ordered list of [`Segment`]s of caller memory. Requests are bounds checked
//! as a whole before any byte moves, and every request completes exactly once
//! with a [`Status`]. [`get_geometry`] reports a synthetic cylinder/head/sector
//! layout for partitioning tools.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod device;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod request;
pub mod storage;
pub mod store;
mod util;

pub use device::{Config, MemDisk};
pub use dispatch::make_request;
pub use error::ErrorKind;
pub use geometry::{get_geometry, Geometry, HdGeometry, HEADS, SECTORS_PER_TRACK};
pub use request::{Completion, Direction, Request, Segment, Status};
pub use storage::Storage;
pub use store::Store;
pub use util::SECTOR_SIZE;
