//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use lamkit_core::Offset;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The arena cannot grow far enough to satisfy an allocation.
    OutOfMemory {
        /// Number of bytes requested.
        requested: usize,
        /// Capacity of the arena at the time of the request, in bytes.
        capacity: usize,
    },
    /// `free` was called with an offset that is not a live allocation.
    InvalidFree {
        /// The rejected offset.
        offset: Offset,
    },
    /// A view or copy would reach past the end of the arena or buffer.
    OutOfBounds {
        /// Start of the requested range in bytes (or elements, for subviews).
        offset: usize,
        /// Length of the requested range.
        len: usize,
        /// Size of the region the range had to fit in.
        capacity: usize,
    },
    /// A typed view was requested at an offset not aligned to its element.
    Misaligned {
        /// The offending offset.
        offset: Offset,
        /// Required alignment in bytes.
        align: usize,
    },
    /// A cached view was read after the arena grew.
    StaleView {
        /// Epoch the view was taken in.
        view_epoch: u64,
        /// Current growth epoch of the arena.
        current_epoch: u64,
    },
    /// A cached view was asked for before any view was taken.
    NoCachedView,
    /// The buffer handle has already been released.
    Released,
    /// Arena configuration is invalid.
    InvalidConfig {
        /// Description of the violated constraint.
        reason: String,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "arena out of memory: requested {requested} bytes, capacity {capacity} bytes"
                )
            }
            Self::InvalidFree { offset } => {
                write!(f, "free of offset {offset} which is not a live allocation")
            }
            Self::OutOfBounds {
                offset,
                len,
                capacity,
            } => {
                write!(
                    f,
                    "range {offset}..{} out of bounds (size {capacity})",
                    offset.saturating_add(*len)
                )
            }
            Self::Misaligned { offset, align } => {
                write!(f, "offset {offset} is not aligned to {align} bytes")
            }
            Self::StaleView {
                view_epoch,
                current_epoch,
            } => {
                write!(
                    f,
                    "stale view: taken at epoch {view_epoch}, arena is at epoch {current_epoch}"
                )
            }
            Self::NoCachedView => write!(f, "no view has been taken of this buffer yet"),
            Self::Released => write!(f, "buffer has been released"),
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
        }
    }
}

impl Error for ArenaError {}
