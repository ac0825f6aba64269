//! Strongly-typed identifiers that cross the native boundary.

use std::fmt;

/// Byte offset into the shared linear memory.
///
/// The native side addresses memory with 32-bit pointers, so offsets are
/// `u32`. Offset `0` is never handed out by the allocator and serves as
/// the null sentinel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Offset(pub u32);

impl Offset {
    /// The null sentinel.
    pub const NULL: Offset = Offset(0);

    /// Whether this is the null sentinel.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// The raw byte offset as `usize`, for indexing.
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u32> for Offset {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Opaque handle to an object owned by the native module.
///
/// Resource providers, animations, graphics contexts, surfaces and colour
/// spaces are all referenced through these. `0` is the null handle and is
/// what native constructors return on failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(pub u64);

impl NativeHandle {
    /// The null handle.
    pub const NULL: NativeHandle = NativeHandle(0);

    /// Whether this is the null handle.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u64> for NativeHandle {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies a graphics context created by the host graphics API.
///
/// Context ids are assigned by the host and are always non-zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u32);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ContextId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
