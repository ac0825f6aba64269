//! NUL-terminated strings in the arena.

use std::ffi::CStr;

use lamkit_arena::LinearMemory;
use lamkit_core::Offset;

use crate::error::MarshalError;

/// Copy `s` into a fresh allocation followed by a NUL byte.
///
/// The caller owns the returned allocation. Rejects strings with an
/// interior NUL before allocating anything.
pub fn write_c_string(memory: &mut LinearMemory, s: &str) -> Result<Offset, MarshalError> {
    if s.as_bytes().contains(&0) {
        return Err(MarshalError::NameContainsNul { name: s.to_owned() });
    }
    let offset = memory.allocate(s.len() + 1)?;
    let mut bytes = Vec::with_capacity(s.len() + 1);
    bytes.extend_from_slice(s.as_bytes());
    bytes.push(0);
    if let Err(e) = memory.write_bytes(offset, &bytes) {
        memory.free(offset)?;
        return Err(e.into());
    }
    Ok(offset)
}

/// Read the NUL-terminated UTF-8 string starting at `offset`.
///
/// The string must end inside the allocation that holds it.
pub fn read_c_string(memory: &LinearMemory, offset: Offset) -> Result<&str, MarshalError> {
    let len = memory.block_len(offset)?;
    let bytes = memory.read_bytes(offset, len)?;
    CStr::from_bytes_until_nul(bytes)
        .ok()
        .and_then(|s| s.to_str().ok())
        .ok_or(MarshalError::InvalidString { offset })
}
