//! Element types of the typed overlay views.
//!
//! The native side exposes its memory through eight overlays that alias
//! the same bytes: `HEAP8`, `HEAPU8`, `HEAP16`, `HEAPU16`, `HEAP32`,
//! `HEAPU32`, `HEAPF32` and `HEAPF64`. [`Element`] is implemented for the
//! matching Rust scalar of each; [`HeapKind`] names them at runtime.

use std::fmt;

mod private {
    pub trait Sealed {}
}

/// A scalar type that can be viewed directly over arena bytes.
///
/// Sealed: implemented only for the eight overlay element types.
pub trait Element: bytemuck::Pod + private::Sealed {
    /// Which overlay this element type corresponds to.
    const KIND: HeapKind;
}

macro_rules! element {
    ($ty:ty, $kind:ident) => {
        impl private::Sealed for $ty {}
        impl Element for $ty {
            const KIND: HeapKind = HeapKind::$kind;
        }
    };
}

element!(i8, I8);
element!(u8, U8);
element!(i16, I16);
element!(u16, U16);
element!(i32, I32);
element!(u32, U32);
element!(f32, F32);
element!(f64, F64);

/// Runtime tag for an overlay view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeapKind {
    /// Signed 8-bit (`HEAP8`).
    I8,
    /// Unsigned 8-bit (`HEAPU8`).
    U8,
    /// Signed 16-bit (`HEAP16`).
    I16,
    /// Unsigned 16-bit (`HEAPU16`).
    U16,
    /// Signed 32-bit (`HEAP32`).
    I32,
    /// Unsigned 32-bit (`HEAPU32`).
    U32,
    /// 32-bit float (`HEAPF32`).
    F32,
    /// 64-bit float (`HEAPF64`).
    F64,
}

impl HeapKind {
    /// All overlays, narrowest first.
    pub const ALL: [HeapKind; 8] = [
        HeapKind::I8,
        HeapKind::U8,
        HeapKind::I16,
        HeapKind::U16,
        HeapKind::I32,
        HeapKind::U32,
        HeapKind::F32,
        HeapKind::F64,
    ];

    /// Element width in bytes.
    pub fn width(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /// Name of the overlay as exported by the native module.
    pub fn heap_name(self) -> &'static str {
        match self {
            Self::I8 => "HEAP8",
            Self::U8 => "HEAPU8",
            Self::I16 => "HEAP16",
            Self::U16 => "HEAPU16",
            Self::I32 => "HEAP32",
            Self::U32 => "HEAPU32",
            Self::F32 => "HEAPF32",
            Self::F64 => "HEAPF64",
        }
    }
}

impl fmt::Display for HeapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heap_name())
    }
}

/// A typed view whose element type is chosen at runtime.
///
/// Borrowed from the arena, so it cannot outlive a growth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TypedView<'a> {
    /// `HEAP8` view.
    I8(&'a [i8]),
    /// `HEAPU8` view.
    U8(&'a [u8]),
    /// `HEAP16` view.
    I16(&'a [i16]),
    /// `HEAPU16` view.
    U16(&'a [u16]),
    /// `HEAP32` view.
    I32(&'a [i32]),
    /// `HEAPU32` view.
    U32(&'a [u32]),
    /// `HEAPF32` view.
    F32(&'a [f32]),
    /// `HEAPF64` view.
    F64(&'a [f64]),
}

impl TypedView<'_> {
    /// The overlay this view was taken from.
    pub fn kind(&self) -> HeapKind {
        match self {
            Self::I8(_) => HeapKind::I8,
            Self::U8(_) => HeapKind::U8,
            Self::I16(_) => HeapKind::I16,
            Self::U16(_) => HeapKind::U16,
            Self::I32(_) => HeapKind::I32,
            Self::U32(_) => HeapKind::U32,
            Self::F32(_) => HeapKind::F32,
            Self::F64(_) => HeapKind::F64,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::I8(s) => s.len(),
            Self::U8(s) => s.len(),
            Self::I16(s) => s.len(),
            Self::U16(s) => s.len(),
            Self::I32(s) => s.len(),
            Self::U32(s) => s.len(),
            Self::F32(s) => s.len(),
            Self::F64(s) => s.len(),
        }
    }

    /// Whether the view has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the view in bytes.
    pub fn byte_len(&self) -> usize {
        self.len() * self.kind().width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_match_rust_types() {
        assert_eq!(<i8 as Element>::KIND.width(), std::mem::size_of::<i8>());
        assert_eq!(<u16 as Element>::KIND.width(), std::mem::size_of::<u16>());
        assert_eq!(<i32 as Element>::KIND.width(), std::mem::size_of::<i32>());
        assert_eq!(<f32 as Element>::KIND.width(), std::mem::size_of::<f32>());
        assert_eq!(<f64 as Element>::KIND.width(), std::mem::size_of::<f64>());
    }

    #[test]
    fn heap_names() {
        assert_eq!(HeapKind::U8.to_string(), "HEAPU8");
        assert_eq!(HeapKind::F64.heap_name(), "HEAPF64");
    }

    #[test]
    fn typed_view_byte_len() {
        let data = [1u32, 2, 3];
        let view = TypedView::U32(&data);
        assert_eq!(view.kind(), HeapKind::U32);
        assert_eq!(view.len(), 3);
        assert_eq!(view.byte_len(), 12);
        assert!(!view.is_empty());
    }
}
