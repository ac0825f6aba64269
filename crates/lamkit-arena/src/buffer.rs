//! Growth-safe buffer handles.
//!
//! A [`ManagedBuffer`] owns one allocation in a [`LinearMemory`] and hands
//! out typed views of it. It caches the view descriptor together with the
//! growth epoch it was derived in; an epoch mismatch means the arena has
//! relocated since, so the view is re-derived from the offset instead of
//! reused. This gives O(1) staleness checks without a lookup table.

use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;

use lamkit_core::Offset;
use log::warn;

use crate::element::Element;
use crate::error::ArenaError;
use crate::memory::LinearMemory;

/// Where the last view was taken, and in which growth epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CachedView {
    epoch: u64,
    offset: Offset,
    len: usize,
}

/// A single allocation of `len` elements of `T` inside a [`LinearMemory`].
///
/// Exclusively owned by whoever allocated it; it is not `Clone`. The
/// offset is non-null only while the allocation is live. Dropping a live
/// buffer without calling [`free`](Self::free) leaks the allocation (the
/// buffer does not hold the arena), unless ownership was handed on with
/// [`into_offset`](Self::into_offset).
#[must_use]
pub struct ManagedBuffer<T: Element> {
    offset: Offset,
    len: usize,
    cached: Option<CachedView>,
    _element: PhantomData<T>,
}

impl<T: Element> ManagedBuffer<T> {
    /// Allocate room for `count` elements.
    ///
    /// Returns `Err(ArenaError::OutOfMemory)` if `count * size_of::<T>()`
    /// overflows or the arena cannot grow far enough.
    pub fn allocate(memory: &mut LinearMemory, count: usize) -> Result<Self, ArenaError> {
        let byte_len = count
            .checked_mul(size_of::<T>())
            .ok_or(ArenaError::OutOfMemory {
                requested: usize::MAX,
                capacity: memory.capacity_bytes(),
            })?;
        let offset = memory.allocate(byte_len)?;
        Ok(Self {
            offset,
            len: count,
            cached: None,
            _element: PhantomData,
        })
    }

    /// Allocate and copy `data` in.
    pub fn from_slice(memory: &mut LinearMemory, data: &[T]) -> Result<Self, ArenaError> {
        let buffer = Self::allocate(memory, data.len())?;
        if let Err(e) = memory.write(buffer.offset, data) {
            memory.free(buffer.offset)?;
            return Err(e);
        }
        Ok(buffer)
    }

    /// View the buffer's elements.
    ///
    /// Reuses the cached descriptor if the arena has not grown since it
    /// was taken; otherwise derives a fresh one from the current backing
    /// store and caches it. Returns `Err(ArenaError::Released)` after
    /// [`free`](Self::free).
    pub fn to_view<'m>(&mut self, memory: &'m LinearMemory) -> Result<&'m [T], ArenaError> {
        let view = self.refresh(memory)?;
        memory.view(view.offset, view.len)
    }

    /// Mutable counterpart of [`to_view`](Self::to_view).
    pub fn to_view_mut<'m>(
        &mut self,
        memory: &'m mut LinearMemory,
    ) -> Result<&'m mut [T], ArenaError> {
        let view = self.refresh(memory)?;
        memory.view_mut(view.offset, view.len)
    }

    /// Elements `start..end` of the buffer.
    ///
    /// Goes through [`to_view`](Self::to_view), so the slice is always
    /// taken from the current backing store and borrows the arena.
    pub fn subview<'m>(
        &mut self,
        memory: &'m LinearMemory,
        start: usize,
        end: usize,
    ) -> Result<&'m [T], ArenaError> {
        let len = self.len;
        let view = self.to_view(memory)?;
        if start > end || end > len {
            return Err(ArenaError::OutOfBounds {
                offset: start,
                len: end.saturating_sub(start),
                capacity: len,
            });
        }
        Ok(&view[start..end])
    }

    /// View through the cached descriptor without re-deriving it.
    ///
    /// Returns `Err(ArenaError::StaleView)` if the arena grew after the
    /// descriptor was taken, and `Err(ArenaError::NoCachedView)` if none
    /// was taken yet.
    pub fn cached_view<'m>(&self, memory: &'m LinearMemory) -> Result<&'m [T], ArenaError> {
        if self.offset.is_null() {
            return Err(ArenaError::Released);
        }
        match self.cached {
            Some(view) if view.epoch == memory.growth_epoch() => memory.view(view.offset, view.len),
            Some(view) => Err(ArenaError::StaleView {
                view_epoch: view.epoch,
                current_epoch: memory.growth_epoch(),
            }),
            None => Err(ArenaError::NoCachedView),
        }
    }

    /// Copy `data` into the start of the buffer.
    pub fn write(&mut self, memory: &mut LinearMemory, data: &[T]) -> Result<(), ArenaError> {
        if data.len() > self.len {
            return Err(ArenaError::OutOfBounds {
                offset: 0,
                len: data.len(),
                capacity: self.len,
            });
        }
        self.to_view_mut(memory)?[..data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Release the allocation.
    ///
    /// Sets the offset to the null sentinel and drops the cached view.
    /// Releasing an already released buffer is a logged no-op.
    pub fn free(&mut self, memory: &mut LinearMemory) -> Result<(), ArenaError> {
        if self.offset.is_null() {
            warn!("ignoring double free of a released {} buffer", T::KIND);
            return Ok(());
        }
        memory.free(self.offset)?;
        self.offset = Offset::NULL;
        self.cached = None;
        Ok(())
    }

    /// Give up ownership of the allocation without freeing it.
    ///
    /// Used when the native side takes over the allocation.
    pub fn into_offset(self) -> Offset {
        self.offset
    }

    /// Offset of the allocation, or `Offset::NULL` once released.
    pub fn offset(&self) -> Offset {
        self.offset
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Length in bytes.
    pub fn byte_len(&self) -> usize {
        self.len * size_of::<T>()
    }

    /// Whether the allocation is still live.
    pub fn is_live(&self) -> bool {
        !self.offset.is_null()
    }

    /// Growth epoch of the cached view, if one is cached.
    pub fn view_epoch(&self) -> Option<u64> {
        self.cached.map(|v| v.epoch)
    }

    fn refresh(&mut self, memory: &LinearMemory) -> Result<CachedView, ArenaError> {
        if self.offset.is_null() {
            return Err(ArenaError::Released);
        }
        let epoch = memory.growth_epoch();
        match self.cached {
            Some(view) if view.epoch == epoch => Ok(view),
            _ => {
                let view = CachedView {
                    epoch,
                    offset: self.offset,
                    len: self.len,
                };
                self.cached = Some(view);
                Ok(view)
            }
        }
    }
}

impl<T: Element> fmt::Debug for ManagedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedBuffer")
            .field("kind", &T::KIND)
            .field("offset", &self.offset)
            .field("len", &self.len)
            .field("view_epoch", &self.view_epoch())
            .finish()
    }
}
