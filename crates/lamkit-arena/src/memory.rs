//! The growable linear memory and its allocator.
//!
//! [`LinearMemory`] is a single contiguous byte region addressed by 32-bit
//! [`Offset`]s, grown in 64 KiB pages. Each allocation is preceded by an
//! 8-byte header (payload size + live/free tag), the same layout a
//! native `malloc` keeps, so `free` needs nothing but the offset.
//!
//! ```text
//! 0          heap_base                                    brk       capacity
//! | reserved | hdr | payload | hdr | (free) | hdr | payload |  unused  |
//! ```
//!
//! Free blocks are kept in an ordered map and coalesced with their
//! neighbours; a free block that reaches `brk` lowers `brk` instead.
//! Growth copies the whole region into a new backing store and bumps the
//! growth epoch, which is what invalidates cached views elsewhere.

use std::collections::BTreeMap;
use std::mem::{align_of, size_of};
use std::ops::Range;

use lamkit_core::Offset;
use log::{debug, trace};

use crate::config::ArenaConfig;
use crate::element::{Element, HeapKind, TypedView};
use crate::error::ArenaError;

/// Size of one memory page in bytes.
pub const PAGE_SIZE: usize = 65_536;

const HEADER_BYTES: usize = 8;
const ALIGN: usize = 8;
const MIN_PAYLOAD: usize = ALIGN;

const TAG_LIVE: u32 = u32::from_le_bytes(*b"LIVE");
const TAG_FREE: u32 = u32::from_le_bytes(*b"FREE");

/// Point-in-time allocator statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryStats {
    /// Current size in pages.
    pub pages: u32,
    /// Current size in bytes.
    pub capacity_bytes: usize,
    /// Bytes held by live allocations, headers included.
    pub used_bytes: usize,
    /// Number of live allocations.
    pub live_allocations: usize,
    /// Number of blocks on the free list.
    pub free_blocks: usize,
    /// Number of growth events so far.
    pub growth_epoch: u64,
}

/// Growable linear memory shared between the host and a native module.
///
/// Owns the backing store and the allocator state. It does not know who
/// owns which allocation; that bookkeeping belongs to callers
/// ([`ManagedBuffer`](crate::ManagedBuffer), the resource marshaller).
///
/// Typed views returned by [`view`](Self::view) borrow `self`, so they
/// cannot be held across [`allocate`](Self::allocate) or
/// [`grow`](Self::grow).
pub struct LinearMemory {
    /// Backing store. `u64` words keep every 8-byte-aligned offset aligned
    /// for all overlay element types.
    words: Vec<u64>,
    pages: u32,
    max_pages: u32,
    heap_base: usize,
    /// First byte never handed out.
    brk: usize,
    /// Free blocks below `brk`: block start (header position) → block length.
    free_blocks: BTreeMap<usize, usize>,
    growth_epoch: u64,
    live_allocations: usize,
    used_bytes: usize,
}

impl LinearMemory {
    /// Create a new arena.
    ///
    /// Returns `Err(ArenaError::InvalidConfig)` if `config` fails validation.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self {
            words: vec![0; config.initial_bytes() / size_of::<u64>()],
            pages: config.initial_pages,
            max_pages: config.max_pages,
            heap_base: config.heap_base as usize,
            brk: config.heap_base as usize,
            free_blocks: BTreeMap::new(),
            growth_epoch: 0,
            live_allocations: 0,
            used_bytes: 0,
        })
    }

    /// Allocate `byte_len` zeroed bytes and return the payload offset.
    ///
    /// May grow the arena, which invalidates every view taken before the
    /// call. A zero-length request still yields a distinct, non-null
    /// offset. Returns `Err(ArenaError::OutOfMemory)` if growth would
    /// exceed `max_pages` or the host cannot provide the memory; in that
    /// case the arena is unchanged.
    pub fn allocate(&mut self, byte_len: usize) -> Result<Offset, ArenaError> {
        let block = block_len_for(byte_len).ok_or(ArenaError::OutOfMemory {
            requested: byte_len,
            capacity: self.capacity_bytes(),
        })?;

        let (start, block) = match self.take_free_block(block) {
            Some(found) => found,
            None => self.bump(block, byte_len)?,
        };

        self.write_header(start, block - HEADER_BYTES, TAG_LIVE);
        self.bytes_mut()[start + HEADER_BYTES..start + block].fill(0);
        self.live_allocations += 1;
        self.used_bytes += block;

        let payload = start + HEADER_BYTES;
        trace!("allocated {byte_len} bytes at {payload:#x}");
        Ok(Offset(payload as u32))
    }

    /// Release an allocation.
    ///
    /// `Offset::NULL` is a no-op. An offset that is not the payload of a
    /// live allocation returns `Err(ArenaError::InvalidFree)` and leaves
    /// the arena untouched.
    pub fn free(&mut self, offset: Offset) -> Result<(), ArenaError> {
        if offset.is_null() {
            return Ok(());
        }
        let (start, payload_len) = self.live_block(offset)?;

        let mut block_start = start;
        let mut block_len = HEADER_BYTES + payload_len;
        self.write_header(start, payload_len, TAG_FREE);
        self.live_allocations -= 1;
        self.used_bytes -= block_len;

        if let Some(next_len) = self.free_blocks.remove(&(block_start + block_len)) {
            block_len += next_len;
        }
        let previous = self
            .free_blocks
            .range(..block_start)
            .next_back()
            .map(|(&s, &l)| (s, l));
        if let Some((prev_start, prev_len)) = previous {
            if prev_start + prev_len == block_start {
                self.free_blocks.remove(&prev_start);
                block_start = prev_start;
                block_len += prev_len;
            }
        }

        if block_start + block_len == self.brk {
            self.brk = block_start;
        } else {
            self.insert_free(block_start, block_len);
        }
        trace!("freed allocation at {offset}");
        Ok(())
    }

    /// Grow the arena by `delta_pages`, returning the previous page count.
    ///
    /// A zero delta is a query and does not relocate.
    pub fn grow(&mut self, delta_pages: u32) -> Result<u32, ArenaError> {
        let previous = self.pages;
        if delta_pages == 0 {
            return Ok(previous);
        }
        let target = previous as usize + delta_pages as usize;
        let requested = delta_pages as usize * PAGE_SIZE;
        if target > self.max_pages as usize {
            return Err(ArenaError::OutOfMemory {
                requested,
                capacity: self.capacity_bytes(),
            });
        }
        self.relocate(target, requested)?;
        Ok(previous)
    }

    /// Payload capacity of a live allocation in bytes.
    ///
    /// At least the length that was requested, rounded up to 8 bytes.
    pub fn block_len(&self, offset: Offset) -> Result<usize, ArenaError> {
        self.live_block(offset).map(|(_, len)| len)
    }

    /// Typed view of `count` elements starting at `offset`.
    pub fn view<T: Element>(&self, offset: Offset, count: usize) -> Result<&[T], ArenaError> {
        let range = self.element_range::<T>(offset, count)?;
        bytemuck::try_cast_slice(&self.bytes()[range]).map_err(|_| ArenaError::Misaligned {
            offset,
            align: align_of::<T>(),
        })
    }

    /// Mutable typed view of `count` elements starting at `offset`.
    pub fn view_mut<T: Element>(
        &mut self,
        offset: Offset,
        count: usize,
    ) -> Result<&mut [T], ArenaError> {
        let range = self.element_range::<T>(offset, count)?;
        bytemuck::try_cast_slice_mut(&mut self.bytes_mut()[range]).map_err(|_| {
            ArenaError::Misaligned {
                offset,
                align: align_of::<T>(),
            }
        })
    }

    /// Typed view with the element type chosen at runtime.
    pub fn view_kind(
        &self,
        kind: HeapKind,
        offset: Offset,
        count: usize,
    ) -> Result<TypedView<'_>, ArenaError> {
        Ok(match kind {
            HeapKind::I8 => TypedView::I8(self.view(offset, count)?),
            HeapKind::U8 => TypedView::U8(self.view(offset, count)?),
            HeapKind::I16 => TypedView::I16(self.view(offset, count)?),
            HeapKind::U16 => TypedView::U16(self.view(offset, count)?),
            HeapKind::I32 => TypedView::I32(self.view(offset, count)?),
            HeapKind::U32 => TypedView::U32(self.view(offset, count)?),
            HeapKind::F32 => TypedView::F32(self.view(offset, count)?),
            HeapKind::F64 => TypedView::F64(self.view(offset, count)?),
        })
    }

    /// Copy `data` into the arena at `offset`.
    pub fn write<T: Element>(&mut self, offset: Offset, data: &[T]) -> Result<(), ArenaError> {
        self.view_mut::<T>(offset, data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// Copy bytes into the arena at `offset`.
    pub fn write_bytes(&mut self, offset: Offset, data: &[u8]) -> Result<(), ArenaError> {
        self.write(offset, data)
    }

    /// Borrow `len` bytes at `offset`.
    pub fn read_bytes(&self, offset: Offset, len: usize) -> Result<&[u8], ArenaError> {
        self.view(offset, len)
    }

    /// Current size in pages.
    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Current size in bytes.
    pub fn capacity_bytes(&self) -> usize {
        self.pages as usize * PAGE_SIZE
    }

    /// Number of growth events so far.
    ///
    /// Any view taken at an earlier epoch refers to a backing store that
    /// no longer exists.
    pub fn growth_epoch(&self) -> u64 {
        self.growth_epoch
    }

    /// First offset the allocator may hand out a header at.
    pub fn heap_base(&self) -> usize {
        self.heap_base
    }

    /// Snapshot of allocator statistics.
    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            pages: self.pages,
            capacity_bytes: self.capacity_bytes(),
            used_bytes: self.used_bytes,
            live_allocations: self.live_allocations,
            free_blocks: self.free_blocks.len(),
            growth_epoch: self.growth_epoch,
        }
    }

    fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.words)
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.words)
    }

    /// First-fit search of the free list. Splits the block when the
    /// remainder can hold a minimum allocation.
    fn take_free_block(&mut self, block: usize) -> Option<(usize, usize)> {
        let (start, len) = self
            .free_blocks
            .iter()
            .find(|(_, len)| **len >= block)
            .map(|(&s, &l)| (s, l))?;
        self.free_blocks.remove(&start);

        let remainder = len - block;
        if remainder >= HEADER_BYTES + MIN_PAYLOAD {
            self.insert_free(start + block, remainder);
            Some((start, block))
        } else {
            Some((start, len))
        }
    }

    /// Carve a block from the top of the heap, growing if needed.
    fn bump(&mut self, block: usize, requested: usize) -> Result<(usize, usize), ArenaError> {
        let out_of_memory = ArenaError::OutOfMemory {
            requested,
            capacity: self.capacity_bytes(),
        };
        let end = self.brk.checked_add(block).ok_or(out_of_memory.clone())?;
        if end > self.capacity_bytes() {
            let needed = end.div_ceil(PAGE_SIZE);
            if needed > self.max_pages as usize {
                return Err(out_of_memory);
            }
            let doubled = (self.pages as usize * 2).min(self.max_pages as usize);
            self.relocate(needed.max(doubled), requested)?;
        }
        let start = self.brk;
        self.brk = end;
        Ok((start, block))
    }

    /// Move the contents into a new backing store of `new_pages` pages.
    fn relocate(&mut self, new_pages: usize, requested: usize) -> Result<(), ArenaError> {
        let new_words = new_pages * PAGE_SIZE / size_of::<u64>();
        let mut words: Vec<u64> = Vec::new();
        words
            .try_reserve_exact(new_words)
            .map_err(|_| ArenaError::OutOfMemory {
                requested,
                capacity: self.capacity_bytes(),
            })?;
        words.extend_from_slice(&self.words);
        words.resize(new_words, 0);

        let old_pages = self.pages;
        self.words = words;
        self.pages = new_pages as u32;
        self.growth_epoch += 1;
        debug!(
            "linear memory grew from {old_pages} to {new_pages} pages (epoch {})",
            self.growth_epoch
        );
        Ok(())
    }

    /// Resolve a payload offset to `(block start, payload length)`.
    fn live_block(&self, offset: Offset) -> Result<(usize, usize), ArenaError> {
        let invalid = ArenaError::InvalidFree { offset };
        let payload = offset.get();
        if payload < self.heap_base + HEADER_BYTES || payload > self.brk || payload % ALIGN != 0 {
            return Err(invalid);
        }
        let start = payload - HEADER_BYTES;
        let (len, tag) = self.read_header(start);
        if tag != TAG_LIVE || payload + len > self.brk {
            return Err(invalid);
        }
        Ok((start, len))
    }

    fn insert_free(&mut self, start: usize, len: usize) {
        self.write_header(start, len - HEADER_BYTES, TAG_FREE);
        self.free_blocks.insert(start, len);
    }

    fn read_header(&self, start: usize) -> (usize, u32) {
        let bytes = &self.bytes()[start..start + HEADER_BYTES];
        let mut len = [0u8; 4];
        let mut tag = [0u8; 4];
        len.copy_from_slice(&bytes[..4]);
        tag.copy_from_slice(&bytes[4..]);
        (u32::from_le_bytes(len) as usize, u32::from_le_bytes(tag))
    }

    fn write_header(&mut self, start: usize, payload_len: usize, tag: u32) {
        let header = &mut self.bytes_mut()[start..start + HEADER_BYTES];
        header[..4].copy_from_slice(&(payload_len as u32).to_le_bytes());
        header[4..].copy_from_slice(&tag.to_le_bytes());
    }

    fn element_range<T: Element>(
        &self,
        offset: Offset,
        count: usize,
    ) -> Result<Range<usize>, ArenaError> {
        let capacity = self.capacity_bytes();
        let start = offset.get();
        let end = count
            .checked_mul(size_of::<T>())
            .and_then(|len| start.checked_add(len))
            .filter(|&end| end <= capacity)
            .ok_or(ArenaError::OutOfBounds {
                offset: start,
                len: count.saturating_mul(size_of::<T>()),
                capacity,
            })?;
        if start % align_of::<T>() != 0 {
            return Err(ArenaError::Misaligned {
                offset,
                align: align_of::<T>(),
            });
        }
        Ok(start..end)
    }
}

/// Total block length (header + aligned payload) for a request, or `None`
/// if it cannot be described by a 32-bit header.
fn block_len_for(byte_len: usize) -> Option<usize> {
    let payload = byte_len.max(MIN_PAYLOAD).checked_add(ALIGN - 1)? & !(ALIGN - 1);
    let block = payload.checked_add(HEADER_BYTES)?;
    (payload <= u32::MAX as usize).then_some(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> LinearMemory {
        LinearMemory::new(ArenaConfig {
            initial_pages: 1,
            max_pages: 8,
            heap_base: 64,
        })
        .unwrap()
    }

    #[test]
    fn allocations_are_non_null_and_aligned() {
        let mut mem = small();
        for len in [0, 1, 7, 8, 9, 100] {
            let off = mem.allocate(len).unwrap();
            assert!(!off.is_null());
            assert_eq!(off.get() % 8, 0);
            assert!(off.get() >= mem.heap_base());
        }
    }

    #[test]
    fn zero_length_allocations_are_distinct() {
        let mut mem = small();
        let a = mem.allocate(0).unwrap();
        let b = mem.allocate(0).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn allocations_are_zeroed_and_disjoint() {
        let mut mem = small();
        let a = mem.allocate(16).unwrap();
        let b = mem.allocate(16).unwrap();
        assert!(mem.read_bytes(a, 16).unwrap().iter().all(|&x| x == 0));
        mem.write_bytes(a, &[0xAA; 16]).unwrap();
        mem.write_bytes(b, &[0xBB; 16]).unwrap();
        assert!(mem.read_bytes(a, 16).unwrap().iter().all(|&x| x == 0xAA));
        assert!(mem.read_bytes(b, 16).unwrap().iter().all(|&x| x == 0xBB));
    }

    #[test]
    fn freed_block_is_reused() {
        let mut mem = small();
        let a = mem.allocate(32).unwrap();
        let _b = mem.allocate(32).unwrap();
        mem.free(a).unwrap();
        assert_eq!(mem.stats().free_blocks, 1);
        let c = mem.allocate(32).unwrap();
        assert_eq!(c, a);
        assert_eq!(mem.stats().free_blocks, 0);
    }

    #[test]
    fn reused_block_is_zeroed() {
        let mut mem = small();
        let a = mem.allocate(16).unwrap();
        let _guard = mem.allocate(16).unwrap();
        mem.write_bytes(a, &[7; 16]).unwrap();
        mem.free(a).unwrap();
        let b = mem.allocate(16).unwrap();
        assert_eq!(a, b);
        assert!(mem.read_bytes(b, 16).unwrap().iter().all(|&x| x == 0));
    }

    #[test]
    fn freeing_everything_returns_to_empty() {
        let mut mem = small();
        let offs: Vec<Offset> = (0..10).map(|i| mem.allocate(i * 10).unwrap()).collect();
        for off in offs.iter().step_by(2) {
            mem.free(*off).unwrap();
        }
        for off in offs.iter().skip(1).step_by(2) {
            mem.free(*off).unwrap();
        }
        let stats = mem.stats();
        assert_eq!(stats.live_allocations, 0);
        assert_eq!(stats.used_bytes, 0);
        assert_eq!(stats.free_blocks, 0, "adjacent free blocks must coalesce");
    }

    #[test]
    fn split_block_leaves_remainder_on_free_list() {
        let mut mem = small();
        let big = mem.allocate(256).unwrap();
        let _guard = mem.allocate(8).unwrap();
        mem.free(big).unwrap();
        let small_alloc = mem.allocate(8).unwrap();
        assert_eq!(small_alloc, big);
        assert_eq!(mem.stats().free_blocks, 1);
        assert!(mem.block_len(small_alloc).unwrap() >= 8);
    }

    #[test]
    fn free_null_is_noop() {
        let mut mem = small();
        let before = mem.stats();
        mem.free(Offset::NULL).unwrap();
        assert_eq!(mem.stats(), before);
    }

    #[test]
    fn double_free_is_rejected_without_damage() {
        let mut mem = small();
        let a = mem.allocate(24).unwrap();
        let b = mem.allocate(24).unwrap();
        mem.free(a).unwrap();
        let before = mem.stats();
        assert_eq!(mem.free(a), Err(ArenaError::InvalidFree { offset: a }));
        assert_eq!(mem.stats(), before);
        assert_eq!(mem.block_len(b).unwrap(), 24);
    }

    #[test]
    fn bogus_offsets_are_rejected() {
        let mut mem = small();
        let a = mem.allocate(24).unwrap();
        assert!(mem.free(Offset(a.0 + 4)).is_err());
        assert!(mem.free(Offset(8)).is_err());
        assert!(mem.free(Offset(60_000)).is_err());
    }

    #[test]
    fn allocation_past_capacity_grows_and_bumps_epoch() {
        let mut mem = small();
        let a = mem.allocate(4).unwrap();
        mem.write::<u32>(a, &[0xDEAD_BEEF]).unwrap();
        assert_eq!(mem.growth_epoch(), 0);

        let big = mem.allocate(PAGE_SIZE).unwrap();
        assert_eq!(mem.growth_epoch(), 1);
        assert_eq!(mem.pages(), 2);
        assert!(big.get() + PAGE_SIZE <= mem.capacity_bytes());
        assert_eq!(mem.view::<u32>(a, 1).unwrap(), &[0xDEAD_BEEF]);
    }

    #[test]
    fn growth_at_least_doubles() {
        let mut mem = LinearMemory::new(ArenaConfig {
            initial_pages: 2,
            max_pages: 64,
            heap_base: 64,
        })
        .unwrap();
        mem.allocate(2 * PAGE_SIZE).unwrap();
        assert_eq!(mem.pages(), 4);
    }

    #[test]
    fn out_of_memory_leaves_arena_unchanged() {
        let mut mem = LinearMemory::new(ArenaConfig {
            initial_pages: 1,
            max_pages: 1,
            heap_base: 64,
        })
        .unwrap();
        let before = mem.stats();
        let result = mem.allocate(PAGE_SIZE);
        assert!(matches!(result, Err(ArenaError::OutOfMemory { .. })));
        assert_eq!(mem.stats(), before);
    }

    #[test]
    fn explicit_grow_returns_previous_pages() {
        let mut mem = small();
        assert_eq!(mem.grow(0).unwrap(), 1);
        assert_eq!(mem.growth_epoch(), 0);
        assert_eq!(mem.grow(3).unwrap(), 1);
        assert_eq!(mem.pages(), 4);
        assert_eq!(mem.growth_epoch(), 1);
        assert!(mem.grow(100).is_err());
    }

    #[test]
    fn misaligned_view_is_rejected() {
        let mut mem = small();
        let a = mem.allocate(16).unwrap();
        let result = mem.view::<u32>(Offset(a.0 + 1), 2);
        assert!(matches!(result, Err(ArenaError::Misaligned { align: 4, .. })));
    }

    #[test]
    fn view_past_capacity_is_out_of_bounds() {
        let mem = small();
        let result = mem.view::<u8>(Offset(PAGE_SIZE as u32 - 2), 4);
        assert!(matches!(result, Err(ArenaError::OutOfBounds { .. })));
        let overflow = mem.view::<f64>(Offset(8), usize::MAX);
        assert!(matches!(overflow, Err(ArenaError::OutOfBounds { .. })));
    }

    #[test]
    fn overlays_alias_the_same_bytes() {
        let mut mem = small();
        let a = mem.allocate(8).unwrap();
        mem.write::<u8>(a, &[1, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(mem.view::<u32>(a, 1).unwrap(), &[1]);
        assert_eq!(mem.view::<i32>(Offset(a.0 + 4), 1).unwrap(), &[-1]);
        match mem.view_kind(HeapKind::U16, a, 4).unwrap() {
            TypedView::U16(s) => assert_eq!(s, &[1, 0, 0xFFFF, 0xFFFF]),
            other => panic!("expected U16 view, got {:?}", other.kind()),
        }
    }

    #[test]
    fn stats_track_live_allocations() {
        let mut mem = small();
        let a = mem.allocate(10).unwrap();
        let _b = mem.allocate(20).unwrap();
        let stats = mem.stats();
        assert_eq!(stats.live_allocations, 2);
        assert_eq!(stats.used_bytes, (8 + 16) + (8 + 24));
        mem.free(a).unwrap();
        assert_eq!(mem.stats().live_allocations, 1);
    }

    #[test]
    fn invalid_config_rejected() {
        let result = LinearMemory::new(ArenaConfig {
            initial_pages: 0,
            max_pages: 1,
            heap_base: 8,
        });
        assert!(matches!(result, Err(ArenaError::InvalidConfig { .. })));
    }
}
