//! Packing resource sets into the native resource-provider constructor.
//!
//! Each entry gets two arena allocations (its bytes, and its name as a
//! C string). Three further `u32` tables list, per entry, the name
//! offset, the data offset and the data length. The tables live only for
//! the constructor call; the entry allocations are handed to the native
//! module when it accepts them.
//!
//! Any failure releases every allocation the call made before returning,
//! so a failed marshal leaves the arena's live set as it found it.

use lamkit_arena::{ArenaError, LinearMemory, ManagedBuffer};
use lamkit_core::{NativeHandle, Offset};
use log::{debug, warn};
use smallvec::SmallVec;

use crate::cstr;
use crate::error::MarshalError;
use crate::native::{NativeModule, ResourceTableArgs};
use crate::resource::ResourceSet;

/// The two allocations backing one resource entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryBuffers {
    /// NUL-terminated name.
    pub name: Offset,
    /// Resource bytes.
    pub data: Offset,
    /// Length of the resource bytes.
    pub len: u32,
}

/// A resource set laid out in the arena, ready for the provider
/// constructor.
///
/// Owns the three index tables and, until they are handed off, the
/// per-entry buffers. Dropping a table without releasing it leaks its
/// allocations.
#[must_use]
#[derive(Debug)]
pub struct ResourceTable {
    args: ResourceTableArgs,
    entries: SmallVec<[EntryBuffers; 4]>,
}

impl ResourceTable {
    /// Lay out `resources` in the arena.
    ///
    /// Names are checked for interior NULs and sizes for 32-bit range
    /// before anything is allocated. An empty set allocates nothing and
    /// yields null table offsets with a count of 0.
    pub fn build(memory: &mut LinearMemory, resources: &ResourceSet) -> Result<Self, MarshalError> {
        let count = u32::try_from(resources.len()).map_err(|_| MarshalError::TooManyEntries {
            count: resources.len(),
        })?;
        for (name, data) in resources.iter() {
            if name.as_bytes().contains(&0) {
                return Err(MarshalError::NameContainsNul {
                    name: name.to_owned(),
                });
            }
            if u32::try_from(data.len()).is_err() {
                return Err(MarshalError::EntryTooLarge {
                    name: name.to_owned(),
                    len: data.len(),
                });
            }
        }

        let mut table = Self {
            args: ResourceTableArgs {
                count,
                ..ResourceTableArgs::default()
            },
            entries: SmallVec::with_capacity(resources.len()),
        };
        if let Err(e) = table.fill(memory, resources) {
            if let Err(cleanup) = table.release(memory) {
                warn!("cleanup after failed marshal also failed: {cleanup}");
            }
            return Err(e);
        }
        Ok(table)
    }

    fn fill(&mut self, memory: &mut LinearMemory, resources: &ResourceSet) -> Result<(), MarshalError> {
        for (name, bytes) in resources.iter() {
            let data = memory.allocate(bytes.len())?;
            self.entries.push(EntryBuffers {
                name: Offset::NULL,
                data,
                len: bytes.len() as u32,
            });
            memory.write_bytes(data, bytes)?;
            let name = cstr::write_c_string(memory, name)?;
            if let Some(entry) = self.entries.last_mut() {
                entry.name = name;
            }
        }
        if self.entries.is_empty() {
            return Ok(());
        }

        let names: SmallVec<[u32; 8]> = self.entries.iter().map(|e| e.name.0).collect();
        let data: SmallVec<[u32; 8]> = self.entries.iter().map(|e| e.data.0).collect();
        let sizes: SmallVec<[u32; 8]> = self.entries.iter().map(|e| e.len).collect();
        self.args.names = pack(memory, &names)?;
        self.args.data = pack(memory, &data)?;
        self.args.sizes = pack(memory, &sizes)?;
        Ok(())
    }

    /// Constructor arguments describing this table.
    pub fn args(&self) -> ResourceTableArgs {
        self.args
    }

    /// Per-entry allocations, in set order.
    pub fn entries(&self) -> &[EntryBuffers] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Free the three index tables. Idempotent.
    pub fn release_tables(&mut self, memory: &mut LinearMemory) -> Result<(), ArenaError> {
        for table in [&mut self.args.names, &mut self.args.data, &mut self.args.sizes] {
            memory.free(*table)?;
            *table = Offset::NULL;
        }
        Ok(())
    }

    /// Free the per-entry name and data buffers.
    ///
    /// Only valid while the native side has not taken them over.
    pub fn release_entries(&mut self, memory: &mut LinearMemory) -> Result<(), ArenaError> {
        while let Some(entry) = self.entries.pop() {
            memory.free(entry.data)?;
            memory.free(entry.name)?;
        }
        Ok(())
    }

    fn release(&mut self, memory: &mut LinearMemory) -> Result<(), ArenaError> {
        self.release_tables(memory)?;
        self.release_entries(memory)
    }
}

fn pack(memory: &mut LinearMemory, values: &[u32]) -> Result<Offset, ArenaError> {
    ManagedBuffer::<u32>::from_slice(memory, values).map(ManagedBuffer::into_offset)
}

/// A native resource provider built from a marshalled [`ResourceSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceProvider {
    handle: NativeHandle,
    count: u32,
}

impl ResourceProvider {
    /// The native provider object.
    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    /// Number of resources it was built from.
    pub fn resource_count(&self) -> u32 {
        self.count
    }
}

/// Marshal `resources` and construct a provider from them.
///
/// The index tables are freed once the constructor returns. If it
/// returns the null handle the entry buffers are freed as well and the
/// call fails with [`MarshalError::ProviderRejected`]; otherwise they now
/// belong to the native module.
pub fn marshal<M: NativeModule + ?Sized>(
    memory: &mut LinearMemory,
    native: &mut M,
    resources: &ResourceSet,
) -> Result<ResourceProvider, MarshalError> {
    let mut table = ResourceTable::build(memory, resources)?;
    let args = table.args();
    let handle = native.make_resource_provider(memory, args);
    table.release_tables(memory)?;

    if handle.is_null() {
        table.release_entries(memory)?;
        return Err(MarshalError::ProviderRejected { count: args.count });
    }
    debug!(
        "built resource provider {handle} from {} resources ({} bytes)",
        args.count,
        resources.data_bytes()
    );
    Ok(ResourceProvider {
        handle,
        count: args.count,
    })
}
