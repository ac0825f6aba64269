//! Benchmark profiles for the LamKit host bridge.
//!
//! - [`bench_memory`]: an arena sized like a browser default (16 pages,
//!   growable to 256 MiB)
//! - [`frame_resources`]: a resource set shaped like one captured frame
//! - [`asset_bundle`]: many small named assets

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use lamkit_arena::{ArenaConfig, ArenaError, LinearMemory};
use lamkit_bridge::{ResourceEntry, ResourceSet};

/// Arena used by every benchmark.
pub fn bench_memory() -> Result<LinearMemory, ArenaError> {
    LinearMemory::new(ArenaConfig {
        max_pages: 4096,
        ..ArenaConfig::default()
    })
}

/// A single `image_0.png` entry of `bytes` pseudo-random bytes.
pub fn frame_resources(bytes: usize, seed: u32) -> ResourceSet {
    ResourceSet::single("image_0.png", noise(bytes, seed))
}

/// `count` assets named `asset_<i>.bin`, each `bytes` long.
pub fn asset_bundle(count: usize, bytes: usize) -> ResourceSet {
    (0..count)
        .map(|i| ResourceEntry::new(format!("asset_{i}.bin"), noise(bytes, i as u32)))
        .collect()
}

/// Deterministic filler bytes (xorshift32).
fn noise(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9E37_79B9) | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_have_requested_shape() {
        assert_eq!(frame_resources(1000, 1).data_bytes(), 1000);
        let bundle = asset_bundle(16, 32);
        assert_eq!(bundle.len(), 16);
        assert_eq!(bundle.data_bytes(), 512);
        assert!(bench_memory().is_ok());
    }

    #[test]
    fn noise_is_deterministic() {
        assert_eq!(noise(64, 7), noise(64, 7));
        assert_ne!(noise(64, 7), noise(64, 8));
    }
}
