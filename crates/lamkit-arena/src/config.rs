//! Arena configuration parameters.

use crate::error::ArenaError;
use crate::memory::PAGE_SIZE;

/// Configuration for the linear memory arena.
///
/// Controls the initial size, the growth limit, and the reserved low
/// region. Validated at construction; immutable afterwards.
#[derive(Clone, Debug)]
pub struct ArenaConfig {
    /// Number of 64 KiB pages allocated up front.
    ///
    /// Default: 16 (1 MiB). Must be at least 1.
    pub initial_pages: u32,

    /// Upper bound on the number of pages the arena may grow to.
    ///
    /// Default: 32_768 (2 GiB). Must be `>= initial_pages` and at most
    /// 65_536, the limit of 32-bit addressing.
    pub max_pages: u32,

    /// Bytes at the bottom of the arena that are never handed out.
    ///
    /// Keeps offset 0 free to act as the null sentinel. Default: 1024.
    /// Must be a non-zero multiple of 8.
    pub heap_base: u32,
}

impl ArenaConfig {
    /// Default initial size: 16 pages.
    pub const DEFAULT_INITIAL_PAGES: u32 = 16;

    /// Default growth limit: 32_768 pages.
    pub const DEFAULT_MAX_PAGES: u32 = 32_768;

    /// Default reserved low region.
    pub const DEFAULT_HEAP_BASE: u32 = 1024;

    /// Largest page count addressable with 32-bit offsets.
    pub const ADDRESSABLE_PAGES: u32 = 65_536;

    /// Create a config starting at `initial_pages` with default limits.
    pub fn new(initial_pages: u32) -> Self {
        Self {
            initial_pages,
            max_pages: Self::DEFAULT_MAX_PAGES.max(initial_pages),
            heap_base: Self::DEFAULT_HEAP_BASE,
        }
    }

    /// Initial capacity in bytes.
    pub fn initial_bytes(&self) -> usize {
        self.initial_pages as usize * PAGE_SIZE
    }

    /// Largest capacity the arena may reach, in bytes.
    pub fn max_bytes(&self) -> usize {
        self.max_pages as usize * PAGE_SIZE
    }

    /// Check structural constraints.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.initial_pages == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "initial_pages must be at least 1".into(),
            });
        }
        if self.max_pages < self.initial_pages {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "max_pages ({}) must be >= initial_pages ({})",
                    self.max_pages, self.initial_pages
                ),
            });
        }
        if self.max_pages > Self::ADDRESSABLE_PAGES {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "max_pages ({}) exceeds the 32-bit addressable limit of {}",
                    self.max_pages,
                    Self::ADDRESSABLE_PAGES
                ),
            });
        }
        if self.heap_base == 0 || self.heap_base % 8 != 0 {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "heap_base must be a non-zero multiple of 8 (got {})",
                    self.heap_base
                ),
            });
        }
        if self.heap_base as usize >= self.initial_bytes() {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "heap_base ({}) leaves no room in {} initial bytes",
                    self.heap_base,
                    self.initial_bytes()
                ),
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INITIAL_PAGES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_one_mib() {
        let config = ArenaConfig::default();
        assert_eq!(config.initial_bytes(), 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_initial_pages_rejected() {
        let config = ArenaConfig {
            initial_pages: 0,
            ..ArenaConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn max_below_initial_rejected() {
        let config = ArenaConfig {
            initial_pages: 4,
            max_pages: 2,
            heap_base: 1024,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unaligned_heap_base_rejected() {
        let config = ArenaConfig {
            heap_base: 12,
            ..ArenaConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn over_addressable_rejected() {
        let config = ArenaConfig {
            initial_pages: 1,
            max_pages: ArenaConfig::ADDRESSABLE_PAGES + 1,
            heap_base: 8,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn new_raises_max_to_initial() {
        let config = ArenaConfig::new(40_000);
        assert_eq!(config.max_pages, 40_000);
    }
}
