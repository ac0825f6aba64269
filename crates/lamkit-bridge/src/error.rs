//! Errors raised while passing data across the native boundary.

use std::error::Error;
use std::fmt;

use lamkit_arena::ArenaError;
use lamkit_core::Offset;

/// Errors from marshalling resources or strings into the arena, or from
/// native constructors that reject what they were given.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarshalError {
    /// An arena operation failed. Everything allocated by the failing
    /// call has been released.
    Allocation(ArenaError),
    /// A resource name contains an interior NUL and cannot be passed as a
    /// C string.
    NameContainsNul {
        /// The offending name.
        name: String,
    },
    /// A resource is larger than a 32-bit length can describe.
    EntryTooLarge {
        /// Name of the resource.
        name: String,
        /// Its size in bytes.
        len: usize,
    },
    /// More resources than a 32-bit count can describe.
    TooManyEntries {
        /// Number of resources supplied.
        count: usize,
    },
    /// The native resource-provider constructor returned the null handle.
    ProviderRejected {
        /// Number of entries that were offered.
        count: u32,
    },
    /// The native animation constructor returned the null handle.
    AnimationRejected,
    /// A string read back from the arena is unterminated or not UTF-8.
    InvalidString {
        /// Where the string starts.
        offset: Offset,
    },
}

impl fmt::Display for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocation(e) => write!(f, "marshalling failed: {e}"),
            Self::NameContainsNul { name } => {
                write!(f, "resource name {name:?} contains a NUL byte")
            }
            Self::EntryTooLarge { name, len } => {
                write!(f, "resource {name:?} is too large ({len} bytes)")
            }
            Self::TooManyEntries { count } => {
                write!(f, "too many resources ({count})")
            }
            Self::ProviderRejected { count } => {
                write!(f, "native module rejected a provider of {count} resources")
            }
            Self::AnimationRejected => write!(f, "native module rejected the animation"),
            Self::InvalidString { offset } => {
                write!(f, "no valid NUL-terminated string at offset {offset}")
            }
        }
    }
}

impl Error for MarshalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Allocation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArenaError> for MarshalError {
    fn from(e: ArenaError) -> Self {
        Self::Allocation(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_error_is_source() {
        let e = MarshalError::from(ArenaError::Released);
        assert!(e.source().is_some());
        assert_eq!(
            e.to_string(),
            "marshalling failed: buffer has been released"
        );
    }

    #[test]
    fn rejection_has_no_source() {
        let e = MarshalError::ProviderRejected { count: 3 };
        assert!(e.source().is_none());
        assert!(e.to_string().contains("3 resources"));
    }
}
