//! Error types shared across the LamKit workspace.

use std::error::Error;
use std::fmt;

/// Errors from an external byte capture source.
///
/// A capture either resolves to bytes or to one of these. The frame loop
/// treats both variants as fatal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureError {
    /// The source could not produce a frame (device lost, stream ended).
    Failed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The frame was produced but could not be encoded.
    Encode {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { reason } => write!(f, "capture failed: {reason}"),
            Self::Encode { reason } => write!(f, "capture encoding failed: {reason}"),
        }
    }
}

impl Error for CaptureError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_reason() {
        let e = CaptureError::Encode {
            reason: "bad dimensions".into(),
        };
        assert_eq!(e.to_string(), "capture encoding failed: bad dimensions");
    }
}
