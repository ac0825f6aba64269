//! Frame loop configuration, validation, and error types.

use std::error::Error;
use std::fmt;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`LoopConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The frame period is zero.
    ZeroPeriod,
    /// A rebuild cadence of zero iterations was configured.
    ZeroCadence,
    /// The resource name is empty.
    EmptyResourceName,
    /// The resource name contains a NUL byte.
    ResourceNameContainsNul {
        /// The offending name.
        name: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroPeriod => write!(f, "period must be at least 1 frame"),
            Self::ZeroCadence => write!(f, "rebuild_every must be at least 1 when set"),
            Self::EmptyResourceName => write!(f, "resource_name must not be empty"),
            Self::ResourceNameContainsNul { name } => {
                write!(f, "resource_name {name:?} contains a NUL byte")
            }
        }
    }
}

impl Error for ConfigError {}

// ── LoopConfig ─────────────────────────────────────────────────────

/// Configuration of a [`FrameStreamer`](crate::FrameStreamer).
#[derive(Clone, Debug)]
pub struct LoopConfig {
    /// Frames in one animation cycle; the frame index wraps to 0 here.
    /// Default: 60. Must be at least 1.
    pub period: u32,
    /// Rebuild on every iteration whose zero-based index is a multiple of
    /// this. `None` never rebuilds. Default: `Some(1)`.
    pub rebuild_every: Option<u32>,
    /// Name the captured bytes are registered under in each rebuilt
    /// provider. Default: `"image_0.png"`.
    pub resource_name: String,
    /// Stop [`run`](crate::FrameStreamer::run) after this many
    /// iterations. `None` runs until an error. Default: `None`.
    pub max_iterations: Option<u64>,
}

impl LoopConfig {
    /// Default frame period.
    pub const DEFAULT_PERIOD: u32 = 60;

    /// Default resource name.
    pub const DEFAULT_RESOURCE_NAME: &'static str = "image_0.png";

    /// Whether iteration `index` rebuilds the provider.
    pub fn rebuilds_on(&self, index: u64) -> bool {
        match self.rebuild_every {
            Some(n) if n > 0 => index % u64::from(n) == 0,
            _ => false,
        }
    }

    /// Check structural constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.rebuild_every == Some(0) {
            return Err(ConfigError::ZeroCadence);
        }
        if self.resource_name.is_empty() {
            return Err(ConfigError::EmptyResourceName);
        }
        if self.resource_name.as_bytes().contains(&0) {
            return Err(ConfigError::ResourceNameContainsNul {
                name: self.resource_name.clone(),
            });
        }
        Ok(())
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            period: Self::DEFAULT_PERIOD,
            rebuild_every: Some(1),
            resource_name: Self::DEFAULT_RESOURCE_NAME.to_owned(),
            max_iterations: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(LoopConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_period_rejected() {
        let config = LoopConfig {
            period: 0,
            ..LoopConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroPeriod));
    }

    #[test]
    fn zero_cadence_rejected() {
        let config = LoopConfig {
            rebuild_every: Some(0),
            ..LoopConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroCadence));
    }

    #[test]
    fn bad_names_rejected() {
        let empty = LoopConfig {
            resource_name: String::new(),
            ..LoopConfig::default()
        };
        assert_eq!(empty.validate(), Err(ConfigError::EmptyResourceName));
        let nul = LoopConfig {
            resource_name: "a\0b".into(),
            ..LoopConfig::default()
        };
        assert!(matches!(
            nul.validate(),
            Err(ConfigError::ResourceNameContainsNul { .. })
        ));
    }

    #[test]
    fn cadence() {
        let every_third = LoopConfig {
            rebuild_every: Some(3),
            ..LoopConfig::default()
        };
        let hits: Vec<u64> = (0..10).filter(|&i| every_third.rebuilds_on(i)).collect();
        assert_eq!(hits, vec![0, 3, 6, 9]);

        let never = LoopConfig {
            rebuild_every: None,
            ..LoopConfig::default()
        };
        assert!((0..10).all(|i| !never.rebuilds_on(i)));
        assert!((0..5).all(|i| LoopConfig::default().rebuilds_on(i)));
    }
}
