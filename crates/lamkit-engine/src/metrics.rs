//! Counters for the frame streaming loop.

/// Cumulative counters of a [`FrameStreamer`](crate::FrameStreamer).
///
/// Durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoopMetrics {
    /// Iterations completed.
    pub iterations: u64,
    /// Frames rendered.
    pub renders: u64,
    /// Successful provider/animation rebuilds.
    pub rebuilds: u64,
    /// Rebuilds that failed and left the previous pair active.
    pub rebuild_failures: u64,
    /// Size of the most recent capture, in bytes.
    pub last_capture_bytes: usize,
    /// Time spent rebuilding, summed over all attempts.
    pub rebuild_us_total: u64,
}

impl LoopMetrics {
    /// Mean rebuild time over all attempts, in microseconds.
    pub fn mean_rebuild_us(&self) -> Option<u64> {
        let attempts = self.rebuilds + self.rebuild_failures;
        (attempts > 0).then(|| self.rebuild_us_total / attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = LoopMetrics::default();
        assert_eq!(m.iterations, 0);
        assert_eq!(m.renders, 0);
        assert_eq!(m.rebuilds, 0);
        assert_eq!(m.rebuild_failures, 0);
        assert_eq!(m.last_capture_bytes, 0);
        assert_eq!(m.mean_rebuild_us(), None);
    }

    #[test]
    fn mean_counts_failures() {
        let m = LoopMetrics {
            rebuilds: 3,
            rebuild_failures: 1,
            rebuild_us_total: 400,
            ..LoopMetrics::default()
        };
        assert_eq!(m.mean_rebuild_us(), Some(100));
    }
}
