//! Scripted async capabilities for the frame loop.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use lamkit_core::{CaptureError, CaptureSource, FrameClock};

/// A future that is pending on its first poll and ready on the second.
///
/// Wakes itself before returning pending, so any executor polls it again.
#[derive(Default)]
pub struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Capture source that replays a script of results.
///
/// Each capture yields once before resolving. When the script runs out
/// the last successful result repeats; an empty script fails.
pub struct ScriptedCapture {
    script: VecDeque<Result<Vec<u8>, CaptureError>>,
    last: Option<Vec<u8>>,
    pub calls: usize,
}

impl ScriptedCapture {
    /// Always capture `bytes`.
    pub fn repeating(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            script: VecDeque::new(),
            last: Some(bytes.into()),
            calls: 0,
        }
    }

    /// Capture the given results in order.
    pub fn sequence(script: impl IntoIterator<Item = Result<Vec<u8>, CaptureError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: None,
            calls: 0,
        }
    }

    /// Successive frames `[0]`, `[1]`, `[2]`, ... up to `n`, then repeat the last.
    pub fn counting(n: u8) -> Self {
        Self::sequence((0..n).map(|i| Ok(vec![i])))
    }
}

impl CaptureSource for ScriptedCapture {
    async fn capture(&mut self) -> Result<Vec<u8>, CaptureError> {
        YieldOnce::default().await;
        self.calls += 1;
        match self.script.pop_front() {
            Some(Ok(bytes)) => {
                self.last = Some(bytes.clone());
                Ok(bytes)
            }
            Some(Err(e)) => Err(e),
            None => self.last.clone().ok_or(CaptureError::Failed {
                reason: "capture script exhausted".into(),
            }),
        }
    }
}

/// Frame clock that resolves after a single yield, advancing by one
/// 60 Hz frame each time.
#[derive(Default)]
pub struct ImmediateClock {
    now_ms: f64,
    pub ticks: usize,
}

impl ImmediateClock {
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameClock for ImmediateClock {
    async fn next_frame(&mut self) -> f64 {
        YieldOnce::default().await;
        self.ticks += 1;
        self.now_ms += Self::FRAME_MS;
        self.now_ms
    }
}
