//! The frame streaming loop.
//!
//! One iteration:
//!
//! 1. render the active animation at the current frame;
//! 2. advance the frame, wrapping at the period;
//! 3. if the cadence says so, await a capture, then marshal it into a new
//!    provider, build a new animation on it and swap the pair in.
//!
//! [`run`](FrameStreamer::run) awaits the frame clock before each
//! iteration, so the next render never starts before the previous
//! rebuild has completed.

use std::error::Error;
use std::fmt;
use std::mem;
use std::time::Instant;

use lamkit_bridge::{CanvasSurface, MarshalError, NativeModule, ResourceProvider, ResourceSet, Runtime};
use lamkit_core::{CaptureError, CaptureSource, FrameClock, NativeHandle};
use log::{debug, warn};

use crate::config::{ConfigError, LoopConfig};
use crate::metrics::LoopMetrics;

// ── LoopError ──────────────────────────────────────────────────────

/// Errors that stop the frame loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoopError {
    /// The capture source failed.
    Capture(CaptureError),
    /// The initial provider or animation could not be built.
    Marshal(MarshalError),
    /// The loop configuration is invalid.
    Config(ConfigError),
    /// The loop was given the null surface.
    NullSurface,
}

impl fmt::Display for LoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capture(e) => write!(f, "capture: {e}"),
            Self::Marshal(e) => write!(f, "initial build: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::NullSurface => write!(f, "cannot stream to a null surface"),
        }
    }
}

impl Error for LoopError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Capture(e) => Some(e),
            Self::Marshal(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::NullSurface => None,
        }
    }
}

impl From<CaptureError> for LoopError {
    fn from(e: CaptureError) -> Self {
        Self::Capture(e)
    }
}

impl From<MarshalError> for LoopError {
    fn from(e: MarshalError) -> Self {
        Self::Marshal(e)
    }
}

impl From<ConfigError> for LoopError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ── FrameCycleState ────────────────────────────────────────────────

/// The provider and the animation built on it. Replaced as one value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivePair {
    /// Resource provider the animation resolves assets through.
    pub provider: ResourceProvider,
    /// The animation being rendered.
    pub animation: NativeHandle,
}

/// Per-loop state: where in the cycle we are and what is being drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameCycleState {
    /// Frame index, always below `period`.
    pub frame: u32,
    /// Frames per cycle.
    pub period: u32,
    /// The live provider/animation pair.
    pub active: ActivePair,
}

impl FrameCycleState {
    /// Move to the next frame, wrapping to 0 at the period.
    pub fn advance(&mut self) {
        self.frame = wrap_frame(self.frame, self.period);
    }
}

fn wrap_frame(frame: u32, period: u32) -> u32 {
    let next = frame + 1;
    if next >= period {
        0
    } else {
        next
    }
}

// ── FrameStreamer ──────────────────────────────────────────────────

/// Renders an animation continuously, rebuilding its resources from a
/// capture source.
///
/// Owns the [`Runtime`]; exactly one provider/animation pair is live at
/// any time.
pub struct FrameStreamer<M: NativeModule, C, K> {
    runtime: Runtime<M>,
    surface: CanvasSurface,
    source: String,
    capture: C,
    clock: K,
    config: LoopConfig,
    state: FrameCycleState,
    metrics: LoopMetrics,
}

impl<M, C, K> FrameStreamer<M, C, K>
where
    M: NativeModule,
    C: CaptureSource,
    K: FrameClock,
{
    /// Validate `config` and build the initial pair from an empty
    /// resource set.
    pub fn new(
        mut runtime: Runtime<M>,
        surface: CanvasSurface,
        source: impl Into<String>,
        capture: C,
        clock: K,
        config: LoopConfig,
    ) -> Result<Self, LoopError> {
        config.validate()?;
        if surface.is_null() {
            return Err(LoopError::NullSurface);
        }
        let source = source.into();
        let active = build_pair(&mut runtime, &source, &ResourceSet::new())?;
        Ok(Self {
            runtime,
            surface,
            source,
            capture,
            clock,
            state: FrameCycleState {
                frame: 0,
                period: config.period,
                active,
            },
            config,
            metrics: LoopMetrics::default(),
        })
    }

    /// Run one iteration.
    ///
    /// A capture failure is returned and ends the loop. A failed rebuild
    /// is logged and counted; the previous pair stays active.
    pub async fn step(&mut self) -> Result<(), LoopError> {
        let index = self.metrics.iterations;
        self.runtime
            .render_animation(&self.surface, self.state.active.animation, self.state.frame);
        self.metrics.renders += 1;
        self.state.advance();

        if self.config.rebuilds_on(index) {
            let bytes = self.capture.capture().await?;
            self.metrics.last_capture_bytes = bytes.len();
            self.rebuild(bytes);
        }
        self.metrics.iterations += 1;
        Ok(())
    }

    /// Iterate until `max_iterations` or a fatal error, waiting for the
    /// frame clock before each iteration.
    pub async fn run(&mut self) -> Result<LoopMetrics, LoopError> {
        while self
            .config
            .max_iterations
            .is_none_or(|max| self.metrics.iterations < max)
        {
            self.clock.next_frame().await;
            self.step().await?;
        }
        Ok(self.metrics.clone())
    }

    fn rebuild(&mut self, bytes: Vec<u8>) {
        let started = Instant::now();
        let resources = ResourceSet::single(self.config.resource_name.clone(), bytes);
        match build_pair(&mut self.runtime, &self.source, &resources) {
            Ok(pair) => {
                let old = mem::replace(&mut self.state.active, pair);
                release_pair(&mut self.runtime, old);
                self.metrics.rebuilds += 1;
                debug!(
                    "rebuilt provider {} with {} bytes; arena at {} live allocations",
                    pair.provider.handle(),
                    resources.data_bytes(),
                    self.runtime.memory().stats().live_allocations
                );
            }
            Err(e) => {
                self.metrics.rebuild_failures += 1;
                warn!("rebuild failed, keeping the previous animation: {e}");
            }
        }
        self.metrics.rebuild_us_total += started.elapsed().as_micros() as u64;
    }

    /// Current frame index and active pair.
    pub fn state(&self) -> &FrameCycleState {
        &self.state
    }

    /// Counters so far.
    pub fn metrics(&self) -> &LoopMetrics {
        &self.metrics
    }

    /// The surface being drawn to.
    pub fn surface(&self) -> &CanvasSurface {
        &self.surface
    }

    /// The runtime driving the native module.
    pub fn runtime(&self) -> &Runtime<M> {
        &self.runtime
    }

    /// Mutable access to the runtime.
    pub fn runtime_mut(&mut self) -> &mut Runtime<M> {
        &mut self.runtime
    }

    /// The capture source.
    pub fn capture(&self) -> &C {
        &self.capture
    }

    /// Release the active pair and hand back the runtime.
    pub fn shutdown(mut self) -> Runtime<M> {
        release_pair(&mut self.runtime, self.state.active);
        self.runtime
    }
}

fn build_pair<M: NativeModule>(
    runtime: &mut Runtime<M>,
    source: &str,
    resources: &ResourceSet,
) -> Result<ActivePair, MarshalError> {
    let provider = runtime.make_resource_provider(resources)?;
    match runtime.make_animation(source, &provider) {
        Ok(animation) => Ok(ActivePair {
            provider,
            animation,
        }),
        Err(e) => {
            runtime.delete(provider.handle());
            Err(e)
        }
    }
}

fn release_pair<M: NativeModule>(runtime: &mut Runtime<M>, pair: ActivePair) {
    runtime.delete(pair.animation);
    runtime.delete(pair.provider.handle());
}
