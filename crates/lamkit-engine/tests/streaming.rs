//! Integration tests: the frame streaming loop against mock native and host.

use lamkit_bridge::{CanvasSurface, CanvasTarget, ContextBootstrap, Runtime};
use lamkit_core::CaptureError;
use lamkit_engine::{FrameStreamer, LoopConfig, LoopError};
use lamkit_test_utils::{
    test_memory, ImmediateClock, NativeEvent, RecordingNative, ScriptedCapture,
    ScriptedGraphicsHost,
};

const SOURCE: &str = r#"{"v":"5.7.4","assets":[{"id":"image_0","p":"image_0.png"}]}"#;

fn runtime_and_surface(native: RecordingNative) -> (Runtime<RecordingNative>, CanvasSurface) {
    let mut runtime = Runtime::new(test_memory(64), native);
    runtime.initialize();
    let mut host = ScriptedGraphicsHost::accepting();
    let mut bootstrap = ContextBootstrap::new();
    let surface = runtime.make_canvas_surface(
        &mut bootstrap,
        &mut host,
        &CanvasTarget {
            width: 320,
            height: 240,
        },
    );
    assert!(!surface.is_null());
    (runtime, surface)
}

fn streamer(
    native: RecordingNative,
    capture: ScriptedCapture,
    config: LoopConfig,
) -> FrameStreamer<RecordingNative, ScriptedCapture, ImmediateClock> {
    let (runtime, surface) = runtime_and_surface(native);
    FrameStreamer::new(runtime, surface, SOURCE, capture, ImmediateClock::new(), config).unwrap()
}

fn no_rebuild(max_iterations: u64) -> LoopConfig {
    LoopConfig {
        rebuild_every: None,
        max_iterations: Some(max_iterations),
        ..LoopConfig::default()
    }
}

#[test]
fn frame_is_zero_after_sixty_iterations() {
    let mut s = streamer(RecordingNative::new(), ScriptedCapture::repeating(vec![1]), no_rebuild(60));
    let metrics = pollster::block_on(s.run()).unwrap();
    assert_eq!(metrics.iterations, 60);
    assert_eq!(s.state().frame, 0);
    assert_eq!(s.capture().calls, 0);
}

#[test]
fn frame_is_one_after_sixty_one_iterations() {
    let mut s = streamer(RecordingNative::new(), ScriptedCapture::repeating(vec![1]), no_rebuild(61));
    pollster::block_on(s.run()).unwrap();
    assert_eq!(s.state().frame, 1);

    let frames = s.runtime().native().rendered_frames();
    assert_eq!(frames.len(), 61);
    assert_eq!(frames[59], 59);
    assert_eq!(frames[60], 0);
}

#[test]
fn render_never_sees_pair_under_construction() {
    let config = LoopConfig {
        rebuild_every: Some(1),
        max_iterations: Some(20),
        ..LoopConfig::default()
    };
    let mut s = streamer(RecordingNative::new(), ScriptedCapture::counting(20), config);
    pollster::block_on(s.run()).unwrap();
    assert_eq!(s.metrics().rebuilds, 20);

    // Walk the event log: each render must use the most recently
    // completed animation, and both halves of its pair must be live.
    let mut latest_built = None;
    let mut renders = 0;
    for event in s.runtime().native().events() {
        match event {
            NativeEvent::AnimationBuilt { handle, .. } => latest_built = Some(*handle),
            NativeEvent::Rendered {
                animation,
                consistent,
                ..
            } => {
                assert!(consistent, "render used a released pair");
                assert_eq!(Some(*animation), latest_built);
                renders += 1;
            }
            _ => {}
        }
    }
    assert_eq!(renders, 20);
}

#[test]
fn rebuild_uses_captured_bytes() {
    let config = LoopConfig {
        rebuild_every: Some(1),
        max_iterations: Some(3),
        resource_name: "frame.png".into(),
        ..LoopConfig::default()
    };
    let mut s = streamer(RecordingNative::new(), ScriptedCapture::counting(3), config);
    pollster::block_on(s.run()).unwrap();

    let provider = s.state().active.provider.handle();
    let resources = s.runtime().native().provider_resources(provider).unwrap();
    assert_eq!(resources, &[("frame.png".to_owned(), vec![2u8])]);
    assert_eq!(s.metrics().last_capture_bytes, 1);
}

#[test]
fn rebuilds_do_not_leak() {
    let config = LoopConfig {
        rebuild_every: Some(1),
        max_iterations: Some(100),
        ..LoopConfig::default()
    };
    let mut s = streamer(
        RecordingNative::new(),
        ScriptedCapture::repeating(vec![0xAB; 50_000]),
        config,
    );
    let baseline = s.runtime().memory().stats().live_allocations;
    pollster::block_on(s.run()).unwrap();

    let runtime = s.runtime();
    assert_eq!(runtime.memory().stats().live_allocations, baseline);
    assert_eq!(runtime.native().live_providers(), 1);
    assert_eq!(runtime.native().live_animations(), 1);

    let runtime = s.shutdown();
    assert_eq!(runtime.native().live_providers(), 0);
    assert_eq!(runtime.native().live_animations(), 0);
}

#[test]
fn cadence_controls_capture_count() {
    let config = LoopConfig {
        rebuild_every: Some(4),
        max_iterations: Some(10),
        ..LoopConfig::default()
    };
    let mut s = streamer(RecordingNative::new(), ScriptedCapture::repeating(vec![7]), config);
    pollster::block_on(s.run()).unwrap();
    // Iterations 0, 4 and 8.
    assert_eq!(s.capture().calls, 3);
    assert_eq!(s.metrics().rebuilds, 3);
}

#[test]
fn capture_failure_is_fatal() {
    let failure = CaptureError::Failed {
        reason: "stream ended".into(),
    };
    let capture = ScriptedCapture::sequence([Ok(vec![1]), Ok(vec![2]), Err(failure.clone())]);
    let config = LoopConfig {
        rebuild_every: Some(1),
        max_iterations: Some(10),
        ..LoopConfig::default()
    };
    let mut s = streamer(RecordingNative::new(), capture, config);
    let result = pollster::block_on(s.run());
    assert_eq!(result, Err(LoopError::Capture(failure)));
    // Rendered in the failing iteration, but it never completed.
    assert_eq!(s.metrics().renders, 3);
    assert_eq!(s.metrics().iterations, 2);
}

#[test]
fn failed_rebuild_keeps_previous_pair() {
    // One provider for the initial pair, one for the first rebuild.
    let native = RecordingNative::new().accept_providers(2);
    let config = LoopConfig {
        rebuild_every: Some(1),
        max_iterations: Some(5),
        ..LoopConfig::default()
    };
    let mut s = streamer(native, ScriptedCapture::counting(5), config);
    pollster::block_on(s.run()).unwrap();

    assert_eq!(s.metrics().rebuilds, 1);
    assert_eq!(s.metrics().rebuild_failures, 4);
    let provider = s.state().active.provider.handle();
    assert_eq!(
        s.runtime().native().provider_resources(provider).unwrap(),
        &[("image_0.png".to_owned(), vec![0u8])]
    );
    assert_eq!(s.runtime().native().live_providers(), 1);
    assert!(s.runtime().native().events().iter().all(|e| match e {
        NativeEvent::Rendered { consistent, .. } => *consistent,
        _ => true,
    }));
}

#[test]
fn rejected_animation_releases_new_provider() {
    let config = LoopConfig {
        rebuild_every: Some(1),
        max_iterations: Some(3),
        ..LoopConfig::default()
    };
    let mut s = streamer(RecordingNative::new(), ScriptedCapture::repeating(vec![5; 64]), config);
    let initial = s.state().active;
    let baseline = s.runtime().memory().stats().live_allocations;
    s.runtime_mut().native_mut().set_reject_animations(true);

    pollster::block_on(s.run()).unwrap();
    assert_eq!(s.metrics().rebuild_failures, 3);
    assert_eq!(s.state().active, initial);
    assert_eq!(s.runtime().native().live_providers(), 1);
    assert_eq!(s.runtime().memory().stats().live_allocations, baseline);
}

#[test]
fn null_surface_rejected() {
    let runtime = Runtime::new(test_memory(4), RecordingNative::new());
    let result = FrameStreamer::new(
        runtime,
        CanvasSurface::NULL,
        SOURCE,
        ScriptedCapture::repeating(vec![1]),
        ImmediateClock::new(),
        LoopConfig::default(),
    );
    assert!(matches!(result, Err(LoopError::NullSurface)));
}

#[test]
fn invalid_config_rejected() {
    let (runtime, surface) = runtime_and_surface(RecordingNative::new());
    let result = FrameStreamer::new(
        runtime,
        surface,
        SOURCE,
        ScriptedCapture::repeating(vec![1]),
        ImmediateClock::new(),
        LoopConfig {
            period: 0,
            ..LoopConfig::default()
        },
    );
    assert!(matches!(result, Err(LoopError::Config(_))));
}
