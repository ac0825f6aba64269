//! Stream a generated test pattern through the frame loop.
//!
//! Uses the recording native module and scripted host from
//! `lamkit-test-utils` in place of a real graphics stack.
//!
//! ```text
//! RUST_LOG=debug cargo run -p lamkit-engine --example stream_demo
//! ```

use lamkit_arena::{ArenaConfig, LinearMemory};
use lamkit_bridge::{CanvasTarget, ContextBootstrap, Runtime};
use lamkit_core::CaptureError;
use lamkit_engine::{FrameStreamer, LoopConfig, PixelSource, PngCapture, RgbaFrame};
use lamkit_test_utils::{ImmediateClock, RecordingNative, ScriptedGraphicsHost};

const WIDTH: u32 = 64;
const HEIGHT: u32 = 48;

/// A diagonal gradient that scrolls one pixel per frame.
struct Gradient {
    t: u32,
}

impl PixelSource for Gradient {
    async fn next_frame(&mut self) -> Result<RgbaFrame, CaptureError> {
        self.t = self.t.wrapping_add(1);
        let mut pixels = Vec::with_capacity((WIDTH * HEIGHT * 4) as usize);
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let v = ((x + y + self.t) % 256) as u8;
                pixels.extend_from_slice(&[v, 255 - v, 128, 255]);
            }
        }
        Ok(RgbaFrame {
            width: WIDTH,
            height: HEIGHT,
            pixels,
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let memory = LinearMemory::new(ArenaConfig::default())?;
    let mut runtime = Runtime::new(memory, RecordingNative::new());
    runtime.add_initializer(|rt| log::info!("arena ready: {:?}", rt.memory().stats()));
    runtime.initialize();

    let mut host = ScriptedGraphicsHost::accepting();
    let mut bootstrap = ContextBootstrap::new();
    let surface = runtime.make_canvas_surface(
        &mut bootstrap,
        &mut host,
        &CanvasTarget {
            width: WIDTH,
            height: HEIGHT,
        },
    );
    if surface.is_null() {
        return Err("could not create a canvas surface".into());
    }

    let config = LoopConfig {
        rebuild_every: Some(2),
        max_iterations: Some(120),
        ..LoopConfig::default()
    };
    let mut streamer = FrameStreamer::new(
        runtime,
        surface,
        r#"{"v":"5.7.4","fr":60,"assets":[{"id":"image_0","p":"image_0.png"}]}"#,
        PngCapture::new(Gradient { t: 0 }),
        ImmediateClock::new(),
        config,
    )?;

    let metrics = pollster::block_on(streamer.run())?;
    println!("{metrics:#?}");
    if let Some(mean) = metrics.mean_rebuild_us() {
        println!("mean rebuild: {mean} us");
    }

    let runtime = streamer.shutdown();
    println!("arena after shutdown: {:?}", runtime.memory().stats());
    Ok(())
}
