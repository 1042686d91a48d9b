//! Platform layer: windowing and the event loop driving the render engine.
//!
//! The engine's scheduling primitive is the window's redraw queue: the
//! scheduler requests a redraw, `RedrawRequested` runs one tick, and a
//! running engine requests the next redraw from inside that tick. At most
//! one tick is ever in flight, so engine state needs no synchronization.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use renderer::{FrameScheduler, GpuBackend, GpuConfig, RenderEngine, Scene};

/// Host-side run configuration from the CLI.
#[derive(Clone, Copy, Debug)]
pub struct RunConfig {
    pub backends: wgpu::Backends,
    pub width: u32,
    pub height: u32,
    pub show_fps: bool,
}

/// Scheduler backed by the window's redraw queue; the compositor paces
/// redraws at the display refresh rate.
struct RedrawScheduler {
    window: Arc<Window>,
}

impl FrameScheduler for RedrawScheduler {
    fn request_next_tick(&mut self) {
        self.window.request_redraw();
    }
}

struct FpsCounter {
    frames: u32,
    since: Instant,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            frames: 0,
            since: Instant::now(),
        }
    }

    fn frame(&mut self) {
        self.frames += 1;
        let elapsed = self.since.elapsed();
        if elapsed >= Duration::from_secs(1) {
            log::info!("fps: {:.1}", self.frames as f64 / elapsed.as_secs_f64());
            self.frames = 0;
            self.since = Instant::now();
        }
    }
}

struct Host {
    config: RunConfig,
    // Consumed by `resumed` when the window and GPU come up.
    scene: Option<Scene>,
    engine: Option<RenderEngine<GpuBackend, RedrawScheduler>>,
    started: Instant,
    fps: Option<FpsCounter>,
}

impl ApplicationHandler for Host {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.engine.is_some() {
            return;
        }
        let Some(scene) = self.scene.take() else {
            return;
        };

        let attrs = Window::default_attributes()
            .with_title("Veles3D")
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        log::info!(
            "window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        let gpu_config = GpuConfig {
            backends: self.config.backends,
            clear_color: scene.clear_color,
            depth_test: scene.depth_test,
        };
        let backend = match pollster::block_on(GpuBackend::new(window.clone(), gpu_config)) {
            Ok(backend) => backend,
            Err(e) => {
                log::error!("failed to initialize rendering backend: {e}");
                event_loop.exit();
                return;
            }
        };
        let scheduler = RedrawScheduler {
            window: window.clone(),
        };
        let engine = match RenderEngine::initialize(backend, scene, scheduler) {
            Ok(engine) => engine,
            Err(e) => {
                log::error!("engine initialization failed: {e}");
                event_loop.exit();
                return;
            }
        };

        self.engine = Some(engine);
        self.started = Instant::now();
        // First tick; the engine reschedules itself from then on.
        window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested; stopping render loop");
                engine.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                log::debug!("resized: {}x{}", size.width, size.height);
                engine.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                let now_ms = self.started.elapsed().as_secs_f64() * 1000.0;
                match engine.tick(now_ms) {
                    Err(e) => {
                        log::error!("render loop halted: {e}");
                        event_loop.exit();
                    }
                    Ok(()) => {
                        if engine.is_stopped() {
                            event_loop.exit();
                        } else if let Some(fps) = self.fps.as_mut() {
                            fps.frame();
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

/// Opens a window, brings up the GPU backend and runs the scene until the
/// window closes or the engine halts.
pub fn run(scene: Scene, config: RunConfig) -> Result<()> {
    let event_loop = EventLoop::new()?;
    // Redraw requests wake the loop; nothing else needs to poll.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut host = Host {
        fps: config.show_fps.then(FpsCounter::new),
        config,
        scene: Some(scene),
        engine: None,
        started: Instant::now(),
    };
    event_loop.run_app(&mut host)?;
    Ok(())
}
