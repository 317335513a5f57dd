use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::input::platform::winit::translate_key_event;
use crate::input::KeyTracker;
use crate::render::{MeshRenderer, RenderCtx, RenderTarget};
use crate::scene::{Scene, DEFAULT_CLEAR_COLOR};
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub clear_color: [f32; 4],
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "vantage".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            clear_color: DEFAULT_CLEAR_COLOR,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens a window, builds its scene and drives `app` until the window closes.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

/// Everything whose lifetime is bound to the window: the scene, its key
/// tracker and the GPU surface borrowing the window.
#[self_referencing]
struct SceneEntry {
    scene: Scene,
    keys: KeyTracker,
    clock: FrameClock,
    renderer: MeshRenderer,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<SceneEntry>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            exit_requested: false,
        }
    }

    fn create_scene_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let mut scene = Scene::new();
        scene.clear_color = self.config.clear_color;

        let mut entry = SceneEntryTryBuilder {
            scene,
            keys: KeyTracker::new(),
            clock: FrameClock::default(),
            renderer: MeshRenderer::new(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")?;

        let app = &mut self.app;
        entry.with_mut(|fields| {
            fields.keys.attach(fields.scene.keyboard_mut());
            app.on_scene_ready(fields.scene);

            let size = fields.gpu.size();
            fields.scene.resize(size.width, size.height);
            fields.window.request_redraw();
        });

        log::info!("scene ready");
        self.entry = Some(entry);
        Ok(())
    }

    /// Detaches the tracker, runs the unmount hook and drops window + GPU.
    fn dispose_scene_entry(&mut self) {
        let Some(mut entry) = self.entry.take() else { return };
        let app = &mut self.app;

        entry.with_mut(|fields| {
            fields.keys.detach(fields.scene.keyboard_mut());
            app.on_scene_disposed(fields.scene);
        });

        log::info!("scene disposed");
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.dispose_scene_entry();
        self.exit_requested = true;
        event_loop.exit();
    }

    /// Drives one frame: per-frame callback, then scene render.
    fn redraw(&mut self, window_id: WindowId) -> AppControl {
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return AppControl::Continue;
        };

        entry.with_mut(|fields| {
            let time = fields.clock.tick();

            let control = {
                let mut ctx = FrameCtx {
                    window: WindowCtx {
                        id: window_id,
                        window: fields.window,
                    },
                    scene: fields.scene,
                    keys: fields.keys,
                    time,
                };
                app.on_frame(&mut ctx)
            };

            if control == AppControl::Exit {
                return control;
            }

            render_scene(fields.gpu, fields.window, fields.renderer, fields.scene)
        })
    }
}

fn render_scene(
    gpu: &mut Gpu<'_>,
    window: &Window,
    renderer: &mut MeshRenderer,
    scene: &Scene,
) -> AppControl {
    let size = gpu.size();
    if size.width == 0 || size.height == 0 {
        // Minimized; nothing to present.
        return AppControl::Continue;
    }

    let mut frame = match gpu.begin_frame() {
        Ok(f) => f,
        Err(err) => {
            log::debug!("surface error: {err}");
            return match gpu.handle_surface_error(err) {
                SurfaceErrorAction::Fatal => {
                    log::error!("fatal surface error; exiting");
                    AppControl::Exit
                }
                _ => AppControl::Continue,
            };
        }
    };

    {
        let rctx = RenderCtx::new(gpu.device(), gpu.queue(), gpu.surface_format());
        let mut target = RenderTarget::new(&mut frame.encoder, &frame.view, gpu.depth_view());
        renderer.render(&rctx, &mut target, scene);
    }

    window.pre_present_notify();
    gpu.submit(frame);

    AppControl::Continue
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        if let Err(e) = self.create_scene_entry(event_loop) {
            log::error!("failed to create scene: {e:#}");
            self.request_exit(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Continuous redraw: the per-frame callback runs every frame.
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = self.entry.as_mut() else { return };

        match &event {
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if let Some(info) = translate_key_event(key_event) {
                    entry.with_scene_mut(|scene| scene.keyboard_mut().notify(&info));
                }
            }

            WindowEvent::CloseRequested => {
                self.request_exit(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                let new_size = *new_size;
                entry.with_mut(|fields| {
                    fields.gpu.resize(new_size);
                    fields.scene.resize(new_size.width, new_size.height);
                    fields.window.request_redraw();
                });
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                entry.with_mut(|fields| {
                    let new_size = fields.window.inner_size();
                    fields.gpu.resize(new_size);
                    fields.scene.resize(new_size.width, new_size.height);
                    fields.window.request_redraw();
                });
            }

            WindowEvent::Occluded(false) => {
                // Avoid one huge dt after the window was hidden.
                entry.with_clock_mut(|clock| clock.reset());
            }

            WindowEvent::RedrawRequested => {
                if self.redraw(window_id) == AppControl::Exit {
                    self.request_exit(event_loop);
                }
            }

            _ => {}
        }
    }
}
