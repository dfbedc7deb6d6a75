//! The window, its GPU surface and the event loop that plays an animation in it.

use std::time::Duration;

use web_time::Instant;
use winit::{
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use super::{animation::Input, camera::Camera, pipelines as pl};

/// Parameters for the creation of a [`RenderWindow`].
#[derive(Clone, Copy, Debug)]
pub struct WindowParams {
    /// Text in the title bar. Default: "microwave".
    pub title: &'static str,
    /// Initial width in logical pixels. Default: 900.
    pub width: usize,
    /// Initial height in logical pixels. Default: 900.
    pub height: usize,
    /// Multisample anti-aliasing sample count, 1 to disable. Default: 4.
    pub msaa_samples: u32,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            title: "microwave",
            width: 900,
            height: 900,
            msaa_samples: 4,
        }
    }
}

/// A window that plays an [`Animation`][crate::Animation].
///
/// The OS window and GPU context only exist
/// while [`run_animation`][Self::run_animation] is running.
pub struct RenderWindow {
    params: WindowParams,
    // taken out for the duration of `run_animation`
    event_loop: Option<EventLoop<()>>,
}

impl RenderWindow {
    /// Set up the event loop for a window with the given parameters.
    pub fn new(params: WindowParams) -> Result<Self, winit::error::EventLoopError> {
        Ok(Self {
            params,
            event_loop: Some(EventLoop::new()?),
        })
    }

    /// Open the window and play an [`Animation`][crate::Animation] in it
    /// until the window is closed.
    ///
    /// # Controls
    /// - `Escape`: close the window and return
    /// - `F2`: switch to the next color map
    ///
    /// Every other key press, left click and resize goes to the animation's `on_input`.
    ///
    /// # Panics
    ///
    /// If the window, surface or GPU device can't be created.
    /// These happen inside winit's `resumed` callback, which has no way to return an error.
    pub fn run_animation<State, StepFn, DrawFn, InputFn>(
        &mut self,
        anim: super::animation::Animation<State, StepFn, DrawFn, InputFn>,
    ) -> Result<(), winit::error::EventLoopError>
    where
        StepFn: FnMut(&mut State, Duration),
        DrawFn: FnMut(&State, &mut crate::Painter),
        InputFn: FnMut(Input, &mut State),
    {
        let Some(mut event_loop) = self.event_loop.take() else {
            return Err(winit::error::EventLoopError::RecreationAttempt);
        };
        // timers are polled from `about_to_wait`, so the loop must not sleep
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut player = AnimationPlayer {
            window_params: self.params,
            gpu: None,
            camera: anim.params.camera,
            opened_at: Instant::now(),
            cursor: (0., 0.),
            anim,
        };

        use winit::platform::run_on_demand::EventLoopExtRunOnDemand;
        let result = event_loop.run_app_on_demand(&mut player);
        self.event_loop = Some(event_loop);
        result
    }
}

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const SURFACE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;

/// Render targets with the same size as the surface.
#[derive(Debug)]
struct ScreenTargets {
    // only with multisampling; resolved into the surface texture
    msaa: Option<wgpu::Texture>,
    depth: wgpu::Texture,
}

impl ScreenTargets {
    fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration, samples: u32) -> Self {
        let target = |label: &str, format: wgpu::TextureFormat| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: config.width,
                    height: config.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: samples,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
        };
        Self {
            msaa: (samples > 1).then(|| target("multisampled color", config.format)),
            depth: target("depth", DEPTH_FORMAT),
        }
    }
}

/// The OS window together with the wgpu device drawing into it.
#[derive(Debug)]
pub(crate) struct ActiveRenderWindow {
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    samples: u32,
    targets: ScreenTargets,
    // the surface points into the window, so this goes last to be dropped last
    _window: Window,
}

impl ActiveRenderWindow {
    fn open_window(event_loop: &ActiveEventLoop, params: WindowParams) -> Window {
        let attrs = Window::default_attributes()
            .with_title(params.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                params.width as f64,
                params.height as f64,
            ));
        event_loop
            .create_window(attrs)
            .expect("Failed to create window")
    }

    /// Acquire a GPU and configure a surface on the window.
    async fn connect(window: Window, params: WindowParams) -> Self {
        let instance = wgpu::Instance::default();
        // safety: the window outlives the surface, see the field order of Self
        let surface = unsafe {
            let target = wgpu::SurfaceTargetUnsafe::from_window(&window)
                .expect("Failed to get window handle");
            instance
                .create_surface_unsafe(target)
                .expect("Failed to create surface")
        };

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .expect("Failed to get adapter");
        let info = adapter.get_info();
        log::info!("Rendering on {} with {:?}", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await
            .expect("Failed to get device");

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: SURFACE_FORMAT,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface.get_capabilities(&adapter).alpha_modes[0],
            view_formats: Vec::new(),
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let samples = params.msaa_samples.max(1);
        let targets = ScreenTargets::new(&device, &config, samples);

        Self {
            device,
            queue,
            surface,
            config,
            samples,
            targets,
            _window: window,
        }
    }

    /// Follow a change in window size.
    /// Zero-sized (minimized) windows keep the previous surface.
    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 || size == self.window_size() {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.targets = ScreenTargets::new(&self.device, &self.config, self.samples);
    }

    #[inline]
    pub(crate) fn swapchain_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Size of the surface in physical pixels.
    #[inline]
    pub(crate) fn window_size(&self) -> winit::dpi::PhysicalSize<u32> {
        winit::dpi::PhysicalSize::new(self.config.width, self.config.height)
    }

    #[inline]
    pub(crate) fn multisample_state(&self) -> wgpu::MultisampleState {
        wgpu::MultisampleState {
            count: self.samples,
            ..Default::default()
        }
    }

    /// Get a render context for the next surface texture,
    /// or `None` if this frame has to be skipped.
    fn next_frame(&mut self) -> Option<RenderContext<'_>> {
        let surface_tex = match self.surface.get_current_texture() {
            Ok(tex) => tex,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return None;
            }
            Err(err) => {
                log::warn!("Skipping frame: {err}");
                return None;
            }
        };

        let view = |tex: &wgpu::Texture| tex.create_view(&wgpu::TextureViewDescriptor::default());
        let surface_view = view(&surface_tex.texture);
        // with multisampling, draw into the msaa texture and resolve into the surface
        let (target, resolve_target) = match &self.targets.msaa {
            Some(msaa) => (view(msaa), Some(surface_view)),
            None => (surface_view, None),
        };
        let depth = view(&self.targets.depth);
        let multisample_state = self.multisample_state();

        Some(RenderContext {
            clear_color: Some(wgpu::Color::WHITE),
            clear_depth: true,
            surface_tex,
            target,
            resolve_target,
            depth,
            encoder: self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor::default()),
            device: &self.device,
            queue: &mut self.queue,
            viewport_size: (self.config.width, self.config.height),
            target_format: self.config.format,
            multisample_state,
        })
    }
}

/// Everything needed to record the draw calls of one frame.
pub(crate) struct RenderContext<'a> {
    // the first pass of the frame clears color and the first depth-tested pass clears depth,
    // later passes load what is already there
    clear_color: Option<wgpu::Color>,
    clear_depth: bool,
    surface_tex: wgpu::SurfaceTexture,
    target: wgpu::TextureView,
    resolve_target: Option<wgpu::TextureView>,
    depth: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
    pub device: &'a wgpu::Device,
    pub queue: &'a mut wgpu::Queue,
    /// Size of the surface in physical pixels.
    pub viewport_size: (u32, u32),
    pub target_format: wgpu::TextureFormat,
    pub multisample_state: wgpu::MultisampleState,
}

impl RenderContext<'_> {
    /// Start a pass drawing over the whole window without depth testing.
    pub fn pass(&mut self, label: &str) -> wgpu::RenderPass<'_> {
        self.begin_pass(label, false)
    }

    /// Start a pass that depth tests against the frame's depth buffer.
    /// Pipelines used in it need [`depth_stencil_state`].
    pub fn depth_pass(&mut self, label: &str) -> wgpu::RenderPass<'_> {
        self.begin_pass(label, true)
    }

    fn begin_pass(&mut self, label: &str, depth_tested: bool) -> wgpu::RenderPass<'_> {
        let color_ops = wgpu::Operations {
            load: load_or_clear(self.clear_color.take()),
            store: wgpu::StoreOp::Store,
        };
        let depth_stencil_attachment = if depth_tested {
            let clear = std::mem::take(&mut self.clear_depth).then_some(1.0);
            Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth,
                depth_ops: Some(wgpu::Operations {
                    load: load_or_clear(clear),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            })
        } else {
            None
        };

        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.target,
                resolve_target: self.resolve_target.as_ref(),
                ops: color_ops,
            })],
            depth_stencil_attachment,
            occlusion_query_set: None,
            timestamp_writes: None,
        })
    }
}

fn load_or_clear<V>(clear: Option<V>) -> wgpu::LoadOp<V> {
    match clear {
        Some(value) => wgpu::LoadOp::Clear(value),
        None => wgpu::LoadOp::Load,
    }
}

/// Depth-stencil state for pipelines drawn in a [`RenderContext::depth_pass`].
pub(crate) fn depth_stencil_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

/// The winit application that steps, draws and feeds input to an animation.
struct AnimationPlayer<State, StepFn, DrawFn, InputFn>
where
    StepFn: FnMut(&mut State, Duration),
    DrawFn: FnMut(&State, &mut crate::Painter),
    InputFn: FnMut(Input, &mut State),
{
    window_params: WindowParams,
    // created on the first `resumed`
    gpu: Option<(ActiveRenderWindow, pl::Renderer)>,
    anim: crate::Animation<State, StepFn, DrawFn, InputFn>,
    camera: Camera,
    // zero point of the time passed to `step`
    opened_at: Instant,
    // physical pixels, winit doesn't report it with clicks
    cursor: (f32, f32),
}

impl<State, StepFn, DrawFn, InputFn> winit::application::ApplicationHandler
    for AnimationPlayer<State, StepFn, DrawFn, InputFn>
where
    StepFn: FnMut(&mut State, Duration),
    DrawFn: FnMut(&State, &mut crate::Painter),
    InputFn: FnMut(Input, &mut State),
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        let window = ActiveRenderWindow::open_window(event_loop, self.window_params);
        let active = futures::executor::block_on(ActiveRenderWindow::connect(
            window,
            self.window_params,
        ));
        let renderer = pl::Renderer::new(&active, &self.anim.params);
        let size = active.window_size();
        self.gpu = Some((active, renderer));

        (self.anim.on_input)(
            Input::Resized {
                width: size.width,
                height: size.height,
            },
            &mut self.anim.state,
        );
    }

    // stepping here rather than on redraw requests
    // keeps the polling rate independent of the compositor
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let Some((window, renderer)) = self.gpu.as_mut() else {
            return;
        };

        (self.anim.step)(&mut self.anim.state, self.opened_at.elapsed());

        let Some(mut ctx) = window.next_frame() else {
            return;
        };
        renderer.begin_frame(&mut ctx, &self.camera);
        let mut painter = pl::Painter {
            ctx: &mut ctx,
            rend: renderer,
            camera: &self.camera,
        };
        (self.anim.draw)(&self.anim.state, &mut painter);
        renderer.draw_batched(&mut ctx);

        let RenderContext {
            encoder,
            queue,
            surface_tex,
            ..
        } = ctx;
        queue.submit(Some(encoder.finish()));
        renderer.end_frame();
        surface_tex.present();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some((window, renderer)) = self.gpu.as_mut() else {
            return;
        };

        let input = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(size) => {
                window.resize(size);
                let size = window.window_size();
                Input::Resized {
                    width: size.width,
                    height: size.height,
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                return;
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => Input::Click {
                x: self.cursor.0,
                y: self.cursor.1,
            },
            WindowEvent::KeyboardInput { event, .. } => {
                let (ElementState::Pressed, PhysicalKey::Code(code)) =
                    (event.state, event.physical_key)
                else {
                    return;
                };
                match code {
                    KeyCode::Escape => {
                        event_loop.exit();
                        return;
                    }
                    KeyCode::F2 => {
                        renderer.cycle_color_maps();
                        return;
                    }
                    _ => Input::Key {
                        code,
                        text: event.text.map(|t| t.to_string()),
                    },
                }
            }
            _ => return,
        };
        (self.anim.on_input)(input, &mut self.anim.state);
    }
}
