//! Flow control and application event loop.
//!
//! A "flow" is a self-contained scene: it loads its resources, advances its
//! simulation every frame and tells the engine what to draw. The engine owns
//! the window, the GPU [`Context`] and the keyboard/mouse [`Controls`], and
//! drives every flow through the same frame.
//!
//! # Lifecycle Flow
//!
//! The event loop follows this pattern each frame:
//! 1. Window events go to the controls (camera, pause, reset) and then to every flow
//! 2. A pending reset request calls `on_reset` on all flows
//! 3. `on_update` advances the flows by the frame time, which is zero while paused
//! 4. Camera and light uniforms are written
//! 5. Every flow's `on_render` is collected and drawn with the planet pipeline
//! 6. The frame is presented
//!
//! [`Controls`]: crate::controls::Controls

use std::{iter, path::PathBuf, pin::Pin, sync::Arc};

use anyhow::Context as _;
use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    context::{Context, InitContext},
    data_structures::model::DrawModel,
    render::{Instanced, Render},
    resources,
};

/// Window and asset settings for [`run`].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub asset_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "orrery".to_string(),
            width: 800,
            height: 800,
            asset_dir: resources::default_asset_dir(),
        }
    }
}

/// Trait for implementing a renderable scene.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once after every flow was constructed
/// 2. `on_window_events()` is called for each winit window event
/// 3. `on_reset()` is called when the user asked for a reset
/// 4. `on_update()` is called every frame with the simulated frame time
/// 5. `on_render()` is called every frame and specifies how to render `self`
pub trait GraphicsFlow {
    /// Initialize the flow and configure the context.
    ///
    /// This is the only place to modify the Context, e.g. to change the clear
    /// colour or the starting camera.
    fn on_init(&mut self, ctx: &mut Context);

    /// Return the flow to the state it was constructed in.
    fn on_reset(&mut self, ctx: &Context);

    /// Advance the flow by `dt`. `dt` is zero while the simulation is paused.
    fn on_update(&mut self, ctx: &Context, dt: Duration);

    /// Handle window events (keyboard, mouse, resizing, etc.).
    fn on_window_events(&mut self, ctx: &Context, event: &WindowEvent);

    /// Return renderable objects for this flow.
    fn on_render(&self) -> Render<'_>;
}

/// The future a [`FlowConstructor`] resolves to.
pub type FlowFuture = Pin<Box<dyn Future<Output = anyhow::Result<Box<dyn GraphicsFlow>>>>>;

/// Type alias for a flow constructor (factory function).
///
/// A flow constructor takes an `InitContext` and asynchronously returns a
/// boxed `GraphicsFlow`, so resource loading of all flows runs concurrently.
pub type FlowConstructor = Box<dyn FnOnce(InitContext) -> FlowFuture>;

/// Application state bundle: GPU context and surface status.
struct AppState {
    ctx: Context,
    is_surface_configured: bool,
}

impl AppState {
    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.is_surface_configured = true;
        }
    }

    /// Advance every flow by one frame and push the view uniforms.
    fn update(&mut self, flows: &mut [Box<dyn GraphicsFlow>], dt: Duration) {
        if self.ctx.controls.take_reset() {
            log::info!("resetting the simulation");
            flows.iter_mut().for_each(|flow| flow.on_reset(&self.ctx));
        }
        let dt = self.ctx.controls.frame_time(dt);
        flows.iter_mut().for_each(|flow| flow.on_update(&self.ctx, dt));
        self.ctx.write_view_uniforms();
    }

    fn render(&self, flows: &[Box<dyn GraphicsFlow>]) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let mut draws: Vec<Instanced> = Vec::new();
            flows
                .iter()
                .for_each(|flow| flow.on_render().collect_into(&mut draws));

            render_pass.set_pipeline(&self.ctx.pipelines.basic);
            for instanced in draws {
                if instanced.amount == 0 || instanced.instance.size() == 0 {
                    log::warn!("you attempted to render {} with zero instances", instanced.mesh.name);
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_mesh_instanced(
                    instanced.mesh,
                    instanced.material,
                    0..instanced.amount as u32,
                    &self.ctx.camera.bind_group,
                    &self.ctx.light.bind_group,
                );
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App {
    async_runtime: tokio::runtime::Runtime,
    config: Config,
    state: Option<AppState>,
    // This will hold the fully initialized flows once they are ready.
    graphics_flows: Vec<Box<dyn GraphicsFlow>>,
    // We use Option to `take()` the constructors after use.
    constructors: Option<Vec<FlowConstructor>>,
    last_time: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: Config, constructors: Vec<FlowConstructor>) -> anyhow::Result<Self> {
        let async_runtime = tokio::runtime::Runtime::new().context("starting the async runtime")?;
        Ok(Self {
            async_runtime,
            config,
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            last_time: Instant::now(),
            error: None,
        })
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("creating the window")?,
        );

        let constructors = self.constructors.take().unwrap_or_default();
        let asset_dir = self.config.asset_dir.clone();
        let init_future = async move {
            let ctx = Context::new(window, asset_dir).await?;
            let flow_futures: Vec<_> = constructors
                .into_iter()
                .map(|constructor| constructor((&ctx).into()))
                .collect();
            let flows = futures::future::join_all(flow_futures)
                .await
                .into_iter()
                .collect::<anyhow::Result<Vec<_>>>()?;
            anyhow::Ok((ctx, flows))
        };

        let (ctx, flows) = self.async_runtime.block_on(init_future)?;
        let mut state = AppState {
            ctx,
            is_surface_configured: false,
        };
        self.graphics_flows = flows;
        self.graphics_flows
            .iter_mut()
            .for_each(|flow| flow.on_init(&mut state.ctx));

        let size = state.ctx.window.inner_size();
        state.resize(size.width, size.height);
        state.ctx.window.request_redraw();
        self.last_time = Instant::now();
        self.state = Some(state);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        // invoke main render loop
        state.ctx.window.request_redraw();

        let dt = self.last_time.elapsed();
        self.last_time = Instant::now();

        // Rendering requires the surface to be configured
        if !state.is_surface_configured {
            return;
        }

        state.update(&mut self.graphics_flows, dt);
        match state.render(&self.graphics_flows) {
            Ok(()) => {}
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("The GPU ran out of memory, shutting down");
                self.error = Some(anyhow::anyhow!("surface out of memory"));
                event_loop.exit();
            }
            Err(e) => log::warn!("Skipping frame: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("App initialization failed: {e:#}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        // general stuff
        let ctx = &mut state.ctx;
        ctx.controls.handle_window_event(&event, &mut ctx.camera.camera);
        self.graphics_flows
            .iter_mut()
            .for_each(|f| f.on_window_events(&state.ctx, &event));

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Open a window and run `constructors` until it is closed.
pub fn run(config: Config, constructors: Vec<FlowConstructor>) -> anyhow::Result<()> {
    if let Err(e) = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
    {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, constructors)?;

    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_opens_square_window() {
        let config = Config::default();
        assert_eq!(config.title, "orrery");
        assert_eq!((config.width, config.height), (800, 800));
    }
}
