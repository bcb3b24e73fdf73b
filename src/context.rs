//! The GPU and window context shared by everything that renders.
//!
//! [`Context`] owns the surface, device and queue together with the camera,
//! the light and the pipelines. Flows may tweak its public fields in
//! `on_init` (clear colour, starting camera) to configure the scene.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use winit::window::Window;

use crate::{
    camera::{Camera, CameraResources, Projection},
    controls::Controls,
    data_structures::texture,
    pipelines::{
        Pipelines,
        light::{LightResources, LightUniform},
    },
};

/// Vertical field of view of the perspective projection.
pub const FOVY_DEG: f32 = 45.0;
pub const ZNEAR: f32 = 0.01;
pub const ZFAR: f32 = 1000.0;

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub light: LightResources,
    pub pipelines: Pipelines,
    pub controls: Controls,
    pub clear_colour: wgpu::Color,
    pub asset_dir: PathBuf,
}

/// The part of [`Context`] that flow constructors need while loading.
///
/// `Device` and `Queue` are reference counted internally, so cloning them
/// into an `InitContext` only clones handles.
#[derive(Debug, Clone)]
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub asset_dir: PathBuf,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            asset_dir: ctx.asset_dir.clone(),
        }
    }
}

impl Context {
    pub async fn new(window: Arc<Window>, asset_dir: PathBuf) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("creating the window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter can present to this window")?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("requesting a device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader assumes an sRGB surface; anything else comes out darker.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no supported formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        log::debug!("Surface format {:?}", surface_format);

        let camera = Camera::new(0.0, 0.0, 2.0);
        let projection = Projection::new(
            config.width,
            config.height,
            cgmath::Deg(FOVY_DEG),
            ZNEAR,
            ZFAR,
        );
        let camera = CameraResources::new(&device, camera, &projection);

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        let light = LightResources::new(
            LightUniform::new(camera.camera.position().into(), [1.0, 1.0, 1.0]),
            &device,
        );

        let pipelines = Pipelines::new(
            &device,
            config.format,
            &light.bind_group_layout,
            &camera.bind_group_layout,
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            light,
            pipelines,
            window,
            depth_texture,
            controls: Controls::new(),
            clear_colour: wgpu::Color::BLACK,
            asset_dir,
        })
    }

    /// Reconfigure the surface and the depth buffer. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.projection.resize(width, height);
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            texture::Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
        true
    }

    /// Push the camera matrices and the camera-following light to the GPU.
    pub fn write_view_uniforms(&mut self) {
        self.camera.write_to_buffer(&self.queue, &self.projection);
        self.light.set_position(self.camera.camera.position().into());
        self.light.write_to_buffer(&self.queue);
    }
}
