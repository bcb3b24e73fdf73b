//! Render pipelines.
//!
//! - `basic` builds the textured, camera-lit pipeline every body is drawn with
//! - `light` owns the point light uniform shared by all draws

pub mod basic;
pub mod light;

/// All pipelines the renderer switches between, built once per surface format.
#[derive(Debug)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        light_bind_group_layout: &wgpu::BindGroupLayout,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            basic: basic::mk_basic_pipeline(
                device,
                color_format,
                light_bind_group_layout,
                camera_bind_group_layout,
            ),
        }
    }
}
