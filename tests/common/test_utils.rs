use std::path::PathBuf;

use orrery::context::InitContext;

/// A device without a window, for exercising uploads off-screen.
pub async fn headless_context() -> anyhow::Result<InitContext> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await?;
    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("headless test device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        })
        .await?;
    Ok(InitContext {
        device,
        queue,
        // Nothing lives here, so every body falls back to its solid colour.
        asset_dir: PathBuf::from("/nonexistent-orrery-assets"),
    })
}
