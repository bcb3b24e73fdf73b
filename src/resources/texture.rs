use std::path::Path;

use crate::{data_structures::texture, resources::load_binary};

/// Layout of a body's material: one colour map and its sampler.
pub fn diffuse_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("diffuse_bind_group_layout"),
    })
}

/// Load and upload a colour map from the asset directory.
pub async fn load_texture(
    asset_dir: &Path,
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<texture::Texture> {
    let data = load_binary(asset_dir, file_name).await?;
    let format = Path::new(file_name).extension().and_then(|ext| ext.to_str());
    texture::Texture::from_bytes(
        device,
        queue,
        &data,
        file_name,
        format,
        wgpu::FilterMode::Nearest,
    )
}

/**
 * Like [`load_texture`], but a missing or broken image is not fatal.
 *
 * The body is then drawn in `fallback` so the scene still renders without assets.
 */
pub async fn load_texture_or(
    asset_dir: &Path,
    file_name: &str,
    fallback: [u8; 4],
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> texture::Texture {
    match load_texture(asset_dir, file_name, device, queue).await {
        Ok(texture) => {
            log::debug!("loaded texture {file_name}");
            texture
        }
        Err(e) => {
            log::warn!(
                "Texture {file_name} could not be loaded from {}: {e:#}. Using a solid colour instead.",
                asset_dir.display()
            );
            texture::Texture::solid_colour(fallback, file_name, device, queue)
        }
    }
}
