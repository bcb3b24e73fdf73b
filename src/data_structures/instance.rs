//! Per-body transformation data for GPU rendering.
//!
//! Every body owns a one-element instance buffer holding its model matrix and
//! the matching normal matrix. The vertex shader reads both as instance-rate
//! vertex attributes.

use cgmath::{Matrix, Matrix3, Matrix4, SquareMatrix};

use crate::data_structures::model;

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
}

impl InstanceRaw {
    pub fn from_model(model: Matrix4<f32>) -> Self {
        Self {
            model: model.into(),
            normal: normal_matrix(&model).into(),
        }
    }
}

impl From<Matrix4<f32>> for InstanceRaw {
    fn from(model: Matrix4<f32>) -> Self {
        Self::from_model(model)
    }
}

/// Inverse transpose of the upper 3x3 block, so normals survive non-uniform scaling.
///
/// A degenerate (zero-scaled) model has no inverse and falls back to identity.
pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
    let linear = Matrix3::from_cols(model.x.truncate(), model.y.truncate(), model.z.truncate());
    linear
        .invert()
        .map(|inverse| inverse.transpose())
        .unwrap_or_else(Matrix3::identity)
}

/**
 * As we store instance data directly in the GPU memory we need to tell what the bytes refer to:
 *
 * offset: zero as we want to use the full space.
 * stride: length of an instance
 *
 * Stride layout here: model as 4x4 matrix (four 4d vectors) followed by the 3x3 normal matrix
 */
impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // Only advance to the next element when a new instance starts
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // A mat4 takes up 4 vertex slots as it is technically 4 vec4s.
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Deg, InnerSpace, Vector3};

    use super::*;

    #[test]
    fn layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<InstanceRaw>(), (16 + 9) * 4);
    }

    #[test]
    fn uniform_scale_keeps_normal_direction() {
        let model = Matrix4::from_scale(0.1) * Matrix4::from_angle_z(Deg(30.0));
        let n = normal_matrix(&model) * Vector3::unit_y();
        let expected = Matrix3::from_angle_z(Deg(30.0)) * Vector3::unit_y();
        assert!((n.normalize() - expected).magnitude() < 1e-5);
    }

    #[test]
    fn degenerate_model_falls_back_to_identity() {
        assert_eq!(normal_matrix(&Matrix4::from_scale(0.0)), Matrix3::identity());
    }

    #[test]
    fn translation_does_not_touch_normals() {
        let raw = InstanceRaw::from(Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0)));
        let identity: [[f32; 3]; 3] = Matrix3::<f32>::identity().into();
        assert_eq!(raw.normal, identity);
        assert_eq!(raw.model[3], [1.0, 2.0, 3.0, 1.0]);
    }
}
