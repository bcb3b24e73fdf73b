//! Spherical orbit camera, perspective projection and the camera uniform.
//!
//! The camera always looks at the origin (where the sun sits) from a point
//! on a sphere described by an elevation `theta`, an azimuth `phi` and a
//! `radius`.

use std::f32::consts::{FRAC_PI_2, TAU};

use cgmath::{Deg, Matrix4, Point3, Rad, Vector3, perspective};
use wgpu::util::DeviceExt;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Cursor travel (in pixels) that turns the camera by one radian.
const PIXELS_PER_RADIAN: f32 = 100.0;
/// Closest the eye may come to the target.
pub const MIN_RADIUS: f32 = 0.1;

/// Wrap an angle in radians into `[0, 2π)`.
fn wrap_radians(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    theta: f32,
    phi: f32,
    radius: f32,
}

impl Camera {
    /// `theta` is the elevation and `phi` the azimuth, both in radians.
    pub fn new(theta: f32, phi: f32, radius: f32) -> Self {
        Self {
            theta,
            phi: wrap_radians(phi),
            radius: radius.max(MIN_RADIUS),
        }
    }

    pub fn theta(&self) -> f32 {
        self.theta
    }

    pub fn phi(&self) -> f32 {
        self.phi
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Tilt up or down. Moves that would reach a pole are ignored so the view never flips.
    pub fn increment_theta(&mut self, pixels: f32) {
        let theta = self.theta + pixels / PIXELS_PER_RADIAN;
        if theta > -FRAC_PI_2 && theta < FRAC_PI_2 {
            self.theta = theta;
        }
    }

    /// Swing around the vertical axis, wrapped into `[0, 2π)`.
    pub fn increment_phi(&mut self, pixels: f32) {
        self.phi = wrap_radians(self.phi - pixels / PIXELS_PER_RADIAN);
    }

    /// Zoom in for positive `delta`.
    pub fn increment_radius(&mut self, delta: f32) {
        self.radius = (self.radius - delta).max(MIN_RADIUS);
    }

    pub fn position(&self) -> Point3<f32> {
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        Point3::new(
            self.radius * cos_theta * sin_phi,
            self.radius * sin_theta,
            self.radius * cos_theta * cos_phi,
        )
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position(), Point3::new(0.0, 0.0, 0.0), Vector3::unit_y())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(1, 1, Deg(45.0), 0.01, 1000.0)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// Eye position in homogeneous coordinates to satisfy the 16 byte alignment.
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position().to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the render loop needs to keep the camera on the GPU in sync.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, camera: Camera, projection: &Projection) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            camera,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Recompute the view-projection and push it to the GPU.
    pub fn write_to_buffer(&mut self, queue: &wgpu::Queue, projection: &Projection) {
        self.uniform.update_view_proj(&self.camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{EuclideanSpace, InnerSpace};

    use super::*;

    #[test]
    fn starts_on_the_positive_z_axis() {
        let camera = Camera::new(0.0, 0.0, 2.0);
        let eye = camera.position().to_vec();
        assert!((eye - Vector3::new(0.0, 0.0, 2.0)).magnitude() < 1e-6);
    }

    #[test]
    fn theta_never_reaches_a_pole() {
        let mut camera = Camera::new(0.0, 0.0, 2.0);
        camera.increment_theta(150.0);
        assert!((camera.theta() - 1.5).abs() < 1e-6);
        // another 0.1 rad would pass pi/2
        camera.increment_theta(10.0);
        assert!((camera.theta() - 1.5).abs() < 1e-6);
        camera.increment_theta(-300.0);
        assert!((camera.theta() + 1.5).abs() < 1e-5);
        camera.increment_theta(-10.0);
        assert!((camera.theta() + 1.5).abs() < 1e-5);
    }

    #[test]
    fn phi_wraps_both_ways() {
        let mut camera = Camera::new(0.0, 0.0, 2.0);
        camera.increment_phi(100.0);
        assert!((camera.phi() - (TAU - 1.0)).abs() < 1e-5);
        camera.increment_phi(-800.0);
        assert!((0.0..TAU).contains(&camera.phi()));
        assert!((camera.phi() - (7.0 - TAU)).abs() < 1e-4);
    }

    #[test]
    fn tiny_turn_left_stays_below_a_full_circle() {
        let mut camera = Camera::new(0.0, 0.0, 2.0);
        camera.increment_phi(1e-6);
        assert!((0.0..TAU).contains(&camera.phi()), "phi {}", camera.phi());
        assert!((0.0..TAU).contains(&Camera::new(0.0, -1e-8, 2.0).phi()));
    }

    #[test]
    fn radius_is_clamped() {
        let mut camera = Camera::new(0.0, 0.0, 2.0);
        camera.increment_radius(1.5);
        assert!((camera.radius() - 0.5).abs() < 1e-6);
        camera.increment_radius(10.0);
        assert_eq!(camera.radius(), MIN_RADIUS);
        camera.increment_radius(-3.0);
        assert!((camera.radius() - (MIN_RADIUS + 3.0)).abs() < 1e-6);
    }

    #[test]
    fn eye_distance_matches_radius() {
        let mut camera = Camera::new(0.3, 1.2, 4.0);
        camera.increment_phi(37.0);
        camera.increment_theta(-20.0);
        assert!((camera.position().to_vec().magnitude() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn resize_updates_aspect() {
        let mut projection = Projection::new(800, 800, Deg(45.0), 0.01, 1000.0);
        assert_eq!(projection.aspect(), 1.0);
        projection.resize(1600, 800);
        assert_eq!(projection.aspect(), 2.0);
        projection.resize(10, 0);
        assert!(projection.aspect().is_finite());
    }
}
