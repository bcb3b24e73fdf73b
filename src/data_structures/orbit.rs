//! Orbital parameters and animation state of a single body.
//!
//! An [`Orbit`] knows how a body spins about its own (tilted) axis and how its
//! base position travels around the inclination axis. It does not know about
//! its parent: chaining translations is the job of
//! [`SceneGraph`](crate::data_structures::scene_graph::SceneGraph).

use cgmath::{Deg, Matrix4, Quaternion, Rotation, Rotation3, Vector3};

/// Wrap an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Rotate `v` about the unit `axis` by `angle`.
fn rotate(v: Vector3<f32>, angle: Deg<f32>, axis: Vector3<f32>) -> Vector3<f32> {
    Quaternion::from_axis_angle(axis, angle).rotate_vector(v)
}

/// Fixed orbital parameters of a body plus its current spin and orbit angles.
///
/// Rates are in degrees per second, tilt and inclination in degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct Orbit {
    scale: f32,
    position: Vector3<f32>,
    self_rotation_rate: f32,
    orbit_rate: f32,
    axial_tilt: f32,
    inclination: f32,
    self_rotation_angle: f32,
    orbit_angle: f32,
}

impl Orbit {
    /// `position` is given in the ecliptic and is tipped about +Z by `inclination` here.
    pub fn new(
        scale: f32,
        position: Vector3<f32>,
        self_rotation_rate: f32,
        orbit_rate: f32,
        axial_tilt: f32,
        inclination: f32,
    ) -> Self {
        Self {
            scale,
            position: rotate(position, Deg(inclination), Vector3::unit_z()),
            self_rotation_rate,
            orbit_rate,
            axial_tilt,
            inclination,
            self_rotation_angle: 0.0,
            orbit_angle: 0.0,
        }
    }

    /// A body that sits still at the origin, only scaled.
    pub fn fixed(scale: f32) -> Self {
        Self::new(scale, Vector3::new(0.0, 0.0, 0.0), 0.0, 0.0, 0.0, 0.0)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// The base position after the inclination has been applied.
    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn self_rotation_angle(&self) -> f32 {
        self.self_rotation_angle
    }

    pub fn orbit_angle(&self) -> f32 {
        self.orbit_angle
    }

    /// Advance both angles by `seconds` of simulated time.
    pub fn update(&mut self, seconds: f32) {
        self.self_rotation_angle =
            wrap_degrees(self.self_rotation_angle + seconds * self.self_rotation_rate);
        self.orbit_angle = wrap_degrees(self.orbit_angle + seconds * self.orbit_rate);
    }

    pub fn reset(&mut self) {
        self.self_rotation_angle = 0.0;
        self.orbit_angle = 0.0;
    }

    /// The axis the orbit revolves around: +Y tipped about +Z by the inclination.
    pub fn inclination_axis(&self) -> Vector3<f32> {
        rotate(Vector3::unit_y(), Deg(self.inclination), Vector3::unit_z())
    }

    /// The axis the body spins around: +Y tipped about +Z by inclination minus axial tilt.
    pub fn spin_axis(&self) -> Vector3<f32> {
        rotate(Vector3::unit_y(), self.tilt(), Vector3::unit_z())
    }

    fn tilt(&self) -> Deg<f32> {
        Deg(self.inclination - self.axial_tilt)
    }

    /// Offset of this body from its parent at the current orbit angle.
    pub fn local_translation(&self) -> Vector3<f32> {
        rotate(self.position, Deg(self.orbit_angle), self.inclination_axis())
    }

    /**
     * Scale, spin and tilt without any translation.
     *
     * Vertices are tilted first, then spun about the tilted axis, then scaled.
     */
    pub fn spin_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_scale(self.scale)
            * Matrix4::from_axis_angle(self.spin_axis(), Deg(self.self_rotation_angle))
            * Matrix4::from_angle_z(self.tilt())
    }
}
