//! Orbit kinematics.
//!
//! Angles are degrees. A body's model matrix is composed by right
//! multiplication in a fixed order:
//!
//! ```text
//! rotate_y(clock * orbit_speed)
//!   * translate(orbit_radius * scale, 0, 0)
//!   [* rotate_y(clock * satellite.speed) * translate(satellite.offset * scale, 0, 0)]
//!   * rotate_y(clock * spin) * rotate_x(tilt)
//!   * scale(size * scale)
//! ```

use glam::{Mat4, Vec3};

use crate::catalog::{BodySpec, Satellite};
use crate::clock::turn_radians;

/// Orbital parameters of one rendered body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitingBody {
    pub orbit_radius: f32,
    pub size: f32,
    pub orbit_speed: f32,
    pub spin: f32,
    /// Axial tilt about x, in degrees.
    pub tilt: f32,
    pub satellite: Option<Satellite>,
}

impl OrbitingBody {
    pub fn new(orbit_radius: f32, size: f32, orbit_speed: f32) -> Self {
        Self {
            orbit_radius,
            size,
            orbit_speed,
            spin: 0.0,
            tilt: 0.0,
            satellite: None,
        }
    }

    /// Where the body sits, without its own spin, tilt or size.
    pub fn placement(&self, clock: f64, scale: f32) -> Mat4 {
        let mut m = Mat4::from_rotation_y(turn_radians(clock, self.orbit_speed))
            * Mat4::from_translation(Vec3::new(self.orbit_radius * scale, 0.0, 0.0));

        if let Some(satellite) = self.satellite {
            m = m
                * Mat4::from_rotation_y(turn_radians(clock, satellite.speed))
                * Mat4::from_translation(Vec3::new(satellite.offset * scale, 0.0, 0.0));
        }

        m
    }

    /// The full model matrix at `clock` for global scale `scale`.
    pub fn model_matrix(&self, clock: f64, scale: f32) -> Mat4 {
        self.placement(clock, scale)
            * Mat4::from_rotation_y(turn_radians(clock, self.spin))
            * Mat4::from_rotation_x(self.tilt.to_radians())
            * Mat4::from_scale(Vec3::splat(self.size * scale))
    }
}

impl From<&BodySpec> for OrbitingBody {
    fn from(spec: &BodySpec) -> Self {
        Self {
            spin: spec.spin,
            satellite: spec.satellite,
            ..Self::new(spec.orbit_radius, spec.size, spec.orbit_speed)
        }
    }
}
