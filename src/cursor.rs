use glam::{Mat4, Vec3};

use crate::catalog::BodySpec;
use crate::clock::turn_radians;
use crate::orbit::OrbitingBody;

/// Placement of the translucent selection cube.
///
/// The cube follows the selected body's orbit (including a satellite orbit)
/// and is sized so its unit-edge mesh encloses the body with some padding. It
/// turns with the clock and leans towards the camera so it never lines up
/// with the body it marks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cursor {
    /// Edge length as a multiple of the body's diameter.
    pub padding: f32,
    /// Fixed lean about x, in degrees.
    pub tilt: f32,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            padding: 1.2,
            tilt: 20.0,
        }
    }
}

impl Cursor {
    /// Cube edge length for a body of visual radius `size`, before global scaling.
    pub fn edge(&self, size: f32) -> f32 {
        size * 2.0 * self.padding
    }

    pub fn model_matrix(&self, body: &BodySpec, clock: f64, scale: f32) -> Mat4 {
        OrbitingBody::from(body).placement(clock, scale)
            * Mat4::from_scale(Vec3::splat(self.edge(body.size) * scale))
            * Mat4::from_rotation_y(turn_radians(clock, 1.0))
            * Mat4::from_rotation_x(self.tilt.to_radians())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CATALOG, MOON};

    #[test]
    fn cursor_is_centred_on_the_selected_body() {
        let cursor = Cursor::default();
        for body in &CATALOG {
            let clock = 42.5;
            let body_centre = OrbitingBody::from(body)
                .model_matrix(clock, 2.0)
                .transform_point3(Vec3::ZERO);
            let cursor_centre = cursor
                .model_matrix(body, clock, 2.0)
                .transform_point3(Vec3::ZERO);
            assert!(
                (body_centre - cursor_centre).length() < 1e-5,
                "{}",
                body.name
            );
        }
    }

    #[test]
    fn cube_encloses_the_body() {
        let cursor = Cursor::default();
        let moon = &CATALOG[MOON];
        let m = cursor.model_matrix(moon, 0.0, 1.0);

        // The face centre of a unit cube sits 0.5 from its middle.
        let centre = m.transform_point3(Vec3::ZERO);
        let face = m.transform_point3(Vec3::new(0.5, 0.0, 0.0));
        let half_edge = (face - centre).length();

        assert!((half_edge - moon.size * 1.2).abs() < 1e-6);
        assert!(half_edge > moon.size);
    }

    #[test]
    fn edge_is_diameter_times_padding() {
        assert!((Cursor::default().edge(0.5) - 1.2).abs() < 1e-6);
    }
}
