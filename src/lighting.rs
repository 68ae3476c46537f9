//! Phong lighting parameters and a CPU mirror of the lit fragment stage.
//!
//! All positions are in eye space. The WGSL in `shaders/phong.frag.wgsl`
//! evaluates the same expression as [`shade`] per fragment.

use glam::Vec3;

/// Inputs to the lit sphere's lighting model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhongParams {
    pub light_position: Vec3,
    pub view_position: Vec3,
    /// Fraction of the texel applied regardless of orientation, in `[0, 1]`.
    pub ambient: f32,
    /// Weight of the white highlight, in `[0, 1]`.
    pub specular: f32,
    pub shininess: f32,
}

impl Default for PhongParams {
    fn default() -> Self {
        Self {
            light_position: Vec3::new(5.0, 8.0, 10.0),
            view_position: Vec3::ZERO,
            ambient: 0.18,
            specular: 0.7,
            shininess: 32.0,
        }
    }
}

impl PhongParams {
    /// Clamps strengths into `[0, 1]` and shininess above zero.
    pub fn sanitized(self) -> Self {
        Self {
            ambient: self.ambient.clamp(0.0, 1.0),
            specular: self.specular.clamp(0.0, 1.0),
            shininess: self.shininess.max(f32::EPSILON),
            ..self
        }
    }
}

/// Colour of one fragment with surface `normal` at `position`.
///
/// `ambient * texel + max(N.L, 0) * texel + specular * max(R.V, 0)^shininess`,
/// where the highlight only exists while the surface faces the light.
pub fn shade(texel: Vec3, normal: Vec3, position: Vec3, params: &PhongParams) -> Vec3 {
    let n = normal.normalize();
    let l = (params.light_position - position).normalize();
    let v = (params.view_position - position).normalize();

    let n_dot_l = n.dot(l);
    let ambient = params.ambient * texel;
    let diffuse = n_dot_l.max(0.0) * texel;

    let specular = if n_dot_l > 0.0 {
        let r = (-l).reflect(n);
        params.specular * r.dot(v).max(0.0).powf(params.shininess)
    } else {
        0.0
    };

    ambient + diffuse + Vec3::splat(specular)
}
