use glam::{Mat3, Mat4, Vec3};

/// A fixed look-at camera.
///
/// Both scenes place the camera once; only the projection follows the
/// viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.eye = Vec3::new(x, y, z);
        self
    }

    pub fn looking_at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.target = Vec3::new(x, y, z);
        self
    }

    /// Right-handed view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
}

/// An off-centre perspective volume in eye space.
///
/// The produced matrix maps `-near` to depth 0 and `-far` to depth 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Frustum {
    /// `left = -aspect, right = aspect, bottom = -1, top = 1`.
    pub fn symmetric(aspect: f32, near: f32, far: f32) -> Self {
        Self {
            left: -aspect,
            right: aspect,
            bottom: -1.0,
            top: 1.0,
            near,
            far,
        }
    }

    /// Right-handed projection with wgpu's `[0, 1]` depth range.
    pub fn matrix(&self) -> Mat4 {
        Mat4::frustum_rh(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        )
    }
}

/// Picks the wide constant when `aspect > 1`, otherwise the tall one.
///
/// Intentionally a step, not a blend.
pub fn global_scale(aspect: f32, wide: f32, tall: f32) -> f32 {
    if aspect > 1.0 { wide } else { tall }
}

/// Inverse-transpose of the upper-left 3x3 of `model_view`.
pub fn normal_matrix(model_view: Mat4) -> Mat3 {
    Mat3::from_mat4(model_view).inverse().transpose()
}
