//! The decorative body that drifts in front of the background.

use glam::{Mat4, Vec2, Vec3};

/// Half-extents of the background plane for a viewport aspect.
///
/// Wide viewports stretch the plane horizontally, tall ones vertically, so
/// it always overfills the view.
pub fn background_extent(aspect: f32, size: f32) -> Vec2 {
    if aspect > 1.0 {
        Vec2::new(size * aspect, size)
    } else {
        Vec2::new(size * 0.5, size * 0.5 / aspect)
    }
}

/// A body bouncing inside a rectangle at a fixed depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WanderingBody {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Eye-facing depth of the body's plane; negative.
    pub depth: f32,
    pub size: f32,
    limit: Vec2,
}

impl WanderingBody {
    /// Creates a body with an empty bound; call [`WanderingBody::set_bounds`] before stepping.
    pub fn new(position: Vec2, velocity: Vec2, depth: f32, size: f32) -> Self {
        Self {
            position,
            velocity,
            depth,
            size,
            limit: Vec2::ZERO,
        }
    }

    /// Half-extents of the rectangle the body is confined to.
    pub fn limit(&self) -> Vec2 {
        self.limit
    }

    /// Sets the bound directly and clamps the position into it.
    pub fn set_limit(&mut self, limit: Vec2) {
        self.limit = limit.abs();
        self.position = self.position.clamp(-self.limit, self.limit);
    }

    /// Scales the background's half-extents down to this body's depth.
    ///
    /// Both depths are negative, so the ratio is positive.
    pub fn set_bounds(&mut self, background_extent: Vec2, background_depth: f32) {
        let ratio = if background_depth != 0.0 {
            self.depth / background_depth
        } else {
            0.0
        };
        self.set_limit(background_extent * ratio);
    }

    /// Moves one frame and reflects off the bound on each axis independently.
    pub fn step(&mut self) {
        self.position += self.velocity;

        for axis in 0..2 {
            let limit = self.limit[axis];
            if self.position[axis] > limit {
                self.position[axis] = limit;
                self.velocity[axis] = -self.velocity[axis];
            } else if self.position[axis] < -limit {
                self.position[axis] = -limit;
                self.velocity[axis] = -self.velocity[axis];
            }
        }
    }

    /// Transform of the bounding rectangle's plane.
    pub fn plane_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, self.depth))
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.position.x, self.position.y, self.depth))
            * Mat4::from_scale(Vec3::splat(self.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bouncing(position: Vec2, velocity: Vec2) -> WanderingBody {
        let mut body = WanderingBody::new(position, velocity, -8.0, 0.4);
        body.set_limit(Vec2::new(4.0, 3.0));
        body
    }

    #[test]
    fn reflects_at_positive_x_bound() {
        let mut body = bouncing(Vec2::new(4.0, 0.0), Vec2::new(0.1, 0.0));

        body.step();
        assert_eq!(body.position.x, 4.0);
        assert_eq!(body.velocity.x, -0.1);

        body.step();
        assert!(body.position.x < 4.0);
        body.step();
        assert!(body.position.x < 3.9);
    }

    #[test]
    fn axes_reflect_independently() {
        let mut body = bouncing(Vec2::new(0.0, -2.95), Vec2::new(0.2, -0.1));
        body.step();

        assert_eq!(body.position.y, -3.0);
        assert_eq!(body.velocity, Vec2::new(0.2, 0.1));
    }

    #[test]
    fn position_stays_clamped_over_many_steps() {
        let mut body = bouncing(Vec2::ZERO, Vec2::new(0.37, 0.29));
        for _ in 0..10_000 {
            body.step();
            assert!(body.position.x.abs() <= 4.0);
            assert!(body.position.y.abs() <= 3.0);
        }
    }

    #[test]
    fn bound_scales_by_depth_ratio() {
        let mut body = WanderingBody::new(Vec2::ZERO, Vec2::ZERO, -8.0, 0.4);
        body.set_bounds(Vec2::new(60.0, 30.0), -30.0);
        assert!((body.limit() - Vec2::new(16.0, 8.0)).length() < 1e-5);
    }

    #[test]
    fn shrinking_bound_pulls_body_inside() {
        let mut body = bouncing(Vec2::new(3.5, 2.5), Vec2::ZERO);
        body.set_limit(Vec2::new(1.0, 1.0));
        assert_eq!(body.position, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn background_overfills_both_orientations() {
        assert_eq!(background_extent(2.0, 40.0), Vec2::new(80.0, 40.0));
        assert_eq!(background_extent(0.5, 40.0), Vec2::new(20.0, 40.0));
    }
}
