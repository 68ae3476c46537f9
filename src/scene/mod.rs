//! The two views and the lifecycle they share.
//!
//! A view is split in two halves:
//!
//! - a pure scene ([`OverviewScene`], [`DetailScene`]) that owns the clock,
//!   camera, projection and animated state, and turns them into matrices
//!   each frame without touching the GPU;
//! - a renderer ([`OverviewRenderer`], [`DetailRenderer`]) that owns the
//!   drawables and implements [`SurfaceRenderer`], so a
//!   [`SurfaceDriver`](crate::surface::SurfaceDriver) can run it.
//!
//! The driver calls the renderer in a fixed sequence:
//!
//! ```text
//! on_surface_created -> on_surface_changed* -> on_draw_frame* -> release
//! ```

pub mod detail;
pub mod overview;

pub use detail::{DetailRenderer, DetailScene};
pub use overview::{DrawCommand, DrawItem, FramePlan, OverviewRenderer, OverviewScene};

use crate::error::SceneError;

/// GPU handles passed to a renderer while it builds its resources.
pub struct SurfaceInfo<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    /// Colour format of the surface pipelines must target.
    pub format: wgpu::TextureFormat,
}

/// A view that can be driven by a drawing surface.
pub trait SurfaceRenderer {
    /// Builds every GPU resource the view needs.
    ///
    /// An error leaves the view unusable; the driver will not draw it.
    fn on_surface_created(&mut self, surface: &SurfaceInfo) -> Result<(), SceneError>;

    /// Recomputes viewport-dependent state for a `width` × `height` surface.
    fn on_surface_changed(&mut self, width: u32, height: u32);

    /// Advances the clock one frame and records the frame's draws.
    fn on_draw_frame(&mut self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>);

    /// Frees GPU resources. Must tolerate being called repeatedly, and after
    /// a failed [`SurfaceRenderer::on_surface_created`].
    fn release(&mut self);
}

/// Which view the host is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewKind {
    Overview,
    Detail,
}

/// Aspect ratio of a surface, treating a zero height as square.
pub(crate) fn aspect_ratio(width: u32, height: u32) -> f32 {
    if width == 0 || height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_handles_degenerate_sizes() {
        assert_eq!(aspect_ratio(1600, 800), 2.0);
        assert_eq!(aspect_ratio(0, 800), 1.0);
        assert_eq!(aspect_ratio(800, 0), 1.0);
    }
}
