use crate::config::ConfigError;
use crate::geometry::GeometryError;
use crate::gpu::GpuError;
use crate::selection::SelectionError;
use crate::shader::ShaderError;
use crate::texture::TextureError;

/// Any failure that stops a scene from being set up or run.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Gpu(#[from] GpuError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The surface refused to hand out a frame.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// A draw was requested before setup succeeded or after release.
    #[error("surface is not ready to draw ({0})")]
    NotReady(&'static str),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
