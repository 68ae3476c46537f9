//! Drawable variants.
//!
//! Each drawable owns its mesh buffers, a uniform buffer and a bind group,
//! and shares its linked program with every other drawable of the same kind
//! through the [`ProgramLibrary`]. Drawing writes the per-draw uniforms and
//! records one draw call; nothing else changes between frames.
//!
//! | Variant                 | Program        | Params              |
//! |-------------------------|----------------|---------------------|
//! | [`TexturedQuad`]        | textured       | [`Mat4`] mvp        |
//! | [`TexturedSphere`]      | textured       | [`Mat4`] mvp        |
//! | [`ColoredSphere`]       | colored        | [`Mat4`] mvp        |
//! | [`ColorCube`]           | colored, blend | [`Mat4`] mvp        |
//! | [`PhongTexturedSphere`] | phong          | [`PhongFrame`]      |
//! | [`LineRect`]            | line           | [`LineParams`]      |
//!
//! A uniform buffer holds one value, so each drawable is drawn at most once
//! per submitted frame.

mod colored;
mod line_rect;
mod phong;
mod textured;

pub use colored::{ColorCube, ColoredSphere};
pub use line_rect::{LineParams, LineRect, Rect};
pub use phong::{PhongFrame, PhongTexturedSphere, PhongUniforms};
pub use textured::{TexturedQuad, TexturedSphere};

use glam::Mat4;

use crate::error::SceneError;
use crate::shader::{ProgramLibrary, ShaderError, ShaderProgram};
use crate::texture::Texture;

/// Something that can record itself into a render pass.
pub trait Drawable {
    /// Per-draw inputs.
    type Params;

    /// Uploads `params` and records the draw into `pass`.
    ///
    /// The pass must target the surface format and depth format the program
    /// library was created for.
    fn draw(&self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>, params: &Self::Params);

    /// Frees GPU buffers and textures early. Safe to call more than once.
    fn release(&mut self);
}

/// Borrowed GPU state needed to build drawables.
pub struct DrawableContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub programs: &'a mut ProgramLibrary,
}

/// `mvp` uniform shared by the textured and coloured programs.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniforms {
    pub mvp: [[f32; 4]; 4],
}

impl From<Mat4> for TransformUniforms {
    fn from(mvp: Mat4) -> Self {
        Self {
            mvp: mvp.to_cols_array_2d(),
        }
    }
}

/// Uniform buffer plus the bind group tying it (and an optional texture) to a program.
#[derive(Debug)]
pub(crate) struct Bindings {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
}

impl Bindings {
    /// Creates a `size`-byte uniform buffer bound at `uniform`, and `texture`
    /// at `t_diffuse` / `s_diffuse` when given.
    pub(crate) fn new(
        device: &wgpu::Device,
        program: &ShaderProgram,
        label: &str,
        uniform: &str,
        size: u64,
        texture: Option<&Texture>,
    ) -> Result<Self, ShaderError> {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Uniforms")),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: program.uniform_binding(uniform)?,
            resource: buffer.as_entire_binding(),
        }];

        if let Some(texture) = texture {
            entries.push(wgpu::BindGroupEntry {
                binding: program.uniform_binding("t_diffuse")?,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: program.uniform_binding("s_diffuse")?,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            });
        }

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Bind Group")),
            layout: program.bind_group_layout(),
            entries: &entries,
        });

        Ok(Self { buffer, bind_group })
    }

    pub(crate) fn write<T: bytemuck::Pod>(&self, queue: &wgpu::Queue, value: &T) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(value));
    }
}

/// The drawable used for one overview body.
///
/// Textured when the body's image loaded, otherwise a sphere in its
/// catalog colour.
pub enum BodyDrawable {
    Textured(TexturedSphere),
    Colored(ColoredSphere),
}

impl Drawable for BodyDrawable {
    type Params = Mat4;

    fn draw(&self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>, mvp: &Mat4) {
        match self {
            BodyDrawable::Textured(sphere) => sphere.draw(queue, pass, mvp),
            BodyDrawable::Colored(sphere) => sphere.draw(queue, pass, mvp),
        }
    }

    fn release(&mut self) {
        match self {
            BodyDrawable::Textured(sphere) => sphere.release(),
            BodyDrawable::Colored(sphere) => sphere.release(),
        }
    }
}

/// Convenience for constructors: fold every setup failure into [`SceneError`].
pub(crate) type BuildResult<T> = Result<T, SceneError>;
