use std::sync::Arc;

use glam::Mat4;

use super::{Bindings, BuildResult, Drawable, DrawableContext, TransformUniforms};
use crate::geometry::{self, MeshData};
use crate::mesh::{GpuMesh, VertexStream};
use crate::shader::{
    AttributeDecl, PipelineState, ProgramDescriptor, ShaderProgram, UniformDecl, UniformKind,
};
use crate::texture::{ImageData, Texture};

const ATTRIBUTES: &[AttributeDecl] = &[
    AttributeDecl {
        name: "a_position",
        location: 0,
        stream: VertexStream::Position,
    },
    AttributeDecl {
        name: "a_tex_coord",
        location: 1,
        stream: VertexStream::TexCoord,
    },
];

const UNIFORMS: &[UniformDecl] = &[
    UniformDecl {
        name: "u_transform",
        binding: 0,
        kind: UniformKind::Buffer,
    },
    UniformDecl {
        name: "t_diffuse",
        binding: 1,
        kind: UniformKind::Texture,
    },
    UniformDecl {
        name: "s_diffuse",
        binding: 2,
        kind: UniformKind::Sampler,
    },
];

pub(crate) fn descriptor() -> ProgramDescriptor<'static> {
    ProgramDescriptor {
        label: "Textured",
        vertex_source: include_str!("../shaders/textured.vert.wgsl"),
        fragment_source: include_str!("../shaders/textured.frag.wgsl"),
        attributes: ATTRIBUTES,
        uniforms: UNIFORMS,
        state: PipelineState::default(),
    }
}

/// An unlit mesh sampling one texture.
#[derive(Debug)]
struct TexturedMesh {
    program: Arc<ShaderProgram>,
    mesh: GpuMesh,
    texture: Texture,
    bindings: Bindings,
}

impl TexturedMesh {
    fn new(
        ctx: &mut DrawableContext,
        label: &str,
        data: &MeshData,
        image: &ImageData,
    ) -> BuildResult<Self> {
        let program = ctx.programs.get_or_compile(ctx.device, &descriptor())?;

        let mesh = GpuMesh::new(ctx.device, label, data)?;
        mesh.require(&program.streams())?;

        let texture = Texture::from_image(ctx.device, ctx.queue, image, label)?;
        let bindings = Bindings::new(
            ctx.device,
            &program,
            label,
            "u_transform",
            std::mem::size_of::<TransformUniforms>() as u64,
            Some(&texture),
        )?;

        Ok(Self {
            program,
            mesh,
            texture,
            bindings,
        })
    }

    fn draw(&self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>, mvp: &Mat4) {
        self.bindings.write(queue, &TransformUniforms::from(*mvp));
        pass.set_pipeline(self.program.pipeline());
        pass.set_bind_group(0, &self.bindings.bind_group, &[]);
        self.mesh.draw(pass, &self.program.streams());
    }

    fn release(&mut self) {
        self.mesh.destroy();
        self.texture.destroy();
        self.bindings.buffer.destroy();
    }
}

/// The background panorama: a textured quad spanning `[-1, 1]` in x and y.
#[derive(Debug)]
pub struct TexturedQuad {
    inner: TexturedMesh,
}

impl TexturedQuad {
    pub fn new(ctx: &mut DrawableContext, image: &ImageData) -> BuildResult<Self> {
        Ok(Self {
            inner: TexturedMesh::new(ctx, "Background Quad", &geometry::build_quad(), image)?,
        })
    }
}

impl Drawable for TexturedQuad {
    type Params = Mat4;

    fn draw(&self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>, mvp: &Mat4) {
        self.inner.draw(queue, pass, mvp);
    }

    fn release(&mut self) {
        self.inner.release();
    }
}

/// An unlit textured unit sphere.
#[derive(Debug)]
pub struct TexturedSphere {
    inner: TexturedMesh,
}

impl TexturedSphere {
    pub fn new(
        ctx: &mut DrawableContext,
        label: &str,
        stacks: u32,
        slices: u32,
        image: &ImageData,
    ) -> BuildResult<Self> {
        let data = geometry::build_sphere(stacks, slices)?;
        Ok(Self {
            inner: TexturedMesh::new(ctx, label, &data, image)?,
        })
    }
}

impl Drawable for TexturedSphere {
    type Params = Mat4;

    fn draw(&self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>, mvp: &Mat4) {
        self.inner.draw(queue, pass, mvp);
    }

    fn release(&mut self) {
        self.inner.release();
    }
}
