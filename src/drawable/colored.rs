use std::sync::Arc;

use glam::Mat4;

use super::{Bindings, BuildResult, Drawable, DrawableContext, TransformUniforms};
use crate::geometry::{self, MeshData};
use crate::mesh::{GpuMesh, VertexStream};
use crate::shader::{
    AttributeDecl, PipelineState, ProgramDescriptor, ShaderProgram, UniformDecl, UniformKind,
};

const ATTRIBUTES: &[AttributeDecl] = &[
    AttributeDecl {
        name: "a_position",
        location: 0,
        stream: VertexStream::Position,
    },
    AttributeDecl {
        name: "a_color",
        location: 1,
        stream: VertexStream::Color,
    },
];

const UNIFORMS: &[UniformDecl] = &[UniformDecl {
    name: "u_transform",
    binding: 0,
    kind: UniformKind::Buffer,
}];

pub(crate) fn descriptor(blended: bool) -> ProgramDescriptor<'static> {
    let (label, blend) = if blended {
        ("Colored Blended", wgpu::BlendState::ALPHA_BLENDING)
    } else {
        ("Colored", wgpu::BlendState::REPLACE)
    };

    ProgramDescriptor {
        label,
        vertex_source: include_str!("../shaders/colored.vert.wgsl"),
        fragment_source: include_str!("../shaders/colored.frag.wgsl"),
        attributes: ATTRIBUTES,
        uniforms: UNIFORMS,
        state: PipelineState {
            blend: Some(blend),
            ..Default::default()
        },
    }
}

#[derive(Debug)]
struct ColoredMesh {
    program: Arc<ShaderProgram>,
    mesh: GpuMesh,
    bindings: Bindings,
}

impl ColoredMesh {
    fn new(
        ctx: &mut DrawableContext,
        label: &str,
        data: &MeshData,
        blended: bool,
    ) -> BuildResult<Self> {
        let program = ctx
            .programs
            .get_or_compile(ctx.device, &descriptor(blended))?;

        let mesh = GpuMesh::new(ctx.device, label, data)?;
        mesh.require(&program.streams())?;

        let bindings = Bindings::new(
            ctx.device,
            &program,
            label,
            "u_transform",
            std::mem::size_of::<TransformUniforms>() as u64,
            None,
        )?;

        Ok(Self {
            program,
            mesh,
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
        self.bindings.buffer.destroy();
    }
}

/// A unit sphere in one flat colour.
///
/// Stands in for bodies without a texture and draws the wanderer.
#[derive(Debug)]
pub struct ColoredSphere {
    inner: ColoredMesh,
}

impl ColoredSphere {
    pub fn new(
        ctx: &mut DrawableContext,
        label: &str,
        stacks: u32,
        slices: u32,
        color: [f32; 4],
    ) -> BuildResult<Self> {
        let data = geometry::build_sphere(stacks, slices)?.with_solid_color(color);
        let blended = color[3] < 1.0;
        Ok(Self {
            inner: ColoredMesh::new(ctx, label, &data, blended)?,
        })
    }
}

impl Drawable for ColoredSphere {
    type Params = Mat4;

    fn draw(&self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>, mvp: &Mat4) {
        self.inner.draw(queue, pass, mvp);
    }

    fn release(&mut self) {
        self.inner.release();
    }
}

/// A unit-edge cube with one colour per face, alpha blended.
#[derive(Debug)]
pub struct ColorCube {
    inner: ColoredMesh,
}

impl ColorCube {
    pub fn new(ctx: &mut DrawableContext, face_colors: &[[f32; 4]; 6]) -> BuildResult<Self> {
        let data = geometry::build_cube_with_colors(face_colors);
        Ok(Self {
            inner: ColoredMesh::new(ctx, "Cursor Cube", &data, true)?,
        })
    }
}

impl Drawable for ColorCube {
    type Params = Mat4;

    fn draw(&self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>, mvp: &Mat4) {
        self.inner.draw(queue, pass, mvp);
    }

    fn release(&mut self) {
        self.inner.release();
    }
}
