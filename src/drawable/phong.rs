use std::sync::Arc;

use glam::{Mat3, Mat4};

use super::{Bindings, BuildResult, Drawable, DrawableContext};
use crate::geometry;
use crate::lighting::PhongParams;
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
        name: "a_normal",
        location: 1,
        stream: VertexStream::Normal,
    },
    AttributeDecl {
        name: "a_tex_coord",
        location: 2,
        stream: VertexStream::TexCoord,
    },
];

const UNIFORMS: &[UniformDecl] = &[
    UniformDecl {
        name: "u_phong",
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
        label: "Phong",
        vertex_source: include_str!("../shaders/phong.vert.wgsl"),
        fragment_source: include_str!("../shaders/phong.frag.wgsl"),
        attributes: ATTRIBUTES,
        uniforms: UNIFORMS,
        state: PipelineState::default(),
    }
}

/// Everything the lit sphere needs for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhongFrame {
    pub mvp: Mat4,
    pub model_view: Mat4,
    /// Inverse-transpose of the upper-left 3x3 of `model_view`.
    pub normal_matrix: Mat3,
    pub lighting: PhongParams,
}

/// GPU layout of [`PhongFrame`].
///
/// `mat3x3<f32>` columns are padded to 16 bytes, and each `vec3` shares its
/// last lane with the following scalar.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PhongUniforms {
    pub mvp: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 3],
    pub light_position: [f32; 3],
    pub ambient: f32,
    pub view_position: [f32; 3],
    pub specular: f32,
    pub shininess: f32,
    pub _padding: [f32; 3],
}

impl From<&PhongFrame> for PhongUniforms {
    fn from(frame: &PhongFrame) -> Self {
        let n = frame.normal_matrix;
        Self {
            mvp: frame.mvp.to_cols_array_2d(),
            model_view: frame.model_view.to_cols_array_2d(),
            normal_matrix: [
                n.x_axis.extend(0.0).to_array(),
                n.y_axis.extend(0.0).to_array(),
                n.z_axis.extend(0.0).to_array(),
            ],
            light_position: frame.lighting.light_position.to_array(),
            ambient: frame.lighting.ambient,
            view_position: frame.lighting.view_position.to_array(),
            specular: frame.lighting.specular,
            shininess: frame.lighting.shininess,
            _padding: [0.0; 3],
        }
    }
}

/// A textured unit sphere lit per fragment.
#[derive(Debug)]
pub struct PhongTexturedSphere {
    program: Arc<ShaderProgram>,
    mesh: GpuMesh,
    texture: Texture,
    bindings: Bindings,
}

impl PhongTexturedSphere {
    pub fn new(
        ctx: &mut DrawableContext,
        label: &str,
        stacks: u32,
        slices: u32,
        image: &ImageData,
    ) -> BuildResult<Self> {
        let program = ctx.programs.get_or_compile(ctx.device, &descriptor())?;

        let data = geometry::build_sphere(stacks, slices)?;
        let mesh = GpuMesh::new(ctx.device, label, &data)?;
        mesh.require(&program.streams())?;

        let texture = Texture::from_image(ctx.device, ctx.queue, image, label)?;
        let bindings = Bindings::new(
            ctx.device,
            &program,
            label,
            "u_phong",
            std::mem::size_of::<PhongUniforms>() as u64,
            Some(&texture),
        )?;

        Ok(Self {
            program,
            mesh,
            texture,
            bindings,
        })
    }
}

impl Drawable for PhongTexturedSphere {
    type Params = PhongFrame;

    fn draw(&self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>, frame: &PhongFrame) {
        self.bindings.write(queue, &PhongUniforms::from(frame));
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

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn uniform_layout_matches_wgsl() {
        assert_eq!(std::mem::size_of::<PhongUniforms>(), 224);
        assert_eq!(std::mem::offset_of!(PhongUniforms, normal_matrix), 128);
        assert_eq!(std::mem::offset_of!(PhongUniforms, light_position), 176);
        assert_eq!(std::mem::offset_of!(PhongUniforms, ambient), 188);
        assert_eq!(std::mem::offset_of!(PhongUniforms, view_position), 192);
        assert_eq!(std::mem::offset_of!(PhongUniforms, specular), 204);
        assert_eq!(std::mem::offset_of!(PhongUniforms, shininess), 208);
    }

    #[test]
    fn normal_matrix_columns_are_padded() {
        let frame = PhongFrame {
            mvp: Mat4::IDENTITY,
            model_view: Mat4::IDENTITY,
            normal_matrix: Mat3::from_cols(Vec3::X, Vec3::Y * 2.0, Vec3::Z * 3.0),
            lighting: PhongParams::default(),
        };
        let uniforms = PhongUniforms::from(&frame);
        assert_eq!(uniforms.normal_matrix[1], [0.0, 2.0, 0.0, 0.0]);
        assert_eq!(uniforms.normal_matrix[2], [0.0, 0.0, 3.0, 0.0]);
        assert_eq!(uniforms.ambient, 0.18);
        assert_eq!(uniforms.light_position, [5.0, 8.0, 10.0]);
    }
}
