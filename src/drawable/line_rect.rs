use std::sync::Arc;

use glam::Mat4;

use super::{Bindings, BuildResult, Drawable, DrawableContext};
use crate::mesh::VertexStream;
use crate::shader::{
    AttributeDecl, PipelineState, ProgramDescriptor, ShaderProgram, UniformDecl, UniformKind,
};

const ATTRIBUTES: &[AttributeDecl] = &[AttributeDecl {
    name: "a_position",
    location: 0,
    stream: VertexStream::Position,
}];

const UNIFORMS: &[UniformDecl] = &[UniformDecl {
    name: "u_line",
    binding: 0,
    kind: UniformKind::Buffer,
}];

/// Closed outline: the first corner is repeated at the end.
const OUTLINE_VERTICES: u32 = 5;

pub(crate) fn descriptor() -> ProgramDescriptor<'static> {
    ProgramDescriptor {
        label: "Line",
        vertex_source: include_str!("../shaders/line.vert.wgsl"),
        fragment_source: include_str!("../shaders/line.frag.wgsl"),
        attributes: ATTRIBUTES,
        uniforms: UNIFORMS,
        state: PipelineState {
            topology: wgpu::PrimitiveTopology::LineStrip,
            ..Default::default()
        },
    }
}

/// An axis-aligned rectangle in the xy plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Rect {
    /// The rectangle spanning `[-half_x, half_x] × [-half_y, half_y]`.
    pub fn centered(half_x: f32, half_y: f32) -> Self {
        Self {
            min_x: -half_x,
            max_x: half_x,
            min_y: -half_y,
            max_y: half_y,
        }
    }

    /// Corners counter-clockwise from `(min_x, min_y)`, closed.
    pub fn outline(&self) -> [[f32; 3]; OUTLINE_VERTICES as usize] {
        [
            [self.min_x, self.min_y, 0.0],
            [self.max_x, self.min_y, 0.0],
            [self.max_x, self.max_y, 0.0],
            [self.min_x, self.max_y, 0.0],
            [self.min_x, self.min_y, 0.0],
        ]
    }
}

/// Per-draw inputs of a [`LineRect`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineParams {
    pub mvp: Mat4,
    pub rect: Rect,
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct LineUniforms {
    mvp: [[f32; 4]; 4],
    color: [f32; 4],
}

/// A rectangle outline in a flat colour.
#[derive(Debug)]
pub struct LineRect {
    program: Arc<ShaderProgram>,
    vertices: wgpu::Buffer,
    bindings: Bindings,
}

impl LineRect {
    pub fn new(ctx: &mut DrawableContext) -> BuildResult<Self> {
        let program = ctx.programs.get_or_compile(ctx.device, &descriptor())?;

        let vertices = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Line Rect Positions"),
            size: std::mem::size_of::<[[f32; 3]; OUTLINE_VERTICES as usize]>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bindings = Bindings::new(
            ctx.device,
            &program,
            "Line Rect",
            "u_line",
            std::mem::size_of::<LineUniforms>() as u64,
            None,
        )?;

        Ok(Self {
            program,
            vertices,
            bindings,
        })
    }
}

impl Drawable for LineRect {
    type Params = LineParams;

    fn draw(&self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>, params: &LineParams) {
        queue.write_buffer(&self.vertices, 0, bytemuck::cast_slice(&params.rect.outline()));
        self.bindings.write(
            queue,
            &LineUniforms {
                mvp: params.mvp.to_cols_array_2d(),
                color: params.color,
            },
        );

        pass.set_pipeline(self.program.pipeline());
        pass.set_bind_group(0, &self.bindings.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.draw(0..OUTLINE_VERTICES, 0..1);
    }

    fn release(&mut self) {
        self.vertices.destroy();
        self.bindings.buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_is_closed_and_axis_aligned() {
        let outline = Rect {
            min_x: -2.0,
            max_x: 3.0,
            min_y: -1.0,
            max_y: 4.0,
        }
        .outline();

        assert_eq!(outline[0], outline[4]);
        for pair in outline.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            // Each edge changes exactly one coordinate.
            assert!((a[0] == b[0]) != (a[1] == b[1]));
        }
        assert_eq!(outline[2], [3.0, 4.0, 0.0]);
    }

    #[test]
    fn centered_rect_is_symmetric() {
        let r = Rect::centered(4.0, 2.5);
        assert_eq!((r.min_x, r.max_x, r.min_y, r.max_y), (-4.0, 4.0, -2.5, 2.5));
    }
}
