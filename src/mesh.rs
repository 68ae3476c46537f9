//! GPU-resident mesh buffers.
//!
//! A [`GpuMesh`] uploads each attribute stream of a [`MeshData`] into its own
//! vertex buffer, so a program can bind exactly the streams its interface
//! declares:
//!
//! | Stream      | Format    | Stride |
//! |-------------|-----------|--------|
//! | position    | Float32x3 | 12     |
//! | normal      | Float32x3 | 12     |
//! | tex_coord   | Float32x2 | 8      |
//! | color       | Float32x4 | 16     |
//!
//! Indices are 16-bit. Meshes are immutable after upload.

use wgpu::util::DeviceExt;

use crate::geometry::{GeometryError, MeshData};

/// A vertex attribute stream a mesh can provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexStream {
    Position,
    Normal,
    TexCoord,
    Color,
}

impl VertexStream {
    /// The vertex format of one element of this stream.
    pub fn format(self) -> wgpu::VertexFormat {
        match self {
            VertexStream::Position | VertexStream::Normal => wgpu::VertexFormat::Float32x3,
            VertexStream::TexCoord => wgpu::VertexFormat::Float32x2,
            VertexStream::Color => wgpu::VertexFormat::Float32x4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VertexStream::Position => "position",
            VertexStream::Normal => "normal",
            VertexStream::TexCoord => "tex_coord",
            VertexStream::Color => "color",
        }
    }
}

/// Mesh geometry uploaded to the GPU.
#[derive(Debug)]
pub struct GpuMesh {
    positions: wgpu::Buffer,
    normals: Option<wgpu::Buffer>,
    tex_coords: Option<wgpu::Buffer>,
    colors: Option<wgpu::Buffer>,
    indices: Option<wgpu::Buffer>,
    element_count: u32,
}

impl GpuMesh {
    /// Validates `data` and uploads every present stream.
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        data: &MeshData,
    ) -> Result<Self, GeometryError> {
        data.validate()?;

        let vertex_buffer = |stream: &str, contents: &[u8]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} {stream}")),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            })
        };

        let positions = vertex_buffer("Positions", bytemuck::cast_slice(&data.positions));
        let normals = data
            .normals
            .as_ref()
            .map(|n| vertex_buffer("Normals", bytemuck::cast_slice(n)));
        let tex_coords = data
            .tex_coords
            .as_ref()
            .map(|uv| vertex_buffer("Tex Coords", bytemuck::cast_slice(uv)));
        let colors = data
            .colors
            .as_ref()
            .map(|c| vertex_buffer("Colors", bytemuck::cast_slice(c)));

        let indices = data.indices.as_ref().map(|indices| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Indices")),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        Ok(Self {
            positions,
            normals,
            tex_coords,
            colors,
            indices,
            element_count: data.element_count() as u32,
        })
    }

    /// Returns the buffer backing `stream`, if the mesh has one.
    pub fn stream(&self, stream: VertexStream) -> Option<&wgpu::Buffer> {
        match stream {
            VertexStream::Position => Some(&self.positions),
            VertexStream::Normal => self.normals.as_ref(),
            VertexStream::TexCoord => self.tex_coords.as_ref(),
            VertexStream::Color => self.colors.as_ref(),
        }
    }

    /// First stream in `streams` this mesh cannot provide.
    pub fn missing_stream(&self, streams: &[VertexStream]) -> Option<VertexStream> {
        streams.iter().copied().find(|s| self.stream(*s).is_none())
    }

    /// Fails if the mesh lacks any of `streams`.
    pub fn require(&self, streams: &[VertexStream]) -> Result<(), GeometryError> {
        match self.missing_stream(streams) {
            Some(stream) => Err(GeometryError::MissingStream {
                stream: stream.name(),
            }),
            None => Ok(()),
        }
    }

    /// Number of indices (or vertices, for unindexed meshes) drawn per call.
    pub fn element_count(&self) -> u32 {
        self.element_count
    }

    /// Binds `streams` to consecutive vertex buffer slots and issues the draw.
    ///
    /// The caller has already set the pipeline and bind groups. Streams the
    /// mesh lacks are skipped; see [`GpuMesh::missing_stream`].
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass, streams: &[VertexStream]) {
        for (slot, stream) in streams.iter().enumerate() {
            if let Some(buffer) = self.stream(*stream) {
                render_pass.set_vertex_buffer(slot as u32, buffer.slice(..));
            }
        }

        match &self.indices {
            Some(indices) => {
                render_pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..self.element_count, 0, 0..1);
            }
            None => render_pass.draw(0..self.element_count, 0..1),
        }
    }

    /// Frees the GPU memory now instead of waiting for drop.
    pub fn destroy(&self) {
        self.positions.destroy();
        for buffer in [&self.normals, &self.tex_coords, &self.colors, &self.indices]
            .into_iter()
            .flatten()
        {
            buffer.destroy();
        }
    }
}
