//! Procedural mesh generation for the scene's primitives.
//!
//! Everything here runs on the CPU and produces a [`MeshData`]: plain vertex
//! attribute arrays plus an optional triangle index list. Uploading happens
//! separately in [`GpuMesh`](crate::mesh::GpuMesh), so the generators can be
//! tested without a device.
//!
//! | Builder            | Vertices                      | Indexed | Attributes            |
//! |--------------------|-------------------------------|---------|-----------------------|
//! | [`build_sphere`]   | `(stacks + 1) × (slices + 1)` | yes     | position, normal, uv  |
//! | [`build_cube`]     | 36                            | no      | position, color       |
//! | [`build_quad`]     | 4                             | yes     | position, uv          |
//!
//! # Example
//!
//! ```
//! use orrery::geometry::build_sphere;
//!
//! let sphere = build_sphere(48, 48).unwrap();
//! assert_eq!(sphere.vertex_count(), 49 * 49);
//! assert_eq!(sphere.triangle_count(), 2 * 48 * 48);
//! ```

use std::f64::consts::PI;

/// Index type used by every generated mesh.
pub type Index = u16;

/// Largest vertex count addressable by [`Index`].
pub const MAX_VERTICES: usize = Index::MAX as usize + 1;

/// Errors raised while generating geometry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// A sphere needs at least one stack and three slices to enclose volume.
    #[error("invalid sphere tessellation: {stacks} stacks × {slices} slices")]
    InvalidTessellation { stacks: u32, slices: u32 },

    /// The vertex count does not fit the index width.
    #[error("{vertex_count} vertices exceed the {max} addressable by a 16-bit index")]
    IndexOverflow { vertex_count: usize, max: usize },

    /// Attribute arrays disagree on vertex count.
    #[error("attribute '{attribute}' has {len} entries, expected {expected}")]
    AttributeMismatch {
        attribute: &'static str,
        len: usize,
        expected: usize,
    },

    /// An index refers past the end of the vertex arrays.
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: Index, vertex_count: usize },

    /// A program reads a stream the mesh was built without.
    #[error("mesh has no '{stream}' stream")]
    MissingStream { stream: &'static str },
}

/// Per-face colours of the selection cube: red, green, blue, yellow, magenta, cyan.
///
/// Alpha is low so the marked body shows through the cursor.
pub const CUBE_FACE_COLORS: [[f32; 4]; 6] = [
    [1.0, 0.0, 0.0, 0.3],
    [0.0, 1.0, 0.0, 0.3],
    [0.0, 0.0, 1.0, 0.3],
    [1.0, 1.0, 0.0, 0.3],
    [1.0, 0.0, 1.0, 0.3],
    [0.0, 1.0, 1.0, 0.3],
];

/// CPU-side mesh: vertex attribute streams sharing one vertex ordering.
///
/// Immutable once built; the drawable that uploads it owns the result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions in model space.
    pub positions: Vec<[f32; 3]>,
    /// Unit normals, one per position.
    pub normals: Option<Vec<[f32; 3]>>,
    /// Texture coordinates in `[0, 1]`, one per position.
    pub tex_coords: Option<Vec<[f32; 2]>>,
    /// RGBA colours, one per position.
    pub colors: Option<Vec<[f32; 4]>>,
    /// Triangle list indices. `None` means the positions are drawn in order.
    pub indices: Option<Vec<Index>>,
}

impl MeshData {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of entries in the index list, or the vertex count for non-indexed meshes.
    pub fn element_count(&self) -> usize {
        self.indices
            .as_ref()
            .map_or(self.positions.len(), |indices| indices.len())
    }

    /// Number of triangles described by the mesh.
    pub fn triangle_count(&self) -> usize {
        self.element_count() / 3
    }

    /// Replaces the colour stream with a single colour for every vertex.
    pub fn with_solid_color(mut self, color: [f32; 4]) -> Self {
        self.colors = Some(vec![color; self.positions.len()]);
        self
    }

    /// Checks that all attribute streams agree and every index is in range.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let expected = self.positions.len();
        if expected > MAX_VERTICES {
            return Err(GeometryError::IndexOverflow {
                vertex_count: expected,
                max: MAX_VERTICES,
            });
        }

        let streams = [
            ("normals", self.normals.as_ref().map(Vec::len)),
            ("tex_coords", self.tex_coords.as_ref().map(Vec::len)),
            ("colors", self.colors.as_ref().map(Vec::len)),
        ];
        for (attribute, len) in streams {
            if let Some(len) = len
                && len != expected
            {
                return Err(GeometryError::AttributeMismatch {
                    attribute,
                    len,
                    expected,
                });
            }
        }

        if let Some(indices) = &self.indices
            && let Some(&index) = indices.iter().find(|&&i| i as usize >= expected)
        {
            return Err(GeometryError::IndexOutOfRange {
                index,
                vertex_count: expected,
            });
        }

        Ok(())
    }
}

/// Builds a unit sphere by latitude/longitude subdivision.
///
/// `y` is the polar axis. Latitude `φ = π·stack/stacks`, longitude
/// `θ = 2π·slice/slices`, and each vertex sits at
/// `(sinφ·cosθ, cosφ, sinφ·sinθ)` with the same value as its normal. The seam
/// column is duplicated so texture coordinates run cleanly from 0 to 1.
///
/// Normals equal positions only because the radius is 1; scale the sphere
/// uniformly or renormalize.
pub fn build_sphere(stacks: u32, slices: u32) -> Result<MeshData, GeometryError> {
    if stacks == 0 || slices < 3 {
        return Err(GeometryError::InvalidTessellation { stacks, slices });
    }

    let vertex_count = (stacks as usize + 1) * (slices as usize + 1);
    if vertex_count > MAX_VERTICES {
        return Err(GeometryError::IndexOverflow {
            vertex_count,
            max: MAX_VERTICES,
        });
    }

    let mut positions = Vec::with_capacity(vertex_count);
    let mut tex_coords = Vec::with_capacity(vertex_count);

    for stack in 0..=stacks {
        let phi = PI * stack as f64 / stacks as f64;
        let (sin_phi, cos_phi) = phi.sin_cos();
        let v = stack as f32 / stacks as f32;

        for slice in 0..=slices {
            let theta = 2.0 * PI * slice as f64 / slices as f64;
            let (sin_theta, cos_theta) = theta.sin_cos();

            positions.push([
                (sin_phi * cos_theta) as f32,
                cos_phi as f32,
                (sin_phi * sin_theta) as f32,
            ]);
            tex_coords.push([slice as f32 / slices as f32, v]);
        }
    }

    let mut indices = Vec::with_capacity(stacks as usize * slices as usize * 6);
    for i in 0..stacks {
        let k1 = i * (slices + 1);
        let k2 = k1 + slices + 1;

        for j in 0..slices {
            indices.extend_from_slice(&[
                (k1 + j) as Index,
                (k2 + j) as Index,
                (k1 + j + 1) as Index,
                (k1 + j + 1) as Index,
                (k2 + j) as Index,
                (k2 + j + 1) as Index,
            ]);
        }
    }

    Ok(MeshData {
        normals: Some(positions.clone()),
        positions,
        tex_coords: Some(tex_coords),
        colors: None,
        indices: Some(indices),
    })
}

/// Builds a unit cube centred at the origin with [`CUBE_FACE_COLORS`].
pub fn build_cube() -> MeshData {
    build_cube_with_colors(&CUBE_FACE_COLORS)
}

/// Builds a unit cube (side 1) as 36 unindexed vertices, one colour per face.
///
/// Faces are emitted front, back, left, right, top, bottom.
pub fn build_cube_with_colors(face_colors: &[[f32; 4]; 6]) -> MeshData {
    #[rustfmt::skip]
    let positions: Vec<[f32; 3]> = vec![
        // Front (Z+)
        [-0.5,  0.5,  0.5], [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5],
        [-0.5,  0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5],
        // Back (Z-)
        [-0.5,  0.5, -0.5], [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5],
        [-0.5,  0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5],
        // Left (X-)
        [-0.5,  0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5],
        [-0.5,  0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5],
        // Right (X+)
        [ 0.5,  0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5],
        [ 0.5,  0.5, -0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5],
        // Top (Y+)
        [-0.5,  0.5, -0.5], [-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5],
        [-0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5],
        // Bottom (Y-)
        [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5],
        [-0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5],
    ];

    let colors = face_colors
        .iter()
        .flat_map(|color| std::iter::repeat_n(*color, 6))
        .collect();

    MeshData {
        positions,
        normals: None,
        tex_coords: None,
        colors: Some(colors),
        indices: None,
    }
}

/// Builds a textured quad spanning `[-1, 1]` on X and Y at `z = 0`.
///
/// Image rows run top to bottom, so `v = 0` sits on the upper edge.
pub fn build_quad() -> MeshData {
    MeshData {
        positions: vec![
            [-1.0, 1.0, 0.0],
            [-1.0, -1.0, 0.0],
            [1.0, -1.0, 0.0],
            [1.0, 1.0, 0.0],
        ],
        normals: None,
        tex_coords: Some(vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]),
        colors: None,
        indices: Some(vec![0, 1, 2, 0, 2, 3]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length(v: [f32; 3]) -> f32 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    #[test]
    fn sphere_counts_match_tessellation() {
        let sphere = build_sphere(48, 48).unwrap();
        assert_eq!(sphere.vertex_count(), 2401);
        assert_eq!(sphere.triangle_count(), 4608);
        assert_eq!(sphere.element_count(), 13824);

        let small = build_sphere(24, 48).unwrap();
        assert_eq!(small.vertex_count(), 25 * 49);
        assert_eq!(small.triangle_count(), 2 * 24 * 48);
    }

    #[test]
    fn sphere_indices_are_in_range() {
        for (stacks, slices) in [(1, 3), (7, 5), (24, 48), (48, 48)] {
            let sphere = build_sphere(stacks, slices).unwrap();
            let count = sphere.vertex_count();
            let indices = sphere.indices.as_ref().unwrap();
            assert!(indices.iter().all(|&i| (i as usize) < count));
            sphere.validate().unwrap();
        }
    }

    #[test]
    fn sphere_vertices_lie_on_unit_sphere() {
        let sphere = build_sphere(48, 48).unwrap();
        let normals = sphere.normals.as_ref().unwrap();
        for (position, normal) in sphere.positions.iter().zip(normals) {
            assert!((length(*position) - 1.0).abs() < 1e-5);
            assert_eq!(position, normal);
        }
    }

    #[test]
    fn sphere_poles_and_seam() {
        let sphere = build_sphere(4, 8).unwrap();
        let uv = sphere.tex_coords.as_ref().unwrap();

        // First row is the north pole, last row the south pole.
        assert!((sphere.positions[0][1] - 1.0).abs() < 1e-6);
        assert!((sphere.positions[sphere.vertex_count() - 1][1] + 1.0).abs() < 1e-6);

        // Seam columns share a position but not a u coordinate.
        let row = 2 * 9;
        let first = sphere.positions[row];
        let last = sphere.positions[row + 8];
        for axis in 0..3 {
            assert!((first[axis] - last[axis]).abs() < 1e-6);
        }
        assert_eq!(uv[row][0], 0.0);
        assert_eq!(uv[row + 8][0], 1.0);
        assert_eq!(uv[row][1], 0.5);
    }

    #[test]
    fn sphere_first_cell_winding() {
        let sphere = build_sphere(2, 4).unwrap();
        let indices = sphere.indices.unwrap();
        // k1 = 0, k2 = 5 for the first stack.
        assert_eq!(&indices[..6], &[0, 5, 1, 1, 5, 6]);
    }

    #[test]
    fn sphere_rejects_degenerate_tessellation() {
        assert_eq!(
            build_sphere(0, 8),
            Err(GeometryError::InvalidTessellation {
                stacks: 0,
                slices: 8
            })
        );
        assert!(build_sphere(8, 2).is_err());
    }

    #[test]
    fn sphere_rejects_index_overflow() {
        // 256 × 256 = 65536 fits exactly, one more stack does not.
        assert!(build_sphere(255, 255).is_ok());
        assert!(matches!(
            build_sphere(256, 255),
            Err(GeometryError::IndexOverflow { .. })
        ));
    }

    #[test]
    fn cube_is_unindexed_with_flat_face_colors() {
        let cube = build_cube();
        assert_eq!(cube.vertex_count(), 36);
        assert_eq!(cube.triangle_count(), 12);
        assert!(cube.indices.is_none());

        let colors = cube.colors.as_ref().unwrap();
        for (face, chunk) in colors.chunks(6).enumerate() {
            assert!(chunk.iter().all(|c| *c == CUBE_FACE_COLORS[face]));
        }
        assert!(
            cube.positions
                .iter()
                .all(|p| p.iter().all(|c| c.abs() == 0.5))
        );
        cube.validate().unwrap();
    }

    #[test]
    fn quad_covers_unit_square() {
        let quad = build_quad();
        assert_eq!(quad.vertex_count(), 4);
        assert_eq!(quad.triangle_count(), 2);
        quad.validate().unwrap();
    }

    #[test]
    fn solid_color_fills_every_vertex() {
        let sphere = build_sphere(3, 4).unwrap().with_solid_color([1.0, 1.0, 0.0, 1.0]);
        let colors = sphere.colors.as_ref().unwrap();
        assert_eq!(colors.len(), sphere.vertex_count());
        sphere.validate().unwrap();
    }

    #[test]
    fn validate_reports_bad_streams() {
        let mut mesh = build_quad();
        mesh.tex_coords = Some(vec![[0.0, 0.0]]);
        assert!(matches!(
            mesh.validate(),
            Err(GeometryError::AttributeMismatch {
                attribute: "tex_coords",
                ..
            })
        ));

        let mut mesh = build_quad();
        mesh.indices = Some(vec![0, 1, 4]);
        assert_eq!(
            mesh.validate(),
            Err(GeometryError::IndexOutOfRange {
                index: 4,
                vertex_count: 4
            })
        );
    }
}
