use glam::Vec3;

use crate::grid::Grid;
use crate::heightfield::HeightField;

pub const DEFAULT_VERTEX_COLOR: Vec3 = Vec3::new(0.2, 0.6, 0.2);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Vec3,
}

impl Vertex {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            normal: Vec3::Y,
            color: DEFAULT_VERTEX_COLOR,
        }
    }
}

/// Triangle list. `indices.len() % 3 == 0` and every index is `< vertices.len()`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Appends `other`, offsetting its indices past the current vertices.
    pub fn append(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| offset + i));
    }

    pub fn translated(&self, offset: Vec3) -> Mesh {
        let vertices = self
            .vertices
            .iter()
            .map(|v| Vertex {
                position: v.position + offset,
                ..*v
            })
            .collect();
        Mesh {
            vertices,
            indices: self.indices.clone(),
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.indices.len() % 3 == 0
            && self
                .indices
                .iter()
                .all(|&i| (i as usize) < self.vertices.len())
    }

    /// Unweighted average of the unit face normals around each vertex.
    ///
    /// Zero-area faces contribute nothing. A vertex left with a zero
    /// accumulator (no triangles, or only degenerate ones) gets `+Y`.
    pub fn recompute_normals(&mut self) {
        for v in &mut self.vertices {
            v.normal = Vec3::ZERO;
        }

        for tri in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let p0 = self.vertices[i0].position;
            let p1 = self.vertices[i1].position;
            let p2 = self.vertices[i2].position;

            let face = (p1 - p0).cross(p2 - p0).normalize_or_zero();
            self.vertices[i0].normal += face;
            self.vertices[i1].normal += face;
            self.vertices[i2].normal += face;
        }

        for v in &mut self.vertices {
            v.normal = v.normal.try_normalize().unwrap_or(Vec3::Y);
        }
    }
}

/// Two triangles per grid cell, `(v0, v2, v1)` and `(v1, v2, v3)`, so the
/// top face is front-facing when seen from `+Y`.
pub fn build_surface_mesh(grid: &Grid, heights: &HeightField) -> Mesh {
    let nx = grid.nx;
    let nz = grid.nz;

    let vertices: Vec<Vertex> = grid
        .points
        .iter()
        .zip(&heights.heights)
        .map(|(p, &h)| Vertex::new(Vec3::new(p.x, h, p.y)))
        .collect();

    let cells = nx.saturating_sub(1) * nz.saturating_sub(1);
    let mut indices: Vec<u32> = Vec::with_capacity(cells * 6);
    for j in 0..nz.saturating_sub(1) {
        for i in 0..nx.saturating_sub(1) {
            let v0 = (j * nx + i) as u32;
            let v1 = v0 + 1;
            let v2 = v0 + nx as u32;
            let v3 = v2 + 1;
            indices.extend_from_slice(&[v0, v2, v1, v1, v2, v3]);
        }
    }

    let mut mesh = Mesh { vertices, indices };
    mesh.recompute_normals();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::make_grid;
    use crate::heightfield::make_heightfield;

    fn flat(nx: usize, nz: usize, height: f32) -> (Grid, HeightField) {
        let grid = make_grid(0, 0, nx, nz, 4.0);
        let hf = HeightField {
            nx,
            nz,
            heights: vec![height; nx * nz],
        };
        (grid, hf)
    }

    #[test]
    fn two_by_two_is_one_quad() {
        let (grid, hf) = flat(2, 2, 1.5);
        let mesh = build_surface_mesh(&grid, &hf);

        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 2, 1, 1, 2, 3]);
        assert_eq!(mesh.triangle_count(), 2);
        for v in &mesh.vertices {
            assert!((v.normal.length() - 1.0).abs() < 1e-5);
            assert!(v.normal.y > 0.99, "normal {:?} should face up", v.normal);
            assert_eq!(v.position.y, 1.5);
        }
    }

    #[test]
    fn thin_grids_have_no_triangles() {
        for (nx, nz) in [(1, 1), (1, 5), (5, 1), (0, 0)] {
            let (grid, hf) = flat(nx, nz, 0.0);
            let mesh = build_surface_mesh(&grid, &hf);
            assert!(mesh.indices.is_empty());
            assert_eq!(mesh.vertices.len(), nx * nz);
            for v in &mesh.vertices {
                assert_eq!(v.normal, Vec3::Y);
            }
        }
    }

    #[test]
    fn indices_are_valid_for_noisy_terrain() {
        let grid = make_grid(1, 1, 7, 5, 20.0);
        let noise: Vec<f32> = (0..35).map(|k| ((k * 37 % 11) as f32 / 5.5) - 1.0).collect();
        let hf = make_heightfield(7, 5, &noise, 6.0);
        let mesh = build_surface_mesh(&grid, &hf);

        assert!(mesh.is_well_formed());
        assert_eq!(mesh.indices.len(), 6 * 4 * 6);
        for v in &mesh.vertices {
            assert!((v.normal.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn slope_tilts_normals_downhill() {
        let grid = make_grid(0, 0, 3, 3, 2.0);
        let hf = HeightField {
            nx: 3,
            nz: 3,
            heights: (0..9).map(|k| (k % 3) as f32).collect(),
        };
        let mesh = build_surface_mesh(&grid, &hf);
        for v in &mesh.vertices {
            assert!(v.normal.x < 0.0, "rising along +x should tilt normal to -x");
            assert!(v.normal.y > 0.0);
            assert!(v.normal.z.abs() < 1e-5);
        }
    }

    #[test]
    fn normals_are_unweighted_face_averages() {
        // One cell, corner v3 raised: v1 and v2 each touch both faces.
        let grid = make_grid(0, 0, 2, 2, 1.0);
        let hf = HeightField {
            nx: 2,
            nz: 2,
            heights: vec![0.0, 0.0, 0.0, 1.0],
        };
        let mesh = build_surface_mesh(&grid, &hf);

        let face_a = Vec3::Y;
        let p1 = mesh.vertices[1].position;
        let p2 = mesh.vertices[2].position;
        let p3 = mesh.vertices[3].position;
        let face_b = (p2 - p1).cross(p3 - p1).normalize();
        let expected = (face_a + face_b).normalize();

        assert!((mesh.vertices[1].normal - expected).length() < 1e-5);
        assert!((mesh.vertices[0].normal - face_a).length() < 1e-5);
    }

    #[test]
    fn append_offsets_indices() {
        let (grid, hf) = flat(2, 2, 0.0);
        let quad = build_surface_mesh(&grid, &hf);
        let mut merged = Mesh::default();
        merged.append(&quad);
        merged.append(&quad);
        assert_eq!(merged.vertices.len(), 8);
        assert_eq!(&merged.indices[6..], &[4, 6, 5, 5, 6, 7]);
        assert!(merged.is_well_formed());
    }

    #[test]
    fn translated_moves_positions_only() {
        let (grid, hf) = flat(2, 2, 1.0);
        let mesh = build_surface_mesh(&grid, &hf);
        let moved = mesh.translated(Vec3::new(-4.0, 0.0, 2.0));
        assert_eq!(moved.vertices[0].position, Vec3::new(-4.0, 1.0, 2.0));
        assert_eq!(moved.vertices[0].normal, mesh.vertices[0].normal);
        assert_eq!(moved.indices, mesh.indices);
    }
}
