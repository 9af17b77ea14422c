use glam::{Mat3, Mat4, Quat, Vec3};
use rand::Rng;
use serde::Deserialize;

use crate::mesh::{Mesh, Vertex};
use crate::primitives::Primitive;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScatterConfig {
    /// Probability that a terrain vertex receives an instance, in `[0, 1]`.
    pub density: f32,
    pub scale_variance: f32,
    /// Maximum yaw in radians either side of zero.
    pub rotation_variance: f32,
    pub prototype: Primitive,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            density: 0.0,
            scale_variance: 0.3,
            rotation_variance: std::f32::consts::PI,
            prototype: Primitive::Cube,
        }
    }
}

/// Instances `base` on terrain vertices, visiting them in order.
///
/// A vertex is kept when a uniform `[0, 1)` draw is below `density`, so
/// `0.0` places nothing and `1.0` places an instance on every vertex. Each
/// instance is `translate(p) * rotate_y(angle) * scale(s)`; normals go
/// through the inverse-transpose of the linear part.
pub fn scatter<R: Rng>(
    base: &Mesh,
    terrain: &Mesh,
    density: f32,
    scale_variance: f32,
    rotation_variance: f32,
    rng: &mut R,
) -> Mesh {
    let expected = (terrain.vertices.len() as f32 * density.clamp(0.0, 1.0)) as usize;
    let mut out = Mesh {
        vertices: Vec::with_capacity(expected * base.vertices.len()),
        indices: Vec::with_capacity(expected * base.indices.len()),
    };

    for tv in &terrain.vertices {
        let r: f32 = rng.random();
        if !(r < density) {
            continue;
        }

        let angle = (rng.random::<f32>() * 2.0 - 1.0) * rotation_variance;
        let scale = 1.0 + (rng.random::<f32>() * 2.0 - 1.0) * scale_variance;

        let rotation = Quat::from_rotation_y(angle);
        let model = Mat4::from_scale_rotation_translation(Vec3::splat(scale), rotation, tv.position);
        let normal_matrix = normal_matrix(&model, rotation);

        let offset = out.vertices.len() as u32;
        out.vertices.extend(base.vertices.iter().map(|bv| Vertex {
            position: model.transform_point3(bv.position),
            normal: (normal_matrix * bv.normal).normalize_or_zero(),
            color: bv.color,
        }));
        out.indices.extend(base.indices.iter().map(|i| offset + i));
    }

    out
}

fn normal_matrix(model: &Mat4, rotation: Quat) -> Mat3 {
    let linear = Mat3::from_mat4(*model);
    if linear.determinant().abs() <= f32::EPSILON {
        // Zero scale collapses the instance; keep its normals pointing somewhere sane.
        return Mat3::from_quat(rotation);
    }
    linear.inverse().transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::make_grid;
    use crate::heightfield::make_heightfield;
    use crate::mesh::build_surface_mesh;
    use crate::primitives::cube;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn terrain(n: usize) -> Mesh {
        let grid = make_grid(0, 0, n, n, 10.0);
        let hf = make_heightfield(n, n, &vec![0.0; n * n], 2.0);
        build_surface_mesh(&grid, &hf)
    }

    #[test]
    fn zero_density_places_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let out = scatter(&cube(), &terrain(8), 0.0, 0.3, 1.0, &mut rng);
        assert!(out.vertices.is_empty());
        assert!(out.indices.is_empty());
    }

    #[test]
    fn full_density_places_one_instance_per_vertex() {
        let base = cube();
        let ground = terrain(5);
        let mut rng = StdRng::seed_from_u64(2);
        let out = scatter(&base, &ground, 1.0, 0.3, 1.0, &mut rng);
        assert_eq!(out.vertices.len(), ground.vertices.len() * base.vertices.len());
        assert_eq!(out.indices.len(), ground.vertices.len() * base.indices.len());
        assert!(out.is_well_formed());
    }

    #[test]
    fn partial_density_is_roughly_proportional() {
        let base = cube();
        let ground = terrain(40);
        let mut rng = StdRng::seed_from_u64(3);
        let out = scatter(&base, &ground, 0.25, 0.0, 0.0, &mut rng);
        let instances = out.vertices.len() / base.vertices.len();
        let expected = ground.vertices.len() as f32 * 0.25;
        assert!((instances as f32 - expected).abs() < expected * 0.2, "{instances} instances");
    }

    #[test]
    fn identity_variance_translates_only() {
        let base = cube();
        let ground = terrain(2);
        let mut rng = StdRng::seed_from_u64(4);
        let out = scatter(&base, &ground, 1.0, 0.0, 0.0, &mut rng);
        let first = ground.vertices[0].position;
        for (k, bv) in base.vertices.iter().enumerate() {
            let v = out.vertices[k];
            assert!((v.position - (bv.position + first)).length() < 1e-5);
            assert!((v.normal - bv.normal).length() < 1e-5);
        }
    }

    #[test]
    fn scale_and_rotation_stay_within_variance() {
        let base = Mesh {
            vertices: vec![Vertex::new(Vec3::X)],
            indices: Vec::new(),
        };
        let ground = terrain(6);
        let mut rng = StdRng::seed_from_u64(5);
        let out = scatter(&base, &ground, 1.0, 0.25, 0.5, &mut rng);
        for (tv, v) in ground.vertices.iter().zip(&out.vertices) {
            let local = v.position - tv.position;
            assert!(local.y.abs() < 1e-5);
            let scale = local.length();
            assert!((0.75 - 1e-5..=1.25 + 1e-5).contains(&scale));
            let angle = (-local.z).atan2(local.x);
            assert!(angle.abs() <= 0.5 + 1e-4);
        }
    }

    #[test]
    fn normals_stay_unit_under_scale() {
        let base = cube();
        let ground = terrain(3);
        let mut rng = StdRng::seed_from_u64(6);
        let out = scatter(&base, &ground, 1.0, 0.9, 3.0, &mut rng);
        for v in &out.vertices {
            assert!((v.normal.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn zero_scale_does_not_produce_nan() {
        let base = cube();
        let ground = terrain(2);
        let mut rng = StdRng::seed_from_u64(7);
        // scale_variance = 1 can collapse an instance to a point.
        let model = Mat4::from_scale_rotation_translation(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE);
        assert!(normal_matrix(&model, Quat::IDENTITY).is_finite());
        let out = scatter(&base, &ground, 1.0, 1.0, 0.0, &mut rng);
        assert!(out.vertices.iter().all(|v| v.normal.is_finite()));
    }

    #[test]
    fn same_seed_same_scatter() {
        let base = cube();
        let ground = terrain(6);
        let a = scatter(&base, &ground, 0.5, 0.2, 1.0, &mut StdRng::seed_from_u64(9));
        let b = scatter(&base, &ground, 0.5, 0.2, 1.0, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
