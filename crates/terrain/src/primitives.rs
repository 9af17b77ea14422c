use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec3;
use serde::Deserialize;

use crate::mesh::{Mesh, Vertex};

const STONE: Vec3 = Vec3::new(0.6, 0.6, 0.6);

/// Built-in prototype meshes, all centred on the origin and one unit across.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub enum Primitive {
    #[default]
    Cube,
    Plane,
    Sphere { detail: u32 },
}

impl Primitive {
    pub fn build(self) -> Mesh {
        match self {
            Primitive::Cube => cube(),
            Primitive::Plane => plane(),
            Primitive::Sphere { detail } => sphere(detail, detail),
        }
    }
}

pub fn cube() -> Mesh {
    // (normal, u, v) with u x v == normal so each quad winds outward.
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];

    let mut mesh = Mesh::default();
    for (normal, u, v) in faces {
        let base = mesh.vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            mesh.vertices.push(Vertex {
                position: (normal + u * su + v * sv) * 0.5,
                normal,
                color: STONE,
            });
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

pub fn plane() -> Mesh {
    let corners = [
        Vec3::new(-0.5, 0.0, -0.5),
        Vec3::new(0.5, 0.0, -0.5),
        Vec3::new(0.5, 0.0, 0.5),
        Vec3::new(-0.5, 0.0, 0.5),
    ];
    Mesh {
        vertices: corners
            .into_iter()
            .map(|position| Vertex {
                position,
                normal: Vec3::Y,
                color: STONE,
            })
            .collect(),
        indices: vec![0, 2, 1, 0, 3, 2],
    }
}

/// UV sphere of radius 0.5 with poles on the Y axis, coloured by normal.
pub fn sphere(sectors: u32, stacks: u32) -> Mesh {
    let sectors = sectors.max(3);
    let stacks = stacks.max(2);
    let radius = 0.5;
    let sector_step = TAU / sectors as f32;
    let stack_step = PI / stacks as f32;

    let mut mesh = Mesh::default();
    for i in 0..=stacks {
        let stack_angle = FRAC_PI_2 - i as f32 * stack_step;
        let ring = radius * stack_angle.cos();
        let y = radius * stack_angle.sin();

        for j in 0..=sectors {
            let sector_angle = j as f32 * sector_step;
            let position = Vec3::new(ring * sector_angle.cos(), y, -ring * sector_angle.sin());
            let normal = position.try_normalize().unwrap_or(Vec3::Y);
            mesh.vertices.push(Vertex {
                position,
                normal,
                color: (normal + Vec3::ONE) * 0.5,
            });
        }
    }

    for i in 0..stacks {
        let k1 = i * (sectors + 1);
        let k2 = k1 + sectors + 1;
        for j in 0..sectors {
            if i != 0 {
                mesh.indices.extend_from_slice(&[k1 + j, k2 + j, k1 + j + 1]);
            }
            if i != stacks - 1 {
                mesh.indices
                    .extend_from_slice(&[k1 + j + 1, k2 + j, k2 + j + 1]);
            }
        }
    }
    mesh
}
