use glam::Vec2;

/// World-space sample positions for one chunk, row-major with `x` varying fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    pub nx: usize,
    pub nz: usize,
    /// `(x, z)` in world units; `points.len() == nx * nz`.
    pub points: Vec<Vec2>,
}

impl Grid {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, i: usize, j: usize) -> Vec2 {
        self.points[j * self.nx + i]
    }
}

/// Builds the sample grid for chunk `(cx, cz)`.
///
/// The span is `[cx * chunk_size, (cx + 1) * chunk_size]` inclusive on both
/// axes, so neighbouring chunks share their seam row/column. The last sample
/// on each axis is computed from the neighbour's origin so the shared
/// coordinates are bit-for-bit identical.
pub fn make_grid(cx: i32, cz: i32, nx: usize, nz: usize, chunk_size: f32) -> Grid {
    let mut points = Vec::with_capacity(nx * nz);

    for z in 0..nz {
        let wz = axis_coord(cz, z, nz, chunk_size);
        for x in 0..nx {
            let wx = axis_coord(cx, x, nx, chunk_size);
            points.push(Vec2::new(wx, wz));
        }
    }

    Grid { nx, nz, points }
}

fn axis_coord(chunk: i32, step: usize, count: usize, chunk_size: f32) -> f32 {
    if count > 1 && step == count - 1 {
        return (chunk as f32 + 1.0) * chunk_size;
    }
    let t = if count > 1 {
        step as f32 / (count - 1) as f32
    } else {
        0.0
    };
    chunk as f32 * chunk_size + t * chunk_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_one_point_per_sample() {
        for (nx, nz) in [(1, 1), (1, 7), (5, 3), (16, 16)] {
            let grid = make_grid(-2, 3, nx, nz, 10.0);
            assert_eq!(grid.len(), nx * nz);
            assert_eq!(grid.nx, nx);
            assert_eq!(grid.nz, nz);
        }
    }

    #[test]
    fn grid_is_row_major_with_x_fastest() {
        let grid = make_grid(0, 0, 3, 2, 4.0);
        assert_eq!(grid.points[0], Vec2::new(0.0, 0.0));
        assert_eq!(grid.points[1], Vec2::new(2.0, 0.0));
        assert_eq!(grid.points[2], Vec2::new(4.0, 0.0));
        assert_eq!(grid.points[3], Vec2::new(0.0, 4.0));
        assert_eq!(grid.point(2, 1), Vec2::new(4.0, 4.0));
    }

    #[test]
    fn single_sample_axis_sits_on_origin() {
        let grid = make_grid(2, -1, 1, 1, 8.0);
        assert_eq!(grid.points, vec![Vec2::new(16.0, -8.0)]);
    }

    #[test]
    fn adjacent_chunks_share_seams_exactly() {
        for chunk_size in [1.0f32, 0.3, 7.77, 100.0, 13.1] {
            for cx in [-5, -1, 0, 1, 42] {
                let left = make_grid(cx, 2, 9, 5, chunk_size);
                let right = make_grid(cx + 1, 2, 9, 5, chunk_size);
                for j in 0..5 {
                    let a = left.point(8, j);
                    let b = right.point(0, j);
                    assert_eq!(a.x.to_bits(), b.x.to_bits(), "x seam at size {chunk_size}");
                    assert_eq!(a.y.to_bits(), b.y.to_bits(), "z seam at size {chunk_size}");
                }

                let below = make_grid(2, cx, 4, 6, chunk_size);
                let above = make_grid(2, cx + 1, 4, 6, chunk_size);
                for i in 0..4 {
                    assert_eq!(below.point(i, 5).y.to_bits(), above.point(i, 0).y.to_bits());
                }
            }
        }
    }

    #[test]
    fn negative_chunk_size_inverts_without_panicking() {
        let grid = make_grid(1, 1, 2, 2, -5.0);
        assert_eq!(grid.points[0], Vec2::new(-5.0, -5.0));
        assert_eq!(grid.points[3], Vec2::new(-10.0, -10.0));
    }
}
