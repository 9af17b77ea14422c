/// Elevations parallel to a [`Grid`](crate::grid::Grid).
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    pub nx: usize,
    pub nz: usize,
    pub heights: Vec<f32>,
}

impl HeightField {
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.heights[j * self.nx + i]
    }

    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.heights.iter().fold(None, |acc, &h| match acc {
            None => Some((h, h)),
            Some((lo, hi)) => Some((lo.min(h), hi.max(h))),
        })
    }
}

/// Maps noise from roughly `[-1, 1]` to `[0, amplitude]`.
///
/// Not clamped. Fractal noise can overshoot `[-1, 1]`, so heights may land
/// a little outside `[0, amplitude]`.
pub fn make_heightfield(nx: usize, nz: usize, noise: &[f32], amplitude: f32) -> HeightField {
    let heights = noise
        .iter()
        .map(|&n| (n + 1.0) * 0.5 * amplitude)
        .collect();
    HeightField { nx, nz, heights }
}

/// Snaps every height to the nearest multiple of `step`; `step <= 0` leaves
/// the field untouched.
pub fn terrace(field: &mut HeightField, step: f32) {
    if !(step > 0.0) {
        return;
    }
    for h in &mut field.heights {
        *h = (*h / step).round() * step;
    }
}
