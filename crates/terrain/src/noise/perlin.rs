use super::permutation::PermutationTable;

/// Quintic fade `6t^5 - 15t^4 + 10t^3`.
#[inline]
pub fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

#[inline]
fn grad(hash: usize, dx: f32, dz: f32) -> f32 {
    match hash & 0x3 {
        0 => dx + dz,
        1 => -dx + dz,
        2 => dx - dz,
        _ => -dx - dz,
    }
}

/// 2D gradient noise, approximately in `[-1, 1]`.
pub fn perlin_sample(x: f32, z: f32, perm: &PermutationTable) -> f32 {
    let x_floor = x.floor();
    let z_floor = z.floor();
    let xi = (x_floor as i32 & 255) as usize;
    let zi = (z_floor as i32 & 255) as usize;
    let xf = x - x_floor;
    let zf = z - z_floor;

    let u = fade(xf);
    let v = fade(zf);

    let aa = perm.get(perm.get(xi) + zi);
    let ab = perm.get(perm.get(xi) + zi + 1);
    let ba = perm.get(perm.get(xi + 1) + zi);
    let bb = perm.get(perm.get(xi + 1) + zi + 1);

    let x1 = lerp(grad(aa, xf, zf), grad(ba, xf - 1.0, zf), u);
    let x2 = lerp(grad(ab, xf, zf - 1.0), grad(bb, xf - 1.0, zf - 1.0), u);
    lerp(x1, x2, v)
}
