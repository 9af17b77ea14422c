/// Classic `rand()`-style linear congruential generator, 15-bit output.
#[derive(Clone, Debug)]
pub struct LegacyRand {
    state: u32,
}

impl LegacyRand {
    pub const RAND_MAX: u32 = 0x7FFF;

    pub fn new(state: u32) -> Self {
        Self { state }
    }

    /// State `seed * 1295 + seed * 73737`, wrapping on 32 bits.
    pub fn from_terrain_seed(seed: i32) -> Self {
        Self::new(scale_seed(seed))
    }

    pub fn next_u15(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(214_013).wrapping_add(2_531_011);
        (self.state >> 16) & Self::RAND_MAX
    }

    /// Uniform value in `[0, 1]` (both ends inclusive).
    pub fn next_unit(&mut self) -> f32 {
        self.next_u15() as f32 / Self::RAND_MAX as f32
    }
}

fn scale_seed(seed: i32) -> u32 {
    seed.wrapping_mul(1295).wrapping_add(seed.wrapping_mul(73_737)) as u32
}

/// Shuffled lattice hash table: 256 seeded entries duplicated once so
/// `perm[perm[x] + z + 1]` never needs to wrap.
#[derive(Clone, PartialEq, Eq)]
pub struct PermutationTable {
    values: [u8; 512],
}

impl PermutationTable {
    pub fn get(&self, index: usize) -> usize {
        self.values[index] as usize
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.values
    }
}

impl std::fmt::Debug for PermutationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutationTable")
            .field("head", &&self.values[..8])
            .finish()
    }
}

pub fn build_permutation(seed: i32) -> PermutationTable {
    let mut p = [0u8; 256];
    for (i, v) in p.iter_mut().enumerate() {
        *v = i as u8;
    }

    let mut rng = LegacyRand::from_terrain_seed(seed);
    for i in (1..256usize).rev() {
        let j = rng.next_u15() as usize % (i + 1);
        p.swap(i, j);
    }

    let mut values = [0u8; 512];
    values[..256].copy_from_slice(&p);
    values[256..].copy_from_slice(&p);
    PermutationTable { values }
}
