//! 2-D simplex noise matching vanilla `SimplexNoise`, used by end islands.

use crate::math::floor;
use crate::noise::GRADIENT;
use crate::random::Random;

const SQRT_3: f64 = 1.732_050_807_568_877_2;
const F2: f64 = 0.5 * (SQRT_3 - 1.0);
const G2: f64 = (3.0 - SQRT_3) / 6.0;

/// Simplex noise with a 512-entry mirrored permutation table.
#[derive(Debug, Clone)]
pub struct SimplexNoise {
    p: [i32; 512],
    /// X origin offset.
    pub xo: f64,
    /// Y origin offset.
    pub yo: f64,
    /// Z origin offset.
    pub zo: f64,
}

impl SimplexNoise {
    /// Draws offsets and a permutation from `random`.
    pub fn new<R: Random + ?Sized>(random: &mut R) -> Self {
        let xo = random.next_f64() * 256.0;
        let yo = random.next_f64() * 256.0;
        let zo = random.next_f64() * 256.0;

        let mut p = [0i32; 512];
        for (i, slot) in p.iter_mut().take(256).enumerate() {
            *slot = i as i32;
        }
        for i in 0..256 {
            let offset = random.next_i32_bounded(256 - i as i32) as usize;
            p.swap(i, i + offset);
        }
        let (low, high) = p.split_at_mut(256);
        high.copy_from_slice(low);

        Self { p, xo, yo, zo }
    }

    #[inline]
    fn p(&self, index: i32) -> i32 {
        self.p[(index & 0xFF) as usize]
    }

    fn corner(gradient: i32, x: f64, y: f64) -> f64 {
        let falloff = 0.5 - x * x - y * y;
        if falloff < 0.0 {
            return 0.0;
        }
        let g = GRADIENT[gradient as usize];
        let falloff = falloff * falloff;
        falloff * falloff * (f64::from(g[0]) * x + f64::from(g[1]) * y)
    }

    /// Samples 2-D noise, roughly in `[-1, 1]`.
    #[must_use]
    pub fn get_value_2d(&self, x: f64, y: f64) -> f64 {
        let skew = (x + y) * F2;
        let i = floor(x + skew);
        let j = floor(y + skew);
        let unskew = f64::from(i + j) * G2;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);

        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };
        let x1 = x0 - f64::from(i1) + G2;
        let y1 = y0 - f64::from(j1) + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let ii = i & 0xFF;
        let jj = j & 0xFF;
        let g0 = self.p(ii + self.p(jj)) % 12;
        let g1 = self.p(ii + i1 + self.p(jj + j1)) % 12;
        let g2 = self.p(ii + 1 + self.p(jj + 1)) % 12;

        70.0 * (Self::corner(g0, x0, y0) + Self::corner(g1, x1, y1) + Self::corner(g2, x2, y2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::legacy_random::LegacyRandom;

    #[test]
    fn test_simplex_deterministic() {
        let a = SimplexNoise::new(&mut LegacyRandom::from_seed(42));
        let b = SimplexNoise::new(&mut LegacyRandom::from_seed(42));
        for i in 0..10 {
            let (x, z) = (f64::from(i) * 13.7, f64::from(i) * 7.3);
            assert!((a.get_value_2d(x, z) - b.get_value_2d(x, z)).abs() < 1e-15);
        }
    }

    #[test]
    fn test_simplex_varies() {
        let noise = SimplexNoise::new(&mut LegacyRandom::from_seed(0));
        let values: Vec<f64> = (0..20)
            .map(|i| noise.get_value_2d(f64::from(i) * 50.0, f64::from(i) * 30.0))
            .collect();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(max - min > 0.01);
    }
}
