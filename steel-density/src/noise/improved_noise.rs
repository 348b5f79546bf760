//! Single-octave gradient noise, matching vanilla `ImprovedNoise`.

use crate::math::{floor, lerp3, smoothstep};
use crate::noise::GRADIENT;
use crate::random::Random;

/// Quantization epsilon is a float literal in vanilla, promoted to double.
const Y_FUDGE_EPSILON: f64 = 1.0e-7_f32 as f64;

/// One octave of gradient noise with a shuffled permutation table.
#[derive(Debug, Clone)]
pub struct ImprovedNoise {
    p: [u8; 256],
    /// X origin offset.
    pub xo: f64,
    /// Y origin offset.
    pub yo: f64,
    /// Z origin offset.
    pub zo: f64,
}

impl ImprovedNoise {
    /// Draws origin offsets and a permutation from `random`.
    pub fn new<R: Random + ?Sized>(random: &mut R) -> Self {
        let xo = random.next_f64() * 256.0;
        let yo = random.next_f64() * 256.0;
        let zo = random.next_f64() * 256.0;

        let mut p: [u8; 256] = std::array::from_fn(|i| i as u8);
        for i in 0..256 {
            let offset = random.next_i32_bounded(256 - i as i32) as usize;
            p.swap(i, i + offset);
        }

        Self { p, xo, yo, zo }
    }

    /// Samples plain 3-D noise.
    #[inline]
    #[must_use]
    pub fn noise(&self, x: f64, y: f64, z: f64) -> f64 {
        self.noise_with_y_scale(x, y, z, 0.0, 0.0)
    }

    /// Samples with the vertical quantization used by blended terrain noise.
    ///
    /// When `y_scale` is non-zero, the vertical fraction used for gradients is
    /// snapped down to a multiple of `y_scale`, limited by `y_max`.
    #[must_use]
    pub fn noise_with_y_scale(&self, x: f64, y: f64, z: f64, y_scale: f64, y_max: f64) -> f64 {
        let x = x + self.xo;
        let y = y + self.yo;
        let z = z + self.zo;
        let xi = floor(x);
        let yi = floor(y);
        let zi = floor(z);
        let xr = x - f64::from(xi);
        let yr = y - f64::from(yi);
        let zr = z - f64::from(zi);

        let y_snap = if y_scale == 0.0 {
            0.0
        } else {
            let limit = if y_max >= 0.0 && y_max < yr { y_max } else { yr };
            f64::from(floor(limit / y_scale + Y_FUDGE_EPSILON)) * y_scale
        };

        self.sample_and_lerp(xi, yi, zi, xr, yr - y_snap, zr, yr)
    }

    #[inline]
    fn p(&self, index: i32) -> i32 {
        i32::from(self.p[(index & 0xFF) as usize])
    }

    #[expect(clippy::too_many_arguments, reason = "lattice cell and fractions")]
    fn sample_and_lerp(&self, x: i32, y: i32, z: i32, xr: f64, yr: f64, zr: f64, y_fade: f64) -> f64 {
        let x0 = self.p(x);
        let x1 = self.p(x + 1);
        let x0y0 = self.p(x0 + y);
        let x0y1 = self.p(x0 + y + 1);
        let x1y0 = self.p(x1 + y);
        let x1y1 = self.p(x1 + y + 1);

        let c000 = grad_dot(self.p(x0y0 + z), xr, yr, zr);
        let c100 = grad_dot(self.p(x1y0 + z), xr - 1.0, yr, zr);
        let c010 = grad_dot(self.p(x0y1 + z), xr, yr - 1.0, zr);
        let c110 = grad_dot(self.p(x1y1 + z), xr - 1.0, yr - 1.0, zr);
        let c001 = grad_dot(self.p(x0y0 + z + 1), xr, yr, zr - 1.0);
        let c101 = grad_dot(self.p(x1y0 + z + 1), xr - 1.0, yr, zr - 1.0);
        let c011 = grad_dot(self.p(x0y1 + z + 1), xr, yr - 1.0, zr - 1.0);
        let c111 = grad_dot(self.p(x1y1 + z + 1), xr - 1.0, yr - 1.0, zr - 1.0);

        lerp3(
            smoothstep(xr),
            smoothstep(y_fade),
            smoothstep(zr),
            c000,
            c100,
            c010,
            c110,
            c001,
            c101,
            c011,
            c111,
        )
    }
}

#[inline]
fn grad_dot(hash: i32, x: f64, y: f64, z: f64) -> f64 {
    let g = GRADIENT[(hash & 15) as usize];
    f64::from(g[0]) * x + f64::from(g[1]) * y + f64::from(g[2]) * z
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::xoroshiro::Xoroshiro;

    #[test]
    fn test_improved_noise_deterministic() {
        let a = ImprovedNoise::new(&mut Xoroshiro::from_seed(12345));
        let b = ImprovedNoise::new(&mut Xoroshiro::from_seed(12345));
        assert_eq!(a.p, b.p);
        let v1 = a.noise(100.0, 64.0, 100.0);
        let v2 = b.noise(100.0, 64.0, 100.0);
        assert!((v1 - v2).abs() < 1e-15);
    }

    #[test]
    fn test_lattice_points_are_zero() {
        let noise = ImprovedNoise::new(&mut Xoroshiro::from_seed(3));
        let v = noise.noise(-noise.xo + 5.0, -noise.yo + 7.0, -noise.zo + 11.0);
        assert!(v.abs() < 1e-9, "gradient noise vanishes on lattice points, got {v}");
    }

    #[test]
    fn test_improved_noise_bounded() {
        let noise = ImprovedNoise::new(&mut Xoroshiro::from_seed(42));
        for x in -10..10 {
            for z in -10..10 {
                let v = noise.noise(f64::from(x) * 3.7, 64.3, f64::from(z) * 3.1);
                assert!((-1.1..=1.1).contains(&v), "{v} out of range at {x},{z}");
            }
        }
    }
}
