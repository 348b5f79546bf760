//! Numeric helpers with vanilla `Mth` rounding behavior.

/// Floors to `i32` the way `Mth.floor` does.
#[inline]
#[must_use]
pub fn floor(value: f64) -> i32 {
    let truncated = value as i32;
    if value < f64::from(truncated) {
        truncated - 1
    } else {
        truncated
    }
}

/// Floors to `i64` the way `Mth.lfloor` does.
#[inline]
#[must_use]
pub fn lfloor(value: f64) -> i64 {
    let truncated = value as i64;
    if value < truncated as f64 {
        truncated - 1
    } else {
        truncated
    }
}

/// `a + delta * (b - a)`.
#[inline]
#[must_use]
pub fn lerp(delta: f64, a: f64, b: f64) -> f64 {
    a + delta * (b - a)
}

/// Bilinear interpolation over a unit square.
#[inline]
#[must_use]
pub fn lerp2(dx: f64, dy: f64, x0y0: f64, x1y0: f64, x0y1: f64, x1y1: f64) -> f64 {
    lerp(dy, lerp(dx, x0y0, x1y0), lerp(dx, x0y1, x1y1))
}

/// Trilinear interpolation over a unit cube. Corner names are `xyz` bits.
#[inline]
#[must_use]
#[expect(clippy::too_many_arguments, reason = "eight cube corners")]
pub fn lerp3(
    dx: f64,
    dy: f64,
    dz: f64,
    c000: f64,
    c100: f64,
    c010: f64,
    c110: f64,
    c001: f64,
    c101: f64,
    c011: f64,
    c111: f64,
) -> f64 {
    lerp(
        dz,
        lerp2(dx, dy, c000, c100, c010, c110),
        lerp2(dx, dy, c001, c101, c011, c111),
    )
}

/// Interpolates with `delta` clamped to `[0, 1]`.
#[inline]
#[must_use]
pub fn clamped_lerp(start: f64, end: f64, delta: f64) -> f64 {
    if delta < 0.0 {
        start
    } else if delta > 1.0 {
        end
    } else {
        lerp(delta, start, end)
    }
}

/// Position of `value` between `start` and `end`, unclamped.
#[inline]
#[must_use]
pub fn inverse_lerp(value: f64, start: f64, end: f64) -> f64 {
    (value - start) / (end - start)
}

/// Maps `value` from `[from_start, from_end]` onto `[to_start, to_end]`, clamped.
#[inline]
#[must_use]
pub fn clamped_map(value: f64, from_start: f64, from_end: f64, to_start: f64, to_end: f64) -> f64 {
    clamped_lerp(to_start, to_end, inverse_lerp(value, from_start, from_end))
}

/// Quintic fade curve used by gradient noise.
#[inline]
#[must_use]
pub fn smoothstep(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Floor division for block to cell conversions.
#[inline]
#[must_use]
pub const fn floor_div(value: i32, divisor: i32) -> i32 {
    value.div_euclid(divisor)
}

/// Floor modulo matching `Math.floorMod` for positive divisors.
#[inline]
#[must_use]
pub const fn floor_mod(value: i32, divisor: i32) -> i32 {
    value.rem_euclid(divisor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_negative() {
        assert_eq!(floor(-0.5), -1);
        assert_eq!(floor(-1.0), -1);
        assert_eq!(floor(2.9), 2);
        assert_eq!(lfloor(-3.000_001), -4);
    }

    #[test]
    fn test_floor_div() {
        assert_eq!(floor_div(-1, 8), -1);
        assert_eq!(floor_div(-64, 8), -8);
        assert_eq!(floor_div(15, 4), 3);
        assert_eq!(floor_mod(-1, 16), 15);
    }

    #[test]
    fn test_clamped_map() {
        assert!((clamped_map(-10.0, 0.0, 10.0, 1.0, 2.0) - 1.0).abs() < 1e-12);
        assert!((clamped_map(5.0, 0.0, 10.0, 1.0, 2.0) - 1.5).abs() < 1e-12);
        assert!((clamped_map(50.0, 0.0, 10.0, 1.0, 2.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_lerp3_corners() {
        let corners = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let at = |dx, dy, dz| {
            lerp3(
                dx, dy, dz, corners[0], corners[1], corners[2], corners[3], corners[4],
                corners[5], corners[6], corners[7],
            )
        };
        assert!((at(0.0, 0.0, 0.0) - 1.0).abs() < 1e-12);
        assert!((at(1.0, 1.0, 1.0) - 8.0).abs() < 1e-12);
        assert!((at(0.5, 0.5, 0.5) - 4.5).abs() < 1e-12);
    }
}
