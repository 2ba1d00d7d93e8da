//! Shaping curves for normalized signals

/// Linear interpolation between `min` and `max`
#[inline]
pub fn lerp(min: f64, max: f64, t: f64) -> f64 {
    min + (max - min) * t
}

/// Quadratic ease-in-out on [0, 1]
pub fn ease_in_out_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

/// Hermite smoothstep on [0, 1]
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Position of `x` within `[in_min, in_max]`, clamped to [0, 1]
pub fn remap01(x: f64, in_min: f64, in_max: f64) -> f64 {
    if (in_max - in_min).abs() < f64::EPSILON {
        return 0.0;
    }
    ((x - in_min) / (in_max - in_min)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_endpoints_and_midpoint() {
        assert_eq!(ease_in_out_quad(0.0), 0.0);
        assert_eq!(ease_in_out_quad(0.5), 0.5);
        assert_eq!(ease_in_out_quad(1.0), 1.0);
        // Slow start
        assert!(ease_in_out_quad(0.2) < 0.2);
        // Fast finish
        assert!(ease_in_out_quad(0.8) > 0.8);
    }

    #[test]
    fn test_smoothstep() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(2.0), 1.0);
    }

    #[test]
    fn test_remap01() {
        assert_eq!(remap01(0.0, -1.0, 1.0), 0.5);
        assert_eq!(remap01(-3.0, -1.0, 1.0), 0.0);
        assert_eq!(remap01(5.0, 2.0, 2.0), 0.0);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.3, 3.0, 0.0), 0.3);
        assert_eq!(lerp(0.3, 3.0, 1.0), 3.0);
    }
}
