//! Exponential mapper
//!
//! Spends most of the control travel at the low end of the output range,
//! which suits frequency controls:
//!
//!   output = out_min + (out_max - out_min) * (exp(k*t) - 1) / (exp(k) - 1)
//!
//! With `k = ln(10)` this is the "decade" curve `(10^t - 1) / 9`.

use super::curves::lerp;
use super::Mapper;

/// Exponential map of a 0..1 control value onto `[out_min, out_max]`
pub struct ExponentialMapper {
    name: String,
    out_min: f64,
    out_max: f64,
    curve_factor: f64,
}

impl ExponentialMapper {
    /// Curve factor taken from the output ratio, never below 1
    pub fn new(name: impl Into<String>, out_min: f64, out_max: f64) -> Self {
        let lo = out_min.abs().max(0.001);
        let hi = out_max.abs().max(0.001);
        Self {
            name: name.into(),
            out_min,
            out_max,
            curve_factor: (hi / lo).ln().abs().max(1.0),
        }
    }

    /// Decade curve, `k = ln(10)`
    pub fn decade(name: impl Into<String>, out_min: f64, out_max: f64) -> Self {
        Self::new(name, out_min, out_max).with_curve_factor(std::f64::consts::LN_10)
    }

    /// Steeper curves for larger factors
    pub fn with_curve_factor(mut self, factor: f64) -> Self {
        self.curve_factor = factor.max(0.001);
        self
    }

    pub fn curve_factor(&self) -> f64 {
        self.curve_factor
    }
}

impl Mapper for ExponentialMapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn map(&self, input: f64) -> f64 {
        let t = input.clamp(0.0, 1.0);
        let k = self.curve_factor;
        let denom = k.exp() - 1.0;
        let shaped = if denom.abs() < f64::EPSILON {
            t
        } else {
            ((k * t).exp() - 1.0) / denom
        };
        lerp(self.out_min, self.out_max, shaped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decade_endpoints() {
        let mapper = ExponentialMapper::decade("drone_cutoff", 40.0, 150.0);
        assert!((mapper.map(0.0) - 40.0).abs() < 1e-9);
        assert!((mapper.map(1.0) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_decade_matches_power_of_ten() {
        let mapper = ExponentialMapper::decade("band", 200.0, 800.0);
        let t: f64 = 0.5;
        let expected = 200.0 + 600.0 * (10f64.powf(t) - 1.0) / 9.0;
        assert!((mapper.map(t) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_midpoint_below_linear() {
        let mapper = ExponentialMapper::new("pulse", 300.0, 2000.0);
        assert!(mapper.map(0.5) < 1150.0);
    }

    #[test]
    fn test_clamps_input() {
        let mapper = ExponentialMapper::new("x", 10.0, 1000.0);
        assert_eq!(mapper.map(-3.0), 10.0);
        assert!((mapper.map(3.0) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_curve_factor_floor() {
        let mapper = ExponentialMapper::new("flat", 1.0, 1.5);
        assert_eq!(mapper.curve_factor(), 1.0);
    }
}
