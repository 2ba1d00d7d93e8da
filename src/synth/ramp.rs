//! Exponential parameter glide toward a target

/// Approaches its target with a fixed time constant
///
/// After `tau` seconds about 63% of the distance has been covered.
#[derive(Debug, Clone, Copy)]
pub struct Ramp {
    value: f64,
    target: f64,
    coeff: f64,
}

impl Ramp {
    pub fn new(initial: f64, tau_secs: f64, sample_rate: f64) -> Self {
        let coeff = if tau_secs <= 0.0 {
            0.0
        } else {
            (-1.0 / (tau_secs * sample_rate)).exp()
        };
        Self {
            value: initial,
            target: initial,
            coeff,
        }
    }

    pub fn set_target(&mut self, target: f64) {
        if target.is_finite() {
            self.target = target;
        }
    }

    /// Jump straight to `value`
    pub fn set_immediate(&mut self, value: f64) {
        if value.is_finite() {
            self.value = value;
            self.target = value;
        }
    }

    /// Advance one sample
    pub fn next(&mut self) -> f64 {
        self.value = self.target + (self.value - self.target) * self.coeff;
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_time_constant() {
        let sr = 1000.0;
        let mut ramp = Ramp::new(0.0, 2.0, sr);
        ramp.set_target(1.0);
        for _ in 0..2000 {
            ramp.next();
        }
        assert!((ramp.value() - (1.0 - (-1.0f64).exp())).abs() < 1e-3);
    }

    #[test]
    fn test_zero_tau_jumps() {
        let mut ramp = Ramp::new(0.2, 0.0, 44100.0);
        ramp.set_target(0.9);
        assert_eq!(ramp.next(), 0.9);
    }

    #[test]
    fn test_non_finite_target_ignored() {
        let mut ramp = Ramp::new(0.5, 1.0, 100.0);
        ramp.set_target(f64::NAN);
        assert_eq!(ramp.target(), 0.5);
        ramp.set_immediate(0.1);
        assert_eq!(ramp.next(), 0.1);
    }
}
