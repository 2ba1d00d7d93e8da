//! Biquad filter (RBJ cookbook, transposed direct form II)

use std::f64::consts::PI;

/// Response shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterType {
    LowPass,
    /// Constant 0 dB peak gain
    BandPass,
}

#[derive(Debug, Clone, Copy)]
struct Coefficients {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

/// Biquad with a movable center/cutoff frequency
#[derive(Debug, Clone)]
pub struct Biquad {
    kind: FilterType,
    sample_rate: f64,
    frequency: f64,
    q: f64,
    coeffs: Coefficients,
    z1: f64,
    z2: f64,
}

impl Biquad {
    pub fn lowpass(sample_rate: f64, cutoff: f64) -> Self {
        Self::new(FilterType::LowPass, sample_rate, cutoff, 0.707)
    }

    pub fn bandpass(sample_rate: f64, center: f64, q: f64) -> Self {
        Self::new(FilterType::BandPass, sample_rate, center, q)
    }

    fn new(kind: FilterType, sample_rate: f64, frequency: f64, q: f64) -> Self {
        let mut filter = Self {
            kind,
            sample_rate,
            frequency: 0.0,
            q: q.clamp(0.1, 20.0),
            coeffs: Coefficients {
                b0: 1.0,
                b1: 0.0,
                b2: 0.0,
                a1: 0.0,
                a2: 0.0,
            },
            z1: 0.0,
            z2: 0.0,
        };
        filter.set_frequency(frequency);
        filter
    }

    /// Move the cutoff/center; coefficients are only recomputed on change
    pub fn set_frequency(&mut self, hz: f64) {
        let hz = hz.clamp(20.0, self.sample_rate * 0.45);
        if (hz - self.frequency).abs() > 1e-6 {
            self.frequency = hz;
            self.update();
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn kind(&self) -> FilterType {
        self.kind
    }

    fn update(&mut self) {
        let omega = 2.0 * PI * self.frequency / self.sample_rate;
        let (sin_w, cos_w) = omega.sin_cos();
        let alpha = sin_w / (2.0 * self.q);
        let a0 = 1.0 + alpha;

        let (b0, b1, b2) = match self.kind {
            FilterType::LowPass => ((1.0 - cos_w) / 2.0, 1.0 - cos_w, (1.0 - cos_w) / 2.0),
            FilterType::BandPass => (alpha, 0.0, -alpha),
        };

        self.coeffs = Coefficients {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: -2.0 * cos_w / a0,
            a2: (1.0 - alpha) / a0,
        };
    }

    pub fn process(&mut self, input: f64) -> f64 {
        let c = self.coeffs;
        let out = c.b0 * input + self.z1;
        self.z1 = c.b1 * input - c.a1 * out + self.z2;
        self.z2 = c.b2 * input - c.a2 * out;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak_after_settle(filter: &mut Biquad, freq: f64) -> f64 {
        let sr = 44100.0;
        (0..8820)
            .map(|i| filter.process((2.0 * PI * freq * i as f64 / sr).sin()))
            .skip(4410)
            .fold(0.0f64, |m, s| m.max(s.abs()))
    }

    #[test]
    fn test_frequency_clamped() {
        let mut f = Biquad::lowpass(44100.0, 5.0);
        assert_eq!(f.frequency(), 20.0);
        f.set_frequency(40000.0);
        assert!(f.frequency() < 22050.0);
    }

    #[test]
    fn test_lowpass_attenuates_highs() {
        let mut f = Biquad::lowpass(44100.0, 150.0);
        assert!(peak_after_settle(&mut f, 5000.0) < 0.01);
    }

    #[test]
    fn test_lowpass_passes_lows() {
        let mut f = Biquad::lowpass(44100.0, 2000.0);
        assert!(peak_after_settle(&mut f, 60.0) > 0.9);
    }

    #[test]
    fn test_bandpass_peaks_at_center() {
        let mut center = Biquad::bandpass(44100.0, 400.0, 0.8);
        let mut off = Biquad::bandpass(44100.0, 400.0, 0.8);
        let at_center = peak_after_settle(&mut center, 400.0);
        let far = peak_after_settle(&mut off, 6000.0);
        assert!((at_center - 1.0).abs() < 0.05, "center gain {}", at_center);
        assert!(far < at_center * 0.3);
        assert_eq!(center.kind(), FilterType::BandPass);
    }
}
