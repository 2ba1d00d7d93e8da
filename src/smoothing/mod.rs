//! Exponential smoothing of normalized channels
//!
//! Every source keeps one smoothed value per channel across update ticks:
//! `smoothed = smoothed + (sample - smoothed) * factor`. Smaller factors
//! respond slower and sound steadier.

/// One step of the exponential moving average
#[inline]
pub fn ema(previous: f64, sample: f64, factor: f64) -> f64 {
    previous + (sample - previous) * factor
}

fn sanitize_factor(factor: f64) -> f64 {
    if factor.is_nan() {
        1.0
    } else {
        factor.clamp(f64::MIN_POSITIVE, 1.0)
    }
}

/// Scalar exponential smoother seeded from a configured initial value
#[derive(Debug, Clone)]
pub struct Smoother {
    value: f64,
    factor: f64,
}

impl Smoother {
    /// Create a smoother; the factor is clamped into (0, 1]
    pub fn new(initial: f64, factor: f64) -> Self {
        Self {
            value: initial,
            factor: sanitize_factor(factor),
        }
    }

    /// Feed a sample and return the new smoothed value
    pub fn next(&mut self, sample: f64) -> f64 {
        self.value = ema(self.value, sample, self.factor);
        self.value
    }

    /// Current smoothed value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Smoothing factor in use
    pub fn factor(&self) -> f64 {
        self.factor
    }
}

/// A named group of channels that can be smoothed channel by channel
pub trait ChannelSet: Copy + Send + Sync + 'static {
    /// Number of unipolar channels
    const CHANNELS: usize;

    /// Blend every channel of `self` toward `sample`, independently
    fn blend(&self, sample: &Self, factor: f64) -> Self;

    /// A channel set with every unipolar channel at `level`
    ///
    /// Signed channels sit at zero.
    fn uniform(level: f64) -> Self;

    /// A channel set drawing each unipolar channel from `next`, in
    /// declaration order
    fn from_levels(next: impl FnMut() -> f64) -> Self;

    /// Headline level for status displays
    fn level(&self) -> f64;
}

/// Smoother for a whole channel set
#[derive(Debug, Clone)]
pub struct ChannelSmoother<C: ChannelSet> {
    state: C,
    factor: f64,
}

impl<C: ChannelSet> ChannelSmoother<C> {
    /// Seed every channel from `initial`
    pub fn new(initial: f64, factor: f64) -> Self {
        Self::with_state(C::uniform(initial), factor)
    }

    /// Seed from an explicit channel set
    pub fn with_state(state: C, factor: f64) -> Self {
        Self {
            state,
            factor: sanitize_factor(factor),
        }
    }

    /// Feed a normalized sample and return the new smoothed state
    pub fn next(&mut self, sample: &C) -> C {
        self.state = self.state.blend(sample, self.factor);
        self.state
    }

    /// Current smoothed state (a copy)
    pub fn state(&self) -> C {
        self.state
    }

    /// Smoothing factor in use
    pub fn factor(&self) -> f64 {
        self.factor
    }
}
