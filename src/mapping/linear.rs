//! Linear mapper

use super::curves::lerp;
use super::Mapper;

/// Linear map of a 0..1 control value onto `[out_min, out_max]`
pub struct LinearMapper {
    name: String,
    out_min: f64,
    out_max: f64,
}

impl LinearMapper {
    pub fn new(name: impl Into<String>, out_min: f64, out_max: f64) -> Self {
        Self {
            name: name.into(),
            out_min,
            out_max,
        }
    }
}

impl Mapper for LinearMapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn map(&self, input: f64) -> f64 {
        lerp(self.out_min, self.out_max, input.clamp(0.0, 1.0))
    }
}
