//! Mapper trait and pipeline
//!
//! Mappers turn a normalized audio parameter (0..1) into a physical synth
//! quantity such as a cutoff in Hz or a gain.

/// A single-stage transform of a normalized control value
pub trait Mapper: Send + Sync {
    /// Short label used in debug output
    fn name(&self) -> &str;

    /// Map a control value to the output domain
    fn map(&self, input: f64) -> f64;
}

/// Mappers applied in sequence
pub struct MappingPipeline {
    name: String,
    stages: Vec<Box<dyn Mapper>>,
}

impl MappingPipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Append a stage (builder pattern)
    pub fn then<M: Mapper + 'static>(mut self, stage: M) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Run all stages; NaN input is treated as 0
    pub fn apply(&self, value: f64) -> f64 {
        let start = if value.is_nan() { 0.0 } else { value };
        self.stages.iter().fold(start, |v, stage| stage.map(v))
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names joined with `->`
    pub fn describe(&self) -> String {
        let stages: Vec<&str> = self.stages.iter().map(|s| s.name()).collect();
        format!("{}: {}", self.name, stages.join(" -> "))
    }
}

impl Mapper for MappingPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn map(&self, input: f64) -> f64 {
        self.apply(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{ExponentialMapper, LinearMapper};

    #[test]
    fn test_empty_pipeline_is_identity() {
        let pipeline = MappingPipeline::new("id");
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.apply(0.42), 0.42);
        assert_eq!(pipeline.apply(f64::NAN), 0.0);
    }

    #[test]
    fn test_floor_then_exponential_band() {
        // 0..1 -> 0.15..1 -> 200..800 Hz
        let pipeline = MappingPipeline::new("texture_center")
            .then(LinearMapper::new("floor", 0.15, 1.0))
            .then(ExponentialMapper::decade("band", 200.0, 800.0));

        assert_eq!(pipeline.len(), 2);
        let low = pipeline.apply(0.0);
        let high = pipeline.apply(1.0);
        assert!(low > 200.0 && low < 250.0, "low = {}", low);
        assert!((high - 800.0).abs() < 1e-9);
        assert_eq!(pipeline.describe(), "texture_center: floor -> band");
    }

    #[test]
    fn test_pipeline_nests_as_mapper() {
        let inner = MappingPipeline::new("inner").then(LinearMapper::new("half", 0.0, 0.5));
        let outer = MappingPipeline::new("outer")
            .then(inner)
            .then(LinearMapper::new("double", 0.0, 2.0));
        assert!((outer.apply(1.0) - 1.0).abs() < 1e-12);
    }
}
