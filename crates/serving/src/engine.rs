use {
    crate::{EngineError, FeatureMatrix, ProbabilityRow},
    base::Tensor,
    std::{path::Path, sync::Arc},
};

/// One output value produced by an engine run.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutput {
    Float(Tensor<f32>),
    Int64(Tensor<i64>),
    /// Per-row label to probability mappings (ZipMap).
    ProbabilityMaps(Vec<ProbabilityRow>),
    /// A value this server has no use for, e.g. a string label tensor.
    Opaque,
}

/// A loaded model that can be run concurrently from many requests.
pub trait Engine: Send + Sync {
    fn input_names(&self) -> &[String];
    fn output_names(&self) -> &[String];

    /// Run the model and return `output_names` in the order requested.
    fn run(
        &self,
        output_names: &[String],
        inputs: &[(&str, &FeatureMatrix)],
    ) -> Result<Vec<EngineOutput>, EngineError>;
}

/// Creates engines from model files.
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;
    fn load_model(&self, path: &Path) -> Result<Arc<dyn Engine>, EngineError>;
}
