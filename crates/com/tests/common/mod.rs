#![allow(dead_code)]

use serving::{
    Backend, Engine, EngineError, EngineOutput, FeatureMatrix, ModelState, ProbabilityRow,
};
use std::{fs, path::Path, path::PathBuf, sync::Arc};

/// Engine labelling rows by their first feature: below 1.0 is `class_A`,
/// anything else `class_B`.
pub struct ThresholdEngine {
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl ThresholdEngine {
    pub fn new() -> Self {
        Self {
            inputs: vec!["float_input".to_string()],
            outputs: vec![
                "output_label".to_string(),
                "output_probability".to_string(),
            ],
        }
    }
}

impl Engine for ThresholdEngine {
    fn input_names(&self) -> &[String] {
        &self.inputs
    }

    fn output_names(&self) -> &[String] {
        &self.outputs
    }

    fn run(
        &self,
        _output_names: &[String],
        inputs: &[(&str, &FeatureMatrix)],
    ) -> Result<Vec<EngineOutput>, EngineError> {
        let (_, features) = inputs[0];
        let rows = (0..features.rows())
            .map(|i| {
                let first = features.row(i).map_or(0.0, |row| row[0]);
                let a = if first < 1.0 { 0.8 } else { 0.2 };
                [("class_A", a), ("class_B", 1.0 - a)]
                    .into_iter()
                    .collect::<ProbabilityRow>()
            })
            .collect();
        Ok(vec![EngineOutput::Opaque, EngineOutput::ProbabilityMaps(rows)])
    }
}

pub struct ThresholdBackend;

impl Backend for ThresholdBackend {
    fn name(&self) -> &str {
        "threshold"
    }

    fn load_model(&self, _path: &Path) -> Result<Arc<dyn Engine>, EngineError> {
        Ok(Arc::new(ThresholdEngine::new()))
    }
}

pub fn model_dir(tag: &str, files: &[&str]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("com-test-{}-{}", std::process::id(), tag));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create model dir");
    for file in files {
        fs::write(dir.join(file), b"onnx").expect("write model file");
    }
    dir
}

pub fn ready_state(tag: &str) -> Arc<ModelState> {
    let state = ModelState::new("zipmap-model");
    state
        .load(&model_dir(tag, &["model.onnx"]), &ThresholdBackend)
        .expect("load failed");
    Arc::new(state)
}
