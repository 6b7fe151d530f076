#![allow(dead_code)]

use serving::{
    Backend, Datatype, Engine, EngineError, EngineOutput, FeatureMatrix, InferenceRequest,
    InputTensor, ProbabilityRow, TensorData,
};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

type Respond = dyn Fn(&FeatureMatrix) -> Vec<ProbabilityRow> + Send + Sync;

/// Engine answering every row with a fixed probability mapping.
pub struct StubEngine {
    inputs: Vec<String>,
    outputs: Vec<String>,
    respond: Box<Respond>,
    calls: AtomicUsize,
}

impl StubEngine {
    pub fn new(row: &[(&str, f32)]) -> Self {
        let row: ProbabilityRow = row.iter().map(|&(l, p)| (l, p)).collect();
        Self::with_response(move |features| vec![row.clone(); features.rows()])
    }

    pub fn with_response(
        respond: impl Fn(&FeatureMatrix) -> Vec<ProbabilityRow> + Send + Sync + 'static,
    ) -> Self {
        Self {
            inputs: vec!["float_input".to_string()],
            outputs: vec![
                "output_label".to_string(),
                "output_probability".to_string(),
            ],
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_outputs(mut self, outputs: &[&str]) -> Self {
        self.outputs = outputs.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Engine for StubEngine {
    fn input_names(&self) -> &[String] {
        &self.inputs
    }

    fn output_names(&self) -> &[String] {
        &self.outputs
    }

    fn run(
        &self,
        output_names: &[String],
        inputs: &[(&str, &FeatureMatrix)],
    ) -> Result<Vec<EngineOutput>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (_, features) = inputs[0];
        let mut outputs = vec![
            EngineOutput::Opaque,
            EngineOutput::ProbabilityMaps((self.respond)(features)),
        ];
        outputs.truncate(output_names.len());
        Ok(outputs)
    }
}

pub struct StubBackend {
    pub engine: Arc<StubEngine>,
}

impl StubBackend {
    pub fn new(engine: StubEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

impl Backend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    fn load_model(&self, _path: &Path) -> Result<Arc<dyn Engine>, EngineError> {
        Ok(self.engine.clone())
    }
}

/// Fresh directory under the system temp dir holding `files`.
pub fn model_dir(tag: &str, files: &[&str]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("serving-test-{}-{}", std::process::id(), tag));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create model dir");
    for file in files {
        fs::write(dir.join(file), b"onnx").expect("write model file");
    }
    dir
}

pub fn fp32_request(id: Option<&str>, values: &[f64]) -> InferenceRequest {
    InferenceRequest {
        id: id.map(str::to_string),
        inputs: vec![InputTensor {
            name: "float_input".to_string(),
            shape: vec![values.len() / 4, 4],
            datatype: Datatype::Fp32,
            data: TensorData::Scalars(values.to_vec()),
        }],
    }
}
