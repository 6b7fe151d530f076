use {
    crate::{Backend, Engine, EngineError, EngineOutput, FeatureMatrix, ProbabilityRow},
    base::Tensor,
    ndarray::ArrayD,
    ort::{
        environment::Environment,
        inputs,
        session::Session as OrtSession,
        value::{DynMapValueType, DynValue, TensorRef},
    },
    std::{
        path::Path,
        sync::{Arc, Mutex, OnceLock},
    },
};

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

/// The process-wide ONNX Runtime environment, created on first use.
fn environment() -> Result<&'static Environment, EngineError> {
    if let Some(environment) = ENVIRONMENT.get() {
        return Ok(environment);
    }
    let environment = ort::init()
        .with_name("serving")
        .build()
        .map_err(|e| EngineError::Backend(format!("failed to create ONNX Runtime environment: {}", e)))?;
    Ok(ENVIRONMENT.get_or_init(|| environment))
}

/// ONNX Runtime backend on the CPU execution provider.
pub struct OnnxBackend {
    environment: &'static Environment,
}

impl OnnxBackend {
    pub fn cpu() -> Result<Self, EngineError> {
        Ok(Self {
            environment: environment()?,
        })
    }
}

impl Backend for OnnxBackend {
    fn name(&self) -> &str {
        "onnx"
    }

    fn load_model(&self, path: &Path) -> Result<Arc<dyn Engine>, EngineError> {
        let session = OrtSession::builder(self.environment)
            .map_err(|e| EngineError::Backend(format!("failed to create session builder: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| {
                EngineError::ModelLoad(format!("failed to load {}: {}", path.display(), e))
            })?;

        let input_names: Vec<String> = session
            .inputs()
            .iter()
            .map(|input| input.name().to_string())
            .collect();
        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|output| output.name().to_string())
            .collect();

        Ok(Arc::new(OnnxEngine {
            session: Mutex::new(session),
            input_names,
            output_names,
        }))
    }
}

/// A committed ONNX Runtime session.
///
/// `Session::run` needs exclusive access, so concurrent requests take turns
/// on the mutex.
pub struct OnnxEngine {
    session: Mutex<OrtSession>,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl Engine for OnnxEngine {
    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }

    fn run(
        &self,
        output_names: &[String],
        inputs: &[(&str, &FeatureMatrix)],
    ) -> Result<Vec<EngineOutput>, EngineError> {
        let [(name, features)] = inputs else {
            return Err(EngineError::Backend(format!(
                "expected exactly one input, got {}",
                inputs.len()
            )));
        };
        if !self.input_names.iter().any(|n| n == name) {
            return Err(EngineError::InvalidInput {
                name: name.to_string(),
                expected_names: self.input_names.clone(),
            });
        }
        if let Some(unknown) = output_names.iter().find(|n| !self.output_names.contains(n)) {
            return Err(EngineError::Backend(format!("unknown output '{}'", unknown)));
        }

        let array = ArrayD::from_shape_vec(features.shape().to_vec(), features.as_slice().to_vec())
            .map_err(|e| EngineError::Backend(format!("failed to create ndarray: {}", e)))?;
        let tensor_ref = TensorRef::from_array_view(array.view())
            .map_err(|e| EngineError::Backend(format!("failed to create tensor ref: {}", e)))?;

        let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        let outputs = session
            .run(inputs![*name => tensor_ref])
            .map_err(|e| EngineError::Backend(format!("inference failed: {}", e)))?;

        output_names
            .iter()
            .map(|output_name| extract_output(output_name, &outputs[output_name.as_str()]))
            .collect()
    }
}

/// Convert one session output.
///
/// Sequences are read as ZipMap probability rows with their label order
/// preserved; f32 and i64 tensors are copied; anything else is opaque.
fn extract_output(name: &str, value: &DynValue) -> Result<EngineOutput, EngineError> {
    if let Ok(maps) = value.try_extract_sequence::<DynMapValueType>() {
        let rows = maps
            .iter()
            .map(|map| {
                map.try_extract_key_values::<String, f32>()
                    .map(|pairs| pairs.into_iter().collect::<ProbabilityRow>())
                    .map_err(|e| {
                        EngineError::Backend(format!(
                            "output '{}' is not a label to probability map: {}",
                            name, e
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(EngineOutput::ProbabilityMaps(rows));
    }
    if let Ok(array) = value.try_extract_array::<f32>() {
        let tensor = Tensor::new(array.shape().to_vec(), array.iter().copied().collect())
            .map_err(|e| EngineError::Backend(format!("output '{}': {}", name, e)))?;
        return Ok(EngineOutput::Float(tensor));
    }
    if let Ok(array) = value.try_extract_array::<i64>() {
        let tensor = Tensor::new(array.shape().to_vec(), array.iter().copied().collect())
            .map_err(|e| EngineError::Backend(format!("output '{}': {}", name, e)))?;
        return Ok(EngineOutput::Int64(tensor));
    }
    Ok(EngineOutput::Opaque)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        ort::value::{Map, Sequence, Tensor as OrtTensor},
    };

    fn zipmap(rows: &[&[(&str, f32)]]) -> DynValue {
        environment().expect("environment");
        let maps = rows
            .iter()
            .map(|row| {
                Map::<String, f32>::new(row.iter().map(|&(label, p)| (label.to_string(), p)))
                    .expect("create map")
            })
            .collect::<Vec<_>>();
        Sequence::new(maps).expect("create sequence").into_dyn()
    }

    #[test]
    fn test_zipmap_sequence_becomes_probability_rows() {
        let value = zipmap(&[
            &[("class_A", 0.7), ("class_B", 0.2), ("class_C", 0.1)],
            &[("class_A", 0.1), ("class_B", 0.3), ("class_C", 0.6)],
        ]);

        let EngineOutput::ProbabilityMaps(rows) =
            extract_output("output_probability", &value).expect("extract")
        else {
            panic!("expected probability maps");
        };

        assert_eq!(rows.len(), 2);
        let labels: Vec<&str> = rows[0].iter().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["class_A", "class_B", "class_C"]);
        assert_eq!(rows[0].get("class_A"), Some(0.7));
        assert_eq!(rows[1].get("class_C"), Some(0.6));
        assert_eq!(crate::select::select(&rows).unwrap(), vec!["class_A", "class_C"]);
    }

    #[test]
    fn test_integer_keyed_map_is_rejected() {
        environment().expect("environment");
        let map = Map::<i64, f32>::new([(0, 0.4), (1, 0.6)]).expect("create map");
        let value = Sequence::new([map]).expect("create sequence").into_dyn();

        assert!(matches!(
            extract_output("output_probability", &value),
            Err(EngineError::Backend(_))
        ));
    }

    #[test]
    fn test_float_and_int_tensors_are_copied() {
        environment().expect("environment");
        let floats = OrtTensor::from_array(([2usize, 2], vec![1.0f32, 2.0, 3.0, 4.0]))
            .expect("create tensor")
            .into_dyn();
        let ints = OrtTensor::from_array(([3usize], vec![0i64, 2, 1]))
            .expect("create tensor")
            .into_dyn();

        match extract_output("probabilities", &floats).expect("extract") {
            EngineOutput::Float(tensor) => {
                assert_eq!(tensor.shape, vec![2, 2]);
                assert_eq!(tensor.data, vec![1.0, 2.0, 3.0, 4.0]);
            }
            other => panic!("expected f32 tensor, got {other:?}"),
        }
        match extract_output("output_label", &ints).expect("extract") {
            EngineOutput::Int64(tensor) => assert_eq!(tensor.data, vec![0, 2, 1]),
            other => panic!("expected i64 tensor, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_model_file_fails_to_load() {
        let backend = OnnxBackend::cpu().expect("backend");
        let missing = std::env::temp_dir().join("serving-onnx-missing/model.onnx");
        assert!(matches!(
            backend.load_model(&missing),
            Err(EngineError::ModelLoad(_))
        ));
    }
}
