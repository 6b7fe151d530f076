use {
    crate::{Backend, Datatype, Engine, LoadError, codec},
    std::{
        fmt,
        fs,
        path::{Path, PathBuf},
        sync::{Arc, OnceLock},
    },
};

/// Position of the ZipMap probability output among the engine outputs.
pub const ZIPMAP_OUTPUT_INDEX: usize = 1;

/// Everything a predict call needs from a successful load.
pub struct LoadedModel {
    pub engine: Arc<dyn Engine>,
    pub input_name: String,
    pub output_names: Vec<String>,
    pub path: PathBuf,
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("input_name", &self.input_name)
            .field("output_names", &self.output_names)
            .field("path", &self.path)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TensorSpec {
    pub name: String,
    pub datatype: Datatype,
    /// `-1` marks a variable dimension.
    pub shape: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelMetadata {
    pub name: String,
    pub platform: String,
    pub inputs: Vec<TensorSpec>,
    pub outputs: Vec<TensorSpec>,
}

/// Named model slot that becomes ready at most once.
///
/// `load` is the only writer. Predict calls read the loaded model without
/// locking and never see a half-initialized state.
#[derive(Debug)]
pub struct ModelState {
    name: String,
    loaded: OnceLock<LoadedModel>,
}

impl ModelState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            loaded: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_ready(&self) -> bool {
        self.loaded.get().is_some()
    }

    pub fn loaded(&self) -> Option<&LoadedModel> {
        self.loaded.get()
    }

    /// Load the model found in `model_dir` with `backend`.
    ///
    /// On failure the state stays not ready and the error is logged; there
    /// is no retry. Loading an already ready model does nothing.
    pub fn load(&self, model_dir: &Path, backend: &dyn Backend) -> Result<(), LoadError> {
        if self.is_ready() {
            log::warn!("[{}] model already loaded, ignoring load request", self.name);
            return Ok(());
        }
        log::info!(
            "[{}] attempting to load ONNX model from directory: {}",
            self.name,
            model_dir.display()
        );
        match self.try_load(model_dir, backend) {
            Ok(model) => {
                let path = model.path.clone();
                if self.loaded.set(model).is_err() {
                    log::warn!("[{}] model was loaded concurrently, keeping the first", self.name);
                    return Ok(());
                }
                log::info!(
                    "[{}] model {} loaded successfully and is now ready",
                    self.name,
                    path.display()
                );
                Ok(())
            }
            Err(e) => {
                log::error!("[{}] failed to load model: {}", self.name, e);
                Err(e)
            }
        }
    }

    fn try_load(&self, model_dir: &Path, backend: &dyn Backend) -> Result<LoadedModel, LoadError> {
        let path = find_model_file(model_dir)?;
        log::info!("[{}] found model file: {}", self.name, path.display());

        let engine = backend.load_model(&path)?;
        let inputs = engine.input_names().len();
        let outputs = engine.output_names().len();
        if inputs == 0 || outputs <= ZIPMAP_OUTPUT_INDEX {
            return Err(LoadError::UnsupportedModelShape { inputs, outputs });
        }
        log::info!(
            "[{}] {} backend: input {:?}, outputs {:?}",
            self.name,
            backend.name(),
            engine.input_names()[0],
            engine.output_names()
        );

        Ok(LoadedModel {
            input_name: engine.input_names()[0].clone(),
            output_names: engine.output_names().to_vec(),
            engine,
            path,
        })
    }

    /// Protocol metadata for this model.
    pub fn metadata(&self) -> ModelMetadata {
        let input_name = self
            .loaded()
            .map(|model| model.input_name.clone())
            .unwrap_or_default();
        ModelMetadata {
            name: self.name.clone(),
            platform: "onnx".to_string(),
            inputs: vec![TensorSpec {
                name: input_name,
                datatype: Datatype::Fp32,
                shape: vec![-1, codec::FEATURE_COUNT as i64],
            }],
            outputs: vec![TensorSpec {
                name: codec::PREDICTION_OUTPUT.to_string(),
                datatype: Datatype::Bytes,
                shape: vec![-1],
            }],
        }
    }
}

/// The `.onnx` file to load from `dir`.
///
/// With several candidates the lexicographically smallest file name wins.
pub fn find_model_file(dir: &Path) -> Result<PathBuf, LoadError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        LoadError::ModelFile(format!("cannot read model directory {}: {}", dir.display(), e))
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "onnx") {
            candidates.push(path);
        }
    }
    candidates.sort();

    let mut candidates = candidates.into_iter();
    let chosen = candidates.next().ok_or_else(|| {
        LoadError::ModelFile(format!("no .onnx file found in directory {}", dir.display()))
    })?;
    let ignored: Vec<PathBuf> = candidates.collect();
    if !ignored.is_empty() {
        log::warn!(
            "several .onnx files in {}, using {} and ignoring {:?}",
            dir.display(),
            chosen.display(),
            ignored
        );
    }
    Ok(chosen)
}
