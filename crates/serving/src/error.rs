use {base::TensorError, std::fmt};

/// Request-scoped failure of one predict call.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictError {
    /// The model has not finished loading.
    NotReady,
    ShapeMismatch(String),
    /// The engine produced an empty probability mapping for `row`.
    EmptyRow { row: usize },
    InvalidInput(String),
    Engine(String),
    /// Output `index` was absent or not a list of probability mappings.
    MissingOutput { index: usize, count: usize },
}

impl fmt::Display for PredictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictError::NotReady => write!(f, "model is not ready"),
            PredictError::ShapeMismatch(msg) => write!(f, "shape mismatch: {msg}"),
            PredictError::EmptyRow { row } => {
                write!(f, "engine returned an empty probability mapping for row {row}")
            }
            PredictError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            PredictError::Engine(msg) => write!(f, "engine error: {msg}"),
            PredictError::MissingOutput { index, count } => write!(
                f,
                "engine output {index} is not a probability mapping list ({count} outputs returned)"
            ),
        }
    }
}

impl std::error::Error for PredictError {}

impl From<TensorError> for PredictError {
    fn from(err: TensorError) -> Self {
        PredictError::ShapeMismatch(err.to_string())
    }
}

impl From<EngineError> for PredictError {
    fn from(err: EngineError) -> Self {
        PredictError::Engine(err.to_string())
    }
}

/// Failure while bringing a model to the ready state.
#[derive(Debug)]
pub enum LoadError {
    /// No usable `.onnx` file in the model directory.
    ModelFile(String),
    /// The model lacks a single input or the probability mapping output.
    UnsupportedModelShape { inputs: usize, outputs: usize },
    Engine(EngineError),
    Io(std::io::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::ModelFile(msg) => write!(f, "model file error: {msg}"),
            LoadError::UnsupportedModelShape { inputs, outputs } => write!(
                f,
                "unsupported model shape: expected at least 1 input and 2 outputs, found {inputs} inputs and {outputs} outputs"
            ),
            LoadError::Engine(err) => write!(f, "engine error: {err}"),
            LoadError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<EngineError> for LoadError {
    fn from(err: EngineError) -> Self {
        LoadError::Engine(err)
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Io(err)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    ModelLoad(String),
    InvalidInput {
        name: String,
        expected_names: Vec<String>,
    },
    Backend(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::ModelLoad(msg) => write!(f, "model load failed: {msg}"),
            EngineError::InvalidInput {
                name,
                expected_names,
            } => write!(f, "unknown input '{name}', expected one of {expected_names:?}"),
            EngineError::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
