pub mod adapter;
pub mod codec;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod model;
pub mod onnx;
pub mod select;
pub mod tensor;
pub mod wire;

pub use adapter::{InferenceRequest, InferenceResponse, predict, predict_for};
pub use engine::{Backend, Engine, EngineOutput};
pub use envelope::{OutputEnvelope, Transport};
pub use error::{EngineError, LoadError, PredictError};
pub use model::{LoadedModel, ModelMetadata, ModelState, TensorSpec};
pub use onnx::OnnxBackend;
pub use tensor::{Datatype, FeatureMatrix, InputTensor, OutputTensor, ProbabilityRow, TensorData};
