use {
    crate::PredictError,
    base::{Tensor, TensorError},
    std::{fmt, str::FromStr},
};

/// V2 protocol tensor datatypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datatype {
    Bool,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Fp16,
    Fp32,
    Fp64,
    Bytes,
}

impl Datatype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Datatype::Bool => "BOOL",
            Datatype::Uint8 => "UINT8",
            Datatype::Uint16 => "UINT16",
            Datatype::Uint32 => "UINT32",
            Datatype::Uint64 => "UINT64",
            Datatype::Int8 => "INT8",
            Datatype::Int16 => "INT16",
            Datatype::Int32 => "INT32",
            Datatype::Int64 => "INT64",
            Datatype::Fp16 => "FP16",
            Datatype::Fp32 => "FP32",
            Datatype::Fp64 => "FP64",
            Datatype::Bytes => "BYTES",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Datatype::Bytes)
    }
}

impl FromStr for Datatype {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "BOOL" => Datatype::Bool,
            "UINT8" => Datatype::Uint8,
            "UINT16" => Datatype::Uint16,
            "UINT32" => Datatype::Uint32,
            "UINT64" => Datatype::Uint64,
            "INT8" => Datatype::Int8,
            "INT16" => Datatype::Int16,
            "INT32" => Datatype::Int32,
            "INT64" => Datatype::Int64,
            "FP16" => Datatype::Fp16,
            "FP32" => Datatype::Fp32,
            "FP64" => Datatype::Fp64,
            "BYTES" => Datatype::Bytes,
            other => {
                return Err(PredictError::InvalidInput(format!(
                    "unknown datatype '{other}'"
                )));
            }
        })
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of an input tensor as it arrived on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    /// Flat row-major scalars. For `BYTES` tensors these are byte values.
    Scalars(Vec<f64>),
    /// Raw buffer holding packed 32-bit floats.
    Raw(Vec<u8>),
}

impl TensorData {
    pub fn len(&self) -> usize {
        match self {
            TensorData::Scalars(values) => values.len(),
            TensorData::Raw(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    pub name: String,
    pub shape: Vec<usize>,
    pub datatype: Datatype,
    pub data: TensorData,
}

/// Dense `rows x cols` f32 matrix fed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    tensor: Tensor<f32>,
}

impl FeatureMatrix {
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self, TensorError> {
        Ok(Self {
            tensor: Tensor::new(vec![rows, cols], data)?,
        })
    }

    pub fn rows(&self) -> usize {
        self.tensor.shape[0]
    }

    pub fn cols(&self) -> usize {
        self.tensor.shape[1]
    }

    pub fn shape(&self) -> &[usize] {
        &self.tensor.shape
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        self.tensor.outer(index)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.tensor.data
    }
}

/// One batch row of class label to probability, in the engine's order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProbabilityRow {
    entries: Vec<(String, f32)>,
}

impl ProbabilityRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, probability: f32) {
        self.entries.push((label.into(), probability));
    }

    pub fn get(&self, label: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().map(|(l, p)| (l.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f32)> for ProbabilityRow {
    fn from_iter<I: IntoIterator<Item = (S, f32)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(l, p)| (l.into(), p)).collect(),
        }
    }
}

/// Transport-neutral output tensor of byte strings.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTensor {
    pub name: String,
    pub shape: Vec<usize>,
    pub datatype: Datatype,
    pub data: Vec<Vec<u8>>,
}
