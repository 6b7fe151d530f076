//! Conversion between wire tensors and engine buffers.

use crate::{
    Datatype, FeatureMatrix, InputTensor, OutputTensor, PredictError, TensorData,
};

/// Feature width of the tree-ensemble classifiers this server hosts.
pub const FEATURE_COUNT: usize = 4;

/// Name of the single output tensor in every response.
pub const PREDICTION_OUTPUT: &str = "prediction";

/// Decode `input` into a `rows x cols` feature matrix.
///
/// Numeric scalars are reshaped to `(-1, feature_count)`; the declared
/// shape is not consulted. Byte buffers (a `BYTES` tensor of byte values, or
/// a raw buffer) keep the declared shape, with trailing dimensions folded
/// into columns. Raw buffers are unpacked by their declared datatype; `BYTES`
/// buffers hold packed native-endian f32.
pub fn decode(input: &InputTensor, feature_count: usize) -> Result<FeatureMatrix, PredictError> {
    match &input.data {
        TensorData::Scalars(values) if input.datatype.is_numeric() => {
            decode_scalars(values, feature_count)
        }
        TensorData::Scalars(values) => {
            reshape_declared(unpack_raw(&byte_values(values)?, Datatype::Bytes)?, &input.shape)
        }
        TensorData::Raw(bytes) => reshape_declared(unpack_raw(bytes, input.datatype)?, &input.shape),
    }
}

fn decode_scalars(values: &[f64], feature_count: usize) -> Result<FeatureMatrix, PredictError> {
    if feature_count == 0 {
        return Err(PredictError::ShapeMismatch(
            "feature count must be positive".to_string(),
        ));
    }
    if values.is_empty() {
        return Err(PredictError::ShapeMismatch("input holds no values".to_string()));
    }
    if values.len() % feature_count != 0 {
        return Err(PredictError::ShapeMismatch(format!(
            "{} values cannot be reshaped into rows of {}",
            values.len(),
            feature_count
        )));
    }
    let data = values.iter().map(|&v| v as f32).collect();
    Ok(FeatureMatrix::new(values.len() / feature_count, feature_count, data)?)
}

fn byte_values(values: &[f64]) -> Result<Vec<u8>, PredictError> {
    values
        .iter()
        .map(|&v| {
            if v.fract() == 0.0 && (0.0..=255.0).contains(&v) {
                Ok(v as u8)
            } else {
                Err(PredictError::InvalidInput(format!(
                    "BYTES element {v} is not a byte value"
                )))
            }
        })
        .collect()
}

/// Native-endian elements of `datatype`, widened or narrowed to f32.
fn unpack_raw(bytes: &[u8], datatype: Datatype) -> Result<Vec<f32>, PredictError> {
    match datatype {
        Datatype::Bytes | Datatype::Fp32 => unpack(bytes, datatype, f32::from_ne_bytes),
        Datatype::Fp64 => unpack(bytes, datatype, |b: [u8; 8]| f64::from_ne_bytes(b) as f32),
        Datatype::Bool => unpack(bytes, datatype, |[b]: [u8; 1]| if b != 0 { 1.0 } else { 0.0 }),
        Datatype::Uint8 => unpack(bytes, datatype, |[b]: [u8; 1]| f32::from(b)),
        Datatype::Int8 => unpack(bytes, datatype, |b: [u8; 1]| f32::from(i8::from_ne_bytes(b))),
        Datatype::Uint16 => unpack(bytes, datatype, |b: [u8; 2]| f32::from(u16::from_ne_bytes(b))),
        Datatype::Int16 => unpack(bytes, datatype, |b: [u8; 2]| f32::from(i16::from_ne_bytes(b))),
        Datatype::Uint32 => unpack(bytes, datatype, |b: [u8; 4]| u32::from_ne_bytes(b) as f32),
        Datatype::Int32 => unpack(bytes, datatype, |b: [u8; 4]| i32::from_ne_bytes(b) as f32),
        Datatype::Uint64 => unpack(bytes, datatype, |b: [u8; 8]| u64::from_ne_bytes(b) as f32),
        Datatype::Int64 => unpack(bytes, datatype, |b: [u8; 8]| i64::from_ne_bytes(b) as f32),
        Datatype::Fp16 => Err(PredictError::InvalidInput(
            "raw FP16 tensors are not supported".to_string(),
        )),
    }
}

fn unpack<const N: usize>(
    bytes: &[u8],
    datatype: Datatype,
    convert: impl Fn([u8; N]) -> f32,
) -> Result<Vec<f32>, PredictError> {
    if bytes.len() % N != 0 {
        return Err(PredictError::ShapeMismatch(format!(
            "{} bytes is not a whole number of {}-byte {} values",
            bytes.len(),
            N,
            datatype
        )));
    }
    Ok(bytes
        .chunks_exact(N)
        .map(|chunk| {
            let mut element = [0u8; N];
            element.copy_from_slice(chunk);
            convert(element)
        })
        .collect())
}

fn reshape_declared(values: Vec<f32>, shape: &[usize]) -> Result<FeatureMatrix, PredictError> {
    let Some((&rows, rest)) = shape.split_first() else {
        return Err(PredictError::ShapeMismatch(
            "packed input needs a declared shape".to_string(),
        ));
    };
    let cols = base::shape_product(rest)?;
    let expected = rows.checked_mul(cols).ok_or(base::TensorError::ShapeOverflow)?;
    if expected != values.len() || values.is_empty() {
        return Err(PredictError::ShapeMismatch(format!(
            "shape {:?} needs {} values, got {}",
            shape,
            expected,
            values.len()
        )));
    }
    Ok(FeatureMatrix::new(rows, cols, values)?)
}

/// Encode selected labels as the `prediction` output tensor.
pub fn encode(labels: &[String]) -> OutputTensor {
    OutputTensor {
        name: PREDICTION_OUTPUT.to_string(),
        shape: vec![labels.len()],
        datatype: Datatype::Bytes,
        data: labels.iter().map(|label| label.as_bytes().to_vec()).collect(),
    }
}
