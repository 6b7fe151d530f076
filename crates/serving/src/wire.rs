//! Conversion of inbound wire messages into transport-neutral requests, and
//! of model metadata into wire messages.

use {
    crate::{
        Datatype, InferenceRequest, InputTensor, ModelMetadata, PredictError, TensorData,
        TensorSpec,
    },
    protocol::{
        grpc::{
            self, InferTensorContents, model_infer_request::InferInputTensor,
            model_metadata_response,
        },
        rest,
    },
    serde_json::Value,
};

fn wire_dims(shape: &[i64]) -> Result<Vec<usize>, PredictError> {
    shape
        .iter()
        .map(|&dim| {
            usize::try_from(dim).map_err(|_| {
                PredictError::InvalidInput(format!("negative dimension {dim} in shape {shape:?}"))
            })
        })
        .collect()
}

pub fn request_from_rest(body: rest::InferenceRequest) -> Result<InferenceRequest, PredictError> {
    let inputs = body
        .inputs
        .into_iter()
        .map(input_from_rest)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(InferenceRequest { id: body.id, inputs })
}

fn input_from_rest(input: rest::RequestInput) -> Result<InputTensor, PredictError> {
    let datatype: Datatype = input.datatype.parse()?;
    let shape = wire_dims(&input.shape)?;
    let mut values = Vec::new();
    flatten_json(&input.data, &mut values)?;
    Ok(InputTensor {
        name: input.name,
        shape,
        datatype,
        data: TensorData::Scalars(values),
    })
}

/// Row-major flattening of nested JSON arrays of numbers.
fn flatten_json(value: &Value, out: &mut Vec<f64>) -> Result<(), PredictError> {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_json(item, out)?;
            }
        }
        Value::Number(number) => {
            let scalar = number.as_f64().ok_or_else(|| {
                PredictError::InvalidInput(format!("{number} is not representable as f64"))
            })?;
            out.push(scalar);
        }
        Value::Bool(flag) => out.push(if *flag { 1.0 } else { 0.0 }),
        other => {
            return Err(PredictError::InvalidInput(format!(
                "tensor element {other} is not numeric"
            )));
        }
    }
    Ok(())
}

/// Convert a gRPC request.
///
/// `raw_input_contents[i]`, when present, carries the packed bytes of input
/// `i` and takes precedence over its typed `contents`.
pub fn request_from_grpc(message: grpc::ModelInferRequest) -> Result<InferenceRequest, PredictError> {
    let mut raw = message.raw_input_contents.into_iter();
    let inputs = message
        .inputs
        .into_iter()
        .map(|input| input_from_grpc(input, raw.next()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(InferenceRequest {
        id: Some(message.id).filter(|id| !id.is_empty()),
        inputs,
    })
}

fn input_from_grpc(input: InferInputTensor, raw: Option<Vec<u8>>) -> Result<InputTensor, PredictError> {
    let datatype: Datatype = input.datatype.parse()?;
    let shape = wire_dims(&input.shape)?;
    let data = match raw {
        Some(bytes) => TensorData::Raw(bytes),
        None => typed_contents(datatype, input.contents.unwrap_or_default()),
    };
    Ok(InputTensor {
        name: input.name,
        shape,
        datatype,
        data,
    })
}

fn typed_contents(datatype: Datatype, contents: InferTensorContents) -> TensorData {
    fn scalars<T: Into<f64>>(values: Vec<T>) -> TensorData {
        TensorData::Scalars(values.into_iter().map(Into::into).collect())
    }

    match datatype {
        Datatype::Bytes => TensorData::Raw(contents.bytes_contents.concat()),
        Datatype::Fp32 => scalars(contents.fp32_contents),
        Datatype::Fp64 => TensorData::Scalars(contents.fp64_contents),
        Datatype::Int8 | Datatype::Int16 | Datatype::Int32 => scalars(contents.int_contents),
        Datatype::Uint8 | Datatype::Uint16 | Datatype::Uint32 => scalars(contents.uint_contents),
        Datatype::Int64 => {
            TensorData::Scalars(contents.int64_contents.into_iter().map(|v| v as f64).collect())
        }
        Datatype::Uint64 => {
            TensorData::Scalars(contents.uint64_contents.into_iter().map(|v| v as f64).collect())
        }
        Datatype::Bool => TensorData::Scalars(
            contents
                .bool_contents
                .into_iter()
                .map(|v| if v { 1.0 } else { 0.0 })
                .collect(),
        ),
        // FP16 has no typed field; it only travels as raw bytes
        Datatype::Fp16 => TensorData::Scalars(Vec::new()),
    }
}

pub fn metadata_to_rest(metadata: &ModelMetadata) -> rest::ModelMetadataResponse {
    let to_wire = |spec: &TensorSpec| rest::TensorMetadata {
        name: spec.name.clone(),
        datatype: spec.datatype.to_string(),
        shape: spec.shape.clone(),
    };
    rest::ModelMetadataResponse {
        name: metadata.name.clone(),
        versions: Vec::new(),
        platform: metadata.platform.clone(),
        inputs: metadata.inputs.iter().map(to_wire).collect(),
        outputs: metadata.outputs.iter().map(to_wire).collect(),
    }
}

pub fn metadata_to_grpc(metadata: &ModelMetadata) -> grpc::ModelMetadataResponse {
    let to_wire = |spec: &TensorSpec| model_metadata_response::TensorMetadata {
        name: spec.name.clone(),
        datatype: spec.datatype.to_string(),
        shape: spec.shape.clone(),
    };
    grpc::ModelMetadataResponse {
        name: metadata.name.clone(),
        versions: Vec::new(),
        platform: metadata.platform.clone(),
        inputs: metadata.inputs.iter().map(to_wire).collect(),
        outputs: metadata.outputs.iter().map(to_wire).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_json_is_flattened_row_major() {
        let mut values = Vec::new();
        flatten_json(&serde_json::json!([[1, 2], [3.5, 4]]), &mut values).unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.5, 4.0]);
    }

    #[test]
    fn test_string_elements_are_rejected() {
        let mut values = Vec::new();
        let result = flatten_json(&serde_json::json!([1, "two"]), &mut values);
        assert!(matches!(result, Err(PredictError::InvalidInput(_))));
    }

    #[test]
    fn test_negative_dimension_is_rejected() {
        assert!(wire_dims(&[-1, 4]).is_err());
        assert_eq!(wire_dims(&[2, 4]).unwrap(), vec![2, 4]);
    }
}
