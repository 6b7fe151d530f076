//! Response envelopes for the two transports.
//!
//! Both carry the same tensor. REST places the label bytes directly under
//! `data`; gRPC nests them under `contents.bytes_contents`, which strict
//! protobuf clients require.

use {
    crate::{InferenceResponse, OutputTensor},
    protocol::{
        grpc::{self, InferTensorContents, model_infer_response::InferOutputTensor},
        rest,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Rest,
    Grpc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutputEnvelope {
    Rest(rest::InferenceResponse),
    Grpc(grpc::ModelInferResponse),
}

impl OutputEnvelope {
    pub fn into_rest(self) -> Option<rest::InferenceResponse> {
        match self {
            OutputEnvelope::Rest(response) => Some(response),
            OutputEnvelope::Grpc(_) => None,
        }
    }

    pub fn into_grpc(self) -> Option<grpc::ModelInferResponse> {
        match self {
            OutputEnvelope::Grpc(response) => Some(response),
            OutputEnvelope::Rest(_) => None,
        }
    }
}

pub fn encode(response: InferenceResponse, transport: Transport) -> OutputEnvelope {
    match transport {
        Transport::Rest => OutputEnvelope::Rest(encode_rest(response)),
        Transport::Grpc => OutputEnvelope::Grpc(encode_grpc(response)),
    }
}

fn wire_shape(shape: &[usize]) -> Vec<i64> {
    shape.iter().map(|&dim| dim as i64).collect()
}

pub fn encode_rest(response: InferenceResponse) -> rest::InferenceResponse {
    rest::InferenceResponse {
        model_name: response.model_name,
        model_version: None,
        id: response.id,
        outputs: response
            .outputs
            .into_iter()
            .map(|output: OutputTensor| rest::ResponseOutput {
                name: output.name,
                shape: wire_shape(&output.shape),
                datatype: output.datatype.to_string(),
                data: output.data,
            })
            .collect(),
    }
}

pub fn encode_grpc(response: InferenceResponse) -> grpc::ModelInferResponse {
    grpc::ModelInferResponse {
        model_name: response.model_name,
        id: response.id,
        outputs: response
            .outputs
            .into_iter()
            .map(|output: OutputTensor| InferOutputTensor {
                name: output.name,
                datatype: output.datatype.to_string(),
                shape: wire_shape(&output.shape),
                contents: Some(InferTensorContents {
                    bytes_contents: output.data,
                    ..Default::default()
                }),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}
