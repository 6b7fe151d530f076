use prost::Message;
use protocol::grpc::{
    InferTensorContents, ModelInferRequest, ModelInferResponse, model_infer_request::InferInputTensor,
    model_infer_response::InferOutputTensor,
};

#[test]
fn test_fp32_contents_survive_the_wire() {
    let request = ModelInferRequest {
        model_name: "zipmap-model".to_string(),
        id: "some-unique-id-123".to_string(),
        inputs: vec![InferInputTensor {
            name: "float_input".to_string(),
            datatype: "FP32".to_string(),
            shape: vec![1, 4],
            contents: Some(InferTensorContents {
                fp32_contents: vec![0.1, 0.2, 0.3, 0.4],
                ..Default::default()
            }),
            ..Default::default()
        }],
        ..Default::default()
    };

    let bytes = request.encode_to_vec();
    let decoded = ModelInferRequest::decode(bytes.as_slice()).expect("decode failed");
    let contents = decoded.inputs[0].contents.as_ref().expect("missing contents");
    assert_eq!(contents.fp32_contents, vec![0.1, 0.2, 0.3, 0.4]);
    assert!(decoded.raw_input_contents.is_empty());
}

#[test]
fn test_bytes_contents_stay_separate_elements() {
    let response = ModelInferResponse {
        model_name: "zipmap-model".to_string(),
        id: "r1".to_string(),
        outputs: vec![InferOutputTensor {
            name: "prediction".to_string(),
            datatype: "BYTES".to_string(),
            shape: vec![2],
            contents: Some(InferTensorContents {
                bytes_contents: vec![b"class_A".to_vec(), b"class_B".to_vec()],
                ..Default::default()
            }),
            ..Default::default()
        }],
        ..Default::default()
    };

    let decoded = ModelInferResponse::decode(response.encode_to_vec().as_slice()).unwrap();
    let labels = &decoded.outputs[0].contents.as_ref().unwrap().bytes_contents;
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[1], b"class_B");
}
