use {
    crate::{
        EngineOutput, InputTensor, LoadedModel, ModelState, OutputEnvelope, OutputTensor,
        PredictError, ProbabilityRow, Transport, codec, envelope, model::ZIPMAP_OUTPUT_INDEX,
        select,
    },
    uuid::Uuid,
};

/// Transport-neutral inference request.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    pub id: Option<String>,
    pub inputs: Vec<InputTensor>,
}

/// Transport-neutral inference response.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceResponse {
    pub id: String,
    pub model_name: String,
    pub outputs: Vec<OutputTensor>,
}

/// Run one request against the model in `state`.
///
/// Only the first input tensor is used. Failures after the readiness check
/// are logged together with the offending input before being returned.
pub fn predict(
    state: &ModelState,
    request: &InferenceRequest,
) -> Result<InferenceResponse, PredictError> {
    let model = state.loaded().ok_or(PredictError::NotReady)?;
    let input = request
        .inputs
        .first()
        .ok_or_else(|| PredictError::InvalidInput("request has no inputs".to_string()))?;

    let labels = classify(model, input).inspect_err(|e| {
        log::error!("[{}] prediction failed: {}", state.name(), e);
        log::error!("[{}] input '{}' data: {:?}", state.name(), input.name, input.data);
        log::error!("[{}] input '{}' shape: {:?}", state.name(), input.name, input.shape);
    })?;

    Ok(InferenceResponse {
        id: response_id(request.id.as_deref()),
        model_name: state.name().to_string(),
        outputs: vec![codec::encode(&labels)],
    })
}

/// `predict`, encoded for `transport`.
pub fn predict_for(
    state: &ModelState,
    request: &InferenceRequest,
    transport: Transport,
) -> Result<OutputEnvelope, PredictError> {
    predict(state, request).map(|response| envelope::encode(response, transport))
}

fn classify(model: &LoadedModel, input: &InputTensor) -> Result<Vec<String>, PredictError> {
    let features = codec::decode(input, codec::FEATURE_COUNT)?;
    let outputs = model
        .engine
        .run(&model.output_names, &[(model.input_name.as_str(), &features)])?;

    let count = outputs.len();
    let rows: &[ProbabilityRow] = match outputs.get(ZIPMAP_OUTPUT_INDEX) {
        Some(EngineOutput::ProbabilityMaps(rows)) => rows,
        _ => {
            return Err(PredictError::MissingOutput {
                index: ZIPMAP_OUTPUT_INDEX,
                count,
            });
        }
    };
    if rows.len() != features.rows() {
        return Err(PredictError::Engine(format!(
            "engine returned {} probability rows for {} input rows",
            rows.len(),
            features.rows()
        )));
    }
    select::select(rows)
}

/// The caller's id when it has one, a fresh random UUID otherwise.
pub fn response_id(requested: Option<&str>) -> String {
    match requested {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => Uuid::new_v4().to_string(),
    }
}
