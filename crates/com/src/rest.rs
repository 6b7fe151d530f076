//! V2 REST transport.

use {
    crate::ComError,
    axum::{
        Json, Router,
        extract::{Path, State, rejection::JsonRejection},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::{get, post},
    },
    protocol::rest,
    serving::{ModelState, PredictError, Transport, predict_for, wire},
    std::{net::SocketAddr, sync::Arc},
    tokio::{
        net::{TcpListener, ToSocketAddrs},
        task::JoinHandle,
    },
};

/// HTTP server hosting one model.
pub struct RestServer {
    _serve_task: JoinHandle<()>,
    local_addr: SocketAddr,
}

impl RestServer {
    /// Bind a TCP listener and start serving the V2 REST routes for `state`.
    pub async fn bind(addr: impl ToSocketAddrs, state: Arc<ModelState>) -> Result<Self, ComError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let app = router(state);

        let serve_task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("REST server on {} stopped: {}", local_addr, e);
            }
        });
        log::info!("REST server listening on {}", local_addr);

        Ok(Self {
            _serve_task: serve_task,
            local_addr,
        })
    }

    /// Return the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Drop for RestServer {
    fn drop(&mut self) {
        self._serve_task.abort();
    }
}

pub fn router(state: Arc<ModelState>) -> Router {
    Router::new()
        .route("/v2", get(server_metadata))
        .route("/v2/health/live", get(live))
        .route("/v2/health/ready", get(ready))
        .route("/v2/models/:name", get(model_metadata))
        .route("/v2/models/:name/ready", get(model_ready))
        .route("/v2/models/:name/infer", post(infer))
        .with_state(state)
}

/// Error reply with a `{"error": ...}` body.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unknown_model(name: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("model '{name}' is not served here"),
        }
    }
}

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        let status = match &err {
            PredictError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            PredictError::ShapeMismatch(_) | PredictError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            PredictError::EmptyRow { .. }
            | PredictError::Engine(_)
            | PredictError::MissingOutput { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = rest::ErrorResponse {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

fn check_model(state: &ModelState, name: &str) -> Result<(), ApiError> {
    if name == state.name() {
        Ok(())
    } else {
        Err(ApiError::unknown_model(name))
    }
}

async fn server_metadata() -> Json<rest::ServerMetadataResponse> {
    Json(rest::ServerMetadataResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        extensions: Vec::new(),
    })
}

async fn live() -> Json<rest::LiveResponse> {
    Json(rest::LiveResponse { live: true })
}

async fn ready(State(state): State<Arc<ModelState>>) -> Json<rest::ReadyResponse> {
    Json(rest::ReadyResponse {
        ready: state.is_ready(),
    })
}

async fn model_ready(
    State(state): State<Arc<ModelState>>,
    Path(name): Path<String>,
) -> Result<Json<rest::ModelReadyResponse>, ApiError> {
    check_model(&state, &name)?;
    Ok(Json(rest::ModelReadyResponse {
        name,
        ready: state.is_ready(),
    }))
}

async fn model_metadata(
    State(state): State<Arc<ModelState>>,
    Path(name): Path<String>,
) -> Result<Json<rest::ModelMetadataResponse>, ApiError> {
    check_model(&state, &name)?;
    Ok(Json(wire::metadata_to_rest(&state.metadata())))
}

async fn infer(
    State(state): State<Arc<ModelState>>,
    Path(name): Path<String>,
    body: Result<Json<rest::InferenceRequest>, JsonRejection>,
) -> Result<Json<rest::InferenceResponse>, ApiError> {
    check_model(&state, &name)?;
    let Json(body) = body?;
    let request = wire::request_from_rest(body)?;

    // the engine call blocks; keep it off the async workers
    let envelope = tokio::task::spawn_blocking(move || {
        predict_for(&state, &request, Transport::Rest)
    })
    .await
    .map_err(|e| ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: format!("inference task failed: {e}"),
    })??;

    envelope.into_rest().map(Json).ok_or(ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "encoder produced a non-REST envelope".to_string(),
    })
}
