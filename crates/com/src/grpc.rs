//! V2 gRPC transport.

use {
    crate::ComError,
    protocol::grpc::{
        ModelInferRequest, ModelInferResponse, ModelMetadataRequest, ModelMetadataResponse,
        ModelReadyRequest, ModelReadyResponse, ServerLiveRequest, ServerLiveResponse,
        ServerMetadataRequest, ServerMetadataResponse, ServerReadyRequest, ServerReadyResponse,
        grpc_inference_service_server::{GrpcInferenceService, GrpcInferenceServiceServer},
    },
    serving::{ModelState, PredictError, Transport, predict_for, wire},
    std::{net::SocketAddr, sync::Arc},
    tokio::{
        net::{TcpListener, ToSocketAddrs},
        task::JoinHandle,
    },
    tokio_stream::wrappers::TcpListenerStream,
    tonic::{Request, Response, Status},
};

/// `inference.GRPCInferenceService` for one model.
///
/// An empty `model_name` addresses the hosted model; ModelMesh routes by
/// header and leaves the field blank.
pub struct InferenceService {
    state: Arc<ModelState>,
}

impl InferenceService {
    pub fn new(state: Arc<ModelState>) -> Self {
        Self { state }
    }

    fn check_model(&self, name: &str) -> Result<(), Status> {
        if name.is_empty() || name == self.state.name() {
            Ok(())
        } else {
            Err(Status::not_found(format!("model '{name}' is not served here")))
        }
    }
}

fn status_from(err: PredictError) -> Status {
    let message = err.to_string();
    match err {
        PredictError::NotReady => Status::unavailable(message),
        PredictError::ShapeMismatch(_) | PredictError::InvalidInput(_) => {
            Status::invalid_argument(message)
        }
        PredictError::EmptyRow { .. }
        | PredictError::Engine(_)
        | PredictError::MissingOutput { .. } => Status::internal(message),
    }
}

#[tonic::async_trait]
impl GrpcInferenceService for InferenceService {
    async fn server_live(
        &self,
        _request: Request<ServerLiveRequest>,
    ) -> Result<Response<ServerLiveResponse>, Status> {
        Ok(Response::new(ServerLiveResponse { live: true }))
    }

    async fn server_ready(
        &self,
        _request: Request<ServerReadyRequest>,
    ) -> Result<Response<ServerReadyResponse>, Status> {
        Ok(Response::new(ServerReadyResponse {
            ready: self.state.is_ready(),
        }))
    }

    async fn model_ready(
        &self,
        request: Request<ModelReadyRequest>,
    ) -> Result<Response<ModelReadyResponse>, Status> {
        self.check_model(&request.get_ref().name)?;
        Ok(Response::new(ModelReadyResponse {
            ready: self.state.is_ready(),
        }))
    }

    async fn server_metadata(
        &self,
        _request: Request<ServerMetadataRequest>,
    ) -> Result<Response<ServerMetadataResponse>, Status> {
        Ok(Response::new(ServerMetadataResponse {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            extensions: Vec::new(),
        }))
    }

    async fn model_metadata(
        &self,
        request: Request<ModelMetadataRequest>,
    ) -> Result<Response<ModelMetadataResponse>, Status> {
        self.check_model(&request.get_ref().name)?;
        Ok(Response::new(wire::metadata_to_grpc(&self.state.metadata())))
    }

    async fn model_infer(
        &self,
        request: Request<ModelInferRequest>,
    ) -> Result<Response<ModelInferResponse>, Status> {
        let message = request.into_inner();
        self.check_model(&message.model_name)?;
        let request = wire::request_from_grpc(message).map_err(status_from)?;

        let state = self.state.clone();
        let envelope = tokio::task::spawn_blocking(move || {
            predict_for(&state, &request, Transport::Grpc)
        })
        .await
        .map_err(|e| Status::internal(format!("inference task failed: {e}")))?
        .map_err(status_from)?;

        envelope
            .into_grpc()
            .map(Response::new)
            .ok_or_else(|| Status::internal("encoder produced a non-gRPC envelope"))
    }
}

/// gRPC server hosting one model.
pub struct GrpcServer {
    _serve_task: JoinHandle<()>,
    local_addr: SocketAddr,
}

impl GrpcServer {
    /// Bind a TCP listener and start serving `InferenceService` for `state`.
    pub async fn bind(addr: impl ToSocketAddrs, state: Arc<ModelState>) -> Result<Self, ComError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let service = GrpcInferenceServiceServer::new(InferenceService::new(state));

        let serve_task = tokio::spawn(async move {
            let result = tonic::transport::Server::builder()
                .add_service(service)
                .serve_with_incoming(TcpListenerStream::new(listener))
                .await;
            if let Err(e) = result {
                log::error!("gRPC server on {} stopped: {}", local_addr, e);
            }
        });
        log::info!("gRPC server listening on {}", local_addr);

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

impl Drop for GrpcServer {
    fn drop(&mut self) {
        self._serve_task.abort();
    }
}
