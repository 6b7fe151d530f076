use {
    crate::{ComError, GrpcServer, RestServer, ServerConfig},
    serving::{Backend, ModelState},
    std::sync::Arc,
};

/// Both transports serving one loaded model.
pub struct Servers {
    pub state: Arc<ModelState>,
    pub rest: RestServer,
    pub grpc: GrpcServer,
}

impl Servers {
    /// Load the configured model with `backend`, then bind both transports.
    ///
    /// The load runs on the blocking pool. Nothing is bound when it fails.
    pub async fn start(config: &ServerConfig, backend: Arc<dyn Backend>) -> Result<Self, ComError> {
        let state = Arc::new(ModelState::new(config.model_name.clone()));
        let loading = state.clone();
        let model_dir = config.model_dir.clone();
        tokio::task::spawn_blocking(move || loading.load(&model_dir, backend.as_ref())).await??;

        let rest = RestServer::bind(config.http_addr(), state.clone()).await?;
        let grpc = GrpcServer::bind(config.grpc_addr(), state.clone()).await?;
        Ok(Self { state, rest, grpc })
    }
}
