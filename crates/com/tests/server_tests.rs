mod common;

use com::{ComError, ServerConfig, Servers};
use common::{ThresholdBackend, model_dir};
use serving::{Backend, LoadError};
use std::sync::Arc;

#[tokio::test]
async fn test_start_loads_then_binds_both_transports() {
    let config = ServerConfig::default()
        .with_host("127.0.0.1")
        .with_http_port(0)
        .with_grpc_port(0)
        .with_model_dir(model_dir("start", &["model.onnx"]));

    let servers = Servers::start(&config, Arc::new(ThresholdBackend))
        .await
        .expect("start failed");

    assert!(servers.state.is_ready());
    assert_eq!(servers.state.name(), "zipmap-model");
    assert_ne!(servers.rest.local_addr().port(), 0);
    assert_ne!(servers.grpc.local_addr().port(), 0);
}

#[tokio::test]
async fn test_start_fails_without_model_file() {
    let config = ServerConfig::default()
        .with_host("127.0.0.1")
        .with_http_port(0)
        .with_grpc_port(0)
        .with_model_dir(model_dir("start-empty", &[]));

    let result = Servers::start(&config, Arc::new(ThresholdBackend)).await;

    assert!(matches!(
        result,
        Err(ComError::Load(LoadError::ModelFile(_)))
    ));
}

struct RecordingBackend {
    thread: std::sync::Mutex<Option<std::thread::ThreadId>>,
}

impl Backend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn load_model(
        &self,
        path: &std::path::Path,
    ) -> Result<Arc<dyn serving::Engine>, serving::EngineError> {
        *self.thread.lock().unwrap() = Some(std::thread::current().id());
        ThresholdBackend.load_model(path)
    }
}

#[tokio::test]
async fn test_start_loads_off_the_runtime_thread() {
    let backend = Arc::new(RecordingBackend {
        thread: std::sync::Mutex::new(None),
    });
    let config = ServerConfig::default()
        .with_host("127.0.0.1")
        .with_http_port(0)
        .with_grpc_port(0)
        .with_model_dir(model_dir("start-blocking", &["model.onnx"]));

    let servers = Servers::start(&config, backend.clone())
        .await
        .expect("start failed");

    assert!(servers.state.is_ready());
    let load_thread = backend.thread.lock().unwrap().expect("backend never called");
    assert_ne!(load_thread, std::thread::current().id());
}
