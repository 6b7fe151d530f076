use {base::LogSink, std::path::PathBuf};

pub const DEFAULT_MODEL_NAME: &str = "zipmap-model";
pub const DEFAULT_MODEL_DIR: &str = "/mnt/models";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_GRPC_PORT: u16 = 8081;
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Settings for one model server process.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub model_name: String,
    pub model_dir: PathBuf,
    pub http_port: u16,
    pub grpc_port: u16,
    pub host: String,
    /// Write daily log files here instead of stdout.
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            http_port: DEFAULT_HTTP_PORT,
            grpc_port: DEFAULT_GRPC_PORT,
            host: DEFAULT_HOST.to_string(),
            log_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    pub fn with_model_dir(mut self, model_dir: impl Into<PathBuf>) -> Self {
        self.model_dir = model_dir.into();
        self
    }

    pub fn with_http_port(mut self, port: u16) -> Self {
        self.http_port = port;
        self
    }

    pub fn with_grpc_port(mut self, port: u16) -> Self {
        self.grpc_port = port;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(log_dir.into());
        self
    }

    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    pub fn grpc_addr(&self) -> String {
        format!("{}:{}", self.host, self.grpc_port)
    }

    pub fn log_sink(&self) -> LogSink {
        match &self.log_dir {
            Some(dir) => LogSink::Directory(dir.clone()),
            None => LogSink::Stdout,
        }
    }
}
