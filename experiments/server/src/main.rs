use {
    base::log::{self, LevelFilter},
    clap::Parser,
    com::{ServerConfig, Servers, config},
    serving::OnnxBackend,
    std::{path::PathBuf, sync::Arc},
};

#[derive(Parser)]
#[command(name = "server")]
#[command(about = "V2 inference server for ONNX ZipMap classifiers", long_about = None)]
struct Args {
    /// Name the model is served under
    #[arg(long = "model_name", env = "MODEL_NAME", default_value = config::DEFAULT_MODEL_NAME)]
    model_name: String,

    /// Directory holding the .onnx file
    #[arg(long = "model_dir", env = "MODEL_DIR", default_value = config::DEFAULT_MODEL_DIR)]
    model_dir: PathBuf,

    #[arg(long = "http_port", default_value_t = config::DEFAULT_HTTP_PORT)]
    http_port: u16,

    #[arg(long = "grpc_port", default_value_t = config::DEFAULT_GRPC_PORT)]
    grpc_port: u16,

    #[arg(long, default_value = config::DEFAULT_HOST)]
    host: String,

    /// Write daily log files to this directory instead of stdout
    #[arg(long = "log_dir", value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[arg(long = "log_level", default_value = "info")]
    log_level: LevelFilter,
}

impl Args {
    fn config(&self) -> ServerConfig {
        let config = ServerConfig::default()
            .with_model_name(self.model_name.clone())
            .with_model_dir(self.model_dir.clone())
            .with_http_port(self.http_port)
            .with_grpc_port(self.grpc_port)
            .with_host(self.host.clone());
        match &self.log_dir {
            Some(dir) => config.with_log_dir(dir.clone()),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = args.config();
    base::init_logger(&config.log_sink(), args.log_level)?;

    log::info!("Model server for '{}'", config.model_name);

    let servers = Servers::start(&config, Arc::new(OnnxBackend::cpu()?)).await?;
    log::info!(
        "Serving '{}': REST on {}, gRPC on {}",
        servers.state.name(),
        servers.rest.local_addr(),
        servers.grpc.local_addr()
    );

    tokio::signal::ctrl_c().await?;
    log::info!("Shutting down");
    drop(servers);
    Ok(())
}
