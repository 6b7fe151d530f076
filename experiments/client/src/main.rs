use {
    base::log::{self, LevelFilter},
    clap::Parser,
    com::config,
    protocol::grpc::{
        InferTensorContents, ModelInferRequest,
        grpc_inference_service_client::GrpcInferenceServiceClient,
        model_infer_request::InferInputTensor,
    },
};

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "Send one feature row to a V2 gRPC inference server", long_about = None)]
struct Args {
    #[arg(long, default_value = "localhost")]
    host: String,

    #[arg(long, default_value_t = config::DEFAULT_GRPC_PORT)]
    port: u16,

    #[arg(long = "model_name", default_value = config::DEFAULT_MODEL_NAME)]
    model_name: String,

    #[arg(long, default_value = "some-unique-id-123")]
    id: String,

    /// Comma-separated feature values, four per row
    #[arg(
        long,
        value_delimiter = ',',
        allow_negative_numbers = true,
        default_values_t = [5.1f32, 3.5, 1.4, 0.2]
    )]
    features: Vec<f32>,
}

impl Args {
    fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    base::init_logger(&base::LogSink::Stdout, LevelFilter::Info)?;
    let args = Args::parse();

    let endpoint = args.endpoint();
    let mut client = GrpcInferenceServiceClient::connect(endpoint.clone()).await?;
    log::info!("Connected to {}", endpoint);

    let request = ModelInferRequest {
        model_name: args.model_name,
        id: args.id,
        inputs: vec![InferInputTensor {
            name: "float_input".to_string(),
            datatype: "FP32".to_string(),
            shape: vec![(args.features.len() / 4) as i64, 4],
            contents: Some(InferTensorContents {
                fp32_contents: args.features,
                ..Default::default()
            }),
            ..Default::default()
        }],
        ..Default::default()
    };

    let response = client.model_infer(request).await?.into_inner();
    log::info!("Model: {}", response.model_name);
    log::info!("Request id: {}", response.id);
    for output in &response.outputs {
        let labels: Vec<String> = output
            .contents
            .iter()
            .flat_map(|contents| contents.bytes_contents.iter())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect();
        log::info!("{} {:?}: {:?}", output.name, output.shape, labels);
    }
    Ok(())
}
