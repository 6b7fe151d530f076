pub mod config;
pub mod error;
pub mod grpc;
pub mod rest;
pub mod server;

pub use config::ServerConfig;
pub use error::ComError;
pub use grpc::{GrpcServer, InferenceService};
pub use rest::RestServer;
pub use server::Servers;
