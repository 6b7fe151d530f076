//! Wire types of the V2 inference protocol.
//!
//! - [`rest`]: JSON bodies of the HTTP/REST form.
//! - [`grpc`]: protobuf messages and tonic stubs of the gRPC form, generated
//!   from `proto/grpc_predict_v2.proto`.

pub mod rest;

#[allow(clippy::all)]
pub mod grpc {
    tonic::include_proto!("inference");
}
