pub mod logging;
pub use logging::{FileLogger, LogSink, StdoutLogger, init_logger};

pub mod tensor;
pub use tensor::{Tensor, TensorError, shape_product};

// Re-export log crate so downstream crates can use base::log::*
pub use log;
