//! JSON runtime configuration of the batch tools.

pub mod runtime;

pub use runtime::{load_config, OutputConfig, RuntimeConfig};
