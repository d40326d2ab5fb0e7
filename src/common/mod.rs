pub mod config;
pub mod error;
pub mod resources;

pub use config::{Config, ModelConfig};
