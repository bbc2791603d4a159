pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod llm;
pub mod retrieval;
pub mod server;
pub mod store;
pub mod transcription;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::InsightError;
pub use generator::PipelineContext;
