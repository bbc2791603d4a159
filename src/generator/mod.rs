//! 洞察生成流水线

pub mod aggregate;
pub mod context;
pub mod insight;
pub mod prompt;
pub mod workflow;

pub use context::PipelineContext;
pub use insight::InsightGenerator;
