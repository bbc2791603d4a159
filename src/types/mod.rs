pub mod call;
pub mod insight;
pub mod sample;

pub use call::{CallRecord, RequestContext};
pub use insight::{InsightBatch, InsightKind, InsightPool, InsightRecord};
pub use sample::{HistoricalSamples, SampleRecord};
