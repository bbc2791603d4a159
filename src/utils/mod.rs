pub mod json_extractor;

pub use json_extractor::extract_json;
