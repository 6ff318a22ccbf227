pub mod embedding;
pub mod llm;
pub mod postprocess;
pub mod token;
pub(crate) mod prompt_processing;

use serde_json::{Map, Value};

/// JSON object type used for template metadata.
pub type JsonMap = Map<String, Value>;
