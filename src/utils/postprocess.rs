//! Post-processing of LLM replies, usable as the tail stages of a chain.

pub mod json;
pub mod string;
