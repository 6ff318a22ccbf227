//! LLM endpoints that consume a completed prompt and produce a reply.

pub mod openai;
