//! # promptchain
//!
//! Chain-centric toolkit for composing prompt templates, chat models and pipelines in Rust
//!
//! **Note: `promptchain` is a WIP, so the APIs are subject to change.**
//!
//! ## Concepts and Design
//! `promptchain` follows data-driven design. The APIs are designed to be as explicit as possible,
//! so users should easily track every value that flows through a pipeline. The API hierarchy also
//! aims to be as flat as possible. Cycle speed is NOT a top priority since an LLM can take
//! trillions of cycles to respond to a request.
//!
//! ### Message and Conversation
//!
//! A [Message](crate::message::Message) is a role tag (`system`, `human` or `ai`) paired with text.
//! A conversation is nothing fancier than an ordered `Vec<Message>` that you append to; if it grows
//! past a model's context budget, [Tiktoken](crate::utils::token::tiktoken::Tiktoken) can truncate
//! it, keeping the system message pinned.
//!
//! ### Prompt Template and Placeholder
//!
//! As straightforward as its name, it's a template of prompts.
//!
//! For example, a template looks like
//!
//! ```text
//! You are a friendly and helpful assistant. Today is {[date]}.
//! ```
//!
//! Now, `{[date]}` is a placeholder, a slot to be filled, in this template, which has a name
//! `"date"`. The name can be any string except those containing line breaks `"\n"` and `"\r\n"`.
//!
//! A [PromptTemplate](crate::prompt::PromptTemplate) is a single templated string. A
//! [ChatTemplate](crate::prompt::ChatTemplate) is an ordered sequence of role-tagged templated
//! segments, which may be mixed with literal messages; completing it yields a `Vec<Message>` ready
//! for a chat model.
//!
//! ### Partial Prompt
//!
//! While a template is a blueprint, a partial prompt is an incomplete construction of it, with
//! empty slots (AKA placeholders). It comes only from `construct_prompt` on the template.
//!
//! A partial prompt records which placeholder gets filled by what value and also unfilled
//! placeholders. When all placeholders are filled, it's complete and ready to be transformed into
//! a concrete prompt via `complete`.
//!
//! ### Filler
//!
//! Anything that fills one or more placeholders in a partial prompt: anything implementing
//! [`FillPlaceholders`](crate::filler::FillPlaceholders) and at least one of
//! [`Fill`](crate::filler::Fill), [`FillMut`](crate::filler::FillMut),
//! [`FillWith<CTX>`](crate::filler::FillWith) and [`FillWithMut<CTX>`](crate::filler::FillWithMut).
//!
//! > A simple example is a date filler, which fills a placeholder named `date` that is represented
//! > in a template as `{[date]}`.
//!
//! A filler can also be a composition of many fillers, so a partial prompt can be filled in
//! multiple stages.
//!
//! ### Chain
//!
//! A [Chain](crate::chain::Chain) is a unit that takes one input value and produces one output
//! value. Chains compose linearly with [pipe](crate::chain::ChainExt::pipe), fan out by name with
//! [Parallel](crate::chain::Parallel), and dispatch on predicates with
//! [Branch](crate::chain::Branch). Templates and chat models are chains, so the typical pipeline
//! reads
//!
//! ```text
//! ChatTemplate -> ChatModel -> post-processing
//! ```
//!
//! and a failing stage aborts the pipeline with its own error, unmodified.
//!
//! ### Endpoint or LLM
//!
//! The endpoint of a `template -> partial prompt -> complete prompt` pipeline is an LLM, which
//! consumes a prompt and produces a reply. Post-processing of the reply lives in
//! [utilities](crate::utils). Or, you can kick off another pipeline that starts from the reply, so
//! then the endpoint is a new start!
//!
//! ## License
//!
//! `promptchain` will always remain free under Apache license.
//!
//! ## Attribution
//! * `async_openai`: the chat and embedding endpoints of `promptchain` are thin wrappers over this
//!   crate.
//! * `tiktoken-rs`: in [crate::utils::token::tiktoken], we re-export the `tiktoken-rs` crate.

pub mod message;
pub mod prompt;
pub mod chain;
pub mod filler;
pub mod utils;
