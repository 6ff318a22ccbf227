//! The basic pipeline: chat template -> chat model -> string post-processing, composed with `pipe`.
//!
//! Run with:
//! ```bash
//! export OPENAI_API_KEY="your-key"
//! cargo run --package promptchain-examples --example template_chain
//! ```

use std::collections::HashMap;

use promptchain::chain::{stage, Chain, ChainExt};
use promptchain::message::Message;
use promptchain::prompt::ChatTemplate;
use promptchain::utils::llm::openai::{ChatModel, ChatModelConfig};
use promptchain::utils::postprocess::string::trim_reply;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("OPENAI_API_KEY").is_err() {
        eprintln!("OPENAI_API_KEY is not set");
        std::process::exit(1);
    }

    let template = ChatTemplate::new()
        .system("You are a comedian who tells scary, terrifying and creepy jokes that leave the user with unease.")
        .human("Tell me {[joke_count]} jokes about {[joke_topic]}.");
    let model = ChatModel::new(ChatModelConfig::new("gpt-4o-mini").with_temperature(0.9));

    let chain = template
        .pipe(model)
        .pipe(stage(|reply: Message| Ok(trim_reply(reply.content))));

    let values = HashMap::from([
        ("joke_count".to_string(), "3".to_string()),
        ("joke_topic".to_string(), "cars".to_string()),
    ]);
    let jokes = chain.run(values).await?;
    println!("{}", jokes);
    Ok(())
}
