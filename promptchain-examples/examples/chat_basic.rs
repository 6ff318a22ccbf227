//! Send a single prompt to a chat model and print the reply.
//!
//! Run with:
//! ```bash
//! export OPENAI_API_KEY="your-key"
//! cargo run --package promptchain-examples --example chat_basic
//! ```

use promptchain::message::Message;
use promptchain::utils::llm::openai::{ChatModel, ChatModelConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("OPENAI_API_KEY").is_err() {
        eprintln!("OPENAI_API_KEY is not set");
        std::process::exit(1);
    }

    let model = ChatModel::new(ChatModelConfig::new("gpt-4o-mini"));
    let reply = model.invoke(&[Message::human("Hello, world!")]).await?;
    println!("{}", reply);
    Ok(())
}
