//! Send a fixed multi-turn conversation to a chat model and print the reply.
//!
//! Run with:
//! ```bash
//! export OPENAI_API_KEY="your-key"
//! cargo run --package promptchain-examples --example conversation
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
    let messages = vec![
        Message::system("Solve the following math problems"),
        Message::human("What is 81 divided by 9?"),
        Message::ai("81 divided by 9 is 9."),
        Message::human("What is 10 times 5?"),
    ];
    let reply = model.invoke(&messages).await?;
    println!("{}", reply);
    Ok(())
}
