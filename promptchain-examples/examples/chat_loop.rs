//! Interactive conversation loop: the history is a plain `Vec<Message>` appended to on every turn.
//! Type `exit` (or close stdin) to quit.
//!
//! Run with:
//! ```bash
//! export OPENAI_API_KEY="your-key"
//! cargo run --package promptchain-examples --example chat_loop
//! ```

use std::io::{stdin, stdout, Write};

use promptchain::message::Message;
use promptchain::utils::llm::openai::{ChatModel, ChatModelConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("OPENAI_API_KEY").is_err() {
        eprintln!("OPENAI_API_KEY is not set");
        std::process::exit(1);
    }

    let model = ChatModel::new(ChatModelConfig::new("gpt-4o-mini"));
    let mut chat_history = vec![Message::system("You are a helpful AI assistant.")];

    loop {
        print!("You: ");
        stdout().flush()?;
        let mut query = String::new();
        if stdin().read_line(&mut query)? == 0 {
            break;
        }
        let query = query.trim();
        if query.is_empty() || query == "exit" {
            break;
        }
        chat_history.push(Message::human(query));

        let reply = model.invoke(&chat_history).await?;
        println!("AI: {}", reply.content);
        chat_history.push(reply);
    }
    Ok(())
}
