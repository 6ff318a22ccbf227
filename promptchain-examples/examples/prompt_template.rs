//! Build a chat template mixing literal messages and templated segments, fill its placeholders
//! from a key-value mapping, and print the rendered messages. No model call involved.
//!
//! Run with:
//! ```bash
//! cargo run --package promptchain-examples --example prompt_template
//! ```

use std::collections::HashMap;

use promptchain::message::Message;
use promptchain::prompt::ChatTemplate;

fn main() -> anyhow::Result<()> {
    let template = ChatTemplate::new()
        .system("You are a comedian who tells jokes.")
        .message(Message::human("Hello, Comedian! What is your name? What do you do?"))
        .message(Message::ai(
            "I am Art the Clown. I tell creepy and scary jokes that will leave you more scared than amused.",
        ))
        .human("Ooooh, creepy! Now tell me {[joke_count]} jokes about {[joke_topic]}.");

    let values = HashMap::from([
        ("joke_count".to_string(), "3".to_string()),
        ("joke_topic".to_string(), "cars".to_string()),
    ]);
    let messages = template.render(&values)?;

    for message in &messages {
        println!("{}", message);
    }
    Ok(())
}
