use std::collections::HashMap;

use anyhow::Result;
use lazy_static::lazy_static;
pub use tiktoken_rs::{get_bpe_from_model, CoreBPE};

use crate::message::Message;
use crate::utils::token::CountToken;

/// Fixed per-message token overhead of the chat wire format.
const TOKENS_PER_MESSAGE: usize = 3;

lazy_static! {
    /// const map from model name to max context tokens.
    /// TODO: when `LazyCell` is stabilized, use that instead
    pub static ref MODEL_TO_MAX_TOKENS: HashMap<&'static str, usize> = HashMap::from([
        ("gpt-4o", 128_000),
        ("gpt-4o-mini", 128_000),
        ("gpt-4", 8192),
        ("gpt-4-0613", 8192),
        ("gpt-4-32k", 32768),
        ("gpt-4-32k-0613", 32768),
        ("gpt-3.5-turbo", 4096),
        ("gpt-3.5-turbo-16k", 16384),
        ("gpt-3.5-turbo-0613", 4096),
        ("gpt-3.5-turbo-16k-0613", 16384),
    ]);
}

/// Counter using the Tiktoken tokenizer.
#[derive(Clone)]
#[readonly::make]
pub struct Tiktoken {
    /// The model name of the tokenizer. read-only.
    pub model: String,
    /// The tokenizer. read-only.
    pub bpe: CoreBPE,
}

impl Tiktoken {
    /// Create a new Tiktoken counter.
    pub fn new(model: impl Into<String>) -> Result<Self> {
        let model = model.into();
        assert!(MODEL_TO_MAX_TOKENS.contains_key(model.as_str()), "model {} is not supported", model);
        let model = if model.starts_with("gpt-4o") {
            "gpt-4o"
        } else if model.starts_with("gpt-4-32k") {
            "gpt-4-32k"
        } else if model.starts_with("gpt-4") {
            "gpt-4"
        } else if model.starts_with("gpt-3.5") {
            "gpt-3.5-turbo"
        } else {
            unreachable!()
        };
        get_bpe_from_model(model).map(|bpe| Tiktoken {
            model: model.to_string(),
            bpe,
        })
    }

    /// Count the number of tokens of one message in the chat wire format: the content tokens plus
    /// a fixed per-message overhead.
    pub fn count_msg_token(&self, msg: &Message) -> usize {
        self.count_token(&msg.content) + TOKENS_PER_MESSAGE
    }

    /// Truncate a conversation history to the model's context budget, dropping the oldest
    /// messages first. When a system message is given, it is pinned at the head of the returned
    /// history and its token count is reserved from the budget.
    #[inline]
    pub fn truncate_messages(&self,
                             messages: &Vec<Message>,
                             system_message: Option<Message>) -> Vec<Message> {
        if messages.is_empty() {
            return messages.clone();
        }
        let max_tokens = *MODEL_TO_MAX_TOKENS.get(self.model.as_str()).unwrap();
        return if let Some(sys_prompt) = system_message {
            let sys_prompt_token_count = self.count_msg_token(&sys_prompt);
            assert!(sys_prompt_token_count <= max_tokens, "system message token count {} is greater than max tokens {}", sys_prompt_token_count, max_tokens);
            let truncate_start_idx = self.get_truncate_start_idx(messages, max_tokens - sys_prompt_token_count);
            if truncate_start_idx == 0 {
                let mut new_messages = messages.clone();
                if !messages.first().unwrap().eq(&sys_prompt) {
                    new_messages[0] = sys_prompt;
                }
                new_messages
            } else {
                let mut new_messages = Vec::with_capacity(messages.len() - truncate_start_idx + 1);
                new_messages.push(sys_prompt);
                new_messages.extend_from_slice(&messages[truncate_start_idx..]);
                new_messages
            }
        } else {
            let truncate_start_idx = self.get_truncate_start_idx(messages, max_tokens);
            if truncate_start_idx == 0 {
                messages.clone()
            } else {
                messages[truncate_start_idx..].to_vec()
            }
        };
    }

    pub(crate) fn get_truncate_start_idx(&self,
                                         messages: &Vec<Message>,
                                         max_tokens: usize) -> usize {
        if messages.is_empty() {
            return 0;
        }
        let num_messages = messages.len();
        if max_tokens == 0 {
            return num_messages;
        }
        let mut token_count = 0;
        // TODO: make this algorithm more smart as in Python `tokentrim`
        let mut truncate_start_idx = 0;
        for (idx, msg) in messages.iter().enumerate().rev() {
            let message_token_count = self.count_msg_token(msg);
            if token_count + message_token_count > max_tokens {
                truncate_start_idx = idx + 1;
                break;
            }
            token_count += message_token_count;
        }
        truncate_start_idx
    }
}

impl CountToken for Tiktoken {
    fn count_token(&self, string: &str) -> usize {
        self.bpe.encode_with_special_tokens(string).len()
    }
}

#[cfg(test)]
mod test_tiktoken {
    use crate::message::Message;
    use super::Tiktoken;

    fn history() -> Vec<Message> {
        vec![
            Message::system("You are a helpful AI assistant."),
            Message::human("What is 81 divided by 9?"),
            Message::ai("81 divided by 9 is 9."),
            Message::human("What is 10 times 5?"),
            Message::ai("10 times 5 is 50."),
        ]
    }

    #[test]
    fn test_truncate_keeps_newest_messages() {
        let counter = Tiktoken::new("gpt-3.5-turbo").unwrap();
        let messages = history();
        // budget for exactly the last two messages
        let budget: usize = messages[3..].iter().map(|m| counter.count_msg_token(m)).sum();
        assert_eq!(counter.get_truncate_start_idx(&messages, budget), 3);
        let full_budget: usize = messages.iter().map(|m| counter.count_msg_token(m)).sum();
        assert_eq!(counter.get_truncate_start_idx(&messages, full_budget), 0);
        assert_eq!(counter.get_truncate_start_idx(&messages, 0), messages.len());
    }

    #[test]
    fn test_truncate_noop_within_budget() {
        let counter = Tiktoken::new("gpt-3.5-turbo").unwrap();
        let messages = history();
        let truncated = counter.truncate_messages(&messages, None);
        assert_eq!(truncated, messages);
    }

    #[test]
    fn test_truncate_pins_system_message() {
        let counter = Tiktoken::new("gpt-3.5-turbo").unwrap();
        let messages = history();
        let sys_prompt = Message::system("Solve the following math problems");
        let truncated = counter.truncate_messages(&messages, Some(sys_prompt.clone()));
        assert_eq!(truncated[0], sys_prompt);
        assert_eq!(truncated.len(), messages.len());
        assert_eq!(truncated[1..], messages[1..]);
    }
}
