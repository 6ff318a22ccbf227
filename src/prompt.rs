//! # Prompt
//! A prompt is either a plain string or an ordered list of role-tagged messages.
//!
//! ## PromptTemplate
//! A prompt template is a string with placeholders. It can also have metadata in JSON format.
//!
//! ## Placeholder
//! A placeholder is a string that is in the format of `{[name]}`. It can be filled with a value.
//! It has a name, which is the string inside the square brackets. Names cannot contain line breaks.
//!
//! ## PartialPrompt
//! A partial prompt is a prompt template with some placeholders filled. A partial prompt can be only
//! constructed from a prompt template via [PromptTemplate::construct_prompt].
//!
//! The placeholders in a partial prompt can be filled with values via [PartialPrompt::fill] or
//! [PartialPrompt::try_fill]. You can also use these two methods to update the filling values of the
//! placeholders. When all placeholders are filled, the partial prompt can be completed via
//! [PartialPrompt::complete], in which the placeholders in a template are **actually** replaced with
//! the filling values.
//!
//! ## ChatTemplate
//! A chat template is an ordered sequence of segments, each either a role-tagged template text or a
//! literal [Message] that is copied through untouched. All templated segments share one set of named
//! placeholders. [ChatTemplate::construct_prompt] gives a [PartialChatPrompt], which fills and
//! completes exactly like a [PartialPrompt] but produces a `Vec<Message>` ready to send to a chat
//! model. [ChatTemplate::render] is the one-shot shorthand that fills from a key-value mapping.
//!
//! ### Counting tokens
//! A partial prompt can be used to count the number of tokens in the prompt. For simple counting,
//! use [PartialPrompt::current_token_num] or [PartialChatPrompt::current_token_num].
//!
//! If you need to frequently try different filling values and re-count tokens, use
//! [PartialPrompt::with_counter_cache] to get a [PromptTokenCountCache] that caches per-placeholder
//! counts. It's very useful when the template is long and thus takes a long time to count.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::warn;

use crate::message::{Message, Role};
use crate::prompt::errors::{PlaceholderNotExist, UnfilledPlaceholders};
use crate::utils::prompt_processing::{get_placeholders, replace_all_placeholders};
use crate::utils::token::{CountToken, PromptTokenCountCache};
use crate::utils::JsonMap;

/// A prompt template with some placeholders filled. A partial prompt can be only constructed from a
/// prompt template via [PromptTemplate::construct_prompt].
#[derive(Debug, Clone)]
#[readonly::make]
pub struct PartialPrompt {
    /// The template of the partial prompt, readonly
    pub template: PromptTemplate,

    /// Mapping from placeholder name to its filling value
    pub(crate) placeholder_to_vals: HashMap<String, Option<String>>,

    /// Record the placeholders that are not filled yet
    pub(crate) unfilled_placeholders: HashSet<String>,
}

impl PartialPrompt {
    /// Fill a placeholder in the partial prompt with the given value.
    /// Panics if the placeholder does not exist.
    pub fn fill(&mut self, placeholder: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.try_fill(placeholder, value).unwrap()
    }

    /// Fill a placeholder in the partial prompt with the given value.
    /// Returns an error if the placeholder does not exist.
    pub fn try_fill(&mut self, placeholder: impl Into<String>, value: impl Into<String>) -> Result<&mut Self, PlaceholderNotExist> {
        let placeholder = placeholder.into();
        if self.placeholder_to_vals.contains_key(&placeholder) {
            self.unfilled_placeholders.remove(&placeholder);
            self.placeholder_to_vals.insert(placeholder, Some(value.into()));
            Ok(self)
        } else {
            Err(PlaceholderNotExist::new(placeholder, value, &self.template.placeholders))
        }
    }

    /// Get a [PromptTokenCountCache] that can be used to quickly count the number of tokens in the prompt and cache.
    pub fn with_counter_cache<'a, C: CountToken>(&'a self, counter: &'a C) -> PromptTokenCountCache<'a, C> {
        PromptTokenCountCache::of_prompt(self, counter)
    }

    /// Count the number of tokens in the prompt without caching. Note that the unfilled placeholders
    /// are also counted with the placeholder names.
    pub fn current_token_num(&self, counter: &impl CountToken) -> usize {
        let mapping: HashMap<String, String> = self.placeholder_to_vals.iter()
            .filter_map(|(p, v)| v.as_ref().map(|v| (p.clone(), v.clone())))
            .collect();
        PromptTokenCountCache::of_prompt(self, counter).attempt_fill_multiple_and_count(&mapping).unwrap()
    }

    /// Complete the partial prompt and return the completed prompt.
    /// Returns an error if there are still unfilled placeholders.
    pub fn complete(&self) -> Result<String, UnfilledPlaceholders> {
        if self.unfilled_placeholders.is_empty() {
            let template = self.template.str();
            let prompt = unsafe { replace_all_placeholders(template, &self.placeholder_to_vals) };
            Ok(prompt)
        } else {
            Err(UnfilledPlaceholders {
                all_placeholders: self.template.placeholders.iter().cloned().collect(),
                unfilled_placeholders: self.unfilled_placeholders.iter().cloned().collect(),
            })
        }
    }
}

/// A prompt template with placeholders. It can also have metadata in JSON format.
#[derive(Debug, Clone)]
#[readonly::make]
pub struct PromptTemplate {
    /// The template string, immutable
    template: Arc<String>,

    /// The placeholders in the template, readonly
    pub placeholders: HashSet<String>,

    /// The metadata of the prompt template, readonly
    pub meta_data: Arc<JsonMap>,
}

impl PromptTemplate {
    /// Create a prompt template from a string without metadata.
    pub fn new(template: impl Into<String>) -> Self {
        Self::with_metadata(template, JsonMap::new())
    }

    /// Create a prompt template from a string with metadata. Warns if the template does not have any placeholder.
    pub fn with_metadata(template: impl Into<String>, metadata: JsonMap) -> Self {
        let template = template.into();
        let placeholders = get_placeholders(&template);
        if placeholders.is_empty() {
            warn!("Your prompt template does not have a placeholder. If this is intended, ignore this message. \
            Otherwise, check whether you have written placeholders correctly.\n\
            Got prompt template:\n\
            {}", template);
        }
        Self {
            template: Arc::new(template),
            meta_data: Arc::new(metadata),
            placeholders,
        }
    }

    /// Get the prompt template as a string.
    #[inline]
    pub fn str(&self) -> &str {
        &self.template
    }

    /// Construct a partial prompt from the prompt template.
    pub fn construct_prompt(&self) -> PartialPrompt {
        PartialPrompt {
            template: self.clone(),
            placeholder_to_vals: self.placeholders.iter().map(|p| (p.clone(), None)).collect(),
            unfilled_placeholders: self.placeholders.clone(),
        }
    }
}

/// One entry of a [ChatTemplate].
#[derive(Debug, Clone)]
pub enum Segment {
    /// Template text rendered under the given role at completion time.
    Templated { role: Role, text: Arc<String> },
    /// A concrete message copied through untouched.
    Literal(Message),
}

impl Segment {
    /// The raw text of the segment, with placeholders unreplaced.
    pub fn text(&self) -> &str {
        match self {
            Self::Templated { text, .. } => text,
            Self::Literal(msg) => &msg.content,
        }
    }
}

/// An ordered sequence of role-tagged template segments and literal messages, sharing one set of
/// named placeholders. Built incrementally:
///
/// ```
/// use promptchain::message::Message;
/// use promptchain::prompt::ChatTemplate;
///
/// let template = ChatTemplate::new()
///     .system("You are a comedian who tells jokes.")
///     .message(Message::human("Hello, Comedian! What is your name?"))
///     .message(Message::ai("I am Art the Clown."))
///     .human("Now tell me {[joke_count]} jokes about {[joke_topic]}.");
/// assert_eq!(template.placeholders.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
#[readonly::make]
pub struct ChatTemplate {
    /// The segments of the template, readonly
    pub segments: Vec<Segment>,

    /// The placeholders across all templated segments, readonly
    pub placeholders: HashSet<String>,
}

impl ChatTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a templated segment under the given role.
    pub fn segment(mut self, role: Role, text: impl Into<String>) -> Self {
        let text = text.into();
        self.placeholders.extend(get_placeholders(&text));
        self.segments.push(Segment::Templated { role, text: Arc::new(text) });
        self
    }

    /// Append a templated [Role::System] segment.
    pub fn system(self, text: impl Into<String>) -> Self {
        self.segment(Role::System, text)
    }

    /// Append a templated [Role::Human] segment.
    pub fn human(self, text: impl Into<String>) -> Self {
        self.segment(Role::Human, text)
    }

    /// Append a templated [Role::Ai] segment.
    pub fn ai(self, text: impl Into<String>) -> Self {
        self.segment(Role::Ai, text)
    }

    /// Append a literal message that is copied through untouched, even if its content looks like
    /// a placeholder.
    pub fn message(mut self, message: Message) -> Self {
        self.segments.push(Segment::Literal(message));
        self
    }

    /// Construct a partial chat prompt from the template.
    pub fn construct_prompt(&self) -> PartialChatPrompt {
        PartialChatPrompt {
            template: self.clone(),
            placeholder_to_vals: self.placeholders.iter().map(|p| (p.clone(), None)).collect(),
            unfilled_placeholders: self.placeholders.clone(),
        }
    }

    /// Fill all placeholders from a key-value mapping and complete in one shot.
    /// Returns an error if a key does not name a placeholder or a placeholder is left unfilled.
    pub fn render(&self, values: &HashMap<String, String>) -> anyhow::Result<Vec<Message>> {
        let mut partial_prompt = self.construct_prompt();
        partial_prompt.try_fill_many(values)?;
        let messages = partial_prompt.complete()?;
        Ok(messages)
    }
}

/// A chat template with some placeholders filled. Constructed only via
/// [ChatTemplate::construct_prompt]. Completing produces the concrete message sequence.
#[derive(Debug, Clone)]
#[readonly::make]
pub struct PartialChatPrompt {
    /// The template of the partial prompt, readonly
    pub template: ChatTemplate,

    /// Mapping from placeholder name to its filling value
    pub(crate) placeholder_to_vals: HashMap<String, Option<String>>,

    /// Record the placeholders that are not filled yet
    pub(crate) unfilled_placeholders: HashSet<String>,
}

impl PartialChatPrompt {
    /// Fill a placeholder with the given value. Panics if the placeholder does not exist.
    pub fn fill(&mut self, placeholder: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.try_fill(placeholder, value).unwrap()
    }

    /// Fill a placeholder with the given value.
    /// Returns an error if the placeholder does not exist.
    pub fn try_fill(&mut self, placeholder: impl Into<String>, value: impl Into<String>) -> Result<&mut Self, PlaceholderNotExist> {
        let placeholder = placeholder.into();
        if self.placeholder_to_vals.contains_key(&placeholder) {
            self.unfilled_placeholders.remove(&placeholder);
            self.placeholder_to_vals.insert(placeholder, Some(value.into()));
            Ok(self)
        } else {
            Err(PlaceholderNotExist::new(placeholder, value, &self.template.placeholders))
        }
    }

    /// Fill placeholders from a key-value mapping.
    /// Returns an error on the first key that does not name a placeholder; fills before the failing
    /// key stick.
    pub fn try_fill_many(&mut self, values: &HashMap<String, String>) -> Result<&mut Self, PlaceholderNotExist> {
        for (placeholder, value) in values {
            self.try_fill(placeholder, value)?;
        }
        Ok(self)
    }

    /// Get a [PromptTokenCountCache] that can be used to quickly count the number of tokens in the prompt and cache.
    pub fn with_counter_cache<'a, C: CountToken>(&'a self, counter: &'a C) -> PromptTokenCountCache<'a, C> {
        PromptTokenCountCache::of_chat(self, counter)
    }

    /// Count the number of tokens across all segments without caching. Unfilled placeholders are
    /// counted with the placeholder names.
    pub fn current_token_num(&self, counter: &impl CountToken) -> usize {
        let mapping: HashMap<String, String> = self.placeholder_to_vals.iter()
            .filter_map(|(p, v)| v.as_ref().map(|v| (p.clone(), v.clone())))
            .collect();
        PromptTokenCountCache::of_chat(self, counter).attempt_fill_multiple_and_count(&mapping).unwrap()
    }

    /// Complete the partial chat prompt and return the concrete message sequence.
    /// Returns an error if there are still unfilled placeholders.
    pub fn complete(&self) -> Result<Vec<Message>, UnfilledPlaceholders> {
        if !self.unfilled_placeholders.is_empty() {
            return Err(UnfilledPlaceholders {
                all_placeholders: self.template.placeholders.iter().cloned().collect(),
                unfilled_placeholders: self.unfilled_placeholders.iter().cloned().collect(),
            });
        }
        let messages = self.template.segments.iter()
            .map(|segment| match segment {
                Segment::Literal(msg) => msg.clone(),
                Segment::Templated { role, text } => {
                    let content = unsafe { replace_all_placeholders(text, &self.placeholder_to_vals) };
                    Message::new(*role, content)
                }
            })
            .collect();
        Ok(messages)
    }
}

pub mod errors {
    use std::collections::HashSet;
    use std::error::Error;
    use std::fmt;
    use std::fmt::Formatter;

    /// Error when trying to complete a partial prompt but there are still unfilled placeholders.
    #[derive(Debug)]
    pub struct UnfilledPlaceholders {
        pub unfilled_placeholders: Vec<String>,
        pub all_placeholders: Vec<String>,
    }

    impl fmt::Display for UnfilledPlaceholders {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            write!(f, "UnfilledPlaceholders: to complete the prompt template,\n  Requires Placeholders:{:?}\n  Unfilled Placeholders:{:?}",
                   self.all_placeholders, self.unfilled_placeholders)
        }
    }

    impl Error for UnfilledPlaceholders {}

    /// Error when trying to fill a placeholder that does not exist in the template.
    #[derive(Debug)]
    pub struct PlaceholderNotExist {
        pub try_fill_placeholder: String,
        pub value: String,
        pub available_placeholders: Vec<String>,
    }

    impl PlaceholderNotExist {
        pub(crate) fn new(try_fill_placeholder: impl Into<String>,
                          value: impl Into<String>,
                          available_placeholders: &HashSet<String>) -> Self {
            let available_placeholders = available_placeholders.iter().cloned().collect();
            PlaceholderNotExist {
                try_fill_placeholder: try_fill_placeholder.into(),
                value: value.into(),
                available_placeholders,
            }
        }
    }

    impl fmt::Display for PlaceholderNotExist {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            write!(f, "PlaceholderNotExist: try to fill placeholder = {} with value = {}, but available placeholders are {:?}",
                   self.try_fill_placeholder,
                   self.value,
                   self.available_placeholders)
        }
    }

    impl Error for PlaceholderNotExist {}
}

#[cfg(test)]
mod test_prompt {
    use std::collections::HashMap;

    use crate::message::{Message, Role};
    use super::ChatTemplate;
    use super::PromptTemplate;

    #[test]
    fn test_fill_and_complete() {
        let template = PromptTemplate::new("Tell me {[count]} jokes about {[topic]}.");
        let mut partial_prompt = template.construct_prompt();
        assert!(partial_prompt.complete().is_err());
        partial_prompt.fill("count", "3").fill("topic", "cars");
        assert_eq!(partial_prompt.complete().unwrap(), "Tell me 3 jokes about cars.");
    }

    #[test]
    fn test_refill_overwrites() {
        let template = PromptTemplate::new("Hello, {[name]}!");
        let mut partial_prompt = template.construct_prompt();
        partial_prompt.fill("name", "alice");
        partial_prompt.fill("name", "bob");
        assert_eq!(partial_prompt.complete().unwrap(), "Hello, bob!");
    }

    #[test]
    fn test_fill_unknown_placeholder() {
        let template = PromptTemplate::new("Hello, {[name]}!");
        let mut partial_prompt = template.construct_prompt();
        let err = partial_prompt.try_fill("nmae", "alice").err().unwrap();
        assert_eq!(err.try_fill_placeholder, "nmae");
        assert_eq!(err.available_placeholders, vec!["name".to_string()]);
    }

    #[test]
    fn test_chat_template_render() {
        let template = ChatTemplate::new()
            .system("You are a comedian who tells jokes.")
            .message(Message::human("Hello, Comedian! What is your name?"))
            .message(Message::ai("I am Art the Clown."))
            .human("Now tell me {[joke_count]} jokes about {[joke_topic]}.");
        let values = HashMap::from([
            ("joke_count".to_string(), "3".to_string()),
            ("joke_topic".to_string(), "cars".to_string()),
        ]);
        let messages = template.render(&values).unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], Message::system("You are a comedian who tells jokes."));
        assert_eq!(messages[2].role, Role::Ai);
        assert_eq!(messages[3], Message::human("Now tell me 3 jokes about cars."));
    }

    #[test]
    fn test_chat_template_shared_placeholder() {
        let template = ChatTemplate::new()
            .system("Answer as {[name]}.")
            .human("{[name]}, who are you?");
        assert_eq!(template.placeholders.len(), 1);
        let mut partial_prompt = template.construct_prompt();
        partial_prompt.fill("name", "Marvin");
        let messages = partial_prompt.complete().unwrap();
        assert_eq!(messages[0].content, "Answer as Marvin.");
        assert_eq!(messages[1].content, "Marvin, who are you?");
    }

    #[test]
    fn test_chat_template_literal_untouched() {
        let template = ChatTemplate::new()
            .message(Message::human("this {[slot]} is literal"))
            .human("this {[slot]} is not");
        let values = HashMap::from([("slot".to_string(), "text".to_string())]);
        let messages = template.render(&values).unwrap();
        assert_eq!(messages[0].content, "this {[slot]} is literal");
        assert_eq!(messages[1].content, "this text is not");
    }

    #[test]
    fn test_chat_render_unfilled() {
        let template = ChatTemplate::new().human("Tell me about {[topic]}.");
        let values = HashMap::new();
        assert!(template.render(&values).is_err());
    }
}
