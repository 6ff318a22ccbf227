//! Token counting traits and utilities

use std::collections::{HashMap, HashSet};

use crate::prompt::errors::PlaceholderNotExist;
use crate::prompt::{PartialChatPrompt, PartialPrompt};
use crate::utils::prompt_processing::{strip_format, PLACEHOLDER_MATCH_RE};

pub mod tiktoken;

/// Trait for counting tokens in a string.
pub trait CountToken {
    fn count_token(&self, string: &str) -> usize;
}

/// Blanket impl of CountToken for Fn(&str) -> usize.
impl<F> CountToken for F where F: Fn(&str) -> usize {
    fn count_token(&self, string: &str) -> usize {
        self(string)
    }
}

/// Count the number of tokens in a string by the length of the string.
#[inline]
pub fn count_tokens_by_len(string: &str) -> usize {
    string.len()
}

/// Cache for counting tokens in a [PartialPrompt] or a [PartialChatPrompt].
///
/// The template text (all segments, for a chat prompt) is counted once; afterwards, trying a fill
/// value only re-counts that value and the placeholder names it displaces.
#[derive(Debug, Clone)]
#[readonly::make]
pub struct PromptTokenCountCache<'a, C: CountToken> {
    /// The token count of the raw template text. Placeholders are counted with their names, readonly
    pub template_token_count: usize,
    all_placeholders: &'a HashSet<String>,
    placeholder_to_val: &'a HashMap<String, Option<String>>,
    placeholder_occurrence: HashMap<&'a str, usize>,
    placeholder_token_count: HashMap<&'a str, usize>,
    counter: &'a C,
}

impl<'a, C: CountToken> PromptTokenCountCache<'a, C> {
    fn get_placeholder_occurrence(texts: &[&'a str], placeholders: &'a HashSet<String>) -> HashMap<&'a str, usize> {
        let mut count: HashMap<&str, usize> = placeholders.iter().map(|s| (s.as_str(), 0)).collect();
        for text in texts {
            PLACEHOLDER_MATCH_RE
                .captures_iter(text)
                .for_each(|captures| {
                    let placeholder_name = strip_format(&captures[0]);
                    // literal segments are not scanned, so every match is a known placeholder
                    let count = count.get_mut(placeholder_name).unwrap();
                    *count += 1;
                });
        }
        count
    }

    fn build(texts: Vec<&'a str>,
             all_placeholders: &'a HashSet<String>,
             placeholder_to_val: &'a HashMap<String, Option<String>>,
             counter: &'a C) -> Self {
        let template_token_count = texts.iter().map(|text| counter.count_token(text)).sum();
        let placeholder_occurrence = Self::get_placeholder_occurrence(&texts, all_placeholders);
        let placeholder_token_count = all_placeholders.iter()
            .map(|p| (p.as_str(), counter.count_token(p)))
            .collect();
        Self {
            template_token_count,
            all_placeholders,
            placeholder_to_val,
            placeholder_occurrence,
            placeholder_token_count,
            counter,
        }
    }

    /// Create a cache over a single-text [PartialPrompt].
    pub fn of_prompt(partial_prompt: &'a PartialPrompt, counter: &'a C) -> Self {
        Self::build(
            vec![partial_prompt.template.str()],
            &partial_prompt.template.placeholders,
            &partial_prompt.placeholder_to_vals,
            counter,
        )
    }

    /// Create a cache over a [PartialChatPrompt]. All segments are counted, templated segments with
    /// their raw text; literal messages contribute their content but are never scanned for
    /// placeholders.
    pub fn of_chat(partial_chat_prompt: &'a PartialChatPrompt, counter: &'a C) -> Self {
        let (templated, literal): (Vec<_>, Vec<_>) = partial_chat_prompt.template.segments.iter()
            .partition(|segment| matches!(segment, crate::prompt::Segment::Templated { .. }));
        let texts: Vec<&str> = templated.iter().map(|segment| segment.text()).collect();
        let literal_count: usize = literal.iter()
            .map(|segment| counter.count_token(segment.text()))
            .sum();
        let mut cache = Self::build(
            texts,
            &partial_chat_prompt.template.placeholders,
            &partial_chat_prompt.placeholder_to_vals,
            counter,
        );
        cache.template_token_count += literal_count;
        cache
    }

    /// Count the tokens of the prompt as if the placeholder were filled with the given value,
    /// without changing the partial prompt. Unfilled placeholders are counted with their names.
    /// Returns an error if the placeholder does not exist.
    pub fn attempt_fill_and_count(&self, placeholder_name: impl Into<String>, fill_value: impl Into<String>) -> Result<usize, PlaceholderNotExist> {
        let placeholder_name = placeholder_name.into();
        let fill_value = fill_value.into();
        if !self.placeholder_occurrence.contains_key(placeholder_name.as_str()) {
            return Err(PlaceholderNotExist::new(placeholder_name, fill_value, self.all_placeholders));
        }
        let total_delta: isize = self.all_placeholders.iter()
            .map(|placeholder| {
                let placeholder = placeholder.as_str();
                let fill_value = if placeholder == placeholder_name {
                    Some(&fill_value)
                } else {
                    self.placeholder_to_val.get(placeholder).unwrap().as_ref()
                };
                self.placeholder_delta(placeholder, fill_value)
            })
            .sum();
        Ok(self.counted_with_delta(total_delta))
    }

    /// Count the tokens of the prompt as if the placeholders were filled with the given values,
    /// without changing the partial prompt. Unfilled placeholders are counted with their names.
    /// Returns an error if any of the placeholders does not exist.
    pub fn attempt_fill_multiple_and_count(&self, mappings: &HashMap<String, String>) -> Result<usize, PlaceholderNotExist> {
        for (placeholder_to_fill, value) in mappings {
            if !self.all_placeholders.contains(placeholder_to_fill.as_str()) {
                return Err(PlaceholderNotExist::new(placeholder_to_fill, value, self.all_placeholders));
            }
        }
        let total_delta: isize = self.all_placeholders.iter()
            .map(|placeholder| {
                let placeholder = placeholder.as_str();
                let fill_value = mappings.get(placeholder).or(self.placeholder_to_val.get(placeholder).unwrap().as_ref());
                self.placeholder_delta(placeholder, fill_value)
            })
            .sum();
        Ok(self.counted_with_delta(total_delta))
    }

    /// Token delta of replacing every occurrence of the placeholder name with the fill value.
    /// Negative when the value is shorter than the name.
    fn placeholder_delta(&self, placeholder: &str, fill_value: Option<&String>) -> isize {
        // an unfilled placeholder keeps its name in the text, so it contributes no delta
        let Some(fill_value) = fill_value else { return 0 };
        let fill_value_token_count = self.counter.count_token(fill_value);
        let placeholder_token_count = *self.placeholder_token_count.get(placeholder).unwrap();
        let placeholder_occurrence = *self.placeholder_occurrence.get(placeholder).unwrap();
        (fill_value_token_count as isize - placeholder_token_count as isize) * placeholder_occurrence as isize
    }

    fn counted_with_delta(&self, delta: isize) -> usize {
        let counted = self.template_token_count as isize + delta;
        debug_assert!(counted >= 0);
        counted.max(0) as usize
    }
}

#[cfg(test)]
mod test_token {
    use std::collections::HashMap;

    use crate::prompt::{ChatTemplate, PromptTemplate};
    use super::{count_tokens_by_len, CountToken, PromptTokenCountCache};

    #[test]
    fn test_str_len_impl() {
        let counter = str::len;
        let size = counter.count_token("");
        assert_eq!(0, size);
    }

    #[test]
    fn test_attempt_fill_and_count() {
        // "{[a]} and {[b]}" is 15 chars; filling a="alice" (5) displaces the 1-char name
        let template = PromptTemplate::new("{[a]} and {[b]}");
        let partial_prompt = template.construct_prompt();
        let counter = count_tokens_by_len;
        let cache = PromptTokenCountCache::of_prompt(&partial_prompt, &counter);
        assert_eq!(cache.template_token_count, 15);
        assert_eq!(cache.attempt_fill_and_count("a", "alice").unwrap(), 19);
        let err = cache.attempt_fill_and_count("c", "carol");
        assert!(err.is_err());
    }

    #[test]
    fn test_fill_shorter_than_name() {
        let template = PromptTemplate::new("{[greeting]}!");
        let partial_prompt = template.construct_prompt();
        let counter = count_tokens_by_len;
        let cache = PromptTokenCountCache::of_prompt(&partial_prompt, &counter);
        // "{[greeting]}!" is 13 chars; "hi" (2) displaces the 8-char name
        assert_eq!(cache.attempt_fill_and_count("greeting", "hi").unwrap(), 7);
    }

    #[test]
    fn test_chat_prompt_count() {
        let template = ChatTemplate::new()
            .system("sys")
            .human("hi {[name]}");
        let partial_prompt = template.construct_prompt();
        let counter = count_tokens_by_len;
        let cache = PromptTokenCountCache::of_chat(&partial_prompt, &counter);
        // "sys" (3) + "hi {[name]}" (11)
        assert_eq!(cache.template_token_count, 14);
        let mapping = HashMap::from([("name".to_string(), "bob".to_string())]);
        // "{[name]}" (8) replaced by "bob" (3) once
        assert_eq!(cache.attempt_fill_multiple_and_count(&mapping).unwrap(), 9);
    }

    #[test]
    fn test_current_token_num_counts_unfilled_names() {
        let template = ChatTemplate::new().human("{[x]} and {[y]}");
        let mut partial_prompt = template.construct_prompt();
        let counter = count_tokens_by_len;
        assert_eq!(partial_prompt.current_token_num(&counter), 15);
        partial_prompt.fill("x", "alice");
        assert_eq!(partial_prompt.current_token_num(&counter), 19);
    }
}
