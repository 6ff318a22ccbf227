//! String post-processors for model replies.

/// Strips surrounding whitespace, including the trailing newline most chat models emit.
pub fn trim_reply(string: impl Into<String>) -> String {
    string.into().trim().to_string()
}

/// Splits a comma-separated reply into trimmed, non-empty items. Useful after prompting a model
/// for "a comma-separated list of ...".
pub fn split_comma_list(string: impl Into<String>) -> Vec<String> {
    string.into()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod test_string {
    use super::{split_comma_list, trim_reply};

    #[test]
    fn test_trim_reply() {
        assert_eq!(trim_reply("  an answer \n"), "an answer");
    }

    #[test]
    fn test_split_comma_list() {
        let items = split_comma_list("red, green,blue, ");
        assert_eq!(items, vec!["red", "green", "blue"]);
        assert!(split_comma_list("  ").is_empty());
    }
}
