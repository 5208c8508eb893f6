//! Prompt construction.

use super::error::{ChatError, ChatResult};

/// Separator between the table summary and the user text.
const SUMMARY_SEPARATOR: &str = "\n\n";

/// Reject empty or whitespace-only input.
///
/// The text is returned untouched; no trimming is applied to what the model
/// receives.
///
/// # Errors
/// Returns [`ChatError::EmptyInput`] when `text` has no visible characters.
pub fn validate_input(text: &str) -> ChatResult<&str> {
    if text.trim().is_empty() {
        return Err(ChatError::EmptyInput);
    }
    Ok(text)
}

/// Build the prompt sent to the model: the table summary (if any), a blank
/// line, then the user text verbatim.
#[must_use]
pub fn build_prompt(user_text: &str, table_summary: Option<&str>) -> String {
    table_summary.map_or_else(
        || user_text.to_string(),
        |summary| {
            let mut out =
                String::with_capacity(summary.len() + SUMMARY_SEPARATOR.len() + user_text.len());
            out.push_str(summary);
            out.push_str(SUMMARY_SEPARATOR);
            out.push_str(user_text);
            out
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_without_summary() {
        assert_eq!(build_prompt("What is X?", None), "What is X?");
    }

    #[test]
    fn test_prompt_with_summary() {
        let prompt = build_prompt("What is X?", Some("rows=3"));
        assert!(prompt.starts_with("rows=3"));
        assert!(prompt.ends_with("What is X?"));
        assert_eq!(prompt.len(), "rows=3".len() + 2 + "What is X?".len());
        assert_eq!(prompt, "rows=3\n\nWhat is X?");
    }

    #[test]
    fn test_prompt_keeps_user_text_verbatim() {
        let text = "  <b>keep</b> & spaces  ";
        assert_eq!(build_prompt(text, None), text);
    }

    #[test]
    fn test_validate_rejects_blank() {
        assert!(matches!(validate_input(""), Err(ChatError::EmptyInput)));
        assert!(matches!(validate_input(" \n\t "), Err(ChatError::EmptyInput)));
        assert_eq!(validate_input(" hi ").unwrap_or_default(), " hi ");
    }
}
