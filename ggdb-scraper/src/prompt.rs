//! The host's interactive text prompt.

/// Asks the user for a line of text.
///
/// Returns `Some("")` when the user explicitly skips and `None` when they
/// cancel.
pub trait Prompter {
    fn prompt_text(
        &mut self,
        message: &str,
        default_value: &str,
    ) -> impl Future<Output = Option<String>>;
}

/// A prompt answer, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptReply {
    /// Empty answer: move on without doing anything for this item.
    Skip,
    /// No answer at all: stop asking.
    Cancel,
    Text(String),
}

impl PromptReply {
    pub fn from_answer(answer: Option<String>) -> Self {
        match answer {
            None => Self::Cancel,
            Some(text) => {
                let text = text.trim();
                if text.is_empty() {
                    Self::Skip
                } else {
                    Self::Text(text.to_string())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_answers() {
        assert_eq!(PromptReply::from_answer(None), PromptReply::Cancel);
        assert_eq!(PromptReply::from_answer(Some(String::new())), PromptReply::Skip);
        assert_eq!(PromptReply::from_answer(Some("  ".to_string())), PromptReply::Skip);
        assert_eq!(
            PromptReply::from_answer(Some(" Foo ".to_string())),
            PromptReply::Text("Foo".to_string())
        );
    }
}
