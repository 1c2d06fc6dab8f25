//! Scripted confirmation for testing

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::input::{Confirmer, Result};

/// Confirmer that replays predetermined answers
///
/// Answers are consumed in order; once exhausted, `fallback` is returned.
/// Every prompt shown is recorded.
#[derive(Debug, Default)]
pub struct ScriptedConfirmer {
    answers: Mutex<VecDeque<bool>>,
    prompts: Mutex<Vec<String>>,
    fallback: bool,
}

impl ScriptedConfirmer {
    #[must_use]
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
            fallback: false,
        }
    }

    /// Confirmer that always answers `answer`
    #[must_use]
    pub fn always(answer: bool) -> Self {
        Self {
            fallback: answer,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, prompt: &str) -> Result<bool> {
        self.prompts.lock().push(prompt.to_string());
        Ok(self.answers.lock().pop_front().unwrap_or(self.fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_answers_then_fallback() {
        let confirmer = ScriptedConfirmer::new([true, false]);

        assert!(confirmer.confirm("first").await.unwrap());
        assert!(!confirmer.confirm("second").await.unwrap());
        assert!(!confirmer.confirm("third").await.unwrap());
        assert_eq!(confirmer.prompts(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_always() {
        let confirmer = ScriptedConfirmer::always(true);
        assert!(confirmer.confirm("anything").await.unwrap());
    }
}
