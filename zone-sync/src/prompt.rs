//! User prompts (confirmation dialogs and name input)

use std::collections::VecDeque;

/// Modal prompts shown by the editor
pub trait Prompter {
    /// Yes/no confirmation; `false` when declined
    fn confirm(&mut self, message: &str) -> bool;

    /// Free-text input pre-filled with `default`; `None` when cancelled
    fn prompt(&mut self, message: &str, default: &str) -> Option<String>;
}

/// A scripted answer for [`ScriptedPrompter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Confirm(bool),
    /// `None` cancels the prompt
    Text(Option<String>),
    /// Accept the pre-filled default
    Default,
}

/// Prompter that replays queued answers
///
/// Prompts with nothing queued are declined/cancelled. Every question asked
/// is kept for assertions.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answers(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    pub fn push(&mut self, answer: Answer) {
        self.answers.push_back(answer);
    }

    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, message: &str) -> bool {
        self.asked.push(message.to_string());
        matches!(self.answers.pop_front(), Some(Answer::Confirm(true)))
    }

    fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
        self.asked.push(message.to_string());
        match self.answers.pop_front() {
            Some(Answer::Text(text)) => text,
            Some(Answer::Default) => Some(default.to_string()),
            _ => None,
        }
    }
}
