//! Position within a stepped question bank.

use serde::{Deserialize, Serialize};

use crate::assessment::questions::{Question, QuestionBank};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizCursor {
    pub step: usize,
    pub position: usize,
}

impl QuizCursor {
    /// Zero-based index across all steps.
    pub fn global_index(&self, bank: &QuestionBank) -> usize {
        let before: usize = bank
            .steps
            .iter()
            .take(self.step)
            .map(|s| s.questions.len())
            .sum();
        before + self.position
    }

    pub fn question(&self, bank: &QuestionBank) -> Option<&'static Question> {
        bank.question(self.step, self.position)
    }

    pub fn is_first(&self) -> bool {
        self.step == 0 && self.position == 0
    }

    pub fn is_last(&self, bank: &QuestionBank) -> bool {
        self.global_index(bank) + 1 >= bank.total()
    }

    /// Moves to the next question, rolling into the next step when needed.
    /// Never moves past the last question; returns whether the cursor moved.
    pub fn advance(&mut self, bank: &QuestionBank) -> bool {
        if self.is_last(bank) {
            return false;
        }
        let step_len = bank.steps[self.step].questions.len();
        if self.position + 1 < step_len {
            self.position += 1;
        } else {
            self.step += 1;
            self.position = 0;
        }
        true
    }

    /// Moves to the previous question, crossing back into the previous step's
    /// last question when at a step's first question. No-op at the very start.
    pub fn back(&mut self, bank: &QuestionBank) -> bool {
        if self.position > 0 {
            self.position -= 1;
            return true;
        }
        if self.step == 0 {
            return false;
        }
        self.step -= 1;
        self.position = bank.steps[self.step].questions.len().saturating_sub(1);
        true
    }

    /// `(global index + 1) / total`, as 0–100.
    pub fn progress_percent(&self, bank: &QuestionBank) -> f64 {
        let total = bank.total();
        if total == 0 {
            return 0.0;
        }
        (self.global_index(bank) + 1) as f64 / total as f64 * 100.0
    }
}
