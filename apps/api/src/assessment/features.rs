//! Numeric and categorical summaries of answer records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assessment::questions::{LikertOption, APPEARANCE_QUIZ};

pub const FEATURE_LEN: usize = 5;

/// Share of answers falling into each Likert bucket, `Disagree` first.
/// Sums to 1.0 once any question has been answered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(pub [f64; FEATURE_LEN]);

impl FeatureVector {
    pub fn from_answers(answers: &BTreeMap<String, LikertOption>) -> Self {
        let mut counts = [0usize; FEATURE_LEN];
        for option in answers.values() {
            counts[option.bucket()] += 1;
        }
        let answered = answers.len();
        if answered == 0 {
            return FeatureVector([0.0; FEATURE_LEN]);
        }
        FeatureVector(counts.map(|c| c as f64 / answered as f64))
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dosha {
    Vata,
    Pitta,
    Kapha,
}

impl Dosha {
    pub const ALL: [Dosha; 3] = [Dosha::Vata, Dosha::Pitta, Dosha::Kapha];

    /// Appearance-quiz options map positionally onto doshas.
    pub fn from_option_index(index: usize) -> Option<Dosha> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Dosha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dosha::Vata => "Vata",
            Dosha::Pitta => "Pitta",
            Dosha::Kapha => "Kapha",
        };
        f.write_str(name)
    }
}

/// Per-dosha answer counts for the appearance quiz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoshaTally {
    pub vata: usize,
    pub pitta: usize,
    pub kapha: usize,
}

impl DoshaTally {
    /// Answers that do not resolve to a known question/option are skipped;
    /// the session only ever stores validated options.
    pub fn from_answers(answers: &BTreeMap<String, String>) -> Self {
        let mut tally = DoshaTally::default();
        for (question_id, option) in answers {
            let dosha = APPEARANCE_QUIZ
                .find(question_id)
                .and_then(|q| q.option_index(option))
                .and_then(Dosha::from_option_index);
            match dosha {
                Some(Dosha::Vata) => tally.vata += 1,
                Some(Dosha::Pitta) => tally.pitta += 1,
                Some(Dosha::Kapha) => tally.kapha += 1,
                None => {}
            }
        }
        tally
    }

    pub fn count(&self, dosha: Dosha) -> usize {
        match dosha {
            Dosha::Vata => self.vata,
            Dosha::Pitta => self.pitta,
            Dosha::Kapha => self.kapha,
        }
    }

    pub fn total(&self) -> usize {
        self.vata + self.pitta + self.kapha
    }

    /// Every dosha tied for the highest count, in Vata/Pitta/Kapha order.
    /// Empty when nothing has been answered.
    pub fn dominant(&self) -> Vec<Dosha> {
        let max = Dosha::ALL.iter().map(|d| self.count(*d)).max().unwrap_or(0);
        if max == 0 {
            return Vec::new();
        }
        Dosha::ALL
            .into_iter()
            .filter(|d| self.count(*d) == max)
            .collect()
    }

    /// Deterministic one-line summary, used in prompts and when the narrative
    /// analysis is unavailable.
    pub fn summary(&self) -> String {
        let dominant = self.dominant();
        if dominant.is_empty() {
            return "No constitution answers recorded".to_string();
        }
        let label = dominant
            .iter()
            .map(Dosha::to_string)
            .collect::<Vec<_>>()
            .join("-");
        format!(
            "{label} dominant (Vata {}, Pitta {}, Kapha {} of {} answers)",
            self.vata,
            self.pitta,
            self.kapha,
            self.total()
        )
    }
}
