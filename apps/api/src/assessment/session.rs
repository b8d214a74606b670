//! The assessment state machine.
//!
//! `NotStarted → Quiz1InProgress → Quiz1Complete → Quiz2InProgress → Quiz2Complete
//! → RecommendationsReady`. Every transition checks the state it starts from and
//! the typed data it needs from earlier stages. There is no failure state:
//! inference problems are absorbed into the outcomes as missing analyses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::assessment::cursor::QuizCursor;
use crate::assessment::features::{DoshaTally, FeatureVector};
use crate::assessment::questions::{LikertOption, Question, QuestionBank, QuizKind};
use crate::recommendation::Recommendations;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    NotStarted,
    Quiz1InProgress,
    Quiz1Complete,
    Quiz2InProgress,
    Quiz2Complete,
    RecommendationsReady,
}

#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("cannot {action} while the assessment is {actual:?}")]
    WrongState {
        action: &'static str,
        actual: PipelineState,
    },

    #[error("the {0} stage has not been completed")]
    MissingStage(&'static str),

    #[error("'{option}' is not an option for question {question}")]
    InvalidOption { question: String, option: String },

    #[error("answer the final question before submitting")]
    NotAtLastQuestion,

    #[error("{answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },
}

/// Cursor plus the answer record for one quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizProgress<A> {
    pub cursor: QuizCursor,
    pub answers: BTreeMap<String, A>,
}

impl<A> Default for QuizProgress<A> {
    fn default() -> Self {
        Self {
            cursor: QuizCursor::default(),
            answers: BTreeMap::new(),
        }
    }
}

impl<A> QuizProgress<A> {
    fn is_complete(&self, bank: &QuestionBank) -> bool {
        bank.questions().all(|q| self.answers.contains_key(q.id))
    }

    fn check_submittable(&self, bank: &QuestionBank) -> Result<(), TransitionError> {
        if !self.cursor.is_last(bank) {
            return Err(TransitionError::NotAtLastQuestion);
        }
        if !self.is_complete(bank) {
            return Err(TransitionError::Incomplete {
                answered: self.answers.len(),
                total: bank.total(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityOutcome {
    pub feature_vector: FeatureVector,
    /// Classifier label; `None` when the classifier call failed.
    pub prediction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppearanceOutcome {
    pub tally: DoshaTally,
    /// Narrative from the generative backend; `None` when that call failed.
    pub analysis: Option<String>,
}

impl AppearanceOutcome {
    pub fn analysis_or_summary(&self) -> String {
        self.analysis
            .clone()
            .unwrap_or_else(|| self.tally.summary())
    }
}

/// One assessment run, persisted in the continuation store between requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSession {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub state: PipelineState,
    pub personality: QuizProgress<LikertOption>,
    pub personality_outcome: Option<PersonalityOutcome>,
    pub appearance: QuizProgress<String>,
    pub appearance_outcome: Option<AppearanceOutcome>,
    pub recommendations: Option<Recommendations>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssessmentSession {
    pub fn new(owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            state: PipelineState::NotStarted,
            personality: QuizProgress::default(),
            personality_outcome: None,
            appearance: QuizProgress::default(),
            appearance_outcome: None,
            recommendations: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn expect_state(
        &self,
        expected: PipelineState,
        action: &'static str,
    ) -> Result<(), TransitionError> {
        if self.state != expected {
            return Err(TransitionError::WrongState {
                action,
                actual: self.state,
            });
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn start(&mut self, kind: QuizKind) -> Result<(), TransitionError> {
        match kind {
            QuizKind::Personality => {
                self.expect_state(PipelineState::NotStarted, "start the personality quiz")?;
                self.state = PipelineState::Quiz1InProgress;
            }
            QuizKind::Appearance => {
                self.expect_state(PipelineState::Quiz1Complete, "start the appearance quiz")?;
                if self.personality_outcome.is_none() {
                    return Err(TransitionError::MissingStage("personality"));
                }
                self.state = PipelineState::Quiz2InProgress;
            }
        }
        self.touch();
        Ok(())
    }

    /// Records `option` for the current question and auto-advances, except on
    /// the last question where the user has to submit explicitly.
    pub fn answer(&mut self, kind: QuizKind, option: &str) -> Result<(), TransitionError> {
        self.enter_in_progress(kind, "answer")?;
        let bank = kind.bank();
        match kind {
            QuizKind::Personality => {
                let question = current_question(&self.personality.cursor, bank)?;
                let choice = LikertOption::from_label(option)
                    .ok_or_else(|| invalid_option(question, option))?;
                record(&mut self.personality, bank, question, choice);
            }
            QuizKind::Appearance => {
                let question = current_question(&self.appearance.cursor, bank)?;
                if question.option_index(option).is_none() {
                    return Err(invalid_option(question, option));
                }
                record(&mut self.appearance, bank, question, option.to_string());
            }
        }
        self.touch();
        Ok(())
    }

    /// Steps back one question. Returns `false` (and changes nothing) at the
    /// first question of the first step.
    pub fn previous(&mut self, kind: QuizKind) -> Result<bool, TransitionError> {
        self.expect_in_progress(kind, "go back")?;
        let bank = kind.bank();
        let moved = match kind {
            QuizKind::Personality => self.personality.cursor.back(bank),
            QuizKind::Appearance => self.appearance.cursor.back(bank),
        };
        if moved {
            self.touch();
        }
        Ok(moved)
    }

    /// Validates that `kind` can be submitted right now.
    pub fn check_submittable(&self, kind: QuizKind) -> Result<(), TransitionError> {
        self.expect_in_progress(kind, "submit")?;
        match kind {
            QuizKind::Personality => self.personality.check_submittable(kind.bank()),
            QuizKind::Appearance => self.appearance.check_submittable(kind.bank()),
        }
    }

    pub fn complete_personality(
        &mut self,
        outcome: PersonalityOutcome,
    ) -> Result<(), TransitionError> {
        self.check_submittable(QuizKind::Personality)?;
        self.personality_outcome = Some(outcome);
        self.state = PipelineState::Quiz1Complete;
        self.touch();
        Ok(())
    }

    pub fn complete_appearance(
        &mut self,
        outcome: AppearanceOutcome,
    ) -> Result<(), TransitionError> {
        self.check_submittable(QuizKind::Appearance)?;
        self.appearance_outcome = Some(outcome);
        self.state = PipelineState::Quiz2Complete;
        self.touch();
        Ok(())
    }

    /// Both analyses, required before recommendations can be generated.
    pub fn completed_outcomes(
        &self,
    ) -> Result<(&PersonalityOutcome, &AppearanceOutcome), TransitionError> {
        self.expect_state(PipelineState::Quiz2Complete, "generate recommendations")?;
        let personality = self
            .personality_outcome
            .as_ref()
            .ok_or(TransitionError::MissingStage("personality"))?;
        let appearance = self
            .appearance_outcome
            .as_ref()
            .ok_or(TransitionError::MissingStage("appearance"))?;
        Ok((personality, appearance))
    }

    /// Final transition. The answer records have been consumed by the combiner
    /// and are dropped; outcomes and recommendations remain for the view.
    pub fn complete_recommendations(
        &mut self,
        recommendations: Recommendations,
    ) -> Result<(), TransitionError> {
        self.completed_outcomes()?;
        self.personality.answers.clear();
        self.appearance.answers.clear();
        self.recommendations = Some(recommendations);
        self.state = PipelineState::RecommendationsReady;
        self.touch();
        Ok(())
    }

    fn in_progress_state(kind: QuizKind) -> PipelineState {
        match kind {
            QuizKind::Personality => PipelineState::Quiz1InProgress,
            QuizKind::Appearance => PipelineState::Quiz2InProgress,
        }
    }

    fn expect_in_progress(&self, kind: QuizKind, action: &'static str) -> Result<(), TransitionError> {
        self.expect_state(Self::in_progress_state(kind), action)
    }

    /// Like `expect_in_progress`, but moves a finished personality stage into
    /// the appearance quiz when its data is present.
    fn enter_in_progress(&mut self, kind: QuizKind, action: &'static str) -> Result<(), TransitionError> {
        if kind == QuizKind::Appearance
            && self.state == PipelineState::Quiz1Complete
            && self.personality_outcome.is_some()
        {
            self.start(QuizKind::Appearance)?;
        }
        self.expect_in_progress(kind, action)
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            state: self.state,
            personality: quiz_view(
                &self.personality,
                QuizKind::Personality,
                self.state == PipelineState::Quiz1InProgress,
            ),
            appearance: quiz_view(
                &self.appearance,
                QuizKind::Appearance,
                self.state == PipelineState::Quiz2InProgress,
            ),
            personality_prediction: self
                .personality_outcome
                .as_ref()
                .and_then(|o| o.prediction.clone()),
            appearance_analysis: self
                .appearance_outcome
                .as_ref()
                .map(AppearanceOutcome::analysis_or_summary),
            recommendations: self.recommendations.clone(),
            updated_at: self.updated_at,
        }
    }
}

fn current_question(
    cursor: &QuizCursor,
    bank: &QuestionBank,
) -> Result<&'static Question, TransitionError> {
    // The cursor only moves through `advance`/`back`, so it always points at a question.
    cursor.question(bank).ok_or(TransitionError::Incomplete {
        answered: 0,
        total: bank.total(),
    })
}

fn invalid_option(question: &Question, option: &str) -> TransitionError {
    TransitionError::InvalidOption {
        question: question.id.to_string(),
        option: option.to_string(),
    }
}

fn record<A>(progress: &mut QuizProgress<A>, bank: &QuestionBank, question: &Question, answer: A) {
    progress.answers.insert(question.id.to_string(), answer);
    progress.cursor.advance(bank);
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: &'static str,
    pub prompt: &'static str,
    pub options: &'static [&'static str],
    pub step: usize,
    pub step_title: &'static str,
    pub selected: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizView {
    pub kind: QuizKind,
    pub active: bool,
    pub current_question: Option<QuestionView>,
    pub global_index: usize,
    pub total: usize,
    pub answered: usize,
    pub progress_percent: f64,
    pub can_go_back: bool,
    pub can_submit: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub state: PipelineState,
    pub personality: QuizView,
    pub appearance: QuizView,
    pub personality_prediction: Option<String>,
    pub appearance_analysis: Option<String>,
    pub recommendations: Option<Recommendations>,
    pub updated_at: DateTime<Utc>,
}

trait AnswerLabel {
    fn label(&self) -> String;
}

impl AnswerLabel for LikertOption {
    fn label(&self) -> String {
        LikertOption::label(*self).to_string()
    }
}

impl AnswerLabel for String {
    fn label(&self) -> String {
        self.clone()
    }
}

fn quiz_view<A: AnswerLabel>(progress: &QuizProgress<A>, kind: QuizKind, active: bool) -> QuizView {
    let bank = kind.bank();
    let cursor = progress.cursor;
    let global_index = cursor.global_index(bank);
    let current_question = active
        .then(|| cursor.question(bank))
        .flatten()
        .map(|q| QuestionView {
            id: q.id,
            prompt: q.prompt,
            options: q.options,
            step: cursor.step,
            step_title: bank.steps[cursor.step].title,
            selected: progress.answers.get(q.id).map(|a| a.label()),
        });

    QuizView {
        kind,
        active,
        current_question,
        global_index,
        total: bank.total(),
        answered: progress.answers.len(),
        progress_percent: cursor.progress_percent(bank),
        can_go_back: active && !cursor.is_first(),
        can_submit: active && progress.check_submittable(bank).is_ok(),
    }
}
