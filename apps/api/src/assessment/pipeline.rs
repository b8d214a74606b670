//! Inference-backed stage completions.
//!
//! Each stage makes exactly one call to its backend. Failures are logged and
//! folded into the session as a missing analysis; they never stop the run.

use tracing::{info, warn};

use crate::assessment::classifier::CareerClassifier;
use crate::assessment::features::{DoshaTally, FeatureVector};
use crate::assessment::prompts::{CONSTITUTION_PROMPT_TEMPLATE, CONSTITUTION_SYSTEM};
use crate::assessment::questions::QuizKind;
use crate::assessment::session::{
    AppearanceOutcome, AssessmentSession, PersonalityOutcome, TransitionError,
};
use crate::llm_client::prompts::STUDENT_AUDIENCE;
use crate::llm_client::TextGenerator;
use crate::recommendation::{aggregate, CombinerInput};

/// Quiz 1 submit: answers → feature vector → classifier label.
pub async fn submit_personality(
    session: &mut AssessmentSession,
    classifier: &dyn CareerClassifier,
) -> Result<(), TransitionError> {
    session.check_submittable(QuizKind::Personality)?;

    let feature_vector = FeatureVector::from_answers(&session.personality.answers);
    let prediction = match classifier.classify(&feature_vector).await {
        Ok(label) => {
            info!("Session {} classified as '{label}'", session.id);
            Some(label)
        }
        Err(e) => {
            warn!("Career classification failed for session {}: {e}", session.id);
            None
        }
    };

    session.complete_personality(PersonalityOutcome {
        feature_vector,
        prediction,
    })
}

pub fn build_constitution_prompt(session: &AssessmentSession, tally: &DoshaTally) -> String {
    let bank = QuizKind::Appearance.bank();
    let answers = bank
        .questions()
        .filter_map(|q| {
            session
                .appearance
                .answers
                .get(q.id)
                .map(|option| format!("- {} → {option}", q.prompt))
        })
        .collect::<Vec<_>>()
        .join("\n");

    CONSTITUTION_PROMPT_TEMPLATE
        .replace("{answers}", &answers)
        .replace("{tally}", &tally.summary())
        .replace("{audience}", STUDENT_AUDIENCE)
}

/// Quiz 2 submit: raw answers → narrative dosha analysis.
pub async fn submit_appearance(
    session: &mut AssessmentSession,
    llm: &dyn TextGenerator,
) -> Result<(), TransitionError> {
    session.check_submittable(QuizKind::Appearance)?;

    let tally = DoshaTally::from_answers(&session.appearance.answers);
    let prompt = build_constitution_prompt(session, &tally);
    let analysis = match llm.generate(&prompt, CONSTITUTION_SYSTEM).await {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("Constitution analysis failed for session {}: {e}", session.id);
            None
        }
    };

    session.complete_appearance(AppearanceOutcome { tally, analysis })
}

/// Combiner step: both analyses and answer records → career list.
pub async fn generate_recommendations(
    session: &mut AssessmentSession,
    llm: &dyn TextGenerator,
) -> Result<(), TransitionError> {
    let (personality, appearance) = session.completed_outcomes()?;
    let recommendations = aggregate(
        llm,
        &CombinerInput {
            personality,
            personality_answers: &session.personality.answers,
            appearance,
            appearance_answers: &session.appearance.answers,
        },
    )
    .await;

    session.complete_recommendations(recommendations)
}
