//! Merges both analyses into a ranked career list.
//!
//! One generative call per run. The result is either entirely model output or
//! entirely the static fallback list; the two are never mixed.

pub mod parser;
pub mod prompts;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assessment::questions::LikertOption;
use crate::assessment::session::{AppearanceOutcome, PersonalityOutcome};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::TextGenerator;
use parser::{parse_recommendations, RecommendationParse};
use prompts::RECOMMENDATION_PROMPT_TEMPLATE;

pub const FALLBACK_CAREERS: [&str; 4] = [
    "Freelance Writer",
    "UX/UI Designer",
    "Data Analyst",
    "Marketing Consultant",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Ai,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub careers: Vec<String>,
    pub source: RecommendationSource,
}

impl Recommendations {
    pub fn fallback() -> Self {
        Self {
            careers: FALLBACK_CAREERS.iter().map(|c| c.to_string()).collect(),
            source: RecommendationSource::Fallback,
        }
    }
}

impl From<RecommendationParse> for Recommendations {
    fn from(parse: RecommendationParse) -> Self {
        match parse {
            RecommendationParse::Parsed(careers) => Self {
                careers,
                source: RecommendationSource::Ai,
            },
            RecommendationParse::Fallback => Self::fallback(),
        }
    }
}

/// Everything the combiner prompt needs from a finished session.
pub struct CombinerInput<'a> {
    pub personality: &'a PersonalityOutcome,
    pub personality_answers: &'a BTreeMap<String, LikertOption>,
    pub appearance: &'a AppearanceOutcome,
    pub appearance_answers: &'a BTreeMap<String, String>,
}

pub fn build_prompt(input: &CombinerInput<'_>) -> String {
    let prediction = input
        .personality
        .prediction
        .as_deref()
        .unwrap_or("Unavailable");
    let personality_answers = input
        .personality_answers
        .iter()
        .map(|(id, option)| format!("{id}: {}", option.label()))
        .collect::<Vec<_>>()
        .join("\n");
    let appearance_answers = input
        .appearance_answers
        .iter()
        .map(|(id, option)| format!("{id}: {option}"))
        .collect::<Vec<_>>()
        .join("\n");

    RECOMMENDATION_PROMPT_TEMPLATE
        .replace("{personality_prediction}", prediction)
        .replace("{personality_answers}", &personality_answers)
        .replace("{appearance_analysis}", &input.appearance.analysis_or_summary())
        .replace("{appearance_answers}", &appearance_answers)
}

/// Produces the final career list. Infallible by contract.
pub async fn aggregate(llm: &dyn TextGenerator, input: &CombinerInput<'_>) -> Recommendations {
    let prompt = build_prompt(input);

    let text = match llm.generate(&prompt, JSON_ONLY_SYSTEM).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Recommendation call failed, using fallback list: {e}");
            return Recommendations::fallback();
        }
    };

    let recommendations = Recommendations::from(parse_recommendations(&text));
    match recommendations.source {
        RecommendationSource::Ai => info!(
            "Generated {} career recommendations",
            recommendations.careers.len()
        ),
        RecommendationSource::Fallback => {
            warn!("Unusable recommendation output, using fallback list")
        }
    }
    recommendations
}
