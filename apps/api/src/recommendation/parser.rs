//! Best-effort extraction of a career list from free-form model output.
//!
//! Never fails: the result is either a usable list or `Fallback`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::llm_client::strip_json_fences;

pub const MIN_CAREERS: usize = 3;
pub const MAX_CAREERS: usize = 5;

/// First bracketed literal without nested brackets.
static ARRAY_LITERAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\[\]]*\]").expect("valid array literal regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationParse {
    Parsed(Vec<String>),
    Fallback,
}

pub fn parse_recommendations(text: &str) -> RecommendationParse {
    let text = strip_json_fences(text);
    if text.is_empty() {
        return RecommendationParse::Fallback;
    }

    // A well-formed JSON array is final, even if it turns out unusable.
    if let Ok(careers) = serde_json::from_str::<Vec<String>>(text) {
        return accept(careers);
    }

    let Some(literal) = ARRAY_LITERAL_RE.find(text) else {
        return RecommendationParse::Fallback;
    };
    // Try the literal as written before rewriting single quotes.
    if let Ok(careers) = serde_json::from_str::<Vec<String>>(literal.as_str()) {
        return accept(careers);
    }
    let normalized = literal.as_str().replace('\'', "\"");
    match serde_json::from_str::<Vec<String>>(&normalized) {
        Ok(careers) => accept(careers),
        Err(_) => RecommendationParse::Fallback,
    }
}

/// Trims, drops blanks and duplicates (keeping first occurrence), then enforces
/// the 3–5 bound: too few falls back, too many is cut to the first five.
fn accept(careers: Vec<String>) -> RecommendationParse {
    let mut cleaned: Vec<String> = Vec::with_capacity(careers.len());
    for career in careers {
        let career = career.trim();
        if career.is_empty() || cleaned.iter().any(|c| c.eq_ignore_ascii_case(career)) {
            continue;
        }
        cleaned.push(career.to_string());
    }

    if cleaned.len() < MIN_CAREERS {
        return RecommendationParse::Fallback;
    }
    cleaned.truncate(MAX_CAREERS);
    RecommendationParse::Parsed(cleaned)
}
