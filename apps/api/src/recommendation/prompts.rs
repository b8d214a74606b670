// Combiner prompt for the Recommendation Aggregator.

pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"A student completed two self-assessments. Recommend career paths that fit both.

PERSONALITY CLASSIFICATION:
{personality_prediction}

PERSONALITY ANSWERS (statement id → agreement):
{personality_answers}

CONSTITUTION ANALYSIS:
{appearance_analysis}

CONSTITUTION ANSWERS (question id → chosen option):
{appearance_answers}

RULES:
1. Return between 3 and 5 distinct career path names, best fit first.
2. Each entry is a short job title, e.g. "Data Analyst", with no descriptions.
3. Respond with ONLY a JSON array of strings, for example ["Career A", "Career B", "Career C"].
4. No code fences, no explanations, no text before or after the array."#;
