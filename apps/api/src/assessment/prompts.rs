// Appearance-quiz analysis prompt.

pub const CONSTITUTION_SYSTEM: &str = "\
You are a wellness guide who explains Ayurvedic body constitution (dosha) in simple terms. \
You describe tendencies, never diagnoses.";

pub const CONSTITUTION_PROMPT_TEMPLATE: &str = r#"A student answered a 30-question body and habits questionnaire.
Each answer leans towards Vata, Pitta or Kapha.

ANSWERS (question → chosen option):
{answers}

ANSWER TALLY:
{tally}

Write a short analysis (at most 150 words) that:
1. Names the dominant dosha, or the dual dosha if two are tied.
2. Describes the personality and working-style tendencies of that constitution.
3. Mentions the kinds of work environments where such a person tends to thrive.

{audience}"#;
