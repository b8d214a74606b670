//! Fixed question banks for both quizzes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizKind {
    /// Trait-based Likert quiz, feeds the career classifier.
    Personality,
    /// Attribute-based constitution quiz, feeds the narrative analysis.
    Appearance,
}

impl QuizKind {
    pub fn bank(self) -> &'static QuestionBank {
        match self {
            QuizKind::Personality => &PERSONALITY_QUIZ,
            QuizKind::Appearance => &APPEARANCE_QUIZ,
        }
    }
}

/// Five-point agreement scale. The discriminant is the feature-vector bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LikertOption {
    #[serde(rename = "Disagree")]
    Disagree = 0,
    #[serde(rename = "Slightly Disagree")]
    SlightlyDisagree = 1,
    #[serde(rename = "Neutral")]
    Neutral = 2,
    #[serde(rename = "Slightly Agree")]
    SlightlyAgree = 3,
    #[serde(rename = "Agree")]
    Agree = 4,
}

impl LikertOption {
    pub const ALL: [LikertOption; 5] = [
        LikertOption::Disagree,
        LikertOption::SlightlyDisagree,
        LikertOption::Neutral,
        LikertOption::SlightlyAgree,
        LikertOption::Agree,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LikertOption::Disagree => "Disagree",
            LikertOption::SlightlyDisagree => "Slightly Disagree",
            LikertOption::Neutral => "Neutral",
            LikertOption::SlightlyAgree => "Slightly Agree",
            LikertOption::Agree => "Agree",
        }
    }

    /// Only the five canonical labels are accepted; anything else is rejected
    /// rather than mapped to a guessed bucket.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.label() == label)
    }

    pub fn bucket(self) -> usize {
        self as usize
    }
}

const LIKERT_LABELS: &[&str] = &[
    "Disagree",
    "Slightly Disagree",
    "Neutral",
    "Slightly Agree",
    "Agree",
];

#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: &'static str,
    pub prompt: &'static str,
    pub options: &'static [&'static str],
}

impl Question {
    pub fn option_index(&self, option: &str) -> Option<usize> {
        self.options.iter().position(|o| *o == option)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Step {
    pub title: &'static str,
    pub questions: &'static [Question],
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionBank {
    pub kind: QuizKind,
    pub steps: &'static [Step],
}

impl QuestionBank {
    pub fn total(&self) -> usize {
        self.steps.iter().map(|s| s.questions.len()).sum()
    }

    pub fn questions(&self) -> impl Iterator<Item = &'static Question> {
        self.steps.iter().flat_map(|s| s.questions.iter())
    }

    pub fn question(&self, step: usize, position: usize) -> Option<&'static Question> {
        self.steps.get(step).and_then(|s| s.questions.get(position))
    }

    pub fn find(&self, id: &str) -> Option<&'static Question> {
        self.questions().find(|q| q.id == id)
    }
}

macro_rules! likert {
    ($id:literal, $prompt:literal) => {
        Question {
            id: $id,
            prompt: $prompt,
            options: LIKERT_LABELS,
        }
    };
}

pub static PERSONALITY_QUIZ: QuestionBank = QuestionBank {
    kind: QuizKind::Personality,
    steps: &[
        Step {
            title: "How you recharge",
            questions: &[
                likert!("Q1", "I feel energised after spending time with a large group of people."),
                likert!("Q2", "I enjoy being the one who starts conversations with strangers."),
                likert!("Q3", "I prefer working in a team over working alone."),
                likert!("Q4", "I like presenting my ideas in front of a class or audience."),
                likert!("Q5", "I make new friends easily when I join a new place."),
            ],
        },
        Step {
            title: "How you work",
            questions: &[
                likert!("Q6", "I plan my tasks in advance instead of doing them at the last minute."),
                likert!("Q7", "I pay close attention to small details in my work."),
                likert!("Q8", "I stay calm and focused when a deadline is close."),
                likert!("Q9", "I like following a clear set of rules and procedures."),
                likert!("Q10", "I finish what I start even when it becomes boring."),
            ],
        },
        Step {
            title: "What draws you in",
            questions: &[
                likert!("Q11", "I enjoy solving puzzles, maths problems or logic games."),
                likert!("Q12", "I often come up with creative or unusual ideas."),
                likert!("Q13", "I want my work to directly help other people."),
                likert!("Q14", "I am curious about how machines, computers or gadgets work."),
                likert!("Q15", "I enjoy drawing, writing, music or other forms of self-expression."),
            ],
        },
    ],
};

macro_rules! trait_question {
    ($id:literal, $prompt:literal, [$vata:literal, $pitta:literal, $kapha:literal]) => {
        Question {
            id: $id,
            prompt: $prompt,
            options: &[$vata, $pitta, $kapha],
        }
    };
}

/// Option order is significant: index 0 → Vata, 1 → Pitta, 2 → Kapha.
pub static APPEARANCE_QUIZ: QuestionBank = QuestionBank {
    kind: QuizKind::Appearance,
    steps: &[Step {
        title: "Body and habits",
        questions: &[
            trait_question!("A1", "How would you describe your body frame?", ["Thin and light", "Medium and athletic", "Broad and sturdy"]),
            trait_question!("A2", "How does your body weight usually behave?", ["Hard to gain weight", "Gain and lose easily", "Gain easily, lose slowly"]),
            trait_question!("A3", "What is your skin usually like?", ["Dry and rough", "Warm, oily or prone to redness", "Smooth, moist and cool"]),
            trait_question!("A4", "How would you describe your hair?", ["Dry, frizzy or thin", "Fine, straight, early greying", "Thick, wavy and lustrous"]),
            trait_question!("A5", "What are your eyes like?", ["Small and active", "Sharp and penetrating", "Large and calm"]),
            trait_question!("A6", "How are your teeth and gums?", ["Irregular teeth, receding gums", "Medium teeth, gums bleed easily", "Strong, white, even teeth"]),
            trait_question!("A7", "How are your hands and feet to the touch?", ["Usually cold", "Usually warm", "Cool and slightly damp"]),
            trait_question!("A8", "How is your appetite?", ["Irregular, sometimes forget to eat", "Strong, irritable when hungry", "Steady, can skip meals easily"]),
            trait_question!("A9", "How quickly do you digest food?", ["Variable, often bloated", "Fast, get hungry soon", "Slow, feel full for long"]),
            trait_question!("A10", "Which tastes do you crave most?", ["Sweet, sour and salty", "Sweet, bitter and cool foods", "Spicy, bitter and light foods"]),
            trait_question!("A11", "How much do you usually drink?", ["Varies a lot", "Drink a lot, often thirsty", "Rarely feel thirsty"]),
            trait_question!("A12", "How do you sleep?", ["Light, easily disturbed", "Moderate and sound", "Deep and long"]),
            trait_question!("A13", "What do you usually dream about?", ["Flying, running, anxious dreams", "Fiery, competitive or vivid dreams", "Calm, watery or romantic dreams"]),
            trait_question!("A14", "Which weather makes you uncomfortable?", ["Cold and windy", "Hot and sunny", "Cold and damp"]),
            trait_question!("A15", "How is your physical energy through the day?", ["Comes in bursts", "Strong and focused", "Steady and enduring"]),
            trait_question!("A16", "How fast do you usually walk?", ["Quick and light", "Purposeful and determined", "Slow and steady"]),
            trait_question!("A17", "How do you usually speak?", ["Fast and talkative", "Sharp, precise and convincing", "Slow, calm and soft"]),
            trait_question!("A18", "How do you learn new things?", ["Quickly, but forget quickly", "Focused, clear understanding", "Slowly, but remember for long"]),
            trait_question!("A19", "How is your memory?", ["Good short-term memory", "Sharp and clear memory", "Excellent long-term memory"]),
            trait_question!("A20", "How do you react under stress?", ["Anxious or worried", "Irritable or angry", "Withdrawn or calm"]),
            trait_question!("A21", "How do you make decisions?", ["Change my mind often", "Decide quickly and firmly", "Take my time, then stick to it"]),
            trait_question!("A22", "How do you handle money?", ["Spend impulsively", "Spend on planned goals", "Save and spend carefully"]),
            trait_question!("A23", "What best describes your mood?", ["Changes quickly", "Intense and driven", "Stable and easy-going"]),
            trait_question!("A24", "How do you handle a new routine?", ["Get bored of routine easily", "Like routines I set myself", "Prefer a fixed, familiar routine"]),
            trait_question!("A25", "How do you work on a project?", ["Many ideas, hard to finish", "Organised and goal-driven", "Steady and methodical"]),
            trait_question!("A26", "How do you behave in a group?", ["Enthusiastic and chatty", "Natural leader, competitive", "Supportive and loyal"]),
            trait_question!("A27", "How is your body temperature?", ["Often feel cold", "Often feel hot or sweaty", "Comfortable, slightly cool"]),
            trait_question!("A28", "How are your nails?", ["Dry, brittle or ridged", "Soft, pink and flexible", "Thick, strong and smooth"]),
            trait_question!("A29", "How is your voice?", ["Thin or hoarse", "Sharp and clear", "Deep and pleasant"]),
            trait_question!("A30", "How do you recover after falling ill?", ["Slowly, with low energy", "Quickly if I rest", "Slowly but completely"]),
        ],
    }],
};
