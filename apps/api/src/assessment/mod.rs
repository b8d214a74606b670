// Assessment Pipeline: two sequential quizzes, answer aggregation and the
// inference calls chained behind them.

pub mod classifier;
pub mod cursor;
pub mod features;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod questions;
pub mod session;
