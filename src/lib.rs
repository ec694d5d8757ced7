pub mod checker;
pub mod cli;
pub mod config;
pub mod dict;
pub mod error;

pub use checker::dictionary::Dictionary;
pub use checker::distance::{edit_path, levenshtein, DistanceMatrix, EditOp};
pub use checker::session::{analyze, AnalysisResult, AnalysisSession, Correction, WordAnalysis};
pub use checker::suggestions::{suggest, Suggestion};
pub use checker::tokenizer::{tokenize, Span, Token};
pub use checker::SpellChecker;
pub use config::Config;
pub use error::{Error, Result};

/// Outcome of checking or fixing one input.
#[derive(Debug, Clone, Default)]
pub struct CheckResult {
    pub error_count: usize,
    pub fixed_count: usize,
    /// Text after any corrections.
    pub text: String,
    /// Analysis of `text`.
    pub analysis: AnalysisResult,
    pub corrections: Vec<Correction>,
}
