pub mod dictionary;
pub mod distance;
pub mod session;
pub mod suggestions;
pub mod tokenizer;

use crate::cli::output::{prompt_correction, Choice};
use crate::{CheckResult, Config};
use anyhow::{Context, Result};
use dictionary::Dictionary;
use log::debug;
use rayon::prelude::*;
use session::{AnalysisSession, WordAnalysis};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Runs analysis sessions over files against one shared dictionary.
pub struct SpellChecker {
    dictionary: Arc<Dictionary>,
    limit: usize,
}

impl SpellChecker {
    pub fn new(config: &Config) -> Result<Self> {
        let dictionary = match &config.dictionary {
            Some(path) => Dictionary::load_from_path(path)
                .with_context(|| format!("Failed to load dictionary: {}", path.display()))?,
            None => Dictionary::load(&config.language).with_context(|| {
                format!("Failed to load dictionary for language {}", config.language)
            })?,
        };

        debug!("dictionary ready with {} words", dictionary.len());

        Ok(Self::with_dictionary(
            Arc::new(dictionary),
            config.max_suggestions,
        ))
    }

    pub fn with_dictionary(dictionary: Arc<Dictionary>, limit: usize) -> Self {
        Self { dictionary, limit }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Fresh session sharing this checker's dictionary.
    pub fn session(&self) -> AnalysisSession {
        AnalysisSession::new(Arc::clone(&self.dictionary)).with_limit(self.limit)
    }

    pub fn check_text(&self, text: &str) -> CheckResult {
        let mut session = self.session();
        let analysis = session.analyze(text).clone();

        CheckResult {
            error_count: analysis.error_count(),
            fixed_count: 0,
            text: text.to_string(),
            analysis,
            corrections: Vec::new(),
        }
    }

    pub fn check(&self, file_path: &Path) -> Result<CheckResult> {
        let content = read(file_path)?;
        Ok(self.check_text(&content))
    }

    /// Check files in parallel; results are in the same order as `paths`.
    pub fn check_all(&self, paths: &[PathBuf]) -> Vec<Result<CheckResult>> {
        paths.par_iter().map(|path| self.check(path)).collect()
    }

    /// Replace every flagged word with its top suggestion, once, based on
    /// the analysis of the original text.
    pub fn fix_text(&self, text: &str) -> CheckResult {
        let mut session = self.session();
        let initial = session.analyze(text).clone();

        for word in &initial.words {
            if let Some(top) = word.top() {
                session.correct(&word.word, &match_case(&word.word, &top.word));
            }
        }

        finish(session)
    }

    pub fn fix_auto(&self, file_path: &Path) -> Result<CheckResult> {
        let content = read(file_path)?;
        let result = self.fix_text(&content);
        write_back(file_path, &result)?;
        Ok(result)
    }

    /// Walk the flagged words of `text` in order and let `choose` decide
    /// what happens to each one. Edits land on the occurrence that was
    /// offered, even when earlier occurrences of the same word were skipped.
    pub fn fix_text_with<F>(&self, text: &str, mut choose: F) -> Result<CheckResult>
    where
        F: FnMut(&str, &WordAnalysis) -> Result<Choice>,
    {
        let mut session = self.session();
        let initial = session.analyze(text).clone();
        let mut skipped: HashMap<&str, usize> = HashMap::new();

        for word in &initial.words {
            match choose(text, word)? {
                Choice::Replace(replacement) => {
                    let occurrence = skipped.get(word.word.as_str()).copied().unwrap_or(0);
                    session.correct_occurrence(
                        &word.word,
                        &match_case(&word.word, &replacement),
                        occurrence,
                    );
                }
                Choice::Skip => *skipped.entry(word.word.as_str()).or_default() += 1,
                Choice::Quit => break,
            }
        }

        Ok(finish(session))
    }

    pub fn fix_interactive(&self, file_path: &Path, colored: bool) -> Result<CheckResult> {
        let content = read(file_path)?;
        let result =
            self.fix_text_with(&content, |text, word| prompt_correction(text, word, colored))?;
        write_back(file_path, &result)?;
        Ok(result)
    }
}

fn finish(mut session: AnalysisSession) -> CheckResult {
    let analysis = session.reanalyze().clone();

    CheckResult {
        error_count: analysis.error_count(),
        fixed_count: session.corrections().len(),
        text: session.text().to_string(),
        analysis,
        corrections: session.corrections().to_vec(),
    }
}

fn read(file_path: &Path) -> Result<String> {
    fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read file: {}", file_path.display()))
}

fn write_back(file_path: &Path, result: &CheckResult) -> Result<()> {
    if result.fixed_count > 0 {
        fs::write(file_path, &result.text)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;
    }
    Ok(())
}

/// Give a lower-case dictionary word the casing pattern of the word it
/// replaces: `Qick` becomes `Quick`, `QICK` becomes `QUICK`.
pub fn match_case(original: &str, replacement: &str) -> String {
    let first_upper = original.chars().next().map_or(false, char::is_uppercase);
    if !first_upper {
        return replacement.to_string();
    }

    let all_caps = original.chars().count() > 1 && !original.chars().any(char::is_lowercase);
    if all_caps {
        replacement.to_uppercase()
    } else {
        upper_first(replacement)
    }
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
