use crate::checker::dictionary::Dictionary;
use crate::checker::distance::distance;
use crate::checker::suggestions::{suggest, Suggestion, DEFAULT_LIMIT};
use crate::checker::tokenizer::{tokenize, Span};
use log::{debug, trace};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A word that is not in the dictionary, with its ranked corrections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordAnalysis {
    /// The word as the user typed it.
    pub word: String,
    pub span: Span,
    pub suggestions: Vec<Suggestion>,
}

impl WordAnalysis {
    pub fn top(&self) -> Option<&Suggestion> {
        self.suggestions.first()
    }
}

/// Analysis of one snapshot of a text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Flagged words in text order.
    pub words: Vec<WordAnalysis>,
    /// Nothing flagged and the text is not blank.
    pub all_correct: bool,
}

impl AnalysisResult {
    pub fn error_count(&self) -> usize {
        self.words.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub original_word: String,
    pub corrected_word: String,
    pub edit_distance: usize,
}

/// Analyze `text` against `dictionary`, keeping up to `limit` suggestions
/// per flagged word.
pub fn analyze(text: &str, dictionary: &Dictionary, limit: usize) -> AnalysisResult {
    analyze_with(text, |word| suggest(word, dictionary, limit))
}

fn analyze_with<F>(text: &str, mut suggestions_for: F) -> AnalysisResult
where
    F: FnMut(&str) -> Vec<Suggestion>,
{
    let tokens = tokenize(text);
    let mut words = Vec::new();

    for token in &tokens {
        let suggestions = suggestions_for(&token.word);

        // Known words come back with a distance-0 suggestion of themselves.
        if suggestions.first().map_or(false, |top| top.distance > 0) {
            trace!("flagged {:?} at {:?}", token.word, token.span);
            words.push(WordAnalysis {
                word: token.word.clone(),
                span: token.span,
                suggestions,
            });
        }
    }

    debug!("analyzed {} tokens, {} flagged", tokens.len(), words.len());

    let all_correct = words.is_empty() && !text.trim().is_empty();
    AnalysisResult { words, all_correct }
}

/// Replace the first whole-word, case-sensitive occurrence of `original`.
/// Returns `None` when there is no such occurrence.
pub fn replace_first_word(text: &str, original: &str, corrected: &str) -> Option<String> {
    replace_nth_word(text, original, corrected, 0)
}

/// Replace the `nth` (0-based) whole-word, case-sensitive occurrence of
/// `original`. Returns `None` when there are not that many occurrences.
pub fn replace_nth_word(text: &str, original: &str, corrected: &str, nth: usize) -> Option<String> {
    if original.is_empty() {
        return None;
    }

    let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(original))).ok()?;
    let found = pattern.find_iter(text).nth(nth)?;

    let mut replaced = String::with_capacity(text.len() + corrected.len());
    replaced.push_str(&text[..found.start()]);
    replaced.push_str(corrected);
    replaced.push_str(&text[found.end()..]);
    Some(replaced)
}

/// Text being edited, its latest analysis and the corrections applied so far.
///
/// The dictionary is shared read-only; any number of sessions can hold it.
/// Suggestions are memoized per lower-cased word for the life of the session.
pub struct AnalysisSession {
    dictionary: Arc<Dictionary>,
    limit: usize,
    text: String,
    result: AnalysisResult,
    corrections: Vec<Correction>,
    cache: HashMap<String, Vec<Suggestion>>,
}

impl AnalysisSession {
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self {
            dictionary,
            limit: DEFAULT_LIMIT,
            text: String::new(),
            result: AnalysisResult::default(),
            corrections: Vec::new(),
            cache: HashMap::new(),
        }
    }

    /// Keep up to `limit` suggestions per word.
    pub fn with_limit(mut self, limit: usize) -> Self {
        if limit != self.limit {
            self.cache.clear();
        }
        self.limit = limit;
        self
    }

    /// Make `text` the current text and analyze it from scratch.
    pub fn analyze(&mut self, text: &str) -> &AnalysisResult {
        self.text = text.to_string();

        let dictionary = &self.dictionary;
        let cache = &mut self.cache;
        let limit = self.limit;

        self.result = analyze_with(text, |word| {
            cache
                .entry(word.to_lowercase())
                .or_insert_with(|| suggest(word, dictionary, limit))
                .clone()
        });

        &self.result
    }

    /// Analyze the current text again, e.g. after a correction.
    pub fn reanalyze(&mut self) -> &AnalysisResult {
        let text = std::mem::take(&mut self.text);
        self.analyze(&text)
    }

    /// Replace the first whole-word occurrence of `original` in `text` with
    /// `corrected` and log the correction.
    ///
    /// The logged distance is that of the top suggestion for `original`. If
    /// `original` is not in `text` the text comes back unchanged and nothing
    /// is logged. The analysis is not refreshed; call [`Self::reanalyze`].
    pub fn apply_correction(
        &mut self,
        text: &str,
        original: &str,
        corrected: &str,
    ) -> (String, Option<Correction>) {
        self.apply_at(text, original, corrected, 0)
    }

    fn apply_at(
        &mut self,
        text: &str,
        original: &str,
        corrected: &str,
        occurrence: usize,
    ) -> (String, Option<Correction>) {
        let Some(new_text) = replace_nth_word(text, original, corrected, occurrence) else {
            debug!("{:?} no longer in text, correction skipped", original);
            return (text.to_string(), None);
        };

        let edit_distance = self
            .suggestions_for(original)
            .first()
            .map(|top| top.distance)
            .unwrap_or_else(|| distance(&original.to_lowercase(), &corrected.to_lowercase()));

        let correction = Correction {
            original_word: original.to_string(),
            corrected_word: corrected.to_string(),
            edit_distance,
        };

        debug!(
            "corrected {:?} -> {:?} (distance {})",
            original, corrected, edit_distance
        );

        self.corrections.push(correction.clone());
        self.text = new_text.clone();
        (new_text, Some(correction))
    }

    /// [`Self::apply_correction`] on the current text.
    pub fn correct(&mut self, original: &str, corrected: &str) -> Option<Correction> {
        let text = self.text.clone();
        self.apply_correction(&text, original, corrected).1
    }

    /// Like [`Self::correct`], but replaces the `occurrence`-th (0-based)
    /// remaining whole-word match of `original` in the current text.
    pub fn correct_occurrence(
        &mut self,
        original: &str,
        corrected: &str,
        occurrence: usize,
    ) -> Option<Correction> {
        let text = self.text.clone();
        self.apply_at(&text, original, corrected, occurrence).1
    }

    fn suggestions_for(&mut self, word: &str) -> &[Suggestion] {
        let dictionary = &self.dictionary;
        let limit = self.limit;
        self.cache
            .entry(word.to_lowercase())
            .or_insert_with(|| suggest(word, dictionary, limit))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    pub fn corrections(&self) -> &[Correction] {
        &self.corrections
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(words: &[&str]) -> AnalysisSession {
        AnalysisSession::new(Arc::new(Dictionary::from_words(words).unwrap()))
    }

    #[test]
    fn test_flags_misspelling_with_span() {
        let mut s = session(&["the", "quick", "fox"]);
        let result = s.analyze("the qick fox");

        assert_eq!(result.words.len(), 1);
        assert_eq!(result.words[0].word, "qick");
        assert_eq!(result.words[0].span, Span::new(4, 8));
        assert_eq!(result.words[0].top().unwrap().word, "quick");
        assert_eq!(result.words[0].top().unwrap().distance, 1);
        assert!(!result.all_correct);
    }

    #[test]
    fn test_all_correct() {
        let mut s = session(&["the", "quick", "fox"]);
        let result = s.analyze("the quick fox");
        assert!(result.words.is_empty());
        assert!(result.all_correct);
    }

    #[test]
    fn test_blank_text_is_not_all_correct() {
        let mut s = session(&["the"]);
        assert!(!s.analyze("").all_correct);
        assert!(!s.analyze("   \n ").all_correct);
        assert!(s.result().words.is_empty());
    }

    #[test]
    fn test_case_folding_keeps_user_casing() {
        let mut s = session(&["the", "quick", "fox"]);
        let result = s.analyze("The Qick FOX");

        assert_eq!(result.words.len(), 1);
        assert_eq!(result.words[0].word, "Qick");
        assert_eq!(result.words[0].top().unwrap().word, "quick");
    }

    #[test]
    fn test_empty_dictionary_flags_nothing() {
        let mut s = session(&[]);
        let result = s.analyze("anything goes");
        assert!(result.words.is_empty());
        assert!(result.all_correct);
    }

    #[test]
    fn test_repeated_misspellings_in_order() {
        let mut s = session(&["the", "cat"]);
        let result = s.analyze("teh cat teh");
        let spans: Vec<_> = result.words.iter().map(|w| w.span).collect();
        assert_eq!(spans, vec![Span::new(0, 3), Span::new(8, 11)]);
    }

    #[test]
    fn test_apply_correction_logs_distance() {
        let mut s = session(&["the", "quick", "fox"]);
        s.analyze("the qick fox");

        let (text, correction) = s.apply_correction("the qick fox", "qick", "quick");
        assert_eq!(text, "the quick fox");
        assert_eq!(
            correction,
            Some(Correction {
                original_word: "qick".to_string(),
                corrected_word: "quick".to_string(),
                edit_distance: 1,
            })
        );
        assert_eq!(s.corrections().len(), 1);
        assert_eq!(s.text(), "the quick fox");

        // No implicit re-analysis.
        assert_eq!(s.result().words.len(), 1);
        assert!(s.reanalyze().all_correct);
    }

    #[test]
    fn test_absent_word_is_a_no_op() {
        let mut s = session(&["the", "quick", "fox"]);
        let (text, correction) = s.apply_correction("the quick fox", "qick", "quick");
        assert_eq!(text, "the quick fox");
        assert!(correction.is_none());
        assert!(s.corrections().is_empty());
    }

    #[test]
    fn test_replaces_first_whole_word_only() {
        assert_eq!(
            replace_first_word("qicker qick qick", "qick", "quick").as_deref(),
            Some("qicker quick qick")
        );
        assert_eq!(replace_first_word("snake_qick", "qick", "quick"), None);
        assert_eq!(replace_first_word("Qick", "qick", "quick"), None);
        assert_eq!(replace_first_word("anything", "", "x"), None);
    }

    #[test]
    fn test_replace_nth_word() {
        assert_eq!(
            replace_nth_word("teh cat teh", "teh", "the", 1).as_deref(),
            Some("teh cat the")
        );
        assert_eq!(replace_nth_word("teh cat teh", "teh", "the", 2), None);
    }

    #[test]
    fn test_correct_later_occurrence() {
        let mut s = session(&["the", "cat", "tea"]);
        s.analyze("teh cat teh");

        let correction = s.correct_occurrence("teh", "the", 1).unwrap();
        assert_eq!(correction.edit_distance, 1);
        assert_eq!(s.text(), "teh cat the");
        assert!(s.correct_occurrence("teh", "the", 1).is_none());
        assert_eq!(s.corrections().len(), 1);
    }

    #[test]
    fn test_replacement_is_literal() {
        assert_eq!(
            replace_first_word("cost 5 dollars", "5", "$1").as_deref(),
            Some("cost $1 dollars")
        );
    }

    #[test]
    fn test_repeated_misspelling_corrected_one_at_a_time() {
        let mut s = session(&["the", "cat"]);
        s.analyze("teh cat teh");

        assert!(s.correct("teh", "the").is_some());
        assert_eq!(s.text(), "the cat teh");
        assert_eq!(s.reanalyze().words.len(), 1);

        assert!(s.correct("teh", "the").is_some());
        assert_eq!(s.text(), "the cat the");
        assert!(s.reanalyze().all_correct);
        assert_eq!(s.corrections().len(), 2);
    }

    #[test]
    fn test_corrected_word_not_reported_again() {
        let mut s = session(&["hello", "world", "wonderful"]);
        let first = s.analyze("helo wrold").clone();

        for word in &first.words {
            let top = word.top().unwrap().word.clone();
            s.correct(&word.word, &top);
            let after = s.reanalyze();
            assert!(after.words.iter().all(|w| w.word != top));
        }
        assert!(s.result().all_correct);
    }

    #[test]
    fn test_free_function_matches_session() {
        let dictionary = Arc::new(Dictionary::from_words(["the", "quick", "fox"]).unwrap());
        let mut s = AnalysisSession::new(dictionary.clone()).with_limit(2);
        let text = "teh qick brwn fox";
        assert_eq!(s.analyze(text), &analyze(text, &dictionary, 2));
    }
}
