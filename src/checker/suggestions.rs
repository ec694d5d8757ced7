use crate::checker::dictionary::Dictionary;
use crate::checker::distance::{levenshtein, DistanceMatrix};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Number of suggestions surfaced per word when nothing else is configured.
pub const DEFAULT_LIMIT: usize = 3;

/// Largest distance handed to the FST Levenshtein automaton. Beyond this the
/// automaton gets expensive to build and a length-ordered scan is cheaper.
const MAX_AUTOMATON_DISTANCE: u32 = 2;

/// A candidate correction and how it was scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub word: String,
    pub distance: usize,
    /// Cost matrix of the (lower-cased) original word against `word`.
    pub matrix: DistanceMatrix,
}

impl Suggestion {
    fn score(original: &str, candidate: &str) -> Self {
        let (distance, matrix) = levenshtein(original, candidate);
        Self {
            word: candidate.to_string(),
            distance,
            matrix,
        }
    }
}

/// Ranking order: closest first, ties broken by byte-wise comparison of the
/// candidate word.
pub fn rank(a: &Suggestion, b: &Suggestion) -> Ordering {
    a.distance
        .cmp(&b.distance)
        .then_with(|| a.word.cmp(&b.word))
}

/// Return up to `limit` dictionary words closest to `word`.
///
/// The word is lower-cased before lookup. A known word yields a single
/// suggestion of itself at distance 0. The result is exactly what scoring
/// every dictionary word and sorting with [`rank`] would give; candidate
/// retrieval only skips words that cannot make the cut.
pub fn suggest(word: &str, dictionary: &Dictionary, limit: usize) -> Vec<Suggestion> {
    if limit == 0 || dictionary.is_empty() {
        return Vec::new();
    }

    let folded = word.to_lowercase();

    if dictionary.contains(&folded) {
        return vec![Suggestion::score(&folded, &folded)];
    }

    // Every word within distance d is returned, so once there are `limit`
    // of them no word outside can outrank the top `limit`.
    for d in 1..=MAX_AUTOMATON_DISTANCE {
        match dictionary.within_distance(&folded, d) {
            Some(words) if words.len() >= limit => {
                trace!("{:?}: {} candidates within distance {}", folded, words.len(), d);
                return top(&folded, words.iter().map(String::as_str), limit);
            }
            Some(_) => continue,
            None => break,
        }
    }

    debug!("{:?}: scanning dictionary by length", folded);
    scan_by_length(&folded, dictionary, limit)
}

fn top<'a>(word: &str, candidates: impl Iterator<Item = &'a str>, limit: usize) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = candidates
        .map(|candidate| Suggestion::score(word, candidate))
        .collect();

    suggestions.sort_by(rank);
    suggestions.truncate(limit);
    suggestions
}

/// Score candidates in order of increasing length difference from `word`.
///
/// A candidate whose length differs by `delta` is at least `delta` edits
/// away, so the scan stops once `limit` suggestions are held and `delta`
/// exceeds the worst of them.
fn scan_by_length(word: &str, dictionary: &Dictionary, limit: usize) -> Vec<Suggestion> {
    let len = word.chars().count();
    let max_delta = len.max(dictionary.max_word_len());
    let mut best: Vec<Suggestion> = Vec::with_capacity(limit + 1);

    for delta in 0..=max_delta {
        if best.len() >= limit && best.last().map_or(false, |worst| delta > worst.distance) {
            break;
        }

        let shorter = len.checked_sub(delta);
        let longer = (delta > 0).then_some(len + delta);

        for candidate_len in shorter.into_iter().chain(longer) {
            for candidate in dictionary.words_of_length(candidate_len) {
                let suggestion = Suggestion::score(word, candidate);

                let qualifies = best.len() < limit
                    || best
                        .last()
                        .map_or(true, |worst| rank(&suggestion, worst) == Ordering::Less);

                if qualifies {
                    let pos = best
                        .binary_search_by(|held| rank(held, &suggestion))
                        .unwrap_or_else(|pos| pos);
                    best.insert(pos, suggestion);
                    best.truncate(limit);
                }
            }
        }
    }

    best
}
