use crate::error::{Error, Result};
use fst::automaton::{Automaton, Levenshtein, Str};
use fst::{IntoStreamer, Set, SetBuilder, Streamer};
use log::debug;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Word list shipped with the binary, used when no `.dict` file is installed.
const BUNDLED_ENGLISH: &str = include_str!("../../data/en_US.txt");

/// Immutable set of known words.
///
/// Every entry is lower-cased when the dictionary is built, and every lookup
/// lower-cases its input, so `contains("The")` and `contains("the")` agree.
/// Callers keep the user's casing for display.
pub struct Dictionary {
    set: Set<Vec<u8>>,
    by_length: BTreeMap<usize, Vec<String>>,
}

impl Dictionary {
    /// Load the dictionary for a language: an installed `.dict` file if one
    /// exists, otherwise the bundled English list.
    pub fn load(language: &str) -> Result<Self> {
        if let Some(path) = Self::installed_path(language) {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        match language {
            "en_US" | "en_GB" => {
                debug!("no installed dictionary for {}, using bundled list", language);
                Self::from_words(BUNDLED_ENGLISH.lines())
            }
            other => Err(Error::DictionaryNotFound(
                Self::installed_path(other).unwrap_or_else(|| PathBuf::from(format!("{}.dict", other))),
            )),
        }
    }

    /// Load a dictionary file. `.dict` files are FST sets written by
    /// [`Dictionary::build_from_words`]; anything else is read as a plain
    /// word list with one word per line.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::DictionaryNotFound(path.to_path_buf()));
        }

        let io_err = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };

        if path.extension().and_then(|e| e.to_str()) == Some("dict") {
            let bytes = fs::read(path).map_err(io_err)?;
            let set = Set::new(bytes)?;
            let dictionary = if is_folded(&set) {
                Self::from_set(set)
            } else {
                // Sets built by other tools may carry upper-case entries.
                debug!("re-folding case of {}", path.display());
                let mut words = Vec::with_capacity(set.len());
                let mut stream = set.stream();
                while let Some(key) = stream.next() {
                    if let Ok(word) = std::str::from_utf8(key) {
                        words.push(word.to_string());
                    }
                }
                Self::from_words(words)?
            };
            debug!("loaded {} words from {}", dictionary.len(), path.display());
            Ok(dictionary)
        } else {
            let contents = fs::read_to_string(path).map_err(io_err)?;
            let dictionary = Self::from_words(contents.lines())?;
            debug!("loaded {} words from {}", dictionary.len(), path.display());
            Ok(dictionary)
        }
    }

    /// Build an in-memory dictionary. Entries are trimmed and lower-cased;
    /// blank lines and `#` comments are dropped.
    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = normalize_all(words);
        let set = Set::from_iter(words.iter())?;
        Ok(Self::from_set(set))
    }

    fn from_set(set: Set<Vec<u8>>) -> Self {
        let mut by_length: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        let mut stream = set.stream();

        while let Some(key) = stream.next() {
            if let Ok(word) = std::str::from_utf8(key) {
                by_length
                    .entry(word.chars().count())
                    .or_default()
                    .push(word.to_string());
            }
        }

        Self { set, by_length }
    }

    /// Check if a word is known, ignoring case
    pub fn contains(&self, word: &str) -> bool {
        self.set.contains(word.to_lowercase())
    }

    /// All known words, shortest first.
    pub fn candidates(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_length.values().flatten().map(String::as_str)
    }

    /// Known words starting with `prefix`, in lexicographic order.
    pub fn words_with_prefix(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        let automaton = Str::new(&prefix).starts_with();
        self.set
            .search(automaton)
            .into_stream()
            .into_strs()
            .unwrap_or_default()
    }

    /// Known words with exactly `len` characters, in lexicographic order.
    pub fn words_of_length(&self, len: usize) -> &[String] {
        self.by_length.get(&len).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Length in characters of the longest known word.
    pub fn max_word_len(&self) -> usize {
        self.by_length.keys().next_back().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Every known word within edit distance `distance` of `word`, found by
    /// running a Levenshtein automaton over the FST.
    ///
    /// Returns `None` when the automaton cannot be built (it grows quickly
    /// with the distance and the query length); callers fall back to a scan.
    pub fn within_distance(&self, word: &str, distance: u32) -> Option<Vec<String>> {
        let automaton = match Levenshtein::new(word, distance) {
            Ok(automaton) => automaton,
            Err(e) => {
                debug!("levenshtein automaton for {:?} (d={}) unavailable: {}", word, distance, e);
                return None;
            }
        };

        self.set.search(automaton).into_stream().into_strs().ok()
    }

    /// Write a word list to `output_path` as an FST set. Returns the number
    /// of distinct words written.
    pub fn build_from_words<S: AsRef<str>>(words: &[S], output_path: &Path) -> Result<usize> {
        let words = normalize_all(words);

        let file = File::create(output_path).map_err(|source| Error::Io {
            path: output_path.to_path_buf(),
            source,
        })?;

        let mut builder = SetBuilder::new(BufWriter::new(file))?;
        for word in &words {
            builder.insert(word)?;
        }
        builder.finish()?;

        Ok(words.len())
    }

    /// Where `dict build` installs the dictionary for `language`.
    pub fn installed_path(language: &str) -> Option<PathBuf> {
        crate::config::Config::data_dir().map(|dir| dir.join(format!("{}.dict", language)))
    }
}

/// Whether every key of `set` is already a normalized entry.
fn is_folded(set: &Set<Vec<u8>>) -> bool {
    let mut stream = set.stream();
    while let Some(key) = stream.next() {
        if let Ok(word) = std::str::from_utf8(key) {
            if word.chars().any(char::is_uppercase) || word.trim() != word {
                return false;
            }
        }
    }
    true
}

/// Trim, lower-case, sort and de-duplicate a raw word list.
fn normalize_all<I, S>(words: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = words
        .into_iter()
        .filter_map(|line| {
            let word = line.as_ref().trim();
            if word.is_empty() || word.starts_with('#') {
                None
            } else {
                Some(word.to_lowercase())
            }
        })
        .collect();

    normalized.sort();
    normalized.dedup();
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_build_and_load_dictionary() {
        let dir = tempdir().unwrap();
        let dict_path = dir.path().join("test.dict");

        let words = vec!["hello".to_string(), "world".to_string(), "test".to_string()];

        let count = Dictionary::build_from_words(&words, &dict_path).unwrap();
        assert_eq!(count, 3);

        let dict = Dictionary::load_from_path(&dict_path).unwrap();
        assert!(dict.contains("hello"));
        assert!(dict.contains("world"));
        assert!(!dict.contains("notfound"));
        assert_eq!(dict.len(), 3);
    }

    #[test]
    fn test_mixed_case_dict_is_folded() {
        let dir = tempdir().unwrap();
        let dict_path = dir.path().join("mixed.dict");

        let mut builder = SetBuilder::new(BufWriter::new(File::create(&dict_path).unwrap())).unwrap();
        builder.insert("Paris").unwrap();
        builder.insert("city").unwrap();
        builder.finish().unwrap();

        let dict = Dictionary::load_from_path(&dict_path).unwrap();
        assert!(dict.contains("Paris"));
        assert!(dict.contains("paris"));
        assert!(dict.contains("city"));
        assert_eq!(dict.words_of_length(5), ["paris".to_string()]);

        let result = crate::analyze("Paris city", &dict, 3);
        assert!(result.words.is_empty());
        assert!(result.all_correct);
    }

    #[test]
    fn test_words_with_prefix() {
        let dict = Dictionary::from_words(["quick", "quack", "quicker", "slow", "qu"]).unwrap();
        assert_eq!(
            dict.words_with_prefix("Quic"),
            vec!["quick".to_string(), "quicker".to_string()]
        );
        assert_eq!(dict.words_with_prefix("qu").len(), 4);
        assert_eq!(dict.words_with_prefix("").len(), 5);
        assert!(dict.words_with_prefix("z").is_empty());
    }

    #[test]
    fn test_plain_word_list() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, "# comment\nApple\n\n  banana  \napple\n").unwrap();

        let dict = Dictionary::load_from_path(&path).unwrap();
        assert_eq!(dict.len(), 2);
        assert!(dict.contains("apple"));
        assert!(dict.contains("banana"));
        assert!(!dict.contains("# comment"));
    }

    #[test]
    fn test_case_folding() {
        let dict = Dictionary::from_words(["The", "QUICK", "fox"]).unwrap();
        assert!(dict.contains("the"));
        assert!(dict.contains("The"));
        assert!(dict.contains("qUiCk"));
        assert_eq!(dict.candidates().collect::<Vec<_>>(), vec!["fox", "the", "quick"]);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempdir().unwrap();
        let err = Dictionary::load_from_path(&dir.path().join("nope.txt")).err().unwrap();
        assert!(matches!(err, Error::DictionaryNotFound(_)));
    }

    #[test]
    fn test_length_index() {
        let dict = Dictionary::from_words(["a", "to", "the", "tea", "quick"]).unwrap();
        assert_eq!(dict.words_of_length(3), ["tea".to_string(), "the".to_string()]);
        assert!(dict.words_of_length(4).is_empty());
        assert_eq!(dict.max_word_len(), 5);
    }

    #[test]
    fn test_within_distance() {
        let dict = Dictionary::from_words(["quick", "quack", "quicker", "slow"]).unwrap();
        assert_eq!(dict.within_distance("qick", 1).unwrap(), vec!["quick".to_string()]);

        let mut two = dict.within_distance("qick", 2).unwrap();
        two.sort();
        assert_eq!(two, vec!["quack".to_string(), "quick".to_string()]);
    }

    #[test]
    fn test_empty_dictionary() {
        let dict = Dictionary::from_words(Vec::<String>::new()).unwrap();
        assert!(dict.is_empty());
        assert_eq!(dict.max_word_len(), 0);
        assert_eq!(dict.candidates().count(), 0);
    }

    #[test]
    fn test_bundled_english() {
        let dict = Dictionary::from_words(BUNDLED_ENGLISH.lines()).unwrap();
        assert!(dict.contains("the"));
        assert!(dict.contains("quick"));
        assert!(!dict.contains("qick"));
    }
}
