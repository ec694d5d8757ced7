use crate::checker::dictionary::Dictionary;
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DictionaryInfo {
    pub language: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

fn data_dir() -> Result<PathBuf> {
    crate::config::Config::data_dir().context("Failed to get data directory")
}

/// Installed `.dict` files in `data_dir`, sorted by language.
pub fn installed_dictionaries(data_dir: &Path) -> Result<Vec<DictionaryInfo>> {
    if !data_dir.exists() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in fs::read_dir(data_dir)? {
        let path = entry?.path();

        if path.extension().and_then(|s| s.to_str()) == Some("dict") {
            let language = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown")
                .to_string();
            let size_bytes = fs::metadata(&path)?.len();

            found.push(DictionaryInfo {
                language,
                path,
                size_bytes,
            });
        }
    }

    found.sort_by(|a, b| a.language.cmp(&b.language));
    Ok(found)
}

pub fn list_dictionaries() -> Result<()> {
    let data_dir = data_dir()?;
    let installed = installed_dictionaries(&data_dir)?;

    if installed.is_empty() {
        println!("{}", "No dictionaries installed.".yellow());
        println!(
            "The bundled English list is used for {}. Run {} to install one.",
            "en_US/en_GB".cyan(),
            "levspell dict build <LANG> <WORDLIST>".cyan()
        );
        return Ok(());
    }

    println!("{}", "Installed dictionaries:".bold());
    println!();

    for info in &installed {
        println!(
            "  {} {} ({})",
            "✓".green(),
            info.language.cyan().bold(),
            format!("{}KB", info.size_bytes / 1024).dimmed()
        );
    }

    println!();
    println!(
        "Data directory: {}",
        data_dir.display().to_string().dimmed()
    );

    Ok(())
}

/// Build `<data_dir>/<language>.dict` from a plain word list. Returns the
/// installed path and the number of distinct words.
pub fn build_dictionary_in(
    data_dir: &Path,
    language: &str,
    wordlist: &Path,
) -> Result<(PathBuf, usize)> {
    let content = fs::read_to_string(wordlist)
        .with_context(|| format!("Failed to read word list: {}", wordlist.display()))?;
    let words: Vec<&str> = content.lines().collect();

    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    let dict_path = data_dir.join(format!("{}.dict", language));
    let count = Dictionary::build_from_words(&words, &dict_path)
        .with_context(|| format!("Failed to build dictionary: {}", dict_path.display()))?;

    Ok((dict_path, count))
}

pub fn build_dictionary(language: &str, wordlist: &Path) -> Result<()> {
    println!(
        "{} dictionary for {} from {}...",
        "Building".cyan().bold(),
        language.yellow(),
        wordlist.display().to_string().dimmed()
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    pb.set_message("Compiling FST...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let outcome = build_dictionary_in(&data_dir()?, language, wordlist);
    pb.finish_and_clear();
    let (dict_path, count) = outcome?;

    println!("Indexed {} words", count.to_string().yellow());
    println!(
        "{} Dictionary installed: {}",
        "✓".green().bold(),
        dict_path.display().to_string().cyan()
    );

    Ok(())
}

pub fn show_info(language: &str) -> Result<()> {
    let installed = Dictionary::installed_path(language).filter(|path| path.exists());

    let dictionary = match Dictionary::load(language) {
        Ok(dictionary) => dictionary,
        Err(e) => {
            println!(
                "{} Dictionary for {} not available: {}",
                "✗".red().bold(),
                language.yellow(),
                e
            );
            println!(
                "Run {} to install it.",
                format!("levspell dict build {} <WORDLIST>", language).cyan()
            );
            return Ok(());
        }
    };

    println!("{}", format!("Dictionary: {}", language).bold());
    match &installed {
        Some(path) => {
            let metadata = fs::metadata(path)?;
            println!("  Path: {}", path.display());
            println!("  Size: {} KB", metadata.len() / 1024);
            println!("  Format: FST (Finite State Transducer)");
        }
        None => println!("  Source: {}", "bundled word list".yellow()),
    }
    println!("  Words: {}", dictionary.len());
    println!("  Longest word: {} characters", dictionary.max_word_len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_build_and_list() {
        let dir = tempdir().unwrap();
        let wordlist = dir.path().join("words.txt");
        fs::write(&wordlist, "zebra\napple\nApple\n\nmango\n").unwrap();

        let data = dir.path().join("data");
        let (path, count) = build_dictionary_in(&data, "xx_TEST", &wordlist).unwrap();
        assert_eq!(count, 3);
        assert_eq!(path, data.join("xx_TEST.dict"));

        let installed = installed_dictionaries(&data).unwrap();
        assert_eq!(installed.len(), 1);
        assert_eq!(installed[0].language, "xx_TEST");

        let dict = Dictionary::load_from_path(&path).unwrap();
        assert!(dict.contains("APPLE"));
        assert_eq!(dict.len(), 3);
    }

    #[test]
    fn test_missing_data_dir_lists_nothing() {
        let dir = tempdir().unwrap();
        assert!(installed_dictionaries(&dir.path().join("absent")).unwrap().is_empty());
    }

    #[test]
    fn test_missing_wordlist() {
        let dir = tempdir().unwrap();
        let err = build_dictionary_in(dir.path(), "en_US", &dir.path().join("nope.txt")).unwrap_err();
        assert!(err.to_string().contains("Failed to read word list"));
    }
}
