use crate::checker::distance::{edit_path, levenshtein, DistanceMatrix, EditOp};
use crate::checker::session::{Correction, WordAnalysis};
use crate::checker::suggestions::Suggestion;
use crate::checker::tokenizer::{line_column, Span};
use crate::CheckResult;
use anyhow::Result;
use colored::*;
use dialoguer::theme::{ColorfulTheme, SimpleTheme, Theme};
use dialoguer::Select;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonSuggestion<'a> {
    word: &'a str,
    distance: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    matrix: Option<&'a DistanceMatrix>,
}

#[derive(Debug, Serialize)]
struct JsonError<'a> {
    file: &'a str,
    line: usize,
    column: usize,
    span: Span,
    word: &'a str,
    suggestions: Vec<JsonSuggestion<'a>>,
    context: String,
}

#[derive(Debug, Serialize)]
struct JsonCorrection<'a> {
    file: &'a str,
    #[serde(flatten)]
    correction: &'a Correction,
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    files_checked: usize,
    total_errors: usize,
    total_fixed: usize,
    all_correct: bool,
    errors: Vec<JsonError<'a>>,
    corrections: Vec<JsonCorrection<'a>>,
}

/// Print the findings for every checked input, in order.
pub fn print_report(
    reports: &[(String, CheckResult)],
    colored_output: bool,
    format: &OutputFormat,
    show_matrix: bool,
) {
    match format {
        OutputFormat::Text => {
            for (source, result) in reports {
                print_text_errors(source, result, colored_output, show_matrix);
            }
        }
        OutputFormat::Json => print_json_report(reports, show_matrix),
    }
}

fn print_text_errors(source: &str, result: &CheckResult, colored_output: bool, show_matrix: bool) {
    if result.analysis.words.is_empty() {
        return;
    }

    if colored_output {
        println!("\n{}", source.bold().underline());
    } else {
        println!("\n{}", source);
    }

    for word in &result.analysis.words {
        let (line, column) = line_column(&result.text, word.span.start);
        let line_info = format!("{}:{}", line, column);
        let context = Context::around(&result.text, word.span);

        if colored_output {
            println!(
                "  {} {} {}",
                line_info.blue().bold(),
                word.word.red().bold(),
                context.render(true)
            );

            let suggestions = word
                .suggestions
                .iter()
                .map(|s| format!("{} {}", s.word.green(), format!("({})", s.distance).dimmed()))
                .collect::<Vec<_>>()
                .join(&", ".dimmed().to_string());
            println!("    {} {}", "→".dimmed(), suggestions);
        } else {
            println!("  {} {} {}", line_info, word.word, context.render(false));

            let suggestions = word
                .suggestions
                .iter()
                .map(|s| format!("{} ({})", s.word, s.distance))
                .collect::<Vec<_>>()
                .join(", ");
            println!("    → {}", suggestions);
        }

        if show_matrix {
            let folded = word.word.to_lowercase();
            for suggestion in &word.suggestions {
                println!();
                print_matrix(&folded, &suggestion.word, &suggestion.matrix, colored_output);
            }
            println!();
        }
    }
}

fn print_json_report(reports: &[(String, CheckResult)], show_matrix: bool) {
    let errors: Vec<JsonError> = reports
        .iter()
        .flat_map(|(source, result)| {
            result.analysis.words.iter().map(move |word| {
                let (line, column) = line_column(&result.text, word.span.start);
                JsonError {
                    file: source,
                    line,
                    column,
                    span: word.span,
                    word: &word.word,
                    suggestions: word
                        .suggestions
                        .iter()
                        .map(|s| JsonSuggestion {
                            word: &s.word,
                            distance: s.distance,
                            matrix: show_matrix.then_some(&s.matrix),
                        })
                        .collect(),
                    context: Context::around(&result.text, word.span).render(false),
                }
            })
        })
        .collect();

    let corrections: Vec<JsonCorrection> = reports
        .iter()
        .flat_map(|(source, result)| {
            result.corrections.iter().map(move |correction| JsonCorrection {
                file: source,
                correction,
            })
        })
        .collect();

    let output = JsonOutput {
        files_checked: reports.len(),
        total_errors: reports.iter().map(|(_, r)| r.error_count).sum(),
        total_fixed: reports.iter().map(|(_, r)| r.fixed_count).sum(),
        all_correct: !reports.is_empty() && reports.iter().all(|(_, r)| r.analysis.all_correct),
        errors,
        corrections,
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("failed to serialize report: {}", e),
    }
}

/// Slice of the line around a word, for display.
struct Context {
    before: String,
    word: String,
    after: String,
    clipped_start: bool,
    clipped_end: bool,
}

impl Context {
    const RADIUS: usize = 20;

    fn around(text: &str, span: Span) -> Self {
        let (line_no, column) = line_column(text, span.start);
        let line: Vec<char> = text
            .split('\n')
            .nth(line_no - 1)
            .unwrap_or("")
            .trim_end_matches('\r')
            .chars()
            .collect();

        let word_start = (column - 1).min(line.len());
        let word_end = (word_start + span.len()).min(line.len());
        let start = word_start.saturating_sub(Self::RADIUS);
        let end = (word_end + Self::RADIUS).min(line.len());

        Self {
            before: line[start..word_start].iter().collect(),
            word: line[word_start..word_end].iter().collect(),
            after: line[word_end..end].iter().collect(),
            clipped_start: start > 0,
            clipped_end: end < line.len(),
        }
    }

    fn render(&self, colored: bool) -> String {
        let word = if colored {
            self.word.red().bold().to_string()
        } else {
            self.word.clone()
        };

        format!(
            "{}{}{}{}{}",
            if self.clipped_start { "..." } else { "" },
            self.before,
            word,
            self.after,
            if self.clipped_end { "..." } else { "" }
        )
    }
}

/// Render a cost matrix as a grid: rows are the characters of `word`,
/// columns those of `comparison`. Cells on the edit path are highlighted
/// (marked `*` without color) and diagonal character matches are green.
pub fn print_matrix(word: &str, comparison: &str, matrix: &DistanceMatrix, colored: bool) {
    let word_chars: Vec<char> = word.chars().collect();
    let comparison_chars: Vec<char> = comparison.chars().collect();

    let path: HashSet<(usize, usize)> = edit_path(word, comparison, matrix)
        .iter()
        .scan((0, 0), |cell, op| {
            *cell = op.advance(*cell);
            Some(*cell)
        })
        .chain(std::iter::once((0, 0)))
        .collect();

    let widest = matrix.rows().iter().flatten().max().copied().unwrap_or(0);
    let width = widest.to_string().len() + 2;

    let heading = format!("\"{}\" → \"{}\"", word, comparison);
    if colored {
        println!("  {} {}", heading.bold(), format!("distance {}", matrix.distance()).dimmed());
    } else {
        println!("  {} distance {}", heading, matrix.distance());
    }

    let mut header = format!("  {:>2}{:>width$}", "", "", width = width);
    for ch in &comparison_chars {
        header.push_str(&format!("{:>width$}", ch, width = width));
    }
    if colored {
        println!("{}", header.cyan());
    } else {
        println!("{}", header);
    }

    for (i, row) in matrix.rows().iter().enumerate() {
        let label = if i == 0 { ' ' } else { word_chars[i - 1] };
        let mut line = if colored {
            format!("  {}", format!("{:>2}", label).cyan())
        } else {
            format!("  {:>2}", label)
        };

        for (j, cost) in row.iter().enumerate() {
            let on_path = path.contains(&(i, j));
            let is_match = i > 0 && j > 0 && word_chars[i - 1] == comparison_chars[j - 1];

            let cell = if on_path && !colored {
                format!("{:>width$}", format!("{}*", cost), width = width)
            } else {
                format!("{:>width$}", cost, width = width)
            };

            if !colored {
                line.push_str(&cell);
            } else if on_path {
                line.push_str(&cell.yellow().bold().to_string());
            } else if is_match {
                line.push_str(&cell.green().to_string());
            } else {
                line.push_str(&cell.dimmed().to_string());
            }
        }

        println!("{}", line);
    }
}

pub fn print_edit_path(ops: &[EditOp], colored: bool) {
    let steps = ops
        .iter()
        .map(|op| {
            if !colored {
                op.to_string()
            } else if op.is_edit() {
                op.to_string().yellow().to_string()
            } else {
                op.to_string().dimmed().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    println!("  {}", steps);
}

/// Distance, cost matrix and edit path between two arbitrary words.
pub fn print_distance(a: &str, b: &str, colored: bool) {
    let (distance, matrix) = levenshtein(a, b);

    if colored {
        println!("{} {}", "Edit distance:".bold(), distance.to_string().yellow().bold());
    } else {
        println!("Edit distance: {}", distance);
    }
    println!();
    print_matrix(a, b, &matrix, colored);
    println!();
    print_edit_path(&edit_path(a, b, &matrix), colored);
}

pub fn print_check_summary(
    total_errors: usize,
    files: usize,
    all_correct: bool,
    colored: bool,
) {
    println!();
    if total_errors == 0 {
        let message = if all_correct {
            "✓ All spellings are correct!"
        } else {
            "Nothing to check."
        };
        if colored {
            println!("{}", message.green().bold());
        } else {
            println!("{}", message);
        }
    } else {
        let error_word = if total_errors == 1 { "error" } else { "errors" };
        if colored {
            println!(
                "{} {} {} found in {} {}",
                "✗".red().bold(),
                total_errors.to_string().red().bold(),
                error_word,
                files,
                if files == 1 { "input" } else { "inputs" }
            );
        } else {
            println!(
                "✗ {} {} found in {} {}",
                total_errors,
                error_word,
                files,
                if files == 1 { "input" } else { "inputs" }
            );
        }
    }
}

pub fn print_fix_summary(reports: &[(String, CheckResult)], colored: bool) {
    let total_fixed: usize = reports.iter().map(|(_, r)| r.fixed_count).sum();

    println!();
    if total_fixed == 0 {
        if colored {
            println!("{}", "No corrections needed!".green().bold());
        } else {
            println!("No corrections needed!");
        }
        return;
    }

    if colored {
        println!("{}", "Correction summary".bold());
    } else {
        println!("Correction summary");
    }

    for (_, result) in reports {
        for correction in &result.corrections {
            print_correction(correction, colored);
        }
    }

    let fix_word = if total_fixed == 1 { "correction" } else { "corrections" };
    let files = reports.len();
    println!();
    if colored {
        println!(
            "{} {} {} applied to {} {}",
            "✓".green().bold(),
            total_fixed.to_string().green().bold(),
            fix_word,
            files,
            if files == 1 { "file" } else { "files" }
        );
    } else {
        println!(
            "✓ {} {} applied to {} {}",
            total_fixed,
            fix_word,
            files,
            if files == 1 { "file" } else { "files" }
        );
    }
}

fn print_correction(correction: &Correction, colored: bool) {
    if colored {
        println!(
            "  {} {} {}  {}",
            correction.original_word.red().strikethrough(),
            "→".dimmed(),
            correction.corrected_word.green(),
            format!("edit distance {}", correction.edit_distance).dimmed()
        );
    } else {
        println!(
            "  {} → {}  edit distance {}",
            correction.original_word, correction.corrected_word, correction.edit_distance
        );
    }
}

/// What the user picked for a flagged word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Replace(String),
    Skip,
    Quit,
}

impl Choice {
    /// Map a menu index to a choice. The menu lists `suggestions`, then
    /// "Skip", then "Quit".
    pub fn from_selection(selection: usize, suggestions: &[Suggestion]) -> Self {
        match suggestions.get(selection) {
            Some(suggestion) => Choice::Replace(suggestion.word.clone()),
            None if selection == suggestions.len() => Choice::Skip,
            None => Choice::Quit,
        }
    }
}

pub fn prompt_correction(text: &str, word: &WordAnalysis, colored: bool) -> Result<Choice> {
    let (line, column) = line_column(text, word.span.start);
    let context = Context::around(text, word.span);

    if colored {
        println!(
            "\n{} {}:{}",
            "Misspelling found:".yellow().bold(),
            line.to_string().blue(),
            column.to_string().blue()
        );
    } else {
        println!("\nMisspelling found: {}:{}", line, column);
    }
    println!("  {}", context.render(colored));

    if let Some(top) = word.top() {
        println!();
        print_matrix(&word.word.to_lowercase(), &top.word, &top.matrix, colored);
        println!();
    }

    let mut items: Vec<String> = word
        .suggestions
        .iter()
        .map(|s| format!("{} (distance {})", s.word, s.distance))
        .collect();
    items.push("Skip".to_string());
    items.push("Quit".to_string());

    let theme: Box<dyn Theme> = if colored {
        Box::new(ColorfulTheme::default())
    } else {
        Box::new(SimpleTheme)
    };

    let selection = Select::with_theme(theme.as_ref())
        .with_prompt(format!("Replace \"{}\" with", word.word))
        .items(&items)
        .default(0)
        .interact()?;

    Ok(Choice::from_selection(selection, &word.suggestions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("TEXT".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_context_marks_clipping() {
        let text = "a very long line of prose that contains one misspeled word near the end of it";
        let start = text.find("misspeled").unwrap();
        let context = Context::around(text, Span::new(start, start + 9));

        assert_eq!(context.word, "misspeled");
        assert!(context.clipped_start);
        assert!(context.clipped_end);
        assert_eq!(context.before.chars().count(), Context::RADIUS);
        assert!(context.render(false).starts_with("..."));
    }

    #[test]
    fn test_choice_from_selection() {
        let dictionary = crate::Dictionary::from_words(["quick", "quack"]).unwrap();
        let suggestions = crate::suggest("qick", &dictionary, 3);
        assert_eq!(suggestions.len(), 2);

        assert_eq!(
            Choice::from_selection(0, &suggestions),
            Choice::Replace("quick".to_string())
        );
        assert_eq!(
            Choice::from_selection(1, &suggestions),
            Choice::Replace("quack".to_string())
        );
        assert_eq!(Choice::from_selection(2, &suggestions), Choice::Skip);
        assert_eq!(Choice::from_selection(3, &suggestions), Choice::Quit);
        assert_eq!(Choice::from_selection(0, &[]), Choice::Skip);
    }

    #[test]
    fn test_context_on_later_line() {
        let text = "first line\nthe qick fox";
        let context = Context::around(text, Span::new(15, 19));
        assert_eq!(context.render(false), "the qick fox");
    }
}
