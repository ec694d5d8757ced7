use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use levspell::cli::output::{self, OutputFormat};
use levspell::{dict, CheckResult, Config, SpellChecker};
use log::warn;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "levspell")]
#[command(version, about = "Edit-distance spell checker with ranked suggestions", long_about = None)]
struct Cli {
    /// Files to check (reads stdin when none are given)
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Fix misspellings in place (auto-apply top suggestion)
    #[arg(short, long)]
    fix: bool,

    /// Interactive mode for selecting corrections (text output only)
    #[arg(short, long, requires = "fix", conflicts_with = "format")]
    interactive: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with code 0 even if errors are found
    #[arg(long)]
    no_fail: bool,

    /// Language of the installed or bundled dictionary (e.g., en_US)
    #[arg(short, long, env = "LEVSPELL_LANGUAGE")]
    language: Option<String>,

    /// Word list or .dict file to check against
    #[arg(short, long, value_name = "PATH")]
    dictionary: Option<PathBuf>,

    /// Suggestions to show per word
    #[arg(short = 'n', long, value_name = "N")]
    limit: Option<usize>,

    /// Print the edit-distance matrix of every suggestion
    #[arg(short, long)]
    matrix: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the edit distance, cost matrix and edit path between two words
    Distance {
        word: String,
        comparison: String,
    },
    /// Dictionary management
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DictCommands {
    /// List installed dictionaries
    List,
    /// Show dictionary info
    Info {
        /// Language code
        language: String,
    },
    /// Install a dictionary built from a word list (one word per line)
    Build {
        /// Language code to install under (e.g., en_US)
        language: String,
        /// Plain-text word list
        wordlist: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let colored = !cli.no_color;

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "levspell", &mut io::stdout());
        return Ok(());
    }

    if let Some(command) = cli.command {
        return handle_command(command, colored);
    }

    let config = Config::load(cli.language, cli.dictionary, cli.limit, cli.matrix)?;
    let checker = SpellChecker::new(&config)?;

    let mut reports: Vec<(String, CheckResult)> = Vec::new();

    if cli.files.is_empty() {
        if cli.fix {
            anyhow::bail!("--fix needs at least one file. Use --help for usage information.");
        }
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read standard input")?;
        reports.push(("<stdin>".to_string(), checker.check_text(&input)));
    } else {
        let files: Vec<PathBuf> = cli
            .files
            .iter()
            .filter(|path| {
                let exists = path.exists();
                if !exists {
                    warn!("File not found: {}", path.display());
                }
                exists
            })
            .cloned()
            .collect();

        if cli.fix {
            for file in &files {
                let result = if cli.interactive {
                    checker.fix_interactive(file, colored)?
                } else {
                    checker.fix_auto(file)?
                };
                reports.push((file.display().to_string(), result));
            }
        } else {
            for (file, result) in files.iter().zip(checker.check_all(&files)) {
                reports.push((file.display().to_string(), result?));
            }
        }
    }

    let total_errors: usize = reports.iter().map(|(_, r)| r.error_count).sum();

    // Interactive mode already showed each word as it went.
    if !cli.interactive {
        output::print_report(&reports, colored, &cli.format, config.show_matrix);
    }

    if cli.format == OutputFormat::Text {
        if cli.fix {
            output::print_fix_summary(&reports, colored);
        } else {
            let all_correct =
                !reports.is_empty() && reports.iter().all(|(_, r)| r.analysis.all_correct);
            output::print_check_summary(total_errors, reports.len(), all_correct, colored);
        }
    }

    // Exit with appropriate code
    if total_errors > 0 && !cli.no_fail && !cli.fix {
        std::process::exit(1);
    }

    Ok(())
}

fn handle_command(command: Commands, colored: bool) -> Result<()> {
    match command {
        Commands::Distance { word, comparison } => {
            output::print_distance(&word, &comparison, colored);
        }
        Commands::Dict { action } => match action {
            DictCommands::List => {
                dict::manager::list_dictionaries()?;
            }
            DictCommands::Info { language } => {
                dict::manager::show_info(&language)?;
            }
            DictCommands::Build { language, wordlist } => {
                dict::manager::build_dictionary(&language, &wordlist)?;
            }
        },
    }
    Ok(())
}
