use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Select};
use tracing_subscriber::EnvFilter;

use sostriage::config::{Config, CONFIG_FILE};
use sostriage::error::TriageError;
use sostriage::output::{OutputFormat, StreamReporter};
use sostriage::rules::read_policy;
use sostriage::AnalyzeOptions;

#[derive(Parser)]
#[command(
    name = "sos-triage",
    about = "Scan the sosreports of a support case against a rule policy",
    version
)]
struct Cli {
    /// Log file receiving the full run log
    #[arg(long, global = true, default_value = "sos-triage.log")]
    log_file: PathBuf,

    /// Config file path
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze every sosreport of a case
    Scan {
        /// Directory containing sosreports, one subdirectory per case
        #[arg(long, short = 'd', env = "SOS_TRIAGE_SOURCE")]
        directory: Option<PathBuf>,

        /// Rules file with full path
        #[arg(long, short = 'r', env = "SOS_TRIAGE_RULES")]
        rules: Option<PathBuf>,

        /// Directory number to which the sosreports were extracted
        #[arg(long, short = 'c')]
        case: Option<String>,

        /// Output format (console, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Also write the full report to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Show the rules a policy file defines
    ListRules {
        /// Rules file with full path
        #[arg(long, short = 'r', env = "SOS_TRIAGE_RULES")]
        rules: Option<PathBuf>,

        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Generate a starter .sos-triage.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_file);

    let result = match cli.command {
        Commands::Scan {
            directory,
            rules,
            case,
            format,
            output,
        } => cmd_scan(&cli.config, directory, rules, case, format, output),
        Commands::ListRules { rules, format } => cmd_list_rules(&cli.config, rules, format),
        Commands::Init { force } => cmd_init(&cli.config, force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn init_logging(log_file: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
    {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        Err(e) => {
            eprintln!(
                "Warning: cannot open log file {}: {}, logging warnings to stderr",
                log_file.display(),
                e
            );
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("warn"))
                .with_writer(io::stderr)
                .init();
        }
    }
}

fn running_in_container() -> bool {
    std::env::var_os("IS_CONTAINER").is_some_and(|v| !v.is_empty())
}

/// Source directory and rules file a scan runs against.
#[derive(Debug, PartialEq, Eq)]
struct ScanPaths {
    source: PathBuf,
    rules: PathBuf,
}

/// Flags (or their env vars, via clap) win over the config file.
fn resolve_paths(config: Config, directory: Option<PathBuf>, rules: Option<PathBuf>) -> ScanPaths {
    ScanPaths {
        source: directory.unwrap_or(config.files.source),
        rules: rules.unwrap_or(config.files.rules),
    }
}

/// Containers have no terminal to pick a case from.
fn require_case(in_container: bool, case: Option<&str>) -> Result<(), TriageError> {
    if in_container && case.is_none() {
        return Err(TriageError::CaseRequired);
    }
    Ok(())
}

fn validate_source(source: &Path) -> Result<(), TriageError> {
    if !source.is_dir() {
        return Err(TriageError::Directory(format!(
            "The selected directory {} doesn't exist. Select a new directory and try again.",
            source.display()
        )));
    }
    Ok(())
}

/// Case directories under `source`, sorted by name.
fn case_choices(source: &Path) -> Result<Vec<String>, TriageError> {
    let mut choices: Vec<String> = std::fs::read_dir(source)?
        .flatten()
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    choices.sort();

    if choices.is_empty() {
        return Err(TriageError::NoReports(source.display().to_string()));
    }
    Ok(choices)
}

/// Let the user pick a case directory. `None` when the prompt is dismissed.
fn select_case(source: &Path) -> Result<Option<String>, TriageError> {
    let choices = case_choices(source)?;

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Choose the sos directory")
        .items(&choices)
        .default(0)
        .interact_opt()
        .map_err(|e| TriageError::Io(io::Error::other(e)))?;

    Ok(selection.map(|idx| choices[idx].clone()))
}

fn cmd_scan(
    config_path: &Path,
    directory: Option<PathBuf>,
    rules: Option<PathBuf>,
    case: Option<String>,
    format_str: String,
    output_path: Option<PathBuf>,
) -> Result<i32, TriageError> {
    let paths = resolve_paths(Config::load(config_path)?, directory, rules);

    let format = OutputFormat::from_str_lenient(&format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    });

    require_case(running_in_container(), case.as_deref())?;
    validate_source(&paths.source)?;

    let case_id = match case {
        Some(case) => case,
        None => match select_case(&paths.source)? {
            Some(case) => case,
            None => {
                eprintln!("No case selected.");
                return Ok(1);
            }
        },
    };

    let options = AnalyzeOptions {
        source_dirs: vec![paths.source],
        rules_path: paths.rules,
        case_id,
    };

    let stdout = io::stdout();
    let mut reporter = StreamReporter::new(stdout.lock(), format);
    let summaries = sostriage::analyze(&options, &mut reporter)?;

    if let Some(out) = output_path {
        let rendered = sostriage::output::render(&summaries, format)?;
        std::fs::write(&out, rendered)?;
    }

    Ok(0)
}

fn cmd_list_rules(
    config_path: &Path,
    rules: Option<PathBuf>,
    format_str: String,
) -> Result<i32, TriageError> {
    let rules = match rules {
        Some(rules) => rules,
        None => Config::load(config_path)?.files.rules,
    };
    let policy = read_policy(&rules)?;

    match format_str.as_str() {
        "json" => println!("{}", policy.to_json_string()?),
        _ => {
            println!("{:<20} {:<32} {:<28} QUERY", "RULE", "PATH", "FILES");
            println!("{}", "-".repeat(100));
            for (name, rule) in policy.iter() {
                println!(
                    "{:<20} {:<32} {:<28} {}",
                    name,
                    rule.path,
                    rule.files.join(","),
                    rule.query,
                );
            }
        }
    }

    Ok(0)
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32, TriageError> {
    if config_path.exists() && !force {
        eprintln!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
        return Ok(1);
    }

    std::fs::write(config_path, Config::starter_toml())?;
    println!("Created {}", config_path.display());

    Ok(0)
}
