use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rex::{load_from_path, Engine, Flags, Hooks, PatternMatch};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "rex")]
#[command(about = "Regular expressions composed from named placeholders", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    options: EngineOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct EngineOptions {
    /// Placeholder library file, or a directory searched for .toml libraries
    #[arg(short, long = "library", global = true)]
    libraries: Vec<PathBuf>,

    /// Register a placeholder inline as NAME=REGEX (repeatable)
    #[arg(short = 'D', long = "define", value_name = "NAME=REGEX", global = true)]
    defines: Vec<String>,

    /// Case-insensitive matching
    #[arg(short = 'i', long, global = true)]
    ignore_case: bool,

    /// ^ and $ match at line boundaries
    #[arg(short = 'm', long, global = true)]
    multi_line: bool,

    /// . also matches newlines
    #[arg(short = 's', long, global = true)]
    dot_all: bool,

    /// Ignore whitespace and # comments in the pattern
    #[arg(short = 'x', long, global = true)]
    extended: bool,

    /// ASCII-only classes and case folding
    #[arg(short = 'a', long, global = true)]
    ascii: bool,

    /// Print the variable store after the command
    #[arg(long, global = true)]
    vars: bool,

    /// Debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

impl EngineOptions {
    fn flags(&self) -> Flags {
        let mut flags = Flags::empty();
        flags.set(Flags::IGNORECASE, self.ignore_case);
        flags.set(Flags::MULTILINE, self.multi_line);
        flags.set(Flags::DOTALL, self.dot_all);
        flags.set(Flags::VERBOSE, self.extended);
        flags.set(Flags::ASCII, self.ascii);
        flags
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Find the first match anywhere in the input
    Search {
        pattern: String,
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Match only at the start of the input
    Match {
        pattern: String,
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Print every non-overlapping match
    FindAll {
        pattern: String,
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Replace matches and print the result
    Sub {
        pattern: String,
        /// Replacement text; `$name` and `${n}` refer to groups
        replacement: String,
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,

        /// Replace at most N matches (0 replaces all)
        #[arg(short = 'n', long, default_value_t = 0)]
        count: usize,

        /// Show unified diff instead of the rewritten text
        #[arg(short, long)]
        diff: bool,
    },

    /// Search every string inside a JSON document
    Scan { pattern: String, json_file: PathBuf },

    /// Print the engine-ready form of a pattern
    Expand { pattern: String },

    /// List registered placeholders
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.options.verbose);

    let mut engine = build_engine(&cli.options)?;
    let flags = cli.options.flags();

    let matched = match cli.command {
        Commands::Search { pattern, file } => {
            cmd_single(&mut engine, &pattern, file.as_deref(), flags, false)?
        }
        Commands::Match { pattern, file } => {
            cmd_single(&mut engine, &pattern, file.as_deref(), flags, true)?
        }
        Commands::FindAll { pattern, file } => {
            cmd_find_all(&mut engine, &pattern, file.as_deref(), flags)?
        }
        Commands::Sub {
            pattern,
            replacement,
            file,
            count,
            diff,
        } => cmd_sub(
            &mut engine,
            &pattern,
            &replacement,
            file.as_deref(),
            count,
            flags,
            diff,
        )?,
        Commands::Scan { pattern, json_file } => {
            cmd_scan(&mut engine, &pattern, &json_file, flags)?
        }
        Commands::Expand { pattern } => cmd_expand(&engine, &pattern)?,
        Commands::List => cmd_list(&engine),
    };

    if cli.options.vars {
        print_variables(&engine);
    }

    if !matched {
        std::process::exit(1);
    }

    Ok(())
}

/// Logs go to stderr. `RUST_LOG` applies unless `--verbose` is given.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("rex=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn build_engine(options: &EngineOptions) -> Result<Engine> {
    let mut engine = Engine::new();

    for path in &options.libraries {
        for file in discover_libraries(path)? {
            let library = load_from_path(&file)?;
            engine
                .load_library(&library)
                .with_context(|| format!("failed to register library {}", file.display()))?;
        }
    }

    for define in &options.defines {
        let (name, regex) = define
            .split_once('=')
            .with_context(|| format!("--define expects NAME=REGEX, got '{define}'"))?;
        engine
            .register(name.trim(), regex)
            .with_context(|| format!("failed to define placeholder '{}'", name.trim()))?;
    }

    Ok(engine)
}

/// A file is used as-is; a directory contributes its `.toml` files, sorted.
fn discover_libraries(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("toml")
        {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No .toml placeholder libraries found in {}", path.display());
    }
    Ok(files)
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}

fn print_match(found: &PatternMatch) {
    println!(
        "{} {}",
        format!("{}..{}", found.byte_start, found.byte_end).dimmed(),
        found.text.green().bold()
    );
    for capture in &found.captures {
        println!("  {} = {}", capture.placeholder.cyan(), capture.value);
    }
}

fn print_variables(engine: &Engine) {
    let mut variables: Vec<_> = engine.variables().iter().collect();
    variables.sort();
    println!("{}", "Variables:".bold());
    for (name, value) in variables {
        println!("  {} = {}", name.cyan(), value);
    }
}

fn cmd_single(
    engine: &mut Engine,
    pattern: &str,
    file: Option<&Path>,
    flags: Flags,
    anchored: bool,
) -> Result<bool> {
    let input = read_input(file)?;
    let found = if anchored {
        engine.match_at_start_with(pattern, &input, flags, Hooks::new())?
    } else {
        engine.search_with(pattern, &input, flags, Hooks::new())?
    };

    match found {
        Some(found) => {
            print_match(&found);
            Ok(true)
        }
        None => {
            eprintln!("{}", "No match".yellow());
            Ok(false)
        }
    }
}

fn cmd_find_all(
    engine: &mut Engine,
    pattern: &str,
    file: Option<&Path>,
    flags: Flags,
) -> Result<bool> {
    let input = read_input(file)?;
    let mut count = 0;
    for found in engine.find_iter_with(pattern, &input, flags)? {
        print_match(&found);
        count += 1;
    }

    if count == 0 {
        eprintln!("{}", "No match".yellow());
    }
    Ok(count > 0)
}

fn cmd_sub(
    engine: &mut Engine,
    pattern: &str,
    replacement: &str,
    file: Option<&Path>,
    count: usize,
    flags: Flags,
    show_diff: bool,
) -> Result<bool> {
    let input = read_input(file)?;
    let output = engine.substitute_with(pattern, replacement, &input, count, flags)?;

    if show_diff {
        let label = file.map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());
        display_diff(&label, &input, &output);
    } else {
        print!("{output}");
    }
    Ok(true)
}

fn display_diff(label: &str, original: &str, modified: &str) {
    println!("{}", format!("--- {label} (original)").dimmed());
    println!("{}", format!("+++ {label} (substituted)").dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let line = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", line);
    }
}

fn cmd_scan(engine: &mut Engine, pattern: &str, json_file: &Path, flags: Flags) -> Result<bool> {
    let contents = fs::read_to_string(json_file)
        .with_context(|| format!("failed to read {}", json_file.display()))?;
    let data: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse JSON from {}", json_file.display()))?;

    let matches = engine.recursive_search_with(pattern, &data, flags)?;
    for found in &matches {
        print_match(found);
    }

    if matches.is_empty() {
        eprintln!("{}", "No match".yellow());
    }
    Ok(!matches.is_empty())
}

fn cmd_expand(engine: &Engine, pattern: &str) -> Result<bool> {
    let expansion = engine.expand(pattern)?;
    println!("{}", expansion.pattern());
    for group in expansion.groups() {
        eprintln!(
            "  {} <- {} #{}",
            group.name().cyan(),
            group.placeholder(),
            group.occurrence()
        );
        for alternative in group.alternatives() {
            eprintln!("    {}", alternative.dimmed());
        }
    }
    Ok(true)
}

fn cmd_list(engine: &Engine) -> bool {
    let registry = engine.registry();
    if registry.is_empty() {
        eprintln!("{}", "No placeholders registered".yellow());
        return true;
    }

    for name in registry.names() {
        println!("{}", name.bold());
        if let Some(placeholder) = registry.get(name) {
            for rule in placeholder.rules() {
                match rule.variable() {
                    Some(variable) => println!("  {}  -> {}", rule.pattern(), variable.cyan()),
                    None => println!("  {}", rule.pattern()),
                }
            }
        }
    }
    true
}
