//! ccx - Entry Point

use ccx::config::{self, ResolvedConfig};
use ccx::discovery::{discover_projects, find_project};
use ccx::integration::decode_lines;
use ccx::model::{AppError, InputError, Message};
use ccx::parser::parse_session;
use ccx::source::{spawn_tail, LineTailer, TailStart};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{info, warn};

const PREVIEW_CHARS: usize = 80;

/// Claude Code session log toolkit
#[derive(Parser, Debug)]
#[command(name = "ccx")]
#[command(version)]
#[command(about = "Parse, list, and live-tail Claude Code JSONL session logs")]
pub struct Args {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Assistant home directory (contains `projects/`)
    #[arg(long, global = true)]
    pub claude_home: Option<PathBuf>,

    /// Live tail poll interval in milliseconds
    #[arg(long, global = true)]
    pub poll_interval_ms: Option<u64>,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Parse a session file and print its overview as JSON
    Parse {
        /// Session JSONL file
        file: PathBuf,

        /// Also print the message tree
        #[arg(long)]
        tree: bool,

        /// Also print the progressive section layout
        #[arg(long)]
        sections: bool,
    },

    /// Follow a session file and print each appended message
    Tail {
        /// Session JSONL file
        file: PathBuf,

        /// Replay the messages already in the file before following it
        #[arg(long)]
        from_start: bool,
    },

    /// List discovered projects and their sessions as JSON
    Projects {
        /// Only the project matching this name
        name: Option<String>,
    },
}

fn resolve_config(args: &Args) -> Result<ResolvedConfig, AppError> {
    // Defaults → Config File → Env Vars → CLI Args
    let config_file = config::load_config_with_precedence(args.config.clone())?;
    let merged = config::merge_config(config_file);
    let with_env = config::apply_env_overrides(merged);
    Ok(config::apply_cli_overrides(
        with_env,
        args.claude_home.clone(),
        args.poll_interval_ms,
    ))
}

fn preview(message: &Message) -> String {
    let text = match message.kind() {
        ccx::model::MessageKind::Command => message.command_name(),
        _ => message
            .first_text()
            .and_then(|t| t.lines().next())
            .unwrap_or(""),
    };
    text.chars().take(PREVIEW_CHARS).collect()
}

fn describe(message: &Message) -> String {
    let uuid = message.uuid().map_or("-", |u| u.as_str());
    format!("{:<15} {} {}", message.kind().as_str(), uuid, preview(message))
}

fn run_parse(
    config: &ResolvedConfig,
    file: PathBuf,
    tree: bool,
    sections: bool,
) -> Result<(), AppError> {
    let session = parse_session(&file, &config.parse_options())?;
    let mut out = io::stdout().lock();

    serde_json::to_writer_pretty(&mut out, &session.overview())?;
    writeln!(out)?;

    if tree {
        for (message, depth) in session.flatten_with_depth() {
            writeln!(out, "{}{}", "  ".repeat(depth), describe(message))?;
        }
    }

    if sections {
        let flat = session.flatten();
        let layout = config.section_splitter().layout(&flat);
        writeln!(
            out,
            "sections: {} (progressive: {}), hidden: {} sections / {} messages",
            layout.sections.len(),
            layout.progressive,
            layout.window.hidden_sections,
            layout.window.hidden_messages
        )?;
        for (index, section) in layout.sections.iter().enumerate() {
            let marker = if layout.window.sections.contains(&index) {
                "visible"
            } else {
                "hidden"
            };
            writeln!(
                out,
                "  #{index} {}..{} ({marker})",
                section.range.start, section.range.end
            )?;
        }
    }

    Ok(())
}

fn run_tail(config: &ResolvedConfig, file: PathBuf, from_start: bool) -> Result<(), AppError> {
    let start = if from_start {
        TailStart::Beginning
    } else {
        TailStart::End
    };
    let options = config.tail_options(start);
    let tailer = LineTailer::open(&file, &options)?;
    let subscription = spawn_tail(tailer, options.poll_interval).map_err(InputError::Io)?;
    info!(path = %file.display(), ?start, "Tailing session");

    let mut out = io::stdout().lock();
    for (index, line) in subscription.lines().iter().enumerate() {
        let (messages, errors) = decode_lines([line], index + 1);
        for err in errors {
            warn!(error = %err, "Skipping malformed appended record");
        }
        for message in &messages {
            writeln!(out, "{}", describe(message))?;
        }
        out.flush()?;
    }

    Ok(())
}

fn run_projects(config: &ResolvedConfig, name: Option<String>) -> Result<(), AppError> {
    let projects_dir = config.projects_dir();
    let options = config.parse_options();
    let projects: Vec<_> = match name {
        Some(name) => find_project(&projects_dir, &name, &options)?
            .into_iter()
            .collect(),
        None => discover_projects(&projects_dir, &options)?,
    };
    info!(dir = %projects_dir.display(), count = projects.len(), "Discovered projects");

    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &projects)?;
    writeln!(out)?;
    Ok(())
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    ccx::logging::init(&config.log_file_path)?;

    info!(
        config = ?config,
        "Configuration loaded and resolved"
    );

    match args.command {
        Command::Parse {
            file,
            tree,
            sections,
        } => run_parse(&config, file, tree, sections),
        Command::Tail { file, from_start } => run_tail(&config, file, from_start),
        Command::Projects { name } => run_projects(&config, name),
    }
}
