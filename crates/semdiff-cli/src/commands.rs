use std::io::Read;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use semdiff_diff::{
    detect_format, process_multi_file_diff_with, semantic_diff_with, ChangeKind, DiffFormat,
    DiffPayload, DiffResult,
};
use semdiff_fetch::{compare_two_revisions_with, GitFetcher};
use tracing::debug;

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        format,
        config,
        ..
    } = cli;
    let config = CliConfig::load(config.as_deref())?;
    debug!(?config, "configuration loaded");

    match command {
        Command::Compare(args) => cmd_compare(args, &config, &format),
        Command::Revisions(args) => cmd_revisions(args, &config, &format),
        Command::Patch(args) => cmd_patch(args, &config, &format),
        Command::Detect(args) => cmd_detect(args, &format),
        Command::Formats => cmd_formats(&format),
    }
}

fn cmd_compare(args: CompareArgs, config: &CliConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let base = read_if_exists(&args.base)?;
    let head = read_if_exists(&args.head)?;
    if base.is_none() && head.is_none() {
        anyhow::bail!(
            "neither {} nor {} exists",
            args.base.display(),
            args.head.display()
        );
    }

    let path = args.path.unwrap_or_else(|| {
        let named = if head.is_some() { &args.head } else { &args.base };
        named.to_string_lossy().into_owned()
    });
    let result = semantic_diff_with(&config.diff, &path, base.as_deref(), head.as_deref());
    print_result(&path, &result, format)
}

fn cmd_revisions(args: RevisionsArgs, config: &CliConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let fetcher = GitFetcher::with_config(&args.repo, config.fetch.clone());
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let result = runtime.block_on(compare_two_revisions_with(
        &config.diff,
        &fetcher,
        &args.path,
        &args.base_ref,
        &args.head_ref,
    ))?;
    print_result(&args.path, &result, format)
}

fn cmd_patch(args: PatchArgs, config: &CliConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let raw = match &args.file {
        Some(file) => std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read patch from stdin")?;
            buf
        }
    };

    let output = process_multi_file_diff_with(&config.diff, &raw);
    match format {
        OutputFormat::Text => print!("{output}"),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "diff": output }))?)
        }
    }
    Ok(())
}

fn cmd_detect(args: DetectArgs, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for path in &args.paths {
                println!("{}  {}", path.bold(), format_label(detect_format(path)));
            }
        }
        OutputFormat::Json => {
            let entries: Vec<_> = args
                .paths
                .iter()
                .map(|path| serde_json::json!({ "path": path, "format": detect_format(path) }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}

fn cmd_formats(format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for f in DiffFormat::ALL {
                let extensions = if f.extensions().is_empty() {
                    "(everything else)".dimmed().to_string()
                } else {
                    f.extensions()
                        .iter()
                        .map(|e| format!(".{e}"))
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                println!("{:<18} {}", format_label(f), extensions);
            }
        }
        OutputFormat::Json => {
            let entries: Vec<_> = DiffFormat::ALL
                .into_iter()
                .map(|f| serde_json::json!({ "format": f, "extensions": f.extensions() }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}

/// Read a file, treating a missing file as an absent side.
fn read_if_exists(path: &Path) -> anyhow::Result<Option<Vec<u8>>> {
    if !path.exists() {
        return Ok(None);
    }
    if path.is_dir() {
        anyhow::bail!("{} is a directory, not a file", path.display());
    }
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Some(bytes))
}

fn format_label(format: DiffFormat) -> colored::ColoredString {
    match format {
        DiffFormat::Fallback => format.as_str().dimmed(),
        DiffFormat::CodeDeclaration => format.as_str().magenta(),
        _ => format.as_str().cyan(),
    }
}

fn print_result(path: &str, result: &DiffResult, format: &OutputFormat) -> anyhow::Result<()> {
    if *format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("{} ({})", path.bold(), format_label(result.format));
    if let Some(message) = &result.message {
        println!("{}", message.dimmed());
    }

    match &result.diff {
        DiffPayload::Structural(changes) if changes.is_empty() => {
            println!("{}", "no changes detected".green());
        }
        DiffPayload::Structural(changes) => {
            for change in &changes.changes {
                let line = change.to_string();
                let line = match change.kind {
                    ChangeKind::Added => line.green(),
                    ChangeKind::Removed => line.red(),
                    ChangeKind::Changed => line.yellow(),
                    ChangeKind::Modified => line.cyan(),
                };
                println!("{line}");
            }
            println!(
                "{} added, {} removed, {} changed",
                changes.additions().to_string().green(),
                changes.removals().to_string().red(),
                changes.modifications().to_string().yellow()
            );
        }
        DiffPayload::Unified(text) => {
            for line in text.lines() {
                let line = if line.starts_with("+++") || line.starts_with("---") {
                    line.bold()
                } else if line.starts_with('+') {
                    line.green()
                } else if line.starts_with('-') {
                    line.red()
                } else if line.starts_with("@@") {
                    line.cyan()
                } else {
                    line.normal()
                };
                println!("{line}");
            }
        }
    }
    Ok(())
}
