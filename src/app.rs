//! Application startup and command execution.
//!
//! This module contains exit codes, tracing setup, and the handlers
//! behind each subcommand.

use std::sync::Arc;

use masqconf::cache::{CacheOptions, ChangeWatcher, ConfigSnapshot, SnapshotCache};
use masqconf::cli::{Cli, Command};
use masqconf::files::FileRole;
use masqconf::resolve::ResolvedValue;
use thiserror::Error;
use tokio_stream::StreamExt;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Runtime error (exit code 1) - I/O failure, rendering failure.
    pub const RUNTIME_ERROR: ExitCode = ExitCode::FAILURE;
}

/// Errors surfaced by command execution.
#[derive(Debug, Error)]
pub enum AppError {
    /// JSON rendering failed.
    #[error("failed to render JSON output: {0}")]
    Render(#[from] serde_json::Error),
}

/// Sets up the tracing subscriber for logging.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Runs the selected subcommand to completion.
pub async fn execute(cli: Cli) -> Result<(), AppError> {
    let cache = Arc::new(SnapshotCache::new(
        &cli.conf,
        cli.managed.clone(),
        cli.managed_hosts.clone(),
    ));

    match cli.command {
        Command::Files => {
            let snapshot = cache.snapshot().await;
            print_files(&snapshot);
        }
        Command::Show { json } => {
            let snapshot = cache.snapshot().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&*snapshot)?);
            } else {
                print_effective(&snapshot);
            }
        }
        Command::Hosts { json } => {
            let snapshot = cache.snapshot().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot.dhcp_hosts)?);
            } else {
                print_hosts(&snapshot);
            }
        }
        Command::Watch => watch(&cache).await,
    }
    Ok(())
}

fn role_label(role: FileRole) -> &'static str {
    match role {
        FileRole::Main => "main",
        FileRole::ConfFile => "conf-file",
        FileRole::ConfDir => "conf-dir",
    }
}

fn print_files(snapshot: &ConfigSnapshot) {
    for file in &snapshot.set.files {
        let managed = if file.is_managed { "  [managed]" } else { "" };
        println!(
            "{:<9}  {}{managed}",
            role_label(file.role),
            file.path.display()
        );
    }
}

/// Prints the options that are actually set, with their winning source.
fn print_effective(snapshot: &ConfigSnapshot) {
    for (name, value) in snapshot.effective.iter() {
        let sources = snapshot.sources.get(name);
        let origin = sources
            .last()
            .map(|p| match p.line_number {
                Some(n) => format!("  ({}:{n})", p.file_name),
                None => format!("  ({})", p.file_name),
            })
            .unwrap_or_default();

        match value {
            ResolvedValue::Flag { enabled: true } => println!("{name}{origin}"),
            ResolvedValue::Scalar {
                value: Some(v), ..
            } => println!("{name}={v}{origin}"),
            ResolvedValue::List { values } if !values.is_empty() => {
                for (v, p) in values.iter().zip(sources) {
                    let origin = match p.line_number {
                        Some(n) => format!("  ({}:{n})", p.file_name),
                        None => format!("  ({})", p.file_name),
                    };
                    println!("{name}={v}{origin}");
                }
            }
            _ => {}
        }
    }
}

fn print_hosts(snapshot: &ConfigSnapshot) {
    for sourced in &snapshot.dhcp_hosts {
        let entry = &sourced.entry;
        let state = if entry.is_deleted {
            " [deleted]"
        } else if entry.is_comment {
            " [commented]"
        } else {
            ""
        };
        let origin = match sourced.source.line_number {
            Some(n) => format!("{}:{n}", sourced.source.file_name),
            None => sourced.source.file_name.clone(),
        };
        println!(
            "{:<40}  macs={:<18}  addr={:<15}  name={:<12}  {origin}{state}",
            entry.id,
            entry.macs.join(","),
            entry.address.as_deref().unwrap_or("-"),
            entry.name.as_deref().unwrap_or("-"),
        );
    }
}

/// Watches every file in the discovered set and logs changes until
/// interrupted. The watch set is re-derived after each rebuild, so a
/// new conf-file or conf-dir member added at runtime gets picked up.
async fn watch(cache: &Arc<SnapshotCache>) {
    let mut snapshot = cache.snapshot().await;
    tracing::info!(
        files = snapshot.set.files.len(),
        hosts = snapshot.dhcp_hosts.len(),
        "watching config set"
    );

    loop {
        let paths: Vec<_> = snapshot.set.paths().map(std::path::Path::to_path_buf).collect();
        let mut stream =
            ChangeWatcher::new(paths, CacheOptions::default().watch_poll_interval).into_stream();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, stopping watch");
                return;
            }
            Some(changed) = stream.next() => {
                for path in &changed {
                    tracing::info!(path = %path.display(), "config file changed");
                    cache.note_external_change(path).await;
                }
                snapshot = cache.snapshot().await;
                tracing::info!(
                    files = snapshot.set.files.len(),
                    hosts = snapshot.dhcp_hosts.len(),
                    "config set rebuilt"
                );
            }
        }
    }
}
