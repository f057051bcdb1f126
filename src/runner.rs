//! CLI execution and command dispatch logic.
//!
//! This module keeps [`main`](crate) minimal by providing a single entry
//! point that handles command execution. Build requests are delegated to a
//! make subprocess, streaming its output back to the user.

use crate::cli::{Cli, Commands};
use crate::env::Environment;
use crate::graph::TargetGraph;
use crate::manifest;
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;
use tempfile::Builder;
use tracing::{debug, info};

/// Execute the parsed [`Cli`] commands.
///
/// # Errors
///
/// Returns an error if generation or the make process fails.
pub fn run(cli: &Cli) -> Result<()> {
    let command = cli.command.clone().unwrap_or(Commands::Build {
        emit: None,
        targets: Vec::new(),
    });
    match command {
        Commands::Build { emit, targets } => {
            let makefile = load_graph(cli)?.generate();
            if let Some(path) = emit {
                write_and_log(path.as_std_path(), &makefile)?;
                run_make(Path::new("make"), cli, path.as_std_path(), &targets)?;
            } else {
                let tmp = Builder::new()
                    .prefix("makegen.")
                    .suffix(".mk")
                    .tempfile()
                    .context("create temp file")?;
                write_and_log(tmp.path(), &makefile)?;
                run_make(Path::new("make"), cli, tmp.path(), &targets)?;
            }
            Ok(())
        }
        Commands::Emit { file } => {
            let makefile = load_graph(cli)?.generate();
            write_and_log(file.as_std_path(), &makefile)?;
            Ok(())
        }
        Commands::Clean => {
            let makefile = load_graph(cli)?.generate();
            let tmp = Builder::new()
                .prefix("makegen.")
                .suffix(".mk")
                .tempfile()
                .context("create temp file")?;
            write_and_log(tmp.path(), &makefile)?;
            run_make(Path::new("make"), cli, tmp.path(), &["clean".to_owned()])?;
            Ok(())
        }
        Commands::Graph => {
            let graph = load_graph(cli)?;
            println!("{}", graph.dot());
            Ok(())
        }
    }
}

/// Write `content` to `path` and log the file's location.
fn write_and_log(path: &Path, content: &str) -> io::Result<()> {
    fs::write(path, content)?;
    info!("Generated Makefile at {}", path.display());
    Ok(())
}

/// Load the build description referenced by `cli` and build its target
/// graph.
fn load_graph(cli: &Cli) -> Result<TargetGraph> {
    let manifest_path = cli
        .directory
        .as_ref()
        .map_or_else(|| cli.file.clone(), |dir| dir.join(&cli.file));
    let manifest = manifest::from_path(&manifest_path)
        .with_context(|| format!("loading build description at {manifest_path}"))?;
    let ast_json = serde_json::to_string_pretty(&manifest).context("serialising description")?;
    debug!("AST:\n{ast_json}");
    let env = Arc::new(Environment::new(".").with_flags(manifest.flags.clone()));
    TargetGraph::from_manifest(&manifest, env).context("building target graph")
}

/// Check if `arg` contains a sensitive keyword.
fn contains_sensitive_keyword(arg: &str) -> bool {
    let lower = arg.to_lowercase();
    lower.contains("password") || lower.contains("token") || lower.contains("secret")
}

/// Redact sensitive information in a single argument, preserving keys.
fn redact_argument(arg: &str) -> String {
    if contains_sensitive_keyword(arg) {
        arg.split_once('=').map_or_else(
            || "***REDACTED***".to_string(),
            |(key, _)| format!("{key}=***REDACTED***"),
        )
    } else {
        arg.to_string()
    }
}

/// Redact sensitive information from all `args`.
fn redact_sensitive_args(args: &[String]) -> Vec<String> {
    args.iter().map(|arg| redact_argument(arg)).collect()
}

/// Invoke the make executable with the provided CLI settings.
///
/// The function forwards the job count and working directory to make,
/// names the generated build file, and streams the child's standard output
/// and error back to the user.
///
/// # Errors
///
/// Returns an [`io::Error`] if the make process fails to spawn or reports
/// a non-zero exit status.
///
/// # Panics
///
/// Panics if the child's output streams cannot be captured.
pub fn run_make(
    program: &Path,
    cli: &Cli,
    build_file: &Path,
    targets: &[String],
) -> io::Result<()> {
    let mut cmd = Command::new(program);
    if let Some(dir) = &cli.directory {
        // Resolve the directory so make receives a stable absolute path
        // regardless of where the generated file was written.
        let dir = fs::canonicalize(dir.as_std_path())?;
        cmd.current_dir(dir);
    }
    if let Some(jobs) = cli.jobs {
        cmd.arg("-j").arg(jobs.to_string());
    }
    // Canonicalise the build file path so make resolves it correctly from
    // the working directory. Fall back to the original on failure so make
    // can surface a meaningful error.
    let build_file_path = build_file
        .canonicalize()
        .unwrap_or_else(|_| build_file.to_path_buf());
    cmd.arg("-f").arg(&build_file_path);
    cmd.args(targets);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let program = cmd.get_program().to_string_lossy().into_owned();
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    let redacted_args = redact_sensitive_args(&args);
    info!("Running command: {} {}", program, redacted_args.join(" "));

    let mut child = cmd.spawn()?;
    let stdout = child.stdout.take().expect("child stdout");
    let stderr = child.stderr.take().expect("child stderr");

    let out_handle = thread::spawn(move || {
        let reader = BufReader::new(stdout);
        let mut handle = io::stdout();
        for line in reader.lines().map_while(Result::ok) {
            let _ = writeln!(handle, "{line}");
        }
    });
    let err_handle = thread::spawn(move || {
        let reader = BufReader::new(stderr);
        let mut handle = io::stderr();
        for line in reader.lines().map_while(Result::ok) {
            let _ = writeln!(handle, "{line}");
        }
    });

    let status = child.wait()?;
    let _ = out_handle.join();
    let _ = err_handle.join();

    if status.success() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::Other,
            format!("make exited with {status}"),
        ))
    }
}
