//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Maximum number of jobs accepted by the CLI.
const MAX_JOBS: usize = 64;

/// A declarative, YAML-powered Makefile generator for C and C++ repositories.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the build description file to use.
    #[arg(short, long, value_name = "FILE", default_value = "BUILD.yaml")]
    pub file: Utf8PathBuf,

    /// Run as if started in this directory.
    ///
    /// This affects build description lookup and where make is invoked.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<Utf8PathBuf>,

    /// Set the number of parallel build jobs.
    ///
    /// Values must be between 1 and 64.
    #[arg(short, long, value_name = "N", value_parser = parse_jobs)]
    pub jobs: Option<usize>,

    /// Enable verbose diagnostic logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Optional subcommand to execute; defaults to `build` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Apply the default command if none was specified.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Build {
                emit: None,
                targets: Vec::new(),
            });
        }
        self
    }
}

/// Available top-level commands for makegen.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Build specified targets (or everything if none are given).
    Build {
        /// Write the generated Makefile to this path and retain it.
        #[arg(long, value_name = "FILE")]
        emit: Option<Utf8PathBuf>,

        /// A list of specific targets to build.
        targets: Vec<String>,
    },

    /// Write the generated Makefile to the specified file without invoking
    /// make.
    Emit {
        /// Output path for the generated Makefile.
        #[arg(value_name = "FILE")]
        file: Utf8PathBuf,
    },

    /// Remove build artefacts, virtual mounts, and marker files.
    Clean,

    /// Display the target dependency graph in DOT format.
    Graph,
}

fn parse_jobs(value: &str) -> Result<usize, String> {
    let jobs: usize = value
        .parse()
        .map_err(|_| format!("invalid job count: {value}"))?;
    if (1..=MAX_JOBS).contains(&jobs) {
        Ok(jobs)
    } else {
        Err(format!("job count must be between 1 and {MAX_JOBS}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_command_is_build() {
        let cli = Cli::parse_from(["makegen"]).with_default_command();
        assert_eq!(
            cli.command,
            Some(Commands::Build {
                emit: None,
                targets: Vec::new(),
            })
        );
        assert_eq!(cli.file, "BUILD.yaml");
    }

    #[rstest]
    #[case("0")]
    #[case("65")]
    #[case("lots")]
    fn job_bounds_are_enforced(#[case] jobs: &str) {
        assert!(Cli::try_parse_from(["makegen", "--jobs", jobs]).is_err());
    }

    #[rstest]
    fn jobs_within_bounds_parse() {
        let cli = Cli::parse_from(["makegen", "--jobs", "8"]);
        assert_eq!(cli.jobs, Some(8));
    }
}
