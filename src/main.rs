use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use cuda2rs::config::{GenOptions, ProjectConfig};
use cuda2rs::diagnostic::render_diagnostics;
use cuda2rs::{check_file, generate_file, CheckStatus, GenError, Outcome};

#[derive(Parser)]
#[command(
    name = "cuda2rs",
    version,
    about = "Generate Rust launch wrappers for CUDA kernels"
)]
struct Cli {
    /// Kernel sources (.cu); the PTX is read from the file next to each one
    #[arg(required = true, value_name = "FILES")]
    files: Vec<PathBuf>,
    /// Check that outputs are up to date without writing (exit 1 if stale)
    #[arg(long)]
    check: bool,
    /// Project configuration (default: nearest cuda2rs.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Module path the generated code imports the runtime from
    #[arg(long, value_name = "PATH")]
    runtime_path: Option<String>,
    /// Log per-file details
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let options = match resolve_options(&cli) {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("error: {}", msg);
            process::exit(1);
        }
    };

    // Files are processed in order; the first failure stops the run.
    let mut stale = false;
    for file in &cli.files {
        if cli.check {
            match check_file(file, &options) {
                Ok(CheckStatus::UpToDate(output)) => eprintln!("OK: {}", output.display()),
                Ok(CheckStatus::Stale(output)) => {
                    eprintln!("stale: {}", output.display());
                    stale = true;
                }
                Ok(CheckStatus::Missing(output)) => {
                    eprintln!("missing: {}", output.display());
                    stale = true;
                }
                Err(err) => fail(&err),
            }
        } else {
            match generate_file(file, &options) {
                Ok(Outcome::Written(output)) => eprintln!("Generated: {}", output.display()),
                Ok(Outcome::Unchanged(output)) => {
                    eprintln!("Up to date: {}", output.display())
                }
                Err(err) => fail(&err),
            }
        }
    }

    if stale {
        process::exit(1);
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Defaults, then the project file, then command-line flags.
fn resolve_options(cli: &Cli) -> Result<GenOptions, String> {
    let config_path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => cli.files.first().and_then(|file| ProjectConfig::find(&search_root(file))),
    };

    let mut options = match config_path {
        Some(path) => {
            debug!(config = %path.display(), "using project configuration");
            GenOptions::from_project(&ProjectConfig::load(&path)?)
        }
        None => GenOptions::default(),
    };
    if let Some(runtime_path) = &cli.runtime_path {
        options = options.with_runtime_path(runtime_path);
    }
    options.validate()?;
    Ok(options)
}

/// Directory of `file`, made absolute so the search can walk past the
/// working directory.
fn search_root(file: &Path) -> PathBuf {
    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    dir.canonicalize().unwrap_or(dir)
}

fn fail(err: &GenError) -> ! {
    if let GenError::Syntax {
        file,
        text,
        diagnostics,
    } = err
    {
        render_diagnostics(diagnostics, &file.to_string_lossy(), text);
    }
    eprintln!("error: {}", err);
    process::exit(1);
}
