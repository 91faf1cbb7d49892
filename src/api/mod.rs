//! Public entry points: generate a launch wrapper from strings or from a
//! kernel file on disk.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::codegen::{build_wrapper, render};
use crate::config::GenOptions;
use crate::diagnostic::{render_diagnostics, Diagnostic};
use crate::ir::KernelArtifact;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::types::resolve_params;


/// Failure to generate the wrapper for one input file.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The kernel source (or its PTX) was rejected. `text` is the source the
    /// diagnostics point into.
    #[error("{}: {}", .file.display(), first_message(.diagnostics))]
    Syntax {
        file: PathBuf,
        text: String,
        diagnostics: Vec<Diagnostic>,
    },
    #[error("{0}")]
    Config(String),
}

fn first_message(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .first()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "invalid kernel".to_string())
}

/// What [`generate_file`] did with the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Written(PathBuf),
    /// The output already had the generated content.
    Unchanged(PathBuf),
}

/// Result of comparing an output file with what would be generated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckStatus {
    UpToDate(PathBuf),
    Stale(PathBuf),
    Missing(PathBuf),
}

impl CheckStatus {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, CheckStatus::UpToDate(_))
    }
}

/// BLAKE3 over everything the generated file depends on.
pub fn fingerprint(source: &str, ptx: &str, options: &GenOptions) -> String {
    let mut hasher = blake3::Hasher::new();
    for part in [
        env!("CARGO_PKG_VERSION"),
        source,
        ptx,
        options.runtime_path.as_str(),
        options.launcher_prefix.as_str(),
    ] {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// A rendered wrapper and the warnings raised while producing it.
#[derive(Clone, Debug)]
pub struct Generated {
    pub text: String,
    pub warnings: Vec<Diagnostic>,
}

/// Generate the wrapper for kernel source `source` and its compiled PTX.
///
/// `filename` is only used in the generated header.
pub fn generate_source(
    source: &str,
    filename: &str,
    raw_ptx: &str,
    options: &GenOptions,
) -> Result<String, Diagnostic> {
    generate(source, filename, raw_ptx, options).map(|generated| generated.text)
}

/// Like [`generate_source`], but also returns warnings (additional kernels
/// in the file) instead of dropping them.
pub fn generate(
    source: &str,
    filename: &str,
    raw_ptx: &str,
    options: &GenOptions,
) -> Result<Generated, Diagnostic> {
    let tokens = Lexer::new(source).tokenize()?;
    debug!(file = filename, tokens = tokens.len(), "tokenized");

    let parser = Parser::new(&tokens);
    let signature = parser.parse_kernel()?;
    let warnings = parser.extra_markers();
    let params = resolve_params(&signature)?;
    debug!(kernel = %signature.name, params = params.len(), "parsed signature");

    let artifact = KernelArtifact::new(signature, params, raw_ptx);
    let fingerprint = fingerprint(source, artifact.ptx(), options);
    let wrapper = build_wrapper(&artifact, filename, &fingerprint, options)?;
    Ok(Generated {
        text: render(&wrapper),
        warnings,
    })
}

/// Read `<kernel>.cu` and its PTX and render the wrapper in memory.
/// Warnings are rendered to stderr.
fn render_file(path: &Path, options: &GenOptions) -> Result<(PathBuf, String), GenError> {
    let output = options.output_path(path);
    let ir_path = options.ir_path(path);
    if output == path || ir_path == path {
        return Err(GenError::Config(format!(
            "{}: input must not have the .{} or .{} extension",
            path.display(),
            options.ir_extension,
            options.output_extension
        )));
    }

    let source = read(path)?;
    let ptx = read(&ir_path)?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let generated = generate(&source, &filename, &ptx, options).map_err(|d| GenError::Syntax {
        file: path.to_path_buf(),
        text: source.clone(),
        diagnostics: vec![d],
    })?;
    render_diagnostics(&generated.warnings, &path.display().to_string(), &source);
    Ok((output, generated.text))
}

/// Generate the wrapper next to `path`.
///
/// Nothing is written unless the whole wrapper rendered, and an output that
/// already has the generated content is left untouched.
pub fn generate_file(path: &Path, options: &GenOptions) -> Result<Outcome, GenError> {
    let (output, rendered) = render_file(path, options)?;

    if fs::read(&output).is_ok_and(|existing| existing == rendered.as_bytes()) {
        info!(file = %path.display(), output = %output.display(), "up to date");
        return Ok(Outcome::Unchanged(output));
    }

    fs::write(&output, &rendered).map_err(|source| GenError::Io {
        path: output.clone(),
        source,
    })?;
    info!(file = %path.display(), output = %output.display(), "generated");
    Ok(Outcome::Written(output))
}

/// Compare the output for `path` with what would be generated. Never writes.
///
/// Only an output that does not exist is `Missing`; any other read failure
/// is an error.
pub fn check_file(path: &Path, options: &GenOptions) -> Result<CheckStatus, GenError> {
    let (output, rendered) = render_file(path, options)?;
    let status = match fs::read(&output) {
        Ok(existing) if existing == rendered.as_bytes() => CheckStatus::UpToDate(output),
        Ok(_) => CheckStatus::Stale(output),
        Err(e) if e.kind() == ErrorKind::NotFound => CheckStatus::Missing(output),
        Err(source) => {
            return Err(GenError::Io {
                path: output,
                source,
            })
        }
    };
    info!(file = %path.display(), up_to_date = status.is_up_to_date(), "checked");
    Ok(status)
}

fn read(path: &Path) -> Result<String, GenError> {
    fs::read_to_string(path).map_err(|source| GenError::Io {
        path: path.to_path_buf(),
        source,
    })
}
