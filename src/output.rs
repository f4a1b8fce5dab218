//! CI step outputs: `name=value` lines appended to `$GITHUB_OUTPUT`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::OutputError;

/// Environment variable naming the step output file.
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// Where step outputs go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutput {
    /// Append to a file, as the GitHub Actions runner expects.
    File(PathBuf),
    /// Print to stdout when not running under a runner.
    Stdout,
}

impl StepOutput {
    /// Use `$GITHUB_OUTPUT` when set and non-empty, stdout otherwise.
    pub fn from_env() -> Self {
        match std::env::var_os(GITHUB_OUTPUT_ENV) {
            Some(path) if !path.is_empty() => Self::File(PathBuf::from(path)),
            _ => Self::Stdout,
        }
    }

    /// Write a single `name=value` output.
    pub fn write(&self, name: &str, value: &str) -> Result<(), OutputError> {
        let line = format_output(name, value)?;
        match self {
            Self::File(path) => append_line(path, &line),
            Self::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(line.as_bytes())
                    .map_err(OutputError::WriteFailed)
            }
        }
    }
}

/// Render `name=value\n`, validating that it stays on one line.
pub fn format_output(name: &str, value: &str) -> Result<String, OutputError> {
    if name.is_empty() || name.contains(['=', '\n', '\r']) {
        return Err(OutputError::InvalidName(name.to_string()));
    }
    if value.contains(['\n', '\r']) {
        return Err(OutputError::MultilineValue(name.to_string()));
    }
    Ok(format!("{}={}\n", name, value))
}

fn append_line(path: &Path, line: &str) -> Result<(), OutputError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(OutputError::WriteFailed)?;
    file.write_all(line.as_bytes())
        .map_err(OutputError::WriteFailed)?;
    debug!(path = %path.display(), "Appended step output");
    Ok(())
}
