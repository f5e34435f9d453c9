//! External tool discovery and invocation.
//!
//! The compiler shells out to two tools: `pandoc` for Markdown-source
//! papers and `latexmk` for LaTeX-source papers. Both are located once
//! per [`Toolchain`], env override first, PATH second. Invocation is
//! synchronous; stdout and stderr are captured whole.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{GalleyError, Result};

/// Env override for the pandoc binary.
pub const PANDOC_ENV: &str = "GALLEY_PANDOC";

/// Env override for the latexmk binary.
pub const LATEXMK_ENV: &str = "GALLEY_LATEXMK";

/// Resolved locations of the external tools.
///
/// A tool missing at discovery time is not an error; the error is
/// raised only when a pipeline actually needs it.
#[derive(Debug, Clone, Default)]
pub struct Toolchain {
    pandoc: Option<PathBuf>,
    latexmk: Option<PathBuf>,
}

impl Toolchain {
    /// Locate both tools: env override first, then PATH lookup.
    pub fn discover() -> Self {
        Self {
            pandoc: find_tool(PANDOC_ENV, "pandoc"),
            latexmk: find_tool(LATEXMK_ENV, "latexmk"),
        }
    }

    /// A toolchain with explicit binary paths, for tests and embedders.
    pub fn with_tools(pandoc: Option<PathBuf>, latexmk: Option<PathBuf>) -> Self {
        Self { pandoc, latexmk }
    }

    pub fn pandoc(&self) -> Result<&Path> {
        self.pandoc
            .as_deref()
            .ok_or(GalleyError::ToolNotFound { tool: "pandoc" })
    }

    pub fn latexmk(&self) -> Result<&Path> {
        self.latexmk
            .as_deref()
            .ok_or(GalleyError::ToolNotFound { tool: "latexmk" })
    }
}

fn find_tool(env_var: &str, name: &str) -> Option<PathBuf> {
    if let Ok(path) = std::env::var(env_var) {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Some(path);
        }
        tracing::warn!(env_var, path = %path.display(), "env override is not a file, ignoring");
    }
    which::which(name).ok()
}

/// One fully-assembled tool invocation.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    current_dir: PathBuf,
}

/// Captured output of a successful invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, current_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            current_dir: current_dir.into(),
        }
    }

    fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Run the tool to completion.
    ///
    /// A non-zero exit becomes [`GalleyError::ExternalToolFailure`]
    /// carrying the captured stderr; a failure to spawn surfaces as IO.
    pub fn invoke(&self) -> Result<ToolOutput> {
        tracing::debug!(
            program = %self.program.display(),
            args = ?self.args,
            dir = %self.current_dir.display(),
            "invoking external tool"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.current_dir)
            .output()?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            tracing::error!(tool = %self.tool_name(), code, "external tool failed");
            return Err(GalleyError::ExternalToolFailure {
                tool: self.tool_name(),
                code,
                stderr,
            });
        }

        Ok(ToolOutput { stdout, stderr })
    }
}
