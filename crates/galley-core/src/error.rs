//! Error types for galley-core.
//!
//! Every failure aborts the compile request that produced it; nothing
//! is locally recovered or retried.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GalleyError {
    /// A required key is absent from the paper's metadata record.
    /// Raised before any external tool runs.
    #[error("required metadata key is missing: {key}")]
    MissingMetadataKey {
        /// The first absent key, in declaration order.
        key: &'static str,
    },

    /// The metadata record could not be read or parsed.
    #[error("invalid paper metadata: {0}")]
    Metadata(String),

    /// The bibliography database could not be parsed.
    #[error("bibliography error: {0}")]
    Bibtex(#[from] galley_bibtex::BibtexError),

    /// A citation key in the paper body has no bibliography entry.
    #[error("citation key not found in bibliography: @{key}")]
    UnknownCitationKey {
        /// The key as scanned, without the leading `@`.
        key: String,
    },

    /// The paper's source format is not one the compiler handles,
    /// or the requested artifact cannot be produced from it.
    #[error("unsupported source format: {0}")]
    UnsupportedSourceFormat(String),

    /// A required external tool is not installed.
    #[error("external tool not found: {tool}")]
    ToolNotFound {
        /// Tool name as looked up on PATH.
        tool: &'static str,
    },

    /// An external tool ran and exited non-zero.
    #[error("{tool} failed (exit {code}): {stderr}")]
    ExternalToolFailure {
        /// Tool name.
        tool: String,
        /// Exit code (or -1 when killed by a signal).
        code: i32,
        /// Captured standard error.
        stderr: String,
    },

    /// The expected output file was not produced.
    #[error("looks like we failed to compile: expected output {} was not produced", expected.display())]
    MissingArtifact {
        /// The path that should have existed after the tool ran.
        expected: PathBuf,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GalleyError>;
