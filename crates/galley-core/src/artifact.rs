//! Output artifact verification.
//!
//! External tools report success unevenly (latexmk in particular is
//! run with `-f` and may exit zero after a partial build), so every
//! pipeline ends by checking that the file it promised actually exists
//! on disk.

use std::path::{Path, PathBuf};

use crate::error::{GalleyError, Result};

/// Assert that `expected` exists as a regular file and return it.
pub fn locate(expected: impl Into<PathBuf>) -> Result<PathBuf> {
    let expected = expected.into();
    if expected.is_file() {
        Ok(expected)
    } else {
        Err(GalleyError::MissingArtifact { expected })
    }
}

/// Assert that `produced` exists, then rename it to `canonical`.
///
/// Used by the LaTeX pipeline, where the tool writes `paper.pdf` but
/// the published artifact is named after the DOI.
pub fn locate_renamed(produced: impl Into<PathBuf>, canonical: impl AsRef<Path>) -> Result<PathBuf> {
    let produced = locate(produced)?;
    let canonical = canonical.as_ref();
    std::fs::rename(&produced, canonical)?;
    Ok(canonical.to_path_buf())
}
