//! The two compile pipelines.
//!
//! [`ArtifactCompiler`] is the crate's entry point: given a discovered
//! [`Paper`] and the caller's [`PublicationParams`], it produces either
//! a publication PDF or a Crossref deposit file inside the paper
//! directory. Each request is independent; the compiler holds no state
//! between calls beyond its configuration and toolchain.

use std::path::{Path, PathBuf};

use chrono::Local;

use galley_bibtex::Bibliography;

use crate::artifact;
use crate::citations::CitationSet;
use crate::config::{JournalConfig, PublicationParams};
use crate::error::{GalleyError, Result};
use crate::invoke::{ToolCommand, Toolchain};
use crate::metadata::MetadataRecord;
use crate::paper::{Paper, SourceFormat};
use crate::template::latex::LatexFragments;
use crate::template::pandoc;

/// Intermediate file extensions latexmk leaves behind. Removed before
/// every LaTeX compile so stale state cannot leak into the build.
const LATEX_RESIDUE: [&str; 5] = ["aux", "blg", "fls", "log", "fdb_latexmk"];

/// Compiles papers into publication artifacts.
pub struct ArtifactCompiler {
    config: JournalConfig,
    toolchain: Toolchain,
}

impl ArtifactCompiler {
    /// A compiler using tools discovered from the environment.
    pub fn new(config: JournalConfig) -> Self {
        Self {
            config,
            toolchain: Toolchain::discover(),
        }
    }

    /// A compiler with an explicit toolchain.
    pub fn with_toolchain(config: JournalConfig, toolchain: Toolchain) -> Self {
        Self { config, toolchain }
    }

    pub fn config(&self) -> &JournalConfig {
        &self.config
    }

    /// Produce the publication PDF, named `<filename_doi>.pdf`, in the
    /// paper directory. Dispatches on the paper's source format.
    pub fn generate_pdf(&self, paper: &Paper, params: &PublicationParams) -> Result<PathBuf> {
        tracing::info!(
            paper = %paper.paper_path.display(),
            source = %paper.source,
            "generating pdf"
        );
        match paper.source {
            SourceFormat::Latex => self.pdf_from_latex(paper, params),
            SourceFormat::Markdown => self.pdf_from_markdown(paper, params),
        }
    }

    /// Produce the Crossref deposit, named `<filename_doi>.crossref.xml`,
    /// in the paper directory. Markdown source only.
    pub fn generate_crossref(&self, paper: &Paper, params: &PublicationParams) -> Result<PathBuf> {
        match paper.source {
            SourceFormat::Markdown => self.crossref_from_markdown(paper, params),
            SourceFormat::Latex => Err(GalleyError::UnsupportedSourceFormat(
                "crossref deposits are generated from markdown source only".to_string(),
            )),
        }
    }

    fn pdf_from_latex(&self, paper: &Paper, params: &PublicationParams) -> Result<PathBuf> {
        // Validate the metadata record before touching the toolchain.
        let metadata = MetadataRecord::load(&paper.directory)?;
        let resolved = params.resolve(&self.config, Local::now().date_naive());

        clean_residue(&paper.directory)?;

        let fragments = LatexFragments::render(&metadata, &self.config, &resolved);
        fragments.write(&paper.directory)?;
        tracing::info!(dir = %paper.directory.display(), "wrote generated fragments");

        let latexmk = self.toolchain.latexmk()?;
        let command = ToolCommand::new(
            latexmk,
            vec![
                "-f".to_string(),
                "-bibtex".to_string(),
                "-pdf".to_string(),
                crate::paper::LATEX_SOURCE.to_string(),
            ],
            &paper.directory,
        );

        // latexmk runs with -f and can exit non-zero after still
        // producing a usable PDF; the artifact check decides.
        if let Err(err) = command.invoke() {
            match err {
                GalleyError::ExternalToolFailure { code, .. } => {
                    tracing::warn!(code, "latexmk exited non-zero, checking for output anyway");
                }
                other => return Err(other),
            }
        }

        artifact::locate_renamed(
            paper.directory.join("paper.pdf"),
            paper.directory.join(format!("{}.pdf", paper.filename_doi())),
        )
    }

    fn pdf_from_markdown(&self, paper: &Paper, params: &PublicationParams) -> Result<PathBuf> {
        let resolved = params.resolve(&self.config, Local::now().date_naive());

        let vars = pandoc::pdf_variables(paper, &self.config, &resolved);
        let args = pandoc::pdf_args(paper, &self.config, &vars);

        let pandoc_bin = self.toolchain.pandoc()?;
        ToolCommand::new(pandoc_bin, args, &paper.directory).invoke()?;

        artifact::locate(paper.directory.join(format!("{}.pdf", paper.filename_doi())))
    }

    fn crossref_from_markdown(&self, paper: &Paper, params: &PublicationParams) -> Result<PathBuf> {
        let body = std::fs::read_to_string(&paper.paper_path)?;
        let metadata = MetadataRecord::from_front_matter(&body)?;
        let resolved = params.resolve(&self.config, Local::now().date_naive());

        let bibliography = Bibliography::load(&paper.bibliography_path)?;
        let citations = CitationSet::extract(&body, &bibliography)?;
        tracing::info!(count = citations.len(), "resolved citations");

        let vars = pandoc::crossref_variables(
            paper,
            &metadata,
            &self.config,
            &resolved,
            &citations,
            Local::now().naive_local(),
        );
        let args = pandoc::crossref_args(paper, &self.config, &vars);

        let pandoc_bin = self.toolchain.pandoc()?;
        ToolCommand::new(pandoc_bin, args, &paper.directory).invoke()?;

        artifact::locate(
            paper
                .directory
                .join(format!("{}.crossref.xml", paper.filename_doi())),
        )
    }
}

/// Remove latexmk intermediates from a previous compile. Missing files
/// are not an error; only directory enumeration can fail.
fn clean_residue(dir: &Path) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let stale = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| LATEX_RESIDUE.contains(&e));
        if stale {
            let _ = std::fs::remove_file(&path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_residue_removes_only_intermediates() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["paper.aux", "paper.log", "paper.fdb_latexmk", "paper.tex", "refs.bib"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }

        clean_residue(dir.path()).unwrap();

        assert!(!dir.path().join("paper.aux").exists());
        assert!(!dir.path().join("paper.log").exists());
        assert!(!dir.path().join("paper.fdb_latexmk").exists());
        assert!(dir.path().join("paper.tex").is_file());
        assert!(dir.path().join("refs.bib").is_file());
    }
}
