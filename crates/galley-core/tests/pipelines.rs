//! End-to-end pipeline tests against stand-in tools.
//!
//! Real pandoc/latexmk installs are not assumed; each test points the
//! toolchain at a small shell script that mimics the relevant behavior
//! (write the requested output, produce nothing, or fail outright).

#![cfg(unix)]

use std::path::{Path, PathBuf};

use galley_core::template::latex::GENERATED_MARKER;
use galley_core::{
    ArtifactCompiler, GalleyError, JournalConfig, Paper, PublicationParams, Toolchain,
};

const META: &str = r#"title: "Compiling Foo_Bar"
authors:
  - name: Jane Smith
    affiliation: 1
affiliations:
  - index: 1
    name: University of Somewhere
keywords:
  - testing
  - publishing
bibliography: refs.bib
"#;

const BIB: &str = r#"
@article{smith2019,
    author = {Smith, Jane},
    title = {A Study of Things},
    journal = {Journal of Examples},
    year = {2019},
    doi = {10.1000/xyz},
}
"#;

fn config(resources_dir: &Path) -> JournalConfig {
    JournalConfig {
        name: "Journal of Testing".to_string(),
        alias: "jot".to_string(),
        url: "https://example.org/jot".to_string(),
        issn: "1234-5678".to_string(),
        doi_prefix: "10.55555/jot.".to_string(),
        resources_dir: resources_dir.to_path_buf(),
        default_issue: None,
        default_volume: None,
        default_year: None,
    }
}

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A pandoc stand-in: creates whatever file follows `-o`.
fn fake_pandoc(dir: &Path) -> PathBuf {
    script(
        dir,
        "pandoc",
        r#"prev=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then : > "$a"; fi
  prev="$a"
done"#,
    )
}

/// A latexmk stand-in: produces `paper.pdf` in the working directory.
fn fake_latexmk(dir: &Path) -> PathBuf {
    script(dir, "latexmk", "touch paper.pdf")
}

fn latex_paper(dir: &Path) {
    std::fs::write(dir.join("paper.tex"), "\\documentclass{article}").unwrap();
    std::fs::write(dir.join("paper.yml"), META).unwrap();
    std::fs::write(dir.join("refs.bib"), BIB).unwrap();
}

fn markdown_paper(dir: &Path) {
    let body = format!("---\n{META}---\n\n# Summary\n\nAs shown by @smith2019.\n");
    std::fs::write(dir.join("paper.md"), body).unwrap();
    std::fs::write(dir.join("refs.bib"), BIB).unwrap();
}

// === PDF from LaTeX source ===

#[test]
fn test_latex_pdf_pipeline_produces_doi_named_artifact() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    latex_paper(dir.path());
    let config = config(dir.path());

    let paper = Paper::discover(dir.path(), 42, &config)?;
    let toolchain = Toolchain::with_tools(None, Some(fake_latexmk(dir.path())));
    let compiler = ArtifactCompiler::with_toolchain(config, toolchain);

    let pdf = compiler.generate_pdf(&paper, &PublicationParams::default())?;

    assert_eq!(pdf, dir.path().join("10.55555.jot.00042.pdf"));
    assert!(pdf.is_file());
    // The tool's own output was renamed away.
    assert!(!dir.path().join("paper.pdf").exists());
    Ok(())
}

#[test]
fn test_latex_pipeline_writes_generated_fragments() {
    let dir = tempfile::tempdir().unwrap();
    latex_paper(dir.path());
    let config = config(dir.path());

    let paper = Paper::discover(dir.path(), 7, &config).unwrap();
    let toolchain = Toolchain::with_tools(None, Some(fake_latexmk(dir.path())));
    let compiler = ArtifactCompiler::with_toolchain(config, toolchain);
    compiler
        .generate_pdf(&paper, &PublicationParams::default())
        .unwrap();

    for name in ["header.tex", "journal_dat.tex", "bib.tex"] {
        let content = std::fs::read_to_string(dir.path().join(name)).unwrap();
        assert!(
            content.starts_with(GENERATED_MARKER),
            "{name} missing marker"
        );
    }

    let header = std::fs::read_to_string(dir.path().join("header.tex")).unwrap();
    assert!(header.contains("\\author[1]{Jane Smith}"));
    assert!(header.contains("\\keywords{testing, publishing}"));

    let bib = std::fs::read_to_string(dir.path().join("bib.tex")).unwrap();
    assert!(bib.contains("\\bibliographystyle{jot}"));
    assert!(bib.contains("\\bibliography{refs.bib}"));
}

#[test]
fn test_latex_pipeline_cleans_stale_intermediates() {
    let dir = tempfile::tempdir().unwrap();
    latex_paper(dir.path());
    std::fs::write(dir.path().join("paper.aux"), "stale").unwrap();
    std::fs::write(dir.path().join("paper.log"), "stale").unwrap();
    let config = config(dir.path());

    let paper = Paper::discover(dir.path(), 1, &config).unwrap();
    let toolchain = Toolchain::with_tools(None, Some(fake_latexmk(dir.path())));
    ArtifactCompiler::with_toolchain(config, toolchain)
        .generate_pdf(&paper, &PublicationParams::default())
        .unwrap();

    assert!(!dir.path().join("paper.aux").exists());
    assert!(!dir.path().join("paper.log").exists());
}

#[test]
fn test_latex_pipeline_tolerates_forced_nonzero_exit() {
    // latexmk -f may exit non-zero after still producing a PDF; the
    // compile succeeds when the artifact exists.
    let dir = tempfile::tempdir().unwrap();
    latex_paper(dir.path());
    let config = config(dir.path());

    let paper = Paper::discover(dir.path(), 2, &config).unwrap();
    let tool = script(dir.path(), "latexmk", "touch paper.pdf; exit 12");
    let compiler = ArtifactCompiler::with_toolchain(config, Toolchain::with_tools(None, Some(tool)));

    let pdf = compiler
        .generate_pdf(&paper, &PublicationParams::default())
        .unwrap();
    assert!(pdf.is_file());
}

#[test]
fn test_latex_pipeline_reports_missing_artifact() {
    let dir = tempfile::tempdir().unwrap();
    latex_paper(dir.path());
    let config = config(dir.path());

    let paper = Paper::discover(dir.path(), 3, &config).unwrap();
    let tool = script(dir.path(), "latexmk", "exit 0");
    let compiler = ArtifactCompiler::with_toolchain(config, Toolchain::with_tools(None, Some(tool)));

    let err = compiler
        .generate_pdf(&paper, &PublicationParams::default())
        .unwrap_err();
    match err {
        GalleyError::MissingArtifact { expected } => {
            assert_eq!(expected, dir.path().join("paper.pdf"));
        }
        other => panic!("expected MissingArtifact, got {other:?}"),
    }
}

#[test]
fn test_metadata_validation_precedes_tool_invocation() {
    // No keywords key; the error must name it even though the
    // toolchain has no latexmk at all.
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("paper.tex"), "\\documentclass{article}").unwrap();
    let reduced: String = META
        .lines()
        .filter(|l| !l.starts_with("keywords") && !l.contains("- testing") && !l.contains("- publishing"))
        .collect::<Vec<_>>()
        .join("\n");
    std::fs::write(dir.path().join("paper.yml"), reduced).unwrap();
    let config = config(dir.path());

    let err = Paper::discover(dir.path(), 1, &config).unwrap_err();
    match err {
        GalleyError::MissingMetadataKey { key } => assert_eq!(key, "keywords"),
        other => panic!("expected MissingMetadataKey, got {other:?}"),
    }
}

// === PDF from Markdown source ===

#[test]
fn test_markdown_pdf_pipeline() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    markdown_paper(dir.path());
    let config = config(dir.path());

    let paper = Paper::discover(dir.path(), 42, &config)?;
    let toolchain = Toolchain::with_tools(Some(fake_pandoc(dir.path())), None);
    let compiler = ArtifactCompiler::with_toolchain(config, toolchain);

    let pdf = compiler.generate_pdf(&paper, &PublicationParams::default())?;
    assert_eq!(pdf, dir.path().join("10.55555.jot.00042.pdf"));
    assert!(pdf.is_file());
    Ok(())
}

#[test]
fn test_markdown_pipeline_surfaces_tool_failure() {
    let dir = tempfile::tempdir().unwrap();
    markdown_paper(dir.path());
    let config = config(dir.path());

    let paper = Paper::discover(dir.path(), 1, &config).unwrap();
    let tool = script(dir.path(), "pandoc", "echo 'xelatex not found' >&2; exit 1");
    let compiler = ArtifactCompiler::with_toolchain(config, Toolchain::with_tools(Some(tool), None));

    let err = compiler
        .generate_pdf(&paper, &PublicationParams::default())
        .unwrap_err();
    match err {
        GalleyError::ExternalToolFailure { tool, code, stderr } => {
            assert_eq!(tool, "pandoc");
            assert_eq!(code, 1);
            assert!(stderr.contains("xelatex not found"));
        }
        other => panic!("expected ExternalToolFailure, got {other:?}"),
    }
}

#[test]
fn test_missing_pandoc_is_reported_by_name() {
    let dir = tempfile::tempdir().unwrap();
    markdown_paper(dir.path());
    let config = config(dir.path());

    let paper = Paper::discover(dir.path(), 1, &config).unwrap();
    let compiler = ArtifactCompiler::with_toolchain(config, Toolchain::with_tools(None, None));

    let err = compiler
        .generate_pdf(&paper, &PublicationParams::default())
        .unwrap_err();
    assert!(matches!(err, GalleyError::ToolNotFound { tool: "pandoc" }));
}

// === Crossref deposit ===

#[test]
fn test_crossref_pipeline_produces_deposit() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    markdown_paper(dir.path());
    let config = config(dir.path());

    let paper = Paper::discover(dir.path(), 42, &config)?;
    let toolchain = Toolchain::with_tools(Some(fake_pandoc(dir.path())), None);
    let compiler = ArtifactCompiler::with_toolchain(config, toolchain);

    let deposit = compiler.generate_crossref(&paper, &PublicationParams::default())?;
    assert_eq!(deposit, dir.path().join("10.55555.jot.00042.crossref.xml"));
    assert!(deposit.is_file());
    Ok(())
}

#[test]
fn test_crossref_rejects_latex_source() {
    let dir = tempfile::tempdir().unwrap();
    latex_paper(dir.path());
    let config = config(dir.path());

    let paper = Paper::discover(dir.path(), 1, &config).unwrap();
    let toolchain = Toolchain::with_tools(Some(fake_pandoc(dir.path())), None);
    let compiler = ArtifactCompiler::with_toolchain(config, toolchain);

    let err = compiler
        .generate_crossref(&paper, &PublicationParams::default())
        .unwrap_err();
    assert!(matches!(err, GalleyError::UnsupportedSourceFormat(_)));
}

#[test]
fn test_crossref_fails_on_unknown_citation_key() {
    let dir = tempfile::tempdir().unwrap();
    let body = format!("---\n{META}---\n\nUncited work [@nowhere2021].\n");
    std::fs::write(dir.path().join("paper.md"), body).unwrap();
    std::fs::write(dir.path().join("refs.bib"), BIB).unwrap();
    let config = config(dir.path());

    let paper = Paper::discover(dir.path(), 1, &config).unwrap();
    let toolchain = Toolchain::with_tools(Some(fake_pandoc(dir.path())), None);
    let compiler = ArtifactCompiler::with_toolchain(config, toolchain);

    let err = compiler
        .generate_crossref(&paper, &PublicationParams::default())
        .unwrap_err();
    match err {
        GalleyError::UnknownCitationKey { key } => assert_eq!(key, "nowhere2021"),
        other => panic!("expected UnknownCitationKey, got {other:?}"),
    }
    // Nothing was generated.
    assert!(!dir.path().join("10.55555.jot.00001.crossref.xml").exists());
}

#[test]
fn test_crossref_requires_readable_bibliography() {
    let dir = tempfile::tempdir().unwrap();
    let body = format!("---\n{META}---\n\nText.\n");
    std::fs::write(dir.path().join("paper.md"), body).unwrap();
    // refs.bib deliberately absent.
    let config = config(dir.path());

    let paper = Paper::discover(dir.path(), 1, &config).unwrap();
    let toolchain = Toolchain::with_tools(Some(fake_pandoc(dir.path())), None);
    let compiler = ArtifactCompiler::with_toolchain(config, toolchain);

    let err = compiler
        .generate_crossref(&paper, &PublicationParams::default())
        .unwrap_err();
    assert!(matches!(err, GalleyError::Bibtex(_)));
}
