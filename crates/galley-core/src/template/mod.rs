//! Template rendering for the two compile pipelines.
//!
//! - [`latex`] renders the generated fragments a LaTeX-source paper
//!   needs (`header.tex`, `journal_dat.tex`, `bib.tex`)
//! - [`pandoc`] assembles the variable sets and argument lists that
//!   fully determine a pandoc invocation for Markdown-source papers

pub mod latex;
pub mod pandoc;
