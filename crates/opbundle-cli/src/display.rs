//! Display formatting for CLI output
//!
//! Findings are grouped per bundle, errors before warnings, followed by a
//! one-line summary.

use console::style;
use opbundle_validation::{Level, ManifestResult};
use std::io::{self, Write};

/// Validation results of one bundle
#[derive(Debug)]
pub struct BundleSection {
    /// Path the bundle was loaded from
    pub path: String,

    /// Bundle name
    pub name: String,

    pub results: Vec<ManifestResult>,
}

impl BundleSection {
    fn counts(&self) -> (usize, usize) {
        self.results.iter().fold((0, 0), |(errors, warnings), r| {
            (errors + r.errors.len(), warnings + r.warnings.len())
        })
    }
}

/// Grouped validation results for display
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub sections: Vec<BundleSection>,

    /// Count warnings as errors
    pub strict: bool,
}

impl ValidationReport {
    /// Create a new empty report
    pub fn new(strict: bool) -> Self {
        Self {
            sections: Vec::new(),
            strict,
        }
    }

    /// Add the results of one bundle
    pub fn add_bundle(
        &mut self,
        path: impl Into<String>,
        name: impl Into<String>,
        results: Vec<ManifestResult>,
    ) {
        self.sections.push(BundleSection {
            path: path.into(),
            name: name.into(),
            results,
        });
    }

    /// Error and warning counts, with warnings promoted in strict mode
    pub fn summary(&self) -> (usize, usize) {
        let (errors, warnings) = self
            .sections
            .iter()
            .map(BundleSection::counts)
            .fold((0, 0), |(e, w), (se, sw)| (e + se, w + sw));

        if self.strict {
            (errors + warnings, 0)
        } else {
            (errors, warnings)
        }
    }

    /// Check if the report should fail the run
    pub fn has_errors(&self) -> bool {
        self.summary().0 > 0
    }

    /// Every result across all bundles, in order
    pub fn results(&self) -> impl Iterator<Item = &ManifestResult> {
        self.sections.iter().flat_map(|s| s.results.iter())
    }

    /// Write the grouped findings
    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for section in &self.sections {
            writeln!(out)?;
            writeln!(
                out,
                "{} {}",
                style(&section.name).cyan().bold(),
                style(format!("({})", section.path)).dim()
            )?;

            let findings: Vec<_> = section.results.iter().flat_map(|r| r.findings()).collect();
            if findings.is_empty() {
                writeln!(out, "  {} No findings", style("✓").green())?;
                continue;
            }

            for finding in findings {
                let icon = match finding.level {
                    Level::Error => style("✗").red(),
                    Level::Warning if self.strict => style("✗").red(),
                    Level::Warning => style("⚠").yellow(),
                };
                writeln!(out, "  {} {}", icon, finding)?;
            }
        }

        Ok(())
    }

    /// Write the summary line
    pub fn render_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let (errors, warnings) = self.summary();
        let bundles = pluralize(self.sections.len(), "bundle", "bundles");

        if errors > 0 {
            writeln!(
                out,
                "{} Validation failed for {}: {} error(s), {} warning(s)",
                style("✗").red().bold(),
                bundles,
                errors,
                warnings
            )
        } else if warnings > 0 {
            writeln!(
                out,
                "{} Validation passed for {} with {} warning(s)",
                style("⚠").yellow().bold(),
                bundles,
                warnings
            )
        } else {
            writeln!(out, "{} Validation passed for {}", style("✓").green().bold(), bundles)
        }
    }

    /// Print findings and summary to stdout
    pub fn display(&self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        self.render(&mut stdout)?;
        writeln!(stdout)?;
        self.render_summary(&mut stdout)
    }
}

/// Format count with proper pluralization
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
