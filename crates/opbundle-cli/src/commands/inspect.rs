//! Inspect command - show what the validators see in a bundle

use console::style;
use opbundle_core::Bundle;
use opbundle_validation::{
    DeclaredMaxVersion, MAX_KUBE_VERSION_ANNOTATION, MaxKubeVersionValidator,
};
use std::path::Path;

use crate::display::pluralize;
use crate::error::{CliError, Result};

pub fn run(path: &Path) -> Result<()> {
    let bundle = Bundle::load(path).map_err(|e| CliError::bundle(path, e))?;

    println!("{}", style(&bundle.name).cyan().bold());
    println!("{}", style("=".repeat(bundle.name.len())).dim());
    println!();

    match &bundle.csv {
        Some(csv) => {
            println!("{}: {}", style("CSV").bold(), csv.name());
            if let Some(version) = csv.version() {
                println!("{}: {}", style("Version").bold(), version);
            }
            if let Some(min) = csv.min_kube_version() {
                println!("{}: {}", style("Min Kube Version").bold(), min);
            }

            let declared = DeclaredMaxVersion::from_annotations(&csv.metadata.annotations);
            println!(
                "{}: {}",
                style("Max Kube Version").bold(),
                describe_declared(&declared)
            );

            if !csv.metadata.annotations.is_empty() {
                println!();
                println!("{}:", style("Annotations").bold());
                for (key, value) in &csv.metadata.annotations {
                    let key = if key == MAX_KUBE_VERSION_ANNOTATION {
                        style(key.as_str()).yellow()
                    } else {
                        style(key.as_str())
                    };
                    println!("  {}: {}", key, value);
                }
            }
        }
        None => {
            println!("{}: {}", style("CSV").bold(), style("none").red());
        }
    }

    println!();
    println!(
        "{} ({}):",
        style("Objects").bold(),
        pluralize(bundle.objects.len(), "object", "objects")
    );
    for (kind, count) in bundle.kind_counts() {
        println!("  {:40} {:>4}", kind, count);
    }

    let signal = MaxKubeVersionValidator::new().signal_for(&bundle);
    println!();
    if signal.detected() {
        println!("{} {}", style("⚠").yellow(), signal.message());
    } else {
        println!(
            "{} No APIs removed in Kubernetes v1.22 are used",
            style("✓").green()
        );
    }

    Ok(())
}

fn describe_declared(declared: &DeclaredMaxVersion) -> String {
    match declared {
        DeclaredMaxVersion::Absent => "not set".to_string(),
        DeclaredMaxVersion::Parsed { raw, version } => format!("{} (parsed as {})", raw, version),
        DeclaredMaxVersion::Invalid { raw, error } => format!("{} (invalid: {})", raw, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_declared() {
        assert_eq!(describe_declared(&DeclaredMaxVersion::from_value("")), "not set");
        assert_eq!(
            describe_declared(&DeclaredMaxVersion::from_value("v1.21")),
            "v1.21 (parsed as 1.21.0)"
        );
        assert!(
            describe_declared(&DeclaredMaxVersion::from_value("abc")).starts_with("abc (invalid: ")
        );
    }
}
