//! Validate command - run the bundle validators

use console::style;
use opbundle_core::Bundle;
use opbundle_validation::{ValidationObject, ValidatorSet};
use std::path::{Path, PathBuf};

use crate::display::ValidationReport;
use crate::error::{CliError, Result};

pub fn run(paths: &[PathBuf], json_output: bool, strict: bool) -> Result<()> {
    let validators = ValidatorSet::default_set();
    tracing::debug!(?validators, "Validator set ready");

    let mut report = ValidationReport::new(strict);

    for path in paths {
        let bundle = load(path)?;

        if !json_output {
            println!(
                "{} Validating {} ({})",
                style("→").blue(),
                bundle.name,
                path.display()
            );
        }

        let results = validators.validate(&validation_objects(&bundle));
        report.add_bundle(path.display().to_string(), &bundle.name, results);
    }

    if json_output {
        let results: Vec<_> = report.results().collect();
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        report
            .display()
            .map_err(|e| CliError::other(format!("Failed to write report: {}", e)))?;
    }

    if report.has_errors() {
        let (errors, warnings) = report.summary();
        return Err(CliError::validation_failed(errors, warnings));
    }

    Ok(())
}

fn load(path: &Path) -> Result<Bundle> {
    Bundle::load(path).map_err(|e| CliError::bundle(path, e))
}

/// The bundle, its descriptor and every object, in that order
fn validation_objects(bundle: &Bundle) -> Vec<ValidationObject<'_>> {
    let mut objects = vec![ValidationObject::from(bundle)];
    if let Some(csv) = &bundle.csv {
        objects.push(ValidationObject::from(csv));
    }
    objects.extend(bundle.objects.iter().map(ValidationObject::from));
    objects
}

#[cfg(test)]
mod tests {
    use super::*;
    use opbundle_validation::ObjectShape;

    #[test]
    fn test_validation_objects_order() {
        let bundle = Bundle::from_documents(
            "b",
            vec![
                (
                    "crd.yaml",
                    "apiVersion: apiextensions.k8s.io/v1\n\
                     kind: CustomResourceDefinition\n\
                     metadata:\n  name: a.example.com\n"
                        .to_string(),
                ),
                (
                    "csv.yaml",
                    "apiVersion: operators.coreos.com/v1alpha1\n\
                     kind: ClusterServiceVersion\n\
                     metadata:\n  name: b.v1\n"
                        .to_string(),
                ),
            ],
        )
        .unwrap();

        let shapes: Vec<_> = validation_objects(&bundle).iter().map(|o| o.shape()).collect();
        assert_eq!(
            shapes,
            vec![ObjectShape::Bundle, ObjectShape::Csv, ObjectShape::Object]
        );
    }

    #[test]
    fn test_missing_path_is_bundle_error() {
        let err = run(&[PathBuf::from("/definitely/not/here")], true, false).unwrap_err();
        assert_eq!(err.exit_code(), crate::exit_codes::BUNDLE_ERROR);
    }
}
