//! opbundle Validation - Publication checks for operator bundles
//!
//! This crate provides:
//! - **Results**: `ManifestResult` with ordered error and warning findings
//! - **Registry**: `ValidatorSet`, which offers each object to every validator
//!   that accepts its shape
//! - **Rules**: the `maxKubeVersion` annotation policy for bundles that still
//!   ship APIs removed in Kubernetes v1.22

pub mod result;
pub mod rules;
pub mod validator;

pub use result::{Finding, FindingKind, Level, ManifestResult};
pub use rules::max_kube_version::{
    DeclaredMaxVersion, LAST_SUPPORTED_VERSION, MAX_KUBE_VERSION_ANNOTATION, MaxKubeVersionError,
    MaxKubeVersionValidator, REMOVAL, REMOVAL_VERSION, check_bundle, check_max_kube_version,
};
pub use validator::{ObjectShape, ValidationObject, Validator, ValidatorSet};
