//! `maxKubeVersion` annotation policy
//!
//! Bundles that still ship APIs removed in Kubernetes v1.22 must declare, on
//! their ClusterServiceVersion, the highest Kubernetes version they support:
//!
//! ```yaml
//! apiVersion: operators.coreos.com/v1alpha1
//! kind: ClusterServiceVersion
//! metadata:
//!   name: memcached-operator.v0.0.1
//!   annotations:
//!     operators.operatorframework.io/maxKubeVersion: 1.21.0
//! ```
//!
//! The declared version must be strictly below [`REMOVAL_VERSION`]. The
//! annotation is only required when removed APIs are actually in use, but a
//! value that cannot be parsed is reported either way.

use std::collections::BTreeMap;

use opbundle_core::{
    Bundle, ClusterServiceVersion, DeprecationDetector, DeprecationSignal, RemovedApisDetector,
    VersionError, parse_tolerant,
};
use semver::Version;
use thiserror::Error;

use crate::result::{Finding, ManifestResult};
use crate::validator::{ObjectShape, ValidationObject, Validator};

/// Annotation declaring the maximum supported Kubernetes version
pub const MAX_KUBE_VERSION_ANNOTATION: &str = "operators.operatorframework.io/maxKubeVersion";

/// Kubernetes release that stopped serving the removed APIs
pub const REMOVAL_VERSION: &str = "1.22.0";

/// Last Kubernetes release that still serves the removed APIs
pub const LAST_SUPPORTED_VERSION: &str = "1.21.0";

/// [`REMOVAL_VERSION`] as a comparable version
pub const REMOVAL: Version = Version::new(1, 22, 0);

/// Policy violations, rendered as the finding detail
#[derive(Error, Debug)]
pub enum MaxKubeVersionError {
    #[error(
        "{key} metadata.annotation value ({value}) is invalid. Error: {source}",
        key = MAX_KUBE_VERSION_ANNOTATION
    )]
    InvalidAnnotation {
        value: String,
        #[source]
        source: VersionError,
    },

    #[error(
        "{key} metadata.annotation is not informed. \
         This distribution is still using the removed APIs, so you **MUST** ensure that \
         its CSV has the informative metadata annotation `{key}`. \
         More info: {detail}",
        key = MAX_KUBE_VERSION_ANNOTATION
    )]
    MissingAnnotation { detail: String },

    #[error(
        "invalid value for {key}. The K8s version value {value} is >= of {removal}. \
         Note that {detail}",
        key = MAX_KUBE_VERSION_ANNOTATION,
        removal = REMOVAL_VERSION
    )]
    UnsupportedMaxVersion { value: String, detail: String },
}

/// The annotation as declared on the CSV
#[derive(Debug)]
pub enum DeclaredMaxVersion {
    /// Annotation missing or empty
    Absent,
    /// Annotation parsed successfully
    Parsed { raw: String, version: Version },
    /// Annotation present but not a version
    Invalid { raw: String, error: VersionError },
}

impl DeclaredMaxVersion {
    /// Interpret a raw annotation value; empty means absent
    pub fn from_value(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::Absent;
        }

        match parse_tolerant(raw) {
            Ok(version) => Self::Parsed {
                raw: raw.to_string(),
                version,
            },
            Err(error) => Self::Invalid {
                raw: raw.to_string(),
                error,
            },
        }
    }

    /// Read the annotation from a CSV annotation map
    pub fn from_annotations(annotations: &BTreeMap<String, String>) -> Self {
        let raw = annotations
            .get(MAX_KUBE_VERSION_ANNOTATION)
            .map(|s| s.as_str())
            .unwrap_or_default();
        Self::from_value(raw)
    }

    /// Check if the annotation is missing or empty
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Decide whether a declared max version satisfies the policy
///
/// The first applicable branch wins:
/// 1. an unparsable value is an error, with or without removed APIs
/// 2. without removed APIs anything else passes
/// 3. a missing value is an error
/// 4. a value `>=` [`REMOVAL`] is an error
pub fn check_max_kube_version(
    declared: DeclaredMaxVersion,
    signal: &DeprecationSignal,
) -> Result<(), MaxKubeVersionError> {
    match declared {
        DeclaredMaxVersion::Invalid { raw, error } => Err(MaxKubeVersionError::InvalidAnnotation {
            value: raw,
            source: error,
        }),
        _ if !signal.detected() => Ok(()),
        DeclaredMaxVersion::Absent => Err(MaxKubeVersionError::MissingAnnotation {
            detail: signal.message().to_string(),
        }),
        DeclaredMaxVersion::Parsed { raw, version } if version >= REMOVAL => {
            Err(MaxKubeVersionError::UnsupportedMaxVersion {
                value: raw,
                detail: signal.message().to_string(),
            })
        }
        DeclaredMaxVersion::Parsed { .. } => Ok(()),
    }
}

/// Apply the policy to one bundle given its already-computed deprecation signal
///
/// Produces at most one finding. A missing bundle or CSV is reported on its own
/// and stops the check.
pub fn check_bundle(bundle: Option<&Bundle>, signal: &DeprecationSignal) -> ManifestResult {
    let Some(bundle) = bundle else {
        return ManifestResult::default()
            .with_finding(Finding::invalid_bundle("bundle is nil", None));
    };

    let result = ManifestResult::new(&bundle.name);

    let Some(csv) = &bundle.csv else {
        return result.with_finding(Finding::invalid_bundle(
            "bundle csv is nil",
            Some(bundle.name.clone()),
        ));
    };

    check_csv(result, csv, signal)
}

fn check_csv(
    result: ManifestResult,
    csv: &ClusterServiceVersion,
    signal: &DeprecationSignal,
) -> ManifestResult {
    let declared = DeclaredMaxVersion::from_annotations(&csv.metadata.annotations);

    match check_max_kube_version(declared, signal) {
        Ok(()) => {
            tracing::debug!(
                csv = csv.name(),
                deprecated_apis = signal.detected(),
                "maxKubeVersion check passed"
            );
            result
        }
        Err(err) => {
            tracing::debug!(csv = csv.name(), error = %err, "maxKubeVersion check failed");
            result.with_finding(Finding::invalid_csv(err.to_string(), csv.name()))
        }
    }
}

/// Validator enforcing the `maxKubeVersion` policy on bundles
///
/// Runs its detector over the bundle's objects, then hands the resulting
/// signal to [`check_bundle`].
pub struct MaxKubeVersionValidator {
    detector: Box<dyn DeprecationDetector>,
}

impl MaxKubeVersionValidator {
    /// Validator backed by the built-in v1.22 removed API detector
    pub fn new() -> Self {
        Self::with_detector(RemovedApisDetector::new())
    }

    /// Validator backed by a custom detector
    pub fn with_detector(detector: impl DeprecationDetector + 'static) -> Self {
        Self {
            detector: Box::new(detector),
        }
    }

    /// Deprecation signal for a bundle's objects
    pub fn signal_for(&self, bundle: &Bundle) -> DeprecationSignal {
        DeprecationSignal::from_results(&self.detector.detect(&bundle.objects))
    }

    /// Validate one (possibly missing) bundle
    pub fn validate_bundle(&self, bundle: Option<&Bundle>) -> ManifestResult {
        let signal = match bundle {
            Some(bundle) if bundle.csv.is_some() => self.signal_for(bundle),
            _ => DeprecationSignal::none(),
        };
        check_bundle(bundle, &signal)
    }
}

impl Default for MaxKubeVersionValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for MaxKubeVersionValidator {
    fn name(&self) -> &'static str {
        "max-kube-version"
    }

    fn accepts(&self, shape: ObjectShape) -> bool {
        shape == ObjectShape::Bundle
    }

    fn validate(&self, object: &ValidationObject<'_>) -> ManifestResult {
        match object {
            ValidationObject::Bundle(bundle) => self.validate_bundle(*bundle),
            _ => ManifestResult::default(),
        }
    }
}
