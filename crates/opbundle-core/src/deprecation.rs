//! Detection of Kubernetes APIs removed in v1.22
//!
//! Validators never scan manifests themselves. They consume a
//! [`DeprecationSignal`] built from the results of a [`DeprecationDetector`],
//! which keeps the detection table replaceable (and testable) on its own.

use std::collections::BTreeMap;

use crate::bundle::Object;

/// Migration guide for the APIs removed in Kubernetes v1.22
pub const V1_22_MIGRATION_GUIDE: &str =
    "https://kubernetes.io/docs/reference/using-api/deprecation-guide/#v1-22";

/// Output of a single detector run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionResult {
    /// Name of the detector that produced this result
    pub detector: String,

    /// Human-readable warnings
    pub warnings: Vec<String>,
}

/// Something that can tell whether a bundle's objects use removed APIs
pub trait DeprecationDetector: Send + Sync {
    /// Scan the objects and report zero or more results
    fn detect(&self, objects: &[Object]) -> Vec<DetectionResult>;
}

/// Whether deprecated APIs were found, and the explanation if so
///
/// An empty message means nothing was detected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeprecationSignal {
    message: String,
}

impl DeprecationSignal {
    /// Signal for a bundle without deprecated APIs
    pub fn none() -> Self {
        Self::default()
    }

    /// Signal carrying a detector explanation
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Collapse detector results into one signal
    ///
    /// When several warnings are reported the last one seen wins.
    pub fn from_results(results: &[DetectionResult]) -> Self {
        let message = results
            .iter()
            .flat_map(|r| r.warnings.iter())
            .last()
            .cloned()
            .unwrap_or_default();

        Self { message }
    }

    /// Check if deprecated APIs were detected
    pub fn detected(&self) -> bool {
        !self.message.is_empty()
    }

    /// Detector explanation (empty when nothing was detected)
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An API removed from the served set at a given release
#[derive(Debug, Clone, Copy)]
struct RemovedApi {
    api_version: &'static str,
    kind: &'static str,
}

const fn removed(api_version: &'static str, kind: &'static str) -> RemovedApi {
    RemovedApi { api_version, kind }
}

/// APIs no longer served as of Kubernetes v1.22
static REMOVED_IN_V1_22: &[RemovedApi] = &[
    removed("admissionregistration.k8s.io/v1beta1", "MutatingWebhookConfiguration"),
    removed("admissionregistration.k8s.io/v1beta1", "ValidatingWebhookConfiguration"),
    removed("apiextensions.k8s.io/v1beta1", "CustomResourceDefinition"),
    removed("apiregistration.k8s.io/v1beta1", "APIService"),
    removed("authentication.k8s.io/v1beta1", "TokenReview"),
    removed("authorization.k8s.io/v1beta1", "LocalSubjectAccessReview"),
    removed("authorization.k8s.io/v1beta1", "SelfSubjectAccessReview"),
    removed("authorization.k8s.io/v1beta1", "SubjectAccessReview"),
    removed("certificates.k8s.io/v1beta1", "CertificateSigningRequest"),
    removed("coordination.k8s.io/v1beta1", "Lease"),
    removed("extensions/v1beta1", "Ingress"),
    removed("networking.k8s.io/v1beta1", "Ingress"),
    removed("networking.k8s.io/v1beta1", "IngressClass"),
    removed("rbac.authorization.k8s.io/v1beta1", "ClusterRole"),
    removed("rbac.authorization.k8s.io/v1beta1", "ClusterRoleBinding"),
    removed("rbac.authorization.k8s.io/v1beta1", "Role"),
    removed("rbac.authorization.k8s.io/v1beta1", "RoleBinding"),
    removed("scheduling.k8s.io/v1beta1", "PriorityClass"),
    removed("storage.k8s.io/v1beta1", "CSIDriver"),
    removed("storage.k8s.io/v1beta1", "CSINode"),
    removed("storage.k8s.io/v1beta1", "StorageClass"),
    removed("storage.k8s.io/v1beta1", "VolumeAttachment"),
];

/// Detector for the APIs removed in Kubernetes v1.22
#[derive(Debug, Clone, Copy, Default)]
pub struct RemovedApisDetector;

impl RemovedApisDetector {
    pub const NAME: &'static str = "removed-apis-v1.22";

    pub fn new() -> Self {
        Self
    }

    /// Check if an apiVersion/kind pair is no longer served in v1.22
    pub fn is_removed(api_version: &str, kind: &str) -> bool {
        REMOVED_IN_V1_22
            .iter()
            .any(|api| api.api_version == api_version && api.kind == kind)
    }

    /// Build the explanation for the affected objects, if any
    ///
    /// Names are grouped per kind (CustomResourceDefinitions as `CRD`); kinds
    /// are sorted, names keep manifest order.
    pub fn summary(objects: &[Object]) -> Option<String> {
        let mut affected: BTreeMap<&str, Vec<String>> = BTreeMap::new();

        for object in objects {
            if Self::is_removed(&object.api_version, &object.kind) {
                tracing::debug!(
                    kind = %object.kind,
                    name = object.name(),
                    source = ?object.source,
                    "Removed API in use"
                );
                affected
                    .entry(kind_label(object))
                    .or_default()
                    .push(object.name().to_string());
            }
        }

        if affected.is_empty() {
            return None;
        }

        let kinds = affected
            .iter()
            .map(|(kind, names)| format!("{}: ({:?})", kind, names))
            .collect::<Vec<_>>()
            .join(", ");

        Some(format!(
            "this bundle is using APIs which were deprecated and removed in v1.22. \
             More info: {}. Migrate the API(s) for {}",
            V1_22_MIGRATION_GUIDE, kinds
        ))
    }
}

fn kind_label(object: &Object) -> &str {
    if object.is_crd() { "CRD" } else { object.kind.as_str() }
}

impl DeprecationDetector for RemovedApisDetector {
    fn detect(&self, objects: &[Object]) -> Vec<DetectionResult> {
        match Self::summary(objects) {
            Some(message) => {
                tracing::debug!(detector = Self::NAME, "Removed APIs detected");
                vec![DetectionResult {
                    detector: Self::NAME.to_string(),
                    warnings: vec![message],
                }]
            }
            None => Vec::new(),
        }
    }
}
