//! Validator registry
//!
//! Every object handed to a [`ValidatorSet`] is tagged with its shape. Each
//! registered validator declares which shapes it accepts and is simply
//! skipped for the others.

use opbundle_core::{Bundle, ClusterServiceVersion, Object};

use crate::result::ManifestResult;
use crate::rules::max_kube_version::MaxKubeVersionValidator;

/// The shape of an object offered to validators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectShape {
    Bundle,
    Csv,
    Object,
}

/// An object offered to validators
///
/// A bundle may be absent; validators that accept bundles report that case
/// themselves.
#[derive(Debug, Clone, Copy)]
pub enum ValidationObject<'a> {
    Bundle(Option<&'a Bundle>),
    Csv(&'a ClusterServiceVersion),
    Object(&'a Object),
}

impl ValidationObject<'_> {
    pub fn shape(&self) -> ObjectShape {
        match self {
            Self::Bundle(_) => ObjectShape::Bundle,
            Self::Csv(_) => ObjectShape::Csv,
            Self::Object(_) => ObjectShape::Object,
        }
    }
}

impl<'a> From<&'a Bundle> for ValidationObject<'a> {
    fn from(bundle: &'a Bundle) -> Self {
        Self::Bundle(Some(bundle))
    }
}

impl<'a> From<&'a ClusterServiceVersion> for ValidationObject<'a> {
    fn from(csv: &'a ClusterServiceVersion) -> Self {
        Self::Csv(csv)
    }
}

impl<'a> From<&'a Object> for ValidationObject<'a> {
    fn from(object: &'a Object) -> Self {
        Self::Object(object)
    }
}

/// A single validation rule
pub trait Validator: Send + Sync {
    /// Stable identifier, used in logs
    fn name(&self) -> &'static str;

    /// Check if this validator applies to objects of the given shape
    fn accepts(&self, shape: ObjectShape) -> bool;

    /// Validate one object; only called for accepted shapes
    fn validate(&self, object: &ValidationObject<'_>) -> ManifestResult;
}

/// Ordered collection of validators
#[derive(Default)]
pub struct ValidatorSet {
    validators: Vec<Box<dyn Validator>>,
}

impl ValidatorSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// The validators opbundle runs by default
    pub fn default_set() -> Self {
        Self::new().with(MaxKubeVersionValidator::new())
    }

    /// Add a validator
    #[must_use]
    pub fn with(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Registered validators, in registration order
    pub fn validators(&self) -> impl Iterator<Item = &dyn Validator> {
        self.validators.iter().map(|v| v.as_ref())
    }

    /// Run every accepting validator against every object
    ///
    /// Results are ordered by object, then by validator registration order.
    pub fn validate(&self, objects: &[ValidationObject<'_>]) -> Vec<ManifestResult> {
        let mut results = Vec::new();

        for object in objects {
            let shape = object.shape();
            for validator in &self.validators {
                if !validator.accepts(shape) {
                    continue;
                }
                tracing::debug!(validator = validator.name(), ?shape, "Running validator");
                results.push(validator.validate(object));
            }
        }

        results
    }
}

impl std::fmt::Debug for ValidatorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.validators.iter().map(|v| v.name()))
            .finish()
    }
}
