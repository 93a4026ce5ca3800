//! opbundle Core - Core types for operator bundle validation
//!
//! This crate provides the foundational types used throughout opbundle:
//! - `Bundle`: An operator bundle (ClusterServiceVersion plus manifests)
//! - `ClusterServiceVersion`: The bundle descriptor and its annotations
//! - `Object`: An unstructured Kubernetes manifest
//! - `DeprecationDetector`: Detection of APIs removed in Kubernetes v1.22
//! - `parse_tolerant`: Lenient semantic version parsing

pub mod archive;
pub mod bundle;
pub mod deprecation;
pub mod error;
pub mod version;

pub use bundle::{Bundle, ClusterServiceVersion, Object, ObjectMeta};
pub use deprecation::{DeprecationDetector, DeprecationSignal, DetectionResult, RemovedApisDetector};
pub use error::{CoreError, Result};
pub use version::{VersionError, parse_tolerant};
