//! Bundle validation rules

pub mod max_kube_version;
