//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - at least one bundle failed a validator
pub const VALIDATION_ERROR: i32 = 2;

/// Bundle error - missing path, unreadable manifests or invalid bundle layout
pub const BUNDLE_ERROR: i32 = 4;
