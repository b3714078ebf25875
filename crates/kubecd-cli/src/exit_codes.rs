//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Environment error - invalid environment file, unknown release or chart
pub const ENVIRONMENT_ERROR: i32 = 2;

/// Values error - a values file could not be parsed
pub const VALUES_ERROR: i32 = 3;

/// External error - helm or gcloud failed
pub const EXTERNAL_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;
