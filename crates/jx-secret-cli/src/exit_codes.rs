//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.
//! Per-document conversion failures never change the exit code.

/// Success - every document was processed (some may have been logged)
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Configuration error - invalid environment or options
pub const CONFIG_ERROR: i32 = 2;

/// IO error - standard input unreadable, output unwritable
pub const IO_ERROR: i32 = 5;
