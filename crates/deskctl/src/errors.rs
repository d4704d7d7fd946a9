//! Exit codes for deskctl

use desk_common::DeskError;

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when the config cannot be read or is invalid
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Exit code when an output file cannot be written
pub const EXIT_OUTPUT_ERROR: i32 = 3;

/// Map a failure to its exit code by the first `DeskError` in the chain
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.chain().find_map(|e| e.downcast_ref::<DeskError>()) {
        Some(e) if e.is_config() => EXIT_CONFIG_ERROR,
        Some(e) if e.is_output() => EXIT_OUTPUT_ERROR,
        _ => EXIT_GENERAL_ERROR,
    }
}
