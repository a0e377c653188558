// Exit status for each kind of load failure

use graphload::LoadError;

/// Exit status for a failure that is not a [`LoadError`]
pub const EXIT_OTHER: u8 = 1;
pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_SOURCE_READ: u8 = 3;
pub const EXIT_CONNECTION: u8 = 4;
pub const EXIT_BATCH_WRITE: u8 = 5;

/// Map a command failure to a process exit status
///
/// Context added with `anyhow` does not hide the underlying [`LoadError`].
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<LoadError>() {
        Some(LoadError::Config(_)) => EXIT_CONFIG,
        Some(LoadError::SourceRead { .. }) => EXIT_SOURCE_READ,
        Some(LoadError::Connection(_)) => EXIT_CONNECTION,
        Some(LoadError::BatchWrite { .. }) => EXIT_BATCH_WRITE,
        None => EXIT_OTHER,
    }
}
