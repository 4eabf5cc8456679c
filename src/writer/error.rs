//! Error types for the managed-file write path.
//!
//! Read paths in this crate degrade silently; the write path fails
//! loudly instead — a rejected write is recoverable, a silently mangled
//! config file is not.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for managed-file writes.
#[derive(Debug, Error)]
pub enum WriteError {
    /// No managed-file path is designated for this config set.
    #[error("No managed config file path is configured; cannot write")]
    NoManagedPath,

    /// An incoming entry's MAC address is already reserved by a file the
    /// engine does not manage. Creating the duplicate would produce an
    /// ambiguous reservation the daemon itself rejects or misapplies.
    #[error("MAC address {mac} is already defined in '{}', which is not managed by this tool", file.display())]
    MacConflict {
        /// The conflicting MAC address.
        mac: String,
        /// The non-managed file that already defines it.
        file: PathBuf,
    },

    /// Failed to read the managed file before merging.
    #[error("Failed to read managed file '{}': {source}", path.display())]
    Read {
        /// Path of the managed file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the temporary file or rename it over the target.
    #[error("Failed to write managed file '{}': {source}", path.display())]
    Write {
        /// Path of the managed file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
