//! Launch error types.
//!
//! Resolver lookups never fail loudly (a miss is just `None`), so every
//! variant here belongs to the launch side: the applet phase, the search-path
//! fallback, and argument-vector assembly.

use std::ffi::OsString;
use std::io;
use thiserror::Error;

/// Errors surfaced when a launch returns instead of replacing the process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The name is not a registered applet. This is the only failure that
    /// lets the launcher fall back to the search-path primitive.
    #[error("{name}: applet not found")]
    AppletNotFound { name: String },

    /// Nothing could be executed under that name (ENOENT class).
    #[error("{}: not found", .program.to_string_lossy())]
    NotFound {
        program: OsString,
        #[source]
        source: io::Error,
    },

    /// The process-replace primitive returned for any other reason.
    #[error("failed to launch {}: {source}", .program.to_string_lossy())]
    LaunchFailed {
        program: OsString,
        #[source]
        source: io::Error,
    },

    /// Growing the argument vector could not reserve memory.
    #[error("unable to grow argument vector to {requested} entries")]
    AllocationFailed { requested: usize },

    /// An argument or program name carried an interior NUL byte.
    #[error("argument contains an interior NUL byte: {}", .arg.to_string_lossy())]
    InvalidArgument { arg: OsString },

    /// The argument list ended without its terminating `None`.
    #[error("argument list is missing its terminating sentinel")]
    MissingSentinel,
}

impl LaunchError {
    /// Classify an OS failure from a process-replace attempt.
    pub fn from_exec_failure(program: impl Into<OsString>, source: io::Error) -> Self {
        let program = program.into();
        if is_not_found(&source) {
            LaunchError::NotFound { program, source }
        } else {
            LaunchError::LaunchFailed { program, source }
        }
    }

    /// Raw errno equivalent, matching what `errno` would hold after the
    /// C-level call.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            LaunchError::AppletNotFound { .. } => Some(libc::ENOENT),
            LaunchError::NotFound { source, .. } => source.raw_os_error().or(Some(libc::ENOENT)),
            LaunchError::LaunchFailed { source, .. } => source.raw_os_error(),
            LaunchError::AllocationFailed { .. } => Some(libc::ENOMEM),
            LaunchError::InvalidArgument { .. } | LaunchError::MissingSentinel => {
                Some(libc::EINVAL)
            }
        }
    }

    /// True for the not-found classification (registry miss or ENOENT).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LaunchError::AppletNotFound { .. } | LaunchError::NotFound { .. }
        )
    }
}

pub(crate) fn is_not_found(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::ENOENT) || err.kind() == io::ErrorKind::NotFound
}
