//! Process-replace primitives.
//!
//! Both calls only ever come back with an error: on success the calling
//! image is gone. The `Ok` side is [`Infallible`] so callers can never act on
//! a "successful" return.

use crate::argv::{ArgVector, EnvBlock};
use std::convert::Infallible;
use std::ffi::{CString, OsStr};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Search path used by the portable `execvpe` when `envp` has no `PATH`.
pub const DEFAULT_EXEC_PATH: &str = "/bin:/usr/bin";

/// The OS process-replace primitive, as seen by the launcher.
pub trait ProcessReplace {
    /// Replace the process with the image at `path`.
    fn execve(
        &self,
        path: &Path,
        argv: &ArgVector,
        envp: &EnvBlock,
    ) -> Result<Infallible, io::Error>;

    /// Replace the process with `file`, searched for on the `PATH` in effect.
    fn execvpe(
        &self,
        file: &OsStr,
        argv: &ArgVector,
        envp: &EnvBlock,
    ) -> Result<Infallible, io::Error>;
}

impl<T: ProcessReplace + ?Sized> ProcessReplace for &T {
    fn execve(
        &self,
        path: &Path,
        argv: &ArgVector,
        envp: &EnvBlock,
    ) -> Result<Infallible, io::Error> {
        (**self).execve(path, argv, envp)
    }

    fn execvpe(
        &self,
        file: &OsStr,
        argv: &ArgVector,
        envp: &EnvBlock,
    ) -> Result<Infallible, io::Error> {
        (**self).execvpe(file, argv, envp)
    }
}

/// libc-backed implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemExec;

impl ProcessReplace for SystemExec {
    fn execve(
        &self,
        path: &Path,
        argv: &ArgVector,
        envp: &EnvBlock,
    ) -> Result<Infallible, io::Error> {
        let c_path = c_string(path.as_os_str())?;
        let argv_ptrs = argv.as_ptrs();
        let envp_ptrs = envp.as_ptrs();
        // SAFETY: every pointer array is NUL-terminated and borrows strings
        // that outlive the call.
        unsafe {
            libc::execve(c_path.as_ptr(), argv_ptrs.as_ptr(), envp_ptrs.as_ptr());
        }
        Err(io::Error::last_os_error())
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn execvpe(
        &self,
        file: &OsStr,
        argv: &ArgVector,
        envp: &EnvBlock,
    ) -> Result<Infallible, io::Error> {
        let c_file = c_string(file)?;
        let argv_ptrs = argv.as_ptrs();
        let envp_ptrs = envp.as_ptrs();
        // SAFETY: as for `execve`.
        unsafe {
            libc::execvpe(c_file.as_ptr(), argv_ptrs.as_ptr(), envp_ptrs.as_ptr());
        }
        Err(io::Error::last_os_error())
    }

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    fn execvpe(
        &self,
        file: &OsStr,
        argv: &ArgVector,
        envp: &EnvBlock,
    ) -> Result<Infallible, io::Error> {
        search_and_exec(self, file, argv, envp)
    }
}

/// Walk the `PATH` from `envp` the way libc's `execvp` does, calling
/// `execve` on each candidate.
///
/// ENOENT and ENOTDIR move on to the next entry; EACCES is remembered and
/// reported if nothing else succeeds. Any other error stops the walk.
pub fn search_and_exec<P: ProcessReplace + ?Sized>(
    replacer: &P,
    file: &OsStr,
    argv: &ArgVector,
    envp: &EnvBlock,
) -> Result<Infallible, io::Error> {
    if file.is_empty() {
        return Err(io::Error::from_raw_os_error(libc::ENOENT));
    }
    if file.as_bytes().contains(&b'/') {
        return replacer.execve(Path::new(file), argv, envp);
    }

    let search = envp
        .get("PATH")
        .unwrap_or_else(|| OsStr::new(DEFAULT_EXEC_PATH));
    let mut saw_eacces = false;
    for dir in search.as_bytes().split(|&b| b == b':') {
        // An empty entry means the current directory for exec searches.
        let dir: &[u8] = if dir.is_empty() { b"." } else { dir };
        let candidate = crate::resolver::concat_path_file(OsStr::from_bytes(dir), file);
        let Err(err) = replacer.execve(&candidate, argv, envp);
        match err.raw_os_error() {
            Some(libc::EACCES) => saw_eacces = true,
            Some(libc::ENOENT) | Some(libc::ENOTDIR) => {}
            _ => return Err(err),
        }
    }

    let errno = if saw_eacces { libc::EACCES } else { libc::ENOENT };
    Err(io::Error::from_raw_os_error(errno))
}

fn c_string(value: &OsStr) -> Result<CString, io::Error> {
    CString::new(value.as_bytes()).map_err(|_| io::Error::from_raw_os_error(libc::EINVAL))
}
