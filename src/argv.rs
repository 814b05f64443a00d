//! NUL-terminated argument and environment vectors for the exec family,
//! plus the `execlp`-style entry point that assembles one and launches it.

use crate::applets::AppletLookup;
use crate::error::LaunchError;
use crate::launcher::Launcher;
use crate::process::ProcessReplace;
use std::convert::Infallible;
use std::env;
use std::ffi::{CStr, CString, OsStr, OsString};
use std::os::raw::c_char;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::ptr;

/// Starting capacity of an [`ArgVector`]; growth doubles from here.
pub const INITIAL_ARGV_CAPACITY: usize = 16;

/// Growable list of C strings handed to `execve`/`execvpe`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArgVector {
    items: Vec<CString>,
}

impl ArgVector {
    pub fn new() -> Self {
        Self {
            items: Vec::with_capacity(INITIAL_ARGV_CAPACITY),
        }
    }

    /// Build from an already complete list.
    pub fn from_args<I, S>(args: I) -> Result<Self, LaunchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut argv = Self::new();
        for arg in args {
            argv.push(arg.as_ref())?;
        }
        Ok(argv)
    }

    /// Append one argument, doubling capacity when the vector is full.
    pub fn push(&mut self, arg: &OsStr) -> Result<(), LaunchError> {
        let item = to_cstring(arg)?;
        if self.items.len() == self.items.capacity() {
            let additional = self.items.capacity().max(INITIAL_ARGV_CAPACITY);
            self.items
                .try_reserve_exact(additional)
                .map_err(|_| LaunchError::AllocationFailed {
                    requested: self.items.len() + additional,
                })?;
        }
        self.items.push(item);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CStr> {
        self.items.iter().map(CString::as_c_str)
    }

    /// Owned copies of the arguments, without the trailing NUL entry.
    pub fn to_os_strings(&self) -> Vec<OsString> {
        self.items
            .iter()
            .map(|item| OsString::from_vec(item.as_bytes().to_vec()))
            .collect()
    }

    /// Pointer view terminated by a null entry, valid while `self` lives.
    pub fn as_ptrs(&self) -> Vec<*const c_char> {
        self.items
            .iter()
            .map(|item| item.as_ptr())
            .chain(std::iter::once(ptr::null()))
            .collect()
    }
}

/// Environment block in `KEY=VALUE` form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvBlock {
    entries: ArgVector,
}

impl EnvBlock {
    /// Snapshot of the current process environment.
    pub fn current() -> Result<Self, LaunchError> {
        Self::from_pairs(env::vars_os())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, LaunchError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        let mut entries = ArgVector::new();
        for (key, value) in pairs {
            let mut entry = OsString::from(key.as_ref());
            entry.push("=");
            entry.push(value.as_ref());
            entries.push(&entry)?;
        }
        Ok(Self { entries })
    }

    /// Value of `key`, if present. The last definition wins.
    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.entries
            .iter()
            .filter_map(|entry| {
                let bytes = entry.to_bytes();
                let rest = bytes.strip_prefix(key.as_bytes())?;
                rest.strip_prefix(b"=").map(OsStr::from_bytes)
            })
            .last()
    }

    pub fn as_ptrs(&self) -> Vec<*const c_char> {
        self.entries.as_ptrs()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Assemble `first_arg` and `rest` into an argument vector and launch `file`
/// with it, preferring applets.
///
/// `rest` is read up to its first `None`, which terminates the list; entries
/// after it are ignored. A `rest` with no `None` at all is rejected before
/// anything is launched. A `None` `first_arg` yields an empty vector.
pub fn build_argv_and_launch<R, P>(
    launcher: &Launcher<R, P>,
    file: &OsStr,
    first_arg: Option<&OsStr>,
    rest: &[Option<&OsStr>],
) -> Result<Infallible, LaunchError>
where
    R: AppletLookup,
    P: ProcessReplace,
{
    let argv = collect_args(first_arg, rest)?;
    launcher.launch_preferring_applet_default_env(file, &argv)
}

fn collect_args(
    first_arg: Option<&OsStr>,
    rest: &[Option<&OsStr>],
) -> Result<ArgVector, LaunchError> {
    let mut argv = ArgVector::new();
    let Some(first) = first_arg else {
        return Ok(argv);
    };
    if !rest.contains(&None) {
        return Err(LaunchError::MissingSentinel);
    }
    argv.push(first)?;
    for arg in rest.iter().map_while(|arg| *arg) {
        argv.push(arg)?;
    }
    Ok(argv)
}

pub(crate) fn to_cstring(value: &OsStr) -> Result<CString, LaunchError> {
    CString::new(value.as_bytes()).map_err(|_| LaunchError::InvalidArgument {
        arg: value.to_os_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_initial_capacity() {
        let argv = ArgVector::new();
        assert!(argv.is_empty());
        assert!(argv.capacity() >= INITIAL_ARGV_CAPACITY);
    }

    #[test]
    fn growth_preserves_order() {
        let args: Vec<String> = (0..40).map(|i| format!("arg{i}")).collect();
        let argv = ArgVector::from_args(&args).expect("argv");
        assert_eq!(argv.len(), 40);
        assert!(argv.capacity() >= 40);
        let collected: Vec<OsString> = argv.to_os_strings();
        let expected: Vec<OsString> = args.iter().map(OsString::from).collect();
        assert_eq!(collected, expected);
    }

    #[test]
    fn pointer_view_is_null_terminated() {
        let argv = ArgVector::from_args(["ls", "-l"]).expect("argv");
        let ptrs = argv.as_ptrs();
        assert_eq!(ptrs.len(), 3);
        assert!(ptrs[2].is_null());
        assert!(!ptrs[0].is_null());
    }

    #[test]
    fn interior_nul_is_rejected() {
        let mut argv = ArgVector::new();
        let err = argv.push(OsStr::new("bad\0arg")).unwrap_err();
        assert!(matches!(err, LaunchError::InvalidArgument { .. }));
        assert!(argv.is_empty());
    }

    #[test]
    fn collect_stops_at_sentinel() {
        let argv = collect_args(
            Some(OsStr::new("ls")),
            &[
                Some(OsStr::new("-l")),
                Some(OsStr::new("/tmp")),
                None,
                Some(OsStr::new("x")),
            ],
        )
        .expect("argv");
        assert_eq!(argv.to_os_strings(), vec!["ls", "-l", "/tmp"]);
        assert!(argv.as_ptrs()[3].is_null());
    }

    #[test]
    fn collect_requires_sentinel() {
        let err = collect_args(Some(OsStr::new("ls")), &[Some(OsStr::new("-l"))]).unwrap_err();
        assert!(matches!(err, LaunchError::MissingSentinel));
        assert!(collect_args(None, &[]).expect("empty argv").is_empty());
    }

    #[test]
    fn env_block_lookup_uses_last_definition() {
        let env = EnvBlock::from_pairs([("PATH", "/bin"), ("PATHX", "no"), ("PATH", "/usr/bin")])
            .expect("env");
        assert_eq!(env.len(), 3);
        assert_eq!(env.get("PATH"), Some(OsStr::new("/usr/bin")));
        assert_eq!(env.get("HOME"), None);
    }
}
