//! Executable lookup over colon-separated search paths.
//!
//! A [`SearchPath`] owns a private copy of the path string plus a cursor into
//! it. Each call to [`find_executable`] consumes segments from the cursor
//! until a candidate passes [`is_executable_regular_file`], leaving the
//! cursor just past the matching segment so the next call resumes the scan.

use std::env;
use std::ffi::{CString, OsStr};
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use tracing::trace;

const SEPARATOR: u8 = b':';

/// Owned search path with a resume cursor.
///
/// The cursor is `None` once every segment has been consumed; further
/// lookups return `None` without touching the filesystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchPath {
    buf: Vec<u8>,
    cursor: Option<usize>,
}

impl SearchPath {
    /// Take a private copy of `value`; the caller's string is never touched.
    pub fn new(value: impl AsRef<OsStr>) -> Self {
        Self {
            buf: value.as_ref().as_bytes().to_vec(),
            cursor: Some(0),
        }
    }

    /// A search path with nothing left to visit (an unset `PATH`).
    pub fn exhausted() -> Self {
        Self {
            buf: Vec::new(),
            cursor: None,
        }
    }

    /// Copy `PATH` out of the process environment.
    pub fn from_env() -> Self {
        Self::from_value(env::var_os("PATH").as_deref())
    }

    pub fn from_value(value: Option<&OsStr>) -> Self {
        value.map_or_else(Self::exhausted, Self::new)
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_none()
    }

    /// The unsearched tail of the path, or `None` once exhausted.
    pub fn remaining(&self) -> Option<&OsStr> {
        self.cursor.map(|start| OsStr::from_bytes(&self.buf[start..]))
    }

    /// Iterate over every executable named `filename`, in path order.
    pub fn executables<'a>(&'a mut self, filename: &'a OsStr) -> Executables<'a> {
        Executables {
            search: self,
            filename,
        }
    }

    /// Consume the next segment, returning its byte range in `buf`.
    fn next_segment(&mut self) -> Option<(usize, usize)> {
        let start = self.cursor?;
        match self.buf[start..].iter().position(|&b| b == SEPARATOR) {
            Some(offset) => {
                self.cursor = Some(start + offset + 1);
                Some((start, start + offset))
            }
            None => {
                self.cursor = None;
                Some((start, self.buf.len()))
            }
        }
    }
}

/// Iterator returned by [`SearchPath::executables`].
pub struct Executables<'a> {
    search: &'a mut SearchPath,
    filename: &'a OsStr,
}

impl Iterator for Executables<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        find_executable(self.filename, self.search)
    }
}

/// Returns true when `path` passes an `X_OK` access check for the current
/// credentials and `stat` reports a regular file.
pub fn is_executable_regular_file(path: &Path) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `c_path` is a valid NUL-terminated string for the duration of
    // the call.
    let accessible = unsafe { libc::access(c_path.as_ptr(), libc::X_OK) } == 0;
    accessible
        && fs::metadata(path)
            .map(|meta| meta.is_file())
            .unwrap_or(false)
}

/// Join `dir` and `filename` with exactly one '/' between them.
pub fn concat_path_file(dir: &OsStr, filename: &OsStr) -> PathBuf {
    let dir = dir.as_bytes();
    let name = filename.as_bytes();
    let name = &name[name.iter().take_while(|&&b| b == b'/').count()..];

    let mut joined = Vec::with_capacity(dir.len() + name.len() + 1);
    joined.extend_from_slice(dir);
    if dir.last() != Some(&b'/') {
        joined.push(b'/');
    }
    joined.extend_from_slice(name);
    PathBuf::from(OsStr::from_bytes(&joined))
}

/// Search the rest of `path` for an executable named `filename`.
///
/// On a match the cursor is left just past the matching segment, so calling
/// again continues with the next segment. Empty segments ("a::b", leading or
/// trailing ':') are skipped without a filesystem query.
pub fn find_executable(filename: &OsStr, path: &mut SearchPath) -> Option<PathBuf> {
    find_executable_with(filename, path, is_executable_regular_file)
}

/// [`find_executable`] with the executability check supplied by the caller.
pub fn find_executable_with<F>(
    filename: &OsStr,
    path: &mut SearchPath,
    mut is_executable: F,
) -> Option<PathBuf>
where
    F: FnMut(&Path) -> bool,
{
    while let Some((start, end)) = path.next_segment() {
        if start == end {
            continue;
        }
        let candidate = concat_path_file(OsStr::from_bytes(&path.buf[start..end]), filename);
        if is_executable(&candidate) {
            trace!(candidate = %candidate.display(), "executable match");
            return Some(candidate);
        }
    }
    None
}

/// Returns true when `filename` resolves to an executable somewhere on
/// `path_value`.
///
/// The lookup runs on a private copy; `path_value` is only read.
pub fn path_contains_executable(filename: &OsStr, path_value: Option<&OsStr>) -> bool {
    let mut search = SearchPath::from_value(path_value);
    find_executable(filename, &mut search).is_some()
}

/// [`path_contains_executable`] against the process `PATH`.
pub fn path_contains_executable_in_env(filename: &OsStr) -> bool {
    path_contains_executable(filename, env::var_os("PATH").as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).expect("create fixture");
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).expect("chmod fixture");
        path
    }

    #[test]
    fn concat_path_file_avoids_double_separator() {
        assert_eq!(
            concat_path_file(OsStr::new("/usr/bin"), OsStr::new("ls")),
            PathBuf::from("/usr/bin/ls")
        );
        assert_eq!(
            concat_path_file(OsStr::new("/usr/bin/"), OsStr::new("ls")),
            PathBuf::from("/usr/bin/ls")
        );
        assert_eq!(
            concat_path_file(OsStr::new("bin"), OsStr::new("//ls")),
            PathBuf::from("bin/ls")
        );
    }

    #[test]
    fn empty_segments_are_never_queried() {
        let mut search = SearchPath::new(":a::b:");
        let mut queried = Vec::new();
        let found = find_executable_with(OsStr::new("tool"), &mut search, |candidate| {
            queried.push(candidate.to_path_buf());
            false
        });
        assert!(found.is_none());
        assert_eq!(queried, vec![PathBuf::from("a/tool"), PathBuf::from("b/tool")]);
        assert!(search.is_exhausted());
    }

    #[test]
    fn cursor_resumes_after_matching_segment() {
        let mut search = SearchPath::new("one:two:three");
        let found = find_executable_with(OsStr::new("x"), &mut search, |c| c.starts_with("two"));
        assert_eq!(found, Some(PathBuf::from("two/x")));
        assert_eq!(search.remaining(), Some(OsStr::new("three")));
    }

    #[test]
    fn match_in_last_segment_exhausts_cursor() {
        let mut search = SearchPath::new("one:two");
        let found = find_executable_with(OsStr::new("x"), &mut search, |c| c.starts_with("two"));
        assert_eq!(found, Some(PathBuf::from("two/x")));
        assert!(search.is_exhausted());
        let mut calls = 0;
        assert!(
            find_executable_with(OsStr::new("x"), &mut search, |_| {
                calls += 1;
                true
            })
            .is_none()
        );
        assert_eq!(calls, 0);
    }

    #[test]
    fn empty_path_value_finds_nothing() {
        let mut search = SearchPath::new("");
        assert!(find_executable_with(OsStr::new("x"), &mut search, |_| true).is_none());
        assert!(SearchPath::from_value(None).is_exhausted());
    }

    #[test]
    fn executable_regular_file_is_detected() {
        let dir = TempDir::new().expect("tempdir");
        let exe = write_file(dir.path(), "tool", 0o755);
        assert!(is_executable_regular_file(&exe));
    }

    #[test]
    fn non_executable_file_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let plain = write_file(dir.path(), "notes", 0o644);
        assert!(!is_executable_regular_file(&plain));
    }

    #[test]
    fn directory_with_execute_bit_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let sub = dir.path().join("subdir");
        fs::create_dir(&sub).expect("mkdir");
        fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).expect("chmod");
        assert!(!is_executable_regular_file(&sub));
        assert!(!is_executable_regular_file(&dir.path().join("missing")));
    }

    #[test]
    fn symlink_to_executable_counts_as_regular() {
        let dir = TempDir::new().expect("tempdir");
        let exe = write_file(dir.path(), "real", 0o755);
        let link = dir.path().join("alias");
        std::os::unix::fs::symlink(&exe, &link).expect("symlink");
        assert!(is_executable_regular_file(&link));
    }

    #[test]
    fn executables_iterator_visits_every_match_in_order() {
        let first = TempDir::new().expect("tempdir");
        let second = TempDir::new().expect("tempdir");
        let skipped = TempDir::new().expect("tempdir");
        write_file(first.path(), "tool", 0o755);
        write_file(second.path(), "tool", 0o755);
        write_file(skipped.path(), "tool", 0o644);

        let value = format!(
            "{}::{}:{}",
            first.path().display(),
            skipped.path().display(),
            second.path().display()
        );
        let mut search = SearchPath::new(&value);
        let matches: Vec<PathBuf> = search.executables(OsStr::new("tool")).collect();
        assert_eq!(
            matches,
            vec![first.path().join("tool"), second.path().join("tool")]
        );
        assert!(search.is_exhausted());
    }

    #[test]
    fn path_contains_executable_leaves_value_untouched() {
        let dir = TempDir::new().expect("tempdir");
        write_file(dir.path(), "tool", 0o755);
        let value = std::ffi::OsString::from(format!("/nonexistent:{}", dir.path().display()));
        let before = value.clone();

        assert!(path_contains_executable(OsStr::new("tool"), Some(value.as_os_str())));
        assert!(!path_contains_executable(OsStr::new("absent"), Some(value.as_os_str())));
        assert!(!path_contains_executable(OsStr::new("tool"), None));
        assert_eq!(value, before);
    }
}
