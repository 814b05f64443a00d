use anyhow::{Context, Result};
use execable::{ArgVector, EnvBlock, ProcessReplace};
use std::cell::RefCell;
use std::convert::Infallible;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn helper_binary(name: &str) -> PathBuf {
    let path = match name {
        "execable-which" => env!("CARGO_BIN_EXE_execable-which"),
        "execable-run" => env!("CARGO_BIN_EXE_execable-run"),
        other => panic!("unknown helper binary {other}"),
    };
    PathBuf::from(path)
}

/// Run to completion and hand back the output whatever the exit status.
pub fn run_command(mut cmd: Command) -> Result<Output> {
    cmd.output()
        .with_context(|| format!("failed to run command: {:?}", cmd))
}

pub fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)?;
    Ok(())
}

pub fn write_script(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n"))
        .with_context(|| format!("writing script {}", path.display()))?;
    make_executable(&path)?;
    Ok(path)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecCall {
    Execve(PathBuf, Vec<OsString>),
    Execvpe(OsString, Vec<OsString>),
}

/// Records every exec request and fails it with a fixed errno.
pub struct RecordingExec {
    pub calls: RefCell<Vec<ExecCall>>,
    errno: i32,
}

impl RecordingExec {
    pub fn failing_with(errno: i32) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            errno,
        }
    }

    pub fn calls(&self) -> Vec<ExecCall> {
        self.calls.borrow().clone()
    }
}

impl ProcessReplace for RecordingExec {
    fn execve(
        &self,
        path: &Path,
        argv: &ArgVector,
        _envp: &EnvBlock,
    ) -> Result<Infallible, io::Error> {
        self.calls
            .borrow_mut()
            .push(ExecCall::Execve(path.to_path_buf(), argv.to_os_strings()));
        Err(io::Error::from_raw_os_error(self.errno))
    }

    fn execvpe(
        &self,
        file: &OsStr,
        argv: &ArgVector,
        _envp: &EnvBlock,
    ) -> Result<Infallible, io::Error> {
        self.calls
            .borrow_mut()
            .push(ExecCall::Execvpe(file.to_os_string(), argv.to_os_strings()));
        Err(io::Error::from_raw_os_error(self.errno))
    }
}
