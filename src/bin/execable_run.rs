//! Launch a program, preferring a registered applet over anything on PATH.
//!
//! Responsibilities:
//! - load the launcher manifest (`--manifest`, `EXECABLE_MANIFEST`, or the
//!   build-time default) and apply environment overrides
//! - hand PROGRAM and its arguments to the applet-preferring launcher
//! - map a failed launch onto shell exit codes: 127 not found, 126 otherwise

use anyhow::{Result, bail};
use execable::logging::init_tracing;
use execable::{Launcher, LauncherConfig, build_argv_and_launch};
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_NOT_FOUND: u8 = 127;
const EXIT_CANNOT_EXECUTE: u8 = 126;
const EXIT_USAGE: u8 = 2;

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("execable-run: {err:#}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse()?;
    let config = LauncherConfig::load(cli.manifest.as_deref())?;
    let launcher = Launcher::from_config(config);

    let rest: Vec<Option<&OsStr>> = cli
        .args
        .iter()
        .map(|arg| Some(arg.as_os_str()))
        .chain(std::iter::once(None))
        .collect();

    // Only reachable when the launch failed.
    let Err(err) = build_argv_and_launch(
        &launcher,
        &cli.program,
        Some(cli.program.as_os_str()),
        &rest,
    );
    eprintln!("execable-run: {err}");
    Ok(ExitCode::from(if err.is_not_found() {
        EXIT_NOT_FOUND
    } else {
        EXIT_CANNOT_EXECUTE
    }))
}

struct Cli {
    manifest: Option<PathBuf>,
    program: OsString,
    args: Vec<OsString>,
}

impl Cli {
    fn parse() -> Result<Self> {
        let mut args_iter = env::args_os().skip(1);
        let mut manifest = None;

        while let Some(arg) = args_iter.next() {
            let text = arg.to_str().map(str::to_owned);
            match text.as_deref() {
                Some("--manifest") => {
                    let Some(value) = args_iter.next() else {
                        bail!("Missing path for --manifest");
                    };
                    manifest = Some(PathBuf::from(value));
                }
                Some(flag) if flag.starts_with("--manifest=") => {
                    let value = flag.split_once('=').map(|(_, v)| v).unwrap_or("");
                    manifest = Some(PathBuf::from(value));
                }
                Some("-h") | Some("--help") => usage(0),
                Some("--") => {
                    return Self::from_positionals(manifest, args_iter.collect());
                }
                Some(flag) if flag.starts_with("--") => {
                    eprintln!("Unknown option: {flag}");
                    usage(EXIT_USAGE);
                }
                _ => {
                    let mut positionals = vec![arg];
                    positionals.extend(args_iter);
                    return Self::from_positionals(manifest, positionals);
                }
            }
        }

        usage(EXIT_USAGE)
    }

    fn from_positionals(
        manifest: Option<PathBuf>,
        mut positionals: Vec<OsString>,
    ) -> Result<Self> {
        if positionals.is_empty() {
            bail!("expected PROGRAM (see --help)");
        }
        let program = positionals.remove(0);
        Ok(Self {
            manifest,
            program,
            args: positionals,
        })
    }
}

fn usage(code: u8) -> ! {
    eprintln!(
        "Usage: execable-run [--manifest PATH] PROGRAM [ARGS...]\n\nOptions:\n  --manifest PATH   Launcher manifest (JSON: prefer_applets, applets, exec_paths).\n\nEnvironment:\n  EXECABLE_MANIFEST         Manifest path when --manifest is not given.\n  EXECABLE_PREFER_APPLETS   Set to 0 to skip the applet attempt.\n  EXECABLE_EXEC_PATHS       Colon-separated self-image paths for applets.\n  EXECABLE_LOG              Tracing filter (default: warn).\n\nExit status: 127 if PROGRAM was not found, 126 if it could not be executed."
    );
    std::process::exit(i32::from(code));
}
