//! `which` over the resolver.
//!
//! Prints the first executable match on `PATH` for each name, or every match
//! with `-a`. With `--json` each name produces one NDJSON record instead.
//! Exit status is 1 when any name was not found.

use anyhow::{Result, bail};
use execable::logging::init_tracing;
use execable::resolver::SearchPath;
use serde::Serialize;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("execable-which: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse()?;
    let path_value = env::var_os("PATH");

    let mut all_found = true;
    for name in &cli.names {
        let mut search = SearchPath::from_value(path_value.as_deref());
        let matches: Vec<PathBuf> = if cli.all {
            search.executables(name).collect()
        } else {
            search.executables(name).take(1).collect()
        };
        all_found &= !matches.is_empty();

        if cli.json {
            let record = WhichRecord {
                name: name.to_string_lossy().into_owned(),
                found: !matches.is_empty(),
                paths: matches
                    .iter()
                    .map(|path| path.to_string_lossy().into_owned())
                    .collect(),
            };
            println!("{}", serde_json::to_string(&record)?);
        } else {
            for path in &matches {
                println!("{}", path.display());
            }
        }
    }

    Ok(if all_found {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

#[derive(Serialize)]
struct WhichRecord {
    name: String,
    found: bool,
    paths: Vec<String>,
}

struct Cli {
    all: bool,
    json: bool,
    names: Vec<OsString>,
}

impl Cli {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut all = false;
        let mut json = false;
        let mut names = Vec::new();

        while let Some(arg) = args.next() {
            let text = arg.to_str().map(str::to_owned);
            match text.as_deref() {
                Some("-a") | Some("--all") => all = true,
                Some("--json") => json = true,
                Some("-h") | Some("--help") => usage(0),
                Some("--") => {
                    names.extend(args);
                    break;
                }
                Some(flag) if flag.starts_with('-') && flag.len() > 1 => {
                    eprintln!("Unknown option: {flag}");
                    usage(2);
                }
                _ => names.push(arg),
            }
        }

        if names.is_empty() {
            bail!("expected at least one program name (see --help)");
        }

        Ok(Self { all, json, names })
    }
}

fn usage(code: u8) -> ! {
    eprintln!(
        "Usage: execable-which [-a] [--json] NAME...\n\nOptions:\n  -a, --all   Print every match on PATH, not just the first.\n  --json      Emit one JSON record per NAME (name, found, paths).\n\nExit status is 1 if any NAME was not found."
    );
    std::process::exit(i32::from(code));
}
