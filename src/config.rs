//! Launcher configuration.
//!
//! Settings come from three places, later ones winning:
//! built-in defaults, an optional JSON manifest (validated against
//! `schema/launcher_manifest.schema.json`), then environment overrides.
//!
//! Manifest lookup order: explicit path, `EXECABLE_MANIFEST`, then the
//! build-time `EXECABLE_DEFAULT_MANIFEST` hint when that file exists.

use crate::applets::AppletTable;
use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde::Deserialize;
use serde_json::Value;
use std::env;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const MANIFEST_ENV: &str = "EXECABLE_MANIFEST";
pub const PREFER_APPLETS_ENV: &str = "EXECABLE_PREFER_APPLETS";
pub const EXEC_PATHS_ENV: &str = "EXECABLE_EXEC_PATHS";

const MANIFEST_SCHEMA: &str = include_str!("../schema/launcher_manifest.schema.json");

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LauncherConfig {
    pub prefer_applets: bool,
    pub applets: AppletTable,
    pub exec_paths: Vec<PathBuf>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            prefer_applets: true,
            applets: AppletTable::default(),
            exec_paths: default_exec_paths(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    prefer_applets: Option<bool>,
    #[serde(default)]
    applets: Vec<String>,
    exec_paths: Option<Vec<PathBuf>>,
}

impl LauncherConfig {
    /// Load using the process environment.
    pub fn load(manifest: Option<&Path>) -> Result<Self> {
        Self::load_with_env(manifest, |key| env::var_os(key))
    }

    /// Load with an injected environment lookup.
    pub fn load_with_env<F>(manifest: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let manifest_path = manifest
            .map(Path::to_path_buf)
            .or_else(|| lookup(MANIFEST_ENV).filter(|v| !v.is_empty()).map(PathBuf::from))
            .or_else(build_time_manifest);

        let mut config = match manifest_path {
            Some(path) => {
                debug!(manifest = %path.display(), "loading launcher manifest");
                Self::from_manifest_path(&path)?
            }
            None => Self::default(),
        };
        config.apply_env(lookup);
        Ok(config)
    }

    pub fn from_manifest_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading launcher manifest {}", path.display()))?;
        Self::from_manifest_str(&raw)
            .with_context(|| format!("loading launcher manifest {}", path.display()))
    }

    pub fn from_manifest_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw).context("parsing manifest JSON")?;
        validate_manifest(&value)?;
        let manifest: Manifest =
            serde_json::from_value(value).context("decoding manifest fields")?;

        let defaults = Self::default();
        Ok(Self {
            prefer_applets: manifest.prefer_applets.unwrap_or(defaults.prefer_applets),
            applets: AppletTable::new(manifest.applets),
            exec_paths: manifest.exec_paths.unwrap_or(defaults.exec_paths),
        })
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<OsString>,
    {
        if let Some(value) = lookup(PREFER_APPLETS_ENV) {
            self.prefer_applets = env_flag(&value);
        }
        if let Some(value) = lookup(EXEC_PATHS_ENV) {
            self.exec_paths = split_exec_paths(&value);
        }
    }
}

/// Self-image candidates used when no manifest names any.
pub fn default_exec_paths() -> Vec<PathBuf> {
    if cfg!(any(target_os = "linux", target_os = "android")) {
        vec![PathBuf::from("/proc/self/exe")]
    } else {
        env::current_exe().ok().into_iter().collect()
    }
}

fn build_time_manifest() -> Option<PathBuf> {
    option_env!("EXECABLE_DEFAULT_MANIFEST")
        .map(PathBuf::from)
        .filter(|path| path.is_file())
}

fn env_flag(value: &OsStr) -> bool {
    let value = value.to_string_lossy();
    !value.trim().is_empty() && value.trim() != "0"
}

fn split_exec_paths(value: &OsStr) -> Vec<PathBuf> {
    value
        .as_bytes()
        .split(|&b| b == b':')
        .filter(|segment| !segment.is_empty())
        .map(|segment| PathBuf::from(OsStr::from_bytes(segment)))
        .collect()
}

fn validate_manifest(value: &Value) -> Result<()> {
    let schema: Value =
        serde_json::from_str(MANIFEST_SCHEMA).context("parsing bundled manifest schema")?;
    let compiled = JSONSchema::compile(&schema)
        .map_err(|err| anyhow!("compiling bundled manifest schema: {err}"))?;
    if let Err(errors) = compiled.validate(value) {
        let details = errors
            .map(|err| err.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        bail!("launcher manifest failed validation:\n{details}");
    }
    Ok(())
}
