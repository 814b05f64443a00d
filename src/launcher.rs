//! Applet-preferring launcher.
//!
//! A requested program is first looked up in the applet registry. Registered
//! applets are exec'd through each self-image path in turn; only a registry
//! miss falls through to the ordinary `PATH`-searching exec. A registered
//! applet whose images all fail (or that has no images at all) is reported
//! as-is without trying `PATH`.

use crate::applets::{AppletLookup, AppletTable};
use crate::argv::{ArgVector, EnvBlock};
use crate::config::LauncherConfig;
use crate::error::LaunchError;
use crate::process::{ProcessReplace, SystemExec};
use std::convert::Infallible;
use std::ffi::OsStr;
use std::io;
use std::path::PathBuf;
use tracing::debug;

pub struct Launcher<R = AppletTable, P = SystemExec> {
    prefer_applets: bool,
    registry: R,
    exec_paths: Vec<PathBuf>,
    replacer: P,
}

impl Launcher {
    /// Launcher backed by the real exec calls.
    pub fn from_config(config: LauncherConfig) -> Self {
        Launcher {
            prefer_applets: config.prefer_applets,
            registry: config.applets,
            exec_paths: config.exec_paths,
            replacer: SystemExec,
        }
    }
}

impl<R: AppletLookup, P: ProcessReplace> Launcher<R, P> {
    /// Applet preference starts enabled.
    pub fn new(registry: R, exec_paths: Vec<PathBuf>, replacer: P) -> Self {
        Self {
            prefer_applets: true,
            registry,
            exec_paths,
            replacer,
        }
    }

    pub fn with_prefer_applets(mut self, prefer_applets: bool) -> Self {
        self.prefer_applets = prefer_applets;
        self
    }

    pub fn prefer_applets(&self) -> bool {
        self.prefer_applets
    }

    pub fn exec_paths(&self) -> &[PathBuf] {
        &self.exec_paths
    }

    /// Exec `name` as an applet through each self-image path.
    ///
    /// Fails with [`LaunchError::AppletNotFound`] without touching the
    /// filesystem when the registry does not know `name`.
    pub fn launch_applet(
        &self,
        name: &OsStr,
        argv: &ArgVector,
        envp: &EnvBlock,
    ) -> Result<Infallible, LaunchError> {
        let applet = name
            .to_str()
            .and_then(|utf8| self.registry.find_applet_by_name(utf8));
        let Some(index) = applet else {
            debug!(name = %name.to_string_lossy(), "not a registered applet");
            return Err(LaunchError::AppletNotFound {
                name: name.to_string_lossy().into_owned(),
            });
        };

        let mut last_error = None;
        for image in &self.exec_paths {
            debug!(applet = index, image = %image.display(), "exec applet image");
            let Err(err) = self.replacer.execve(image, argv, envp);
            debug!(image = %image.display(), error = %err, "applet image failed");
            last_error = Some(err);
        }

        let err = last_error.unwrap_or_else(|| io::Error::from_raw_os_error(libc::ENOENT));
        Err(LaunchError::from_exec_failure(name, err))
    }

    /// Like `execvpe`, but a registered applet wins over anything on `PATH`.
    pub fn launch_preferring_applet(
        &self,
        file: &OsStr,
        argv: &ArgVector,
        envp: &EnvBlock,
    ) -> Result<Infallible, LaunchError> {
        if self.prefer_applets {
            let Err(err) = self.launch_applet(file, argv, envp);
            if !matches!(err, LaunchError::AppletNotFound { .. }) {
                return Err(err);
            }
            debug!(file = %file.to_string_lossy(), "falling back to PATH search");
        }

        let Err(err) = self.replacer.execvpe(file, argv, envp);
        Err(LaunchError::from_exec_failure(file, err))
    }

    /// [`Self::launch_preferring_applet`] with the current process
    /// environment.
    pub fn launch_preferring_applet_default_env(
        &self,
        file: &OsStr,
        argv: &ArgVector,
    ) -> Result<Infallible, LaunchError> {
        let envp = EnvBlock::current()?;
        self.launch_preferring_applet(file, argv, &envp)
    }
}
