//! Executable lookup and applet-preferring launch.
//!
//! Two independent strategies live here. [`resolver`] walks a colon-separated
//! search path and reports the first (or, via the resume cursor, every)
//! regular executable file with a given name. [`launcher`] replaces the
//! current process: registered applets are exec'd through the configured
//! self-image paths, and only names the applet registry does not know fall
//! back to the ordinary `PATH`-searching exec.
//!
//! The binaries under `src/bin/` are thin CLIs over these modules.

pub mod applets;
pub mod argv;
pub mod config;
pub mod error;
pub mod launcher;
pub mod logging;
pub mod process;
pub mod resolver;

pub use applets::{AppletLookup, AppletTable};
pub use argv::{ArgVector, EnvBlock, INITIAL_ARGV_CAPACITY, build_argv_and_launch};
pub use config::LauncherConfig;
pub use error::LaunchError;
pub use launcher::Launcher;
pub use process::{ProcessReplace, SystemExec};
pub use resolver::{
    Executables, SearchPath, concat_path_file, find_executable, find_executable_with,
    is_executable_regular_file, path_contains_executable, path_contains_executable_in_env,
};
