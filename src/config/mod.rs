mod args;
mod defaults;
mod error;
mod extended;
mod settings;
mod template;
mod zero;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::CommandFactory;

pub(crate) use error::ResolveError;

use zero::ZeroValue;

/// Settings file read from, and written by `--create-ini-template` to, the
/// current directory.
pub(crate) const SETTINGS_FILE: &str = "volley.ini";

/// Fully resolved parameters of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RunConfig {
    pub url: String,
    pub method: String,
    pub body: String,
    pub concurrency: usize,
    /// 0 means unlimited until `timelimit` runs out.
    pub requests: u64,
    /// Seconds.
    pub timelimit: u64,
    /// Seconds, per request.
    pub timeout: u64,
    pub output: Option<PathBuf>,
    pub regions: Vec<String>,
    /// `name: value` lines.
    pub headers: Vec<String>,
    pub run_docker: bool,
    /// Only ever set from the `[task]` section of the settings file.
    pub runner_path: String,
}

impl ZeroValue for RunConfig {
    fn is_zero(&self) -> bool {
        self.url.is_zero()
            && self.method.is_zero()
            && self.body.is_zero()
            && self.concurrency.is_zero()
            && self.requests.is_zero()
            && self.timelimit.is_zero()
            && self.timeout.is_zero()
            && self.output.is_zero()
            && self.regions.is_zero()
            && self.headers.is_zero()
            && self.run_docker.is_zero()
            && self.runner_path.is_zero()
    }
}

#[derive(Debug)]
pub(crate) enum Resolution {
    Run(RunConfig),
    TemplateWritten(PathBuf),
}

/// Builds the run configuration from the settings file at `settings_path`
/// and the process arguments `args`.
///
/// Settings-file values replace built-in defaults; explicit arguments
/// replace both.
pub(crate) fn aggregate_configuration<I, T>(
    settings_path: &Path,
    args: I,
) -> Result<Resolution, ResolveError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let from_file = settings::read_settings(settings_path);
    let command = defaults::seed_defaults(&from_file, args::Args::command());
    match args::resolve(args, command, settings_path)? {
        Resolution::Run(config) => Ok(Resolution::Run(extended::merge_extended(
            config,
            settings_path,
        ))),
        written => Ok(written),
    }
}
