use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::{Command, FromArgMatches, Parser};
use tracing::info;

use super::error::ResolveError;
use super::template;
use super::{Resolution, RunConfig, SETTINGS_FILE};

/// Argument ids, as referenced when defaults are seeded.
pub(crate) mod ids {
    pub(crate) const URL: &str = "url";
    pub(crate) const REQUESTS: &str = "requests";
    pub(crate) const CONCURRENCY: &str = "concurrency";
    pub(crate) const TIMELIMIT: &str = "timelimit";
    pub(crate) const TIMEOUT: &str = "timeout";
    pub(crate) const HEADER: &str = "header";
    pub(crate) const METHOD: &str = "method";
    pub(crate) const BODY: &str = "body";
    pub(crate) const JSON_OUTPUT: &str = "json_output";
    pub(crate) const REGION: &str = "region";
    pub(crate) const RUN_DOCKER: &str = "run_docker";
}

/// HTTP load testing from the command line
#[derive(Parser, Debug)]
#[command(name = "volley", author, version, about, long_about = None)]
pub(crate) struct Args {
    /// [http[s]://]hostname[:port]/path, optional if defined in volley.ini
    pub url: Option<String>,
    /// Number of requests to perform. Set to 0 in combination with a timelimit for unlimited requests during that time
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub requests: u64,
    /// Number of requests to make at a time
    #[arg(short, long, default_value_t = 10)]
    pub concurrency: usize,
    /// Seconds to spend on the whole run at most
    #[arg(short, long, default_value_t = 3600)]
    pub timelimit: u64,
    /// Seconds to wait for each response at most
    #[arg(short = 's', long, default_value_t = 15)]
    pub timeout: u64,
    /// Add an arbitrary header line, eg. 'Accept-Encoding: gzip' (repeatable)
    #[arg(short = 'H', long)]
    pub header: Vec<String>,
    /// HTTP method
    #[arg(short, long, default_value = "GET")]
    pub method: String,
    /// HTTP request body
    #[arg(long)]
    pub body: Option<String>,
    /// Optional path to a file for JSON result storage
    #[arg(long)]
    pub json_output: Option<PathBuf>,
    /// Regions to run in. Repeat the flag to run in more than one region (repeatable)
    #[arg(long)]
    pub region: Vec<String>,
    /// Execute in a local container instead of the remote backend
    #[arg(long)]
    pub run_docker: bool,
    #[arg(long, help = format!("Create a sample settings file \"{}\" in the current directory", SETTINGS_FILE))]
    pub create_ini_template: bool,
}

/// Parses `args` against `command`, whose defaults may already carry
/// settings-file values.
///
/// `args` starts with the program name, like [`std::env::args_os`].
pub(crate) fn resolve<I, T>(
    args: I,
    mut command: Command,
    template_path: &Path,
) -> Result<Resolution, ResolveError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command.try_get_matches_from_mut(args)?;
    let args = Args::from_arg_matches(&matches)?;

    if args.create_ini_template {
        template::emit_template(template_path)?;
        info!(path = %template_path.display(), "settings template written");
        return Ok(Resolution::TemplateWritten(template_path.to_path_buf()));
    }

    let url = args.url.unwrap_or_default();
    if url.is_empty() {
        return Err(ResolveError::MissingUrl {
            usage: command.render_help().to_string(),
        });
    }

    Ok(Resolution::Run(RunConfig {
        url,
        method: args.method,
        body: args.body.unwrap_or_default(),
        concurrency: args.concurrency,
        requests: args.requests,
        timelimit: args.timelimit,
        timeout: args.timeout,
        output: args.json_output.filter(|p| !p.as_os_str().is_empty()),
        regions: split_regions(args.region),
        headers: args.header,
        run_docker: args.run_docker,
        runner_path: String::new(),
    }))
}

/// Expands comma-joined region values in place, so `--region a,b` and
/// `--region a --region b` give the same list.
pub(crate) fn split_regions(regions: Vec<String>) -> Vec<String> {
    regions
        .iter()
        .flat_map(|r| r.split(','))
        .map(str::to_string)
        .collect()
}
