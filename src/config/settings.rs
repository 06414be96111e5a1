use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::{Ini, ParseOption, Properties};
use tracing::debug;

use super::error::SettingsError;
use super::RunConfig;

pub(crate) const GENERAL: &str = "general";
pub(crate) const REGIONS: &str = "regions";
pub(crate) const HEADERS: &str = "headers";
pub(crate) const TASK: &str = "task";

pub(crate) const URL_KEY: &str = "url";
pub(crate) const METHOD_KEY: &str = "method";
pub(crate) const BODY_KEY: &str = "body";
pub(crate) const CONCURRENCY_KEY: &str = "concurrency";
pub(crate) const REQUESTS_KEY: &str = "requests";
pub(crate) const TIMELIMIT_KEY: &str = "timelimit";
pub(crate) const TIMEOUT_KEY: &str = "timeout";
pub(crate) const JSON_OUTPUT_KEY: &str = "json-output";
pub(crate) const RUN_DOCKER_KEY: &str = "run-docker";
pub(crate) const RUNNER_KEY: &str = "runner";

/// Values are taken as written: backslashes are not escapes.
fn parse_option() -> ParseOption {
    ParseOption {
        enabled_escape: false,
        ..ParseOption::default()
    }
}

pub(crate) fn load(path: &Path) -> Result<Ini, SettingsError> {
    let text = fs::read_to_string(path)?;
    Ok(Ini::load_from_str_opt(&with_bare_keys(&text), parse_option())?)
}

/// Gives keys written without `=`, like the region names of `[regions]`,
/// the value `true`, so they parse as ordinary keys.
pub(crate) fn with_bare_keys(text: &str) -> String {
    text.lines()
        .map(|line| {
            let trimmed = line.trim();
            let is_bare_key = !trimmed.is_empty()
                && !trimmed.starts_with(['[', ';', '#'])
                && !trimmed.contains(['=', ':']);
            if is_bare_key {
                format!("{} = true", line)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reads the settings file into a run configuration.
///
/// A missing file is not an error and yields an empty configuration. A
/// file that cannot be parsed is reported on stderr and also yields an
/// empty configuration.
pub(crate) fn read_settings(path: &Path) -> RunConfig {
    match load(path) {
        Ok(ini) => from_ini(&ini),
        Err(SettingsError::NotFound) => {
            debug!("no settings file at {}", path.display());
            RunConfig::default()
        }
        Err(err) => {
            eprintln!("error reading {}: {}", path.display(), err);
            RunConfig::default()
        }
    }
}

pub(crate) fn from_ini(ini: &Ini) -> RunConfig {
    let mut config = RunConfig::default();

    if let Some(general) = ini.section(Some(GENERAL)) {
        config.url = string_key(general, URL_KEY);
        config.method = string_key(general, METHOD_KEY);
        config.body = string_key(general, BODY_KEY);
        config.concurrency = parsed_key(general, CONCURRENCY_KEY);
        config.requests = parsed_key(general, REQUESTS_KEY);
        config.timelimit = parsed_key(general, TIMELIMIT_KEY);
        config.timeout = parsed_key(general, TIMEOUT_KEY);
        config.output = Some(string_key(general, JSON_OUTPUT_KEY))
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        config.run_docker = general
            .get(RUN_DOCKER_KEY)
            .and_then(parse_bool)
            .unwrap_or_default();
    }

    if let Some(regions) = ini.section(Some(REGIONS)) {
        config.regions = regions.iter().map(|(key, _)| key.to_string()).collect();
    }

    if let Some(headers) = ini.section(Some(HEADERS)) {
        config.headers = fold_headers(headers.iter());
    }

    config
}

fn string_key(section: &Properties, key: &str) -> String {
    section.get(key).map(str::trim).unwrap_or_default().to_string()
}

// Unparseable numbers count as absent.
fn parsed_key<T: FromStr + Default>(section: &Properties, key: &str) -> T {
    section
        .get(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_default()
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "n" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Turns header name/value pairs into `name: value` lines.
pub(crate) fn fold_headers<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> Vec<String> {
    pairs
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect()
}
