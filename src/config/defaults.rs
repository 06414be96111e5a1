use std::path::PathBuf;

use clap::Command;
use tracing::debug;

use super::args::ids;
use super::zero::ZeroValue;
use super::RunConfig;

/// Regions used when neither the settings file nor the command line names any.
pub(crate) const DEFAULT_REGIONS: [&str; 4] =
    ["us-west-2", "us-east-1", "eu-west-1", "ap-northeast-1"];

/// A configuration value that can stand in as a command-line default.
pub(crate) trait FlagDefault: ZeroValue {
    /// String form(s) handed to the argument parser as fallback values.
    fn render(&self) -> Vec<String>;
}

macro_rules! render_with_to_string {
    ($($t:ty),* $(,)?) => {
        $(
            impl FlagDefault for $t {
                fn render(&self) -> Vec<String> {
                    vec![self.to_string()]
                }
            }
        )*
    };
}

render_with_to_string!(bool, u64, usize, String);

impl FlagDefault for PathBuf {
    fn render(&self) -> Vec<String> {
        vec![self.to_string_lossy().into_owned()]
    }
}

impl<T: FlagDefault> FlagDefault for Option<T> {
    fn render(&self) -> Vec<String> {
        self.as_ref().map(FlagDefault::render).unwrap_or_default()
    }
}

impl<T: FlagDefault> FlagDefault for Vec<T> {
    fn render(&self) -> Vec<String> {
        self.iter().flat_map(FlagDefault::render).collect()
    }
}

fn apply_default_if_not_zero<T: FlagDefault>(command: Command, id: &str, value: &T) -> Command {
    if value.is_zero() {
        return command;
    }
    let values = value.render();
    debug!(arg = id, ?values, "default taken from settings file");
    command.mut_arg(id, |arg| arg.default_values(values))
}

/// Replaces the built-in defaults of `command` with every non-empty value
/// read from the settings file.
///
/// Must run before the command parses any arguments: only fallbacks are
/// changed, so explicit flags still win.
pub(crate) fn seed_defaults(from_file: &RunConfig, command: Command) -> Command {
    let command = apply_default_if_not_zero(command, ids::BODY, &from_file.body);
    let command = apply_default_if_not_zero(command, ids::CONCURRENCY, &from_file.concurrency);
    let command = apply_default_if_not_zero(command, ids::HEADER, &from_file.headers);
    let command = apply_default_if_not_zero(command, ids::METHOD, &from_file.method);
    let command = apply_default_if_not_zero(command, ids::JSON_OUTPUT, &from_file.output);
    let command = apply_default_if_not_zero(command, ids::REGION, &from_file.regions);
    let command = apply_default_if_not_zero(command, ids::REQUESTS, &from_file.requests);
    let command = apply_default_if_not_zero(command, ids::TIMELIMIT, &from_file.timelimit);
    let mut command = apply_default_if_not_zero(command, ids::TIMEOUT, &from_file.timeout);

    if !from_file.url.is_zero() {
        command = command.mut_arg(ids::URL, |arg| arg.default_value(from_file.url.clone()));
    }
    if from_file.regions.is_zero() {
        command = command.mut_arg(ids::REGION, |arg| arg.default_values(DEFAULT_REGIONS));
    }
    if from_file.run_docker {
        command = command.mut_arg(ids::RUN_DOCKER, |arg| arg.default_value("true"));
    }
    command
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use crate::config::args::Args;

    fn default_of(command: &Command, id: &str) -> Vec<String> {
        command
            .get_arguments()
            .find(|arg| arg.get_id() == id)
            .map(|arg| {
                arg.get_default_values()
                    .iter()
                    .map(|v| v.to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn empty_file_keeps_compiled_defaults() {
        let command = seed_defaults(&RunConfig::default(), Args::command());

        assert_eq!(default_of(&command, ids::REQUESTS), vec!["1000"]);
        assert_eq!(default_of(&command, ids::METHOD), vec!["GET"]);
        assert!(default_of(&command, ids::URL).is_empty());
        assert!(default_of(&command, ids::HEADER).is_empty());
        assert_eq!(default_of(&command, ids::REGION), DEFAULT_REGIONS);
    }

    #[test]
    fn file_values_become_defaults() {
        let from_file = RunConfig {
            url: "http://file.example.com/".into(),
            concurrency: 3,
            headers: vec!["Accept-Encoding: gzip".into()],
            regions: vec!["eu-central-1".into()],
            output: Some(PathBuf::from("out.json")),
            run_docker: true,
            ..RunConfig::default()
        };
        let command = seed_defaults(&from_file, Args::command());

        assert_eq!(default_of(&command, ids::URL), vec!["http://file.example.com/"]);
        assert_eq!(default_of(&command, ids::CONCURRENCY), vec!["3"]);
        assert_eq!(default_of(&command, ids::HEADER), vec!["Accept-Encoding: gzip"]);
        assert_eq!(default_of(&command, ids::REGION), vec!["eu-central-1"]);
        assert_eq!(default_of(&command, ids::JSON_OUTPUT), vec!["out.json"]);
        assert_eq!(default_of(&command, ids::RUN_DOCKER), vec!["true"]);
        // untouched by the file
        assert_eq!(default_of(&command, ids::TIMEOUT), vec!["15"]);
    }

    #[test]
    fn list_defaults_render_every_element() {
        let regions = vec!["a".to_string(), "b".to_string()];
        assert_eq!(regions.render(), vec!["a", "b"]);
        assert_eq!(Some(PathBuf::from("x")).render(), vec!["x"]);
        assert!(None::<PathBuf>.render().is_empty());
    }
}
