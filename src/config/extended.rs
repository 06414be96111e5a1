use std::path::Path;

use tracing::debug;

use super::settings::{self, RUNNER_KEY, TASK};
use super::RunConfig;

/// Fills in settings that only the settings file can provide.
///
/// The file is read again on its own; a missing file or key leaves the
/// configuration as it was. Read errors were already reported by
/// [`settings::read_settings`] and are only logged here.
pub(crate) fn merge_extended(mut config: RunConfig, path: &Path) -> RunConfig {
    let ini = match settings::load(path) {
        Ok(ini) => ini,
        Err(err) => {
            debug!("no extended settings from {}: {}", path.display(), err);
            return config;
        }
    };
    if let Some(runner) = ini.section(Some(TASK)).and_then(|task| task.get(RUNNER_KEY)) {
        config.runner_path = runner.to_string();
    }
    config
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn copies_runner_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volley.ini");
        fs::write(&path, "[task]\nrunner = ./bin/runner --fast\n").unwrap();

        let config = merge_extended(RunConfig::default(), &path);
        assert_eq!(config.runner_path, "./bin/runner --fast");
    }

    #[test]
    fn windows_runner_path_is_not_unescaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volley.ini");
        fs::write(&path, "[task]\nrunner = C:\\tools\\runner.exe\n").unwrap();

        let config = merge_extended(RunConfig::default(), &path);
        assert_eq!(config.runner_path, "C:\\tools\\runner.exe");
    }

    #[test]
    fn missing_key_or_file_leaves_runner_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volley.ini");

        let config = merge_extended(RunConfig::default(), &path);
        assert!(config.runner_path.is_empty());

        fs::write(&path, "[task]\nother = 1\n").unwrap();
        let config = merge_extended(RunConfig::default(), &path);
        assert!(config.runner_path.is_empty());
    }

    #[test]
    fn keeps_resolved_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volley.ini");
        fs::write(&path, "[general]\nurl = http://file/\n[task]\nrunner = r\n").unwrap();

        let resolved = RunConfig {
            url: "http://cli/".into(),
            ..RunConfig::default()
        };
        let config = merge_extended(resolved, &path);
        assert_eq!(config.url, "http://cli/");
        assert_eq!(config.runner_path, "r");
    }
}
