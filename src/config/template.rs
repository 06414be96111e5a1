use std::fs;
use std::path::Path;

use super::error::ResolveError;

const TEMPLATE: &str = r#"; volley settings file
;
; Values set here replace the built-in defaults. Flags given on the
; command line still win over anything in this file.

[general]
; target url, may be omitted on the command line when set here
url = http://example.com/
method = GET
; request payload
;body = {"hello":"world"}
concurrency = 10
; set to 0 together with a timelimit to keep going until time runs out
requests = 1000
; seconds to spend on the whole run
timelimit = 3600
; seconds to wait for each response
timeout = 15
; write results to this file instead of stdout
;json-output = results.json
; run inside a local container instead of the remote backend
run-docker = false

[task]
; external runner artifact used by the execution backend
;runner = ./bin/volley-runner

[regions]
; each key names one region, the value is ignored
us-east-1 = N.Virginia
us-west-2 = Oregon
eu-west-1 = Ireland
ap-northeast-1 = Tokyo

[headers]
cache-control = no-cache
;auth-token = YOUR-SECRET-AUTH-TOKEN
"#;

/// Writes a sample settings file to `path`, replacing any existing file.
pub(crate) fn emit_template(path: &Path) -> Result<(), ResolveError> {
    fs::write(path, TEMPLATE).map_err(|source| ResolveError::Template {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings;

    #[test]
    fn template_has_every_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volley.ini");
        emit_template(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        for section in ["[general]", "[regions]", "[headers]", "[task]"] {
            assert!(written.contains(section), "missing {}", section);
        }
    }

    #[test]
    fn template_overwrites_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volley.ini");
        fs::write(&path, "garbage that is not ini [").unwrap();
        emit_template(&path).unwrap();

        let config = settings::read_settings(&path);
        assert_eq!(config.url, "http://example.com/");
        assert_eq!(config.requests, 1000);
        assert_eq!(config.regions.len(), 4);
        assert_eq!(config.headers, vec!["cache-control: no-cache"]);
        assert!(!config.run_docker);
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("volley.ini");
        assert!(matches!(
            emit_template(&path),
            Err(ResolveError::Template { .. })
        ));
    }
}
