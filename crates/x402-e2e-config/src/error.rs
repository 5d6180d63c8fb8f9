use thiserror::Error;

/// Errors raised while reading a component's `test.config.json`.
///
/// Per the config-loader contract, parse/read failures are never fatal to
/// the overall run — callers log and skip the offending component — but the
/// error is still typed so discovery can report *why* a directory was
/// skipped.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: `kind` field `{found}` does not match directory kind `{expected}`")]
    KindMismatch {
        path: String,
        expected: String,
        found: String,
    },
}
