//! Parses a client subprocess's stdout per the "last line starting with
//! `{` is the result" contract (spec.md §9 design notes).

use serde::de::DeserializeOwned;

/// Scans `output` from the end for the last line whose first non-whitespace
/// character is `{`, and attempts to parse it as JSON. Returns `None` when
/// no such line exists or it fails to parse — callers fall back to an
/// error result rather than panicking.
pub fn parse_last_json_line<T: DeserializeOwned>(output: &str) -> Option<T> {
    output
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with('{'))
        .and_then(|line| serde_json::from_str(line).ok())
}
