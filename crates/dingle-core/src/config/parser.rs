//! JSON config parser with helpful error messages

use std::path::Path;

use serde_json::Value;

use super::values::ConfigValues;
use crate::error::{DingleError, Result};

/// Parse a dingle.json file into raw values.
pub fn parse_dingle_json(path: &Path) -> Result<ConfigValues> {
    let content = std::fs::read_to_string(path).map_err(|source| DingleError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    parse_values(&content).map_err(|message| DingleError::ConfigParse {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse dingle.json content from a string
pub fn parse_dingle_json_str(content: &str) -> Result<ConfigValues> {
    parse_values(content).map_err(|message| DingleError::ConfigParse {
        path: "<inline>".into(),
        message,
    })
}

fn parse_values(content: &str) -> std::result::Result<ConfigValues, String> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| enhance_json_error(&e, content))?;

    match value {
        Value::Object(map) => Ok(ConfigValues::new(map)),
        other => Err(format!(
            "expected a JSON object at the top level, found {}",
            json_kind(&other)
        )),
    }
}

/// Point at the offending line when serde_json knows where it is.
fn enhance_json_error(error: &serde_json::Error, content: &str) -> String {
    let line_num = error.line();
    if line_num == 0 {
        return error.to_string();
    }
    format!(
        "JSON parsing error at line {}, column {}:\n{}\n\nError: {}",
        line_num,
        error.column(),
        get_line_context(content, line_num),
        error
    )
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2).min(lines.len());
    let end = (line_num + 1).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_valid_config() {
        let json = r#"{
            "test1": "this is a test",
            "test2": "this is a test2",
            "test3": ["hooray1", "hooray2"]
        }"#;

        let values = parse_dingle_json_str(json).unwrap();
        assert_eq!(values.get_str("test1").unwrap(), "this is a test");
        assert_eq!(values.get_str("test2").unwrap(), "this is a test2");
        assert_eq!(values.get_str_list("test3").unwrap(), vec!["hooray1", "hooray2"]);
    }

    #[test]
    fn test_parse_invalid_json_points_at_line() {
        let json = "{\n  \"test1\": \"a\",\n  \"test2\" \"b\"\n}";
        let err = parse_dingle_json_str(json).unwrap_err().to_string();
        assert!(err.contains("line 3"), "{err}");
        assert!(err.contains(">>>"), "{err}");
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = parse_dingle_json_str(r#"["a", "b"]"#).unwrap_err().to_string();
        assert!(err.contains("found an array"), "{err}");
    }

    #[test]
    fn test_parse_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "yum_repo_host": "repo" }}"#).unwrap();

        let values = parse_dingle_json(file.path()).unwrap();
        assert_eq!(values.get_str("yum_repo_host").unwrap(), "repo");
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = parse_dingle_json(file.path()).unwrap_err();
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}
