//! `result_output_file` support: dumps a data source's resolved state as JSON

use std::io;
use std::path::{Path, PathBuf};
use tfplug::types::DynamicValue;

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return Path::new(&home).join(rest);
        }
    }
    PathBuf::from(path)
}

/// Writes `state` to `path` as pretty-printed JSON with sorted keys,
/// creating parent directories as needed
pub fn write_to_file(path: &str, state: &DynamicValue) -> io::Result<()> {
    let path = expand_home(path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Going through serde_json::Value sorts map keys
    let value = serde_json::to_value(&state.value).map_err(io::Error::other)?;
    let data = serde_json::to_string_pretty(&value).map_err(io::Error::other)?;
    std::fs::write(&path, data)?;

    tracing::debug!(path = %path.display(), "wrote result output file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfplug::types::AttributePath;

    #[test]
    fn writes_sorted_pretty_json_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/price.json");

        let mut state = DynamicValue::object();
        state.set(&AttributePath::new("price"), 9600.0).unwrap();
        state
            .set(&AttributePath::new("instance_id"), "tdsql-9vqvls95")
            .unwrap();

        write_to_file(path.to_str().unwrap(), &state).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed["instance_id"], "tdsql-9vqvls95");
        assert_eq!(parsed["price"], 9600.0);
        assert!(written.find("instance_id").unwrap() < written.find("price").unwrap());
        assert!(written.contains('\n'));
    }

    #[test]
    fn expands_home_prefix() {
        if let Some(home) = std::env::var_os("HOME") {
            assert_eq!(expand_home("~/a.json"), Path::new(&home).join("a.json"));
        }
        assert_eq!(expand_home("/tmp/a.json"), PathBuf::from("/tmp/a.json"));
    }
}
