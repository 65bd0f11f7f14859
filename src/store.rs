use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Decode a JSON file into `T`
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&contents)
        .map_err(|e| Error::malformed(path.display().to_string(), e.to_string()))
}

/// Decode a JSON file that must hold an object
pub fn read_object(path: &Path) -> Result<serde_json::Map<String, Value>> {
    match read_json::<Value>(path)? {
        Value::Object(map) => Ok(map),
        _ => Err(Error::malformed(
            path.display().to_string(),
            "expected a JSON object",
        )),
    }
}

/// Decode a JSON file that must hold a list
pub fn read_list(path: &Path) -> Result<Vec<Value>> {
    match read_json::<Value>(path)? {
        Value::Array(items) => Ok(items),
        _ => Err(Error::malformed(
            path.display().to_string(),
            "expected a JSON list",
        )),
    }
}

/// Write `value` as pretty-printed JSON, replacing the whole file
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| Error::malformed(path.display().to_string(), e.to_string()))?;
    write_text(path, &text)
}

/// Write text, creating parent directories as needed
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }
    fs::write(path, text).map_err(|e| Error::io(path, e))?;
    ::log::debug!("Wrote {}", path.display());
    Ok(())
}

/// `*.json` files directly inside `dir`, sorted by name.
///
/// The sidecar manifest is not an artifact and is left out.
pub fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let is_manifest = path
            .file_name()
            .is_some_and(|name| name == crate::manifest::MANIFEST_FILE);
        if path.is_file() && is_json && !is_manifest {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Final path component as a string, for naming units in reports
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
