//! Append-only progress files. Every call opens, writes and flushes, so a run
//! that is killed part way still leaves a readable record behind.

use crate::error::Result;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    ensure_parent(path)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)?;
    file.flush()?;
    Ok(())
}

/// Append one serialized record as a JSON Lines entry
pub fn append_json_line<T: Serialize, P: AsRef<Path>>(path: P, record: &T) -> Result<()> {
    append_line(path.as_ref(), &serde_json::to_string(record)?)
}

/// Append a CSV row, writing `header` first if the file is new or empty
pub fn append_csv_row<P: AsRef<Path>>(path: P, header: &str, row: &str) -> Result<()> {
    let path = path.as_ref();
    let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    if needs_header {
        append_line(path, header)?;
    }
    append_line(path, row)
}

/// Replace `path` with pretty JSON via a sibling temp file and rename
pub fn write_json_atomic<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, serde_json::to_string_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_csv_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.csv");

        append_csv_row(&path, "a,b", "1,2").unwrap();
        append_csv_row(&path, "a,b", "3,4").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n1,2\n3,4\n");
    }

    #[test]
    fn test_json_lines_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.jsonl");

        append_json_line(&path, &json!({"generation": 0})).unwrap();
        append_json_line(&path, &json!({"generation": 1})).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["generation"], 1);
    }

    #[test]
    fn test_atomic_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best.json");
        write_json_atomic(&path, &json!({"size": 16})).unwrap();
        write_json_atomic(&path, &json!({"size": 32})).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["size"], 32);
    }
}
