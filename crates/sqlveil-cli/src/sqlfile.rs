//! Reading SQL statements from files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Read a SQL file into a single statement line: `--` comment lines are
/// dropped, the remaining lines are joined with spaces, and the ends are
/// trimmed.
pub fn read_sql_file(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let joined = raw
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join(" ");
    Ok(joined.trim().to_string())
}
