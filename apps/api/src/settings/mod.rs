//! Flat-file key store backing the runtime-editable settings.
//!
//! One `KEY=value` line per entry. The whole file is read on every `get` and
//! rewritten on every `set` — writes go to a temp file in the same directory
//! and are renamed over the target, so readers never observe a torn file.
//! Last-writer-wins between concurrent setters is accepted and documented.

pub mod handlers;

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// The only key currently managed through the HTTP surface.
pub const DEEPSEEK_API_KEY: &str = "DEEPSEEK_API_KEY";

#[derive(Debug, Clone)]
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the value for `key`, or `None` if the file or key is absent.
    /// A missing file is not an error.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v))
    }

    /// Sets `key` to `value`, replacing any previous value, and rewrites the
    /// whole file atomically.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.load()?;
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }
        self.store(&entries)
    }

    /// Parses `KEY=value` lines; comments and blanks are skipped, as are
    /// lines without a `=`. Order of first appearance is preserved.
    fn load(&self) -> Result<Vec<(String, String)>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };

        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                line.split_once('=')
                    .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            })
            .collect())
    }

    fn store(&self, entries: &[(String, String)]) -> Result<()> {
        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut tmp = match dir {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new_in("."),
        }
        .context("Failed to create temp file for config write")?;

        for (key, value) in entries {
            writeln!(tmp, "{key}={value}").context("Failed to write config entry")?;
        }

        tmp.persist(&self.path)
            .with_context(|| format!("Failed to persist {}", self.path.display()))?;
        Ok(())
    }
}
