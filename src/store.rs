//! Flat-file task store.
//!
//! Tasks live one per line in a UTF-8 text file. The store supports appending
//! a single task, reading everything back in insertion order, and truncating
//! the file. Each operation holds an advisory `fs2` lock on the file for its
//! duration so concurrent writers never interleave a partial line.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task text is empty")]
    EmptyTask,

    #[error("task text must be a single line")]
    MultiLineTask,

    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("store worker failed: {0}")]
    Join(String),
}

/// Task list persisted as newline-separated text.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one task line.
    ///
    /// A single trailing newline is tolerated and stripped; the remaining text
    /// must be non-empty and must not contain line breaks.
    pub async fn append(&self, text: &str) -> Result<(), StoreError> {
        let line = text.strip_suffix('\n').unwrap_or(text);
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            return Err(StoreError::EmptyTask);
        }
        if line.contains(['\n', '\r']) {
            return Err(StoreError::MultiLineTask);
        }

        let path = self.path.clone();
        let record = format!("{}\n", line);
        run_blocking(move || append_blocking(&path, &record)).await?;
        tracing::info!(path = %self.path.display(), "Appended task");
        Ok(())
    }

    /// Read the whole store with trailing newlines stripped.
    ///
    /// A missing file reads as an empty string.
    pub async fn read_all(&self) -> Result<String, StoreError> {
        let path = self.path.clone();
        let content = run_blocking(move || read_blocking(&path)).await?;
        Ok(content.trim_end_matches(['\n', '\r']).to_string())
    }

    /// Stored tasks in insertion order.
    pub async fn list(&self) -> Result<Vec<String>, StoreError> {
        let content = self.read_all().await?;
        Ok(content.lines().map(str::to_string).collect())
    }

    /// Truncate the store to zero bytes. Safe to call repeatedly.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let path = self.path.clone();
        run_blocking(move || clear_blocking(&path)).await?;
        tracing::info!(path = %self.path.display(), "Cleared task list");
        Ok(())
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
}

fn io_err<'a>(
    op: &'static str,
    path: &'a Path,
) -> impl FnOnce(std::io::Error) -> StoreError + 'a {
    move |source| StoreError::Io {
        op,
        path: path.display().to_string(),
        source,
    }
}

fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err("create directory for", path))?;
    }
    Ok(())
}

fn append_blocking(path: &Path, record: &str) -> Result<(), StoreError> {
    ensure_parent(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err("open", path))?;
    file.lock_exclusive().map_err(io_err("lock", path))?;
    let result = file
        .write_all(record.as_bytes())
        .and_then(|_| file.flush())
        .map_err(io_err("write", path));
    let _ = FileExt::unlock(&file);
    result
}

fn read_blocking(path: &Path) -> Result<String, StoreError> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(String::new()),
        Err(e) => return Err(io_err("open", path)(e)),
    };
    file.lock_shared().map_err(io_err("lock", path))?;
    let mut content = String::new();
    let result = file
        .read_to_string(&mut content)
        .map_err(io_err("read", path));
    let _ = FileExt::unlock(&file);
    result.map(|_| content)
}

fn clear_blocking(path: &Path) -> Result<(), StoreError> {
    ensure_parent(path)?;
    // Truncate under the lock rather than at open time.
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(io_err("open", path))?;
    file.lock_exclusive().map_err(io_err("lock", path))?;
    let result = file.set_len(0).map_err(io_err("truncate", path));
    let _ = FileExt::unlock(&file);
    result
}
