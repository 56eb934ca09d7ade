// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use hoja_app::{ActionLog, NullActionLog};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends one interaction record per line to a file on disk.
#[derive(Debug)]
pub struct FileActionLog {
    path: PathBuf,
    file: File,
}

impl FileActionLog {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create action log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open action log {}", path.display()))?;
        Ok(Self {
            path: path.to_owned(),
            file,
        })
    }
}

impl ActionLog for FileActionLog {
    fn record(&mut self, action: &str) -> Result<()> {
        writeln!(self.file, "{action}")
            .with_context(|| format!("append to action log {}", self.path.display()))?;
        self.file
            .flush()
            .with_context(|| format!("flush action log {}", self.path.display()))?;
        Ok(())
    }
}

/// The log the UI loop runs against: a file when configured, otherwise a
/// discard sink.
#[derive(Debug)]
pub enum CliActionLog {
    File(FileActionLog),
    Null(NullActionLog),
}

impl CliActionLog {
    pub fn from_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Ok(Self::File(FileActionLog::open(path)?)),
            None => Ok(Self::Null(NullActionLog)),
        }
    }
}

impl ActionLog for CliActionLog {
    fn record(&mut self, action: &str) -> Result<()> {
        match self {
            Self::File(log) => log.record(action),
            Self::Null(log) => log.record(action),
        }
    }
}
