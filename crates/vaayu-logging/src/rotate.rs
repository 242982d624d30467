//! Size-based log file rotation.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// An append-mode writer that rolls the file over once it would exceed
/// `max_bytes`, keeping up to `backup_count` numbered backups
/// (`vaayu.log.1` is the most recent). A `max_bytes` of zero disables
/// rotation; a `backup_count` of zero truncates in place.
#[derive(Debug)]
pub(crate) struct RotatingFileWriter {
    path: PathBuf,
    max_bytes: u64,
    backup_count: u32,
    file: File,
    written: u64,
}

impl RotatingFileWriter {
    pub(crate) fn open(path: &Path, max_bytes: u64, backup_count: u32) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            max_bytes,
            backup_count,
            file,
            written,
        })
    }

    pub(crate) fn write_line(&mut self, line: &str) -> io::Result<()> {
        let incoming = line.len() as u64 + 1;
        // A single oversized record on an empty file is written as-is
        // instead of rotating forever.
        if self.max_bytes > 0 && self.written > 0 && self.written + incoming > self.max_bytes {
            self.rollover()?;
        }
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.written += incoming;
        Ok(())
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn rollover(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.backup_count > 0 {
            for index in (1..self.backup_count).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            if self.path.exists() {
                fs::rename(&self.path, self.backup_path(1))?;
            }
        }
        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }

    fn backup_path(&self, index: u32) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }
}
