//! Append-only persistence seam for audit entries.

use crate::audit::model::AuditEntry;
use crate::errors::{AuditError, ExError, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Destination for audit entries. Entries are only ever appended.
pub trait AuditSink: Send + Sync {
    /// Store one entry.
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the entry could not be stored.
    fn append(&self, entry: &AuditEntry) -> Result<()>;
}

impl<S: AuditSink + ?Sized> AuditSink for Arc<S> {
    fn append(&self, entry: &AuditEntry) -> Result<()> {
        (**self).append(entry)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| {
        AuditError::SinkAppend {
            message: "sink lock poisoned".to_string(),
        }
        .into()
    })
}

/// Keeps entries in memory (tests, dry runs)
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored entries, oldest first
    pub fn entries(&self) -> Vec<AuditEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemorySink {
    fn append(&self, entry: &AuditEntry) -> Result<()> {
        lock(&self.entries)?.push(entry.clone());
        Ok(())
    }
}

/// Writes one JSON object per line
#[derive(Debug)]
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl JsonLinesSink<BufWriter<File>> {
    /// Open `path` for appending, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Io` if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| ExError::from(AuditError::from(e)).with_path(path.display().to_string()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> AuditSink for JsonLinesSink<W> {
    fn append(&self, entry: &AuditEntry) -> Result<()> {
        let line = serde_json::to_string(entry).map_err(AuditError::from)?;
        let mut writer = lock(&self.writer)?;
        writeln!(writer, "{line}")
            .and_then(|()| writer.flush())
            .map_err(|e| {
                AuditError::SinkAppend {
                    message: e.to_string(),
                }
                .into()
            })
    }
}
