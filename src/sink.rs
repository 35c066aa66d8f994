use std::borrow::Cow;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};
use crate::sample::{CSV_HEADER, Sample};

/// Append-only CSV store for one device's samples.
///
/// The header row is written once at creation; every appended row is flushed
/// and synced to the backing medium before the call returns, so a
/// reported-success row survives a crash immediately after.
pub struct CsvSink {
    path: PathBuf,
    file: File,
}

impl CsvSink {
    /// Create (or truncate) the backing file and write the header row.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).await.map_err(|e| Error::Sink {
            path: path.clone(),
            source: e,
        })?;

        let mut sink = Self { path, file };
        sink.write_row(&CSV_HEADER).await?;
        Ok(sink)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one sample as a CSV row and make it durable.
    pub async fn append(&mut self, sample: &Sample) -> Result<()> {
        self.write_row(&sample.csv_fields()).await
    }

    async fn write_row<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<()> {
        let mut row = fields
            .iter()
            .map(|f| escape_field(f.as_ref()))
            .collect::<Vec<_>>()
            .join(",");
        row.push('\n');

        self.file
            .write_all(row.as_bytes())
            .await
            .map_err(|e| self.sink_err(e))?;
        self.file.flush().await.map_err(|e| self.sink_err(e))?;
        self.file.sync_data().await.map_err(|e| self.sink_err(e))?;
        Ok(())
    }

    fn sink_err(&self, source: std::io::Error) -> Error {
        Error::Sink {
            path: self.path.clone(),
            source,
        }
    }
}

/// Quote a field if it contains a separator, quote, or line break.
fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
