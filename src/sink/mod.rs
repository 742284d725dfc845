//! Output sinks for crawled records.
//!
//! Sinks are append-only: records are pushed once and never updated.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::models::OutputRecord;

/// Errors writing records.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for emitted records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn push(&self, record: &OutputRecord) -> Result<(), SinkError>;

    /// Flush buffered output. Called once when the crawl ends.
    async fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

type Writer = Box<dyn AsyncWrite + Send + Unpin>;

/// Newline-delimited JSON, one record per line, flushed after each record.
pub struct JsonLinesSink {
    writer: Mutex<Writer>,
}

impl JsonLinesSink {
    /// Append to `path`, creating it if needed.
    pub async fn create(path: &Path) -> Result<Self, SinkError> {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|source| SinkError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_writer(Box::new(file)))
    }

    pub fn stdout() -> Self {
        Self::from_writer(Box::new(tokio::io::stdout()))
    }

    /// `-` writes to stdout; anything else is a file path.
    pub async fn open(target: &str) -> Result<Self, SinkError> {
        if target == "-" {
            Ok(Self::stdout())
        } else {
            Self::create(Path::new(target)).await
        }
    }

    pub fn from_writer(writer: Writer) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

#[async_trait]
impl RecordSink for JsonLinesSink {
    async fn push(&self, record: &OutputRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), SinkError> {
        self.writer.lock().await.flush().await?;
        Ok(())
    }
}

/// Keeps every record in memory, in push order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<OutputRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<OutputRecord> {
        self.records.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn push(&self, record: &OutputRecord) -> Result<(), SinkError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobRecordBuilder, LinkRecord};

    #[tokio::test]
    async fn test_json_lines_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.jsonl");

        let sink = JsonLinesSink::create(&path).await.unwrap();
        let job = JobRecordBuilder::new()
            .title(Some("Rust Engineer".to_string()))
            .build("https://weworkremotely.com/remote-jobs/a");
        sink.push(&OutputRecord::Job(job)).await.unwrap();
        sink.flush().await.unwrap();
        drop(sink);

        let sink = JsonLinesSink::open(path.to_str().unwrap()).await.unwrap();
        sink.push(&OutputRecord::Link(LinkRecord::new(
            "https://weworkremotely.com/remote-jobs/b",
        )))
        .await
        .unwrap();
        drop(sink);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["title"], "Rust Engineer");
        assert_eq!(first["source"], "weworkremotely.com");
        assert!(first["salary_min"].is_null());

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(
            second,
            serde_json::json!({
                "url": "https://weworkremotely.com/remote-jobs/b",
                "source": "weworkremotely.com"
            })
        );
    }

    #[tokio::test]
    async fn test_open_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("jobs.jsonl");
        let result = JsonLinesSink::create(&path).await;
        assert!(matches!(result, Err(SinkError::Open { .. })));
    }

    #[tokio::test]
    async fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        assert!(sink.is_empty().await);
        for slug in ["a", "b", "c"] {
            let url = format!("https://weworkremotely.com/remote-jobs/{slug}");
            sink.push(&OutputRecord::Link(LinkRecord::new(url))).await.unwrap();
        }
        let urls: Vec<String> = sink
            .records()
            .await
            .iter()
            .map(|r| r.url().to_string())
            .collect();
        assert_eq!(sink.len().await, 3);
        assert_eq!(urls[0], "https://weworkremotely.com/remote-jobs/a");
        assert_eq!(urls[2], "https://weworkremotely.com/remote-jobs/c");
    }
}
