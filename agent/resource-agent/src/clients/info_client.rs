use super::error::{ClientError, ClientResult};
use fixture_model::{Configuration, PlainFile, Record};
use log::trace;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// `InfoClient` stores the records that describe a cluster fixture so that a later invocation (or
/// a teardown after a failure) can pick up where an earlier one stopped. For example, the
/// resources prepared for a cluster are stored before the cluster is created, so that they can be
/// destroyed even if creation fails.
///
/// Structured records are typed through the [`Configuration`] trait. Plain files hold a single
/// value each and exist for consumers that read flat files.
///
/// This is provided as a trait so that mock implementations can be injected for testing purposes.
/// In practice you will use the [`FileInfoClient`], or the [`MemoryInfoClient`] for a fixture that
/// should leave nothing behind.
#[async_trait::async_trait]
pub trait InfoClient: Sized + Send + Sync {
    /// Get a stored record. `None` if it has never been stored.
    async fn get_info<Info>(&self, record: Record) -> ClientResult<Option<Info>>
    where
        Info: Configuration;

    /// Send (overwrite) a record.
    async fn send_info<Info>(&self, record: Record, info: Info) -> ClientResult<()>
    where
        Info: Configuration;

    /// Send (overwrite) a plain file.
    async fn send_plain(&self, file: PlainFile, content: &str) -> ClientResult<()>;
}

/// An [`InfoClient`] that writes each record and plain file into a directory. Writes go to a
/// temporary sibling first and are renamed into place, so a reader never sees half a record.
#[derive(Debug, Clone)]
pub struct FileInfoClient {
    dir: PathBuf,
    artifact_dir: PathBuf,
}

impl FileInfoClient {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        let dir = dir.into();
        Self {
            artifact_dir: dir.clone(),
            dir,
        }
    }

    /// Write the install log to `artifact_dir` instead of the shared directory.
    pub fn with_artifact_dir<P: Into<PathBuf>>(mut self, artifact_dir: P) -> Self {
        self.artifact_dir = artifact_dir.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn plain_path(&self, file: PlainFile) -> PathBuf {
        match file {
            PlainFile::InstallLog => self.artifact_dir.join(file.file_name()),
            _ => self.dir.join(file.file_name()),
        }
    }

    async fn write(&self, path: &Path, content: &str) -> ClientResult<()> {
        let storage = |e: std::io::Error| ClientError::StorageFailed(Some(Box::new(e)));
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(storage)?;
        }
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, content).await.map_err(storage)?;
        tokio::fs::rename(&tmp, path).await.map_err(storage)?;
        trace!("Wrote '{}'", path.display());
        Ok(())
    }
}

#[async_trait::async_trait]
impl InfoClient for FileInfoClient {
    async fn get_info<Info>(&self, record: Record) -> ClientResult<Option<Info>>
    where
        Info: Configuration,
    {
        let path = self.dir.join(record.file_name());
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(Info::from_json_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClientError::StorageFailed(Some(Box::new(e)))),
        }
    }

    async fn send_info<Info>(&self, record: Record, info: Info) -> ClientResult<()>
    where
        Info: Configuration,
    {
        let content = info.to_json_string()?;
        self.write(&self.dir.join(record.file_name()), &content)
            .await
    }

    async fn send_plain(&self, file: PlainFile, content: &str) -> ClientResult<()> {
        self.write(&self.plain_path(file), content).await
    }
}

/// An [`InfoClient`] that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryInfoClient {
    records: Mutex<BTreeMap<Record, serde_json::Value>>,
    plain: Mutex<BTreeMap<PlainFile, String>>,
}

impl MemoryInfoClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// The content of a plain file, if it has been sent.
    pub async fn plain(&self, file: PlainFile) -> Option<String> {
        self.plain.lock().await.get(&file).cloned()
    }
}

#[async_trait::async_trait]
impl InfoClient for MemoryInfoClient {
    async fn get_info<Info>(&self, record: Record) -> ClientResult<Option<Info>>
    where
        Info: Configuration,
    {
        match self.records.lock().await.get(&record) {
            Some(value) => Ok(Some(Info::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    async fn send_info<Info>(&self, record: Record, info: Info) -> ClientResult<()>
    where
        Info: Configuration,
    {
        let value = info.into_value()?;
        self.records.lock().await.insert(record, value);
        Ok(())
    }

    async fn send_plain(&self, file: PlainFile, content: &str) -> ClientResult<()> {
        self.plain.lock().await.insert(file, content.to_string());
        Ok(())
    }
}
