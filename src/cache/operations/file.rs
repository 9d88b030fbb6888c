use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use crate::cache::{CooldownStore, StorageError, Timestamp};

/// 单文件存储：文件内容为十进制毫秒时间戳，无分隔符
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    tmp_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// 打开存储文件，必要时创建父目录，并记录启动时读到的状态
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut tmp_name = OsString::from(path.as_os_str());
        tmp_name.push(".tmp");

        let store = Self {
            path,
            tmp_path: PathBuf::from(tmp_name),
            write_lock: Mutex::new(()),
        };

        match store.read().await {
            Ok(Some(ts)) => tracing::info!("Loaded last sent timestamp {} from {:?}", ts, store.path),
            Ok(None) => tracing::info!("No cooldown state at {:?}", store.path),
            Err(e) => tracing::warn!("Unreadable cooldown state at {:?}: {}", store.path, e),
        }

        Ok(store)
    }

    async fn read(&self) -> Result<Option<Timestamp>, StorageError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        content
            .parse::<Timestamp>()
            .map(Some)
            .map_err(|_| StorageError::Corrupt(content.to_string()))
    }

    // 先写临时文件再重命名，避免留下写了一半的文件
    async fn write(&self, value: Timestamp) -> Result<(), StorageError> {
        fs::write(&self.tmp_path, value.to_string()).await?;
        fs::rename(&self.tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CooldownStore for FileStore {
    async fn get(&self) -> Result<Option<Timestamp>, StorageError> {
        self.read().await
    }

    async fn set(&self, value: Timestamp) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.write(value).await
    }

    async fn compare_and_set(
        &self,
        expected: Option<Timestamp>,
        value: Timestamp,
    ) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().await;
        if self.read().await? != expected {
            return Ok(false);
        }
        self.write(value).await?;
        Ok(true)
    }
}
