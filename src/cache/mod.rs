// 冷却状态存储模块
// 三种后端（内存、文件、Redis）统一在 CooldownStore 之后

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::CooldownBackend;

pub mod keys;
pub mod operations;

pub use operations::{FileStore, MemoryStore, RedisStore};

/// 自 Unix 纪元以来的毫秒数
pub type Timestamp = i64;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("corrupt cooldown state: {0:?}")]
    Corrupt(String),
}

/// 保存单个时间戳的存储后端，不包含任何业务逻辑
#[async_trait]
pub trait CooldownStore: Send + Sync {
    async fn get(&self) -> Result<Option<Timestamp>, StorageError>;

    async fn set(&self, value: Timestamp) -> Result<(), StorageError>;

    /// 仅当当前值等于 `expected` 时写入 `value`，返回是否写入。
    ///
    /// 默认实现先读后写，不是原子的；调用方需自行保证互斥。
    async fn compare_and_set(
        &self,
        expected: Option<Timestamp>,
        value: Timestamp,
    ) -> Result<bool, StorageError> {
        if self.get().await? != expected {
            return Ok(false);
        }
        self.set(value).await?;
        Ok(true)
    }
}

/// 按配置创建存储后端
pub async fn open_store(backend: &CooldownBackend) -> Result<Arc<dyn CooldownStore>, StorageError> {
    let store: Arc<dyn CooldownStore> = match backend {
        CooldownBackend::Memory => Arc::new(MemoryStore::new()),
        CooldownBackend::File(path) => Arc::new(FileStore::open(path).await?),
        CooldownBackend::Redis(url) => Arc::new(RedisStore::new(url)?),
    };
    Ok(store)
}
