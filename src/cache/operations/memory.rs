use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::cache::{CooldownStore, StorageError, Timestamp};

/// 进程内存储，重启后状态丢失
#[derive(Debug, Default)]
pub struct MemoryStore {
    last_sent: Mutex<Option<Timestamp>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CooldownStore for MemoryStore {
    async fn get(&self) -> Result<Option<Timestamp>, StorageError> {
        Ok(*self.last_sent.lock().await)
    }

    async fn set(&self, value: Timestamp) -> Result<(), StorageError> {
        *self.last_sent.lock().await = Some(value);
        Ok(())
    }

    async fn compare_and_set(
        &self,
        expected: Option<Timestamp>,
        value: Timestamp,
    ) -> Result<bool, StorageError> {
        let mut last_sent = self.last_sent.lock().await;
        if *last_sent != expected {
            return Ok(false);
        }
        *last_sent = Some(value);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_empty() {
        let store = MemoryStore::new();
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get() {
        let store = MemoryStore::new();
        store.set(1_700_000_000_000).await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some(1_700_000_000_000));
    }

    #[tokio::test]
    async fn compare_and_set_checks_expected_value() {
        let store = MemoryStore::new();
        assert!(store.compare_and_set(None, 10).await.unwrap());
        assert!(!store.compare_and_set(None, 20).await.unwrap());
        assert_eq!(store.get().await.unwrap(), Some(10));
        assert!(store.compare_and_set(Some(10), 30).await.unwrap());
        assert_eq!(store.get().await.unwrap(), Some(30));
    }
}
