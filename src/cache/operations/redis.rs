use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient, Script, aio::ConnectionManager};
use tokio::sync::OnceCell;

use crate::cache::{CooldownStore, StorageError, Timestamp, keys::LAST_SENT_KEY};

/// 仅当当前值与期望值一致时写入；期望值为空串表示键不存在。
/// 按数值比较，与 get 的解析方式一致
const COMPARE_AND_SET: &str = r#"
local current = redis.call('GET', KEYS[1])
local matches
if ARGV[1] == '' then
    matches = not current
else
    matches = current ~= false and tonumber(current) == tonumber(ARGV[1])
end
if matches then
    redis.call('SET', KEYS[1], ARGV[2])
    return 1
end
return 0
"#;

/// Redis 存储，整个进程生命周期共用一条连接
pub struct RedisStore {
    client: RedisClient,
    key: String,
    conn: OnceCell<ConnectionManager>,
    cas: Script,
}

impl RedisStore {
    /// 只校验地址，不在这里建立连接，连接失败不会阻止启动
    pub fn new(redis_url: &str) -> Result<Self, StorageError> {
        Ok(Self::with_key(RedisClient::open(redis_url)?, LAST_SENT_KEY))
    }

    pub fn with_key(client: RedisClient, key: impl Into<String>) -> Self {
        Self {
            client,
            key: key.into(),
            conn: OnceCell::new(),
            cas: Script::new(COMPARE_AND_SET),
        }
    }

    async fn connection(&self) -> Result<ConnectionManager, StorageError> {
        let conn = self
            .conn
            .get_or_try_init(|| ConnectionManager::new(self.client.clone()))
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl CooldownStore for RedisStore {
    async fn get(&self) -> Result<Option<Timestamp>, StorageError> {
        let mut conn = self.connection().await?;
        let result: Option<String> = conn.get(&self.key).await?;

        match result {
            Some(raw) => raw
                .trim()
                .parse::<Timestamp>()
                .map(Some)
                .map_err(|_| StorageError::Corrupt(raw)),
            None => Ok(None),
        }
    }

    async fn set(&self, value: Timestamp) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        let _: () = conn.set(&self.key, value).await?;
        Ok(())
    }

    async fn compare_and_set(
        &self,
        expected: Option<Timestamp>,
        value: Timestamp,
    ) -> Result<bool, StorageError> {
        let mut conn = self.connection().await?;
        let expected = expected.map(|ts| ts.to_string()).unwrap_or_default();
        let swapped: i64 = self
            .cas
            .key(&self.key)
            .arg(expected)
            .arg(value)
            .invoke_async(&mut conn)
            .await?;
        Ok(swapped == 1)
    }
}
