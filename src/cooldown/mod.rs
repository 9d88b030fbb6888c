//! 冷却闸门：每个冷却窗口内最多允许一次成功转发。

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};

use crate::cache::{CooldownStore, Timestamp};

const MILLIS_PER_MINUTE: i64 = 60 * 1000;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;

/// 时间来源，测试中可替换
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> Timestamp;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Timestamp {
        chrono::Utc::now().timestamp_millis()
    }
}

/// 冷却剩余时间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub millis: i64,
}

impl Remaining {
    /// 整小时数（向下取整）
    pub fn hours(&self) -> i64 {
        self.millis / MILLIS_PER_HOUR
    }

    /// 扣除整小时后的整分钟数（向下取整）
    pub fn minutes(&self) -> i64 {
        (self.millis % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} hours and {} minutes", self.hours(), self.minutes())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    Denied(Remaining),
}

pub struct CooldownGate {
    store: Arc<dyn CooldownStore>,
    window_millis: i64,
    clock: Arc<dyn Clock>,
    // 串行化“检查 - 转发 - 记录”
    lock: Mutex<()>,
}

impl CooldownGate {
    pub fn new(store: Arc<dyn CooldownStore>, window: Duration) -> Self {
        Self::with_clock(store, window, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn CooldownStore>, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            window_millis: i64::try_from(window.as_millis()).unwrap_or(i64::MAX),
            clock,
            lock: Mutex::new(()),
        }
    }

    /// 读取最近一次成功时间；读取失败按“无记录”处理（fail-open），
    /// 第二个值表示读取是否成功
    async fn last_success(&self) -> (Option<Timestamp>, bool) {
        match self.store.get().await {
            Ok(last) => (last, true),
            Err(e) => {
                tracing::warn!("Failed to read cooldown state, allowing request: {}", e);
                (None, false)
            }
        }
    }

    fn decide(&self, last: Option<Timestamp>) -> GateDecision {
        let Some(last) = last else {
            return GateDecision::Allowed;
        };

        let elapsed = self.clock.now_millis().saturating_sub(last);
        if elapsed >= self.window_millis {
            return GateDecision::Allowed;
        }

        // 时钟回拨时 elapsed 为负，剩余时间不超过一个窗口
        let remaining = self.window_millis.saturating_sub(elapsed).min(self.window_millis);
        GateDecision::Denied(Remaining { millis: remaining })
    }

    /// 当前是否允许转发，不修改任何状态
    pub async fn check(&self) -> GateDecision {
        self.decide(self.last_success().await.0)
    }

    /// 无条件把状态写为当前时间；写入失败只记日志
    pub async fn record_success(&self) {
        let now = self.clock.now_millis();
        match self.store.set(now).await {
            Ok(()) => tracing::info!("Recorded successful send at {}", now),
            Err(e) => tracing::error!("Failed to persist cooldown state: {}", e),
        }
    }

    /// 进入闸门：持锁检查，允许时返回 [`GatePass`]，锁一直保持到通行证被消费或丢弃
    pub async fn enter(&self) -> Result<GatePass<'_>, Remaining> {
        let guard = self.lock.lock().await;
        let (observed, verified) = self.last_success().await;

        match self.decide(observed) {
            GateDecision::Allowed => Ok(GatePass {
                gate: self,
                observed,
                verified,
                _guard: guard,
            }),
            GateDecision::Denied(remaining) => Err(remaining),
        }
    }
}

/// 一次已放行的转发。转发成功后调用 [`GatePass::record_success`]；
/// 转发失败时直接丢弃，状态保持不变。
pub struct GatePass<'a> {
    gate: &'a CooldownGate,
    observed: Option<Timestamp>,
    verified: bool,
    _guard: MutexGuard<'a, ()>,
}

impl GatePass<'_> {
    pub async fn record_success(self) {
        let now = self.gate.clock.now_millis();
        let now = self.observed.map_or(now, |last| now.max(last));

        // 读取失败时无从比较，退化为直接写入
        let written = if self.verified {
            self.gate.store.compare_and_set(self.observed, now).await
        } else {
            self.gate.store.set(now).await.map(|()| true)
        };

        match written {
            Ok(true) => tracing::info!("Recorded successful send at {}", now),
            Ok(false) => tracing::warn!(
                "Cooldown state changed by another writer since {:?}, keeping the newer value",
                self.observed
            ),
            Err(e) => tracing::error!("Failed to persist cooldown state: {}", e),
        }
    }
}
