/// 缓存键模块

/// 最近一次成功转发的时间戳（毫秒）
pub const LAST_SENT_KEY: &str = "send_report:last_sent_at";
