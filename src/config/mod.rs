use std::env;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

/// 默认冷却窗口：12 小时
const DEFAULT_COOLDOWN_WINDOW_SECS: u64 = 12 * 3600;
const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_COOLDOWN_FILE: &str = "last_sent.txt";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// 冷却时间戳的存储后端
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CooldownBackend {
    /// 仅保存在进程内存中，重启即丢失
    Memory,
    /// 单个文本文件
    File(PathBuf),
    /// Redis 中的单个键
    Redis(String),
}

impl CooldownBackend {
    /// 用于日志，不包含地址等敏感信息
    pub fn name(&self) -> &'static str {
        match self {
            CooldownBackend::Memory => "memory",
            CooldownBackend::File(_) => "file",
            CooldownBackend::Redis(_) => "redis",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub webhook_url: Url,
    pub server_host: String,
    pub server_port: u16,
    pub cooldown_window_secs: u64,
    pub cooldown_backend: CooldownBackend,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// 从任意变量来源构建配置，缺失必填项时直接失败
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let raw_webhook = var("WEBHOOK_URL").ok_or(ConfigError::Missing("WEBHOOK_URL"))?;
        let webhook_url = Url::parse(raw_webhook.trim()).map_err(|_| ConfigError::Invalid {
            var: "WEBHOOK_URL",
            value: raw_webhook.clone(),
        })?;

        let cooldown_window_secs = match var("COOLDOWN_WINDOW_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid {
                    var: "COOLDOWN_WINDOW_SECS",
                    value: raw,
                })?,
            None => DEFAULT_COOLDOWN_WINDOW_SECS,
        };

        let backend_name = var("COOLDOWN_BACKEND").unwrap_or_else(|| "memory".into());
        let cooldown_backend = match backend_name.trim().to_ascii_lowercase().as_str() {
            "memory" => CooldownBackend::Memory,
            "file" => CooldownBackend::File(PathBuf::from(
                var("COOLDOWN_FILE").unwrap_or_else(|| DEFAULT_COOLDOWN_FILE.into()),
            )),
            // Redis 后端没有地址时拒绝启动
            "redis" => CooldownBackend::Redis(
                var("REDIS_URL").ok_or(ConfigError::Missing("REDIS_URL"))?,
            ),
            _ => {
                return Err(ConfigError::Invalid {
                    var: "COOLDOWN_BACKEND",
                    value: backend_name,
                });
            }
        };

        Ok(Config {
            webhook_url,
            server_host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: var("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            cooldown_window_secs,
            cooldown_backend,
        })
    }

    pub fn cooldown_window(&self) -> Duration {
        Duration::from_secs(self.cooldown_window_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_webhook_is_set() {
        let config = load(&[("WEBHOOK_URL", "https://hooks.example.com/abc")]).unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.cooldown_window(), Duration::from_secs(12 * 3600));
        assert_eq!(config.cooldown_backend, CooldownBackend::Memory);
    }

    #[test]
    fn missing_webhook_fails_fast() {
        let err = load(&[("PORT", "8080")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("WEBHOOK_URL")));
    }

    #[test]
    fn blank_webhook_counts_as_missing() {
        let err = load(&[("WEBHOOK_URL", "   ")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("WEBHOOK_URL")));
    }

    #[test]
    fn relative_webhook_is_rejected() {
        let err = load(&[("WEBHOOK_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "WEBHOOK_URL", .. }));
    }

    #[test]
    fn redis_backend_requires_address() {
        let err = load(&[
            ("WEBHOOK_URL", "https://hooks.example.com/abc"),
            ("COOLDOWN_BACKEND", "redis"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("REDIS_URL")));

        let config = load(&[
            ("WEBHOOK_URL", "https://hooks.example.com/abc"),
            ("COOLDOWN_BACKEND", "Redis"),
            ("REDIS_URL", "redis://127.0.0.1/"),
        ])
        .unwrap();
        assert_eq!(
            config.cooldown_backend,
            CooldownBackend::Redis("redis://127.0.0.1/".into())
        );
    }

    #[test]
    fn file_backend_uses_default_path() {
        let config = load(&[
            ("WEBHOOK_URL", "https://hooks.example.com/abc"),
            ("COOLDOWN_BACKEND", "file"),
        ])
        .unwrap();
        assert_eq!(
            config.cooldown_backend,
            CooldownBackend::File(PathBuf::from("last_sent.txt"))
        );
    }

    #[test]
    fn unknown_backend_and_bad_window_are_rejected() {
        let err = load(&[
            ("WEBHOOK_URL", "https://hooks.example.com/abc"),
            ("COOLDOWN_BACKEND", "etcd"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "COOLDOWN_BACKEND", .. }));

        let err = load(&[
            ("WEBHOOK_URL", "https://hooks.example.com/abc"),
            ("COOLDOWN_WINDOW_SECS", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "COOLDOWN_WINDOW_SECS", .. }));
    }

    #[test]
    fn unparsable_port_falls_back_to_default() {
        let config = load(&[
            ("WEBHOOK_URL", "https://hooks.example.com/abc"),
            ("PORT", "eighty"),
        ])
        .unwrap();
        assert_eq!(config.server_port, 3000);
    }
}
