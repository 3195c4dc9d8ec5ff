// ==========================================
// 资源分配引擎 - 引擎配置
// ==========================================
// 职责: 配置加载、环境变量覆写、校验
// 来源优先级: 环境变量 > JSON 文件 > 默认值
// ==========================================

use crate::engine::admission::ArbitrationPolicy;
use crate::perf::is_true;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

// ==========================================
// 环境变量键
// ==========================================
pub mod config_keys {
    pub const ALLOW_SUBSTITUTION: &str = "RESOURCE_ENGINE_ALLOW_SUBSTITUTION";
    pub const PRIORITY_ARBITRATION: &str = "RESOURCE_ENGINE_PRIORITY_ARBITRATION";
    pub const FIRST_AUTO_ID: &str = "RESOURCE_ENGINE_FIRST_AUTO_ID";
    pub const SCARCITY_WARN: &str = "RESOURCE_ENGINE_SCARCITY_WARN";
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置解析失败: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("配置值格式错误 (key: {key}, value: {value})")]
    ValueError { key: String, value: String },

    #[error("配置校验失败: {0}")]
    ValidationError(String),
}

// ==========================================
// EngineConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 全局替代开关, 与订单自身的 allow_substitution 取与
    pub allow_substitution: bool,

    /// 是否按优先级仲裁; false 时仅按到达顺序
    pub priority_arbitration: bool,

    /// 自动分配 ID 的起点
    pub first_auto_id: u64,

    /// 稀缺度告警阈值 (百分比)
    pub scarcity_warn_threshold: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allow_substitution: true,
            priority_arbitration: true,
            first_auto_id: 0,
            scarcity_warn_threshold: 50,
        }
    }
}

impl EngineConfig {
    /// 从 JSON 字符串解析 (缺省字段取默认值)
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&raw)
    }

    /// 加载配置: 文件 (可选) + 环境变量覆写
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// 应用覆写 (lookup 通常为环境变量读取)
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(config_keys::ALLOW_SUBSTITUTION) {
            self.allow_substitution = is_true(&v);
        }
        if let Some(v) = lookup(config_keys::PRIORITY_ARBITRATION) {
            self.priority_arbitration = is_true(&v);
        }
        if let Some(v) = lookup(config_keys::FIRST_AUTO_ID) {
            self.first_auto_id = parse_u64(config_keys::FIRST_AUTO_ID, &v)?;
        }
        if let Some(v) = lookup(config_keys::SCARCITY_WARN) {
            self.scarcity_warn_threshold = parse_u64(config_keys::SCARCITY_WARN, &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scarcity_warn_threshold == 0 {
            return Err(ConfigError::ValidationError(
                "scarcity_warn_threshold 必须大于 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn arbitration_policy(&self) -> ArbitrationPolicy {
        if self.priority_arbitration {
            ArbitrationPolicy::Priority
        } else {
            ArbitrationPolicy::Arrival
        }
    }
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::ValueError {
            key: key.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.allow_substitution);
        assert!(config.priority_arbitration);
        assert_eq!(config.first_auto_id, 0);
        assert_eq!(config.scarcity_warn_threshold, 50);
        assert_eq!(config.arbitration_policy(), ArbitrationPolicy::Priority);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json_str(r#"{"priority_arbitration": false}"#).unwrap();
        assert!(!config.priority_arbitration);
        assert!(config.allow_substitution);
        assert_eq!(config.arbitration_policy(), ArbitrationPolicy::Arrival);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            EngineConfig::from_json_str("{not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"scarcity_warn_threshold": 0}"#),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (config_keys::ALLOW_SUBSTITUTION, "off"),
            (config_keys::FIRST_AUTO_ID, "1000"),
        ]
        .into_iter()
        .collect();

        let config = EngineConfig::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert!(!config.allow_substitution);
        assert_eq!(config.first_auto_id, 1000);
        assert!(config.priority_arbitration);
    }

    #[test]
    fn test_bad_override_value() {
        let err = EngineConfig::default()
            .with_overrides(|k| (k == config_keys::SCARCITY_WARN).then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValueError { .. }));
    }
}
