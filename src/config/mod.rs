// ==========================================
// 资源分配引擎 - 配置层
// ==========================================
// 职责: 引擎配置, 支持文件与环境变量覆写
// ==========================================

pub mod engine_config;

// 重导出
pub use engine_config::{config_keys, ConfigError, EngineConfig};
