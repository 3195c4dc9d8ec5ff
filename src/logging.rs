// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别与输出格式
// ==========================================

use crate::perf::is_true;
use tracing_subscriber::{fmt, EnvFilter};

/// 输出格式开关 (1/true/yes/on 时输出 JSON 行)
pub const LOG_JSON_ENV: &str = "RESOURCE_ENGINE_LOG_JSON";

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=resource_engine=trace,perf=debug
/// - RESOURCE_ENGINE_LOG_JSON: 为真时输出 JSON 行
///
/// # 示例
/// ```no_run
/// use resource_engine::logging;
/// logging::init();
/// ```
pub fn init() {
    // 从环境变量读取日志级别，默认为 info
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var(LOG_JSON_ENV)
        .map(|v| is_true(&v))
        .unwrap_or(false);

    // 重复初始化时保持首个订阅者
    if json {
        let _ = fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(false)
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .try_init();
    }
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
