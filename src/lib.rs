// ==========================================
// 资源分配引擎 - 核心库
// ==========================================
// 定位: 物料库存与订单履约的内存权威状态
// 并发: 多线程共享同一 Engine, 每物料独立闸门
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 错误类型
pub mod error;

// 数据仓储层 - 物料注册表 / 产品目录
pub mod repository;

// 引擎层 - 准入仲裁 / 替代 / 履约
pub mod engine;

// API 层 - 引擎门面
pub mod api;

// 配置层
pub mod config;

// 导入层 - CSV 种子数据
pub mod importer;

// 日志系统
pub mod logging;

// 性能埋点
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    MaterialId, Priority, ProductId, Quantity, StatusCode, UserId, VariantId,
};

// 领域实体
pub use domain::{
    Fulfillment, MaterialStock, NewProduct, OrderReceipt, OrderRequest, OrderState, ProductView,
    Variant,
};

// 错误
pub use error::{EngineError, EngineResult, ErrorKind};

// 引擎
pub use engine::{
    ArbitrationPolicy, EngineEvent, EngineEventPublisher, EngineEventType, NoOpEventPublisher,
};

// API
pub use api::Engine;

// 配置
pub use config::EngineConfig;

/// 创建空引擎 (默认配置)
pub fn init() -> Engine {
    Engine::init()
}

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "资源分配引擎";
