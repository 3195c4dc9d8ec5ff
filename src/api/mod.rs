// ==========================================
// 资源分配引擎 - API 层
// ==========================================
// 职责: 对外门面, 状态码接口 + 类型化接口
// 红线: API 层不直接修改库存账, 统一经订单处理器
// ==========================================

pub mod engine_api;

pub use engine_api::Engine;
