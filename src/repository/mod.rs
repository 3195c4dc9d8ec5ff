// ==========================================
// 资源分配引擎 - 仓储层 (内存)
// ==========================================
// 职责: 物料与产品的权威内存状态
// 红线: 不持久化, 不对外暴露内部引用
// ==========================================

pub mod material_registry;
pub mod product_catalog;

// 重导出
pub use material_registry::{MaterialEntry, MaterialRegistry};
pub use product_catalog::ProductCatalog;
