// ==========================================
// 资源分配引擎 - 领域模型层
// ==========================================
// 职责: 定义实体、值类型、状态码
// 红线: 不含并发控制, 不含引擎逻辑
// ==========================================

pub mod material;
pub mod order;
pub mod product;
pub mod types;

// 重导出核心类型
pub use material::{DebitOutcome, MaterialStock, SCARCITY_SATURATED};
pub use order::{Fulfillment, OrderReceipt, OrderRequest, OrderState, RejectReason};
pub use product::{NewProduct, Product, ProductView, Variant};
pub use types::{MaterialId, Priority, ProductId, Quantity, StatusCode, UserId, VariantId};
