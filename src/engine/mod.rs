// ==========================================
// 资源分配引擎 - 引擎层
// ==========================================
// 职责: 准入仲裁、替代规划、订单履约
// 红线: 订单处理器是注册后唯一修改供给的组件
// ==========================================

pub mod admission;
pub mod events;
pub mod order_processor;
pub mod substitution;

// 重导出核心引擎
pub use admission::{AdmissionGate, AdmissionPermit, ArbitrationPolicy};
pub use events::{
    EngineEvent, EngineEventPublisher, EngineEventType, NoOpEventPublisher,
    OptionalEventPublisher,
};
pub use order_processor::OrderProcessor;
pub use substitution::{plan_candidates, Candidate};
