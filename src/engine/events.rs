// ==========================================
// 资源分配引擎 - 引擎事件发布
// ==========================================
// 职责: 定义引擎事件发布 trait, 供宿主程序订阅
// 说明: 发布失败只记日志, 不影响操作结果
// ==========================================

use crate::domain::types::{MaterialId, ProductId, Quantity, StatusCode, UserId, VariantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// 事件类型
// ==========================================

/// 引擎事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEventType {
    /// 物料注册
    MaterialRegistered,
    /// 产品注册
    ProductRegistered,
    /// 替代变体注册
    VariantRegistered,
    /// 订单履约
    OrderFulfilled,
    /// 物料耗尽
    MaterialDepleted,
    /// 订单被拒
    OrderRejected,
}

impl EngineEventType {
    /// 转换为字符串标识
    pub fn as_str(&self) -> &str {
        match self {
            EngineEventType::MaterialRegistered => "MaterialRegistered",
            EngineEventType::ProductRegistered => "ProductRegistered",
            EngineEventType::VariantRegistered => "VariantRegistered",
            EngineEventType::OrderFulfilled => "OrderFulfilled",
            EngineEventType::MaterialDepleted => "MaterialDepleted",
            EngineEventType::OrderRejected => "OrderRejected",
        }
    }
}

/// 引擎事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineEvent {
    /// 事件类型
    pub event_type: EngineEventType,
    /// 相关物料
    pub material_id: Option<MaterialId>,
    /// 相关产品
    pub product_id: Option<ProductId>,
    /// 相关变体
    pub variant_id: Option<VariantId>,
    /// 下单用户
    pub user_id: Option<UserId>,
    /// 数量 (注册供给 / 扣减量 / 缺口)
    pub quantity: Option<Quantity>,
    /// 结果状态码
    pub status: StatusCode,
    pub occurred_at: DateTime<Utc>,
}

impl EngineEvent {
    /// 创建空事件, 由调用方补充字段
    pub fn new(event_type: EngineEventType, status: StatusCode) -> Self {
        Self {
            event_type,
            material_id: None,
            product_id: None,
            variant_id: None,
            user_id: None,
            quantity: None,
            status,
            occurred_at: Utc::now(),
        }
    }

    pub fn material(mut self, id: MaterialId) -> Self {
        self.material_id = Some(id);
        self
    }

    pub fn product(mut self, id: ProductId) -> Self {
        self.product_id = Some(id);
        self
    }

    pub fn variant(mut self, id: VariantId) -> Self {
        self.variant_id = Some(id);
        self
    }

    pub fn user(mut self, id: UserId) -> Self {
        self.user_id = Some(id);
        self
    }

    pub fn quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 引擎事件发布者 Trait
///
/// 在订单处理线程上同步调用, 实现方应尽快返回
pub trait EngineEventPublisher: Send + Sync {
    /// 发布事件
    fn publish(&self, event: EngineEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl EngineEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: EngineEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::trace!(
            "NoOpEventPublisher: 跳过事件发布 - event_type={}",
            event.event_type.as_str()
        );
        Ok(())
    }
}

/// 可选的事件发布者包装
///
/// 简化 Option<Arc<dyn EngineEventPublisher>> 的使用
#[derive(Clone)]
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn EngineEventPublisher>>,
}

impl OptionalEventPublisher {
    /// 创建带发布者的实例
    pub fn with_publisher(publisher: Arc<dyn EngineEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    /// 创建空实例（不发布事件）
    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 发布事件（如果有发布者）; 失败只记录告警
    pub fn publish(&self, event: EngineEvent) {
        let Some(publisher) = &self.inner else {
            return;
        };
        let event_type = event.event_type;
        if let Err(e) = publisher.publish(event) {
            tracing::warn!(
                "事件发布失败(已忽略) - event_type={}, error={}",
                event_type.as_str(),
                e
            );
        }
    }

    /// 检查是否配置了发布者
    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalEventPublisher {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for OptionalEventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionalEventPublisher")
            .field("configured", &self.is_configured())
            .finish()
    }
}
