// ==========================================
// 资源分配引擎 - 订单领域模型
// ==========================================
// 订单是一次性请求-响应事务, 处理完即丢弃
// 状态机:
//   Requested -> Validated -> {FulfilledPartialStock | FulfilledDepleted}
//             -> Rejected{NotFound | InvalidAmount | InsufficientSupply}
// ==========================================

use crate::domain::types::{MaterialId, ProductId, Quantity, StatusCode, UserId, VariantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==========================================
// OrderRequest - 订单请求
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub product_id: ProductId,
    pub amount: Quantity,
    pub variant_id: VariantId,
    pub user_id: UserId,
    pub allow_substitution: bool,
}

impl OrderRequest {
    /// 使用主变体、允许替代的默认请求
    pub fn new(product_id: ProductId, amount: Quantity) -> Self {
        Self {
            product_id,
            amount,
            variant_id: VariantId::PRIMARY,
            user_id: UserId(0),
            allow_substitution: true,
        }
    }

    pub fn with_variant(mut self, variant_id: VariantId) -> Self {
        self.variant_id = variant_id;
        self
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_substitution(mut self, allow: bool) -> Self {
        self.allow_substitution = allow;
        self
    }
}

// ==========================================
// 订单状态
// ==========================================

/// 履约类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Fulfillment {
    PartialStock, // 成功, 仍有余量
    Depleted,     // 成功, 物料被耗尽
}

impl Fulfillment {
    pub fn status_code(self) -> StatusCode {
        match self {
            Fulfillment::PartialStock => StatusCode::Ok,
            Fulfillment::Depleted => StatusCode::OkDepleted,
        }
    }
}

/// 拒绝原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    NotFound,
    InvalidAmount,
    InsufficientSupply,
    Internal, // 锁失败等
}

/// 订单状态 (仅用于处理过程的日志与事件)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    Requested,
    Validated,
    FulfilledPartialStock,
    FulfilledDepleted,
    Rejected(RejectReason),
}

impl OrderState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderState::Requested | OrderState::Validated)
    }
}

impl From<Fulfillment> for OrderState {
    fn from(value: Fulfillment) -> Self {
        match value {
            Fulfillment::PartialStock => OrderState::FulfilledPartialStock,
            Fulfillment::Depleted => OrderState::FulfilledDepleted,
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderState::Requested => write!(f, "REQUESTED"),
            OrderState::Validated => write!(f, "VALIDATED"),
            OrderState::FulfilledPartialStock => write!(f, "FULFILLED_PARTIAL_STOCK"),
            OrderState::FulfilledDepleted => write!(f, "FULFILLED_DEPLETED"),
            OrderState::Rejected(RejectReason::NotFound) => write!(f, "REJECTED_NOT_FOUND"),
            OrderState::Rejected(RejectReason::InvalidAmount) => write!(f, "REJECTED_INVALID_AMOUNT"),
            OrderState::Rejected(RejectReason::InsufficientSupply) => {
                write!(f, "REJECTED_INSUFFICIENT_SUPPLY")
            }
            OrderState::Rejected(RejectReason::Internal) => write!(f, "REJECTED_INTERNAL"),
        }
    }
}

// ==========================================
// OrderReceipt - 履约回执
// ==========================================
// 回执返回给调用方, 引擎不保存
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: Uuid,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub amount: Quantity,
    pub requested_variant: VariantId,
    pub fulfilled_variant: VariantId,
    pub material_id: MaterialId,
    pub consumed: Quantity,
    pub remaining: Quantity,
    pub fulfillment: Fulfillment,
    pub processed_at: DateTime<Utc>,
}

impl OrderReceipt {
    /// 是否使用了替代变体
    pub fn substituted(&self) -> bool {
        self.fulfilled_variant != self.requested_variant
    }

    pub fn status_code(&self) -> StatusCode {
        self.fulfillment.status_code()
    }

    pub fn state(&self) -> OrderState {
        self.fulfillment.into()
    }
}
