// ==========================================
// 资源分配引擎 - 领域类型定义
// ==========================================
// 职责: 标识符、数量、优先级、状态码
// 红线: 数量为整数库存, "恰好为零" 必须可精确判定
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 库存数量 (整数单位)
pub type Quantity = u64;

/// 订单优先级 (数值越大越优先)
pub type Priority = u32;

// ==========================================
// 标识符 (Identifiers)
// ==========================================

/// 物料 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(pub u64);

/// 产品 (配方) ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

/// 变体 ID
///
/// `VariantId::PRIMARY` (0) 表示使用产品的主物料, 不做替代
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(pub u32);

impl VariantId {
    pub const PRIMARY: VariantId = VariantId(0);

    pub fn is_primary(&self) -> bool {
        self.0 == 0
    }
}

/// 下单用户 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U{}", self.0)
    }
}

// ==========================================
// 状态码 (Status Code)
// ==========================================
// 对外调用面返回的小整数状态码
// 数值一经发布不可调整
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum StatusCode {
    Ok = 0,                  // 成功, 仍有余量
    OkDepleted = 1,          // 成功, 物料已耗尽
    InvalidSupply = 2,       // 初始供给为 0
    InvalidAmount = 3,       // 订单数量或配方用量为 0
    NotFound = 4,            // 物料/产品/变体不存在
    DuplicateId = 5,         // ID 已注册
    InsufficientSupply = 6,  // 供给不足且无可用替代
    Internal = 255,          // 锁中毒
}

impl StatusCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// 是否为成功状态 (含耗尽告警)
    pub fn is_success(self) -> bool {
        matches!(self, StatusCode::Ok | StatusCode::OkDepleted)
    }

    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0 => Some(StatusCode::Ok),
            1 => Some(StatusCode::OkDepleted),
            2 => Some(StatusCode::InvalidSupply),
            3 => Some(StatusCode::InvalidAmount),
            4 => Some(StatusCode::NotFound),
            5 => Some(StatusCode::DuplicateId),
            6 => Some(StatusCode::InsufficientSupply),
            255 => Some(StatusCode::Internal),
            _ => None,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Ok => write!(f, "OK"),
            StatusCode::OkDepleted => write!(f, "OK_DEPLETED"),
            StatusCode::InvalidSupply => write!(f, "INVALID_SUPPLY"),
            StatusCode::InvalidAmount => write!(f, "INVALID_AMOUNT"),
            StatusCode::NotFound => write!(f, "NOT_FOUND"),
            StatusCode::DuplicateId => write!(f, "DUPLICATE_ID"),
            StatusCode::InsufficientSupply => write!(f, "INSUFFICIENT_SUPPLY"),
            StatusCode::Internal => write!(f, "INTERNAL"),
        }
    }
}

impl From<StatusCode> for u8 {
    fn from(code: StatusCode) -> Self {
        code.as_u8()
    }
}
