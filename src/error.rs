// ==========================================
// 资源分配引擎 - 统一错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 输入校验 / 引用 / 冲突 / 容量 / 内部
// 红线: 任何错误路径都不留下部分扣减
// ==========================================

use crate::domain::types::{MaterialId, ProductId, Quantity, StatusCode, VariantId};
use std::fmt;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    // ===== 输入校验错误 (加锁前即可判定) =====
    #[error("无效供给: 物料初始供给必须大于 0, 实际 {supply}")]
    InvalidSupply { supply: Quantity },

    #[error("无效数量 ({field}): 必须大于 0")]
    InvalidAmount { field: &'static str },

    // ===== 引用错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: &'static str, id: String },

    #[error("物料不存在: {material_id}")]
    MaterialNotFound { material_id: MaterialId },

    #[error("变体不存在: product={product_id}, variant={variant_id}")]
    VariantNotFound {
        product_id: ProductId,
        variant_id: VariantId,
    },

    // ===== 冲突错误 (注册锁内判定) =====
    #[error("ID 重复: {entity} with id={id}")]
    DuplicateId { entity: &'static str, id: String },

    // ===== 容量错误 (扣减内判定) =====
    #[error("供给不足: material={material_id}, required={required}, available={available}")]
    InsufficientSupply {
        material_id: MaterialId,
        required: Quantity,
        available: Quantity,
    },

    #[error("需求量溢出: material={material_id}, available={available}")]
    RequirementOverflow {
        material_id: MaterialId,
        available: Quantity,
    },

    // ===== 内部错误 =====
    #[error("锁获取失败: {0}")]
    LockError(String),
}

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation, // 零或负的供给/数量
    Reference,  // 未知物料/产品/变体
    Conflict,   // 重复 ID
    Capacity,   // 供给不足, 替代耗尽
    Internal,   // 锁中毒
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "VALIDATION"),
            ErrorKind::Reference => write!(f, "REFERENCE"),
            ErrorKind::Conflict => write!(f, "CONFLICT"),
            ErrorKind::Capacity => write!(f, "CAPACITY"),
            ErrorKind::Internal => write!(f, "INTERNAL"),
        }
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidSupply { .. } | EngineError::InvalidAmount { .. } => {
                ErrorKind::Validation
            }
            EngineError::NotFound { .. }
            | EngineError::MaterialNotFound { .. }
            | EngineError::VariantNotFound { .. } => ErrorKind::Reference,
            EngineError::DuplicateId { .. } => ErrorKind::Conflict,
            EngineError::InsufficientSupply { .. } | EngineError::RequirementOverflow { .. } => {
                ErrorKind::Capacity
            }
            EngineError::LockError(_) => ErrorKind::Internal,
        }
    }

    /// 映射为对外状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            EngineError::InvalidSupply { .. } => StatusCode::InvalidSupply,
            EngineError::InvalidAmount { .. } => StatusCode::InvalidAmount,
            EngineError::NotFound { .. }
            | EngineError::MaterialNotFound { .. }
            | EngineError::VariantNotFound { .. } => StatusCode::NotFound,
            EngineError::DuplicateId { .. } => StatusCode::DuplicateId,
            EngineError::InsufficientSupply { .. } | EngineError::RequirementOverflow { .. } => {
                StatusCode::InsufficientSupply
            }
            EngineError::LockError(_) => StatusCode::Internal,
        }
    }

    pub(crate) fn material_not_registered(material_id: MaterialId) -> Self {
        EngineError::NotFound {
            entity: "material",
            id: material_id.to_string(),
        }
    }

    pub(crate) fn product_not_registered(product_id: ProductId) -> Self {
        EngineError::NotFound {
            entity: "product",
            id: product_id.to_string(),
        }
    }

    pub(crate) fn lock<E: fmt::Display>(what: &str, err: E) -> Self {
        EngineError::LockError(format!("{}: {}", what, err))
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
