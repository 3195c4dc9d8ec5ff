// ==========================================
// 资源分配引擎 - 替代候选规划
// ==========================================
// 职责: 基于不可变产品定义, 生成扣减尝试顺序
// 规则:
// 1) 首个候选 = 请求的变体
// 2) 允许替代时, 其余变体按 ID 升序追加 (含 0 号主变体)
// 3) 每个候选独立计算 required, 溢出者不可满足
// 红线: 纯函数, 不触碰库存
// ==========================================

use crate::domain::product::{Product, Variant};
use crate::domain::types::{MaterialId, Quantity, VariantId};
use crate::error::{EngineError, EngineResult};

/// 一次扣减尝试
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub variant_id: VariantId,
    pub material_id: MaterialId,
    /// None 表示 material_amount * amount 溢出
    pub required: Option<Quantity>,
}

impl Candidate {
    fn from_variant(variant: Variant, amount: Quantity) -> Self {
        Self {
            variant_id: variant.variant_id,
            material_id: variant.material_id,
            required: variant.required_for(amount),
        }
    }
}

/// 生成候选序列
///
/// # 参数
/// - `product`: 产品定义快照
/// - `requested`: 请求的变体
/// - `amount`: 订单数量
/// - `allow_substitution`: 是否追加替代候选
///
/// # 返回
/// - `Ok(Vec<Candidate>)`: 至少包含请求变体本身
/// - `Err(VariantNotFound)`: 请求变体未注册
pub fn plan_candidates(
    product: &Product,
    requested: VariantId,
    amount: Quantity,
    allow_substitution: bool,
) -> EngineResult<Vec<Candidate>> {
    let first = product
        .variant(requested)
        .ok_or(EngineError::VariantNotFound {
            product_id: product.product_id,
            variant_id: requested,
        })?;

    let mut candidates = vec![Candidate::from_variant(first, amount)];

    if allow_substitution {
        candidates.extend(
            product
                .all_variants()
                .into_iter()
                .filter(|v| v.variant_id != requested)
                .map(|v| Candidate::from_variant(v, amount)),
        );
    }

    Ok(candidates)
}
