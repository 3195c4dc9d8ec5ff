// ==========================================
// 资源分配引擎 - 产品(配方)领域模型
// ==========================================
// 产品 = 一个主物料 + 单位用量 + 可选替代变体
// work_complexity 仅透传, 不参与库存计算
// ==========================================

use crate::domain::types::{MaterialId, Priority, ProductId, Quantity, VariantId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// Variant - 替代变体
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub variant_id: VariantId,
    pub material_id: MaterialId,
    pub material_amount: Quantity, // 每单位产品消耗量
}

impl Variant {
    /// 计算下单 `amount` 个单位所需物料量
    ///
    /// 溢出时返回 None (该路径不可能被满足)
    pub fn required_for(&self, amount: Quantity) -> Option<Quantity> {
        self.material_amount.checked_mul(amount)
    }
}

// ==========================================
// Product - 产品定义
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub primary_material_id: MaterialId,
    pub material_amount: Quantity,
    pub priority: Priority,
    pub work_complexity: f64,
    /// 已注册的替代变体 (不含 0 号主变体), 按 ID 升序
    pub variants: BTreeMap<VariantId, Variant>,
}

impl Product {
    /// 主变体 (0 号)
    pub fn primary_variant(&self) -> Variant {
        Variant {
            variant_id: VariantId::PRIMARY,
            material_id: self.primary_material_id,
            material_amount: self.material_amount,
        }
    }

    /// 解析变体
    ///
    /// # 返回
    /// - `Some(Variant)`: 0 号解析为主物料, 非 0 解析为已注册变体
    /// - `None`: 变体未注册
    pub fn variant(&self, variant_id: VariantId) -> Option<Variant> {
        if variant_id.is_primary() {
            return Some(self.primary_variant());
        }
        self.variants.get(&variant_id).copied()
    }

    /// 全部变体 (含主变体), 按 ID 升序
    pub fn all_variants(&self) -> Vec<Variant> {
        let mut all = Vec::with_capacity(self.variants.len() + 1);
        all.push(self.primary_variant());
        all.extend(self.variants.values().copied());
        all
    }
}

// ==========================================
// NewProduct - 产品注册请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    /// None 表示由引擎分配 ID
    pub product_id: Option<ProductId>,
    pub primary_material_id: MaterialId,
    pub material_amount: Quantity,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub work_complexity: f64,
}

impl NewProduct {
    pub fn new(primary_material_id: MaterialId, material_amount: Quantity) -> Self {
        Self {
            product_id: None,
            primary_material_id,
            material_amount,
            priority: 0,
            work_complexity: 0.0,
        }
    }

    pub fn with_id(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_work_complexity(mut self, work_complexity: f64) -> Self {
        self.work_complexity = work_complexity;
        self
    }
}

// ==========================================
// ProductView - 产品只读视图
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductView {
    pub product_id: ProductId,
    pub primary_material_id: MaterialId,
    pub material_amount: Quantity,
    pub priority: Priority,
    pub work_complexity: f64,
    pub variants: Vec<Variant>, // 不含主变体
    pub fulfilled_units: Quantity,
}

impl ProductView {
    pub fn from_product(product: &Product, fulfilled_units: Quantity) -> Self {
        Self {
            product_id: product.product_id,
            primary_material_id: product.primary_material_id,
            material_amount: product.material_amount,
            priority: product.priority,
            work_complexity: product.work_complexity,
            variants: product.variants.values().copied().collect(),
            fulfilled_units,
        }
    }
}
