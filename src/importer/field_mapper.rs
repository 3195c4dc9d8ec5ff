// ==========================================
// 资源分配引擎 - 字段映射器
// ==========================================
// 职责: 原始行 -> 类型化种子行 (物料 / 产品 / 变体 / 订单)
// 红线: 只做类型转换, 业务校验交给引擎
// ==========================================

use crate::domain::order::OrderRequest;
use crate::domain::product::NewProduct;
use crate::domain::types::{MaterialId, Priority, ProductId, Quantity, UserId, VariantId};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRecord;
use std::str::FromStr;

/// 物料种子行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialRow {
    pub material_id: Option<MaterialId>, // 空 = 自动分配
    pub supply: Quantity,
}

/// 变体种子行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantRow {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub material_id: MaterialId,
    pub material_amount: Quantity,
}

pub struct FieldMapper;

impl FieldMapper {
    /// `id,supply`
    pub fn map_material(&self, row: &RawRecord) -> ImportResult<MaterialRow> {
        Ok(MaterialRow {
            material_id: self.parse_optional::<u64>(row, "id")?.map(MaterialId),
            supply: self.parse_required(row, "supply")?,
        })
    }

    /// `id,material_id,material_amount,priority,work_complexity`
    ///
    /// priority 缺省 0, work_complexity 缺省 0.0
    pub fn map_product(&self, row: &RawRecord) -> ImportResult<NewProduct> {
        Ok(NewProduct {
            product_id: self.parse_optional::<u64>(row, "id")?.map(ProductId),
            primary_material_id: MaterialId(self.parse_required(row, "material_id")?),
            material_amount: self.parse_required(row, "material_amount")?,
            priority: self
                .parse_optional::<Priority>(row, "priority")?
                .unwrap_or(0),
            work_complexity: self
                .parse_optional::<f64>(row, "work_complexity")?
                .unwrap_or(0.0),
        })
    }

    /// `product_id,variant_id,material_id,material_amount`
    pub fn map_variant(&self, row: &RawRecord) -> ImportResult<VariantRow> {
        Ok(VariantRow {
            product_id: ProductId(self.parse_required(row, "product_id")?),
            variant_id: VariantId(self.parse_required(row, "variant_id")?),
            material_id: MaterialId(self.parse_required(row, "material_id")?),
            material_amount: self.parse_required(row, "material_amount")?,
        })
    }

    /// `product_id,amount,variant_id,user_id,allow_substitution`
    ///
    /// variant_id 缺省 0, user_id 缺省 0, allow_substitution 缺省 true
    pub fn map_order(&self, row: &RawRecord) -> ImportResult<OrderRequest> {
        let product_id = ProductId(self.parse_required(row, "product_id")?);
        let amount = self.parse_required(row, "amount")?;
        let variant_id = self.parse_optional::<u32>(row, "variant_id")?.unwrap_or(0);
        let user_id = self.parse_optional::<u64>(row, "user_id")?.unwrap_or(0);
        let allow_substitution = match row.get("allow_substitution") {
            None => true,
            Some(raw) => parse_bool(raw).ok_or_else(|| ImportError::TypeConversionError {
                row: row.line,
                field: "allow_substitution".to_string(),
                message: format!("无法解析为布尔值: {}", raw),
            })?,
        };

        Ok(OrderRequest::new(product_id, amount)
            .with_variant(VariantId(variant_id))
            .with_user(UserId(user_id))
            .with_substitution(allow_substitution))
    }

    fn parse_required<T>(&self, row: &RawRecord, key: &str) -> ImportResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.parse_optional(row, key)?
            .ok_or_else(|| ImportError::MissingField {
                row: row.line,
                field: key.to_string(),
            })
    }

    fn parse_optional<T>(&self, row: &RawRecord, key: &str) -> ImportResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match row.get(key) {
            None => Ok(None),
            Some(value) => value
                .parse::<T>()
                .map(Some)
                .map_err(|e| ImportError::TypeConversionError {
                    row: row.line,
                    field: key.to_string(),
                    message: format!("{}: {}", value, e),
                }),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
