// ==========================================
// 资源分配引擎 - 产品目录
// ==========================================
// 职责: 产品(配方)定义与替代变体
// 依赖: MaterialRegistry (仅注册时校验物料引用)
// 并发: 表级 RwLock (写锁 = 产品命名空间注册锁)
//       履约计数为原子量, 只需读锁
// ==========================================

use crate::domain::product::{NewProduct, Product, ProductView, Variant};
use crate::domain::types::{MaterialId, ProductId, Quantity, VariantId};
use crate::error::{EngineError, EngineResult};
use crate::repository::material_registry::MaterialRegistry;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
struct ProductEntry {
    product: Product,
    fulfilled_units: AtomicU64,
}

#[derive(Debug)]
struct ProductTable {
    entries: HashMap<ProductId, ProductEntry>,
    next_auto_id: u64,
}

// ==========================================
// ProductCatalog
// ==========================================
#[derive(Debug)]
pub struct ProductCatalog {
    materials: Arc<MaterialRegistry>,
    table: RwLock<ProductTable>,
}

impl ProductCatalog {
    /// 创建空目录
    ///
    /// # 参数
    /// - `materials`: 物料注册表 (用于引用校验)
    /// - `first_auto_id`: 自动分配 ID 的起点
    pub fn new(materials: Arc<MaterialRegistry>, first_auto_id: u64) -> Self {
        Self {
            materials,
            table: RwLock::new(ProductTable {
                entries: HashMap::new(),
                next_auto_id: first_auto_id,
            }),
        }
    }

    fn read_table(&self) -> EngineResult<RwLockReadGuard<'_, ProductTable>> {
        self.table
            .read()
            .map_err(|e| EngineError::lock("product table", e))
    }

    fn write_table(&self) -> EngineResult<RwLockWriteGuard<'_, ProductTable>> {
        self.table
            .write()
            .map_err(|e| EngineError::lock("product table", e))
    }

    fn ensure_material(&self, material_id: MaterialId) -> EngineResult<()> {
        if self.materials.contains(material_id)? {
            Ok(())
        } else {
            Err(EngineError::MaterialNotFound { material_id })
        }
    }

    // ==========================================
    // 注册
    // ==========================================

    /// 注册产品
    ///
    /// 校验顺序:
    /// 1) material_amount > 0
    /// 2) 主物料存在
    /// 3) 产品 ID 未被占用 (注册锁内)
    pub fn add(&self, new_product: NewProduct) -> EngineResult<ProductId> {
        if new_product.material_amount == 0 {
            return Err(EngineError::InvalidAmount {
                field: "material_amount",
            });
        }
        self.ensure_material(new_product.primary_material_id)?;

        let mut table = self.write_table()?;

        let product_id = match new_product.product_id {
            Some(id) => {
                if table.entries.contains_key(&id) {
                    return Err(EngineError::DuplicateId {
                        entity: "product",
                        id: id.to_string(),
                    });
                }
                id
            }
            None => {
                let mut candidate = table.next_auto_id;
                while table.entries.contains_key(&ProductId(candidate)) {
                    candidate = candidate.wrapping_add(1);
                }
                table.next_auto_id = candidate.wrapping_add(1);
                ProductId(candidate)
            }
        };

        let product = Product {
            product_id,
            primary_material_id: new_product.primary_material_id,
            material_amount: new_product.material_amount,
            priority: new_product.priority,
            work_complexity: new_product.work_complexity,
            variants: BTreeMap::new(),
        };

        tracing::info!(
            product = %product_id,
            material = %product.primary_material_id,
            material_amount = product.material_amount,
            priority = product.priority,
            "产品已注册"
        );

        table.entries.insert(
            product_id,
            ProductEntry {
                product,
                fulfilled_units: AtomicU64::new(0),
            },
        );
        Ok(product_id)
    }

    /// 注册替代变体
    ///
    /// - 0 号变体保留给主物料, 视为已存在
    /// - 同一产品下变体 ID 不可重复
    pub fn add_variant(
        &self,
        product_id: ProductId,
        variant_id: VariantId,
        material_id: MaterialId,
        material_amount: Quantity,
    ) -> EngineResult<()> {
        if material_amount == 0 {
            return Err(EngineError::InvalidAmount {
                field: "material_amount",
            });
        }
        self.ensure_material(material_id)?;

        let mut table = self.write_table()?;
        let entry = table
            .entries
            .get_mut(&product_id)
            .ok_or_else(|| EngineError::product_not_registered(product_id))?;

        if variant_id.is_primary() || entry.product.variants.contains_key(&variant_id) {
            return Err(EngineError::DuplicateId {
                entity: "variant",
                id: format!("{}/{}", product_id, variant_id),
            });
        }

        entry.product.variants.insert(
            variant_id,
            Variant {
                variant_id,
                material_id,
                material_amount,
            },
        );

        tracing::info!(
            product = %product_id,
            variant = %variant_id,
            material = %material_id,
            material_amount,
            "替代变体已注册"
        );
        Ok(())
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 产品只读视图
    pub fn get(&self, product_id: ProductId) -> EngineResult<ProductView> {
        let table = self.read_table()?;
        let entry = table
            .entries
            .get(&product_id)
            .ok_or_else(|| EngineError::product_not_registered(product_id))?;
        Ok(ProductView::from_product(
            &entry.product,
            entry.fulfilled_units.load(Ordering::Acquire),
        ))
    }

    /// 产品定义快照 (订单处理使用, 不可变)
    pub fn product(&self, product_id: ProductId) -> EngineResult<Product> {
        let table = self.read_table()?;
        table
            .entries
            .get(&product_id)
            .map(|entry| entry.product.clone())
            .ok_or_else(|| EngineError::product_not_registered(product_id))
    }

    /// 解析变体为 (物料, 单位用量)
    pub fn resolve_variant(
        &self,
        product_id: ProductId,
        variant_id: VariantId,
    ) -> EngineResult<(MaterialId, Quantity)> {
        let table = self.read_table()?;
        let entry = table
            .entries
            .get(&product_id)
            .ok_or_else(|| EngineError::product_not_registered(product_id))?;
        entry
            .product
            .variant(variant_id)
            .map(|v| (v.material_id, v.material_amount))
            .ok_or(EngineError::VariantNotFound {
                product_id,
                variant_id,
            })
    }

    pub fn count(&self) -> EngineResult<usize> {
        Ok(self.read_table()?.entries.len())
    }

    /// 累加履约单位数
    pub(crate) fn record_fulfillment(
        &self,
        product_id: ProductId,
        units: Quantity,
    ) -> EngineResult<()> {
        let table = self.read_table()?;
        if let Some(entry) = table.entries.get(&product_id) {
            // 饱和累加, 计数不回绕
            let _ = entry
                .fulfilled_units
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |u| {
                    Some(u.saturating_add(units))
                });
        }
        Ok(())
    }
}
