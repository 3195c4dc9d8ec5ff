// ==========================================
// 资源分配引擎 - 引擎门面
// ==========================================
// 职责: 持有物料注册表与产品目录, 构造订单处理器
//       暴露 init / add_material / add_product / order_product / get_material_supply
// 并发: Engine 为 Send + Sync, 可通过 Arc 或作用域线程共享
// 红线: 不使用全局单例, 每个 Engine 实例相互独立
// ==========================================

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::domain::material::MaterialStock;
use crate::domain::order::{OrderReceipt, OrderRequest};
use crate::domain::product::{NewProduct, ProductView};
use crate::domain::types::{
    MaterialId, Priority, ProductId, Quantity, StatusCode, UserId, VariantId,
};
use crate::engine::events::{
    EngineEvent, EngineEventPublisher, EngineEventType, OptionalEventPublisher,
};
use crate::engine::order_processor::OrderProcessor;
use crate::error::EngineResult;
use crate::perf::PerfGuard;
use crate::repository::{MaterialRegistry, ProductCatalog};

// ==========================================
// Engine - 引擎门面
// ==========================================

/// 资源分配引擎
///
/// 职责：
/// 1. 物料/产品/变体注册
/// 2. 订单履约 (优先级仲裁 + 替代)
/// 3. 库存查询
pub struct Engine {
    config: EngineConfig,
    materials: Arc<MaterialRegistry>,
    catalog: Arc<ProductCatalog>,
    processor: OrderProcessor,
    events: OptionalEventPublisher,
}

impl Engine {
    /// 使用默认配置创建空引擎
    pub fn init() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// 使用指定配置创建空引擎
    pub fn with_config(config: EngineConfig) -> Self {
        Self::build(config, OptionalEventPublisher::none())
    }

    /// 使用指定配置与事件发布者创建空引擎
    pub fn with_publisher(config: EngineConfig, publisher: Arc<dyn EngineEventPublisher>) -> Self {
        Self::build(config, OptionalEventPublisher::with_publisher(publisher))
    }

    fn build(config: EngineConfig, events: OptionalEventPublisher) -> Self {
        let materials = Arc::new(MaterialRegistry::new(
            config.first_auto_id,
            config.arbitration_policy(),
        ));
        let catalog = Arc::new(ProductCatalog::new(materials.clone(), config.first_auto_id));
        let processor =
            OrderProcessor::new(materials.clone(), catalog.clone(), &config, events.clone());

        tracing::info!(
            allow_substitution = config.allow_substitution,
            priority_arbitration = config.priority_arbitration,
            first_auto_id = config.first_auto_id,
            event_publisher = events.is_configured(),
            "引擎初始化完成"
        );

        Self {
            config,
            materials,
            catalog,
            processor,
            events,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ==========================================
    // 状态码接口
    // ==========================================

    /// 注册物料
    ///
    /// # 返回
    /// `Ok` / `InvalidSupply` / `DuplicateId`
    pub fn add_material(&self, id: Option<MaterialId>, supply: Quantity) -> StatusCode {
        status_of(self.register_material(id, supply))
    }

    /// 注册产品
    ///
    /// # 返回
    /// `Ok` / `NotFound` (物料不存在) / `DuplicateId` / `InvalidAmount`
    pub fn add_product(
        &self,
        id: Option<ProductId>,
        material_id: MaterialId,
        material_amount: Quantity,
        priority: Priority,
        work_complexity: f64,
    ) -> StatusCode {
        let new_product = NewProduct {
            product_id: id,
            primary_material_id: material_id,
            material_amount,
            priority,
            work_complexity,
        };
        status_of(self.register_product(new_product))
    }

    /// 下单
    ///
    /// # 返回
    /// `Ok` / `OkDepleted` / `NotFound` / `InvalidAmount` / `InsufficientSupply`
    pub fn order_product(
        &self,
        product_id: ProductId,
        amount: Quantity,
        variant_id: VariantId,
        user_id: UserId,
        allow_substitution: bool,
    ) -> StatusCode {
        let request = OrderRequest {
            product_id,
            amount,
            variant_id,
            user_id,
            allow_substitution,
        };
        match self.submit_order(&request) {
            Ok(receipt) => receipt.status_code(),
            Err(e) => e.status_code(),
        }
    }

    /// 查询当前供给 (只读)
    pub fn get_material_supply(&self, id: MaterialId) -> EngineResult<Quantity> {
        let _perf = PerfGuard::new("engine.get_material_supply");
        let supply = self.materials.get_supply(id)?;
        tracing::debug!(material = %id, supply, "查询供给");
        Ok(supply)
    }

    // ==========================================
    // 类型化接口
    // ==========================================

    /// 注册物料, 返回实际 ID
    pub fn register_material(
        &self,
        id: Option<MaterialId>,
        supply: Quantity,
    ) -> EngineResult<MaterialId> {
        let _perf = PerfGuard::new("engine.add_material");
        let material_id = self.materials.add(id, supply).inspect_err(|e| {
            tracing::warn!(material = ?id, supply, reason = %e, "物料注册失败");
        })?;
        self.events.publish(
            EngineEvent::new(EngineEventType::MaterialRegistered, StatusCode::Ok)
                .material(material_id)
                .quantity(supply),
        );
        Ok(material_id)
    }

    /// 注册产品, 返回实际 ID
    pub fn register_product(&self, new_product: NewProduct) -> EngineResult<ProductId> {
        let _perf = PerfGuard::new("engine.add_product");
        let material_id = new_product.primary_material_id;
        let product_id = self.catalog.add(new_product).inspect_err(|e| {
            tracing::warn!(material = %material_id, reason = %e, "产品注册失败");
        })?;
        self.events.publish(
            EngineEvent::new(EngineEventType::ProductRegistered, StatusCode::Ok)
                .product(product_id)
                .material(material_id),
        );
        Ok(product_id)
    }

    /// 注册替代变体
    pub fn register_variant(
        &self,
        product_id: ProductId,
        variant_id: VariantId,
        material_id: MaterialId,
        material_amount: Quantity,
    ) -> EngineResult<()> {
        let _perf = PerfGuard::new("engine.add_variant");
        self.catalog
            .add_variant(product_id, variant_id, material_id, material_amount)
            .inspect_err(|e| {
                tracing::warn!(
                    product = %product_id,
                    variant = %variant_id,
                    reason = %e,
                    "变体注册失败"
                );
            })?;
        self.events.publish(
            EngineEvent::new(EngineEventType::VariantRegistered, StatusCode::Ok)
                .product(product_id)
                .variant(variant_id)
                .material(material_id)
                .quantity(material_amount),
        );
        Ok(())
    }

    /// 提交订单, 返回履约回执
    pub fn submit_order(&self, request: &OrderRequest) -> EngineResult<OrderReceipt> {
        let _perf = PerfGuard::new("engine.order_product");
        self.processor.process(request)
    }

    /// 库存账快照 (含消耗、缺口、稀缺度统计)
    pub fn material_stock(&self, id: MaterialId) -> EngineResult<MaterialStock> {
        self.materials.snapshot(id)
    }

    /// 物料稀缺度 (百分比)
    pub fn material_scarcity(&self, id: MaterialId) -> EngineResult<u64> {
        Ok(self.materials.snapshot(id)?.scarcity())
    }

    /// 产品只读视图
    pub fn product(&self, id: ProductId) -> EngineResult<ProductView> {
        self.catalog.get(id)
    }

    /// 解析变体为 (物料, 单位用量)
    pub fn resolve_variant(
        &self,
        product_id: ProductId,
        variant_id: VariantId,
    ) -> EngineResult<(MaterialId, Quantity)> {
        self.catalog.resolve_variant(product_id, variant_id)
    }

    pub fn material_count(&self) -> EngineResult<usize> {
        self.materials.count()
    }

    pub fn product_count(&self) -> EngineResult<usize> {
        self.catalog.count()
    }

    /// 全部物料 ID, 升序
    pub fn material_ids(&self) -> EngineResult<Vec<MaterialId>> {
        self.materials.ids()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::init()
    }
}

fn status_of<T>(result: EngineResult<T>) -> StatusCode {
    match result {
        Ok(_) => StatusCode::Ok,
        Err(e) => e.status_code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_engine_is_send_sync() {
        assert_send_sync::<Engine>();
    }

    #[test]
    fn test_instances_are_independent() {
        let a = Engine::init();
        let b = Engine::init();
        assert_eq!(a.add_material(Some(MaterialId(1)), 10), StatusCode::Ok);
        assert_eq!(b.add_material(Some(MaterialId(1)), 20), StatusCode::Ok);
        assert_eq!(a.get_material_supply(MaterialId(1)).unwrap(), 10);
        assert_eq!(b.get_material_supply(MaterialId(1)).unwrap(), 20);
    }

    #[test]
    fn test_auto_assigned_material_starts_at_zero() {
        let engine = Engine::init();
        assert_eq!(engine.add_material(None, 0), StatusCode::InvalidSupply);
        assert_eq!(engine.register_material(None, 100).unwrap(), MaterialId(0));
        assert_eq!(engine.get_material_supply(MaterialId(0)).unwrap(), 100);
    }

    #[test]
    fn test_first_auto_id_from_config() {
        let engine = Engine::with_config(EngineConfig {
            first_auto_id: 500,
            ..EngineConfig::default()
        });
        assert_eq!(engine.register_material(None, 1).unwrap(), MaterialId(500));
        let pid = engine
            .register_product(NewProduct::new(MaterialId(500), 1))
            .unwrap();
        assert_eq!(pid, ProductId(500));
    }
}
