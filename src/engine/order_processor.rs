// ==========================================
// 资源分配引擎 - 订单处理器
// ==========================================
// 职责: 订单校验 -> 变体解析 -> 主尝试 -> 替代回退 -> 结果分类
// 输入: OrderRequest
// 输出: OrderReceipt 或带具体原因的 EngineError
// ==========================================
// 红线: 每个订单至多修改一个物料
// 红线: 被拒订单不留下任何扣减
// 红线: 同时最多持有一个物料的准入许可
// 红线: 引擎不重试, 重试由调用方负责
// ==========================================

use crate::config::EngineConfig;
use crate::domain::material::DebitOutcome;
use crate::domain::order::{
    Fulfillment, OrderReceipt, OrderRequest, OrderState, RejectReason,
};
use crate::domain::product::Product;
use crate::engine::events::{EngineEvent, EngineEventType, OptionalEventPublisher};
use crate::engine::substitution::{plan_candidates, Candidate};
use crate::error::{EngineError, EngineResult, ErrorKind};
use crate::repository::{MaterialRegistry, ProductCatalog};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;


// ==========================================
// OrderProcessor
// ==========================================
pub struct OrderProcessor {
    materials: Arc<MaterialRegistry>,
    catalog: Arc<ProductCatalog>,
    allow_substitution: bool,
    scarcity_warn_threshold: u64,
    events: OptionalEventPublisher,
}

impl OrderProcessor {
    /// 构造函数
    ///
    /// # 参数
    /// - `materials`: 物料注册表
    /// - `catalog`: 产品目录
    /// - `config`: 引擎配置 (全局替代开关、稀缺度阈值)
    /// - `events`: 事件发布者
    pub fn new(
        materials: Arc<MaterialRegistry>,
        catalog: Arc<ProductCatalog>,
        config: &EngineConfig,
        events: OptionalEventPublisher,
    ) -> Self {
        Self {
            materials,
            catalog,
            allow_substitution: config.allow_substitution,
            scarcity_warn_threshold: config.scarcity_warn_threshold,
            events,
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 处理订单
    ///
    /// # 返回
    /// - `Ok(OrderReceipt)`: 履约成功, 含 PartialStock / Depleted 分类
    /// - `Err(InvalidAmount)`: amount == 0
    /// - `Err(NotFound | VariantNotFound)`: 产品或变体不存在
    /// - `Err(InsufficientSupply)`: 请求物料不足且替代耗尽
    pub fn process(&self, request: &OrderRequest) -> EngineResult<OrderReceipt> {
        tracing::debug!(
            product = %request.product_id,
            amount = request.amount,
            variant = %request.variant_id,
            user = %request.user_id,
            state = %OrderState::Requested,
            "收到订单"
        );

        let result = self.fulfill(request);
        match &result {
            Ok(receipt) => self.on_fulfilled(request, receipt),
            Err(err) => self.on_rejected(request, err),
        }
        result
    }

    fn fulfill(&self, request: &OrderRequest) -> EngineResult<OrderReceipt> {
        // 1. 校验
        if request.amount == 0 {
            return Err(EngineError::InvalidAmount { field: "amount" });
        }
        let product = self.catalog.product(request.product_id)?;

        // 2. 解析需求, 生成尝试序列
        let allow_substitution = request.allow_substitution && self.allow_substitution;
        let candidates = plan_candidates(
            &product,
            request.variant_id,
            request.amount,
            allow_substitution,
        )?;

        tracing::debug!(
            product = %request.product_id,
            candidates = candidates.len(),
            allow_substitution,
            state = %OrderState::Validated,
            "订单已校验"
        );

        // 3/4. 主尝试 + 替代回退
        for candidate in &candidates {
            if let Some(outcome) = self.try_candidate(&product, candidate)? {
                return Ok(self.build_receipt(request, candidate, outcome));
            }
        }

        // 替代耗尽, 缺口记在请求物料上
        match candidates.first() {
            Some(requested) => Err(self.reject_for_capacity(requested)?),
            None => Err(EngineError::VariantNotFound {
                product_id: request.product_id,
                variant_id: request.variant_id,
            }),
        }
    }

    /// 对单个候选执行 读取-尝试
    ///
    /// # 返回
    /// - `Ok(Some(outcome))`: 已扣减
    /// - `Ok(None)`: 供给不足或需求溢出, 账面不变
    fn try_candidate(
        &self,
        product: &Product,
        candidate: &Candidate,
    ) -> EngineResult<Option<DebitOutcome>> {
        let Some(required) = candidate.required else {
            tracing::debug!(
                variant = %candidate.variant_id,
                material = %candidate.material_id,
                "需求量溢出, 跳过候选"
            );
            return Ok(None);
        };

        let entry = self.materials.entry(candidate.material_id)?;

        // 无闸门预读: 明显不足的候选不进入排队
        let observed = entry.supply()?;
        if observed < required {
            tracing::debug!(
                variant = %candidate.variant_id,
                material = %candidate.material_id,
                required,
                observed,
                "候选供给不足"
            );
            return Ok(None);
        }

        let _permit = entry.gate().acquire(product.priority)?;
        match entry.debit(required) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(EngineError::InsufficientSupply { available, .. }) => {
                tracing::debug!(
                    variant = %candidate.variant_id,
                    material = %candidate.material_id,
                    required,
                    available,
                    "排队期间供给被抢占"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn build_receipt(
        &self,
        request: &OrderRequest,
        candidate: &Candidate,
        outcome: DebitOutcome,
    ) -> OrderReceipt {
        let fulfillment = if outcome.depleted {
            Fulfillment::Depleted
        } else {
            Fulfillment::PartialStock
        };

        OrderReceipt {
            order_id: Uuid::new_v4(),
            product_id: request.product_id,
            user_id: request.user_id,
            amount: request.amount,
            requested_variant: request.variant_id,
            fulfilled_variant: candidate.variant_id,
            material_id: outcome.material_id,
            consumed: outcome.debited,
            remaining: outcome.remaining,
            fulfillment,
            processed_at: Utc::now(),
        }
    }

    /// 记录缺口并构造容量错误
    fn reject_for_capacity(&self, requested: &Candidate) -> EngineResult<EngineError> {
        let entry = self.materials.entry(requested.material_id)?;
        let scarcity = entry.record_shortfall(requested.required)?;
        let available = entry.supply()?;

        if scarcity >= self.scarcity_warn_threshold {
            tracing::warn!(
                material = %requested.material_id,
                scarcity,
                threshold = self.scarcity_warn_threshold,
                "物料稀缺度超过告警阈值"
            );
        }

        Ok(match requested.required {
            Some(required) => EngineError::InsufficientSupply {
                material_id: requested.material_id,
                required,
                available,
            },
            None => EngineError::RequirementOverflow {
                material_id: requested.material_id,
                available,
            },
        })
    }

    // ==========================================
    // 结果上报
    // ==========================================

    fn on_fulfilled(&self, request: &OrderRequest, receipt: &OrderReceipt) {
        // 扣减已发生, 统计失败不得回滚结果
        if let Err(e) = self
            .catalog
            .record_fulfillment(request.product_id, request.amount)
        {
            tracing::warn!(product = %request.product_id, error = %e, "履约计数更新失败");
        }

        tracing::info!(
            order_id = %receipt.order_id,
            product = %receipt.product_id,
            user = %receipt.user_id,
            variant = %receipt.fulfilled_variant,
            material = %receipt.material_id,
            consumed = receipt.consumed,
            remaining = receipt.remaining,
            substituted = receipt.substituted(),
            state = %receipt.state(),
            "订单履约"
        );

        self.events.publish(
            EngineEvent::new(EngineEventType::OrderFulfilled, receipt.status_code())
                .material(receipt.material_id)
                .product(receipt.product_id)
                .variant(receipt.fulfilled_variant)
                .user(receipt.user_id)
                .quantity(receipt.consumed),
        );

        if receipt.fulfillment == Fulfillment::Depleted {
            tracing::warn!(material = %receipt.material_id, "物料已耗尽");
            self.events.publish(
                EngineEvent::new(EngineEventType::MaterialDepleted, receipt.status_code())
                    .material(receipt.material_id)
                    .product(receipt.product_id),
            );
        }
    }

    fn on_rejected(&self, request: &OrderRequest, err: &EngineError) {
        let state = rejected_state(err.kind());

        if err.kind() == ErrorKind::Internal {
            tracing::error!(product = %request.product_id, error = %err, "订单处理内部错误");
        } else {
            tracing::warn!(
                product = %request.product_id,
                amount = request.amount,
                variant = %request.variant_id,
                user = %request.user_id,
                state = %state,
                reason = %err,
                "订单被拒"
            );
        }

        let mut event = EngineEvent::new(EngineEventType::OrderRejected, err.status_code())
            .product(request.product_id)
            .variant(request.variant_id)
            .user(request.user_id);
        if let EngineError::InsufficientSupply {
            material_id,
            required,
            ..
        } = err
        {
            event = event.material(*material_id).quantity(*required);
        } else if let EngineError::RequirementOverflow { material_id, .. } = err {
            event = event.material(*material_id);
        }
        self.events.publish(event);
    }
}

/// 错误类别 -> 被拒状态
pub(crate) fn rejected_state(kind: ErrorKind) -> OrderState {
    let reason = match kind {
        ErrorKind::Validation => RejectReason::InvalidAmount,
        ErrorKind::Reference => RejectReason::NotFound,
        ErrorKind::Capacity => RejectReason::InsufficientSupply,
        // 订单路径不产生冲突错误, 出现即按内部错误处理
        ErrorKind::Conflict | ErrorKind::Internal => RejectReason::Internal,
    };
    OrderState::Rejected(reason)
}
