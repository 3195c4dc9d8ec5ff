// ==========================================
// 资源分配引擎 - 物料领域模型
// ==========================================
// 红线: supply >= 0 恒成立
// 红线: 初始供给为 0 视为配置错误, 拒绝注册
// ==========================================

use crate::domain::types::{MaterialId, Quantity};
use serde::{Deserialize, Serialize};

/// 供给为 0 且仍有未满足需求时的稀缺度
pub const SCARCITY_SATURATED: u64 = u64::MAX;

// ==========================================
// MaterialStock - 物料库存账
// ==========================================
// 只有订单处理器在注册之后修改 supply
// 统计字段不参与库存判定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialStock {
    pub material_id: MaterialId,
    pub initial_supply: Quantity,    // 注册时供给
    pub supply: Quantity,            // 当前可用供给
    pub consumed: Quantity,          // 累计扣减量
    pub unmet_demand: Quantity,      // 累计未满足需求量 (仅统计被拒订单)
    pub fulfilled_orders: u64,       // 在本物料上履约的订单数
    pub rejected_orders: u64,        // 以本物料为请求物料且被拒的订单数
}

impl MaterialStock {
    /// 新建库存账
    ///
    /// # 参数
    /// - `material_id`: 物料 ID
    /// - `supply`: 初始供给 (调用方已校验 > 0)
    pub fn new(material_id: MaterialId, supply: Quantity) -> Self {
        Self {
            material_id,
            initial_supply: supply,
            supply,
            consumed: 0,
            unmet_demand: 0,
            fulfilled_orders: 0,
            rejected_orders: 0,
        }
    }

    /// 是否足以覆盖需求量
    pub fn can_cover(&self, required: Quantity) -> bool {
        required <= self.supply
    }

    /// 扣减供给
    ///
    /// # 返回
    /// - `Some(DebitOutcome)`: 扣减成功
    /// - `None`: 供给不足, 账面不变
    pub fn debit(&mut self, amount: Quantity) -> Option<DebitOutcome> {
        if !self.can_cover(amount) {
            return None;
        }

        self.supply -= amount;
        self.consumed = self.consumed.saturating_add(amount);
        self.fulfilled_orders = self.fulfilled_orders.saturating_add(1);

        Some(DebitOutcome {
            material_id: self.material_id,
            debited: amount,
            remaining: self.supply,
            depleted: self.supply == 0,
        })
    }

    /// 记录一次缺口 (订单最终被拒)
    pub fn record_shortfall(&mut self, required: Quantity) {
        self.unmet_demand = self.unmet_demand.saturating_add(required);
        self.record_rejection();
    }

    /// 记录一次被拒, 不计入未满足需求 (需求量无法表示时)
    pub fn record_rejection(&mut self) {
        self.rejected_orders = self.rejected_orders.saturating_add(1);
    }

    /// 稀缺度 (百分比)
    ///
    /// 计算口径: unmet_demand * 100 / supply / 2
    /// - 供给为 0 且有未满足需求 => `SCARCITY_SATURATED`
    /// - 无未满足需求 => 0
    pub fn scarcity(&self) -> u64 {
        if self.unmet_demand == 0 {
            return 0;
        }
        if self.supply == 0 {
            return SCARCITY_SATURATED;
        }
        self.unmet_demand.saturating_mul(100) / self.supply / 2
    }
}

// ==========================================
// DebitOutcome - 扣减结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebitOutcome {
    pub material_id: MaterialId,
    pub debited: Quantity,
    pub remaining: Quantity,
    pub depleted: bool, // remaining == 0, 供状态上报使用
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debit_partial() {
        let mut stock = MaterialStock::new(MaterialId(1), 100);
        let outcome = stock.debit(40).unwrap();

        assert_eq!(outcome.remaining, 60);
        assert!(!outcome.depleted);
        assert_eq!(stock.consumed, 40);
        assert_eq!(stock.fulfilled_orders, 1);
    }

    #[test]
    fn test_debit_exact_depletes() {
        let mut stock = MaterialStock::new(MaterialId(1), 100);
        let outcome = stock.debit(100).unwrap();

        assert_eq!(outcome.remaining, 0);
        assert!(outcome.depleted);
    }

    #[test]
    fn test_debit_overdraft_leaves_stock_untouched() {
        let mut stock = MaterialStock::new(MaterialId(1), 79);
        assert!(stock.debit(80).is_none());
        stock.record_rejection();
        assert_eq!(stock.rejected_orders, 1);
        assert_eq!(stock.unmet_demand, 0);
        assert_eq!(stock.supply, 79);
        assert_eq!(stock.consumed, 0);
        assert_eq!(stock.fulfilled_orders, 0);
    }

    #[test]
    fn test_scarcity() {
        let mut stock = MaterialStock::new(MaterialId(1), 100);
        assert_eq!(stock.scarcity(), 0);

        stock.record_shortfall(120);
        // 120 * 100 / 100 / 2
        assert_eq!(stock.scarcity(), 60);
        assert_eq!(stock.rejected_orders, 1);

        stock.debit(100).unwrap();
        assert_eq!(stock.scarcity(), SCARCITY_SATURATED);
    }
}
