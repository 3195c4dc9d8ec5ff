// ==========================================
// 资源分配引擎 - 物料注册表
// ==========================================
// 职责: 物料身份与可用供给
// 并发: 表级 RwLock (写锁 = 物料命名空间注册锁)
//       每物料 Mutex<MaterialStock> + AdmissionGate
// 红线: 同一物料的 检查-扣减 在同一临界区内完成
// ==========================================

use crate::domain::material::{DebitOutcome, MaterialStock};
use crate::domain::types::{MaterialId, Quantity};
use crate::engine::admission::{AdmissionGate, ArbitrationPolicy};
use crate::error::{EngineError, EngineResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

// ==========================================
// MaterialEntry - 单物料条目
// ==========================================
#[derive(Debug)]
pub struct MaterialEntry {
    id: MaterialId,
    stock: Mutex<MaterialStock>,
    gate: AdmissionGate,
}

impl MaterialEntry {
    fn new(id: MaterialId, supply: Quantity, policy: ArbitrationPolicy) -> Self {
        Self {
            id,
            stock: Mutex::new(MaterialStock::new(id, supply)),
            gate: AdmissionGate::new(id.to_string(), policy),
        }
    }

    pub fn id(&self) -> MaterialId {
        self.id
    }

    /// 该物料的准入闸门
    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    fn lock_stock(&self) -> EngineResult<MutexGuard<'_, MaterialStock>> {
        self.stock
            .lock()
            .map_err(|e| EngineError::lock("material stock", e))
    }

    pub fn supply(&self) -> EngineResult<Quantity> {
        Ok(self.lock_stock()?.supply)
    }

    pub fn snapshot(&self) -> EngineResult<MaterialStock> {
        Ok(self.lock_stock()?.clone())
    }

    /// 原子扣减
    ///
    /// # 返回
    /// - `Ok(DebitOutcome)`: 扣减成功, 带耗尽标记
    /// - `Err(InsufficientSupply)`: 供给不足, 账面不变
    pub fn debit(&self, amount: Quantity) -> EngineResult<DebitOutcome> {
        let mut stock = self.lock_stock()?;
        let available = stock.supply;
        stock.debit(amount).ok_or(EngineError::InsufficientSupply {
            material_id: self.id,
            required: amount,
            available,
        })
    }

    /// 记录订单最终被拒的缺口, 返回记录后的稀缺度
    ///
    /// `required` 为 None (需求量溢出) 时只计被拒次数
    pub fn record_shortfall(&self, required: Option<Quantity>) -> EngineResult<u64> {
        let mut stock = self.lock_stock()?;
        match required {
            Some(required) => stock.record_shortfall(required),
            None => stock.record_rejection(),
        }
        Ok(stock.scarcity())
    }
}

// ==========================================
// MaterialRegistry
// ==========================================
#[derive(Debug)]
struct MaterialTable {
    entries: HashMap<MaterialId, Arc<MaterialEntry>>,
    next_auto_id: u64,
}

#[derive(Debug)]
pub struct MaterialRegistry {
    table: RwLock<MaterialTable>,
    policy: ArbitrationPolicy,
}

impl MaterialRegistry {
    /// 创建空注册表
    ///
    /// # 参数
    /// - `first_auto_id`: 自动分配 ID 的起点
    /// - `policy`: 新物料闸门的仲裁策略
    pub fn new(first_auto_id: u64, policy: ArbitrationPolicy) -> Self {
        Self {
            table: RwLock::new(MaterialTable {
                entries: HashMap::new(),
                next_auto_id: first_auto_id,
            }),
            policy,
        }
    }

    // ==========================================
    // 注册
    // ==========================================

    /// 注册物料
    ///
    /// # 参数
    /// - `id`: 调用方指定 ID; None 表示由注册表分配
    /// - `supply`: 初始供给, 必须 > 0
    ///
    /// # 返回
    /// 实际使用的物料 ID
    pub fn add(&self, id: Option<MaterialId>, supply: Quantity) -> EngineResult<MaterialId> {
        if supply == 0 {
            return Err(EngineError::InvalidSupply { supply });
        }

        let mut table = self
            .table
            .write()
            .map_err(|e| EngineError::lock("material table", e))?;

        let id = match id {
            Some(id) => {
                if table.entries.contains_key(&id) {
                    return Err(EngineError::DuplicateId {
                        entity: "material",
                        id: id.to_string(),
                    });
                }
                id
            }
            None => {
                let mut candidate = table.next_auto_id;
                while table.entries.contains_key(&MaterialId(candidate)) {
                    candidate = candidate.wrapping_add(1);
                }
                table.next_auto_id = candidate.wrapping_add(1);
                MaterialId(candidate)
            }
        };

        table
            .entries
            .insert(id, Arc::new(MaterialEntry::new(id, supply, self.policy)));

        tracing::info!(material = %id, supply, "物料已注册");
        Ok(id)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 获取物料条目 (表读锁只在克隆 Arc 期间持有)
    pub fn entry(&self, id: MaterialId) -> EngineResult<Arc<MaterialEntry>> {
        let table = self
            .table
            .read()
            .map_err(|e| EngineError::lock("material table", e))?;
        table
            .entries
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::material_not_registered(id))
    }

    pub fn contains(&self, id: MaterialId) -> EngineResult<bool> {
        let table = self
            .table
            .read()
            .map_err(|e| EngineError::lock("material table", e))?;
        Ok(table.entries.contains_key(&id))
    }

    /// 当前供给 (只读, 不改变状态)
    pub fn get_supply(&self, id: MaterialId) -> EngineResult<Quantity> {
        self.entry(id)?.supply()
    }

    /// 库存账快照 (含需求与稀缺度统计)
    pub fn snapshot(&self, id: MaterialId) -> EngineResult<MaterialStock> {
        self.entry(id)?.snapshot()
    }

    pub fn count(&self) -> EngineResult<usize> {
        let table = self
            .table
            .read()
            .map_err(|e| EngineError::lock("material table", e))?;
        Ok(table.entries.len())
    }

    /// 全部物料 ID, 升序
    pub fn ids(&self) -> EngineResult<Vec<MaterialId>> {
        let table = self
            .table
            .read()
            .map_err(|e| EngineError::lock("material table", e))?;
        let mut ids: Vec<MaterialId> = table.entries.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    // ==========================================
    // 扣减
    // ==========================================

    /// 直接扣减 (不经准入闸门, 仍与同物料其他扣减互斥)
    pub fn debit(&self, id: MaterialId, amount: Quantity) -> EngineResult<DebitOutcome> {
        self.entry(id)?.debit(amount)
    }
}
