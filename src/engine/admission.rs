// ==========================================
// 资源分配引擎 - 物料准入闸门
// ==========================================
// 职责: 同一物料上的扣减串行化, 竞争时按优先级放行
// 排序键: (priority 降序, 到达序号 升序)
// 红线: 闸门空闲且无人排队时立即放行
// 红线: 任一订单同时最多持有一个物料的许可
// ==========================================

use crate::domain::types::Priority;
use crate::error::{EngineError, EngineResult};
use crate::perf;
use std::cmp::{Ordering, Reverse};
use std::collections::BTreeSet;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Instant;

// ==========================================
// 仲裁策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbitrationPolicy {
    /// 优先级降序, 同级先到先得
    Priority,
    /// 仅按到达顺序
    Arrival,
}

// ==========================================
// 排队票据
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket {
    rank: Reverse<Priority>,
    seq: u64,
}

impl Ord for Ticket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Ticket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
struct GateState {
    held: bool,
    waiting: BTreeSet<Ticket>,
    next_seq: u64,
}

// ==========================================
// AdmissionGate
// ==========================================
#[derive(Debug)]
pub struct AdmissionGate {
    label: String,
    policy: ArbitrationPolicy,
    state: Mutex<GateState>,
    turn: Condvar,
}

impl AdmissionGate {
    /// 创建闸门
    ///
    /// # 参数
    /// - `label`: 日志标识 (物料 ID)
    /// - `policy`: 仲裁策略
    pub fn new(label: impl Into<String>, policy: ArbitrationPolicy) -> Self {
        Self {
            label: label.into(),
            policy,
            state: Mutex::new(GateState::default()),
            turn: Condvar::new(),
        }
    }

    /// 获取独占许可
    ///
    /// 闸门被占用或已有人排队时, 按票据顺序等待
    /// 许可在 drop 时归还
    pub fn acquire(&self, priority: Priority) -> EngineResult<AdmissionPermit<'_>> {
        let mut state = self.lock_state()?;

        let rank = match self.policy {
            ArbitrationPolicy::Priority => priority,
            ArbitrationPolicy::Arrival => 0,
        };
        let ticket = Ticket {
            rank: Reverse(rank),
            seq: state.next_seq,
        };
        state.next_seq += 1;

        if !state.held && state.waiting.is_empty() {
            state.held = true;
            return Ok(AdmissionPermit { gate: self });
        }

        let started = Instant::now();
        state.waiting.insert(ticket);
        tracing::trace!(
            gate = %self.label,
            priority,
            seq = ticket.seq,
            pending = state.waiting.len(),
            "排队等待准入"
        );

        loop {
            if !state.held && state.waiting.first() == Some(&ticket) {
                state.waiting.remove(&ticket);
                state.held = true;
                break;
            }
            state = match self.turn.wait(state) {
                Ok(guard) => guard,
                Err(e) => {
                    // 中毒时仍需撤出排队, 否则后续票据永远等不到队首
                    let mut guard = e.into_inner();
                    guard.waiting.remove(&ticket);
                    drop(guard);
                    self.turn.notify_all();
                    return Err(EngineError::lock("admission gate", "poisoned"));
                }
            };
        }

        drop(state);
        perf::record_admission_wait(&self.label, started.elapsed());
        Ok(AdmissionPermit { gate: self })
    }

    /// 当前排队数 (不含持有者)
    pub fn pending(&self) -> usize {
        match self.state.lock() {
            Ok(state) => state.waiting.len(),
            Err(e) => e.into_inner().waiting.len(),
        }
    }

    /// 许可是否被占用
    pub fn is_held(&self) -> bool {
        match self.state.lock() {
            Ok(state) => state.held,
            Err(e) => e.into_inner().held,
        }
    }

    fn lock_state(&self) -> EngineResult<MutexGuard<'_, GateState>> {
        self.state
            .lock()
            .map_err(|e| EngineError::lock("admission gate", e))
    }

    fn release(&self) {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(e) => e.into_inner(),
        };
        state.held = false;
        drop(state);
        self.turn.notify_all();
    }
}

// ==========================================
// AdmissionPermit - RAII 许可
// ==========================================
#[derive(Debug)]
pub struct AdmissionPermit<'a> {
    gate: &'a AdmissionGate,
}

impl Drop for AdmissionPermit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}
