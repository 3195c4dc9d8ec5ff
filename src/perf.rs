use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Once;
use std::time::{Duration, Instant};

static SLOW_WAIT_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);
static SLOW_WAIT_INIT: Once = Once::new();

thread_local! {
    static PERF_DEPTH: Cell<u32> = Cell::new(0);
    static ADMISSION_WAIT_COUNT: Cell<u64> = Cell::new(0);
    static SLOW_WAIT_COUNT: Cell<u64> = Cell::new(0);
}

pub(crate) fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

/// 慢等待阈值（毫秒）
///
/// - `RESOURCE_ENGINE_SLOW_WAIT_MS=50` 配置阈值
/// - 未配置时 Debug 50ms / Release 200ms
fn slow_wait_threshold_ms() -> u64 {
    SLOW_WAIT_INIT.call_once(|| {
        let ms = std::env::var("RESOURCE_ENGINE_SLOW_WAIT_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 });
        SLOW_WAIT_THRESHOLD_MS.store(ms, Ordering::Relaxed);
    });
    SLOW_WAIT_THRESHOLD_MS.load(Ordering::Relaxed)
}

/// 记录一次准入排队等待（由 AdmissionGate 调用）
pub(crate) fn record_admission_wait(material: &str, waited: Duration) {
    let ms = waited.as_millis() as u64;
    let threshold = slow_wait_threshold_ms();
    if threshold > 0 && ms >= threshold {
        tracing::warn!(
            target: "slow_admission",
            material,
            waited_ms = ms,
            "slow admission wait"
        );
        SLOW_WAIT_COUNT.with(|c| c.set(c.get().saturating_add(1)));
    }

    let active = PERF_DEPTH.with(|d| d.get() > 0);
    if active {
        ADMISSION_WAIT_COUNT.with(|c| c.set(c.get().saturating_add(1)));
    }
}

/// 性能统计 Guard：记录 elapsed_ms + 排队等待次数 + 慢等待次数
///
/// 使用方式：
/// ```ignore
/// let _perf = resource_engine::perf::PerfGuard::new("engine.order_product");
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    wait_start: u64,
    slow_wait_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        PERF_DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        let wait_start = ADMISSION_WAIT_COUNT.with(|c| c.get());
        let slow_wait_start = SLOW_WAIT_COUNT.with(|c| c.get());
        Self {
            op,
            start: Instant::now(),
            wait_start,
            slow_wait_start,
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_us = self.start.elapsed().as_micros() as u64;
        let admission_waits = ADMISSION_WAIT_COUNT
            .with(|c| c.get())
            .saturating_sub(self.wait_start);
        let slow_waits = SLOW_WAIT_COUNT
            .with(|c| c.get())
            .saturating_sub(self.slow_wait_start);

        tracing::debug!(
            target: "perf",
            op = self.op,
            elapsed_us,
            admission_waits,
            slow_waits,
            "done"
        );

        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_true() {
        assert!(is_true("1"));
        assert!(is_true(" Yes "));
        assert!(is_true("ON"));
        assert!(!is_true("0"));
        assert!(!is_true("off"));
    }

    #[test]
    fn test_guard_counts_waits_only_inside_scope() {
        record_admission_wait("M0", Duration::from_millis(0));
        let before = ADMISSION_WAIT_COUNT.with(|c| c.get());
        {
            let _perf = PerfGuard::new("test");
            record_admission_wait("M1", Duration::from_millis(0));
        }
        let after = ADMISSION_WAIT_COUNT.with(|c| c.get());
        assert_eq!(after - before, 1);
    }
}
