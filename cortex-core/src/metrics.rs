//! Runtime Metrics & Instrumentation
//!
//! Lightweight counters and a per-turn latency monitor for a cognitive
//! session, plus the span names used with `tracing`.
//!
//! Counters are lock-free `AtomicU64`s. The latency history uses a
//! `parking_lot::Mutex` since it is written once per turn and read rarely.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

// ---------------------------------------------------------------------------
// Engine Counters (lock-free)
// ---------------------------------------------------------------------------

/// Atomic counters for engine events.
pub struct EngineCounters {
    /// Memories added to the short-term buffer.
    pub memories_added: AtomicU64,
    /// Consolidation passes run.
    pub consolidation_passes: AtomicU64,
    /// Items promoted to long-term memory.
    pub items_promoted: AtomicU64,
    /// Buffered items discarded during consolidation.
    pub items_discarded: AtomicU64,
    /// Recall queries served.
    pub recalls: AtomicU64,
    /// Inferences attempted.
    pub inferences: AtomicU64,
    /// Decisions made.
    pub decisions: AtomicU64,
    /// Emotional state updates.
    pub emotional_updates: AtomicU64,
    /// Reflections recorded.
    pub reflections: AtomicU64,
    /// Persisted state files that failed to parse.
    pub state_load_failures: AtomicU64,
    /// Save operations completed.
    pub saves_completed: AtomicU64,
}

impl EngineCounters {
    /// Create a new set of zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memories_added: AtomicU64::new(0),
            consolidation_passes: AtomicU64::new(0),
            items_promoted: AtomicU64::new(0),
            items_discarded: AtomicU64::new(0),
            recalls: AtomicU64::new(0),
            inferences: AtomicU64::new(0),
            decisions: AtomicU64::new(0),
            emotional_updates: AtomicU64::new(0),
            reflections: AtomicU64::new(0),
            state_load_failures: AtomicU64::new(0),
            saves_completed: AtomicU64::new(0),
        }
    }

    /// Increment a counter by one.
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot all counters for export.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            memories_added: self.memories_added.load(Ordering::Relaxed),
            consolidation_passes: self.consolidation_passes.load(Ordering::Relaxed),
            items_promoted: self.items_promoted.load(Ordering::Relaxed),
            items_discarded: self.items_discarded.load(Ordering::Relaxed),
            recalls: self.recalls.load(Ordering::Relaxed),
            inferences: self.inferences.load(Ordering::Relaxed),
            decisions: self.decisions.load(Ordering::Relaxed),
            emotional_updates: self.emotional_updates.load(Ordering::Relaxed),
            reflections: self.reflections.load(Ordering::Relaxed),
            state_load_failures: self.state_load_failures.load(Ordering::Relaxed),
            saves_completed: self.saves_completed.load(Ordering::Relaxed),
        }
    }
}

impl Default for EngineCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EngineCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EngineCounters").field(&self.snapshot()).finish()
    }
}

/// A snapshot of counter values at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Memories added.
    pub memories_added: u64,
    /// Consolidation passes.
    pub consolidation_passes: u64,
    /// Items promoted to long-term memory.
    pub items_promoted: u64,
    /// Items discarded.
    pub items_discarded: u64,
    /// Recall queries.
    pub recalls: u64,
    /// Inferences.
    pub inferences: u64,
    /// Decisions.
    pub decisions: u64,
    /// Emotional updates.
    pub emotional_updates: u64,
    /// Reflections.
    pub reflections: u64,
    /// State load failures.
    pub state_load_failures: u64,
    /// Completed saves.
    pub saves_completed: u64,
}

impl CounterSnapshot {
    /// Format as Prometheus-compatible text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        let rows: [(&str, &str, u64); 11] = [
            ("memories_added", "Memories added to short-term memory", self.memories_added),
            ("consolidation_passes", "Consolidation passes run", self.consolidation_passes),
            ("items_promoted", "Items promoted to long-term memory", self.items_promoted),
            ("items_discarded", "Buffered items discarded", self.items_discarded),
            ("recalls", "Recall queries served", self.recalls),
            ("inferences", "Inferences attempted", self.inferences),
            ("decisions", "Decisions made", self.decisions),
            ("emotional_updates", "Emotional state updates", self.emotional_updates),
            ("reflections", "Reflections recorded", self.reflections),
            ("state_load_failures", "Malformed state files encountered", self.state_load_failures),
            ("saves_completed", "Save operations completed", self.saves_completed),
        ];

        let mut out = String::new();
        for (name, help, value) in rows {
            out.push_str(&format!(
                "# HELP cortex_{name}_total {help}\n\
                 # TYPE cortex_{name}_total counter\n\
                 cortex_{name}_total {value}\n"
            ));
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Turn Latency Monitor
// ---------------------------------------------------------------------------

const HISTORY_LEN: usize = 256;

/// Tracks wall-clock time spent processing each conversation turn.
///
/// ```rust
/// # use cortex_core::metrics::LatencyMonitor;
/// let monitor = LatencyMonitor::new(5000.0);
/// {
///     let _guard = monitor.begin_turn();
///     // ... handle a turn ...
/// }
/// assert_eq!(monitor.turn_count(), 1);
/// ```
pub struct LatencyMonitor {
    budget_ms: f64,
    history: Mutex<LatencyHistory>,
}

struct LatencyHistory {
    timings: Vec<f64>,
    write_idx: usize,
    count: u64,
    last_over_budget: bool,
}

impl LatencyMonitor {
    /// Create a new monitor with the given per-turn budget (milliseconds).
    #[must_use]
    pub fn new(budget_ms: f64) -> Self {
        Self {
            budget_ms,
            history: Mutex::new(LatencyHistory {
                timings: vec![0.0; HISTORY_LEN],
                write_idx: 0,
                count: 0,
                last_over_budget: false,
            }),
        }
    }

    /// Begin timing a turn. The returned guard records elapsed time on drop.
    pub fn begin_turn(&self) -> TurnGuard<'_> {
        TurnGuard {
            monitor: self,
            start: Instant::now(),
        }
    }

    /// Record a turn timing manually.
    pub fn record(&self, elapsed: Duration) {
        self.record_ms(elapsed.as_secs_f64() * 1000.0);
    }

    /// Record a turn timing in milliseconds.
    pub fn record_ms(&self, ms: f64) {
        let mut h = self.history.lock();
        let idx = h.write_idx;
        let len = h.timings.len();
        h.timings[idx] = ms;
        h.write_idx = (idx + 1) % len;
        h.count += 1;
        h.last_over_budget = ms > self.budget_ms;
    }

    /// The last recorded timing (milliseconds), 0.0 if none.
    #[must_use]
    pub fn last_turn_ms(&self) -> f64 {
        let h = self.history.lock();
        if h.count == 0 {
            return 0.0;
        }
        let idx = if h.write_idx == 0 {
            h.timings.len() - 1
        } else {
            h.write_idx - 1
        };
        h.timings[idx]
    }

    /// Whether the last turn exceeded the budget.
    #[must_use]
    pub fn is_over_budget(&self) -> bool {
        self.history.lock().last_over_budget
    }

    /// P50, P95, P99 and max over the retained history.
    #[must_use]
    pub fn percentiles(&self) -> LatencyPercentiles {
        let h = self.history.lock();
        let n = usize::try_from(h.count).map_or(h.timings.len(), |c| c.min(h.timings.len()));
        if n == 0 {
            return LatencyPercentiles::default();
        }

        let mut sorted = h.timings[..n].to_vec();
        sorted.sort_by(f64::total_cmp);

        let at = |q: f64| sorted[((n as f64 * q) as usize).min(n - 1)];
        let over_count = sorted.iter().filter(|&&t| t > self.budget_ms).count();

        LatencyPercentiles {
            p50: sorted[n / 2],
            p95: at(0.95),
            p99: at(0.99),
            max: sorted[n - 1],
            over_budget_ratio: over_count as f64 / n as f64,
        }
    }

    /// Total number of turns recorded.
    #[must_use]
    pub fn turn_count(&self) -> u64 {
        self.history.lock().count
    }

    /// The configured budget in milliseconds.
    #[must_use]
    pub fn budget_ms(&self) -> f64 {
        self.budget_ms
    }
}

impl std::fmt::Debug for LatencyMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatencyMonitor")
            .field("budget_ms", &self.budget_ms)
            .field("turns", &self.turn_count())
            .finish()
    }
}

/// RAII guard that records elapsed time when dropped.
pub struct TurnGuard<'a> {
    monitor: &'a LatencyMonitor,
    start: Instant,
}

impl TurnGuard<'_> {
    /// Time elapsed since the guard was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.monitor.record(self.start.elapsed());
    }
}

/// Percentile statistics for turn timings.
#[derive(Debug, Clone, Default)]
pub struct LatencyPercentiles {
    /// 50th percentile (median) in milliseconds.
    pub p50: f64,
    /// 95th percentile in milliseconds.
    pub p95: f64,
    /// 99th percentile in milliseconds.
    pub p99: f64,
    /// Maximum observed timing.
    pub max: f64,
    /// Ratio of turns that exceeded the budget (0.0 to 1.0).
    pub over_budget_ratio: f64,
}

impl LatencyPercentiles {
    /// Format as a human-readable summary.
    #[must_use]
    pub fn summary(&self, budget_ms: f64) -> String {
        format!(
            "P50={:.2}ms  P95={:.2}ms  P99={:.2}ms  Max={:.2}ms  Budget={budget_ms:.1}ms  \
             Over-budget={:.1}%",
            self.p50,
            self.p95,
            self.p99,
            self.max,
            self.over_budget_ratio * 100.0,
        )
    }
}

// ---------------------------------------------------------------------------
// Tracing Span Names
// ---------------------------------------------------------------------------

/// Span names used with `tracing::span!`.
pub mod spans {
    /// One conversation turn.
    pub const SESSION_TURN: &str = "cortex::session::turn";
    /// Memory creation.
    pub const MEMORY_ADD: &str = "cortex::memory::add";
    /// Memory recall.
    pub const MEMORY_RECALL: &str = "cortex::memory::recall";
    /// Consolidation pass.
    pub const CONSOLIDATION: &str = "cortex::memory::consolidate";
    /// Inference.
    pub const INFER: &str = "cortex::reasoning::infer";
    /// Decision scoring.
    pub const DECISION: &str = "cortex::decision";
    /// Emotional update.
    pub const EMOTION_UPDATE: &str = "cortex::emotion::update";
    /// Self-reflection.
    pub const REFLECTION: &str = "cortex::reflection";
    /// Persistence save.
    pub const PERSIST_SAVE: &str = "cortex::persist::save";
    /// Persistence load.
    pub const PERSIST_LOAD: &str = "cortex::persist::load";
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_default_zero() {
        let c = EngineCounters::new();
        assert_eq!(c.snapshot(), CounterSnapshot::default());
    }

    #[test]
    fn counters_increment_and_snapshot() {
        let c = EngineCounters::new();
        c.memories_added.fetch_add(11, Ordering::Relaxed);
        EngineCounters::bump(&c.consolidation_passes);
        c.items_promoted.fetch_add(3, Ordering::Relaxed);
        c.items_discarded.fetch_add(8, Ordering::Relaxed);

        let snap = c.snapshot();
        assert_eq!(snap.memories_added, 11);
        assert_eq!(snap.consolidation_passes, 1);
        assert_eq!(snap.items_promoted, 3);
        assert_eq!(snap.items_discarded, 8);
        assert_eq!(snap.decisions, 0);
    }

    #[test]
    fn prometheus_format_valid() {
        let c = EngineCounters::new();
        c.decisions.fetch_add(42, Ordering::Relaxed);
        let prom = c.snapshot().to_prometheus();
        assert!(prom.contains("cortex_decisions_total 42"));
        assert!(prom.contains("# TYPE cortex_saves_completed_total counter"));
        assert!(prom.contains("# HELP"));
    }

    #[test]
    fn monitor_records() {
        let monitor = LatencyMonitor::new(2.0);
        assert_eq!(monitor.turn_count(), 0);
        assert_eq!(monitor.last_turn_ms(), 0.0);

        monitor.record_ms(0.5);
        monitor.record_ms(1.0);
        monitor.record_ms(1.5);

        assert_eq!(monitor.turn_count(), 3);
        assert!((monitor.last_turn_ms() - 1.5).abs() < 0.001);
        assert!(!monitor.is_over_budget());
    }

    #[test]
    fn monitor_detects_over_budget() {
        let monitor = LatencyMonitor::new(2.0);
        monitor.record_ms(3.0);
        assert!(monitor.is_over_budget());
    }

    #[test]
    fn guard_records_timing() {
        let monitor = LatencyMonitor::new(1000.0);
        {
            let guard = monitor.begin_turn();
            assert!(guard.elapsed() < Duration::from_secs(1));
        }
        assert_eq!(monitor.turn_count(), 1);
    }

    #[test]
    fn percentiles_with_data() {
        let monitor = LatencyMonitor::new(2.0);
        for i in 0..100 {
            monitor.record_ms(f64::from(i) * 0.02);
        }

        let pct = monitor.percentiles();
        assert!(pct.p50 > 0.0);
        assert!(pct.p95 >= pct.p50);
        assert!(pct.p99 >= pct.p95);
        assert!(pct.over_budget_ratio.abs() < 0.01);
    }

    #[test]
    fn history_wraps_after_capacity() {
        let monitor = LatencyMonitor::new(2.0);
        for _ in 0..(HISTORY_LEN + 10) {
            monitor.record_ms(1.0);
        }
        monitor.record_ms(9.0);
        assert!((monitor.last_turn_ms() - 9.0).abs() < 0.001);
        assert!((monitor.percentiles().max - 9.0).abs() < 0.001);
    }

    #[test]
    fn summary_format() {
        let monitor = LatencyMonitor::new(2.0);
        monitor.record_ms(0.5);
        let summary = monitor.percentiles().summary(monitor.budget_ms());
        assert!(summary.contains("P50="));
        assert!(summary.contains("Budget=2.0ms"));
    }
}
