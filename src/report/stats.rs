use std::time::Duration;

use serde::Serialize;

/// Timing summary of one simulator run. Times are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub blocks_added: usize,
    pub total_ms: f64,
    pub average_ms: f64,
    pub fastest_ms: f64,
    pub slowest_ms: f64,
    pub workers: usize,
    pub difficulty: u32,
    pub hashes: u64,
    pub hashes_per_sec: f64,
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

impl RunStats {
    /// Aggregate per-block times (genesis excluded) and the run total.
    /// Per-block figures are zero when no block was timed.
    pub fn from_run(
        total: Duration,
        block_times: &[Duration],
        hashes: u64,
        workers: usize,
        difficulty: u32,
    ) -> Self {
        let times: Vec<f64> = block_times.iter().copied().map(millis).collect();
        let (average_ms, fastest_ms, slowest_ms) = if times.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let sum: f64 = times.iter().sum();
            (
                sum / times.len() as f64,
                times.iter().copied().fold(f64::INFINITY, f64::min),
                times.iter().copied().fold(0.0, f64::max),
            )
        };

        let secs = total.as_secs_f64();
        let hashes_per_sec = if secs > 0.0 { hashes as f64 / secs } else { 0.0 };

        Self {
            blocks_added: times.len(),
            total_ms: millis(total),
            average_ms,
            fastest_ms,
            slowest_ms,
            workers,
            difficulty,
            hashes,
            hashes_per_sec,
        }
    }
}
