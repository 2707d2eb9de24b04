mod stats;

use serde::Serialize;

use crate::blockchain::Block;
use crate::config::OutputMode;

pub use stats::RunStats;

#[derive(Serialize)]
struct JsonReport<'a> {
    stats: &'a RunStats,
    chain: &'a [Block],
}

/// Render the end-of-run report for the chosen output mode.
pub fn render(
    mode: OutputMode,
    stats: &RunStats,
    chain: &[Block],
) -> Result<String, serde_json::Error> {
    match mode {
        OutputMode::Terse => Ok(terse(stats)),
        OutputMode::Verbose => Ok(verbose(stats)),
        OutputMode::Json => serde_json::to_string_pretty(&JsonReport { stats, chain }),
    }
}

fn terse(stats: &RunStats) -> String {
    format!("{:.1} {:.1}", stats.total_ms, stats.average_ms)
}

fn verbose(stats: &RunStats) -> String {
    let rows = [
        ("Number of blocks added:", stats.blocks_added.to_string()),
        ("Total execution time:", format!("{:.1} ms.", stats.total_ms)),
        ("Average block execution time:", format!("{:.1} ms.", stats.average_ms)),
        ("Fastest block execution time:", format!("{:.1} ms.", stats.fastest_ms)),
        ("Slowest block execution time:", format!("{:.1} ms.", stats.slowest_ms)),
        ("Difficulty:", stats.difficulty.to_string()),
        ("Workers:", stats.workers.to_string()),
        ("Hashes computed:", stats.hashes.to_string()),
        ("Hash rate:", format!("{:.0} H/s", stats.hashes_per_sec)),
    ];

    let mut out = String::from("=================== Data ===================\n");
    for (label, value) in rows {
        out.push_str(&format!("{label:<32}{value}\n"));
    }
    out
}
