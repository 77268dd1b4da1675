//! Profiling reports for the timing ledger.

use std::fmt::Write as _;

use tracing::info;

use crate::config::ProfilingLevel;
use crate::graph::Timings;

/// Separator between the lines of a detailed report.
const ROW_SEPARATOR: &str = "\n     ";

/// Destination of the per-call profiling message.
pub trait ProfileSink: Send + Sync {
    fn emit(&self, message: &str);
}

/// Sends profiling messages to `tracing` at `info` on target `iet::profiling`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ProfileSink for TracingSink {
    fn emit(&self, message: &str) {
        info!(target: "iet::profiling", "{message}");
    }
}

/// Render the ledger at the given level.
///
/// The detailed form lists every pass with its time (showing the pass name,
/// not the disambiguated label) followed by the grand total. The terse form
/// is a single line of labels and the total.
pub fn format_profile(timings: &Timings, level: ProfilingLevel) -> String {
    let total = timings.total().as_secs_f64();
    if level.is_detailed() {
        let rows: Vec<String> = timings
            .iter()
            .map(|e| format!("{} (elapsed: {:.2} s)", e.pass, e.elapsed.as_secs_f64()))
            .collect();
        let mut out = rows.join(ROW_SEPARATOR);
        let _ = write!(out, "{ROW_SEPARATOR}[Total elapsed: {total:.2} s]");
        out
    } else {
        format!("passes: {} (elapsed {total:.2} s)", timings.labels().join(","))
    }
}

/// Format the ledger and hand it to `sink`, exactly once.
pub fn report(timings: &Timings, level: ProfilingLevel, sink: &dyn ProfileSink) -> String {
    let message = format_profile(timings, level);
    sink.emit(&message);
    message
}
