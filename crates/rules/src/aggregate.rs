//! Worst-of aggregation of the three per-signal verdicts.

use vigil_core::StatusLevel;

/// Merge the signals present for a component into one overall status.
///
/// File health and level compliance map `true` to healthy and `false` to
/// warning. The result is the worst value present; with no signals at all it
/// is `Unknown`.
pub fn aggregate(
    heartbeat: Option<StatusLevel>,
    file_healthy: Option<bool>,
    level_compliant: Option<bool>,
) -> StatusLevel {
    let signals = heartbeat.into_iter().chain(
        [file_healthy, level_compliant]
            .into_iter()
            .flatten()
            .map(StatusLevel::from_compliance),
    );
    StatusLevel::worst_of(signals)
}
