//! Prometheus text exposition.

use std::fmt::Write;

use super::{BatchMetrics, METRIC_NAMESPACE};

/// Renders every counter in Prometheus text format.
///
/// Data counters are exported as `http_txdb_data{type="<batch>_<metric>"}` and
/// failure counters as `http_txdb_errors{error="<batch>_<metric>"}`.
pub fn render_prometheus(metrics: &BatchMetrics) -> String {
    let snapshot = metrics.snapshot();
    let mut out = String::new();

    let _ = writeln!(out, "# HELP {}_data Data management", METRIC_NAMESPACE);
    let _ = writeln!(out, "# TYPE {}_data counter", METRIC_NAMESPACE);
    for (batch, metric, value) in snapshot.iter().filter(|(_, m, _)| !m.is_error()) {
        let _ = writeln!(
            out,
            "{}_data{{type=\"{}_{}\"}} {}",
            METRIC_NAMESPACE,
            batch,
            metric.as_str(),
            value
        );
    }

    out.push('\n');
    let _ = writeln!(out, "# HELP {}_errors Batch write errors", METRIC_NAMESPACE);
    let _ = writeln!(out, "# TYPE {}_errors counter", METRIC_NAMESPACE);
    for (batch, metric, value) in snapshot.iter().filter(|(_, m, _)| m.is_error()) {
        let _ = writeln!(
            out,
            "{}_errors{{error=\"{}_{}\"}} {}",
            METRIC_NAMESPACE,
            batch,
            metric.as_str(),
            value
        );
    }

    out
}
