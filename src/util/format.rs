//! Display formatting for utilisation figures.

/// Format `used / limit` as a percentage string with one decimal, e.g. `"25.0%"`.
///
/// A zero limit reports `"0.0%"` rather than dividing by zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn utilization(used: f64, limit: u64) -> String {
    if limit == 0 {
        return percent(0.0);
    }
    percent(used / limit as f64 * 100.0)
}

/// Format an already-computed percentage with one decimal.
#[must_use]
pub fn percent(value: f64) -> String {
    format!("{value:.1}%")
}
