//! `ScanMetrics`: plain counters handed back to the caller for the external
//! reporter to format (spec §6 "no metrics exporter implemented here").

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ScanMetrics {
    pub universe_size: usize,
    pub rows_built: usize,
    pub rows_invalid: usize,
    pub candidates_passed: usize,
    pub candidates_failed: usize,
    pub symbol_errors: usize,
    /// Symbols dropped for reporting a non-exchange-native source (spec §6,
    /// §7 fail-closed aggregator ban, scenario S6).
    pub aggregator_rejections: usize,
    pub duration_ms: u64,
}
