//! `ScanContext`: the global deadline and cooperative-cancellation token
//! threaded through every task a scan spawns (spec §5).

use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct ScanContext {
    pub run_id: String,
    pub deadline_ms: i64,
    pub cancellation: CancellationToken,
}

impl ScanContext {
    pub fn new(run_id: impl Into<String>, started_at_ms: i64, timeout_secs: u64) -> Self {
        Self { run_id: run_id.into(), deadline_ms: started_at_ms + (timeout_secs as i64) * 1_000, cancellation: CancellationToken::new() }
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.deadline_ms
    }

    /// A child token that's cancelled either explicitly or when the parent is.
    pub fn child_token(&self) -> CancellationToken {
        self.cancellation.child_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_timeout() {
        let ctx = ScanContext::new("run-1", 0, 1);
        assert!(!ctx.is_expired(999));
        assert!(ctx.is_expired(1_000));
    }
}
