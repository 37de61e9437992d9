//! Closed/open/half-open circuit breaker, ported near-verbatim in structure
//! from the teacher's `services/adapters/src/circuit_breaker.rs`,
//! generalized from a fixed failure *count* threshold to a rolling failure
//! *ratio* window per §4.2.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Size of the rolling outcome window.
    pub window_size: usize,
    /// Minimum outcomes in the window before the ratio is evaluated.
    pub min_samples: usize,
    /// Failure ratio (0.0-1.0) over the window that opens the circuit.
    pub failure_ratio_threshold: f64,
    pub recovery_timeout: Duration,
    pub success_threshold: u32,
    pub half_open_max_failures: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            window_size: 20,
            min_samples: 5,
            failure_ratio_threshold: 0.5,
            recovery_timeout: Duration::from_secs(60),
            success_threshold: 3,
            half_open_max_failures: 1,
        }
    }
}

struct Inner {
    state: CircuitState,
    outcomes: VecDeque<bool>, // true = success
    half_open_successes: u32,
    half_open_failures: u32,
    last_failure_time: Option<Instant>,
}

pub struct CircuitBreaker {
    inner: RwLock<Inner>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            inner: RwLock::new(Inner {
                state: CircuitState::Closed,
                outcomes: VecDeque::with_capacity(config.window_size),
                half_open_successes: 0,
                half_open_failures: 0,
                last_failure_time: None,
            }),
            config,
        }
    }

    pub async fn state(&self) -> CircuitState {
        self.inner.read().await.state
    }

    /// Whether a call should currently be attempted, transitioning
    /// open -> half-open once the recovery timeout has elapsed.
    pub async fn should_attempt(&self) -> bool {
        let mut inner = self.inner.write().await;
        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                if let Some(failure_time) = inner.last_failure_time {
                    if failure_time.elapsed() >= self.config.recovery_timeout {
                        inner.state = CircuitState::HalfOpen;
                        inner.half_open_successes = 0;
                        inner.half_open_failures = 0;
                        info!("circuit transitioning to half-open");
                        return true;
                    }
                }
                false
            }
        }
    }

    fn failure_ratio(inner: &Inner) -> Option<f64> {
        if inner.outcomes.len() < 1 {
            return None;
        }
        let failures = inner.outcomes.iter().filter(|ok| !**ok).count();
        Some(failures as f64 / inner.outcomes.len() as f64)
    }

    pub async fn on_success(&self) {
        let mut inner = self.inner.write().await;
        match inner.state {
            CircuitState::HalfOpen => {
                inner.half_open_successes += 1;
                if inner.half_open_successes >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.outcomes.clear();
                    info!(successes = inner.half_open_successes, "circuit closed after recovery");
                }
            }
            CircuitState::Closed => {
                if inner.outcomes.len() == self.config.window_size {
                    inner.outcomes.pop_front();
                }
                inner.outcomes.push_back(true);
            }
            CircuitState::Open => {}
        }
    }

    pub async fn on_failure(&self) {
        let mut inner = self.inner.write().await;
        inner.last_failure_time = Some(Instant::now());
        match inner.state {
            CircuitState::Closed => {
                if inner.outcomes.len() == self.config.window_size {
                    inner.outcomes.pop_front();
                }
                inner.outcomes.push_back(false);
                let samples = inner.outcomes.len();
                if samples >= self.config.min_samples {
                    if let Some(ratio) = Self::failure_ratio(&inner) {
                        if ratio >= self.config.failure_ratio_threshold {
                            inner.state = CircuitState::Open;
                            warn!(ratio, samples, "circuit opened on failure ratio");
                        }
                    }
                }
            }
            CircuitState::HalfOpen => {
                inner.half_open_failures += 1;
                if inner.half_open_failures >= self.config.half_open_max_failures {
                    inner.state = CircuitState::Open;
                    warn!("circuit reopened from half-open state");
                }
            }
            CircuitState::Open => {}
        }
    }

    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        inner.state = CircuitState::Closed;
        inner.outcomes.clear();
        inner.half_open_successes = 0;
        inner.half_open_failures = 0;
        inner.last_failure_time = None;
    }
}
