//! Circuit Breaker
//!
//! Guards the dependency surface (ledger calls, store reads on the status
//! path) with three states:
//!
//! - **Closed**: calls pass through; outcomes land in a rolling window and
//!   the breaker trips once the failure ratio crosses the threshold.
//! - **Open**: calls are short-circuited; callers substitute their fallback.
//! - **HalfOpen**: after the cool-down a bounded number of trial calls pass;
//!   enough successes close the breaker, a single failure reopens it.
//!
//! Counters are shared process-wide and updated under synchronization -
//! batch workers and request handlers hit the same instance concurrently.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation - calls pass through
    Closed,
    /// Failure ratio exceeded - calls short-circuited
    Open,
    /// Recovery probe - limited trial calls allowed
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Configuration for the circuit breaker
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct CircuitBreakerConfig {
    /// Rolling window size (number of most recent call outcomes kept)
    pub window_size: usize,
    /// Minimum outcomes in the window before the ratio is evaluated
    pub min_calls: usize,
    /// Failure ratio (0.0 - 1.0) that trips the circuit
    pub failure_rate_threshold: f64,
    /// Time to wait in Open before admitting trial calls (seconds)
    pub open_cooldown_secs: u64,
    /// Maximum trial calls admitted while HalfOpen
    pub half_open_max_calls: u32,
    /// Trial successes required to close the circuit
    pub half_open_success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            window_size: 20,
            min_calls: 10,
            failure_rate_threshold: 0.5,
            open_cooldown_secs: 30,
            half_open_max_calls: 3,
            half_open_success_threshold: 2,
        }
    }
}

/// Rolling window of call outcomes (true = failure)
struct OutcomeWindow {
    outcomes: VecDeque<bool>,
    capacity: usize,
}

impl OutcomeWindow {
    fn new(capacity: usize) -> Self {
        Self {
            outcomes: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, failed: bool) {
        if self.outcomes.len() == self.capacity {
            self.outcomes.pop_front();
        }
        self.outcomes.push_back(failed);
    }

    fn len(&self) -> usize {
        self.outcomes.len()
    }

    fn failure_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        let failures = self.outcomes.iter().filter(|f| **f).count();
        failures as f64 / self.outcomes.len() as f64
    }

    fn clear(&mut self) {
        self.outcomes.clear();
    }
}

/// Circuit breaker guarding the ledger/store dependency surface
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: RwLock<CircuitState>,
    window: Mutex<OutcomeWindow>,
    opened_at: RwLock<Option<DateTime<Utc>>>,
    half_open_admitted: AtomicU32,
    half_open_successes: AtomicU32,
    total_trips: AtomicU64,
}

impl CircuitBreaker {
    /// Create a new circuit breaker
    pub fn new(config: CircuitBreakerConfig) -> Self {
        let window = OutcomeWindow::new(config.window_size.max(1));
        Self {
            config,
            state: RwLock::new(CircuitState::Closed),
            window: Mutex::new(window),
            opened_at: RwLock::new(None),
            half_open_admitted: AtomicU32::new(0),
            half_open_successes: AtomicU32::new(0),
            total_trips: AtomicU64::new(0),
        }
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }

    /// Get current state
    pub async fn state(&self) -> CircuitState {
        *self.state.read().await
    }

    /// Ask for admission of one call.
    ///
    /// Returns false when the call must be short-circuited to the fallback.
    /// Handles the Open -> HalfOpen transition once the cool-down elapses and
    /// enforces the HalfOpen trial allowance.
    pub async fn acquire(&self) -> bool {
        let state = self.state().await;

        match state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                if self.cooldown_elapsed().await {
                    self.transition_to_half_open().await;
                    self.admit_trial()
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => self.admit_trial(),
        }
    }

    fn admit_trial(&self) -> bool {
        let admitted = self.half_open_admitted.fetch_add(1, Ordering::SeqCst);
        admitted < self.config.half_open_max_calls
    }

    /// Record a successful dependency call
    pub async fn record_success(&self) {
        let state = self.state().await;

        match state {
            CircuitState::Closed => {
                self.window.lock().unwrap().push(false);
            }
            CircuitState::HalfOpen => {
                let successes = self.half_open_successes.fetch_add(1, Ordering::SeqCst) + 1;
                if successes >= self.config.half_open_success_threshold {
                    self.close().await;
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Record a failed dependency call
    pub async fn record_failure(&self) {
        let state = self.state().await;

        match state {
            CircuitState::Closed => {
                let should_trip = {
                    let mut window = self.window.lock().unwrap();
                    window.push(true);
                    window.len() >= self.config.min_calls
                        && window.failure_rate() >= self.config.failure_rate_threshold
                };
                if should_trip {
                    self.trip().await;
                }
            }
            // A trial failure sends the circuit straight back to Open
            CircuitState::HalfOpen => {
                self.trip().await;
            }
            CircuitState::Open => {}
        }
    }

    /// Trip the circuit open
    async fn trip(&self) {
        let mut state = self.state.write().await;
        if *state != CircuitState::Open {
            *state = CircuitState::Open;
            *self.opened_at.write().await = Some(Utc::now());
            self.half_open_admitted.store(0, Ordering::SeqCst);
            self.half_open_successes.store(0, Ordering::SeqCst);
            self.total_trips.fetch_add(1, Ordering::SeqCst);

            warn!(
                failure_rate = self.window.lock().unwrap().failure_rate(),
                "Circuit breaker tripped OPEN"
            );
        }
    }

    /// Close the circuit (resume normal operation)
    async fn close(&self) {
        let mut state = self.state.write().await;
        *state = CircuitState::Closed;
        *self.opened_at.write().await = None;
        self.window.lock().unwrap().clear();
        self.half_open_admitted.store(0, Ordering::SeqCst);
        self.half_open_successes.store(0, Ordering::SeqCst);

        info!("Circuit breaker CLOSED - normal operation resumed");
    }

    async fn transition_to_half_open(&self) {
        let mut state = self.state.write().await;
        if *state == CircuitState::Open {
            *state = CircuitState::HalfOpen;
            self.half_open_admitted.store(0, Ordering::SeqCst);
            self.half_open_successes.store(0, Ordering::SeqCst);
            info!("Circuit breaker transitioning to HALF-OPEN");
        }
    }

    async fn cooldown_elapsed(&self) -> bool {
        if let Some(opened_at) = *self.opened_at.read().await {
            let elapsed = Utc::now().signed_duration_since(opened_at).num_seconds();
            elapsed >= self.config.open_cooldown_secs as i64
        } else {
            false
        }
    }

    /// Snapshot for monitoring
    pub async fn stats(&self) -> CircuitBreakerStats {
        let state = *self.state.read().await;
        let window = self.window.lock().unwrap();
        CircuitBreakerStats {
            state,
            window_len: window.len(),
            failure_rate: window.failure_rate(),
            total_trips: self.total_trips.load(Ordering::SeqCst),
        }
    }
}

/// Monitoring snapshot
#[derive(Debug, Clone)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub window_len: usize,
    pub failure_rate: f64,
    pub total_trips: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tripping_config() -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            window_size: 10,
            min_calls: 4,
            failure_rate_threshold: 0.5,
            open_cooldown_secs: 0,
            half_open_max_calls: 2,
            half_open_success_threshold: 2,
        }
    }

    #[tokio::test]
    async fn test_initial_state_closed() {
        let breaker = CircuitBreaker::with_defaults();
        assert_eq!(breaker.state().await, CircuitState::Closed);
        assert!(breaker.acquire().await);
    }

    #[tokio::test]
    async fn test_no_trip_below_min_calls() {
        let breaker = CircuitBreaker::new(tripping_config());

        breaker.record_failure().await;
        breaker.record_failure().await;
        breaker.record_failure().await;
        assert_eq!(breaker.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_trips_at_failure_ratio() {
        let breaker = CircuitBreaker::new(tripping_config());

        breaker.record_success().await;
        breaker.record_success().await;
        breaker.record_failure().await;
        breaker.record_failure().await;
        // 4 outcomes, 50% failed -> trip
        assert_eq!(breaker.state().await, CircuitState::Open);
        assert_eq!(breaker.stats().await.total_trips, 1);
    }

    #[tokio::test]
    async fn test_successes_keep_ratio_low() {
        let breaker = CircuitBreaker::new(tripping_config());

        for _ in 0..6 {
            breaker.record_success().await;
        }
        breaker.record_failure().await;
        breaker.record_failure().await;
        // 8 outcomes, 25% failed -> still closed
        assert_eq!(breaker.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_open_blocks_until_cooldown() {
        let config = CircuitBreakerConfig {
            open_cooldown_secs: 3600,
            ..tripping_config()
        };
        let breaker = CircuitBreaker::new(config);

        for _ in 0..4 {
            breaker.record_failure().await;
        }
        assert_eq!(breaker.state().await, CircuitState::Open);
        assert!(!breaker.acquire().await);
        assert!(!breaker.acquire().await);
    }

    #[tokio::test]
    async fn test_half_open_trial_closes_circuit() {
        let breaker = CircuitBreaker::new(tripping_config());

        for _ in 0..4 {
            breaker.record_failure().await;
        }
        assert_eq!(breaker.state().await, CircuitState::Open);

        // cooldown is zero - next acquire admits a trial call
        assert!(breaker.acquire().await);
        assert_eq!(breaker.state().await, CircuitState::HalfOpen);

        breaker.record_success().await;
        assert!(breaker.acquire().await);
        breaker.record_success().await;

        assert_eq!(breaker.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_failure_reopens() {
        let breaker = CircuitBreaker::new(tripping_config());

        for _ in 0..4 {
            breaker.record_failure().await;
        }
        assert!(breaker.acquire().await);
        assert_eq!(breaker.state().await, CircuitState::HalfOpen);

        breaker.record_failure().await;
        assert_eq!(breaker.state().await, CircuitState::Open);
        assert_eq!(breaker.stats().await.total_trips, 2);
    }

    #[tokio::test]
    async fn test_half_open_trial_limit() {
        let breaker = CircuitBreaker::new(tripping_config());

        for _ in 0..4 {
            breaker.record_failure().await;
        }
        assert!(breaker.acquire().await);
        assert!(breaker.acquire().await);
        // trial allowance (2) exhausted
        assert!(!breaker.acquire().await);
    }
}
